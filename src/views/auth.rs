//! Login and registration pages

use super::layout;

/// GET /login
pub fn login_form() -> String {
    let content = r#"<h1>Login</h1>
<form action="/login" method="post">
<p><label>Username <input type="text" name="username" required></label></p>
<p><label>Password <input type="password" name="password" required></label></p>
<p><button type="submit">Login</button></p>
</form>
<p>No account? <a href="/register">Register</a></p>
"#;

    layout("Login", content)
}

/// GET /register
pub fn register_form() -> String {
    let content = r#"<h1>Register</h1>
<form action="/register" method="post">
<p><label>Username <input type="text" name="username" required></label></p>
<p><label>Password <input type="password" name="password" required></label></p>
<p><label>Confirm password <input type="password" name="confirm_password" required></label></p>
<p><button type="submit">Register</button></p>
</form>
"#;

    layout("Register", content)
}
