//! User model

/// A registered account
#[derive(Debug, Clone)]
pub struct User {
    /// Store ID
    pub id: i64,
    /// Username, unique per store
    pub username: String,
    /// Password hash
    pub password: String,
}

/// Account data for insertion; `password` is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
}

impl NewUser {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password_hash.into(),
        }
    }
}
