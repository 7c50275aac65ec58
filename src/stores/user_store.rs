//! User store - account lookup and registration behind one interface
//!
//! Handlers only see [`UserRepository`]; the backing store is the `users`
//! table by default, or [`MemoryUserStore`] for throwaway instances.

use async_trait::async_trait;
use parking_lot::RwLock;
use thiserror::Error;

use crate::models::{NewUser, User};
use crate::utils::auth::hash_password;

/// Demo accounts inserted when seeding is enabled
pub const DEMO_USERS: &[(&str, &str)] = &[("user1", "password1"), ("user2", "password2")];

#[derive(Debug, Error)]
pub enum UserStoreError {
    #[error("username already exists: {0}")]
    UsernameTaken(String),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Account lookup and insertion
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by exact username
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;

    /// Insert a user, returning its id
    async fn insert(&self, user: NewUser) -> Result<i64, UserStoreError>;
}

/// Process-lifetime user store
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}

#[async_trait]
impl UserRepository for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        Ok(self
            .users
            .read()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<i64, UserStoreError> {
        // check and push under one lock so concurrent registrations cannot both win
        let mut users = self.users.write();
        if users.iter().any(|u| u.username == user.username) {
            return Err(UserStoreError::UsernameTaken(user.username));
        }

        let id = users.last().map(|u| u.id + 1).unwrap_or(1);
        users.push(User {
            id,
            username: user.username,
            password: user.password,
        });

        Ok(id)
    }
}

/// Insert the demo accounts that are not present yet
pub async fn seed_demo_users(repo: &dyn UserRepository) -> anyhow::Result<usize> {
    let mut inserted = 0;

    for (username, password) in DEMO_USERS {
        if repo.find_by_username(username).await?.is_some() {
            continue;
        }

        match repo.insert(NewUser::new(*username, hash_password(password))).await {
            Ok(_) => inserted += 1,
            Err(UserStoreError::UsernameTaken(_)) => {}
            Err(UserStoreError::Backend(e)) => return Err(e),
        }
    }

    Ok(inserted)
}
