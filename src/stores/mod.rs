//! Account stores

mod user_store;

pub use user_store::{seed_demo_users, MemoryUserStore, UserRepository, UserStoreError};
