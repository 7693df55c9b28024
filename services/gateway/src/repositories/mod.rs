//! Credential store seam and its implementations

use async_trait::async_trait;
use common::error::DatabaseError;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Favorite, NewUser, User};

pub mod memory;
pub mod user;

pub use memory::InMemoryUserStore;
pub use user::UserRepository;

/// Credential store failures
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Artist already in favorites")]
    DuplicateFavorite,

    #[error("User not found")]
    NotFound,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistent record of registered users and their favorites.
///
/// Favorite mutations must be atomic per user document: implementations
/// never read the list, modify it in memory and write it back.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new user with an empty favorites list
    async fn create(&self, new_user: NewUser) -> StoreResult<User>;

    /// Find a user by (normalized) email
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Find a user by ID
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Delete a user and everything it owns. Returns false if absent.
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;

    /// Current favorites in storage order
    async fn favorites(&self, id: Uuid) -> StoreResult<Vec<Favorite>>;

    /// Append a favorite unless one with the same artist id exists
    async fn add_favorite(&self, id: Uuid, favorite: Favorite) -> StoreResult<Vec<Favorite>>;

    /// Remove every favorite matching the artist id
    async fn remove_favorite(&self, id: Uuid, artist_id: &str) -> StoreResult<Vec<Favorite>>;

    /// Check that the backing store is reachable
    async fn health_check(&self) -> StoreResult<bool>;
}
