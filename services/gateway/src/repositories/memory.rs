//! In-memory user store for tests and local development

use async_trait::async_trait;
use chrono::Utc;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, StoreResult, UserStore};
use crate::models::{Favorite, NewUser, User};

/// User store kept in process memory. Every mutation happens under one
/// write guard, so favorite updates for a user are atomic.
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, new_user: NewUser) -> StoreResult<User> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == new_user.email) {
            return Err(StoreError::DuplicateEmail);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            fullname: new_user.fullname,
            password_hash: new_user.password_hash,
            profile_image_url: new_user.profile_image_url,
            favorites: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.users.write().await.remove(&id).is_some())
    }

    async fn favorites(&self, id: Uuid) -> StoreResult<Vec<Favorite>> {
        let users = self.users.read().await;
        let user = users.get(&id).ok_or(StoreError::NotFound)?;
        Ok(user.favorites.clone())
    }

    async fn add_favorite(&self, id: Uuid, favorite: Favorite) -> StoreResult<Vec<Favorite>> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(StoreError::NotFound)?;

        if user
            .favorites
            .iter()
            .any(|f| f.artist_id == favorite.artist_id)
        {
            return Err(StoreError::DuplicateFavorite);
        }

        user.favorites.push(favorite);
        user.updated_at = Utc::now();
        Ok(user.favorites.clone())
    }

    async fn remove_favorite(&self, id: Uuid, artist_id: &str) -> StoreResult<Vec<Favorite>> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(StoreError::NotFound)?;

        user.favorites.retain(|f| f.artist_id != artist_id);
        user.updated_at = Utc::now();
        Ok(user.favorites.clone())
    }

    async fn health_check(&self) -> StoreResult<bool> {
        Ok(true)
    }
}
