//! Per-user favorites over the credential store
//!
//! Callers hold an [`AuthUser`] only after token verification, so no
//! operation here can reach the store for an unauthenticated request.

use std::sync::Arc;
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    jwt::AuthUser,
    models::Favorite,
    repositories::UserStore,
    validation::require,
};

/// Favorites service
#[derive(Clone)]
pub struct FavoritesService {
    store: Arc<dyn UserStore>,
}

impl FavoritesService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Favorites in storage order
    pub async fn list(&self, auth: &AuthUser) -> ApiResult<Vec<Favorite>> {
        Ok(self.store.favorites(auth.id).await?)
    }

    /// Append an artist, rejecting duplicates
    pub async fn add(&self, auth: &AuthUser, artist_id: &str) -> ApiResult<Vec<Favorite>> {
        let artist_id = artist_id_of(artist_id)?;

        let favorites = self
            .store
            .add_favorite(auth.id, Favorite::new(artist_id))
            .await?;

        info!("User {} added favorite {}", auth.id, artist_id);
        Ok(favorites)
    }

    /// Remove every entry for an artist; removing an absent artist is not an error
    pub async fn remove(&self, auth: &AuthUser, artist_id: &str) -> ApiResult<Vec<Favorite>> {
        let artist_id = artist_id_of(artist_id)?;

        let favorites = self.store.remove_favorite(auth.id, artist_id).await?;

        info!("User {} removed favorite {}", auth.id, artist_id);
        Ok(favorites)
    }
}

fn artist_id_of(artist_id: &str) -> ApiResult<&str> {
    require(artist_id, "Artist id").map_err(ApiError::Validation)
}
