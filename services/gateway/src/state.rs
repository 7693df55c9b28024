//! Application state shared across handlers

use std::sync::Arc;

use crate::{
    accounts::AccountService, catalog::CatalogClient, favorites::FavoritesService,
    jwt::JwtService, repositories::UserStore, session::SessionConfig,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub jwt_service: JwtService,
    pub accounts: AccountService,
    pub favorites: FavoritesService,
    pub catalog: CatalogClient,
    pub session: SessionConfig,
}

impl AppState {
    /// Wire the services over one credential store
    pub fn new(
        store: Arc<dyn UserStore>,
        jwt_service: JwtService,
        catalog: CatalogClient,
        cookie_secure: bool,
    ) -> Self {
        let session = SessionConfig {
            max_age_secs: jwt_service.token_expiry(),
            secure: cookie_secure,
        };

        Self {
            accounts: AccountService::new(store.clone(), jwt_service.clone()),
            favorites: FavoritesService::new(store.clone()),
            store,
            jwt_service,
            catalog,
            session,
        }
    }
}
