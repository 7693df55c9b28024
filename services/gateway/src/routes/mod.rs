//! Gateway routes

use axum::{
    Json, Router,
    extract::State,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::error;

use crate::{AppState, middleware::auth_middleware};

pub mod auth;
pub mod catalog;
pub mod favorites;

/// Create the router for the gateway service
pub fn create_router(state: AppState) -> Router {
    // Token verification runs before any of these handlers or their body extractors.
    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/delete", delete(auth::delete_account))
        .route("/favorites", get(favorites::list))
        .route("/favorites/add", post(favorites::add))
        .route("/favorites/remove", post(favorites::remove))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/search", get(catalog::search))
        .route("/artist", get(catalog::artist))
        .route("/artworks", get(catalog::artworks))
        .route("/genes", get(catalog::genes))
        .route("/similar-artists", get(catalog::similar_artists))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let store = match state.store.health_check().await {
        Ok(true) => "ok",
        Ok(false) => "unavailable",
        Err(e) => {
            error!("Store health check failed: {}", e);
            "unavailable"
        }
    };

    Json(json!({
        "status": if store == "ok" { "ok" } else { "degraded" },
        "service": "gateway",
        "store": store,
    }))
}
