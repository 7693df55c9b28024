//! Favorites routes. All of them sit behind the auth middleware.

use axum::{Extension, Json, extract::State, response::IntoResponse};
use axum_extra::extract::WithRejection;
use serde_json::json;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    jwt::AuthUser,
    models::FavoriteRequest,
};

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let favorites = state.favorites.list(&user).await?;
    Ok(Json(json!({ "favorites": favorites })))
}

pub async fn add(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(payload), _): WithRejection<Json<FavoriteRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let favorites = state.favorites.add(&user, &payload.artist_id).await?;
    Ok(Json(json!({
        "message": "Added to favorites",
        "favorites": favorites,
    })))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(payload), _): WithRejection<Json<FavoriteRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let favorites = state.favorites.remove(&user, &payload.artist_id).await?;
    Ok(Json(json!({
        "message": "Removed from favorites",
        "favorites": favorites,
    })))
}
