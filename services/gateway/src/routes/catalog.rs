//! Catalog proxy routes. No authentication required.

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct ArtistParams {
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct ArtistIdParams {
    #[serde(default)]
    pub artist_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ArtworkIdParams {
    #[serde(default)]
    pub artwork_id: String,
}

pub async fn search(
    State(state): State<AppState>,
    WithRejection(Query(params), _): WithRejection<Query<SearchParams>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let artists = state.catalog.search_artists(&params.q).await?;
    Ok(Json(json!({ "artists": artists })))
}

pub async fn artist(
    State(state): State<AppState>,
    WithRejection(Query(params), _): WithRejection<Query<ArtistParams>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let artist = state.catalog.get_artist_details(&params.id).await?;
    Ok(Json(json!({ "artist": artist })))
}

pub async fn artworks(
    State(state): State<AppState>,
    WithRejection(Query(params), _): WithRejection<Query<ArtistIdParams>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let artworks = state.catalog.get_artworks(&params.artist_id).await?;
    Ok(Json(json!({ "artworks": artworks })))
}

pub async fn genes(
    State(state): State<AppState>,
    WithRejection(Query(params), _): WithRejection<Query<ArtworkIdParams>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let genes = state.catalog.get_genes(&params.artwork_id).await?;
    Ok(Json(json!({ "genes": genes })))
}

pub async fn similar_artists(
    State(state): State<AppState>,
    WithRejection(Query(params), _): WithRejection<Query<ArtistIdParams>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let similar_artists = state.catalog.get_similar_artists(&params.artist_id).await?;
    Ok(Json(json!({ "similarArtists": similar_artists })))
}
