//! Authentication middleware for identity token validation

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use crate::{error::ApiError, session::token_from_jar, state::AppState};

/// Verify the presented token before any protected handler runs.
///
/// The token is taken from the `token` cookie, or from an
/// `Authorization: Bearer` header when no cookie is present. On success the
/// verified [`AuthUser`](crate::jwt::AuthUser) is inserted into the request
/// extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let jar = CookieJar::from_headers(req.headers());
    let token = token_from_jar(&jar)
        .or_else(|| bearer_token(&req))
        .ok_or(ApiError::Unauthenticated)?;

    let user = state.jwt_service.verify(&token).map_err(|e| {
        warn!("Rejected token on {}: {}", req.uri().path(), e);
        ApiError::from(e)
    })?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

fn bearer_token(req: &Request) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
