//! Account routes

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{WithRejection, cookie::CookieJar};
use serde_json::json;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    jwt::AuthUser,
    models::{LoginRequest, RegisterRequest},
};

/// Create an account, bind a token cookie and return the user view
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(payload), _): WithRejection<Json<RegisterRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let session = state.accounts.register(payload).await?;
    let jar = state.session.set_token(jar, session.token);

    Ok((
        StatusCode::CREATED,
        jar,
        Json(json!({
            "message": "Registration successful",
            "user": session.user,
        })),
    ))
}

/// Sign in, bind a token cookie and return the user view with favorites
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(payload), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let session = state.accounts.login(payload).await?;
    let jar = state.session.set_token(jar, session.token);

    Ok((
        jar,
        Json(json!({
            "message": "Login successful",
            "user": session.user,
        })),
    ))
}

/// Clear the token cookie. Always succeeds.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    (
        state.session.clear_token(jar),
        Json(json!({"message": "Logged out successfully"})),
    )
}

/// Current user view for the presented token
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let view = state.accounts.current_user(&user).await?;
    Ok(Json(json!({ "user": view })))
}

/// Delete the account behind the presented token and clear the cookie
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    jar: CookieJar,
) -> Response {
    match state.accounts.delete_account(&user).await {
        Ok(()) => (
            state.session.clear_token(jar),
            Json(json!({"message": "Account deleted successfully"})),
        )
            .into_response(),
        // The token names an account that no longer exists; drop it too.
        Err(err @ ApiError::NotFound(_)) => (state.session.clear_token(jar), err).into_response(),
        Err(err) => err.into_response(),
    }
}
