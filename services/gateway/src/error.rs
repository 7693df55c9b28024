//! Custom error types for the gateway service

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::{catalog::CatalogError, jwt::TokenError, repositories::StoreError};

/// Errors surfaced at the request boundary
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or missing input
    #[error("{0}")]
    Validation(String),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Artist already in favorites")]
    DuplicateFavorite,

    /// Unknown email or wrong password; the two are never told apart
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No token, or a token that is not decodable
    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("{0}")]
    NotFound(String),

    /// Upstream catalog rejected our client credentials
    #[error("Catalog authentication failed")]
    UpstreamAuth,

    /// Upstream catalog unreachable or returned a failure
    #[error("{0}")]
    Upstream(String),

    /// Internal server error; the detail is logged, never returned
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::DuplicateEmail | ApiError::DuplicateFavorite => {
                StatusCode::BAD_REQUEST
            }
            ApiError::InvalidCredentials
            | ApiError::Unauthenticated
            | ApiError::TokenExpired
            | ApiError::InvalidSignature => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::UpstreamAuth | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match self {
            ApiError::Internal(detail) => {
                error!("Internal error: {}", detail);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => ApiError::DuplicateEmail,
            StoreError::DuplicateFavorite => ApiError::DuplicateFavorite,
            StoreError::NotFound => ApiError::NotFound("User not found".to_string()),
            StoreError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => ApiError::TokenExpired,
            TokenError::InvalidSignature => ApiError::InvalidSignature,
            TokenError::Malformed => ApiError::Unauthenticated,
            TokenError::Signing => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation(msg) => ApiError::Validation(msg),
            CatalogError::Auth(detail) => {
                error!("Catalog token request failed: {}", detail);
                ApiError::UpstreamAuth
            }
            CatalogError::Upstream { context, detail } => {
                error!("{}: {}", context, detail);
                ApiError::Upstream(context.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
