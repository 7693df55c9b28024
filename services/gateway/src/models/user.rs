//! User model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Favorite;

/// User entity as held by the credential store
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub fullname: String,
    pub password_hash: String,
    pub profile_image_url: String,
    pub favorites: Vec<Favorite>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New user creation payload
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub fullname: String,
    pub password_hash: String,
    pub profile_image_url: String,
}

/// Registration request body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub fullname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login request body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Client-facing view of a user. Never carries the password hash.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub fullname: String,
    pub email: String,
    pub profile_image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorites: Option<Vec<Favorite>>,
}

impl UserView {
    /// View without the favorites list
    pub fn profile(user: &User) -> Self {
        Self {
            id: user.id,
            fullname: user.fullname.clone(),
            email: user.email.clone(),
            profile_image_url: user.profile_image_url.clone(),
            favorites: None,
        }
    }

    /// View including the current favorites list
    pub fn with_favorites(user: User) -> Self {
        Self {
            id: user.id,
            fullname: user.fullname,
            email: user.email,
            profile_image_url: user.profile_image_url,
            favorites: Some(user.favorites),
        }
    }
}
