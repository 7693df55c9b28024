//! Favorite model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One artist saved by a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub artist_id: String,
    pub added_at: DateTime<Utc>,
}

impl Favorite {
    pub fn new(artist_id: impl Into<String>) -> Self {
        Self {
            artist_id: artist_id.into(),
            added_at: Utc::now(),
        }
    }
}

/// Request body for adding or removing a favorite
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest {
    #[serde(default)]
    pub artist_id: String,
}
