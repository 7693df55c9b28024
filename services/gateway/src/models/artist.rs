//! Catalog response shapes exposed to clients

use serde::Serialize;

/// Search hit or similar-artist entry
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ArtistSummary {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// Artist detail view
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ArtistDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deathday: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,
}

/// Artwork by an artist
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Artwork {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// Category (gene) attached to an artwork
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Gene {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}
