//! Art catalog proxy
//!
//! Exchanges client credentials for an upstream access token and reshapes
//! upstream search and detail responses into the smaller shapes the
//! gateway exposes. Holds no state other than an optional token cache.

pub mod schema;

use anyhow::Result;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::models::{ArtistDetail, ArtistSummary, Artwork, Gene};
use schema::{ArtistPage, ArtworkPage, GenePage, SearchPage, UpstreamArtist, XappToken};

/// Upstream page size for list endpoints
const PAGE_SIZE: &str = "10";

/// Cached tokens are dropped this long before their upstream expiry
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

/// Catalog proxy failures
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Rejected before any upstream call
    #[error("{0}")]
    Validation(String),

    /// Token endpoint refused the configured credentials
    #[error("Catalog token request failed: {0}")]
    Auth(String),

    /// Any other upstream failure
    #[error("{context}: {detail}")]
    Upstream {
        context: &'static str,
        detail: String,
    },
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Catalog client configuration
#[derive(Clone)]
pub struct CatalogConfig {
    /// Base URL of the upstream API
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Reuse access tokens until shortly before they expire
    pub cache_token: bool,
}

impl std::fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .field("cache_token", &self.cache_token)
            .finish()
    }
}

impl CatalogConfig {
    /// Create a new CatalogConfig from environment variables
    ///
    /// # Environment Variables
    /// - `ARTSY_CLIENT_ID`: Upstream client id
    /// - `ARTSY_CLIENT_SECRET`: Upstream client secret
    /// - `ARTSY_API_URL`: Upstream base URL (default: "https://api.artsy.net/api")
    /// - `ARTSY_TIMEOUT_SECS`: Request timeout in seconds (default: 10)
    /// - `ARTSY_CACHE_TOKEN`: Cache access tokens until expiry (default: true)
    pub fn from_env() -> Result<Self> {
        let client_id = std::env::var("ARTSY_CLIENT_ID")
            .map_err(|_| anyhow::anyhow!("ARTSY_CLIENT_ID environment variable not set"))?;
        let client_secret = std::env::var("ARTSY_CLIENT_SECRET")
            .map_err(|_| anyhow::anyhow!("ARTSY_CLIENT_SECRET environment variable not set"))?;

        let base_url = std::env::var("ARTSY_API_URL")
            .unwrap_or_else(|_| "https://api.artsy.net/api".to_string());
        Url::parse(&base_url).map_err(|e| anyhow::anyhow!("Invalid ARTSY_API_URL: {}", e))?;

        let timeout_secs = std::env::var("ARTSY_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        let cache_token = std::env::var("ARTSY_CACHE_TOKEN")
            .map(|v| !matches!(v.trim().to_lowercase().as_str(), "false" | "0" | "no"))
            .unwrap_or(true);

        Ok(CatalogConfig {
            base_url,
            client_id,
            client_secret,
            timeout_secs,
            cache_token,
        })
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + ChronoDuration::seconds(TOKEN_EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

/// Client for the upstream art catalog
#[derive(Clone)]
pub struct CatalogClient {
    http: Client,
    config: CatalogConfig,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

impl CatalogClient {
    pub fn new(config: CatalogConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        info!("Catalog client initialized with base URL: {}", config.base_url);

        Ok(Self {
            http,
            config,
            token_cache: Arc::new(RwLock::new(None)),
        })
    }

    /// Build `{base}/{segments...}` with each segment percent-encoded
    fn endpoint(&self, segments: &[&str]) -> CatalogResult<Url> {
        let mut url = Url::parse(&self.config.base_url).map_err(|e| CatalogError::Upstream {
            context: "Invalid catalog URL",
            detail: e.to_string(),
        })?;

        url.path_segments_mut()
            .map_err(|_| CatalogError::Upstream {
                context: "Invalid catalog URL",
                detail: self.config.base_url.clone(),
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    /// Exchange the configured client credentials for an upstream access token
    pub async fn get_access_token(&self) -> CatalogResult<String> {
        if self.config.cache_token {
            if let Some(cached) = self.token_cache.read().await.as_ref() {
                if cached.is_fresh(Utc::now()) {
                    return Ok(cached.token.clone());
                }
            }
        }

        let token = self.request_access_token().await?;

        if self.config.cache_token {
            if let Some(expires_at) = token.expires_at {
                *self.token_cache.write().await = Some(CachedToken {
                    token: token.token.clone(),
                    expires_at,
                });
            }
        }

        Ok(token.token)
    }

    async fn request_access_token(&self) -> CatalogResult<XappToken> {
        debug!("Requesting catalog access token");

        let url = self.endpoint(&["tokens", "xapp_token"])?;
        let response = self
            .http
            .post(url)
            .query(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| CatalogError::Auth(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Auth(format!("token endpoint returned {}", status)));
        }

        response
            .json::<XappToken>()
            .await
            .map_err(|e| CatalogError::Auth(e.to_string()))
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        context: &'static str,
        url: Url,
        query: &[(&str, &str)],
    ) -> CatalogResult<T> {
        let token = self.get_access_token().await?;

        let upstream = |detail: String| CatalogError::Upstream { context, detail };

        let response = self
            .http
            .get(url)
            .header("X-Xapp-Token", token)
            .query(query)
            .send()
            .await
            .map_err(|e| upstream(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            // Upstream revoked the token early; do not reuse it.
            *self.token_cache.write().await = None;
        }
        if !status.is_success() {
            return Err(upstream(format!("upstream returned {}", status)));
        }

        response.json::<T>().await.map_err(|e| upstream(e.to_string()))
    }

    /// Search artists by free text
    pub async fn search_artists(&self, query: &str) -> CatalogResult<Vec<ArtistSummary>> {
        let query = required(query, "Empty query")?;
        info!("Searching catalog for: {}", query);

        let url = self.endpoint(&["search"])?;
        let page: SearchPage = self
            .fetch(
                "Search request failed",
                url,
                &[("q", query), ("size", PAGE_SIZE), ("type", "artist")],
            )
            .await?;

        Ok(page.into_artists())
    }

    /// Fetch one artist's details
    pub async fn get_artist_details(&self, artist_id: &str) -> CatalogResult<ArtistDetail> {
        let artist_id = required(artist_id, "Missing artist id")?;

        let url = self.endpoint(&["artists", artist_id])?;
        let artist: UpstreamArtist = self
            .fetch("Failed to fetch artist details", url, &[])
            .await?;

        Ok(artist.into())
    }

    /// Fetch artworks by an artist
    pub async fn get_artworks(&self, artist_id: &str) -> CatalogResult<Vec<Artwork>> {
        let artist_id = required(artist_id, "Missing artist id")?;

        let url = self.endpoint(&["artworks"])?;
        let page: ArtworkPage = self
            .fetch(
                "Failed to fetch artworks",
                url,
                &[("artist_id", artist_id), ("size", PAGE_SIZE)],
            )
            .await?;

        Ok(page.into_artworks())
    }

    /// Fetch the categories of an artwork
    pub async fn get_genes(&self, artwork_id: &str) -> CatalogResult<Vec<Gene>> {
        let artwork_id = required(artwork_id, "Missing artwork id")?;

        let url = self.endpoint(&["genes"])?;
        let page: GenePage = self
            .fetch(
                "Failed to fetch genes",
                url,
                &[("artwork_id", artwork_id), ("size", PAGE_SIZE)],
            )
            .await?;

        Ok(page.into_genes())
    }

    /// Fetch artists similar to the given one
    pub async fn get_similar_artists(&self, artist_id: &str) -> CatalogResult<Vec<ArtistSummary>> {
        let artist_id = required(artist_id, "Missing artist id")?;

        let url = self.endpoint(&["artists"])?;
        let page: ArtistPage = self
            .fetch(
                "Failed to fetch similar artists",
                url,
                &[("similar_to_artist_id", artist_id), ("size", PAGE_SIZE)],
            )
            .await?;

        Ok(page.into_artists())
    }
}

fn required<'a>(value: &'a str, message: &str) -> CatalogResult<&'a str> {
    crate::validation::require(value, "")
        .map_err(|_| CatalogError::Validation(message.to_string()))
}
