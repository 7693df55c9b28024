//! Upstream catalog response schema and its conversion into client shapes
//!
//! Every upstream field is optional; conversions carry absent fields
//! through as absent.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::{ArtistDetail, ArtistSummary, Artwork, Gene};

#[derive(Debug, Default, Deserialize)]
pub struct Link {
    pub href: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Links {
    #[serde(rename = "self")]
    pub self_link: Option<Link>,
    pub thumbnail: Option<Link>,
}

impl Links {
    fn thumbnail(&self) -> Option<String> {
        self.thumbnail.as_ref().and_then(|l| l.href.clone())
    }
}

/// `POST /tokens/xapp_token`
#[derive(Debug, Deserialize)]
pub struct XappToken {
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// `GET /search`
#[derive(Debug, Default, Deserialize)]
pub struct SearchPage {
    #[serde(rename = "_embedded", default)]
    pub embedded: SearchEmbedded,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchEmbedded {
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchHit {
    pub title: Option<String>,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

/// `GET /artists/{id}` and entries of `GET /artists`
#[derive(Debug, Default, Deserialize)]
pub struct UpstreamArtist {
    pub id: Option<String>,
    pub name: Option<String>,
    pub birthday: Option<String>,
    pub deathday: Option<String>,
    pub nationality: Option<String>,
    pub biography: Option<String>,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

/// `GET /artists?similar_to_artist_id=`
#[derive(Debug, Default, Deserialize)]
pub struct ArtistPage {
    #[serde(rename = "_embedded", default)]
    pub embedded: ArtistEmbedded,
}

#[derive(Debug, Default, Deserialize)]
pub struct ArtistEmbedded {
    #[serde(default)]
    pub artists: Vec<UpstreamArtist>,
}

/// `GET /artworks`
#[derive(Debug, Default, Deserialize)]
pub struct ArtworkPage {
    #[serde(rename = "_embedded", default)]
    pub embedded: ArtworkEmbedded,
}

#[derive(Debug, Default, Deserialize)]
pub struct ArtworkEmbedded {
    #[serde(default)]
    pub artworks: Vec<UpstreamArtwork>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpstreamArtwork {
    pub id: Option<String>,
    pub title: Option<String>,
    pub date: Option<String>,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

/// `GET /genes`
#[derive(Debug, Default, Deserialize)]
pub struct GenePage {
    #[serde(rename = "_embedded", default)]
    pub embedded: GeneEmbedded,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeneEmbedded {
    #[serde(default)]
    pub genes: Vec<UpstreamGene>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpstreamGene {
    pub name: Option<String>,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

/// Last non-empty path segment of a link, e.g. the artist id of
/// `https://api.artsy.net/api/artists/4d8b92b34eb68a1b2c0003f4`.
pub fn trailing_segment(href: &str) -> Option<String> {
    href.split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty() && !segment.contains(':'))
        .map(str::to_string)
}

impl SearchHit {
    /// Hits with no self link carry no usable id and are dropped
    pub fn into_summary(self) -> Option<ArtistSummary> {
        let id = self
            .links
            .self_link
            .as_ref()
            .and_then(|l| l.href.as_deref())
            .and_then(trailing_segment)?;

        Some(ArtistSummary {
            id,
            thumbnail: self.links.thumbnail(),
            name: self.title,
        })
    }
}

impl From<UpstreamArtist> for ArtistDetail {
    fn from(artist: UpstreamArtist) -> Self {
        ArtistDetail {
            name: artist.name,
            birthday: artist.birthday,
            deathday: artist.deathday,
            nationality: artist.nationality,
            biography: artist.biography,
        }
    }
}

impl UpstreamArtist {
    pub fn into_summary(self) -> Option<ArtistSummary> {
        let thumbnail = self.links.thumbnail();
        Some(ArtistSummary {
            id: self.id.filter(|id| !id.is_empty())?,
            name: self.name,
            thumbnail,
        })
    }
}

impl UpstreamArtwork {
    pub fn into_artwork(self) -> Option<Artwork> {
        let thumbnail = self.links.thumbnail();
        Some(Artwork {
            id: self.id.filter(|id| !id.is_empty())?,
            title: self.title,
            date: self.date,
            thumbnail,
        })
    }
}

impl From<UpstreamGene> for Gene {
    fn from(gene: UpstreamGene) -> Self {
        let thumbnail = gene.links.thumbnail();
        Gene {
            name: gene.name,
            thumbnail,
        }
    }
}

impl SearchPage {
    pub fn into_artists(self) -> Vec<ArtistSummary> {
        self.embedded
            .results
            .into_iter()
            .filter_map(SearchHit::into_summary)
            .collect()
    }
}

impl ArtistPage {
    pub fn into_artists(self) -> Vec<ArtistSummary> {
        self.embedded
            .artists
            .into_iter()
            .filter_map(UpstreamArtist::into_summary)
            .collect()
    }
}

impl ArtworkPage {
    pub fn into_artworks(self) -> Vec<Artwork> {
        self.embedded
            .artworks
            .into_iter()
            .filter_map(UpstreamArtwork::into_artwork)
            .collect()
    }
}

impl GenePage {
    pub fn into_genes(self) -> Vec<Gene> {
        self.embedded.genes.into_iter().map(Gene::from).collect()
    }
}
