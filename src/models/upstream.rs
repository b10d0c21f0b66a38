//! Raw response shapes of the upstream content APIs.
//!
//! These structs only describe the wire format; conversion into the
//! dashboard's item types lives in `services::normalize`.
use serde::{Deserialize, Serialize};

// ============================================================================
// News API Types
// ============================================================================

/// Response envelope of the `/top-headlines` and `/everything` endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsApiResponse {
    pub status: String,
    #[serde(default)]
    pub total_results: Option<u32>,
    #[serde(default)]
    pub articles: Vec<NewsApiArticle>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl NewsApiResponse {
    pub fn is_error(&self) -> bool {
        self.status == "error"
    }

    pub fn is_rate_limited(&self) -> bool {
        self.code.as_deref() == Some("rateLimited")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsApiSource {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsApiArticle {
    pub source: NewsApiSource,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

// ============================================================================
// OMDB API Types
// ============================================================================

/// Response of a `?s=` search request
#[derive(Debug, Clone, Deserialize)]
pub struct OmdbSearchResponse {
    #[serde(rename = "Search", default)]
    pub search: Vec<OmdbSearchHit>,
    #[serde(rename = "totalResults", default)]
    pub total_results: Option<String>,
    #[serde(rename = "Response")]
    pub response: String,
    #[serde(rename = "Error", default)]
    pub error: Option<String>,
}

impl OmdbSearchResponse {
    pub fn is_success(&self) -> bool {
        self.response == "True"
    }

    pub fn total(&self) -> u32 {
        self.total_results
            .as_deref()
            .and_then(|t| t.parse().ok())
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OmdbSearchHit {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Type")]
    pub item_type: String,
    #[serde(rename = "Poster", default)]
    pub poster: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OmdbRating {
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Value")]
    pub value: String,
}

/// Response of an `?i=` or `?t=` detail request
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct OmdbDetails {
    pub response: String,
    pub poster: Option<String>,
    pub runtime: Option<String>,
    pub genre: Option<String>,
    pub director: Option<String>,
    pub writer: Option<String>,
    pub actors: Option<String>,
    pub plot: Option<String>,
    pub language: Option<String>,
    pub country: Option<String>,
    pub rated: Option<String>,
    pub released: Option<String>,
    pub awards: Option<String>,
    #[serde(default)]
    pub ratings: Vec<OmdbRating>,
    #[serde(rename = "imdbRating")]
    pub imdb_rating: Option<String>,
    pub metascore: Option<String>,
    pub box_office: Option<String>,
}

impl OmdbDetails {
    pub fn is_success(&self) -> bool {
        self.response == "True"
    }

    /// A lookup by IMDB id is only trusted when the fields the dashboard
    /// renders are all present; otherwise the title lookup is attempted.
    pub fn is_complete(&self) -> bool {
        self.is_success()
            && self.poster.is_some()
            && self.runtime.is_some()
            && self.genre.is_some()
            && self.imdb_rating.is_some()
            && self.plot.is_some()
    }
}
