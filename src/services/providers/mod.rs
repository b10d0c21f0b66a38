/// Content source abstraction
///
/// Each of the dashboard's three content types comes from its own source.
/// Sources normalize what they fetch (stable ids, category tags) before
/// handing it back, and may fail independently; callers degrade a failed
/// source to an empty list.
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{MovieItem, NewsItem, SocialPost},
};

pub mod mock_news;
pub mod mock_social;
pub mod news_api;
pub mod omdb;

pub use mock_social::MockSocialProvider;
pub use news_api::NewsApiProvider;
pub use omdb::OmdbProvider;

/// News categories the upstream headline endpoint understands
pub const SUPPORTED_NEWS_CATEGORIES: [&str; 7] = [
    "business",
    "entertainment",
    "general",
    "health",
    "science",
    "sports",
    "technology",
];

/// Genres searched when the user has not picked any
pub const DEFAULT_MOVIE_GENRES: [&str; 3] = ["action", "comedy", "drama"];

/// Maps requested categories onto the supported set
///
/// An empty request means every supported category. If none of the requested
/// categories is supported, `general` is used instead.
pub fn resolve_news_categories(requested: &[String]) -> Vec<String> {
    if requested.is_empty() {
        return SUPPORTED_NEWS_CATEGORIES.iter().map(|c| c.to_string()).collect();
    }

    let supported: Vec<String> = requested
        .iter()
        .filter(|c| SUPPORTED_NEWS_CATEGORIES.contains(&c.as_str()))
        .cloned()
        .collect();

    if supported.is_empty() {
        tracing::info!(requested = ?requested, "No supported news category requested, using general");
        vec!["general".to_string()]
    } else {
        supported
    }
}

/// Genres to search, falling back to the defaults for an empty selection
pub fn resolve_movie_genres(requested: &[String]) -> Vec<String> {
    if requested.is_empty() {
        DEFAULT_MOVIE_GENRES.iter().map(|g| g.to_string()).collect()
    } else {
        requested.to_vec()
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait NewsSource: Send + Sync {
    /// Headlines for the given categories, each article tagged with its category
    async fn fetch_news(&self, categories: &[String]) -> AppResult<Vec<NewsItem>>;

    /// Articles matching `query` by relevance, tagged `search`
    async fn search_news(&self, query: &str) -> AppResult<Vec<NewsItem>>;

    /// Most popular articles of the last `window_days` days, tagged `trending`
    async fn fetch_trending(&self, window_days: u32, language: &str) -> AppResult<Vec<NewsItem>>;

    /// Source name for logging and error banners
    fn name(&self) -> &'static str;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieSource: Send + Sync {
    /// Listings for the given genres, each tagged with the genre it was found under
    async fn fetch_movies(&self, genres: &[String]) -> AppResult<Vec<MovieItem>>;

    /// Listings whose title matches `query`, tagged `search`
    async fn search_movies(&self, query: &str) -> AppResult<Vec<MovieItem>>;

    fn name(&self) -> &'static str;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SocialSource: Send + Sync {
    /// Posts in the given topics; an empty list means every topic
    async fn fetch_posts(&self, categories: &[String]) -> AppResult<Vec<SocialPost>>;

    /// Posts whose title or body contains `query`, tagged `search`
    async fn search_posts(&self, query: &str) -> AppResult<Vec<SocialPost>>;

    fn name(&self) -> &'static str;
}

/// The three content sources, shared by aggregation, search and trending
#[derive(Clone)]
pub struct Sources {
    pub news: Arc<dyn NewsSource>,
    pub movies: Arc<dyn MovieSource>,
    pub social: Arc<dyn SocialSource>,
}

impl Sources {
    pub fn new(
        news: Arc<dyn NewsSource>,
        movies: Arc<dyn MovieSource>,
        social: Arc<dyn SocialSource>,
    ) -> Self {
        Self {
            news,
            movies,
            social,
        }
    }
}
