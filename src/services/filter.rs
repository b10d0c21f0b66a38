//! Per-type category filtering.
//!
//! The three content types treat an empty selection differently. An empty
//! news selection hides all news (the dashboard asks the user to pick at
//! least one category), while an empty movie genre or social topic selection
//! shows everything. Both behaviors are intentional.
use serde::{Deserialize, Serialize};

use crate::models::{ContentItem, ContentSet, MovieItem, NewsItem, SocialPost, UserPreferences};

/// The category choices that drive filtering
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentSelection {
    pub categories: Vec<String>,
    pub movie_genres: Vec<String>,
    pub social_categories: Vec<String>,
}

impl From<&UserPreferences> for ContentSelection {
    fn from(prefs: &UserPreferences) -> Self {
        Self {
            categories: prefs.categories.clone(),
            movie_genres: prefs.movie_genres.clone(),
            social_categories: prefs.social_categories.clone(),
        }
    }
}

/// Why a section has nothing to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    /// No news category is selected
    NoCategoriesSelected,
    /// Something is selected but nothing matches it
    NoMatches,
}

/// Content after filtering, still split by type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredContent {
    pub news: Vec<NewsItem>,
    pub movies: Vec<MovieItem>,
    pub social: Vec<SocialPost>,
}

impl FilteredContent {
    /// News, then movies, then social posts
    pub fn all(&self) -> Vec<ContentItem> {
        self.news
            .iter()
            .cloned()
            .map(ContentItem::from)
            .chain(self.movies.iter().cloned().map(ContentItem::from))
            .chain(self.social.iter().cloned().map(ContentItem::from))
            .collect()
    }
}

pub fn filter_news(items: &[NewsItem], categories: &[String]) -> Vec<NewsItem> {
    if categories.is_empty() {
        return Vec::new();
    }
    items
        .iter()
        .filter(|item| categories.contains(&item.category))
        .cloned()
        .collect()
}

pub fn filter_movies(items: &[MovieItem], genres: &[String]) -> Vec<MovieItem> {
    if genres.is_empty() {
        return items.to_vec();
    }
    items
        .iter()
        .filter(|item| genres.contains(&item.category))
        .cloned()
        .collect()
}

pub fn filter_social(items: &[SocialPost], categories: &[String]) -> Vec<SocialPost> {
    if categories.is_empty() {
        return items.to_vec();
    }
    items
        .iter()
        .filter(|item| categories.contains(&item.category))
        .cloned()
        .collect()
}

pub fn filter_content(content: &ContentSet, selection: &ContentSelection) -> FilteredContent {
    FilteredContent {
        news: filter_news(&content.news, &selection.categories),
        movies: filter_movies(&content.movies, &selection.movie_genres),
        social: filter_social(&content.social, &selection.social_categories),
    }
}

/// Explains an empty news result, `None` when there is something to show
pub fn news_empty_reason(filtered: &[NewsItem], selection: &ContentSelection) -> Option<EmptyReason> {
    if !filtered.is_empty() {
        None
    } else if selection.categories.is_empty() {
        Some(EmptyReason::NoCategoriesSelected)
    } else {
        Some(EmptyReason::NoMatches)
    }
}
