use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{ContentId, ContentItem};

/// How the dashboard lays out cards
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Grid,
    List,
}

/// Everything the dashboard remembers between sessions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UserPreferences {
    /// Selected news categories
    pub categories: Vec<String>,
    /// Selected movie genres
    pub movie_genres: Vec<String>,
    /// Selected social post topics
    pub social_categories: Vec<String>,
    pub layout: Layout,
    /// Favorite items keyed by their id, in the order they were starred
    pub favorites: Vec<ContentItem>,
    /// User-defined display order; may mention ids that no longer exist
    pub content_order: Vec<ContentId>,
    /// Remembered page size per section key
    pub page_sizes: BTreeMap<String, usize>,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self::new()
    }
}

impl UserPreferences {
    /// Creates the first-session defaults
    pub fn new() -> Self {
        Self {
            categories: vec![
                "technology".to_string(),
                "sports".to_string(),
                "entertainment".to_string(),
            ],
            movie_genres: vec![
                "action".to_string(),
                "comedy".to_string(),
                "drama".to_string(),
            ],
            social_categories: vec![
                "Technology".to_string(),
                "Humor & Relatable Moments".to_string(),
            ],
            layout: Layout::Grid,
            favorites: Vec::new(),
            content_order: Vec::new(),
            page_sizes: BTreeMap::new(),
        }
    }

    pub fn is_favorite(&self, id: &ContentId) -> bool {
        self.favorites.iter().any(|item| item.id() == id)
    }

    /// Adds the item to favorites, or removes it if it is already there.
    /// Returns whether the item is a favorite afterwards.
    pub fn toggle_favorite(&mut self, item: ContentItem) -> bool {
        if let Some(pos) = self.favorites.iter().position(|f| f.id() == item.id()) {
            self.favorites.remove(pos);
            false
        } else {
            self.favorites.push(item);
            true
        }
    }

    /// Page size remembered for a section, or `default` when none was set
    ///
    /// A stored size of zero is unusable and also yields `default`.
    pub fn page_size_for(&self, section: &str, default: usize) -> usize {
        self.page_sizes
            .get(section)
            .copied()
            .filter(|&size| size > 0)
            .unwrap_or(default)
    }

    pub fn set_page_size(&mut self, section: &str, page_size: usize) {
        self.page_sizes.insert(section.to_string(), page_size);
    }
}
