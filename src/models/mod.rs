use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod upstream;
pub mod user_preferences;

pub use user_preferences::{Layout, UserPreferences};

/// Normalized identifier shared by every content variant
///
/// Sources hand out ids of different shapes (UUIDs, IMDB ids, post numbers);
/// they are all converted to strings at ingestion so filtering and ordering
/// never branch on the id type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ContentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ContentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for ContentId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// Category assigned to every item returned by a search
pub const SEARCH_CATEGORY: &str = "search";
/// Category assigned to every article returned by a trending fetch
pub const TRENDING_CATEGORY: &str = "trending";

/// Which of the three sources an item came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    News,
    Movie,
    Social,
}

impl Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentKind::News => write!(f, "news"),
            ContentKind::Movie => write!(f, "movie"),
            ContentKind::Social => write!(f, "social"),
        }
    }
}

/// Publisher of a news article
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArticleSource {
    pub id: Option<String>,
    pub name: String,
}

/// A news article
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsItem {
    pub id: ContentId,
    pub source: ArticleSource,
    pub author: Option<String>,
    pub title: String,
    pub description: String,
    pub url: String,
    pub image_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub content: Option<String>,
    pub category: String,
}

/// A single third-party rating of a movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieRating {
    pub source: String,
    pub value: String,
}

/// A movie listing, optionally enriched with detail fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MovieItem {
    pub id: ContentId,
    pub title: String,
    pub year: String,
    pub poster: Option<String>,
    pub item_type: String,
    pub external_id: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actors: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub released: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub awards: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ratings: Vec<MovieRating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_rating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metascore: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub box_office: Option<String>,
}

impl MovieItem {
    /// Release year as a number; ranges such as "2020-2022" yield their start
    pub fn release_year(&self) -> Option<i32> {
        self.year
            .split(['-', '–'])
            .next()
            .and_then(|y| y.trim().parse().ok())
    }

    /// IMDB rating as a number, `None` for "N/A" or missing ratings
    pub fn rating_value(&self) -> Option<f32> {
        self.imdb_rating.as_deref().and_then(|r| r.parse().ok())
    }
}

/// A mock social media post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SocialPost {
    pub id: ContentId,
    pub user_id: u32,
    pub title: String,
    pub body: String,
    pub image: Option<String>,
    pub username: String,
    pub handle: Option<String>,
    pub avatar: Option<String>,
    pub category: String,
    pub timestamp: DateTime<Utc>,
    pub likes: u32,
    pub comments: u32,
    pub shares: u32,
    #[serde(default)]
    pub trending: bool,
}

/// Any item the dashboard can display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ContentItem {
    News(NewsItem),
    Movie(MovieItem),
    Social(SocialPost),
}

impl ContentItem {
    pub fn id(&self) -> &ContentId {
        match self {
            ContentItem::News(item) => &item.id,
            ContentItem::Movie(item) => &item.id,
            ContentItem::Social(item) => &item.id,
        }
    }

    pub fn category(&self) -> &str {
        match self {
            ContentItem::News(item) => &item.category,
            ContentItem::Movie(item) => &item.category,
            ContentItem::Social(item) => &item.category,
        }
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            ContentItem::News(_) => ContentKind::News,
            ContentItem::Movie(_) => ContentKind::Movie,
            ContentItem::Social(_) => ContentKind::Social,
        }
    }

    /// Re-tags the item, used when search results are merged into one list
    pub fn with_category(mut self, category: &str) -> Self {
        match &mut self {
            ContentItem::News(item) => item.category = category.to_string(),
            ContentItem::Movie(item) => item.category = category.to_string(),
            ContentItem::Social(item) => item.category = category.to_string(),
        }
        self
    }
}

impl From<NewsItem> for ContentItem {
    fn from(item: NewsItem) -> Self {
        ContentItem::News(item)
    }
}

impl From<MovieItem> for ContentItem {
    fn from(item: MovieItem) -> Self {
        ContentItem::Movie(item)
    }
}

impl From<SocialPost> for ContentItem {
    fn from(item: SocialPost) -> Self {
        ContentItem::Social(item)
    }
}

/// The three collections produced by one fetch-all cycle
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContentSet {
    pub news: Vec<NewsItem>,
    pub movies: Vec<MovieItem>,
    pub social: Vec<SocialPost>,
}

impl ContentSet {
    pub fn is_empty(&self) -> bool {
        self.news.is_empty() && self.movies.is_empty() && self.social.is_empty()
    }

    pub fn len(&self) -> usize {
        self.news.len() + self.movies.len() + self.social.len()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn news(id: &str, category: &str) -> NewsItem {
        NewsItem {
            id: ContentId::from(id),
            source: ArticleSource {
                id: None,
                name: "Wire".to_string(),
            },
            author: Some("Reporter".to_string()),
            title: format!("Headline {}", id),
            description: "Summary".to_string(),
            url: format!("https://example.com/{}", id),
            image_url: None,
            published_at: None,
            content: None,
            category: category.to_string(),
        }
    }

    pub fn movie(id: &str, category: &str, year: &str) -> MovieItem {
        MovieItem {
            id: ContentId::from(id),
            title: format!("Movie {}", id),
            year: year.to_string(),
            item_type: "movie".to_string(),
            external_id: id.to_string(),
            category: category.to_string(),
            ..Default::default()
        }
    }

    pub fn post(id: u64, category: &str, trending: bool) -> SocialPost {
        SocialPost {
            id: ContentId::from(id),
            user_id: 1,
            title: String::new(),
            body: format!("Post number {}", id),
            image: None,
            username: "Alice Johnson".to_string(),
            handle: Some("@alicej".to_string()),
            avatar: None,
            category: category.to_string(),
            timestamp: Utc::now(),
            likes: 10,
            comments: 1,
            shares: 1,
            trending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_content_id_display() {
        assert_eq!(format!("{}", ContentId::from(42u64)), "42");
        assert_eq!(ContentId::from("tt0133093").as_str(), "tt0133093");
    }

    #[test]
    fn test_content_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&ContentId::from("abc")).unwrap();
        assert_eq!(json, r#""abc""#);
    }

    #[test]
    fn test_content_item_tagged_by_kind() {
        let item = ContentItem::from(post(3, "Fitness", false));
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["kind"], "social");
        assert_eq!(json["id"], "3");

        let back: ContentItem = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind(), ContentKind::Social);
        assert_eq!(back.category(), "Fitness");
    }

    #[test]
    fn test_with_category_retags_every_variant() {
        let items = vec![
            ContentItem::from(news("a", "sports")),
            ContentItem::from(movie("tt1", "action", "1999")),
            ContentItem::from(post(1, "Technology", true)),
        ];
        for item in items {
            assert_eq!(item.with_category(SEARCH_CATEGORY).category(), "search");
        }
    }

    #[test]
    fn test_release_year_handles_ranges() {
        assert_eq!(movie("tt1", "drama", "2021").release_year(), Some(2021));
        assert_eq!(movie("tt2", "drama", "2020-2022").release_year(), Some(2020));
        assert_eq!(movie("tt3", "drama", "2019–").release_year(), Some(2019));
        assert_eq!(movie("tt4", "drama", "N/A").release_year(), None);
    }

    #[test]
    fn test_rating_value_ignores_not_available() {
        let mut m = movie("tt1", "drama", "2021");
        m.imdb_rating = Some("8.7".to_string());
        assert_eq!(m.rating_value(), Some(8.7));
        m.imdb_rating = Some("N/A".to_string());
        assert_eq!(m.rating_value(), None);
    }
}
