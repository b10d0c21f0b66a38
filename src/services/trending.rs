use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{
    error::{AppError, AppResult},
    models::{ContentItem, ContentSet, MovieItem, NewsItem, SocialPost},
    services::{aggregator::SourceError, providers::NewsSource},
};

pub const DEFAULT_WINDOW_DAYS: u32 = 7;
pub const DEFAULT_LANGUAGE: &str = "en";
/// Trending movies were released in the current year or the four before it
const RECENT_MOVIE_YEARS: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendingTab {
    News,
    Movies,
    Posts,
}

impl TrendingTab {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendingTab::News => "news",
            TrendingTab::Movies => "movies",
            TrendingTab::Posts => "posts",
        }
    }

    /// Key under which the tab's page size is remembered
    pub fn section_key(&self) -> String {
        format!("trending:{}", self.as_str())
    }
}

impl FromStr for TrendingTab {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "news" => Ok(TrendingTab::News),
            "movies" => Ok(TrendingTab::Movies),
            "posts" => Ok(TrendingTab::Posts),
            other => Err(AppError::NotFound(format!("Unknown trending tab '{}'", other))),
        }
    }
}

/// Popular articles of the last `window_days` days
///
/// A failing source yields an empty list and the error for the banner.
pub async fn trending_news(
    source: &dyn NewsSource,
    window_days: u32,
    language: &str,
) -> (Vec<NewsItem>, Option<SourceError>) {
    match source.fetch_trending(window_days, language).await {
        Ok(items) => (items, None),
        Err(e) => {
            tracing::warn!(window_days = window_days, language = %language, error = %e, "Trending news unavailable");
            (Vec::new(), Some(SourceError::new(source.name(), &e)))
        }
    }
}

/// Recent movies, highest IMDB rating first
///
/// Unrated movies follow the rated ones; ties keep their fetch order.
pub fn trending_movies(movies: &[MovieItem], current_year: i32) -> Vec<MovieItem> {
    let earliest = current_year - (RECENT_MOVIE_YEARS - 1);

    let mut recent: Vec<MovieItem> = movies
        .iter()
        .filter(|m| {
            m.release_year()
                .is_some_and(|year| (earliest..=current_year).contains(&year))
        })
        .cloned()
        .collect();

    recent.sort_by(|a, b| match (a.rating_value(), b.rating_value()) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    recent
}

/// Posts flagged as trending, whatever topic they belong to
pub fn trending_posts(posts: &[SocialPost]) -> Vec<SocialPost> {
    posts.iter().filter(|p| p.trending).cloned().collect()
}

/// Items of a snapshot-derived tab; news is fetched separately
pub fn snapshot_tab(tab: TrendingTab, content: &ContentSet) -> AppResult<Vec<ContentItem>> {
    match tab {
        TrendingTab::Movies => Ok(trending_movies(&content.movies, Utc::now().year())
            .into_iter()
            .map(ContentItem::from)
            .collect()),
        TrendingTab::Posts => Ok(trending_posts(&content.social)
            .into_iter()
            .map(ContentItem::from)
            .collect()),
        TrendingTab::News => Err(AppError::Internal(
            "Trending news is not derived from the snapshot".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{movie, news, post};
    use crate::services::providers::MockNewsSource;

    fn rated(id: &str, year: &str, rating: Option<&str>) -> MovieItem {
        MovieItem {
            imdb_rating: rating.map(String::from),
            ..movie(id, "action", year)
        }
    }

    #[test]
    fn test_tab_parsing() {
        assert_eq!("posts".parse::<TrendingTab>().unwrap(), TrendingTab::Posts);
        assert!(matches!("weather".parse::<TrendingTab>(), Err(AppError::NotFound(_))));
        assert_eq!(TrendingTab::Movies.section_key(), "trending:movies");
    }

    #[test]
    fn test_movies_within_five_years_by_rating() {
        let movies = vec![
            rated("old", "2015", Some("9.9")),
            rated("mid", "2021", Some("7.0")),
            rated("new", "2024", Some("8.4")),
            rated("unrated", "2023", Some("N/A")),
            rated("series", "2020-2022", Some("8.0")),
            rated("edge", "2020", Some("6.0")),
        ];

        let trending = trending_movies(&movies, 2024);
        let ids: Vec<&str> = trending.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "series", "mid", "edge", "unrated"]);
    }

    #[test]
    fn test_posts_flagged_trending() {
        let posts = vec![post(1, "Fitness", true), post(2, "Travel & Lifestyle", false), post(3, "Technology", true)];
        let ids: Vec<String> = trending_posts(&posts).iter().map(|p| p.id.to_string()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_news_tab_is_not_snapshot_derived() {
        assert!(snapshot_tab(TrendingTab::News, &ContentSet::default()).is_err());
        assert!(snapshot_tab(TrendingTab::Posts, &ContentSet::default()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_trending_news_failure_is_degraded() {
        let mut source = MockNewsSource::new();
        source
            .expect_fetch_trending()
            .returning(|_, _| Err(AppError::ExternalApi("rate limited".to_string())));
        source.expect_name().return_const("news");

        let (items, error) = trending_news(&source, 7, "en").await;
        assert!(items.is_empty());
        assert_eq!(error.unwrap().source, "news");
    }

    #[tokio::test]
    async fn test_trending_news_passes_window() {
        let mut source = MockNewsSource::new();
        source
            .expect_fetch_trending()
            .withf(|days: &u32, language: &str| *days == 3 && language == "de")
            .returning(|_, _| Ok(vec![news("t1", "trending")]));

        let (items, error) = trending_news(&source, 3, "de").await;
        assert_eq!(items.len(), 1);
        assert!(error.is_none());
    }
}
