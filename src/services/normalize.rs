use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::hash::Hash;
use uuid::Uuid;

use crate::models::{
    upstream::{NewsApiArticle, OmdbDetails, OmdbSearchHit},
    ArticleSource, ContentId, ContentItem, MovieItem, MovieRating, NewsItem,
};

const DESCRIPTION_FALLBACK_CHARS: usize = 160;
const NOT_AVAILABLE: &str = "N/A";

/// Stable id for an article, derived from its URL
///
/// The same URL always yields the same id, so a saved order keeps pointing at
/// an article across refreshes.
pub fn news_id_for_url(url: &str) -> ContentId {
    ContentId::new(Uuid::new_v5(&Uuid::NAMESPACE_URL, url.as_bytes()).to_string())
}

/// Converts a raw article into a `NewsItem` tagged with `category`
///
/// Returns `None` for articles the dashboard cannot render: no title, no URL,
/// or neither a description nor content.
pub fn normalize_article(article: NewsApiArticle, category: &str) -> Option<NewsItem> {
    let title = non_empty(article.title)?;
    let url = non_empty(article.url)?;
    let content = non_empty(article.content);
    let description = match non_empty(article.description) {
        Some(description) => description,
        None => content
            .as_deref()?
            .chars()
            .take(DESCRIPTION_FALLBACK_CHARS)
            .collect(),
    };

    let published_at = article
        .published_at
        .as_deref()
        .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
        .map(|ts| ts.with_timezone(&Utc));

    Some(NewsItem {
        id: news_id_for_url(&url),
        source: ArticleSource {
            id: article.source.id,
            name: article.source.name,
        },
        author: non_empty(article.author),
        title,
        description,
        url,
        image_url: non_empty(article.url_to_image),
        published_at,
        content,
        category: category.to_string(),
    })
}

pub fn normalize_articles(articles: Vec<NewsApiArticle>, category: &str) -> Vec<NewsItem> {
    articles
        .into_iter()
        .filter_map(|article| normalize_article(article, category))
        .collect()
}

/// Keeps the first article for every URL, preserving order
pub fn dedupe_news_by_url(items: Vec<NewsItem>) -> Vec<NewsItem> {
    dedupe_by(items, |item| item.url.clone())
}

/// Keeps the first listing for every external id
///
/// A movie found under two genre searches would otherwise appear twice with
/// the same id.
pub fn dedupe_movies(items: Vec<MovieItem>) -> Vec<MovieItem> {
    dedupe_by(items, |item| item.external_id.clone())
}

/// Keeps the first item for every id
pub fn dedupe_items(items: Vec<ContentItem>) -> Vec<ContentItem> {
    dedupe_by(items, |item| item.id().clone())
}

fn dedupe_by<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .collect()
}

/// Builds a basic listing from a search hit; `category` is the genre searched for
pub fn movie_from_hit(hit: OmdbSearchHit, category: &str) -> MovieItem {
    MovieItem {
        id: ContentId::new(hit.imdb_id.clone()),
        title: hit.title,
        year: hit.year,
        poster: available(hit.poster),
        item_type: hit.item_type,
        external_id: hit.imdb_id,
        category: category.to_string(),
        ..Default::default()
    }
}

/// Merges detail fields into a listing
pub fn enrich_movie(movie: MovieItem, details: OmdbDetails) -> MovieItem {
    MovieItem {
        poster: available(details.poster).or(movie.poster),
        runtime: details.runtime,
        genre: details.genre,
        director: details.director,
        writer: details.writer,
        actors: details.actors,
        plot: details.plot,
        language: details.language,
        country: details.country,
        rated: details.rated,
        released: details.released,
        awards: details.awards,
        ratings: details
            .ratings
            .into_iter()
            .map(|r| MovieRating {
                source: r.source,
                value: r.value,
            })
            .collect(),
        imdb_rating: details.imdb_rating,
        metascore: details.metascore,
        box_office: details.box_office,
        ..movie
    }
}

/// Most recent first; listings without a parseable year go last
pub fn sort_by_year_desc(movies: &mut [MovieItem]) {
    movies.sort_by(|a, b| b.release_year().cmp(&a.release_year()));
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn available(value: Option<String>) -> Option<String> {
    non_empty(value).filter(|v| v != NOT_AVAILABLE)
}
