/// OMDB provider
///
/// Genre listings are title searches on the genre name, up to five pages of
/// ten per genre. Every listing is enriched with a detail lookup by IMDB id,
/// retried by title when the id lookup is incomplete.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{
        upstream::{OmdbDetails, OmdbSearchResponse},
        MovieItem, SEARCH_CATEGORY,
    },
    services::{
        normalize::{dedupe_movies, enrich_movie, movie_from_hit, sort_by_year_desc},
        providers::{resolve_movie_genres, MovieSource},
    },
};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const MOVIE_CACHE_TTL: u64 = 3600; // 1 hour
const RESULTS_PER_PAGE: u32 = 10;
const MAX_PAGES_PER_GENRE: u32 = 5;
const MAX_MOVIES: usize = 100;

/// One enriched search page and the upstream's total hit count
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SearchPage {
    total_results: u32,
    movies: Vec<MovieItem>,
}

#[derive(Clone)]
pub struct OmdbProvider {
    http_client: HttpClient,
    api_key: Option<String>,
    api_url: String,
    cache: Option<Cache>,
}

impl OmdbProvider {
    pub fn new(
        api_key: Option<String>,
        api_url: String,
        timeout: Duration,
        cache: Option<Cache>,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        let api_key = api_key.filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            tracing::warn!("No OMDB API key configured, movies will be unavailable");
        }

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        })
    }

    fn api_key(&self) -> AppResult<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| AppError::ExternalApi("OMDB API key is not configured".to_string()))
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, params: &[(&str, String)]) -> AppResult<T> {
        let response = self
            .http_client
            .get(format!("{}/", self.api_url))
            .query(&[("apikey", self.api_key()?)])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "OMDB API returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    /// Searches one page and enriches every hit, tagging them `category`
    async fn search_page(&self, term: &str, page: u32, category: &str) -> AppResult<SearchPage> {
        let params = [
            ("s", term.to_string()),
            ("type", "movie".to_string()),
            ("page", page.to_string()),
        ];
        let response: OmdbSearchResponse = self.get(&params).await?;

        if !response.is_success() {
            tracing::debug!(
                term = %term,
                page = page,
                error = response.error.as_deref().unwrap_or("unknown"),
                "OMDB search returned no results"
            );
            return Ok(SearchPage {
                total_results: 0,
                movies: Vec::new(),
            });
        }

        let total_results = response.total();
        let movies = response
            .search
            .into_iter()
            .map(|hit| movie_from_hit(hit, category))
            .collect();

        Ok(SearchPage {
            total_results,
            movies: self.enrich_all(movies).await,
        })
    }

    async fn genre_page(&self, genre: String, page: u32) -> AppResult<SearchPage> {
        cached!(
            self.cache,
            CacheKey::MovieGenre {
                genre: genre.clone(),
                page,
            },
            MOVIE_CACHE_TTL,
            self.search_page(&genre, page, &genre)
        )
    }

    /// Every page of one genre, capped at five
    async fn fetch_genre(&self, genre: String) -> AppResult<Vec<MovieItem>> {
        let first = self.genre_page(genre.clone(), 1).await?;
        let pages = first
            .total_results
            .div_ceil(RESULTS_PER_PAGE)
            .min(MAX_PAGES_PER_GENRE);

        let mut movies = first.movies;
        let mut tasks = Vec::new();
        for page in 2..=pages {
            let provider = self.clone();
            let genre = genre.clone();
            tasks.push(tokio::spawn(async move { provider.genre_page(genre, page).await }));
        }

        for task in tasks {
            match task.await {
                Ok(Ok(page)) => movies.extend(page.movies),
                Ok(Err(e)) => {
                    tracing::warn!(genre = %genre, error = %e, "Failed to fetch movie page");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Movie page task panicked");
                }
            }
        }

        tracing::info!(
            genre = %genre,
            pages = pages,
            movies = movies.len(),
            provider = "omdb",
            "Genre listings fetched"
        );

        Ok(movies)
    }

    /// Detail lookup by IMDB id, falling back to a title lookup when the id
    /// lookup fails or lacks the fields the dashboard shows
    async fn fetch_details(&self, imdb_id: &str, title: &str) -> Option<OmdbDetails> {
        let by_id: AppResult<OmdbDetails> = cached!(
            self.cache,
            CacheKey::MovieDetails(imdb_id.to_string()),
            MOVIE_CACHE_TTL,
            self.get(&[("i", imdb_id.to_string())])
        );

        let by_id = match by_id {
            Ok(details) if details.is_complete() => return Some(details),
            Ok(details) => Some(details).filter(|d| d.is_success()),
            Err(e) => {
                tracing::debug!(imdb_id = %imdb_id, error = %e, "Detail lookup by id failed");
                None
            }
        };

        let by_title: AppResult<OmdbDetails> = cached!(
            self.cache,
            CacheKey::MovieDetailsByTitle(title.to_string()),
            MOVIE_CACHE_TTL,
            self.get(&[("t", title.to_string())])
        );

        match by_title {
            Ok(details) if details.is_success() => Some(details),
            Ok(_) => by_id,
            Err(e) => {
                tracing::debug!(title = %title, error = %e, "Detail lookup by title failed");
                by_id
            }
        }
    }

    /// Enriches listings concurrently; a failed lookup keeps the bare listing
    async fn enrich_all(&self, movies: Vec<MovieItem>) -> Vec<MovieItem> {
        let mut tasks = Vec::with_capacity(movies.len());
        for movie in movies {
            let provider = self.clone();
            tasks.push(tokio::spawn(async move {
                match provider.fetch_details(&movie.external_id, &movie.title).await {
                    Some(details) => enrich_movie(movie, details),
                    None => movie,
                }
            }));
        }

        let mut enriched = Vec::with_capacity(tasks.len());
        for task in tasks {
            match task.await {
                Ok(movie) => enriched.push(movie),
                Err(e) => tracing::error!(error = %e, "Movie detail task panicked"),
            }
        }
        enriched
    }
}

#[async_trait::async_trait]
impl MovieSource for OmdbProvider {
    async fn fetch_movies(&self, genres: &[String]) -> AppResult<Vec<MovieItem>> {
        self.api_key()?;
        let genres = resolve_movie_genres(genres);

        let mut tasks = Vec::with_capacity(genres.len());
        for genre in &genres {
            let provider = self.clone();
            let genre = genre.clone();
            tasks.push(tokio::spawn(async move {
                let result = provider.fetch_genre(genre.clone()).await;
                (genre, result)
            }));
        }

        let mut movies = Vec::new();
        for task in tasks {
            match task.await {
                Ok((_, Ok(items))) => movies.extend(items),
                Ok((genre, Err(e))) => {
                    tracing::warn!(genre = %genre, error = %e, "Failed to fetch genre");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Genre fetch task panicked");
                }
            }
        }

        let mut movies = dedupe_movies(movies);
        sort_by_year_desc(&mut movies);
        movies.truncate(MAX_MOVIES);

        Ok(movies)
    }

    async fn search_movies(&self, query: &str) -> AppResult<Vec<MovieItem>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.api_key()?;

        let page: SearchPage = cached!(
            self.cache,
            CacheKey::MovieSearch(query.to_string()),
            MOVIE_CACHE_TTL,
            self.search_page(query, 1, SEARCH_CATEGORY)
        )?;

        let mut movies = dedupe_movies(page.movies);
        sort_by_year_desc(&mut movies);

        tracing::info!(
            query = %query,
            results = movies.len(),
            provider = "omdb",
            "Movie search completed"
        );

        Ok(movies)
    }

    fn name(&self) -> &'static str {
        "movies"
    }
}
