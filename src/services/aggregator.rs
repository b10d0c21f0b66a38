//! Fetch-all aggregation over the three content sources.
//!
//! A refresh runs the news, movie and social fetches concurrently. A source
//! that fails contributes nothing and leaves an error banner behind; the other
//! two still land. Only one refresh runs at a time, and a snapshot is only ever
//! replaced by one from a newer generation.
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::sync::RwLock;

use crate::{
    error::AppError,
    models::ContentSet,
    services::{filter::ContentSelection, providers::Sources},
};

/// A source that failed during the last refresh
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceError {
    pub source: String,
    pub message: String,
    pub occurred_at: DateTime<Utc>,
}

impl SourceError {
    pub fn new(source: &str, error: &AppError) -> Self {
        Self {
            source: source.to_string(),
            message: error.to_string(),
            occurred_at: Utc::now(),
        }
    }
}

/// Result of asking for a refresh
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RefreshOutcome {
    Completed {
        generation: u64,
        news: usize,
        movies: usize,
        social: usize,
        errors: Vec<SourceError>,
    },
    /// Another refresh was already running
    Skipped,
}

/// Content from one completed refresh
#[derive(Debug, Clone, Default)]
pub struct ContentSnapshot {
    pub generation: u64,
    pub content: ContentSet,
    pub fetched_at: Option<DateTime<Utc>>,
}

/// Clears the in-flight flag when the refresh ends, however it ends
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

struct AggregatorInner {
    sources: Sources,
    in_flight: AtomicBool,
    generation: AtomicU64,
    /// Token of the most recently scheduled debounced refresh
    scheduled: AtomicU64,
    snapshot: RwLock<ContentSnapshot>,
    errors: RwLock<Vec<SourceError>>,
}

#[derive(Clone)]
pub struct Aggregator {
    inner: Arc<AggregatorInner>,
}

impl Aggregator {
    pub fn new(sources: Sources) -> Self {
        Self {
            inner: Arc::new(AggregatorInner {
                sources,
                in_flight: AtomicBool::new(false),
                generation: AtomicU64::new(0),
                scheduled: AtomicU64::new(0),
                snapshot: RwLock::new(ContentSnapshot::default()),
                errors: RwLock::new(Vec::new()),
            }),
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.inner.in_flight.load(Ordering::Acquire)
    }

    /// Fetches every source for `selection` and stores the result
    pub async fn refresh(&self, selection: &ContentSelection) -> RefreshOutcome {
        if self
            .inner
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::info!("Refresh already in flight, skipping");
            return RefreshOutcome::Skipped;
        }
        let _guard = InFlightGuard(&self.inner.in_flight);

        let generation = self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let sources = &self.inner.sources;

        tracing::info!(
            generation = generation,
            categories = ?selection.categories,
            movie_genres = ?selection.movie_genres,
            "Refreshing content"
        );

        let (news, movies, social) = tokio::join!(
            sources.news.fetch_news(&selection.categories),
            sources.movies.fetch_movies(&selection.movie_genres),
            sources.social.fetch_posts(&[]),
        );

        let mut errors = Vec::new();
        let news = degrade(sources.news.name(), news, &mut errors);
        let movies = degrade(sources.movies.name(), movies, &mut errors);
        let social = degrade(sources.social.name(), social, &mut errors);

        let outcome = RefreshOutcome::Completed {
            generation,
            news: news.len(),
            movies: movies.len(),
            social: social.len(),
            errors: errors.clone(),
        };

        {
            let mut snapshot = self.inner.snapshot.write().await;
            if generation > snapshot.generation {
                *snapshot = ContentSnapshot {
                    generation,
                    content: ContentSet {
                        news,
                        movies,
                        social,
                    },
                    fetched_at: Some(Utc::now()),
                };
            } else {
                tracing::debug!(generation = generation, current = snapshot.generation, "Discarding stale refresh");
            }
        }
        *self.inner.errors.write().await = errors;

        tracing::info!(outcome = ?outcome, "Refresh completed");
        outcome
    }

    /// Refreshes after `delay` unless another refresh is scheduled meanwhile
    pub fn schedule_refresh(&self, selection: ContentSelection, delay: Duration) {
        let token = self.inner.scheduled.fetch_add(1, Ordering::AcqRel) + 1;
        let aggregator = self.clone();

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if aggregator.inner.scheduled.load(Ordering::Acquire) != token {
                tracing::debug!(token = token, "Scheduled refresh superseded");
                return;
            }
            aggregator.refresh(&selection).await;
        });
    }

    pub async fn snapshot(&self) -> ContentSnapshot {
        self.inner.snapshot.read().await.clone()
    }

    pub async fn errors(&self) -> Vec<SourceError> {
        self.inner.errors.read().await.clone()
    }

    pub async fn dismiss_errors(&self) {
        self.inner.errors.write().await.clear();
    }
}

/// Unwraps a source result, turning a failure into an empty list and a banner
pub(crate) fn degrade<T>(source: &str, result: Result<Vec<T>, AppError>, errors: &mut Vec<SourceError>) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(source = %source, error = %e, "Source fetch failed");
            errors.push(SourceError::new(source, &e));
            Vec::new()
        }
    }
}
