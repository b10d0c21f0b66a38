//! Debounced cross-source search.
//!
//! Every submission takes a new generation. A scheduled search only runs if
//! its generation is still the latest when the debounce delay expires, and its
//! results are only applied if it is still the latest when they arrive, so a
//! slow response to an old query can never overwrite a newer one.
use serde::Serialize;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::sync::RwLock;

use crate::{
    models::{ContentItem, SEARCH_CATEGORY},
    services::{
        aggregator::{degrade, SourceError},
        normalize::dedupe_items,
        providers::Sources,
    },
};

/// What the search box currently shows
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<ContentItem>,
    pub loading: bool,
    pub error: Option<String>,
}

impl SearchState {
    pub fn is_active(&self) -> bool {
        !self.query.trim().is_empty()
    }
}

/// Merged results of one search fan-out
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResults {
    pub items: Vec<ContentItem>,
    pub errors: Vec<SourceError>,
}

impl SearchResults {
    /// Message to show when no source could answer
    fn failure_message(&self) -> Option<String> {
        if self.errors.len() < 3 {
            return None;
        }
        let sources: Vec<&str> = self.errors.iter().map(|e| e.source.as_str()).collect();
        Some(format!("Search failed for {}", sources.join(", ")))
    }
}

struct SearchInner {
    sources: Sources,
    debounce: Duration,
    generation: AtomicU64,
    state: RwLock<SearchState>,
}

#[derive(Clone)]
pub struct SearchCoordinator {
    inner: Arc<SearchInner>,
}

impl SearchCoordinator {
    pub fn new(sources: Sources, debounce: Duration) -> Self {
        Self {
            inner: Arc::new(SearchInner {
                sources,
                debounce,
                generation: AtomicU64::new(0),
                state: RwLock::new(SearchState::default()),
            }),
        }
    }

    /// Records `query` and schedules its search; returns the submission's generation
    ///
    /// A blank query clears the results at once and cancels anything pending.
    pub async fn submit(&self, query: impl Into<String>) -> u64 {
        let query = query.into();

        // Generation and query text change together under the state lock
        let generation = {
            let mut state = self.inner.state.write().await;
            let generation = self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
            state.query = query.clone();
            state.error = None;
            if query.trim().is_empty() {
                state.results.clear();
                state.loading = false;
                return generation;
            }
            state.loading = true;
            generation
        };

        let coordinator = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(coordinator.inner.debounce).await;
            if !coordinator.is_current(generation) {
                tracing::debug!(generation = generation, "Search superseded before dispatch");
                return;
            }

            let results = coordinator.search_now(&query).await;

            let mut state = coordinator.inner.state.write().await;
            if !coordinator.is_current(generation) {
                tracing::debug!(
                    generation = generation,
                    query = %query,
                    "Discarding results of superseded search"
                );
                return;
            }
            state.error = results.failure_message();
            state.results = results.items;
            state.loading = false;
        });

        generation
    }

    pub async fn clear(&self) {
        self.submit(String::new()).await;
    }

    pub async fn state(&self) -> SearchState {
        self.inner.state.read().await.clone()
    }

    pub async fn is_active(&self) -> bool {
        self.inner.state.read().await.is_active()
    }

    fn is_current(&self, generation: u64) -> bool {
        self.inner.generation.load(Ordering::Acquire) == generation
    }

    /// Searches every source immediately, without touching the search state
    pub async fn search_now(&self, query: &str) -> SearchResults {
        let query = query.trim();
        if query.is_empty() {
            return SearchResults::default();
        }

        let sources = &self.inner.sources;
        let (news, movies, social) = tokio::join!(
            sources.news.search_news(query),
            sources.movies.search_movies(query),
            sources.social.search_posts(query),
        );

        let mut errors = Vec::new();
        let news = degrade(sources.news.name(), news, &mut errors);
        let movies = degrade(sources.movies.name(), movies, &mut errors);
        let social = degrade(sources.social.name(), social, &mut errors);

        let merged = news
            .into_iter()
            .map(ContentItem::from)
            .chain(movies.into_iter().map(ContentItem::from))
            .chain(social.into_iter().map(ContentItem::from))
            .map(|item| item.with_category(SEARCH_CATEGORY))
            .collect();
        let items = dedupe_items(merged);

        tracing::info!(
            query = %query,
            results = items.len(),
            failed_sources = errors.len(),
            "Search completed"
        );

        SearchResults { items, errors }
    }
}
