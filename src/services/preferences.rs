//! Live user preferences.
//!
//! The in-memory copy is authoritative. Every mutation updates it, broadcasts
//! a [`PreferencesChanged`] event and queues the new document for the
//! background writer. A failed write is logged and otherwise ignored.
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, RwLock};
use tokio::task::JoinHandle;

use crate::{
    db::PreferencesStore,
    error::AppResult,
    models::{ContentId, ContentItem, Layout, UserPreferences},
    services::pagination::validate_page_size,
};

const EVENT_CAPACITY: usize = 64;

/// Which part of the preferences a mutation touched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "section", rename_all = "snake_case")]
pub enum PreferenceChange {
    Categories,
    MovieGenres,
    SocialCategories,
    Layout,
    Favorites,
    ContentOrder,
    PageSize(String),
    Reset,
}

impl PreferenceChange {
    /// Whether the change alters what has to be fetched
    pub fn affects_content(&self) -> bool {
        matches!(
            self,
            PreferenceChange::Categories
                | PreferenceChange::MovieGenres
                | PreferenceChange::SocialCategories
                | PreferenceChange::Reset
        )
    }
}

#[derive(Debug, Clone)]
pub struct PreferencesChanged {
    pub change: PreferenceChange,
    pub preferences: UserPreferences,
}

/// Handle for flushing and stopping the preferences writer
pub struct PreferencesWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl PreferencesWriterHandle {
    /// Writes whatever is still queued, then stops the writer
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Preferences writer task failed");
        }
        tracing::info!("Preferences writer stopped");
    }
}

#[derive(Clone)]
pub struct PreferencesService {
    prefs: Arc<RwLock<UserPreferences>>,
    write_tx: mpsc::UnboundedSender<UserPreferences>,
    events: broadcast::Sender<PreferencesChanged>,
}

impl PreferencesService {
    /// Loads stored preferences and starts the background writer
    ///
    /// Nothing stored, or a document that cannot be read, yields the defaults.
    pub async fn load(store: Arc<dyn PreferencesStore>) -> (Self, PreferencesWriterHandle) {
        let prefs = match store.load().await {
            Ok(Some(prefs)) => {
                tracing::info!(store = store.name(), "Loaded saved preferences");
                prefs
            }
            Ok(None) => {
                tracing::info!(store = store.name(), "No saved preferences, using defaults");
                UserPreferences::new()
            }
            Err(e) => {
                tracing::warn!(store = store.name(), error = %e, "Saved preferences unreadable, using defaults");
                UserPreferences::new()
            }
        };

        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let task = tokio::spawn(Self::writer_task(store, write_rx, shutdown_rx));

        let service = Self {
            prefs: Arc::new(RwLock::new(prefs)),
            write_tx,
            events,
        };

        (service, PreferencesWriterHandle { shutdown_tx, task })
    }

    async fn writer_task(
        store: Arc<dyn PreferencesStore>,
        mut write_rx: mpsc::UnboundedReceiver<UserPreferences>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!(store = store.name(), "Preferences writer started");

        loop {
            tokio::select! {
                Some(mut prefs) = write_rx.recv() => {
                    // Only the newest queued document matters
                    while let Ok(newer) = write_rx.try_recv() {
                        prefs = newer;
                    }
                    Self::persist(store.as_ref(), &prefs).await;
                }
                Some(()) = shutdown_rx.recv() => {
                    let mut latest = None;
                    while let Ok(prefs) = write_rx.try_recv() {
                        latest = Some(prefs);
                    }
                    if let Some(prefs) = latest {
                        Self::persist(store.as_ref(), &prefs).await;
                    }
                    break;
                }
                // Handle dropped and every service clone gone
                else => break,
            }
        }
    }

    async fn persist(store: &dyn PreferencesStore, prefs: &UserPreferences) {
        if let Err(e) = store.save(prefs).await {
            tracing::error!(store = store.name(), error = %e, "Failed to persist preferences");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PreferencesChanged> {
        self.events.subscribe()
    }

    pub async fn get(&self) -> UserPreferences {
        self.prefs.read().await.clone()
    }

    /// Applies `mutate`, then notifies subscribers and queues the write
    ///
    /// Both sends happen under the write lock, so the writer and subscribers
    /// see documents in the order the mutations were applied.
    async fn update<R>(&self, change: PreferenceChange, mutate: impl FnOnce(&mut UserPreferences) -> R) -> R {
        let mut prefs = self.prefs.write().await;
        let result = mutate(&mut prefs);
        let snapshot = prefs.clone();

        if let Err(e) = self.write_tx.send(snapshot.clone()) {
            tracing::error!(error = %e, "Preferences writer is gone, change kept in memory only");
        }

        tracing::debug!(change = ?change, "Preferences updated");
        // No subscribers is fine
        let _ = self.events.send(PreferencesChanged {
            change,
            preferences: snapshot,
        });

        result
    }

    pub async fn set_categories(&self, categories: Vec<String>) -> UserPreferences {
        self.update(PreferenceChange::Categories, |prefs| {
            prefs.categories = unique(categories);
            prefs.clone()
        })
        .await
    }

    pub async fn set_movie_genres(&self, genres: Vec<String>) -> UserPreferences {
        self.update(PreferenceChange::MovieGenres, |prefs| {
            prefs.movie_genres = unique(genres);
            prefs.clone()
        })
        .await
    }

    pub async fn set_social_categories(&self, categories: Vec<String>) -> UserPreferences {
        self.update(PreferenceChange::SocialCategories, |prefs| {
            prefs.social_categories = unique(categories);
            prefs.clone()
        })
        .await
    }

    pub async fn set_layout(&self, layout: Layout) -> UserPreferences {
        self.update(PreferenceChange::Layout, |prefs| {
            prefs.layout = layout;
            prefs.clone()
        })
        .await
    }

    /// Returns whether the item is a favorite afterwards
    pub async fn toggle_favorite(&self, item: ContentItem) -> bool {
        self.update(PreferenceChange::Favorites, |prefs| prefs.toggle_favorite(item))
            .await
    }

    pub async fn favorites(&self) -> Vec<ContentItem> {
        self.prefs.read().await.favorites.clone()
    }

    pub async fn set_content_order(&self, order: Vec<ContentId>) {
        self.update(PreferenceChange::ContentOrder, |prefs| {
            prefs.content_order = unique(order);
        })
        .await
    }

    pub async fn set_page_size(&self, section: &str, page_size: usize) -> AppResult<()> {
        let page_size = validate_page_size(page_size)?;
        self.update(PreferenceChange::PageSize(section.to_string()), |prefs| {
            prefs.set_page_size(section, page_size)
        })
        .await;
        Ok(())
    }

    pub async fn reset(&self) -> UserPreferences {
        self.update(PreferenceChange::Reset, |prefs| {
            *prefs = UserPreferences::new();
            prefs.clone()
        })
        .await
    }
}

/// Drops repeated entries, keeping the first occurrence
fn unique<T: PartialEq>(values: Vec<T>) -> Vec<T> {
    let mut kept = Vec::with_capacity(values.len());
    for value in values {
        if !kept.contains(&value) {
            kept.push(value);
        }
    }
    kept
}
