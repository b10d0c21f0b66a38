use std::sync::Arc;

use crate::{
    db::PreferencesStore,
    services::{
        dashboard::{Dashboard, DashboardOptions},
        preferences::{PreferencesService, PreferencesWriterHandle},
        providers::Sources,
    },
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Dashboard,
}

impl AppState {
    pub fn new(dashboard: Dashboard) -> Self {
        Self { dashboard }
    }

    /// Loads preferences from `store` and wires the dashboard around `sources`
    ///
    /// Category changes start refetching from here on. The returned handle
    /// flushes pending preference writes on shutdown.
    pub async fn build(
        sources: Sources,
        store: Arc<dyn PreferencesStore>,
        options: DashboardOptions,
    ) -> (Self, PreferencesWriterHandle) {
        let (preferences, writer) = PreferencesService::load(store).await;
        let dashboard = Dashboard::new(sources, preferences, options);
        dashboard.watch_preferences();

        (Self::new(dashboard), writer)
    }
}
