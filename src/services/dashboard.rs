//! Section views over the aggregated content.
//!
//! A section is filtered by the user's selection, arranged by the saved
//! order and paginated with a page control that remembers its position.
//! While a search query is active the `all` section shows search results.
use serde::Serialize;
use std::collections::{hash_map::Entry, HashMap};
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast::error::RecvError, RwLock};
use tokio::task::JoinHandle;

use crate::{
    error::{AppError, AppResult},
    models::{ContentItem, UserPreferences},
    services::{
        aggregator::{Aggregator, RefreshOutcome, SourceError},
        filter::{filter_content, news_empty_reason, ContentSelection, EmptyReason},
        ordering::{merge_section_order, move_item, order_of, reconcile, DragMove},
        pagination::{page_window, paginate, Page, PageLink, Paginator},
        preferences::PreferencesService,
        providers::Sources,
        search::SearchCoordinator,
        trending::{self, TrendingTab},
    },
};

/// Page-control key of the search result list
const SEARCH_SECTION_KEY: &str = "search";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Section {
    All,
    News,
    Movies,
    Social,
    /// News of a single category
    NewsCategory(String),
}

impl Section {
    pub fn key(&self) -> String {
        match self {
            Section::All => "all".to_string(),
            Section::News => "news".to_string(),
            Section::Movies => "movies".to_string(),
            Section::Social => "social".to_string(),
            Section::NewsCategory(category) => format!("news:{}", category),
        }
    }

    fn is_news(&self) -> bool {
        matches!(self, Section::News | Section::NewsCategory(_))
    }
}

impl Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for Section {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Section::All),
            "news" => Ok(Section::News),
            "movies" => Ok(Section::Movies),
            "social" => Ok(Section::Social),
            other => match other.strip_prefix("news:") {
                Some(category) if !category.trim().is_empty() => {
                    Ok(Section::NewsCategory(category.trim().to_lowercase()))
                }
                _ => Err(AppError::NotFound(format!("Unknown section '{}'", other))),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedView {
    pub section: String,
    #[serde(flatten)]
    pub page: Page<ContentItem>,
    pub pages: Vec<PageLink>,
    pub empty_reason: Option<EmptyReason>,
    /// The view shows search results rather than the feed
    pub searching: bool,
    pub refreshing: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendingView {
    pub tab: TrendingTab,
    #[serde(flatten)]
    pub page: Page<ContentItem>,
    pub pages: Vec<PageLink>,
    pub error: Option<SourceError>,
}

/// Section content before pagination
struct SectionItems {
    key: String,
    items: Vec<ContentItem>,
    empty_reason: Option<EmptyReason>,
    searching: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct DashboardOptions {
    pub search_debounce: Duration,
    pub refresh_debounce: Duration,
    pub default_page_size: usize,
}

#[derive(Clone)]
pub struct Dashboard {
    sources: Sources,
    preferences: PreferencesService,
    aggregator: Aggregator,
    search: SearchCoordinator,
    paginators: Arc<RwLock<HashMap<String, Paginator>>>,
    options: DashboardOptions,
}

impl Dashboard {
    pub fn new(sources: Sources, preferences: PreferencesService, options: DashboardOptions) -> Self {
        Self {
            aggregator: Aggregator::new(sources.clone()),
            search: SearchCoordinator::new(sources.clone(), options.search_debounce),
            sources,
            preferences,
            paginators: Arc::new(RwLock::new(HashMap::new())),
            options,
        }
    }

    pub fn preferences(&self) -> &PreferencesService {
        &self.preferences
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    pub fn search(&self) -> &SearchCoordinator {
        &self.search
    }

    /// Refetches content, debounced, whenever a category selection changes
    pub fn watch_preferences(&self) -> JoinHandle<()> {
        let mut events = self.preferences.subscribe();
        let preferences = self.preferences.clone();
        let aggregator = self.aggregator.clone();
        let delay = self.options.refresh_debounce;

        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) if event.change.affects_content() => {
                        aggregator.schedule_refresh(ContentSelection::from(&event.preferences), delay);
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(missed)) => {
                        tracing::warn!(missed = missed, "Preference events lagged, refreshing from current state");
                        let prefs = preferences.get().await;
                        aggregator.schedule_refresh(ContentSelection::from(&prefs), delay);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    /// Fetch-all with the current selection
    pub async fn refresh(&self) -> RefreshOutcome {
        let prefs = self.preferences.get().await;
        self.aggregator.refresh(&ContentSelection::from(&prefs)).await
    }

    async fn section_items(&self, section: &Section, prefs: &UserPreferences) -> SectionItems {
        if *section == Section::All {
            let search = self.search.state().await;
            if search.is_active() {
                let empty_reason = (search.results.is_empty() && !search.loading).then_some(EmptyReason::NoMatches);
                return SectionItems {
                    key: SEARCH_SECTION_KEY.to_string(),
                    items: search.results,
                    empty_reason,
                    searching: true,
                };
            }
        }

        let selection = ContentSelection::from(prefs);
        let snapshot = self.aggregator.snapshot().await;
        let filtered = filter_content(&snapshot.content, &selection);

        let news_reason = news_empty_reason(&filtered.news, &selection);
        let items: Vec<ContentItem> = match section {
            Section::All => filtered.all(),
            Section::News => filtered.news.into_iter().map(ContentItem::from).collect(),
            Section::Movies => filtered.movies.into_iter().map(ContentItem::from).collect(),
            Section::Social => filtered.social.into_iter().map(ContentItem::from).collect(),
            Section::NewsCategory(category) => filtered
                .news
                .into_iter()
                .filter(|n| &n.category == category)
                .map(ContentItem::from)
                .collect(),
        };

        let no_matches = items.is_empty().then_some(EmptyReason::NoMatches);
        let empty_reason = if section.is_news() {
            news_reason.or(no_matches)
        } else {
            no_matches
        };

        SectionItems {
            key: section.key(),
            items: reconcile(items, &prefs.content_order),
            empty_reason,
            searching: false,
        }
    }

    /// One page of a section; `page` moves the page control when in range
    pub async fn feed(&self, section: &Section, page: Option<usize>) -> AppResult<FeedView> {
        let prefs = self.preferences.get().await;
        let section_items = self.section_items(section, &prefs).await;
        let total = section_items.items.len();
        let page_size = prefs.page_size_for(&section_items.key, self.options.default_page_size);

        let page = {
            let mut paginators = self.paginators.write().await;
            let paginator = match paginators.entry(section_items.key.clone()) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => entry.insert(Paginator::new(page_size)?),
            };
            if paginator.page_size() != page_size {
                paginator.set_page_size(page_size)?;
            }
            paginator.clamp(total);
            if let Some(requested) = page {
                if requested != paginator.current_page() && !paginator.go_to(requested, total) {
                    tracing::debug!(section = %section, requested = requested, "Page out of range, staying put");
                }
            }
            paginator
                .slice(&section_items.items)
                .ok_or_else(|| AppError::Internal(format!("Page control of '{}' out of range", section)))?
        };

        Ok(FeedView {
            section: section.key(),
            pages: page_window(page.page, page.total_pages),
            page,
            empty_reason: section_items.empty_reason,
            searching: section_items.searching,
            refreshing: self.aggregator.is_refreshing(),
        })
    }

    pub async fn page_links(&self, section: &Section, page: Option<usize>) -> AppResult<Vec<PageLink>> {
        Ok(self.feed(section, page).await?.pages)
    }

    /// Applies a drag within a section and persists the new order
    ///
    /// `from` and `to` index the whole section in display order. The new
    /// arrangement is returned at once; the order is written in the background.
    pub async fn move_item(&self, section: &Section, drag: DragMove) -> AppResult<Vec<ContentItem>> {
        let prefs = self.preferences.get().await;
        let section_items = self.section_items(section, &prefs).await;
        if section_items.searching {
            return Err(AppError::InvalidInput("Search results cannot be reordered".to_string()));
        }

        if drag.is_noop() {
            return Ok(section_items.items);
        }

        let moved = move_item(section_items.items, drag)?;
        let order = merge_section_order(&order_of(&moved), &prefs.content_order);
        self.preferences.set_content_order(order).await;

        tracing::info!(section = %section, from = drag.from, to = ?drag.to, "Section reordered");
        Ok(moved)
    }

    /// Remembers a section's page size and returns its first page
    pub async fn set_page_size(&self, section: &Section, page_size: usize) -> AppResult<FeedView> {
        let key = if *section == Section::All && self.search.is_active().await {
            SEARCH_SECTION_KEY.to_string()
        } else {
            section.key()
        };

        self.preferences.set_page_size(&key, page_size).await?;
        if let Some(paginator) = self.paginators.write().await.get_mut(&key) {
            paginator.set_page_size(page_size)?;
        }

        self.feed(section, None).await
    }

    pub async fn trending(
        &self,
        tab: TrendingTab,
        page: Option<usize>,
        window_days: Option<u32>,
        language: Option<&str>,
    ) -> AppResult<TrendingView> {
        let window_days = window_days.unwrap_or(trending::DEFAULT_WINDOW_DAYS);
        if window_days == 0 {
            return Err(AppError::InvalidInput("window_days must be at least 1".to_string()));
        }
        let language = language.unwrap_or(trending::DEFAULT_LANGUAGE);

        let (items, error) = match tab {
            TrendingTab::News => {
                let (news, error) = trending::trending_news(self.sources.news.as_ref(), window_days, language).await;
                (news.into_iter().map(ContentItem::from).collect(), error)
            }
            _ => {
                let snapshot = self.aggregator.snapshot().await;
                (trending::snapshot_tab(tab, &snapshot.content)?, None)
            }
        };

        let prefs = self.preferences.get().await;
        let page_size = prefs.page_size_for(&tab.section_key(), self.options.default_page_size);
        let page_number = page.unwrap_or(1);
        let page = paginate(&items, page_size, page_number)
            .ok_or_else(|| AppError::NotFound(format!("Page {} of trending {} does not exist", page_number, tab.as_str())))?;

        Ok(TrendingView {
            tab,
            pages: page_window(page.page, page.total_pages),
            page,
            error,
        })
    }
}
