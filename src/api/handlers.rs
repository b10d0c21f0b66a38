use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{ContentId, ContentItem, Layout, UserPreferences},
    services::{
        aggregator::{RefreshOutcome, SourceError},
        dashboard::{FeedView, Section, TrendingView},
        ordering::DragMove,
        pagination::PageLink,
        search::{SearchResults, SearchState},
        trending::TrendingTab,
    },
};

use super::AppState;

// Request/Response types

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub from: usize,
    /// Absent when the card was dropped outside the list
    #[serde(default)]
    pub to: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct MoveResponse {
    pub section: String,
    pub items: Vec<ContentItem>,
}

#[derive(Debug, Deserialize)]
pub struct PageSizeRequest {
    pub page_size: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct TrendingQuery {
    pub page: Option<usize>,
    pub window_days: Option<u32>,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct SearchSubmitted {
    pub query: String,
    pub generation: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchNowQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorsResponse {
    pub errors: Vec<SourceError>,
}

#[derive(Debug, Deserialize)]
pub struct LayoutRequest {
    pub layout: Layout,
}

#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    pub order: Vec<ContentId>,
}

#[derive(Debug, Serialize)]
pub struct FavoriteResponse {
    pub id: ContentId,
    pub favorite: bool,
}

// Handlers

pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

pub async fn refresh_content(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> Json<RefreshOutcome> {
    tracing::info!(request_id = %request_id, "Processing refresh request");
    Json(state.dashboard.refresh().await)
}

pub async fn get_errors(State(state): State<AppState>) -> Json<ErrorsResponse> {
    Json(ErrorsResponse {
        errors: state.dashboard.aggregator().errors().await,
    })
}

pub async fn dismiss_errors(State(state): State<AppState>) -> StatusCode {
    state.dashboard.aggregator().dismiss_errors().await;
    StatusCode::NO_CONTENT
}

pub async fn get_feed(
    State(state): State<AppState>,
    Path(section): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<FeedView>> {
    let section: Section = section.parse()?;
    Ok(Json(state.dashboard.feed(&section, query.page).await?))
}

pub async fn get_page_links(
    State(state): State<AppState>,
    Path(section): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Vec<PageLink>>> {
    let section: Section = section.parse()?;
    Ok(Json(state.dashboard.page_links(&section, query.page).await?))
}

pub async fn move_item(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(section): Path<String>,
    Json(request): Json<MoveRequest>,
) -> AppResult<Json<MoveResponse>> {
    let section: Section = section.parse()?;
    tracing::info!(
        request_id = %request_id,
        section = %section,
        from = request.from,
        to = ?request.to,
        "Processing move request"
    );

    let items = state
        .dashboard
        .move_item(
            &section,
            DragMove {
                from: request.from,
                to: request.to,
            },
        )
        .await?;

    Ok(Json(MoveResponse {
        section: section.key(),
        items,
    }))
}

pub async fn set_page_size(
    State(state): State<AppState>,
    Path(section): Path<String>,
    Json(request): Json<PageSizeRequest>,
) -> AppResult<Json<FeedView>> {
    let section: Section = section.parse()?;
    Ok(Json(
        state
            .dashboard
            .set_page_size(&section, request.page_size)
            .await?,
    ))
}

pub async fn get_trending(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(tab): Path<String>,
    Query(query): Query<TrendingQuery>,
) -> AppResult<Json<TrendingView>> {
    let tab: TrendingTab = tab.parse()?;
    tracing::info!(
        request_id = %request_id,
        tab = tab.as_str(),
        window_days = ?query.window_days,
        "Processing trending request"
    );

    let view = state
        .dashboard
        .trending(tab, query.page, query.window_days, query.language.as_deref())
        .await?;
    Ok(Json(view))
}

pub async fn submit_search(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<SearchRequest>,
) -> (StatusCode, Json<SearchSubmitted>) {
    let generation = state.dashboard.search().submit(request.query.clone()).await;
    tracing::info!(
        request_id = %request_id,
        query = %request.query,
        generation = generation,
        "Search submitted"
    );

    (
        StatusCode::ACCEPTED,
        Json(SearchSubmitted {
            query: request.query,
            generation,
        }),
    )
}

pub async fn get_search(State(state): State<AppState>) -> Json<SearchState> {
    Json(state.dashboard.search().state().await)
}

pub async fn clear_search(State(state): State<AppState>) -> Json<SearchState> {
    state.dashboard.search().clear().await;
    Json(state.dashboard.search().state().await)
}

pub async fn search_now(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<SearchNowQuery>,
) -> Json<SearchResults> {
    tracing::info!(request_id = %request_id, query = %query.q, "Processing immediate search");
    Json(state.dashboard.search().search_now(&query.q).await)
}

pub async fn get_preferences(State(state): State<AppState>) -> Json<UserPreferences> {
    Json(state.dashboard.preferences().get().await)
}

pub async fn set_categories(
    State(state): State<AppState>,
    Json(categories): Json<Vec<String>>,
) -> Json<UserPreferences> {
    Json(state.dashboard.preferences().set_categories(categories).await)
}

pub async fn set_movie_genres(
    State(state): State<AppState>,
    Json(genres): Json<Vec<String>>,
) -> Json<UserPreferences> {
    Json(state.dashboard.preferences().set_movie_genres(genres).await)
}

pub async fn set_social_categories(
    State(state): State<AppState>,
    Json(categories): Json<Vec<String>>,
) -> Json<UserPreferences> {
    Json(
        state
            .dashboard
            .preferences()
            .set_social_categories(categories)
            .await,
    )
}

pub async fn set_layout(
    State(state): State<AppState>,
    Json(request): Json<LayoutRequest>,
) -> Json<UserPreferences> {
    Json(state.dashboard.preferences().set_layout(request.layout).await)
}

pub async fn set_order(
    State(state): State<AppState>,
    Json(request): Json<OrderRequest>,
) -> Json<UserPreferences> {
    let preferences = state.dashboard.preferences();
    preferences.set_content_order(request.order).await;
    Json(preferences.get().await)
}

pub async fn reset_preferences(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> Json<UserPreferences> {
    tracing::info!(request_id = %request_id, "Resetting preferences");
    Json(state.dashboard.preferences().reset().await)
}

pub async fn get_favorites(State(state): State<AppState>) -> Json<Vec<ContentItem>> {
    Json(state.dashboard.preferences().favorites().await)
}

pub async fn toggle_favorite(
    State(state): State<AppState>,
    Json(item): Json<ContentItem>,
) -> Json<FavoriteResponse> {
    let id = item.id().clone();
    let favorite = state.dashboard.preferences().toggle_favorite(item).await;
    Json(FavoriteResponse { id, favorite })
}
