use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;
use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

/// Creates the application router with all routes
///
/// Every request gets a request id before its trace span is opened.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(axum::middleware::from_fn(request_id_middleware))
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Content
        .route("/content/refresh", post(handlers::refresh_content))
        .route(
            "/content/errors",
            get(handlers::get_errors).delete(handlers::dismiss_errors),
        )
        // Sections
        .route("/feed/:section", get(handlers::get_feed))
        .route("/feed/:section/pages", get(handlers::get_page_links))
        .route("/feed/:section/move", post(handlers::move_item))
        .route("/feed/:section/page-size", put(handlers::set_page_size))
        .route("/trending/:tab", get(handlers::get_trending))
        // Search
        .route(
            "/search",
            get(handlers::get_search)
                .post(handlers::submit_search)
                .delete(handlers::clear_search),
        )
        .route("/search/now", get(handlers::search_now))
        // Preferences
        .route("/preferences", get(handlers::get_preferences))
        .route("/preferences/categories", put(handlers::set_categories))
        .route("/preferences/movie-genres", put(handlers::set_movie_genres))
        .route(
            "/preferences/social-categories",
            put(handlers::set_social_categories),
        )
        .route("/preferences/layout", put(handlers::set_layout))
        .route("/preferences/order", put(handlers::set_order))
        .route("/preferences/reset", post(handlers::reset_preferences))
        // Favorites
        .route("/favorites", get(handlers::get_favorites))
        .route("/favorites/toggle", post(handlers::toggle_favorite))
}
