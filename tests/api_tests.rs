use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use content_dashboard::{
    api::{create_router, AppState},
    db::MemoryStore,
    error::{AppError, AppResult},
    models::{ArticleSource, ContentId, MovieItem, NewsItem},
    services::{
        dashboard::DashboardOptions,
        providers::{MockSocialProvider, MovieSource, NewsSource, Sources},
    },
};

const NEWS_CATEGORIES: [&str; 2] = ["technology", "sports"];

fn article(id: usize, category: &str) -> NewsItem {
    NewsItem {
        id: ContentId::new(format!("n{}", id)),
        source: ArticleSource {
            id: None,
            name: "Wire".to_string(),
        },
        author: None,
        title: format!("Headline {}", id),
        description: format!("Story {}", id),
        url: format!("https://example.com/news/{}", id),
        image_url: None,
        published_at: None,
        content: None,
        category: category.to_string(),
    }
}

fn film(id: &str, genre: &str, year: &str) -> MovieItem {
    MovieItem {
        id: ContentId::from(id),
        title: format!("Film {}", id),
        year: year.to_string(),
        item_type: "movie".to_string(),
        external_id: id.to_string(),
        category: genre.to_string(),
        imdb_rating: Some("7.5".to_string()),
        ..Default::default()
    }
}

/// Serves `count` articles alternating between technology and sports
struct StubNews {
    count: usize,
}

#[async_trait::async_trait]
impl NewsSource for StubNews {
    async fn fetch_news(&self, categories: &[String]) -> AppResult<Vec<NewsItem>> {
        Ok((1..=self.count)
            .map(|i| article(i, NEWS_CATEGORIES[i % 2]))
            .filter(|item| categories.contains(&item.category))
            .collect())
    }

    async fn search_news(&self, query: &str) -> AppResult<Vec<NewsItem>> {
        Ok(vec![article(100, "general")]
            .into_iter()
            .filter(|item| item.title.to_lowercase().contains(&query.to_lowercase()))
            .collect())
    }

    async fn fetch_trending(&self, _window_days: u32, _language: &str) -> AppResult<Vec<NewsItem>> {
        Ok(vec![article(200, "trending"), article(201, "trending")])
    }

    fn name(&self) -> &'static str {
        "news"
    }
}

struct StubMovies;

#[async_trait::async_trait]
impl MovieSource for StubMovies {
    async fn fetch_movies(&self, _genres: &[String]) -> AppResult<Vec<MovieItem>> {
        Ok(vec![
            film("tt1", "action", "2001"),
            film("tt2", "comedy", "2002"),
            film("tt3", "drama", "2003"),
        ])
    }

    async fn search_movies(&self, query: &str) -> AppResult<Vec<MovieItem>> {
        Ok(vec![film("tt9", "search", "1999")]
            .into_iter()
            .filter(|movie| movie.title.to_lowercase().contains(&query.to_lowercase()))
            .collect())
    }

    fn name(&self) -> &'static str {
        "movies"
    }
}

struct DownMovies;

#[async_trait::async_trait]
impl MovieSource for DownMovies {
    async fn fetch_movies(&self, _genres: &[String]) -> AppResult<Vec<MovieItem>> {
        Err(AppError::ExternalApi("OMDB API key not configured".to_string()))
    }

    async fn search_movies(&self, _query: &str) -> AppResult<Vec<MovieItem>> {
        Err(AppError::ExternalApi("OMDB API key not configured".to_string()))
    }

    fn name(&self) -> &'static str {
        "movies"
    }
}

fn options() -> DashboardOptions {
    DashboardOptions {
        search_debounce: Duration::from_millis(20),
        refresh_debounce: Duration::from_millis(20),
        default_page_size: 6,
    }
}

async fn server_with(movies: Arc<dyn MovieSource>, news_count: usize) -> TestServer {
    let sources = Sources::new(
        Arc::new(StubNews { count: news_count }),
        movies,
        Arc::new(MockSocialProvider::new()),
    );
    let (state, _writer) = AppState::build(sources, Arc::new(MemoryStore::new()), options()).await;
    TestServer::new(create_router(state)).unwrap()
}

async fn create_test_server() -> TestServer {
    let server = server_with(Arc::new(StubMovies), 25).await;
    server.post("/api/v1/content/refresh").await.assert_status_ok();
    server
}

fn ids(feed: &Value) -> Vec<String> {
    feed["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server().await;
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({ "status": "healthy" }));
    assert!(response.headers().get("x-request-id").is_some());
}

#[tokio::test]
async fn test_refresh_reports_counts() {
    let server = server_with(Arc::new(StubMovies), 25).await;
    let response = server.post("/api/v1/content/refresh").await;
    response.assert_status_ok();

    let outcome: Value = response.json();
    assert_eq!(outcome["status"], "completed");
    // Default categories select technology and sports
    assert_eq!(outcome["news"], 25);
    assert_eq!(outcome["movies"], 3);
    assert_eq!(outcome["social"], 20);
    assert_eq!(outcome["errors"], json!([]));
}

#[tokio::test]
async fn test_news_feed_pages() {
    let server = create_test_server().await;

    let first: Value = server.get("/api/v1/feed/news").await.json();
    assert_eq!(first["section"], "news");
    assert_eq!(first["page"], 1);
    assert_eq!(first["total_items"], 25);
    assert_eq!(first["total_pages"], 5);
    assert_eq!(first["items"].as_array().unwrap().len(), 6);
    assert_eq!(first["empty_reason"], Value::Null);

    let last: Value = server
        .get("/api/v1/feed/news")
        .add_query_param("page", 5)
        .await
        .json();
    assert_eq!(ids(&last), vec!["n25"]);
    assert_eq!(last["has_next"], false);

    // Page 6 does not exist; the page control stays where it was
    let beyond: Value = server
        .get("/api/v1/feed/news")
        .add_query_param("page", 6)
        .await
        .json();
    assert_eq!(beyond["page"], 5);
}

#[tokio::test]
async fn test_single_category_section() {
    let server = create_test_server().await;
    let feed: Value = server.get("/api/v1/feed/news:sports").await.json();
    assert_eq!(feed["section"], "news:sports");
    assert_eq!(feed["total_items"], 13);
}

#[tokio::test]
async fn test_unknown_section_is_not_found() {
    let server = create_test_server().await;
    let response = server.get("/api/v1/feed/weather").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert!(response.json::<Value>()["error"]
        .as_str()
        .unwrap()
        .contains("weather"));
}

#[tokio::test]
async fn test_page_links_window() {
    let server = create_test_server().await;
    let links: Value = server.get("/api/v1/feed/news/pages").await.json();
    assert_eq!(links.as_array().unwrap().len(), 5);
    assert_eq!(links[0], json!({ "type": "number", "page": 1 }));
}

#[tokio::test]
async fn test_page_size_change() {
    let server = create_test_server().await;
    server
        .get("/api/v1/feed/news")
        .add_query_param("page", 3)
        .await
        .assert_status_ok();

    let feed: Value = server
        .put("/api/v1/feed/news/page-size")
        .json(&json!({ "page_size": 10 }))
        .await
        .json();
    assert_eq!(feed["page"], 1);
    assert_eq!(feed["page_size"], 10);
    assert_eq!(feed["total_pages"], 3);

    server
        .put("/api/v1/feed/news/page-size")
        .json(&json!({ "page_size": 0 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_drag_reorders_and_persists_order() {
    let server = create_test_server().await;

    let moved: Value = server
        .post("/api/v1/feed/movies/move")
        .json(&json!({ "from": 2, "to": 0 }))
        .await
        .json();
    assert_eq!(ids(&moved), vec!["tt3", "tt1", "tt2"]);

    let feed: Value = server.get("/api/v1/feed/movies").await.json();
    assert_eq!(ids(&feed), vec!["tt3", "tt1", "tt2"]);

    let prefs: Value = server.get("/api/v1/preferences").await.json();
    assert_eq!(prefs["content_order"], json!(["tt3", "tt1", "tt2"]));

    // Dropped outside the list
    let unchanged: Value = server
        .post("/api/v1/feed/movies/move")
        .json(&json!({ "from": 0 }))
        .await
        .json();
    assert_eq!(ids(&unchanged), vec!["tt3", "tt1", "tt2"]);

    server
        .post("/api/v1/feed/movies/move")
        .json(&json!({ "from": 0, "to": 9 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_saved_order_applies_to_feed() {
    let server = create_test_server().await;
    server
        .put("/api/v1/preferences/order")
        .json(&json!({ "order": ["tt3", "gone", "tt1"] }))
        .await
        .assert_status_ok();

    let feed: Value = server.get("/api/v1/feed/movies").await.json();
    assert_eq!(ids(&feed), vec!["tt3", "tt1", "tt2"]);
}

#[tokio::test]
async fn test_empty_news_selection_is_explained() {
    let server = create_test_server().await;
    let prefs: Value = server
        .put("/api/v1/preferences/categories")
        .json(&json!([]))
        .await
        .json();
    assert_eq!(prefs["categories"], json!([]));

    let feed: Value = server.get("/api/v1/feed/news").await.json();
    assert_eq!(feed["total_items"], 0);
    assert_eq!(feed["empty_reason"], "no_categories_selected");

    // Movies and social ignore an empty selection
    server
        .put("/api/v1/preferences/movie-genres")
        .json(&json!([]))
        .await
        .assert_status_ok();
    let movies: Value = server.get("/api/v1/feed/movies").await.json();
    assert_eq!(movies["total_items"], 3);
}

#[tokio::test]
async fn test_social_topic_filter() {
    let server = create_test_server().await;
    server
        .put("/api/v1/preferences/social-categories")
        .json(&json!(["Fitness"]))
        .await
        .assert_status_ok();

    let feed: Value = server.get("/api/v1/feed/social").await.json();
    assert_eq!(feed["total_items"], 4);
    assert!(feed["items"]
        .as_array()
        .unwrap()
        .iter()
        .all(|post| post["category"] == "Fitness" && post["kind"] == "social"));
}

#[tokio::test]
async fn test_search_now_merges_sources() {
    let server = create_test_server().await;
    let results: Value = server
        .get("/api/v1/search/now")
        .add_query_param("q", "100")
        .await
        .json();

    let items = results["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], "n100");
    assert_eq!(items[0]["category"], "search");
}

#[tokio::test]
async fn test_debounced_search_replaces_all_section() {
    let server = create_test_server().await;

    let submitted = server
        .post("/api/v1/search")
        .json(&json!({ "query": "film" }))
        .await;
    submitted.assert_status(StatusCode::ACCEPTED);

    tokio::time::sleep(Duration::from_millis(300)).await;

    let state: Value = server.get("/api/v1/search").await.json();
    assert_eq!(state["query"], "film");
    assert_eq!(state["loading"], false);

    let feed: Value = server.get("/api/v1/feed/all").await.json();
    assert_eq!(feed["searching"], true);
    assert_eq!(ids(&feed), vec!["tt9"]);

    let cleared: Value = server.delete("/api/v1/search").await.json();
    assert_eq!(cleared["query"], "");
    let feed: Value = server.get("/api/v1/feed/all").await.json();
    assert_eq!(feed["searching"], false);
}

#[tokio::test]
async fn test_trending_tabs() {
    let server = create_test_server().await;

    let news: Value = server.get("/api/v1/trending/news").await.json();
    assert_eq!(ids(&news), vec!["n200", "n201"]);
    assert_eq!(news["error"], Value::Null);

    let posts: Value = server.get("/api/v1/trending/posts").await.json();
    assert!(posts["items"]
        .as_array()
        .unwrap()
        .iter()
        .all(|post| post["trending"] == true));

    server
        .get("/api/v1/trending/weather")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get("/api/v1/trending/news")
        .add_query_param("page", 3)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_failed_source_shows_banner() {
    let server = server_with(Arc::new(DownMovies), 4).await;
    let outcome: Value = server.post("/api/v1/content/refresh").await.json();
    assert_eq!(outcome["movies"], 0);
    assert_eq!(outcome["errors"][0]["source"], "movies");

    // The other sources still fill the dashboard
    let news: Value = server.get("/api/v1/feed/news").await.json();
    assert_eq!(news["total_items"], 4);

    let errors: Value = server.get("/api/v1/content/errors").await.json();
    assert_eq!(errors["errors"].as_array().unwrap().len(), 1);

    server
        .delete("/api/v1/content/errors")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let errors: Value = server.get("/api/v1/content/errors").await.json();
    assert_eq!(errors["errors"], json!([]));
}

#[tokio::test]
async fn test_favorite_toggle_is_its_own_inverse() {
    let server = create_test_server().await;
    let feed: Value = server.get("/api/v1/feed/movies").await.json();
    let item = feed["items"][0].clone();

    let toggled: Value = server
        .post("/api/v1/favorites/toggle")
        .json(&item)
        .await
        .json();
    assert_eq!(toggled["favorite"], true);

    let favorites: Value = server.get("/api/v1/favorites").await.json();
    assert_eq!(favorites.as_array().unwrap().len(), 1);

    let toggled: Value = server
        .post("/api/v1/favorites/toggle")
        .json(&item)
        .await
        .json();
    assert_eq!(toggled["favorite"], false);
    let favorites: Value = server.get("/api/v1/favorites").await.json();
    assert_eq!(favorites, json!([]));
}

#[tokio::test]
async fn test_layout_and_reset() {
    let server = create_test_server().await;
    let prefs: Value = server
        .put("/api/v1/preferences/layout")
        .json(&json!({ "layout": "list" }))
        .await
        .json();
    assert_eq!(prefs["layout"], "list");

    let prefs: Value = server.post("/api/v1/preferences/reset").await.json();
    assert_eq!(prefs["layout"], "grid");
    assert_eq!(prefs["categories"], json!(["technology", "sports", "entertainment"]));
}

#[tokio::test]
async fn test_category_change_refetches() {
    let server = create_test_server().await;
    server
        .put("/api/v1/preferences/categories")
        .json(&json!(["sports"]))
        .await
        .assert_status_ok();

    tokio::time::sleep(Duration::from_millis(300)).await;

    let news: Value = server.get("/api/v1/feed/news").await.json();
    assert_eq!(news["total_items"], 13);
    let technology: Value = server.get("/api/v1/feed/news:technology").await.json();
    assert_eq!(technology["empty_reason"], "no_matches");
}
