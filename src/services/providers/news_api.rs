/// News API provider
///
/// Headlines come from `/top-headlines`, one request per category, run
/// concurrently. Search and trending use `/everything`. Headline fetches fall
/// back to the built-in mock headlines whenever the upstream is unusable, so
/// the news section is never empty because of a missing key or a rate limit.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{upstream::NewsApiResponse, NewsItem, SEARCH_CATEGORY, TRENDING_CATEGORY},
    services::{
        normalize::{dedupe_news_by_url, normalize_articles},
        providers::{mock_news, resolve_news_categories, NewsSource},
    },
};
use chrono::{Duration as ChronoDuration, Utc};
use reqwest::Client as HttpClient;
use std::time::Duration;

const NEWS_CACHE_TTL: u64 = 900; // 15 minutes
const HEADLINES_PAGE_SIZE: u32 = 100;
const SEARCH_PAGE_SIZE: u32 = 5;
const TRENDING_PAGE_SIZE: u32 = 20;
const HEADLINES_COUNTRY: &str = "us";
/// `/everything` needs a query; this one matches broadly
const TRENDING_QUERY: &str = "news";

#[derive(Clone)]
pub struct NewsApiProvider {
    http_client: HttpClient,
    api_key: Option<String>,
    api_url: String,
    cache: Option<Cache>,
}

impl NewsApiProvider {
    pub fn new(
        api_key: Option<String>,
        api_url: String,
        timeout: Duration,
        cache: Option<Cache>,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        let api_key = api_key.filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            tracing::warn!("No News API key configured, serving built-in headlines");
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
            .ok_or_else(|| AppError::ExternalApi("News API key is not configured".to_string()))
    }

    /// Calls an endpoint and normalizes the articles under `category`
    async fn request_articles(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        category: &str,
    ) -> AppResult<Vec<NewsItem>> {
        let url = format!("{}/{}", self.api_url, endpoint);

        let response = self
            .http_client
            .get(&url)
            .header("X-Api-Key", self.api_key()?)
            .query(params)
            .send()
            .await?;

        let status = response.status();
        let body: NewsApiResponse = match response.json().await {
            Ok(body) => body,
            Err(e) if !status.is_success() => {
                return Err(AppError::ExternalApi(format!(
                    "News API returned status {}: {}",
                    status, e
                )))
            }
            Err(e) => return Err(e.into()),
        };

        if body.is_error() || !status.is_success() {
            if body.is_rate_limited() {
                tracing::warn!(endpoint = %endpoint, "News API rate limit reached");
            }
            return Err(AppError::ExternalApi(format!(
                "News API returned status {}: {}",
                status,
                body.message.as_deref().unwrap_or("unknown error")
            )));
        }

        Ok(normalize_articles(body.articles, category))
    }

    async fn fetch_category(&self, category: String) -> AppResult<Vec<NewsItem>> {
        cached!(
            self.cache,
            CacheKey::NewsHeadlines(category.clone()),
            NEWS_CACHE_TTL,
            async {
                let params = [
                    ("country", HEADLINES_COUNTRY.to_string()),
                    ("category", category.clone()),
                    ("pageSize", HEADLINES_PAGE_SIZE.to_string()),
                ];
                let articles = self
                    .request_articles("top-headlines", &params, &category)
                    .await?;

                tracing::info!(
                    category = %category,
                    articles = articles.len(),
                    provider = "newsapi",
                    "Headlines fetched"
                );

                Ok(articles)
            }
        )
    }
}

#[async_trait::async_trait]
impl NewsSource for NewsApiProvider {
    async fn fetch_news(&self, categories: &[String]) -> AppResult<Vec<NewsItem>> {
        let categories = resolve_news_categories(categories);

        if self.api_key.is_none() {
            return Ok(mock_news::headlines(&categories));
        }

        let mut tasks = Vec::with_capacity(categories.len());
        for category in &categories {
            let provider = self.clone();
            let category = category.clone();
            tasks.push(tokio::spawn(async move {
                let result = provider.fetch_category(category.clone()).await;
                (category, result)
            }));
        }

        let mut articles = Vec::new();
        for task in tasks {
            match task.await {
                Ok((_, Ok(items))) => articles.extend(items),
                Ok((category, Err(e))) => {
                    tracing::warn!(category = %category, error = %e, "Failed to fetch headlines");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Headline fetch task panicked");
                }
            }
        }

        let articles = dedupe_news_by_url(articles);
        if articles.is_empty() {
            tracing::warn!(
                categories = ?categories,
                "No headlines fetched, falling back to built-in headlines"
            );
            return Ok(mock_news::headlines(&categories));
        }

        Ok(articles)
    }

    async fn search_news(&self, query: &str) -> AppResult<Vec<NewsItem>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        cached!(
            self.cache,
            CacheKey::NewsSearch(query.to_string()),
            NEWS_CACHE_TTL,
            async {
                let params = [
                    ("q", query.to_string()),
                    ("language", "en".to_string()),
                    ("sortBy", "relevancy".to_string()),
                    ("pageSize", SEARCH_PAGE_SIZE.to_string()),
                ];
                let articles = self
                    .request_articles("everything", &params, SEARCH_CATEGORY)
                    .await?;

                tracing::info!(
                    query = %query,
                    results = articles.len(),
                    provider = "newsapi",
                    "News search completed"
                );

                Ok(dedupe_news_by_url(articles))
            }
        )
    }

    async fn fetch_trending(&self, window_days: u32, language: &str) -> AppResult<Vec<NewsItem>> {
        cached!(
            self.cache,
            CacheKey::NewsTrending {
                window_days,
                language: language.to_string(),
            },
            NEWS_CACHE_TTL,
            async {
                let today = Utc::now().date_naive();
                let from = today - ChronoDuration::days(i64::from(window_days));
                let params = [
                    ("q", TRENDING_QUERY.to_string()),
                    ("from", from.format("%Y-%m-%d").to_string()),
                    ("to", today.format("%Y-%m-%d").to_string()),
                    ("language", language.to_string()),
                    ("sortBy", "popularity".to_string()),
                    ("pageSize", TRENDING_PAGE_SIZE.to_string()),
                ];
                let articles = self
                    .request_articles("everything", &params, TRENDING_CATEGORY)
                    .await?;

                tracing::info!(
                    window_days = window_days,
                    language = %language,
                    articles = articles.len(),
                    provider = "newsapi",
                    "Trending news fetched"
                );

                Ok(dedupe_news_by_url(articles))
            }
        )
    }

    fn name(&self) -> &'static str {
        "news"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, routing::get, Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    /// Serves canned News API responses on a local port
    async fn spawn_upstream() -> String {
        async fn top_headlines(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
            match params.get("category").map(String::as_str) {
                Some("sports") => Json(json!({
                    "status": "ok",
                    "totalResults": 2,
                    "articles": [
                        {
                            "source": { "id": null, "name": "Sports Daily" },
                            "title": "Cup final tonight",
                            "description": "Preview",
                            "url": "https://news.test/cup-final",
                            "publishedAt": "2024-05-01T10:00:00Z"
                        },
                        {
                            "source": { "id": null, "name": "Sports Daily" },
                            "title": "No link",
                            "description": "Dropped during normalization"
                        }
                    ]
                })),
                Some("science") => Json(json!({
                    "status": "ok",
                    "articles": [
                        {
                            "source": { "id": null, "name": "Lab Notes" },
                            "title": "Cup final physics",
                            "description": "Same story, different desk",
                            "url": "https://news.test/cup-final"
                        }
                    ]
                })),
                _ => Json(json!({
                    "status": "error",
                    "code": "rateLimited",
                    "message": "Too many requests"
                })),
            }
        }

        async fn everything(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
            let title = format!("Result for {}", params.get("q").cloned().unwrap_or_default());
            Json(json!({
                "status": "ok",
                "articles": [
                    {
                        "source": { "id": "wire", "name": "Wire" },
                        "title": title,
                        "content": "Only content here",
                        "url": format!("https://news.test/{}", params.get("sortBy").cloned().unwrap_or_default())
                    }
                ]
            }))
        }

        let app = Router::new()
            .route("/top-headlines", get(top_headlines))
            .route("/everything", get(everything));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn provider(api_key: Option<&str>, api_url: String) -> NewsApiProvider {
        NewsApiProvider::new(
            api_key.map(str::to_string),
            api_url,
            Duration::from_secs(5),
            None,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_missing_key_serves_mock_headlines() {
        let provider = provider(None, "http://127.0.0.1:9".to_string());
        let items = provider
            .fetch_news(&["health".to_string(), "gardening".to_string()])
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].category, "health");
    }

    #[tokio::test]
    async fn test_blank_key_counts_as_missing() {
        let provider = provider(Some("   "), "http://127.0.0.1:9".to_string());
        assert!(provider.api_key.is_none());

        let items = provider.fetch_news(&["sports".to_string()]).await.unwrap();
        assert!(items.iter().all(|item| item.category == "sports"));
        assert!(!items.is_empty());
    }

    #[tokio::test]
    async fn test_headlines_are_tagged_and_deduped_by_url() {
        let url = spawn_upstream().await;
        let provider = provider(Some("key"), url);

        let items = provider
            .fetch_news(&["sports".to_string(), "science".to_string()])
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].url, "https://news.test/cup-final");
        assert!(items[0].category == "sports" || items[0].category == "science");
    }

    #[tokio::test]
    async fn test_upstream_errors_fall_back_to_mock_headlines() {
        let url = spawn_upstream().await;
        let provider = provider(Some("key"), url);

        let items = provider.fetch_news(&["business".to_string()]).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].category, "business");
        assert!(items[0].url.starts_with("https://example.com/"));
    }

    #[tokio::test]
    async fn test_search_uses_relevancy_and_tags_search() {
        let url = spawn_upstream().await;
        let provider = provider(Some("key"), url);

        let items = provider.search_news("rust").await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Result for rust");
        assert_eq!(items[0].url, "https://news.test/relevancy");
        assert_eq!(items[0].category, SEARCH_CATEGORY);
        assert_eq!(items[0].description, "Only content here");
    }

    #[tokio::test]
    async fn test_trending_uses_popularity() {
        let url = spawn_upstream().await;
        let provider = provider(Some("key"), url);

        let items = provider.fetch_trending(7, "en").await.unwrap();
        assert_eq!(items[0].url, "https://news.test/popularity");
        assert_eq!(items[0].category, TRENDING_CATEGORY);
    }

    #[tokio::test]
    async fn test_search_without_key_is_error() {
        let provider = provider(None, "http://127.0.0.1:9".to_string());
        assert!(matches!(
            provider.search_news("rust").await,
            Err(AppError::ExternalApi(_))
        ));
    }

    #[tokio::test]
    async fn test_blank_query_returns_nothing() {
        let provider = provider(None, "http://127.0.0.1:9".to_string());
        assert!(provider.search_news("   ").await.unwrap().is_empty());
    }
}
