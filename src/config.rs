use serde::Deserialize;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// News API key. Without it the news source serves the built-in headlines.
    #[serde(default)]
    pub news_api_key: Option<String>,

    /// News API base URL
    #[serde(default = "default_news_api_url")]
    pub news_api_url: String,

    /// OMDB API key
    #[serde(default)]
    pub omdb_api_key: Option<String>,

    /// OMDB API base URL
    #[serde(default = "default_omdb_api_url")]
    pub omdb_api_url: String,

    /// Redis connection URL. When set, upstream responses are cached and
    /// preferences are stored in Redis instead of the preferences file.
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Location of the JSON preferences file
    #[serde(default = "default_preferences_path")]
    pub preferences_path: String,

    /// Quiet period before a search query is dispatched
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// Quiet period before a category change triggers a refetch
    #[serde(default = "default_refresh_debounce_ms")]
    pub refresh_debounce_ms: u64,

    /// Page size used by sections without a remembered size
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Timeout applied to every upstream request
    #[serde(default = "default_upstream_timeout_secs")]
    pub upstream_timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_news_api_url() -> String {
    "https://newsapi.org/v2".to_string()
}

fn default_omdb_api_url() -> String {
    "https://www.omdbapi.com".to_string()
}

fn default_preferences_path() -> String {
    "dashboard-preferences.json".to_string()
}

fn default_search_debounce_ms() -> u64 {
    500
}

fn default_refresh_debounce_ms() -> u64 {
    300
}

fn default_page_size() -> usize {
    6
}

fn default_upstream_timeout_secs() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            news_api_key: None,
            news_api_url: default_news_api_url(),
            omdb_api_key: None,
            omdb_api_url: default_omdb_api_url(),
            redis_url: None,
            preferences_path: default_preferences_path(),
            search_debounce_ms: default_search_debounce_ms(),
            refresh_debounce_ms: default_refresh_debounce_ms(),
            default_page_size: default_page_size(),
            upstream_timeout_secs: default_upstream_timeout_secs(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        if config.default_page_size == 0 {
            anyhow::bail!("DEFAULT_PAGE_SIZE must be at least 1");
        }

        Ok(config)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn refresh_debounce(&self) -> Duration {
        Duration::from_millis(self.refresh_debounce_ms)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_environment() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.search_debounce(), Duration::from_millis(500));
        assert_eq!(config.refresh_debounce(), Duration::from_millis(300));
        assert_eq!(config.default_page_size, 6);
        assert!(config.news_api_key.is_none());
        assert!(config.redis_url.is_none());
    }

    #[test]
    fn test_values_from_environment() {
        let vars = vec![
            ("PORT".to_string(), "8080".to_string()),
            ("NEWS_API_KEY".to_string(), "abc".to_string()),
            ("SEARCH_DEBOUNCE_MS".to_string(), "600".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.news_api_key.as_deref(), Some("abc"));
        assert_eq!(config.search_debounce(), Duration::from_millis(600));
    }
}
