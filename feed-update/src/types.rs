use serde::{Deserialize, Serialize};

pub use interfaces::defs::{Item, ProviderAdapter, Transport};

/// Provider tag of the one singleton-sourced provider.
pub const RELEASES_PROVIDER: &str = "wordpress-releases";
pub const WORDPRESS_TV_PROVIDER: &str = "wordpress-tv";
pub const WORDPRESS_COM_PROVIDER: &str = "wordpress-com";

/// Source tag forced onto every manually curated record.
pub const MANUAL_SOURCE: &str = "manual-article";

/// A persisted, deduplicated content record.
///
/// Every field defaults when absent so legacy records written before a field
/// existed still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iframe: Option<String>,
    /// Canonical timestamp (`2024-06-04T10:00:00Z`). Kept as a string so a
    /// corrupt value survives a load/save cycle verbatim.
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
}

/// Channel metadata of the rendered feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Site {
    pub title: String,
    pub link: String,
    pub description: String,
}

impl Default for Site {
    fn default() -> Self {
        Self {
            title: "Wapuugotchi RSS".to_string(),
            link: String::new(),
            description: String::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub accept: String,
    pub timeout_seconds: u64,
    /// Retries granted to a rate limited (429) request. Nothing else is retried.
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            accept: "application/rss+xml, application/xml;q=0.9, text/xml;q=0.8, */*;q=0.7".to_string(),
            timeout_seconds: 15,
            max_retries: 1,
            retry_delay_ms: 2000,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{label} api status: {status}")]
    Status { label: String, status: String },

    #[error("{label} still rate limited after {attempts} attempts")]
    RateLimited { label: String, attempts: u32 },

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("provider {name} failed: {error:#}")]
    Provider { name: String, error: anyhow::Error },

    #[error("Summarizer error: {0}")]
    Summarizer(String),

    #[error("Invalid item number {index}: feed has {total} items")]
    InvalidItemIndex { index: usize, total: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, FeedError>;
