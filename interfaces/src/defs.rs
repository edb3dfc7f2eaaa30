use anyhow::Result;
use async_trait::async_trait;

/// One upstream content unit as normalized by a provider adapter.
///
/// Items are produced fresh on every fetch and never persisted directly;
/// the feed updater assigns identity and a canonical timestamp before an
/// item becomes a stored entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Item {
    pub title: String,
    pub link: String,
    /// Raw upstream timestamp, exactly as the source published it.
    pub pub_date: String,
    /// Text or HTML body.
    pub content: String,
    pub categories: Vec<String>,
}

/// Byte transport handed to adapters.
///
/// `source_label` is a human readable name for the upstream, used only in
/// error messages ("wordpress tv api status: 404 Not Found").
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, url: &str, source_label: &str) -> Result<Vec<u8>>;
}

/// Pulls the latest item of one upstream source.
///
/// An adapter that finds nothing returns `Item::default()`, not an error.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    async fn fetch(&self, transport: &dyn Transport) -> Result<Item>;
}

// Object style note:
// Adapters run inside a short lived single-pass process. They keep no state
// between runs; anything they need (urls, prompts, a summarizer handle) is
// fixed at construction time.
