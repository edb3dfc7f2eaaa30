use crate::sources::rss_feed::parse_latest;
use crate::summarize::Summarizer;
use crate::types::{Item, ProviderAdapter, Transport};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

pub const FEED_URL: &str = "https://wordpress.com/blog/feed/";
pub const LABEL: &str = "wordpress com";

const SUMMARY_PATTERN: &str = "Write a very brief summary in 1-2 sentences. Respond without HTML or Markdown. Text:\n\n%s";

/// Latest post on the WordPress.com blog, reduced to its title and a short
/// summary.
pub struct WordPressComAdapter {
    url: String,
    summarizer: Arc<dyn Summarizer>,
}

impl WordPressComAdapter {
    pub fn new(summarizer: Arc<dyn Summarizer>) -> Self {
        Self {
            url: FEED_URL.to_string(),
            summarizer,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    async fn build_content(&self, title: &str, encoded: &str) -> String {
        let title = title.trim();
        let body = encoded.trim();

        let mut summary = String::new();
        if !body.is_empty() {
            match self.summarizer.summarize(SUMMARY_PATTERN, body).await {
                Ok(result) => summary = result.trim().to_string(),
                Err(e) => warn!("No summary for blog post {:?}: {}", title, e),
            }
        }

        match (title.is_empty(), summary.is_empty()) {
            (true, true) => String::new(),
            (_, true) => format!("<p><strong>{}</strong></p>", title),
            _ => format!("<p><strong>{}</strong></p><p>{}</p>", title, summary),
        }
    }
}

#[async_trait]
impl ProviderAdapter for WordPressComAdapter {
    async fn fetch(&self, transport: &dyn Transport) -> anyhow::Result<Item> {
        let body = transport.fetch(&self.url, LABEL).await?;
        let Some(latest) = parse_latest(&body)? else {
            return Ok(Item::default());
        };

        let content = self.build_content(&latest.title, &latest.encoded).await;
        Ok(Item {
            title: latest.title,
            link: latest.link,
            pub_date: latest.pub_date,
            content,
            categories: latest.categories,
        })
    }
}
