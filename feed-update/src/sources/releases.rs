use crate::sources::rss_feed::parse_latest;
use crate::summarize::Summarizer;
use crate::types::{Item, ProviderAdapter, Transport};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

pub const FEED_URL: &str = "https://wordpress.org/news/category/releases/feed/";
pub const LABEL: &str = "wordpress releases";

const HIGHLIGHTS_PATTERN: &str = "Extract key highlights from the text below. Output RAW HTML only. Do NOT escape HTML characters. Do NOT output JSON. Use literal < > characters, not unicode (e.g. < not \\u003c). Output must be a single line with no line breaks. Format EXACTLY: <p><strong>WordPress ###VERSION### is here!</strong></p><p>###Description###</p><ul><li><strong>###TITLE_HIGHLIGHT_1:###</strong> TEXT_HIGHLIGHT_1</li><li><strong>###TITLE_HIGHLIGHT_2:###</strong> TEXT_HIGHLIGHT_2</li><li><strong>###TITLE_HIGHLIGHT_n:###</strong> TEXT_HIGHLIGHT_n</li></ul> Description must be one short sentence (max 60 characters), high-level, and must not repeat the headline. Text:\n\n%s";

/// Latest WordPress core release announcement.
pub struct ReleasesAdapter {
    url: String,
    summarizer: Arc<dyn Summarizer>,
}

impl ReleasesAdapter {
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

    /// Highlights block written by the summarizer, or the raw description
    /// when no summary is available.
    async fn build_content(&self, description: &str) -> String {
        let content = description.trim();
        if content.is_empty() {
            return String::new();
        }
        match self.summarizer.summarize(HIGHLIGHTS_PATTERN, content).await {
            Ok(rendered) => rendered,
            Err(e) => {
                warn!("Keeping raw release description: {}", e);
                content.to_string()
            }
        }
    }
}

#[async_trait]
impl ProviderAdapter for ReleasesAdapter {
    async fn fetch(&self, transport: &dyn Transport) -> anyhow::Result<Item> {
        let body = transport.fetch(&self.url, LABEL).await?;
        let Some(latest) = parse_latest(&body)? else {
            return Ok(Item::default());
        };

        let content = self.build_content(&latest.description).await;
        Ok(Item {
            title: latest.title,
            link: latest.link,
            pub_date: latest.pub_date,
            content,
            categories: latest.categories,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::test_support::{FixedSummarizer, StaticTransport};

    const FEED: &str = r#"<rss version="2.0"><channel><title>Releases</title>
<item>
  <title>WordPress 6.5.4</title>
  <link>https://wordpress.org/news/2024/06/wordpress-6-5-4/</link>
  <pubDate>Tue, 04 Jun 2024 10:00:00 +0000</pubDate>
  <category>Releases</category>
  <description><![CDATA[  WordPress 6.5.4 is now available.  ]]></description>
</item></channel></rss>"#;

    #[tokio::test]
    async fn summary_becomes_content() {
        let transport = StaticTransport::new(FEED);
        let adapter = ReleasesAdapter::new(Arc::new(FixedSummarizer(Some("<p><strong>WordPress 6.5.4 is here!</strong></p>"))));
        let item = adapter.fetch(&transport).await.unwrap();

        assert_eq!(item.title, "WordPress 6.5.4");
        assert_eq!(item.pub_date, "Tue, 04 Jun 2024 10:00:00 +0000");
        assert_eq!(item.content, "<p><strong>WordPress 6.5.4 is here!</strong></p>");
        assert_eq!(item.categories, vec!["Releases"]);

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests[0], (FEED_URL.to_string(), LABEL.to_string()));
    }

    #[tokio::test]
    async fn summarizer_failure_keeps_description() {
        let transport = StaticTransport::new(FEED);
        let adapter = ReleasesAdapter::new(Arc::new(FixedSummarizer(None)));
        let item = adapter.fetch(&transport).await.unwrap();
        assert_eq!(item.content, "WordPress 6.5.4 is now available.");
    }

    #[tokio::test]
    async fn empty_channel_is_empty_item() {
        let transport = StaticTransport::new(r#"<rss version="2.0"><channel><title>x</title></channel></rss>"#);
        let adapter = ReleasesAdapter::new(Arc::new(FixedSummarizer(None)));
        assert_eq!(adapter.fetch(&transport).await.unwrap(), Item::default());
    }
}
