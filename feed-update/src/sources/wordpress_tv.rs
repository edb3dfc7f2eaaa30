use crate::sources::rss_feed::parse_latest;
use crate::types::{Item, ProviderAdapter, Transport};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

pub const FEED_URL: &str = "https://wordpress.tv/feed/";
pub const LABEL: &str = "wordpress tv";

static IFRAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<iframe\b[^>]*>.*?</iframe>").expect("valid iframe regex"));
static WIDTH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\swidth\s*=\s*(?:"[^"]*"|'[^']*'|[^'"\s>]+)"#).expect("valid width regex")
});
static HEIGHT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\sheight\s*=\s*(?:"[^"]*"|'[^']*'|[^'"\s>]+)"#).expect("valid height regex")
});

/// Latest WordPress.tv video; the content is its embed player.
pub struct WordPressTvAdapter {
    url: String,
}

impl WordPressTvAdapter {
    pub fn new() -> Self {
        Self {
            url: FEED_URL.to_string(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

impl Default for WordPressTvAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderAdapter for WordPressTvAdapter {
    async fn fetch(&self, transport: &dyn Transport) -> anyhow::Result<Item> {
        let body = transport.fetch(&self.url, LABEL).await?;
        let Some(latest) = parse_latest(&body)? else {
            return Ok(Item::default());
        };

        Ok(Item {
            title: latest.title,
            link: latest.link,
            pub_date: latest.pub_date,
            content: extract_first_iframe(&latest.encoded),
            categories: latest.categories,
        })
    }
}

/// First `<iframe>…</iframe>` in `html`, resized to fill its container.
/// Empty when there is none.
pub fn extract_first_iframe(html: &str) -> String {
    let html = html.trim();
    if html.is_empty() {
        return String::new();
    }
    let found = IFRAME_RE.find(html).map(|m| m.as_str().trim()).unwrap_or("");
    normalize_iframe(found)
}

/// Forces `width="100%"` and `height="auto"` on the opening tag.
pub fn normalize_iframe(iframe: &str) -> String {
    if iframe.is_empty() {
        return String::new();
    }
    let Some(tag_end) = iframe.find('>') else {
        return iframe.to_string();
    };
    let (open_tag, rest) = iframe.split_at(tag_end);
    if !open_tag.to_ascii_lowercase().contains("<iframe") {
        return iframe.to_string();
    }

    let open_tag = set_attr(open_tag, "width", "100%", &WIDTH_RE);
    let open_tag = set_attr(&open_tag, "height", "auto", &HEIGHT_RE);
    format!("{}{}", open_tag, rest)
}

fn set_attr(open_tag: &str, name: &str, value: &str, pattern: &Regex) -> String {
    let attr = format!(" {}=\"{}\"", name, value);
    if pattern.is_match(open_tag) {
        return pattern.replace_all(open_tag, NoExpand(&attr)).into_owned();
    }
    format!("{}{}", open_tag.trim(), attr)
}
