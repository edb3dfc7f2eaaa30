use crate::normalize::format_wire;
use crate::types::{FeedError, Result};
use feed_rs::parser;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

/// The fields adapters read from the newest item of an upstream feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LatestEntry {
    pub title: String,
    pub link: String,
    /// Publish time exactly as the upstream wrote it, empty when absent.
    pub pub_date: String,
    /// `<description>`
    pub description: String,
    /// `<content:encoded>`
    pub encoded: String,
    pub categories: Vec<String>,
}

/// Parses an RSS/Atom document and returns its first item, if any.
pub fn parse_latest(body: &[u8]) -> Result<Option<LatestEntry>> {
    debug!("Parsing feed content ({} bytes)", body.len());

    let feed = parser::parse(body).map_err(|e| FeedError::Parse(format!("Failed to parse feed: {}", e)))?;
    let Some(entry) = feed.entries.into_iter().next() else {
        return Ok(None);
    };

    // feed-rs normalizes dates to UTC; identity hashes the upstream text.
    let pub_date = match first_item_pub_date(body) {
        Ok(Some(raw)) => raw,
        Ok(None) => entry.published.map(format_wire).unwrap_or_default(),
        Err(e) => {
            debug!("No raw pubDate ({}), using the parsed one", e);
            entry.published.map(format_wire).unwrap_or_default()
        }
    };

    Ok(Some(LatestEntry {
        title: entry.title.map(|t| t.content).unwrap_or_default(),
        link: entry.links.first().map(|l| l.href.clone()).unwrap_or_default(),
        pub_date,
        description: entry.summary.map(|s| s.content).unwrap_or_default(),
        encoded: entry.content.and_then(|c| c.body).unwrap_or_default(),
        categories: entry.categories.into_iter().map(|c| c.term).collect(),
    }))
}

/// Text of the `<pubDate>` of the first `<item>`, empty when the item has
/// none. `None` when the document has no `<item>` (Atom).
fn first_item_pub_date(body: &[u8]) -> quick_xml::Result<Option<String>> {
    let mut reader = Reader::from_reader(body);
    let mut buf = Vec::new();
    let mut in_item = false;
    let mut in_pub_date = false;
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"item" => in_item = true,
                b"pubDate" if in_item => in_pub_date = true,
                _ => {}
            },
            Event::Text(t) if in_pub_date => text.push_str(&t.unescape()?),
            Event::CData(c) if in_pub_date => text.push_str(&String::from_utf8_lossy(&c)),
            Event::End(e) => match e.local_name().as_ref() {
                b"pubDate" if in_pub_date => return Ok(Some(text)),
                b"item" if in_item => return Ok(Some(String::new())),
                _ => {}
            },
            Event::Eof => return Ok(None),
            _ => {}
        }
        buf.clear();
    }
}
