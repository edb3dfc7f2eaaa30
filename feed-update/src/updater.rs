use crate::config::Paths;
use crate::ingest::{ingest_all, IngestSummary, Provider};
use crate::manual::merge;
use crate::render::{render, renderable};
use crate::store::{load_site, EntryStore};
use crate::types::{Entry, FeedError, Result, Transport, MANUAL_SOURCE};
use feed_rs::parser;
use std::path::Path;
use tracing::info;

/// One batch pass: ingest every provider, persist, merge manual articles and
/// render the feed.
pub struct FeedUpdater {
    paths: Paths,
    providers: Vec<Provider>,
    transport: Box<dyn Transport>,
}

impl FeedUpdater {
    pub fn new(paths: Paths, providers: Vec<Provider>, transport: Box<dyn Transport>) -> Self {
        Self {
            paths,
            providers,
            transport,
        }
    }

    /// Provider failures are logged and reported in the summary. Failing to
    /// read the store or to write the store or the feed is an error.
    ///
    /// The feed is rendered on every run so manual article edits show up;
    /// with unchanged inputs the output is byte for byte the same.
    pub async fn run(&self) -> Result<IngestSummary> {
        let site = load_site(&self.paths.site);
        let mut store = EntryStore::load(&self.paths.entries)?;
        info!("Loaded {} stored entries", store.len());

        let summary = ingest_all(&self.providers, self.transport.as_ref(), &mut store).await;
        if summary.changed {
            store.save(&self.paths.entries)?;
        }

        let entries = merge(store.into_entries(), &self.paths.articles);
        render(&site, &entries, &self.paths.feed)?;
        Ok(summary)
    }
}

/// Deletes the `number`-th item (1-based, feed order) from the store and
/// re-renders. Manual articles live in their own files and are refused.
pub fn delete_item(paths: &Paths, number: usize) -> Result<Entry> {
    let site = load_site(&paths.site);
    let mut store = EntryStore::load(&paths.entries)?;
    let entries = merge(store.entries().to_vec(), &paths.articles);

    let target = {
        let items = renderable(&entries);
        if number == 0 || number > items.len() {
            return Err(FeedError::InvalidItemIndex {
                index: number,
                total: items.len(),
            });
        }
        items[number - 1].0.clone()
    };

    if target.source == MANUAL_SOURCE {
        return Err(FeedError::General(format!(
            "item {} ({}) is a manual article; remove its file from {}",
            number,
            target.title,
            paths.articles.display()
        )));
    }

    let removed = store
        .remove(&target.id)
        .ok_or_else(|| FeedError::General(format!("entry {} is not in the store", target.id)))?;
    store.save(&paths.entries)?;

    let entries = merge(store.into_entries(), &paths.articles);
    render(&site, &entries, &paths.feed)?;
    info!("Deleted {:?} ({})", removed.title, removed.id);
    Ok(removed)
}

/// Titles of the items in a rendered feed file, in document order.
pub fn feed_titles(feed: &Path) -> Result<Vec<String>> {
    let data = std::fs::read(feed)?;
    let parsed = parser::parse(data.as_slice())
        .map_err(|e| FeedError::Parse(format!("Failed to parse {}: {}", feed.display(), e)))?;
    Ok(parsed
        .entries
        .into_iter()
        .map(|entry| entry.title.map(|t| t.content).unwrap_or_default())
        .collect())
}
