use crate::normalize::{clean_categories, created_at, entry_id_at};
use crate::store::EntryStore;
use crate::types::{Entry, FeedError, Item, ProviderAdapter, Result, Transport};
use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

/// How a provider's items are folded into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Set semantics: append unless the identity is already stored.
    Accumulate,
    /// The store holds at most one entry from this provider; a new item
    /// replaces it.
    SingletonReplace,
}

/// A named upstream source paired with its adapter.
pub struct Provider {
    pub name: String,
    pub policy: MergePolicy,
    pub adapter: Box<dyn ProviderAdapter>,
}

impl Provider {
    pub fn new(name: impl Into<String>, policy: MergePolicy, adapter: Box<dyn ProviderAdapter>) -> Self {
        Self {
            name: name.into(),
            policy,
            adapter,
        }
    }

    pub fn accumulate(name: impl Into<String>, adapter: Box<dyn ProviderAdapter>) -> Self {
        Self::new(name, MergePolicy::Accumulate, adapter)
    }

    pub fn singleton(name: impl Into<String>, adapter: Box<dyn ProviderAdapter>) -> Self {
        Self::new(name, MergePolicy::SingletonReplace, adapter)
    }
}

/// Outcome of one pass over every provider.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    pub changed: bool,
    pub updated: Vec<String>,
    pub failed: Vec<String>,
}

/// Polls one provider and folds its latest item into `store`.
///
/// Returns whether the store changed. Adapter and transport failures come
/// back as `FeedError::Provider` and leave the store untouched.
pub async fn ingest(provider: &Provider, transport: &dyn Transport, store: &mut EntryStore) -> Result<bool> {
    let item = provider
        .adapter
        .fetch(transport)
        .await
        .map_err(|error| FeedError::Provider {
            name: provider.name.clone(),
            error,
        })?;
    Ok(apply_item(&provider.name, provider.policy, item, store, Utc::now()))
}

/// Polls every provider in order. One provider failing never stops the rest.
pub async fn ingest_all(providers: &[Provider], transport: &dyn Transport, store: &mut EntryStore) -> IngestSummary {
    let mut summary = IngestSummary::default();

    for provider in providers {
        match ingest(provider, transport, store).await {
            Ok(true) => {
                info!("Provider {}: new entry stored", provider.name);
                summary.changed = true;
                summary.updated.push(provider.name.clone());
            }
            Ok(false) => {
                debug!("Provider {}: nothing new", provider.name);
            }
            Err(e) => {
                error!("{}", e);
                summary.failed.push(provider.name.clone());
            }
        }
    }

    info!(
        "Ingested {} providers: {} updated, {} failed",
        providers.len(),
        summary.updated.len(),
        summary.failed.len()
    );
    summary
}

/// Validates `item`, assigns identity and time, and applies `policy`.
/// `now` feeds the fallbacks for a missing identity basis or pub date.
pub fn apply_item(provider: &str, policy: MergePolicy, item: Item, store: &mut EntryStore, now: DateTime<Utc>) -> bool {
    if item.title.trim().is_empty() {
        return false;
    }

    let id = entry_id_at(provider, &item, now);
    let timestamp = created_at(&item, now);
    let categories = clean_categories(&item.categories);
    let entry = Entry {
        id,
        source: provider.to_string(),
        title: item.title,
        link: item.link,
        content: item.content,
        iframe: None,
        created_at: timestamp,
        categories,
    };

    match policy {
        MergePolicy::Accumulate => {
            if store.contains_id(&entry.id) {
                debug!("Skipping known entry {} from {}", entry.id, provider);
                return false;
            }
            store.push(entry);
            true
        }
        MergePolicy::SingletonReplace => {
            let current: Vec<&Entry> = store
                .entries()
                .iter()
                .filter(|existing| is_attributable(existing, provider))
                .collect();
            if current.len() == 1 && current[0].id == entry.id {
                debug!("Singleton entry from {} is current", provider);
                return false;
            }
            store.replace_where(|existing| is_attributable(existing, provider), entry);
            true
        }
    }
}

/// Whether `entry` came from the singleton `provider`: by source tag, or for
/// legacy records without one, by a `release`/`releases` category.
/// A record tagged by another source is never attributable.
pub fn is_attributable(entry: &Entry, provider: &str) -> bool {
    if !entry.source.is_empty() {
        return entry.source == provider;
    }
    entry.categories.iter().any(|category| {
        let category = category.trim();
        category.eq_ignore_ascii_case("release") || category.eq_ignore_ascii_case("releases")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const RELEASES: &str = "wordpress-releases";
    const TV: &str = "wordpress-tv";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    fn release(version: &str, pub_date: &str) -> Item {
        Item {
            title: format!("WordPress {}", version),
            link: format!("https://wordpress.org/news/{}", version),
            pub_date: pub_date.to_string(),
            content: "<p>highlights</p>".to_string(),
            categories: vec![" Releases ".to_string(), "".to_string()],
        }
    }

    fn video(title: &str, pub_date: &str, link: &str) -> Item {
        Item {
            title: title.to_string(),
            link: link.to_string(),
            pub_date: pub_date.to_string(),
            ..Default::default()
        }
    }

    fn count_from(store: &EntryStore, provider: &str) -> usize {
        store.entries().iter().filter(|e| is_attributable(e, provider)).count()
    }

    #[test]
    fn singleton_first_ingest_stores_entry() {
        let mut store = EntryStore::default();
        let changed = apply_item(
            RELEASES,
            MergePolicy::SingletonReplace,
            release("6.5.4", "Tue, 04 Jun 2024 10:00:00 +0000"),
            &mut store,
            now(),
        );
        assert!(changed);
        assert_eq!(store.len(), 1);
        let stored = &store.entries()[0];
        assert_eq!(stored.source, RELEASES);
        assert_eq!(stored.created_at, "2024-06-04T10:00:00Z");
        assert_eq!(stored.categories, vec!["Releases"]);
    }

    #[test]
    fn singleton_same_item_is_noop() {
        let mut store = EntryStore::default();
        let item = release("6.5.4", "Tue, 04 Jun 2024 10:00:00 +0000");
        assert!(apply_item(RELEASES, MergePolicy::SingletonReplace, item.clone(), &mut store, now()));
        let snapshot = store.clone();
        assert!(!apply_item(RELEASES, MergePolicy::SingletonReplace, item, &mut store, now()));
        assert_eq!(store, snapshot);
    }

    #[test]
    fn singleton_new_release_replaces_old_and_keeps_others() {
        let mut store = EntryStore::default();
        apply_item(TV, MergePolicy::Accumulate, video("Talk", "Mon, 03 Jun 2024 09:00:00 +0000", ""), &mut store, now());
        apply_item(
            RELEASES,
            MergePolicy::SingletonReplace,
            release("6.5.3", "Tue, 07 May 2024 10:00:00 +0000"),
            &mut store,
            now(),
        );
        let changed = apply_item(
            RELEASES,
            MergePolicy::SingletonReplace,
            release("6.5.4", "Tue, 04 Jun 2024 10:00:00 +0000"),
            &mut store,
            now(),
        );
        assert!(changed);
        assert_eq!(store.len(), 2);
        assert_eq!(count_from(&store, RELEASES), 1);
        assert!(store.entries().iter().any(|e| e.title == "WordPress 6.5.4"));
        assert!(store.entries().iter().any(|e| e.title == "Talk"));
    }

    #[test]
    fn singleton_replaces_legacy_release_without_source() {
        let legacy = Entry {
            id: "legacy".to_string(),
            title: "WordPress 6.4".to_string(),
            created_at: "2023-11-07T10:00:00Z".to_string(),
            categories: vec!["RELEASE".to_string()],
            ..Default::default()
        };
        let mut store = EntryStore::new(vec![legacy]);
        apply_item(
            RELEASES,
            MergePolicy::SingletonReplace,
            release("6.5.4", "Tue, 04 Jun 2024 10:00:00 +0000"),
            &mut store,
            now(),
        );
        assert_eq!(store.len(), 1);
        assert_eq!(store.entries()[0].source, RELEASES);
    }

    #[test]
    fn singleton_collapses_duplicate_release_entries() {
        let mut store = EntryStore::default();
        let item = release("6.5.4", "Tue, 04 Jun 2024 10:00:00 +0000");
        apply_item(RELEASES, MergePolicy::SingletonReplace, item.clone(), &mut store, now());
        let mut stray = store.entries()[0].clone();
        stray.id = "stray".to_string();
        store.push(stray);

        assert!(apply_item(RELEASES, MergePolicy::SingletonReplace, item, &mut store, now()));
        assert_eq!(count_from(&store, RELEASES), 1);
    }

    #[test]
    fn accumulate_skips_known_identity() {
        let mut store = EntryStore::default();
        let first = video("Talk", "Mon, 03 Jun 2024 09:00:00 +0000", "https://wordpress.tv/talk");
        let second = video("Talk", "Mon, 03 Jun 2024 09:00:00 +0000", "https://wordpress.tv/talk   ");
        assert!(apply_item(TV, MergePolicy::Accumulate, first, &mut store, now()));
        assert!(!apply_item(TV, MergePolicy::Accumulate, second, &mut store, now()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn accumulate_appends_new_identity() {
        let mut store = EntryStore::default();
        apply_item(TV, MergePolicy::Accumulate, video("One", "Mon, 03 Jun 2024 09:00:00 +0000", ""), &mut store, now());
        apply_item(TV, MergePolicy::Accumulate, video("Two", "Tue, 04 Jun 2024 09:00:00 +0000", ""), &mut store, now());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn blank_title_is_nothing_new() {
        let mut store = EntryStore::default();
        let blank = video("   ", "Mon, 03 Jun 2024 09:00:00 +0000", "");
        assert!(!apply_item(TV, MergePolicy::Accumulate, blank.clone(), &mut store, now()));
        assert!(!apply_item(RELEASES, MergePolicy::SingletonReplace, blank, &mut store, now()));
        assert!(store.is_empty());
    }
}
