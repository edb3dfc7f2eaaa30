//! Manually curated articles, one JSON record per file.

use crate::normalize::{clean_categories, format_canonical, hash_string, parse_canonical};
use crate::types::{Entry, MANUAL_SOURCE};
use chrono::Utc;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Loads every valid manual article under `dir`, in file name order.
///
/// A missing directory means no manual articles. Files that fail to read,
/// parse or validate are skipped one by one.
pub fn load_manual_entries(dir: &Path) -> Vec<Entry> {
    if !dir.is_dir() {
        debug!("No manual article directory at {}", dir.display());
        return Vec::new();
    }

    let mut entries = Vec::new();
    for dir_entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = dir_entry.path();
        if !dir_entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        match load_manual_file(path) {
            Ok(entry) => entries.push(entry),
            Err(reason) => warn!("Skipping manual article {}: {}", path.display(), reason),
        }
    }
    entries
}

fn load_manual_file(path: &Path) -> Result<Entry, String> {
    let data = std::fs::read(path).map_err(|e| e.to_string())?;
    let raw: Entry = serde_json::from_slice(&data).map_err(|e| e.to_string())?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    normalize_manual(raw, file_name)
}

/// Validates one parsed record and fills in what the file may omit.
///
/// The identity, when absent, hashes the file name with the link and
/// timestamp, so the same file always yields the same id.
pub fn normalize_manual(raw: Entry, file_name: &str) -> Result<Entry, String> {
    let title = raw.title.trim();
    if title.is_empty() {
        return Err("missing title".to_string());
    }
    let created_at = parse_canonical(&raw.created_at)
        .map(|parsed| format_canonical(parsed.with_timezone(&Utc)))
        .ok_or_else(|| format!("invalid created_at {:?}", raw.created_at))?;

    let mut id = raw.id.trim().to_string();
    if id.is_empty() {
        id = hash_string(&format!(
            "{}|{}|{}|{}",
            MANUAL_SOURCE,
            file_name,
            raw.link.trim(),
            created_at
        ));
    }

    Ok(Entry {
        id,
        source: MANUAL_SOURCE.to_string(),
        title: raw.title,
        link: raw.link,
        content: raw.content,
        iframe: raw.iframe,
        created_at,
        categories: clean_categories(&raw.categories),
    })
}

/// Appends manual articles to the automated entries, skipping any identity
/// already folded in, including one taken by an earlier manual file.
pub fn merge_entries(automated: Vec<Entry>, manual: Vec<Entry>) -> Vec<Entry> {
    let mut seen: HashSet<String> = automated.iter().map(|entry| entry.id.clone()).collect();
    let mut merged = automated;

    for entry in manual {
        if !seen.insert(entry.id.clone()) {
            debug!("Manual article {} duplicates a known id", entry.id);
            continue;
        }
        merged.push(entry);
    }
    merged
}

pub fn merge(automated: Vec<Entry>, manual_dir: &Path) -> Vec<Entry> {
    merge_entries(automated, load_manual_entries(manual_dir))
}
