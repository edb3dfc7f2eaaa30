use crate::types::{Entry, Result, Site};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// The full collection of entries for one run.
///
/// Loaded entirely at start, mutated in place by the ingestion engine and
/// written back in full. There is never more than one writer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryStore {
    entries: Vec<Entry>,
}

impl EntryStore {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    /// A missing file is an empty store. A file that exists but does not
    /// parse is an error: saving over it would drop every record.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No entry store at {}, starting empty", path.display());
            return Ok(Self::default());
        }
        let data = std::fs::read(path)?;
        let entries: Vec<Entry> = serde_json::from_slice(&data)?;
        debug!("Loaded {} entries from {}", entries.len(), path.display());
        Ok(Self { entries })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(path, &self.entries)?;
        info!("Saved {} entries to {}", self.entries.len(), path.display());
        Ok(())
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Drops every entry matching `is_replaced` and appends `entry`, as one
    /// swap of the backing vector.
    pub fn replace_where<F>(&mut self, is_replaced: F, entry: Entry)
    where
        F: Fn(&Entry) -> bool,
    {
        let mut next: Vec<Entry> = self
            .entries
            .iter()
            .filter(|existing| !is_replaced(existing))
            .cloned()
            .collect();
        next.push(entry);
        self.entries = next;
    }

    /// Removes the entry with `id`, returning it.
    pub fn remove(&mut self, id: &str) -> Option<Entry> {
        let position = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(position))
    }
}

/// Reads `site.json`, falling back to defaults when it is missing or broken.
pub fn load_site(path: &Path) -> Site {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(_) => return Site::default(),
    };
    match serde_json::from_slice(&data) {
        Ok(site) => site,
        Err(e) => {
            warn!("Ignoring unreadable site config {}: {}", path.display(), e);
            Site::default()
        }
    }
}

/// Pretty JSON with two-space indentation and a trailing newline.
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut data = serde_json::to_vec_pretty(value)?;
    data.push(b'\n');
    std::fs::write(path, data)?;
    Ok(())
}
