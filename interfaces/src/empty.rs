use anyhow::Result;
use async_trait::async_trait;

use crate::defs::Item;
use crate::defs::ProviderAdapter;
use crate::defs::Transport;

/// Adapter for a source that never has anything new.
pub struct EmptyAdapter;

#[async_trait]
impl ProviderAdapter for EmptyAdapter {
    async fn fetch(&self, _transport: &dyn Transport) -> Result<Item> {
        // Nothing upstream, the ideal item is empty.
        Ok(Item::default())
    }
}
