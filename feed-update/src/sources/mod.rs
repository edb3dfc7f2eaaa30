pub mod releases;
pub mod rss_feed;
pub mod wordpress_com;
pub mod wordpress_tv;

pub use releases::ReleasesAdapter;
pub use wordpress_com::WordPressComAdapter;
pub use wordpress_tv::WordPressTvAdapter;

use crate::ingest::Provider;
use crate::summarize::Summarizer;
use crate::types::{RELEASES_PROVIDER, WORDPRESS_COM_PROVIDER, WORDPRESS_TV_PROVIDER};
use std::sync::Arc;

/// Every upstream source, in polling order.
pub fn default_providers(summarizer: Arc<dyn Summarizer>) -> Vec<Provider> {
    vec![
        Provider::singleton(RELEASES_PROVIDER, Box::new(ReleasesAdapter::new(summarizer.clone()))),
        Provider::accumulate(WORDPRESS_TV_PROVIDER, Box::new(WordPressTvAdapter::new())),
        Provider::accumulate(WORDPRESS_COM_PROVIDER, Box::new(WordPressComAdapter::new(summarizer))),
    ]
}
