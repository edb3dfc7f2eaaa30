pub mod config;
pub mod fetcher;
pub mod ingest;
pub mod manual;
pub mod normalize;
pub mod render;
pub mod sources;
pub mod store;
pub mod summarize;
pub mod types;
pub mod updater;

pub use types::*;
pub use config::{Paths, SummarizerConfig};
pub use fetcher::Fetcher;
pub use ingest::{ingest, ingest_all, IngestSummary, MergePolicy, Provider};
pub use manual::merge;
pub use render::render;
pub use store::EntryStore;
pub use summarize::Summarizer;
pub use updater::FeedUpdater;
