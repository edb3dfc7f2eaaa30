pub mod defs;
pub mod empty;

pub use defs::{Item, ProviderAdapter, Transport};
pub use empty::EmptyAdapter;
