//! Durable `url -> FetchedBody` content store.
//!
//! Backed by a single-file SQLite database so the router can dedup fetches
//! across process restarts without standing up an external cache.

pub mod errors;
pub mod store;

pub use errors::{StoreError, StoreResult};
pub use store::{ContentStore, StoreStats};
