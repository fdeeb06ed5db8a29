//! Stateless, cache-agnostic dispatcher across the three fetcher strategies.
//!
//! Picks a per-URL priority order from domain rules and two built-in
//! domain sets, tries fetchers in that order until one succeeds, and runs
//! batches under a bounded semaphore. Composition with the content store
//! (filtering already-seen URLs, persisting successes) is the caller's job.

mod domains;
mod router;

pub use router::{ProgressCallback, Router};
