//! Two of the three interchangeable scraping strategies: plain HTTP and the
//! managed-reader delegate. (The third, headless-browser, lives in
//! `trendcore-headless` since it owns a long-lived browser process.)
//!
//! The plain-HTTP fetcher runs GETs against a bounded worker pool, detects
//! encoding from `Content-Type` / `<meta charset>` / UTF-8 fallback, and
//! extracts article content through `trendcore-extraction`. The
//! managed-reader fetcher delegates extraction entirely to an external
//! text-extraction HTTP endpoint.

pub mod fetch;
pub mod reader;

pub use fetch::PlainHttpFetcher;
pub use reader::{ManagedReaderFetcher, ReaderOptions};
