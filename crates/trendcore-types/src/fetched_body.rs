use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Which strategy produced (or attempted to produce) a `FetchedBody`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetcherKind {
    ManagedReader,
    HeadlessBrowser,
    PlainHttp,
}

impl fmt::Display for FetcherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FetcherKind::ManagedReader => "managed_reader",
            FetcherKind::HeadlessBrowser => "headless_browser",
            FetcherKind::PlainHttp => "plain_http",
        };
        f.write_str(s)
    }
}

/// A scraped article body, as persisted in the content store.
///
/// `word_count` is derived from `body_text` at construction time and is never
/// recomputed on read — a later edit to `body_text` without going through
/// [`FetchedBody::new`] would leave it stale by design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedBody {
    pub url: String,
    pub title: String,
    pub body_text: String,
    /// First 10 KB of the source HTML, when the fetcher had HTML to keep.
    pub html_excerpt: Option<String>,
    pub author: Option<String>,
    pub publish_time: Option<DateTime<Utc>>,
    pub word_count: usize,
    pub image_urls: Vec<String>,
    pub metadata: FetchMetadata,
    pub fetched_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchMetadata {
    pub fetcher_kind: Option<String>,
    pub format: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl FetchedBody {
    /// Build a body, deriving `word_count` from `body_text` (code point count)
    /// and `expires_at` from `retention`.
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        body_text: impl Into<String>,
        metadata: FetchMetadata,
        retention: Duration,
    ) -> Self {
        let body_text = body_text.into();
        let word_count = body_text.chars().count();
        let fetched_at = Utc::now();
        Self {
            url: url.into(),
            title: title.into(),
            body_text,
            html_excerpt: None,
            author: None,
            publish_time: None,
            word_count,
            image_urls: Vec::new(),
            metadata,
            fetched_at,
            expires_at: Some(fetched_at + retention),
        }
    }

    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            None => true,
            Some(exp) => exp > now,
        }
    }
}

/// Outcome of a single fetch attempt by one fetcher.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Success {
        body: FetchedBody,
        kind: FetcherKind,
        elapsed_ms: u64,
    },
    Failure {
        error: FetchError,
        message: String,
        kind: FetcherKind,
    },
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success { .. })
    }

    pub fn kind(&self) -> FetcherKind {
        match self {
            FetchOutcome::Success { kind, .. } => *kind,
            FetchOutcome::Failure { kind, .. } => *kind,
        }
    }
}

/// Error taxonomy shared by every fetcher and the router, per the kinds
/// described in the error-handling design: fetchers never raise across the
/// router boundary, they report one of these kinds instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("timeout")]
    Timeout,
    #[error("network error")]
    Network,
    #[error("non-2xx http status")]
    HttpStatus,
    #[error("all fetchers exhausted")]
    FetcherExhausted,
}
