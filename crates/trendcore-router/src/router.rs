use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use trendcore_config::ScraperConfig;
use trendcore_fetch::{ManagedReaderFetcher, PlainHttpFetcher};
use trendcore_headless::HeadlessFetcher;
use trendcore_types::{FetchError, FetchOutcome, FetcherKind};
use trendcore_utils::domain::extract_host;

use crate::domains::{is_js_render_domain, is_reader_preferred_domain, parse_rule};

/// Stateless dispatcher: holds one instance of each enabled fetcher and
/// tries them in priority order per URL. Does not touch the content store —
/// the caller is expected to filter already-seen URLs beforehand and persist
/// successes afterward.
pub struct Router {
    config: ScraperConfig,
    reader: Option<ManagedReaderFetcher>,
    plain: Option<PlainHttpFetcher>,
    headless: Option<Arc<HeadlessFetcher>>,
}

/// Called once per completed URL during `scrape_many`, in completion order.
pub type ProgressCallback<'a> = dyn Fn(usize, usize) + Send + Sync + 'a;

impl Router {
    pub fn new(
        config: ScraperConfig,
        reader: Option<ManagedReaderFetcher>,
        plain: Option<PlainHttpFetcher>,
        headless: Option<Arc<HeadlessFetcher>>,
    ) -> Self {
        Self {
            config,
            reader,
            plain,
            headless,
        }
    }

    /// Ordered fetcher priority for a single URL, per the domain-rule then
    /// built-in-set then default-order selection algorithm.
    fn priority_for(&self, url: &str) -> Vec<FetcherKind> {
        let host = extract_host(url);

        let primary = self
            .config
            .domain_rules
            .iter()
            .find(|(domain, _)| host == domain.to_ascii_lowercase())
            .and_then(|(_, rule)| parse_rule(rule))
            .or_else(|| is_js_render_domain(&host).then_some(FetcherKind::HeadlessBrowser))
            .or_else(|| is_reader_preferred_domain(&host).then_some(FetcherKind::ManagedReader));

        build_priority_list(primary)
    }

    fn is_enabled(&self, kind: FetcherKind) -> bool {
        match kind {
            FetcherKind::ManagedReader => self.reader.is_some(),
            FetcherKind::PlainHttp => self.plain.is_some(),
            FetcherKind::HeadlessBrowser => self.headless.is_some(),
        }
    }

    async fn dispatch_one(&self, kind: FetcherKind, url: &str) -> FetchOutcome {
        match kind {
            FetcherKind::ManagedReader => self.reader.as_ref().unwrap().fetch(url).await,
            FetcherKind::PlainHttp => self.plain.as_ref().unwrap().fetch(url).await,
            FetcherKind::HeadlessBrowser => self.headless.as_ref().unwrap().fetch(url).await,
        }
    }

    /// Tries fetchers in priority order, returning the first success. If
    /// every enabled fetcher fails, returns a `Failure` carrying the last
    /// fetcher's error message.
    pub async fn scrape(&self, url: &str) -> FetchOutcome {
        if !self.config.enabled {
            return FetchOutcome::Failure {
                error: FetchError::FetcherExhausted,
                message: "content scraping is disabled".to_string(),
                kind: FetcherKind::PlainHttp,
            };
        }

        let priority = self.priority_for(url);
        let mut last: Option<FetchOutcome> = None;

        for kind in priority {
            if !self.is_enabled(kind) {
                continue;
            }

            let outcome = self.dispatch_one(kind, url).await;
            match &outcome {
                FetchOutcome::Success { .. } => {
                    info!(url = %url, fetcher = %kind, "fetch succeeded");
                    return outcome;
                }
                FetchOutcome::Failure { message, .. } => {
                    warn!(url = %url, fetcher = %kind, error = %message, "fetch failed, trying next");
                }
            }
            last = Some(outcome);
        }

        match last {
            Some(FetchOutcome::Failure { message, kind, .. }) => FetchOutcome::Failure {
                error: FetchError::FetcherExhausted,
                message: format!("all fetchers failed: {message}"),
                kind,
            },
            _ => FetchOutcome::Failure {
                error: FetchError::FetcherExhausted,
                message: "all fetchers failed: no fetcher is enabled".to_string(),
                kind: FetcherKind::PlainHttp,
            },
        }
    }

    /// Truncates to the first `top_n` URLs, fetches concurrently (gated by
    /// `max_concurrent`), and returns a result for every URL attempted.
    /// `on_progress(completed, total)` fires once per completed fetch, in
    /// completion order.
    pub async fn scrape_many(
        &self,
        urls: &[String],
        max_concurrent: usize,
        on_progress: Option<&ProgressCallback<'_>>,
    ) -> HashMap<String, FetchOutcome> {
        let batch: Vec<&String> = urls.iter().take(self.config.top_n).collect();
        let total = batch.len();
        if total == 0 {
            return HashMap::new();
        }

        let completed = std::sync::atomic::AtomicUsize::new(0);
        let results = stream::iter(batch.into_iter())
            .map(|url| async move {
                let outcome = self.scrape(url).await;
                let n = completed.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
                if let Some(cb) = on_progress {
                    cb(n, total);
                }
                (url.clone(), outcome)
            })
            .buffer_unordered(max_concurrent.max(1))
            .collect::<Vec<_>>()
            .await;

        results.into_iter().collect()
    }
}

fn build_priority_list(primary: Option<FetcherKind>) -> Vec<FetcherKind> {
    const DEFAULT_ORDER: [FetcherKind; 3] = [
        FetcherKind::ManagedReader,
        FetcherKind::PlainHttp,
        FetcherKind::HeadlessBrowser,
    ];

    let Some(primary) = primary else {
        return DEFAULT_ORDER.to_vec();
    };

    let mut list = vec![primary];
    list.extend(DEFAULT_ORDER.into_iter().filter(|k| *k != primary));
    list
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_priority_list_matches_spec_order() {
        assert_eq!(
            build_priority_list(None),
            vec![
                FetcherKind::ManagedReader,
                FetcherKind::PlainHttp,
                FetcherKind::HeadlessBrowser
            ]
        );
    }

    #[test]
    fn primary_is_moved_to_front() {
        assert_eq!(
            build_priority_list(Some(FetcherKind::HeadlessBrowser)),
            vec![
                FetcherKind::HeadlessBrowser,
                FetcherKind::ManagedReader,
                FetcherKind::PlainHttp,
            ]
        );
    }
}
