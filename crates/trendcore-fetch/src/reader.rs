use std::time::Instant;

use chrono::Duration as ChronoDuration;
use reqwest::Client;
use tracing::instrument;

use trendcore_config::ManagedReaderConfig;
use trendcore_types::{FetchError, FetchMetadata, FetchOutcome, FetchedBody, FetcherKind};

const USER_AGENT: &str = "TrendCore/1.0";
const FAILURE_BODY_PREVIEW: usize = 200;

/// Delegates extraction to an external text-extraction HTTP endpoint
/// (`GET <api_base>/<target_url>`), e.g. a Jina-Reader-compatible service.
pub struct ManagedReaderFetcher {
    client: Client,
    config: ManagedReaderConfig,
    retention: ChronoDuration,
}

/// Optional advanced headers that pass CSS-selector hints through to the
/// reader service.
#[derive(Debug, Clone, Default)]
pub struct ReaderOptions {
    pub no_cache: bool,
    pub target_selector: Option<String>,
    pub wait_for_selector: Option<String>,
    pub remove_selector: Option<String>,
}

impl ManagedReaderFetcher {
    pub fn new(config: ManagedReaderConfig, retention_days: i64) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.base.timeout)
            .build()
            .expect("reqwest client config is always valid");

        Self {
            client,
            config,
            retention: ChronoDuration::days(retention_days),
        }
    }

    pub fn kind(&self) -> FetcherKind {
        FetcherKind::ManagedReader
    }

    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        self.fetch_with_options(url, &ReaderOptions::default()).await
    }

    pub async fn fetch_with_options(&self, url: &str, options: &ReaderOptions) -> FetchOutcome {
        if !self.config.base.enabled {
            return FetchOutcome::Failure {
                error: FetchError::FetcherExhausted,
                message: "managed-reader fetcher disabled".to_string(),
                kind: self.kind(),
            };
        }

        let start = Instant::now();
        match self.do_fetch(url, options).await {
            Ok(body) => FetchOutcome::Success {
                body,
                kind: self.kind(),
                elapsed_ms: start.elapsed().as_millis() as u64,
            },
            Err((error, message)) => FetchOutcome::Failure {
                error,
                message,
                kind: self.kind(),
            },
        }
    }

    async fn do_fetch(
        &self,
        url: &str,
        options: &ReaderOptions,
    ) -> Result<FetchedBody, (FetchError, String)> {
        let reader_url = format!("{}{}", self.config.api_url, encode_target_url(url));

        let mut request = self
            .client
            .get(&reader_url)
            .header(reqwest::header::ACCEPT, "text/plain");

        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }
        if self.config.return_format == "markdown" {
            request = request.header("X-Return-Format", "markdown");
        }
        if options.no_cache {
            request = request.header("X-No-Cache", "true");
        }
        if let Some(selector) = &options.target_selector {
            request = request.header("X-Target-Selector", selector);
        }
        if let Some(selector) = &options.wait_for_selector {
            request = request.header("X-Wait-For-Selector", selector);
        }
        if let Some(selector) = &options.remove_selector {
            request = request.header("X-Remove-Selector", selector);
        }

        let response = request.send().await.map_err(classify_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(FAILURE_BODY_PREVIEW).collect();
            return Err((
                FetchError::HttpStatus,
                format!("reader api returned {status}: {preview}"),
            ));
        }

        let text = response.text().await.map_err(classify_reqwest_error)?;
        let (title, body_text) = parse_reader_response(&text);

        let body = FetchedBody::new(
            url,
            title,
            body_text,
            FetchMetadata {
                fetcher_kind: Some(self.kind().to_string()),
                format: Some(self.config.return_format.clone()),
                extra: Default::default(),
            },
            self.retention,
        );

        Ok(body)
    }
}

/// Percent-encodes characters that would otherwise be reinterpreted as part
/// of the *reader's own* request (`#`, `?`, whitespace) while leaving the
/// target URL's own scheme/host/path separators (`:`, `/`) intact, so
/// `<api_base>/<target_url>` still reads as "one URL embedded in another".
fn encode_target_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for ch in url.chars() {
        match ch {
            '#' => out.push_str("%23"),
            '?' => out.push_str("%3F"),
            ' ' => out.push_str("%20"),
            _ => out.push(ch),
        }
    }
    out
}

fn classify_reqwest_error(e: reqwest::Error) -> (FetchError, String) {
    if e.is_timeout() {
        (FetchError::Timeout, e.to_string())
    } else {
        (FetchError::Network, e.to_string())
    }
}

const TITLE_PREFIX: &str = "Title:";
const URL_SOURCE_PREFIX: &str = "URL Source:";
const MARKDOWN_CONTENT_PREFIX: &str = "Markdown Content:";

/// Splits a reader response into its `Title:` metadata line and the body
/// that follows the leading metadata block. The first line that doesn't
/// match a known metadata prefix begins the body.
fn parse_reader_response(content: &str) -> (String, String) {
    let lines: Vec<&str> = content.lines().collect();
    let mut title = String::new();
    let mut body_start = lines.len();

    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim();

        if let Some(rest) = trimmed.strip_prefix(TITLE_PREFIX) {
            title = rest.trim().to_string();
            body_start = i + 1;
            continue;
        }
        if trimmed.starts_with(URL_SOURCE_PREFIX) {
            body_start = i + 1;
            continue;
        }
        if trimmed.starts_with(MARKDOWN_CONTENT_PREFIX) {
            body_start = i + 1;
            continue;
        }
        if !trimmed.is_empty() {
            body_start = i;
            break;
        }
    }

    let body_text = lines[body_start.min(lines.len())..].join("\n");
    (title, normalize_whitespace(&body_text))
}

fn normalize_whitespace(text: &str) -> String {
    text.lines()
        .map(|l| l.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_title_and_body_from_metadata_block() {
        let content = "Title: Example Headline\nURL Source: https://example.com\nMarkdown Content:\n\nFirst paragraph.\nSecond paragraph.\n";
        let (title, body) = parse_reader_response(content);
        assert_eq!(title, "Example Headline");
        assert_eq!(body, "First paragraph.\nSecond paragraph.");
    }

    #[test]
    fn treats_whole_text_as_body_when_no_metadata_present() {
        let content = "Just plain body text with no headers.";
        let (title, body) = parse_reader_response(content);
        assert_eq!(title, "");
        assert_eq!(body, "Just plain body text with no headers.");
    }

    #[test]
    fn encodes_fragment_and_query_markers_in_target_url() {
        let encoded = encode_target_url("https://example.com/a?x=1#section");
        assert_eq!(encoded, "https://example.com/a%3Fx=1%23section");
    }

    #[tokio::test]
    async fn fetch_reports_failure_when_disabled() {
        let mut config = ManagedReaderConfig::default();
        config.base.enabled = false;
        let fetcher = ManagedReaderFetcher::new(config, 7);
        let outcome = fetcher.fetch("https://example.com/article").await;
        assert!(!outcome.is_success());
    }
}
