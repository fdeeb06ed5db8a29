use std::sync::Arc;
use std::time::Instant;

use chrono::Duration as ChronoDuration;
use reqwest::Client;
use tokio::sync::Semaphore;
use tracing::{instrument, warn};

use trendcore_config::PlainHttpConfig;
use trendcore_extraction::extract_article;
use trendcore_types::{FetchError, FetchMetadata, FetchOutcome, FetchedBody, FetcherKind};

const ACCEPT_LANGUAGE: &str = "zh-CN,zh;q=0.9,en;q=0.8";
const SNIFF_WINDOW_BYTES: usize = 1024;

/// Synchronous-style fetch executed against a bounded worker pool (a
/// semaphore gates in-flight requests rather than spawning real OS threads,
/// since the underlying I/O is already async).
pub struct PlainHttpFetcher {
    client: Client,
    config: PlainHttpConfig,
    retention: ChronoDuration,
    semaphore: Arc<Semaphore>,
}

impl PlainHttpFetcher {
    pub fn new(config: PlainHttpConfig, retention_days: i64) -> Self {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .danger_accept_invalid_certs(!config.verify_ssl)
            .redirect(reqwest::redirect::Policy::limited(10))
            .timeout(config.base.timeout)
            .build()
            .expect("reqwest client config is always valid");

        let semaphore = Arc::new(Semaphore::new(config.worker_pool_size.max(1)));

        Self {
            client,
            config,
            retention: ChronoDuration::days(retention_days),
            semaphore,
        }
    }

    pub fn kind(&self) -> FetcherKind {
        FetcherKind::PlainHttp
    }

    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        if !self.config.base.enabled {
            return FetchOutcome::Failure {
                error: FetchError::FetcherExhausted,
                message: "plain-http fetcher disabled".to_string(),
                kind: self.kind(),
            };
        }

        let _permit = match self.semaphore.acquire().await {
            Ok(p) => p,
            Err(_) => {
                return FetchOutcome::Failure {
                    error: FetchError::FetcherExhausted,
                    message: "worker pool closed".to_string(),
                    kind: self.kind(),
                }
            }
        };

        let start = Instant::now();
        match self.do_fetch(url).await {
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

    async fn do_fetch(&self, url: &str) -> Result<FetchedBody, (FetchError, String)> {
        let request = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE);

        let response = request.send().await.map_err(|e| classify_reqwest_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err((FetchError::HttpStatus, format!("http status {status}")));
        }

        let content_type_charset = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(extract_charset_param);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        let html = decode_body(&bytes, content_type_charset.as_deref());

        let extracted = extract_article(&html, url).map_err(|e| {
            warn!(url = %url, error = %e, "extraction failed, falling back to empty body");
            (FetchError::Network, e.to_string())
        });

        let extracted = match extracted {
            Ok(e) => e,
            Err((err, msg)) => return Err((err, msg)),
        };

        let mut body = FetchedBody::new(
            url,
            extracted.title,
            extracted.body_text,
            FetchMetadata {
                fetcher_kind: Some(self.kind().to_string()),
                format: Some("html".to_string()),
                extra: Default::default(),
            },
            self.retention,
        );
        body.author = extracted.author;
        body.publish_time = extracted.publish_time;
        body.image_urls = extracted.image_urls;
        body.html_excerpt = extracted.html_excerpt;

        Ok(body)
    }
}

fn classify_reqwest_error(e: &reqwest::Error) -> (FetchError, String) {
    if e.is_timeout() {
        (FetchError::Timeout, e.to_string())
    } else {
        (FetchError::Network, e.to_string())
    }
}

fn extract_charset_param(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .find_map(|part| part.trim().strip_prefix("charset="))
        .map(|c| c.trim_matches('"').to_string())
}

/// Encoding detection order: `Content-Type; charset=...` -> `<meta charset>`
/// in the first 1 KB -> UTF-8.
fn decode_body(bytes: &[u8], content_type_charset: Option<&str>) -> String {
    if let Some(label) = content_type_charset {
        if let Some(encoding) = encoding_rs::Encoding::for_label(label.as_bytes()) {
            let (text, _, _) = encoding.decode(bytes);
            return text.into_owned();
        }
    }

    let sniff_end = bytes.len().min(SNIFF_WINDOW_BYTES);
    let sniff = String::from_utf8_lossy(&bytes[..sniff_end]);
    if let Some(label) = sniff_meta_charset(&sniff) {
        if let Some(encoding) = encoding_rs::Encoding::for_label(label.as_bytes()) {
            let (text, _, _) = encoding.decode(bytes);
            return text.into_owned();
        }
    }

    let (text, _, _) = encoding_rs::UTF_8.decode(bytes);
    text.into_owned()
}

fn sniff_meta_charset(head: &str) -> Option<String> {
    let lower = head.to_ascii_lowercase();
    if let Some(idx) = lower.find("charset=") {
        let rest = &head[idx + "charset=".len()..];
        let value: String = rest
            .chars()
            .take_while(|c| !matches!(c, '"' | '\'' | ' ' | '>' | ';'))
            .collect();
        if !value.is_empty() {
            return Some(value);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_charset_from_content_type() {
        assert_eq!(
            extract_charset_param("text/html; charset=GBK"),
            Some("GBK".to_string())
        );
        assert_eq!(extract_charset_param("text/html"), None);
    }

    #[test]
    fn sniffs_meta_charset_from_head() {
        let head = r#"<html><head><meta charset="gb2312"></head>"#;
        assert_eq!(sniff_meta_charset(head), Some("gb2312".to_string()));
    }

    #[test]
    fn decode_falls_back_to_utf8() {
        let text = decode_body("héllo".as_bytes(), None);
        assert_eq!(text, "héllo");
    }

    #[tokio::test]
    async fn fetch_reports_failure_when_disabled() {
        let mut config = PlainHttpConfig::default();
        config.base.enabled = false;
        let fetcher = PlainHttpFetcher::new(config, 7);
        let outcome = fetcher.fetch("https://example.com").await;
        assert!(!outcome.is_success());
    }
}
