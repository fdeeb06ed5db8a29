use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Config shared by every fetcher kind: enablement and a timeout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherMethodConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_timeout_secs", with = "duration_secs")]
    pub timeout: Duration,
}

impl Default for FetcherMethodConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout: default_timeout_secs_duration(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> Duration {
    default_timeout_secs_duration()
}

fn default_timeout_secs_duration() -> Duration {
    Duration::from_secs(30)
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagedReaderConfig {
    #[serde(flatten)]
    pub base: FetcherMethodConfig,
    pub api_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_return_format")]
    pub return_format: String,
}

impl Default for ManagedReaderConfig {
    fn default() -> Self {
        Self {
            base: FetcherMethodConfig::default(),
            api_url: "https://r.jina.ai/".to_string(),
            api_key: None,
            return_format: default_return_format(),
        }
    }
}

fn default_return_format() -> String {
    "text".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadlessBrowserConfig {
    #[serde(flatten)]
    pub base: FetcherMethodConfig,
    #[serde(default = "default_true")]
    pub headless: bool,
    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,
    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,
    #[serde(default = "default_wait_until")]
    pub wait_until: String,
    #[serde(default = "default_wait_timeout_ms")]
    pub wait_timeout_ms: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HeadlessBrowserConfig {
    fn default() -> Self {
        Self {
            base: FetcherMethodConfig::default(),
            headless: true,
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            wait_until: default_wait_until(),
            wait_timeout_ms: default_wait_timeout_ms(),
            user_agent: None,
        }
    }
}

fn default_viewport_width() -> u32 {
    1280
}
fn default_viewport_height() -> u32 {
    720
}
fn default_wait_until() -> String {
    "networkidle".to_string()
}
fn default_wait_timeout_ms() -> u64 {
    30_000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlainHttpConfig {
    #[serde(flatten)]
    pub base: FetcherMethodConfig,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_true")]
    pub verify_ssl: bool,
    #[serde(default = "default_worker_pool_size")]
    pub worker_pool_size: usize,
}

impl Default for PlainHttpConfig {
    fn default() -> Self {
        Self {
            base: FetcherMethodConfig::default(),
            user_agent: default_user_agent(),
            verify_ssl: true,
            worker_pool_size: default_worker_pool_size(),
        }
    }
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_worker_pool_size() -> usize {
    10
}
