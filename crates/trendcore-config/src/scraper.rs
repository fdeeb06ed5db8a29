use crate::fetcher::{HeadlessBrowserConfig, ManagedReaderConfig, PlainHttpConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One domain → fetcher-kind pinning entry (`domain_rules` in the config
/// file). The router consults these before falling back to its built-in
/// JS-render / reader-preferred domain sets.
pub type DomainRule = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperMethods {
    #[serde(default)]
    pub managed_reader: ManagedReaderConfig,
    #[serde(default)]
    pub headless_browser: HeadlessBrowserConfig,
    #[serde(default)]
    pub plain_http: PlainHttpConfig,
}

impl Default for ScraperMethods {
    fn default() -> Self {
        Self {
            managed_reader: ManagedReaderConfig::default(),
            headless_browser: HeadlessBrowserConfig::default(),
            plain_http: PlainHttpConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// `host → "reader" | "browser" | "plain"`.
    #[serde(default)]
    pub domain_rules: HashMap<String, DomainRule>,
    #[serde(default)]
    pub methods: ScraperMethods,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Days a fetched body stays visible in the content store.
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            top_n: default_top_n(),
            max_retries: default_max_retries(),
            domain_rules: HashMap::new(),
            methods: ScraperMethods::default(),
            max_concurrent: default_max_concurrent(),
            retention_days: default_retention_days(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_top_n() -> usize {
    20
}
fn default_max_retries() -> u32 {
    2
}
fn default_max_concurrent() -> usize {
    5
}
fn default_retention_days() -> i64 {
    7
}
