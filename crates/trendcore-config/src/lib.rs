//! The configuration bundle the core consumes.
//!
//! Loading this bundle from files, CLI flags, or environment variables is an
//! external collaborator's job (out of scope for this crate). What lives
//! here is the shape of the bundle and the handful of environment-variable
//! overrides the spec calls out by name for the LLM and AI-analysis
//! sections — those are applied by the components that own them
//! (`trendcore-llm`, `trendcore-hotspot`), not by a generic loader here.

mod features;
mod fetcher;
mod llm;
mod scraper;

pub use features::FeaturesConfig;
pub use fetcher::{FetcherMethodConfig, ManagedReaderConfig, HeadlessBrowserConfig, PlainHttpConfig};
pub use llm::{AiAnalysisConfig, AiProvider, LlmConfig};
pub use scraper::{DomainRule, ScraperConfig};

use serde::{Deserialize, Serialize};
use trendcore_types::Category;

/// Top-level configuration bundle passed into the core by its caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrendCoreConfig {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub ai_analysis: AiAnalysisConfig,
    #[serde(default)]
    pub features: FeaturesConfig,
    #[serde(default)]
    pub categories: Vec<Category>,
}
