use serde::{Deserialize, Serialize};

/// Which analysis sub-tasks the analyzer runs. Disabled tasks are skipped
/// entirely rather than run and discarded, so a feature flip changes token
/// spend, not just output shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturesConfig {
    #[serde(default = "default_true")]
    pub daily_briefing: bool,
    #[serde(default = "default_true")]
    pub smart_category: bool,
    #[serde(default = "default_true")]
    pub key_insight: bool,
    #[serde(default)]
    pub deep_research: bool,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            daily_briefing: true,
            smart_category: true,
            key_insight: true,
            deep_research: false,
        }
    }
}

fn default_true() -> bool {
    true
}
