use serde::{Deserialize, Serialize};

/// Config for the chat-completions client. `LLM_API_BASE_URL`, `LLM_API_KEY`,
/// and `LLM_MODEL_NAME` environment variables take precedence over these
/// fields — the override is applied by `trendcore-llm` at construction time,
/// not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub api_base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model_name")]
    pub model_name: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            api_key: String::new(),
            model_name: default_model_name(),
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            max_retries: default_max_retries(),
            enabled: true,
        }
    }
}

fn default_model_name() -> String {
    "gpt-4o-mini".to_string()
}
fn default_timeout_secs() -> u64 {
    120
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_retries() -> u32 {
    2
}
fn default_true() -> bool {
    true
}

/// Which wire dialect the hotspot analyzer should speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    Openai,
    Gemini,
    Deepseek,
    Azure,
}

impl Default for AiProvider {
    fn default() -> Self {
        AiProvider::Openai
    }
}

/// Config for the single-shot hotspot analyzer. `AI_API_KEY` overrides
/// `api_key` the same way the LLM client's env vars do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiAnalysisConfig {
    #[serde(default)]
    pub provider: AiProvider,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model_name")]
    pub model_name: String,
    #[serde(default)]
    pub api_base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_news")]
    pub max_news_for_analysis: usize,
    #[serde(default = "default_true")]
    pub include_rss: bool,
    #[serde(default)]
    pub prompt_file: Option<String>,
}

impl Default for AiAnalysisConfig {
    fn default() -> Self {
        Self {
            provider: AiProvider::default(),
            api_key: String::new(),
            model_name: default_model_name(),
            api_base_url: String::new(),
            timeout_secs: default_timeout_secs(),
            max_news_for_analysis: default_max_news(),
            include_rss: true,
            prompt_file: None,
        }
    }
}

fn default_max_news() -> usize {
    100
}
