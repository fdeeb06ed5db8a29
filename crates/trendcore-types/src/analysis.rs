use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A config-supplied topical bucket news items get sorted into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResult {
    pub item_id: String,
    pub primary: String,
    pub secondary: Option<String>,
    pub confidence: u8,
    pub reason: String,
}

/// A tagged short claim surfaced by the analyzer: `(domain, content)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub domain: String,
    pub content: String,
    pub importance: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsSummary {
    pub item_id: String,
    pub title: String,
    pub summary: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The result of a full analysis run: `analyze_full` populates as many of
/// these fields as its enabled sub-tasks allow. A task's failure leaves its
/// field at the default rather than aborting the others.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub success: bool,
    pub daily_briefing: String,
    pub categories: Vec<CategoryResult>,
    pub insights: Vec<Insight>,
    pub summaries: Vec<NewsSummary>,
    pub deep_research: String,
    pub generated_at: Option<DateTime<Utc>>,
    pub model_used: String,
    pub token_usage: TokenUsage,
    pub error: String,
}

impl AnalysisResult {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            daily_briefing: String::new(),
            categories: Vec::new(),
            insights: Vec::new(),
            summaries: Vec::new(),
            deep_research: String::new(),
            generated_at: None,
            model_used: String::new(),
            token_usage: TokenUsage::default(),
            error: error.into(),
        }
    }

    pub fn started(model_used: impl Into<String>) -> Self {
        Self {
            success: true,
            daily_briefing: String::new(),
            categories: Vec::new(),
            insights: Vec::new(),
            summaries: Vec::new(),
            deep_research: String::new(),
            generated_at: Some(Utc::now()),
            model_used: model_used.into(),
            token_usage: TokenUsage::default(),
            error: String::new(),
        }
    }
}
