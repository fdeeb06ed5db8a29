use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use tracing::warn;

use trendcore_config::FeaturesConfig;
use trendcore_llm::LlmClient;
use trendcore_prompts::PromptRegistry;
use trendcore_types::{AnalysisResult, Category, CategoryResult, Insight, NewsItem, NewsSummary};

use crate::insights::parse_insights;
use crate::json::extract_json_object;

const DEFAULT_CATEGORIZE_CONCURRENCY: usize = 3;
const CATEGORIZE_TEMP: f32 = 0.3;
const SUMMARIZE_MAX_TOKENS: u32 = 200;
const DEEP_RESEARCH_TEMP: f32 = 0.5;
const DEEP_RESEARCH_MAX_TOKENS: u32 = 8000;
const DAILY_BRIEFING_TOP_N_FOR_FULL_RUN: usize = 10;

/// Composes [`LlmClient`] calls into named sub-tasks, each gated by a
/// [`FeaturesConfig`] flag. No sub-task's failure aborts the others —
/// `analyze_full` considers the run successful if any sub-task completed.
pub struct Analyzer {
    llm: LlmClient,
    prompts: PromptRegistry,
    features: FeaturesConfig,
    categories: Vec<Category>,
}

impl Analyzer {
    pub fn new(llm: LlmClient, features: FeaturesConfig, categories: Vec<Category>) -> Self {
        Self {
            llm,
            prompts: PromptRegistry::new(),
            features,
            categories,
        }
    }

    /// Raw markdown daily briefing over `items`.
    pub async fn daily_briefing(
        &self,
        items: &[NewsItem],
        date: Option<NaiveDate>,
    ) -> Result<String, String> {
        let messages = self.prompts.daily_briefing(items, date);
        self.llm
            .chat(&messages, None, None, Value::Null)
            .await
            .map(|r| r.content)
            .map_err(|e| e.to_string())
    }

    /// Classifies a single item, filling `item_id` from `id` since the model
    /// only returns `primary`/`secondary`/`confidence`/`reason`.
    pub async fn categorize_one(
        &self,
        title: &str,
        content: &str,
        id: &str,
    ) -> Option<CategoryResult> {
        let messages = self.prompts.categorize(title, content, &self.categories);
        let response = match self
            .llm
            .chat(&messages, Some(CATEGORIZE_TEMP), None, Value::Null)
            .await
        {
            Ok(r) => r.content,
            Err(e) => {
                warn!(error = %e, item_id = id, "categorize_one failed");
                return None;
            }
        };

        let value = extract_json_object(&response)?;
        Some(CategoryResult {
            item_id: id.to_string(),
            primary: value.get("primary")?.as_str()?.to_string(),
            secondary: value
                .get("secondary")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            confidence: value
                .get("confidence")
                .and_then(|v| v.as_u64())
                .unwrap_or(0)
                .min(100) as u8,
            reason: value
                .get("reason")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
        })
    }

    /// Fans `categorize_one` out across `items` with at most `max_concurrent`
    /// requests in flight; items that fail to classify are dropped, not
    /// retried.
    pub async fn categorize_many(
        &self,
        items: &[NewsItem],
        max_concurrent: usize,
    ) -> Vec<CategoryResult> {
        stream::iter(items.iter())
            .map(|item| self.categorize_one(&item.title, &item.content, &item.id))
            .buffer_unordered(max_concurrent.max(1))
            .filter_map(|result| async move { result })
            .collect()
            .await
    }

    /// Extracts up to 5 tagged insights from a batch of items.
    pub async fn extract_insights(&self, items: &[NewsItem]) -> Result<Vec<Insight>, String> {
        let messages = self.prompts.insights(items);
        let response = self
            .llm
            .chat(&messages, None, None, Value::Null)
            .await
            .map_err(|e| e.to_string())?;
        Ok(parse_insights(&response.content))
    }

    /// Summarizes a single item to 2-3 sentences, capped at 200 output
    /// tokens.
    pub async fn summarize(&self, title: &str, content: &str, id: &str) -> Result<NewsSummary, String> {
        let messages = self.prompts.summarize(title, content);
        let response = self
            .llm
            .chat(&messages, None, Some(SUMMARIZE_MAX_TOKENS), Value::Null)
            .await
            .map_err(|e| e.to_string())?;
        Ok(NewsSummary {
            item_id: id.to_string(),
            title: title.to_string(),
            summary: response.content.trim().to_string(),
        })
    }

    /// In-depth raw-markdown report on `topic`, drawing on `items`.
    pub async fn deep_research(
        &self,
        topic: &str,
        items: &[NewsItem],
        date: Option<NaiveDate>,
    ) -> Result<String, String> {
        let messages = self.prompts.deep_research(topic, items, date);
        self.llm
            .chat(
                &messages,
                Some(DEEP_RESEARCH_TEMP),
                Some(DEEP_RESEARCH_MAX_TOKENS),
                Value::Null,
            )
            .await
            .map(|r| r.content)
            .map_err(|e| e.to_string())
    }

    /// Runs `daily_briefing`, `extract_insights`, and
    /// `categorize_many(items[..10])` concurrently, skipping any sub-task
    /// whose feature flag is off. A sub-task's failure is logged and leaves
    /// its field empty; the run is successful if at least one sub-task
    /// completed.
    pub async fn analyze_full(&self, items: &[NewsItem], date: Option<NaiveDate>) -> AnalysisResult {
        let mut result = AnalysisResult::started(self.model_name());
        let mut any_completed = false;

        let categorize_items = &items[..items.len().min(DAILY_BRIEFING_TOP_N_FOR_FULL_RUN)];

        let (briefing, insights, categories) = tokio::join!(
            async {
                if self.features.daily_briefing {
                    Some(self.daily_briefing(items, date).await)
                } else {
                    None
                }
            },
            async {
                if self.features.key_insight {
                    Some(self.extract_insights(items).await)
                } else {
                    None
                }
            },
            async {
                if self.features.smart_category {
                    Some(
                        self.categorize_many(categorize_items, DEFAULT_CATEGORIZE_CONCURRENCY)
                            .await,
                    )
                } else {
                    None
                }
            },
        );

        if let Some(outcome) = briefing {
            match outcome {
                Ok(text) => {
                    result.daily_briefing = text;
                    any_completed = true;
                }
                Err(e) => warn!(error = %e, "daily_briefing sub-task failed"),
            }
        }

        if let Some(outcome) = insights {
            match outcome {
                Ok(list) => {
                    result.insights = list;
                    any_completed = true;
                }
                Err(e) => warn!(error = %e, "extract_insights sub-task failed"),
            }
        }

        if let Some(list) = categories {
            any_completed = true;
            result.categories = list;
        }

        result.success = any_completed;
        if !any_completed {
            result.error = "no analysis sub-task completed".to_string();
        }

        result
    }

    fn model_name(&self) -> String {
        self.llm.model_name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trendcore_config::LlmConfig;

    fn analyzer() -> Analyzer {
        Analyzer::new(LlmClient::new(LlmConfig::default()), FeaturesConfig::default(), vec![])
    }

    #[tokio::test]
    async fn daily_briefing_fails_clearly_when_llm_unconfigured() {
        let analyzer = analyzer();
        let err = analyzer.daily_briefing(&[], None).await.unwrap_err();
        assert!(err.contains("not configured"));
    }

    #[tokio::test]
    async fn categorize_one_returns_none_when_llm_unconfigured() {
        let analyzer = analyzer();
        assert!(analyzer.categorize_one("t", "c", "1").await.is_none());
    }

    #[tokio::test]
    async fn analyze_full_is_unsuccessful_when_every_subtask_fails() {
        let analyzer = analyzer();
        let result = analyzer.analyze_full(&[], None).await;
        assert!(!result.success);
        assert!(!result.error.is_empty());
    }

    #[tokio::test]
    async fn analyze_full_skips_disabled_subtasks() {
        let mut features = FeaturesConfig::default();
        features.daily_briefing = false;
        features.key_insight = false;
        features.smart_category = false;
        let analyzer = Analyzer::new(LlmClient::new(LlmConfig::default()), features, vec![]);
        let result = analyzer.analyze_full(&[], None).await;
        assert!(!result.success);
        assert_eq!(result.daily_briefing, "");
        assert!(result.insights.is_empty());
        assert!(result.categories.is_empty());
    }
}
