use chrono::Utc;
use tracing::warn;

use trendcore_config::AiAnalysisConfig;
use trendcore_types::{HotListGroup, HotspotReport, RssItem};
use trendcore_utils::text::truncate_chars;

use crate::format::assemble_news_content;
use crate::provider::{dispatch, parse_report};
use crate::template::{parse_prompt_file, substitute, DEFAULT_SYSTEM_PROMPT, DEFAULT_USER_TEMPLATE};

const PARSE_FAILURE_SUMMARY_CHARS: usize = 1000;

/// Single-shot analyzer producing a structured [`HotspotReport`] from
/// hot-list keyword groups and optional RSS items, against whichever
/// provider `config.provider` names.
pub struct HotspotAnalyzer {
    client: reqwest::Client,
    config: AiAnalysisConfig,
    system_prompt: String,
    user_template: String,
}

impl HotspotAnalyzer {
    /// `AI_API_KEY`, when set, overrides `config.api_key`. When
    /// `config.prompt_file` is set and readable, its `[system]`/`[user]`
    /// sections override the matching built-in template; a file with
    /// neither marker replaces the user template wholesale.
    pub fn new(mut config: AiAnalysisConfig) -> Self {
        if let Ok(key) = std::env::var("AI_API_KEY") {
            config.api_key = key;
        }

        let parsed = config.prompt_file.as_ref().and_then(|path| {
            match std::fs::read_to_string(path) {
                Ok(contents) => Some(parse_prompt_file(&contents)),
                Err(e) => {
                    warn!(path = %path, error = %e, "could not read prompt_file, using built-in templates");
                    None
                }
            }
        });

        let system_prompt = parsed
            .as_ref()
            .and_then(|p| p.system.clone())
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());
        let user_template = parsed
            .and_then(|p| p.user)
            .unwrap_or_else(|| DEFAULT_USER_TEMPLATE.to_string());

        Self {
            client: reqwest::Client::new(),
            config,
            system_prompt,
            user_template,
        }
    }

    pub fn is_available(&self) -> bool {
        !self.config.api_key.is_empty()
            && (self.config.provider == trendcore_config::AiProvider::Gemini
                || !self.config.api_base_url.is_empty())
    }

    /// `report_mode` and `report_type` are free-form labels describing the
    /// run (e.g. "daily" / "hotspot-only") and are substituted verbatim.
    pub async fn analyze(
        &self,
        groups: &[HotListGroup],
        rss_items: Option<&[RssItem]>,
        report_mode: &str,
        report_type: &str,
        platforms: &[String],
    ) -> HotspotReport {
        if !self.is_available() {
            return HotspotReport::failure("ai analysis is not configured: missing api key or base url");
        }

        let total_news: usize = groups.iter().map(|g| g.items.len()).sum::<usize>()
            + rss_items.map_or(0, |r| r.len());

        let assembled = assemble_news_content(groups, rss_items, self.config.max_news_for_analysis);
        let keywords = groups
            .iter()
            .map(|g| g.keyword.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let user_prompt = substitute(
            &self.user_template,
            &[
                ("report_mode", report_mode),
                ("report_type", report_type),
                ("current_time", &Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()),
                ("news_count", &assembled.hotlist_count.to_string()),
                ("rss_count", &assembled.rss_count.to_string()),
                ("platforms", &platforms.join(", ")),
                ("keywords", &keywords),
                ("news_content", &assembled.text),
            ],
        );

        let raw = match dispatch(
            &self.client,
            self.config.provider,
            &self.config.api_base_url,
            &self.config.api_key,
            &self.config.model_name,
            self.config.timeout_secs,
            &self.system_prompt,
            &user_prompt,
        )
        .await
        {
            Ok(raw) => raw,
            Err(message) => return HotspotReport::failure(message),
        };

        let report = match parse_report(&raw) {
            Ok(parsed) => HotspotReport {
                summary: parsed.summary,
                keyword_analysis: parsed.keyword_analysis,
                sentiment: parsed.sentiment,
                cross_platform: parsed.cross_platform,
                impact: parsed.impact,
                signals: parsed.signals,
                conclusion: parsed.conclusion,
                raw_response: raw.clone(),
                success: true,
                error: String::new(),
                total_news,
                analyzed_news: assembled.hotlist_count + assembled.rss_count,
                max_news_limit: self.config.max_news_for_analysis,
                hotlist_count: assembled.hotlist_count,
                rss_count: assembled.rss_count,
            },
            Err(parse_error) => HotspotReport {
                summary: truncate_chars(&raw, PARSE_FAILURE_SUMMARY_CHARS),
                keyword_analysis: String::new(),
                sentiment: String::new(),
                cross_platform: String::new(),
                impact: String::new(),
                signals: String::new(),
                conclusion: String::new(),
                raw_response: raw.clone(),
                success: true,
                error: parse_error,
                total_news,
                analyzed_news: assembled.hotlist_count + assembled.rss_count,
                max_news_limit: self.config.max_news_for_analysis,
                hotlist_count: assembled.hotlist_count,
                rss_count: assembled.rss_count,
            },
        };

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AiAnalysisConfig {
        AiAnalysisConfig::default()
    }

    #[tokio::test]
    async fn analyze_fails_clearly_when_unconfigured() {
        let analyzer = HotspotAnalyzer::new(config());
        let report = analyzer.analyze(&[], None, "daily", "hotspot", &[]).await;
        assert!(!report.success);
        assert!(report.error.contains("not configured"));
    }

    #[test]
    fn is_available_requires_key_and_base_url_for_openai() {
        let mut cfg = config();
        cfg.api_key = "key".to_string();
        let analyzer = HotspotAnalyzer::new(cfg);
        assert!(!analyzer.is_available());
    }

    #[test]
    fn is_available_does_not_require_base_url_for_gemini() {
        let mut cfg = config();
        cfg.provider = trendcore_config::AiProvider::Gemini;
        cfg.api_key = "key".to_string();
        cfg.api_base_url = "https://generativelanguage.googleapis.com/v1".to_string();
        let analyzer = HotspotAnalyzer::new(cfg);
        assert!(analyzer.is_available());
    }
}
