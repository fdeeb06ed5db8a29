use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use trendcore_types::{Category, ChatMessage, NewsItem};

use crate::format::{format_categories, format_items_detailed, format_items_short};

/// A system message plus a user-message pattern with `{placeholder}` tokens.
/// Substitution is literal string replacement, never `format!`-style
/// interpolation, so placeholder-shaped text inside item content can never
/// be mistaken for a template token.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub system: String,
    pub user_pattern: String,
}

impl PromptTemplate {
    pub fn new(system: impl Into<String>, user_pattern: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user_pattern: user_pattern.into(),
        }
    }

    fn render(&self, placeholders: &HashMap<&str, String>) -> Vec<ChatMessage> {
        let mut user = self.user_pattern.clone();
        for (key, value) in placeholders {
            user = user.replace(&format!("{{{key}}}"), value);
        }
        vec![ChatMessage::system(&self.system), ChatMessage::user(user)]
    }
}

/// Named prompt templates, seeded with the six built-ins and open to runtime
/// registration of more.
pub struct PromptRegistry {
    templates: HashMap<String, PromptTemplate>,
}

impl Default for PromptRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptRegistry {
    pub fn new() -> Self {
        let mut templates = HashMap::new();
        templates.insert(
            "daily_briefing".to_string(),
            PromptTemplate::new(
                "You are a news editor producing a concise daily briefing. Write in \
                 clear, neutral markdown. Do not invent facts not present in the items.",
                "Today is {date}. Summarize the following news items into a short daily \
                 briefing with the most important stories first:\n\n{items}",
            ),
        );
        templates.insert(
            "categorize".to_string(),
            PromptTemplate::new(
                "You are a classifier. Given one news item and a list of candidate \
                 categories, choose the single best-fitting category and, if relevant, a \
                 secondary one. Respond with a single JSON object only: \
                 {\"primary\": <id>, \"secondary\": <id or null>, \"confidence\": <0-100>, \
                 \"reason\": <short string>}.",
                "Title: {title}\nContent: {content}\n\nCandidate categories:\n{categories}",
            ),
        );
        templates.insert(
            "extract_insights".to_string(),
            PromptTemplate::new(
                "You are an analyst extracting brief, concrete insights from a batch of \
                 news items. Produce up to 5 insights, each a single line in the form \
                 \"- [domain] insight text\", where domain is a short topical tag.",
                "Extract insights from the following items:\n\n{items}",
            ),
        );
        templates.insert(
            "summarize".to_string(),
            PromptTemplate::new(
                "You summarize a single news article in 2-3 plain-text sentences. No \
                 markdown, no preamble, just the summary.",
                "Title: {title}\nContent: {content}",
            ),
        );
        templates.insert(
            "deep_research".to_string(),
            PromptTemplate::new(
                "You are a research analyst producing an in-depth markdown report on a \
                 topic, drawing only on the supplied items. Cite sources by name inline.",
                "Topic: {topic}\nDate: {date}\n\nSource items:\n\n{items}",
            ),
        );
        templates.insert(
            "batch_categorize".to_string(),
            PromptTemplate::new(
                "You are a classifier. Given several news items and a list of candidate \
                 categories, assign each item the single best-fitting category. Respond \
                 with a JSON array of objects, one per item in input order: \
                 {\"item_id\": <id>, \"primary\": <id>, \"secondary\": <id or null>, \
                 \"confidence\": <0-100>, \"reason\": <short string>}.",
                "Items:\n{items}\n\nCandidate categories:\n{categories}",
            ),
        );
        Self { templates }
    }

    /// Register or overwrite a named template at runtime.
    pub fn register(&mut self, name: impl Into<String>, template: PromptTemplate) {
        self.templates.insert(name.into(), template);
    }

    pub fn get(&self, name: &str) -> Option<&PromptTemplate> {
        self.templates.get(name)
    }

    pub fn daily_briefing(&self, items: &[NewsItem], date: Option<NaiveDate>) -> Vec<ChatMessage> {
        let date = date.unwrap_or_else(|| Utc::now().date_naive());
        let mut placeholders = HashMap::new();
        placeholders.insert("date", date.format("%Y-%m-%d").to_string());
        placeholders.insert("items", format_items_short(items, 200));
        self.templates["daily_briefing"].render(&placeholders)
    }

    pub fn categorize(
        &self,
        title: &str,
        content: &str,
        categories: &[Category],
    ) -> Vec<ChatMessage> {
        let mut placeholders = HashMap::new();
        placeholders.insert("title", title.to_string());
        placeholders.insert(
            "content",
            trendcore_utils::text::truncate_chars(content, 2000),
        );
        placeholders.insert("categories", format_categories(categories));
        self.templates["categorize"].render(&placeholders)
    }

    pub fn insights(&self, items: &[NewsItem]) -> Vec<ChatMessage> {
        let mut placeholders = HashMap::new();
        placeholders.insert("items", format_items_short(items, 200));
        self.templates["extract_insights"].render(&placeholders)
    }

    pub fn summarize(&self, title: &str, content: &str) -> Vec<ChatMessage> {
        let mut placeholders = HashMap::new();
        placeholders.insert("title", title.to_string());
        placeholders.insert(
            "content",
            trendcore_utils::text::truncate_chars(content, 3000),
        );
        self.templates["summarize"].render(&placeholders)
    }

    pub fn deep_research(
        &self,
        topic: &str,
        items: &[NewsItem],
        date: Option<NaiveDate>,
    ) -> Vec<ChatMessage> {
        let date = date.unwrap_or_else(|| Utc::now().date_naive());
        let mut placeholders = HashMap::new();
        placeholders.insert("topic", topic.to_string());
        placeholders.insert("date", date.format("%Y-%m-%d").to_string());
        placeholders.insert("items", format_items_detailed(items, 1000));
        self.templates["deep_research"].render(&placeholders)
    }

    pub fn batch_categorize(&self, items: &[NewsItem], categories: &[Category]) -> Vec<ChatMessage> {
        let mut placeholders = HashMap::new();
        placeholders.insert("items", format_items_short(items, 200));
        placeholders.insert("categories", format_categories(categories));
        self.templates["batch_categorize"].render(&placeholders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_items() -> Vec<NewsItem> {
        vec![NewsItem::new("1", "Title A", "Source A", "Some content here.")]
    }

    #[test]
    fn daily_briefing_substitutes_date_and_items() {
        let registry = PromptRegistry::new();
        let date = NaiveDate::from_ymd_opt(2026, 7, 26).unwrap();
        let messages = registry.daily_briefing(&sample_items(), Some(date));
        assert_eq!(messages.len(), 2);
        assert!(messages[1].content.contains("2026-07-26"));
        assert!(messages[1].content.contains("Title A"));
    }

    #[test]
    fn categorize_lists_candidate_categories() {
        let registry = PromptRegistry::new();
        let categories = vec![Category {
            id: "tech".into(),
            name: "Technology".into(),
            keywords: vec!["ai".into()],
        }];
        let messages = registry.categorize("T", "C", &categories);
        assert!(messages[1].content.contains("- tech: Technology (keywords: ai)"));
    }

    #[test]
    fn deep_research_uses_detailed_form() {
        let registry = PromptRegistry::new();
        let messages = registry.deep_research("Topic X", &sample_items(), None);
        assert!(messages[1].content.contains("### 1. Title A"));
        assert!(messages[1].content.contains("Topic: Topic X"));
    }

    #[test]
    fn unregistered_template_lookup_returns_none() {
        let registry = PromptRegistry::new();
        assert!(registry.get("nonexistent").is_none());
        assert!(registry.get("daily_briefing").is_some());
    }

    #[test]
    fn runtime_registration_overrides_a_template() {
        let mut registry = PromptRegistry::new();
        registry.register("custom", PromptTemplate::new("sys", "hello {name}"));
        let mut placeholders = HashMap::new();
        placeholders.insert("name", "world".to_string());
        let rendered = registry.templates["custom"].render(&placeholders);
        assert_eq!(rendered[1].content, "hello world");
    }
}
