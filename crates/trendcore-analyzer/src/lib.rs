//! Orchestrates LLM sub-tasks — daily briefing, categorization, insight
//! extraction, summarization, deep research — into a single `AnalysisResult`,
//! gated by feature flags so a disabled sub-task spends no tokens.

mod analyzer;
mod insights;
mod json;

pub use analyzer::Analyzer;
