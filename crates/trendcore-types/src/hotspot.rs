use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One item inside a hot-list keyword group, carrying the aggregate stats the
/// hotspot prompt renders (`rank:min-max`, `time:hh:mm~hh:mm`, `seen:n×`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotListItemStat {
    pub source: String,
    pub title: String,
    pub ranks: Vec<u32>,
    pub first_time: DateTime<Utc>,
    pub last_time: DateTime<Utc>,
    pub appearance_count: u32,
}

/// A keyword-clustered group of hot-list items, as assembled upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotListGroup {
    pub keyword: String,
    pub items: Vec<HotListItemStat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RssItem {
    pub source: String,
    pub title: String,
    /// Raw time string as carried by the feed; format varies, see the hotspot
    /// formatter for the HH:MM extraction rules.
    pub time_display: String,
}

/// Seven-field structured summary of an aggregate corpus, produced by a
/// single LLM call against a provider-specific wire dialect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotspotReport {
    pub summary: String,
    pub keyword_analysis: String,
    pub sentiment: String,
    pub cross_platform: String,
    pub impact: String,
    pub signals: String,
    pub conclusion: String,
    pub raw_response: String,
    pub success: bool,
    pub error: String,
    pub total_news: usize,
    pub analyzed_news: usize,
    pub max_news_limit: usize,
    pub hotlist_count: usize,
    pub rss_count: usize,
}

impl HotspotReport {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            summary: String::new(),
            keyword_analysis: String::new(),
            sentiment: String::new(),
            cross_platform: String::new(),
            impact: String::new(),
            signals: String::new(),
            conclusion: String::new(),
            raw_response: String::new(),
            success: false,
            error: error.into(),
            total_news: 0,
            analyzed_news: 0,
            max_news_limit: 0,
            hotlist_count: 0,
            rss_count: 0,
        }
    }
}
