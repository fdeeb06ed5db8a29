use serde::{Deserialize, Serialize};

/// A content item as seen by the prompt registry and analyzer: the scraped
/// body plus the identifiers downstream `CategoryResult`/`NewsSummary`
/// records refer back to. Distinct from `FetchedBody`, which carries fetch
/// bookkeeping the analysis layer has no use for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub source: String,
    pub content: String,
}

impl NewsItem {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        source: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            source: source.into(),
            content: content.into(),
        }
    }
}
