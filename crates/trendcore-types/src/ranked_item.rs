use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A ranked entry from a source's trending list, collected upstream of this
/// crate's scope. Immutable once ingested.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedItem {
    pub title: String,
    pub url: String,
    pub source: String,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    /// Position(s) this item has held across successive crawls.
    pub ranks: Vec<u32>,
    pub appearance_count: u32,
    /// Timestamp carried by an RSS feed entry, when this item originated there.
    pub feed_time: Option<DateTime<Utc>>,
}

impl RankedItem {
    pub fn min_rank(&self) -> Option<u32> {
        self.ranks.iter().copied().min()
    }

    pub fn max_rank(&self) -> Option<u32> {
        self.ranks.iter().copied().max()
    }
}
