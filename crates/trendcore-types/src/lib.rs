//! Shared data model for the TrendCore content-acquisition and analysis core.
//!
//! These types flow between the fetch/store layer and the LLM analysis layer.
//! They carry no behavior beyond simple derivations (e.g. word counts) so that
//! every crate downstream can depend on a single, stable vocabulary.

pub mod analysis;
pub mod chat;
pub mod fetched_body;
pub mod hotspot;
pub mod news_item;
pub mod ranked_item;

pub use analysis::{AnalysisResult, Category, CategoryResult, Insight, NewsSummary, TokenUsage};
pub use chat::{ChatMessage, ChatResponse, Role, Usage};
pub use fetched_body::{FetchError, FetchOutcome, FetchedBody, FetcherKind};
pub use hotspot::{HotListGroup, HotListItemStat, HotspotReport, RssItem};
pub use news_item::NewsItem;
pub use ranked_item::RankedItem;
