use chrono::{DateTime, Utc};
use trendcore_types::{HotListGroup, RssItem};
use trendcore_utils::text::extract_hh_mm;

/// Assembled news content plus the item counts actually emitted, for
/// populating `HotspotReport::{hotlist_count, rss_count}`.
pub struct AssembledContent {
    pub text: String,
    pub hotlist_count: usize,
    pub rss_count: usize,
}

/// Renders hot-list groups, then (budget permitting) an RSS section, into the
/// compact text the prompt embeds as `{news_content}`. Stops emitting items
/// once the cumulative count reaches `max_news`; groups/headers already
/// started are not retroactively removed.
pub fn assemble_news_content(
    groups: &[HotListGroup],
    rss_items: Option<&[RssItem]>,
    max_news: usize,
) -> AssembledContent {
    let mut lines = Vec::new();
    let mut hotlist_count = 0usize;

    'groups: for group in groups {
        lines.push(format!("**{}** ({} items)", group.keyword, group.items.len()));
        for item in &group.items {
            if hotlist_count >= max_news {
                break 'groups;
            }
            lines.push(format!(
                "- [{}] {} | rank:{} | time:{} | seen:{}\u{00d7}",
                item.source,
                item.title,
                format_rank_range(&item.ranks),
                format_time_range(item.first_time, item.last_time),
                item.appearance_count
            ));
            hotlist_count += 1;
            if hotlist_count >= max_news {
                break 'groups;
            }
        }
    }

    let mut rss_count = 0usize;
    if let Some(rss_items) = rss_items {
        if hotlist_count < max_news && !rss_items.is_empty() {
            lines.push(String::new());
            lines.push("**RSS**".to_string());
            for item in rss_items {
                if hotlist_count + rss_count >= max_news {
                    break;
                }
                let time = extract_hh_mm(&item.time_display).unwrap_or_else(|| item.time_display.clone());
                lines.push(format!("- [{}] {} | {}", item.source, item.title, time));
                rss_count += 1;
            }
        }
    }

    AssembledContent {
        text: lines.join("\n"),
        hotlist_count,
        rss_count,
    }
}

fn format_rank_range(ranks: &[u32]) -> String {
    let min = ranks.iter().copied().min().unwrap_or(0);
    let max = ranks.iter().copied().max().unwrap_or(0);
    if min == max {
        min.to_string()
    } else {
        format!("{min}-{max}")
    }
}

fn format_time_range(first: DateTime<Utc>, last: DateTime<Utc>) -> String {
    let a = first.format("%H:%M").to_string();
    let b = last.format("%H:%M").to_string();
    if a == b {
        a
    } else {
        format!("{a}~{b}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trendcore_types::HotListItemStat;

    fn stat(source: &str, title: &str, ranks: Vec<u32>, count: u32) -> HotListItemStat {
        let now = Utc::now();
        HotListItemStat {
            source: source.to_string(),
            title: title.to_string(),
            ranks,
            first_time: now,
            last_time: now,
            appearance_count: count,
        }
    }

    #[test]
    fn formats_single_group_header_and_item() {
        let groups = vec![HotListGroup {
            keyword: "AI".to_string(),
            items: vec![stat("source-a", "headline one", vec![1, 3], 2)],
        }];
        let assembled = assemble_news_content(&groups, None, 100);
        assert!(assembled.text.starts_with("**AI** (1 items)"));
        assert!(assembled.text.contains("rank:1-3"));
        assert!(assembled.text.contains("seen:2\u{00d7}"));
        assert_eq!(assembled.hotlist_count, 1);
        assert_eq!(assembled.rss_count, 0);
    }

    #[test]
    fn truncates_at_max_news_budget() {
        let groups = vec![HotListGroup {
            keyword: "AI".to_string(),
            items: vec![
                stat("a", "one", vec![1], 1),
                stat("a", "two", vec![2], 1),
                stat("a", "three", vec![3], 1),
            ],
        }];
        let assembled = assemble_news_content(&groups, None, 2);
        assert_eq!(assembled.hotlist_count, 2);
        assert!(!assembled.text.contains("three"));
    }

    #[test]
    fn rss_section_extracts_hh_mm_from_varied_encodings() {
        let rss = vec![RssItem {
            source: "feed".to_string(),
            title: "rss headline".to_string(),
            time_display: "2024-05-01 09:30:00".to_string(),
        }];
        let assembled = assemble_news_content(&[], Some(&rss), 100);
        assert!(assembled.text.contains("- [feed] rss headline | 09:30"));
        assert_eq!(assembled.rss_count, 1);
    }
}
