//! Item/category formatting shared by every built-in template.

use trendcore_types::{Category, NewsItem};
use trendcore_utils::text::truncate_chars;

/// `"i. **title** (source)\n   content_preview"`, content truncated to
/// `max_chars` with ellipsis. Used by `daily_briefing` and `insights`.
pub fn format_items_short(items: &[NewsItem], max_chars: usize) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            format!(
                "{}. **{}** ({})\n   {}",
                i + 1,
                item.title,
                item.source,
                truncate_chars(&item.content, max_chars)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `"### i. title\nsource: s\ncontent: <first max_chars chars>"`, used by
/// `deep_research`.
pub fn format_items_detailed(items: &[NewsItem], max_chars: usize) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            format!(
                "### {}. {}\nsource: {}\ncontent: {}",
                i + 1,
                item.title,
                item.source,
                truncate_chars(&item.content, max_chars)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// `"- <id>: <name> (keywords: k1, k2, …)"`, first five keywords only.
pub fn format_categories(categories: &[Category]) -> String {
    categories
        .iter()
        .map(|c| {
            let keywords = c.keywords.iter().take(5).cloned().collect::<Vec<_>>().join(", ");
            format!("- {}: {} (keywords: {})", c.id, c.name, keywords)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, source: &str, content: &str) -> NewsItem {
        NewsItem::new("1", title, source, content)
    }

    #[test]
    fn short_form_numbers_and_truncates() {
        let items = vec![item("Title A", "Source A", &"x".repeat(250))];
        let out = format_items_short(&items, 200);
        assert!(out.starts_with("1. **Title A** (Source A)\n   "));
        assert!(out.ends_with("..."));
    }

    #[test]
    fn detailed_form_uses_headings() {
        let items = vec![item("Title A", "Source A", "body text")];
        let out = format_items_detailed(&items, 1000);
        assert_eq!(out, "### 1. Title A\nsource: Source A\ncontent: body text");
    }

    #[test]
    fn categories_take_first_five_keywords() {
        let categories = vec![Category {
            id: "tech".into(),
            name: "Technology".into(),
            keywords: vec!["a", "b", "c", "d", "e", "f"]
                .into_iter()
                .map(String::from)
                .collect(),
        }];
        let out = format_categories(&categories);
        assert_eq!(out, "- tech: Technology (keywords: a, b, c, d, e)");
    }
}
