use once_cell::sync::Lazy;
use regex::Regex;
use trendcore_types::Insight;

const MAX_INSIGHTS: usize = 5;
const FALLBACK_DOMAIN: &str = "综合";

/// Matches only the `(\d+.|-) [domain]` marker that starts a line; content is
/// derived separately as the text run between one marker and the next (or
/// end-of-text), so it can span multiple lines the way a wrapped model
/// response does.
static INSIGHT_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*(?:\d+\.|-)\s*\[([^\]]+)\]\s*").unwrap());

static FALLBACK_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(?:\d+\.|[-•])\s*").unwrap());

/// Primary parse: each line starting with `(\d+.|-) [domain]`; the insight's
/// content is everything up to the next such marker or end-of-text, so
/// wrapped/multi-line content is kept rather than dropped. If no line
/// matches that shape at all, falls back to treating every non-blank line as
/// an insight tagged with the generic domain, after stripping a leading `-`,
/// `•`, or `N.` marker. Either way, capped at 5.
pub fn parse_insights(response: &str) -> Vec<Insight> {
    let markers: Vec<_> = INSIGHT_MARKER.captures_iter(response).collect();

    let matches: Vec<Insight> = markers
        .iter()
        .enumerate()
        .map(|(i, caps)| {
            let whole = caps.get(0).unwrap();
            let content_start = whole.end();
            let content_end = markers
                .get(i + 1)
                .map(|next| next.get(0).unwrap().start())
                .unwrap_or(response.len());
            Insight {
                domain: caps[1].trim().to_string(),
                content: response[content_start..content_end].trim().to_string(),
                importance: None,
            }
        })
        .take(MAX_INSIGHTS)
        .collect();

    if !matches.is_empty() {
        return matches;
    }

    response
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| Insight {
            domain: FALLBACK_DOMAIN.to_string(),
            content: FALLBACK_PREFIX.replace(line, "").trim().to_string(),
            importance: None,
        })
        .take(MAX_INSIGHTS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_lines() {
        let response = "- [tech] AI adoption accelerating\n- [markets] Rates steady this week";
        let insights = parse_insights(response);
        assert_eq!(insights.len(), 2);
        assert_eq!(insights[0].domain, "tech");
        assert_eq!(insights[0].content, "AI adoption accelerating");
    }

    #[test]
    fn numbered_markers_also_match() {
        let response = "1. [policy] New regulation announced";
        let insights = parse_insights(response);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].domain, "policy");
    }

    #[test]
    fn falls_back_to_generic_domain_when_untagged() {
        let response = "- Something happened\n- Something else happened";
        let insights = parse_insights(response);
        assert_eq!(insights.len(), 2);
        assert_eq!(insights[0].domain, "综合");
        assert_eq!(insights[0].content, "Something happened");
    }

    #[test]
    fn caps_at_five() {
        let response = (1..=8)
            .map(|i| format!("- [tag] item {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(parse_insights(&response).len(), 5);
    }

    #[test]
    fn wrapped_content_spanning_multiple_lines_is_appended_not_dropped() {
        let response =
            "- [tech] AI adoption accelerating\nacross enterprise budgets\nfor the third quarter running\n- [markets] Rates steady";
        let insights = parse_insights(response);
        assert_eq!(insights.len(), 2);
        assert_eq!(
            insights[0].content,
            "AI adoption accelerating\nacross enterprise budgets\nfor the third quarter running"
        );
        assert_eq!(insights[1].domain, "markets");
        assert_eq!(insights[1].content, "Rates steady");
    }
}
