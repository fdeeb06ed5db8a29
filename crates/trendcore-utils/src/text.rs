//! Text helpers shared by the prompt registry, analyzer, and hotspot formatter.

/// Truncate to at most `max_chars` code points, appending an ellipsis when
/// the text was actually cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let mut it = text.chars();
    let head: String = it.by_ref().take(max_chars).collect();
    if it.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Collapse runs of whitespace (including newlines) to single spaces and
/// trim the ends. Mirrors the fetchers' shared text-cleaning step.
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    out.trim().to_string()
}

/// Collapse consecutive blank lines to a single blank line, preserving
/// paragraph breaks in rendered article text.
pub fn collapse_blank_lines(text: &str) -> String {
    let mut out = Vec::new();
    let mut prev_blank = false;
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if !prev_blank {
                out.push(String::new());
            }
            prev_blank = true;
        } else {
            out.push(trimmed.to_string());
            prev_blank = false;
        }
    }
    out.join("\n").trim().to_string()
}

/// Heuristic token estimate: CJK code points count more heavily than
/// whitespace-separated words, per `LLMClient::count_tokens`. This is a
/// pre-flight sizing aid only — never report it as billed usage.
pub fn estimate_tokens(text: &str) -> usize {
    let cjk_chars = text
        .chars()
        .filter(|c| ('\u{4e00}'..='\u{9fff}').contains(c))
        .count();
    let non_cjk_words = text.split_whitespace().count().saturating_sub(cjk_chars / 2);
    ((cjk_chars as f64 * 1.5) + (non_cjk_words as f64 * 1.3)) as usize
}

/// Extract an `HH:MM` display from common time encodings used by hot-list and
/// RSS sources: `YYYY-MM-DD HH:MM:SS`, bare `HH:MM:SS`, or `HH:MM` already.
pub fn extract_hh_mm(raw: &str) -> Option<String> {
    let candidate = raw.trim().rsplit(' ').next().unwrap_or(raw.trim());
    let parts: Vec<&str> = candidate.split(':').collect();
    if parts.len() >= 2 && parts[0].len() <= 2 && parts[1].len() == 2 {
        let hh: u32 = parts[0].parse().ok()?;
        let mm: u32 = parts[1].parse().ok()?;
        if hh < 24 && mm < 60 {
            return Some(format!("{:02}:{:02}", hh, mm));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_chars_cuts_and_marks() {
        assert_eq!(truncate_chars("hello world", 5), "hello...");
        assert_eq!(truncate_chars("hi", 5), "hi");
    }

    #[test]
    fn normalize_whitespace_collapses_runs() {
        assert_eq!(normalize_whitespace("a\n\n  b\t c"), "a b c");
    }

    #[test]
    fn collapse_blank_lines_keeps_single_separators() {
        let input = "a\n\n\n\nb\nc\n\n\nd";
        assert_eq!(collapse_blank_lines(input), "a\n\nb\nc\n\nd");
    }

    #[test]
    fn estimate_tokens_counts_cjk_and_words() {
        assert!(estimate_tokens("hello there") > 0);
        assert!(estimate_tokens("你好世界") > 0);
    }

    #[test]
    fn extract_hh_mm_handles_variants() {
        assert_eq!(
            extract_hh_mm("2024-05-01 14:05:30"),
            Some("14:05".to_string())
        );
        assert_eq!(extract_hh_mm("09:45:00"), Some("09:45".to_string()));
        assert_eq!(extract_hh_mm("09:45"), Some("09:45".to_string()));
        assert_eq!(extract_hh_mm("not a time"), None);
    }
}
