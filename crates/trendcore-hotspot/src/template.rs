/// Literal `{token}` substitution — never `format!`-style interpolation — so
/// example JSON braces embedded in the template survive untouched.
pub fn substitute(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in values {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a hot-topic analyst. Given a set of \
trending keyword clusters gathered across platforms, produce a structured analysis. \
Respond with a single JSON object containing exactly these string fields: summary, \
keyword_analysis, sentiment, cross_platform, impact, signals, conclusion. Do not wrap \
the object in any other structure.";

pub const DEFAULT_USER_TEMPLATE: &str = "Report mode: {report_mode}\n\
Report type: {report_type}\n\
Generated at: {current_time}\n\
Platforms covered: {platforms}\n\
Keywords: {keywords}\n\
News items analyzed: {news_count} (plus {rss_count} RSS items)\n\n\
{news_content}\n\n\
Respond with the JSON object described in the system prompt, and nothing else.";

/// A prompt file is plain text with optional `[system]` and `[user]` section
/// markers, each on its own line. Without either marker, the whole file is
/// the user template and the built-in system prompt is kept. A `[system]`
/// section with no `[user]` marker leaves the user template at its built-in
/// default.
pub struct PromptFile {
    pub system: Option<String>,
    pub user: Option<String>,
}

pub fn parse_prompt_file(contents: &str) -> PromptFile {
    const SYSTEM_MARKER: &str = "[system]";
    const USER_MARKER: &str = "[user]";

    let system_at = contents.find(SYSTEM_MARKER);
    let user_at = contents.find(USER_MARKER);

    if system_at.is_none() && user_at.is_none() {
        return PromptFile {
            system: None,
            user: Some(contents.trim().to_string()),
        };
    }

    let system = system_at.map(|start| {
        let body_start = start + SYSTEM_MARKER.len();
        let body_end = user_at.filter(|&u| u > start).unwrap_or(contents.len());
        contents[body_start..body_end].trim().to_string()
    });

    let user = user_at.map(|start| contents[start + USER_MARKER.len()..].trim().to_string());

    PromptFile { system, user }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_every_token_literally() {
        let rendered = substitute(
            "{a} and {b} but not {{a}}",
            &[("a", "1"), ("b", "2")],
        );
        assert_eq!(rendered, "1 and 2 but not {1}");
    }

    #[test]
    fn leaves_unmatched_tokens_untouched() {
        let rendered = substitute("keep {unknown} as-is", &[("a", "1")]);
        assert_eq!(rendered, "keep {unknown} as-is");
    }

    #[test]
    fn unmarked_file_is_entirely_the_user_template() {
        let parsed = parse_prompt_file("just a user prompt with {tokens}");
        assert!(parsed.system.is_none());
        assert_eq!(parsed.user.unwrap(), "just a user prompt with {tokens}");
    }

    #[test]
    fn marked_file_splits_system_and_user_sections() {
        let parsed = parse_prompt_file("[system]\nYou are helpful.\n[user]\nDo {thing}.");
        assert_eq!(parsed.system.unwrap(), "You are helpful.");
        assert_eq!(parsed.user.unwrap(), "Do {thing}.");
    }

    #[test]
    fn system_only_file_leaves_user_unset() {
        let parsed = parse_prompt_file("[system]\nYou are helpful.");
        assert_eq!(parsed.system.unwrap(), "You are helpful.");
        assert!(parsed.user.is_none());
    }
}
