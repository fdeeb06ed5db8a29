use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use trendcore_config::AiProvider;
use trendcore_utils::text::truncate_chars;

const OPENAI_CHAT_PATH: &str = "/chat/completions";
const FIXED_TEMPERATURE: f64 = 0.7;
const FIXED_MAX_TOKENS: u32 = 2000;

#[derive(Debug, Deserialize)]
struct OpenAiBody {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct GeminiBody {
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

/// Dispatches a single system/user prompt pair against the configured
/// provider and returns the raw text response. Provider-specific wire
/// dialects are fully contained here.
pub async fn dispatch(
    client: &reqwest::Client,
    provider: AiProvider,
    api_base_url: &str,
    api_key: &str,
    model_name: &str,
    timeout_secs: u64,
    system_prompt: &str,
    user_prompt: &str,
) -> Result<String, String> {
    let outcome = match provider {
        AiProvider::Gemini => {
            dispatch_gemini(client, api_base_url, api_key, model_name, timeout_secs, system_prompt, user_prompt).await
        }
        // openai-compatible wire format also covers deepseek/azure, which
        // speak the same `/chat/completions` dialect.
        AiProvider::Openai | AiProvider::Deepseek | AiProvider::Azure => {
            dispatch_openai_compatible(client, api_base_url, api_key, model_name, timeout_secs, system_prompt, user_prompt).await
        }
    };

    outcome.map_err(|e| classify_error(&e, api_base_url))
}

async fn dispatch_openai_compatible(
    client: &reqwest::Client,
    api_base_url: &str,
    api_key: &str,
    model_name: &str,
    timeout_secs: u64,
    system_prompt: &str,
    user_prompt: &str,
) -> Result<String, reqwest::Error> {
    let base = api_base_url.trim_end_matches('/');
    let endpoint = if base.ends_with(OPENAI_CHAT_PATH) {
        base.to_string()
    } else {
        format!("{base}{OPENAI_CHAT_PATH}")
    };

    let body = json!({
        "model": model_name,
        "messages": [
            {"role": "system", "content": system_prompt},
            {"role": "user", "content": user_prompt},
        ],
        "temperature": FIXED_TEMPERATURE,
        "max_tokens": FIXED_MAX_TOKENS,
    });

    let response = client
        .post(endpoint)
        .bearer_auth(api_key)
        .timeout(Duration::from_secs(timeout_secs))
        .json(&body)
        .send()
        .await?
        .error_for_status()?;

    let parsed: OpenAiBody = response.json().await?;
    Ok(parsed
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .unwrap_or_default())
}

async fn dispatch_gemini(
    client: &reqwest::Client,
    api_base_url: &str,
    api_key: &str,
    model_name: &str,
    timeout_secs: u64,
    system_prompt: &str,
    user_prompt: &str,
) -> Result<String, reqwest::Error> {
    let base = api_base_url.trim_end_matches('/');
    let endpoint = format!("{base}/models/{model_name}:generateContent?key={api_key}");

    // Gemini has no system role; emulate it with a leading user/model turn.
    let body = json!({
        "contents": [
            {"role": "user", "parts": [{"text": system_prompt}]},
            {"role": "model", "parts": [{"text": "Understood."}]},
            {"role": "user", "parts": [{"text": user_prompt}]},
        ],
    });

    let response = client
        .post(endpoint)
        .timeout(Duration::from_secs(timeout_secs))
        .json(&body)
        .send()
        .await?
        .error_for_status()?;

    let parsed: GeminiBody = response.json().await?;
    Ok(parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().next())
        .map(|p| p.text)
        .unwrap_or_default())
}

fn classify_error(e: &reqwest::Error, api_base_url: &str) -> String {
    if e.is_timeout() {
        return "request timed out; check network connectivity or increase the timeout".to_string();
    }
    if e.is_connect() {
        return format!("could not connect to {api_base_url}: {e}");
    }
    if let Some(status) = e.status() {
        return match status.as_u16() {
            401 => "authentication failed (401): check the configured api key".to_string(),
            429 => "rate limited (429): reduce request frequency".to_string(),
            500..=599 => format!("provider server error ({status})"),
            _ => format!("http error ({status}): {}", truncate_chars(&e.to_string(), 150)),
        };
    }
    format!("request error: {}", truncate_chars(&e.to_string(), 150))
}

/// Extracts the seven expected string fields from `raw`, preferring a fenced
/// ` ```json ` block, then a generic fence, then the whole text.
pub struct ParsedReport {
    pub summary: String,
    pub keyword_analysis: String,
    pub sentiment: String,
    pub cross_platform: String,
    pub impact: String,
    pub signals: String,
    pub conclusion: String,
}

pub fn parse_report(raw: &str) -> Result<ParsedReport, String> {
    let candidate = extract_fenced_block(raw);
    let value: Value = serde_json::from_str(candidate).map_err(|e| e.to_string())?;

    let field = |name: &str| {
        value
            .get(name)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    };

    Ok(ParsedReport {
        summary: field("summary"),
        keyword_analysis: field("keyword_analysis"),
        sentiment: field("sentiment"),
        cross_platform: field("cross_platform"),
        impact: field("impact"),
        signals: field("signals"),
        conclusion: field("conclusion"),
    })
}

fn extract_fenced_block(raw: &str) -> &str {
    if let Some(start) = raw.find("```json") {
        let after = &raw[start + "```json".len()..];
        if let Some(end) = after.find("```") {
            return after[..end].trim();
        }
    }
    if let Some(start) = raw.find("```") {
        let after = &raw[start + 3..];
        if let Some(end) = after.find("```") {
            return after[..end].trim();
        }
    }
    raw.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_json_fenced_block() {
        let raw = "Here:\n```json\n{\"summary\": \"ok\"}\n```\nThanks";
        assert_eq!(extract_fenced_block(raw), "{\"summary\": \"ok\"}");
    }

    #[test]
    fn extracts_generic_fenced_block_when_no_json_tag() {
        let raw = "```\n{\"summary\": \"ok\"}\n```";
        assert_eq!(extract_fenced_block(raw), "{\"summary\": \"ok\"}");
    }

    #[test]
    fn falls_back_to_whole_text_when_unfenced() {
        let raw = "{\"summary\": \"ok\"}";
        assert_eq!(extract_fenced_block(raw), raw);
    }

    #[test]
    fn parses_all_seven_fields() {
        let raw = r#"{"summary":"s","keyword_analysis":"k","sentiment":"pos","cross_platform":"c","impact":"i","signals":"sig","conclusion":"concl"}"#;
        let parsed = parse_report(raw).unwrap();
        assert_eq!(parsed.summary, "s");
        assert_eq!(parsed.conclusion, "concl");
    }

    #[test]
    fn missing_fields_default_to_empty_string() {
        let parsed = parse_report(r#"{"summary":"s"}"#).unwrap();
        assert_eq!(parsed.summary, "s");
        assert_eq!(parsed.sentiment, "");
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(parse_report("not json at all").is_err());
    }
}
