//! HTML -> article extraction shared by the plain-HTTP and headless-browser
//! fetchers. CSS-selector based, in the style of a readability port: try
//! narrow article containers first, widen, then fall back to the full body.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use crate::error::{ExtractionError, Result};

/// CSS-selector fallback chain for locating the article body, narrowest
/// first. Mirrors the ordering used by both fetcher strategies.
const ARTICLE_SELECTORS: &[&str] = &[
    "article",
    "[role='article']",
    ".article-content",
    ".post-content",
    ".entry-content",
    ".content-article",
    "#article-content",
    ".news-content",
    ".detail-content",
    "main article",
    ".main-content",
];

/// Scopes image extraction to the article body, the same way the original
/// scraper's `'article img, .content img, .post img'` selector does, so
/// nav/sidebar/ad images never end up in `image_urls`.
const IMAGE_SELECTOR: &str = "article img, .content img, .post img";

/// Tags and classes stripped before falling back to whole-`<body>` text.
const NOISE_SELECTORS: &[&str] = &[
    "script",
    "style",
    "nav",
    "header",
    "footer",
    "aside",
    ".sidebar",
    ".ads",
    ".advertisement",
    ".comment",
    ".comments",
];

const AUTHOR_SELECTORS: &[&str] = &[
    "meta[name='author']",
    "meta[property='article:author']",
    ".author",
    ".byline",
    "[rel='author']",
];

/// Lines matching any of these are dropped as promotional boilerplate
/// (share/follow/qr-scan prompts), regardless of language.
const PROMO_LINE_PATTERNS: &[&str] = &[
    r"(?i)^\s*(share|follow us|scan (the )?qr|关注我们|扫码|分享到|责任编辑)",
];

const MIN_CONTENT_LEN: usize = 100;
const MAX_IMAGES: usize = 10;
const HTML_EXCERPT_BYTES: usize = 10 * 1024;

#[derive(Debug, Clone, Default)]
pub struct ExtractedArticle {
    pub title: String,
    pub body_text: String,
    pub author: Option<String>,
    pub publish_time: Option<DateTime<Utc>>,
    pub image_urls: Vec<String>,
    pub html_excerpt: Option<String>,
}

/// Parses `html` and produces an [`ExtractedArticle`]. `page_url` is used to
/// resolve relative image `src` attributes to absolute URLs.
pub fn extract_article(html: &str, page_url: &str) -> Result<ExtractedArticle> {
    let document = Html::parse_document(html);

    let title = extract_title(&document);
    let body_text = extract_body_text(&document)?;
    let author = extract_author(&document);
    let publish_time = extract_publish_time(&document);
    let image_urls = extract_images(&document, page_url, MAX_IMAGES);
    let html_excerpt = Some(truncate_to_byte_boundary(html, HTML_EXCERPT_BYTES));

    Ok(ExtractedArticle {
        title,
        body_text: clean_content(&body_text),
        author,
        publish_time,
        image_urls,
        html_excerpt,
    })
}

/// `og:title` meta if present, else `<title>`.
pub fn extract_title(document: &Html) -> String {
    if let Some(selector) = parse_selector("meta[property='og:title']") {
        if let Some(el) = document.select(&selector).next() {
            if let Some(content) = el.value().attr("content") {
                let trimmed = content.trim();
                if !trimmed.is_empty() {
                    return trimmed.to_string();
                }
            }
        }
    }
    if let Some(selector) = parse_selector("title") {
        if let Some(el) = document.select(&selector).next() {
            let text: String = el.text().collect();
            return text.trim().to_string();
        }
    }
    String::new()
}

/// Article selectors, then a cleaned whole-`<body>` fallback. Each candidate
/// must hold at least [`MIN_CONTENT_LEN`] characters of inner text to be
/// accepted.
pub fn extract_body_text(document: &Html) -> Result<String> {
    for selector_str in ARTICLE_SELECTORS {
        if let Some(selector) = parse_selector(selector_str) {
            if let Some(element) = document.select(&selector).next() {
                let text = collect_block_text(element);
                if text.chars().count() >= MIN_CONTENT_LEN {
                    return Ok(text);
                }
            }
        }
    }

    body_fallback(document).ok_or(ExtractionError::NoContentFound)
}

fn collect_block_text(element: scraper::ElementRef<'_>) -> String {
    let mut text = String::new();
    let block_selectors = ["p", "h1", "h2", "h3", "h4", "h5", "h6", "li", "blockquote"];
    for selector_str in block_selectors {
        if let Some(selector) = parse_selector(selector_str) {
            for el in element.select(&selector) {
                let block_text: String = el.text().collect();
                let cleaned = block_text.trim();
                if !cleaned.is_empty() {
                    text.push_str(cleaned);
                    text.push('\n');
                }
            }
        }
    }
    if text.trim().is_empty() {
        let direct: String = element.text().collect();
        return direct.trim().to_string();
    }
    text.trim().to_string()
}

/// Removes `NOISE_SELECTORS` matches and reads whatever inner text remains
/// in `<body>`.
fn body_fallback(document: &Html) -> Option<String> {
    let body_selector = parse_selector("body")?;
    let body = document.select(&body_selector).next()?;

    let noise: std::collections::HashSet<_> = NOISE_SELECTORS
        .iter()
        .filter_map(|s| parse_selector(s))
        .flat_map(|sel| body.select(&sel).map(|el| el.id()).collect::<Vec<_>>())
        .collect();

    let mut text = String::new();
    for node in body.descendants() {
        let in_noise_subtree = node
            .ancestors()
            .any(|ancestor| scraper::ElementRef::wrap(ancestor).is_some_and(|el| noise.contains(&el.id())));
        if in_noise_subtree {
            continue;
        }
        if let Some(t) = node.value().as_text() {
            text.push_str(t);
            text.push(' ');
        }
    }

    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn extract_author(document: &Html) -> Option<String> {
    for selector_str in AUTHOR_SELECTORS {
        if let Some(selector) = parse_selector(selector_str) {
            if let Some(el) = document.select(&selector).next() {
                let value = el
                    .value()
                    .attr("content")
                    .map(str::to_string)
                    .unwrap_or_else(|| el.text().collect::<String>());
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }
    None
}

pub fn extract_publish_time(document: &Html) -> Option<DateTime<Utc>> {
    if let Some(selector) = parse_selector("meta[property='article:published_time']") {
        if let Some(el) = document.select(&selector).next() {
            if let Some(content) = el.value().attr("content") {
                if let Some(parsed) = parse_flexible_timestamp(content) {
                    return Some(parsed);
                }
            }
        }
    }
    if let Some(selector) = parse_selector("time[datetime]") {
        if let Some(el) = document.select(&selector).next() {
            if let Some(content) = el.value().attr("datetime") {
                if let Some(parsed) = parse_flexible_timestamp(content) {
                    return Some(parsed);
                }
            }
        }
    }
    None
}

fn parse_flexible_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .ok()
}

/// Up to `limit` `<img>` `src` values from inside an article container,
/// resolved against `page_url` when relative.
pub fn extract_images(document: &Html, page_url: &str, limit: usize) -> Vec<String> {
    let base = Url::parse(page_url).ok();
    let mut urls = Vec::new();
    let selector = match parse_selector(IMAGE_SELECTOR) {
        Some(s) => s,
        None => return urls,
    };

    for el in document.select(&selector) {
        if urls.len() >= limit {
            break;
        }
        let Some(src) = el.value().attr("src") else {
            continue;
        };
        let resolved = if src.starts_with("http") {
            Some(src.to_string())
        } else {
            base.as_ref().and_then(|b| b.join(src).ok()).map(|u| u.to_string())
        };
        if let Some(u) = resolved {
            urls.push(u);
        }
    }
    urls
}

/// Collapses blank-line runs and drops lines matching the promotional
/// boilerplate denylist.
pub fn clean_content(text: &str) -> String {
    let patterns = promo_patterns();
    let filtered: Vec<&str> = text
        .lines()
        .filter(|line| !patterns.iter().any(|re| re.is_match(line)))
        .collect();
    trendcore_utils::text::collapse_blank_lines(&filtered.join("\n"))
}

fn promo_patterns() -> &'static Vec<Regex> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        PROMO_LINE_PATTERNS
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect()
    })
}

/// Slices `text` to at most `max_bytes` bytes, backing off to the nearest
/// preceding char boundary so multi-byte (e.g. CJK) characters are never
/// split.
fn truncate_to_byte_boundary(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }
    let mut end = max_bytes;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}

fn parse_selector(selector_str: &str) -> Option<Selector> {
    match Selector::parse(selector_str) {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::warn!(selector = selector_str, error = ?e, "invalid css selector");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_title_from_og_meta() {
        let html = r#"<html><head><meta property="og:title" content="OG Title"><title>Fallback</title></head><body></body></html>"#;
        let doc = Html::parse_document(html);
        assert_eq!(extract_title(&doc), "OG Title");
    }

    #[test]
    fn falls_back_to_title_tag() {
        let html = r#"<html><head><title>Plain Title</title></head><body></body></html>"#;
        let doc = Html::parse_document(html);
        assert_eq!(extract_title(&doc), "Plain Title");
    }

    #[test]
    fn prefers_article_selector_over_body() {
        let html = r#"<html><body>
            <article><p>{long}</p></article>
            <div class="other">short</div>
        </body></html>"#
            .replace("{long}", &"word ".repeat(40));
        let doc = Html::parse_document(&html);
        let body = extract_body_text(&doc).unwrap();
        assert!(body.contains("word"));
    }

    #[test]
    fn body_fallback_strips_noise_selectors() {
        let html = r#"<html><body>
            <nav>navigation links</nav>
            <p>actual article text that is reasonably long to pass threshold checks here</p>
        </body></html>"#;
        let doc = Html::parse_document(html);
        let body = extract_body_text(&doc).unwrap();
        assert!(!body.contains("navigation links"));
        assert!(body.contains("actual article text"));
    }

    #[test]
    fn extracts_author_from_meta() {
        let html = r#"<html><head><meta name="author" content="Jane Doe"></head><body></body></html>"#;
        let doc = Html::parse_document(html);
        assert_eq!(extract_author(&doc), Some("Jane Doe".to_string()));
    }

    #[test]
    fn extracts_images_resolving_relative_src() {
        let html = r#"<html><body><article><img src="/foo.png"><img src="http://other.com/bar.png"></article></body></html>"#;
        let doc = Html::parse_document(html);
        let images = extract_images(&doc, "https://example.com/article", 10);
        assert_eq!(images.len(), 2);
        assert_eq!(images[0], "https://example.com/foo.png");
        assert_eq!(images[1], "http://other.com/bar.png");
    }

    #[test]
    fn excludes_images_outside_the_article_container() {
        let html = r#"<html><body>
            <nav><img src="https://example.com/logo.png"></nav>
            <article><img src="https://example.com/photo.png"></article>
            <aside><img src="https://example.com/ad.png"></aside>
        </body></html>"#;
        let doc = Html::parse_document(html);
        let images = extract_images(&doc, "https://example.com/article", 10);
        assert_eq!(images, vec!["https://example.com/photo.png".to_string()]);
    }

    #[test]
    fn html_excerpt_truncates_on_a_char_boundary_for_multibyte_text() {
        let cjk_paragraph = "关".repeat(5000); // 3 bytes each => 15,000 bytes
        let html = format!("<html><body><article><p>{cjk_paragraph}</p></article></body></html>");
        let article = extract_article(&html, "https://example.com/a").unwrap();
        let excerpt = article.html_excerpt.unwrap();
        assert!(excerpt.len() <= HTML_EXCERPT_BYTES);
        assert!(excerpt.is_char_boundary(excerpt.len()));
    }

    #[test]
    fn clean_content_drops_promo_lines() {
        let text = "Real paragraph one.\n关注我们获取更多资讯\nReal paragraph two.";
        let cleaned = clean_content(text);
        assert!(!cleaned.contains("关注我们"));
        assert!(cleaned.contains("Real paragraph one."));
    }
}
