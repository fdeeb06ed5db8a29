use trendcore_types::FetcherKind;
use trendcore_utils::domain::domain_matches;

/// Social/video platforms that require JavaScript rendering to show any
/// content at all.
const JS_RENDER_DOMAINS: &[&str] = &[
    "weibo.com",
    "weibo.cn",
    "douyin.com",
    "twitter.com",
    "x.com",
    "instagram.com",
    "facebook.com",
    "tiktok.com",
];

/// Long-form/news portals that tend to work best through a managed
/// text-extraction service rather than a raw HTTP GET.
const READER_PREFERRED_DOMAINS: &[&str] = &[
    "zhihu.com",
    "mp.weixin.qq.com",
    "36kr.com",
    "ithome.com",
    "baidu.com",
    "sina.com.cn",
    "sohu.com",
    "qq.com",
    "thepaper.cn",
    "jiemian.com",
];

pub fn is_js_render_domain(host: &str) -> bool {
    JS_RENDER_DOMAINS.iter().any(|e| domain_matches(host, e))
}

pub fn is_reader_preferred_domain(host: &str) -> bool {
    READER_PREFERRED_DOMAINS
        .iter()
        .any(|e| domain_matches(host, e))
}

/// Parses a `domain_rules` config value (`"reader" | "browser" | "plain"`)
/// into the matching fetcher kind. Unknown values are ignored by the caller.
pub fn parse_rule(rule: &str) -> Option<FetcherKind> {
    match rule {
        "reader" => Some(FetcherKind::ManagedReader),
        "browser" => Some(FetcherKind::HeadlessBrowser),
        "plain" => Some(FetcherKind::PlainHttp),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn js_render_set_catches_social_platforms() {
        assert!(is_js_render_domain("weibo.com"));
        assert!(is_js_render_domain("www.douyin.com"));
        assert!(!is_js_render_domain("example.com"));
    }

    #[test]
    fn reader_preferred_set_catches_news_portals() {
        assert!(is_reader_preferred_domain("zhuanlan.zhihu.com"));
        assert!(is_reader_preferred_domain("news.sina.com.cn"));
        assert!(!is_reader_preferred_domain("example.com"));
    }

    #[test]
    fn parses_known_rule_strings() {
        assert_eq!(parse_rule("browser"), Some(FetcherKind::HeadlessBrowser));
        assert_eq!(parse_rule("reader"), Some(FetcherKind::ManagedReader));
        assert_eq!(parse_rule("plain"), Some(FetcherKind::PlainHttp));
        assert_eq!(parse_rule("bogus"), None);
    }
}
