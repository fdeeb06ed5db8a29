//! Case-folded domain-suffix matching used by the fetch router's domain rules.

/// `host` matches `entry` iff they are equal or `host` ends with `.entry`,
/// both compared case-insensitively. This is suffix matching on whole
/// labels, not substrings — `"fooexample.com"` does not match `"example.com"`.
pub fn domain_matches(host: &str, entry: &str) -> bool {
    let host = host.to_ascii_lowercase();
    let entry = entry.to_ascii_lowercase();
    host == entry || host.ends_with(&format!(".{entry}"))
}

/// Extract the lowercased host from a URL string. Returns an empty string
/// (never matching any rule) when the URL fails to parse.
pub fn extract_host(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_exact_and_subdomain() {
        assert!(domain_matches("weibo.com", "weibo.com"));
        assert!(domain_matches("m.weibo.com", "weibo.com"));
        assert!(domain_matches("WEIBO.COM", "weibo.com"));
    }

    #[test]
    fn rejects_substring_lookalikes() {
        assert!(!domain_matches("fooweibo.com", "weibo.com"));
        assert!(!domain_matches("weibo.com.evil.net", "weibo.com"));
    }

    #[test]
    fn extracts_host() {
        assert_eq!(extract_host("https://m.weibo.cn/status/1"), "m.weibo.cn");
        assert_eq!(extract_host("not a url"), "");
    }
}
