//! Pure text and URL normalization rules
//!
//! Everything here is a stateless projection: applying a function twice
//! yields the same result as applying it once.

use regex::Regex;
use std::sync::LazyLock;

/// Query parameter prefixes that carry tracking state, not identity.
/// A query starting with any of these is dropped entirely.
const TRACKING_PARAM_PREFIXES: &[&str] = &["share_to", "utm_", "from", "cl4url", "persist_"];

/// Mirror host rewritten to its canonical form before hashing
const MIRROR_HOST: &str = "dzen.ru";
const CANONICAL_HOST: &str = "zen.yandex.ru";

/// Image URLs longer than this are collapsed to scheme+host+path
const MAX_IMAGE_URL_LEN: usize = 500;

static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^|\]]+)\|([^\]]+)\]").expect("valid regex"));
static HTML_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static TRACKING_QUERY_RE: LazyLock<Regex> = LazyLock::new(|| {
    let prefixes = TRACKING_PARAM_PREFIXES.join("|");
    Regex::new(&format!(r"(?i)\?(?:{prefixes}).*")).expect("valid regex")
});
static IMAGE_CS_PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&from=bu&cs=[^&]+").expect("valid regex"));
static IMAGE_AS_PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\?as=[^&]+").expect("valid regex"));

/// Clean feed markup out of post text
///
/// Replaces `[id123|Name]` mention tokens with the display name, drops any
/// remaining brackets, decodes HTML entities, strips tags, collapses
/// whitespace runs and trims.
pub fn clean_text(raw: &str) -> String {
    let text = MENTION_RE.replace_all(raw, "$2");
    let text = text.replace(['[', ']'], "");
    let text = html_escape::decode_html_entities(&text).into_owned();
    let text = HTML_TAG_RE.replace_all(&text, "");
    let text = WHITESPACE_RE.replace_all(&text, " ");
    text.trim().to_string()
}

/// Truncate to at most `limit` chars, backing off to the last word boundary
///
/// Counts chars, not bytes, so multi-byte text is never split mid-character.
pub fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let cut: String = text.chars().take(limit).collect();
    let cut = match cut.rfind(' ') {
        Some(pos) => &cut[..pos],
        None => cut.as_str(),
    };
    format!("{cut}...")
}

/// Canonicalize an external article URL for deduplication
///
/// Drops the query from the first tracking parameter onward, rewrites the
/// mirror host to its canonical form and trims trailing separators. Two
/// URLs differing only in tracking parameters or mirror host normalize to
/// an identical string.
pub fn normalize_article_url(url: &str) -> String {
    let url = TRACKING_QUERY_RE.replace(url, "");
    let url = url.replace(MIRROR_HOST, CANONICAL_HOST);
    url.trim_end_matches(['?', '&', '/']).to_string()
}

/// Strip CDN tracking fragments from an image URL
///
/// URLs still longer than 500 chars after stripping are collapsed to
/// scheme+host+path, discarding all query data.
pub fn clean_image_url(url: &str) -> String {
    let url = IMAGE_CS_PARAM_RE.replace(url, "");
    let url = IMAGE_AS_PARAM_RE.replace(&url, "?");
    let url = url.strip_suffix('?').unwrap_or(&url).to_string();

    if url.chars().count() > MAX_IMAGE_URL_LEN {
        return match url::Url::parse(&url) {
            Ok(parsed) => format!(
                "{}://{}{}",
                parsed.scheme(),
                parsed.host_str().unwrap_or_default(),
                parsed.path()
            ),
            Err(_) => url,
        };
    }

    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_replaces_mentions_with_display_name() {
        let cleaned = clean_text("Thanks [id123|Maria Ivanova] for the story!");
        assert_eq!(cleaned, "Thanks Maria Ivanova for the story!");
        assert!(!cleaned.contains('['));
        assert!(!cleaned.contains(']'));
    }

    #[test]
    fn clean_text_strips_markup_and_collapses_whitespace() {
        let cleaned = clean_text("  <b>Bold</b> news&nbsp;&amp; views \n\n here  ");
        assert_eq!(cleaned, "Bold news & views here");
    }

    #[test]
    fn clean_text_is_idempotent() {
        let inputs = [
            "Thanks [id123|Maria] &amp; [club9|Our Club]!",
            "<p>Some <i>markup</i></p> with\ttabs",
            "plain text stays plain",
        ];
        for input in inputs {
            let once = clean_text(input);
            assert_eq!(clean_text(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn truncate_returns_short_text_unchanged() {
        assert_eq!(truncate("short", 200), "short");
    }

    #[test]
    fn truncate_backs_off_to_word_boundary() {
        let text = "one two three four";
        let truncated = truncate(text, 10);
        assert_eq!(truncated, "one two...");
    }

    #[test]
    fn truncate_never_splits_multibyte_chars() {
        let text = "многодетная семья получила новую квартиру в центре города";
        let truncated = truncate(text, 20);
        assert!(truncated.ends_with("..."));
        let visible = truncated.trim_end_matches("...");
        assert!(visible.chars().count() <= 20);
        assert!(text.starts_with(visible));
    }

    #[test]
    fn normalize_article_url_strips_tracking_and_mirror_host() {
        let url = "https://dzen.ru/media/id/abc?utm_source=share";
        assert_eq!(
            normalize_article_url(url),
            "https://zen.yandex.ru/media/id/abc"
        );
    }

    #[test]
    fn normalize_article_url_collapses_tracking_variants() {
        let a = normalize_article_url("https://dzen.ru/a/XyZ?share_to=vk&utm_medium=post");
        let b = normalize_article_url("https://zen.yandex.ru/a/XyZ?utm_campaign=repost");
        let c = normalize_article_url("https://zen.yandex.ru/a/XyZ/");
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn normalize_article_url_is_a_projection() {
        let urls = [
            "https://dzen.ru/media/id/abc?utm_source=share",
            "https://zen.yandex.ru/a/XyZ",
            "https://zen.yandex.ru/a/XyZ?&",
        ];
        for url in urls {
            let once = normalize_article_url(url);
            assert_eq!(normalize_article_url(&once), once);
        }
    }

    #[test]
    fn clean_image_url_strips_cdn_params() {
        let url = "https://sun9-1.userapi.com/img.jpg?as=32x18&from=bu&cs=807x0";
        let cleaned = clean_image_url(url);
        assert_eq!(cleaned, "https://sun9-1.userapi.com/img.jpg");
    }

    #[test]
    fn clean_image_url_collapses_overlong_urls() {
        let query: String = std::iter::repeat('x').take(600).collect();
        let url = format!("https://sun9-1.userapi.com/v1/img.jpg?size={query}");
        let cleaned = clean_image_url(&url);
        assert_eq!(cleaned, "https://sun9-1.userapi.com/v1/img.jpg");
    }

    #[test]
    fn clean_image_url_keeps_benign_urls() {
        let url = "https://sun9-1.userapi.com/img.jpg?size=807x0&quality=95";
        assert_eq!(clean_image_url(url), url);
    }
}
