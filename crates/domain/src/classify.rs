//! Repost-origin classification
//!
//! Decides whether a wall post (or any ancestor in its repost chain)
//! references an external long-form article, and which post in the chain
//! actually carries the article content.

use regex::Regex;
use std::sync::LazyLock;

use crate::model::{Attachment, WallPost};
use crate::normalize::normalize_article_url;

/// Host families recognized as external article platforms
pub const DEFAULT_ARTICLE_HOSTS: &[&str] = &["zen.yandex", "dzen.ru"];

/// Upstream chains are trees by construction, but malformed data could
/// still nest arbitrarily deep. Traversal fails safe beyond this ceiling.
const MAX_CHAIN_DEPTH: usize = 16;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("valid regex"));

/// Classifies posts against a configured set of article host patterns
pub struct ArticleClassifier {
    host_pattern: Regex,
}

impl ArticleClassifier {
    /// Build a classifier matching any of the given host substrings,
    /// case-insensitively
    pub fn new(hosts: &[&str]) -> Result<Self, regex::Error> {
        let escaped: Vec<String> = hosts.iter().map(|host| regex::escape(host)).collect();
        let host_pattern = Regex::new(&format!("(?i)(?:{})", escaped.join("|")))?;
        Ok(Self { host_pattern })
    }

    /// True if the post, its text, or any post in its repost chain links an
    /// external article
    pub fn is_external_article(&self, post: &WallPost) -> bool {
        self.matches_at_depth(post, 0)
    }

    /// The post in the repost chain that carries the article content:
    /// the post itself on a direct match, else the first matching chain
    /// entry, else the post itself
    pub fn resolve_source_post<'a>(&self, post: &'a WallPost) -> &'a WallPost {
        if self.links_article_directly(post) {
            return post;
        }
        post.copy_history
            .iter()
            .find(|origin| self.matches_at_depth(origin, 1))
            .unwrap_or(post)
    }

    /// Depth-first search for the article URL: attachments first, then free
    /// text, then each repost-chain entry in order. The result is normalized.
    pub fn resolve_article_url(&self, post: &WallPost) -> Option<String> {
        self.find_article_url(post, 0)
    }

    fn matches_at_depth(&self, post: &WallPost, depth: usize) -> bool {
        if depth >= MAX_CHAIN_DEPTH {
            return false;
        }
        if self.links_article_directly(post) {
            return true;
        }
        post.copy_history
            .iter()
            .any(|origin| self.matches_at_depth(origin, depth + 1))
    }

    /// Match against the post's own attachments and text, ignoring the chain
    fn links_article_directly(&self, post: &WallPost) -> bool {
        let in_attachments = post.attachments.iter().any(|attachment| {
            matches!(attachment, Attachment::Link { link } if self.host_pattern.is_match(&link.url))
        });
        in_attachments
            || URL_RE
                .find_iter(&post.text)
                .any(|url| self.host_pattern.is_match(url.as_str()))
    }

    fn find_article_url(&self, post: &WallPost, depth: usize) -> Option<String> {
        if depth >= MAX_CHAIN_DEPTH {
            return None;
        }

        for attachment in &post.attachments {
            if let Attachment::Link { link } = attachment {
                if self.host_pattern.is_match(&link.url) {
                    return Some(normalize_article_url(&link.url));
                }
            }
        }

        if let Some(url) = URL_RE
            .find_iter(&post.text)
            .find(|url| self.host_pattern.is_match(url.as_str()))
        {
            return Some(normalize_article_url(url.as_str()));
        }

        post.copy_history
            .iter()
            .find_map(|origin| self.find_article_url(origin, depth + 1))
    }
}

impl Default for ArticleClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_ARTICLE_HOSTS).expect("default host patterns are valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LinkInfo;

    fn empty_post(id: i64) -> WallPost {
        WallPost {
            id,
            owner_id: -1,
            date: 0,
            text: String::new(),
            attachments: vec![],
            copy_history: vec![],
            marked_as_ads: false,
        }
    }

    fn link_attachment(url: &str) -> Attachment {
        Attachment::Link {
            link: LinkInfo {
                url: url.to_string(),
                title: None,
                description: None,
                photo: None,
            },
        }
    }

    #[test]
    fn matches_link_attachment_case_insensitively() {
        let classifier = ArticleClassifier::default();
        let mut post = empty_post(1);
        post.attachments = vec![link_attachment("https://DZEN.RU/a/XyZ")];
        assert!(classifier.is_external_article(&post));
    }

    #[test]
    fn matches_url_embedded_in_text() {
        let classifier = ArticleClassifier::default();
        let mut post = empty_post(1);
        post.text = "Read it here: https://zen.yandex.ru/media/id/abc".to_string();
        assert!(classifier.is_external_article(&post));
    }

    #[test]
    fn plain_post_does_not_match() {
        let classifier = ArticleClassifier::default();
        let mut post = empty_post(1);
        post.text = "Just news, see https://example.com/page".to_string();
        assert!(!classifier.is_external_article(&post));
    }

    #[test]
    fn matches_through_repost_chain() {
        let classifier = ArticleClassifier::default();
        let mut origin = empty_post(2);
        origin.attachments = vec![link_attachment("https://dzen.ru/a/XyZ")];
        let mut wrapper = empty_post(1);
        wrapper.copy_history = vec![origin];

        assert!(classifier.is_external_article(&wrapper));
    }

    #[test]
    fn resolve_source_post_prefers_direct_match() {
        let classifier = ArticleClassifier::default();
        let mut chained = empty_post(2);
        chained.attachments = vec![link_attachment("https://dzen.ru/a/chain")];
        let mut post = empty_post(1);
        post.attachments = vec![link_attachment("https://dzen.ru/a/own")];
        post.copy_history = vec![chained];

        assert_eq!(classifier.resolve_source_post(&post).id, 1);
    }

    #[test]
    fn resolve_source_post_picks_first_matching_chain_entry() {
        let classifier = ArticleClassifier::default();
        let plain = empty_post(2);
        let mut origin = empty_post(3);
        origin.attachments = vec![link_attachment("https://dzen.ru/a/XyZ")];
        let mut wrapper = empty_post(1);
        wrapper.copy_history = vec![plain, origin];

        assert_eq!(classifier.resolve_source_post(&wrapper).id, 3);
    }

    #[test]
    fn resolve_source_post_falls_back_to_post_itself() {
        let classifier = ArticleClassifier::default();
        let mut wrapper = empty_post(1);
        wrapper.copy_history = vec![empty_post(2)];

        assert_eq!(classifier.resolve_source_post(&wrapper).id, 1);
    }

    #[test]
    fn resolve_article_url_prefers_attachments_over_text() {
        let classifier = ArticleClassifier::default();
        let mut post = empty_post(1);
        post.text = "https://dzen.ru/a/from-text".to_string();
        post.attachments = vec![link_attachment("https://dzen.ru/a/from-attachment")];

        assert_eq!(
            classifier.resolve_article_url(&post).unwrap(),
            "https://zen.yandex.ru/a/from-attachment"
        );
    }

    #[test]
    fn resolve_article_url_normalizes_result() {
        let classifier = ArticleClassifier::default();
        let mut post = empty_post(1);
        post.attachments = vec![link_attachment("https://dzen.ru/media/id/abc?utm_source=share")];

        assert_eq!(
            classifier.resolve_article_url(&post).unwrap(),
            "https://zen.yandex.ru/media/id/abc"
        );
    }

    #[test]
    fn resolve_article_url_descends_into_chain() {
        let classifier = ArticleClassifier::default();
        let mut origin = empty_post(2);
        origin.text = "https://zen.yandex.ru/a/deep".to_string();
        let mut wrapper = empty_post(1);
        wrapper.copy_history = vec![origin];

        assert_eq!(
            classifier.resolve_article_url(&wrapper).unwrap(),
            "https://zen.yandex.ru/a/deep"
        );
    }

    #[test]
    fn traversal_fails_safe_beyond_depth_ceiling() {
        let classifier = ArticleClassifier::default();

        let mut deepest = empty_post(100);
        deepest.attachments = vec![link_attachment("https://dzen.ru/a/buried")];
        let mut post = deepest;
        for id in 0..20 {
            let mut wrapper = empty_post(id);
            wrapper.copy_history = vec![post];
            post = wrapper;
        }

        assert!(!classifier.is_external_article(&post));
        assert!(classifier.resolve_article_url(&post).is_none());
    }

    #[test]
    fn custom_host_patterns_are_honored() {
        let classifier = ArticleClassifier::new(&["longform.example"]).unwrap();
        let mut post = empty_post(1);
        post.attachments = vec![link_attachment("https://longform.example/essays/1")];

        assert!(classifier.is_external_article(&post));
        let default = ArticleClassifier::default();
        assert!(!default.is_external_article(&post));
    }
}
