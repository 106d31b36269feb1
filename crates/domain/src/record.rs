//! Canonical news-record assembly from classified wall posts

use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use time::macros::format_description;

use crate::classify::ArticleClassifier;
use crate::extract;
use crate::model::{NewsRecord, Source, WallPost};
use crate::normalize::{clean_image_url, clean_text, truncate};

const EXCERPT_CHARS: usize = 200;

/// What building a record from one post produced
#[derive(Debug)]
pub enum BuildOutcome {
    Record(NewsRecord),
    /// The post carries nothing worth storing; informational, not an error
    Skip { reason: String },
}

/// Assembles `NewsRecord`s, classifying each post by its content origin
pub struct RecordBuilder {
    classifier: ArticleClassifier,
}

impl RecordBuilder {
    pub fn new(classifier: ArticleClassifier) -> Self {
        Self { classifier }
    }

    pub fn build(&self, post: &WallPost) -> BuildOutcome {
        if self.classifier.is_external_article(post) {
            self.build_article(post)
        } else {
            self.build_native(post)
        }
    }

    /// A post (or its repost chain) referencing an external article: extract
    /// from the originating post and key the record by the article URL
    fn build_article(&self, post: &WallPost) -> BuildOutcome {
        let source_post = self.classifier.resolve_source_post(post);

        let mut text = clean_text(&source_post.text);
        if text.is_empty() {
            text = extract::text_from_link_attachments(source_post).unwrap_or_default();
        }
        if text.is_empty() {
            return BuildOutcome::Skip {
                reason: "empty article text".to_string(),
            };
        }

        let link = match self.classifier.resolve_article_url(source_post) {
            Some(url) => url,
            None => {
                // data-quality warning, not an error: fall back to the wall permalink
                tracing::warn!(post_id = post.id, "article URL not found, using permalink");
                post.permalink()
            }
        };

        BuildOutcome::Record(NewsRecord {
            source: Source::Zen,
            title: extract::generate_title(&text, source_post),
            excerpt: truncate(&text, EXCERPT_CHARS),
            image: extract::best_image(source_post).map(|url| clean_image_url(&url)),
            external_id: article_external_id(&link),
            link,
            date: format_date(post.date),
            content: text,
            is_manual: false,
        })
    }

    /// A native wall post: keyed by the post's own id
    fn build_native(&self, post: &WallPost) -> BuildOutcome {
        if post.marked_as_ads {
            return BuildOutcome::Skip {
                reason: "ad post".to_string(),
            };
        }

        let mut text = clean_text(&post.text);
        if text.is_empty() {
            text = extract::text_from_attachments(post).unwrap_or_default();
        }
        if text.is_empty() {
            return BuildOutcome::Skip {
                reason: "empty post".to_string(),
            };
        }

        let title = extract::link_title(post)
            .unwrap_or_else(|| extract::generate_title(&text, post));

        BuildOutcome::Record(NewsRecord {
            source: Source::Vk,
            title,
            excerpt: truncate(&text, EXCERPT_CHARS),
            image: extract::best_image(post).map(|url| clean_image_url(&url)),
            link: post.permalink(),
            date: format_date(post.date),
            external_id: post.id.to_string(),
            content: text,
            is_manual: false,
        })
    }
}

impl Default for RecordBuilder {
    fn default() -> Self {
        Self::new(ArticleClassifier::default())
    }
}

/// Stable identifier for an external article: re-ingesting the same
/// normalized URL always recomputes the same id
pub fn article_external_id(url: &str) -> String {
    format!("zen_{:x}", Sha256::digest(url.as_bytes()))
}

fn format_date(timestamp: i64) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    OffsetDateTime::from_unix_timestamp(timestamp)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
        .format(&format)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attachment, LinkInfo};

    fn native_post(id: i64, text: &str) -> WallPost {
        WallPost {
            id,
            owner_id: -77,
            date: 1700000000,
            text: text.to_string(),
            attachments: vec![],
            copy_history: vec![],
            marked_as_ads: false,
        }
    }

    fn article_link(url: &str, title: &str) -> Attachment {
        Attachment::Link {
            link: LinkInfo {
                url: url.to_string(),
                title: Some(title.to_string()),
                description: None,
                photo: None,
            },
        }
    }

    fn built(outcome: BuildOutcome) -> NewsRecord {
        match outcome {
            BuildOutcome::Record(record) => record,
            BuildOutcome::Skip { reason } => panic!("expected a record, got skip: {reason}"),
        }
    }

    #[test]
    fn native_post_becomes_vk_record() {
        let builder = RecordBuilder::default();
        let post = native_post(101, "Hello world. Extra.");

        let record = built(builder.build(&post));
        assert_eq!(record.source, Source::Vk);
        // the first sentence is under the 20-char headline floor, so the
        // title falls back to the (short) full text
        assert_eq!(record.title, "Hello world. Extra.");
        assert_eq!(record.content, "Hello world. Extra.");
        assert_eq!(record.excerpt, "Hello world. Extra.");
        assert_eq!(record.external_id, "101");
        assert_eq!(record.link, "https://vk.com/wall-77_101");
        assert_eq!(record.date, "2023-11-14 22:13:20");
        assert!(record.image.is_none());
        assert!(!record.is_manual);
    }

    #[test]
    fn ad_posts_are_skipped() {
        let builder = RecordBuilder::default();
        let mut post = native_post(5, "Buy our stuff");
        post.marked_as_ads = true;

        assert!(matches!(
            builder.build(&post),
            BuildOutcome::Skip { reason } if reason == "ad post"
        ));
    }

    #[test]
    fn empty_native_post_is_skipped() {
        let builder = RecordBuilder::default();
        let post = native_post(6, "   ");

        assert!(matches!(builder.build(&post), BuildOutcome::Skip { .. }));
    }

    #[test]
    fn article_link_becomes_zen_record() {
        let builder = RecordBuilder::default();
        let mut post = native_post(7, "");
        post.attachments = vec![article_link(
            "https://dzen.ru/media/id/abc?utm_source=share",
            "A Sufficiently Long Article Headline",
        )];

        let record = built(builder.build(&post));
        assert_eq!(record.source, Source::Zen);
        assert_eq!(record.link, "https://zen.yandex.ru/media/id/abc");
        assert_eq!(record.title, "A Sufficiently Long Article Headline");
        assert_eq!(
            record.external_id,
            article_external_id("https://zen.yandex.ru/media/id/abc")
        );
        assert!(record.external_id.starts_with("zen_"));
    }

    #[test]
    fn article_record_extracts_from_chain_origin() {
        let builder = RecordBuilder::default();
        let mut origin = native_post(8, "The original article teaser text here.");
        origin.attachments = vec![article_link(
            "https://zen.yandex.ru/a/XyZ",
            "Original Article With A Long Headline",
        )];
        let mut wrapper = native_post(9, "");
        wrapper.copy_history = vec![origin];

        let record = built(builder.build(&wrapper));
        assert_eq!(record.source, Source::Zen);
        assert_eq!(record.content, "The original article teaser text here.");
        assert_eq!(record.link, "https://zen.yandex.ru/a/XyZ");
    }

    #[test]
    fn article_without_text_or_link_preview_is_skipped() {
        let builder = RecordBuilder::default();
        let mut post = native_post(10, "");
        post.attachments = vec![Attachment::Link {
            link: LinkInfo {
                url: "https://dzen.ru/a/XyZ".to_string(),
                title: None,
                description: None,
                photo: None,
            },
        }];

        assert!(matches!(
            builder.build(&post),
            BuildOutcome::Skip { reason } if reason == "empty article text"
        ));
    }

    #[test]
    fn external_id_is_deterministic() {
        let a = article_external_id("https://zen.yandex.ru/a/XyZ");
        let b = article_external_id("https://zen.yandex.ru/a/XyZ");
        assert_eq!(a, b);
        assert_ne!(a, article_external_id("https://zen.yandex.ru/a/Other"));
    }

    #[test]
    fn excerpt_is_truncated_at_word_boundary() {
        let builder = RecordBuilder::default();
        let text = "слово ".repeat(60);
        let post = native_post(11, text.trim());

        let record = built(builder.build(&post));
        assert!(record.excerpt.ends_with("..."));
        assert!(record.excerpt.trim_end_matches("...").chars().count() <= 200);
        assert_eq!(record.content, text.trim());
    }
}
