//! Domain models and value objects

use serde::{Deserialize, Deserializer, Serialize};

/// A raw post from the VK community wall, as returned by `wall.get`
///
/// Reposts carry the chain of original posts in `copy_history`,
/// outermost origin first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WallPost {
    /// Post ID, unique within the owner's wall
    pub id: i64,
    /// Wall owner ID (negative for communities)
    pub owner_id: i64,
    /// Publish time as a unix timestamp
    pub date: i64,
    /// Free-form post text
    #[serde(default)]
    pub text: String,
    /// Attachments in their original order
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Repost chain, outermost origin first
    #[serde(default)]
    pub copy_history: Vec<WallPost>,
    /// VK marks promoted posts with a 0/1 integer flag
    #[serde(default, deserialize_with = "bool_from_int")]
    pub marked_as_ads: bool,
}

impl WallPost {
    /// Permanent link to this post on VK
    pub fn permalink(&self) -> String {
        format!("https://vk.com/wall{}_{}", self.owner_id, self.id)
    }
}

/// A wall post attachment, tagged by the VK `type` field
///
/// Unknown attachment kinds decode as `Other` and are ignored downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Attachment {
    Link { link: LinkInfo },
    Photo { photo: PhotoInfo },
    Video { video: VideoInfo },
    #[serde(other)]
    Other,
}

/// Link attachment payload: external URL plus optional preview data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkInfo {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub photo: Option<PhotoInfo>,
}

/// Photo attachment payload: size variants in no guaranteed order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoInfo {
    #[serde(default)]
    pub sizes: Vec<ImageSize>,
}

/// Video attachment payload: preview images plus optional text fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Vec<ImageSize>,
}

/// One size variant of an image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSize {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
}

/// Where a news record originated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Native VK wall post
    Vk,
    /// External Zen article reached through a post or its repost chain
    Zen,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Vk => "vk",
            Source::Zen => "zen",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The canonical news record persisted by the pipeline
///
/// Field names are the external contract other systems rely on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsRecord {
    pub source: Source,
    pub title: String,
    pub content: String,
    /// Word-boundary truncated preview, at most 200 visible chars
    pub excerpt: String,
    pub image: Option<String>,
    pub link: String,
    /// `YYYY-MM-DD HH:MM:SS`, UTC
    pub date: String,
    /// Stable dedup key, scoped by `source`
    pub external_id: String,
    /// Set by human editors outside this pipeline; never written true here
    pub is_manual: bool,
}

/// Outcome of processing a single wall post
#[derive(Debug)]
pub enum ProcessResult {
    /// A record was written to the store
    Saved {
        external_id: String,
        source: Source,
        created: bool,
    },
    /// The post produced no record (ad, empty, manually edited record)
    Skipped { reason: String },
    /// Extraction or the write failed; the run continues
    Failed { error: String },
}

fn bool_from_int<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(u8::deserialize(deserializer)? != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_decodes_from_vk_json() {
        let json = serde_json::json!({
            "id": 42,
            "owner_id": -123,
            "date": 1700000000,
            "text": "Hello",
            "marked_as_ads": 1,
            "attachments": [
                {"type": "link", "link": {"url": "https://example.com", "title": "T"}},
                {"type": "photo", "photo": {"sizes": [{"url": "https://i/p.jpg", "width": 800}]}},
                {"type": "poll", "poll": {"question": "ignored"}}
            ]
        });

        let post: WallPost = serde_json::from_value(json).unwrap();
        assert_eq!(post.id, 42);
        assert!(post.marked_as_ads);
        assert_eq!(post.attachments.len(), 3);
        assert!(matches!(post.attachments[0], Attachment::Link { .. }));
        assert!(matches!(post.attachments[1], Attachment::Photo { .. }));
        assert!(matches!(post.attachments[2], Attachment::Other));
        assert!(post.copy_history.is_empty());
    }

    #[test]
    fn permalink_uses_owner_and_post_id() {
        let post = WallPost {
            id: 7,
            owner_id: -55,
            date: 0,
            text: String::new(),
            attachments: vec![],
            copy_history: vec![],
            marked_as_ads: false,
        };
        assert_eq!(post.permalink(), "https://vk.com/wall-55_7");
    }

    #[test]
    fn source_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Source::Vk).unwrap(), "\"vk\"");
        assert_eq!(serde_json::to_string(&Source::Zen).unwrap(), "\"zen\"");
        assert_eq!(Source::Zen.to_string(), "zen");
    }
}
