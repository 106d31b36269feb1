//! VK wall API adapters

mod read;

pub use read::{VkFeedConfig, VkFeedSource};

use async_trait::async_trait;
use news_fetcher_domain::{FeedError, FeedPage, FeedSource, WallPost};

/// Stub feed source for testing and offline runs
pub struct StubFeedSource {
    posts: Vec<WallPost>,
}

impl StubFeedSource {
    /// Create an empty stub
    pub fn empty() -> Self {
        Self { posts: vec![] }
    }

    /// Create a stub serving predefined posts
    pub fn with_posts(posts: Vec<WallPost>) -> Self {
        Self { posts }
    }
}

#[async_trait]
impl FeedSource for StubFeedSource {
    async fn fetch_page(&self) -> Result<FeedPage, FeedError> {
        let raw = serde_json::json!({
            "response": {
                "count": self.posts.len(),
                "items": self.posts,
            }
        });
        Ok(FeedPage {
            posts: self.posts.clone(),
            raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stub_serves_posts_and_matching_raw_page() {
        let posts = vec![WallPost {
            id: 1,
            owner_id: -9,
            date: 1700000000,
            text: "Stubbed".to_string(),
            attachments: vec![],
            copy_history: vec![],
            marked_as_ads: false,
        }];

        let page = StubFeedSource::with_posts(posts).fetch_page().await.unwrap();
        assert_eq!(page.posts.len(), 1);
        assert_eq!(page.raw["response"]["items"][0]["id"], 1);

        let empty = StubFeedSource::empty().fetch_page().await.unwrap();
        assert!(empty.posts.is_empty());
    }
}
