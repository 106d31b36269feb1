//! Configuration loading and management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub feed: FeedConfig,

    #[serde(default)]
    pub notify: NotifyConfig,

    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_state_db_path")]
    pub state_db_path: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Pause between posts after the first, respecting the API rate limit
    #[serde(default = "default_inter_post_delay")]
    pub inter_post_delay_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Short name of the VK community whose wall is fetched
    #[serde(default)]
    pub domain: String,

    #[serde(default = "default_page_size")]
    pub count: u32,

    #[serde(default = "default_access_token_env")]
    pub access_token_env: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_filter")]
    pub filter: String,

    /// Host substrings recognized as external article platforms
    #[serde(default = "default_article_hosts")]
    pub article_hosts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_webhook_url_env")]
    pub webhook_url_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_snapshot_dir")]
    pub dir: PathBuf,
}

// Default value functions
fn default_state_db_path() -> PathBuf {
    PathBuf::from("./news.sqlite")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_poll_interval() -> u64 {
    900
}

fn default_inter_post_delay() -> u64 {
    1
}

fn default_page_size() -> u32 {
    50
}

fn default_access_token_env() -> String {
    "VK_API_TOKEN".to_string()
}

fn default_api_version() -> String {
    "5.199".to_string()
}

fn default_filter() -> String {
    "all".to_string()
}

fn default_article_hosts() -> Vec<String> {
    vec!["zen.yandex".to_string(), "dzen.ru".to_string()]
}

fn default_webhook_url_env() -> String {
    "ADMIN_WEBHOOK_URL".to_string()
}

fn default_snapshot_dir() -> PathBuf {
    PathBuf::from("./snapshots")
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            state_db_path: default_state_db_path(),
            log_level: default_log_level(),
            poll_interval_secs: default_poll_interval(),
            inter_post_delay_secs: default_inter_post_delay(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            domain: String::new(),
            count: default_page_size(),
            access_token_env: default_access_token_env(),
            api_version: default_api_version(),
            filter: default_filter(),
            article_hosts: default_article_hosts(),
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            webhook_url_env: default_webhook_url_env(),
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: default_snapshot_dir(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            // User specified a path that doesn't exist
            anyhow::bail!("Config file not found: {}", path.display());
        }

        // Add environment variable overrides
        builder = builder.add_source(
            config::Environment::with_prefix("NEWS_FETCHER")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# news-fetcher configuration

[general]
state_db_path = "./news.sqlite"
log_level = "info"
poll_interval_secs = 900
# pause between posts after the first, respecting the VK rate limit
inter_post_delay_secs = 1

[feed]
domain = "example_public"
count = 50
access_token_env = "VK_API_TOKEN"
api_version = "5.199"
filter = "all"
article_hosts = ["zen.yandex", "dzen.ru"]

[notify]
enabled = false
webhook_url_env = "ADMIN_WEBHOOK_URL"

[snapshot]
enabled = false
dir = "./snapshots"
"#
        .to_string()
    }
}
