//! Run command - fetch, classify and store one page per cycle

use anyhow::{Context, Result, bail};
use news_fetcher_adapters::{
    notify::{LogNotifier, WebhookNotifier},
    snapshot::FsSnapshotSink,
    store::SqliteNewsStore,
    vk_api::{VkFeedConfig, VkFeedSource},
};
use news_fetcher_domain::{
    AdminNotifier, ProcessResult, SnapshotSink,
    classify::ArticleClassifier,
    record::RecordBuilder,
    usecases::{IngestConfig, IngestPipeline},
};
use secrecy::SecretString;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

use crate::args::RunArgs;
use crate::config::AppConfig;

pub async fn execute(args: RunArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    if config.feed.domain.is_empty() {
        bail!("feed.domain is not configured; run 'news-fetcher config init' to get started");
    }

    tracing::info!(
        domain = %config.feed.domain,
        once = args.once,
        db = %config.general.state_db_path.display(),
        "Starting news-fetcher run"
    );

    // Build dependencies
    let store = Arc::new(
        SqliteNewsStore::new(&config.general.state_db_path)
            .await
            .context("Failed to initialize SQLite news store")?,
    );

    let feed = Arc::new(build_feed_source(&config)?);
    let notifier = build_notifier(&config)?;
    let snapshot = build_snapshot_sink(&config);

    let hosts: Vec<&str> = config.feed.article_hosts.iter().map(String::as_str).collect();
    let classifier = ArticleClassifier::new(&hosts)
        .context("Invalid feed.article_hosts pattern")?;
    let builder = RecordBuilder::new(classifier);

    let pipeline = IngestPipeline::new(
        feed,
        store,
        notifier,
        snapshot,
        builder,
        IngestConfig {
            inter_post_delay: Duration::from_secs(config.general.inter_post_delay_secs),
            ..Default::default()
        },
    );

    // Execute
    if args.once {
        tracing::info!("Running single fetch cycle");
        let results = pipeline.run_once().await?;
        report_results(&results);
    } else {
        // Continuous polling loop
        let poll_interval = Duration::from_secs(config.general.poll_interval_secs);
        let mut ticker = interval(poll_interval);

        // Set up graceful shutdown
        let shutdown = async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
            tracing::info!("Shutdown signal received");
        };

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match pipeline.run_once().await {
                        Ok(results) => report_results(&results),
                        Err(e) => {
                            tracing::error!(error = %e, "Fetch cycle failed");
                        }
                    }
                }
                _ = &mut shutdown => {
                    tracing::info!("Shutting down gracefully");
                    break;
                }
            }
        }
    }

    tracing::info!("news-fetcher run completed");
    Ok(())
}

fn report_results(results: &[(i64, ProcessResult)]) {
    let mut saved = 0usize;
    let mut skipped = 0usize;
    let mut failed = 0usize;

    for (post_id, result) in results {
        match result {
            ProcessResult::Saved {
                external_id,
                source,
                created,
            } => {
                saved += 1;
                tracing::info!(
                    post_id,
                    external_id = %external_id,
                    source = %source,
                    created,
                    "Saved"
                );
            }
            ProcessResult::Skipped { reason } => {
                skipped += 1;
                tracing::debug!(post_id, reason = %reason, "Skipped");
            }
            ProcessResult::Failed { error } => {
                failed += 1;
                tracing::error!(post_id, error = %error, "Failed");
            }
        }
    }

    tracing::info!(total = results.len(), saved, skipped, failed, "Fetch cycle complete");
}

fn build_feed_source(config: &AppConfig) -> Result<VkFeedSource> {
    let access_token = load_secret(&config.feed.access_token_env)?;
    Ok(VkFeedSource::new(
        access_token,
        VkFeedConfig {
            domain: config.feed.domain.clone(),
            count: config.feed.count,
            api_version: config.feed.api_version.clone(),
            filter: config.feed.filter.clone(),
        },
    ))
}

fn build_notifier(config: &AppConfig) -> Result<Arc<dyn AdminNotifier>> {
    if !config.notify.enabled {
        return Ok(Arc::new(LogNotifier));
    }

    let webhook_url = std::env::var(&config.notify.webhook_url_env).with_context(|| {
        format!(
            "Environment variable {} is not set",
            config.notify.webhook_url_env
        )
    })?;
    Ok(Arc::new(WebhookNotifier::new(webhook_url)))
}

fn build_snapshot_sink(config: &AppConfig) -> Option<Arc<dyn SnapshotSink>> {
    if !config.snapshot.enabled {
        return None;
    }
    Some(Arc::new(FsSnapshotSink::new(config.snapshot.dir.clone())))
}

fn load_secret(env_var: &str) -> Result<SecretString> {
    let value = std::env::var(env_var)
        .with_context(|| format!("Environment variable {} is not set", env_var))?;

    if value.is_empty() {
        bail!("Environment variable {} is empty", env_var);
    }

    Ok(SecretString::new(value.into()))
}
