//! Doctor command - validate configuration and show status

use anyhow::Result;
use news_fetcher_adapters::store::SqliteNewsStore;
use serde::Serialize;
use std::path::PathBuf;

use crate::args::DoctorArgs;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    feed: CheckResult,
    store: CheckResult,
    notify: CheckResult,
    overall: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: String,
    message: String,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: "warn".to_string(),
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn is_error(&self) -> bool {
        self.status == "error"
    }
}

pub async fn execute(args: DoctorArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut report = DoctorReport {
        config: CheckResult::error("Not checked"),
        feed: CheckResult::error("Not checked"),
        store: CheckResult::error("Not checked"),
        notify: CheckResult::error("Not checked"),
        overall: "error".to_string(),
    };

    // Check config
    let config = match AppConfig::load(config_path.as_deref()) {
        Ok(c) => {
            report.config = CheckResult::ok("Configuration loaded successfully");
            Some(c)
        }
        Err(e) => {
            report.config = CheckResult::error(format!("Failed to load config: {}", e));
            None
        }
    };

    if let Some(ref config) = config {
        report.feed = check_feed(config);
        report.store = check_store(config).await;
        report.notify = check_notify(config);
    }

    // Determine overall status
    let checks = [&report.config, &report.feed, &report.store];

    let has_error = checks.iter().any(|c| c.is_error());
    let all_ok = checks.iter().all(|c| c.is_ok());

    report.overall = if has_error {
        "error".to_string()
    } else if all_ok {
        "ok".to_string()
    } else {
        "warn".to_string()
    };

    // Output report
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall == "error" {
        std::process::exit(1);
    }

    Ok(())
}

fn check_feed(config: &AppConfig) -> CheckResult {
    if config.feed.domain.is_empty() {
        return CheckResult::error("feed.domain is not configured");
    }

    let env_var = &config.feed.access_token_env;
    if env_var.is_empty() {
        return CheckResult::error("No access token env var configured");
    }

    match std::env::var(env_var) {
        Ok(val) if !val.is_empty() => CheckResult::ok(format!(
            "Domain: {}, Token: {} (set)",
            config.feed.domain, env_var
        )),
        _ => CheckResult::warn(format!(
            "Domain: {}, Token: {} (not set)",
            config.feed.domain, env_var
        )),
    }
}

async fn check_store(config: &AppConfig) -> CheckResult {
    match SqliteNewsStore::new(&config.general.state_db_path).await {
        Ok(_) => CheckResult::ok(format!(
            "Database ready: {}",
            config.general.state_db_path.display()
        )),
        Err(e) => CheckResult::error(format!("Failed to open database: {}", e)),
    }
}

fn check_notify(config: &AppConfig) -> CheckResult {
    if !config.notify.enabled {
        return CheckResult::ok("Notifications disabled (alerts go to logs)");
    }

    let env_var = &config.notify.webhook_url_env;
    match std::env::var(env_var) {
        Ok(val) if !val.is_empty() => CheckResult::ok(format!("Webhook: {} (set)", env_var)),
        _ => CheckResult::warn(format!("Webhook: {} (not set)", env_var)),
    }
}

fn print_report(report: &DoctorReport) {
    println!("news-fetcher Doctor Report");
    println!("==========================");
    println!();

    print_check("Config", &report.config);
    print_check("Feed", &report.feed);
    print_check("Store", &report.store);
    print_check("Notify", &report.notify);

    println!();
    let symbol = match report.overall.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} Overall: {}", symbol, report.overall.to_uppercase());

    if report.overall == "ok" {
        println!();
        println!("Ready to run! Try: news-fetcher run --once");
    }
}

fn print_check(name: &str, result: &CheckResult) {
    let symbol = match result.status.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} {}: {}", symbol, name, result.message);
}
