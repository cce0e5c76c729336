mod analyzer;
mod config;
mod model;
mod provider;
mod report;
mod scanner;
mod utils;

use config::{load_config, AppConfig};
use provider::{MarketData, YahooProvider};
use report::{log_report, rank, Tiers};
use scanner::Scanner;
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};
use tracing_subscriber;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("😱 Panic occurred: {:?}", panic_info);
    }));

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let config: AppConfig = match load_config(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error ({}): {}", config_path, e);
            return;
        }
    };

    let provider: Arc<dyn MarketData> =
        match YahooProvider::new(config.request_timeout_seconds, &config.user_agent) {
            Ok(p) => Arc::new(p),
            Err(e) => {
                error!("Failed to create market data client: {}", e);
                return;
            }
        };
    let scanner = Scanner::new(provider);

    info!(
        "🚀 Scanner started: {} symbols, timeframe {}, every {}s",
        config.watchlist.len(),
        config.timeframe,
        config.scan_interval_seconds
    );

    loop {
        run_cycle(&scanner, &config).await;

        info!("Next scan in {}s...", config.scan_interval_seconds);
        tokio::select! {
            _ = sleep(Duration::from_secs(config.scan_interval_seconds)) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("🛑 Shutdown requested.");
                break;
            }
        }
    }
}

/// Runs one scan, ranks the snapshots and logs them by tier.
async fn run_cycle(scanner: &Scanner<dyn MarketData>, config: &AppConfig) {
    let snapshots = scanner.scan(&config.watchlist, &config.timeframe).await;
    let tiers = Tiers::split(rank(snapshots));
    if tiers.is_empty() {
        warn!("Scan returned no snapshots");
        return;
    }

    info!(
        "{} snapshots: {} surge, {} momentum",
        tiers.len(),
        tiers.surge.len(),
        tiers.momentum.len()
    );
    log_report(&tiers);

    if tiers.has_surge() {
        let names: Vec<&str> = tiers.surge.iter().map(|s| s.symbol.as_str()).collect();
        warn!("🔔 Volume surge on momentum: {}", names.join(", "));
    }
}
