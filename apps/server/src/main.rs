//! Coin price notifier - headless daemon.
//!
//! Scrapes watched coin prices on a fixed interval, decides per coin whether
//! an SMS alert is due, and keeps the scrape session fresh in the background.

mod config;

use clap::Parser;
use coinwatch_alerts::SmsClient;
use coinwatch_engine::{
    run_session_refresher, Decider, DeciderMode, WatchEvent, Watcher, EVENT_CHANNEL_CAPACITY,
};
use coinwatch_feeds::{SessionSlot, TickerClient, TickerFeed};
use config::AppConfig;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Coin price notifier CLI.
#[derive(Parser, Debug)]
#[command(name = "coinwatch")]
#[command(about = "Watch coin prices and notify by SMS", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.json")]
    config: String,

    /// Coins to watch (comma-separated, overrides config)
    #[arg(long)]
    coins: Option<String>,

    /// High percent threshold
    #[arg(long)]
    high: Option<f64>,

    /// Low percent threshold
    #[arg(long)]
    low: Option<f64>,

    /// Amplitude threshold in percent points (0 disables)
    #[arg(long)]
    amplitude: Option<f64>,

    /// Minimum seconds between notifications for the same coin
    #[arg(long)]
    renotify_secs: Option<i64>,

    /// Scrape interval in seconds
    #[arg(long)]
    tick_secs: Option<u64>,

    /// Use the reduced threshold-only decision mode
    #[arg(long, default_value_t = false)]
    threshold_only: bool,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn init_logging(level: &str) {
    let level = match level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// CLI flags win over config-file values.
fn apply_cli(config: &mut AppConfig, args: &Args) {
    if let Some(coins) = &args.coins {
        config.watch.coins = coins
            .split(',')
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
    }
    if let Some(high) = args.high {
        config.watch.high = high;
    }
    if let Some(low) = args.low {
        config.watch.low = low;
    }
    if let Some(amplitude) = args.amplitude {
        config.watch.amplitude = amplitude;
    }
    if let Some(renotify_secs) = args.renotify_secs {
        config.watch.renotify_secs = renotify_secs;
    }
    if let Some(tick_secs) = args.tick_secs {
        config.watch.tick_secs = tick_secs;
    }
    if args.threshold_only {
        config.watch.threshold_only = true;
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut terminate =
            signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = terminate.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl+C");
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    init_logging(&args.log_level);

    let mut config = match AppConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load config {}: {}", args.config, e);
            process::exit(2);
        }
    };
    config.apply_env();
    apply_cli(&mut config, &args);
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        process::exit(2);
    }

    let mode = if config.watch.threshold_only {
        DeciderMode::ThresholdOnly
    } else {
        DeciderMode::PerCoin
    };

    info!("Coinwatch starting...");
    info!("  Coins: {}", config.watch.coins.join(", "));
    info!(
        "  Thresholds: high {:+.1}% / low {:+.1}% / amplitude {:.1}",
        config.watch.high, config.watch.low, config.watch.amplitude
    );
    info!("  Re-notify period: {}s", config.watch.renotify_secs);
    info!("  Tick interval: {}s", config.watch.tick_secs);
    info!("  Mode: {:?}", mode);

    let client = match TickerClient::new(config.feed_config()) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build http client: {}", e);
            process::exit(1);
        }
    };
    let credentials = config.credentials();

    // The initial login is the only fatal failure; everything after enters
    // the recoverable path.
    let session = match client.login(&credentials).await {
        Ok(session) => session,
        Err(e) => {
            error!("Initial login failed: {}", e);
            process::exit(1);
        }
    };
    info!("Logged in to ticker site");
    let slot = Arc::new(SessionSlot::new(session));

    let sms = match SmsClient::new(config.sms.clone()) {
        Ok(sms) => sms,
        Err(e) => {
            error!("Failed to build sms client: {}", e);
            process::exit(1);
        }
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (event_tx, mut event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

    let decider = Decider::new(config.watch_filter(), mode);
    let watcher = Watcher::new(TickerFeed::new(client.clone(), slot.clone()), sms, decider);
    let watcher_handle = tokio::spawn(watcher.run(
        config.tick_interval(),
        shutdown_rx.clone(),
        event_tx.clone(),
    ));

    let refresher_handle = tokio::spawn(run_session_refresher(
        client,
        credentials,
        slot,
        config.refresh_interval(),
        event_tx,
        shutdown_rx,
    ));

    info!("Press Ctrl+C to stop...");

    // Surface recoverable errors; only a signal stops the loops.
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            Some(event) = event_rx.recv() => match &event {
                WatchEvent::SessionRefresh(_) => info!("{}", event),
                _ => warn!("{}", event),
            },
        }
    }

    warn!("Shutdown signal received");
    let _ = shutdown_tx.send(true);

    // The current tick is allowed to finish before the loops wind down.
    let _ = tokio::time::timeout(Duration::from_secs(5), watcher_handle).await;
    let _ = tokio::time::timeout(Duration::from_secs(1), refresher_handle).await;

    info!("Coinwatch stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(argv: &[&str]) -> Args {
        Args::parse_from(std::iter::once("coinwatch").chain(argv.iter().copied()))
    }

    #[test]
    fn test_cli_overrides_config() {
        let mut config = AppConfig::default();
        config.watch.coins = vec!["BTC".to_string()];
        config.watch.high = 3.0;

        apply_cli(
            &mut config,
            &args(&["--coins", "CMT, ETH", "--high", "5.0", "--tick-secs", "4"]),
        );

        assert_eq!(
            config.watch.coins,
            vec!["CMT".to_string(), "ETH".to_string()]
        );
        assert_eq!(config.watch.high, 5.0);
        assert_eq!(config.watch.tick_secs, 4);
        // Flags not given leave the config untouched.
        assert_eq!(config.watch.low, -2.0);
    }

    #[test]
    fn test_threshold_only_flag() {
        let mut config = AppConfig::default();
        apply_cli(&mut config, &args(&[]));
        assert!(!config.watch.threshold_only);

        apply_cli(&mut config, &args(&["--threshold-only"]));
        assert!(config.watch.threshold_only);
    }
}
