//! Surge scanner service binary

use anyhow::{Context, Result};
use surge_scanner::config::{load_config_file, resolve_config_path};
use surge_scanner::{BinanceGateway, Notifier, Scanner, ScannerConfig, TelegramConfig, TelegramNotifier};
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting surge scanner");

    let config_path = resolve_config_path("SCANNER_CONFIG_PATH", "configs/scanner.toml");
    let config = load_config_file(&config_path, ScannerConfig::default())
        .context("Failed to load scanner configuration")?;
    config.validate().context("Invalid scanner configuration")?;

    info!(
        "Configuration loaded: {} quote asset, {}s cycle, {}s cooldown",
        config.quote_asset, config.cycle_interval_secs, config.cooldown_secs
    );

    let telegram = TelegramConfig::from_env().context("Missing Telegram credentials")?;
    let notifier = TelegramNotifier::new(telegram, config.request_timeout())
        .context("Failed to construct Telegram notifier")?;

    let api_key = std::env::var("BINANCE_API_KEY").ok();
    let gateway =
        BinanceGateway::new(&config, api_key).context("Failed to construct market data gateway")?;

    // Liveness signal only; a failed startup message does not block the scan.
    match notifier.send("✅ Surge scanner started").await {
        Ok(()) => info!("Startup notification delivered"),
        Err(e) => warn!("Startup notification failed: {}", e),
    }

    let mut scanner = Scanner::new(config, gateway, notifier);

    tokio::select! {
        result = scanner.run() => {
            result.context("Scan loop terminated unexpectedly")?;
        }
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received, stopping surge scanner");
        }
    }

    Ok(())
}
