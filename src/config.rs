//! Scanner configuration
//!
//! Thresholds and cadence load from a TOML file (path overridable via
//! `SCANNER_CONFIG_PATH`), falling back to defaults when no file exists.
//! Credentials are environment-only and never appear in the TOML file.

use crate::error::{Result, ScannerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Alert rule thresholds. Every condition is independently toggleable: a
/// `None` threshold disables that condition entirely. When a config file
/// carries a `[rule]` section, only the thresholds it names are active;
/// omitting the section altogether selects the reference rule (`Default`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Current volume must exceed previous volume by this factor.
    pub volume_multiplier: Option<f64>,

    /// Absolute volume floor in quote-asset units.
    pub volume_floor: Option<f64>,

    /// RSI must be present and strictly below this ceiling.
    pub rsi_ceiling: Option<f64>,

    /// Current open interest must exceed previous by this factor
    /// (previous must be strictly positive).
    pub oi_multiplier: Option<f64>,

    /// Absolute relative change between the last two closes must stay
    /// below this bound (0.03 == 3%).
    pub price_stability_bound: Option<f64>,

    /// Current volume must not fall below this fraction of the previous
    /// reading.
    pub volume_floor_fraction: Option<f64>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            volume_multiplier: Some(2.0),
            volume_floor: Some(1_000_000.0),
            rsi_ceiling: Some(70.0),
            oi_multiplier: Some(1.1),
            price_stability_bound: None,
            volume_floor_fraction: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Quote asset used to filter the symbol universe (e.g. "USDT").
    pub quote_asset: String,

    /// Kline interval requested from the data provider.
    pub kline_interval: String,

    /// Number of recent klines fetched per symbol. Must cover
    /// `rsi_period + 1` closes for the oscillator to be defined.
    pub kline_limit: usize,

    /// Open-interest history granularity.
    pub oi_period: String,

    /// RSI lookback period.
    pub rsi_period: usize,

    /// Seconds between scan cycles.
    pub cycle_interval_secs: u64,

    /// Per-symbol alert cooldown in seconds.
    pub cooldown_secs: u64,

    /// Per-request HTTP timeout in seconds.
    pub request_timeout_secs: u64,

    /// Alert rule thresholds.
    pub rule: RuleConfig,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            quote_asset: "USDT".to_string(),
            kline_interval: "5m".to_string(),
            kline_limit: 20,
            oi_period: "5m".to_string(),
            rsi_period: 14,
            cycle_interval_secs: 600,
            cooldown_secs: 600,
            request_timeout_secs: 10,
            rule: RuleConfig::default(),
        }
    }
}

impl ScannerConfig {
    pub fn cycle_interval(&self) -> Duration {
        Duration::from_secs(self.cycle_interval_secs)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rsi_period == 0 {
            return Err(ScannerError::Configuration {
                message: "rsi_period must be at least 1".to_string(),
            });
        }
        if self.kline_limit < self.rsi_period + 1 {
            return Err(ScannerError::Configuration {
                message: format!(
                    "kline_limit {} cannot cover rsi_period {} (need {} closes)",
                    self.kline_limit,
                    self.rsi_period,
                    self.rsi_period + 1
                ),
            });
        }
        if self.cycle_interval_secs == 0 {
            return Err(ScannerError::Configuration {
                message: "cycle_interval_secs must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Telegram credentials, read from the environment only.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: String,
}

impl TelegramConfig {
    pub fn from_env() -> Result<Self> {
        let token = require_env("TELEGRAM_TOKEN")?;
        let chat_id = require_env("CHAT_ID")?;
        Ok(Self { token, chat_id })
    }
}

fn require_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ScannerError::Configuration {
            message: format!("{} environment variable must be set", name),
        }),
    }
}

/// Resolve the config file path from an env var, falling back to a default.
pub fn resolve_config_path(env_var: &str, default: &str) -> PathBuf {
    std::env::var(env_var)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}

/// Load configuration from a TOML file, using `fallback` when the file does
/// not exist. A file that exists but fails to parse is a hard error.
pub fn load_config_file(path: &Path, fallback: ScannerConfig) -> Result<ScannerConfig> {
    if !path.exists() {
        info!("No config file at {}, using defaults", path.display());
        return Ok(fallback);
    }

    let content = std::fs::read_to_string(path)?;
    let config: ScannerConfig =
        toml::from_str(&content).map_err(|e| ScannerError::Configuration {
            message: format!("Failed to parse {}: {}", path.display(), e),
        })?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        assert!(ScannerConfig::default().validate().is_ok());
    }

    #[test]
    fn kline_limit_must_cover_rsi_window() {
        let config = ScannerConfig {
            kline_limit: 10,
            rsi_period: 14,
            ..ScannerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load_config_file(
            Path::new("/nonexistent/scanner.toml"),
            ScannerConfig::default(),
        )
        .unwrap();
        assert_eq!(config.quote_asset, "USDT");
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "cooldown_secs = 300\n\n[rule]\nvolume_floor = 100000.0\nprice_stability_bound = 0.03"
        )
        .unwrap();

        let config = load_config_file(file.path(), ScannerConfig::default()).unwrap();
        assert_eq!(config.cooldown_secs, 300);
        assert_eq!(config.cycle_interval_secs, 600);
        assert_eq!(config.rule.volume_floor, Some(100_000.0));
        assert_eq!(config.rule.price_stability_bound, Some(0.03));
        // An explicit [rule] section activates only the thresholds it names.
        assert_eq!(config.rule.volume_multiplier, None);
    }

    #[test]
    fn absent_rule_section_selects_reference_rule() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "quote_asset = \"BUSD\"").unwrap();

        let config = load_config_file(file.path(), ScannerConfig::default()).unwrap();
        assert_eq!(config.quote_asset, "BUSD");
        assert_eq!(config.rule.volume_multiplier, Some(2.0));
        assert_eq!(config.rule.rsi_ceiling, Some(70.0));
    }

    #[test]
    fn malformed_toml_is_a_hard_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cooldown_secs = \"not a number\"").unwrap();
        assert!(load_config_file(file.path(), ScannerConfig::default()).is_err());
    }
}
