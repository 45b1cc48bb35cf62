//! # Surge Scanner
//!
//! Recurring scan-and-alert service for perpetual futures markets. Each cycle
//! it fetches recent klines and open-interest readings for every symbol in the
//! discovered universe, derives a small indicator set (volume delta, RSI,
//! open-interest growth, price stability), evaluates a configurable alert rule,
//! and pushes a Telegram notification when the rule fires. A per-symbol
//! cooldown gate suppresses duplicate alerts.
//!
//! This is a scan-and-alert loop, not a trading system: no orders, no
//! positions, no persistence beyond the in-memory cooldown map.

pub mod config;
pub mod dedup;
pub mod error;
pub mod evaluator;
pub mod indicators;
pub mod market_data;
pub mod notifier;
pub mod scanner;

pub use config::{RuleConfig, ScannerConfig, TelegramConfig};
pub use dedup::DedupGate;
pub use error::{Result, ScannerError};
pub use evaluator::{evaluate, AlertDecision, IndicatorSet};
pub use market_data::{BinanceGateway, MarketData, SeriesSnapshot};
pub use notifier::{Notifier, TelegramNotifier};
pub use scanner::Scanner;
