//! Scan loop orchestration
//!
//! Drives the fixed-interval cycle: discover the symbol universe once at
//! startup, then per cycle walk every symbol through gateway -> evaluator ->
//! dedup gate -> notifier. All per-symbol failures are absorbed at the single
//! per-symbol boundary here; no symbol can abort a cycle. Cycles never
//! overlap: one finishes fully before the inter-cycle sleep begins.

use crate::config::ScannerConfig;
use crate::dedup::DedupGate;
use crate::error::{Result, ScannerError};
use crate::evaluator::{evaluate, IndicatorSet};
use crate::market_data::MarketData;
use crate::notifier::Notifier;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Per-cycle counters, logged once per cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleStats {
    /// Symbols with usable data this cycle.
    pub scanned: u64,
    /// Symbols skipped on a neutral-empty snapshot.
    pub skipped: u64,
    /// Notifications actually delivered.
    pub alerts: u64,
    /// Rule fired but the cooldown gate suppressed the alert.
    pub suppressed: u64,
    /// Per-symbol failures absorbed at the cycle boundary.
    pub errors: u64,
}

enum SymbolOutcome {
    /// Neutral-empty snapshot, nothing to evaluate.
    Skipped,
    /// Evaluated, rule did not fire.
    Quiet,
    /// Rule fired inside the cooldown window.
    Suppressed,
    /// Notification delivered and recorded.
    Alerted,
}

pub struct Scanner<M, N> {
    config: ScannerConfig,
    gateway: M,
    notifier: N,
    gate: DedupGate,
    symbols: Vec<String>,
}

impl<M: MarketData, N: Notifier> Scanner<M, N> {
    pub fn new(config: ScannerConfig, gateway: M, notifier: N) -> Self {
        let gate = DedupGate::new(config.cooldown());
        Self {
            config,
            gateway,
            notifier,
            gate,
            symbols: Vec::new(),
        }
    }

    /// Run forever: discover the universe, then cycle at the configured
    /// interval. Only startup discovery can return an error; after that the
    /// loop never terminates on its own.
    pub async fn run(&mut self) -> Result<()> {
        self.discover_universe().await?;

        loop {
            let started = Instant::now();
            let stats = self.run_cycle(started).await;
            info!(
                "Cycle complete in {:.1}s: {} scanned, {} skipped, {} alerts, {} suppressed, {} errors",
                started.elapsed().as_secs_f64(),
                stats.scanned,
                stats.skipped,
                stats.alerts,
                stats.suppressed,
                stats.errors
            );

            tokio::time::sleep(self.config.cycle_interval()).await;
        }
    }

    /// Fetch the tradable universe. An empty universe is a startup failure:
    /// aborting with a diagnosable error beats silently scanning nothing.
    async fn discover_universe(&mut self) -> Result<()> {
        let symbols = self.gateway.list_symbols().await?;
        if symbols.is_empty() {
            return Err(ScannerError::Configuration {
                message: format!(
                    "Symbol universe for quote asset {} is empty; refusing to scan nothing",
                    self.config.quote_asset
                ),
            });
        }

        info!("Discovered {} tradable symbols", symbols.len());
        self.symbols = symbols;
        Ok(())
    }

    /// One full pass over the cached universe. `now` is the cycle's clock
    /// reading for cooldown decisions.
    async fn run_cycle(&mut self, now: Instant) -> CycleStats {
        let mut stats = CycleStats::default();
        let symbols = std::mem::take(&mut self.symbols);

        for symbol in &symbols {
            match self.scan_symbol(symbol, now).await {
                Ok(SymbolOutcome::Skipped) => stats.skipped += 1,
                Ok(SymbolOutcome::Quiet) => stats.scanned += 1,
                Ok(SymbolOutcome::Suppressed) => {
                    stats.scanned += 1;
                    stats.suppressed += 1;
                }
                Ok(SymbolOutcome::Alerted) => {
                    stats.scanned += 1;
                    stats.alerts += 1;
                }
                // The per-symbol boundary: log with the symbol identity and
                // keep going, never abort the cycle.
                Err(e) => {
                    stats.errors += 1;
                    warn!("{}: symbol processing failed: {}", symbol, e);
                }
            }
        }

        self.symbols = symbols;
        stats
    }

    async fn scan_symbol(&mut self, symbol: &str, now: Instant) -> Result<SymbolOutcome> {
        let snapshot = self.gateway.fetch_series(symbol).await;
        let Some(indicators) = IndicatorSet::from_snapshot(&snapshot, self.config.rsi_period)
        else {
            debug!("{}: no usable data this cycle", symbol);
            return Ok(SymbolOutcome::Skipped);
        };

        let decision = evaluate(&indicators, &self.config.rule);
        if !decision.fired {
            return Ok(SymbolOutcome::Quiet);
        }

        if !self.gate.should_alert(symbol, now) {
            debug!("{}: alert suppressed by cooldown", symbol);
            return Ok(SymbolOutcome::Suppressed);
        }

        // Record only after the send is confirmed, so a failed delivery is
        // retried on the next eligible cycle instead of being swallowed.
        self.notifier
            .send(&render_alert(symbol, &decision.indicators))
            .await?;
        self.gate.record_alert(symbol, now);

        info!("{}: alert sent", symbol);
        Ok(SymbolOutcome::Alerted)
    }
}

/// Render the notification text from the indicator set. Absent values render
/// as "n/a"; nothing here can produce NaN.
fn render_alert(symbol: &str, ind: &IndicatorSet) -> String {
    let volume_ratio = if ind.prev_volume > 0.0 {
        format!("{:.2}x", ind.curr_volume / ind.prev_volume)
    } else {
        "n/a".to_string()
    };
    let rsi = match ind.rsi {
        Some(rsi) => format!("{:.1}", rsi),
        None => "n/a".to_string(),
    };
    let oi_change = if ind.prev_oi > 0.0 {
        format!("{:+.1}%", (ind.curr_oi / ind.prev_oi - 1.0) * 100.0)
    } else {
        "n/a".to_string()
    };

    format!(
        "🚨 {symbol}\n\
         Volume: {prev_vol:.0} → {curr_vol:.0} ({volume_ratio})\n\
         Price: {price}\n\
         RSI: {rsi}\n\
         OI: {prev_oi:.0} → {curr_oi:.0} ({oi_change})",
        symbol = symbol,
        prev_vol = ind.prev_volume,
        curr_vol = ind.curr_volume,
        volume_ratio = volume_ratio,
        price = ind.last_price,
        rsi = rsi,
        prev_oi = ind.prev_oi,
        curr_oi = ind.curr_oi,
        oi_change = oi_change,
    )
}
