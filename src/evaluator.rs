//! Alert rule evaluation
//!
//! Pure decision logic: derive an [`IndicatorSet`] from one symbol's series
//! snapshot, then test it against the configured rule. The rule is a
//! conjunction of independently toggleable conditions; a threshold left as
//! `None` in [`RuleConfig`] removes that condition from the conjunction.

use crate::config::RuleConfig;
use crate::indicators::{relative_change, relative_strength};
use crate::market_data::SeriesSnapshot;

/// Derived indicator values for one symbol at one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSet {
    pub prev_volume: f64,
    pub curr_volume: f64,
    pub prev_price: f64,
    pub last_price: f64,
    /// `None` when fewer than `period + 1` closes were available. Absent RSI
    /// never satisfies the momentum condition.
    pub rsi: Option<f64>,
    pub prev_oi: f64,
    pub curr_oi: f64,
}

impl IndicatorSet {
    /// Derive indicators from a snapshot. Returns `None` when the snapshot
    /// lacks the two readings every comparison needs; an RSI-sized history
    /// is not required here, a short history only leaves `rsi` absent.
    pub fn from_snapshot(snapshot: &SeriesSnapshot, rsi_period: usize) -> Option<Self> {
        if snapshot.is_empty() {
            return None;
        }

        let n_closes = snapshot.closes.len();
        let n_volumes = snapshot.volumes.len();

        Some(Self {
            prev_volume: snapshot.volumes[n_volumes - 2],
            curr_volume: snapshot.volumes[n_volumes - 1],
            prev_price: snapshot.closes[n_closes - 2],
            last_price: snapshot.closes[n_closes - 1],
            rsi: relative_strength(&snapshot.closes, rsi_period),
            prev_oi: snapshot.prev_oi,
            curr_oi: snapshot.curr_oi,
        })
    }
}

/// Outcome of applying the rule to one indicator set. Carries the indicators
/// so the notifier can render them without re-deriving anything.
#[derive(Debug, Clone)]
pub struct AlertDecision {
    pub fired: bool,
    pub indicators: IndicatorSet,
}

/// Apply the alert rule. All configured conditions must hold.
pub fn evaluate(indicators: &IndicatorSet, rule: &RuleConfig) -> AlertDecision {
    let fired = volume_surge(indicators, rule)
        && momentum_not_overheated(indicators, rule)
        && open_interest_growth(indicators, rule)
        && price_stable(indicators, rule);

    AlertDecision {
        fired,
        indicators: indicators.clone(),
    }
}

/// Condition 1: current volume beats the previous reading by the configured
/// multiplier and clears the absolute floor. The floor governs even when the
/// multiplier is satisfied.
fn volume_surge(ind: &IndicatorSet, rule: &RuleConfig) -> bool {
    if let Some(multiplier) = rule.volume_multiplier {
        if ind.curr_volume <= ind.prev_volume * multiplier {
            return false;
        }
    }
    if let Some(floor) = rule.volume_floor {
        if ind.curr_volume < floor {
            return false;
        }
    }
    true
}

/// Condition 2: RSI present and strictly below the ceiling.
fn momentum_not_overheated(ind: &IndicatorSet, rule: &RuleConfig) -> bool {
    match rule.rsi_ceiling {
        Some(ceiling) => matches!(ind.rsi, Some(rsi) if rsi < ceiling),
        None => true,
    }
}

/// Condition 3: previous OI strictly positive and current OI above the
/// configured multiple. Zero previous OI never fires (division guard).
fn open_interest_growth(ind: &IndicatorSet, rule: &RuleConfig) -> bool {
    match rule.oi_multiplier {
        Some(multiplier) => ind.prev_oi > 0.0 && ind.curr_oi > ind.prev_oi * multiplier,
        None => true,
    }
}

/// Condition 4 (price-stability variant): last price within the configured
/// band of the previous close, and volume not collapsing.
fn price_stable(ind: &IndicatorSet, rule: &RuleConfig) -> bool {
    if let Some(bound) = rule.price_stability_bound {
        match relative_change(ind.last_price, ind.prev_price) {
            Some(change) if change.abs() < bound => {}
            _ => return false,
        }
    }
    if let Some(fraction) = rule.volume_floor_fraction {
        if ind.curr_volume < ind.prev_volume * fraction {
            return false;
        }
    }
    true
}
