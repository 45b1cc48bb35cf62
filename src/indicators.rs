//! Pure numeric indicator functions
//!
//! Everything in this module is deterministic and side-effect free. Degenerate
//! inputs (short series, zero denominators) yield `None` rather than NaN or a
//! panic, so downstream rule evaluation never sees garbage values.

/// Relative strength index over the most recent `period` price deltas.
///
/// Returns `None` when fewer than `period + 1` closes are supplied. When the
/// average loss over the window is exactly zero the oscillator saturates at
/// `100.0`, avoiding a division by zero.
pub fn relative_strength(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let window = &closes[closes.len() - (period + 1)..];
    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;
    for pair in window.windows(2) {
        let delta = pair[1] - pair[0];
        if delta > 0.0 {
            gain_sum += delta;
        } else {
            loss_sum += -delta;
        }
    }

    let avg_gain = gain_sum / period as f64;
    let avg_loss = loss_sum / period as f64;

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    Some(100.0 - 100.0 / (1.0 + avg_gain / avg_loss))
}

/// Ratio of `curr` to `prev`, guarding against non-positive denominators.
pub fn ratio(curr: f64, prev: f64) -> Option<f64> {
    if prev <= 0.0 {
        return None;
    }
    Some(curr / prev)
}

/// Signed fractional change from `prev` to `curr` (0.03 == +3%).
pub fn relative_change(curr: f64, prev: f64) -> Option<f64> {
    ratio(curr, prev).map(|r| r - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_requires_period_plus_one_closes() {
        let closes: Vec<f64> = (1..=14).map(|i| i as f64).collect();
        assert_eq!(relative_strength(&closes, 14), None);
        assert_eq!(relative_strength(&[], 14), None);
        assert_eq!(relative_strength(&[100.0], 14), None);
    }

    #[test]
    fn rsi_saturates_at_100_for_pure_gains() {
        // Monotonically rising closes: average loss is exactly zero.
        let closes: Vec<f64> = (1..=15).map(|i| i as f64).collect();
        assert_eq!(relative_strength(&closes, 14), Some(100.0));
    }

    #[test]
    fn rsi_is_zero_for_pure_losses() {
        let closes: Vec<f64> = (1..=15).rev().map(|i| i as f64).collect();
        assert_eq!(relative_strength(&closes, 14), Some(0.0));
    }

    #[test]
    fn rsi_flat_series_counts_as_zero_loss() {
        let closes = vec![50.0; 15];
        assert_eq!(relative_strength(&closes, 14), Some(100.0));
    }

    #[test]
    fn rsi_balanced_gains_and_losses() {
        // Alternating +1/-1 deltas: avg gain == avg loss, RSI == 50.
        let mut closes = vec![100.0];
        for i in 0..14 {
            let last = *closes.last().unwrap();
            closes.push(if i % 2 == 0 { last + 1.0 } else { last - 1.0 });
        }
        let rsi = relative_strength(&closes, 14).unwrap();
        assert!((rsi - 50.0).abs() < 1e-9);
    }

    #[test]
    fn rsi_uses_only_most_recent_window() {
        // Old losses outside the window must not affect the result.
        let mut closes = vec![100.0, 50.0, 25.0];
        let mut last = 25.0;
        for _ in 0..15 {
            last += 1.0;
            closes.push(last);
        }
        assert_eq!(relative_strength(&closes, 14), Some(100.0));
    }

    #[test]
    fn ratio_guards_zero_denominator() {
        assert_eq!(ratio(10.0, 0.0), None);
        assert_eq!(ratio(10.0, -5.0), None);
        assert_eq!(ratio(10.0, 5.0), Some(2.0));
    }

    #[test]
    fn relative_change_is_signed() {
        assert!((relative_change(103.0, 100.0).unwrap() - 0.03).abs() < 1e-12);
        assert!((relative_change(97.0, 100.0).unwrap() + 0.03).abs() < 1e-12);
        assert_eq!(relative_change(1.0, 0.0), None);
    }
}
