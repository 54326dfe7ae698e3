// =============================================================================
// Relative Strength Index (RSI) — rolling-mean variant
// =============================================================================
//
// Step 1 — Compute bar-to-bar close deltas.
// Step 2 — Split each delta into gain (delta if positive else 0) and
//          loss (−delta if negative else 0).
// Step 3 — Take the trailing `period` rolling mean of gains and of losses
//          independently (plain arithmetic means, no Wilder smoothing).
// Step 4 — RS  = mean_gain / mean_loss
//          RSI = 100 − 100 / (1 + RS)
//
// When mean_loss is zero the division is undefined; the resolved convention
// here is RSI = 100 (all gains, no losses). This includes the all-flat case.
//
// Thresholds: RSI > 70 => overbought, RSI < 30 => oversold.
// =============================================================================

use super::moving_average::rolling_mean;

/// Compute the RSI series for `closes`, aligned index-for-index with the
/// input. The first `period` entries are `None` — an RSI value at index `i`
/// needs `period` deltas, i.e. bars `i-period ..= i`.
///
/// # Edge cases
/// - `period == 0` or input shorter than `period + 1` => all `None`.
/// - Zero mean loss over the window => `Some(100.0)`.
pub fn rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = closes.len();
    let mut out = vec![None; n];
    if period == 0 || n < period + 1 {
        return out;
    }

    let mut gains = Vec::with_capacity(n - 1);
    let mut losses = Vec::with_capacity(n - 1);
    for w in closes.windows(2) {
        let delta = w[1] - w[0];
        gains.push(if delta > 0.0 { delta } else { 0.0 });
        losses.push(if delta < 0.0 { -delta } else { 0.0 });
    }

    let mean_gain = rolling_mean(&gains, period);
    let mean_loss = rolling_mean(&losses, period);

    // Delta index j corresponds to bar index j + 1.
    for j in (period - 1)..gains.len() {
        let (g, l) = match (mean_gain[j], mean_loss[j]) {
            (Some(g), Some(l)) => (g, l),
            _ => continue,
        };
        let value = if l == 0.0 {
            100.0
        } else {
            let rs = g / l;
            100.0 - 100.0 / (1.0 + rs)
        };
        out[j + 1] = Some(value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input() {
        assert!(rsi(&[], 14).is_empty());
    }

    #[test]
    fn period_zero() {
        assert!(rsi(&[1.0, 2.0, 3.0], 0).iter().all(|v| v.is_none()));
    }

    #[test]
    fn insufficient_history() {
        // 14 closes give 13 deltas — one short of a full window.
        let closes: Vec<f64> = (1..=14).map(|x| x as f64).collect();
        assert!(rsi(&closes, 14).iter().all(|v| v.is_none()));
    }

    #[test]
    fn warm_up_gap_is_exactly_period() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        let series = rsi(&closes, 14);
        assert_eq!(series.len(), 30);
        for v in &series[..14] {
            assert!(v.is_none());
        }
        for v in &series[14..] {
            assert!(v.is_some());
        }
    }

    #[test]
    fn all_gains_pins_to_100() {
        let closes: Vec<f64> = (1..=40).map(|x| x as f64).collect();
        for v in rsi(&closes, 14).iter().flatten() {
            assert!((v - 100.0).abs() < 1e-10, "expected 100.0, got {v}");
        }
    }

    #[test]
    fn all_losses_pins_to_0() {
        let closes: Vec<f64> = (1..=40).rev().map(|x| x as f64).collect();
        for v in rsi(&closes, 14).iter().flatten() {
            assert!(v.abs() < 1e-10, "expected 0.0, got {v}");
        }
    }

    #[test]
    fn flat_series_resolves_to_100() {
        // Zero losses over the window triggers the documented resolution,
        // even when gains are also zero.
        let closes = vec![100.0; 30];
        for v in rsi(&closes, 14).iter().flatten() {
            assert!((v - 100.0).abs() < 1e-10);
        }
    }

    #[test]
    fn bounded_zero_to_100() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84,
            46.08, 45.89, 46.03, 44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        for v in rsi(&closes, 14).iter().flatten() {
            assert!((0.0..=100.0).contains(v), "RSI {v} out of range");
        }
    }

    #[test]
    fn alternating_series_mid_range() {
        // +1/−1 alternation around 100: equal gain and loss mass, RSI near 50.
        let closes: Vec<f64> = (0..30)
            .map(|i| if i % 2 == 0 { 100.0 } else { 101.0 })
            .collect();
        let series = rsi(&closes, 14);
        for v in series.iter().flatten() {
            assert!((v - 50.0).abs() < 5.0, "expected near 50, got {v}");
        }
    }
}
