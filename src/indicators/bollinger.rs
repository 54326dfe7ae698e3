// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Middle band = trailing 20-bar moving average of close (identical to MA20).
// Upper/lower = middle ± k × trailing 20-bar sample standard deviation
// (N−1 denominator). All three bands share the moving average's warm-up gap.
// =============================================================================

use super::moving_average::{rolling_mean, rolling_std};

/// Full-length band series aligned with the input closes.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// Compute Bollinger Bands over `closes` with the given `window` and band
/// width `num_std`. Entries before a full window are `None`.
pub fn bollinger(closes: &[f64], window: usize, num_std: f64) -> BollingerBands {
    let mean = rolling_mean(closes, window);
    let std = rolling_std(closes, window);

    let n = closes.len();
    let mut upper = vec![None; n];
    let mut lower = vec![None; n];
    for i in 0..n {
        if let (Some(m), Some(s)) = (mean[i], std[i]) {
            upper[i] = Some(m + num_std * s);
            lower[i] = Some(m - num_std * s);
        }
    }

    BollingerBands {
        upper,
        middle: mean,
        lower,
    }
}
