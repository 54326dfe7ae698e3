// =============================================================================
// Rolling window statistics — trailing mean and sample standard deviation
// =============================================================================
//
// Both functions return a vector aligned index-for-index with the input:
// `out[i]` describes the trailing `window` values ending at (and including)
// index `i`. Indices with fewer than `window` values of history hold `None`.
//
// The window is strictly trailing — never centered, never padded.
// =============================================================================

/// Trailing arithmetic mean of `values` over a `window`-sized window.
///
/// `out[i]` is `Some(mean(values[i+1-window ..= i]))` for `i >= window - 1`,
/// `None` before that. A zero window yields all `None`.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let mut out = vec![None; n];
    if window == 0 || n < window {
        return out;
    }

    // Running sum — add the entering value, drop the leaving one.
    let mut sum: f64 = values[..window].iter().sum();
    out[window - 1] = Some(sum / window as f64);
    for i in window..n {
        sum += values[i] - values[i - window];
        out[i] = Some(sum / window as f64);
    }
    out
}

/// Trailing sample standard deviation (N−1 denominator) of `values` over a
/// `window`-sized window. Aligned like [`rolling_mean`]; `None` until a full
/// window exists. Windows smaller than 2 yield all `None` (sample variance
/// needs at least two observations).
pub fn rolling_std(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let mut out = vec![None; n];
    if window < 2 || n < window {
        return out;
    }

    for i in (window - 1)..n {
        let slice = &values[i + 1 - window..=i];
        let mean = slice.iter().sum::<f64>() / window as f64;
        let var = slice.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
            / (window as f64 - 1.0);
        out[i] = Some(var.sqrt());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_warm_up_gap() {
        let values: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        let ma = rolling_mean(&values, 3);
        assert_eq!(ma.len(), 10);
        assert!(ma[0].is_none());
        assert!(ma[1].is_none());
        // mean of 1,2,3
        assert!((ma[2].unwrap() - 2.0).abs() < 1e-12);
        // mean of 8,9,10
        assert!((ma[9].unwrap() - 9.0).abs() < 1e-12);
    }

    #[test]
    fn mean_window_zero() {
        assert!(rolling_mean(&[1.0, 2.0], 0).iter().all(|v| v.is_none()));
    }

    #[test]
    fn mean_short_input() {
        let ma = rolling_mean(&[1.0, 2.0], 5);
        assert_eq!(ma.len(), 2);
        assert!(ma.iter().all(|v| v.is_none()));
    }

    #[test]
    fn mean_constant_series() {
        let values = vec![42.0; 50];
        let ma = rolling_mean(&values, 20);
        for v in ma.iter().skip(19) {
            assert!((v.unwrap() - 42.0).abs() < 1e-12);
        }
    }

    #[test]
    fn std_constant_is_zero() {
        let values = vec![100.0; 30];
        let sd = rolling_std(&values, 20);
        assert!(sd[18].is_none());
        for v in sd.iter().skip(19) {
            assert!(v.unwrap().abs() < 1e-12);
        }
    }

    #[test]
    fn std_known_value() {
        // Sample std of [1..=5] is sqrt(2.5).
        let values: Vec<f64> = (1..=5).map(|x| x as f64).collect();
        let sd = rolling_std(&values, 5);
        assert!((sd[4].unwrap() - 2.5_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn std_window_one_undefined() {
        assert!(rolling_std(&[1.0, 2.0, 3.0], 1).iter().all(|v| v.is_none()));
    }
}
