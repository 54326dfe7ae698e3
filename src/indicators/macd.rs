// =============================================================================
// MACD — Moving Average Convergence Divergence
// =============================================================================
//
// Built on a first-value-seeded exponential moving average:
//
//   alpha = 2 / (span + 1)
//   EMA_0 = value_0
//   EMA_t = value_t * alpha + EMA_{t-1} * (1 - alpha)
//
// The very first output equals the very first input (no simple-average seed),
// so the EMA — and therefore MACD and its signal line — is defined from the
// first bar onward. This is deliberately different from the windowed rolling
// means, which carry a warm-up gap.
//
//   MACD        = EMA(span=12) − EMA(span=26) over close
//   Signal line = EMA(span=9) of the MACD series
// =============================================================================

/// Recursive EMA over `values`, seeded with the first value. Output is
/// aligned with and as long as the input; empty in, empty out.
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    if values.is_empty() || span == 0 {
        return Vec::new();
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev = values[0];
    out.push(prev);
    for &v in &values[1..] {
        prev = v * alpha + prev * (1.0 - alpha);
        out.push(prev);
    }
    out
}

/// MACD line and signal line over `closes`, both full-length and defined
/// from index 0.
pub fn macd(closes: &[f64]) -> (Vec<f64>, Vec<f64>) {
    if closes.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let fast = ema(closes, 12);
    let slow = ema(closes, 26);
    let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = ema(&line, 9);
    (line, signal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_empty() {
        assert!(ema(&[], 12).is_empty());
    }

    #[test]
    fn ema_seeded_by_first_value() {
        let values = vec![5.0, 6.0, 7.0];
        let out = ema(&values, 12);
        assert_eq!(out.len(), 3);
        assert!((out[0] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn ema_known_recursion() {
        // span=3 => alpha=0.5
        let values = vec![2.0, 4.0, 8.0];
        let out = ema(&values, 3);
        assert!((out[0] - 2.0).abs() < 1e-12);
        assert!((out[1] - 3.0).abs() < 1e-12); // 4*0.5 + 2*0.5
        assert!((out[2] - 5.5).abs() < 1e-12); // 8*0.5 + 3*0.5
    }

    #[test]
    fn ema_constant_series() {
        let out = ema(&vec![10.0; 100], 26);
        for v in &out {
            assert!((v - 10.0).abs() < 1e-12);
        }
    }

    #[test]
    fn macd_defined_from_index_zero() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        let (line, signal) = macd(&closes);
        assert_eq!(line.len(), 30);
        assert_eq!(signal.len(), 30);
        // EMA12 and EMA26 share the same seed, so the first MACD is zero.
        assert!(line[0].abs() < 1e-12);
        assert!(signal[0].abs() < 1e-12);
    }

    #[test]
    fn macd_constant_series_is_zero() {
        let (line, signal) = macd(&vec![50.0; 60]);
        for (m, s) in line.iter().zip(&signal) {
            assert!(m.abs() < 1e-12);
            assert!(s.abs() < 1e-12);
        }
    }

    #[test]
    fn macd_deterministic() {
        let closes: Vec<f64> = (0..100).map(|i| 100.0 + (i as f64 * 0.7).sin()).collect();
        let first = macd(&closes);
        let second = macd(&closes);
        assert_eq!(first.0, second.0);
        assert_eq!(first.1, second.1);
    }
}
