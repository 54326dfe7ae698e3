// =============================================================================
// Technical Indicator Engine
// =============================================================================
//
// Pure, side-effect-free derivations over an ordered price series. The engine
// never mutates OHLCV data; it produces one derived row per input bar,
// aligned index-for-index. Fields are `Option<f64>` because windowed
// indicators are undefined until enough trailing history exists, while the
// EMA-based MACD columns are defined from the first bar — that asymmetry is
// part of the contract.
//
// Given the same input series the output is bit-for-bit reproducible: no
// randomness, no clock reads, no shared state.

pub mod bollinger;
pub mod macd;
pub mod moving_average;
pub mod rsi;

use serde::Serialize;

use crate::types::PriceSeries;

/// Rolling-mean window for the RSI oscillator.
pub const RSI_PERIOD: usize = 14;
/// Bollinger Band window (also the short moving-average window).
pub const BOLLINGER_WINDOW: usize = 20;
/// Bollinger Band width in standard deviations.
pub const BOLLINGER_NUM_STD: f64 = 2.0;

/// Derived values for one bar. `None` marks insufficient trailing history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRow {
    pub ma20: Option<f64>,
    pub ma50: Option<f64>,
    pub ma200: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub signal_line: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_lower: Option<f64>,
}

/// Compute the full indicator table for `series`.
///
/// Returns `None` only for an empty series; a short-but-present series
/// produces full-length rows with the windowed columns absent where history
/// is insufficient.
pub fn compute(series: &PriceSeries) -> Option<Vec<IndicatorRow>> {
    if series.is_empty() {
        return None;
    }

    let closes = series.closes();

    let ma20 = moving_average::rolling_mean(&closes, 20);
    let ma50 = moving_average::rolling_mean(&closes, 50);
    let ma200 = moving_average::rolling_mean(&closes, 200);
    let rsi = rsi::rsi(&closes, RSI_PERIOD);
    let (macd_line, signal_line) = macd::macd(&closes);
    let bands = bollinger::bollinger(&closes, BOLLINGER_WINDOW, BOLLINGER_NUM_STD);

    let rows = (0..closes.len())
        .map(|i| IndicatorRow {
            ma20: ma20[i],
            ma50: ma50[i],
            ma200: ma200[i],
            rsi: rsi[i],
            macd: Some(macd_line[i]),
            signal_line: Some(signal_line[i]),
            bb_upper: bands.upper[i],
            bb_middle: bands.middle[i],
            bb_lower: bands.lower[i],
        })
        .collect();

    Some(rows)
}
