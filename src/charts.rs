// =============================================================================
// Presentation Layer — chart specifications and summary widgets
// =============================================================================
//
// Turns provider output and indicator output into plotly-style JSON chart
// specifications and metric widgets. This layer consumes data and never
// produces it; rendering is delegated to the client's plotting library.
// Absent inputs yield a neutral "no data" payload, never an error.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::indicators::IndicatorRow;
use crate::types::{ChartStyle, PriceSeries, StockMeta};

const TEMPLATE: &str = "plotly_dark";
const PANEL_BG: &str = "rgba(19,47,76,0.8)";

/// Neutral payload for views with nothing to show.
pub fn no_data() -> Value {
    json!({ "status": "no_data", "traces": [], "layout": Value::Null })
}

fn layout(title: &str) -> Value {
    json!({
        "title": title,
        "template": TEMPLATE,
        "plot_bgcolor": PANEL_BG,
        "paper_bgcolor": PANEL_BG,
        "xaxis_rangeslider_visible": false,
    })
}

fn timestamps(series: &PriceSeries) -> Vec<i64> {
    series.bars.iter().map(|b| b.timestamp).collect()
}

/// Pull one optional indicator column out of the rows; absent values
/// serialize as nulls so the plot shows a gap instead of a zero.
fn column(rows: &[IndicatorRow], pick: fn(&IndicatorRow) -> Option<f64>) -> Vec<Option<f64>> {
    rows.iter().map(pick).collect()
}

// =============================================================================
// Price chart
// =============================================================================

/// Main price chart in the user-selected style.
pub fn price_chart(series: &PriceSeries, style: ChartStyle) -> Value {
    let x = timestamps(series);
    let closes = series.closes();

    let trace = match style {
        ChartStyle::Candlestick => json!({
            "type": "candlestick",
            "x": x,
            "open":  series.bars.iter().map(|b| b.open).collect::<Vec<_>>(),
            "high":  series.bars.iter().map(|b| b.high).collect::<Vec<_>>(),
            "low":   series.bars.iter().map(|b| b.low).collect::<Vec<_>>(),
            "close": closes,
        }),
        ChartStyle::Line => json!({
            "type": "scatter",
            "mode": "lines",
            "x": x,
            "y": closes,
            "name": "Close",
        }),
        ChartStyle::Area => json!({
            "type": "scatter",
            "mode": "lines",
            "fill": "tozeroy",
            "x": x,
            "y": closes,
            "name": "Close",
        }),
    };

    json!({
        "traces": [trace],
        "layout": layout(&format!("{} Stock Price", series.symbol)),
    })
}

// =============================================================================
// Indicator charts
// =============================================================================

/// Close price overlaid with the MA20/MA50/MA200 trend lines.
pub fn moving_average_chart(series: &PriceSeries, rows: &[IndicatorRow]) -> Value {
    let x = timestamps(series);
    json!({
        "traces": [
            { "type": "scatter", "mode": "lines", "name": "Close", "x": x, "y": series.closes() },
            { "type": "scatter", "mode": "lines", "name": "MA20",  "x": x, "y": column(rows, |r| r.ma20) },
            { "type": "scatter", "mode": "lines", "name": "MA50",  "x": x, "y": column(rows, |r| r.ma50) },
            { "type": "scatter", "mode": "lines", "name": "MA200", "x": x, "y": column(rows, |r| r.ma200) },
        ],
        "layout": layout("Price and Moving Averages"),
    })
}

/// RSI oscillator with the 70/30 overbought/oversold guide lines.
pub fn rsi_chart(series: &PriceSeries, rows: &[IndicatorRow]) -> Value {
    let mut spec = json!({
        "traces": [
            { "type": "scatter", "mode": "lines", "name": "RSI",
              "x": timestamps(series), "y": column(rows, |r| r.rsi) },
        ],
        "layout": layout("Relative Strength Index (RSI)"),
    });
    spec["layout"]["shapes"] = json!([
        { "type": "line", "y0": 70, "y1": 70, "line": { "dash": "dash", "color": "red" } },
        { "type": "line", "y0": 30, "y1": 30, "line": { "dash": "dash", "color": "green" } },
    ]);
    spec
}

/// MACD line together with its signal line.
pub fn macd_chart(series: &PriceSeries, rows: &[IndicatorRow]) -> Value {
    let x = timestamps(series);
    json!({
        "traces": [
            { "type": "scatter", "mode": "lines", "name": "MACD",
              "x": x, "y": column(rows, |r| r.macd) },
            { "type": "scatter", "mode": "lines", "name": "Signal_Line",
              "x": x, "y": column(rows, |r| r.signal_line) },
        ],
        "layout": layout("MACD and Signal Line"),
    })
}

/// Close price inside the Bollinger envelope.
pub fn bollinger_chart(series: &PriceSeries, rows: &[IndicatorRow]) -> Value {
    let x = timestamps(series);
    json!({
        "traces": [
            { "type": "scatter", "mode": "lines", "name": "Close",     "x": x, "y": series.closes() },
            { "type": "scatter", "mode": "lines", "name": "BB_upper",  "x": x, "y": column(rows, |r| r.bb_upper) },
            { "type": "scatter", "mode": "lines", "name": "BB_middle", "x": x, "y": column(rows, |r| r.bb_middle) },
            { "type": "scatter", "mode": "lines", "name": "BB_lower",  "x": x, "y": column(rows, |r| r.bb_lower) },
        ],
        "layout": layout("Bollinger Bands"),
    })
}

// =============================================================================
// Widgets
// =============================================================================

/// Metric cards for the header row: current price with change, day range,
/// volume.
pub fn summary_widgets(meta: &StockMeta) -> Value {
    json!({
        "metrics": [
            {
                "label": "Current Price",
                "value": meta.current_price,
                "delta_percent": meta.change_percent,
            },
            { "label": "Day High", "value": meta.day_high },
            { "label": "Day Low",  "value": meta.day_low },
            { "label": "Volume",   "value": meta.volume },
        ],
    })
}

/// Footer block with the "last updated" stamp.
pub fn footer(now: DateTime<Utc>) -> Value {
    json!({
        "market_data": "Powered by Yahoo Finance",
        "last_updated": now.format("%Y-%m-%d %H:%M").to_string(),
        "support": "support@stockanalysis.com",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators;
    use crate::types::PriceBar;

    fn sample_series(n: usize) -> PriceSeries {
        PriceSeries {
            symbol: "AAPL".into(),
            bars: (0..n)
                .map(|i| PriceBar {
                    timestamp: 86_400 * i as i64,
                    open: 100.0 + i as f64,
                    high: 101.0 + i as f64,
                    low: 99.0 + i as f64,
                    close: 100.5 + i as f64,
                    volume: 1_000.0,
                })
                .collect(),
        }
    }

    #[test]
    fn candlestick_trace_carries_ohlc() {
        let series = sample_series(5);
        let spec = price_chart(&series, ChartStyle::Candlestick);
        let trace = &spec["traces"][0];
        assert_eq!(trace["type"], "candlestick");
        assert_eq!(trace["open"].as_array().unwrap().len(), 5);
        assert_eq!(trace["close"].as_array().unwrap().len(), 5);
        assert_eq!(spec["layout"]["template"], TEMPLATE);
    }

    #[test]
    fn line_and_area_styles() {
        let series = sample_series(5);
        let line = price_chart(&series, ChartStyle::Line);
        assert_eq!(line["traces"][0]["type"], "scatter");
        assert!(line["traces"][0]["fill"].is_null());

        let area = price_chart(&series, ChartStyle::Area);
        assert_eq!(area["traces"][0]["fill"], "tozeroy");
    }

    #[test]
    fn indicator_charts_gap_on_warm_up() {
        let series = sample_series(30);
        let rows = indicators::compute(&series).unwrap();
        let spec = moving_average_chart(&series, &rows);

        // MA20 trace: first 19 values serialize as null.
        let ma20 = spec["traces"][1]["y"].as_array().unwrap();
        assert_eq!(ma20.len(), 30);
        assert!(ma20[18].is_null());
        assert!(ma20[19].is_number());

        let rsi_spec = rsi_chart(&series, &rows);
        let rsi_y = rsi_spec["traces"][0]["y"].as_array().unwrap();
        assert!(rsi_y[13].is_null());
        assert!(rsi_y[14].is_number());

        // MACD has no warm-up gap.
        let macd_spec = macd_chart(&series, &rows);
        assert!(macd_spec["traces"][0]["y"][0].is_number());
        assert!(macd_spec["traces"][1]["y"][0].is_number());
    }

    #[test]
    fn bollinger_chart_has_four_traces() {
        let series = sample_series(40);
        let rows = indicators::compute(&series).unwrap();
        let spec = bollinger_chart(&series, &rows);
        assert_eq!(spec["traces"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn widgets_pass_through_meta() {
        let meta = StockMeta {
            symbol: "AAPL".into(),
            current_price: Some(190.5),
            change_percent: Some(1.23),
            day_high: Some(192.0),
            ..Default::default()
        };
        let w = summary_widgets(&meta);
        assert_eq!(w["metrics"][0]["value"], 190.5);
        assert_eq!(w["metrics"][1]["value"], 192.0);
        assert!(w["metrics"][2]["value"].is_null());
    }

    #[test]
    fn no_data_is_neutral() {
        let v = no_data();
        assert_eq!(v["status"], "no_data");
        assert!(v["traces"].as_array().unwrap().is_empty());
    }
}
