// =============================================================================
// Shared types used across the StockDeck dashboard backend
// =============================================================================

use serde::{Deserialize, Serialize};

/// One sampled interval's open/high/low/close price and traded volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// UNIX timestamp (seconds) of the bar's open. Strictly increasing within
    /// a series, one bar per sampling interval.
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Ordered sequence of bars for one symbol over one range/interval.
/// Immutable once fetched — the indicator engine only ever derives new
/// columns from it, never mutates the OHLCV fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    pub bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Closing prices in bar order.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}

/// Historical range selectable from the dashboard sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Range {
    #[serde(rename = "1d")]
    Day1,
    #[serde(rename = "5d")]
    Day5,
    #[serde(rename = "1mo")]
    Month1,
    #[serde(rename = "3mo")]
    Month3,
    #[serde(rename = "6mo")]
    Month6,
    #[serde(rename = "1y")]
    Year1,
    #[serde(rename = "2y")]
    Year2,
    #[serde(rename = "5y")]
    Year5,
}

impl Range {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day1 => "1d",
            Self::Day5 => "5d",
            Self::Month1 => "1mo",
            Self::Month3 => "3mo",
            Self::Month6 => "6mo",
            Self::Year1 => "1y",
            Self::Year2 => "2y",
            Self::Year5 => "5y",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "1d" => Some(Self::Day1),
            "5d" => Some(Self::Day5),
            "1mo" => Some(Self::Month1),
            "3mo" => Some(Self::Month3),
            "6mo" => Some(Self::Month6),
            "1y" => Some(Self::Year1),
            "2y" => Some(Self::Year2),
            "5y" => Some(Self::Year5),
            _ => None,
        }
    }

    /// Intraday intervals are only meaningful for short ranges.
    pub fn supports_intraday(&self) -> bool {
        matches!(self, Self::Day1 | Self::Day5)
    }
}

impl Default for Range {
    fn default() -> Self {
        Self::Month6
    }
}

impl std::fmt::Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Bar sampling interval. Intraday values are accepted only when the range
/// supports them; callers normalise via [`Interval::clamp_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    Min1,
    #[serde(rename = "5m")]
    Min5,
    #[serde(rename = "15m")]
    Min15,
    #[serde(rename = "30m")]
    Min30,
    #[serde(rename = "60m")]
    Min60,
    #[serde(rename = "1d")]
    Day1,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Min1 => "1m",
            Self::Min5 => "5m",
            Self::Min15 => "15m",
            Self::Min30 => "30m",
            Self::Min60 => "60m",
            Self::Day1 => "1d",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "1m" => Some(Self::Min1),
            "5m" => Some(Self::Min5),
            "15m" => Some(Self::Min15),
            "30m" => Some(Self::Min30),
            "60m" => Some(Self::Min60),
            "1d" => Some(Self::Day1),
            _ => None,
        }
    }

    pub fn is_intraday(&self) -> bool {
        !matches!(self, Self::Day1)
    }

    /// Force the interval to daily when the range does not support intraday
    /// sampling. The dashboard only offers the intraday picker for 1d/5d.
    pub fn clamp_to(self, range: Range) -> Self {
        if self.is_intraday() && !range.supports_intraday() {
            Self::Day1
        } else {
            self
        }
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::Day1
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Chart rendering style selectable from the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartStyle {
    Candlestick,
    Line,
    Area,
}

impl ChartStyle {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "candlestick" => Some(Self::Candlestick),
            "line" => Some(Self::Line),
            "area" => Some(Self::Area),
            _ => None,
        }
    }
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self::Candlestick
    }
}

/// Descriptive metadata snapshot for a symbol, as reported by the provider.
/// Every field is optional — the upstream info payload is best-effort.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockMeta {
    pub symbol: String,
    pub name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub current_price: Option<f64>,
    pub change_percent: Option<f64>,
    pub day_high: Option<f64>,
    pub day_low: Option<f64>,
    pub volume: Option<f64>,
    pub avg_volume: Option<f64>,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub week52_high: Option<f64>,
    pub week52_low: Option<f64>,
    pub website: Option<String>,
    pub description: Option<String>,
}

/// One news article attached to a symbol, newest first in provider output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub publisher: String,
    pub link: String,
    /// UNIX timestamp (seconds) of publication.
    pub published: i64,
    pub summary: String,
}

/// Snapshot row for the market-overview trending list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingStock {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub change_percent: f64,
    pub volume: f64,
    pub market_cap: f64,
}
