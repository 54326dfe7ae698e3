// =============================================================================
// Yahoo Finance REST client
// =============================================================================
//
// Three upstream endpoints:
//   /v8/finance/chart/{symbol}         — OHLCV bars for a range/interval
//   /v10/finance/quoteSummary/{symbol} — descriptive metadata snapshot
//   /v1/finance/search                 — recent news items
//
// All requests share one reqwest client with a 10 s timeout and a browser
// user-agent (the API rejects the default reqwest UA). Response parsing is
// split into pure functions over the response text so it can be unit tested
// without the network.
// =============================================================================

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::FetchOutcome;
use crate::types::{Interval, NewsItem, PriceBar, PriceSeries, Range, StockMeta, TrendingStock};

/// Hard per-request timeout. The upstream contract has no cancellation
/// semantics of its own, so the client enforces one.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Maximum news items returned per symbol, newest first.
const MAX_NEWS_ITEMS: usize = 5;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko)";

/// Market-data client over the Yahoo Finance public API.
#[derive(Clone)]
pub struct MarketDataClient {
    client: reqwest::Client,
    base_url: String,
}

impl MarketDataClient {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("failed to build reqwest client");

        debug!("MarketDataClient initialised (base_url=https://query1.finance.yahoo.com)");

        Self {
            client,
            base_url: "https://query1.finance.yahoo.com".to_string(),
        }
    }

    /// Override the base URL (test servers).
    #[allow(dead_code)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    // -------------------------------------------------------------------------
    // Price series + metadata
    // -------------------------------------------------------------------------

    /// Fetch the price series and metadata snapshot for `symbol`.
    ///
    /// The interval is clamped to daily for ranges that do not support
    /// intraday sampling. Any failure on either endpoint yields a fully
    /// absent outcome — the two halves are fetched as one unit, matching the
    /// single try-scope the dashboard expects.
    #[instrument(skip(self), name = "provider::fetch")]
    pub async fn fetch(&self, symbol: &str, range: Range, interval: Interval) -> FetchOutcome {
        if symbol.trim().is_empty() {
            warn!("empty symbol requested");
            return FetchOutcome::absent();
        }
        let interval = interval.clamp_to(range);

        let series = match self.fetch_chart(symbol, range, interval).await {
            Ok(series) => series,
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "chart fetch failed — returning absent");
                return FetchOutcome::absent();
            }
        };
        let meta = match self.fetch_meta(symbol).await {
            Ok(meta) => meta,
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "meta fetch failed — returning absent");
                return FetchOutcome::absent();
            }
        };

        debug!(symbol = %symbol, bars = series.len(), "fetch complete");
        FetchOutcome {
            series: Some(series),
            meta: Some(meta),
        }
    }

    async fn fetch_chart(
        &self,
        symbol: &str,
        range: Range,
        interval: Interval,
    ) -> Result<PriceSeries> {
        let url = format!(
            "{}/v8/finance/chart/{}?range={}&interval={}",
            self.base_url, symbol, range, interval
        );
        let text = self.get_text(&url).await?;
        parse_chart_response(symbol, &text)
    }

    async fn fetch_meta(&self, symbol: &str) -> Result<StockMeta> {
        let url = format!(
            "{}/v10/finance/quoteSummary/{}?modules=price,summaryProfile,summaryDetail",
            self.base_url, symbol
        );
        let text = self.get_text(&url).await?;
        parse_meta_response(symbol, &text)
    }

    // -------------------------------------------------------------------------
    // News
    // -------------------------------------------------------------------------

    /// Recent news for `symbol`: at most five items, newest first. Empty on
    /// any failure.
    #[instrument(skip(self), name = "provider::news")]
    pub async fn news(&self, symbol: &str) -> Vec<NewsItem> {
        let url = format!(
            "{}/v1/finance/search?q={}&newsCount={}&quotesCount=0",
            self.base_url, symbol, MAX_NEWS_ITEMS
        );
        match self.get_text(&url).await.and_then(|t| parse_news_response(&t)) {
            Ok(items) => items,
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "news fetch failed — returning empty");
                Vec::new()
            }
        }
    }

    // -------------------------------------------------------------------------
    // Market overview
    // -------------------------------------------------------------------------

    /// Snapshot rows for the trending list. Symbols that fail are skipped.
    #[instrument(skip(self, symbols), name = "provider::trending")]
    pub async fn trending(&self, symbols: &[String]) -> Vec<TrendingStock> {
        let mut rows = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            match self.fetch_meta(symbol).await {
                Ok(meta) => rows.push(TrendingStock {
                    symbol: symbol.clone(),
                    name: meta.name.unwrap_or_default(),
                    price: meta.current_price.unwrap_or(0.0),
                    change_percent: meta.change_percent.unwrap_or(0.0),
                    volume: meta.volume.unwrap_or(0.0),
                    market_cap: meta.market_cap.unwrap_or(0.0),
                }),
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "trending snapshot failed — skipping");
                }
            }
        }
        rows
    }

    /// One-month daily close series for a market index. Absent on failure.
    #[instrument(skip(self), name = "provider::index_series")]
    pub async fn index_series(&self, symbol: &str) -> Option<PriceSeries> {
        match self.fetch_chart(symbol, Range::Month1, Interval::Day1).await {
            Ok(series) => Some(series),
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "index fetch failed — returning absent");
                None
            }
        }
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .context("request failed")?;
        let status = resp.status();
        let text = resp.text().await.context("failed to read response body")?;
        if !status.is_success() {
            anyhow::bail!("upstream returned {status}: {text}");
        }
        Ok(text)
    }
}

impl Default for MarketDataClient {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Chart response parsing
// =============================================================================

#[derive(Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartData>>,
    error: Option<UpstreamError>,
}

#[derive(Deserialize)]
struct UpstreamError {
    code: String,
    description: String,
}

#[derive(Deserialize)]
struct ChartData {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Deserialize)]
struct ChartIndicators {
    quote: Vec<QuoteColumns>,
}

#[derive(Deserialize)]
struct QuoteColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Parse a chart response body into an ordered price series.
///
/// Upstream emits null placeholders for halted bars; those rows are dropped.
/// Timestamps must come out strictly increasing — duplicates and regressions
/// are dropped as well.
fn parse_chart_response(symbol: &str, text: &str) -> Result<PriceSeries> {
    let parsed: ChartResponse =
        serde_json::from_str(text).context("failed to parse chart response")?;

    if let Some(err) = parsed.chart.error {
        anyhow::bail!("upstream chart error [{}]: {}", err.code, err.description);
    }

    let data = parsed
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
        .context("chart response carried no result")?;

    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .context("chart response carried no quote columns")?;

    let mut bars: Vec<PriceBar> = Vec::with_capacity(data.timestamp.len());
    let mut last_ts = i64::MIN;
    for (i, &ts) in data.timestamp.iter().enumerate() {
        let (open, high, low, close) = match (
            quote.open.get(i).copied().flatten(),
            quote.high.get(i).copied().flatten(),
            quote.low.get(i).copied().flatten(),
            quote.close.get(i).copied().flatten(),
        ) {
            (Some(o), Some(h), Some(l), Some(c)) => (o, h, l, c),
            _ => continue,
        };
        if ts <= last_ts {
            continue;
        }
        last_ts = ts;
        bars.push(PriceBar {
            timestamp: ts,
            open,
            high,
            low,
            close,
            volume: quote.volume.get(i).copied().flatten().unwrap_or(0.0),
        });
    }

    if bars.is_empty() {
        anyhow::bail!("chart response carried no usable bars");
    }

    Ok(PriceSeries {
        symbol: symbol.to_string(),
        bars,
    })
}

// =============================================================================
// Quote summary parsing
// =============================================================================

#[derive(Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryEnvelope,
}

#[derive(Deserialize)]
struct QuoteSummaryEnvelope {
    result: Option<Vec<QuoteSummaryData>>,
    error: Option<UpstreamError>,
}

#[derive(Deserialize, Default)]
struct QuoteSummaryData {
    price: Option<PriceModule>,
    #[serde(rename = "summaryProfile")]
    summary_profile: Option<SummaryProfileModule>,
    #[serde(rename = "summaryDetail")]
    summary_detail: Option<SummaryDetailModule>,
}

/// Upstream wraps scalar fields as `{"raw": 1.23, "fmt": "1.23"}`.
#[derive(Deserialize, Default)]
struct RawValue {
    raw: Option<f64>,
}

impl RawValue {
    fn value(opt: Option<RawValue>) -> Option<f64> {
        opt.and_then(|v| v.raw)
    }
}

#[derive(Deserialize, Default)]
struct PriceModule {
    #[serde(rename = "shortName")]
    short_name: Option<String>,
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<RawValue>,
    #[serde(rename = "regularMarketChangePercent")]
    regular_market_change_percent: Option<RawValue>,
    #[serde(rename = "regularMarketDayHigh")]
    regular_market_day_high: Option<RawValue>,
    #[serde(rename = "regularMarketDayLow")]
    regular_market_day_low: Option<RawValue>,
    #[serde(rename = "regularMarketVolume")]
    regular_market_volume: Option<RawValue>,
    #[serde(rename = "marketCap")]
    market_cap: Option<RawValue>,
}

#[derive(Deserialize, Default)]
struct SummaryProfileModule {
    sector: Option<String>,
    industry: Option<String>,
    website: Option<String>,
    #[serde(rename = "longBusinessSummary")]
    long_business_summary: Option<String>,
}

#[derive(Deserialize, Default)]
struct SummaryDetailModule {
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<RawValue>,
    #[serde(rename = "fiftyTwoWeekHigh")]
    fifty_two_week_high: Option<RawValue>,
    #[serde(rename = "fiftyTwoWeekLow")]
    fifty_two_week_low: Option<RawValue>,
    #[serde(rename = "averageVolume")]
    average_volume: Option<RawValue>,
}

fn parse_meta_response(symbol: &str, text: &str) -> Result<StockMeta> {
    let parsed: QuoteSummaryResponse =
        serde_json::from_str(text).context("failed to parse quote summary response")?;

    if let Some(err) = parsed.quote_summary.error {
        anyhow::bail!("upstream summary error [{}]: {}", err.code, err.description);
    }

    let data = parsed
        .quote_summary
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
        .context("quote summary carried no result")?;

    let price = data.price.unwrap_or_default();
    let profile = data.summary_profile.unwrap_or_default();
    let detail = data.summary_detail.unwrap_or_default();

    Ok(StockMeta {
        symbol: symbol.to_string(),
        name: price.short_name,
        sector: profile.sector,
        industry: profile.industry,
        current_price: RawValue::value(price.regular_market_price),
        // Upstream reports the change as a fraction; widgets show percent.
        change_percent: RawValue::value(price.regular_market_change_percent)
            .map(|v| v * 100.0),
        day_high: RawValue::value(price.regular_market_day_high),
        day_low: RawValue::value(price.regular_market_day_low),
        volume: RawValue::value(price.regular_market_volume),
        avg_volume: RawValue::value(detail.average_volume),
        market_cap: RawValue::value(price.market_cap),
        pe_ratio: RawValue::value(detail.trailing_pe),
        week52_high: RawValue::value(detail.fifty_two_week_high),
        week52_low: RawValue::value(detail.fifty_two_week_low),
        website: profile.website,
        description: profile.long_business_summary,
    })
}

// =============================================================================
// News parsing
// =============================================================================

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    news: Vec<SearchNewsItem>,
}

#[derive(Deserialize)]
struct SearchNewsItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    publisher: String,
    #[serde(default)]
    link: String,
    #[serde(rename = "providerPublishTime", default)]
    provider_publish_time: i64,
    #[serde(default)]
    summary: String,
}

fn parse_news_response(text: &str) -> Result<Vec<NewsItem>> {
    let parsed: SearchResponse =
        serde_json::from_str(text).context("failed to parse news response")?;

    let mut items: Vec<NewsItem> = parsed
        .news
        .into_iter()
        .map(|n| NewsItem {
            title: n.title,
            publisher: n.publisher,
            link: n.link,
            published: n.provider_publish_time,
            summary: n.summary,
        })
        .collect();

    items.sort_by(|a, b| b.published.cmp(&a.published));
    items.truncate(MAX_NEWS_ITEMS);
    Ok(items)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const CHART_OK: &str = r#"{
        "chart": {
            "result": [{
                "timestamp": [100, 200, 300, 400],
                "indicators": {
                    "quote": [{
                        "open":   [1.0, 2.0, null, 4.0],
                        "high":   [1.5, 2.5, 3.5, 4.5],
                        "low":    [0.5, 1.5, 2.5, 3.5],
                        "close":  [1.2, 2.2, 3.2, 4.2],
                        "volume": [10, 20, 30, null]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn chart_parse_drops_null_bars() {
        let series = parse_chart_response("AAPL", CHART_OK).unwrap();
        assert_eq!(series.symbol, "AAPL");
        // The bar with the null open is dropped; the null volume becomes 0.
        assert_eq!(series.len(), 3);
        assert_eq!(series.bars[0].timestamp, 100);
        assert_eq!(series.bars[2].timestamp, 400);
        assert_eq!(series.bars[2].volume, 0.0);
    }

    #[test]
    fn chart_parse_keeps_timestamps_strictly_increasing() {
        let text = r#"{
            "chart": {
                "result": [{
                    "timestamp": [100, 100, 90, 200],
                    "indicators": {
                        "quote": [{
                            "open":   [1.0, 1.0, 1.0, 1.0],
                            "high":   [1.0, 1.0, 1.0, 1.0],
                            "low":    [1.0, 1.0, 1.0, 1.0],
                            "close":  [1.0, 1.0, 1.0, 1.0],
                            "volume": [1, 1, 1, 1]
                        }]
                    }
                }],
                "error": null
            }
        }"#;
        let series = parse_chart_response("X", text).unwrap();
        let timestamps: Vec<i64> = series.bars.iter().map(|b| b.timestamp).collect();
        assert_eq!(timestamps, vec![100, 200]);
    }

    #[test]
    fn chart_parse_surfaces_upstream_error() {
        let text = r#"{
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found"}
            }
        }"#;
        let err = parse_chart_response("NOPE", text).unwrap_err();
        assert!(err.to_string().contains("Not Found"));
    }

    #[test]
    fn chart_parse_rejects_empty_result() {
        let text = r#"{"chart": {"result": [], "error": null}}"#;
        assert!(parse_chart_response("X", text).is_err());
    }

    #[test]
    fn chart_parse_rejects_garbage() {
        assert!(parse_chart_response("X", "not json").is_err());
    }

    #[test]
    fn meta_parse_happy_path() {
        let text = r#"{
            "quoteSummary": {
                "result": [{
                    "price": {
                        "shortName": "Apple Inc.",
                        "regularMarketPrice": {"raw": 190.5, "fmt": "190.50"},
                        "regularMarketChangePercent": {"raw": 0.0123, "fmt": "1.23%"},
                        "regularMarketDayHigh": {"raw": 192.0},
                        "regularMarketDayLow": {"raw": 189.0},
                        "regularMarketVolume": {"raw": 1000000},
                        "marketCap": {"raw": 3000000000000}
                    },
                    "summaryProfile": {
                        "sector": "Technology",
                        "industry": "Consumer Electronics",
                        "website": "https://www.apple.com",
                        "longBusinessSummary": "Designs smartphones."
                    },
                    "summaryDetail": {
                        "trailingPE": {"raw": 29.4},
                        "fiftyTwoWeekHigh": {"raw": 199.6},
                        "fiftyTwoWeekLow": {"raw": 164.1},
                        "averageVolume": {"raw": 900000}
                    }
                }],
                "error": null
            }
        }"#;
        let meta = parse_meta_response("AAPL", text).unwrap();
        assert_eq!(meta.name.as_deref(), Some("Apple Inc."));
        assert_eq!(meta.sector.as_deref(), Some("Technology"));
        assert!((meta.current_price.unwrap() - 190.5).abs() < 1e-12);
        assert!((meta.change_percent.unwrap() - 1.23).abs() < 1e-12);
        assert!((meta.pe_ratio.unwrap() - 29.4).abs() < 1e-12);
    }

    #[test]
    fn meta_parse_tolerates_missing_modules() {
        let text = r#"{"quoteSummary": {"result": [{}], "error": null}}"#;
        let meta = parse_meta_response("X", text).unwrap();
        assert!(meta.name.is_none());
        assert!(meta.current_price.is_none());
    }

    #[test]
    fn news_parse_sorts_and_caps() {
        let text = r#"{
            "news": [
                {"title": "a", "publisher": "p", "link": "l", "providerPublishTime": 10, "summary": ""},
                {"title": "b", "publisher": "p", "link": "l", "providerPublishTime": 50, "summary": ""},
                {"title": "c", "publisher": "p", "link": "l", "providerPublishTime": 30, "summary": ""},
                {"title": "d", "publisher": "p", "link": "l", "providerPublishTime": 40, "summary": ""},
                {"title": "e", "publisher": "p", "link": "l", "providerPublishTime": 20, "summary": ""},
                {"title": "f", "publisher": "p", "link": "l", "providerPublishTime": 60, "summary": ""}
            ]
        }"#;
        let items = parse_news_response(text).unwrap();
        assert_eq!(items.len(), 5);
        let titles: Vec<&str> = items.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["f", "b", "d", "c", "e"]);
    }

    #[test]
    fn news_parse_empty_feed() {
        assert!(parse_news_response(r#"{"news": []}"#).unwrap().is_empty());
        assert!(parse_news_response(r#"{}"#).unwrap().is_empty());
    }
}
