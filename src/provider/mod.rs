// =============================================================================
// Price Series Provider
// =============================================================================
//
// Wraps the external market-data API. Every fetch is a single best-effort
// attempt with a hard client timeout; any provider-side failure (unknown
// symbol, network error, rate limit, parse error) degrades to an absent
// result instead of propagating. Callers treat absence as a first-class,
// non-exceptional outcome.

pub mod yahoo;

pub use yahoo::MarketDataClient;

use crate::types::{PriceSeries, StockMeta};

/// Outcome of one provider fetch. Both halves are absent on any failure.
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    pub series: Option<PriceSeries>,
    pub meta: Option<StockMeta>,
}

impl FetchOutcome {
    pub fn absent() -> Self {
        Self::default()
    }
}
