// =============================================================================
// Central Application State — StockDeck dashboard backend
// =============================================================================
//
// Ties the shared collaborators together for the HTTP layer: the market-data
// provider, the account/watchlist store, session keys, and the runtime
// config. Request handlers receive `Arc<AppState>`; everything request-scoped
// (fetched series, indicator rows, chart specs) stays on the handler's stack
// and is discarded after rendering — there is no caching layer.
//
// Thread safety:
//   - Atomic counter for lock-free version tracking.
//   - parking_lot::RwLock around the mutable config.
//   - The store serializes its own access internally.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::api::session::SessionKeys;
use crate::provider::MarketDataClient;
use crate::runtime_config::RuntimeConfig;
use crate::store::Store;

/// Shared state for all request handlers, passed around as `Arc<AppState>`.
pub struct AppState {
    /// Monotonically increasing version counter, incremented on every
    /// meaningful state mutation (account created, watchlist changed).
    pub state_version: AtomicU64,

    pub config: RwLock<RuntimeConfig>,
    pub provider: MarketDataClient,
    pub store: Store,
    pub session_keys: SessionKeys,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: RuntimeConfig, store: Store, session_keys: SessionKeys) -> Self {
        Self {
            state_version: AtomicU64::new(0),
            config: RwLock::new(config),
            provider: MarketDataClient::new(),
            store,
            session_keys,
            started_at: Utc::now(),
        }
    }

    pub fn increment_version(&self) {
        self.state_version.fetch_add(1, Ordering::SeqCst);
    }

    pub fn version(&self) -> u64 {
        self.state_version.load(Ordering::SeqCst)
    }
}
