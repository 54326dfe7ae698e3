// =============================================================================
// Runtime Configuration — dashboard settings with atomic save
// =============================================================================
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash. All fields carry `#[serde(default)]` so that adding new fields never
// breaks loading an older config file.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::{Interval, Range};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_db_path() -> String {
    "stockdeck.db".to_string()
}

fn default_trending_symbols() -> Vec<String> {
    vec![
        "AAPL".to_string(),
        "MSFT".to_string(),
        "GOOGL".to_string(),
        "AMZN".to_string(),
        "NVDA".to_string(),
    ]
}

fn default_index_symbols() -> Vec<IndexSpec> {
    vec![
        IndexSpec { symbol: "^GSPC".into(), name: "S&P 500".into() },
        IndexSpec { symbol: "^DJI".into(), name: "Dow Jones".into() },
        IndexSpec { symbol: "^IXIC".into(), name: "NASDAQ".into() },
    ]
}

fn default_session_max_age_secs() -> i64 {
    24 * 3600
}

/// A market index shown on the overview tab.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSpec {
    pub symbol: String,
    pub name: String,
}

// =============================================================================
// RuntimeConfig
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Symbols shown in the market-overview trending section.
    #[serde(default = "default_trending_symbols")]
    pub trending_symbols: Vec<String>,

    /// Major indices plotted on the overview tab.
    #[serde(default = "default_index_symbols")]
    pub index_symbols: Vec<IndexSpec>,

    /// Defaults applied when a request omits range/interval.
    #[serde(default)]
    pub default_range: Range,
    #[serde(default)]
    pub default_interval: Interval,

    #[serde(default = "default_session_max_age_secs")]
    pub session_max_age_secs: i64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            db_path: default_db_path(),
            trending_symbols: default_trending_symbols(),
            index_symbols: default_index_symbols(),
            default_range: Range::default(),
            default_interval: Interval::default(),
            session_max_age_secs: default_session_max_age_secs(),
        }
    }
}

impl RuntimeConfig {
    /// Load from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.as_ref().display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse {}", path.as_ref().display()))?;
        info!(path = %path.as_ref().display(), "runtime config loaded");
        Ok(config)
    }

    /// Save atomically: write to a tmp file, then rename over the target.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let raw = serde_json::to_string_pretty(self).context("failed to serialize config")?;
        let tmp = path.as_ref().with_extension("json.tmp");
        std::fs::write(&tmp, raw)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("failed to rename over {}", path.as_ref().display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = RuntimeConfig::default();
        assert_eq!(config.trending_symbols.len(), 5);
        assert_eq!(config.index_symbols.len(), 3);
        assert_eq!(config.default_range, Range::Month6);
        assert_eq!(config.default_interval, Interval::Day1);
    }

    #[test]
    fn empty_json_fills_defaults() {
        let config: RuntimeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.bind_addr, default_bind_addr());
        assert_eq!(config.db_path, default_db_path());
    }

    #[test]
    fn save_load_round_trip() {
        let mut path = std::env::temp_dir();
        path.push(format!("stockdeck_config_test_{}.json", std::process::id()));

        let mut config = RuntimeConfig::default();
        config.trending_symbols = vec!["TSLA".into()];
        config.save(&path).unwrap();

        let loaded = RuntimeConfig::load(&path).unwrap();
        assert_eq!(loaded.trending_symbols, vec!["TSLA".to_string()]);

        let _ = std::fs::remove_file(&path);
    }
}
