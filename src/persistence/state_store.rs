//! Scheduler State Store
//!
//! Owns the durable state of the pipeline:
//! - checkpoint watermark (never decreases)
//! - seen-events ledger keyed by idempotency key, pruned oldest-first
//! - exposure accumulators per market and per category
//!
//! The whole state is a single JSON document. Loading never fails: a missing
//! or corrupt file yields an empty state. Persisting writes a temporary
//! sibling file and renames it over the old one, and I/O errors are logged
//! rather than returned.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::domain::{LeaderTrade, Side};
use crate::error::Result;

/// Category bucket for markets without a configured category
pub const UNCATEGORIZED: &str = "uncategorized";

/// Minimal ledger entry kept per processed idempotency key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeenEvent {
    /// Market the trade targeted
    pub target: String,
    pub direction: Side,
    pub timestamp: f64,
    /// Leader wallet (absent in older state files)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Running copy-size totals; there is no decrement path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exposures {
    #[serde(default)]
    pub by_target: HashMap<String, Decimal>,
    #[serde(default)]
    pub by_category: HashMap<String, Decimal>,
}

/// Durable pipeline state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerState {
    #[serde(default)]
    pub checkpoint: f64,
    #[serde(default)]
    pub seen_events: HashMap<String, SeenEvent>,
    #[serde(default)]
    pub exposures: Exposures,
}

pub struct StateStore {
    path: PathBuf,
    state: SchedulerState,
    max_seen_events: usize,
    categories: HashMap<String, String>,
}

impl StateStore {
    /// Load state from `path`, falling back to an empty state
    pub fn load(
        path: impl Into<PathBuf>,
        max_seen_events: usize,
        categories: HashMap<String, String>,
    ) -> Self {
        let path = path.into();
        let state = match Self::read_state(&path) {
            Ok(Some(state)) => {
                info!(
                    path = %path.display(),
                    checkpoint = state.checkpoint,
                    seen = state.seen_events.len(),
                    "Restored state"
                );
                state
            }
            Ok(None) => {
                info!(path = %path.display(), "No state file found; starting with empty state");
                SchedulerState::default()
            }
            Err(e) => {
                error!(
                    path = %path.display(),
                    "Failed to load state; starting with empty state: {}",
                    e
                );
                SchedulerState::default()
            }
        };

        // Config keys arrive lowercased; normalize so lookups match either way
        let categories = categories
            .into_iter()
            .map(|(market_id, category)| (market_id.to_lowercase(), category))
            .collect();

        let mut store = Self {
            path,
            state,
            max_seen_events,
            categories,
        };
        store.prune_seen();
        store
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::load(
            config.output.state_path(),
            config.runtime.max_seen_events,
            config.market_categories.clone(),
        )
    }

    fn read_state(path: &Path) -> Result<Option<SchedulerState>> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Flush the full state. Failures are logged and swallowed; the return
    /// value only reports whether the write landed.
    pub fn persist(&self) -> bool {
        match self.write_state() {
            Ok(()) => {
                debug!(path = %self.path.display(), "State persisted");
                true
            }
            Err(e) => {
                error!(path = %self.path.display(), "Failed to persist state: {}", e);
                false
            }
        }
    }

    fn write_state(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        let data = serde_json::to_vec_pretty(&self.state)?;
        std::fs::write(&tmp, data)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    pub fn checkpoint(&self) -> f64 {
        self.state.checkpoint
    }

    /// Move the checkpoint forward to `candidate`; never moves it back
    pub fn advance_checkpoint(&mut self, candidate: f64) -> f64 {
        if candidate > self.state.checkpoint {
            self.state.checkpoint = candidate;
        }
        self.state.checkpoint
    }

    pub fn is_duplicate(&self, trade: &LeaderTrade) -> bool {
        self.state.seen_events.contains_key(&trade.event_id)
    }

    pub fn seen_count(&self) -> usize {
        self.state.seen_events.len()
    }

    /// Record the trade's key, then evict the oldest entries over the cap
    pub fn record_seen(&mut self, trade: &LeaderTrade) {
        self.state.seen_events.insert(
            trade.event_id.clone(),
            SeenEvent {
                target: trade.market_id.clone(),
                direction: trade.side,
                timestamp: trade.ts,
                source: Some(trade.leader_wallet.clone()),
            },
        );
        self.prune_seen();
    }

    fn prune_seen(&mut self) {
        let seen = &mut self.state.seen_events;
        if seen.len() <= self.max_seen_events {
            return;
        }

        let excess = seen.len() - self.max_seen_events;
        let mut by_age: Vec<(f64, String)> = seen
            .iter()
            .map(|(key, entry)| (entry.timestamp, key.clone()))
            .collect();
        by_age.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

        for (_, key) in by_age.into_iter().take(excess) {
            seen.remove(&key);
        }
        debug!(evicted = excess, cap = self.max_seen_events, "Pruned seen-events ledger");
    }

    /// Category bucket for a market, matched case-insensitively
    pub fn category_for(&self, market_id: &str) -> &str {
        self.categories
            .get(&market_id.to_lowercase())
            .map(String::as_str)
            .unwrap_or(UNCATEGORIZED)
    }

    pub fn market_exposure(&self, market_id: &str) -> Decimal {
        self.state
            .exposures
            .by_target
            .get(market_id)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn category_exposure(&self, category: &str) -> Decimal {
        self.state
            .exposures
            .by_category
            .get(category)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Add a filled copy size to the market and its category
    pub fn apply_exposure(&mut self, market_id: &str, amount: Decimal) {
        if amount <= Decimal::ZERO {
            warn!(market_id, %amount, "Ignoring non-positive exposure update");
            return;
        }

        let category = self.category_for(market_id).to_string();
        let exposures = &mut self.state.exposures;
        *exposures
            .by_target
            .entry(market_id.to_string())
            .or_insert(Decimal::ZERO) += amount;
        *exposures
            .by_category
            .entry(category)
            .or_insert(Decimal::ZERO) += amount;
    }
}
