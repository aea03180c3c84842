//! Persistence Layer for State Management and Audit
//!
//! This module provides the durable side of the pipeline:
//! - State store for checkpoint, dedup ledger and exposures (crash recovery)
//! - Result recorder for the append-only results log and CSV audit report

pub mod recorder;
pub mod state_store;

pub use recorder::{ResultRecorder, REPORT_COLUMNS};
pub use state_store::{Exposures, SchedulerState, SeenEvent, StateStore, UNCATEGORIZED};
