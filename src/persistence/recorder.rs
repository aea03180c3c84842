//! Result Recorder
//!
//! Every processed trade produces one JSON line in `results.jsonl` and one
//! row in `report.csv`. Both files are append-only. The CSV header is
//! written once, when the file is first created, so the column order stays
//! stable across restarts.
//!
//! Writes are best-effort: failures are logged and never reach the pipeline.

use serde::Serialize;
use std::borrow::Cow;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::config::OutputConfig;
use crate::domain::{ExecutionDecision, ExecutionDetails, ExecutionStatus, LeaderTrade};
use crate::error::Result;

/// Audit table columns, in file order
pub const REPORT_COLUMNS: [&str; 17] = [
    "ts",
    "leader_wallet",
    "event_id",
    "market_id",
    "market_title",
    "side",
    "outcome",
    "leader_price",
    "leader_size",
    "copy_size",
    "limit_price",
    "mode",
    "status",
    "reason",
    "latency_ms",
    "order_id",
    "note",
];

/// One line of the structured results log
#[derive(Debug, Serialize)]
struct ResultRecord<'a> {
    status: ExecutionStatus,
    trade: &'a LeaderTrade,
    decision: &'a ExecutionDecision,
    extra: &'a ExecutionDetails,
}

pub struct ResultRecorder {
    results_path: PathBuf,
    report_path: PathBuf,
}

impl ResultRecorder {
    pub fn new(results_path: impl Into<PathBuf>, report_path: impl Into<PathBuf>) -> Self {
        let recorder = Self {
            results_path: results_path.into(),
            report_path: report_path.into(),
        };
        recorder.ensure_report_header();
        recorder
    }

    pub fn from_config(output: &OutputConfig) -> Self {
        Self::new(output.results_path(), output.report_path())
    }

    pub fn results_path(&self) -> &Path {
        &self.results_path
    }

    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    /// Record the outcome for one trade in both logs
    pub fn append(
        &self,
        trade: &LeaderTrade,
        decision: &ExecutionDecision,
        status: ExecutionStatus,
        details: Option<&ExecutionDetails>,
    ) {
        let empty = ExecutionDetails::default();
        let details = details.unwrap_or(&empty);

        if let Err(e) = self.append_result(trade, decision, status, details) {
            error!(
                path = %self.results_path.display(),
                event_id = %trade.event_id,
                "Failed to append result: {}",
                e
            );
        }

        if let Err(e) = self.append_report_row(trade, decision, status, details) {
            error!(
                path = %self.report_path.display(),
                event_id = %trade.event_id,
                "Failed to append report row: {}",
                e
            );
        }
    }

    fn ensure_report_header(&self) {
        if let Err(e) = self.open_report().and_then(|mut file| write_header_if_empty(&mut file)) {
            error!(path = %self.report_path.display(), "Failed to create report: {}", e);
        }
    }

    fn append_result(
        &self,
        trade: &LeaderTrade,
        decision: &ExecutionDecision,
        status: ExecutionStatus,
        extra: &ExecutionDetails,
    ) -> Result<()> {
        let record = ResultRecord {
            status,
            trade,
            decision,
            extra,
        };
        let line = serde_json::to_string(&record)?;

        let mut file = open_append(&self.results_path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }

    fn append_report_row(
        &self,
        trade: &LeaderTrade,
        decision: &ExecutionDecision,
        status: ExecutionStatus,
        extra: &ExecutionDetails,
    ) -> Result<()> {
        let mut file = self.open_report()?;
        write_header_if_empty(&mut file)?;

        let latency = extra.latency_ms.map(|ms| ms.to_string()).unwrap_or_default();
        writeln!(
            file,
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            trade.ts as i64,
            csv_field(&trade.leader_wallet),
            csv_field(&trade.event_id),
            csv_field(&trade.market_id),
            csv_field(&trade.market_title),
            trade.side,
            csv_field(&trade.outcome),
            trade.price,
            trade.size,
            decision.copy_size,
            decision.limit_price,
            decision.mode,
            status,
            csv_field(&decision.reason),
            latency,
            csv_field(extra.order_id.as_deref().unwrap_or_default()),
            csv_field(extra.note.as_deref().unwrap_or_default()),
        )?;
        Ok(())
    }

    fn open_report(&self) -> Result<std::fs::File> {
        open_append(&self.report_path)
    }
}

fn open_append(path: &Path) -> Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

fn write_header_if_empty(file: &mut std::fs::File) -> Result<()> {
    if file.metadata()?.len() == 0 {
        writeln!(file, "{}", REPORT_COLUMNS.join(","))?;
        info!("Created report with {} columns", REPORT_COLUMNS.len());
    }
    Ok(())
}

/// Quote a CSV field when it contains a separator, quote or line break
fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}
