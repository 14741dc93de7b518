pub mod artifact;
pub mod table;

use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::ReportConfig;
use crate::core::{Candidate, Transaction};
use crate::db::{AnalysisRecord, HistoryDb};
use crate::signals::{self, ScoredCandidate};

/// One ring member as persisted. Field order is the artifact's column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub global_index: u64,
    pub out_height: Option<u64>,
    pub out_timestamp: Option<u64>,
    pub age_seconds: Option<u64>,
    pub inv_age: Option<f64>,
    pub norm_age: Option<f64>,
    pub neglog: Option<f64>,
    pub softmax_norm_age: Option<f64>,
    pub gnh_score: Option<f64>,
    pub newest_rank: Option<f64>,
}

impl From<ScoredCandidate> for ReportRow {
    fn from(s: ScoredCandidate) -> Self {
        let Candidate {
            global_index,
            out_height,
            out_timestamp,
            age_seconds,
        } = s.candidate;
        Self {
            global_index,
            out_height,
            out_timestamp,
            age_seconds,
            inv_age: s.scores.map(|x| x.inv_age),
            norm_age: s.scores.map(|x| x.norm_age),
            neglog: s.scores.map(|x| x.neglog),
            softmax_norm_age: s.scores.map(|x| x.softmax_norm_age),
            gnh_score: s.scores.map(|x| x.gnh_score()),
            newest_rank: s.newest_rank,
        }
    }
}

impl ReportRow {
    fn is_incomplete(&self) -> bool {
        self.out_height.is_none()
            || self.out_timestamp.is_none()
            || self.age_seconds.is_none()
            || self.gnh_score.is_none()
    }
}

/// Result of one analysis run. `rows` are kept in ring order.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedReport {
    pub tx_hash: String,
    pub tx_height: u64,
    pub tx_timestamp: u64,
    pub key_image: String,
    pub rows: Vec<ReportRow>,
}

impl RankedReport {
    pub fn build(tx: &Transaction, key_image: &str, candidates: &[Candidate]) -> Self {
        Self {
            tx_hash: tx.hash.clone(),
            tx_height: tx.block_height,
            tx_timestamp: tx.block_timestamp,
            key_image: key_image.to_string(),
            rows: signals::score_ring(candidates)
                .into_iter()
                .map(ReportRow::from)
                .collect(),
        }
    }

    /// Rows by descending `gnh_score`; unscored rows last, ties in ring order.
    pub fn ranked(&self) -> Vec<&ReportRow> {
        let mut rows: Vec<&ReportRow> = self.rows.iter().collect();
        rows.sort_by(|a, b| match (a.gnh_score, b.gnh_score) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        rows
    }

    pub fn ring_size(&self) -> usize {
        self.rows.len()
    }

    pub fn known_ages(&self) -> usize {
        self.rows.iter().filter(|r| r.age_seconds.is_some()).count()
    }

    pub fn has_missing(&self) -> bool {
        self.rows.iter().any(ReportRow::is_incomplete)
    }

    /// Highest-ranked scored member: the heuristic's guess at the real spend.
    pub fn top_suspect(&self) -> Option<&ReportRow> {
        self.ranked().into_iter().find(|r| r.gnh_score.is_some())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("history database error: {0}")]
    History(#[from] rusqlite::Error),
}

/// Write the CSV artifact and, if configured, append the run to history.
/// A history failure is logged and does not fail the run.
pub fn persist(report: &RankedReport, config: &ReportConfig) -> Result<(), ReportError> {
    artifact::write_csv(&config.csv_path, report)?;
    info!("Saved {} rows to {}", report.ring_size(), config.csv_path);

    if let Some(ref db_path) = config.history_db {
        match record_history(Path::new(db_path), report) {
            Ok(earlier) => match earlier.first() {
                Some(last) => info!(
                    "Run recorded in {db_path}; {} earlier runs, last #{} at {} (ring {}, {} known)",
                    earlier.len(),
                    last.id,
                    last.analyzed_at,
                    last.ring_size,
                    last.known_ages
                ),
                None => info!("Run recorded in {db_path}"),
            },
            Err(e) => warn!("Failed to record run history in {db_path}: {e}"),
        }
    }
    Ok(())
}

/// Returns the runs for the same transaction that were already on record.
fn record_history(path: &Path, report: &RankedReport) -> Result<Vec<AnalysisRecord>, ReportError> {
    artifact::ensure_parent(path)?;
    let db = HistoryDb::open(path)?;
    let earlier = db.analyses_for(&report.tx_hash)?;
    db.record(report)?;
    Ok(earlier)
}
