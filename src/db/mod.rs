pub mod schema;

use chrono::Utc;
use rusqlite::Connection;
use std::path::Path;

use crate::report::RankedReport;

/// A past analysis run as stored in the history database.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRecord {
    pub id: i64,
    pub ring_size: usize,
    pub known_ages: usize,
    pub analyzed_at: String,
}

/// SQLite log of analysis runs.
pub struct HistoryDb {
    conn: Connection,
}

/// SQLite integers are signed; values above `i64::MAX` are rejected.
fn sql_int(v: u64) -> Result<i64, rusqlite::Error> {
    i64::try_from(v).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

impl HistoryDb {
    pub fn open(path: &Path) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        schema::migrate(&conn)?;
        Ok(Self { conn })
    }

    /// Store a run and all its ring members in one transaction.
    pub fn record(&self, report: &RankedReport) -> Result<i64, rusqlite::Error> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO analyses (tx_hash, tx_height, tx_timestamp, key_image, ring_size, known_ages, analyzed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                report.tx_hash,
                sql_int(report.tx_height)?,
                sql_int(report.tx_timestamp)?,
                report.key_image,
                report.ring_size() as i64,
                report.known_ages() as i64,
                Utc::now().to_rfc3339(),
            ],
        )?;
        let analysis_id = tx.last_insert_rowid();
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO ring_members (analysis_id, position, global_index, out_height, out_timestamp, age_seconds,
                                           inv_age, norm_age, neglog, softmax_norm_age, gnh_score, newest_rank)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )?;
            for (position, row) in report.rows.iter().enumerate() {
                stmt.execute(rusqlite::params![
                    analysis_id,
                    position as i64,
                    sql_int(row.global_index)?,
                    row.out_height.map(sql_int).transpose()?,
                    row.out_timestamp.map(sql_int).transpose()?,
                    row.age_seconds.map(sql_int).transpose()?,
                    row.inv_age,
                    row.norm_age,
                    row.neglog,
                    row.softmax_norm_age,
                    row.gnh_score,
                    row.newest_rank,
                ])?;
            }
        }
        tx.commit()?;
        Ok(analysis_id)
    }

    /// Earlier runs for a transaction, newest first.
    pub fn analyses_for(&self, tx_hash: &str) -> Result<Vec<AnalysisRecord>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, ring_size, known_ages, analyzed_at
             FROM analyses WHERE tx_hash = ?1 ORDER BY id DESC",
        )?;
        let rows = stmt.query_map(rusqlite::params![tx_hash], |row| {
            Ok(AnalysisRecord {
                id: row.get(0)?,
                ring_size: row.get::<_, i64>(1)? as usize,
                known_ages: row.get::<_, i64>(2)? as usize,
                analyzed_at: row.get(3)?,
            })
        })?;
        rows.collect()
    }
}
