// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.

//! Persistence for output accounting: an `OutputSink` trait with a
//! SQLite-backed implementation for real runs and an in-memory one for
//! tests.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use market_types::TimeStamp;
use rusqlite::Connection;
use thiserror::Error;

use crate::types::StepRecord;

#[derive(Debug, Error)]
pub enum AccountingError {
    #[error("failed to open accounting database at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("accounting database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type AccountingResult<T> = std::result::Result<T, AccountingError>;

/// Persists one [`StepRecord`] per cleared market step and answers
/// per-trader queries over the history.
pub trait OutputSink: Send + Sync {
    fn record_step(&self, record: &StepRecord) -> AccountingResult<()>;

    fn records_for_trader(&self, trader_id: &str) -> AccountingResult<Vec<StepRecord>>;

    fn records_at(&self, time: TimeStamp) -> AccountingResult<Vec<StepRecord>>;
}

/// SQLite-backed sink, one row per `(time, trader_id)`.
#[derive(Debug)]
pub struct SqliteSink {
    conn: Mutex<Connection>,
}

impl SqliteSink {
    pub fn open<P: AsRef<Path>>(db_path: P) -> AccountingResult<Self> {
        let path: PathBuf = db_path.as_ref().to_path_buf();
        let conn = Connection::open(&path).map_err(|source| AccountingError::Open {
            path: path.display().to_string(),
            source,
        })?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS settlements (
                time_ticks INTEGER NOT NULL,
                trader_id TEXT NOT NULL,
                awarded_power_mwh REAL NOT NULL,
                awarded_price_eur_per_mwh REAL NOT NULL,
                settlement_eur REAL NOT NULL,
                device_energy_after_mwh REAL,
                PRIMARY KEY (time_ticks, trader_id)
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl OutputSink for SqliteSink {
    fn record_step(&self, record: &StepRecord) -> AccountingResult<()> {
        let conn = self.conn.lock().expect("accounting connection mutex poisoned");
        conn.execute(
            "INSERT OR REPLACE INTO settlements
                (time_ticks, trader_id, awarded_power_mwh, awarded_price_eur_per_mwh, settlement_eur, device_energy_after_mwh)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                record.time.ticks(),
                record.trader_id,
                record.awarded_power_mwh,
                record.awarded_price_eur_per_mwh,
                record.settlement_eur,
                record.device_energy_after_mwh,
            ],
        )?;
        Ok(())
    }

    fn records_for_trader(&self, trader_id: &str) -> AccountingResult<Vec<StepRecord>> {
        let conn = self.conn.lock().expect("accounting connection mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT time_ticks, trader_id, awarded_power_mwh, awarded_price_eur_per_mwh, settlement_eur, device_energy_after_mwh
             FROM settlements WHERE trader_id = ?1 ORDER BY time_ticks ASC",
        )?;
        let rows = stmt
            .query_map([trader_id], row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn records_at(&self, time: TimeStamp) -> AccountingResult<Vec<StepRecord>> {
        let conn = self.conn.lock().expect("accounting connection mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT time_ticks, trader_id, awarded_power_mwh, awarded_price_eur_per_mwh, settlement_eur, device_energy_after_mwh
             FROM settlements WHERE time_ticks = ?1 ORDER BY trader_id ASC",
        )?;
        let rows = stmt
            .query_map([time.ticks()], row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<StepRecord> {
    let ticks: i64 = row.get(0)?;
    Ok(StepRecord {
        time: TimeStamp::from_ticks(ticks),
        trader_id: row.get(1)?,
        awarded_power_mwh: row.get(2)?,
        awarded_price_eur_per_mwh: row.get(3)?,
        settlement_eur: row.get(4)?,
        device_energy_after_mwh: row.get(5)?,
    })
}

/// An in-memory sink used by tests and short-lived scenario runs that do
/// not need durable storage.
#[derive(Debug, Default)]
pub struct InMemorySink {
    records: Mutex<Vec<StepRecord>>,
}

impl InMemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutputSink for InMemorySink {
    fn record_step(&self, record: &StepRecord) -> AccountingResult<()> {
        self.records
            .lock()
            .expect("accounting records mutex poisoned")
            .push(record.clone());
        Ok(())
    }

    fn records_for_trader(&self, trader_id: &str) -> AccountingResult<Vec<StepRecord>> {
        Ok(self
            .records
            .lock()
            .expect("accounting records mutex poisoned")
            .iter()
            .filter(|r| r.trader_id == trader_id)
            .cloned()
            .collect())
    }

    fn records_at(&self, time: TimeStamp) -> AccountingResult<Vec<StepRecord>> {
        Ok(self
            .records
            .lock()
            .expect("accounting records mutex poisoned")
            .iter()
            .filter(|r| r.time == time)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_types::TimeStamp;

    fn sample(time: i64, trader: &str) -> StepRecord {
        StepRecord {
            time: TimeStamp::from_ticks(time),
            trader_id: trader.to_owned(),
            awarded_power_mwh: 5.0,
            awarded_price_eur_per_mwh: 42.0,
            settlement_eur: 210.0,
            device_energy_after_mwh: Some(3.0),
        }
    }

    #[test]
    fn in_memory_sink_round_trips() {
        let sink = InMemorySink::new();
        sink.record_step(&sample(0, "storage-a")).unwrap();
        sink.record_step(&sample(3600, "storage-a")).unwrap();
        sink.record_step(&sample(0, "storage-b")).unwrap();

        assert_eq!(sink.records_for_trader("storage-a").unwrap().len(), 2);
        assert_eq!(sink.records_at(TimeStamp::from_ticks(0)).unwrap().len(), 2);
    }

    #[test]
    fn sqlite_sink_persists_and_upserts() {
        let dir = tempfile::tempdir().unwrap();
        let sink = SqliteSink::open(dir.path().join("accounting.db")).unwrap();
        sink.record_step(&sample(0, "storage-a")).unwrap();

        let mut updated = sample(0, "storage-a");
        updated.awarded_power_mwh = 9.0;
        sink.record_step(&updated).unwrap();

        let rows = sink.records_for_trader("storage-a").unwrap();
        assert_eq!(rows.len(), 1);
        assert!((rows[0].awarded_power_mwh - 9.0).abs() < 1e-9);
    }
}
