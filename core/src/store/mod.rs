//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! The engine calls store methods — it never executes SQL directly.

use crate::{error::SimResult, event::EventLogEntry, types::Tick};
use rusqlite::{params, Connection, OptionalExtension};

mod statistics;

pub struct SimStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

impl SimStore {
    pub fn open(path: &str) -> SimResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> SimResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn, path: None })
    }

    /// The file backing this store, if any.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Apply all schema migrations in order. Safe to call repeatedly.
    pub fn migrate(&self) -> SimResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_tick_statistics.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(
        &self,
        run_id: &str,
        seed: u64,
        version: &str,
        config_json: &str,
    ) -> SimResult<()> {
        let started_at = chrono::Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO run (run_id, seed, version, started_at, config_json)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            // SQLite integers are signed; the seed round-trips bit for bit.
            params![run_id, seed as i64, version, started_at, config_json],
        )?;
        Ok(())
    }

    pub fn run_seed(&self, run_id: &str) -> SimResult<Option<u64>> {
        let seed = self
            .conn
            .query_row(
                "SELECT seed FROM run WHERE run_id = ?1",
                params![run_id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(seed.map(|s| s as u64))
    }

    // ── Event log ──────────────────────────────────────────────

    /// Append a whole tick's events in one transaction.
    pub fn append_events(&mut self, entries: &[EventLogEntry]) -> SimResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO event_log (run_id, tick, source, event_type, payload)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for entry in entries {
                stmt.execute(params![
                    entry.run_id,
                    entry.tick as i64,
                    entry.source,
                    entry.event_type,
                    entry.payload,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn events_for_tick(&self, run_id: &str, tick: Tick) -> SimResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, run_id, tick, source, event_type, payload
             FROM event_log WHERE run_id = ?1 AND tick = ?2
             ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map(params![run_id, tick as i64], |row| {
                Ok(EventLogEntry {
                    id: Some(row.get(0)?),
                    run_id: row.get(1)?,
                    tick: row.get::<_, i64>(2)? as u64,
                    source: row.get(3)?,
                    event_type: row.get(4)?,
                    payload: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn event_count_by_type(&self, run_id: &str, event_type: &str) -> SimResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM event_log WHERE run_id = ?1 AND event_type = ?2",
            params![run_id, event_type],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // ── Snapshot ───────────────────────────────────────────────

    pub fn save_snapshot(&self, run_id: &str, tick: Tick, state_json: &str) -> SimResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO snapshot (run_id, tick, state_json) VALUES (?1, ?2, ?3)",
            params![run_id, tick as i64, state_json],
        )?;
        Ok(())
    }

    pub fn latest_snapshot_before(
        &self,
        run_id: &str,
        tick: Tick,
    ) -> SimResult<Option<(Tick, String)>> {
        let result = self
            .conn
            .query_row(
                "SELECT tick, state_json FROM snapshot
                 WHERE run_id = ?1 AND tick <= ?2
                 ORDER BY tick DESC LIMIT 1",
                params![run_id, tick as i64],
                |row| Ok((row.get::<_, i64>(0)? as u64, row.get::<_, String>(1)?)),
            )
            .optional()?;
        Ok(result)
    }
}
