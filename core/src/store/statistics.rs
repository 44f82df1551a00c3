use super::SimStore;
use crate::{error::SimResult, stats::AgentCounts, types::Tick};
use rusqlite::{params, OptionalExtension, Row};

fn counts_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<AgentCounts> {
    Ok(AgentCounts {
        susceptible: row.get::<_, i64>(offset)? as usize,
        vaccinated: row.get::<_, i64>(offset + 1)? as usize,
        infected: row.get::<_, i64>(offset + 2)? as usize,
        recovered: row.get::<_, i64>(offset + 3)? as usize,
        dead: row.get::<_, i64>(offset + 4)? as usize,
    })
}

impl SimStore {
    // ── Tick statistics ───────────────────────────────────────────

    pub fn record_statistics(
        &self,
        run_id: &str,
        tick: Tick,
        counts: &AgentCounts,
    ) -> SimResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO tick_statistics (
                run_id, tick, susceptible, vaccinated, infected, recovered, dead
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                run_id,
                tick as i64,
                counts.susceptible as i64,
                counts.vaccinated as i64,
                counts.infected as i64,
                counts.recovered as i64,
                counts.dead as i64,
            ],
        )?;
        Ok(())
    }

    pub fn statistics_for_tick(&self, run_id: &str, tick: Tick) -> SimResult<Option<AgentCounts>> {
        let counts = self
            .conn
            .query_row(
                "SELECT susceptible, vaccinated, infected, recovered, dead
                 FROM tick_statistics WHERE run_id = ?1 AND tick = ?2",
                params![run_id, tick as i64],
                |row| counts_from_row(row, 0),
            )
            .optional()?;
        Ok(counts)
    }

    /// Every recorded tick for the run, in tick order.
    pub fn statistics_series(&self, run_id: &str) -> SimResult<Vec<(Tick, AgentCounts)>> {
        let mut stmt = self.conn.prepare(
            "SELECT tick, susceptible, vaccinated, infected, recovered, dead
             FROM tick_statistics WHERE run_id = ?1
             ORDER BY tick ASC",
        )?;
        let series = stmt
            .query_map(params![run_id], |row| {
                Ok((row.get::<_, i64>(0)? as u64, counts_from_row(row, 1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(series)
    }

    /// The tick with the most agents in the `infected` bucket, if any ticks
    /// were recorded. Ties go to the earliest tick.
    pub fn peak_infected(&self, run_id: &str) -> SimResult<Option<(Tick, usize)>> {
        let peak = self
            .conn
            .query_row(
                "SELECT tick, infected FROM tick_statistics
                 WHERE run_id = ?1
                 ORDER BY infected DESC, tick ASC LIMIT 1",
                params![run_id],
                |row| Ok((row.get::<_, i64>(0)? as u64, row.get::<_, i64>(1)? as usize)),
            )
            .optional()?;
        Ok(peak)
    }
}
