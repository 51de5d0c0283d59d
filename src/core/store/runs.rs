use anyhow::Result;
use rusqlite::params;

use super::AgentStore;
use super::types::{AgentRunRecord, RunStatus};

const RUN_COLUMNS: &str =
    "id, agent_type, status, started_at, finished_at, output, logs, review";

fn run_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AgentRunRecord> {
    Ok(AgentRunRecord {
        id: row.get(0)?,
        agent_type: row.get(1)?,
        status: row.get(2)?,
        started_at: row.get(3)?,
        finished_at: row.get(4)?,
        output: row.get(5)?,
        logs: row.get(6)?,
        review: row.get(7)?,
    })
}

impl AgentStore {
    /// Insert a new RUNNING run and return the full row. Callers observe the
    /// in-flight state as soon as this returns, before any worker is invoked.
    pub async fn create_run(&self, agent_type: &str) -> Result<AgentRunRecord> {
        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO agent_runs (agent_type, status, started_at) VALUES (?1, 'running', ?2)",
            params![agent_type, chrono::Utc::now().to_rfc3339()],
        )?;
        let id = db.last_insert_rowid();
        let rec = db.query_row(
            &format!("SELECT {RUN_COLUMNS} FROM agent_runs WHERE id = ?1"),
            params![id],
            run_from_row,
        )?;
        Ok(rec)
    }

    /// Move a run from RUNNING to a terminal state, writing its payloads.
    /// The `status = 'running'` guard makes the transition exactly-once:
    /// a row that already reached COMPLETED or FAILED is never touched again,
    /// and the update reports false.
    pub async fn finalize_run(
        &self,
        id: i64,
        status: RunStatus,
        output: Option<&str>,
        logs: Option<&str>,
        review: Option<&str>,
    ) -> Result<bool> {
        debug_assert!(status.is_terminal());
        let db = self.db.lock().await;
        let rows = db.execute(
            "UPDATE agent_runs
             SET status = ?1, finished_at = ?2, output = ?3, logs = ?4, review = ?5
             WHERE id = ?6 AND status = 'running'",
            params![
                status.as_str(),
                chrono::Utc::now().to_rfc3339(),
                output,
                logs,
                review,
                id
            ],
        )?;
        Ok(rows > 0)
    }

    pub async fn get_run(&self, id: i64) -> Result<Option<AgentRunRecord>> {
        let db = self.db.lock().await;
        let mut stmt =
            db.prepare(&format!("SELECT {RUN_COLUMNS} FROM agent_runs WHERE id = ?1 LIMIT 1"))?;
        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(run_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    /// Start time of the most recent run for this agent, if any. Feeds the
    /// schedule evaluator's same-minute suppression.
    pub async fn latest_run_started_at(&self, agent_type: &str) -> Result<Option<String>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT started_at FROM agent_runs
             WHERE agent_type = ?1 ORDER BY id DESC LIMIT 1",
        )?;
        let mut rows = stmt.query(params![agent_type])?;
        if let Some(row) = rows.next()? {
            Ok(Some(row.get(0)?))
        } else {
            Ok(None)
        }
    }

    /// Whether an unfinalized run exists for this agent. The coordinator
    /// checks this before triggering so a slow agent never piles up
    /// concurrent runs across successive ticks.
    pub async fn has_running_run(&self, agent_type: &str) -> Result<bool> {
        let db = self.db.lock().await;
        let count: i64 = db.query_row(
            "SELECT COUNT(*) FROM agent_runs WHERE agent_type = ?1 AND status = 'running'",
            params![agent_type],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub async fn list_runs(
        &self,
        agent_type: Option<&str>,
        limit: usize,
    ) -> Result<Vec<AgentRunRecord>> {
        let db = self.db.lock().await;
        let mut out = Vec::new();
        match agent_type {
            Some(agent) => {
                let mut stmt = db.prepare(&format!(
                    "SELECT {RUN_COLUMNS} FROM agent_runs
                     WHERE agent_type = ?1 ORDER BY id DESC LIMIT ?2"
                ))?;
                let rows = stmt.query_map(params![agent, limit as i64], run_from_row)?;
                for row in rows {
                    out.push(row?);
                }
            }
            None => {
                let mut stmt = db.prepare(&format!(
                    "SELECT {RUN_COLUMNS} FROM agent_runs ORDER BY id DESC LIMIT ?1"
                ))?;
                let rows = stmt.query_map(params![limit as i64], run_from_row)?;
                for row in rows {
                    out.push(row?);
                }
            }
        }
        Ok(out)
    }
}
