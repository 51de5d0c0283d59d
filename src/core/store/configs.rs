use anyhow::Result;
use rusqlite::params;

use super::AgentStore;
use super::types::{AgentConfigRecord, AgentStatus};

/// Stock agents seeded on first boot. Schedule, status, params.
const DEFAULT_AGENTS: &[(&str, &str, AgentStatus, &str)] = &[
    (
        "REPORTER",
        "0 * * * *",
        AgentStatus::Active,
        r#"{"beat":"markets","max_articles":3}"#,
    ),
    (
        "PREDICTION_CHECKER",
        "0 */6 * * *",
        AgentStatus::Active,
        r#"{"lookback_hours":24}"#,
    ),
    (
        "REPLY_GUY",
        "0 */2 * * *",
        AgentStatus::Active,
        r#"{"max_replies":5}"#,
    ),
    (
        "MARKETER",
        "0 9 * * *",
        AgentStatus::Paused,
        r#"{"channels":["x","newsletter"]}"#,
    ),
];

impl AgentStore {
    pub async fn get_all_agent_configs(&self) -> Result<Vec<AgentConfigRecord>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT agent_type, schedule, status, params_json, updated_at
             FROM agent_configs ORDER BY agent_type ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(AgentConfigRecord {
                agent_type: row.get(0)?,
                schedule: row.get(1)?,
                status: row.get(2)?,
                params_json: row.get(3)?,
                updated_at: row.get(4)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    /// Configs the tick coordinator considers. Re-read on every tick so
    /// administrative edits take effect without a restart.
    pub async fn get_active_agent_configs(&self) -> Result<Vec<AgentConfigRecord>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT agent_type, schedule, status, params_json, updated_at
             FROM agent_configs WHERE status = 'active' ORDER BY agent_type ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(AgentConfigRecord {
                agent_type: row.get(0)?,
                schedule: row.get(1)?,
                status: row.get(2)?,
                params_json: row.get(3)?,
                updated_at: row.get(4)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    pub async fn get_agent_config(&self, agent_type: &str) -> Result<Option<AgentConfigRecord>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT agent_type, schedule, status, params_json, updated_at
             FROM agent_configs WHERE agent_type = ?1 LIMIT 1",
        )?;
        let mut rows = stmt.query(params![agent_type])?;
        if let Some(row) = rows.next()? {
            Ok(Some(AgentConfigRecord {
                agent_type: row.get(0)?,
                schedule: row.get(1)?,
                status: row.get(2)?,
                params_json: row.get(3)?,
                updated_at: row.get(4)?,
            }))
        } else {
            Ok(None)
        }
    }

    pub async fn upsert_agent_config(
        &self,
        agent_type: &str,
        schedule: &str,
        status: AgentStatus,
        params_json: &str,
    ) -> Result<()> {
        let db = self.db.lock().await;
        db.execute(
            "INSERT OR REPLACE INTO agent_configs (agent_type, schedule, status, params_json, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                agent_type,
                schedule,
                status.as_str(),
                params_json,
                chrono::Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    pub async fn set_agent_status(&self, agent_type: &str, status: AgentStatus) -> Result<bool> {
        let db = self.db.lock().await;
        let rows = db.execute(
            "UPDATE agent_configs SET status = ?1, updated_at = ?2 WHERE agent_type = ?3",
            params![
                status.as_str(),
                chrono::Utc::now().to_rfc3339(),
                agent_type
            ],
        )?;
        Ok(rows > 0)
    }

    /// Insert the stock agent roster where absent. Existing rows are left
    /// untouched so administrative edits survive restarts.
    pub async fn seed_default_agents(&self) -> Result<usize> {
        let db = self.db.lock().await;
        let mut seeded = 0;
        for (agent_type, schedule, status, params_json) in DEFAULT_AGENTS {
            let rows = db.execute(
                "INSERT OR IGNORE INTO agent_configs (agent_type, schedule, status, params_json, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    agent_type,
                    schedule,
                    status.as_str(),
                    params_json,
                    chrono::Utc::now().to_rfc3339()
                ],
            )?;
            seeded += rows;
        }
        Ok(seeded)
    }
}
