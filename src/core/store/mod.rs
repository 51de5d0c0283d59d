mod configs;
mod runs;
pub mod types;

use anyhow::Result;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::info;

/// Durable store for agent configs and the run ledger. Both tables are owned
/// exclusively by this subsystem; every other surface (API, CLI) only reads.
pub struct AgentStore {
    db: Arc<Mutex<Connection>>,
    workspace_dir: PathBuf,
}

impl AgentStore {
    pub async fn new<P: AsRef<Path>>(workspace_dir: P) -> Result<Self> {
        let workspace_dir = workspace_dir.as_ref().to_path_buf();
        if !workspace_dir.exists() {
            fs::create_dir_all(&workspace_dir).await?;
        }

        let db_path = workspace_dir.join("newsdesk.db");
        let db = Connection::open(&db_path)?;
        create_schema(&db)?;
        info!("Agent Store (SQLite) ready at {}", db_path.display());

        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            workspace_dir,
        })
    }

    pub fn workspace_dir(&self) -> &Path {
        &self.workspace_dir
    }
}

fn create_schema(db: &Connection) -> Result<()> {
    db.execute(
        "CREATE TABLE IF NOT EXISTS agent_configs (
            agent_type  TEXT PRIMARY KEY,
            schedule    TEXT NOT NULL,
            status      TEXT NOT NULL DEFAULT 'active',
            params_json TEXT NOT NULL DEFAULT '{}',
            updated_at  TEXT NOT NULL
        )",
        [],
    )?;

    db.execute(
        "CREATE TABLE IF NOT EXISTS agent_runs (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            agent_type  TEXT NOT NULL,
            status      TEXT NOT NULL,
            started_at  TEXT NOT NULL,
            finished_at TEXT,
            output      TEXT,
            logs        TEXT,
            review      TEXT
        )",
        [],
    )?;

    db.execute(
        "CREATE INDEX IF NOT EXISTS idx_agent_runs_type_started ON agent_runs(agent_type, started_at)",
        [],
    )?;
    db.execute(
        "CREATE INDEX IF NOT EXISTS idx_agent_runs_type_status ON agent_runs(agent_type, status)",
        [],
    )?;

    Ok(())
}

/// Create an AgentStore in a unique temp directory for testing.
#[cfg(test)]
pub fn test_store() -> AgentStore {
    let tmpdir = std::env::temp_dir().join(format!("newsdesk-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&tmpdir).expect("create temp dir");

    let db = Connection::open(tmpdir.join("newsdesk.db")).expect("open test db");
    create_schema(&db).expect("create schema");

    AgentStore {
        db: Arc::new(Mutex::new(db)),
        workspace_dir: tmpdir,
    }
}
