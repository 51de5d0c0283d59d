#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Active,
    Paused,
}

impl AgentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AgentStatus::Active => "active",
            AgentStatus::Paused => "paused",
        }
    }

    pub fn from_status(value: &str) -> Option<Self> {
        match value {
            "active" => Some(AgentStatus::Active),
            "paused" => Some(AgentStatus::Paused),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        }
    }

    pub fn from_status(value: &str) -> Option<Self> {
        match value {
            "running" => Some(RunStatus::Running),
            "completed" => Some(RunStatus::Completed),
            "failed" => Some(RunStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed)
    }
}

/// One schedulable agent, as persisted in `agent_configs`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AgentConfigRecord {
    pub agent_type: String,
    pub schedule: String,
    pub status: String,
    pub params_json: String,
    pub updated_at: String,
}

/// One execution instance of an agent, as persisted in `agent_runs`.
/// `finished_at`, `output`, `logs` and `review` are written exactly once,
/// at finalization.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AgentRunRecord {
    pub id: i64,
    pub agent_type: String,
    pub status: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub output: Option<String>,
    pub logs: Option<String>,
    pub review: Option<String>,
}
