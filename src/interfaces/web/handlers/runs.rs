use axum::{
    Json,
    extract::{Path, Query, State},
};

use super::super::AppState;
use crate::core::store::types::AgentRunRecord;

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 500;

fn run_to_json(run: &AgentRunRecord) -> serde_json::Value {
    let parse = |raw: &Option<String>| {
        raw.as_deref()
            .map(|s| serde_json::from_str(s).unwrap_or(serde_json::Value::String(s.to_string())))
    };
    serde_json::json!({
        "id": run.id,
        "agent_type": run.agent_type,
        "status": run.status,
        "started_at": run.started_at,
        "finished_at": run.finished_at,
        "output": parse(&run.output),
        "logs": run.logs,
        "review": parse(&run.review)
    })
}

#[derive(serde::Deserialize)]
pub struct RunsQuery {
    agent: Option<String>,
    limit: Option<usize>,
}

pub async fn get_runs_endpoint(
    Query(query): Query<RunsQuery>,
    State(state): State<AppState>,
) -> Json<serde_json::Value> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    match state.store.list_runs(query.agent.as_deref(), limit).await {
        Ok(runs) => Json(serde_json::json!({
            "success": true,
            "runs": runs.iter().map(run_to_json).collect::<Vec<_>>()
        })),
        Err(e) => Json(serde_json::json!({
            "success": false,
            "error": format!("Database error: {}", e)
        })),
    }
}

pub async fn get_agent_runs_endpoint(
    Path(agent_type): Path<String>,
    Query(query): Query<RunsQuery>,
    State(state): State<AppState>,
) -> Json<serde_json::Value> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let agent_type = agent_type.trim().to_uppercase();
    match state.store.list_runs(Some(&agent_type), limit).await {
        Ok(runs) => Json(serde_json::json!({
            "success": true,
            "agent_type": agent_type,
            "runs": runs.iter().map(run_to_json).collect::<Vec<_>>()
        })),
        Err(e) => Json(serde_json::json!({
            "success": false,
            "error": format!("Database error: {}", e)
        })),
    }
}

pub async fn get_run_endpoint(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Json<serde_json::Value> {
    match state.store.get_run(id).await {
        Ok(Some(run)) => Json(serde_json::json!({
            "success": true,
            "run": run_to_json(&run)
        })),
        Ok(None) => Json(serde_json::json!({
            "success": false,
            "error": "Run not found"
        })),
        Err(e) => Json(serde_json::json!({
            "success": false,
            "error": format!("Database error: {}", e)
        })),
    }
}
