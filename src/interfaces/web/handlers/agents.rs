use axum::{
    Json,
    extract::{Path, State},
};

use super::super::AppState;
use crate::core::scheduler::cron;
use crate::core::store::types::AgentStatus;

pub async fn status_endpoint(State(state): State<AppState>) -> Json<serde_json::Value> {
    let configs = state.store.get_all_agent_configs().await.unwrap_or_default();
    let active = configs.iter().filter(|c| c.status == "active").count();
    Json(serde_json::json!({
        "success": true,
        "agents": configs.len(),
        "active": active,
        "registered_workers": state.registry.registered_types()
    }))
}

pub async fn get_agents_endpoint(State(state): State<AppState>) -> Json<serde_json::Value> {
    let configs = match state.store.get_all_agent_configs().await {
        Ok(configs) => configs,
        Err(e) => {
            return Json(serde_json::json!({
                "success": false,
                "error": format!("Database error: {}", e)
            }));
        }
    };

    let agents: Vec<serde_json::Value> = configs
        .iter()
        .map(|c| {
            serde_json::json!({
                "agent_type": c.agent_type,
                "schedule": c.schedule,
                "status": c.status,
                "params": serde_json::from_str::<serde_json::Value>(&c.params_json)
                    .unwrap_or(serde_json::json!({})),
                "updated_at": c.updated_at,
                "registered": state.registry.is_registered(&c.agent_type)
            })
        })
        .collect();

    Json(serde_json::json!({
        "success": true,
        "agents": agents
    }))
}

#[derive(serde::Deserialize)]
pub struct UpsertAgentRequest {
    agent_type: String,
    schedule: String,
    status: Option<String>,
    params: Option<serde_json::Value>,
}

pub async fn upsert_agent_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<UpsertAgentRequest>,
) -> Json<serde_json::Value> {
    let agent_type = payload.agent_type.trim().to_uppercase();
    let schedule = payload.schedule.trim().to_string();

    if agent_type.is_empty() || schedule.is_empty() {
        return Json(serde_json::json!({
            "success": false,
            "error": "agent_type and schedule are required"
        }));
    }

    let status = match payload.status.as_deref() {
        None => AgentStatus::Active,
        Some(raw) => match AgentStatus::from_status(raw) {
            Some(status) => status,
            None => {
                return Json(serde_json::json!({
                    "success": false,
                    "error": format!("Unknown status '{}', expected active or paused", raw)
                }));
            }
        },
    };

    let params_json = payload
        .params
        .unwrap_or(serde_json::json!({}))
        .to_string();

    // An unparseable schedule is accepted but flagged: the evaluator treats
    // it as hourly rather than refusing the write.
    let warning = cron::validate_cron(&schedule)
        .err()
        .map(|e| format!("{}; the scheduler will treat this agent as hourly", e));

    if let Err(e) = state
        .store
        .upsert_agent_config(&agent_type, &schedule, status, &params_json)
        .await
    {
        return Json(serde_json::json!({
            "success": false,
            "error": format!("Failed to write agent config: {}", e)
        }));
    }

    match warning {
        Some(w) => Json(serde_json::json!({
            "success": true,
            "message": "Agent config saved",
            "warning": w
        })),
        None => Json(serde_json::json!({
            "success": true,
            "message": "Agent config saved"
        })),
    }
}

pub async fn pause_agent_endpoint(
    Path(agent_type): Path<String>,
    State(state): State<AppState>,
) -> Json<serde_json::Value> {
    set_status(state, &agent_type, AgentStatus::Paused).await
}

pub async fn resume_agent_endpoint(
    Path(agent_type): Path<String>,
    State(state): State<AppState>,
) -> Json<serde_json::Value> {
    set_status(state, &agent_type, AgentStatus::Active).await
}

async fn set_status(
    state: AppState,
    agent_type: &str,
    status: AgentStatus,
) -> Json<serde_json::Value> {
    let agent_type = agent_type.trim().to_uppercase();
    match state.store.set_agent_status(&agent_type, status).await {
        Ok(true) => Json(serde_json::json!({
            "success": true,
            "message": format!("Agent {} is now {}", agent_type, status.as_str())
        })),
        Ok(false) => Json(serde_json::json!({
            "success": false,
            "error": "Agent not found"
        })),
        Err(e) => Json(serde_json::json!({
            "success": false,
            "error": format!("Database error: {}", e)
        })),
    }
}
