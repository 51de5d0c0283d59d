use axum::{Json, extract::State};

use super::super::AppState;

/// One scheduling tick, driven by an external cron hitting this endpoint.
/// Individual trigger outcomes land in the run ledger; the response only
/// summarizes what the tick did.
pub async fn tick_endpoint(State(state): State<AppState>) -> Json<serde_json::Value> {
    match state.coordinator.tick().await {
        Ok(summary) => Json(serde_json::json!({
            "success": true,
            "evaluated": summary.evaluated,
            "triggered": summary.triggered,
            "skipped_running": summary.skipped_running,
            "failed": summary.failed
        })),
        Err(e) => Json(serde_json::json!({
            "success": false,
            "error": format!("Tick failed: {}", e)
        })),
    }
}
