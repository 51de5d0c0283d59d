use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use super::AppState;
use super::auth;
use super::handlers::{agents, runs, tick};

fn build_localhost_cors(api_port: u16) -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        format!("http://127.0.0.1:{}", api_port),
        format!("http://localhost:{}", api_port),
    ]
    .iter()
    .filter_map(|o| o.parse().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any)
}

pub fn build_api_router(state: AppState, api_port: u16) -> Router {
    Router::new()
        .route("/api/status", get(agents::status_endpoint))
        .route("/api/tick", get(tick::tick_endpoint))
        .route(
            "/api/agents",
            get(agents::get_agents_endpoint).post(agents::upsert_agent_endpoint),
        )
        .route(
            "/api/agents/{agent_type}/pause",
            post(agents::pause_agent_endpoint),
        )
        .route(
            "/api/agents/{agent_type}/resume",
            post(agents::resume_agent_endpoint),
        )
        .route(
            "/api/agents/{agent_type}/runs",
            get(runs::get_agent_runs_endpoint),
        )
        .route("/api/runs", get(runs::get_runs_endpoint))
        .route("/api/runs/{id}", get(runs::get_run_endpoint))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ))
        .layer(build_localhost_cors(api_port))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scheduler::TickCoordinator;
    use crate::core::store::test_store;
    use crate::core::store::types::AgentStatus;
    use crate::core::trigger::TriggerOrchestrator;
    use crate::core::workers::{AgentWorker, WorkerOutput, WorkerRegistry};
    use anyhow::Result;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::util::ServiceExt;

    struct EchoWorker;

    #[async_trait]
    impl AgentWorker for EchoWorker {
        async fn run(&self, params: &serde_json::Value) -> Result<WorkerOutput> {
            Ok(WorkerOutput::new(serde_json::json!({"params": params})))
        }
    }

    fn test_app() -> (Router, Arc<crate::core::store::AgentStore>) {
        let store = Arc::new(test_store());
        let mut registry = WorkerRegistry::new();
        registry.register("REPORTER", Arc::new(EchoWorker));
        let registry = Arc::new(registry);
        let coordinator = Arc::new(TickCoordinator::new(
            store.clone(),
            TriggerOrchestrator::new(store.clone(), registry.clone()),
        ));
        let state = AppState {
            store: store.clone(),
            coordinator,
            registry,
            api_host: "127.0.0.1".to_string(),
            internal_token: "internal-123".to_string(),
        };
        (build_api_router(state, 17990), store)
    }

    async fn get_json(app: Router, uri: &str) -> serde_json::Value {
        let response = app
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("oneshot should succeed");
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should read");
        serde_json::from_slice(&bytes).expect("body should be json")
    }

    async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> serde_json::Value {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request should build"),
            )
            .await
            .expect("oneshot should succeed");
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should read");
        serde_json::from_slice(&bytes).expect("body should be json")
    }

    #[tokio::test]
    async fn tick_endpoint_triggers_due_agents() {
        let (app, store) = test_app();
        store
            .upsert_agent_config("REPORTER", "* * * * *", AgentStatus::Active, "{}")
            .await
            .unwrap();

        let body = get_json(app, "/api/tick").await;
        assert_eq!(body["success"], true);
        assert_eq!(body["triggered"], 1);

        let runs = store.list_runs(Some("REPORTER"), 10).await.unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].status, "completed");
    }

    #[tokio::test]
    async fn upsert_then_list_round_trips() {
        let (app, _store) = test_app();
        let body = post_json(
            app.clone(),
            "/api/agents",
            serde_json::json!({
                "agent_type": "reporter",
                "schedule": "0 * * * *",
                "params": {"beat": "markets"}
            }),
        )
        .await;
        assert_eq!(body["success"], true);
        assert!(body.get("warning").is_none());

        let listing = get_json(app, "/api/agents").await;
        let agents = listing["agents"].as_array().unwrap();
        assert_eq!(agents.len(), 1);
        // Agent types are normalized to upper case on write.
        assert_eq!(agents[0]["agent_type"], "REPORTER");
        assert_eq!(agents[0]["registered"], true);
        assert_eq!(agents[0]["params"]["beat"], "markets");
    }

    #[tokio::test]
    async fn upsert_with_bad_cron_saves_with_warning() {
        let (app, store) = test_app();
        let body = post_json(
            app,
            "/api/agents",
            serde_json::json!({
                "agent_type": "REPORTER",
                "schedule": "whenever"
            }),
        )
        .await;
        assert_eq!(body["success"], true);
        assert!(
            body["warning"]
                .as_str()
                .unwrap()
                .contains("hourly")
        );
        assert!(store.get_agent_config("REPORTER").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn upsert_rejects_missing_fields() {
        let (app, _store) = test_app();
        let body = post_json(
            app,
            "/api/agents",
            serde_json::json!({"agent_type": "  ", "schedule": "* * * * *"}),
        )
        .await;
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn pause_endpoint_stops_future_triggers() {
        let (app, store) = test_app();
        store
            .upsert_agent_config("REPORTER", "* * * * *", AgentStatus::Active, "{}")
            .await
            .unwrap();

        let body = post_json(app.clone(), "/api/agents/REPORTER/pause", serde_json::json!({})).await;
        assert_eq!(body["success"], true);

        let tick = get_json(app, "/api/tick").await;
        assert_eq!(tick["triggered"], 0);
        assert!(store.list_runs(None, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn run_lookup_by_id_and_missing_run() {
        let (app, store) = test_app();
        let run = store.create_run("REPORTER").await.unwrap();

        let body = get_json(app.clone(), &format!("/api/runs/{}", run.id)).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["run"]["agent_type"], "REPORTER");
        assert_eq!(body["run"]["status"], "running");

        let missing = get_json(app, "/api/runs/999999").await;
        assert_eq!(missing["success"], false);
    }

    #[tokio::test]
    async fn runs_listing_filters_by_agent_query() {
        let (app, store) = test_app();
        store.create_run("REPORTER").await.unwrap();
        store.create_run("MARKETER").await.unwrap();

        let all = get_json(app.clone(), "/api/runs").await;
        assert_eq!(all["runs"].as_array().unwrap().len(), 2);

        let filtered = get_json(app, "/api/runs?agent=REPORTER").await;
        let runs = filtered["runs"].as_array().unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0]["agent_type"], "REPORTER");
    }
}
