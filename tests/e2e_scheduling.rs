//! End-to-end: spawn the daemon against a mock generation service, drive a
//! tick over HTTP, and read the finalized run back from the ledger API.

use axum::{Json, Router, routing::post};
use serde_json::{Value, json};
use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

type TestResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

fn find_free_port() -> TestResult<u16> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

/// Stand-in for the external generation service the webhook worker calls.
async fn spawn_mock_generator() -> TestResult<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = Router::new().route(
        "/generate",
        post(|Json(body): Json<Value>| async move {
            Json(json!({
                "article": "Markets rally on rate cut hopes",
                "agent": body["agent"],
                "review": {"score": 0.9}
            }))
        }),
    );
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{}/generate", addr))
}

struct DaemonHarness {
    child: Child,
    pub api_base: String,
    workspace: PathBuf,
}

impl DaemonHarness {
    async fn spawn(generator_url: &str) -> TestResult<Self> {
        let api_port = find_free_port()?;
        let workspace =
            std::env::temp_dir().join(format!("newsdesk-e2e-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&workspace)?;
        std::fs::write(
            workspace.join("newsdesk.toml"),
            format!(
                "[[worker]]\nagent_type = \"REPORTER\"\nendpoint = \"{}\"\n",
                generator_url
            ),
        )?;

        let child = Command::new(env!("CARGO_BIN_EXE_newsdesk"))
            .arg("serve")
            .arg("--workspace")
            .arg(&workspace)
            .arg("--api-host")
            .arg("127.0.0.1")
            .arg("--api-port")
            .arg(api_port.to_string())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        let harness = Self {
            child,
            api_base: format!("http://127.0.0.1:{}/api", api_port),
            workspace,
        };
        harness.wait_until_ready().await?;
        Ok(harness)
    }

    async fn wait_until_ready(&self) -> TestResult<()> {
        let client = reqwest::Client::new();
        for _ in 0..100 {
            if let Ok(resp) = client.get(format!("{}/status", self.api_base)).send().await
                && resp.status().is_success()
            {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        Err("daemon did not become ready within 10s".into())
    }

    async fn get(&self, path: &str) -> TestResult<Value> {
        let resp = reqwest::get(format!("{}{}", self.api_base, path)).await?;
        Ok(resp.json().await?)
    }

    async fn post(&self, path: &str, body: Value) -> TestResult<Value> {
        let client = reqwest::Client::new();
        let resp = client
            .post(format!("{}{}", self.api_base, path))
            .json(&body)
            .send()
            .await?;
        Ok(resp.json().await?)
    }

    /// Newest run for the agent once it reaches a terminal status.
    async fn wait_for_terminal_run(&self, agent_type: &str) -> TestResult<Value> {
        for _ in 0..50 {
            let runs = self.get(&format!("/runs?agent={}", agent_type)).await?;
            if let Some(run) = runs["runs"].as_array().and_then(|r| r.first())
                && run["status"] != "running"
            {
                return Ok(run.clone());
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        Err(format!("no terminal run for {} within 5s", agent_type).into())
    }
}

impl Drop for DaemonHarness {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = std::fs::remove_dir_all(&self.workspace);
    }
}

#[tokio::test]
async fn tick_produces_a_finalized_run_from_the_generation_service() -> TestResult<()> {
    let generator_url = spawn_mock_generator().await?;
    let harness = DaemonHarness::spawn(&generator_url).await?;

    // The seeded REPORTER is hourly; make it due every minute for the test.
    let saved = harness
        .post(
            "/agents",
            json!({
                "agent_type": "REPORTER",
                "schedule": "* * * * *",
                "params": {"beat": "markets"}
            }),
        )
        .await?;
    assert_eq!(saved["success"], true);

    let tick = harness.get("/tick").await?;
    assert_eq!(tick["success"], true);

    // Either our tick or the daemon's own minute ticker fired the agent;
    // both await worker settlement, so a terminal run shows up promptly.
    let run = harness.wait_for_terminal_run("REPORTER").await?;
    assert_eq!(run["status"], "completed");
    assert_eq!(run["output"]["article"], "Markets rally on rate cut hopes");
    assert_eq!(run["output"]["agent"], "REPORTER");
    assert_eq!(run["review"]["score"], 0.9);
    assert!(run["finished_at"].as_str().unwrap() >= run["started_at"].as_str().unwrap());

    let by_id = harness
        .get(&format!("/runs/{}", run["id"].as_i64().unwrap()))
        .await?;
    assert_eq!(by_id["success"], true);
    assert_eq!(by_id["run"]["status"], "completed");

    Ok(())
}

#[tokio::test]
async fn unregistered_agent_records_a_failed_run() -> TestResult<()> {
    let generator_url = spawn_mock_generator().await?;
    let harness = DaemonHarness::spawn(&generator_url).await?;

    let saved = harness
        .post(
            "/agents",
            json!({
                "agent_type": "COLUMNIST",
                "schedule": "* * * * *"
            }),
        )
        .await?;
    assert_eq!(saved["success"], true);

    let tick = harness.get("/tick").await?;
    assert_eq!(tick["success"], true);

    let run = harness.wait_for_terminal_run("COLUMNIST").await?;
    assert_eq!(run["status"], "failed");
    assert!(
        run["logs"]
            .as_str()
            .unwrap()
            .contains("agent not registered")
    );

    Ok(())
}
