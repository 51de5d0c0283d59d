use anyhow::Result;
use console::style;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::core::config::PlatformConfig;
use crate::core::lifecycle::LifecycleManager;
use crate::core::scheduler::TickCoordinator;
use crate::core::store::AgentStore;
use crate::core::terminal::GuideSection;
use crate::core::trigger::TriggerOrchestrator;
use crate::core::workers::{WebhookWorker, WorkerRegistry};
use crate::interfaces::web::{ApiServer, ApiServerConfig};

/// Wire the store, worker registry, coordinator and orchestrator together
/// from the workspace config. Shared by the daemon and the one-shot tick.
pub(crate) async fn build_core(
    workspace_dir: &Path,
    config: &PlatformConfig,
) -> Result<(Arc<AgentStore>, Arc<WorkerRegistry>, Arc<TickCoordinator>)> {
    let store = Arc::new(AgentStore::new(workspace_dir).await?);
    let seeded = store.seed_default_agents().await?;
    if seeded > 0 {
        info!("Seeded {} default agent config(s)", seeded);
    }

    let mut registry = WorkerRegistry::new();
    for worker in &config.workers {
        let agent_type = worker.agent_type.trim().to_uppercase();
        info!(
            "Registering webhook worker [{}] -> {}",
            agent_type, worker.endpoint
        );
        registry.register(
            agent_type.clone(),
            Arc::new(WebhookWorker::new(agent_type, worker.endpoint.clone())),
        );
    }
    let registry = Arc::new(registry);

    let coordinator = Arc::new(TickCoordinator::new(
        store.clone(),
        TriggerOrchestrator::new(store.clone(), registry.clone()),
    ));

    Ok((store, registry, coordinator))
}

pub async fn run_serve(
    workspace_dir: &Path,
    api_host: Option<String>,
    api_port: Option<u16>,
) -> Result<()> {
    let config = PlatformConfig::load(workspace_dir).await?;
    let api_host = api_host.unwrap_or_else(|| config.api.host.clone());
    let api_port = api_port.unwrap_or(config.api.port);

    let (store, registry, coordinator) = build_core(workspace_dir, &config).await?;
    let internal_token = uuid::Uuid::new_v4().to_string();

    let mut lifecycle = LifecycleManager::new().await?;

    // In-process tick driver: fires at second 0 of every minute. External
    // cron can hit GET /api/tick instead; the RUNNING-skip policy makes the
    // two drivers safe to run side by side.
    let tick_coordinator = coordinator.clone();
    let tick_job =
        tokio_cron_scheduler::Job::new_async("0 * * * * *", move |_uuid, mut _l| {
            let coordinator = tick_coordinator.clone();
            Box::pin(async move {
                if let Err(e) = coordinator.tick().await {
                    error!("Scheduled tick failed: {:#}", e);
                }
            })
        })?;
    lifecycle.scheduler.add(tick_job).await?;

    let api = ApiServer::new(ApiServerConfig {
        store: store.clone(),
        coordinator,
        registry,
        api_host: api_host.clone(),
        api_port,
        internal_token,
    });
    lifecycle.attach(Arc::new(Mutex::new(api)));

    lifecycle.start().await?;

    GuideSection::new("Newsdesk Daemon")
        .status("Status", &style("RUNNING").green().bold().to_string())
        .status("API Endpoint", &format!("http://{}:{}", api_host, api_port))
        .status("Workspace", &store.workspace_dir().display().to_string())
        .blank()
        .info("Agents tick once a minute. Press Ctrl+C to stop.")
        .print();
    println!();

    tokio::signal::ctrl_c().await?;
    lifecycle.shutdown().await?;
    Ok(())
}
