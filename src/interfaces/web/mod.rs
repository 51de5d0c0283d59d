pub(crate) mod auth;
mod handlers;
mod router;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::core::lifecycle::LifecycleComponent;
use crate::core::scheduler::TickCoordinator;
use crate::core::store::AgentStore;
use crate::core::workers::WorkerRegistry;

/// HTTP surface of the scheduling core: the tick trigger for external cron,
/// the administrative config API, and read access to the run ledger.
pub struct ApiServer {
    store: Arc<AgentStore>,
    coordinator: Arc<TickCoordinator>,
    registry: Arc<WorkerRegistry>,
    api_host: String,
    api_port: u16,
    internal_token: String,
}

pub struct ApiServerConfig {
    pub store: Arc<AgentStore>,
    pub coordinator: Arc<TickCoordinator>,
    pub registry: Arc<WorkerRegistry>,
    pub api_host: String,
    pub api_port: u16,
    pub internal_token: String,
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) store: Arc<AgentStore>,
    pub(crate) coordinator: Arc<TickCoordinator>,
    pub(crate) registry: Arc<WorkerRegistry>,
    pub(crate) api_host: String,
    pub(crate) internal_token: String,
}

impl ApiServer {
    pub fn new(config: ApiServerConfig) -> Self {
        Self {
            store: config.store,
            coordinator: config.coordinator,
            registry: config.registry,
            api_host: config.api_host,
            api_port: config.api_port,
            internal_token: config.internal_token,
        }
    }
}

#[async_trait]
impl LifecycleComponent for ApiServer {
    async fn on_init(&mut self) -> Result<()> {
        info!("API Server Interface initializing...");
        Ok(())
    }

    async fn on_start(&mut self) -> Result<()> {
        let state = AppState {
            store: self.store.clone(),
            coordinator: self.coordinator.clone(),
            registry: self.registry.clone(),
            api_host: self.api_host.clone(),
            internal_token: self.internal_token.clone(),
        };
        let addr = format!("{}:{}", self.api_host, self.api_port);
        let api_port = self.api_port;

        tokio::spawn(async move {
            let app = router::build_api_router(state, api_port);
            match tokio::net::TcpListener::bind(&addr).await {
                Ok(listener) => {
                    info!("API Server running at http://{addr}");
                    if let Err(e) = axum::serve(listener, app).await {
                        tracing::error!("API Server crashed: {}", e);
                    }
                }
                Err(e) => {
                    tracing::error!("API Server failed to bind {}: {}", addr, e);
                }
            }
        });
        Ok(())
    }

    async fn on_shutdown(&mut self) -> Result<()> {
        info!("API Server Interface shutting down...");
        Ok(())
    }
}
