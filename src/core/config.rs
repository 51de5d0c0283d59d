use anyhow::Result;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

pub const DEFAULT_API_HOST: &str = "127.0.0.1";
pub const DEFAULT_API_PORT: u16 = 17990;

/// Workspace-level runtime config, read from `newsdesk.toml`. Every field is
/// optional; a missing file means defaults and an empty worker roster.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PlatformConfig {
    #[serde(default)]
    pub api: ApiConfig,

    /// Generation endpoints to register as webhook workers at startup.
    #[serde(default, rename = "worker")]
    pub workers: Vec<WorkerEndpoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerEndpoint {
    pub agent_type: String,
    pub endpoint: String,
}

fn default_host() -> String {
    DEFAULT_API_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_API_PORT
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl PlatformConfig {
    pub async fn load<P: AsRef<Path>>(workspace_dir: P) -> Result<Self> {
        let config_path = workspace_dir.as_ref().join("newsdesk.toml");
        if !config_path.exists() {
            info!("No newsdesk.toml found, using defaults with an empty worker roster.");
            return Ok(Self::default());
        }
        let content = tokio::fs::read_to_string(&config_path).await?;
        let config: PlatformConfig = toml::from_str(&content)?;
        info!(
            "Loaded newsdesk.toml: api={}:{}, {} worker endpoint(s)",
            config.api.host,
            config.api.port,
            config.workers.len()
        );
        Ok(config)
    }
}
