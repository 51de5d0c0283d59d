mod http;

pub use http::WebhookWorker;

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// What a worker hands back on success: the result payload stored in the
/// run's output field, plus an optional role-specific review payload.
#[derive(Debug, Clone)]
pub struct WorkerOutput {
    pub output: serde_json::Value,
    pub review: Option<serde_json::Value>,
}

impl WorkerOutput {
    pub fn new(output: serde_json::Value) -> Self {
        Self {
            output,
            review: None,
        }
    }

    pub fn with_review(output: serde_json::Value, review: serde_json::Value) -> Self {
        Self {
            output,
            review: Some(review),
        }
    }
}

/// The capability an agent type resolves to. Implementations perform the
/// agent's actual work (content generation, prediction checking, ...) and
/// are registered once at process startup.
#[async_trait]
pub trait AgentWorker: Send + Sync {
    async fn run(&self, params: &serde_json::Value) -> Result<WorkerOutput>;
}

/// Maps agent-type identifiers to worker capabilities. Populated at startup,
/// read-only afterwards; an unregistered type is a configuration error the
/// caller logs and skips.
#[derive(Default)]
pub struct WorkerRegistry {
    workers: HashMap<String, Arc<dyn AgentWorker>>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, agent_type: impl Into<String>, worker: Arc<dyn AgentWorker>) {
        self.workers.insert(agent_type.into(), worker);
    }

    pub fn resolve(&self, agent_type: &str) -> Option<Arc<dyn AgentWorker>> {
        self.workers.get(agent_type).cloned()
    }

    pub fn is_registered(&self, agent_type: &str) -> bool {
        self.workers.contains_key(agent_type)
    }

    pub fn registered_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.workers.keys().cloned().collect();
        types.sort();
        types
    }
}
