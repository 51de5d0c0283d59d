use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::core::store::AgentStore;
use crate::core::store::types::RunStatus;
use crate::core::workers::WorkerRegistry;

/// Drives a single agent run through its lifecycle: insert the RUNNING row,
/// invoke the registered worker, finalize exactly once. A worker failure is
/// captured into the run record and never escapes `trigger`; the caller
/// always gets a RunId back once the row exists.
pub struct TriggerOrchestrator {
    store: Arc<AgentStore>,
    registry: Arc<WorkerRegistry>,
}

impl TriggerOrchestrator {
    pub fn new(store: Arc<AgentStore>, registry: Arc<WorkerRegistry>) -> Self {
        Self { store, registry }
    }

    pub async fn trigger(&self, agent_type: &str, params: &serde_json::Value) -> Result<i64> {
        // The insert must land before the worker starts so callers can
        // observe the in-flight run. A storage failure here is the one error
        // that propagates: there is no run record to report into yet.
        let run = self.store.create_run(agent_type).await?;
        info!("Agent [{}] run {} started", agent_type, run.id);

        let Some(worker) = self.registry.resolve(agent_type) else {
            warn!(
                "Agent [{}] has no registered worker; failing run {}",
                agent_type, run.id
            );
            self.finalize(
                run.id,
                RunStatus::Failed,
                None,
                Some(&format!("agent not registered: {}", agent_type)),
                None,
            )
            .await;
            return Ok(run.id);
        };

        // Awaited to settlement; overlap control lives in the tick
        // coordinator's RUNNING-skip policy, not here.
        match worker.run(params).await {
            Ok(result) => {
                let output = result.output.to_string();
                let review = result.review.map(|r| r.to_string());
                self.finalize(
                    run.id,
                    RunStatus::Completed,
                    Some(&output),
                    None,
                    review.as_deref(),
                )
                .await;
                info!("Agent [{}] run {} completed", agent_type, run.id);
            }
            Err(e) => {
                error!("Agent [{}] run {} failed: {:#}", agent_type, run.id, e);
                let logs = format!("{:#}", e);
                self.finalize(run.id, RunStatus::Failed, None, Some(&logs), None)
                    .await;
            }
        }

        Ok(run.id)
    }

    /// Finalize with at most one retry on a storage error. After that the
    /// run stays RUNNING for manual reconciliation; retrying forever from
    /// inside a tick would be worse than a stuck row.
    async fn finalize(
        &self,
        run_id: i64,
        status: RunStatus,
        output: Option<&str>,
        logs: Option<&str>,
        review: Option<&str>,
    ) {
        for attempt in 1..=2 {
            match self
                .store
                .finalize_run(run_id, status, output, logs, review)
                .await
            {
                Ok(true) => return,
                Ok(false) => {
                    warn!("Run {} was already finalized; leaving it untouched", run_id);
                    return;
                }
                Err(e) if attempt == 1 => {
                    warn!("Finalizing run {} failed, retrying once: {}", run_id, e);
                }
                Err(e) => {
                    error!(
                        "Giving up on finalizing run {}; it remains RUNNING: {}",
                        run_id, e
                    );
                }
            }
        }
    }
}
