pub mod cron;

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::core::store::AgentStore;
use crate::core::store::types::AgentConfigRecord;
use crate::core::trigger::TriggerOrchestrator;

/// What one tick did, for the tick endpoint and the daemon log.
#[derive(Debug, Default, Clone, Copy, serde::Serialize)]
pub struct TickSummary {
    pub evaluated: usize,
    pub triggered: usize,
    pub skipped_running: usize,
    pub failed: usize,
}

/// Periodic driver: reads the active agent roster, asks the schedule
/// evaluator which agents are due, and fires each one through the trigger
/// orchestrator. One agent's failure never aborts the rest of the tick.
pub struct TickCoordinator {
    store: Arc<AgentStore>,
    orchestrator: TriggerOrchestrator,
}

impl TickCoordinator {
    pub fn new(store: Arc<AgentStore>, orchestrator: TriggerOrchestrator) -> Self {
        Self {
            store,
            orchestrator,
        }
    }

    pub async fn tick(&self) -> Result<TickSummary> {
        self.tick_at(Utc::now()).await
    }

    pub(crate) async fn tick_at(&self, now: DateTime<Utc>) -> Result<TickSummary> {
        // Hot-read on every tick: administrative edits apply immediately.
        let configs = self.store.get_active_agent_configs().await?;
        debug!("Tick: evaluating {} active agents", configs.len());

        let mut summary = TickSummary::default();
        for config in configs {
            summary.evaluated += 1;
            if let Err(e) = self.process_agent(&config, now, &mut summary).await {
                summary.failed += 1;
                error!("Tick: agent [{}] errored: {:#}", config.agent_type, e);
            }
        }

        if summary.triggered > 0 || summary.failed > 0 {
            info!(
                "Tick: {} evaluated, {} triggered, {} skipped (running), {} failed",
                summary.evaluated, summary.triggered, summary.skipped_running, summary.failed
            );
        }
        Ok(summary)
    }

    async fn process_agent(
        &self,
        config: &AgentConfigRecord,
        now: DateTime<Utc>,
        summary: &mut TickSummary,
    ) -> Result<()> {
        let last_run_start = self
            .store
            .latest_run_started_at(&config.agent_type)
            .await?
            .and_then(|raw| match DateTime::parse_from_rfc3339(&raw) {
                Ok(t) => Some(t.with_timezone(&Utc)),
                Err(e) => {
                    warn!(
                        "Agent [{}] has unparseable last run start '{}': {}",
                        config.agent_type, raw, e
                    );
                    None
                }
            });

        if !cron::is_due(&config.schedule, now, last_run_start) {
            return Ok(());
        }

        // At most one concurrent run per agent type: a slow agent is skipped
        // on successive ticks until its run finalizes.
        if self.store.has_running_run(&config.agent_type).await? {
            debug!(
                "Agent [{}] is due but already has a RUNNING run; skipping",
                config.agent_type
            );
            summary.skipped_running += 1;
            return Ok(());
        }

        let params = match serde_json::from_str(&config.params_json) {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    "Agent [{}] has malformed params_json, using empty params: {}",
                    config.agent_type, e
                );
                serde_json::json!({})
            }
        };

        self.orchestrator.trigger(&config.agent_type, &params).await?;
        summary.triggered += 1;
        Ok(())
    }
}
