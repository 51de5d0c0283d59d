use anyhow::{Result, anyhow};
use async_trait::async_trait;

use super::{AgentWorker, WorkerOutput};

/// Production worker: delegates the agent's work to an external generation
/// service over HTTP. The service receives the agent type and its configured
/// params verbatim and answers with the result payload; a top-level `review`
/// key in the response is peeled off into the run's review field.
pub struct WebhookWorker {
    agent_type: String,
    endpoint: String,
    client: reqwest::Client,
}

impl WebhookWorker {
    pub fn new(agent_type: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            agent_type: agent_type.into(),
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl AgentWorker for WebhookWorker {
    async fn run(&self, params: &serde_json::Value) -> Result<WorkerOutput> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({
                "agent": self.agent_type,
                "params": params,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "generation endpoint {} returned {}: {}",
                self.endpoint,
                status,
                body
            ));
        }

        let body: serde_json::Value = response.json().await?;
        Ok(split_review(body))
    }
}

/// Split a top-level `review` key out of the service response, leaving the
/// rest as the run output.
fn split_review(mut body: serde_json::Value) -> WorkerOutput {
    let review = body
        .as_object_mut()
        .and_then(|map| map.remove("review"));
    match review {
        Some(review) => WorkerOutput::with_review(body, review),
        None => WorkerOutput::new(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_review_extracts_top_level_key() {
        let body = serde_json::json!({
            "article": "Fed holds rates",
            "review": {"score": 0.9}
        });
        let out = split_review(body);
        assert_eq!(out.output["article"], "Fed holds rates");
        assert!(out.output.get("review").is_none());
        assert_eq!(out.review.unwrap()["score"], 0.9);
    }

    #[test]
    fn split_review_passes_through_without_key() {
        let out = split_review(serde_json::json!({"article": "x"}));
        assert_eq!(out.output["article"], "x");
        assert!(out.review.is_none());
    }

    #[test]
    fn split_review_tolerates_non_object_bodies() {
        let out = split_review(serde_json::json!(["a", "b"]));
        assert_eq!(out.output, serde_json::json!(["a", "b"]));
        assert!(out.review.is_none());
    }
}
