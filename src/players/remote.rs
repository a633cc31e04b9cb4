use super::ModelClient;
use super::Reply;
use super::roster::Roster;
use anyhow::Result;
use anyhow::anyhow;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Body {
    text: String,
    #[serde(default)]
    tokens: u64,
    #[serde(default)]
    cost: f64,
}

/// production adapter: POSTs the rendered context to the model's
/// endpoint and returns the raw reply with usage accounting.
pub struct Remote {
    http: reqwest::Client,
    roster: Roster,
}

impl Remote {
    pub fn new(roster: Roster) -> Self {
        Self {
            http: reqwest::Client::new(),
            roster,
        }
    }
}

#[async_trait::async_trait]
impl ModelClient for Remote {
    async fn decide(&self, model: &str, prompt: &str) -> Result<Reply> {
        let endpoint = self
            .roster
            .endpoint(model)
            .ok_or_else(|| anyhow!("no endpoint for {}", model))?;
        let start = std::time::Instant::now();
        let body = self
            .http
            .post(endpoint)
            .json(&serde_json::json!({ "model": model, "prompt": prompt }))
            .send()
            .await?
            .error_for_status()?
            .json::<Body>()
            .await?;
        Ok(Reply {
            text: body.text,
            tokens: body.tokens,
            cost: body.cost,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}
