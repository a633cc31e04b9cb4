use anyhow::Context;
use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;

/// one model in the fixed lineup: its durable identity and the
/// endpoint its decisions are fetched from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    pub id: String,
    pub endpoint: String,
}

/// the fixed lineup seated in every autonomously created game
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    pub models: Vec<ModelSpec>,
}

impl Roster {
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read roster at {}", path.display()))?;
        serde_json::from_str(&text).context("parse roster")
    }

    pub fn ids(&self) -> Vec<String> {
        self.models.iter().map(|m| m.id.clone()).collect()
    }

    pub fn endpoint(&self, id: &str) -> Option<&str> {
        self.models
            .iter()
            .find(|m| m.id == id)
            .map(|m| m.endpoint.as_str())
    }
}
