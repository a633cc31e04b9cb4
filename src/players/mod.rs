pub mod parse;
pub mod prompt;
pub mod remote;
pub mod roster;

pub use remote::Remote;
pub use roster::ModelSpec;
pub use roster::Roster;

use anyhow::Result;

/// what came back from one model invocation, before parsing
#[derive(Debug, Clone)]
pub struct Reply {
    pub text: String,
    pub tokens: u64,
    pub cost: f64,
    pub latency_ms: u64,
}

/// The only seam that performs network I/O. Implementations invoke
/// a remote model with a rendered table context and return its raw
/// reply; they never touch game state. Failures are simply returned:
/// the armed timeout collects the seat.
#[async_trait::async_trait]
pub trait ModelClient: Send + Sync {
    async fn decide(&self, model: &str, prompt: &str) -> Result<Reply>;
}
