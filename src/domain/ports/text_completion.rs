use async_trait::async_trait;

use crate::domain::errors::DomainResult;

/// A generative text backend, reduced to the one capability the core needs.
///
/// Callers must tolerate failure and non-JSON output: every consumer of this
/// port carries a deterministic fallback path.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(&self, prompt: &str) -> DomainResult<String>;
}
