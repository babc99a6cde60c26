//! The `PlanProvider` trait: the adapter interface for generative-AI services.

use async_trait::async_trait;
use serde_json::Value;

use super::types::ProviderError;

/// A generative-AI service that turns an instruction plus an output schema
/// into text constrained to that schema.
///
/// Object-safe so the relay can hold it as `Arc<dyn PlanProvider>`.
#[async_trait]
pub trait PlanProvider: Send + Sync {
    /// Human-readable name for logs (e.g. "gemini").
    fn name(&self) -> &str;

    /// Send one instruction and return the provider's raw text.
    ///
    /// Implementations make exactly one upstream call and never retry.
    async fn generate(&self, prompt: &str, schema: &Value) -> Result<String, ProviderError>;
}

// Compile-time assertion: PlanProvider must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn PlanProvider) {}
};
