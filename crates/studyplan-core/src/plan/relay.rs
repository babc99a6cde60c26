//! The plan generation relay.
//!
//! Builds the prompt, makes one provider call with the output schema, and
//! decodes the answer. Holds no per-request state, so one instance can be
//! shared across concurrent requests.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};

use super::decode::{DecodeError, decode_plan};
use super::model::{StudyPlan, ValidatedRequest};
use super::prompt::{build_prompt, response_schema};
use crate::provider::{PlanProvider, ProviderError};

/// Failures surfaced by [`PlanRelay::generate_plan`].
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(#[from] ProviderError),

    #[error("provider returned malformed JSON: {0}")]
    MalformedResponse(#[source] serde_json::Error),

    #[error("provider returned an invalid plan structure: {0}")]
    InvalidPlanStructure(String),
}

impl From<DecodeError> for GenerationError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Malformed(e) => Self::MalformedResponse(e),
            DecodeError::InvalidStructure(msg) => Self::InvalidPlanStructure(msg),
        }
    }
}

/// Forwards validated requests to a [`PlanProvider`] and decodes the result.
#[derive(Clone)]
pub struct PlanRelay {
    provider: Arc<dyn PlanProvider>,
    schema: Value,
}

impl std::fmt::Debug for PlanRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanRelay")
            .field("provider", &self.provider.name())
            .finish()
    }
}

impl PlanRelay {
    pub fn new(provider: Arc<dyn PlanProvider>) -> Self {
        Self {
            provider,
            schema: response_schema(),
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Generate a study plan. Makes exactly one provider call; no retries.
    pub async fn generate_plan(
        &self,
        request: &ValidatedRequest,
    ) -> Result<StudyPlan, GenerationError> {
        let prompt = build_prompt(request);

        let raw = self
            .provider
            .generate(&prompt, &self.schema)
            .await
            .inspect_err(|e| {
                error!(provider = self.provider.name(), error = %e, "provider call failed");
            })?;

        let plan = decode_plan(&raw)
            .inspect_err(|e| {
                error!(provider = self.provider.name(), error = %e, "could not decode provider output");
            })?;

        info!(
            provider = self.provider.name(),
            entries = plan.schedule.len(),
            "study plan generated"
        );
        Ok(plan)
    }
}
