//! Plan request validation.
//!
//! Checks that `goal`, `duration`, and `timeSlots` are present and
//! non-empty. Runs before the relay so a rejected request never reaches
//! the provider.

use thiserror::Error;

use super::model::{PlanRequest, RequestField, ValidatedRequest};

/// One or more required request fields were absent or empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required inputs: {}", join_fields(.fields))]
pub struct MissingFieldError {
    /// Failing fields, in request order.
    pub fields: Vec<RequestField>,
}

impl MissingFieldError {
    pub fn contains(&self, field: RequestField) -> bool {
        self.fields.contains(&field)
    }
}

fn join_fields(fields: &[RequestField]) -> String {
    fields
        .iter()
        .map(|f| f.wire_name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Validate a raw request.
///
/// Whitespace-only values count as empty. On success the original values
/// are carried over untouched.
pub fn validate(request: &PlanRequest) -> Result<ValidatedRequest, MissingFieldError> {
    let mut missing = Vec::new();

    let goal = required(&request.goal, RequestField::Goal, &mut missing);
    let duration = required(&request.duration, RequestField::Duration, &mut missing);
    let time_slots = required(&request.time_slots, RequestField::TimeSlots, &mut missing);

    match (goal, duration, time_slots) {
        (Some(goal), Some(duration), Some(time_slots)) => Ok(ValidatedRequest {
            goal,
            duration,
            time_slots,
        }),
        _ => Err(MissingFieldError { fields: missing }),
    }
}

fn required(
    value: &Option<String>,
    field: RequestField,
    missing: &mut Vec<RequestField>,
) -> Option<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Some(v.clone()),
        _ => {
            missing.push(field);
            None
        }
    }
}
