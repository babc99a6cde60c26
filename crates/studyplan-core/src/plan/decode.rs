//! Decoder for provider output.
//!
//! The provider is asked for schema-conformant JSON, but its output is
//! still free text. This module parses it and checks the [`StudyPlan`]
//! shape field by field, reporting malformed JSON and a wrong shape as
//! distinct errors.

use serde_json::{Map, Value};
use thiserror::Error;

use super::model::{ScheduleEntry, StudyPlan};

/// Errors from decoding provider text into a [`StudyPlan`].
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("provider response is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("provider response does not match the plan structure: {0}")]
    InvalidStructure(String),
}

/// Parse and validate raw provider text.
pub fn decode_plan(raw: &str) -> Result<StudyPlan, DecodeError> {
    let value: Value = serde_json::from_str(raw.trim())?;

    let obj = match value {
        Value::Object(obj) => obj,
        other => {
            return Err(invalid(format!(
                "expected a JSON object, got {}",
                kind_of(&other)
            )));
        }
    };

    let schedule = match obj.get("schedule") {
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(invalid(format!(
                "`schedule` must be an array, got {}",
                kind_of(other)
            )));
        }
        None => return Err(invalid("missing `schedule`")),
    };

    let plan_title = required_str(&obj, "planTitle", "plan")?;
    let summary = required_str(&obj, "summary", "plan")?;

    let schedule = schedule
        .iter()
        .enumerate()
        .map(|(i, item)| decode_entry(i, item))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(StudyPlan {
        plan_title,
        summary,
        schedule,
    })
}

fn decode_entry(index: usize, item: &Value) -> Result<ScheduleEntry, DecodeError> {
    let Value::Object(obj) = item else {
        return Err(invalid(format!(
            "schedule[{index}] must be an object, got {}",
            kind_of(item)
        )));
    };
    let context = format!("schedule[{index}]");
    Ok(ScheduleEntry {
        day: required_str(obj, "day", &context)?,
        topic: required_str(obj, "topic", &context)?,
        duration: required_str(obj, "duration", &context)?,
    })
}

/// Fetch a non-blank string field.
fn required_str(obj: &Map<String, Value>, key: &str, context: &str) -> Result<String, DecodeError> {
    match obj.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => Err(invalid(format!("{context}: `{key}` is empty"))),
        Some(other) => Err(invalid(format!(
            "{context}: `{key}` must be a string, got {}",
            kind_of(other)
        ))),
        None => Err(invalid(format!("{context}: missing `{key}`"))),
    }
}

fn invalid(msg: impl Into<String>) -> DecodeError {
    DecodeError::InvalidStructure(msg.into())
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
