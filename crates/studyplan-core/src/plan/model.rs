use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Raw plan request as submitted by a presentation layer.
///
/// Every field is optional on the wire so that a missing field can be
/// reported by the validator instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub time_slots: Option<String>,
}

impl PlanRequest {
    /// Build a request with all three fields set.
    pub fn new(
        goal: impl Into<String>,
        duration: impl Into<String>,
        time_slots: impl Into<String>,
    ) -> Self {
        Self {
            goal: Some(goal.into()),
            duration: Some(duration.into()),
            time_slots: Some(time_slots.into()),
        }
    }
}

/// A plan request whose fields are known to be non-empty.
///
/// Only [`super::validate::validate`] constructs this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub(crate) goal: String,
    pub(crate) duration: String,
    pub(crate) time_slots: String,
}

impl ValidatedRequest {
    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn duration(&self) -> &str {
        &self.duration
    }

    pub fn time_slots(&self) -> &str {
        &self.time_slots
    }
}

/// One of the three required request fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestField {
    Goal,
    Duration,
    TimeSlots,
}

impl RequestField {
    /// Field name as it appears on the wire.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Goal => "goal",
            Self::Duration => "duration",
            Self::TimeSlots => "timeSlots",
        }
    }
}

impl fmt::Display for RequestField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

// ---------------------------------------------------------------------------
// Plan types
// ---------------------------------------------------------------------------

/// A generated study plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlan {
    pub plan_title: String,
    pub summary: String,
    /// Entries in day order.
    pub schedule: Vec<ScheduleEntry>,
}

/// A single day's entry in a [`StudyPlan`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub day: String,
    pub topic: String,
    pub duration: String,
}
