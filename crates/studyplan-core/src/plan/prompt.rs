//! Prompt and output-schema construction for plan generation.
//!
//! Pure logic: no I/O. The schema is the only thing constraining the
//! provider's output shape, so it is sent with every call.

use serde_json::{Value, json};

use super::model::ValidatedRequest;

// ---------------------------------------------------------------------------
// Prompt
// ---------------------------------------------------------------------------

const ROLE: &str =
    "You are an expert Academic Coach specializing in creating realistic, effective study plans.";

const INSTRUCTIONS: &str = "\
Create a detailed, day-by-day study plan that realistically fits the available time.
Each topic must be highly specific and actionable.
The schedule must be returned as a JSON object strictly following the provided schema.";

/// Build the instruction sent to the provider.
///
/// The three request fields are embedded verbatim. The same request always
/// produces the same prompt.
pub fn build_prompt(request: &ValidatedRequest) -> String {
    let mut prompt = String::with_capacity(512);

    prompt.push_str(ROLE);
    prompt.push_str("\n\n");
    prompt.push_str(&format!("Goal: {}\n", request.goal()));
    prompt.push_str(&format!("Total Duration: {}\n", request.duration()));
    prompt.push_str(&format!(
        "Available Time Slots/Days: {}\n\n",
        request.time_slots()
    ));
    prompt.push_str(INSTRUCTIONS);
    prompt.push('\n');

    prompt
}

// ---------------------------------------------------------------------------
// Output schema
// ---------------------------------------------------------------------------

/// The structured-output schema passed to the provider.
///
/// Uses the provider's OpenAPI-subset type names (`OBJECT`, `STRING`, ...).
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "planTitle": {
                "type": "STRING",
                "description": "A motivating title for the study plan."
            },
            "summary": {
                "type": "STRING",
                "description": "A brief, encouraging summary of the plan."
            },
            "schedule": {
                "type": "ARRAY",
                "description": "A list of daily schedule entries.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "day": {
                            "type": "STRING",
                            "description": "The day or date of the week (e.g., \"Monday\" or \"Day 1\")."
                        },
                        "topic": {
                            "type": "STRING",
                            "description": "The specific, actionable topic or task to study."
                        },
                        "duration": {
                            "type": "STRING",
                            "description": "The estimated time needed (e.g., \"90 minutes\")."
                        }
                    },
                    "required": ["day", "topic", "duration"]
                }
            }
        },
        "required": ["planTitle", "summary", "schedule"]
    })
}
