//! `studyplan generate` command: generate a plan in-process and print it.

use std::fmt::Write as _;

use anyhow::{Result, bail};
use studyplan_core::plan::{PlanRelay, PlanRequest, StudyPlan, validate};

use crate::serve_cmd::{GENERATION_FAILED_MESSAGE, GeneratePlanResponse};

/// Run the generate command.
///
/// Validation failures are reported before the provider is contacted.
pub async fn run_generate(relay: &PlanRelay, request: &PlanRequest, json: bool) -> Result<()> {
    let validated = validate(request)?;

    // The relay logs the underlying failure.
    let Ok(plan) = relay.generate_plan(&validated).await else {
        bail!(GENERATION_FAILED_MESSAGE);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&json_envelope(plan))?);
    } else {
        print!("{}", render_plan(&plan));
    }
    Ok(())
}

/// Wrap a plan in the same envelope the HTTP endpoint returns.
fn json_envelope(plan: StudyPlan) -> GeneratePlanResponse {
    GeneratePlanResponse {
        success: true,
        plan,
    }
}

/// Render a plan for the terminal: title, summary, then numbered entries.
pub fn render_plan(plan: &StudyPlan) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", plan.plan_title);
    let _ = writeln!(out, "{}", "=".repeat(plan.plan_title.chars().count()));
    let _ = writeln!(out, "{}", plan.summary);
    let _ = writeln!(out);

    if plan.schedule.is_empty() {
        let _ = writeln!(out, "No schedule entries.");
        return out;
    }

    let _ = writeln!(out, "Schedule:");
    let width = plan.schedule.len().to_string().len();
    for (i, entry) in plan.schedule.iter().enumerate() {
        let _ = writeln!(out, "  {:>width$}. {}", i + 1, entry.topic);
        let _ = writeln!(
            out,
            "  {:>width$}  {}: {}",
            "",
            entry.day,
            entry.duration
        );
    }

    out
}
