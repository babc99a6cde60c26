//! Core library for the study plan relay.
//!
//! - [`plan`]: request/plan data model, validation, prompt construction,
//!   response decoding, and the [`plan::PlanRelay`] that ties them together.
//! - [`provider`]: the [`provider::PlanProvider`] adapter trait and the
//!   Gemini implementation.

pub mod plan;
pub mod provider;
