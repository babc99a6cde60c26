//! Study plan requests and generation: model, validation, prompt, decoding, relay.

pub mod decode;
pub mod model;
pub mod prompt;
pub mod relay;
pub mod validate;

pub use decode::{DecodeError, decode_plan};
pub use model::{PlanRequest, RequestField, ScheduleEntry, StudyPlan, ValidatedRequest};
pub use prompt::{build_prompt, response_schema};
pub use relay::{GenerationError, PlanRelay};
pub use validate::{MissingFieldError, validate};
