//! Generative-AI provider adapters.
//!
//! The relay talks to a provider only through the [`PlanProvider`] trait,
//! so tests can substitute a scripted double for the real Gemini client.
//!
//! ```text
//! PlanRelay
//!     |
//!     |   generate(prompt, schema)
//!     v
//! &dyn PlanProvider ---> GeminiProvider ---> POST {base_url}/models/{model}:generateContent
//!     |
//!     v
//! Result<String, ProviderError>   (raw text, decoded by the relay)
//! ```

pub mod config;
pub mod gemini;
pub mod trait_def;
pub mod types;

pub use config::ProviderConfig;
pub use gemini::GeminiProvider;
pub use trait_def::PlanProvider;
pub use types::ProviderError;
