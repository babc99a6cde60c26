use std::fmt;
use std::time::Duration;

/// Connection settings for a generative-AI provider.
///
/// Built once at startup and passed into the provider constructor.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Provider credential. Never logged.
    pub api_key: String,
    /// Model identifier, e.g. `gemini-2.5-flash`.
    pub model: String,
    /// API root without a trailing slash.
    pub base_url: String,
    /// Upper bound on a single provider call.
    pub timeout: Duration,
}

impl ProviderConfig {
    pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
    pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

    /// Build a config with the default model, base URL, and timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: Self::DEFAULT_MODEL.to_owned(),
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL of the `generateContent` endpoint for the configured model.
    pub fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
