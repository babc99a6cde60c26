use std::time::Duration;

use thiserror::Error;

/// Maximum number of bytes of an error body kept in [`ProviderError::Status`].
pub const MAX_ERROR_BODY_BYTES: usize = 512;

/// Failures talking to a provider.
///
/// All of these are "provider unavailable" from the caller's point of view.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Transport(String),

    #[error("provider did not respond within {0:?}")]
    Timeout(Duration),

    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("provider returned no candidate text")]
    EmptyResponse,

    #[error("could not read provider response envelope: {0}")]
    Decode(String),
}

impl ProviderError {
    /// Build a [`ProviderError::Status`], truncating the body.
    pub fn status(status: u16, body: &str) -> Self {
        Self::Status {
            status,
            body: truncate(body, MAX_ERROR_BODY_BYTES),
        }
    }
}

/// Truncate `s` to at most `max` bytes on a char boundary.
fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_keeps_short_body() {
        let err = ProviderError::status(403, "API key not valid");
        assert_eq!(err.to_string(), "provider returned HTTP 403: API key not valid");
    }

    #[test]
    fn status_truncates_long_body() {
        let body = "x".repeat(MAX_ERROR_BODY_BYTES * 2);
        match ProviderError::status(500, &body) {
            ProviderError::Status { body, .. } => {
                assert_eq!(body.len(), MAX_ERROR_BODY_BYTES + 3);
                assert!(body.ends_with("..."));
            }
            other => panic!("expected Status, got: {other}"),
        }
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "é".repeat(10);
        let t = truncate(&s, 5);
        assert!(t.starts_with("éé"));
        assert!(t.ends_with("..."));
    }
}
