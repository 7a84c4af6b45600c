use thiserror::Error;

/// Errors raised while talking to a FlexibleEngine service endpoint.
///
/// SECURITY: Error messages must NEVER contain the auth token.
#[derive(Debug, Error)]
pub enum SdkError {
    /// Token could not be turned into a request header
    #[error("authentication failed: {message}")]
    Auth { message: String },

    /// The addressed object does not exist (HTTP 404)
    #[error("resource not found: {url}")]
    NotFound { url: String },

    /// Service returned a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Network-level error (connection failed, timeout, etc.)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body did not match the expected shape
    #[error("decode error: {message}")]
    Decode { message: String },
}

impl SdkError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SdkError::NotFound { .. })
    }
}
