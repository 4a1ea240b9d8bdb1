use thiserror::Error;

/// Errors raised while talking to the model provider or preparing a request for it
#[derive(Error, Debug)]
pub enum KisanError {
    /// Required configuration (the API key) is missing or unreadable. Fatal at startup.
    #[error("Configuration Error: {0}")]
    Configuration(String),

    /// Input rejected locally; no network call was made.
    #[error("Validation Error: {0}")]
    Validation(String),

    /// Transport failure: connect, timeout, body read.
    #[error("Upstream Error: {0}")]
    Upstream(String),

    /// The provider answered with a non-success status (auth, quota, 5xx).
    #[error("HTTP Error: {status_code} - {message}")]
    HttpStatus { status_code: u16, message: String },

    /// The provider answered, but the payload does not match the declared shape.
    #[error("Malformed Response: {0}")]
    MalformedResponse(String),
}

impl KisanError {
    /// True for failures attributable to the remote provider or the network path to it.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream(_) | Self::HttpStatus { .. })
    }
}

impl From<reqwest::Error> for KisanError {
    fn from(e: reqwest::Error) -> Self {
        Self::Upstream(e.to_string())
    }
}

impl From<serde_json::Error> for KisanError {
    fn from(e: serde_json::Error) -> Self {
        Self::MalformedResponse(e.to_string())
    }
}

/// Result type for Kisan operations
pub type KisanResult<T> = Result<T, KisanError>;
