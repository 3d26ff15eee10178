use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Response error: {0}")]
    ResponseError(String),
    #[error("Runtime error: {0}")]
    RuntimeError(String),
    #[error("Runtime unavailable: {0}")]
    RuntimeUnavailable(String),
}

impl GatewayError {
    /// True when the caller sent something unusable rather than the runtime failing.
    pub fn is_client_error(&self) -> bool {
        matches!(self, GatewayError::ValidationError(_))
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
