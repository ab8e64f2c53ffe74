use reqwest::StatusCode;
use thiserror::Error;

/// Custom error type for reverse geocoding, allow us to differentiate between errors even
/// though the display ends up the same.
///
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("HTTP error: {0}")]
    Http(StatusCode),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Can not decode response: {0}")]
    Decoding(String),
    #[error("No address found")]
    NoAddress,
}

/// Custom error type for the telemetry API.
///
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(StatusCode),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Can not decode response: {0}")]
    Decoding(String),
}
