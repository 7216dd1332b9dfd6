//! Error types shared by the search and upload flows.

use thiserror::Error;

pub type AlbumResult<T> = Result<T, AlbumError>;

#[derive(Debug, Error)]
pub enum AlbumError {
    /// Rejected locally before any request was made
    #[error("{0}")]
    Validation(String),

    /// Request did not complete, or completed with a non-success status
    #[error("network error: {0}")]
    Network(String),

    /// Response body was not in the expected shape
    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AlbumError {
    pub fn status(status: reqwest::StatusCode) -> Self {
        AlbumError::Network(format!("request failed with status: {}", status))
    }
}

impl From<reqwest::Error> for AlbumError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            AlbumError::Parse(e.to_string())
        } else {
            AlbumError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for AlbumError {
    fn from(e: serde_json::Error) -> Self {
        AlbumError::Parse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_is_shown_verbatim() {
        let err = AlbumError::Validation("Please select a file".to_string());
        assert_eq!(err.to_string(), "Please select a file");
    }

    #[test]
    fn test_json_error_maps_to_parse() {
        let err: AlbumError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, AlbumError::Parse(_)));
    }

    #[test]
    fn test_status_maps_to_network() {
        let err = AlbumError::status(reqwest::StatusCode::FORBIDDEN);
        assert!(matches!(err, AlbumError::Network(_)));
        assert!(err.to_string().contains("403"));
    }
}
