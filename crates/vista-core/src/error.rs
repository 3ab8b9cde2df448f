//! Error types for Vista Core

use thiserror::Error;

/// Result type alias for player operations
pub type Result<T> = std::result::Result<T, Error>;

/// Player error types
#[derive(Error, Debug)]
pub enum Error {
    // Scene source errors
    #[error("Failed to load scene source: {0}")]
    SourceLoad(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid scene source URL: {0}")]
    Url(#[from] url::ParseError),

    #[cfg(feature = "fetch")]
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    // Navigation errors
    #[error("Player has no scenes loaded")]
    NotInitialized,

    #[error("Scene {id} out of range (scene count {count})")]
    SceneOutOfRange { id: usize, count: usize },

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Create a scene source error
    pub fn source_load(msg: impl Into<String>) -> Self {
        Error::SourceLoad(msg.into())
    }

    /// Create a configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Error::InvalidConfig(msg.into())
    }

    /// Returns true if retrying the failed operation can succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::SourceLoad(_) | Error::NotInitialized => true,
            #[cfg(feature = "fetch")]
            Error::Http(_) => true,
            _ => false,
        }
    }

    /// Returns the error code reported to the host page
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::SourceLoad(_) => "SOURCE_LOAD",
            Error::Json(_) => "JSON",
            Error::Url(_) => "SOURCE_URL",
            #[cfg(feature = "fetch")]
            Error::Http(_) => "NETWORK",
            Error::NotInitialized => "NOT_INITIALIZED",
            Error::SceneOutOfRange { .. } => "SCENE_OUT_OF_RANGE",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::NotInitialized.error_code(), "NOT_INITIALIZED");
        assert_eq!(
            Error::SceneOutOfRange { id: 4, count: 3 }.error_code(),
            "SCENE_OUT_OF_RANGE"
        );
        assert_eq!(Error::source_load("boom").error_code(), "SOURCE_LOAD");
    }

    #[test]
    fn test_recoverable() {
        assert!(Error::source_load("timeout").is_recoverable());
        assert!(!Error::invalid_config("missing container").is_recoverable());
        assert!(!Error::SceneOutOfRange { id: 9, count: 2 }.is_recoverable());
    }

    #[test]
    fn test_display() {
        let err = Error::SceneOutOfRange { id: 5, count: 3 };
        assert_eq!(err.to_string(), "Scene 5 out of range (scene count 3)");
    }
}
