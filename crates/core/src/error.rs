//! Error handling for the Agency Directory core library

use thiserror::Error;

/// Result type alias for process-level operations
pub type Result<T> = std::result::Result<T, DirectoryError>;

/// Process-level error type used by configuration, seeding and startup
#[derive(Error, Debug)]
pub enum DirectoryError {
    /// IO-related errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Generic errors
    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),

    /// Document store errors surfaced during startup
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Network connectivity errors
    #[error("Network error: {message}")]
    Network { message: String },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl DirectoryError {
    /// Create a network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Failures talking to the document store
///
/// Any of these aborts the in-flight request; nothing is cached.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Store could not be reached or answered with a server-side failure
    #[error("store unavailable: {message}")]
    Unavailable { message: String },

    /// Store call did not complete in time
    #[error("store call timed out: {operation}")]
    Timeout { operation: String },

    /// Store answered with a body that could not be decoded or validated
    #[error("malformed store response: {message}")]
    Malformed { message: String },

    /// Store refused the query itself
    #[error("store rejected query: {message}")]
    Rejected { message: String },
}

impl StoreError {
    /// Create an unavailable error
    pub fn unavailable<S: Into<String>>(message: S) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout<S: Into<String>>(operation: S) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    /// Create a malformed response error
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Create a rejected query error
    pub fn rejected<S: Into<String>>(message: S) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

/// Errors returned by the listing operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListingError {
    /// Page parameter is not an integer or is below 1
    #[error("Invalid page number")]
    InvalidPage,

    /// Page parameter is above the page ceiling
    #[error("Page number too high")]
    PageTooHigh,

    /// Store access failed while resolving the page
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ListingError {
    /// Whether this error was caused by caller input rather than the system
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidPage | Self::PageTooHigh)
    }
}

/// Errors returned by the single-record lookup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// No record carries the requested identifier
    #[error("agency not found: {id}")]
    NotFound { id: String },

    /// Store access failed during the lookup
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LookupError {
    /// Create a not found error
    pub fn not_found<S: Into<String>>(id: S) -> Self {
        Self::NotFound { id: id.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_error_messages_match_wire_text() {
        assert_eq!(ListingError::InvalidPage.to_string(), "Invalid page number");
        assert_eq!(ListingError::PageTooHigh.to_string(), "Page number too high");
    }

    #[test]
    fn test_listing_error_is_validation() {
        assert!(ListingError::InvalidPage.is_validation());
        assert!(ListingError::PageTooHigh.is_validation());
        assert!(!ListingError::Store(StoreError::unavailable("down")).is_validation());
    }

    #[test]
    fn test_store_error_is_transparent_in_listing_error() {
        let err: ListingError = StoreError::timeout("count").into();
        assert_eq!(err.to_string(), "store call timed out: count");
    }

    #[test]
    fn test_lookup_not_found() {
        let err = LookupError::not_found("abc");
        assert!(matches!(err, LookupError::NotFound { ref id } if id == "abc"));
    }

    #[test]
    fn test_directory_error_helpers() {
        let err = DirectoryError::validation("bad port");
        assert_eq!(err.to_string(), "Validation error: bad port");
        let err = DirectoryError::network("refused");
        assert_eq!(err.to_string(), "Network error: refused");
    }
}
