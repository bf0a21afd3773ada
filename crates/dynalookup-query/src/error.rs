use serde::Serialize;
use thiserror::Error;

/// Fallback detail used when neither the caller nor the error supplies one
pub const UNEXPECTED_ERROR_DETAIL: &str = "Unexpected error encountered";

/// Unified error type for lookup operations
#[derive(Error, Debug)]
pub enum DataError {
    /// Malformed attribute spec or lookup options
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Client construction failed (credentials, region, endpoint)
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Statement execution failed in the data store
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A returned row could not be converted into a plain record
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DataError {
    /// Create an invalid configuration error
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        DataError::InvalidConfiguration(msg.into())
    }

    /// Create a query failed error
    pub fn query_failed(msg: impl Into<String>) -> Self {
        DataError::QueryFailed(msg.into())
    }

    /// Short name of the error variant
    pub fn kind(&self) -> &'static str {
        match self {
            DataError::InvalidConfiguration(_) => "InvalidConfiguration",
            DataError::ConnectionFailed(_) => "ConnectionFailed",
            DataError::QueryFailed(_) => "QueryFailed",
            DataError::SerializationError(_) => "SerializationError",
            DataError::Internal(_) => "Internal",
        }
    }

    /// Detail message carried by the error itself, if any
    pub fn detail(&self) -> Option<&str> {
        let msg = match self {
            DataError::InvalidConfiguration(msg)
            | DataError::ConnectionFailed(msg)
            | DataError::QueryFailed(msg)
            | DataError::SerializationError(msg)
            | DataError::Internal(msg) => msg.as_str(),
        };

        if msg.trim().is_empty() {
            None
        } else {
            Some(msg)
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;

/// Batch-level failure handed back to the caller of a lookup.
///
/// Serializes to a plain `{name, message, detail}` object so a host can
/// forward it without knowing about [`DataError`].
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{message}")]
pub struct LookupError {
    pub name: String,
    pub message: String,
    pub detail: String,
}

impl LookupError {
    /// Convert a [`DataError`] into its caller-facing shape.
    ///
    /// `detail` wins when given; otherwise the error's own detail is used,
    /// and [`UNEXPECTED_ERROR_DETAIL`] when it has none.
    pub fn from_data_error(err: &DataError, detail: Option<&str>) -> Self {
        let detail = detail
            .filter(|d| !d.trim().is_empty())
            .or_else(|| err.detail())
            .unwrap_or(UNEXPECTED_ERROR_DETAIL);

        Self {
            name: err.kind().to_string(),
            message: err.to_string(),
            detail: detail.to_string(),
        }
    }
}

impl From<DataError> for LookupError {
    fn from(err: DataError) -> Self {
        LookupError::from_data_error(&err, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_detail_wins() {
        let err = DataError::query_failed("ValidationException: bad statement");
        let lookup = LookupError::from_data_error(&err, Some("Error running PartiQL query"));

        assert_eq!(lookup.name, "QueryFailed");
        assert_eq!(lookup.message, "Query failed: ValidationException: bad statement");
        assert_eq!(lookup.detail, "Error running PartiQL query");
    }

    #[test]
    fn test_error_detail_used_without_explicit_detail() {
        let err = DataError::ConnectionFailed("no region".to_string());
        let lookup = LookupError::from(err);
        assert_eq!(lookup.detail, "no region");
    }

    #[test]
    fn test_fallback_detail() {
        let err = DataError::Internal(String::new());
        let lookup = LookupError::from_data_error(&err, Some("  "));
        assert_eq!(lookup.detail, UNEXPECTED_ERROR_DETAIL);
    }

    #[test]
    fn test_lookup_error_serializes_as_plain_object() {
        let lookup = LookupError::from_data_error(&DataError::query_failed("boom"), None);
        let json = serde_json::to_value(&lookup).unwrap();
        assert_eq!(json["name"], "QueryFailed");
        assert_eq!(json["detail"], "boom");
    }
}
