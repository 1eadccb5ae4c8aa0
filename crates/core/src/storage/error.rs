use thiserror::Error;

/// Error code reported by the store for request validation failures.
pub const VALIDATION_EXCEPTION: &str = "ValidationException";

/// Errors that can occur during table store operations.
///
/// An unmet write condition is not an error; see `WriteOutcome`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Anything the store rejected or failed to answer: validation, capacity,
    /// missing tables, transport failures. Not retried, not classified further.
    #[error("{operation} failed: {}", describe(.code, .message))]
    Service {
        operation: &'static str,
        code: Option<String>,
        message: String,
    },
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl StoreError {
    /// Creates a service error.
    pub fn service(
        operation: &'static str,
        code: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        StoreError::Service {
            operation,
            code: code.map(str::to_string),
            message: message.into(),
        }
    }

    /// Creates a service error carrying `ValidationException`.
    pub fn validation(operation: &'static str, message: impl Into<String>) -> Self {
        Self::service(operation, Some(VALIDATION_EXCEPTION), message)
    }

    /// The store's error code, when there is one.
    pub fn code(&self) -> Option<&str> {
        match self {
            StoreError::Service { code, .. } => code.as_deref(),
            StoreError::InvalidData(_) => None,
        }
    }
}

fn describe(code: &Option<String>, message: &str) -> String {
    match code {
        Some(code) => format!("{code}: {message}"),
        None => message.to_string(),
    }
}

/// Result type for table store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_display_with_code() {
        let error = StoreError::service(
            "CreateTable",
            Some("ResourceInUseException"),
            "Table already exists: Movies",
        );
        assert_eq!(
            error.to_string(),
            "CreateTable failed: ResourceInUseException: Table already exists: Movies"
        );
        assert_eq!(error.code(), Some("ResourceInUseException"));
    }

    #[test]
    fn test_service_error_display_without_code() {
        let error = StoreError::service("Scan", None, "dispatch failure: connection refused");
        assert_eq!(
            error.to_string(),
            "Scan failed: dispatch failure: connection refused"
        );
        assert_eq!(error.code(), None);
    }

    #[test]
    fn test_validation_error() {
        let error = StoreError::validation("PutItem", "missing key attribute 'title'");
        assert_eq!(error.code(), Some(VALIDATION_EXCEPTION));
        assert_eq!(
            error.to_string(),
            "PutItem failed: ValidationException: missing key attribute 'title'"
        );
    }

    #[test]
    fn test_invalid_data_display() {
        let error = StoreError::InvalidData("binary attributes are not supported".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid data: binary attributes are not supported"
        );
    }
}
