//! Error types for OWS services.

use thiserror::Error;

/// Result type alias using OwsError.
pub type OwsResult<T> = Result<T, OwsError>;

/// Primary error type for OWS dispatching and encoding.
#[derive(Debug, Error)]
pub enum OwsError {
    // === Registry Errors ===
    #[error("No handler registered for {service}/{}/{operation}", .version.as_deref().unwrap_or("*"))]
    UnknownCapability {
        service: String,
        version: Option<String>,
        operation: String,
    },

    #[error("Capability already registered: {0}")]
    DuplicateCapability(String),

    // === Request Errors ===
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Version {version} is not supported by service {service}")]
    UnsupportedVersion { service: String, version: String },

    #[error("Operation not supported: {0}")]
    OperationNotFound(String),

    #[error("No such coverage: {0}")]
    NoSuchCoverage(String),

    // === Encoding Errors ===
    #[error("Requested format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Search context is not encodable: {0}")]
    UnsupportedContext(String),

    #[error("Malformed result item: {0}")]
    MalformedItem(String),

    // === Contract Errors ===
    #[error("Handler returned an invalid result shape: {0}")]
    InvalidResultShape(String),

    // === Infrastructure Errors ===
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl OwsError {
    /// Get the OWS exception code for this error.
    pub fn exception_code(&self) -> &'static str {
        match self {
            OwsError::UnknownCapability { .. } | OwsError::OperationNotFound(_) => {
                "OperationNotSupported"
            }
            OwsError::MissingParameter(_) => "MissingParameterValue",
            OwsError::InvalidParameter { .. } => "InvalidParameterValue",
            OwsError::UnsupportedVersion { .. } => "VersionNegotiationFailed",
            OwsError::NoSuchCoverage(_) => "NoSuchCoverage",
            OwsError::UnsupportedFormat(_) => "InvalidFormat",
            _ => "NoApplicableCode",
        }
    }

    /// The request parameter (or value) implicated by this error, if any.
    pub fn locator(&self) -> Option<&str> {
        match self {
            OwsError::UnknownCapability { operation, .. } => Some(operation.as_str()),
            OwsError::OperationNotFound(operation) => Some(operation.as_str()),
            OwsError::MissingParameter(param) => Some(param.as_str()),
            OwsError::InvalidParameter { param, .. } => Some(param.as_str()),
            OwsError::UnsupportedVersion { .. } => Some("version"),
            OwsError::NoSuchCoverage(id) => Some(id.as_str()),
            OwsError::UnsupportedFormat(_) => Some("format"),
            _ => None,
        }
    }

    /// Whether this error is unclassified. Its message must not reach clients.
    pub fn is_internal(&self) -> bool {
        self.exception_code() == "NoApplicableCode"
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            OwsError::NoSuchCoverage(_) => 404,

            OwsError::DuplicateCapability(_)
            | OwsError::UnsupportedContext(_)
            | OwsError::MalformedItem(_)
            | OwsError::InvalidResultShape(_)
            | OwsError::InternalError(_) => 500,

            _ => 400,
        }
    }
}

// Conversion from common error types
impl From<std::io::Error> for OwsError {
    fn from(err: std::io::Error) -> Self {
        OwsError::InternalError(err.to_string())
    }
}

impl From<serde_json::Error> for OwsError {
    fn from(err: serde_json::Error) -> Self {
        OwsError::InternalError(format!("JSON error: {}", err))
    }
}
