//! Unified error handling for the fridge assistant
//!
//! Every failure carries a stable code so users can report problems
//! precisely:
//! - F1XX: Network and API errors
//! - F2XX: File and I/O errors
//! - F3XX: Configuration errors
//! - F4XX: Validation and input errors
//! - F5XX: UI and interaction errors
//! - F9XX: Internal errors

use std::fmt;
use thiserror::Error;

/// Unified Result type for all fridge assistant operations
pub type Result<T> = std::result::Result<T, FridgeError>;

/// Error codes for fridge assistant operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Network (F1XX)
    /// F101: HTTP request failed
    HttpError,
    /// F102: Connection timeout
    ConnectionTimeout,
    /// F103: Connection refused
    ConnectionRefused,
    /// F104: Endpoint returned an error
    ApiError,
    /// F105: Response body could not be decoded
    InvalidResponse,

    // File/IO (F2XX)
    /// F201: File not found
    FileNotFound,
    /// F202: File read error
    FileReadError,
    /// F203: File write error
    FileWriteError,
    /// F204: Image could not be decoded or encoded
    ImageError,

    // Configuration (F3XX)
    /// F301: Configuration error
    ConfigError,
    /// F302: Invalid endpoint URL
    InvalidEndpoint,

    // Validation (F4XX)
    /// F401: Invalid input
    InvalidInput,
    /// F402: Validation failed
    ValidationFailed,

    // UI (F5XX)
    /// F501: Dialog error
    DialogError,

    // Internal (F9XX)
    /// F901: Internal error
    InternalError,
    /// F902: Serialization error
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code
    pub fn code(&self) -> u16 {
        match self {
            ErrorCode::HttpError => 101,
            ErrorCode::ConnectionTimeout => 102,
            ErrorCode::ConnectionRefused => 103,
            ErrorCode::ApiError => 104,
            ErrorCode::InvalidResponse => 105,

            ErrorCode::FileNotFound => 201,
            ErrorCode::FileReadError => 202,
            ErrorCode::FileWriteError => 203,
            ErrorCode::ImageError => 204,

            ErrorCode::ConfigError => 301,
            ErrorCode::InvalidEndpoint => 302,

            ErrorCode::InvalidInput => 401,
            ErrorCode::ValidationFailed => 402,

            ErrorCode::DialogError => 501,

            ErrorCode::InternalError => 901,
            ErrorCode::SerializationError => 902,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}", self.code())
    }
}

/// Main error type for all fridge assistant operations
#[derive(Error, Debug)]
pub enum FridgeError {
    // ==================== Network Errors (F1XX) ====================
    /// HTTP/Network error
    #[error("[{code}] Network error: {message}")]
    Network {
        code: ErrorCode,
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// API error with status code
    #[error("[{code}] API error ({status}): {message}")]
    Api {
        code: ErrorCode,
        status: u16,
        message: String,
    },

    // ==================== File/IO Errors (F2XX) ====================
    /// File or IO error
    #[error("[{code}] {context}: {message}")]
    Io {
        code: ErrorCode,
        context: String,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Image decoding/encoding error
    #[error("[{code}] Image error: {message}")]
    Image { code: ErrorCode, message: String },

    // ==================== Configuration Errors (F3XX) ====================
    /// Configuration error
    #[error("[{code}] Configuration error: {message}")]
    Config {
        code: ErrorCode,
        message: String,
        #[source]
        source: Option<config::ConfigError>,
    },

    // ==================== Validation Errors (F4XX) ====================
    /// Validation error
    #[error("[{code}] Validation error: {message}")]
    Validation {
        code: ErrorCode,
        message: String,
        field: Option<String>,
    },

    /// Invalid input error
    #[error("[{code}] Invalid input: {message}")]
    InvalidInput { code: ErrorCode, message: String },

    // ==================== UI Errors (F5XX) ====================
    /// UI/Dialog error
    #[error("[{code}] UI error: {message}")]
    Ui { code: ErrorCode, message: String },

    // ==================== Internal Errors (F9XX) ====================
    /// Internal/Unexpected error
    #[error("[{code}] Internal error: {message}")]
    Internal { code: ErrorCode, message: String },

    /// JSON serialization error
    #[error("[{code}] Serialization error: {message}")]
    Serialization {
        code: ErrorCode,
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },
}

// ==================== Constructor Methods ====================

impl FridgeError {
    // --- Network ---

    /// Create network error from message
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            code: ErrorCode::HttpError,
            message: message.into(),
            source: None,
        }
    }

    /// Create network error from reqwest error
    pub fn network_from_reqwest(err: reqwest::Error) -> Self {
        let code = if err.is_timeout() {
            ErrorCode::ConnectionTimeout
        } else if err.is_connect() {
            ErrorCode::ConnectionRefused
        } else {
            ErrorCode::HttpError
        };

        Self::Network {
            code,
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create API error
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            code: ErrorCode::ApiError,
            status,
            message: message.into(),
        }
    }

    /// Create invalid response error
    pub fn invalid_response(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            code: ErrorCode::InvalidResponse,
            status,
            message: message.into(),
        }
    }

    // --- File/IO ---

    /// Create IO error from std::io::Error
    pub fn io_from_error(context: impl Into<String>, err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::FileWriteError,
            _ => ErrorCode::FileReadError,
        };

        Self::Io {
            code,
            context: context.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create file not found error
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::Io {
            code: ErrorCode::FileNotFound,
            context: "File not found".to_string(),
            message: path.into(),
            source: None,
        }
    }

    /// Create image error
    pub fn image(message: impl Into<String>) -> Self {
        Self::Image {
            code: ErrorCode::ImageError,
            message: message.into(),
        }
    }

    // --- Configuration ---

    /// Create configuration error with source
    pub fn config_from_error(err: config::ConfigError) -> Self {
        Self::Config {
            code: ErrorCode::ConfigError,
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create invalid endpoint error
    pub fn invalid_endpoint(message: impl Into<String>) -> Self {
        Self::Config {
            code: ErrorCode::InvalidEndpoint,
            message: message.into(),
            source: None,
        }
    }

    // --- Validation ---

    /// Create validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            code: ErrorCode::ValidationFailed,
            message: message.into(),
            field: None,
        }
    }

    /// Create validation error with field
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            code: ErrorCode::ValidationFailed,
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            code: ErrorCode::InvalidInput,
            message: message.into(),
        }
    }

    // --- Internal ---

    /// Create internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            code: ErrorCode::InternalError,
            message: message.into(),
        }
    }

    /// Create serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            code: ErrorCode::SerializationError,
            message: message.into(),
            source: None,
        }
    }

    // --- Utility Methods ---

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Network { code, .. } => *code,
            Self::Api { code, .. } => *code,
            Self::Io { code, .. } => *code,
            Self::Image { code, .. } => *code,
            Self::Config { code, .. } => *code,
            Self::Validation { code, .. } => *code,
            Self::InvalidInput { code, .. } => *code,
            Self::Ui { code, .. } => *code,
            Self::Internal { code, .. } => *code,
            Self::Serialization { code, .. } => *code,
        }
    }

    /// Check if this is a transport-level failure
    pub fn is_network_error(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}

// ==================== From Implementations ====================

impl From<std::io::Error> for FridgeError {
    fn from(err: std::io::Error) -> Self {
        Self::io_from_error("IO operation", err)
    }
}

impl From<reqwest::Error> for FridgeError {
    fn from(err: reqwest::Error) -> Self {
        Self::network_from_reqwest(err)
    }
}

impl From<serde_json::Error> for FridgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            code: ErrorCode::SerializationError,
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<config::ConfigError> for FridgeError {
    fn from(err: config::ConfigError) -> Self {
        Self::config_from_error(err)
    }
}

impl From<dialoguer::Error> for FridgeError {
    fn from(err: dialoguer::Error) -> Self {
        Self::Ui {
            code: ErrorCode::DialogError,
            message: format!("Dialog error: {}", err),
        }
    }
}

impl From<image::ImageError> for FridgeError {
    fn from(err: image::ImageError) -> Self {
        Self::image(err.to_string())
    }
}

impl From<validator::ValidationErrors> for FridgeError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ErrorCode::HttpError.code(), 101);
        assert_eq!(ErrorCode::FileNotFound.code(), 201);
        assert_eq!(ErrorCode::ConfigError.code(), 301);
        assert_eq!(ErrorCode::InvalidInput.code(), 401);
    }

    #[test]
    fn test_error_code_string() {
        assert_eq!(ErrorCode::ApiError.to_string(), "F104");
        assert_eq!(ErrorCode::DialogError.to_string(), "F501");
    }

    #[test]
    fn test_error_display() {
        let err = FridgeError::api(500, "model not found");
        assert!(err.to_string().contains("F104"));
        assert!(err.to_string().contains("(500)"));
        assert!(err.to_string().contains("model not found"));
    }

    #[test]
    fn test_error_classification() {
        assert!(FridgeError::network("unreachable").is_network_error());

        let decode = FridgeError::from(serde_json::from_str::<u8>("x").unwrap_err());
        assert!(!decode.is_network_error());
        assert_eq!(decode.code(), ErrorCode::SerializationError);
    }

    #[test]
    fn test_io_error_code_mapping() {
        let err = FridgeError::io_from_error(
            "Image read",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert_eq!(err.code(), ErrorCode::FileNotFound);
    }
}
