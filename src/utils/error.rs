use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("CSV file not found: {path}")]
    InputNotFound { path: String },

    #[error("Failed to read CSV stream: {message}")]
    StreamReadError { message: String },

    #[error("Processing cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

/// 對外公開的錯誤種類，HTTP 回應中以字串形式出現
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    NotFound,
    StreamReadError,
    Cancelled,
    BadRequest,
    Config,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ProcessError {
    pub fn stream(err: impl std::fmt::Display) -> Self {
        ProcessError::StreamReadError {
            message: err.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ProcessError::InputNotFound { .. } => ErrorKind::NotFound,
            ProcessError::StreamReadError { .. } | ProcessError::IoError(_) => {
                ErrorKind::StreamReadError
            }
            ProcessError::Cancelled => ErrorKind::Cancelled,
            ProcessError::BadRequest { .. } => ErrorKind::BadRequest,
            ProcessError::ConfigError { .. }
            | ProcessError::ConfigValidationError { .. }
            | ProcessError::InvalidConfigValueError { .. }
            | ProcessError::MissingConfigError { .. } => ErrorKind::Config,
            ProcessError::ProcessingError { .. } => ErrorKind::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.kind() {
            ErrorKind::Cancelled => ErrorSeverity::Low,
            ErrorKind::NotFound | ErrorKind::BadRequest => ErrorSeverity::Medium,
            ErrorKind::StreamReadError | ErrorKind::Config => ErrorSeverity::High,
            ErrorKind::Internal => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.kind() {
            ErrorKind::NotFound => "Check that the file path exists and is readable by the server",
            ErrorKind::StreamReadError => {
                "Verify the file is valid UTF-8 CSV and was not modified during processing, then resubmit"
            }
            ErrorKind::Cancelled => "Resubmit the request",
            ErrorKind::BadRequest => "Upload a file in the 'csvfile' field or send 'filePath' in the body",
            ErrorKind::Config => "Review the configuration file and command line flags",
            ErrorKind::Internal => "Check the server logs for details",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ProcessError::InputNotFound { .. } => "CSV file not found".to_string(),
            ProcessError::StreamReadError { .. } | ProcessError::IoError(_) => {
                "Failed to process CSV file".to_string()
            }
            ProcessError::BadRequest { message } => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProcessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let err = ProcessError::InputNotFound {
            path: "missing.csv".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.user_friendly_message(), "CSV file not found");

        let io = ProcessError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(io.kind(), ErrorKind::StreamReadError);
        assert_eq!(io.severity(), ErrorSeverity::High);

        assert_eq!(ProcessError::Cancelled.severity(), ErrorSeverity::Low);
    }

    #[test]
    fn test_kind_serializes_as_name() {
        let json = serde_json::to_string(&ErrorKind::StreamReadError).unwrap();
        assert_eq!(json, "\"StreamReadError\"");
    }
}
