use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned status {status} for {url}")]
    ApiStatusError { status: u16, url: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Io,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl DirectoryError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DirectoryError::ApiError(_) | DirectoryError::ApiStatusError { .. } => {
                ErrorCategory::Network
            }
            DirectoryError::CsvError(_)
            | DirectoryError::SerializationError(_)
            | DirectoryError::ProcessingError { .. } => ErrorCategory::Data,
            DirectoryError::ZipError(_) | DirectoryError::IoError(_) => ErrorCategory::Io,
            DirectoryError::ConfigValidationError { .. }
            | DirectoryError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // Transient: a retry may succeed.
            DirectoryError::ApiError(_) => ErrorSeverity::Medium,
            DirectoryError::ApiStatusError { status, .. } if *status >= 500 => {
                ErrorSeverity::Medium
            }
            DirectoryError::ApiStatusError { .. } => ErrorSeverity::High,
            DirectoryError::CsvError(_)
            | DirectoryError::SerializationError(_)
            | DirectoryError::ProcessingError { .. } => ErrorSeverity::High,
            DirectoryError::ConfigValidationError { .. }
            | DirectoryError::InvalidConfigValueError { .. } => ErrorSeverity::High,
            DirectoryError::ZipError(_) | DirectoryError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            DirectoryError::ApiError(_) => {
                "Check network connectivity and that the source endpoint is reachable".to_string()
            }
            DirectoryError::ApiStatusError { status, url } => format!(
                "The endpoint {} answered {}; check the URL and any required headers",
                url, status
            ),
            DirectoryError::CsvError(_) => {
                "Make sure the CSV file has a header row and consistent column counts".to_string()
            }
            DirectoryError::SerializationError(_) => {
                "Make sure the source returns a JSON array of records".to_string()
            }
            DirectoryError::ProcessingError { .. } => {
                "Inspect the source data; run with --verbose for details".to_string()
            }
            DirectoryError::ConfigValidationError { field, .. }
            | DirectoryError::InvalidConfigValueError { field, .. } => {
                format!("Fix the '{}' setting and try again", field)
            }
            DirectoryError::ZipError(_) | DirectoryError::IoError(_) => {
                "Check that the output directory exists and is writable".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not fetch records: {}", self),
            ErrorCategory::Data => format!("Could not process records: {}", self),
            ErrorCategory::Io => format!("Could not read or write files: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, DirectoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = DirectoryError::ConfigValidationError {
            field: "source.cities".to_string(),
            message: "empty".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.exit_code(), 1);
        assert!(err.recovery_suggestion().contains("source.cities"));
    }

    #[test]
    fn test_server_errors_are_retryable() {
        let err = DirectoryError::ApiStatusError {
            status: 503,
            url: "http://localhost/cities".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.exit_code(), 2);

        let not_found = DirectoryError::ApiStatusError {
            status: 404,
            url: "http://localhost/cities".to_string(),
        };
        assert_eq!(not_found.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_io_errors_are_critical() {
        let err = DirectoryError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(err.exit_code(), 3);
        assert!(err.user_friendly_message().starts_with("Could not read or write files"));
    }
}
