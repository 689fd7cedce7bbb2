use thiserror::Error;

#[derive(Error, Debug)]
pub enum VenueError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV export error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Archive error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("{provider} API returned {status}: {message}")]
    ProviderError {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("{provider} API rate limit exceeded")]
    RateLimited { provider: String },

    #[error("Malformed model output: {message}")]
    MalformedResponse { message: String },

    #[error("Processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Provider,
    Configuration,
    Validation,
    Data,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit status for a run that ends with an error of this severity.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl VenueError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            VenueError::HttpError(_) => ErrorCategory::Network,
            VenueError::ProviderError { .. } | VenueError::RateLimited { .. } => {
                ErrorCategory::Provider
            }
            VenueError::ConfigValidationError { .. }
            | VenueError::InvalidConfigValueError { .. }
            | VenueError::MissingConfigError { .. } => ErrorCategory::Configuration,
            VenueError::ValidationError { .. } => ErrorCategory::Validation,
            VenueError::SerializationError(_)
            | VenueError::MalformedResponse { .. }
            | VenueError::ProcessingError { .. } => ErrorCategory::Data,
            VenueError::IoError(_) | VenueError::CsvError(_) | VenueError::ZipError(_) => {
                ErrorCategory::Storage
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network | ErrorCategory::Provider => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Validation => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    /// Reports a failed field check on the search input as a validation
    /// error rather than a configuration one.
    pub fn into_input_error(self) -> Self {
        match self {
            VenueError::InvalidConfigValueError {
                field,
                value,
                reason,
            } => VenueError::ValidationError {
                message: format!("Invalid {} '{}': {}", field, value, reason),
            },
            VenueError::MissingConfigError { field } => VenueError::ValidationError {
                message: format!("Missing {}", field),
            },
            other => other,
        }
    }

    /// Whether the failed request may succeed if sent again.
    pub fn is_retryable(&self) -> bool {
        match self {
            VenueError::HttpError(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            VenueError::RateLimited { .. } => true,
            VenueError::ProviderError { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            VenueError::HttpError(_) => "Check your network connection and try again",
            VenueError::RateLimited { .. } => {
                "Wait a moment, or lower scoring.concurrent_requests"
            }
            VenueError::ProviderError { status: 401, .. }
            | VenueError::ProviderError { status: 403, .. } => {
                "Verify OPENAI_API_KEY and SERPER_API_KEY are set and valid"
            }
            VenueError::ProviderError { .. } => "The provider may be unavailable; retry later",
            VenueError::MissingConfigError { .. } => {
                "Set the missing value in the config file or the environment"
            }
            VenueError::ConfigValidationError { .. }
            | VenueError::InvalidConfigValueError { .. } => {
                "Fix the configuration file and run again"
            }
            VenueError::ValidationError { .. } => "Check the search inputs passed on the command line",
            VenueError::MalformedResponse { .. } | VenueError::SerializationError(_) => {
                "Run again; if it persists try a different model"
            }
            VenueError::ProcessingError { .. } => "Run again with --verbose for details",
            VenueError::IoError(_) | VenueError::CsvError(_) | VenueError::ZipError(_) => {
                "Check that the output directory is writable and has free space"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach a remote service: {}", self),
            ErrorCategory::Provider => format!("A remote API rejected the request: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Validation => format!("Invalid input: {}", self),
            ErrorCategory::Data => format!("Unexpected data: {}", self),
            ErrorCategory::Storage => format!("Could not write results: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, VenueError>;
