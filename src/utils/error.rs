use thiserror::Error;

/// Failure reported by the remote content API.
///
/// Carries enough classification for the retry policy to tell transient
/// failures (no response, timeouts, refused connections, 5xx) from client
/// errors that will not get better by trying again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Connection refused: {0}")]
    ConnectionRefused(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        ApiError::Status {
            status,
            message: message.into(),
        }
    }

    /// HTTP status code, when a response was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network(_) | ApiError::Timeout | ApiError::ConnectionRefused(_) => true,
            ApiError::Status { status, .. } => (500..600).contains(status),
            ApiError::Decode(_) => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status_code(), Some(401) | Some(403))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() {
            ApiError::ConnectionRefused(err.to_string())
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::status(status.as_u16(), err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("API request failed: {0}")]
    ApiError(#[from] ApiError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Validation error on {field}: {message}")]
    ValidationError { field: String, message: String },

    #[error("Storage error: {message}")]
    StorageError { message: String },
}

impl SiteError {
    /// Message suitable for showing next to a form or on the terminal.
    pub fn user_friendly_message(&self) -> String {
        match self {
            SiteError::ApiError(api) if api.is_retryable() => {
                "The server is not reachable right now. Please try again in a moment.".to_string()
            }
            SiteError::ApiError(ApiError::Status { message, .. }) if !message.is_empty() => {
                message.clone()
            }
            SiteError::ApiError(_) => "The request could not be completed.".to_string(),
            SiteError::ValidationError { message, .. } => message.clone(),
            SiteError::ConfigError { .. }
            | SiteError::MissingConfigError { .. }
            | SiteError::InvalidConfigValueError { .. }
            | SiteError::ConfigValidationError { .. } => {
                format!("Configuration problem: {}", self)
            }
            SiteError::IoError(_) | SiteError::StorageError { .. } => {
                "Local storage is unavailable.".to_string()
            }
            SiteError::SerializationError(_) => "Unexpected data format.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;
