//! Error types for the Gist storage backend.

use std::fmt;
use thiserror::Error;

/// Result type alias for Gist storage operations.
pub type GistResult<T> = Result<T, GistError>;

/// Error kinds for categorizing Gist storage errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GistErrorKind {
    // Configuration errors
    /// No GitHub token was provided.
    MissingToken,
    /// No gist id was provided and auto-create is disabled.
    MissingGistId,
    /// Invalid base URL.
    InvalidBaseUrl,
    /// Invalid configuration.
    InvalidConfiguration,

    // Transport errors
    /// Connection failed (DNS, TCP, TLS).
    ConnectionFailed,
    /// Request timeout.
    Timeout,

    // Application errors (status >= 400)
    /// Bad credentials (401).
    BadCredentials,
    /// Access forbidden (403).
    Forbidden,
    /// Resource not found (404).
    NotFound,
    /// Unprocessable entity (422).
    UnprocessableEntity,
    /// Any other non-2xx API response.
    ApiError,

    // Response errors
    /// A raw-content download failed for a specific file.
    DownloadFailed,
    /// Failed to deserialize a response body.
    DeserializationError,

    // Backend capability errors
    /// The operation has no meaning on a flat gist store.
    NotSupported,

    // Generic
    /// Unknown error.
    Unknown,
}

impl fmt::Display for GistErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingToken => write!(f, "missing_token"),
            Self::MissingGistId => write!(f, "missing_gist_id"),
            Self::InvalidBaseUrl => write!(f, "invalid_base_url"),
            Self::InvalidConfiguration => write!(f, "invalid_configuration"),
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::Timeout => write!(f, "timeout"),
            Self::BadCredentials => write!(f, "bad_credentials"),
            Self::Forbidden => write!(f, "forbidden"),
            Self::NotFound => write!(f, "not_found"),
            Self::UnprocessableEntity => write!(f, "unprocessable_entity"),
            Self::ApiError => write!(f, "api_error"),
            Self::DownloadFailed => write!(f, "download_failed"),
            Self::DeserializationError => write!(f, "deserialization_error"),
            Self::NotSupported => write!(f, "not_supported"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Gist storage error with detailed information.
#[derive(Error, Debug)]
pub struct GistError {
    /// Error kind.
    kind: GistErrorKind,
    /// Error message.
    message: String,
    /// HTTP status code.
    status_code: Option<u16>,
    /// Path or filename the operation was acting on.
    path: Option<String>,
    /// Underlying cause.
    #[source]
    cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for GistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        if let Some(ref path) = self.path {
            write!(f, " (path: {})", path)?;
        }
        if let Some(code) = self.status_code {
            write!(f, " (HTTP {})", code)?;
        }
        Ok(())
    }
}

impl GistError {
    /// Creates a new Gist storage error.
    pub fn new(kind: GistErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
            path: None,
            cause: None,
        }
    }

    /// Sets the HTTP status code.
    pub fn with_status(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }

    /// Sets the path or filename the failing operation was acting on.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the underlying cause.
    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Gets the error kind.
    pub fn kind(&self) -> &GistErrorKind {
        &self.kind
    }

    /// Gets the HTTP status code.
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// Gets the path the failing operation was acting on.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Returns true if the error is a not-found condition.
    pub fn is_not_found(&self) -> bool {
        self.kind == GistErrorKind::NotFound
    }

    /// Returns true if the backend does not support the operation.
    pub fn is_not_supported(&self) -> bool {
        self.kind == GistErrorKind::NotSupported
    }

    /// Returns true if the error happened below the HTTP layer.
    pub fn is_transport(&self) -> bool {
        matches!(
            self.kind,
            GistErrorKind::ConnectionFailed | GistErrorKind::Timeout
        )
    }

    /// Returns true if the error is fatal configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self.kind,
            GistErrorKind::MissingToken
                | GistErrorKind::MissingGistId
                | GistErrorKind::InvalidBaseUrl
                | GistErrorKind::InvalidConfiguration
        )
    }

    /// Creates an error from an HTTP status code and decoded API message.
    pub fn from_response(status: u16, message: String) -> Self {
        Self::new(Self::kind_from_status(status), message).with_status(status)
    }

    /// Maps HTTP status code to error kind.
    fn kind_from_status(status: u16) -> GistErrorKind {
        match status {
            401 => GistErrorKind::BadCredentials,
            403 => GistErrorKind::Forbidden,
            404 => GistErrorKind::NotFound,
            422 => GistErrorKind::UnprocessableEntity,
            _ => GistErrorKind::ApiError,
        }
    }

    // Convenience constructors

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(GistErrorKind::InvalidConfiguration, message)
    }

    /// Creates a not found error.
    pub fn not_found(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(GistErrorKind::NotFound, format!("File not found: {}", path))
            .with_status(404)
            .with_path(path)
    }

    /// Creates a not-supported error for the given path.
    pub fn not_supported(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(GistErrorKind::NotSupported, message).with_path(path)
    }

    /// Creates a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(GistErrorKind::Timeout, message)
    }

    /// Creates a download error naming the failing file and status.
    pub fn download(filename: impl Into<String>, status: u16) -> Self {
        let filename = filename.into();
        Self::new(
            GistErrorKind::DownloadFailed,
            format!("Failed to download {} (HTTP {})", filename, status),
        )
        .with_status(status)
        .with_path(filename)
    }

    /// Creates a deserialization error.
    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::new(GistErrorKind::DeserializationError, message)
    }
}
