//! Error taxonomy shared by the orchestrator and every provider

use std::fmt;
use thiserror::Error;

/// Boxed cause carried by a [`TranslateError`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Closed set of failure classes
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Provider identifier is not registered
    #[error("invalid provider")]
    InvalidProvider,

    /// Source or target language rejected by the provider
    #[error("invalid language")]
    InvalidLanguage,

    /// Request is malformed or not supported by the client
    #[error("invalid request")]
    InvalidRequest,

    /// Provider payload could not be decoded
    #[error("invalid response")]
    InvalidResponse,

    /// Provider answered with zero results
    #[error("empty response")]
    EmptyResponse,

    /// Provider reported a job failure or a documented error status
    #[error("provider API error")]
    ProviderApi,

    /// Transport-level non-success status
    #[error("HTTP error")]
    Http,

    /// Connection failure or cancellation
    #[error("network error")]
    Network,

    /// Local read/write failure while staging a payload
    #[error("IO error")]
    Io,
}

impl ErrorKind {
    /// Stable snake_case code, used by the HTTP API
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidProvider => "invalid_provider",
            ErrorKind::InvalidLanguage => "invalid_language",
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::InvalidResponse => "invalid_response",
            ErrorKind::EmptyResponse => "empty_response",
            ErrorKind::ProviderApi => "provider_api",
            ErrorKind::Http => "http",
            ErrorKind::Network => "network",
            ErrorKind::Io => "io",
        }
    }
}

/// Structured translation error
///
/// Built once where the failure is detected and never mutated afterwards.
/// Displays as `[provider] operation: cause`.
#[derive(Error, Debug)]
#[error("[{provider}] {operation}{}", DisplayCause(.cause))]
pub struct TranslateError {
    kind: ErrorKind,
    operation: String,
    provider: String,
    #[source]
    cause: Option<BoxError>,
}

impl TranslateError {
    /// Create a new error wrapping `cause`
    pub fn new<E>(
        kind: ErrorKind,
        operation: impl Into<String>,
        provider: impl Into<String>,
        cause: E,
    ) -> Self
    where
        E: Into<BoxError>,
    {
        Self {
            kind,
            operation: operation.into(),
            provider: provider.into(),
            cause: Some(cause.into()),
        }
    }

    /// Create a new error without an underlying cause
    pub fn bare(kind: ErrorKind, operation: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            kind,
            operation: operation.into(),
            provider: provider.into(),
            cause: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Check the error class
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    /// True for failures raised before any network activity
    pub fn is_validation(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::InvalidProvider | ErrorKind::InvalidLanguage | ErrorKind::InvalidRequest
        )
    }

    /// True when the cause is a cancelled context
    pub fn is_cancelled(&self) -> bool {
        self.cause
            .as_ref()
            .map(|c| c.is::<Cancelled>())
            .unwrap_or(false)
    }
}

struct DisplayCause<'a>(&'a Option<BoxError>);

impl fmt::Display for DisplayCause<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(cause) => write!(f, ": {}", cause),
            None => Ok(()),
        }
    }
}

/// Cause attached when the caller's cancellation token fires
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslateError>;
