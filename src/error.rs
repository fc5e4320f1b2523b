//! Verbatim error types

/// Coarse failure class used by [`RetryPolicy`](crate::RetryPolicy) to
/// decide whether an error is worth another attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Connect/read timeout, DNS failure, connection reset.
    Transport,
    /// Provider answered with a 5xx status.
    Server,
    /// Provider rejected the request (4xx) or returned an unusable body.
    Client,
}

/// Verbatim error types
///
/// `Clone` so that a single failed computation can be handed to every
/// caller coalesced on the same cache fingerprint.
#[derive(Debug, Clone, thiserror::Error)]
pub enum VerbatimError {
    // Provider/network errors
    #[error("transport error: {0}")]
    Transport(String),

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("client error{}: {message}", status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Client {
        status: Option<u16>,
        message: String,
    },

    /// Retries were exhausted on a transient failure. `last` is the final
    /// underlying error, kept for diagnostics.
    #[error("gateway timeout after {attempts} attempts: {last}")]
    GatewayTimeout {
        attempts: u32,
        last: Box<VerbatimError>,
    },

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("no provider configured")]
    NoProvider,

    // Data errors
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("JSON error: {0}")]
    Json(String),
}

impl VerbatimError {
    /// Failure class for retry decisions, or `None` for errors that never
    /// come from a provider call (configuration, input validation, ...).
    pub fn class(&self) -> Option<ErrorClass> {
        match self {
            Self::Transport(_) => Some(ErrorClass::Transport),
            Self::Server { .. } => Some(ErrorClass::Server),
            Self::Client { .. } => Some(ErrorClass::Client),
            _ => None,
        }
    }

    /// Whether the error is transient under the default retry classes.
    ///
    /// `GatewayTimeout` is terminal: it is what transient errors become once
    /// retries are exhausted.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.class(),
            Some(ErrorClass::Transport) | Some(ErrorClass::Server)
        )
    }
}

impl From<serde_json::Error> for VerbatimError {
    fn from(err: serde_json::Error) -> Self {
        VerbatimError::Json(err.to_string())
    }
}

/// Result type alias for Verbatim operations
pub type Result<T> = std::result::Result<T, VerbatimError>;
