//! Failure types raised by the API client layer
//!
//! - [`ApiError`]: the server answered with a structured error response
//! - [`TransportError`]: the request never produced a usable response

use crate::diagnostics::StackTrace;
use std::sync::Arc;

// =============================================================================
// API Errors
// =============================================================================

/// Non-success REST response
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status code, when the response carried one
    pub status: Option<u16>,
    /// Raw response body, usually JSON
    pub body: String,
    /// Call stack at the point the error was raised
    pub trace: StackTrace,
}

impl ApiError {
    /// Create an API error, capturing the current call stack
    pub fn new(status: Option<u16>, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            trace: StackTrace::capture(),
        }
    }

    pub fn with_trace(mut self, trace: StackTrace) -> Self {
        self.trace = trace;
        self
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "({}) {}", status, self.body),
            None => write!(f, "{}", self.body),
        }
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Transport Errors
// =============================================================================

/// Layer of the HTTP stack that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    /// Generic request failure wrapping a more specific cause
    Request,
    Connect,
    Timeout,
    Redirect,
    Body,
    Decode,
    Protocol,
}

impl TransportErrorKind {
    /// Type name used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            TransportErrorKind::Request => "RequestError",
            TransportErrorKind::Connect => "ConnectError",
            TransportErrorKind::Timeout => "TimeoutError",
            TransportErrorKind::Redirect => "RedirectError",
            TransportErrorKind::Body => "BodyError",
            TransportErrorKind::Decode => "DecodeError",
            TransportErrorKind::Protocol => "ProtocolError",
        }
    }
}

/// Underlying cause of a transport error
#[derive(Debug, Clone)]
pub enum TransportReason {
    /// Another transport-layer error
    Transport(Box<TransportError>),
    /// A cause outside the transport layer (IO, TLS, ...)
    Other(Arc<dyn std::error::Error + Send + Sync>),
}

/// Network / HTTP layer failure with a chain of reasons
#[derive(Debug, Clone)]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
    pub reason: Option<TransportReason>,
    pub trace: StackTrace,
}

impl TransportError {
    /// Create a transport error, capturing the current call stack
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            reason: None,
            trace: StackTrace::capture(),
        }
    }

    /// Wrap another transport error as the reason for this one
    pub fn caused_by(mut self, inner: TransportError) -> Self {
        self.reason = Some(TransportReason::Transport(Box::new(inner)));
        self
    }

    pub fn caused_by_other(
        mut self,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        self.reason = Some(TransportReason::Other(Arc::new(cause)));
        self
    }

    pub fn with_trace(mut self, trace: StackTrace) -> Self {
        self.trace = trace;
        self
    }

    /// Follow the reason chain while it stays inside the transport layer
    pub fn innermost(&self) -> &TransportError {
        let mut current = self;
        while let Some(TransportReason::Transport(inner)) = &current.reason {
            current = inner;
        }
        current
    }

    /// Map a `reqwest` failure onto a `RequestError` wrapping the specific cause
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        let inner_kind = if err.is_timeout() {
            Some(TransportErrorKind::Timeout)
        } else if err.is_connect() {
            Some(TransportErrorKind::Connect)
        } else if err.is_redirect() {
            Some(TransportErrorKind::Redirect)
        } else if err.is_decode() {
            Some(TransportErrorKind::Decode)
        } else if err.is_body() {
            Some(TransportErrorKind::Body)
        } else {
            None
        };

        let outer = TransportError::new(TransportErrorKind::Request, err.to_string());
        match inner_kind {
            Some(kind) => {
                let cause = std::error::Error::source(err)
                    .map(|source| source.to_string())
                    .unwrap_or_else(|| err.to_string());
                let inner = TransportError {
                    kind,
                    message: cause,
                    reason: None,
                    trace: outer.trace.clone(),
                };
                outer.caused_by(inner)
            }
            None => outer,
        }
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.reason {
            Some(TransportReason::Transport(inner)) => Some(inner.as_ref()),
            Some(TransportReason::Other(cause)) => Some(cause.as_ref()),
            None => None,
        }
    }
}
