//! Error types for request execution.
//!
//! # Design
//! Every failure of a single request lands in one `ApiError`, and `kind()`
//! reduces it to the closed `ErrorKind` set. Variants keep the raw payload
//! (status, body, message) for debugging but carry no recovery metadata;
//! retry and user-facing messaging belong to the caller.

use std::fmt;

use thiserror::Error;

/// Terminal outcome of one request.
pub type Outcome<T> = Result<T, ApiError>;

/// Closed classification of request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,
    ParsingFailed,
    NonSuccessStatus,
    TransportError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::BadRequest => "bad request",
            ErrorKind::ParsingFailed => "parsing failed",
            ErrorKind::NonSuccessStatus => "non-success status",
            ErrorKind::TransportError => "transport error",
        };
        f.write_str(name)
    }
}

/// Errors delivered as the failure side of an `Outcome`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The base URL, path or body could not be turned into a request.
    /// Nothing was sent.
    #[error("bad request: {reason}")]
    BadRequest { reason: String },

    /// The server answered 200 but the body did not decode into the
    /// expected type.
    #[error("response body did not decode: {message}")]
    ParsingFailed { message: String, body: Vec<u8> },

    /// The server answered with a status other than 200.
    #[error("HTTP {status}")]
    NonSuccessStatus { status: u16, body: Vec<u8> },

    /// No response arrived: connectivity, DNS, TLS or timeout.
    #[error("transport error: {message}")]
    Transport { message: String },
}

impl ApiError {
    pub fn bad_request(reason: impl Into<String>) -> Self {
        ApiError::BadRequest {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::BadRequest { .. } => ErrorKind::BadRequest,
            ApiError::ParsingFailed { .. } => ErrorKind::ParsingFailed,
            ApiError::NonSuccessStatus { .. } => ErrorKind::NonSuccessStatus,
            ApiError::Transport { .. } => ErrorKind::TransportError,
        }
    }

    /// Raw response body, when one was received.
    pub fn body(&self) -> Option<&[u8]> {
        match self {
            ApiError::ParsingFailed { body, .. } | ApiError::NonSuccessStatus { body, .. } => {
                Some(body)
            }
            _ => None,
        }
    }
}

/// Failure of the transport to produce any response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        ApiError::Transport {
            message: err.message,
        }
    }
}

/// Invalid transport configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid proxy url {url:?}: {source}")]
    Proxy {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(ApiError::bad_request("x").kind(), ErrorKind::BadRequest);
        assert_eq!(
            ApiError::ParsingFailed {
                message: "eof".to_string(),
                body: Vec::new()
            }
            .kind(),
            ErrorKind::ParsingFailed
        );
        assert_eq!(
            ApiError::NonSuccessStatus {
                status: 500,
                body: Vec::new()
            }
            .kind(),
            ErrorKind::NonSuccessStatus
        );
        assert_eq!(
            ApiError::from(TransportError::new("refused")).kind(),
            ErrorKind::TransportError
        );
    }

    #[test]
    fn body_is_exposed_only_when_received() {
        let err = ApiError::NonSuccessStatus {
            status: 404,
            body: b"missing".to_vec(),
        };
        assert_eq!(err.body(), Some(&b"missing"[..]));
        assert!(ApiError::bad_request("no host").body().is_none());
    }

    #[test]
    fn display_includes_status() {
        let err = ApiError::NonSuccessStatus {
            status: 503,
            body: Vec::new(),
        };
        assert_eq!(err.to_string(), "HTTP 503");
    }
}
