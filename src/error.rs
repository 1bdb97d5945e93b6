//! Error types
//!
//! `RequestError` stays scoped to one connection. `ServeError` and `ServerError`
//! end the accept loop and map to exit code 1.

use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Failure while reading or validating a request
#[derive(Debug)]
pub enum RequestError {
    Io(io::Error),
    /// Stream ended before a complete request line
    Closed,
    /// Request line has fewer than two space-separated parts
    TooFewParts(String),
    /// Method is neither `GET` nor `HEAD`
    UnsupportedMethod(String),
    LineTooLong(usize),
    Timeout,
}

impl RequestError {
    /// Malformed or unsupported request, as opposed to a transport problem
    pub const fn is_bad_request(&self) -> bool {
        matches!(
            self,
            Self::TooFewParts(_) | Self::UnsupportedMethod(_) | Self::LineTooLong(_)
        )
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "read failed: {e}"),
            Self::Closed => write!(f, "connection closed before request line"),
            Self::TooFewParts(line) => write!(f, "too few request line parts: {line:?}"),
            Self::UnsupportedMethod(m) => write!(f, "not a GET or HEAD request: {m:?}"),
            Self::LineTooLong(limit) => write!(f, "line exceeds {limit} bytes"),
            Self::Timeout => write!(f, "timed out reading request"),
        }
    }
}

impl std::error::Error for RequestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for RequestError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Failure while producing a response
#[derive(Debug)]
pub enum ServeError {
    /// The fallback page could not be read; there is nothing left to send
    FallbackMissing { path: PathBuf, source: io::Error },
}

impl fmt::Display for ServeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FallbackMissing { path, source } => {
                write!(f, "fallback file '{}' unreadable: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ServeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FallbackMissing { source, .. } => Some(source),
        }
    }
}

/// Process-level failure; the server stops and exits with code 1
#[derive(Debug)]
pub enum ServerError {
    Bind { addr: SocketAddr, source: io::Error },
    Accept(io::Error),
    Serve(ServeError),
    /// Escalated bad request under the `exit` policy
    BadRequest(RequestError),
    /// Escalated read failure (closed, timed out, I/O) under the `exit` policy
    Read(RequestError),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bind { addr, source } => write!(f, "failed to bind {addr}: {source}"),
            Self::Accept(e) => write!(f, "failed to accept connection: {e}"),
            Self::Serve(e) => write!(f, "{e}"),
            Self::BadRequest(e) => write!(f, "bad request: {e}"),
            Self::Read(e) => write!(f, "request read failed: {e}"),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bind { source, .. } | Self::Accept(source) => Some(source),
            Self::Serve(e) => Some(e),
            Self::BadRequest(e) | Self::Read(e) => Some(e),
        }
    }
}

impl From<ServeError> for ServerError {
    fn from(e: ServeError) -> Self {
        Self::Serve(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_request_classification() {
        assert!(RequestError::TooFewParts("GET".into()).is_bad_request());
        assert!(RequestError::UnsupportedMethod("POST".into()).is_bad_request());
        assert!(RequestError::LineTooLong(8).is_bad_request());
        assert!(!RequestError::Closed.is_bad_request());
        assert!(!RequestError::Timeout.is_bad_request());
        assert!(!RequestError::Io(io::Error::other("boom")).is_bad_request());
    }

    #[test]
    fn test_server_error_display() {
        let err = ServerError::from(ServeError::FallbackMissing {
            path: PathBuf::from("www/404.html"),
            source: io::Error::from(io::ErrorKind::NotFound),
        });
        assert!(err.to_string().contains("www/404.html"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
