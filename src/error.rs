//! Error types shared by the API clients and both front ends.

use thiserror::Error;

use crate::validation::ValidationErrors;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The request never produced an HTTP response (connection refused, timeout, ...).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    ///
    /// `message` is the server-supplied `detail` when present, otherwise the
    /// fallback text of the operation that failed.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// Client-side validation rejected the input before anything was sent.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("token store error: {0}")]
    Storage(String),

    /// Terminal input or output failed (prompts, password entry).
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),
}

impl Error {
    /// HTTP status of an API failure, if this error came from one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the server rejected the bearer token.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("not signed in, run `taskflow login` first")]
    NotAuthenticated,

    #[error("stored token could not be decoded: {0}")]
    MalformedToken(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_displays_server_message() {
        let err = Error::Http {
            status: 409,
            message: "Email already registered".into(),
        };
        assert_eq!(err.to_string(), "Email already registered");
        assert_eq!(err.status(), Some(409));
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn unauthorized_covers_401_and_403() {
        let unauthorized = Error::Http { status: 401, message: String::new() };
        let forbidden = Error::Http { status: 403, message: String::new() };
        assert!(unauthorized.is_unauthorized());
        assert!(forbidden.is_unauthorized());
        assert!(!Error::Auth(AuthError::NotAuthenticated).is_unauthorized());
    }

    #[test]
    fn terminal_failures_are_io_errors() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdout closed").into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.to_string(), "i/o error: stdout closed");
    }
}
