//! Error types for the `oauth-client` crate.
//!
//! Follows a root Error struct holding an optional source and a tree of error kind enums.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for oauth-client crate.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in oauth-client.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    Network(NetworkErrorKind),
    OAuth(OAuthErrorKind),
    Config,
}

/// Errors from talking to a provider over HTTP.
#[derive(Debug, PartialEq)]
pub enum NetworkErrorKind {
    /// The HTTP client or request could not be built.
    BuilderFailed,
    /// The request never produced a response (connect, timeout, TLS, ...).
    Transport,
    /// The provider answered with a non-success status.
    Status(u16),
    /// The response body could not be decoded.
    InvalidBody,
}

/// Errors from the authorization-code flow itself.
#[derive(Debug, PartialEq)]
pub enum OAuthErrorKind {
    TokenExchangeFailed,
    InvalidState,
    MissingCode,
    MissingToken,
    Unsupported,
    InvalidTransition,
}

impl Error {
    /// True for any failure to complete an HTTP call against the provider.
    pub fn is_network(&self) -> bool {
        matches!(self.error_kind, ErrorKind::Network(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::Network(kind) => write!(f, "Network error: {:?}", kind),
            ErrorKind::OAuth(kind) => write!(f, "OAuth error: {:?}", kind),
            ErrorKind::Config => write!(f, "Configuration error"),
        }?;
        if let Some(source) = &self.source {
            write!(f, " ({})", source)?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let error_kind = if err.is_builder() {
            NetworkErrorKind::BuilderFailed
        } else if err.is_decode() {
            NetworkErrorKind::InvalidBody
        } else if let Some(status) = err.status() {
            NetworkErrorKind::Status(status.as_u16())
        } else {
            NetworkErrorKind::Transport
        };

        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Network(error_kind),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Network(NetworkErrorKind::InvalidBody),
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Config,
        }
    }
}

/// Helper function to create OAuth errors.
pub fn oauth_error(kind: OAuthErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::OAuth(kind),
    }
}

/// Helper function to create network errors.
pub fn network_error(kind: NetworkErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Network(kind),
    }
}

/// Helper function to create configuration errors.
pub fn config_error(message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Config,
    }
}
