use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::*;

use oauth_client::error::{Error as OAuthError, ErrorKind, OAuthErrorKind};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    OAuth(OAuthError),
    Web(WebErrorKind),
}

#[derive(Debug, PartialEq)]
pub enum WebErrorKind {
    Input,
    NotFound,
}

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        match self {
            Error::OAuth(err) => write!(fmt, "{err}"),
            Error::Web(kind) => write!(fmt, "Web error: {kind:?}"),
        }
    }
}

impl Error {
    fn status(&self) -> StatusCode {
        match self {
            Error::Web(WebErrorKind::Input) => StatusCode::BAD_REQUEST,
            Error::Web(WebErrorKind::NotFound) => StatusCode::NOT_FOUND,
            Error::OAuth(err) => match &err.error_kind {
                ErrorKind::Network(_) => StatusCode::BAD_GATEWAY,
                ErrorKind::OAuth(oauth_error_kind) => match oauth_error_kind {
                    OAuthErrorKind::InvalidState
                    | OAuthErrorKind::MissingCode
                    | OAuthErrorKind::InvalidTransition => StatusCode::BAD_REQUEST,
                    OAuthErrorKind::TokenExchangeFailed => StatusCode::UNAUTHORIZED,
                    OAuthErrorKind::Unsupported => StatusCode::NOT_FOUND,
                    OAuthErrorKind::MissingToken => StatusCode::INTERNAL_SERVER_ERROR,
                },
                ErrorKind::Config => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{self}");
        } else {
            warn!("{self}");
        }

        let reason = status.canonical_reason().unwrap_or("ERROR").to_uppercase();
        (status, reason).into_response()
    }
}

impl From<OAuthError> for Error {
    fn from(err: OAuthError) -> Self {
        Error::OAuth(err)
    }
}
