use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::*;

use oauth_login::Error as LoginError;

pub type Result<T> = core::result::Result<T, Error>;

/// Failures the host itself could not turn into a redirect with a message.
#[derive(Debug)]
pub struct Error(LoginError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

// Flow failures never get here: they are answered with a redirect and a
// message. What remains is the host failing to sign its own cookies.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
    }
}

impl<E> From<E> for Error
where
    E: Into<LoginError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
