//! [`Error`]-related definitions.

use derive_more::{Display, Error as StdError};
use serde::Deserialize;

/// Error of a request to the server.
#[derive(Clone, Debug, Display, Eq, PartialEq, StdError)]
pub enum Error {
    /// Request was malformed or contained out-of-range values.
    #[display("Validation failed: {}", message(_0.as_deref()))]
    Validation(#[error(not(source))] Option<String>),

    /// Request lacked valid credentials.
    #[display("Authentication failed: {}", message(_0.as_deref()))]
    Authentication(#[error(not(source))] Option<String>),

    /// Authenticated user is not allowed to perform the request.
    #[display("Authorization failed: {}", message(_0.as_deref()))]
    Authorization(#[error(not(source))] Option<String>),

    /// Requested entity doesn't exist.
    #[display("Not found: {}", message(_0.as_deref()))]
    NotFound(#[error(not(source))] Option<String>),

    /// Request conflicts with the current state.
    #[display("Conflict: {}", message(_0.as_deref()))]
    Conflict(#[error(not(source))] Option<String>),

    /// Server failed to perform the request.
    #[display("Internal error: {}", message(_0.as_deref()))]
    Internal(#[error(not(source))] Option<String>),

    /// Server couldn't be reached, or the connection broke.
    #[display("Network error: {_0}")]
    TransientNetwork(#[error(not(source))] String),
}

impl Error {
    /// Message shown when no server message is available.
    pub const GENERIC_MESSAGE: &'static str =
        "Something went wrong. Please try again.";

    /// Maps an error response of the server into an [`Error`] by its HTTP
    /// status code.
    #[must_use]
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        match status {
            400 | 413 | 422 => Self::Validation(message),
            401 => Self::Authentication(message),
            403 => Self::Authorization(message),
            404 => Self::NotFound(message),
            409 => Self::Conflict(message),
            _ => Self::Internal(message),
        }
    }

    /// Maps an error response body of the server into an [`Error`].
    ///
    /// The body is expected to be a JSON `{"code", "message"}` object, any
    /// other body results in no server message.
    #[must_use]
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        /// Error response body of the server.
        #[derive(Deserialize)]
        struct Body {
            /// Human-readable message.
            message: Option<String>,
        }

        let message = serde_json::from_slice::<Body>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty());
        Self::from_status(status, message)
    }

    /// Returns the message to be shown to the user.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Validation(m)
            | Self::Authentication(m)
            | Self::Authorization(m)
            | Self::NotFound(m)
            | Self::Conflict(m)
            | Self::Internal(m) => {
                m.as_deref().unwrap_or(Self::GENERIC_MESSAGE)
            }
            Self::TransientNetwork(_) => Self::GENERIC_MESSAGE,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Internal(None)
        } else {
            Self::TransientNetwork(e.to_string())
        }
    }
}

/// Formats an optional server message.
fn message(m: Option<&str>) -> &str {
    m.unwrap_or("<no message>")
}

#[cfg(test)]
mod spec {
    use super::Error;

    #[test]
    fn maps_statuses() {
        assert!(matches!(Error::from_status(400, None), Error::Validation(_)));
        assert!(matches!(
            Error::from_status(401, None),
            Error::Authentication(_),
        ));
        assert!(matches!(
            Error::from_status(403, None),
            Error::Authorization(_),
        ));
        assert!(matches!(Error::from_status(404, None), Error::NotFound(_)));
        assert!(matches!(Error::from_status(409, None), Error::Conflict(_)));
        assert!(matches!(Error::from_status(502, None), Error::Internal(_)));
    }

    #[test]
    fn keeps_server_message() {
        let err = Error::from_response(
            403,
            br#"{"code":"NOT_OWNER","message":"Not yours"}"#,
        );

        assert_eq!(err, Error::Authorization(Some("Not yours".into())));
        assert_eq!(err.user_message(), "Not yours");
    }

    #[test]
    fn falls_back_to_generic_message() {
        let err = Error::from_response(500, b"<html>Bad gateway</html>");
        assert_eq!(err.user_message(), Error::GENERIC_MESSAGE);

        let err = Error::TransientNetwork("connection reset".into());
        assert_eq!(err.user_message(), Error::GENERIC_MESSAGE);
    }
}
