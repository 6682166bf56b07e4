//! [`Error`]-related definitions.

use std::fmt;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::typed_header::TypedHeaderRejection;
use derive_more::Error as StdError;
use itertools::Itertools as _;
use serde::Serialize;
use service::infra::{database, storage};
use tracerr::{Trace, Traced};

/// Defines a new error type.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_error {
    (
        enum $name:ident {
            $(
                #[code = $code:literal]
                #[status = $status_code:ident]
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        /// Error type.
        #[derive(
            Clone,
            Copy,
            Debug,
            ::derive_more::Display,
            ::derive_more::Error
        )]
        #[repr(u16)]
        pub enum $name {
            $(
                #[display($message)]
                #[doc = $message]
                $variant,
            )*
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                match err {
                    $(
                        $name::$variant => Self {
                            code: $code,
                            status_code: ::http::StatusCode::$status_code,
                            message: $message.to_string(),
                            backtrace: None,
                        },
                    )*
                }
            }
        }
    };
}

/// REST API [`Error`].
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`Error`] code.
    pub code: Code,

    /// [`http::StatusCode`] of this [`Error`].
    pub status_code: http::StatusCode,

    /// Backtrace of this [`Error`].
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// [`Error`] message.
    pub message: String,
}

impl Error {
    /// Message replacing the one of internal [`Error`]s in responses.
    pub const INTERNAL_MESSAGE: &'static str = "Internal server error";

    /// Create a new [`Error`] representing an internal server error.
    #[must_use]
    pub fn internal(msg: &impl ToString) -> Self {
        Self {
            code: "INTERNAL_SERVER_ERROR",
            status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            backtrace: None,
        }
    }

    /// Creates a new [`Error`] of a malformed or out-of-range request value.
    #[must_use]
    pub fn validation(msg: impl fmt::Display) -> Self {
        Self {
            code: "VALIDATION_ERROR",
            status_code: http::StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            backtrace: None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            code,
            status_code: _,
            backtrace,
            message,
        } = self;

        write!(
            f,
            "[{code}]: {message}{}",
            backtrace
                .iter()
                .format_with("\n", |trace, f| f(&format_args!("{trace}"))),
        )
    }
}

/// Body of an [`Error`] response.
#[derive(Debug, Serialize)]
struct Body<'e> {
    /// [`Error::code`].
    code: Code,

    /// [`Error::message`].
    message: &'e str,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let message = if self.status_code.is_server_error() {
            tracing::error!("{self}");
            Self::INTERNAL_MESSAGE
        } else {
            &self.message
        };
        let body = Body {
            code: self.code,
            message,
        };
        (self.status_code, Json(body)).into_response()
    }
}

/// [`Error`] code.
pub type Code = &'static str;

/// Helper trait for converting types into [`Error`]s.
pub trait AsError {
    /// Tries to convert the type into an [`Error`].
    ///
    /// [`None`] is returned if the type cannot be converted into an [`Error`].
    fn try_as_error(&self) -> Option<Error>;

    /// Converts the type into an [`Error`].
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error()
            .unwrap_or_else(|| Error::internal(&self))
    }

    /// Converts the type into an [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        let mut error = self.as_ref().try_as_error()?;
        error.backtrace = Some(self.trace().clone());
        Some(error)
    }
}

impl AsError for TypedHeaderRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error {
            code: "BAD_REQUEST",
            status_code: http::StatusCode::BAD_REQUEST,
            message: self.to_string(),
            backtrace: None,
        })
    }
}

impl AsError for QueryRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::validation(self.body_text()))
    }
}

impl AsError for PathRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::validation(self.body_text()))
    }
}

impl AsError for JsonRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::validation(self.body_text()))
    }
}

impl AsError for MultipartRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::validation(self.body_text()))
    }
}

impl AsError for MultipartError {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error {
            code: "VALIDATION_ERROR",
            status_code: self.status(),
            message: self.body_text(),
            backtrace: None,
        })
    }
}

impl AsError for database::Error {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

impl AsError for storage::Error {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

#[cfg(test)]
mod spec {
    use axum::response::IntoResponse as _;
    use http_body_util::BodyExt as _;

    use crate::define_error;

    use super::{AsError, Error};

    define_error! {
        enum TestError {
            #[code = "TEAPOT"]
            #[status = IM_A_TEAPOT]
            #[message = "I'm a teapot"]
            Teapot,
        }
    }

    async fn render(err: Error) -> (http::StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn renders_code_and_message() {
        let (status, json) = render(TestError::Teapot.into()).await;

        assert_eq!(status, http::StatusCode::IM_A_TEAPOT);
        assert_eq!(json["code"], "TEAPOT");
        assert_eq!(json["message"], "I'm a teapot");
    }

    #[tokio::test]
    async fn hides_internal_messages() {
        let (status, json) =
            render(Error::internal(&"connection refused")).await;

        assert_eq!(status, http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["code"], "INTERNAL_SERVER_ERROR");
        assert_eq!(json["message"], Error::INTERNAL_MESSAGE);
    }

    #[test]
    fn unknown_errors_are_internal() {
        #[derive(Debug, derive_more::Display)]
        #[display("boom")]
        struct Boom;

        impl AsError for Boom {
            fn try_as_error(&self) -> Option<Error> {
                None
            }
        }

        let err = Boom.into_error();
        assert_eq!(err.code, "INTERNAL_SERVER_ERROR");
        assert_eq!(err.message, "boom");
    }
}
