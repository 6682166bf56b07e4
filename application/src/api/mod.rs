//! REST API definitions.

pub mod auth;
mod form;
pub mod property;
pub mod saved;

use std::str::FromStr;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::{define_error, Error};

pub use self::form::Form;

/// Builds the [`Router`] of the whole REST API.
#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
        .route("/api/properties", get(property::list).post(property::create))
        .route("/api/properties/featured", get(property::featured))
        .route("/api/properties/my", get(property::owned))
        .route(
            "/api/properties/:id",
            get(property::get)
                .put(property::update)
                .delete(property::delete),
        )
        .route("/api/properties/:id/status", patch(property::update_status))
        .route("/api/users/saved-properties", get(saved::list))
        .route(
            "/api/users/saved-properties/:id",
            post(saved::save).delete(saved::unsave),
        )
}

/// Parses the provided optional request `value` of the `field`.
///
/// Blank values are treated as missing ones.
///
/// # Errors
///
/// If the `value` cannot be parsed.
pub fn parse<T>(field: &str, value: Option<&str>) -> Result<Option<T>, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| {
            v.parse().map_err(|e| {
                Error::validation(format!("Invalid `{field}` value: {e}"))
            })
        })
        .transpose()
}

/// Ensures the provided `value` of the `field` is present.
///
/// # Errors
///
/// If the `value` is [`None`].
pub fn required<T>(field: &str, value: Option<T>) -> Result<T, Error> {
    value.ok_or_else(|| Error::validation(format!("`{field}` is required")))
}

define_error! {
    enum PrivilegeError {
        #[code = "NOT_OWNER"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` is not allowed to manage this \
                     `Property`"]
        NotOwner,

        #[code = "ROLE_NOT_ALLOWED"]
        #[status = FORBIDDEN]
        #[message = "Role of the authenticated `User` doesn't allow this \
                     action"]
        Role,
    }
}

define_error! {
    enum NotFoundError {
        #[code = "PROPERTY_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "`Property` with the provided ID doesn't exist"]
        Property,

        #[code = "USER_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "`User` doesn't exist"]
        User,
    }
}

define_error! {
    enum PaginationError {
        #[code = "INVALID_PAGINATION"]
        #[status = BAD_REQUEST]
        #[message = "`page` must be at least 1 and `limit` must be within \
                     1..=100"]
        OutOfRange,
    }
}

#[cfg(test)]
mod spec {
    use super::{parse, required};

    #[test]
    fn blank_values_are_missing() {
        assert_eq!(parse::<u32>("page", None).unwrap(), None);
        assert_eq!(parse::<u32>("page", Some("")).unwrap(), None);
        assert_eq!(parse::<u32>("page", Some("  ")).unwrap(), None);
        assert_eq!(parse::<u32>("page", Some(" 3 ")).unwrap(), Some(3));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = parse::<u32>("limit", Some("many")).unwrap_err();

        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
        assert!(err.message.contains("`limit`"), "{}", err.message);
        assert!(required::<u8>("title", None).is_err());
    }
}
