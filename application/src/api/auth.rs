//! Authentication REST API definitions.

use axum::{extract::rejection::JsonRejection, http::StatusCode, Json};
use common::DateTime;
use secrecy::SecretBox;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, create_user_session, Command as _},
    domain::{self, user},
    query, Query as _,
};

use crate::{define_error, AsError, Context, Error};

use super::{parse, required, NotFoundError};

/// [`User`] representation.
///
/// [`User`]: domain::User
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// ID of the user.
    pub id: user::Id,

    /// Name of the user.
    pub name: String,

    /// Email of the user.
    pub email: user::Email,

    /// Phone of the user.
    pub phone: Option<String>,

    /// Role of the user.
    pub role: user::Role,

    /// When the user was registered.
    pub created_at: DateTime,
}

impl From<domain::User> for User {
    fn from(u: domain::User) -> Self {
        Self {
            id: u.id,
            name: u.name.into_inner(),
            email: u.email,
            phone: u.phone.map(|p| p.to_string()),
            role: u.role,
            created_at: u.created_at.coerce(),
        }
    }
}

/// Authenticated session representation.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Bearer token of the session.
    pub token: String,

    /// When the session expires.
    pub expires_at: DateTime,

    /// Authenticated [`User`].
    pub user: User,
}

impl From<create_user_session::Output> for Session {
    fn from(out: create_user_session::Output) -> Self {
        Self {
            token: out.token.to_string(),
            expires_at: out.expires_at.coerce(),
            user: out.user.into(),
        }
    }
}

/// Body of a registration request.
#[derive(Clone, Debug, Deserialize)]
pub struct Registration {
    /// Name of the new user.
    pub name: Option<String>,

    /// Email of the new user.
    pub email: Option<String>,

    /// Password of the new user.
    pub password: Option<String>,

    /// Phone of the new user.
    pub phone: Option<String>,

    /// Role of the new user.
    pub role: Option<String>,
}

/// Body of a login request.
#[derive(Clone, Debug, Deserialize)]
pub struct Credentials {
    /// Email of the user.
    pub email: Option<String>,

    /// Password of the user.
    pub password: Option<String>,
}

/// Registers a new [`User`] and logs them in.
///
/// # Errors
///
/// If the request is malformed, or the email is occupied already, or the
/// requested role cannot be self-assigned.
#[tracing::instrument(skip_all, fields(user_id = tracing::field::Empty))]
pub async fn register(
    ctx: Context,
    body: Result<Json<Registration>, JsonRejection>,
) -> Result<(StatusCode, Json<Session>), Error> {
    let Json(body) = body.map_err(AsError::into_error)?;
    let password: user::Password =
        required("password", parse("password", body.password.as_deref())?)?;

    let user = ctx
        .service()
        .execute(command::CreateUser {
            name: required("name", parse("name", body.name.as_deref())?)?,
            email: required("email", parse("email", body.email.as_deref())?)?,
            password: SecretBox::new(Box::new(password)),
            phone: parse("phone", body.phone.as_deref())?,
            role: parse("role", body.role.as_deref())?
                .unwrap_or(user::Role::User),
        })
        .await
        .map_err(AsError::into_error)?;
    _ = tracing::Span::current().record("user_id", user.id.to_string());

    let session = ctx
        .service()
        .execute(command::CreateUserSession::ByUserId(user.id))
        .await
        .map_err(AsError::into_error)?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

/// Logs a [`User`] in by their credentials.
///
/// # Errors
///
/// If the request is malformed, or the credentials are wrong.
#[tracing::instrument(skip_all)]
pub async fn login(
    ctx: Context,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<Session>, Error> {
    let Json(body) = body.map_err(AsError::into_error)?;
    let email = parse("email", body.email.as_deref())?;
    let password = parse("password", body.password.as_deref())?;
    let (Some(email), Some(password)) = (email, password) else {
        return Err(CredentialsError::Wrong.into());
    };

    let session = ctx
        .service()
        .execute(command::CreateUserSession::ByCredentials {
            email,
            password: SecretBox::new(Box::new(password)),
        })
        .await
        .map_err(AsError::into_error)?;
    Ok(Json(session.into()))
}

/// Returns the authenticated [`User`].
///
/// # Errors
///
/// If the request is not authenticated.
#[tracing::instrument(skip_all)]
pub async fn me(ctx: Context) -> Result<Json<User>, Error> {
    let session = ctx.current_session().await?;

    ctx.service()
        .execute(query::user::ById::by(session.user_id))
        .await
        .map_err(AsError::into_error)?
        .map(|u| Json(u.into()))
        .ok_or_else(|| NotFoundError::User.into())
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PasswordHash(_) => None,
            Self::EmailOccupied(_) => Some(RegistrationError::Occupied.into()),
            Self::RoleNotAssignable(_) => {
                Some(RegistrationError::RoleNotAssignable.into())
            }
        }
    }
}

impl AsError for create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenEncodeError(_) => None,
            Self::UserNotExists(_) => Some(NotFoundError::User.into()),
            Self::WrongCredentials => Some(CredentialsError::Wrong.into()),
        }
    }
}

define_error! {
    enum RegistrationError {
        #[code = "EMAIL_OCCUPIED"]
        #[status = CONFLICT]
        #[message = "Provided email is occupied already"]
        Occupied,

        #[code = "ROLE_NOT_ASSIGNABLE"]
        #[status = FORBIDDEN]
        #[message = "Requested role cannot be self-assigned"]
        RoleNotAssignable,
    }
}

define_error! {
    enum CredentialsError {
        #[code = "WRONG_CREDENTIALS"]
        #[status = UNAUTHORIZED]
        #[message = "Wrong email or password"]
        Wrong,
    }
}

#[cfg(test)]
mod spec {
    use service::{command::create_user, domain::user};

    use crate::AsError as _;

    #[test]
    fn registration_errors() {
        let email = user::Email::new("taken@example.com").unwrap();
        let err = create_user::ExecutionError::EmailOccupied(email).as_error();
        assert_eq!(err.code, "EMAIL_OCCUPIED");
        assert_eq!(err.status_code, http::StatusCode::CONFLICT);

        let err =
            create_user::ExecutionError::RoleNotAssignable(user::Role::Admin)
                .as_error();
        assert_eq!(err.status_code, http::StatusCode::FORBIDDEN);
    }

    #[test]
    fn user_view_is_camel_case() {
        let json = serde_json::to_value(super::User {
            id: user::Id::new(),
            name: "Ayesha".into(),
            email: user::Email::new("ayesha@example.com").unwrap(),
            phone: None,
            role: user::Role::Owner,
            created_at: common::DateTime::now(),
        })
        .unwrap();

        assert_eq!(json["role"], "OWNER");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("created_at").is_none());
    }
}
