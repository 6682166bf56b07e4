//! Saved [`Property`] listings REST API definitions.
//!
//! [`Property`]: service::domain::Property

use axum::{
    extract::{rejection::PathRejection, Path},
    http::StatusCode,
    Json,
};
use service::{
    command::{self, Command as _},
    domain::property,
    query, Query as _,
};

use crate::{AsError, Context, Error};

use super::{property::List, NotFoundError};

/// Lists the [`Property`] listings saved by the authenticated user, most
/// recently saved first.
///
/// # Errors
///
/// If the request is not authenticated.
///
/// [`Property`]: service::domain::Property
#[tracing::instrument(skip_all, fields(user_id = tracing::field::Empty))]
pub async fn list(ctx: Context) -> Result<Json<List>, Error> {
    let session = ctx.current_session().await?;
    _ = tracing::Span::current().record("user_id", session.user_id.to_string());

    let saved = ctx
        .service()
        .execute(query::properties::Saved::by(session.user_id))
        .await
        .map_err(AsError::into_error)?;
    Ok(Json(Vec::from(saved).into()))
}

/// Saves a [`Property`] for the authenticated user.
///
/// # Errors
///
/// If the request is not authenticated, or the [`Property`] doesn't exist.
///
/// [`Property`]: service::domain::Property
#[tracing::instrument(skip_all, fields(property_id = tracing::field::Empty))]
pub async fn save(
    ctx: Context,
    id: Result<Path<property::Id>, PathRejection>,
) -> Result<StatusCode, Error> {
    let Path(property_id) = id.map_err(AsError::into_error)?;
    _ = tracing::Span::current()
        .record("property_id", property_id.to_string());
    let session = ctx.current_session().await?;

    ctx.service()
        .execute(command::SaveProperty {
            by: session.user_id,
            property_id,
        })
        .await
        .map_err(AsError::into_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Removes a [`Property`] from the saved ones of the authenticated user.
///
/// # Errors
///
/// If the request is not authenticated.
///
/// [`Property`]: service::domain::Property
#[tracing::instrument(skip_all, fields(property_id = tracing::field::Empty))]
pub async fn unsave(
    ctx: Context,
    id: Result<Path<property::Id>, PathRejection>,
) -> Result<StatusCode, Error> {
    let Path(property_id) = id.map_err(AsError::into_error)?;
    _ = tracing::Span::current()
        .record("property_id", property_id.to_string());
    let session = ctx.current_session().await?;

    ctx.service()
        .execute(command::UnsaveProperty {
            by: session.user_id,
            property_id,
        })
        .await
        .map_err(AsError::into_error)?;
    Ok(StatusCode::NO_CONTENT)
}

impl AsError for command::save_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PropertyNotExists(_) => Some(NotFoundError::Property.into()),
        }
    }
}

impl AsError for command::unsave_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
        }
    }
}
