//! [`Command`] for changing a [`Property`] status.

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{property, user, Property},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for changing a [`property::Status`] of a [`Property`].
///
/// The [`Property`] stays locked from reading till persisting.
#[derive(Clone, Copy, Debug)]
pub struct UpdatePropertyStatus {
    /// ID of the [`Property`] to change the status of.
    pub id: property::Id,

    /// ID of the [`User`] performing the change.
    ///
    /// [`User`]: crate::domain::User
    pub by: user::Id,

    /// [`user::Role`] of the [`User`] performing the change.
    ///
    /// [`User`]: crate::domain::User
    pub role: user::Role,

    /// New [`property::Status`].
    pub status: property::Status,
}

impl<Db, St> Command<UpdatePropertyStatus> for Service<Db, St>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Property, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<Update<Property>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Property;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdatePropertyStatus,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdatePropertyStatus {
            id,
            by,
            role,
            status,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Lock(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        let mut property = tx
            .execute(Select(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::PropertyNotExists(id))
            .map_err(tracerr::wrap!())?;

        if !property.is_manageable_by(by, role) {
            return Err(tracerr::new!(E::NotAllowed(by)));
        }

        let previous = property.status;
        property.status = status;
        property.updated_at = DateTime::now().coerce();

        tx.execute(Update(property.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tracing::info!(
            property_id = %id,
            from = %previous,
            to = %status,
            "property status changed",
        );

        Ok(property)
    }
}

/// Error of [`UpdatePropertyStatus`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Property`] with the provided ID does not exist.
    #[display("`Property(id: {_0})` does not exist")]
    #[from(ignore)]
    PropertyNotExists(#[error(not(source))] property::Id),

    /// [`User`] is neither the owner of the [`Property`] nor allowed to
    /// manage any.
    ///
    /// [`User`]: crate::domain::User
    #[display("`User(id: {_0})` cannot manage the `Property`")]
    #[from(ignore)]
    NotAllowed(#[error(not(source))] user::Id),
}
