//! [`Command`] for deleting a [`Property`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        property::{self, ImageUrl},
        user, Property,
    },
    infra::{database, storage, Database, Storage},
    Service,
};

use super::{remove_images, Command};

/// [`Command`] for deleting a [`Property`] along with its saved
/// associations and stored images.
#[derive(Clone, Copy, Debug)]
pub struct DeleteProperty {
    /// ID of the [`Property`] to delete.
    pub id: property::Id,

    /// ID of the [`User`] performing the deletion.
    ///
    /// [`User`]: crate::domain::User
    pub by: user::Id,

    /// [`user::Role`] of the [`User`] performing the deletion.
    ///
    /// [`User`]: crate::domain::User
    pub role: user::Role,
}

impl<Db, St> Command<DeleteProperty> for Service<Db, St>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Property, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Property, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
    St: Storage<Delete<ImageUrl>, Ok = (), Err = Traced<storage::Error>>,
{
    type Ok = Property;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteProperty { id, by, role } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Lock(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        let property = tx
            .execute(Select(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::PropertyNotExists(id))
            .map_err(tracerr::wrap!())?;

        if !property.is_manageable_by(by, role) {
            return Err(tracerr::new!(E::NotAllowed(by)));
        }

        tx.execute(Delete(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        remove_images(self.storage(), property.images.clone()).await;

        tracing::info!(property_id = %id, "property deleted");

        Ok(property)
    }
}

/// Error of [`DeleteProperty`] [`Command`] execution.
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
