//! [`Command`] for removing a [`Property`] from the saved ones.

use common::operations::{By, Delete};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{Property, User};
use crate::{
    domain::{property, user, SavedProperty},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for removing a [`Property`] from the ones saved by a
/// [`User`].
///
/// Does nothing if the [`Property`] is not saved.
#[derive(Clone, Copy, Debug)]
pub struct UnsaveProperty {
    /// ID of the [`User`] who saved the [`Property`].
    pub by: user::Id,

    /// ID of the [`Property`] to unsave.
    pub property_id: property::Id,
}

impl<Db, St> Command<UnsaveProperty> for Service<Db, St>
where
    Db: Database<
        Delete<By<SavedProperty, (user::Id, property::Id)>>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UnsaveProperty,
    ) -> Result<Self::Ok, Self::Err> {
        let UnsaveProperty { by, property_id } = cmd;

        self.database()
            .execute(Delete(By::new((by, property_id))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))
            .map(drop)
    }
}

/// Error of [`UnsaveProperty`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}
