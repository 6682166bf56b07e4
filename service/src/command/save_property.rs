//! [`Command`] for saving a [`Property`].

use common::{
    operations::{By, Insert, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::{property, user, Property, SavedProperty},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for bookmarking a [`Property`] by a [`User`].
///
/// Saving an already saved [`Property`] keeps the original
/// [`SavedProperty::saved_at`].
#[derive(Clone, Copy, Debug)]
pub struct SaveProperty {
    /// ID of the [`User`] saving the [`Property`].
    pub by: user::Id,

    /// ID of the [`Property`] to save.
    pub property_id: property::Id,
}

impl<Db, St> Command<SaveProperty> for Service<Db, St>
where
    Db: Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<Insert<SavedProperty>, Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: SaveProperty) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SaveProperty { by, property_id } = cmd;

        _ = self
            .database()
            .execute(Select(By::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::PropertyNotExists(property_id))
            .map_err(tracerr::wrap!())?;

        self.database()
            .execute(Insert(SavedProperty {
                user_id: by,
                property_id,
                saved_at: DateTime::now().coerce(),
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)
    }
}

/// Error of [`SaveProperty`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Property`] with the provided ID does not exist.
    #[display("`Property(id: {_0})` does not exist")]
    #[from(ignore)]
    PropertyNotExists(#[error(not(source))] property::Id),
}
