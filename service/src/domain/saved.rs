//! [`SavedProperty`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};

#[cfg(doc)]
use crate::domain::{Property, User};
use crate::domain::{property, user};

/// [`Property`] bookmarked by a [`User`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SavedProperty {
    /// ID of the [`User`] who saved the [`Property`].
    pub user_id: user::Id,

    /// ID of the saved [`Property`].
    pub property_id: property::Id,

    /// [`DateTime`] when the [`Property`] was saved.
    pub saved_at: SavingDateTime,
}

/// [`DateTime`] when a [`Property`] was saved by a [`User`].
pub type SavingDateTime = DateTimeOf<(SavedProperty, unit::Creation)>;
