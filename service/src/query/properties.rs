//! [`Query`] collection related to the multiple [`Property`] listings.

use common::operations::By;

use crate::{domain::user, read};
#[cfg(doc)]
use crate::{domain::Property, Query};

use super::DatabaseQuery;

/// Queries a filtered and sorted page of the public [`Property`] listings.
pub type List = DatabaseQuery<
    By<read::property::list::Page, read::property::list::Selector>,
>;

/// Queries a page of [`Property`] listings owned by a single [`User`].
///
/// [`User`]: crate::domain::User
pub type Owned = DatabaseQuery<
    By<read::property::owned::Page, read::property::owned::Selector>,
>;

/// Queries the featured [`Property`] listings.
pub type Featured = DatabaseQuery<By<read::property::featured::List, ()>>;

/// Queries the [`Property`] listings saved by a [`User`].
///
/// [`User`]: crate::domain::User
pub type Saved = DatabaseQuery<By<read::property::saved::List, user::Id>>;
