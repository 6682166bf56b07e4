//! In-memory document store [`Database`] implementation.
//!
//! Keeps the whole dataset behind a single [`RwLock`]. A transaction holds
//! the write lock for its whole lifetime and works on a staged copy, so
//! transactions are serialized and changes become visible only on [`Commit`].
//!
//! [`Commit`]: common::operations::Commit

mod impls;

use std::{collections::HashMap, future::Future, sync::Arc};

use derive_more::{Deref, Display, Error as StdError};
use tokio::sync::{Mutex, OwnedRwLockWriteGuard, RwLock};
use tracerr::Traced;

#[cfg(doc)]
use crate::infra::Database;
use crate::{
    domain::{property, user, Property, SavedProperty, User},
    infra::database,
};

/// In-memory [`Database`] client.
#[derive(Clone, Debug, Deref)]
pub struct Memory<T = NonTx>(T);

impl Memory {
    /// Creates a new empty [`Memory`] store.
    #[must_use]
    pub fn new() -> Self {
        Self(NonTx(Arc::default()))
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

/// Documents stored in a [`Memory`] store.
#[derive(Clone, Debug, Default)]
pub struct Documents {
    /// Stored [`User`]s.
    users: HashMap<user::Id, User>,

    /// Stored [`Property`] listings.
    properties: HashMap<property::Id, Property>,

    /// Stored [`SavedProperty`] associations.
    saved: HashMap<(user::Id, property::Id), SavedProperty>,
}

/// Access to [`Documents`] of a [`Memory`] store.
pub trait Access {
    /// Reads the [`Documents`] with the provided function.
    ///
    /// # Errors
    ///
    /// If the [`Documents`] are not accessible anymore.
    fn read<R>(
        &self,
        f: impl FnOnce(&Documents) -> R,
    ) -> impl Future<Output = Result<R, Traced<database::Error>>>;

    /// Modifies the [`Documents`] with the provided function.
    ///
    /// # Errors
    ///
    /// If the [`Documents`] are not accessible anymore, or the provided
    /// function fails.
    fn write<R>(
        &self,
        f: impl FnOnce(&mut Documents) -> Result<R, Error>,
    ) -> impl Future<Output = Result<R, Traced<database::Error>>>;
}

/// Non-transactional [`Memory`] client.
#[derive(Clone, Debug)]
pub struct NonTx(Arc<RwLock<Documents>>);

impl Access for NonTx {
    async fn read<R>(
        &self,
        f: impl FnOnce(&Documents) -> R,
    ) -> Result<R, Traced<database::Error>> {
        Ok(f(&*self.0.read().await))
    }

    async fn write<R>(
        &self,
        f: impl FnOnce(&mut Documents) -> Result<R, Error>,
    ) -> Result<R, Traced<database::Error>> {
        f(&mut *self.0.write().await)
            .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

/// Transactional [`Memory`] client.
#[derive(Clone, Debug)]
pub struct Tx(Arc<Mutex<Option<Staged>>>);

/// Changes staged by a [`Tx`].
#[derive(Debug)]
struct Staged {
    /// Exclusive lock of the [`Memory`] store.
    guard: OwnedRwLockWriteGuard<Documents>,

    /// Staged copy of the [`Documents`].
    docs: Documents,
}

impl Tx {
    /// Starts a new [`Tx`] in the provided [`NonTx`] store, waiting for all
    /// the other transactions to finish.
    async fn begin(store: &NonTx) -> Self {
        let guard = Arc::clone(&store.0).write_owned().await;
        let docs = guard.clone();
        Self(Arc::new(Mutex::new(Some(Staged { guard, docs }))))
    }

    /// Applies the staged changes and releases the store.
    async fn commit(&self) -> Result<(), Traced<database::Error>> {
        let Staged { mut guard, docs } = self
            .0
            .lock()
            .await
            .take()
            .ok_or(Error::Committed)
            .map_err(tracerr::from_and_wrap!(=> database::Error))?;
        *guard = docs;
        Ok(())
    }
}

impl Access for Tx {
    async fn read<R>(
        &self,
        f: impl FnOnce(&Documents) -> R,
    ) -> Result<R, Traced<database::Error>> {
        let staged = self.0.lock().await;
        let staged = staged
            .as_ref()
            .ok_or(Error::Committed)
            .map_err(tracerr::from_and_wrap!(=> database::Error))?;
        Ok(f(&staged.docs))
    }

    async fn write<R>(
        &self,
        f: impl FnOnce(&mut Documents) -> Result<R, Error>,
    ) -> Result<R, Traced<database::Error>> {
        let mut staged = self.0.lock().await;
        let staged = staged
            .as_mut()
            .ok_or(Error::Committed)
            .map_err(tracerr::from_and_wrap!(=> database::Error))?;
        f(&mut staged.docs).map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

/// [`Memory`] store error.
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Transaction is used after being committed.
    #[display("Transaction is already committed")]
    Committed,

    /// Unique constraint is violated.
    #[display("Unique constraint `{_0}` is violated")]
    UniqueViolation(#[error(not(source))] &'static str),
}

impl Error {
    /// Checks if this [`Error`] is a violation of the provided unique
    /// constraint.
    #[must_use]
    pub fn is_unique_violation(&self, constraint: &str) -> bool {
        matches!(self, Self::UniqueViolation(c) if *c == constraint)
    }
}
