//! [`Database`]-related implementations.

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use derive_more::{Display, Error as StdError, From};

pub use self::memory::Memory;
#[cfg(feature = "postgres")]
pub use self::postgres::Postgres;

/// Database operation.
pub use common::Handler as Database;

/// Names of the unique constraints of a [`Database`].
pub mod constraint {
    /// Uniqueness of [`User`] emails.
    ///
    /// [`User`]: crate::domain::User
    pub const USERS_EMAIL: &str = "users_email_key";
}

/// [`Database`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// [`Memory`] error.
    Memory(memory::Error),

    #[cfg(feature = "postgres")]
    /// [`Postgres`] error.
    Postgres(postgres::Error),
}

impl Error {
    /// Checks whether this [`Error`] is a violation of the unique constraint
    /// with the provided name.
    #[must_use]
    pub fn is_unique_violation(&self, constraint: &str) -> bool {
        match self {
            Self::Memory(e) => e.is_unique_violation(constraint),
            #[cfg(feature = "postgres")]
            Self::Postgres(e) => e.is_unique_violation(Some(constraint)),
        }
    }
}
