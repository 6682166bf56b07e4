//! [`Command`] for creating a new [`User`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Email, Name, Password, Phone, Role};
use crate::{
    domain::{
        user::{self, Capability},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`User`].
#[derive(Debug)]
pub struct CreateUser {
    /// [`Name`] of a new [`User`].
    pub name: user::Name,

    /// [`Email`] of a new [`User`].
    pub email: user::Email,

    /// [`Password`] of a new [`User`].
    pub password: SecretBox<user::Password>,

    /// [`Phone`] of a new [`User`].
    pub phone: Option<user::Phone>,

    /// [`Role`] of a new [`User`].
    pub role: user::Role,
}

impl<Db, St> Command<CreateUser> for Service<Db, St>
where
    Db: for<'l> Database<
            Select<By<Option<User>, &'l user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<User>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser {
            name,
            email,
            password,
            phone,
            role,
        } = cmd;

        if !role.can(Capability::SelfAssign) {
            return Err(tracerr::new!(E::RoleNotAssignable(role)));
        }

        let existing = self
            .database()
            .execute(Select(By::new(&email)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if existing.is_some() {
            return Err(tracerr::new!(E::EmailOccupied(email)));
        }

        let password_hash = user::PasswordHash::new(password.expose_secret())
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let user = User {
            id: user::Id::new(),
            name,
            email,
            password_hash,
            phone,
            role,
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(user.clone()))
            .await
            .map_err(|e| {
                if e.as_ref()
                    .is_unique_violation(database::constraint::USERS_EMAIL)
                {
                    tracerr::new!(E::EmailOccupied(user.email.clone()))
                } else {
                    tracerr::map_from_and_wrap!(=> E)(e)
                }
            })
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tracing::info!(user_id = %user.id, role = %user.role, "user created");

        Ok(user)
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`user::Email`] is already occupied.
    #[display("`{_0}` email is occupied")]
    #[from(ignore)]
    EmailOccupied(#[error(not(source))] user::Email),

    /// [`user::Password`] hashing failed.
    #[display("Failed to hash a password: {_0}")]
    PasswordHash(argon2::password_hash::Error),

    /// [`user::Role`] cannot be assigned on a registration.
    #[display("`{_0}` role cannot be self-assigned")]
    #[from(ignore)]
    RoleNotAssignable(#[error(not(source))] user::Role),
}
