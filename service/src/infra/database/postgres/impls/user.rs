//! [`User`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Columns of the `users` table.
const COLUMNS: &str = "\
    id, name, \
    email, password_hash, \
    phone, role, \
    created_at";

/// Builds a [`User`] out of the provided [`Row`] selected with [`COLUMNS`].
fn from_row(row: &Row) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        phone: row.get("phone"),
        role: row.get("role"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<User>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: user::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM users \
             WHERE id = $1::UUID \
             LIMIT 1",
        );
        self.query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(from_row))
    }
}

impl<'l, C> Database<Select<By<Option<User>, &'l user::Email>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM users \
             WHERE email = $1::VARCHAR \
             LIMIT 1",
        );
        self.query_opt(&sql, &[email])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(from_row))
    }
}

impl<C> Database<Insert<User>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<User>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(user)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<User>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(user): Update<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let User {
            id,
            name,
            email,
            password_hash,
            phone,
            role,
            created_at,
        } = user;

        const SQL: &str = "\
            INSERT INTO users (\
                id, name, \
                email, password_hash, \
                phone, role, \
                created_at\
            ) \
            VALUES (\
                $1::UUID, $2::VARCHAR, \
                $3::VARCHAR, $4::VARCHAR, \
                $5::VARCHAR, $6::INT2, \
                $7::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET name = EXCLUDED.name, \
                email = EXCLUDED.email, \
                password_hash = EXCLUDED.password_hash, \
                phone = EXCLUDED.phone, \
                role = EXCLUDED.role";
        self.exec(
            SQL,
            &[
                &id,
                &name,
                &email,
                &password_hash,
                &phone,
                &role,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
