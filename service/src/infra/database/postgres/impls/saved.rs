//! [`SavedProperty`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select};
use itertools::Itertools as _;
use tracerr::Traced;

use crate::{
    domain::{property, user, SavedProperty},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

use super::property::{from_row, COLUMNS};

impl<C> Database<Insert<SavedProperty>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(saved): Insert<SavedProperty>,
    ) -> Result<Self::Ok, Self::Err> {
        let SavedProperty {
            user_id,
            property_id,
            saved_at,
        } = saved;

        const SQL: &str = "\
            INSERT INTO saved_properties (user_id, property_id, saved_at) \
            VALUES ($1::UUID, $2::UUID, $3::TIMESTAMPTZ) \
            ON CONFLICT (user_id, property_id) DO NOTHING";
        self.exec(SQL, &[&user_id, &property_id, &saved_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<SavedProperty, (user::Id, property::Id)>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<SavedProperty, (user::Id, property::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (user_id, property_id) = by.into_inner();

        const SQL: &str = "\
            DELETE FROM saved_properties \
            WHERE user_id = $1::UUID \
              AND property_id = $2::UUID";
        self.exec(SQL, &[&user_id, &property_id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<read::property::saved::List, user::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::property::saved::List;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::property::saved::List, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let user_id: user::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM saved_properties \
             INNER JOIN properties \
                     ON properties.id = saved_properties.property_id \
             WHERE saved_properties.user_id = $1::UUID \
             ORDER BY saved_properties.saved_at DESC, properties.id ASC",
        );
        self.query(&sql, &[&user_id])
            .await
            .map_err(tracerr::wrap!())
            .map(|rows| rows.iter().map(from_row).collect_vec().into())
    }
}
