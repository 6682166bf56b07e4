//! Postgres database client definitions.

use std::sync::Arc;

use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use tokio_postgres::{types::ToSql, Row, ToStatement};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{self, connection, Connection},
};

/// Non-transactional Postgres database client.
///
/// Every operation runs on a connection taken from the [`connection::Pool`]
/// for the duration of that operation only.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// [`connection::Pool`] to take connections from.
    pool: connection::Pool,
}

impl NonTx {
    /// Creates a new [`NonTx`] client from the provided [`connection::Pool`].
    #[must_use]
    pub(crate) fn from_pool(pool: connection::Pool) -> Self {
        Self { pool }
    }

    /// Returns the [`connection::Pool`] of this [`NonTx`] client.
    pub(crate) fn pool(&self) -> &connection::Pool {
        &self.pool
    }

    /// Takes a [`connection::Pooled`] connection from the pool.
    pub(crate) async fn pooled(
        &self,
    ) -> Result<connection::Pooled, Traced<database::Error>> {
        self.pool
            .get()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}

impl Connection for NonTx {
    async fn query<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, Traced<database::Error>>
    where
        T: ToStatement + Send + Sync + ?Sized,
    {
        let conn = self.pooled().await.map_err(tracerr::wrap!())?;
        Connection::query(&conn, stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }

    async fn query_opt<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, Traced<database::Error>>
    where
        T: ToStatement + Send + Sync + ?Sized,
    {
        let conn = self.pooled().await.map_err(tracerr::wrap!())?;
        Connection::query_opt(&conn, stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }

    async fn exec<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, Traced<database::Error>>
    where
        T: ToStatement + Send + Sync + ?Sized,
    {
        let conn = self.pooled().await.map_err(tracerr::wrap!())?;
        Connection::exec(&conn, stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }
}

/// Transactional Postgres database client.
///
/// The transaction is begun lazily on the first operation, and rolled back
/// if the client is dropped without being committed.
#[derive(Clone, Debug)]
pub struct Tx {
    /// [`connection::Pool`] to take a connection for the transaction from.
    pool: connection::Pool,

    /// Lazily begun [`connection::Tx`].
    tx: Arc<Mutex<Option<connection::Tx>>>,
}

impl Tx {
    /// Creates a new [`Tx`] client from the provided [`NonTx`] client.
    #[must_use]
    pub fn from_non_tx(client: &NonTx) -> Self {
        Self {
            pool: client.pool().clone(),
            tx: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns the underlying [`connection::Tx`] of this [`Tx`] client,
    /// beginning it if required.
    async fn connection(
        &self,
    ) -> Result<MappedMutexGuard<'_, connection::Tx>, Traced<database::Error>>
    {
        let mut guard = self.tx.lock().await;
        if guard.is_none() {
            let pooled = self
                .pool
                .get()
                .await
                .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                .map_err(tracerr::map_from)?;
            *guard = Some(
                connection::Tx::begin(pooled)
                    .await
                    .map_err(tracerr::wrap!())?,
            );
        }
        Ok(MutexGuard::map(guard, |tx| {
            tx.as_mut().expect("initialized above")
        }))
    }

    /// Commits this [`Tx`] client.
    ///
    /// # Errors
    ///
    /// If failed to commit transaction of this [`Tx`] client.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        let Some(tx) = self.tx.lock().await.take() else {
            // Nothing has been done in the transaction.
            return Ok(());
        };
        tx.commit().await.map_err(tracerr::wrap!())
    }
}

impl Connection for Tx {
    async fn query<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, Traced<database::Error>>
    where
        T: ToStatement + Send + Sync + ?Sized,
    {
        let conn = self.connection().await.map_err(tracerr::wrap!())?;
        Connection::query(conn.tx(), stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }

    async fn query_opt<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, Traced<database::Error>>
    where
        T: ToStatement + Send + Sync + ?Sized,
    {
        let conn = self.connection().await.map_err(tracerr::wrap!())?;
        Connection::query_opt(conn.tx(), stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }

    async fn exec<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, Traced<database::Error>>
    where
        T: ToStatement + Send + Sync + ?Sized,
    {
        let conn = self.connection().await.map_err(tracerr::wrap!())?;
        Connection::exec(conn.tx(), stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use super::{connection, Connection, NonTx, Tx};

    fn is_connection<C: Connection>() {}

    #[test]
    fn pooled_and_transaction_connections_query() {
        is_connection::<connection::Pooled>();
        is_connection::<deadpool_postgres::Transaction<'static>>();
        is_connection::<NonTx>();
        is_connection::<Tx>();
    }
}
