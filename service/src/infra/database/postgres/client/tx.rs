//! [`Tx`] client definitions.

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard};
use tokio_postgres::{types::ToSql, Row, ToStatement};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{self, connection, Connection},
};

/// Transactional Postgres database client.
///
/// Pins a single [`Connection`] for its whole lifetime and runs every
/// operation inside a `BEGIN`/`COMMIT` block on it. Dropping an uncommitted
/// [`Tx`] detaches the pinned [`Connection`] from its [`connection::Pool`],
/// so the open transaction dies with it and is rolled back by the server.
#[derive(Clone, Debug)]
pub struct Tx {
    /// Inner representation of this client.
    inner: Arc<Inner>,
}

/// Inner representation of the [`Tx`] client.
#[derive(Debug)]
struct Inner {
    /// Pinned [`Connection`] the transaction runs on.
    ///
    /// [`None`] once the transaction has been committed.
    conn: RwLock<Option<connection::NonTx>>,
}

impl Tx {
    /// Creates a new [`Tx`] client by starting a transaction on a
    /// [`Connection`] checked out of the provided [`connection::Pool`].
    ///
    /// # Errors
    ///
    /// If failed to check a [`Connection`] out, or to start a transaction.
    pub(crate) async fn begin(
        pool: &connection::Pool,
    ) -> Result<Self, Traced<database::Error>> {
        let conn = pool
            .get()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)?;
        conn.batch_exec("BEGIN").await.map_err(tracerr::wrap!())?;
        Ok(Self {
            inner: Arc::new(Inner {
                conn: RwLock::new(Some(conn)),
            }),
        })
    }

    /// Returns the pinned [`Connection`] of this [`Tx`] client.
    ///
    /// # Panics
    ///
    /// If this [`Tx`] client has been committed already.
    async fn connection(
        &self,
    ) -> RwLockReadGuard<'_, connection::NonTx> {
        RwLockReadGuard::map(self.inner.conn.read().await, |conn| {
            conn.as_ref().expect("already committed")
        })
    }

    /// Commits this [`Tx`] client.
    ///
    /// # Errors
    ///
    /// If failed to commit transaction of this [`Tx`] client.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        if let Some(conn) = self.inner.conn.write().await.take() {
            conn.batch_exec("COMMIT").await.map_err(tracerr::wrap!())?;
        }
        Ok(())
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.get_mut().take() {
            // Uncommitted transaction: the connection cannot be returned to
            // the pool, so detach and close it instead.
            drop(deadpool_postgres::Object::take(conn));
        }
    }
}

impl Connection for Tx {
    async fn query<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.connection()
            .await
            .query(stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }

    async fn query_opt<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.connection()
            .await
            .query_opt(stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }

    async fn exec<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.connection()
            .await
            .exec(stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }

    async fn batch_exec(
        &self,
        query: &str,
    ) -> Result<(), Traced<database::Error>> {
        self.connection()
            .await
            .batch_exec(query)
            .await
            .map_err(tracerr::wrap!())
    }
}
