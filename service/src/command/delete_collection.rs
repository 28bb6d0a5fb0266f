//! [`Command`] for deleting a [`Collection`].

use common::operations::{By, Delete, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Movie;
use crate::{
    domain::{collection, Collection},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Collection`].
///
/// Only the [`Collection`] and its membership links are removed: member
/// [`Movie`]s are shared and stay in the catalog.
#[derive(Clone, Copy, Debug, From)]
pub struct DeleteCollection {
    /// ID of the [`Collection`] to delete.
    pub id: collection::Id,
}

impl<Db> Command<DeleteCollection> for Service<Db>
where
    Db: Database<
            Select<By<Option<Collection>, collection::Id>>,
            Ok = Option<Collection>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Collection, collection::Id>>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteCollection,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteCollection { id } = cmd;

        drop(
            self.database()
                .execute(Select(By::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or_else(|| E::NotExists(id))
                .map_err(tracerr::wrap!())?,
        );

        self.database()
            .execute(Delete(By::<Collection, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)
    }
}

/// Error of [`DeleteCollection`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Collection`] with the provided ID does not exist.
    #[display("`Collection(id: {_0})` does not exist")]
    #[from(ignore)]
    NotExists(#[error(not(source))] collection::Id),
}
