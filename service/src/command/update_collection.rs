//! [`Command`] for updating an existing [`Collection`].

use common::operations::{
    By, Commit, Delete, Insert, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        collection::{self, Membership, MovieSpec},
        movie, Collection, Movie,
    },
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for updating an existing [`Collection`].
#[derive(Clone, Debug)]
pub struct UpdateCollection {
    /// ID of the [`Collection`] to update.
    pub id: collection::Id,

    /// New [`collection::Title`], if provided.
    pub title: Option<collection::Title>,

    /// New [`collection::Description`], if provided.
    pub description: Option<collection::Description>,

    /// [`MovieSpec`]s fully replacing the membership, if provided.
    ///
    /// [`None`] leaves the membership untouched.
    pub movies: Option<Vec<MovieSpec>>,
}

impl<Db> Command<UpdateCollection> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Collection>, collection::Id>>,
            Ok = Option<Collection>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Movie>, collection::Id>>,
            Ok = Vec<Movie>,
            Err = Traced<database::Error>,
        > + Database<Update<Collection>, Err = Traced<database::Error>>
        + Database<
            Delete<By<Membership, collection::Id>>,
            Err = Traced<database::Error>,
        > + for<'t> Database<
            Select<By<Option<Movie>, &'t movie::Title>>,
            Ok = Option<Movie>,
            Err = Traced<database::Error>,
        > + Database<Insert<Movie>, Err = Traced<database::Error>>
        + Database<Insert<Membership>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = read::collection::WithMovies;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateCollection,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateCollection {
            id,
            title,
            description,
            movies,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut collection = tx
            .execute(Select(By::<Option<Collection>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::NotExists(id))
            .map_err(tracerr::wrap!())?;

        if let Some(title) = title {
            collection.title = title;
        }
        if let Some(description) = description {
            collection.description = description;
        }
        tx.execute(Update(collection.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        // Replacing the membership happens in the same transaction, so an
        // empty intermediate state is never observable.
        let movies = if let Some(specs) = movies {
            tx.execute(Delete(By::<Membership, _>::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
            super::attach_movie_specs(&tx, id, specs)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
        } else {
            tx.execute(Select(By::<Vec<Movie>, _>::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
        };

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(read::collection::WithMovies { collection, movies })
    }
}

/// Error of [`UpdateCollection`] [`Command`] execution.
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
