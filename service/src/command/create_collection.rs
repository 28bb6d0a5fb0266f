//! [`Command`] for creating a new [`Collection`].

use common::operations::{
    By, Commit, Insert, Select, Transact, Transacted,
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

/// [`Command`] for creating a new [`Collection`].
#[derive(Clone, Debug)]
pub struct CreateCollection {
    /// [`collection::Title`] of a new [`Collection`].
    pub title: collection::Title,

    /// [`collection::Description`] of a new [`Collection`].
    pub description: collection::Description,

    /// [`MovieSpec`]s of the initial member [`Movie`]s.
    pub movies: Vec<MovieSpec>,
}

impl<Db> Command<CreateCollection> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Collection>, Err = Traced<database::Error>>
        + for<'t> Database<
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
        cmd: CreateCollection,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateCollection {
            title,
            description,
            movies,
        } = cmd;

        let collection = Collection {
            id: collection::Id::new(),
            title,
            description,
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Insert(collection.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        let movies = super::attach_movie_specs(&tx, collection.id, movies)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(read::collection::WithMovies { collection, movies })
    }
}

/// Error of [`CreateCollection`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}
