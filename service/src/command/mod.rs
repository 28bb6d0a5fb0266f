//! [`Command`] definition.

pub mod authorize_user_session;
pub mod create_collection;
pub mod create_user;
pub mod create_user_session;
pub mod delete_collection;
pub mod refresh_user_session;
pub mod update_collection;

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{
        collection::{self, Membership, MovieSpec},
        movie, Movie,
    },
    infra::{database, Database},
};

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_user_session::AuthorizeUserSession,
    create_collection::CreateCollection, create_user::CreateUser,
    create_user_session::CreateUserSession,
    delete_collection::DeleteCollection,
    refresh_user_session::RefreshUserSession,
    update_collection::UpdateCollection,
};

/// Attaches the provided [`MovieSpec`]s to a [`Collection`] within the given
/// transactional [`Database`], getting-or-creating every [`Movie`] by its
/// [`movie::Title`].
///
/// Returns the resolved member [`Movie`]s, deduplicated: [`MovieSpec`]s
/// sharing a [`movie::Title`] resolve to a single [`Movie`].
///
/// [`Collection`]: crate::domain::Collection
pub(crate) async fn attach_movie_specs<Tx>(
    tx: &Tx,
    collection: collection::Id,
    specs: Vec<MovieSpec>,
) -> Result<Vec<Movie>, Traced<database::Error>>
where
    Tx: for<'t> Database<
            Select<By<Option<Movie>, &'t movie::Title>>,
            Ok = Option<Movie>,
            Err = Traced<database::Error>,
        > + Database<Insert<Movie>, Err = Traced<database::Error>>
        + Database<Insert<Membership>, Err = Traced<database::Error>>,
{
    let mut movies = Vec::<Movie>::new();
    for spec in specs {
        let existing = tx
            .execute(Select(By::new(&spec.title)))
            .await
            .map_err(tracerr::wrap!())?;
        let movie = if let Some(movie) = existing {
            movie
        } else {
            let movie = Movie {
                id: movie::Id::new(),
                title: spec.title,
                description: spec.description,
                genres: spec.genres,
            };
            tx.execute(Insert(movie.clone()))
                .await
                .map_err(tracerr::wrap!())
                .map(drop)?;
            movie
        };

        tx.execute(Insert(Membership {
            collection,
            movie: movie.id,
        }))
        .await
        .map_err(tracerr::wrap!())
        .map(drop)?;

        if !movies.iter().any(|m| m.id == movie.id) {
            movies.push(movie);
        }
    }

    Ok(movies)
}
