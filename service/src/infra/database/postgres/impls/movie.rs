//! [`Movie`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{movie, Movie},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<'t, C> Database<Select<By<Option<Movie>, &'t movie::Title>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Movie>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Movie>, &'t movie::Title>>,
    ) -> Result<Self::Ok, Self::Err> {
        let title = by.into_inner();

        const SQL: &str = "\
            SELECT id, title, description, genres \
            FROM movies \
            WHERE title = $1::VARCHAR \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&title])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| Movie {
                id: row.get("id"),
                title: row.get("title"),
                description: row.get("description"),
                genres: row.get("genres"),
            }))
    }
}

impl<C> Database<Insert<Movie>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(movie): Insert<Movie>,
    ) -> Result<Self::Ok, Self::Err> {
        let Movie {
            id,
            title,
            description,
            genres,
        } = movie;

        const SQL: &str = "\
            INSERT INTO movies (id, title, description, genres) \
            VALUES ($1::UUID, $2::VARCHAR, $3::TEXT, $4::TEXT)";
        self.exec(SQL, &[&id, &title, &description, &genres])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
