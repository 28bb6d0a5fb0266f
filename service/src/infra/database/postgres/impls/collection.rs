//! [`Collection`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{
        collection::{self, favourite_genres, Membership},
        movie, Collection, Movie,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::collection::{list, WithMovies},
};

impl<C> Database<Insert<Collection>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(coll): Insert<Collection>,
    ) -> Result<Self::Ok, Self::Err> {
        let Collection {
            id,
            title,
            description,
        } = coll;

        const SQL: &str = "\
            INSERT INTO collections (id, title, description) \
            VALUES ($1::UUID, $2::VARCHAR, $3::TEXT)";
        self.exec(SQL, &[&id, &title, &description])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Update<Collection>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(coll): Update<Collection>,
    ) -> Result<Self::Ok, Self::Err> {
        let Collection {
            id,
            title,
            description,
        } = coll;

        const SQL: &str = "\
            UPDATE collections \
            SET title = $2::VARCHAR, \
                description = $3::TEXT \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id, &title, &description])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<Option<Collection>, collection::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Collection>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Collection>, collection::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT id, title, description \
            FROM collections \
            WHERE id = $1::UUID \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| Collection {
                id: row.get("id"),
                title: row.get("title"),
                description: row.get("description"),
            }))
    }
}

impl<C> Database<Delete<By<Collection, collection::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Collection, collection::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        // Memberships go away via `ON DELETE CASCADE`, movies stay.
        const SQL: &str = "DELETE FROM collections WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Insert<Membership>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(membership): Insert<Membership>,
    ) -> Result<Self::Ok, Self::Err> {
        let Membership { collection, movie } = membership;

        const SQL: &str = "\
            INSERT INTO collection_movies (collection_id, movie_id) \
            VALUES ($1::UUID, $2::UUID) \
            ON CONFLICT (collection_id, movie_id) DO NOTHING";
        self.exec(SQL, &[&collection, &movie])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<Membership, collection::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Membership, collection::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM collection_movies WHERE collection_id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<Vec<Movie>, collection::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Movie>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Movie>, collection::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT m.id, m.title, m.description, m.genres \
            FROM movies AS m \
            JOIN collection_movies AS cm ON cm.movie_id = m.id \
            WHERE cm.collection_id = $1::UUID \
            ORDER BY m.title";
        Ok(self
            .query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| Movie {
                id: row.get("id"),
                title: row.get("title"),
                description: row.get("description"),
                genres: row.get("genres"),
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<WithMovies>, collection::Id>>>
    for Postgres<C>
where
    C: Connection,
    Self: Database<
            Select<By<Option<Collection>, collection::Id>>,
            Ok = Option<Collection>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Movie>, collection::Id>>,
            Ok = Vec<Movie>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Option<WithMovies>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<WithMovies>, collection::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let Some(collection) = self
            .execute(Select(By::<Option<Collection>, _>::new(id)))
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        let movies = self
            .execute(Select(By::<Vec<Movie>, _>::new(id)))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(Some(WithMovies { collection, movies }))
    }
}

impl<C> Database<Select<By<Vec<list::Item>, list::All>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<list::Item>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<Vec<list::Item>, list::All>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT c.id, c.title, c.description, m.genres \
            FROM collections AS c \
            LEFT JOIN collection_movies AS cm ON cm.collection_id = c.id \
            LEFT JOIN movies AS m ON m.id = cm.movie_id \
            ORDER BY c.id, cm.movie_id";
        let rows = self.query(SQL, &[]).await.map_err(tracerr::wrap!())?;

        let mut items = Vec::<(list::Item, Vec<movie::Genres>)>::new();
        for row in rows {
            let id: collection::Id = row.get("id");
            let genres: Option<movie::Genres> = row.get("genres");

            if items.last().is_none_or(|(item, _)| item.id != id) {
                items.push((
                    list::Item {
                        id,
                        title: row.get("title"),
                        description: row.get("description"),
                        favourite_genres: Vec::new(),
                    },
                    Vec::new(),
                ));
            }
            if let (Some((_, all)), Some(genres)) = (items.last_mut(), genres)
            {
                all.push(genres);
            }
        }

        Ok(items
            .into_iter()
            .map(|(mut item, genres)| {
                item.favourite_genres = favourite_genres(&genres);
                item
            })
            .collect())
    }
}
