//! Collection CRUD endpoints.

use std::collections::BTreeSet;

use axum::{extract::Path, Json};
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{collection, movie, Movie},
    query, read,
};
use uuid::Uuid;

use crate::{define_error, AsError, Context, Error};

/// JSON representation of a [`Movie`].
#[derive(Clone, Debug, Serialize)]
pub struct MovieBody {
    /// ID of the [`Movie`].
    pub uuid: Uuid,

    /// Title of the [`Movie`].
    pub title: String,

    /// Description of the [`Movie`].
    pub description: String,

    /// Comma-delimited genres of the [`Movie`].
    pub genres: String,
}

impl From<Movie> for MovieBody {
    fn from(movie: Movie) -> Self {
        Self {
            uuid: movie.id.into(),
            title: movie.title.to_string(),
            description: movie.description.into(),
            genres: movie.genres.into(),
        }
    }
}

/// JSON specification of a [`Movie`] to include into a collection.
#[derive(Clone, Debug, Deserialize)]
pub struct MovieSpecBody {
    /// Title of the [`Movie`].
    pub title: String,

    /// Description of the [`Movie`], applied if it's created.
    #[serde(default)]
    pub description: String,

    /// Comma-delimited genres of the [`Movie`], applied if it's created.
    #[serde(default)]
    pub genres: String,
}

impl TryFrom<MovieSpecBody> for collection::MovieSpec {
    type Error = Error;

    fn try_from(body: MovieSpecBody) -> Result<Self, Self::Error> {
        Ok(Self {
            title: movie::Title::new(body.title)
                .ok_or_else(|| Error::validation(&"invalid movie `title`"))?,
            description: body.description.into(),
            genres: body.genres.into(),
        })
    }
}

/// Body of a `GET /collection/{id}` and `PUT /collection/{id}` response.
#[derive(Clone, Debug, Serialize)]
pub struct DetailResponse {
    /// Title of the collection.
    pub title: String,

    /// Description of the collection.
    pub description: String,

    /// Member [`Movie`]s of the collection.
    pub movies: Vec<MovieBody>,
}

impl From<read::collection::WithMovies> for DetailResponse {
    fn from(with_movies: read::collection::WithMovies) -> Self {
        Self {
            title: with_movies.collection.title.to_string(),
            description: with_movies.collection.description.into(),
            movies: with_movies.movies.into_iter().map(Into::into).collect(),
        }
    }
}

/// Summary of a collection inside a `GET /collection` response.
#[derive(Clone, Debug, Serialize)]
pub struct ListItem {
    /// Title of the collection.
    pub title: String,

    /// ID of the collection.
    pub uuid: Uuid,

    /// Description of the collection.
    pub description: String,
}

/// Body of a successful `GET /collection` response.
#[derive(Clone, Debug, Serialize)]
pub struct ListResponse {
    /// Indicator that the request succeeded.
    pub is_success: bool,

    /// Payload of the response.
    pub data: ListData,
}

/// Payload of a [`ListResponse`].
#[derive(Clone, Debug, Serialize)]
pub struct ListData {
    /// Summaries of all the collections.
    pub collections: Vec<ListItem>,

    /// Deduplicated, lexicographically sorted union of every collection's
    /// favourite genres.
    pub favourite_genres: Vec<String>,
}

/// `GET /collection` handler, listing all the collections along with the
/// aggregated favourite genres.
pub async fn list(context: Context) -> Result<Json<ListResponse>, Error> {
    drop(context.current_session().await?);

    let items = context
        .service()
        .execute(query::collections::List::by(
            read::collection::list::All,
        ))
        .await
        .map_err(AsError::into_error)?;

    let favourite_genres = items
        .iter()
        .flat_map(|item| item.favourite_genres.iter().cloned())
        .collect::<BTreeSet<_>>();

    Ok(Json(ListResponse {
        is_success: true,
        data: ListData {
            collections: items
                .into_iter()
                .map(|item| ListItem {
                    title: item.title.to_string(),
                    uuid: item.id.into(),
                    description: item.description.into(),
                })
                .collect(),
            favourite_genres: favourite_genres.into_iter().collect(),
        },
    }))
}

/// Body of a `POST /collection` request.
#[derive(Clone, Debug, Deserialize)]
pub struct CreateRequest {
    /// Title of the new collection.
    pub title: String,

    /// Description of the new collection.
    #[serde(default)]
    pub description: String,

    /// Specifications of the initial member [`Movie`]s.
    #[serde(default)]
    pub movies: Vec<MovieSpecBody>,
}

/// Body of a successful `POST /collection` response.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct CreateResponse {
    /// ID of the created collection.
    pub collection_uuid: Uuid,
}

/// `POST /collection` handler, creating a new collection.
pub async fn create(
    context: Context,
    Json(req): Json<CreateRequest>,
) -> Result<(http::StatusCode, Json<CreateResponse>), Error> {
    drop(context.current_session().await?);

    let created = context
        .service()
        .execute(command::CreateCollection {
            title: collection::Title::new(req.title)
                .ok_or_else(|| Error::validation(&"invalid `title`"))?,
            description: req.description.into(),
            movies: req
                .movies
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<_, _>>()?,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok((
        http::StatusCode::CREATED,
        Json(CreateResponse {
            collection_uuid: created.collection.id.into(),
        }),
    ))
}

/// `GET /collection/{id}` handler, returning a single collection with its
/// member [`Movie`]s.
pub async fn find(
    context: Context,
    Path(id): Path<Uuid>,
) -> Result<Json<DetailResponse>, Error> {
    drop(context.current_session().await?);

    context
        .service()
        .execute(query::collection::ById::by(id.into()))
        .await
        .map_err(AsError::into_error)?
        .map(|with_movies| Json(with_movies.into()))
        .ok_or_else(|| NotFoundError::Collection.into())
}

/// Body of a `PUT /collection/{id}` request.
#[derive(Clone, Debug, Deserialize)]
pub struct UpdateRequest {
    /// New title of the collection, if provided.
    pub title: Option<String>,

    /// New description of the collection, if provided.
    pub description: Option<String>,

    /// Specifications fully replacing the membership, if provided.
    pub movies: Option<Vec<MovieSpecBody>>,
}

/// `PUT /collection/{id}` handler, partially updating a collection.
pub async fn update(
    context: Context,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<DetailResponse>, Error> {
    drop(context.current_session().await?);

    let title = req
        .title
        .map(|title| {
            collection::Title::new(title)
                .ok_or_else(|| Error::validation(&"invalid `title`"))
        })
        .transpose()?;
    let movies = req
        .movies
        .map(|specs| {
            specs
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<Vec<_>, Error>>()
        })
        .transpose()?;

    context
        .service()
        .execute(command::UpdateCollection {
            id: id.into(),
            title,
            description: req.description.map(Into::into),
            movies,
        })
        .await
        .map(|with_movies| Json(with_movies.into()))
        .map_err(AsError::into_error)
}

/// `DELETE /collection/{id}` handler, removing a collection while keeping
/// its member [`Movie`]s in the catalog.
pub async fn remove(
    context: Context,
    Path(id): Path<Uuid>,
) -> Result<http::StatusCode, Error> {
    drop(context.current_session().await?);

    context
        .service()
        .execute(command::DeleteCollection { id: id.into() })
        .await
        .map(|()| http::StatusCode::NO_CONTENT)
        .map_err(AsError::into_error)
}

impl AsError for command::create_collection::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::update_collection::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NotExists(_) => Some(NotFoundError::Collection.into()),
        }
    }
}

impl AsError for command::delete_collection::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NotExists(_) => Some(NotFoundError::Collection.into()),
        }
    }
}

define_error! {
    enum NotFoundError {
        #[code = "NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "`Collection` with the provided ID does not exist"]
        Collection,
    }
}
