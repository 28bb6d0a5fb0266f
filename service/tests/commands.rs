//! [`Command`] execution against an in-memory [`Database`] double.
//!
//! [`Command`]: service::Command
//! [`Database`]: service::infra::Database

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
    time::Duration,
};

use common::{
    operations::{By, Commit, Delete, Insert, Select, Transact, Update},
    DateTime,
};
use secrecy::SecretBox;
use service::{
    command::{
        authorize_user_session, create_user, create_user_session,
        refresh_user_session, update_collection, AuthorizeUserSession,
        CreateCollection, CreateUser, CreateUserSession, DeleteCollection,
        RefreshUserSession, UpdateCollection,
    },
    domain::{
        collection::{self, Membership, MovieSpec},
        movie,
        user::{
            self,
            session::{Kind, RefreshSession},
        },
        Collection, Movie, User,
    },
    infra::{database, movies, Database, Movies},
    Config, Service,
};
use tracerr::Traced;

/// In-memory [`Database`] double backing a [`Service`] under test.
#[derive(Clone, Debug, Default)]
struct MemoryDb {
    users: Arc<RwLock<HashMap<user::Id, User>>>,
    movies: Arc<RwLock<HashMap<movie::Id, Movie>>>,
    collections: Arc<RwLock<HashMap<collection::Id, Collection>>>,
    memberships: Arc<RwLock<Vec<Membership>>>,
}

impl Database<Transact> for MemoryDb {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for MemoryDb {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Select<By<Option<User>, user::Id>>> for MemoryDb {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.users.read().unwrap().get(&by.into_inner()).cloned())
    }
}

impl<'u> Database<Select<By<Option<User>, &'u user::Username>>> for MemoryDb {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'u user::Username>>,
    ) -> Result<Self::Ok, Self::Err> {
        let username = by.into_inner();
        Ok(self
            .users
            .read()
            .unwrap()
            .values()
            .find(|u| u.username == *username)
            .cloned())
    }
}

impl Database<Insert<User>> for MemoryDb {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.users.write().unwrap().insert(user.id, user));
        Ok(())
    }
}

impl<'t> Database<Select<By<Option<Movie>, &'t movie::Title>>> for MemoryDb {
    type Ok = Option<Movie>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Movie>, &'t movie::Title>>,
    ) -> Result<Self::Ok, Self::Err> {
        let title = by.into_inner();
        Ok(self
            .movies
            .read()
            .unwrap()
            .values()
            .find(|m| m.title == *title)
            .cloned())
    }
}

impl Database<Insert<Movie>> for MemoryDb {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(movie): Insert<Movie>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.movies.write().unwrap().insert(movie.id, movie));
        Ok(())
    }
}

impl Database<Insert<Collection>> for MemoryDb {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(coll): Insert<Collection>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.collections.write().unwrap().insert(coll.id, coll));
        Ok(())
    }
}

impl Database<Update<Collection>> for MemoryDb {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(coll): Update<Collection>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.collections.write().unwrap().insert(coll.id, coll));
        Ok(())
    }
}

impl Database<Select<By<Option<Collection>, collection::Id>>> for MemoryDb {
    type Ok = Option<Collection>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Collection>, collection::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .collections
            .read()
            .unwrap()
            .get(&by.into_inner())
            .cloned())
    }
}

impl Database<Delete<By<Collection, collection::Id>>> for MemoryDb {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Collection, collection::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        drop(self.collections.write().unwrap().remove(&id));
        self.memberships
            .write()
            .unwrap()
            .retain(|m| m.collection != id);
        Ok(())
    }
}

impl Database<Insert<Membership>> for MemoryDb {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(membership): Insert<Membership>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut memberships = self.memberships.write().unwrap();
        if !memberships.iter().any(|m| {
            m.collection == membership.collection && m.movie == membership.movie
        }) {
            memberships.push(membership);
        }
        Ok(())
    }
}

impl Database<Delete<By<Membership, collection::Id>>> for MemoryDb {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Membership, collection::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.memberships
            .write()
            .unwrap()
            .retain(|m| m.collection != id);
        Ok(())
    }
}

impl Database<Select<By<Vec<Movie>, collection::Id>>> for MemoryDb {
    type Ok = Vec<Movie>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Movie>, collection::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let movies = self.movies.read().unwrap();
        Ok(self
            .memberships
            .read()
            .unwrap()
            .iter()
            .filter(|m| m.collection == id)
            .filter_map(|m| movies.get(&m.movie).cloned())
            .collect())
    }
}

fn service(db: MemoryDb) -> Service<MemoryDb> {
    let movies = Movies::new(movies::Config {
        url: "http://localhost:9/movies/".into(),
        username: "test".into(),
        password: "test".into(),
        timeout: Duration::from_secs(1),
    })
    .unwrap();
    Service::new(
        Config {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(
                b"test-secret",
            ),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                b"test-secret",
            ),
            access_token_ttl: Duration::from_secs(300),
            refresh_token_ttl: Duration::from_secs(86400),
        },
        db,
        movies,
    )
}

fn password(raw: &str) -> SecretBox<user::Password> {
    SecretBox::new(Box::new(user::Password::from(raw)))
}

fn username(raw: &str) -> user::Username {
    raw.parse().unwrap()
}

fn movie_spec(title: &str, genres: &str) -> MovieSpec {
    MovieSpec {
        title: title.parse().unwrap(),
        description: movie::Description::from("about"),
        genres: movie::Genres::from(genres),
    }
}

async fn register(svc: &Service<MemoryDb>, name: &str) -> User {
    svc.execute(CreateUser {
        username: username(name),
        password: password("secret"),
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn registers_user_with_hashed_password() {
    let svc = service(MemoryDb::default());

    let user = register(&svc, "alice").await;

    assert!(!user.admin);
    assert!(user.password_hash.verify(&user::Password::from("secret")));
}

#[tokio::test]
async fn rejects_occupied_username() {
    let svc = service(MemoryDb::default());
    drop(register(&svc, "alice").await);

    let err = svc
        .execute(CreateUser {
            username: username("alice"),
            password: password("another"),
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err.as_ref(),
        create_user::ExecutionError::UsernameOccupied(_),
    ));
}

#[tokio::test]
async fn wrong_password_and_unknown_username_are_indistinguishable() {
    let svc = service(MemoryDb::default());
    drop(register(&svc, "alice").await);

    let wrong_password = svc
        .execute(CreateUserSession::ByCredentials {
            username: username("alice"),
            password: password("wrong"),
        })
        .await
        .unwrap_err();
    let unknown_username = svc
        .execute(CreateUserSession::ByCredentials {
            username: username("nobody"),
            password: password("secret"),
        })
        .await
        .unwrap_err();

    assert!(matches!(
        wrong_password.as_ref(),
        create_user_session::ExecutionError::WrongCredentials,
    ));
    assert!(matches!(
        unknown_username.as_ref(),
        create_user_session::ExecutionError::WrongCredentials,
    ));
}

#[tokio::test]
async fn issued_access_token_authorizes() {
    let svc = service(MemoryDb::default());
    let user = register(&svc, "alice").await;

    let out = svc
        .execute(CreateUserSession::ByCredentials {
            username: username("alice"),
            password: password("secret"),
        })
        .await
        .unwrap();
    let session = svc
        .execute(AuthorizeUserSession {
            token: out.tokens.access,
        })
        .await
        .unwrap();

    assert_eq!(session.user_id, user.id);
    assert!(!session.admin);
}

#[tokio::test]
async fn refresh_token_does_not_authorize() {
    let svc = service(MemoryDb::default());
    drop(register(&svc, "alice").await);

    let out = svc
        .execute(CreateUserSession::ByCredentials {
            username: username("alice"),
            password: password("secret"),
        })
        .await
        .unwrap();
    let err = svc
        .execute(AuthorizeUserSession {
            token: out.tokens.refresh,
        })
        .await
        .unwrap_err();

    // A refresh token misses the `admin` claim, so it fails to decode as
    // access `Session` claims at all.
    assert!(matches!(
        err.as_ref(),
        authorize_user_session::ExecutionError::JsonWebTokenDecodeError(_)
            | authorize_user_session::ExecutionError::NotAccessToken,
    ));
}

#[tokio::test]
async fn access_token_does_not_refresh() {
    let svc = service(MemoryDb::default());
    drop(register(&svc, "alice").await);

    let out = svc
        .execute(CreateUserSession::ByCredentials {
            username: username("alice"),
            password: password("secret"),
        })
        .await
        .unwrap();
    let err = svc
        .execute(RefreshUserSession {
            token: out.tokens.access,
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err.as_ref(),
        refresh_user_session::ExecutionError::NotRefreshToken,
    ));
}

#[tokio::test]
async fn expired_refresh_token_is_rejected() {
    let svc = service(MemoryDb::default());
    let user = register(&svc, "alice").await;

    // 120 s in the past clears the 60 s decoding leeway.
    let expired = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &RefreshSession {
            user_id: user.id,
            kind: Kind::Refresh,
            expires_at: (DateTime::now() - Duration::from_secs(120)).coerce(),
        },
        &jsonwebtoken::EncodingKey::from_secret(b"test-secret"),
    )
    .unwrap();

    let err = svc
        .execute(RefreshUserSession {
            token: expired.parse().unwrap(),
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err.as_ref(),
        refresh_user_session::ExecutionError::JsonWebTokenError(_),
    ));
}

#[tokio::test]
async fn refresh_mints_working_access_token() {
    let svc = service(MemoryDb::default());
    let user = register(&svc, "alice").await;

    let out = svc
        .execute(CreateUserSession::ByCredentials {
            username: username("alice"),
            password: password("secret"),
        })
        .await
        .unwrap();
    let refreshed = svc
        .execute(RefreshUserSession {
            token: out.tokens.refresh,
        })
        .await
        .unwrap();
    let session = svc
        .execute(AuthorizeUserSession {
            token: refreshed.access_token,
        })
        .await
        .unwrap();

    assert_eq!(session.user_id, user.id);
}

#[tokio::test]
async fn duplicate_movie_specs_resolve_to_single_movie() {
    let db = MemoryDb::default();
    let svc = service(db.clone());

    let created = svc
        .execute(CreateCollection {
            title: "Best of Villeneuve".parse().unwrap(),
            description: "favourites".into(),
            movies: vec![
                movie_spec("Dune", "Sci-Fi,Adventure"),
                movie_spec("Dune", "Sci-Fi"),
                movie_spec("Arrival", "Sci-Fi,Drama"),
            ],
        })
        .await
        .unwrap();

    assert_eq!(created.movies.len(), 2);
    assert_eq!(db.movies.read().unwrap().len(), 2);
}

#[tokio::test]
async fn movies_are_reused_across_collections() {
    let db = MemoryDb::default();
    let svc = service(db.clone());

    let first = svc
        .execute(CreateCollection {
            title: "First".parse().unwrap(),
            description: "".into(),
            movies: vec![movie_spec("Dune", "Sci-Fi")],
        })
        .await
        .unwrap();
    let second = svc
        .execute(CreateCollection {
            title: "Second".parse().unwrap(),
            description: "".into(),
            movies: vec![movie_spec("Dune", "Adventure")],
        })
        .await
        .unwrap();

    assert_eq!(first.movies[0].id, second.movies[0].id);
    // Existing movie is reused unchanged, genres of the later spec ignored.
    assert_eq!(second.movies[0].genres, movie::Genres::from("Sci-Fi"));
    assert_eq!(db.movies.read().unwrap().len(), 1);
}

#[tokio::test]
async fn update_replaces_membership_but_keeps_movies() {
    let db = MemoryDb::default();
    let svc = service(db.clone());

    let created = svc
        .execute(CreateCollection {
            title: "Watchlist".parse().unwrap(),
            description: "".into(),
            movies: vec![movie_spec("Dune", "Sci-Fi")],
        })
        .await
        .unwrap();
    let updated = svc
        .execute(UpdateCollection {
            id: created.collection.id,
            title: None,
            description: None,
            movies: Some(vec![movie_spec("Arrival", "Drama")]),
        })
        .await
        .unwrap();

    assert_eq!(updated.movies.len(), 1);
    assert_eq!(updated.movies[0].title, "Arrival".parse().unwrap());
    // The replaced movie stays in the shared catalog.
    assert_eq!(db.movies.read().unwrap().len(), 2);
}

#[tokio::test]
async fn partial_update_leaves_membership_untouched() {
    let svc = service(MemoryDb::default());

    let created = svc
        .execute(CreateCollection {
            title: "Watchlist".parse().unwrap(),
            description: "old".into(),
            movies: vec![movie_spec("Dune", "Sci-Fi")],
        })
        .await
        .unwrap();
    let updated = svc
        .execute(UpdateCollection {
            id: created.collection.id,
            title: None,
            description: Some("new".into()),
            movies: None,
        })
        .await
        .unwrap();

    assert_eq!(updated.collection.description, "new".into());
    assert_eq!(updated.collection.title, created.collection.title);
    assert_eq!(updated.movies.len(), 1);
}

#[tokio::test]
async fn updating_missing_collection_fails() {
    let svc = service(MemoryDb::default());

    let err = svc
        .execute(UpdateCollection {
            id: collection::Id::new(),
            title: None,
            description: None,
            movies: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err.as_ref(),
        update_collection::ExecutionError::NotExists(_),
    ));
}

#[tokio::test]
async fn deleting_collection_keeps_movies() {
    let db = MemoryDb::default();
    let svc = service(db.clone());

    let created = svc
        .execute(CreateCollection {
            title: "Watchlist".parse().unwrap(),
            description: "".into(),
            movies: vec![movie_spec("Dune", "Sci-Fi")],
        })
        .await
        .unwrap();
    svc.execute(DeleteCollection {
        id: created.collection.id,
    })
    .await
    .unwrap();

    assert!(db.collections.read().unwrap().is_empty());
    assert!(db.memberships.read().unwrap().is_empty());
    assert_eq!(db.movies.read().unwrap().len(), 1);
}
