//! HTTP API definitions.

pub mod auth;
pub mod collection;
pub mod movies;
pub mod stats;

use axum::{
    routing::{get, post},
    Router,
};

pub use self::movies::PublicUrl;

/// Builds the [`Router`] of the whole HTTP API.
#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/movies", get(movies::list))
        .route(
            "/collection",
            get(collection::list).post(collection::create),
        )
        .route(
            "/collection/:id",
            get(collection::find)
                .put(collection::update)
                .delete(collection::remove),
        )
        .route("/request-count", get(stats::request_count))
        .route("/request-count/reset", post(stats::reset_request_count))
}
