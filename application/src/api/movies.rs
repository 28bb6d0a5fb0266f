//! Upstream movie browsing endpoints.

use std::sync::Arc;

use axum::{extract::Query, Extension, Json};
use serde::{Deserialize, Serialize};
use service::query::{movies, Query as _};

use crate::{define_error, AsError, Context, Error};

/// Number of movies per upstream page.
const PAGE_SIZE: u64 = 10;

/// Public base URL pagination links are rewritten against.
///
/// The upstream reports its own absolute `next`/`previous` links, which are
/// useless to API clients, so they are rebuilt pointing at this server.
#[derive(Clone, Debug)]
pub struct PublicUrl(pub Arc<str>);

/// Query parameters of a `GET /movies` request.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Params {
    /// 1-based page number.
    pub page: Option<u32>,
}

/// Body of a successful `GET /movies` response.
#[derive(Clone, Debug, Serialize)]
pub struct MoviesResponse {
    /// Total number of movies the upstream reports.
    pub count: u64,

    /// Link to the next page, if any.
    pub next: Option<String>,

    /// Link to the previous page, if any.
    pub previous: Option<String>,

    /// Movies of the requested page, passed through as raw JSON.
    pub results: Vec<serde_json::Value>,
}

/// `GET /movies` handler, proxying a page of the upstream movie source.
pub async fn list(
    context: Context,
    Extension(public_url): Extension<PublicUrl>,
    Query(params): Query<Params>,
) -> Result<Json<MoviesResponse>, Error> {
    let page = params.page.unwrap_or(1).max(1);

    let fetched = context
        .service()
        .execute(movies::Fetch { page })
        .await
        .map_err(AsError::into_error)?;

    let total_pages = fetched.count.div_ceil(PAGE_SIZE);
    let next = (u64::from(page) < total_pages)
        .then(|| format!("{}/movies?page={}", public_url.0, page + 1));
    let previous =
        (page > 1).then(|| format!("{}/movies?page={}", public_url.0, page - 1));

    Ok(Json(MoviesResponse {
        count: fetched.count,
        next,
        previous,
        results: fetched.results,
    }))
}

impl AsError for service::infra::movies::Error {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Http(_) | Self::MalformedBody => {
                Some(UpstreamError::Unavailable.into())
            }
        }
    }
}

define_error! {
    enum UpstreamError {
        #[code = "UPSTREAM_UNAVAILABLE"]
        #[status = INTERNAL_SERVER_ERROR]
        #[message = "Failed to fetch movies"]
        Unavailable,
    }
}
