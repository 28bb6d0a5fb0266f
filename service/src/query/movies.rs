//! [`Query`] collection related to the upstream movie source.

use tracerr::Traced;

use crate::{
    infra::movies::{self, Page},
    Service,
};

use super::Query;

/// Queries a [`Page`] of movies from the upstream source.
#[derive(Clone, Copy, Debug)]
pub struct Fetch {
    /// 1-based number of the [`Page`] to fetch.
    pub page: u32,
}

impl<Db> Query<Fetch> for Service<Db> {
    type Ok = Page;
    type Err = Traced<movies::Error>;

    async fn execute(&self, query: Fetch) -> Result<Self::Ok, Self::Err> {
        self.movies()
            .fetch(query.page)
            .await
            .map_err(tracerr::wrap!())
    }
}
