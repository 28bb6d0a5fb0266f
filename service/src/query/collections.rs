//! [`Query`] collection related to multiple [`Collection`]s.
//!
//! [`Collection`]: crate::domain::Collection

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::read::collection::list;

use super::DatabaseQuery;

/// Queries the list of all [`Collection`]s, as summaries with their derived
/// favourite genres.
///
/// [`Collection`]: crate::domain::Collection
pub type List = DatabaseQuery<By<Vec<list::Item>, list::All>>;
