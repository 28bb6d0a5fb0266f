//! [`Query`] collection related to a single [`Collection`].
//!
//! [`Collection`]: crate::domain::Collection

use common::operations::By;

use crate::domain::collection;
#[cfg(doc)]
use crate::Query;
use crate::read;

use super::DatabaseQuery;

/// Queries a [`Collection`] with its resolved member [`Movie`]s by its
/// [`collection::Id`].
///
/// [`Collection`]: crate::domain::Collection
/// [`Movie`]: crate::domain::Movie
pub type ById =
    DatabaseQuery<By<Option<read::collection::WithMovies>, collection::Id>>;
