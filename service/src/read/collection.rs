//! [`Collection`] read model definitions.
//!
//! [`Collection`]: crate::domain::Collection

use crate::domain::{Collection, Movie};

/// [`Collection`] with its member [`Movie`]s resolved.
#[derive(Clone, Debug)]
pub struct WithMovies {
    /// The [`Collection`] itself.
    pub collection: Collection,

    /// Member [`Movie`]s of the [`Collection`].
    pub movies: Vec<Movie>,
}

pub mod list {
    //! [`Collection`]s list definitions.
    //!
    //! [`Collection`]: crate::domain::Collection

    use crate::domain::collection;
    #[cfg(doc)]
    use crate::domain::{Collection, Movie};

    /// Selector of all [`Collection`]s.
    #[derive(Clone, Copy, Debug)]
    pub struct All;

    /// [`Collection`] list item: the summary without member [`Movie`]s, plus
    /// the derived favourite genres.
    #[derive(Clone, Debug)]
    pub struct Item {
        /// ID of the [`Collection`].
        pub id: collection::Id,

        /// [`collection::Title`] of the [`Collection`].
        pub title: collection::Title,

        /// [`collection::Description`] of the [`Collection`].
        pub description: collection::Description,

        /// Up to 3 most frequent genre names across the member [`Movie`]s.
        pub favourite_genres: Vec<String>,
    }
}
