//! [`Movie`] definitions.

use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Externally-sourced movie of the catalog.
///
/// [`Movie`]s are deduplicated by [`Title`] and shared between
/// [`Collection`]s, which reference them without owning.
///
/// [`Collection`]: crate::domain::Collection
#[derive(Clone, Debug, From)]
pub struct Movie {
    /// ID of this [`Movie`].
    pub id: Id,

    /// [`Title`] of this [`Movie`].
    pub title: Title,

    /// [`Description`] of this [`Movie`].
    pub description: Description,

    /// [`Genres`] of this [`Movie`].
    pub genres: Genres,
}

/// ID of a [`Movie`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Title of a [`Movie`].
///
/// Serves as the natural deduplication key: a [`Title`] never identifies
/// more than one [`Movie`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Title(String);

impl Title {
    /// Creates a new [`Title`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `title` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(title: impl Into<String>) -> Self {
        Self(title.into())
    }

    /// Creates a new [`Title`] if the given `title` is valid.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Option<Self> {
        let title = title.into();
        Self::check(&title).then_some(Self(title))
    }

    /// Checks whether the given `title` is a valid [`Title`].
    fn check(title: impl AsRef<str>) -> bool {
        let title = title.as_ref();
        title.trim() == title && !title.is_empty() && title.len() <= 255
    }
}

impl std::str::FromStr for Title {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Title`")
    }
}

/// Description of a [`Movie`].
#[derive(
    AsRef, Clone, Debug, Default, Display, Eq, From, Into, PartialEq,
)]
#[as_ref(str, String)]
#[from(&str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Description(String);

/// Comma-delimited genre names of a [`Movie`].
#[derive(
    AsRef, Clone, Debug, Default, Display, Eq, From, Into, PartialEq,
)]
#[as_ref(str, String)]
#[from(&str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Genres(String);

impl Genres {
    /// Returns the non-empty genre names of these [`Genres`], in their
    /// original order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

#[cfg(test)]
mod genres_spec {
    use super::Genres;

    #[test]
    fn splits_on_commas() {
        let genres = Genres::from("Action,Drama,Sci-Fi");

        assert_eq!(
            genres.tokens().collect::<Vec<_>>(),
            ["Action", "Drama", "Sci-Fi"],
        );
    }

    #[test]
    fn skips_empty_tokens() {
        let genres = Genres::from("Action,, Drama ,");

        assert_eq!(genres.tokens().collect::<Vec<_>>(), ["Action", "Drama"]);
    }

    #[test]
    fn empty_field_yields_nothing() {
        assert_eq!(Genres::default().tokens().count(), 0);
    }
}
