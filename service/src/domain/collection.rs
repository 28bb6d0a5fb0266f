//! [`Collection`] definitions.

use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::movie;
#[cfg(doc)]
use crate::domain::Movie;

/// Named, user-curated set of [`Movie`] references.
#[derive(Clone, Debug, From)]
pub struct Collection {
    /// ID of this [`Collection`].
    pub id: Id,

    /// [`Title`] of this [`Collection`].
    pub title: Title,

    /// [`Description`] of this [`Collection`].
    pub description: Description,
}

/// ID of a [`Collection`].
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

/// Title of a [`Collection`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
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
        title.trim() == title && !title.is_empty() && title.len() <= 250
    }
}

impl std::str::FromStr for Title {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Title`")
    }
}

/// Description of a [`Collection`].
#[derive(
    AsRef, Clone, Debug, Default, Display, Eq, From, Into, PartialEq,
)]
#[as_ref(str, String)]
#[from(&str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Description(String);

/// Reference of a [`Collection`] to a member [`Movie`].
#[derive(Clone, Copy, Debug)]
pub struct Membership {
    /// ID of the referring [`Collection`].
    pub collection: Id,

    /// ID of the referenced [`Movie`].
    pub movie: movie::Id,
}

/// Specification of a [`Movie`] to include into a [`Collection`].
///
/// An existing [`Movie`] with the same [`movie::Title`] is reused unchanged,
/// with `description` and `genres` applying only when the [`Movie`] is
/// created anew (get-or-create, not upsert).
#[derive(Clone, Debug)]
pub struct MovieSpec {
    /// [`movie::Title`] of the [`Movie`].
    pub title: movie::Title,

    /// [`movie::Description`] of the [`Movie`], if created.
    pub description: movie::Description,

    /// [`movie::Genres`] of the [`Movie`], if created.
    pub genres: movie::Genres,
}

/// Returns up to 3 most frequent genre names across the provided [`Movie`]
/// [`movie::Genres`].
///
/// Occurrences are counted over all comma-separated genre tokens; ties are
/// broken by first encounter order, so the result is stable. No member
/// [`Movie`]s yield an empty [`Vec`].
#[must_use]
pub fn favourite_genres<'g>(
    genres: impl IntoIterator<Item = &'g movie::Genres>,
) -> Vec<String> {
    let mut counts = Vec::<(&str, usize)>::new();
    for token in genres.into_iter().flat_map(movie::Genres::tokens) {
        if let Some(entry) = counts.iter_mut().find(|(g, _)| *g == token) {
            entry.1 += 1;
        } else {
            counts.push((token, 1));
        }
    }

    // Stable sort keeps the first-encountered genre ahead on equal counts.
    counts.sort_by(|(_, a), (_, b)| b.cmp(a));
    counts
        .into_iter()
        .take(3)
        .map(|(genre, _)| genre.to_owned())
        .collect()
}

#[cfg(test)]
mod favourite_genres_spec {
    use crate::domain::movie::Genres;

    use super::favourite_genres;

    #[test]
    fn counts_across_movies() {
        let genres = [
            Genres::from("Action,Drama"),
            Genres::from("Drama,Sci-Fi"),
            Genres::from("Drama,Action,Thriller"),
        ];

        assert_eq!(
            favourite_genres(&genres),
            ["Drama", "Action", "Sci-Fi"],
        );
    }

    #[test]
    fn at_most_three() {
        let genres = [Genres::from("A,B,C,D,E")];

        assert_eq!(favourite_genres(&genres).len(), 3);
    }

    #[test]
    fn ties_break_by_first_encounter() {
        let genres = [Genres::from("Western,Noir"), Genres::from("Noir,Drama")];

        // `Noir` counts twice, then `Western` precedes `Drama`.
        assert_eq!(favourite_genres(&genres), ["Noir", "Western", "Drama"]);
    }

    #[test]
    fn empty_collection_yields_nothing() {
        let no_movies: [Genres; 0] = [];

        assert_eq!(favourite_genres(&no_movies), Vec::<String>::new());
    }

    #[test]
    fn ignores_empty_tokens() {
        let genres = [Genres::from(""), Genres::from(",,")];

        assert_eq!(favourite_genres(&genres), Vec::<String>::new());
    }
}
