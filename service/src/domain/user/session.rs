//! [`Session`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, FromStr};
use serde::{Deserialize, Serialize};

#[cfg(doc)]
use crate::domain::User;
use crate::domain::user;

/// Claims of an access [`Token`], authorizing a [`User`] on protected
/// operations.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct Session {
    /// ID of the [`User`] this [`Session`] belongs to.
    pub user_id: user::Id,

    /// Indicator whether the [`User`] is an administrator.
    pub admin: bool,

    /// [`Kind`] of the [`Token`] carrying this [`Session`].
    #[serde(rename = "typ")]
    pub kind: Kind,

    /// [`DateTime`] when this [`Session`] expires.
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,
}

/// Claims of a refresh [`Token`], allowing to mint new access [`Token`]s
/// without re-authentication.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct RefreshSession {
    /// ID of the [`User`] this [`RefreshSession`] belongs to.
    pub user_id: user::Id,

    /// [`Kind`] of the [`Token`] carrying this [`RefreshSession`].
    #[serde(rename = "typ")]
    pub kind: Kind,

    /// [`DateTime`] when this [`RefreshSession`] expires.
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,
}

/// Kind of a [`Token`], preventing an access [`Token`] from being used where
/// a refresh one is expected (and vice versa).
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// Short-lived token authorizing requests.
    Access,

    /// Long-lived token minting new [`Kind::Access`] tokens.
    Refresh,
}

/// Signed token of a [`Session`] (or a [`RefreshSession`]).
#[derive(AsRef, Clone, Debug, Display, FromStr)]
pub struct Token(String);

impl Token {
    /// Creates a new [`Token`] without checking its contents.
    ///
    /// # Safety
    ///
    /// The provided `token` must be a valid [`Token`] representation.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(token: String) -> Self {
        Self(token)
    }
}

/// Access and refresh [`Token`]s issued together on authentication.
#[derive(Clone, Debug)]
pub struct TokenPair {
    /// [`Kind::Access`] [`Token`].
    pub access: Token,

    /// [`Kind::Refresh`] [`Token`].
    pub refresh: Token,
}

/// [`DateTime`] of a [`Session`] expiration.
pub type ExpirationDateTime = DateTimeOf<(Session, unit::Expiration)>;
