//! [`Command`] for refreshing a [`Session`].

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use jsonwebtoken::Validation;
use tracerr::Traced;

use crate::{
    domain::{
        user::{
            self,
            session::{self, Kind, RefreshSession},
            Session,
        },
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for minting a new access [`session::Token`] out of a refresh
/// one.
///
/// The refresh [`session::Token`] itself is not rotated: it stays valid
/// until its own natural expiry.
#[derive(Clone, Debug, From)]
pub struct RefreshUserSession {
    /// Refresh [`session::Token`] to mint a new access one by.
    pub token: session::Token,
}

/// Output of [`RefreshUserSession`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Newly minted access [`session::Token`].
    pub access_token: session::Token,

    /// [`DateTime`] when the access [`session::Token`] expires.
    pub expires_at: session::ExpirationDateTime,
}

impl<Db> Command<RefreshUserSession> for Service<Db>
where
    Db: Database<
        Select<By<Option<User>, user::Id>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RefreshUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RefreshUserSession { token } = cmd;

        let refresh = jsonwebtoken::decode::<RefreshSession>(
            token.as_ref(),
            &self.config.jwt_decoding_key,
            &Validation::default(),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?
        .claims;

        // An access token decodes as `RefreshSession` claims too, so the
        // `typ` discriminator is what stops it from being replayed here.
        if refresh.kind != Kind::Refresh {
            return Err(tracerr::new!(E::NotRefreshToken));
        }

        let user = self
            .database()
            .execute(Select(By::new(refresh.user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::UserNotExists(refresh.user_id))
            .map_err(tracerr::wrap!())?;

        let expires_at =
            (DateTime::now() + self.config.access_token_ttl).coerce();
        let access = jsonwebtoken::encode::<Session>(
            &jsonwebtoken::Header::default(),
            &Session {
                user_id: user.id,
                admin: user.admin,
                kind: Kind::Access,
                expires_at,
            },
            &self.config.jwt_encoding_key,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        // SAFETY: `jsonwebtoken::encode` always returns a valid
        //         `session::Token`.
        #[expect(unsafe_code, reason = "invariants are preserved")]
        let access_token = unsafe { session::Token::new_unchecked(access) };

        Ok(Output {
            access_token,
            expires_at,
        })
    }
}

/// Error of [`RefreshUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] decoding or encoding error.
    #[display("JSON Web Token error: {_0}")]
    JsonWebTokenError(jsonwebtoken::errors::Error),

    /// Provided [`session::Token`] is not a refresh one.
    #[display("Provided token is not a refresh token")]
    NotRefreshToken,

    /// [`User`] the [`RefreshSession`] belongs to does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}
