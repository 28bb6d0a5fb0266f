//! Authentication and session endpoints.

use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use secrecy::SecretBox;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::user::{self, session},
};

use crate::{define_error, AsError, Context, Error};

/// Name of the cookie carrying the access [`session::Token`].
const ACCESS_COOKIE: &str = "access";

/// Name of the cookie carrying the refresh [`session::Token`].
const REFRESH_COOKIE: &str = "refresh";

/// Builds an HTTP-only `SameSite=Lax` cookie carrying the provided
/// [`session::Token`].
fn token_cookie(
    name: &'static str,
    token: &session::Token,
) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, token.to_string());
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie
}

/// Builds a cookie matching [`token_cookie()`] for removal from a
/// [`CookieJar`].
fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, "");
    cookie.set_path("/");
    cookie
}

/// Body of a `POST /register` request.
#[derive(Clone, Debug, Deserialize)]
pub struct RegisterRequest {
    /// Username of the new user.
    pub username: String,

    /// Password of the new user.
    pub password: String,
}

/// Body of a successful `POST /register` response.
#[derive(Clone, Debug, Serialize)]
pub struct RegisterResponse {
    /// Human-readable confirmation message.
    pub message: String,

    /// Issued access token.
    pub access_token: String,
}

/// `POST /register` handler, creating a new user and logging it in.
pub async fn register(
    context: Context,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> Result<(http::StatusCode, CookieJar, Json<RegisterResponse>), Error> {
    let username = user::Username::new(req.username)
        .ok_or_else(|| Error::validation(&"invalid `username`"))?;
    let password = user::Password::new(req.password)
        .ok_or_else(|| Error::validation(&"invalid `password`"))?;

    let user = context
        .service()
        .execute(command::CreateUser {
            username,
            password: SecretBox::new(Box::new(password)),
        })
        .await
        .map_err(AsError::into_error)?;

    let out = context
        .service()
        .execute(command::CreateUserSession::ByUserId(user.id))
        .await
        .map_err(AsError::into_error)?;

    let jar = jar
        .add(token_cookie(ACCESS_COOKIE, &out.tokens.access))
        .add(token_cookie(REFRESH_COOKIE, &out.tokens.refresh));

    Ok((
        http::StatusCode::CREATED,
        jar,
        Json(RegisterResponse {
            message: format!("{}'s account is registered!", user.username),
            access_token: out.tokens.access.to_string(),
        }),
    ))
}

/// Body of a `POST /login` request.
#[derive(Clone, Debug, Deserialize)]
pub struct LoginRequest {
    /// Username of the user logging in.
    pub username: String,

    /// Password of the user logging in.
    pub password: String,
}

/// Body of a successful `POST /login` response.
#[derive(Clone, Debug, Serialize)]
pub struct LoginResponse {
    /// Username of the logged in user.
    pub username: String,

    /// Human-readable confirmation message.
    pub message: String,

    /// Issued access token.
    pub access_token: String,

    /// Issued refresh token.
    pub refresh_token: String,
}

/// `POST /login` handler, authenticating a user by its credentials.
pub async fn login(
    context: Context,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), Error> {
    // Malformed credentials cannot match any user, so they fail the same
    // way wrong ones do, without leaking which part was off.
    let username = user::Username::new(req.username)
        .ok_or_else(|| Error::from(TokenError::WrongCredentials))?;
    let password = user::Password::new(req.password)
        .ok_or_else(|| Error::from(TokenError::WrongCredentials))?;

    let out = context
        .service()
        .execute(command::CreateUserSession::ByCredentials {
            username,
            password: SecretBox::new(Box::new(password)),
        })
        .await
        .map_err(AsError::into_error)?;

    let jar = jar
        .add(token_cookie(ACCESS_COOKIE, &out.tokens.access))
        .add(token_cookie(REFRESH_COOKIE, &out.tokens.refresh));

    Ok((
        jar,
        Json(LoginResponse {
            username: out.user.username.to_string(),
            message: format!("{} is logged in", out.user.username),
            access_token: out.tokens.access.to_string(),
            refresh_token: out.tokens.refresh.to_string(),
        }),
    ))
}

/// Body of a successful `POST /refresh` response.
#[derive(Clone, Debug, Serialize)]
pub struct RefreshResponse {
    /// Newly minted access token.
    pub access_token: String,
}

/// `POST /refresh` handler, minting a new access token out of the refresh
/// cookie.
///
/// The refresh token is read from the cookie exclusively, never from the
/// request body.
pub async fn refresh(
    context: Context,
    jar: CookieJar,
) -> Result<(CookieJar, Json<RefreshResponse>), Error> {
    let token = jar
        .get(REFRESH_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .ok_or_else(|| Error::from(TokenError::MissingRefreshToken))?;
    #[expect(unsafe_code, reason = "specified in correct cookie")]
    let token = unsafe { session::Token::new_unchecked(token) };

    let out = context
        .service()
        .execute(command::RefreshUserSession { token })
        .await
        .map_err(AsError::into_error)?;

    let jar = jar.add(token_cookie(ACCESS_COOKIE, &out.access_token));

    Ok((
        jar,
        Json(RefreshResponse {
            access_token: out.access_token.to_string(),
        }),
    ))
}

/// Body of a successful `POST /logout` response.
#[derive(Clone, Debug, Serialize)]
pub struct LogoutResponse {
    /// Human-readable confirmation message.
    pub message: String,
}

/// `POST /logout` handler, clearing the session cookies.
///
/// Issued tokens are not revoked server-side and stay valid until their
/// natural expiry.
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<LogoutResponse>) {
    let jar = jar
        .remove(removal_cookie(ACCESS_COOKIE))
        .remove(removal_cookie(REFRESH_COOKIE));

    (
        jar,
        Json(LogoutResponse {
            message: "Logout successful".to_owned(),
        }),
    )
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "USERNAME_OCCUPIED"]
                #[status = BAD_REQUEST]
                #[message = "`Username` is occupied by another `User`"]
                UsernameOccupied,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UsernameOccupied(_) => Some(Error::UsernameOccupied.into()),
        }
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenEncodeError(_) => None,
            Self::UserNotExists(_) | Self::WrongCredentials => {
                Some(TokenError::WrongCredentials.into())
            }
        }
    }
}

impl AsError for command::refresh_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenError(_)
            | Self::NotRefreshToken
            | Self::UserNotExists(_) => {
                Some(TokenError::InvalidRefreshToken.into())
            }
        }
    }
}

define_error! {
    enum TokenError {
        #[code = "WRONG_CREDENTIALS"]
        #[status = UNAUTHORIZED]
        #[message = "Provided credentials does not match any `User`"]
        WrongCredentials,

        #[code = "MISSING_REFRESH_TOKEN"]
        #[status = BAD_REQUEST]
        #[message = "Missing refresh token in cookie"]
        MissingRefreshToken,

        #[code = "INVALID_TOKEN"]
        #[status = BAD_REQUEST]
        #[message = "Provided refresh token is invalid or expired"]
        InvalidRefreshToken,
    }
}

#[cfg(test)]
mod refresh_spec {
    use std::time::Duration;

    use axum::extract::FromRequestParts as _;
    use axum_extra::extract::CookieJar;
    use service::infra::{movies, postgres, Movies, Postgres};

    use crate::{Context, Service};

    fn service() -> Service {
        let postgres = Postgres::new(&postgres::Config {
            dbname: Some("unused".into()),
            ..postgres::Config::default()
        })
        .unwrap();
        let movies = Movies::new(movies::Config {
            url: "http://localhost:9/movies/".into(),
            username: "test".into(),
            password: "test".into(),
            timeout: Duration::from_secs(1),
        })
        .unwrap();
        Service::new(
            service::Config {
                jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(
                    b"test-secret",
                ),
                jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                    b"test-secret",
                ),
                access_token_ttl: Duration::from_secs(300),
                refresh_token_ttl: Duration::from_secs(86400),
            },
            postgres,
            movies,
        )
    }

    #[tokio::test]
    async fn missing_refresh_cookie_is_reported() {
        let req = http::Request::builder()
            .method(http::Method::POST)
            .uri("/refresh")
            .extension(service())
            .body(())
            .unwrap();
        let (mut parts, ()) = req.into_parts();

        let jar = CookieJar::from_headers(&parts.headers);
        let context =
            Context::from_request_parts(&mut parts, &()).await.unwrap();

        let Err(err) = super::refresh(context, jar).await else {
            panic!("refresh succeeded without a cookie");
        };

        assert_eq!(err.code, "MISSING_REFRESH_TOKEN");
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
    }
}
