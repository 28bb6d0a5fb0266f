//! Client of the upstream movie source.

use std::time::Duration;

use derive_more::{Debug, Display, Error as StdError, From};
use tracerr::Traced;
use tracing as log;

/// [`Movies`] client configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// URL of the upstream paginated movies endpoint.
    pub url: String,

    /// Basic auth username.
    pub username: String,

    /// Basic auth password.
    #[debug(skip)]
    pub password: String,

    /// Timeout of a single upstream request.
    pub timeout: Duration,
}

/// Client of the upstream paginated movie source.
#[derive(Clone, Debug)]
pub struct Movies {
    /// Configuration of this [`Movies`] client.
    config: Config,

    /// Underlying HTTP client.
    #[debug(skip)]
    http: reqwest::Client,
}

impl Movies {
    /// Number of attempts to fetch a [`Page`] before giving up.
    const ATTEMPTS: u32 = 3;

    /// Pause between failed attempts.
    const RETRY_DELAY: Duration = Duration::from_secs(2);

    /// Creates a new [`Movies`] client with the provided [`Config`].
    ///
    /// # Errors
    ///
    /// If failed to initialize the underlying HTTP client.
    pub fn new(config: Config) -> Result<Self, Traced<Error>> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        Ok(Self { config, http })
    }

    /// Fetches the provided 1-based `page` of movies from the upstream
    /// source.
    ///
    /// Transport-level failures are retried up to [`Self::ATTEMPTS`] times
    /// with a [`Self::RETRY_DELAY`] pause. A malformed response body fails
    /// immediately: retrying cannot fix it.
    ///
    /// # Errors
    ///
    /// If all the attempts are exhausted, or the upstream response is
    /// malformed.
    pub async fn fetch(&self, page: u32) -> Result<Page, Traced<Error>> {
        let mut last_error = None;
        for attempt in 1..=Self::ATTEMPTS {
            match self.try_fetch(page).await {
                Ok(page) => return Ok(page),
                Err(e) => {
                    if !e.as_ref().is_transport() {
                        return Err(e);
                    }
                    log::warn!(
                        attempt,
                        "fetching movies from upstream failed: {e}",
                    );
                    last_error = Some(e);
                    if attempt < Self::ATTEMPTS {
                        tokio::time::sleep(Self::RETRY_DELAY).await;
                    }
                }
            }
        }
        Err(last_error.unwrap_or_else(|| unreachable!("attempts were made")))
    }

    /// Performs a single attempt of fetching the provided `page`.
    async fn try_fetch(&self, page: u32) -> Result<Page, Traced<Error>> {
        let body = self
            .http
            .get(&self.config.url)
            .query(&[("page", page)])
            .basic_auth(&self.config.username, Some(&self.config.password))
            .send()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))?
            .error_for_status()
            .map_err(tracerr::from_and_wrap!(=> Error))?
            .json::<serde_json::Value>()
            .await
            .map_err(|_| tracerr::new!(Error::MalformedBody))?;

        let results = body
            .get("results")
            .and_then(serde_json::Value::as_array)
            .cloned()
            .ok_or_else(|| tracerr::new!(Error::MalformedBody))?;
        let count = body
            .get("count")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(0);

        Ok(Page { count, results })
    }
}

/// Page of movies fetched from the upstream source.
#[derive(Clone, Debug)]
pub struct Page {
    /// Total number of movies the upstream reports.
    pub count: u64,

    /// Movies of this [`Page`], passed through as raw JSON.
    pub results: Vec<serde_json::Value>,
}

/// [`Movies`] client error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Transport-level HTTP failure.
    #[display("HTTP request to the upstream source failed: {_0}")]
    Http(reqwest::Error),

    /// Upstream response body misses a list `results` field.
    #[display("upstream response body misses a list `results` field")]
    MalformedBody,
}

impl Error {
    /// Indicates whether this [`Error`] is a transport-level failure worth
    /// retrying.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::MalformedBody => false,
        }
    }
}
