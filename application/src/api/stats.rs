//! Request counter endpoints, admin-only.

use std::sync::Arc;

use axum::{Extension, Json};
use serde::Serialize;

use crate::{Context, Error, RequestCounter};

/// Body of a successful `GET /request-count` response.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct CountResponse {
    /// Number of HTTP requests served since startup (or the last reset).
    pub requests: u64,
}

/// Body of a successful `POST /request-count/reset` response.
#[derive(Clone, Debug, Serialize)]
pub struct ResetResponse {
    /// Human-readable confirmation message.
    pub message: String,
}

/// `GET /request-count` handler, reading the current request count.
pub async fn request_count(
    context: Context,
    Extension(counter): Extension<Arc<RequestCounter>>,
) -> Result<Json<CountResponse>, Error> {
    drop(context.admin_session().await?);

    Ok(Json(CountResponse {
        requests: counter.read(),
    }))
}

/// `POST /request-count/reset` handler, resetting the request count to zero.
pub async fn reset_request_count(
    context: Context,
    Extension(counter): Extension<Arc<RequestCounter>>,
) -> Result<Json<ResetResponse>, Error> {
    drop(context.admin_session().await?);

    counter.reset();

    Ok(Json(ResetResponse {
        message: "request count reset successfully".to_owned(),
    }))
}
