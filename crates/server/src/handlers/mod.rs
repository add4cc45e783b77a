//! Route handlers.

mod deployments;
mod health;
mod releases;

pub use deployments::*;
pub use health::*;
pub use releases::*;

use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::error::{ApiError, ApiResult};

/// Runs filesystem work on the blocking pool.
async fn blocking<T, E, F>(work: F) -> ApiResult<T>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(work).await?.map_err(Into::into)
}

/// Parses an optional JSON body; an empty body yields the default value.
fn optional_body<T: DeserializeOwned + Default>(body: &Bytes) -> ApiResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    Ok(serde_json::from_slice(body)?)
}

fn parse_version(raw: &str) -> ApiResult<u64> {
    raw.parse().map_err(|_| ApiError::Version(raw.to_string()))
}
