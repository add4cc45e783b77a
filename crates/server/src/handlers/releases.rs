//! Platform releases.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use serde::Deserialize;
use shipyard_protocol::{ReleaseDetail, ReleaseInfo, ReleaseOutcome, Releases};

use super::{blocking, optional_body};
use crate::error::ApiResult;
use crate::state::AppState;

/// Body of publish and rollback requests. Without a key the manager
/// picks one.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseRequest {
    #[serde(default)]
    pub build_key: Option<String>,
}

pub async fn list_releases(
    State(state): State<AppState>,
    Path((game, platform)): Path<(String, String)>,
) -> ApiResult<Json<Releases>> {
    let releases = blocking(move || state.releases.list_releases(&game, &platform)).await?;
    Ok(Json(releases))
}

pub async fn current_release(
    State(state): State<AppState>,
    Path((game, platform)): Path<(String, String)>,
) -> ApiResult<Json<ReleaseInfo>> {
    let current = blocking(move || state.releases.current_release(&game, &platform)).await?;
    Ok(Json(current))
}

pub async fn release_detail(
    State(state): State<AppState>,
    Path((game, platform, key)): Path<(String, String, String)>,
) -> ApiResult<Json<ReleaseDetail>> {
    let detail =
        blocking(move || state.releases.release_detail(&game, &platform, &key)).await?;
    Ok(Json(detail))
}

pub async fn publish(
    State(state): State<AppState>,
    Path((game, platform)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult<Json<ReleaseOutcome>> {
    let request: ReleaseRequest = optional_body(&body)?;
    let outcome = blocking(move || {
        state
            .releases
            .publish(&game, &platform, request.build_key.as_deref())
    })
    .await?;
    Ok(Json(outcome))
}

pub async fn rollback(
    State(state): State<AppState>,
    Path((game, platform)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult<Json<ReleaseOutcome>> {
    let request: ReleaseRequest = optional_body(&body)?;
    let outcome = blocking(move || {
        state
            .releases
            .rollback(&game, &platform, request.build_key.as_deref())
    })
    .await?;
    Ok(Json(outcome))
}
