//! Environment builds and deployments.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use serde::Deserialize;
use shipyard_protocol::{DeployInfo, DeploymentDetail, FinalizedDeployment, PreparedBuild};

use super::{blocking, optional_body, parse_version};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PrepareBuildRequest {
    #[serde(default)]
    pub version: Option<u64>,
}

pub async fn list_environments(
    State(state): State<AppState>,
    Path(game): Path<String>,
) -> ApiResult<Json<Vec<String>>> {
    let envs = blocking(move || state.store.list_environments(&game)).await?;
    Ok(Json(envs))
}

pub async fn prepare_build(
    State(state): State<AppState>,
    Path((game, env)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult<Json<PreparedBuild>> {
    let request: PrepareBuildRequest = optional_body(&body)?;
    let prepared =
        blocking(move || state.store.prepare_build(&game, &env, request.version)).await?;
    Ok(Json(prepared))
}

pub async fn finalize_deployment(
    State(state): State<AppState>,
    Path((game, env, version)): Path<(String, String, String)>,
) -> ApiResult<Json<FinalizedDeployment>> {
    let version = parse_version(&version)?;
    let finalized =
        blocking(move || state.store.finalize_deployment(&game, &env, version)).await?;
    Ok(Json(finalized))
}

pub async fn list_deployments(
    State(state): State<AppState>,
    Path((game, env)): Path<(String, String)>,
) -> ApiResult<Json<Vec<DeployInfo>>> {
    let deployments = blocking(move || state.store.list_deployments(&game, &env)).await?;
    Ok(Json(deployments))
}

pub async fn current_deployment(
    State(state): State<AppState>,
    Path((game, env)): Path<(String, String)>,
) -> ApiResult<Json<DeployInfo>> {
    let current = blocking(move || state.store.current_deployment(&game, &env)).await?;
    Ok(Json(current))
}

pub async fn deployment_detail(
    State(state): State<AppState>,
    Path((game, env, version)): Path<(String, String, String)>,
) -> ApiResult<Json<DeploymentDetail>> {
    let version = parse_version(&version)?;
    let detail =
        blocking(move || state.store.deployment_detail(&game, &env, version)).await?;
    Ok(Json(detail))
}
