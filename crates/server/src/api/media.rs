use axum::{
    body::Body,
    extract::{rejection::PathRejection, Path as AxumPath, State},
    http::Uri,
    Json,
};
use common::PROTOCOL_VERSION;
use library::{rating, tags};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::state::{AckResponse, ApiError, AppState, InfoResponse, JsonResult, ListResponse};
use crate::utils::{ack, api_error};

use super::library_task;

const MAX_BODY_BYTES: usize = 64 * 1024;

pub async fn list(State(state): State<AppState>) -> JsonResult<ListResponse> {
    let library = state.library.clone();
    let files = library_task(move || Ok(library.list())).await?;
    Ok(Json(ListResponse {
        version: PROTOCOL_VERSION,
        files,
    }))
}

pub async fn info(
    State(state): State<AppState>,
    name: Result<AxumPath<String>, PathRejection>,
) -> JsonResult<InfoResponse> {
    let name = path_name(name)?;
    let library = state.library.clone();
    let record = library_task(move || Ok(library.info(&name))).await?;
    Ok(Json(InfoResponse {
        version: PROTOCOL_VERSION,
        info: record,
    }))
}

pub async fn refresh(State(state): State<AppState>) -> JsonResult<AckResponse> {
    let library = state.library.clone();
    let index = library_task(move || library.refresh()).await?;
    info!("Index refreshed: {} files", index.len());
    Ok(ack())
}

pub async fn tag(
    State(state): State<AppState>,
    name: Result<AxumPath<String>, PathRejection>,
    body: Body,
) -> JsonResult<AckResponse> {
    let name = path_name(name)?;
    let body = read_json_body(body).await?;
    let tags = tags::tags_from_body(&body);
    let library = state.library.clone();
    library_task(move || library.tag(&name, tags)).await?;
    Ok(ack())
}

pub async fn rate(
    State(state): State<AppState>,
    name: Result<AxumPath<String>, PathRejection>,
    body: Body,
) -> JsonResult<AckResponse> {
    let name = path_name(name)?;
    let body = read_json_body(body).await?;
    let sample = rating::rating_from_body(&body);
    let library = state.library.clone();
    library_task(move || library.rate(&name, sample)).await?;
    Ok(ack())
}

pub async fn unknown_route(uri: Uri) -> ApiError {
    debug!("Unknown API route {}", uri.path());
    api_error("unknown api route")
}

fn path_name(name: Result<AxumPath<String>, PathRejection>) -> Result<String, ApiError> {
    name.map(|AxumPath(name)| name).map_err(|err| {
        warn!("Bad file name in request path: {}", err);
        api_error(format!("invalid file name: {}", err))
    })
}

/// Reads the whole request body and parses it as JSON.
async fn read_json_body(body: Body) -> Result<Value, ApiError> {
    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|err| api_error(format!("failed to read request body: {}", err)))?;
    serde_json::from_slice(&bytes).map_err(|err| api_error(format!("invalid json body: {}", err)))
}
