use std::path::PathBuf;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::Json;
use common::{MediaIndex, MediaRecord};
use library::MediaLibrary;
use serde::Serialize;

#[derive(Clone)]
pub struct AppState {
    pub library: Arc<MediaLibrary>,
    pub app_root: PathBuf,
}

impl AppState {
    pub fn new(library: MediaLibrary, app_root: PathBuf) -> Self {
        Self {
            library: Arc::new(library),
            app_root,
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub version: f64,
    pub error: String,
}

#[derive(Serialize)]
pub struct AckResponse {
    pub version: f64,
}

#[derive(Serialize)]
pub struct ListResponse {
    pub version: f64,
    pub files: MediaIndex,
}

#[derive(Serialize)]
pub struct InfoResponse {
    pub version: f64,
    pub info: MediaRecord,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub type JsonResult<T> = Result<Json<T>, ApiError>;
