pub mod media;

use axum::{routing::any, Router};
use library::LibraryError;

use crate::state::{ApiError, AppState};
use crate::utils::api_error;

/// Routes mounted under `/api`. Every route accepts any method; mutation
/// routes fail on a missing body instead.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/list", any(media::list))
        .route("/info/*name", any(media::info))
        .route("/refresh", any(media::refresh))
        .route("/tag/*name", any(media::tag))
        .route("/rate/*name", any(media::rate))
        .fallback(media::unknown_route)
        .with_state(state)
}

/// Runs blocking library work off the async workers.
pub(crate) async fn library_task<T, F>(task: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, LibraryError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(task).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(api_error(err.to_string())),
        Err(err) => Err(api_error(format!("task failed: {}", err))),
    }
}
