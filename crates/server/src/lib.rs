pub mod api;
pub mod config;
pub mod range;
pub mod state;
pub mod streaming;
pub mod utils;

use axum::{routing::get, Router};
use tower_http::request_id::{MakeRequestUuid, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use api::api_router;
use state::AppState;
use streaming::serve_data_file;

/// `/api/*` first, then `/data/*`, everything else from the app directory.
pub fn build_router(state: AppState) -> Router {
    let data = Router::new()
        .route("/data/*name", get(serve_data_file))
        .with_state(state.clone());

    Router::new()
        .nest("/api", api_router(state.clone()))
        .merge(data)
        .fallback_service(ServeDir::new(&state.app_root))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
}
