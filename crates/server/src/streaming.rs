use std::io::SeekFrom;

use axum::body::Body;
use axum::extract::{Path as AxumPath, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::range::{parse_range_header, ByteRange, RangeError};
use crate::state::AppState;
use crate::utils::json_error_response;

/// `GET /data/<name>`: a file from the data directory, honoring single
/// `Range` requests.
pub async fn serve_data_file(
    State(state): State<AppState>,
    AxumPath(name): AxumPath<String>,
    headers: HeaderMap,
) -> Response {
    let library = state.library.clone();
    let resolved = match tokio::task::spawn_blocking(move || library.guard().resolve(&name)).await {
        Ok(Ok(resolved)) => resolved,
        Ok(Err(_)) => return json_error_response(StatusCode::FORBIDDEN, "forbidden"),
        Err(err) => {
            return json_error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("task failed: {}", err))
        }
    };

    let mut file = match tokio::fs::File::open(&resolved.absolute).await {
        Ok(file) => file,
        Err(_) => return json_error_response(StatusCode::NOT_FOUND, "file not found"),
    };
    let size = match file.metadata().await {
        Ok(meta) if meta.is_file() => meta.len(),
        _ => return json_error_response(StatusCode::NOT_FOUND, "file not found"),
    };
    let mime = mime_guess::from_path(&resolved.absolute).first_or_octet_stream();

    let requested = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok())
        .map(|value| parse_range_header(value, size));

    let range = match requested {
        Some(Ok(range)) => Some(range),
        Some(Err(RangeError::Unsatisfiable)) => return unsatisfiable(size),
        Some(Err(RangeError::Invalid)) | None => None,
    };

    let mut response = match range {
        Some(range) => {
            debug!("Serving {} bytes {}-{}", resolved.relpath, range.start, range.end);
            if let Err(err) = file.seek(SeekFrom::Start(range.start)).await {
                return json_error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("seek failed: {}", err));
            }
            partial_response(file, range, size)
        }
        None => {
            let mut response = Response::new(Body::from_stream(ReaderStream::new(file)));
            insert_header(&mut response, header::CONTENT_LENGTH, &size.to_string());
            response
        }
    };
    insert_header(&mut response, header::CONTENT_TYPE, mime.as_ref());
    response
        .headers_mut()
        .insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    response
}

fn partial_response(file: tokio::fs::File, range: ByteRange, size: u64) -> Response {
    let stream = ReaderStream::new(file.take(range.len()));
    let mut response = Response::new(Body::from_stream(stream));
    *response.status_mut() = StatusCode::PARTIAL_CONTENT;
    insert_header(&mut response, header::CONTENT_LENGTH, &range.len().to_string());
    insert_header(&mut response, header::CONTENT_RANGE, &range.content_range(size));
    response
}

fn unsatisfiable(size: u64) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::RANGE_NOT_SATISFIABLE;
    insert_header(&mut response, header::CONTENT_RANGE, &format!("bytes */{}", size));
    response
}

fn insert_header(response: &mut Response, name: header::HeaderName, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        response.headers_mut().insert(name, value);
    }
}
