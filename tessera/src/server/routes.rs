use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::info;

use crate::common::{Error, StatusClass};
use crate::pipeline::Pipeline;
use crate::storage::TileStore;

const INDEX_HTML: &str = include_str!("../../assets/index.html");

pub(crate) const INDEX_ALLOW: &str = "GET, HEAD, OPTIONS";
pub(crate) const PROCESS_ALLOW: &str = "OPTIONS, POST";

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

pub(crate) fn json_err(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorBody { error: message })).into_response()
}

pub(crate) async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub(crate) fn allow(methods: &'static str) -> Response {
    (StatusCode::OK, [(header::ALLOW, methods)]).into_response()
}

pub(crate) async fn not_found() -> Response {
    json_err(StatusCode::NOT_FOUND, "Endpoint not found")
}

pub(crate) async fn method_not_allowed() -> Response {
    json_err(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

pub(crate) async fn process_drawing<S: TileStore + 'static>(
    State(pipeline): State<Arc<Pipeline<S>>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    // Oversized bodies land here as a length-limit rejection.
    let body = match body {
        Ok(body) => body,
        Err(rejection) => return json_err(rejection.status(), &rejection.body_text()),
    };

    let result = tokio::task::spawn_blocking(move || pipeline.process_request(&body)).await;

    match result {
        Ok(Ok(report)) => Json(report).into_response(),
        Ok(Err(err)) => error_response(&err),
        Err(join_err) => {
            tracing::error!("Unexpected error in process_drawing: {}", join_err);
            json_err(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error occurred",
            )
        }
    }
}

/// Client errors and storage failures carry their own message. Anything
/// else is reported generically.
pub(crate) fn error_response(err: &Error) -> Response {
    match err.status() {
        StatusClass::Client => json_err(StatusCode::BAD_REQUEST, &err.to_string()),
        StatusClass::Server => match err {
            Error::Storage { .. } => {
                json_err(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
            }
            Error::TileExtraction { row, col } => json_err(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Failed to create tile at position ({},{})", row, col),
            ),
            _ => {
                tracing::error!("Unexpected error in process_drawing: {}", err);
                json_err(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error occurred",
                )
            }
        },
    }
}

pub(crate) async fn log_request(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let response = next.run(request).await;

    info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        duration_ms = start.elapsed().as_millis() as u64,
        "request"
    );
    response
}
