use std::time::Instant;

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::{Instrument, error, info_span, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

const LOG_TARGET: &str = "htmlpress::http::response";

/// Run the request inside a `request` span tagged with a fresh request id.
///
/// Renderers capture this span when they start, so events logged while the
/// body streams, after this middleware has returned, still carry the id.
/// The id is echoed to the client in `x-request-id`.
pub async fn set_request_context(request: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    let mut response = next.run(request).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Log rejected and failed requests once their headers are ready.
///
/// Handler errors carry an `ErrorReport`; rejections produced by axum itself
/// (405, 413) do not.
pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let query = request.uri().query().map(str::to_string);
    let start = Instant::now();

    let mut response = next.run(request).await;
    let status = response.status();

    if status.is_client_error() || status.is_server_error() {
        let report = response.extensions_mut().remove::<ErrorReport>();
        let elapsed_ms = start.elapsed().as_millis() as u64;
        log_failure(status, query.as_deref().unwrap_or(""), report, elapsed_ms);
    }

    response
}

fn log_failure(status: StatusCode, query: &str, report: Option<ErrorReport>, elapsed_ms: u64) {
    let (source, chain) = report
        .map(|report| (report.source, report.messages))
        .unwrap_or(("axum", Vec::new()));
    let detail = chain
        .first()
        .map(String::as_str)
        .unwrap_or("rejected before reaching a handler");

    if status.is_server_error() {
        error!(
            target = LOG_TARGET,
            status = status.as_u16(),
            query,
            source,
            detail,
            chain = ?chain,
            elapsed_ms,
            "Render request failed"
        );
    } else {
        warn!(
            target = LOG_TARGET,
            status = status.as_u16(),
            query,
            source,
            detail,
            elapsed_ms,
            "Render request rejected"
        );
    }
}
