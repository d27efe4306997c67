use axum::{
    extract::{RawQuery, State},
    response::{IntoResponse, Response},
};
use bytes::Bytes;

use crate::application::{
    error::HttpError,
    render::{QueryParams, RenderError, RenderedOutput},
};

use super::HttpState;

pub(super) async fn render_pdf(
    State(state): State<HttpState>,
    RawQuery(query): RawQuery,
    html: Bytes,
) -> Response {
    let query = QueryParams::parse(query.as_deref());
    respond(
        "infra::http::handlers::render_pdf",
        state.render.render_pdf(&query, html),
    )
}

pub(super) async fn render_image(
    State(state): State<HttpState>,
    RawQuery(query): RawQuery,
    html: Bytes,
) -> Response {
    let query = QueryParams::parse(query.as_deref());
    respond(
        "infra::http::handlers::render_image",
        state.render.render_image(&query, html),
    )
}

pub(super) async fn license(State(state): State<HttpState>) -> Response {
    respond("infra::http::handlers::license", state.render.license())
}

pub(super) async fn version(State(state): State<HttpState>) -> Response {
    respond("infra::http::handlers::version", state.render.version())
}

fn respond(source: &'static str, result: Result<RenderedOutput, RenderError>) -> Response {
    match result {
        Ok(output) => output.into_response(),
        Err(err) => HttpError::from_render(source, err).into_response(),
    }
}
