use std::io;

use axum::{
    body::Body,
    http::{HeaderValue, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use futures::{StreamExt, stream::BoxStream};
use thiserror::Error;

use crate::domain::error::InvalidOption;

use super::{
    args::{LICENSE_ARGS, VERSION_ARGS, document_args, image_args},
    process::{LaunchError, Renderer},
    query::{QueryParams, parse_document_options, parse_image_options},
};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const TEXT_CONTENT_TYPE: &str = "text/plain";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("request body is empty")]
    EmptyBody,
    #[error(transparent)]
    InvalidOption(#[from] InvalidOption),
    #[error(transparent)]
    Launch(#[from] LaunchError),
}

/// A started render: the content type is final, the body is still being produced.
pub struct RenderedOutput {
    pub content_type: &'static str,
    pub body: BoxStream<'static, io::Result<Bytes>>,
}

impl IntoResponse for RenderedOutput {
    fn into_response(self) -> Response {
        (
            [(CONTENT_TYPE, HeaderValue::from_static(self.content_type))],
            Body::from_stream(self.body),
        )
            .into_response()
    }
}

/// Parses options, builds renderer arguments, and launches the renderer for
/// each pipeline. Holds no per-request state.
#[derive(Debug, Clone)]
pub struct RenderService {
    pdf: Renderer,
    image: Renderer,
}

impl RenderService {
    pub fn new(pdf: Renderer, image: Renderer) -> Self {
        Self { pdf, image }
    }

    pub fn render_pdf(
        &self,
        query: &QueryParams,
        html: Bytes,
    ) -> Result<RenderedOutput, RenderError> {
        ensure_body(&html)?;
        let options = parse_document_options(query)?;
        let args = document_args(&options);
        let process = self.pdf.spawn("render::pdf", &args, Some(html))?;

        Ok(RenderedOutput {
            content_type: PDF_CONTENT_TYPE,
            body: process.into_stream().boxed(),
        })
    }

    pub fn render_image(
        &self,
        query: &QueryParams,
        html: Bytes,
    ) -> Result<RenderedOutput, RenderError> {
        ensure_body(&html)?;
        let options = parse_image_options(query)?;
        let args = image_args(&options);
        let process = self.image.spawn("render::image", &args, Some(html))?;

        Ok(RenderedOutput {
            content_type: options.format.content_type(),
            body: process.into_stream().boxed(),
        })
    }

    pub fn license(&self) -> Result<RenderedOutput, RenderError> {
        self.passthrough("render::license", LICENSE_ARGS)
    }

    pub fn version(&self) -> Result<RenderedOutput, RenderError> {
        self.passthrough("render::version", VERSION_ARGS)
    }

    fn passthrough(&self, op: &'static str, args: &[&str]) -> Result<RenderedOutput, RenderError> {
        let process = self.pdf.spawn(op, args, None)?;
        Ok(RenderedOutput {
            content_type: TEXT_CONTENT_TYPE,
            body: process.into_stream().boxed(),
        })
    }
}

fn ensure_body(html: &Bytes) -> Result<(), RenderError> {
    if html.is_empty() {
        return Err(RenderError::EmptyBody);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_renderers() -> RenderService {
        RenderService::new(
            Renderer::new("/nonexistent/htmlpress/wkhtmltopdf", "pdf"),
            Renderer::new("/nonexistent/htmlpress/wkhtmltoimage", "image"),
        )
    }

    #[tokio::test]
    async fn empty_body_is_rejected_before_options() {
        let service = missing_renderers();
        let query = QueryParams::parse(Some("orientation=X"));

        let err = service
            .render_pdf(&query, Bytes::new())
            .err()
            .expect("empty body");
        assert!(matches!(err, RenderError::EmptyBody));
    }

    #[tokio::test]
    async fn invalid_options_are_rejected_before_launch() {
        let service = missing_renderers();
        let query = QueryParams::parse(Some("quality=150"));

        let err = service
            .render_image(&query, Bytes::from_static(b"<p>x</p>"))
            .err()
            .expect("invalid quality");
        assert!(matches!(err, RenderError::InvalidOption(_)));
    }

    #[tokio::test]
    async fn missing_renderer_is_a_launch_error() {
        let service = missing_renderers();

        let err = service.version().err().expect("launch failure");
        assert!(matches!(
            err,
            RenderError::Launch(LaunchError::NotFound { .. })
        ));
    }
}
