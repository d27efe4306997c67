//! HTML rendering pipelines: query parsing, argument building, renderer process.

pub mod args;
pub mod process;
pub mod query;
mod service;

pub use process::{LaunchError, RenderProcess, Renderer};
pub use query::QueryParams;
pub use service::{PDF_CONTENT_TYPE, RenderError, RenderService, RenderedOutput, TEXT_CONTENT_TYPE};
