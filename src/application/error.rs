use std::{borrow::Cow, error::Error as StdError};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{application::render::RenderError, infra::error::InfraError};

/// Diagnostic attached to error responses for the logging middleware.
///
/// Never sent to the client.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    public_message: Cow<'static, str>,
    report: ErrorReport,
}

impl HttpError {
    pub fn from_error(
        source: &'static str,
        status: StatusCode,
        public_message: impl Into<Cow<'static, str>>,
        error: &dyn StdError,
    ) -> Self {
        let report = ErrorReport::from_error(source, status, error);
        Self {
            status,
            public_message: public_message.into(),
            report,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Map a render failure for the handler named by `source`.
    pub fn from_render(source: &'static str, error: RenderError) -> Self {
        match &error {
            RenderError::EmptyBody => Self::from_error(source, StatusCode::BAD_REQUEST, "", &error),
            RenderError::InvalidOption(invalid) => Self::from_error(
                source,
                StatusCode::BAD_REQUEST,
                invalid.message().to_string(),
                &error,
            ),
            RenderError::Launch(_) => {
                Self::from_error(source, StatusCode::INTERNAL_SERVER_ERROR, "", &error)
            }
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response = if self.public_message.is_empty() {
            self.status.into_response()
        } else {
            (self.status, self.public_message.into_owned()).into_response()
        };
        self.report.attach(&mut response);
        response
    }
}

/// Process-level failure reported from `main`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{application::render::LaunchError, domain::error::InvalidOption};
    use std::{io, path::PathBuf};

    #[test]
    fn invalid_option_maps_to_bad_request_with_message() {
        let error = HttpError::from_render(
            "test",
            RenderError::InvalidOption(InvalidOption::value("width")),
        );
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error.public_message, "invalid width value provided");
    }

    #[test]
    fn launch_failure_hides_diagnostic_from_client() {
        let error = HttpError::from_render(
            "test",
            RenderError::Launch(LaunchError::NotFound {
                program: PathBuf::from("wkhtmltopdf"),
                source: io::Error::from(io::ErrorKind::NotFound),
            }),
        );
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(error.public_message.is_empty());
        assert!(error.report.messages[0].contains("wkhtmltopdf"));
    }
}
