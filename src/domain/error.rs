use thiserror::Error;

/// A query parameter that failed validation.
///
/// The display text is returned verbatim to clients as the body of a 400
/// response, so it must stay stable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct InvalidOption {
    message: String,
}

impl InvalidOption {
    /// The canonical "invalid `<field>` value provided" error.
    pub fn value(field: &str) -> Self {
        Self {
            message: format!("invalid {field} value provided"),
        }
    }

    /// An unsupported image format.
    pub fn format() -> Self {
        Self {
            message: "invalid format provided".to_string(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
