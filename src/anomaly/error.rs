use thiserror::Error;

/// Errors raised while setting up a half-space tree detector.
///
/// Once a detector exists, `learn` and `score` cannot fail.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HstError {
    #[error("invalid configuration `{field}`: {detail}")]
    InvalidConfiguration { field: String, detail: String },
}

impl HstError {
    pub(crate) fn invalid(field: impl Into<String>, detail: impl Into<String>) -> Self {
        HstError::InvalidConfiguration {
            field: field.into(),
            detail: detail.into(),
        }
    }
}
