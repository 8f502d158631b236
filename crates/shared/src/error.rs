use thiserror::Error;

/// Normalized failure of one remote lookup. The message is exactly what the
/// presentation layer shows; transport and parse failures are collapsed into
/// a generic message before they reach this type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("{0}")]
    SearchFailed(String),
    #[error("{0}")]
    AdsFetchFailed(String),
}

impl ApiError {
    pub fn message(&self) -> &str {
        match self {
            ApiError::SearchFailed(message) | ApiError::AdsFetchFailed(message) => message,
        }
    }
}
