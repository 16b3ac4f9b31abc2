use thiserror::Error;

/// Failures surfaced by the page-side plumbing.
///
/// The monitor runtime absorbs most of these (a failed load-more fetch is
/// reported as end of results), but they stay typed so callers can log the
/// distinction.
#[derive(Debug, Error)]
pub enum SiftError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("timeout")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> SiftError {
    if err.is_timeout() {
        return SiftError::Timeout;
    }
    SiftError::Network(err.to_string())
}
