//! Classification call errors. All of them are recoverable at frame
//! scope; the analyzer substitutes a degraded verdict and continues.

#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("classification request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("classification endpoint returned status {0}")]
    UnexpectedStatus(u16),

    #[error("classification response did not parse: {0}")]
    Parse(String),

    #[error("classification call exceeded {0}s")]
    Timeout(u64),
}
