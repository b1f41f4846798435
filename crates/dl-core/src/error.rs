//! Errors raised while validating or parsing core values.
//!
//! Sub-crates wrap `DlError` in their own enums via `#[from]`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DlError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),
}

pub type DlResult<T> = Result<T, DlError>;
