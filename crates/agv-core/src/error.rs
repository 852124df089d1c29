//! Errors raised while interpreting wire codes.

use thiserror::Error;

use crate::NavCode;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgvError {
    #[error("unknown navigation code {0}")]
    UnknownCode(NavCode),

    /// A valid code arrived on the side that never receives it.
    #[error("{code} is not a {expected}")]
    WrongRange { code: NavCode, expected: &'static str },
}

pub type AgvResult<T> = Result<T, AgvError>;
