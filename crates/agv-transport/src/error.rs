use agv_core::NavCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("link busy: {pending} is still awaiting its acknowledge")]
    LinkBusy { pending: NavCode },

    #[error("bulk channel overflow: frame needs {needed} words, {free} free")]
    BulkOverflow { needed: usize, free: usize },

    #[error("bulk channel receiver dropped")]
    BulkDisconnected,
}

pub type TransportResult<T> = Result<T, TransportError>;
