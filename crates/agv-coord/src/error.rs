use agv_core::RobotId;
use agv_transport::TransportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoordError {
    #[error("expected {expected} bulk senders, got {got}")]
    BulkSenders { expected: usize, got: usize },

    #[error("handoff names unknown robot {0}")]
    UnknownRobot(RobotId),

    #[error("transport: {0}")]
    Transport(#[from] TransportError),
}

pub type CoordResult<T> = Result<T, CoordError>;
