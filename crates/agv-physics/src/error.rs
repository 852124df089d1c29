use agv_core::ObstacleId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PhysicsError {
    #[error("expected {expected} bulk receivers, got {got}")]
    BulkReceivers { expected: usize, got: usize },

    #[error("obstacle {0} has fewer than two cells")]
    ObstaclePath(ObstacleId),
}

pub type PhysicsResult<T> = Result<T, PhysicsError>;
