use agv_coord::CoordError;
use agv_layout::LayoutError;
use agv_physics::PhysicsError;
use agv_transport::TransportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("layout: {0}")]
    Layout(#[from] LayoutError),

    #[error("physical engine: {0}")]
    Physics(#[from] PhysicsError),

    #[error("coordination engine: {0}")]
    Coord(#[from] CoordError),

    #[error("transport: {0}")]
    Transport(#[from] TransportError),
}

pub type SimResult<T> = Result<T, SimError>;
