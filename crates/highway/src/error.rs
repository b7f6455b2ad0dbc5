use thiserror::Error;

use crate::network::LaneIndex;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HighwayError {
    #[error("unknown lane {0}")]
    UnknownLane(LaneIndex),
    #[error("unknown vehicle type `{0}`")]
    UnknownVehicleType(String),
    #[error("no vehicle with id {0}")]
    UnknownVehicle(usize),
}
