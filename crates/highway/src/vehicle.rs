//! # Vehicles
//!
//! Kinematic state of a single car and its integration step. What a vehicle
//! decides to do each frame is delegated to its [`Behavior`].

use std::str::FromStr;

use crate::behavior::{Behavior, IdmState, MetaController};
use crate::error::HighwayError;
use crate::lane::Lane;
use crate::math::{Rect, Vec2};
use crate::network::{LaneIndex, RoadNetwork};

pub const VEHICLE_LENGTH: f64 = 5.0;
pub const VEHICLE_WIDTH: f64 = 2.0;
pub const MAX_SPEED: f64 = 40.0;
pub const MIN_SPEED: f64 = -40.0;

/// Low-level command applied during one integration step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Action {
    /// Longitudinal acceleration in m/s^2.
    pub acceleration: f64,
    /// Front wheel angle in radians.
    pub steering: f64,
}

#[derive(Clone, Debug)]
pub struct Vehicle {
    pub position: Vec2,
    pub heading: f64,
    pub speed: f64,
    pub lane_index: LaneIndex,
    pub target_lane_index: LaneIndex,
    pub target_speed: f64,
    pub crashed: bool,
    pub behavior: Behavior,
    pub(crate) action: Action,
}

impl Vehicle {
    /// Place a vehicle on `lane_index` at a longitudinal offset, aligned with the lane.
    ///
    /// # Errors
    ///
    /// Returns [`HighwayError::UnknownLane`] if the lane does not exist.
    pub fn on_lane(
        network: &RoadNetwork,
        lane_index: &LaneIndex,
        longitudinal: f64,
        speed: f64,
        behavior: Behavior,
    ) -> Result<Self, HighwayError> {
        let lane = network.get_lane(lane_index)?;
        Ok(Self::new(
            lane.position(longitudinal, 0.0),
            lane.heading_at(longitudinal),
            speed,
            lane_index.clone(),
            behavior,
        ))
    }

    /// Build a vehicle at a world position already resolved on `lane`.
    pub fn at(lane: &Lane, lane_index: &LaneIndex, position: Vec2, speed: f64, behavior: Behavior) -> Self {
        let (longitudinal, _) = lane.local_coordinates(position);
        Self::new(position, lane.heading_at(longitudinal), speed, lane_index.clone(), behavior)
    }

    fn new(position: Vec2, heading: f64, speed: f64, lane_index: LaneIndex, behavior: Behavior) -> Self {
        let mut behavior = behavior;
        if let Behavior::Controlled(controller) = &mut behavior {
            controller.sync_speed_index(speed);
        }
        if let Behavior::Idm(state) = &mut behavior {
            state.seed_timer(position);
        }
        let target_speed = match &behavior {
            Behavior::Controlled(controller) => controller.target_speed(),
            Behavior::Passive | Behavior::Idm(_) => speed,
        };
        Self {
            position,
            heading,
            speed,
            target_lane_index: lane_index.clone(),
            lane_index,
            target_speed,
            crashed: false,
            behavior,
            action: Action::default(),
        }
    }

    pub fn direction(&self) -> Vec2 {
        Vec2::from_angle(self.heading)
    }

    pub fn velocity(&self) -> Vec2 {
        self.direction() * self.speed
    }

    pub fn is_controlled(&self) -> bool {
        matches!(self.behavior, Behavior::Controlled(_) | Behavior::Idm(_))
    }

    pub fn action(&self) -> Action {
        self.action
    }

    /// Longitudinal gap to `other`, measured along this vehicle's lane.
    pub fn lane_distance_to(&self, other_position: Vec2, network: &RoadNetwork) -> f64 {
        match network.get_lane(&self.lane_index) {
            Ok(lane) => lane.local_coordinates(other_position).0 - lane.local_coordinates(self.position).0,
            Err(_) => (other_position - self.position).dot(self.direction()),
        }
    }

    pub(crate) fn footprint(&self) -> Rect {
        Rect {
            center: self.position,
            length: VEHICLE_LENGTH,
            width: VEHICLE_WIDTH,
            heading: self.heading,
        }
    }

    /// Integrate the kinematic bicycle model over `dt` with the stored action.
    pub(crate) fn step(&mut self, dt: f64, network: &RoadNetwork) {
        if self.crashed {
            self.action = Action { acceleration: -self.speed, steering: 0.0 };
        }
        // Out-of-range speeds return to the range gradually.
        if self.speed > MAX_SPEED {
            self.action.acceleration = self.action.acceleration.min(MAX_SPEED - self.speed);
        } else if self.speed < MIN_SPEED {
            self.action.acceleration = self.action.acceleration.max(MIN_SPEED - self.speed);
        }
        let beta = (0.5 * self.action.steering.tan()).atan();
        let velocity = Vec2::from_angle(self.heading + beta) * self.speed;
        self.position += velocity * dt;
        self.heading += self.speed * beta.sin() / (VEHICLE_LENGTH / 2.0) * dt;
        self.speed += self.action.acceleration * dt;
        if let Behavior::Idm(state) = &mut self.behavior {
            state.timer += dt;
        }
        if let Some(index) = network.closest_lane_index(self.position, self.heading) {
            self.lane_index = index;
        }
    }

    /// Kinematic features `[x, y, vx, vy]`, relative to `origin` when given.
    pub fn features(&self, origin: Option<&Vehicle>) -> [f64; 4] {
        let velocity = self.velocity();
        match origin {
            Some(o) => {
                let p = self.position - o.position;
                let v = velocity - o.velocity();
                [p.x, p.y, v.x, v.y]
            }
            None => [self.position.x, self.position.y, velocity.x, velocity.y],
        }
    }
}

/// Vehicle model selected by a configured type path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VehicleType {
    /// IDM longitudinal control and MOBIL lane changes.
    Idm,
    /// Keeps its initial speed and heading.
    Passive,
}

impl VehicleType {
    pub const IDM_PATH: &'static str = "highway::behavior::IdmVehicle";
    pub const PASSIVE_PATH: &'static str = "highway::vehicle::Vehicle";

    pub fn behavior(self) -> Behavior {
        match self {
            VehicleType::Idm => Behavior::Idm(IdmState::default()),
            VehicleType::Passive => Behavior::Passive,
        }
    }

    /// # Errors
    ///
    /// Returns [`HighwayError::UnknownLane`] if the lane does not exist.
    pub fn spawn(
        self,
        network: &RoadNetwork,
        lane_index: &LaneIndex,
        position: Vec2,
        speed: f64,
    ) -> Result<Vehicle, HighwayError> {
        let lane = network.get_lane(lane_index)?;
        Ok(Vehicle::at(lane, lane_index, position, speed, self.behavior()))
    }
}

impl FromStr for VehicleType {
    type Err = HighwayError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        match path {
            Self::IDM_PATH => Ok(VehicleType::Idm),
            Self::PASSIVE_PATH => Ok(VehicleType::Passive),
            other => Err(HighwayError::UnknownVehicleType(other.to_owned())),
        }
    }
}

/// Controlled vehicle driven by discrete meta-actions.
///
/// # Errors
///
/// Returns [`HighwayError::UnknownLane`] if the lane does not exist.
pub fn controlled_vehicle(
    network: &RoadNetwork,
    lane_index: &LaneIndex,
    position: Vec2,
    speed: f64,
    target_speeds: Vec<f64>,
) -> Result<Vehicle, HighwayError> {
    let lane = network.get_lane(lane_index)?;
    let controller = MetaController::new(target_speeds);
    Ok(Vehicle::at(lane, lane_index, position, speed, Behavior::Controlled(controller)))
}
