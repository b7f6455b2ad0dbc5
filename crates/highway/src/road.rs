//! # Road
//!
//! The road owns the network and everything placed on it: an ordered
//! collection of vehicles and a list of static obstacles. Stepping the road
//! first lets every vehicle decide on an action from the same snapshot, then
//! integrates all of them and finally resolves collisions.

use tracing::trace;

use crate::behavior::{self, Behavior, MetaAction};
use crate::error::HighwayError;
use crate::math::{rotated_rectangles_intersect, Rect, Vec2};
use crate::network::{LaneIndex, RoadNetwork};
use crate::vehicle::{Vehicle, VEHICLE_LENGTH, VEHICLE_WIDTH};

/// Position of a vehicle in [`Road::vehicles`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VehicleId(pub usize);

/// A static road object such as the barrier closing a merge lane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obstacle {
    pub position: Vec2,
    pub heading: f64,
    pub hit: bool,
}

impl Obstacle {
    pub fn new(position: Vec2, heading: f64) -> Self {
        Self { position, heading, hit: false }
    }

    fn footprint(&self) -> Rect {
        Rect {
            center: self.position,
            length: VEHICLE_LENGTH,
            width: VEHICLE_WIDTH,
            heading: self.heading,
        }
    }
}

/// Kinematic view of a neighbouring vehicle or obstacle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbour {
    /// `None` for obstacles.
    pub id: Option<VehicleId>,
    pub position: Vec2,
    pub velocity: Vec2,
}

impl Neighbour {
    pub fn of(vehicle: &Vehicle, id: Option<VehicleId>) -> Self {
        Self { id, position: vehicle.position, velocity: vehicle.velocity() }
    }

    fn of_obstacle(obstacle: &Obstacle) -> Self {
        Self { id: None, position: obstacle.position, velocity: Vec2::ZERO }
    }
}

pub struct Road {
    pub network: RoadNetwork,
    pub vehicles: Vec<Vehicle>,
    pub obstacles: Vec<Obstacle>,
}

impl Road {
    pub fn new(network: RoadNetwork) -> Self {
        Self { network, vehicles: Vec::new(), obstacles: Vec::new() }
    }

    pub fn push(&mut self, vehicle: Vehicle) -> VehicleId {
        self.vehicles.push(vehicle);
        VehicleId(self.vehicles.len() - 1)
    }

    /// # Errors
    ///
    /// Returns [`HighwayError::UnknownVehicle`] if `id` is out of range.
    pub fn get(&self, id: VehicleId) -> Result<&Vehicle, HighwayError> {
        self.vehicles.get(id.0).ok_or(HighwayError::UnknownVehicle(id.0))
    }

    /// # Errors
    ///
    /// Returns [`HighwayError::UnknownVehicle`] if `id` is out of range.
    pub fn get_mut(&mut self, id: VehicleId) -> Result<&mut Vehicle, HighwayError> {
        self.vehicles.get_mut(id.0).ok_or(HighwayError::UnknownVehicle(id.0))
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn clear(&mut self) {
        self.vehicles.clear();
        self.obstacles.clear();
    }

    /// Change the speed or lane target of a meta-action driven vehicle.
    ///
    /// Returns `Ok(false)` when the vehicle does not accept meta-actions.
    ///
    /// # Errors
    ///
    /// Returns [`HighwayError::UnknownVehicle`] if `id` is out of range.
    pub fn apply_meta_action(&mut self, id: VehicleId, action: MetaAction) -> Result<bool, HighwayError> {
        let vehicle = self.vehicles.get_mut(id.0).ok_or(HighwayError::UnknownVehicle(id.0))?;
        Ok(behavior::apply_meta_action(vehicle, &self.network, action))
    }

    /// Closest vehicles or obstacles ahead of and behind `id` on `lane_index`.
    pub fn neighbour_vehicles(&self, id: VehicleId, lane_index: &LaneIndex) -> (Option<Neighbour>, Option<Neighbour>) {
        let (Some(vehicle), Ok(lane)) = (self.vehicles.get(id.0), self.network.get_lane(lane_index)) else {
            return (None, None);
        };
        let s = lane.local_coordinates(vehicle.position).0;

        let others = self
            .vehicles
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != id.0)
            .map(|(i, v)| Neighbour::of(v, Some(VehicleId(i))))
            .chain(self.obstacles.iter().map(Neighbour::of_obstacle));

        let mut front: Option<(f64, Neighbour)> = None;
        let mut rear: Option<(f64, Neighbour)> = None;
        for other in others {
            if !lane.on_lane(other.position, 1.0) {
                continue;
            }
            let s_other = lane.local_coordinates(other.position).0;
            if s <= s_other && front.map_or(true, |(best, _)| s_other <= best) {
                front = Some((s_other, other));
            }
            if s_other < s && rear.map_or(true, |(best, _)| s_other > best) {
                rear = Some((s_other, other));
            }
        }
        (front.map(|(_, n)| n), rear.map(|(_, n)| n))
    }

    /// Up to `count` vehicles within `distance` of `id`, closest first.
    pub fn close_vehicles_to(&self, id: VehicleId, distance: f64, count: usize) -> Vec<VehicleId> {
        let Some(origin) = self.vehicles.get(id.0) else {
            return Vec::new();
        };
        let mut close: Vec<(f64, VehicleId)> = self
            .vehicles
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != id.0)
            .map(|(i, v)| (origin.position.distance(v.position), VehicleId(i)))
            .filter(|(d, _)| *d < distance)
            .collect();
        close.sort_by(|a, b| a.0.total_cmp(&b.0));
        close.into_iter().take(count).map(|(_, i)| i).collect()
    }

    /// Let every vehicle decide its low-level action for the next frame.
    pub fn act(&mut self) {
        let decisions: Vec<_> = (0..self.vehicles.len())
            .map(|i| behavior::decide(self, VehicleId(i)))
            .collect();
        for (vehicle, decision) in self.vehicles.iter_mut().zip(decisions) {
            vehicle.action = decision.action;
            vehicle.target_lane_index = decision.target_lane_index;
            if let Behavior::Idm(state) = &mut vehicle.behavior {
                if decision.reset_timer {
                    state.timer = 0.0;
                }
            }
        }
    }

    /// Integrate all vehicles over `dt` and resolve collisions.
    pub fn step(&mut self, dt: f64) {
        for vehicle in &mut self.vehicles {
            vehicle.step(dt, &self.network);
        }
        self.check_collisions();
        trace!(vehicles = self.vehicles.len(), dt, "road stepped");
    }

    fn check_collisions(&mut self) {
        let n = self.vehicles.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = (self.vehicles[i].footprint(), self.vehicles[j].footprint());
                if rotated_rectangles_intersect(&a, &b) {
                    self.vehicles[i].crashed = true;
                    self.vehicles[j].crashed = true;
                }
            }
            for obstacle in &mut self.obstacles {
                if rotated_rectangles_intersect(&self.vehicles[i].footprint(), &obstacle.footprint()) {
                    self.vehicles[i].crashed = true;
                    obstacle.hit = true;
                }
            }
        }
    }
}
