//! # Driving Behaviors
//!
//! Each vehicle carries a [`Behavior`] that turns the current road state into
//! a low-level [`Action`] every simulation frame:
//!
//! -   [`Behavior::Passive`] never accelerates or steers.
//! -   [`Behavior::Controlled`] follows the speed and lane targets set by
//!     discrete [`MetaAction`]s, typically chosen by a learning agent.
//! -   [`Behavior::Idm`] drives autonomously with the Intelligent Driver Model
//!     for longitudinal control and MOBIL for lane changes.
//!
//! Decisions are computed from an immutable view of the road and applied
//! afterwards by [`crate::Road::act`], so every vehicle reacts to the same
//! snapshot.

use std::f64::consts::{FRAC_PI_3, FRAC_PI_4};

use serde::{Deserialize, Serialize};

use crate::math::{not_zero, wrap_to_pi, Vec2};
use crate::network::{LaneIndex, RoadNetwork};
use crate::road::{Neighbour, Road, VehicleId};
use crate::vehicle::{Action, Vehicle, VEHICLE_LENGTH};

// Lane and speed controller time constants
const TAU_ACC: f64 = 0.6;
const TAU_HEADING: f64 = 0.2;
const TAU_LATERAL: f64 = 0.6;
const TAU_PURSUIT: f64 = 0.5 * TAU_HEADING;
const KP_A: f64 = 1.0 / TAU_ACC;
const KP_HEADING: f64 = 1.0 / TAU_HEADING;
const KP_LATERAL: f64 = 1.0 / TAU_LATERAL;
const MAX_STEERING_ANGLE: f64 = FRAC_PI_3;

// Intelligent Driver Model
const ACC_MAX: f64 = 6.0;
const COMFORT_ACC_MAX: f64 = 3.0;
const COMFORT_ACC_MIN: f64 = -5.0;
const DISTANCE_WANTED: f64 = 5.0 + VEHICLE_LENGTH;
const TIME_WANTED: f64 = 1.5;
const DELTA: f64 = 4.0;

// MOBIL
const POLITENESS: f64 = 0.0;
const LANE_CHANGE_MIN_ACC_GAIN: f64 = 0.2;
const LANE_CHANGE_MAX_BRAKING_IMPOSED: f64 = 2.0;
/// Seconds between two lane-change decisions.
pub const LANE_CHANGE_DELAY: f64 = 1.0;

pub const DEFAULT_TARGET_SPEEDS: [f64; 3] = [20.0, 25.0, 30.0];

/// Discrete high-level action, indexed the way agents address it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetaAction {
    LaneLeft,
    Idle,
    LaneRight,
    Faster,
    Slower,
}

impl MetaAction {
    pub const ALL: [MetaAction; 5] = [
        MetaAction::LaneLeft,
        MetaAction::Idle,
        MetaAction::LaneRight,
        MetaAction::Faster,
        MetaAction::Slower,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_lane_change(self) -> bool {
        matches!(self, MetaAction::LaneLeft | MetaAction::LaneRight)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Behavior {
    Passive,
    Controlled(MetaController),
    Idm(IdmState),
}

/// Speed ladder and cursor of a meta-action driven vehicle.
#[derive(Clone, Debug, PartialEq)]
pub struct MetaController {
    target_speeds: Vec<f64>,
    speed_index: usize,
}

impl MetaController {
    pub fn new(target_speeds: Vec<f64>) -> Self {
        let target_speeds = if target_speeds.is_empty() {
            DEFAULT_TARGET_SPEEDS.to_vec()
        } else {
            target_speeds
        };
        Self { target_speeds, speed_index: 0 }
    }

    pub fn target_speed(&self) -> f64 {
        self.target_speeds[self.speed_index]
    }

    pub fn speed_index(&self) -> usize {
        self.speed_index
    }

    pub fn target_speeds(&self) -> &[f64] {
        &self.target_speeds
    }

    /// Index of the ladder rung closest to `speed`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn speed_to_index(&self, speed: f64) -> usize {
        let last = self.target_speeds.len() - 1;
        if last == 0 {
            return 0;
        }
        let lo = self.target_speeds[0];
        let hi = self.target_speeds[last];
        let x = (speed - lo) / not_zero(hi - lo);
        (x * last as f64).round().clamp(0.0, last as f64) as usize
    }

    pub(crate) fn sync_speed_index(&mut self, speed: f64) {
        self.speed_index = self.speed_to_index(speed);
    }

    fn shift(&mut self, speed: f64, up: bool) {
        let current = self.speed_to_index(speed);
        let last = self.target_speeds.len() - 1;
        self.speed_index = if up { (current + 1).min(last) } else { current.saturating_sub(1) };
    }
}

/// Per-vehicle state of the IDM/MOBIL driver.
#[derive(Clone, Debug, PartialEq)]
pub struct IdmState {
    /// Time since the last lane-change decision.
    pub timer: f64,
    pub enable_lane_change: bool,
}

impl Default for IdmState {
    fn default() -> Self {
        Self::new(true)
    }
}

impl IdmState {
    pub fn new(enable_lane_change: bool) -> Self {
        Self { timer: 0.0, enable_lane_change }
    }

    /// Desynchronise decision instants between vehicles based on their position.
    pub(crate) fn seed_timer(&mut self, position: Vec2) {
        self.timer = ((position.x + position.y) * std::f64::consts::PI).rem_euclid(LANE_CHANGE_DELAY);
    }
}

/// Update the targets of a controlled vehicle from a meta-action.
///
/// Returns `false` when the vehicle is not meta-action driven.
pub(crate) fn apply_meta_action(vehicle: &mut Vehicle, network: &RoadNetwork, action: MetaAction) -> bool {
    let Behavior::Controlled(controller) = &mut vehicle.behavior else {
        return false;
    };
    match action {
        MetaAction::Faster => controller.shift(vehicle.speed, true),
        MetaAction::Slower => controller.shift(vehicle.speed, false),
        MetaAction::LaneLeft | MetaAction::LaneRight => {
            let current = &vehicle.target_lane_index;
            let count = network.lane_count(&current.from, &current.to);
            let id = if action == MetaAction::LaneLeft {
                current.id.saturating_sub(1)
            } else {
                (current.id + 1).min(count.saturating_sub(1))
            };
            let target = current.with_id(id);
            let allowed = network
                .get_lane(&target)
                .is_ok_and(|lane| lane.is_reachable_from(vehicle.position) && !lane.is_forbidden());
            if allowed {
                vehicle.target_lane_index = target;
            }
        }
        MetaAction::Idle => {}
    }
    vehicle.target_speed = controller.target_speed();
    true
}

/// Outcome of one decision for one vehicle.
#[derive(Clone, Debug)]
pub(crate) struct Decision {
    pub action: Action,
    pub target_lane_index: LaneIndex,
    pub reset_timer: bool,
}

pub(crate) fn decide(road: &Road, id: VehicleId) -> Decision {
    let vehicle = &road.vehicles[id.0];
    let mut decision = Decision {
        action: Action::default(),
        target_lane_index: follow_road(vehicle, &road.network),
        reset_timer: false,
    };
    if vehicle.crashed {
        return decision;
    }
    match &vehicle.behavior {
        Behavior::Passive => {}
        Behavior::Controlled(_) => {
            decision.action = Action {
                steering: steering_control(vehicle, &road.network, &decision.target_lane_index),
                acceleration: KP_A * (vehicle.target_speed - vehicle.speed),
            };
        }
        Behavior::Idm(state) => {
            if state.enable_lane_change {
                change_lane_policy(road, id, state, &mut decision);
            }
            let steering = steering_control(vehicle, &road.network, &decision.target_lane_index);
            let (front, _) = road.neighbour_vehicles(id, &vehicle.lane_index);
            let mut acceleration = idm_acceleration(vehicle, front.as_ref(), &road.network);
            if vehicle.lane_index != decision.target_lane_index {
                let (target_front, _) = road.neighbour_vehicles(id, &decision.target_lane_index);
                acceleration = acceleration.min(idm_acceleration(vehicle, target_front.as_ref(), &road.network));
            }
            decision.action = Action {
                steering,
                acceleration: acceleration.clamp(-ACC_MAX, ACC_MAX),
            };
        }
    }
    decision
}

/// Move the lane target onto the next road once the current one ends.
fn follow_road(vehicle: &Vehicle, network: &RoadNetwork) -> LaneIndex {
    match network.get_lane(&vehicle.target_lane_index) {
        Ok(lane) if lane.after_end(vehicle.position) => {
            network.next_lane(&vehicle.target_lane_index, vehicle.position)
        }
        _ => vehicle.target_lane_index.clone(),
    }
}

/// Steering angle that tracks the centre line of `target`.
fn steering_control(vehicle: &Vehicle, network: &RoadNetwork, target: &LaneIndex) -> f64 {
    let Ok(lane) = network.get_lane(target) else {
        return 0.0;
    };
    let (longitudinal, lateral) = lane.local_coordinates(vehicle.position);
    let future_heading = lane.heading_at(longitudinal + vehicle.speed * TAU_PURSUIT);

    let lateral_speed_command = -KP_LATERAL * lateral;
    let heading_command = (lateral_speed_command / not_zero(vehicle.speed)).clamp(-1.0, 1.0).asin();
    let heading_ref = future_heading + heading_command.clamp(-FRAC_PI_4, FRAC_PI_4);

    let heading_rate_command = KP_HEADING * wrap_to_pi(heading_ref - vehicle.heading);
    let slip_angle = (VEHICLE_LENGTH / 2.0 / not_zero(vehicle.speed) * heading_rate_command)
        .clamp(-1.0, 1.0)
        .asin();
    (2.0 * slip_angle.tan()).atan().clamp(-MAX_STEERING_ANGLE, MAX_STEERING_ANGLE)
}

/// IDM acceleration of `ego` behind an optional `front` neighbour.
pub fn idm_acceleration(ego: &Vehicle, front: Option<&Neighbour>, network: &RoadNetwork) -> f64 {
    let free_road = 1.0 - (ego.speed.max(0.0) / not_zero(ego.target_speed)).powf(DELTA);
    let mut acceleration = COMFORT_ACC_MAX * free_road;
    if let Some(front) = front {
        let gap = ego.lane_distance_to(front.position, network);
        acceleration -= COMFORT_ACC_MAX * (desired_gap(ego, front) / not_zero(gap)).powi(2);
    }
    acceleration
}

fn desired_gap(ego: &Vehicle, front: &Neighbour) -> f64 {
    let ab = -COMFORT_ACC_MAX * COMFORT_ACC_MIN;
    let dv = (ego.velocity() - front.velocity).dot(ego.direction());
    DISTANCE_WANTED + ego.speed * TIME_WANTED + ego.speed * dv / (2.0 * ab.sqrt())
}

fn change_lane_policy(road: &Road, id: VehicleId, state: &IdmState, decision: &mut Decision) {
    let vehicle = &road.vehicles[id.0];

    // A lane change is in progress: abort it if someone else is merging into the same gap.
    if vehicle.lane_index != decision.target_lane_index {
        let same_road = vehicle.lane_index.from == decision.target_lane_index.from
            && vehicle.lane_index.to == decision.target_lane_index.to;
        if same_road {
            for (other_id, other) in road.vehicles.iter().enumerate() {
                if other_id == id.0
                    || other.lane_index == decision.target_lane_index
                    || !other.is_controlled()
                    || other.target_lane_index != decision.target_lane_index
                {
                    continue;
                }
                let d = vehicle.lane_distance_to(other.position, &road.network);
                let d_star = desired_gap(vehicle, &Neighbour::of(other, Some(VehicleId(other_id))));
                if 0.0 < d && d < d_star {
                    decision.target_lane_index = vehicle.lane_index.clone();
                    break;
                }
            }
        }
        return;
    }

    if state.timer <= LANE_CHANGE_DELAY {
        return;
    }
    decision.reset_timer = true;

    for candidate in road.network.side_lanes(&vehicle.lane_index) {
        let Ok(lane) = road.network.get_lane(&candidate) else {
            continue;
        };
        if lane.is_forbidden() || !lane.is_reachable_from(vehicle.position) || vehicle.speed.abs() < 1.0 {
            continue;
        }
        if mobil(road, id, &candidate) {
            decision.target_lane_index = candidate;
        }
    }
}

/// MOBIL: change lane when the acceleration gain outweighs the braking imposed on others.
fn mobil(road: &Road, id: VehicleId, candidate: &LaneIndex) -> bool {
    let vehicle = &road.vehicles[id.0];
    let me = Neighbour::of(vehicle, Some(id));
    let accel_of = |follower: Option<&Neighbour>, front: Option<&Neighbour>| -> f64 {
        follower
            .and_then(|n| n.id)
            .map_or(0.0, |fid| idm_acceleration(&road.vehicles[fid.0], front, &road.network))
    };

    let (new_preceding, new_following) = road.neighbour_vehicles(id, candidate);
    let new_following_a = accel_of(new_following.as_ref(), new_preceding.as_ref());
    let new_following_pred_a = accel_of(new_following.as_ref(), Some(&me));
    if new_following_pred_a < -LANE_CHANGE_MAX_BRAKING_IMPOSED {
        return false;
    }

    let (old_preceding, old_following) = road.neighbour_vehicles(id, &vehicle.lane_index);
    let self_pred_a = idm_acceleration(vehicle, new_preceding.as_ref(), &road.network);
    let self_a = idm_acceleration(vehicle, old_preceding.as_ref(), &road.network);
    let old_following_a = accel_of(old_following.as_ref(), Some(&me));
    let old_following_pred_a = accel_of(old_following.as_ref(), old_preceding.as_ref());

    let jerk = self_pred_a - self_a
        + POLITENESS * (new_following_pred_a - new_following_a + old_following_pred_a - old_following_a);
    jerk >= LANE_CHANGE_MIN_ACC_GAIN
}
