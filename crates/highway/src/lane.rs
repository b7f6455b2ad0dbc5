//! # Lane Geometry
//!
//! This module describes the geometry of a single lane. A lane maps between
//! world coordinates and lane-local `(longitudinal, lateral)` coordinates,
//! where the longitudinal axis follows the lane centre line and the lateral
//! axis points to the right of the direction of travel.

use serde::{Deserialize, Serialize};

use crate::math::Vec2;
use crate::vehicle::VEHICLE_LENGTH;

pub const DEFAULT_LANE_WIDTH: f64 = 4.0;

/// Marking painted on one side of a lane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineType {
    None,
    Striped,
    Continuous,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Lane {
    Straight {
        start: Vec2,
        end: Vec2,
        width: f64,
        line_types: [LineType; 2],
        /// Vehicles may drive on a forbidden lane but never change into it.
        forbidden: bool,
    },
    /// A straight lane whose centre line is offset laterally by a sinusoid.
    Sine {
        straight: Box<Lane>,
        amplitude: f64,
        pulsation: f64,
        phase: f64,
    },
}

impl Lane {
    /// Straight lane with default width and striped markings.
    pub fn straight(start: Vec2, end: Vec2) -> Self {
        Lane::Straight {
            start,
            end,
            width: DEFAULT_LANE_WIDTH,
            line_types: [LineType::Striped, LineType::Striped],
            forbidden: false,
        }
    }

    #[must_use]
    pub fn with_line_types(mut self, types: [LineType; 2]) -> Self {
        if let Lane::Straight { line_types, .. } = self.base_mut() {
            *line_types = types;
        }
        self
    }

    #[must_use]
    pub fn forbidden(mut self, value: bool) -> Self {
        if let Lane::Straight { forbidden, .. } = self.base_mut() {
            *forbidden = value;
        }
        self
    }

    pub fn sine(start: Vec2, end: Vec2, amplitude: f64, pulsation: f64, phase: f64) -> Self {
        Lane::Sine {
            straight: Box::new(Lane::straight(start, end)),
            amplitude,
            pulsation,
            phase,
        }
    }

    /// World position of the lane-local point `(longitudinal, lateral)`.
    pub fn position(&self, longitudinal: f64, lateral: f64) -> Vec2 {
        match self {
            Lane::Straight { start, .. } => {
                let direction = self.direction();
                *start + direction * longitudinal + direction.perp() * lateral
            }
            Lane::Sine { straight, amplitude, pulsation, phase } => straight.position(
                longitudinal,
                lateral + amplitude * (pulsation * longitudinal + phase).sin(),
            ),
        }
    }

    pub fn heading_at(&self, longitudinal: f64) -> f64 {
        match self {
            Lane::Straight { .. } => {
                let d = self.direction();
                d.y.atan2(d.x)
            }
            Lane::Sine { straight, amplitude, pulsation, phase } => {
                straight.heading_at(longitudinal)
                    + (amplitude * pulsation * (pulsation * longitudinal + phase).cos()).atan()
            }
        }
    }

    pub fn width_at(&self, _longitudinal: f64) -> f64 {
        match self {
            Lane::Straight { width, .. } => *width,
            Lane::Sine { straight, .. } => straight.width_at(0.0),
        }
    }

    /// Lane-local coordinates of a world position.
    pub fn local_coordinates(&self, position: Vec2) -> (f64, f64) {
        match self {
            Lane::Straight { start, .. } => {
                let delta = position - *start;
                let direction = self.direction();
                (delta.dot(direction), delta.dot(direction.perp()))
            }
            Lane::Sine { straight, amplitude, pulsation, phase } => {
                let (longitudinal, lateral) = straight.local_coordinates(position);
                (
                    longitudinal,
                    lateral - amplitude * (pulsation * longitudinal + phase).sin(),
                )
            }
        }
    }

    pub fn length(&self) -> f64 {
        match self {
            Lane::Straight { start, end, .. } => start.distance(*end),
            Lane::Sine { straight, .. } => straight.length(),
        }
    }

    pub fn is_forbidden(&self) -> bool {
        match self {
            Lane::Straight { forbidden, .. } => *forbidden,
            Lane::Sine { straight, .. } => straight.is_forbidden(),
        }
    }

    pub fn line_types(&self) -> [LineType; 2] {
        match self {
            Lane::Straight { line_types, .. } => *line_types,
            Lane::Sine { straight, .. } => straight.line_types(),
        }
    }

    /// Whether `position` lies on the lane, with an extra lateral `margin`.
    pub fn on_lane(&self, position: Vec2, margin: f64) -> bool {
        let (longitudinal, lateral) = self.local_coordinates(position);
        lateral.abs() <= self.width_at(longitudinal) / 2.0 + margin
            && (-VEHICLE_LENGTH..self.length() + VEHICLE_LENGTH).contains(&longitudinal)
    }

    /// Whether a vehicle at `position` could steer onto this lane.
    pub fn is_reachable_from(&self, position: Vec2) -> bool {
        let (longitudinal, lateral) = self.local_coordinates(position);
        lateral.abs() <= 2.0 * self.width_at(longitudinal)
            && (0.0..self.length() + VEHICLE_LENGTH).contains(&longitudinal)
    }

    pub fn after_end(&self, position: Vec2) -> bool {
        let (longitudinal, _) = self.local_coordinates(position);
        longitudinal > self.length() - VEHICLE_LENGTH / 2.0
    }

    /// Distance from `position` to the lane surface, zero when on it.
    pub fn distance(&self, position: Vec2) -> f64 {
        let (longitudinal, lateral) = self.local_coordinates(position);
        lateral.abs() + (longitudinal - self.length()).max(0.0) + (-longitudinal).max(0.0)
    }

    /// Distance with a penalty on heading mismatch, used for lane assignment.
    pub fn distance_with_heading(&self, position: Vec2, heading: f64, heading_weight: f64) -> f64 {
        let (longitudinal, _) = self.local_coordinates(position);
        let angle = crate::math::wrap_to_pi(heading - self.heading_at(longitudinal)).abs();
        self.distance(position) + heading_weight * angle
    }

    /// The underlying straight lane.
    fn base_mut(&mut self) -> &mut Lane {
        match self {
            Lane::Sine { straight, .. } => straight.base_mut(),
            straight => straight,
        }
    }

    fn direction(&self) -> Vec2 {
        match self {
            Lane::Straight { start, end, .. } => (*end - *start).normalize_or_zero(),
            Lane::Sine { straight, .. } => straight.direction(),
        }
    }
}
