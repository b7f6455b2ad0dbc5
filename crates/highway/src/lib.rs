#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]
//! # Highway Traffic Simulation
//!
//! A small kinematic traffic simulator for reinforcement-learning environments.
//!
//! This crate provides the road and vehicle layer that the environments in the
//! `rl` crate are built on. It does not know anything about rewards or
//! episodes; it only knows how lanes are laid out, how vehicles move along
//! them and how they react to each other.
//!
//! ## Key Components
//!
//! -   **Lanes:** [`Lane`] describes a single lane geometry, either straight
//!     or sinusoidal. Lanes map between world coordinates and lane-local
//!     `(longitudinal, lateral)` coordinates.
//! -   **Network:** [`RoadNetwork`] is a directed graph of roads between named
//!     nodes, each road holding one or more lanes addressed by a [`LaneIndex`].
//! -   **Vehicles:** [`Vehicle`] carries the kinematic state of a car and a
//!     [`Behavior`] deciding its low-level action every frame.
//! -   **Road:** [`Road`] owns the network and the ordered vehicle collection
//!     and steps everything forward in time.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use highway::{Behavior, Lane, LaneIndex, Road, RoadNetwork, Vec2, Vehicle};
//!
//! let mut network = RoadNetwork::new();
//! network.add_lane("a", "b", Lane::straight(Vec2::ZERO, Vec2::new(200.0, 0.0)));
//! let mut road = Road::new(network);
//!
//! let car = Vehicle::on_lane(&road.network, &LaneIndex::new("a", "b", 0), 10.0, 25.0, Behavior::Passive)?;
//! road.push(car);
//! road.act();
//! road.step(1.0 / 15.0);
//! ```

pub mod behavior;
pub mod error;
pub mod lane;
pub mod math;
pub mod network;
pub mod road;
pub mod vehicle;

pub use behavior::{Behavior, IdmState, MetaAction, MetaController};
pub use error::HighwayError;
pub use lane::{Lane, LineType, DEFAULT_LANE_WIDTH};
pub use math::Vec2;
pub use network::{LaneIndex, RoadNetwork};
pub use road::{Neighbour, Obstacle, Road, VehicleId};
pub use vehicle::{controlled_vehicle, Action, Vehicle, VehicleType, MAX_SPEED, VEHICLE_LENGTH, VEHICLE_WIDTH};
