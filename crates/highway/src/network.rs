//! # Road Network
//!
//! Roads are directed edges between named nodes. Each road carries an ordered
//! list of parallel lanes, so a lane is addressed by the triple
//! `(from, to, id)` held in a [`LaneIndex`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::HighwayError;
use crate::lane::Lane;
use crate::math::Vec2;

/// Weight of the heading mismatch when assigning a vehicle to its closest lane.
const HEADING_WEIGHT: f64 = 1.0;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LaneIndex {
    pub from: String,
    pub to: String,
    pub id: usize,
}

impl LaneIndex {
    pub fn new(from: &str, to: &str, id: usize) -> Self {
        Self { from: from.to_owned(), to: to.to_owned(), id }
    }

    /// Same road, different lane.
    #[must_use]
    pub fn with_id(&self, id: usize) -> Self {
        Self { id, ..self.clone() }
    }
}

impl From<(&str, &str, usize)> for LaneIndex {
    fn from((from, to, id): (&str, &str, usize)) -> Self {
        Self::new(from, to, id)
    }
}

impl fmt::Display for LaneIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.from, self.to, self.id)
    }
}

#[derive(Clone, Debug, Default)]
pub struct RoadNetwork {
    graph: BTreeMap<String, BTreeMap<String, Vec<Lane>>>,
}

impl RoadNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a lane to the road `from -> to` and return its index.
    pub fn add_lane(&mut self, from: &str, to: &str, lane: Lane) -> LaneIndex {
        let lanes = self
            .graph
            .entry(from.to_owned())
            .or_default()
            .entry(to.to_owned())
            .or_default();
        lanes.push(lane);
        LaneIndex::new(from, to, lanes.len() - 1)
    }

    /// # Errors
    ///
    /// Returns [`HighwayError::UnknownLane`] if no road or lane matches `index`.
    pub fn get_lane(&self, index: &LaneIndex) -> Result<&Lane, HighwayError> {
        self.graph
            .get(&index.from)
            .and_then(|roads| roads.get(&index.to))
            .and_then(|lanes| lanes.get(index.id))
            .ok_or_else(|| HighwayError::UnknownLane(index.clone()))
    }

    pub fn lane_count(&self, from: &str, to: &str) -> usize {
        self.graph
            .get(from)
            .and_then(|roads| roads.get(to))
            .map_or(0, Vec::len)
    }

    pub fn lanes(&self) -> impl Iterator<Item = (LaneIndex, &Lane)> {
        self.graph.iter().flat_map(|(from, roads)| {
            roads.iter().flat_map(move |(to, lanes)| {
                lanes
                    .iter()
                    .enumerate()
                    .map(move |(id, lane)| (LaneIndex::new(from, to, id), lane))
            })
        })
    }

    /// Index of the lane closest to `position`, preferring lanes aligned with `heading`.
    pub fn closest_lane_index(&self, position: Vec2, heading: f64) -> Option<LaneIndex> {
        self.lanes()
            .map(|(index, lane)| (index, lane.distance_with_heading(position, heading, HEADING_WEIGHT)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    /// Lane to follow once a vehicle at `position` reaches the end of `current`.
    ///
    /// The first outgoing road of the destination node is taken. The lane id
    /// is kept when both roads carry the same number of lanes, otherwise the
    /// lane closest to `position` is chosen. Dead ends return `current`.
    pub fn next_lane(&self, current: &LaneIndex, position: Vec2) -> LaneIndex {
        let Some((next_to, next_lanes)) = self
            .graph
            .get(&current.to)
            .and_then(|roads| roads.iter().next())
        else {
            return current.clone();
        };

        let id = if self.lane_count(&current.from, &current.to) == next_lanes.len() {
            current.id
        } else {
            next_lanes
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| a.distance(position).total_cmp(&b.distance(position)))
                .map_or(0, |(id, _)| id)
        };
        LaneIndex::new(&current.to, next_to, id)
    }

    /// Lanes directly left and right of `index` on the same road.
    pub fn side_lanes(&self, index: &LaneIndex) -> Vec<LaneIndex> {
        let count = self.lane_count(&index.from, &index.to);
        let mut sides = Vec::with_capacity(2);
        if index.id > 0 {
            sides.push(index.with_id(index.id - 1));
        }
        if index.id + 1 < count {
            sides.push(index.with_id(index.id + 1));
        }
        sides
    }
}
