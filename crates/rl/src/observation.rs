//! Kinematics observation: one row `[presence, x, y, vx, vy]` per vehicle.
//!
//! The ego vehicle comes first in absolute coordinates, followed by the
//! closest other vehicles relative to it. Missing rows are zero-filled.

use highway::math::lmap;
use highway::{Road, VehicleId, DEFAULT_LANE_WIDTH, MAX_SPEED};

use crate::config::ObservationConfig;

pub const FEATURES: usize = 5;

/// Other vehicles further away than this are not observed.
const PERCEPTION_DISTANCE: f64 = 5.0 * MAX_SPEED;

/// Observation length for a configuration.
pub fn obs_size(config: &ObservationConfig) -> usize {
    config.vehicles_count * FEATURES
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn observe(road: &Road, ego: VehicleId, config: &ObservationConfig) -> Vec<f32> {
    let mut obs = vec![0.0_f32; obs_size(config)];
    let Ok(ego_vehicle) = road.get(ego) else {
        return obs;
    };

    let lane = &ego_vehicle.lane_index;
    let lanes = road.network.lane_count(&lane.from, &lane.to) as f64;
    let x_range = [-PERCEPTION_DISTANCE, PERCEPTION_DISTANCE];
    let y_range = [-DEFAULT_LANE_WIDTH * lanes.max(1.0), DEFAULT_LANE_WIDTH * lanes.max(1.0)];
    let v_range = [-2.0 * MAX_SPEED, 2.0 * MAX_SPEED];
    let scale = |value: f64, range: [f64; 2]| -> f32 {
        if config.normalize {
            lmap(value, range, [-1.0, 1.0]).clamp(-1.0, 1.0) as f32
        } else {
            value as f32
        }
    };

    let others = road.close_vehicles_to(ego, PERCEPTION_DISTANCE, config.vehicles_count.saturating_sub(1));
    let rows = std::iter::once(ego_vehicle.features(None))
        .chain(others.into_iter().filter_map(|id| road.get(id).ok().map(|v| v.features(Some(ego_vehicle)))));

    for (row, [x, y, vx, vy]) in obs.chunks_exact_mut(FEATURES).zip(rows) {
        row[0] = 1.0;
        row[1] = scale(x, x_range);
        row[2] = scale(y, y_range);
        row[3] = scale(vx, v_range);
        row[4] = scale(vy, v_range);
    }
    obs
}
