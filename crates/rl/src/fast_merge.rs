//! # Fast Merge
//!
//! The merge task with configurable traffic speeds. Every initial speed is
//! read from [`FastMergeConfig`] and scaled by a global `speed_multiplier`,
//! and the three through-lane vehicles draw their speed from a range instead
//! of using fixed values.
//!
//! The variant is available by id once [`register_fast_merge_env`] has run:
//!
//! ```rust,ignore
//! rl::fast_merge::register_fast_merge_env()?;
//! let mut env = rl::registry::make(rl::fast_merge::FAST_MERGE_ID)?;
//! let obs = env.reset(Some(0))?;
//! ```

use highway::{controlled_vehicle, HighwayError, LaneIndex, Road, VehicleId, VehicleType};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{positive, ConfigError, MergeConfig, SpeedRange};
use crate::env::Env;
use crate::merge::{MergeEnv, Scenario};
use crate::registry::{self, EnvSpec, RegistryError};

pub const FAST_MERGE_ID: &str = "fast-merge-v0";
pub const FAST_MERGE_MAX_STEPS: u64 = 100;
pub const FAST_MERGE_ENTRY_POINT: &str = "rl::fast_merge::FastMergeEnv";

/// Base longitudinal offsets of the through-lane vehicles, paired with the
/// speeds the stock task gives them. The speeds are not used here; every
/// vehicle draws from `other_vehicles_speed_range`.
const OTHER_VEHICLES: [(f64, f64); 3] = [(90.0, 29.0), (70.0, 31.0), (5.0, 31.5)];
/// Half-width of the uniform jitter added to each base offset.
const POSITION_JITTER: f64 = 5.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FastMergeConfig {
    #[serde(flatten)]
    pub merge: MergeConfig,
    pub ego_speed: f64,
    pub other_vehicles_speed_range: SpeedRange,
    pub merging_vehicle_speed: f64,
    pub merging_vehicle_target_speed: f64,
    /// Scales every initial and target speed above.
    pub speed_multiplier: f64,
}

impl Default for FastMergeConfig {
    fn default() -> Self {
        Self {
            merge: MergeConfig {
                reward_speed_range: SpeedRange::new(20.0, 30.0),
                ..MergeConfig::default()
            },
            ego_speed: 30.0,
            other_vehicles_speed_range: SpeedRange::new(29.0, 32.0),
            merging_vehicle_speed: 20.0,
            merging_vehicle_target_speed: 30.0,
            speed_multiplier: 1.0,
        }
    }
}

impl FastMergeConfig {
    /// # Errors
    ///
    /// Rejects the invalid base options, an inverted or non-positive speed
    /// range, and non-positive speeds or multiplier.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.merge.validate()?;
        self.other_vehicles_speed_range.validate("other_vehicles_speed_range")?;
        positive("other_vehicles_speed_range", self.other_vehicles_speed_range.min)?;
        positive("ego_speed", self.ego_speed)?;
        positive("merging_vehicle_speed", self.merging_vehicle_speed)?;
        positive("merging_vehicle_target_speed", self.merging_vehicle_target_speed)?;
        positive("speed_multiplier", self.speed_multiplier)
    }
}

/// Uniform draw from `range`; consumes one sample even when the range is a
/// single point.
fn uniform(rng: &mut ChaCha8Rng, range: SpeedRange) -> f64 {
    range.min + rng.gen::<f64>() * (range.max - range.min)
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FastMerge;

impl Scenario for FastMerge {
    type Config = FastMergeConfig;

    fn merge_config(config: &FastMergeConfig) -> &MergeConfig {
        &config.merge
    }

    fn validate(config: &FastMergeConfig) -> Result<(), ConfigError> {
        config.validate()
    }

    fn make_vehicles(config: &FastMergeConfig, road: &mut Road, rng: &mut ChaCha8Rng) -> Result<VehicleId, HighwayError> {
        let multiplier = config.speed_multiplier;

        let ego_lane = LaneIndex::new("a", "b", 1);
        let position = road.network.get_lane(&ego_lane)?.position(30.0, 0.0);
        let ego_vehicle = controlled_vehicle(
            &road.network,
            &ego_lane,
            position,
            config.ego_speed * multiplier,
            config.merge.action.target_speeds.clone(),
        )?;
        let ego = road.push(ego_vehicle);

        let other_type: VehicleType = config.merge.other_vehicles_type.parse()?;
        for (longitudinal, _) in OTHER_VEHICLES {
            let lane_index = LaneIndex::new("a", "b", rng.gen_range(0..2));
            let offset = longitudinal + rng.gen_range(-POSITION_JITTER..POSITION_JITTER);
            let speed = uniform(rng, config.other_vehicles_speed_range) * multiplier;
            let position = road.network.get_lane(&lane_index)?.position(offset, 0.0);
            let vehicle = other_type.spawn(&road.network, &lane_index, position, speed)?;
            debug!(lane = %lane_index, offset, speed, "placed through-lane vehicle");
            road.push(vehicle);
        }

        let ramp = LaneIndex::new("j", "k", 0);
        let position = road.network.get_lane(&ramp)?.position(110.0, 0.0);
        let mut merging = other_type.spawn(&road.network, &ramp, position, config.merging_vehicle_speed * multiplier)?;
        merging.target_speed = config.merging_vehicle_target_speed * multiplier;
        road.push(merging);

        debug!(multiplier, ego_speed = config.ego_speed * multiplier, "fast merge populated");
        Ok(ego)
    }
}

pub type FastMergeEnv = MergeEnv<FastMerge>;

fn make_fast_merge() -> Box<dyn Env> {
    Box::new(FastMergeEnv::new())
}

/// Register [`FastMergeEnv`] as [`FAST_MERGE_ID`] with a limit of
/// [`FAST_MERGE_MAX_STEPS`] steps. Repeated calls are no-ops.
///
/// # Errors
///
/// Propagates every registry error other than a duplicate id.
pub fn register_fast_merge_env() -> Result<(), RegistryError> {
    let spec = EnvSpec::new(FAST_MERGE_ID, FAST_MERGE_ENTRY_POINT, FAST_MERGE_MAX_STEPS, make_fast_merge);
    match registry::register(spec) {
        Err(RegistryError::AlreadyRegistered(id)) => {
            warn!(%id, "environment already registered, keeping the existing entry");
            Ok(())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn degenerate_range_is_constant() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..10 {
            assert_eq!(uniform(&mut rng, SpeedRange::new(10.0, 10.0)), 10.0);
        }
    }

    #[test]
    fn draws_stay_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..100 {
            let speed = uniform(&mut rng, SpeedRange::new(29.0, 32.0));
            assert!((29.0..32.0).contains(&speed));
        }
    }

    #[test]
    fn defaults_keep_base_rewards() {
        let config = FastMergeConfig::default();
        assert_eq!(config.merge.reward_speed_range, SpeedRange::new(20.0, 30.0));
        assert_eq!(config.merge.collision_reward, MergeConfig::default().collision_reward);
    }
}
