//! # Highway Merge Environment
//!
//! The ego vehicle drives on a two-lane highway that is joined by an
//! on-ramp. The agent is rewarded for driving fast on the right lane while
//! letting the merging traffic in without collisions.
//!
//! [`MergeEnv`] owns the road, the seeded generator and the episode
//! bookkeeping. Which vehicles are placed on the road at reset is decided by
//! a [`Scenario`], so variants of the task only supply their own
//! configuration and population routine.

use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;

use highway::math::{lmap, not_zero};
use highway::{
    controlled_vehicle, HighwayError, Lane, LaneIndex, LineType, MetaAction, Obstacle, Road, RoadNetwork,
    Vec2, VehicleId, VehicleType, DEFAULT_LANE_WIDTH,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace};

use crate::config::{ConfigError, MergeConfig};
use crate::env::{Env, RewardComponents, Step, StepInfo};
use crate::error::EnvError;
use crate::observation;

/// Lengths of the four consecutive main-road sections.
const ENDS: [f64; 4] = [150.0, 80.0, 80.0, 150.0];
/// Lateral swing of the on-ramp when it joins the highway.
const MERGE_AMPLITUDE: f64 = 3.25;
/// The episode ends once the ego vehicle passes this abscissa.
const FINISH_X: f64 = 370.0;

/// A population routine for the merge road, with its own configuration.
pub trait Scenario {
    type Config: Clone + fmt::Debug + Default + Serialize + DeserializeOwned;

    /// The merge task options inside the scenario's configuration.
    fn merge_config(config: &Self::Config) -> &MergeConfig;

    /// # Errors
    ///
    /// Returns the first invalid option.
    fn validate(config: &Self::Config) -> Result<(), ConfigError> {
        Self::merge_config(config).validate()
    }

    /// Place the vehicles of a new episode on `road` and return the ego vehicle.
    ///
    /// # Errors
    ///
    /// Propagates unknown lanes and unresolvable vehicle types.
    fn make_vehicles(config: &Self::Config, road: &mut Road, rng: &mut ChaCha8Rng) -> Result<VehicleId, HighwayError>;
}

pub struct MergeEnv<S: Scenario> {
    config: S::Config,
    /// Configuration injected since the last reset.
    pending: Option<S::Config>,
    road: Option<Road>,
    vehicle: Option<VehicleId>,
    rng: ChaCha8Rng,
    steps: u64,
}

impl<S: Scenario> MergeEnv<S> {
    /// Environment with the scenario defaults and an entropy-seeded generator.
    pub fn new() -> Self {
        Self {
            config: Self::default_config(),
            pending: None,
            road: None,
            vehicle: None,
            rng: ChaCha8Rng::from_entropy(),
            steps: 0,
        }
    }

    /// # Errors
    ///
    /// Returns the validation error of `config`.
    pub fn with_config(config: S::Config) -> Result<Self, ConfigError> {
        S::validate(&config)?;
        Ok(Self { config, ..Self::new() })
    }

    /// A fresh copy of the scenario defaults.
    pub fn default_config() -> S::Config {
        S::Config::default()
    }

    /// Replace the configuration from the next reset on.
    ///
    /// # Errors
    ///
    /// Returns the validation error of `config`; the current configuration is kept.
    pub fn configure(&mut self, config: S::Config) -> Result<(), ConfigError> {
        S::validate(&config)?;
        self.pending = Some(config);
        Ok(())
    }

    /// The configuration the next reset uses.
    pub fn config(&self) -> &S::Config {
        self.pending.as_ref().unwrap_or(&self.config)
    }

    pub fn road(&self) -> Option<&Road> {
        self.road.as_ref()
    }

    /// The controlled vehicle of the current episode.
    pub fn vehicle(&self) -> Option<VehicleId> {
        self.vehicle
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    fn merge(&self) -> &MergeConfig {
        S::merge_config(&self.config)
    }

    fn observe(&self) -> Vec<f32> {
        match (&self.road, self.vehicle) {
            (Some(road), Some(ego)) => observation::observe(road, ego, &self.merge().observation),
            _ => vec![0.0; self.obs_size()],
        }
    }

    fn rewards(&self, road: &Road, ego: VehicleId, action: MetaAction) -> Result<RewardComponents, HighwayError> {
        let cfg = self.merge();
        let vehicle = road.get(ego)?;
        let range = cfg.reward_speed_range;
        let high_speed = if range.max > range.min {
            lmap(vehicle.speed, range.as_array(), [0.0, 1.0]).clamp(0.0, 1.0)
        } else if vehicle.speed >= range.max {
            1.0
        } else {
            0.0
        };
        let ramp_end = LaneIndex::new("b", "c", 2);
        let merging_speed = road
            .vehicles
            .iter()
            .filter(|v| v.lane_index == ramp_end && v.is_controlled())
            .map(|v| (v.target_speed - v.speed) / not_zero(v.target_speed))
            .sum();
        #[allow(clippy::cast_precision_loss)]
        let right_lane = vehicle.lane_index.id as f64;
        Ok(RewardComponents {
            collision: if vehicle.crashed { 1.0 } else { 0.0 },
            right_lane,
            high_speed,
            lane_change: if action.is_lane_change() { 1.0 } else { 0.0 },
            merging_speed,
        })
    }

    fn reward(&self, components: &RewardComponents) -> f64 {
        let cfg = self.merge();
        let reward = cfg.collision_reward * components.collision
            + cfg.right_lane_reward * components.right_lane
            + cfg.high_speed_reward * components.high_speed
            + cfg.lane_change_reward * components.lane_change
            + cfg.merging_speed_reward * components.merging_speed;
        if cfg.normalize_reward {
            lmap(
                reward,
                [
                    cfg.collision_reward + cfg.merging_speed_reward,
                    cfg.high_speed_reward + cfg.right_lane_reward,
                ],
                [0.0, 1.0],
            )
        } else {
            reward
        }
    }
}

impl<S: Scenario> Default for MergeEnv<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Scenario> Env for MergeEnv<S> {
    fn reset(&mut self, seed: Option<u64>) -> Result<Vec<f32>, EnvError> {
        if let Some(seed) = seed {
            self.rng = ChaCha8Rng::seed_from_u64(seed);
        }
        if let Some(config) = self.pending.take() {
            self.config = config;
        }
        let mut road = merge_road();
        let ego = S::make_vehicles(&self.config, &mut road, &mut self.rng)?;
        debug!(?seed, vehicles = road.len(), "merge episode reset");
        self.road = Some(road);
        self.vehicle = Some(ego);
        self.steps = 0;
        Ok(self.observe())
    }

    fn step(&mut self, action: usize) -> Result<Step, EnvError> {
        let meta = MetaAction::from_index(action).ok_or(EnvError::InvalidAction {
            action,
            size: MetaAction::ALL.len(),
        })?;
        let frames = self.merge().frames_per_step();
        let dt = 1.0 / f64::from(self.merge().simulation_frequency);
        let (Some(road), Some(ego)) = (self.road.as_mut(), self.vehicle) else {
            return Err(EnvError::NotReset);
        };

        road.apply_meta_action(ego, meta)?;
        for frame in 0..frames {
            road.act();
            road.step(dt);
            trace!(frame, "merge frame simulated");
        }
        self.steps += 1;

        let road = self.road.as_ref().ok_or(EnvError::NotReset)?;
        let components = self.rewards(road, ego, meta)?;
        let vehicle = road.get(ego)?;
        let terminated = vehicle.crashed || vehicle.position.x > FINISH_X;
        let info = StepInfo {
            speed: vehicle.speed,
            crashed: vehicle.crashed,
            action,
            rewards: components,
        };
        #[allow(clippy::cast_possible_truncation)]
        let reward = self.reward(&components) as f32;
        Ok(Step {
            obs: self.observe(),
            reward,
            terminated,
            truncated: false,
            info,
        })
    }

    fn obs_size(&self) -> usize {
        observation::obs_size(&self.merge().observation)
    }

    fn action_size(&self) -> usize {
        MetaAction::ALL.len()
    }
}

/// The merge road: a two-lane highway `a -> b -> c -> d` joined by the
/// on-ramp `j -> k -> b`, which continues as lane 2 of `b -> c` up to a barrier.
pub fn merge_road() -> Road {
    use LineType::{Continuous, None as NoLine, Striped};

    let mut net = RoadNetwork::new();
    let x = [ENDS[0] + ENDS[1], ENDS[0] + ENDS[1] + ENDS[2], ENDS[0] + ENDS[1] + ENDS[2] + ENDS[3]];
    // (lateral offset, outer line types, line types beside the ramp) per main lane.
    let main_lanes = [
        (0.0, [Continuous, Striped], [Continuous, Striped]),
        (DEFAULT_LANE_WIDTH, [NoLine, Continuous], [NoLine, Striped]),
    ];
    for (y, outer, beside_ramp) in main_lanes {
        net.add_lane("a", "b", Lane::straight(Vec2::new(0.0, y), Vec2::new(x[0], y)).with_line_types(outer));
        net.add_lane("b", "c", Lane::straight(Vec2::new(x[0], y), Vec2::new(x[1], y)).with_line_types(beside_ramp));
        net.add_lane("c", "d", Lane::straight(Vec2::new(x[1], y), Vec2::new(x[2], y)).with_line_types(outer));
    }

    let ramp_y = 6.5 + 2.0 * DEFAULT_LANE_WIDTH;
    let ljk = Lane::straight(Vec2::new(0.0, ramp_y), Vec2::new(ENDS[0], ramp_y))
        .with_line_types([Continuous, Continuous])
        .forbidden(true);
    let lkb = Lane::sine(
        ljk.position(ENDS[0], -MERGE_AMPLITUDE),
        ljk.position(ENDS[0] + ENDS[1], -MERGE_AMPLITUDE),
        MERGE_AMPLITUDE,
        2.0 * PI / (2.0 * ENDS[1]),
        FRAC_PI_2,
    )
    .with_line_types([Continuous, Continuous])
    .forbidden(true);
    let junction = lkb.position(ENDS[1], 0.0);
    let lbc = Lane::straight(junction, junction + Vec2::new(ENDS[2], 0.0))
        .with_line_types([NoLine, Continuous])
        .forbidden(true);
    let barrier = lbc.position(ENDS[2], 0.0);

    net.add_lane("j", "k", ljk);
    net.add_lane("k", "b", lkb);
    net.add_lane("b", "c", lbc);

    let mut road = Road::new(net);
    road.obstacles.push(Obstacle::new(barrier, 0.0));
    road
}

/// The unmodified merge task: fixed initial speeds.
#[derive(Clone, Copy, Debug, Default)]
pub struct StockMerge;

impl Scenario for StockMerge {
    type Config = MergeConfig;

    fn merge_config(config: &MergeConfig) -> &MergeConfig {
        config
    }

    fn make_vehicles(config: &MergeConfig, road: &mut Road, rng: &mut ChaCha8Rng) -> Result<VehicleId, HighwayError> {
        let ego_lane = LaneIndex::new("a", "b", 1);
        let position = road.network.get_lane(&ego_lane)?.position(30.0, 0.0);
        let ego_vehicle = controlled_vehicle(&road.network, &ego_lane, position, 30.0, config.action.target_speeds.clone())?;
        let ego = road.push(ego_vehicle);

        let other_type: VehicleType = config.other_vehicles_type.parse()?;
        for (longitudinal, speed) in [(90.0, 29.0), (70.0, 31.0), (5.0, 31.5)] {
            let lane_index = LaneIndex::new("a", "b", rng.gen_range(0..2));
            let position = road
                .network
                .get_lane(&lane_index)?
                .position(longitudinal + rng.gen_range(-5.0..5.0), 0.0);
            let vehicle = other_type.spawn(&road.network, &lane_index, position, speed)?;
            road.push(vehicle);
        }

        let ramp = LaneIndex::new("j", "k", 0);
        let position = road.network.get_lane(&ramp)?.position(110.0, 0.0);
        let mut merging = other_type.spawn(&road.network, &ramp, position, 20.0)?;
        merging.target_speed = 30.0;
        road.push(merging);
        Ok(ego)
    }
}

pub type StockMergeEnv = MergeEnv<StockMerge>;
