//! # Environment Configuration
//!
//! Structured configuration for the merge environments. Every struct
//! deserializes with serde and fills absent keys from its [`Default`], so a
//! JSON file only needs to name the options it changes.

use std::fs;
use std::path::Path;

use highway::VehicleType;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("`{key}` must be an ordered [min, max] pair, got [{min}, {max}]")]
    InvertedRange { key: &'static str, min: f64, max: f64 },
    #[error("`{key}` must be positive and finite, got {value}")]
    NotPositive { key: &'static str, value: f64 },
    #[error("`{key}` must not be empty")]
    Empty { key: &'static str },
    #[error("`other_vehicles_type` names no known vehicle type: `{0}`")]
    UnknownVehicleType(String),
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// An ordered `[min, max]` interval, written as a two-element array.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct SpeedRange {
    pub min: f64,
    pub max: f64,
}

impl SpeedRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn as_array(self) -> [f64; 2] {
        [self.min, self.max]
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::InvertedRange`] when `min > max` or either bound is not finite.
    pub fn validate(self, key: &'static str) -> Result<(), ConfigError> {
        if self.min.is_finite() && self.max.is_finite() && self.min <= self.max {
            Ok(())
        } else {
            Err(ConfigError::InvertedRange { key, min: self.min, max: self.max })
        }
    }
}

impl From<[f64; 2]> for SpeedRange {
    fn from([min, max]: [f64; 2]) -> Self {
        Self { min, max }
    }
}

impl From<SpeedRange> for [f64; 2] {
    fn from(range: SpeedRange) -> Self {
        range.as_array()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservationConfig {
    /// Rows in the kinematics observation, ego row included.
    pub vehicles_count: usize,
    /// Scale features into `[-1, 1]`.
    pub normalize: bool,
}

impl Default for ObservationConfig {
    fn default() -> Self {
        Self { vehicles_count: 5, normalize: true }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionConfig {
    /// Speed ladder walked by the `Faster` and `Slower` meta-actions.
    pub target_speeds: Vec<f64>,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self { target_speeds: highway::behavior::DEFAULT_TARGET_SPEEDS.to_vec() }
    }
}

/// Defaults of the highway merge task.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub observation: ObservationConfig,
    pub action: ActionConfig,
    /// Simulation frames per second.
    pub simulation_frequency: u32,
    /// Agent decisions per second.
    pub policy_frequency: u32,
    /// Type path of the non-ego vehicles, see [`VehicleType`].
    pub other_vehicles_type: String,
    pub collision_reward: f64,
    pub right_lane_reward: f64,
    pub high_speed_reward: f64,
    /// Ego speeds mapped onto a `[0, 1]` high-speed reward.
    pub reward_speed_range: SpeedRange,
    pub merging_speed_reward: f64,
    pub lane_change_reward: f64,
    pub normalize_reward: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            observation: ObservationConfig::default(),
            action: ActionConfig::default(),
            simulation_frequency: 15,
            policy_frequency: 1,
            other_vehicles_type: VehicleType::IDM_PATH.to_owned(),
            collision_reward: -1.0,
            right_lane_reward: 0.1,
            high_speed_reward: 0.2,
            reward_speed_range: SpeedRange::new(20.0, 30.0),
            merging_speed_reward: -0.5,
            lane_change_reward: -0.05,
            normalize_reward: true,
        }
    }
}

impl MergeConfig {
    /// # Errors
    ///
    /// Rejects inverted ranges, zero frequencies, an empty speed ladder,
    /// fewer than one observed vehicle and an unknown vehicle type path.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.other_vehicles_type.parse::<VehicleType>().is_err() {
            return Err(ConfigError::UnknownVehicleType(self.other_vehicles_type.clone()));
        }
        self.reward_speed_range.validate("reward_speed_range")?;
        positive("simulation_frequency", f64::from(self.simulation_frequency))?;
        positive("policy_frequency", f64::from(self.policy_frequency))?;
        if self.action.target_speeds.is_empty() {
            return Err(ConfigError::Empty { key: "action.target_speeds" });
        }
        if self.observation.vehicles_count == 0 {
            return Err(ConfigError::Empty { key: "observation.vehicles_count" });
        }
        Ok(())
    }

    /// Simulation frames run per agent decision.
    pub fn frames_per_step(&self) -> u32 {
        (self.simulation_frequency / self.policy_frequency.max(1)).max(1)
    }
}

/// # Errors
///
/// Returns [`ConfigError::NotPositive`] unless `value` is finite and `> 0`.
pub fn positive(key: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { key, value })
    }
}

/// Read a JSON configuration file; absent keys keep their defaults.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] or [`ConfigError::Parse`].
pub fn load_config<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
