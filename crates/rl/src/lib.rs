#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::must_use_candidate, clippy::float_cmp)]
//! # Merge Environments
//!
//! Reinforcement-learning environments on top of the [`highway`] simulator.
//!
//! -   [`Env`] is the object-safe reset/step interface every environment implements.
//! -   [`MergeEnv`] runs the highway merge task; a [`merge::Scenario`] decides
//!     which vehicles populate the road at every reset.
//! -   [`FastMergeEnv`] is the variant with configurable traffic speeds.
//! -   [`registry`] builds environments by id, wrapped in a [`TimeLimit`].

pub mod config;
pub mod env;
pub mod error;
pub mod fast_merge;
pub mod merge;
pub mod observation;
pub mod registry;
pub mod wrappers;

pub use config::{load_config, ConfigError, MergeConfig, SpeedRange};
pub use env::{Env, RewardComponents, Step, StepInfo};
pub use error::EnvError;
pub use fast_merge::{register_fast_merge_env, FastMergeConfig, FastMergeEnv, FAST_MERGE_ID, FAST_MERGE_MAX_STEPS};
pub use merge::{merge_road, MergeEnv, StockMergeEnv};
pub use registry::{EnvSpec, Registry, RegistryError};
pub use wrappers::TimeLimit;
