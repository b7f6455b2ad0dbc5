use serde::Serialize;

use crate::error::EnvError;

/// Reinforcement learning environment trait.
///
/// Inspired by classic frameworks like OpenAI Gym, this trait defines the core
/// interface an environment must provide. Each call to [`step`] advances the
/// simulation by one action and returns the new observation vector, a reward
/// signal, and whether the episode has terminated or was cut short.
///
/// The trait is object safe so that environments can be built by name through
/// the [`crate::registry`].
///
/// [`step`]: Env::step
pub trait Env {
    /// Advance the environment by one discrete action.
    ///
    /// # Errors
    ///
    /// Fails when the environment was never reset or the action is out of range.
    fn step(&mut self, action: usize) -> Result<Step, EnvError>;

    /// Reset the environment to a fresh episode and return the initial
    /// observation vector. A `seed` reseeds the environment's generator.
    ///
    /// # Errors
    ///
    /// Fails when the scenario cannot be populated.
    fn reset(&mut self, seed: Option<u64>) -> Result<Vec<f32>, EnvError>;

    /// Size of the observation vector.
    fn obs_size(&self) -> usize;

    /// Number of discrete actions.
    fn action_size(&self) -> usize;
}

impl<E: Env + ?Sized> Env for Box<E> {
    fn step(&mut self, action: usize) -> Result<Step, EnvError> {
        (**self).step(action)
    }

    fn reset(&mut self, seed: Option<u64>) -> Result<Vec<f32>, EnvError> {
        (**self).reset(seed)
    }

    fn obs_size(&self) -> usize {
        (**self).obs_size()
    }

    fn action_size(&self) -> usize {
        (**self).action_size()
    }
}

/// Result of a single environment step.
#[derive(Debug, Clone, Serialize)]
pub struct Step {
    pub obs: Vec<f32>,
    pub reward: f32,
    /// The episode reached a terminal state.
    pub terminated: bool,
    /// The episode was cut short, e.g. by a time limit.
    pub truncated: bool,
    pub info: StepInfo,
}

impl Step {
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StepInfo {
    pub speed: f64,
    pub crashed: bool,
    pub action: usize,
    pub rewards: RewardComponents,
}

/// Unweighted reward terms of the merge task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RewardComponents {
    pub collision: f64,
    pub right_lane: f64,
    pub high_speed: f64,
    pub lane_change: f64,
    pub merging_speed: f64,
}
