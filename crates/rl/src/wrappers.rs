use crate::env::{Env, Step};
use crate::error::EnvError;

/// Truncates episodes after a fixed number of steps.
#[derive(Debug)]
pub struct TimeLimit<E> {
    env: E,
    max_episode_steps: u64,
    elapsed: u64,
}

impl<E: Env> TimeLimit<E> {
    pub fn new(env: E, max_episode_steps: u64) -> Self {
        Self { env, max_episode_steps, elapsed: 0 }
    }

    pub fn max_episode_steps(&self) -> u64 {
        self.max_episode_steps
    }

    /// Steps taken since the last reset.
    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }
}

impl<E: Env> Env for TimeLimit<E> {
    fn step(&mut self, action: usize) -> Result<Step, EnvError> {
        let mut step = self.env.step(action)?;
        self.elapsed += 1;
        if self.elapsed >= self.max_episode_steps {
            step.truncated = true;
        }
        Ok(step)
    }

    fn reset(&mut self, seed: Option<u64>) -> Result<Vec<f32>, EnvError> {
        self.elapsed = 0;
        self.env.reset(seed)
    }

    fn obs_size(&self) -> usize {
        self.env.obs_size()
    }

    fn action_size(&self) -> usize {
        self.env.action_size()
    }
}
