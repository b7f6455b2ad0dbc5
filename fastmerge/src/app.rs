//! # Runner Logic
//!
//! [`run`] installs the log subscriber, registers the environments, builds
//! the requested one and plays `--episodes` episodes with the chosen policy.

use anyhow::{bail, Context, Result};
use highway::MetaAction;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rl::config::load_config;
use rl::registry;
use rl::{register_fast_merge_env, Env, FastMergeConfig, FastMergeEnv, TimeLimit, FAST_MERGE_ID, FAST_MERGE_MAX_STEPS};
use tracing_subscriber::EnvFilter;

use crate::{Args, Policy};

/// # Errors
///
/// Returns registration, configuration and environment errors.
pub fn run(args: &Args) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    registry::register_merge_env()?;
    register_fast_merge_env()?;
    tracing::debug!(ids = ?registry::registered_ids(), "environments registered");

    let mut env = build_env(args)?;
    let mut rng = StdRng::seed_from_u64(args.seed);
    tracing::info!(env = %args.env, episodes = args.episodes, policy = ?args.policy, "starting run");

    for episode in 0..args.episodes {
        env.reset(Some(episode_seed(args.seed, episode)))?;
        let mut total = 0.0_f32;
        let crashed = loop {
            let action = match args.policy {
                Policy::Idle => MetaAction::Idle.index(),
                Policy::Faster => MetaAction::Faster.index(),
                Policy::Random => rng.gen_range(0..env.action_size()),
            };
            let step = env.step(action)?;
            total += step.reward;
            if step.done() {
                break step.info.crashed;
            }
        };
        tracing::info!(episode, steps = env.elapsed(), total_reward = total, crashed, "episode finished");
    }
    Ok(())
}

/// Seed of the `episode`-th episode of a run started at `seed`.
fn episode_seed(seed: u64, episode: u32) -> u64 {
    seed.wrapping_add(u64::from(episode))
}

/// The registered environment, or a configured [`FastMergeEnv`] when options
/// are overridden on the command line.
fn build_env(args: &Args) -> Result<TimeLimit<Box<dyn Env>>> {
    if args.config.is_none() && args.speed_multiplier.is_none() {
        return Ok(registry::make(&args.env)?);
    }
    if args.env != FAST_MERGE_ID {
        bail!("--config and --speed-multiplier only apply to `{FAST_MERGE_ID}`");
    }

    let mut config = match &args.config {
        Some(path) => load_config::<FastMergeConfig>(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => FastMergeConfig::default(),
    };
    if let Some(multiplier) = args.speed_multiplier {
        config.speed_multiplier = multiplier;
    }
    tracing::debug!(?config, "configured fast merge");

    let env: Box<dyn Env> = Box::new(FastMergeEnv::with_config(config)?);
    Ok(TimeLimit::new(env, FAST_MERGE_MAX_STEPS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn episode_seeds_are_consecutive() {
        assert_eq!(episode_seed(7, 0), 7);
        assert_eq!(episode_seed(7, 3), 10);
    }

    #[test]
    fn episode_seed_wraps_at_the_top_of_the_range() {
        assert_eq!(episode_seed(u64::MAX, 0), u64::MAX);
        assert_eq!(episode_seed(u64::MAX, 1), 0);
        assert_eq!(episode_seed(u64::MAX - 1, 3), 1);
    }
}
