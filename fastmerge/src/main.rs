//! # Fast Merge Runner
//!
//! Runs episodes of a registered environment with a scripted policy and logs
//! their returns.

mod app;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(version, about = "Run scripted episodes of the fast merge environment")]
pub struct Args {
    /// Registered environment id.
    #[arg(long, default_value = rl::FAST_MERGE_ID)]
    pub env: String,
    #[arg(long, default_value_t = 1)]
    pub episodes: u32,
    /// Seed of the first episode; later episodes use consecutive seeds.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
    /// JSON file with fast merge options.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Override `speed_multiplier`.
    #[arg(long)]
    pub speed_multiplier: Option<f64>,
    #[arg(long, value_enum, default_value_t = Policy::Idle)]
    pub policy: Policy,
}

/// Scripted action selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Policy {
    Idle,
    Faster,
    Random,
}

fn main() -> Result<()> {
    app::run(&Args::parse())
}
