//! # Fast Merge
//!
//! A configurable highway-merge environment for reinforcement-learning
//! experiments, plus a small command line runner.
//!
//! ## Project Architecture
//!
//! -   **[`highway`]:** the traffic simulator. Lanes and the road network,
//!     the kinematic vehicle model, IDM/MOBIL traffic and collisions.
//! -   **[`rl`]:** the environments built on it. The [`rl::Env`] trait, the
//!     merge task, the fast-merge variant and the id registry.
//! -   **`fastmerge`:** this crate. It re-exports both and ships the
//!     `fastmerge` binary that registers the environments, builds one by id
//!     and drives it with a scripted policy.
//!
//! ## Getting Started
//!
//! ```bash
//! RUST_LOG=info cargo run -p fastmerge -- --episodes 3 --policy faster
//! ```
//!
//! A JSON file passed with `--config` overrides any subset of
//! [`rl::FastMergeConfig`], for example:
//!
//! ```json
//! { "speed_multiplier": 1.2, "other_vehicles_speed_range": [25, 28] }
//! ```

pub use highway;
pub use rl;
