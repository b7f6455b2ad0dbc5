//! Environments constructible by string id.
//!
//! A [`Registry`] maps ids to [`EnvSpec`]s. The process-wide instance behind
//! [`global`] is created on first use and lives for the rest of the process;
//! nothing is registered until a setup function such as
//! [`crate::fast_merge::register_fast_merge_env`] is called.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::debug;

use crate::env::Env;
use crate::merge::StockMergeEnv;
use crate::wrappers::TimeLimit;

pub const MERGE_ID: &str = "merge-v0";
pub const MERGE_MAX_STEPS: u64 = 100;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("environment `{0}` is already registered")]
    AlreadyRegistered(String),
    #[error("no environment registered as `{0}`")]
    UnknownEnv(String),
}

/// How to build a registered environment.
#[derive(Clone, Debug)]
pub struct EnvSpec {
    pub id: String,
    /// Path of the type the factory builds.
    pub entry_point: &'static str,
    pub max_episode_steps: u64,
    pub factory: fn() -> Box<dyn Env>,
}

impl EnvSpec {
    pub fn new(id: impl Into<String>, entry_point: &'static str, max_episode_steps: u64, factory: fn() -> Box<dyn Env>) -> Self {
        Self { id: id.into(), entry_point, max_episode_steps, factory }
    }

    /// A fresh environment limited to `max_episode_steps` steps.
    pub fn make(&self) -> TimeLimit<Box<dyn Env>> {
        TimeLimit::new((self.factory)(), self.max_episode_steps)
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    specs: BTreeMap<String, EnvSpec>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyRegistered`] if the id is taken; the
    /// existing spec is kept.
    pub fn register(&mut self, spec: EnvSpec) -> Result<(), RegistryError> {
        if self.specs.contains_key(&spec.id) {
            return Err(RegistryError::AlreadyRegistered(spec.id));
        }
        debug!(id = %spec.id, entry_point = spec.entry_point, max_episode_steps = spec.max_episode_steps, "registered environment");
        self.specs.insert(spec.id.clone(), spec);
        Ok(())
    }

    pub fn spec(&self, id: &str) -> Option<&EnvSpec> {
        self.specs.get(id)
    }

    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownEnv`] for an unregistered id.
    pub fn make(&self, id: &str) -> Result<TimeLimit<Box<dyn Env>>, RegistryError> {
        self.spec(id)
            .map(EnvSpec::make)
            .ok_or_else(|| RegistryError::UnknownEnv(id.to_owned()))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.specs.keys().map(String::as_str)
    }
}

/// The process-wide registry.
pub fn global() -> &'static Mutex<Registry> {
    static REGISTRY: OnceLock<Mutex<Registry>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(Registry::new()))
}

/// Register `spec` in the process-wide registry.
///
/// # Errors
///
/// See [`Registry::register`].
pub fn register(spec: EnvSpec) -> Result<(), RegistryError> {
    global().lock().register(spec)
}

/// Build a registered environment by id.
///
/// # Errors
///
/// See [`Registry::make`].
pub fn make(id: &str) -> Result<TimeLimit<Box<dyn Env>>, RegistryError> {
    // The factory runs outside the lock.
    let spec = global().lock().spec(id).cloned();
    spec.map(|spec| spec.make()).ok_or_else(|| RegistryError::UnknownEnv(id.to_owned()))
}

pub fn registered_ids() -> Vec<String> {
    global().lock().ids().map(str::to_owned).collect()
}

/// Register the stock merge task as [`MERGE_ID`].
///
/// # Errors
///
/// Returns [`RegistryError::AlreadyRegistered`] on a repeated call.
pub fn register_merge_env() -> Result<(), RegistryError> {
    register(EnvSpec::new(MERGE_ID, "rl::merge::StockMergeEnv", MERGE_MAX_STEPS, make_stock_merge))
}

fn make_stock_merge() -> Box<dyn Env> {
    Box::new(StockMergeEnv::new())
}
