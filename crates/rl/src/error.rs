use highway::HighwayError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum EnvError {
    #[error(transparent)]
    Highway(#[from] HighwayError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("action {action} out of range, expected < {size}")]
    InvalidAction { action: usize, size: usize },
    #[error("environment must be reset before stepping")]
    NotReset,
}
