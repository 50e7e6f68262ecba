//! Run configuration: `config.yaml` in the data directory, overridden by `NSHOT_*`
//! environment variables.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::estimator::RunConfig;
use crate::parallel::WorkerPool;

pub const CONFIG_FILE: &str = "config.yaml";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_SIMULATION_COUNT: usize = 10_000;
/// Upper bound accepted from HTTP callers.
pub const MAX_SIMULATION_COUNT: usize = 100_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("simulation_count must be positive")]
    ZeroSimulationCount,

    #[error("failed to draw a random seed")]
    Seed(#[source] getrandom::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub simulation_count: usize,
    pub seed: Option<u64>,
    pub workers: usize,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            simulation_count: DEFAULT_SIMULATION_COUNT,
            seed: None,
            workers: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub data_dir: PathBuf,
    pub simulation_count: usize,
    /// Fixed seed; `None` draws a fresh one per run.
    pub seed: Option<u64>,
    pub workers: usize,
}

impl AppConfig {
    /// Resolve the data directory from `NSHOT_DATA_DIR`, then load its config file and apply
    /// the remaining environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let data_dir = env::var("NSHOT_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
        Self::load(Path::new(&data_dir), |key| env::var(key).ok())
    }

    /// Load from `data_dir` with overrides looked up through `lookup` (env in production).
    pub fn load<F>(data_dir: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = load_file_config(&data_dir.join(CONFIG_FILE))?;

        let simulation_count =
            parse_override(&lookup, "NSHOT_SIMS").unwrap_or(file.simulation_count);
        if simulation_count == 0 {
            return Err(ConfigError::ZeroSimulationCount);
        }

        Ok(Self {
            bind_addr: lookup("NSHOT_BIND").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            data_dir: data_dir.to_path_buf(),
            simulation_count,
            seed: parse_override(&lookup, "NSHOT_SEED").or(file.seed),
            workers: parse_override(&lookup, "NSHOT_WORKERS").unwrap_or(file.workers),
        })
    }

    /// Run settings for one request. `sims`/`seed` come from the caller when given.
    pub fn run_config(&self, sims: Option<usize>, seed: Option<u64>) -> Result<RunConfig, ConfigError> {
        let seed = match seed.or(self.seed) {
            Some(seed) => seed,
            None => random_seed()?,
        };
        let trials = sims.unwrap_or(self.simulation_count);
        Ok(RunConfig::new(trials, seed).with_pool(WorkerPool::with_workers(self.workers)))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let file = FileConfig::default();
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            simulation_count: file.simulation_count,
            seed: file.seed,
            workers: file.workers,
        }
    }
}

/// Missing file means defaults; a malformed one is an error.
pub fn load_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    if !path.is_file() {
        return Ok(FileConfig::default());
    }
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn random_seed() -> Result<u64, ConfigError> {
    let mut buf = [0u8; 8];
    getrandom::getrandom(&mut buf).map_err(ConfigError::Seed)?;
    Ok(u64::from_le_bytes(buf))
}

fn parse_override<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable override");
            None
        }
    }
}
