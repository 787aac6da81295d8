//! # Config — Engine tuning, TOML in, defaults out
//!
//! One optional TOML file tunes the engine. Everything has a default, so no
//! file, an empty file, and a file overriding a single knob all behave; the
//! exception is `[remote]`, whose presence (it must carry an endpoint) is
//! what registers the remote algorithm at all.
//!
//! ```toml
//! [engine]
//! parallelism_lower_bound = 1000000
//! min_segment_size = 10000
//! max_segment_size = 4000000
//! level_of_parallelism = 8      # defaults to the core count
//!
//! [remote]
//! endpoint = "http://sieve.internal:8080/segments"
//! min_segment_size = 1000000    # remote work units are coarser
//! max_segment_size = 50000000
//! level_of_parallelism = 16     # in-flight requests, not cores
//! timeout_connect_secs = 5
//! timeout_request_secs = 60
//! ```
//!
//! The path comes from the CLI (`--config` or `FARSIEVE_CONFIG`); this
//! module only turns a path into an [`EngineConfig`]. An explicitly given
//! file that is missing or malformed is an error, never silently defaulted.

use std::path::Path;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use serde::Deserialize;

use crate::segment::PlanParams;

/// Top-level configuration, deserialized from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub engine: EngineSection,
    pub remote: Option<RemoteSection>,
}

/// Tuning for the local algorithms.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    /// Ceilings at or below this are sieved as a single segment.
    pub parallelism_lower_bound: u64,
    /// Smallest segment worth dispatching as its own task.
    pub min_segment_size: u64,
    /// Largest segment one task should own.
    pub max_segment_size: u64,
    /// Worker threads for the local segmented sieve. Absent means one per
    /// core.
    pub level_of_parallelism: Option<usize>,
}

impl Default for EngineSection {
    fn default() -> Self {
        EngineSection {
            parallelism_lower_bound: 1_000_000,
            min_segment_size: 10_000,
            max_segment_size: 4_000_000,
            level_of_parallelism: None,
        }
    }
}

/// Remote segment execution. Work units are much coarser than local ones:
/// every segment pays a round trip, so it had better be worth one.
#[derive(Debug, Deserialize)]
pub struct RemoteSection {
    /// URL segments are POSTed to.
    pub endpoint: String,
    #[serde(default = "default_remote_min_segment_size")]
    pub min_segment_size: u64,
    #[serde(default = "default_remote_max_segment_size")]
    pub max_segment_size: u64,
    /// In-flight requests, not local cores.
    #[serde(default = "default_remote_level")]
    pub level_of_parallelism: usize,
    #[serde(default = "default_timeout_connect_secs")]
    pub timeout_connect_secs: u64,
    #[serde(default = "default_timeout_request_secs")]
    pub timeout_request_secs: u64,
}

fn default_remote_min_segment_size() -> u64 {
    1_000_000
}

fn default_remote_max_segment_size() -> u64 {
    50_000_000
}

fn default_remote_level() -> usize {
    16
}

fn default_timeout_connect_secs() -> u64 {
    5
}

fn default_timeout_request_secs() -> u64 {
    60
}

impl RemoteSection {
    /// Section with the given endpoint and all defaults, for the CLI's
    /// `--endpoint` override when no config file supplies one.
    pub fn with_endpoint(endpoint: &str) -> Self {
        RemoteSection {
            endpoint: endpoint.to_string(),
            min_segment_size: default_remote_min_segment_size(),
            max_segment_size: default_remote_max_segment_size(),
            level_of_parallelism: default_remote_level(),
            timeout_connect_secs: default_timeout_connect_secs(),
            timeout_request_secs: default_timeout_request_secs(),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_connect_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_request_secs)
    }

    /// Planner tuning for remote execution. The single-segment threshold is
    /// shared with the local engine and passed in; below it there is nothing
    /// worth shipping over the network either.
    pub fn plan_params(&self, parallelism_lower_bound: u64) -> PlanParams {
        PlanParams {
            min_segment_size: self.min_segment_size,
            max_segment_size: self.max_segment_size,
            level_of_parallelism: self.level_of_parallelism,
            parallelism_lower_bound,
        }
    }
}

/// Worker threads to use when the config does not pin a level: one per core,
/// as rayon sees the machine.
pub fn default_parallelism() -> usize {
    rayon::current_num_threads()
}

impl EngineConfig {
    /// Load from `path`, or defaults when no path was given.
    pub fn load(path: Option<&Path>) -> Result<EngineConfig> {
        let Some(path) = path else {
            return Ok(EngineConfig::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        let config: EngineConfig = toml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject tunings the planner cannot honor. Also called by the engine,
    /// so hand-built configs pass through the same gate as loaded ones.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.engine.min_segment_size >= 1,
            "engine.min_segment_size must be at least 1"
        );
        ensure!(
            self.engine.min_segment_size <= self.engine.max_segment_size,
            "engine.min_segment_size {} exceeds engine.max_segment_size {}",
            self.engine.min_segment_size,
            self.engine.max_segment_size
        );
        if let Some(level) = self.engine.level_of_parallelism {
            ensure!(level >= 1, "engine.level_of_parallelism must be at least 1");
        }
        if let Some(remote) = &self.remote {
            ensure!(
                !remote.endpoint.trim().is_empty(),
                "remote.endpoint must not be empty"
            );
            ensure!(
                remote.min_segment_size >= 1,
                "remote.min_segment_size must be at least 1"
            );
            ensure!(
                remote.min_segment_size <= remote.max_segment_size,
                "remote.min_segment_size {} exceeds remote.max_segment_size {}",
                remote.min_segment_size,
                remote.max_segment_size
            );
            ensure!(
                remote.level_of_parallelism >= 1,
                "remote.level_of_parallelism must be at least 1"
            );
        }
        Ok(())
    }

    /// Planner tuning for the local segmented sieve.
    pub fn plan_params(&self) -> PlanParams {
        PlanParams {
            min_segment_size: self.engine.min_segment_size,
            max_segment_size: self.engine.max_segment_size,
            level_of_parallelism: self
                .engine
                .level_of_parallelism
                .unwrap_or_else(default_parallelism),
            parallelism_lower_bound: self.engine.parallelism_lower_bound,
        }
    }
}
