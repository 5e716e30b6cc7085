//! Layered settings for the monitor binary.
//!
//! Sources, lowest priority first: built-in defaults, an optional TOML file,
//! `NEBULA_LIVE_*` environment variables. Command-line flags are applied on
//! top by the binary.
//!
//! ```toml
//! endpoint = "http://127.0.0.1:8188/nebula"
//! project_id = "my-project"
//! refresh_ms = 750
//! include_subdirs = true
//! request_timeout_ms = 10000
//! nebula_root = "/data/nebula"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::preview::DEFAULT_REFRESH_MS;
use crate::source::DEFAULT_ENDPOINT;

pub const ENV_PREFIX: &str = "NEBULA_LIVE";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// Base URL of the Nebula routes.
    pub endpoint: String,
    pub project_id: Option<String>,
    pub refresh_ms: u64,
    pub include_subdirs: bool,
    pub request_timeout_ms: u64,
    /// Directory holding one folder per project.
    pub nebula_root: Option<PathBuf>,
}

impl Settings {
    /// Load settings from defaults, `path` (if any) and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("endpoint", DEFAULT_ENDPOINT)?
            .set_default("refresh_ms", DEFAULT_REFRESH_MS)?
            .set_default("include_subdirs", true)?
            .set_default("request_timeout_ms", 10_000u64)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let config = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
