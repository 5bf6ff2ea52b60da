// src/config.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};
use tracing::{debug, info};

use crate::output::OutputConfig;
use crate::parse::ParseOptions;

/// Environment variable naming a YAML config file.
pub const CONFIG_ENV: &str = "SECTABLE_CONFIG";

/// Everything the binaries can be told from a config file.
///
/// ```yaml
/// parse:
///   preamble: capture
///   filler: ""
///   overflow: keep
/// output:
///   format: json
///   placeholder: "-"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub parse: ParseOptions,
    pub output: OutputConfig,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {:?}", path))?;
        let config: Config = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing config file {:?}", path))?;
        debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    /// Load from `$SECTABLE_CONFIG` if it is set, otherwise use defaults.
    pub fn from_env() -> Result<Self> {
        match env::var(CONFIG_ENV) {
            Ok(path) if !path.trim().is_empty() => {
                info!(path = %path, "using config from {}", CONFIG_ENV);
                Self::load(path.trim())
            }
            _ => Ok(Self::default()),
        }
    }
}
