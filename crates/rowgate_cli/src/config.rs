//! CLI configuration file.

use color_eyre::eyre::{Result, WrapErr};
use rowgate_backend::Backend;
use rowgate_core::PartialEvalConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings read from `--config`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Partial evaluation query and unknowns
    #[serde(flatten)]
    pub partial: PartialEvalConfig,
    /// Backend used when `--backend` is not given
    pub backend: Backend,
}

impl CliConfig {
    /// Load a config file, or the defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .wrap_err_with(|| format!("invalid config {}", path.display()))?;
        config.partial.validate()?;

        tracing::debug!(path = %path.display(), backend = %config.backend, "loaded config");
        Ok(config)
    }
}
