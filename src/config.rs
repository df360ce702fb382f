use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use fleetscope_api::Routes;
use fleetscope_tui::RefreshIntervals;

/// Contents of `config.toml`; every section is optional
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub routes: Routes,
    pub refresh: RefreshConfig,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RefreshConfig {
    pub logs_secs: u64,
    pub metrics_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            logs_secs: 5,
            metrics_secs: 30,
        }
    }
}

/// Upstream overrides given on the command line
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub robot_url: Option<String>,
    pub metrics_url: Option<String>,
    pub logs_url: Option<String>,
}

impl Config {
    /// Load from `path`, or from the default location when none is given.
    /// Only an explicitly named file has to exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    tracing::debug!("no config file, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::parse(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        if config.refresh.logs_secs == 0 || config.refresh.metrics_secs == 0 {
            anyhow::bail!("refresh intervals must be at least one second");
        }
        Ok(config)
    }

    /// Apply command-line upstream overrides
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(url) = overrides.robot_url {
            self.routes.robot.upstream = url;
        }
        if let Some(url) = overrides.metrics_url {
            self.routes.metrics.upstream = url;
        }
        if let Some(url) = overrides.logs_url {
            self.routes.logs.upstream = url;
        }
    }

    pub fn refresh_intervals(&self) -> RefreshIntervals {
        RefreshIntervals {
            logs: Duration::from_secs(self.refresh.logs_secs),
            metrics: Duration::from_secs(self.refresh.metrics_secs),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// `<config dir>/fleetscope/config.toml`
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("fleetscope").join("config.toml"))
}
