//! Optional TOML configuration for the console host.
//!
//! Every key is optional; missing keys fall back to the defaults below.
//!
//! ```toml
//! autosave_interval_secs = 30
//! submit_delay_ms = 2000
//! submit_label = "Submit Report"
//! submitting_label = "Submitting..."
//! saved_notice = "Form saved"
//! log_level = "debug"
//! log_file = "survey.log"
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use survey_core::ControllerConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("autosave_interval_secs must be at least 1")]
    ZeroAutosaveInterval,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub autosave_interval_secs: u64,
    pub submit_delay_ms: u64,
    pub submit_label: String,
    pub submitting_label: String,
    pub saved_notice: String,
    /// Overrides `RUST_LOG` when set.
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let controller = ControllerConfig::default();
        Self {
            autosave_interval_secs: controller.autosave_interval.as_secs(),
            submit_delay_ms: 2000,
            submit_label: controller.submit_label,
            submitting_label: controller.submitting_label,
            saved_notice: controller.saved_notice,
            log_level: None,
            log_file: None,
        }
    }
}

impl AppConfig {
    /// Reads and validates a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|error| match error {
            ParseFailure::Toml(source) => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            ParseFailure::Invalid(error) => error,
        })
    }

    fn parse(text: &str) -> Result<Self, ParseFailure> {
        let config: Self = toml::from_str(text).map_err(ParseFailure::Toml)?;
        config.validate().map_err(ParseFailure::Invalid)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.autosave_interval_secs == 0 {
            return Err(ConfigError::ZeroAutosaveInterval);
        }
        Ok(())
    }

    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }

    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            autosave_interval: Duration::from_secs(self.autosave_interval_secs),
            submit_label: self.submit_label.clone(),
            submitting_label: self.submitting_label.clone(),
            saved_notice: self.saved_notice.clone(),
        }
    }
}

#[derive(Debug)]
enum ParseFailure {
    Toml(toml::de::Error),
    Invalid(ConfigError),
}
