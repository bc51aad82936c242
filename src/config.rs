//! Configuration management for the audit engine
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (structure-audit.toml)
//! - Environment variables (STRUCTURE_AUDIT__*)
//!
//! ## Example config file (structure-audit.toml):
//! ```toml
//! [events]
//! trace_lifecycle = true
//! trace_captures = false
//!
//! [reports]
//! summary_min_severity = "warn"
//! include_unclassified = true
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::report::Severity;

/// Main configuration for the engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Event bus settings
    #[serde(default)]
    pub events: EventsConfig,

    /// Report summary settings
    #[serde(default)]
    pub reports: ReportsConfig,
}

/// Event bus configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Log comparison and audit lifecycle events through `tracing`
    #[serde(default)]
    pub trace_lifecycle: bool,

    /// Log capture sessions opened, released and cleared by combinators
    #[serde(default)]
    pub trace_captures: bool,
}

/// Report summary configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportsConfig {
    /// Lowest severity rendered into a results summary
    #[serde(default = "default_min_severity")]
    pub summary_min_severity: Severity,

    /// Render unclassified messages into a results summary
    #[serde(default = "default_true")]
    pub include_unclassified: bool,
}

fn default_min_severity() -> Severity {
    Severity::Debug
}

fn default_true() -> bool {
    true
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            summary_min_severity: default_min_severity(),
            include_unclassified: true,
        }
    }
}

impl EngineConfig {
    /// Load configuration from default locations
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, adding a required file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> std::result::Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "structure-audit.toml",
            ".structure-audit.toml",
            "config/structure-audit.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(dirs) = directories::ProjectDirs::from("dev", "structure-audit", "structure-audit") {
            let xdg_config = dirs.config_dir().join("structure-audit.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // STRUCTURE_AUDIT__EVENTS__TRACE_LIFECYCLE=true
        builder = builder.add_source(
            Environment::with_prefix("STRUCTURE_AUDIT")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
