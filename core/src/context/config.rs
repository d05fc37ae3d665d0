//! Dashboard configuration
//!
//! Re-exports the serializable `DashboardConfig` from probate-types and adds
//! confy-backed persistence.

use std::path::{Path, PathBuf};

pub use probate_types::{DashboardConfig, Thresholds};

use super::error::ConfigError;

pub const APP_NAME: &str = "probate-dash";
pub const CONFIG_NAME: &str = "config";

// ─────────────────────────────────────────────────────────────────────────────
// DashboardConfig Extensions
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for DashboardConfig persistence
pub trait DashboardConfigExt: Sized {
    /// Load from the platform config dir, falling back to defaults when the
    /// file is missing or unreadable.
    fn load() -> Self;
    fn load_from(path: &Path) -> Result<Self, ConfigError>;
    fn save(&self) -> Result<(), ConfigError>;
    fn save_to(&self, path: &Path) -> Result<(), ConfigError>;
    fn config_path() -> Result<PathBuf, ConfigError>;
    fn validate(&self) -> Result<(), ConfigError>;
}

impl DashboardConfigExt for DashboardConfig {
    fn load() -> Self {
        match confy::load::<DashboardConfig>(APP_NAME, CONFIG_NAME) {
            Ok(config) => match config.validate() {
                Ok(()) => config,
                Err(e) => {
                    tracing::warn!(error = %e, "invalid configuration, using defaults");
                    DashboardConfig::default()
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "failed to load configuration, using defaults");
                DashboardConfig::default()
            }
        }
    }

    fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config: DashboardConfig = confy::load_path(path).map_err(ConfigError::Load)?;
        config.validate()?;
        Ok(config)
    }

    fn save(&self) -> Result<(), ConfigError> {
        self.validate()?;
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Save)
    }

    fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;
        confy::store_path(path, self).map_err(ConfigError::Save)
    }

    fn config_path() -> Result<PathBuf, ConfigError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME).map_err(ConfigError::Path)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "api_base",
                reason: "must not be empty",
            });
        }
        if self.page_size == 0 {
            return Err(ConfigError::Invalid {
                field: "page_size",
                reason: "must be at least 1",
            });
        }
        if self.export_max_rows < self.page_size {
            return Err(ConfigError::Invalid {
                field: "export_max_rows",
                reason: "must be at least page_size",
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "request_timeout_secs",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}
