mod config;
mod error;

pub use config::{APP_NAME, CONFIG_NAME, DashboardConfig, DashboardConfigExt, Thresholds};
pub use error::ConfigError;
