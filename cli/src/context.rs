use std::sync::Arc;

use probate_core::{ApiError, Dashboard, DashboardConfig, DashboardConfigExt, HttpApi};

/// Holds all shared state for the CLI application.
/// This is a lightweight container - logic lives in the dashboard.
#[derive(Clone)]
pub struct CliContext {
    pub config: Arc<DashboardConfig>,
    pub dashboard: Arc<Dashboard<HttpApi>>,
}

impl CliContext {
    /// Load the persisted config and connect to its API base.
    pub fn new() -> Result<Self, ApiError> {
        Self::with_config(DashboardConfig::load())
    }

    pub fn with_config(config: DashboardConfig) -> Result<Self, ApiError> {
        let api = Arc::new(HttpApi::new(&config)?);
        tracing::info!(api_base = api.base(), page_size = config.page_size, "dashboard ready");
        Ok(Self {
            dashboard: Arc::new(Dashboard::new(api, config.clone())),
            config: Arc::new(config),
        })
    }
}
