pub mod api;
pub mod context;
pub mod dashboard;
pub mod drilldown;
pub mod export;
pub mod filter;
pub mod ingest;
pub mod normalize;
pub mod orchestrator;
pub mod pagination;
pub mod sort;
pub mod sources;

#[cfg(test)]
mod fake_api;

// Re-exports for convenience
pub use api::{ApiError, DashboardApi, HttpApi, ShortlistQuery, UploadFile};
pub use context::{ConfigError, DashboardConfig, DashboardConfigExt, Thresholds};
pub use dashboard::{Dashboard, DashboardCommand, DashboardError, Dispatch};
pub use drilldown::{ChartEvent, DrillDownRouter, parse_range_label};
pub use export::{ExportError, ExportSummary, default_export_file_name};
pub use filter::{FilterError, FilterState};
pub use ingest::UploadError;
pub use normalize::{NormalizeError, absentee_split, normalize};
pub use orchestrator::{Completion, DataSourceOrchestrator, DispatchHandle, Slots, SourceSlot};
pub use pagination::{PageError, PaginationController};
pub use sort::{SortState, SortToggle};
pub use sources::{ChartSource, SourceId};
pub use probate_types::*;
