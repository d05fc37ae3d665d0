//! Central owner of filter, sort and page state.
//!
//! Front ends never touch `FilterState`, `SortState` or the pager directly;
//! they send a `DashboardCommand` and get back the set of sources that were
//! re-dispatched. The cascade is fixed:
//!
//! - filter change: page reset, every source re-dispatched
//! - sort change: page reset, shortlist only
//! - page change: shortlist only

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;

use probate_types::{
    AnalyzeResponse, ClassCount, DashboardConfig, FilterKey, FilterPatch, FilterValue, Filters,
    MonthSplit, PageMeta,
};

use crate::api::{DashboardApi, ShortlistQuery};
use crate::drilldown::{ChartEvent, DrillDownRouter};
use crate::export::{ExportError, ExportSummary, export_query, export_shortlist};
use crate::filter::{FilterError, FilterState};
use crate::ingest::{UploadError, read_upload};
use crate::normalize::as_class_mix;
use crate::orchestrator::{Completion, DataSourceOrchestrator, DispatchHandle, Slots};
use crate::pagination::{PageError, PaginationController};
use crate::sort::{SortState, SortToggle, is_sortable};
use crate::sources::{ChartSource, SourceId};

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardCommand {
    SetFilter { key: FilterKey, value: FilterValue },
    ClearFilter(FilterKey),
    ClearAll,
    ApplyPatch(FilterPatch),
    Drill(ChartEvent),
    ToggleSort(String),
    NextPage,
    PrevPage,
    GotoPage(u32),
    Refresh,
}

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Page(#[from] PageError),

    #[error("column '{column}' is not sortable")]
    UnknownColumn { column: String },

    #[error("the shortlist is still loading")]
    ShortlistLoading,
}

/// Sources re-dispatched by one command
#[derive(Debug, Default)]
pub struct Dispatch {
    handles: Vec<DispatchHandle>,
}

impl Dispatch {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn sources(&self) -> Vec<SourceId> {
        self.handles.iter().map(|h| h.source).collect()
    }

    /// Wait for every dispatched fetch to land (or be discarded)
    pub async fn settled(self) -> Vec<(SourceId, Completion)> {
        let mut out = Vec::with_capacity(self.handles.len());
        for handle in self.handles {
            let source = handle.source;
            out.push((source, handle.settled().await));
        }
        out
    }
}

#[derive(Debug)]
struct Controls {
    filters: FilterState,
    sort: SortState,
    pager: PaginationController,
}

pub struct Dashboard<A: DashboardApi> {
    config: DashboardConfig,
    controls: RwLock<Controls>,
    orchestrator: DataSourceOrchestrator<A>,
}

impl<A: DashboardApi> Dashboard<A> {
    pub fn new(api: Arc<A>, config: DashboardConfig) -> Self {
        let controls = Controls {
            filters: FilterState::new(),
            sort: SortState::new(),
            pager: PaginationController::new(config.page_size),
        };
        Self {
            config,
            controls: RwLock::new(controls),
            orchestrator: DataSourceOrchestrator::new(api),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn orchestrator(&self) -> &DataSourceOrchestrator<A> {
        &self.orchestrator
    }

    /// Read access to every source's cached data
    pub async fn slots(&self) -> tokio::sync::RwLockReadGuard<'_, Slots> {
        self.orchestrator.slots().await
    }

    pub async fn filters(&self) -> Arc<Filters> {
        self.controls.read().await.filters.snapshot()
    }

    pub async fn sort(&self) -> SortState {
        self.controls.read().await.sort.clone()
    }

    pub async fn page(&self) -> u32 {
        self.controls.read().await.pager.page()
    }

    pub async fn absentee_split_by_month(&self) -> Vec<MonthSplit> {
        self.slots().await.absentee_split_by_month()
    }

    /// First load: every source with the empty filter
    pub async fn start(&self) -> Dispatch {
        let controls = self.controls.write().await;
        self.dispatch_all(&controls).await
    }

    pub async fn execute(&self, command: DashboardCommand) -> Result<Dispatch, DashboardError> {
        tracing::debug!(?command, "execute");
        // The write lock is held through dispatch so generations are handed
        // out in the same order snapshots are taken.
        let mut controls = self.controls.write().await;

        match command {
            DashboardCommand::SetFilter { key, value } => {
                controls.filters.set(key, value)?;
                Ok(self.filters_changed(&mut controls).await)
            }
            DashboardCommand::ClearFilter(key) => {
                controls.filters.clear(key);
                Ok(self.filters_changed(&mut controls).await)
            }
            DashboardCommand::ClearAll => {
                controls.filters.clear_all();
                Ok(self.filters_changed(&mut controls).await)
            }
            DashboardCommand::ApplyPatch(patch) => self.apply_patch(&mut controls, &patch).await,
            DashboardCommand::Drill(event) => {
                let class_mix: Option<Vec<ClassCount>> = self
                    .slots()
                    .await
                    .chart(ChartSource::PropertyClassMix)
                    .data()
                    .and_then(as_class_mix)
                    .map(<[ClassCount]>::to_vec);
                match DrillDownRouter::route(&event, class_mix.as_deref()) {
                    Some(patch) => self.apply_patch(&mut controls, &patch).await,
                    None => {
                        tracing::debug!(?event, "drill-down label not mapped");
                        Ok(Dispatch::none())
                    }
                }
            }
            DashboardCommand::ToggleSort(column) => {
                if !is_sortable(&column) {
                    return Err(DashboardError::UnknownColumn { column });
                }
                let toggle: SortToggle = controls.sort.toggle(&column);
                tracing::debug!(%column, ?toggle, sort = %controls.sort.encode(), "sort changed");
                controls.pager.reset();
                Ok(self.dispatch_shortlist(&controls).await)
            }
            DashboardCommand::NextPage => {
                let meta = self.page_meta(&controls).await?;
                controls.pager.next(meta.as_ref())?;
                Ok(self.dispatch_shortlist(&controls).await)
            }
            DashboardCommand::PrevPage => {
                let meta = self.page_meta(&controls).await?;
                controls.pager.prev(meta.as_ref())?;
                Ok(self.dispatch_shortlist(&controls).await)
            }
            DashboardCommand::GotoPage(page) => {
                let meta = self.page_meta(&controls).await?;
                controls.pager.goto(page, meta.as_ref())?;
                Ok(self.dispatch_shortlist(&controls).await)
            }
            DashboardCommand::Refresh => Ok(self.dispatch_all(&controls).await),
        }
    }

    /// Export every row matching the current filter and sort
    pub async fn export(&self, path: &Path) -> Result<ExportSummary, ExportError> {
        let query = {
            let controls = self.controls.read().await;
            export_query(
                controls.filters.snapshot(),
                &controls.sort,
                self.config.export_max_rows,
            )
        };
        export_shortlist(self.orchestrator.api().as_ref(), &query, path).await
    }

    /// Ingest a file, then reload everything from page 1.
    pub async fn upload(&self, path: &Path) -> Result<Dispatch, UploadError> {
        let file = read_upload(path).await?;
        self.orchestrator.api().upload(file).await?;
        tracing::info!(path = %path.display(), "upload accepted");

        let mut controls = self.controls.write().await;
        controls.pager.reset();
        Ok(self.dispatch_all(&controls).await)
    }

    /// Preview analysis of a file without ingesting it
    pub async fn analyze(&self, path: &Path) -> Result<AnalyzeResponse, UploadError> {
        let file = read_upload(path).await?;
        let preview = self
            .orchestrator
            .api()
            .analyze(file, self.config.analyze_max_records)
            .await?;
        Ok(preview)
    }

    async fn apply_patch(
        &self,
        controls: &mut Controls,
        patch: &FilterPatch,
    ) -> Result<Dispatch, DashboardError> {
        if patch.is_empty() {
            return Ok(Dispatch::none());
        }
        controls.filters.apply(patch)?;
        Ok(self.filters_changed(controls).await)
    }

    async fn filters_changed(&self, controls: &mut Controls) -> Dispatch {
        controls.pager.reset();
        tracing::debug!(filters = controls.filters.snapshot().len(), "filters changed");
        self.dispatch_all(controls).await
    }

    /// Metadata for the page the pager is on, refusing while a shortlist
    /// fetch is in flight. Meta left over from a failed or different query
    /// counts as not loaded.
    async fn page_meta(&self, controls: &Controls) -> Result<Option<PageMeta>, DashboardError> {
        let slots = self.slots().await;
        let shortlist = slots.shortlist();
        if shortlist.is_loading() {
            return Err(DashboardError::ShortlistLoading);
        }
        if shortlist.error().is_some() {
            return Ok(None);
        }
        Ok(shortlist
            .data()
            .map(|page| page.meta)
            .filter(|meta| meta.page == controls.pager.page()))
    }

    fn shortlist_query(&self, controls: &Controls) -> ShortlistQuery {
        ShortlistQuery {
            filters: controls.filters.snapshot(),
            sort: controls.sort.encode(),
            page: controls.pager.page(),
            page_size: controls.pager.page_size(),
        }
    }

    async fn dispatch_all(&self, controls: &Controls) -> Dispatch {
        let handles = self
            .orchestrator
            .dispatch_all(controls.filters.snapshot(), self.shortlist_query(controls))
            .await;
        Dispatch { handles }
    }

    async fn dispatch_shortlist(&self, controls: &Controls) -> Dispatch {
        let handle = self
            .orchestrator
            .dispatch_shortlist(self.shortlist_query(controls))
            .await;
        Dispatch {
            handles: vec![handle],
        }
    }
}

#[cfg(test)]
#[path = "dashboard_tests.rs"]
mod tests;
