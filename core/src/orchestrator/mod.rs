//! Independent, generation-stamped data sources.
//!
//! Every chart source and the shortlist has its own slot. A dispatch bumps
//! the slot's generation and spawns the fetch; on completion the result is
//! written only if no newer dispatch has happened since. Failures stay on
//! the failing slot.

mod slot;


pub use slot::{Completion, SourceSlot};

use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard};
use tokio::task::JoinHandle;

use probate_types::{ChartData, Filters, MonthSplit, ShortlistPage};

use crate::api::{DashboardApi, ShortlistQuery};
use crate::normalize::{self, absentee_split, as_monthly_counts, as_monthly_rates};
use crate::sources::{ChartSource, SourceId};

/// Error with its source chain, as stored on a slot
pub(crate) fn render_error(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut cause = err.source();
    while let Some(inner) = cause {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        cause = inner.source();
    }
    message
}

static UNREGISTERED: SourceSlot<ChartData> = SourceSlot::EMPTY;

/// Every slot, one per registered source.
#[derive(Debug)]
pub struct Slots {
    charts: HashMap<ChartSource, SourceSlot<ChartData>>,
    shortlist: SourceSlot<ShortlistPage>,
}

impl Default for Slots {
    fn default() -> Self {
        Self {
            charts: ChartSource::ALL
                .into_iter()
                .map(|s| (s, SourceSlot::default()))
                .collect(),
            shortlist: SourceSlot::default(),
        }
    }
}

impl Slots {
    pub fn chart(&self, source: ChartSource) -> &SourceSlot<ChartData> {
        self.charts.get(&source).unwrap_or(&UNREGISTERED)
    }

    pub fn shortlist(&self) -> &SourceSlot<ShortlistPage> {
        &self.shortlist
    }

    fn chart_mut(&mut self, source: ChartSource) -> &mut SourceSlot<ChartData> {
        self.charts.entry(source).or_default()
    }

    /// Sources with a fetch in flight
    pub fn loading(&self) -> Vec<SourceId> {
        let mut ids: Vec<SourceId> = ChartSource::ALL
            .into_iter()
            .filter(|s| self.chart(*s).is_loading())
            .map(SourceId::Chart)
            .collect();
        if self.shortlist.is_loading() {
            ids.push(SourceId::Shortlist);
        }
        ids
    }

    /// Sources whose last completed fetch failed
    pub fn errors(&self) -> Vec<(SourceId, &str)> {
        let mut errors: Vec<(SourceId, &str)> = ChartSource::ALL
            .into_iter()
            .filter_map(|s| self.chart(s).error().map(|e| (SourceId::Chart(s), e)))
            .collect();
        if let Some(e) = self.shortlist.error() {
            errors.push((SourceId::Shortlist, e));
        }
        errors
    }

    /// Absentee/local split per month, rebuilt from whatever rate and total
    /// series are cached right now.
    pub fn absentee_split_by_month(&self) -> Vec<MonthSplit> {
        let rates = self
            .chart(ChartSource::AbsenteeRateTrend)
            .data()
            .and_then(as_monthly_rates)
            .unwrap_or_default();
        let totals = self
            .chart(ChartSource::FilingsByMonth)
            .data()
            .and_then(as_monthly_counts)
            .unwrap_or_default();
        absentee_split(rates, totals)
    }
}

/// Handle to one spawned fetch
#[derive(Debug)]
pub struct DispatchHandle {
    pub source: SourceId,
    pub generation: u64,
    task: JoinHandle<Completion>,
}

impl DispatchHandle {
    /// Wait for the fetch to reach its slot
    pub async fn settled(self) -> Completion {
        match self.task.await {
            Ok(completion) => completion,
            Err(e) => {
                tracing::warn!(source = %self.source, error = %e, "fetch task did not finish");
                Completion::Failed
            }
        }
    }
}

pub struct DataSourceOrchestrator<A> {
    api: Arc<A>,
    slots: Arc<RwLock<Slots>>,
}

impl<A> Clone for DataSourceOrchestrator<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            slots: Arc::clone(&self.slots),
        }
    }
}

impl<A: DashboardApi> DataSourceOrchestrator<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            slots: Arc::new(RwLock::new(Slots::default())),
        }
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    pub async fn slots(&self) -> RwLockReadGuard<'_, Slots> {
        self.slots.read().await
    }

    pub async fn dispatch_chart(&self, source: ChartSource, filters: Arc<Filters>) -> DispatchHandle {
        let generation = self.slots.write().await.chart_mut(source).begin();
        tracing::debug!(%source, generation, "dispatch");

        let api = Arc::clone(&self.api);
        let slots = Arc::clone(&self.slots);
        let task = tokio::spawn(async move {
            let result = match api.fetch_chart(source, &filters).await {
                Ok(raw) => normalize::normalize(source, raw).map_err(|e| render_error(&e)),
                Err(e) => Err(render_error(&e)),
            };
            let completion = slots.write().await.chart_mut(source).finish(generation, result);
            log_completion(SourceId::Chart(source), generation, completion, &slots).await;
            completion
        });

        DispatchHandle {
            source: SourceId::Chart(source),
            generation,
            task,
        }
    }

    pub async fn dispatch_shortlist(&self, query: ShortlistQuery) -> DispatchHandle {
        let generation = self.slots.write().await.shortlist.begin();
        tracing::debug!(
            generation,
            page = query.page,
            sort = %query.sort,
            "dispatch shortlist"
        );

        let api = Arc::clone(&self.api);
        let slots = Arc::clone(&self.slots);
        let task = tokio::spawn(async move {
            let result = api.fetch_shortlist(&query).await.map_err(|e| render_error(&e));
            if let Ok(page) = &result {
                if !page.meta.is_consistent() {
                    tracing::warn!(meta = ?page.meta, "server returned inconsistent page metadata");
                }
            }
            let completion = slots.write().await.shortlist.finish(generation, result);
            log_completion(SourceId::Shortlist, generation, completion, &slots).await;
            completion
        });

        DispatchHandle {
            source: SourceId::Shortlist,
            generation,
            task,
        }
    }

    /// Re-dispatch every chart source and the shortlist
    pub async fn dispatch_all(&self, filters: Arc<Filters>, query: ShortlistQuery) -> Vec<DispatchHandle> {
        let mut handles = Vec::with_capacity(ChartSource::ALL.len() + 1);
        for source in ChartSource::ALL {
            handles.push(self.dispatch_chart(source, Arc::clone(&filters)).await);
        }
        handles.push(self.dispatch_shortlist(query).await);
        handles
    }
}

async fn log_completion(source: SourceId, generation: u64, completion: Completion, slots: &RwLock<Slots>) {
    match completion {
        Completion::Applied => tracing::debug!(%source, generation, "applied"),
        Completion::Stale => tracing::debug!(%source, generation, "discarded stale response"),
        Completion::Failed => {
            let slots = slots.read().await;
            let error = match source {
                SourceId::Chart(chart) => slots.chart(chart).error(),
                SourceId::Shortlist => slots.shortlist().error(),
            };
            tracing::warn!(%source, generation, error = error.unwrap_or_default(), "source failed");
        }
    }
}
