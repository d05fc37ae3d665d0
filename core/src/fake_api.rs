//! In-memory `DashboardApi` for orchestrator and dashboard tests.
//!
//! Responses are derived from the request so a test can tell which filter
//! snapshot or page produced what it sees. A gate holds the next response
//! for a source until released, which is how tests force out-of-order
//! completion.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use serde_json::{Value, json};
use tokio::sync::oneshot;

use probate_types::{
    AnalyzeResponse, FilterKey, FilterValue, Filters, PageMeta, RecordRow, ShortlistPage,
};

use crate::api::{ApiError, DashboardApi, ShortlistQuery, UploadFile};
use crate::sources::{ChartSource, SourceId};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Chart(ChartSource, Filters),
    Shortlist(ShortlistQuery),
    Upload(String),
    Analyze(String, u32),
}

impl Call {
    pub fn source(&self) -> Option<SourceId> {
        match self {
            Call::Chart(source, _) => Some(SourceId::Chart(*source)),
            Call::Shortlist(_) => Some(SourceId::Shortlist),
            _ => None,
        }
    }
}

#[derive(Default)]
struct Inner {
    calls: Vec<Call>,
    gates: HashMap<SourceId, VecDeque<oneshot::Receiver<()>>>,
    failing: HashSet<SourceId>,
    charts: HashMap<ChartSource, Value>,
    rows: Vec<RecordRow>,
    fail_uploads: bool,
}

#[derive(Default)]
pub struct FakeApi {
    inner: Mutex<Inner>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fake with `n` shortlist rows spread over a few counties
    pub fn with_rows(n: usize) -> Self {
        let fake = Self::new();
        fake.set_rows((0..n).map(sample_row).collect());
        fake
    }

    pub fn set_rows(&self, rows: Vec<RecordRow>) {
        self.inner.lock().unwrap().rows = rows;
    }

    /// Fixed payload for a chart source instead of the derived default
    pub fn set_chart(&self, source: ChartSource, payload: Value) {
        self.inner.lock().unwrap().charts.insert(source, payload);
    }

    pub fn fail(&self, source: SourceId, failing: bool) {
        let mut inner = self.inner.lock().unwrap();
        if failing {
            inner.failing.insert(source);
        } else {
            inner.failing.remove(&source);
        }
    }

    pub fn fail_uploads(&self, failing: bool) {
        self.inner.lock().unwrap().fail_uploads = failing;
    }

    /// Hold the next response for `source` until the sender fires (or drops)
    pub fn gate(&self, source: SourceId) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.inner
            .lock()
            .unwrap()
            .gates
            .entry(source)
            .or_default()
            .push_back(rx);
        tx
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn calls_for(&self, source: SourceId) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.source() == Some(source))
            .count()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().unwrap().calls.clear();
    }

    /// Record the call and take its gate; the lock is released before
    /// anything is awaited.
    fn enter(&self, call: Call) -> (Option<oneshot::Receiver<()>>, bool) {
        let mut inner = self.inner.lock().unwrap();
        let source = call.source();
        inner.calls.push(call);
        let gate = source.and_then(|s| inner.gates.get_mut(&s).and_then(VecDeque::pop_front));
        let failing = source.is_some_and(|s| inner.failing.contains(&s));
        (gate, failing)
    }
}

async fn wait(gate: Option<oneshot::Receiver<()>>) {
    if let Some(rx) = gate {
        let _ = rx.await;
    }
}

fn unavailable(path: &str) -> ApiError {
    ApiError::Status {
        path: path.to_string(),
        status: 503,
        body: "service unavailable".to_string(),
    }
}

pub fn sample_row(i: usize) -> RecordRow {
    const COUNTIES: [&str; 3] = ["Fulton", "DeKalb", "Cobb"];
    RecordRow {
        score: Some(90.0 - i as f64),
        tier: if i % 2 == 0 { "high" } else { "low" }.to_string(),
        county: COUNTIES[i % COUNTIES.len()].to_string(),
        case_no: format!("2024-ES-{i:04}"),
        owner_name: format!("Estate of Owner {i}"),
        absentee_flag: Some(i % 3 == 0),
        ..RecordRow::default()
    }
}

fn counties(filters: &Filters) -> Vec<String> {
    match filters.get(FilterKey::Counties) {
        Some(FilterValue::List(items)) => items.clone(),
        _ => Vec::new(),
    }
}

/// Default payload: county charts echo the county filter so each snapshot
/// produces a distinguishable series.
fn derived_chart(source: ChartSource, filters: &Filters) -> Value {
    let selected = counties(filters);
    match source {
        ChartSource::Kpis => json!({"kpis": [
            {"label": "Active Filters", "value": filters.len()},
            {"label": "Absentee %", "value": 0.61}
        ]}),
        ChartSource::CountByCounty => json!({"countByCounty": selected
            .iter()
            .map(|c| json!({"county": c, "count": 1}))
            .collect::<Vec<_>>()}),
        ChartSource::AverageValueByCounty => json!([{"averageValueByCounty": selected
            .iter()
            .map(|c| json!({"county": c, "average_value": 250000.0}))
            .collect::<Vec<_>>()}]),
        _ => json!({}),
    }
}

impl DashboardApi for FakeApi {
    async fn fetch_chart(&self, source: ChartSource, filters: &Filters) -> Result<Value, ApiError> {
        let (gate, failing) = self.enter(Call::Chart(source, filters.clone()));
        let payload = {
            let inner = self.inner.lock().unwrap();
            inner.charts.get(&source).cloned()
        }
        .unwrap_or_else(|| derived_chart(source, filters));
        wait(gate).await;
        if failing {
            return Err(unavailable(&format!("/charts/{}", source.endpoint())));
        }
        Ok(payload)
    }

    async fn fetch_shortlist(&self, query: &ShortlistQuery) -> Result<ShortlistPage, ApiError> {
        let (gate, failing) = self.enter(Call::Shortlist(query.clone()));
        let matching: Vec<RecordRow> = {
            let inner = self.inner.lock().unwrap();
            let selected = counties(&query.filters);
            inner
                .rows
                .iter()
                .filter(|r| selected.is_empty() || selected.contains(&r.county))
                .cloned()
                .collect()
        };
        wait(gate).await;
        if failing {
            return Err(unavailable("/shortlist"));
        }

        let total = matching.len() as u64;
        let page_size = query.page_size.max(1);
        let total_pages = total.div_ceil(u64::from(page_size)) as u32;
        let start = (query.page.saturating_sub(1) as usize) * page_size as usize;
        let rows = matching
            .into_iter()
            .skip(start)
            .take(page_size as usize)
            .collect();
        Ok(ShortlistPage {
            rows,
            meta: PageMeta {
                total,
                page: query.page,
                page_size,
                total_pages,
                has_next: query.page < total_pages,
                has_prev: query.page > 1,
            },
        })
    }

    async fn upload(&self, file: UploadFile) -> Result<(), ApiError> {
        let (_, _) = self.enter(Call::Upload(file.file_name));
        let fail = self.inner.lock().unwrap().fail_uploads;
        if fail {
            return Err(unavailable("/upload"));
        }
        Ok(())
    }

    async fn analyze(&self, file: UploadFile, max_records: u32) -> Result<AnalyzeResponse, ApiError> {
        let (_, _) = self.enter(Call::Analyze(file.file_name, max_records));
        let fail = self.inner.lock().unwrap().fail_uploads;
        if fail {
            return Err(unavailable("/analyze"));
        }
        let records: Vec<RecordRow> = self
            .inner
            .lock()
            .unwrap()
            .rows
            .iter()
            .take(max_records as usize)
            .cloned()
            .collect();
        Ok(AnalyzeResponse {
            sample_size: records.len() as u64,
            records,
            ..AnalyzeResponse::default()
        })
    }
}
