//! Shared dashboard types for the probate filings dashboard
//!
//! This crate contains the serializable data model shared between the
//! orchestration core (probate-core) and any front end that renders it.
//! Nothing here performs I/O; mutation rules live in the core crate.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Filters
// ─────────────────────────────────────────────────────────────────────────────

/// Every constraint the dashboard can send to the query API.
///
/// Declaration order is the order parameters are serialized in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKey {
    Counties,
    PetitionTypes,
    Tiers,
    AbsenteeOnly,
    HasParcel,
    HasQpublic,
    HasValue,
    MinValue,
    MaxValue,
    MonthFrom,
    MonthTo,
    PropertyClass,
    DaysSincePetitionMin,
    DaysSincePetitionMax,
    DaysDeathToPetitionMin,
    DaysDeathToPetitionMax,
}

/// The value shape a filter key accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// OR-membership list
    List,
    /// Boolean flag
    Flag,
    /// Inclusive numeric bound
    Integer,
    /// Inclusive month bound, `YYYY-MM`
    Month,
    /// Free text scalar
    Text,
}

impl FilterKey {
    pub const ALL: [FilterKey; 16] = [
        FilterKey::Counties,
        FilterKey::PetitionTypes,
        FilterKey::Tiers,
        FilterKey::AbsenteeOnly,
        FilterKey::HasParcel,
        FilterKey::HasQpublic,
        FilterKey::HasValue,
        FilterKey::MinValue,
        FilterKey::MaxValue,
        FilterKey::MonthFrom,
        FilterKey::MonthTo,
        FilterKey::PropertyClass,
        FilterKey::DaysSincePetitionMin,
        FilterKey::DaysSincePetitionMax,
        FilterKey::DaysDeathToPetitionMin,
        FilterKey::DaysDeathToPetitionMax,
    ];

    /// Query parameter name sent to the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKey::Counties => "counties",
            FilterKey::PetitionTypes => "petition_types",
            FilterKey::Tiers => "tiers",
            FilterKey::AbsenteeOnly => "absentee_only",
            FilterKey::HasParcel => "has_parcel",
            FilterKey::HasQpublic => "has_qpublic",
            FilterKey::HasValue => "has_value",
            FilterKey::MinValue => "min_value",
            FilterKey::MaxValue => "max_value",
            FilterKey::MonthFrom => "month_from",
            FilterKey::MonthTo => "month_to",
            FilterKey::PropertyClass => "property_class",
            FilterKey::DaysSincePetitionMin => "days_since_petition_min",
            FilterKey::DaysSincePetitionMax => "days_since_petition_max",
            FilterKey::DaysDeathToPetitionMin => "days_death_to_petition_min",
            FilterKey::DaysDeathToPetitionMax => "days_death_to_petition_max",
        }
    }

    /// Look up a key by its query parameter name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }

    pub fn kind(&self) -> FilterKind {
        match self {
            FilterKey::Counties | FilterKey::PetitionTypes | FilterKey::Tiers => FilterKind::List,
            FilterKey::AbsenteeOnly
            | FilterKey::HasParcel
            | FilterKey::HasQpublic
            | FilterKey::HasValue => FilterKind::Flag,
            FilterKey::MinValue
            | FilterKey::MaxValue
            | FilterKey::DaysSincePetitionMin
            | FilterKey::DaysSincePetitionMax
            | FilterKey::DaysDeathToPetitionMin
            | FilterKey::DaysDeathToPetitionMax => FilterKind::Integer,
            FilterKey::MonthFrom | FilterKey::MonthTo => FilterKind::Month,
            FilterKey::PropertyClass => FilterKind::Text,
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single constraint value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    List(Vec<String>),
    Flag(bool),
    Integer(i64),
    Text(String),
}

impl FilterValue {
    /// Single-element membership list
    pub fn one(label: impl Into<String>) -> Self {
        FilterValue::List(vec![label.into()])
    }

    /// Wire representations, one entry per repeated query parameter
    pub fn query_values(&self) -> Vec<String> {
        match self {
            FilterValue::List(items) => items.clone(),
            FilterValue::Flag(b) => vec![b.to_string()],
            FilterValue::Integer(n) => vec![n.to_string()],
            FilterValue::Text(s) => vec![s.clone()],
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::List(items) => f.write_str(&items.join(", ")),
            FilterValue::Flag(b) => write!(f, "{b}"),
            FilterValue::Integer(n) => write!(f, "{n}"),
            FilterValue::Text(s) => f.write_str(s),
        }
    }
}

/// A set of key assignments and removals applied as one change.
/// `None` removes the key (an open-ended bound).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    pub entries: Vec<(FilterKey, Option<FilterValue>)>,
}

impl FilterPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: FilterKey, value: FilterValue) -> Self {
        self.entries.push((key, Some(value)));
        self
    }

    pub fn clear(mut self, key: FilterKey) -> Self {
        self.entries.push((key, None));
        self
    }

    /// Set `key` when a value is present, clear it otherwise
    pub fn bound(self, key: FilterKey, value: Option<i64>) -> Self {
        match value {
            Some(n) => self.set(key, FilterValue::Integer(n)),
            None => self.clear(key),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Immutable filter snapshot. An absent key imposes no constraint.
///
/// Every operation returns a new value so consumers can detect change by
/// equality and all dependent fetches observe one consistent snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filters {
    entries: BTreeMap<FilterKey, FilterValue>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: FilterKey) -> Option<&FilterValue> {
        self.entries.get(&key)
    }

    pub fn contains(&self, key: FilterKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterKey, &FilterValue)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    /// Copy with `key` assigned
    pub fn with(&self, key: FilterKey, value: FilterValue) -> Self {
        let mut entries = self.entries.clone();
        entries.insert(key, value);
        Self { entries }
    }

    /// Copy with `key` absent
    pub fn without(&self, key: FilterKey) -> Self {
        let mut entries = self.entries.clone();
        entries.remove(&key);
        Self { entries }
    }

    /// Copy with every patch entry applied in order
    pub fn apply(&self, patch: &FilterPatch) -> Self {
        let mut entries = self.entries.clone();
        for (key, value) in &patch.entries {
            match value {
                Some(v) => {
                    entries.insert(*key, v.clone());
                }
                None => {
                    entries.remove(key);
                }
            }
        }
        Self { entries }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sorting & Pagination
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// One column of a multi-column sort. Position in the list is priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortEntry {
    pub column: String,
    pub direction: SortDirection,
}

/// Server-reported pagination metadata. Displayed, never recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageMeta {
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageMeta {
    /// Whether the server honoured its own paging invariants
    pub fn is_consistent(&self) -> bool {
        if self.page_size == 0 {
            return false;
        }
        let expected_pages = self.total.div_ceil(u64::from(self.page_size));
        u64::from(self.total_pages) == expected_pages
            && self.has_next == (self.page < self.total_pages)
            && self.has_prev == (self.page > 1)
    }

    /// 1-based index range of the rows on this page, for "Showing a–b of n"
    pub fn row_span(&self) -> Option<(u64, u64)> {
        if self.total == 0 {
            return None;
        }
        let size = u64::from(self.page_size);
        let start = u64::from(self.page.saturating_sub(1)) * size + 1;
        let end = (u64::from(self.page) * size).min(self.total);
        Some((start, end))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Shortlist Records
// ─────────────────────────────────────────────────────────────────────────────

/// Text fields arrive as `null` as often as they are omitted
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// One filing record from the shortlist. The backend omits fields freely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordRow {
    pub score: Option<f64>,
    #[serde(deserialize_with = "null_as_empty")]
    pub tier: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub county: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub case_no: String,
    /// Decedent
    #[serde(deserialize_with = "null_as_empty")]
    pub owner_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub property_address: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub city: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub state: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub zip: String,
    /// Petitioner
    #[serde(deserialize_with = "null_as_empty")]
    pub party: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub mailing_address: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub petition_type: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub petition_date: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub death_date: String,
    pub absentee_flag: Option<bool>,
    pub days_since_petition: Option<i64>,
    pub days_since_death: Option<i64>,
    pub holdings_in_file: Option<i64>,
    pub property_value_2025: Option<f64>,
    pub parcel_number: Option<String>,
    pub qpublic_report_url: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub source_url: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub rationale: String,
}

/// One page of the shortlist as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShortlistPage {
    #[serde(default)]
    pub rows: Vec<RecordRow>,
    pub meta: PageMeta,
}

// ─────────────────────────────────────────────────────────────────────────────
// Normalized Chart Series
// ─────────────────────────────────────────────────────────────────────────────

/// Headline metric with a display-ready value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kpi {
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountySplit {
    pub county: String,
    pub absentee: u64,
    pub local: u64,
}

/// Per-county value statistic. The backend supplies an average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountyValue {
    pub county: String,
    pub average_value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCount {
    pub bucket: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetitionTypeCount {
    pub petition_type: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCount {
    pub property_class: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyHoldings {
    pub party: String,
    pub holdings: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCount {
    pub month: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthTiers {
    pub month: String,
    #[serde(default)]
    pub high: u64,
    #[serde(default)]
    pub med: u64,
    #[serde(default)]
    pub low: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthRate {
    pub month: String,
    pub rate: f64,
}

/// Stacked absentee/local split for one month, synthesized client-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSplit {
    pub month: String,
    pub absentee: u64,
    pub local: u64,
}

/// Canonical payload of one data source after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "series", rename_all = "snake_case")]
pub enum ChartData {
    Kpis(Vec<Kpi>),
    AbsenteeByCounty(Vec<CountySplit>),
    ValueByCounty(Vec<CountyValue>),
    Histogram(Vec<BucketCount>),
    PetitionTypes(Vec<PetitionTypeCount>),
    PropertyClassMix(Vec<ClassCount>),
    TopParties(Vec<PartyHoldings>),
    MonthlyCounts(Vec<MonthCount>),
    MonthlyTiers(Vec<MonthTiers>),
    MonthlyRates(Vec<MonthRate>),
}

impl ChartData {
    /// Number of points in the series
    pub fn len(&self) -> usize {
        match self {
            ChartData::Kpis(v) => v.len(),
            ChartData::AbsenteeByCounty(v) => v.len(),
            ChartData::ValueByCounty(v) => v.len(),
            ChartData::Histogram(v) => v.len(),
            ChartData::PetitionTypes(v) => v.len(),
            ChartData::PropertyClassMix(v) => v.len(),
            ChartData::TopParties(v) => v.len(),
            ChartData::MonthlyCounts(v) => v.len(),
            ChartData::MonthlyTiers(v) => v.len(),
            ChartData::MonthlyRates(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Thresholds & Analysis Preview
// ─────────────────────────────────────────────────────────────────────────────

/// Reference lines drawn over charts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub absentee_rate_target: f64,
    pub buybox_value_min: f64,
    pub buybox_value_max: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            absentee_rate_target: 0.6,
            buybox_value_min: 150_000.0,
            buybox_value_max: 450_000.0,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

fn default_api_base() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_page_size() -> u32 {
    25
}

fn default_export_max_rows() -> u32 {
    10_000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_analyze_max_records() -> u32 {
    200
}

/// Persisted dashboard settings. Missing fields fall back to defaults so
/// older config files keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Base URL of the query API, without trailing slash
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Shortlist rows per page (fixed for the session)
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Upper cap on rows fetched for a CSV export
    #[serde(default = "default_export_max_rows")]
    pub export_max_rows: u32,
    /// Per-request timeout for chart and shortlist fetches
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Sample size requested from the analysis preview endpoint
    #[serde(default = "default_analyze_max_records")]
    pub analyze_max_records: u32,
    #[serde(default)]
    pub thresholds: Thresholds,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            page_size: default_page_size(),
            export_max_rows: default_export_max_rows(),
            request_timeout_secs: default_request_timeout_secs(),
            analyze_max_records: default_analyze_max_records(),
            thresholds: Thresholds::default(),
        }
    }
}

/// Aggregates computed by the backend over an uploaded sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzeCharts {
    pub tiers: BTreeMap<String, u64>,
    pub top_counties: BTreeMap<String, u64>,
    pub petition_types: BTreeMap<String, u64>,
    pub by_month: Vec<MonthCount>,
    pub absentee_rate: f64,
}

/// Preview analysis of a file that has not been ingested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub records: Vec<RecordRow>,
    #[serde(default)]
    pub charts: AnalyzeCharts,
    #[serde(default)]
    pub sample_size: u64,
}
