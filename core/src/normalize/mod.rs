//! Response normalization: raw API JSON → canonical chart series.
//!
//! Each source has one pure transform, chosen from a fixed table. Every
//! transform first unwraps the single-element array some endpoints return
//! instead of a bare object. A missing series key yields an empty series so
//! the chart renders empty rather than failing.

mod buckets;
mod derived;
mod error;
mod kpi;

pub use buckets::{VALUE_BUCKETS, bucket_for, bucket_range};
pub use derived::absentee_split;
pub use error::NormalizeError;
pub use kpi::format_kpi_value;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use probate_types::{
    BucketCount, ChartData, ClassCount, CountySplit, CountyValue, Kpi, MonthCount, MonthRate,
    MonthTiers, PartyHoldings, PetitionTypeCount,
};

use crate::sources::ChartSource;

type Transform = fn(ChartSource, &Map<String, Value>) -> Result<ChartData, NormalizeError>;

// ─────────────────────────────────────────────────────────────────────────────
// Raw Payload Rows
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RawKpi {
    label: String,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    hint: Option<String>,
}

#[derive(Deserialize)]
struct RawCountyCount {
    county: String,
    count: u64,
}

#[derive(Deserialize)]
struct RawCountyAverage {
    county: String,
    average_value: f64,
}

#[derive(Deserialize)]
struct RawBin {
    bin: String,
    count: u64,
}

#[derive(Deserialize)]
struct RawPartyCount {
    party: String,
    count: u64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Entry Point
// ─────────────────────────────────────────────────────────────────────────────

/// Normalize one raw payload for `source`.
pub fn normalize(source: ChartSource, raw: Value) -> Result<ChartData, NormalizeError> {
    let map = match unwrap_single(raw) {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        _ => return Err(NormalizeError::NotAnObject { chart: source }),
    };
    transform_for(source)(source, &map)
}

/// `[obj]` → `obj`. An empty array becomes null; anything else is returned
/// unchanged.
pub fn unwrap_single(raw: Value) -> Value {
    match raw {
        Value::Array(items) => {
            if items.len() > 1 {
                tracing::debug!(len = items.len(), "array payload, using first element");
            }
            items.into_iter().next().unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn transform_for(source: ChartSource) -> Transform {
    match source {
        ChartSource::Kpis => kpis,
        ChartSource::PropertyClassMix => class_mix,
        ChartSource::CountByCounty => absentee_by_county,
        ChartSource::AverageValueByCounty => value_by_county,
        ChartSource::DaysSincePetition | ChartSource::DaysDeathToPetition => binned,
        ChartSource::PetitionTypes => petition_types,
        ChartSource::Parties => top_parties,
        ChartSource::FilingsByMonth => monthly_counts,
        ChartSource::FilingsByMonthTiered => monthly_tiers,
        ChartSource::AbsenteeRateTrend => monthly_rates,
        ChartSource::ValueHist => value_hist,
    }
}

/// Deserialize the series under the source's response key.
fn series<T: DeserializeOwned>(
    source: ChartSource,
    map: &Map<String, Value>,
) -> Result<Vec<T>, NormalizeError> {
    let field = source.response_key();
    match map.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(v) => Vec::<T>::deserialize(v).map_err(|cause| NormalizeError::Shape {
            chart: source,
            field,
            cause,
        }),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Per-Source Transforms
// ─────────────────────────────────────────────────────────────────────────────

fn kpis(source: ChartSource, map: &Map<String, Value>) -> Result<ChartData, NormalizeError> {
    let raw: Vec<RawKpi> = series(source, map)?;
    Ok(ChartData::Kpis(
        raw.into_iter()
            .map(|k| Kpi {
                value: format_kpi_value(&k.label, &k.value),
                label: k.label,
                hint: k.hint.filter(|h| !h.is_empty()),
            })
            .collect(),
    ))
}

/// The backend only reports a count per county; it is shown as the
/// absentee bar with an empty local bar.
fn absentee_by_county(
    source: ChartSource,
    map: &Map<String, Value>,
) -> Result<ChartData, NormalizeError> {
    let raw: Vec<RawCountyCount> = series(source, map)?;
    Ok(ChartData::AbsenteeByCounty(
        raw.into_iter()
            .map(|c| CountySplit {
                county: c.county,
                absentee: c.count,
                local: 0,
            })
            .collect(),
    ))
}

fn value_by_county(
    source: ChartSource,
    map: &Map<String, Value>,
) -> Result<ChartData, NormalizeError> {
    let raw: Vec<RawCountyAverage> = series(source, map)?;
    Ok(ChartData::ValueByCounty(
        raw.into_iter()
            .map(|c| CountyValue {
                county: c.county,
                average_value: c.average_value,
            })
            .collect(),
    ))
}

fn binned(source: ChartSource, map: &Map<String, Value>) -> Result<ChartData, NormalizeError> {
    let raw: Vec<RawBin> = series(source, map)?;
    Ok(ChartData::Histogram(
        raw.into_iter()
            .map(|b| BucketCount {
                bucket: b.bin,
                count: b.count,
            })
            .collect(),
    ))
}

fn top_parties(source: ChartSource, map: &Map<String, Value>) -> Result<ChartData, NormalizeError> {
    let raw: Vec<RawPartyCount> = series(source, map)?;
    Ok(ChartData::TopParties(
        raw.into_iter()
            .map(|p| PartyHoldings {
                party: p.party,
                holdings: p.count,
            })
            .collect(),
    ))
}

// Sources whose rows already have the canonical shape

fn class_mix(source: ChartSource, map: &Map<String, Value>) -> Result<ChartData, NormalizeError> {
    Ok(ChartData::PropertyClassMix(series(source, map)?))
}

fn petition_types(
    source: ChartSource,
    map: &Map<String, Value>,
) -> Result<ChartData, NormalizeError> {
    Ok(ChartData::PetitionTypes(series(source, map)?))
}

fn monthly_counts(
    source: ChartSource,
    map: &Map<String, Value>,
) -> Result<ChartData, NormalizeError> {
    Ok(ChartData::MonthlyCounts(series(source, map)?))
}

fn monthly_tiers(
    source: ChartSource,
    map: &Map<String, Value>,
) -> Result<ChartData, NormalizeError> {
    Ok(ChartData::MonthlyTiers(series(source, map)?))
}

fn monthly_rates(
    source: ChartSource,
    map: &Map<String, Value>,
) -> Result<ChartData, NormalizeError> {
    Ok(ChartData::MonthlyRates(series(source, map)?))
}

fn value_hist(source: ChartSource, map: &Map<String, Value>) -> Result<ChartData, NormalizeError> {
    Ok(ChartData::Histogram(series(source, map)?))
}

// ─────────────────────────────────────────────────────────────────────────────
// Typed Accessors
// ─────────────────────────────────────────────────────────────────────────────

pub fn as_monthly_counts(data: &ChartData) -> Option<&[MonthCount]> {
    match data {
        ChartData::MonthlyCounts(v) => Some(v),
        _ => None,
    }
}

pub fn as_monthly_rates(data: &ChartData) -> Option<&[MonthRate]> {
    match data {
        ChartData::MonthlyRates(v) => Some(v),
        _ => None,
    }
}

pub fn as_class_mix(data: &ChartData) -> Option<&[ClassCount]> {
    match data {
        ChartData::PropertyClassMix(v) => Some(v),
        _ => None,
    }
}

pub fn as_kpis(data: &ChartData) -> Option<&[Kpi]> {
    match data {
        ChartData::Kpis(v) => Some(v),
        _ => None,
    }
}

pub fn as_tiers(data: &ChartData) -> Option<&[MonthTiers]> {
    match data {
        ChartData::MonthlyTiers(v) => Some(v),
        _ => None,
    }
}

pub fn as_petition_types(data: &ChartData) -> Option<&[PetitionTypeCount]> {
    match data {
        ChartData::PetitionTypes(v) => Some(v),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kpis_are_formatted() {
        let raw = json!({"kpis": [
            {"label": "Total Records", "value": 640},
            {"label": "Absentee %", "value": 0.61},
            {"label": "Median Value", "value": "$248k", "hint": "buy-box"}
        ]});
        let data = normalize(ChartSource::Kpis, raw).unwrap();
        let kpis = as_kpis(&data).unwrap();

        assert_eq!(kpis[0].value, "640");
        assert_eq!(kpis[1].value, "61%");
        assert_eq!(kpis[2].hint.as_deref(), Some("buy-box"));
    }

    #[test]
    fn test_single_element_array_is_unwrapped() {
        let inner = json!({"averageValueByCounty": [
            {"county": "Fulton", "average_value": 410000.0}
        ]});
        let wrapped = normalize(ChartSource::AverageValueByCounty, json!([inner.clone()])).unwrap();
        let bare = normalize(ChartSource::AverageValueByCounty, inner).unwrap();

        assert_eq!(wrapped, bare);
        assert_eq!(
            wrapped,
            ChartData::ValueByCounty(vec![CountyValue {
                county: "Fulton".into(),
                average_value: 410000.0
            }])
        );
    }

    #[test]
    fn test_county_counts_become_absentee_bars() {
        let raw = json!({"countByCounty": [
            {"county": "Fulton", "count": 92},
            {"county": "DeKalb", "count": 81}
        ]});
        let data = normalize(ChartSource::CountByCounty, raw).unwrap();
        assert_eq!(
            data,
            ChartData::AbsenteeByCounty(vec![
                CountySplit { county: "Fulton".into(), absentee: 92, local: 0 },
                CountySplit { county: "DeKalb".into(), absentee: 81, local: 0 },
            ])
        );
    }

    #[test]
    fn test_bins_are_renamed_to_buckets() {
        let raw = json!({"daysDeathToPetitionHist": [{"bin": "0–30", "count": 24}]});
        let data = normalize(ChartSource::DaysDeathToPetition, raw).unwrap();
        assert_eq!(
            data,
            ChartData::Histogram(vec![BucketCount { bucket: "0–30".into(), count: 24 }])
        );
    }

    #[test]
    fn test_parties_become_holdings() {
        let raw = json!({"parties": [{"party": "Jones Group", "count": 5}]});
        let data = normalize(ChartSource::Parties, raw).unwrap();
        assert_eq!(
            data,
            ChartData::TopParties(vec![PartyHoldings { party: "Jones Group".into(), holdings: 5 }])
        );
    }

    #[test]
    fn test_missing_key_and_empty_array_yield_empty_series() {
        let data = normalize(ChartSource::ValueHist, json!({})).unwrap();
        assert_eq!(data, ChartData::Histogram(vec![]));

        let data = normalize(ChartSource::AverageValueByCounty, json!([])).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn test_wrong_shape_is_an_error() {
        let err = normalize(ChartSource::PetitionTypes, json!({"petitionTypes": {"x": 1}}))
            .unwrap_err();
        assert!(matches!(err, NormalizeError::Shape { field: "petitionTypes", .. }));

        let err = normalize(ChartSource::Kpis, json!("oops")).unwrap_err();
        assert!(matches!(err, NormalizeError::NotAnObject { chart: ChartSource::Kpis }));
    }

    #[test]
    fn test_monthly_series_pass_through() {
        let raw = json!({"filingsByMonthTiered": [
            {"month": "2024-01", "high": 14, "med": 19, "low": 9}
        ]});
        let data = normalize(ChartSource::FilingsByMonthTiered, raw).unwrap();
        let tiers = as_tiers(&data).unwrap();
        assert_eq!(tiers[0].high + tiers[0].med + tiers[0].low, 42);

        let raw = json!({"petitionTypes": [{"petition_type": "Probate Will", "count": 97}]});
        let data = normalize(ChartSource::PetitionTypes, raw).unwrap();
        assert_eq!(as_petition_types(&data).unwrap()[0].count, 97);
    }
}
