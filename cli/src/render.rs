//! Plain-text rendering of dashboard state for the REPL.

use std::fmt::Write;

use probate_core::normalize::bucket_for;
use probate_core::{
    ChartData, ChartSource, FilterKey, Filters, Kpi, MonthSplit, PageMeta, RecordRow, SortState,
    SourceSlot, Thresholds,
};

const BAR_WIDTH: u64 = 30;

fn bar(value: u64, max: u64) -> String {
    if max == 0 {
        return String::new();
    }
    "█".repeat(((value * BAR_WIDTH).div_ceil(max)) as usize)
}

pub fn money(value: f64) -> String {
    let whole = value.round() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if whole < 0 { format!("-${out}") } else { format!("${out}") }
}

pub fn kpis(items: &[Kpi]) -> String {
    let mut out = String::new();
    for kpi in items {
        let _ = write!(out, "{:<28} {:>12}", kpi.label, kpi.value);
        if let Some(hint) = &kpi.hint {
            let _ = write!(out, "  ({hint})");
        }
        out.push('\n');
    }
    out
}

/// One labeled count per line with a proportional bar
fn counts<'a>(rows: impl Iterator<Item = (&'a str, u64)> + Clone) -> String {
    let max = rows.clone().map(|(_, n)| n).max().unwrap_or(0);
    let mut out = String::new();
    for (i, (label, n)) in rows.enumerate() {
        let _ = writeln!(out, "{i:>3}  {label:<24} {n:>7}  {}", bar(n, max));
    }
    out
}

/// Chart body, with the reference lines that apply to it
pub fn chart(source: ChartSource, data: &ChartData, thresholds: &Thresholds) -> String {
    if data.is_empty() {
        return "(no data)\n".to_string();
    }
    let mut out = match data {
        ChartData::Kpis(items) => kpis(items),
        ChartData::AbsenteeByCounty(rows) => {
            counts(rows.iter().map(|r| (r.county.as_str(), r.absentee + r.local)))
        }
        ChartData::ValueByCounty(rows) => {
            let mut out = String::new();
            for (i, r) in rows.iter().enumerate() {
                let _ = writeln!(out, "{i:>3}  {:<24} {:>12}", r.county, money(r.average_value));
            }
            out
        }
        ChartData::Histogram(rows) => counts(rows.iter().map(|r| (r.bucket.as_str(), r.count))),
        ChartData::PetitionTypes(rows) => {
            counts(rows.iter().map(|r| (r.petition_type.as_str(), r.count)))
        }
        ChartData::PropertyClassMix(rows) => {
            counts(rows.iter().map(|r| (r.property_class.as_str(), r.count)))
        }
        ChartData::TopParties(rows) => counts(rows.iter().map(|r| (r.party.as_str(), r.holdings))),
        ChartData::MonthlyCounts(rows) => counts(rows.iter().map(|r| (r.month.as_str(), r.count))),
        ChartData::MonthlyTiers(rows) => {
            let mut out = format!("{:>3}  {:<8} {:>6} {:>6} {:>6}\n", "", "month", "high", "med", "low");
            for (i, r) in rows.iter().enumerate() {
                let _ = writeln!(out, "{i:>3}  {:<8} {:>6} {:>6} {:>6}", r.month, r.high, r.med, r.low);
            }
            out
        }
        ChartData::MonthlyRates(rows) => {
            let mut out = String::new();
            for (i, r) in rows.iter().enumerate() {
                let _ = writeln!(out, "{i:>3}  {:<8} {:>5.1}%", r.month, r.rate * 100.0);
            }
            out
        }
    };

    match source {
        ChartSource::AbsenteeRateTrend => {
            let _ = writeln!(out, "target: {:.0}%", thresholds.absentee_rate_target * 100.0);
        }
        ChartSource::AverageValueByCounty | ChartSource::ValueHist => {
            let _ = writeln!(
                out,
                "buy-box: {} – {}",
                money(thresholds.buybox_value_min),
                money(thresholds.buybox_value_max)
            );
        }
        _ => {}
    }
    out
}

pub fn absentee_split(rows: &[MonthSplit]) -> String {
    if rows.is_empty() {
        return "(no data)\n".to_string();
    }
    let mut out = format!("{:<8} {:>8} {:>8}\n", "month", "absentee", "local");
    for r in rows {
        let _ = writeln!(out, "{:<8} {:>8} {:>8}", r.month, r.absentee, r.local);
    }
    out
}

/// Status line for a source: loading / error / last good data
pub fn slot_status<T>(slot: &SourceSlot<T>) -> String {
    let mut parts = Vec::new();
    if slot.is_loading() {
        parts.push("loading".to_string());
    }
    if let Some(err) = slot.error() {
        parts.push(format!("error: {err}"));
    }
    if slot.data().is_none() && slot.error().is_none() && !slot.is_loading() {
        parts.push("not loaded".to_string());
    }
    parts.join(", ")
}

/// One `show` line: source name, dispatch count and status
pub fn slot_line<T>(name: &str, slot: &SourceSlot<T>) -> String {
    let mut status = slot_status(slot);
    if status.is_empty() {
        status.push_str("ok");
    }
    format!("  {name:<30} #{:<4} {status}", slot.generation())
}

pub fn filters(filters: &Filters) -> String {
    if filters.is_empty() {
        return "(no filters)\n".to_string();
    }
    let mut out = String::new();
    for (key, value) in filters.iter() {
        let _ = writeln!(out, "{:<28} {value}", key.as_str());
    }
    out
}

pub fn filter_keys(current: &Filters) -> String {
    let mut out = String::new();
    for key in FilterKey::ALL {
        let value = current.get(key).map(ToString::to_string).unwrap_or_default();
        let _ = writeln!(out, "{:<28} {:<8} {value}", key.as_str(), format!("{:?}", key.kind()).to_lowercase());
    }
    out
}

pub fn sort(sort: &SortState) -> String {
    if sort.is_empty() {
        return "(unsorted)".to_string();
    }
    sort.entries()
        .iter()
        .map(|e| format!("{} {}", e.column, e.direction.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn page_line(meta: &PageMeta) -> String {
    match meta.row_span() {
        Some((start, end)) => format!(
            "Showing {start}–{end} of {} · page {}/{}",
            meta.total, meta.page, meta.total_pages
        ),
        None => "No matching records".to_string(),
    }
}

fn cell(value: &str, width: usize) -> String {
    let shown: String = value.chars().take(width).collect();
    format!("{shown:<width$}")
}

pub fn rows(rows: &[RecordRow]) -> String {
    let mut out = format!(
        "{:>5} {:<5} {:<10} {:<14} {:<24} {:>12} {:<8} {:<3}\n",
        "score", "tier", "county", "case", "owner", "value", "bucket", "abs"
    );
    for r in rows {
        let score = r.score.map(|s| format!("{s:.1}")).unwrap_or_default();
        let value = r.property_value_2025.map(money).unwrap_or_default();
        let bucket = r.property_value_2025.and_then(bucket_for).unwrap_or("");
        let absentee = match r.absentee_flag {
            Some(true) => "Yes",
            Some(false) => "No",
            None => "",
        };
        let _ = writeln!(
            out,
            "{score:>5} {} {} {} {} {value:>12} {} {absentee:<3}",
            cell(&r.tier, 5),
            cell(&r.county, 10),
            cell(&r.case_no, 14),
            cell(&r.owner_name, 24),
            cell(bucket, 8),
        );
    }
    out
}
