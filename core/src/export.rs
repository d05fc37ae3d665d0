//! CSV export of the full filtered shortlist.
//!
//! The export re-issues the current shortlist request from page 1 with a
//! large page size and writes every returned row in a fixed column order,
//! independent of how the live table is arranged.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use csv::{QuoteStyle, WriterBuilder};
use thiserror::Error;

use probate_types::{Filters, RecordRow};

use crate::api::{ApiError, DashboardApi, ShortlistQuery};
use crate::sort::SortState;

pub const EXPORT_HEADERS: [&str; 23] = [
    "Score",
    "Tier",
    "County",
    "Case",
    "Owner",
    "Address",
    "City",
    "State",
    "ZIP",
    "Petitioner",
    "Mailing",
    "Petition Type",
    "Petition Date",
    "Death Date",
    "Absentee",
    "Days Since Petition",
    "Days Since Death",
    "Holdings",
    "Value",
    "Parcel",
    "qPublic",
    "Source",
    "Why",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to fetch rows for export")]
    Fetch(#[from] ApiError),

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Result of a finished export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub rows: usize,
    /// Matching records reported by the server
    pub total: u64,
}

impl ExportSummary {
    /// More records matched than the row cap allowed
    pub fn truncated(&self) -> bool {
        self.total > self.rows as u64
    }
}

/// `shortlist-YYYY-MM-DD.csv`
pub fn default_export_file_name(date: NaiveDate) -> String {
    format!("shortlist-{}.csv", date.format("%Y-%m-%d"))
}

/// Current filter and sort, first page, `max_rows` per page
pub fn export_query(filters: Arc<Filters>, sort: &SortState, max_rows: u32) -> ShortlistQuery {
    ShortlistQuery {
        filters,
        sort: sort.encode(),
        page: 1,
        page_size: max_rows,
    }
}

fn date_only(value: &str) -> &str {
    value.get(..10).unwrap_or(value)
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn record_fields(row: &RecordRow) -> [String; 23] {
    [
        opt(row.score),
        row.tier.clone(),
        row.county.clone(),
        row.case_no.clone(),
        row.owner_name.clone(),
        row.property_address.clone(),
        row.city.clone(),
        row.state.clone(),
        row.zip.clone(),
        row.party.clone(),
        row.mailing_address.clone(),
        row.petition_type.clone(),
        date_only(&row.petition_date).to_string(),
        date_only(&row.death_date).to_string(),
        row.absentee_flag
            .map(|b| if b { "Yes" } else { "No" }.to_string())
            .unwrap_or_default(),
        opt(row.days_since_petition),
        opt(row.days_since_death),
        opt(row.holdings_in_file),
        row.property_value_2025
            .map(|v| format!("{v:.0}"))
            .unwrap_or_default(),
        row.parcel_number.clone().unwrap_or_default(),
        row.qpublic_report_url.clone().unwrap_or_default(),
        row.source_url.clone(),
        row.rationale.clone(),
    ]
}

/// Write the header and `rows` with every field quoted.
pub fn write_csv<W: io::Write>(rows: &[RecordRow], writer: W) -> Result<(), csv::Error> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(writer);
    wtr.write_record(EXPORT_HEADERS)?;
    for row in rows {
        wtr.write_record(record_fields(row))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Fetch the export query and write the rows to `path`.
pub async fn export_shortlist<A: DashboardApi>(
    api: &A,
    query: &ShortlistQuery,
    path: &Path,
) -> Result<ExportSummary, ExportError> {
    let page = api.fetch_shortlist(query).await?;
    let summary = ExportSummary {
        path: path.to_path_buf(),
        rows: page.rows.len(),
        total: page.meta.total,
    };
    if summary.truncated() {
        tracing::warn!(
            rows = summary.rows,
            total = summary.total,
            "export truncated at row cap"
        );
    }

    let file = std::fs::File::create(path).map_err(|e| ExportError::Write {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    write_csv(&page.rows, file).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), rows = summary.rows, "exported shortlist");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_api::{Call, FakeApi, sample_row};
    use probate_types::{FilterKey, FilterValue};
    use tempfile::TempDir;

    fn full_row() -> RecordRow {
        RecordRow {
            score: Some(87.5),
            tier: "high".into(),
            county: "Fulton".into(),
            case_no: "2024-ES-0113".into(),
            owner_name: "Estate of Mary \"May\" Jones".into(),
            property_address: "12 Peachtree St".into(),
            city: "Atlanta".into(),
            state: "GA".into(),
            zip: "30303".into(),
            party: "Robert Jones".into(),
            mailing_address: "PO Box 9, Macon, GA".into(),
            petition_type: "Probate Will".into(),
            petition_date: "2024-03-14T00:00:00".into(),
            death_date: "2024-01-02".into(),
            absentee_flag: Some(true),
            days_since_petition: Some(181),
            days_since_death: Some(253),
            holdings_in_file: Some(2),
            property_value_2025: Some(248_000.0),
            parcel_number: Some("14-0021-0004".into()),
            qpublic_report_url: None,
            source_url: "https://example.org/case/113".into(),
            rationale: "absentee, in buy-box".into(),
        }
    }

    #[test]
    fn test_every_field_is_quoted_in_fixed_order() {
        let mut out = Vec::new();
        write_csv(&[full_row()], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();

        let header = lines.next().unwrap();
        assert!(header.starts_with("\"Score\",\"Tier\",\"County\",\"Case\""));
        assert!(header.ends_with("\"qPublic\",\"Source\",\"Why\""));

        let row = lines.next().unwrap();
        assert!(row.starts_with("\"87.5\",\"high\",\"Fulton\",\"2024-ES-0113\""));
        assert!(row.contains("\"Estate of Mary \"\"May\"\" Jones\""));
        assert!(row.contains("\"2024-03-14\",\"2024-01-02\",\"Yes\",\"181\",\"253\",\"2\",\"248000\""));
        assert!(row.contains("\"14-0021-0004\",\"\",\"https://example.org/case/113\""));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_missing_optionals_are_empty() {
        let mut out = Vec::new();
        write_csv(&[RecordRow::default()], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert_eq!(row, vec!["\"\""; 23].join(","));
    }

    #[test]
    fn test_default_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(default_export_file_name(date), "shortlist-2024-03-09.csv");
    }

    #[test]
    fn test_export_query_starts_at_page_one() {
        let mut sort = SortState::new();
        sort.toggle("value");
        let query = export_query(Arc::new(Filters::new()), &sort, 10_000);
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, 10_000);
        assert_eq!(query.sort, "property_value_2025:asc");
    }

    #[tokio::test]
    async fn test_export_writes_all_matching_rows() {
        let api = FakeApi::with_rows(30);
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let filters = Arc::new(Filters::new().with(FilterKey::Counties, FilterValue::one("Cobb")));
        let query = export_query(filters, &SortState::new(), 10_000);

        let summary = export_shortlist(&api, &query, &path).await.unwrap();
        assert_eq!(summary.rows, 10);
        assert!(!summary.truncated());

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 11);
        assert!(matches!(&api.calls()[0], Call::Shortlist(q) if q.page == 1));
    }

    #[tokio::test]
    async fn test_export_reports_truncation() {
        let api = FakeApi::new();
        api.set_rows((0..12).map(sample_row).collect());
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("capped.csv");
        let query = export_query(Arc::new(Filters::new()), &SortState::new(), 5);

        let summary = export_shortlist(&api, &query, &path).await.unwrap();
        assert_eq!((summary.rows, summary.total), (5, 12));
        assert!(summary.truncated());
    }

    #[tokio::test]
    async fn test_failed_fetch_writes_nothing() {
        let api = FakeApi::with_rows(3);
        api.fail(crate::sources::SourceId::Shortlist, true);
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("never.csv");
        let query = export_query(Arc::new(Filters::new()), &SortState::new(), 100);

        let err = export_shortlist(&api, &query, &path).await.unwrap_err();
        assert!(matches!(err, ExportError::Fetch(_)));
        assert!(!path.exists());
    }
}
