//! Multi-column shortlist sort with three-state header toggling.

use phf::phf_map;

pub use probate_types::{SortDirection, SortEntry};

/// Client column ids whose backend column has a different name.
/// Columns not listed are sent unchanged.
static BACKEND_COLUMNS: phf::Map<&'static str, &'static str> = phf_map! {
    "case" => "case_no",
    "owner" => "owner_name",
    "address" => "property_address",
    "petitioner" => "party",
    "mailing" => "mailing_address",
    "value" => "property_value_2025",
    "absentee" => "absentee_flag",
    "holdings" => "holdings_in_file",
    "parcel" => "parcel_number",
    "qpublic" => "qpublic_report_url",
    "why" => "rationale",
};

/// Column ids the shortlist table exposes as sortable headers
pub const SORTABLE_COLUMNS: &[&str] = &[
    "score",
    "tier",
    "county",
    "case",
    "owner",
    "address",
    "city",
    "petitioner",
    "mailing",
    "petition_type",
    "petition_date",
    "death_date",
    "days_since_petition",
    "days_since_death",
    "holdings",
    "value",
    "absentee",
    "parcel",
    "qpublic",
    "why",
];

/// Backend column for a client-visible column id
pub fn backend_column(column: &str) -> &str {
    BACKEND_COLUMNS.get(column).copied().unwrap_or(column)
}

pub fn is_sortable(column: &str) -> bool {
    SORTABLE_COLUMNS.contains(&column)
}

/// What a header click did to the sort
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortToggle {
    /// Inserted ascending at priority 0
    Added,
    /// Direction flipped to descending, priority unchanged
    Descending,
    /// Removed; remaining columns keep their relative order
    Removed,
}

/// Ordered sort specification. Index 0 is the primary key; a column appears
/// at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    entries: Vec<SortEntry>,
}

impl SortState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[SortEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Priority and direction of `column`, if sorted on
    pub fn position(&self, column: &str) -> Option<(usize, SortDirection)> {
        self.entries
            .iter()
            .enumerate()
            .find(|(_, e)| e.column == column)
            .map(|(i, e)| (i, e.direction))
    }

    /// Advance `column` through absent → asc → desc → absent.
    pub fn toggle(&mut self, column: &str) -> SortToggle {
        match self.position(column) {
            None => {
                self.entries.insert(
                    0,
                    SortEntry {
                        column: column.to_string(),
                        direction: SortDirection::Asc,
                    },
                );
                SortToggle::Added
            }
            Some((idx, SortDirection::Asc)) => {
                self.entries[idx].direction = SortDirection::Desc;
                SortToggle::Descending
            }
            Some((idx, SortDirection::Desc)) => {
                self.entries.remove(idx);
                SortToggle::Removed
            }
        }
    }

    /// Wire format: `col:dir` pairs in priority order, comma-joined, with
    /// client columns translated to backend names.
    pub fn encode(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{}:{}", backend_column(&e.column), e.direction.as_str()))
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_clicks_cycle_back_to_absent() {
        let mut sort = SortState::new();

        assert_eq!(sort.toggle("score"), SortToggle::Added);
        assert_eq!(sort.position("score"), Some((0, SortDirection::Asc)));

        assert_eq!(sort.toggle("score"), SortToggle::Descending);
        assert_eq!(sort.position("score"), Some((0, SortDirection::Desc)));

        assert_eq!(sort.toggle("score"), SortToggle::Removed);
        assert!(sort.is_empty());
    }

    #[test]
    fn test_new_column_takes_priority_zero() {
        let mut sort = SortState::new();
        sort.toggle("score");
        sort.toggle("score");
        sort.toggle("county");

        assert_eq!(sort.position("county"), Some((0, SortDirection::Asc)));
        // The first column shifted down but kept its direction
        assert_eq!(sort.position("score"), Some((1, SortDirection::Desc)));
    }

    #[test]
    fn test_secondary_column_flips_in_place() {
        let mut sort = SortState::new();
        sort.toggle("score");
        sort.toggle("county");

        assert_eq!(sort.toggle("score"), SortToggle::Descending);
        assert_eq!(sort.position("score"), Some((1, SortDirection::Desc)));
        assert_eq!(sort.position("county"), Some((0, SortDirection::Asc)));
    }

    #[test]
    fn test_removal_keeps_relative_order() {
        let mut sort = SortState::new();
        sort.toggle("a");
        sort.toggle("b");
        sort.toggle("c");
        // c, b, a
        sort.toggle("b");
        sort.toggle("b");

        let columns: Vec<_> = sort.entries().iter().map(|e| e.column.as_str()).collect();
        assert_eq!(columns, vec!["c", "a"]);
    }

    #[test]
    fn test_encode_translates_columns() {
        let mut sort = SortState::new();
        sort.toggle("score");
        sort.toggle("value");
        sort.toggle("value");

        assert_eq!(sort.encode(), "property_value_2025:desc,score:asc");
        assert_eq!(SortState::new().encode(), "");
    }

    #[test]
    fn test_backend_column_passthrough() {
        assert_eq!(backend_column("owner"), "owner_name");
        assert_eq!(backend_column("petition_date"), "petition_date");
        assert!(is_sortable("value"));
        assert!(!is_sortable("property_value_2025"));
    }
}
