//! Canonical filter state shared by every data source.
//!
//! The current snapshot is held behind an `Arc` and replaced wholesale on
//! each change, so in-flight fetches keep the snapshot they were issued with.

use std::sync::Arc;

use thiserror::Error;

pub use probate_types::{FilterKey, FilterKind, FilterPatch, FilterValue, Filters};

/// Errors raised when a filter value does not fit its key
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("unknown filter '{name}'")]
    UnknownKey { name: String },

    #[error("filter {key} expects a {expected} value")]
    KindMismatch {
        key: FilterKey,
        expected: &'static str,
    },

    #[error("filter {key} needs at least one value")]
    EmptyValue { key: FilterKey },

    #[error("filter {key}: '{value}' is not a YYYY-MM month")]
    InvalidMonth { key: FilterKey, value: String },

    #[error("filter {key}: '{value}' is not a number")]
    InvalidNumber { key: FilterKey, value: String },

    #[error("filter {key}: '{value}' is not true or false")]
    InvalidFlag { key: FilterKey, value: String },
}

fn kind_name(kind: FilterKind) -> &'static str {
    match kind {
        FilterKind::List => "list",
        FilterKind::Flag => "boolean",
        FilterKind::Integer => "integer",
        FilterKind::Month => "YYYY-MM",
        FilterKind::Text => "text",
    }
}

/// True for `YYYY-MM` with a month in 01..=12
pub fn is_month_label(label: &str) -> bool {
    let bytes = label.as_bytes();
    if bytes.len() != 7 || bytes[4] != b'-' {
        return false;
    }
    if !bytes[..4].iter().chain(&bytes[5..]).all(u8::is_ascii_digit) {
        return false;
    }
    matches!(label[5..].parse::<u8>(), Ok(1..=12))
}

/// Check that `value` has the shape `key` accepts.
pub fn validate(key: FilterKey, value: &FilterValue) -> Result<(), FilterError> {
    let kind = key.kind();
    let mismatch = || FilterError::KindMismatch {
        key,
        expected: kind_name(kind),
    };
    match (kind, value) {
        (FilterKind::List, FilterValue::List(items)) => {
            if items.is_empty() || items.iter().any(|s| s.trim().is_empty()) {
                return Err(FilterError::EmptyValue { key });
            }
            Ok(())
        }
        (FilterKind::Flag, FilterValue::Flag(_)) => Ok(()),
        (FilterKind::Integer, FilterValue::Integer(_)) => Ok(()),
        (FilterKind::Month, FilterValue::Text(s)) => {
            if is_month_label(s) {
                Ok(())
            } else {
                Err(FilterError::InvalidMonth {
                    key,
                    value: s.clone(),
                })
            }
        }
        (FilterKind::Text, FilterValue::Text(s)) => {
            if s.trim().is_empty() {
                Err(FilterError::EmptyValue { key })
            } else {
                Ok(())
            }
        }
        _ => Err(mismatch()),
    }
}

/// Build a value for `key` from user-entered words.
///
/// List keys take each word (comma-separated words are split too); flags
/// accept true/false/yes/no/1/0; text joins the words with spaces.
pub fn parse_value(key: FilterKey, words: &[String]) -> Result<FilterValue, FilterError> {
    let joined = words.join(" ");
    let value = match key.kind() {
        FilterKind::List => FilterValue::List(
            words
                .iter()
                .flat_map(|w| w.split(','))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        ),
        FilterKind::Flag => match joined.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => FilterValue::Flag(true),
            "false" | "no" | "0" => FilterValue::Flag(false),
            _ => return Err(FilterError::InvalidFlag { key, value: joined }),
        },
        FilterKind::Integer => {
            let n = joined
                .trim()
                .replace('_', "")
                .parse::<i64>()
                .map_err(|_| FilterError::InvalidNumber {
                    key,
                    value: joined.clone(),
                })?;
            FilterValue::Integer(n)
        }
        FilterKind::Month | FilterKind::Text => FilterValue::Text(joined.trim().to_string()),
    };
    validate(key, &value)?;
    Ok(value)
}

/// Owner of the current filter snapshot.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    current: Arc<Filters>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The snapshot every dispatch should be issued with
    pub fn snapshot(&self) -> Arc<Filters> {
        Arc::clone(&self.current)
    }

    /// Replace the snapshot with one where `key` is assigned
    pub fn set(&mut self, key: FilterKey, value: FilterValue) -> Result<Arc<Filters>, FilterError> {
        validate(key, &value)?;
        self.current = Arc::new(self.current.with(key, value));
        Ok(self.snapshot())
    }

    /// Replace the snapshot with one where `key` is absent
    pub fn clear(&mut self, key: FilterKey) -> Arc<Filters> {
        self.current = Arc::new(self.current.without(key));
        self.snapshot()
    }

    pub fn clear_all(&mut self) -> Arc<Filters> {
        self.current = Arc::new(Filters::new());
        self.snapshot()
    }

    /// Apply a multi-key patch as a single replacement. Nothing changes if
    /// any entry is invalid.
    pub fn apply(&mut self, patch: &FilterPatch) -> Result<Arc<Filters>, FilterError> {
        for (key, value) in &patch.entries {
            if let Some(v) = value {
                validate(*key, v)?;
            }
        }
        self.current = Arc::new(self.current.apply(patch));
        Ok(self.snapshot())
    }
}
