//! Value histogram buckets.
//!
//! The same ordered table labels histogram bars and maps a clicked bar back
//! to a `[min, max)` value range.

/// `(label, min, max)`; `None` max is open-ended
pub const VALUE_BUCKETS: [(&str, i64, Option<i64>); 5] = [
    ("<100k", 0, Some(100_000)),
    ("100–250k", 100_000, Some(250_000)),
    ("250–500k", 250_000, Some(500_000)),
    ("500k–1M", 500_000, Some(1_000_000)),
    ("1M+", 1_000_000, None),
];

/// Range for a bucket label. ASCII hyphens are accepted for en dashes.
pub fn bucket_range(label: &str) -> Option<(i64, Option<i64>)> {
    let label = label.trim().replace('-', "–");
    VALUE_BUCKETS
        .iter()
        .find(|(name, _, _)| *name == label)
        .map(|&(_, min, max)| (min, max))
}

/// Label of the bucket containing `value`
pub fn bucket_for(value: f64) -> Option<&'static str> {
    VALUE_BUCKETS
        .iter()
        .find(|(_, min, max)| value >= *min as f64 && max.is_none_or(|m| value < m as f64))
        .map(|(name, _, _)| *name)
}
