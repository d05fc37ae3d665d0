//! Drill-down routing: chart interactions → filter patches.
//!
//! Every chart interaction arrives as one `ChartEvent`. Routing is pure; the
//! dashboard applies the resulting patch through `FilterState` so the usual
//! reset/re-dispatch cascade follows. Labels that cannot be mapped produce
//! no patch and are otherwise ignored.

use probate_types::{ClassCount, FilterKey, FilterPatch, FilterValue};

use crate::filter::is_month_label;
use crate::normalize::bucket_range;

/// A user interaction with a chart element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartEvent {
    /// County bar clicked (either county chart)
    County(String),
    /// Month on a time axis clicked
    Month(String),
    /// Petition type bar clicked
    PetitionType(String),
    /// Property value histogram bucket clicked
    ValueBucket(String),
    /// Property class pie slice clicked, by slice index
    ClassSlice(usize),
    /// Days-since-petition histogram bucket clicked
    DaysSincePetition(String),
    /// Death-to-petition delay histogram bucket clicked
    DaysDeathToPetition(String),
    /// "Show absentee only" quick action
    AbsenteeOnly,
}

/// Parse a numeric bucket label into `(min, max)`.
///
/// `"181–365"` / `"181-365"` → `(181, Some(365))`; `"365+"` or `">365"` →
/// `(365, None)`. Anything else is `None`.
pub fn parse_range_label(label: &str) -> Option<(i64, Option<i64>)> {
    let label = label.trim();

    if let Some(head) = label.strip_suffix('+') {
        return head.trim().parse().ok().map(|n| (n, None));
    }
    if let Some(tail) = label.strip_prefix('>') {
        let tail = tail.strip_prefix('=').unwrap_or(tail);
        return tail.trim().parse().ok().map(|n| (n, None));
    }

    let (lo, hi) = label.split_once(['–', '-'])?;
    let lo: i64 = lo.trim().parse().ok()?;
    let hi: i64 = hi.trim().parse().ok()?;
    (lo <= hi).then_some((lo, Some(hi)))
}

fn range_patch(min_key: FilterKey, max_key: FilterKey, range: (i64, Option<i64>)) -> FilterPatch {
    FilterPatch::new()
        .bound(min_key, Some(range.0))
        .bound(max_key, range.1)
}

pub struct DrillDownRouter;

impl DrillDownRouter {
    /// Map an interaction to a filter patch.
    ///
    /// `class_mix` is the currently displayed class series, used to resolve
    /// a pie slice index to its class.
    pub fn route(event: &ChartEvent, class_mix: Option<&[ClassCount]>) -> Option<FilterPatch> {
        let patch = match event {
            ChartEvent::County(label) => {
                let label = non_empty(label)?;
                FilterPatch::new().set(FilterKey::Counties, FilterValue::one(label))
            }
            ChartEvent::PetitionType(label) => {
                let label = non_empty(label)?;
                FilterPatch::new().set(FilterKey::PetitionTypes, FilterValue::one(label))
            }
            ChartEvent::Month(label) => {
                let label = label.trim();
                if !is_month_label(label) {
                    return None;
                }
                FilterPatch::new()
                    .set(FilterKey::MonthFrom, FilterValue::Text(label.to_string()))
                    .set(FilterKey::MonthTo, FilterValue::Text(label.to_string()))
            }
            ChartEvent::ValueBucket(label) => {
                range_patch(FilterKey::MinValue, FilterKey::MaxValue, bucket_range(label)?)
            }
            ChartEvent::ClassSlice(index) => {
                let slice = class_mix?.get(*index)?;
                let class = non_empty(&slice.property_class)?;
                FilterPatch::new().set(FilterKey::PropertyClass, FilterValue::Text(class.to_string()))
            }
            ChartEvent::DaysSincePetition(label) => range_patch(
                FilterKey::DaysSincePetitionMin,
                FilterKey::DaysSincePetitionMax,
                parse_range_label(label)?,
            ),
            ChartEvent::DaysDeathToPetition(label) => range_patch(
                FilterKey::DaysDeathToPetitionMin,
                FilterKey::DaysDeathToPetitionMax,
                parse_range_label(label)?,
            ),
            ChartEvent::AbsenteeOnly => {
                FilterPatch::new().set(FilterKey::AbsenteeOnly, FilterValue::Flag(true))
            }
        };
        Some(patch)
    }
}

fn non_empty(label: &str) -> Option<&str> {
    let label = label.trim();
    (!label.is_empty()).then_some(label)
}
