//! Series synthesized client-side from independently fetched sources.

use std::collections::HashMap;

use probate_types::{MonthCount, MonthRate, MonthSplit};

/// Rebuild a stacked absentee/local monthly series from a rate series and a
/// totals series.
///
/// Output follows the months of `rates`. A month missing from `totals`
/// counts as zero filings; months only in `totals` are dropped.
pub fn absentee_split(rates: &[MonthRate], totals: &[MonthCount]) -> Vec<MonthSplit> {
    let by_month: HashMap<&str, u64> = totals
        .iter()
        .map(|t| (t.month.as_str(), t.count))
        .collect();

    rates
        .iter()
        .map(|r| {
            let total = by_month.get(r.month.as_str()).copied().unwrap_or(0);
            // Counts are unsigned; a negative rate floors at zero
            let absentee = (total as f64 * r.rate).round().max(0.0) as u64;
            MonthSplit {
                month: r.month.clone(),
                absentee,
                local: total.saturating_sub(absentee),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(month: &str, rate: f64) -> MonthRate {
        MonthRate {
            month: month.to_string(),
            rate,
        }
    }

    fn total(month: &str, count: u64) -> MonthCount {
        MonthCount {
            month: month.to_string(),
            count,
        }
    }

    #[test]
    fn test_split_sums_to_total() {
        let rates = [rate("2024-01", 0.57), rate("2024-02", 0.59), rate("2024-03", 0.63)];
        let totals = [total("2024-01", 42), total("2024-02", 55), total("2024-03", 61)];

        let split = absentee_split(&rates, &totals);
        assert_eq!(split.len(), 3);
        for (s, t) in split.iter().zip(&totals) {
            assert_eq!(s.absentee + s.local, t.count, "month {}", s.month);
        }
        // round(42 * 0.57) = round(23.94) = 24
        assert_eq!(split[0].absentee, 24);
        assert_eq!(split[0].local, 18);
    }

    #[test]
    fn test_months_follow_rate_series() {
        let rates = [rate("2024-01", 0.5), rate("2024-05", 0.5)];
        let totals = [total("2024-01", 10), total("2024-02", 99)];

        let split = absentee_split(&rates, &totals);
        let months: Vec<_> = split.iter().map(|s| s.month.as_str()).collect();
        assert_eq!(months, vec!["2024-01", "2024-05"]);
        // Missing total defaults to zero
        assert_eq!(split[1].absentee, 0);
        assert_eq!(split[1].local, 0);
    }

    #[test]
    fn test_local_never_negative() {
        let split = absentee_split(&[rate("2024-01", 1.4)], &[total("2024-01", 10)]);
        assert_eq!(split[0].absentee, 14);
        assert_eq!(split[0].local, 0);

        let split = absentee_split(&[rate("2024-01", -0.2)], &[total("2024-01", 10)]);
        assert_eq!(split[0].absentee, 0);
        assert_eq!(split[0].local, 10);
    }

    #[test]
    fn test_rounds_half_away_from_zero() {
        let split = absentee_split(&[rate("2024-01", 0.5)], &[total("2024-01", 5)]);
        assert_eq!(split[0].absentee, 3);
        assert_eq!(split[0].local, 2);
    }
}
