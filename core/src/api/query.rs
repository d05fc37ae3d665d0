//! Query-string construction shared by every endpoint.

use probate_types::Filters;

use super::ShortlistQuery;

/// Filter snapshot as query parameters.
///
/// List values become one `key=value` pair per element; every other kind is
/// a single pair. Absent keys are omitted entirely.
pub fn filter_params(filters: &Filters) -> Vec<(String, String)> {
    filters
        .iter()
        .flat_map(|(key, value)| {
            value
                .query_values()
                .into_iter()
                .map(move |v| (key.as_str().to_string(), v))
        })
        .collect()
}

/// Filter parameters followed by sort and paging.
///
/// `sort` is left out when no column is sorted.
pub fn shortlist_params(query: &ShortlistQuery) -> Vec<(String, String)> {
    let mut params = filter_params(&query.filters);
    if !query.sort.is_empty() {
        params.push(("sort".to_string(), query.sort.clone()));
    }
    params.push(("page".to_string(), query.page.to_string()));
    params.push(("page_size".to_string(), query.page_size.to_string()));
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use probate_types::{FilterKey, FilterValue};
    use std::sync::Arc;

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn test_lists_repeat_and_scalars_do_not() {
        let filters = Filters::new()
            .with(
                FilterKey::Counties,
                FilterValue::List(vec!["Fulton".into(), "DeKalb".into()]),
            )
            .with(FilterKey::AbsenteeOnly, FilterValue::Flag(true))
            .with(FilterKey::MinValue, FilterValue::Integer(100_000));

        assert_eq!(
            filter_params(&filters),
            vec![
                pair("counties", "Fulton"),
                pair("counties", "DeKalb"),
                pair("absentee_only", "true"),
                pair("min_value", "100000"),
            ]
        );
    }

    #[test]
    fn test_empty_filters_send_nothing() {
        assert!(filter_params(&Filters::new()).is_empty());
    }

    #[test]
    fn test_shortlist_params_skip_empty_sort() {
        let query = ShortlistQuery {
            filters: Arc::new(Filters::new().with(FilterKey::Tiers, FilterValue::one("high"))),
            sort: String::new(),
            page: 3,
            page_size: 25,
        };
        assert_eq!(
            shortlist_params(&query),
            vec![pair("tiers", "high"), pair("page", "3"), pair("page_size", "25")]
        );

        let sorted = ShortlistQuery {
            sort: "score:desc,county:asc".into(),
            ..query
        };
        assert!(shortlist_params(&sorted).contains(&pair("sort", "score:desc,county:asc")));
    }
}
