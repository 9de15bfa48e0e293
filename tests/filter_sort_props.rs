use proptest::prelude::*;
use school_admin::config::TableColumn;
use school_admin::service::Row;
use school_admin::view::{filter, sort, Filter, FilterSpec, SortSpec};
use serde_json::{json, Value};

fn rows_with(field: &str, values: &[String]) -> Vec<Row> {
    values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| json!({ "id": i.to_string(), field: v }).as_object().cloned())
        .collect()
}

fn ids(rows: &[Row]) -> Vec<usize> {
    rows.iter()
        .filter_map(|r| r.get("id").and_then(Value::as_str).and_then(|s| s.parse().ok()))
        .collect()
}

fn keys<'a>(rows: &'a [Row], field: &str) -> Vec<&'a str> {
    rows.iter().filter_map(|r| r.get(field).and_then(Value::as_str)).collect()
}

proptest! {
    #[test]
    fn substring_filter_keeps_exactly_the_matching_rows(
        values in proptest::collection::vec("[a-zA-Z ]{0,8}", 0..24),
        needle in "[a-zA-Z]{0,3}",
    ) {
        let rows = rows_with("title", &values);
        let spec = FilterSpec::new(vec![Filter::Contains { key: "title".into(), needle: needle.clone() }]);
        let expected: Vec<usize> = values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.to_lowercase().contains(&needle.to_lowercase()))
            .map(|(i, _)| i)
            .collect();
        let kept = filter(rows, &spec);
        prop_assert_eq!(ids(&kept), expected);
        if needle.is_empty() {
            prop_assert_eq!(kept.len(), values.len());
        }
    }

    #[test]
    fn sort_keeps_ties_in_input_order(
        values in proptest::collection::vec("[abc]{0,2}", 0..32),
        ascending in any::<bool>(),
    ) {
        let rows = rows_with("code", &values);
        let sorted = sort(rows, Some(&SortSpec::new("code", ascending)), &[TableColumn::text("code")]);
        let order = ids(&sorted);
        for pair in order.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if values[a] == values[b] {
                prop_assert!(a < b, "tie {} / {} reordered", a, b);
            } else if ascending {
                prop_assert!(values[a] < values[b]);
            } else {
                prop_assert!(values[a] > values[b]);
            }
        }
        prop_assert_eq!(order.len(), values.len());
    }

    #[test]
    fn descending_is_the_reverse_of_ascending_without_ties(
        set in proptest::collection::hash_set("[a-z]{1,6}", 0..24),
    ) {
        let values: Vec<String> = set.into_iter().collect();
        let columns = [TableColumn::text("title")];
        let asc = sort(rows_with("title", &values), Some(&SortSpec::new("title", true)), &columns);
        let desc = sort(asc.clone(), Some(&SortSpec::new("title", false)), &columns);
        let mut reversed = keys(&asc, "title");
        reversed.reverse();
        prop_assert_eq!(keys(&desc, "title"), reversed);
    }

    #[test]
    fn case_insensitive_sort_ignores_case(
        set in proptest::collection::hash_set("[a-z]{1,5}", 1..16),
        upper in proptest::collection::vec(any::<bool>(), 16),
    ) {
        let lower: Vec<String> = set.into_iter().collect();
        let mixed: Vec<String> = lower
            .iter()
            .zip(upper.iter())
            .map(|(v, up)| if *up { v.to_uppercase() } else { v.clone() })
            .collect();
        let columns = [TableColumn::text("code").case_insensitive()];
        let sorted = sort(rows_with("code", &mixed), Some(&SortSpec::new("code", true)), &columns);
        let folded: Vec<String> = keys(&sorted, "code").iter().map(|s| s.to_lowercase()).collect();
        let mut expected = lower.clone();
        expected.sort();
        prop_assert_eq!(folded, expected);
    }
}
