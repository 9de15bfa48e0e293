//! Declarative row filters built from list query parameters.

use crate::config::{FieldType, TableConfig};
use crate::service::record::truthy;
use crate::service::Row;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Query parameter carrying a free-text search.
pub const SEARCH_PARAM: &str = "q";
pub const ACTIVE_ONLY_PARAM: &str = "active_only";
/// Prefix of per-column filters, e.g. `filter_title=intro`.
pub const FILTER_PREFIX: &str = "filter_";

#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    /// Case-insensitive substring match on one field.
    Contains { key: String, needle: String },
    /// Exact boolean match on one field.
    Equals { key: String, value: bool },
    /// Case-insensitive substring match on any of several fields.
    Search { keys: Vec<String>, needle: String },
}

impl Filter {
    fn matches(&self, row: &Row) -> bool {
        match self {
            Filter::Contains { key, needle } => contains(row.get(key), needle),
            Filter::Equals { key, value } => as_bool(row.get(key)) == *value,
            Filter::Search { keys, needle } => keys.iter().any(|k| contains(row.get(k), needle)),
        }
    }

    fn is_noop(&self) -> bool {
        match self {
            Filter::Contains { needle, .. } | Filter::Search { needle, .. } => needle.is_empty(),
            Filter::Equals { .. } => false,
        }
    }
}

/// The filters of one list request, plus the raw values to echo back into the page.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterSpec {
    pub filters: Vec<Filter>,
    pub params: BTreeMap<String, String>,
}

impl FilterSpec {
    pub fn new(filters: Vec<Filter>) -> Self {
        FilterSpec {
            filters,
            params: BTreeMap::new(),
        }
    }

    /// Recognize `q`, `active_only` and `filter_<key>` against the view's columns.
    /// Parameters naming unknown or non-filterable columns are ignored.
    pub fn from_query(params: &HashMap<String, String>, view: &TableConfig) -> Self {
        let mut spec = FilterSpec::default();

        if let Some(q) = params.get(SEARCH_PARAM).map(|s| s.trim()).filter(|s| !s.is_empty()) {
            spec.params.insert(SEARCH_PARAM.into(), q.to_string());
            if view.searchable {
                let keys: Vec<String> = view
                    .columns
                    .iter()
                    .filter(|c| c.filterable && c.type_ == FieldType::Text)
                    .map(|c| c.key.clone())
                    .collect();
                if keys.is_empty() {
                    tracing::debug!(entity = %view.entity_name, "no text columns to search");
                } else {
                    spec.filters.push(Filter::Search {
                        keys,
                        needle: q.to_string(),
                    });
                }
            }
        }

        if let Some(raw) = params.get(ACTIVE_ONLY_PARAM) {
            if truthy(raw) && view.column("active").is_some() {
                spec.params.insert(ACTIVE_ONLY_PARAM.into(), "true".into());
                spec.filters.push(Filter::Equals {
                    key: "active".into(),
                    value: true,
                });
            }
        }

        let mut keyed: Vec<(&String, &String)> = params
            .iter()
            .filter(|(k, _)| k.starts_with(FILTER_PREFIX))
            .collect();
        keyed.sort();
        for (name, raw) in keyed {
            let key = &name[FILTER_PREFIX.len()..];
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            let Some(col) = view.column(key).filter(|c| c.filterable) else {
                tracing::debug!(param = %name, "ignoring filter on unknown column");
                continue;
            };
            spec.params.insert(name.clone(), raw.to_string());
            spec.filters.push(match col.type_ {
                FieldType::Boolean => Filter::Equals {
                    key: key.to_string(),
                    value: truthy(raw),
                },
                _ => Filter::Contains {
                    key: key.to_string(),
                    needle: raw.to_string(),
                },
            });
        }
        spec
    }

    pub fn is_empty(&self) -> bool {
        self.filters.iter().all(Filter::is_noop)
    }

    pub fn search(&self) -> Option<&str> {
        self.params.get(SEARCH_PARAM).map(String::as_str)
    }

    pub fn active_only(&self) -> bool {
        self.params.contains_key(ACTIVE_ONLY_PARAM)
    }
}

/// Keep the rows matching every filter. An empty spec keeps everything.
pub fn filter(rows: Vec<Row>, spec: &FilterSpec) -> Vec<Row> {
    let active: Vec<&Filter> = spec.filters.iter().filter(|f| !f.is_noop()).collect();
    if active.is_empty() {
        return rows;
    }
    rows.into_iter()
        .filter(|row| active.iter().all(|f| f.matches(row)))
        .collect()
}

/// Display text of a cell for matching purposes. Missing and null read as "".
pub fn cell_text(v: Option<&Value>) -> String {
    match v {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn contains(v: Option<&Value>, needle: &str) -> bool {
    cell_text(v).to_lowercase().contains(&needle.to_lowercase())
}

fn as_bool(v: Option<&Value>) -> bool {
    match v {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0) != 0,
        Some(Value::String(s)) => truthy(s),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TableColumn;
    use serde_json::json;

    fn rows() -> Vec<Row> {
        [
            json!({"id": "1", "code": "CS101", "title": "Intro to CS", "active": true}),
            json!({"id": "2", "code": "ENG201", "title": "English Writing", "active": false}),
            json!({"id": "3", "code": "cs102", "title": "Data Structures", "active": true}),
        ]
        .into_iter()
        .filter_map(|v| v.as_object().cloned())
        .collect()
    }

    fn view() -> TableConfig {
        TableConfig::new(
            "course",
            vec![
                TableColumn::text("code"),
                TableColumn::text("title"),
                TableColumn::boolean("active"),
            ],
        )
    }

    fn ids(rows: &[Row]) -> Vec<&str> {
        rows.iter().filter_map(|r| r.get("id").and_then(Value::as_str)).collect()
    }

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substring_is_case_insensitive() {
        let spec = FilterSpec::new(vec![Filter::Contains {
            key: "code".into(),
            needle: "cs".into(),
        }]);
        assert_eq!(ids(&filter(rows(), &spec)), vec!["1", "3"]);
    }

    #[test]
    fn filters_compose_with_and() {
        let spec = FilterSpec::from_query(&params(&[("q", "cs"), ("active_only", "true"), ("filter_title", "data")]), &view());
        assert_eq!(ids(&filter(rows(), &spec)), vec!["3"]);
        assert_eq!(spec.search(), Some("cs"));
        assert!(spec.active_only());
    }

    #[test]
    fn boolean_filter_is_equality() {
        let spec = FilterSpec::from_query(&params(&[("filter_active", "false")]), &view());
        assert_eq!(ids(&filter(rows(), &spec)), vec!["2"]);
    }

    #[test]
    fn empty_needle_and_unknown_columns_are_ignored() {
        let spec = FilterSpec::from_query(&params(&[("q", "  "), ("filter_nope", "x"), ("active_only", "off")]), &view());
        assert!(spec.filters.is_empty());
        assert_eq!(filter(rows(), &spec).len(), 3);
        let noop = FilterSpec::new(vec![Filter::Contains {
            key: "code".into(),
            needle: String::new(),
        }]);
        assert!(noop.is_empty());
        assert_eq!(filter(rows(), &noop).len(), 3);
    }

    #[test]
    fn search_without_text_columns_keeps_every_row() {
        let view = TableConfig::new("flag", vec![TableColumn::boolean("active")]);
        let spec = FilterSpec::from_query(&params(&[("q", "cs")]), &view);
        assert!(spec.filters.is_empty());
        assert_eq!(spec.search(), Some("cs"));
        assert_eq!(filter(rows(), &spec).len(), 3);
    }

    #[test]
    fn search_spans_text_columns() {
        let spec = FilterSpec::from_query(&params(&[("q", "writing")]), &view());
        assert_eq!(ids(&filter(rows(), &spec)), vec!["2"]);
    }
}
