//! Stable sorting and paging of row lists.

use crate::config::{FieldType, TableColumn, TableConfig};
use crate::service::record::truthy;
use crate::service::Row;
use crate::view::filter::cell_text;
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    pub key: String,
    pub ascending: bool,
}

impl SortSpec {
    pub fn new(key: &str, ascending: bool) -> Self {
        SortSpec {
            key: key.to_string(),
            ascending,
        }
    }
}

/// `sort_by` and `sort_asc` from a query string. A `sort_by` naming no
/// sortable column is dropped so the view default applies.
pub fn sort_params(params: &HashMap<String, String>, view: &TableConfig) -> (Option<String>, Option<bool>) {
    let sort_by = params
        .get("sort_by")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .and_then(|key| match view.column(key) {
            Some(c) if c.sortable => Some(key.to_string()),
            _ => {
                tracing::debug!(sort_by = %key, entity = %view.entity_name, "unknown sort key, using default");
                None
            }
        });
    let sort_asc = params
        .get("sort_asc")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(truthy);
    (sort_by, sort_asc)
}

#[derive(Debug, PartialEq, PartialOrd)]
enum SortKey {
    Text(String),
    Bool(bool),
    Number(f64),
}

impl SortKey {
    fn of(v: Option<&Value>, type_: FieldType, case_insensitive: bool) -> SortKey {
        match type_ {
            FieldType::Boolean => SortKey::Bool(match v {
                Some(Value::Bool(b)) => *b,
                Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0) != 0.0,
                Some(Value::String(s)) => truthy(s),
                _ => false,
            }),
            FieldType::Integer => SortKey::Number(match v {
                Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
                Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
                _ => 0.0,
            }),
            FieldType::Text | FieldType::Timestamp => {
                let s = cell_text(v);
                SortKey::Text(if case_insensitive { s.to_lowercase() } else { s })
            }
        }
    }

    fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            _ => self.partial_cmp(other).unwrap_or(Ordering::Equal),
        }
    }
}

/// Stable sort by one field. `None` returns the rows unchanged.
///
/// The column descriptor (when present) decides the comparison type and
/// case folding; an undeclared key sorts as text. Descending reverses the
/// comparison, so equal keys keep their original order either way.
pub fn sort(mut rows: Vec<Row>, spec: Option<&SortSpec>, columns: &[TableColumn]) -> Vec<Row> {
    let Some(spec) = spec else {
        return rows;
    };
    let (type_, ci) = columns
        .iter()
        .find(|c| c.key == spec.key)
        .map(|c| (c.type_, c.case_insensitive_sort))
        .unwrap_or((FieldType::Text, false));
    let key = |r: &Row| SortKey::of(r.get(&spec.key), type_, ci);
    if spec.ascending {
        rows.sort_by(|a, b| key(a).compare(&key(b)));
    } else {
        rows.sort_by(|a, b| key(b).compare(&key(a)));
    }
    rows
}

/// One page of rows plus the numbers needed to draw pager controls.
#[derive(Clone, Debug, Serialize)]
pub struct Page {
    pub items: Vec<Row>,
    /// 1-based.
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

/// Slice out `page` (1-based, clamped into range). `per_page` of 0 means one page.
pub fn paginate(rows: Vec<Row>, page: usize, per_page: usize) -> Page {
    let total_items = rows.len();
    let per_page = if per_page == 0 { total_items.max(1) } else { per_page };
    let total_pages = total_items.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);
    let items = rows
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();
    Page {
        items,
        page,
        per_page,
        total_items,
        total_pages,
        has_prev: page > 1,
        has_next: page < total_pages,
    }
}
