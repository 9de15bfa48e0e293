//! Builds parameterized INSERT, SELECT, UPDATE, DELETE for one named table.

use crate::sql::SqlParam;
use serde_json::{Map, Value};

/// Quote identifier (safe: only from the catalog).
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Debug, Default)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

impl QueryBuf {
    fn push_param(&mut self, v: &Value) -> &'static str {
        self.params.push(SqlParam::from_json(v));
        "?"
    }
}

/// SELECT every row, in storage order.
pub fn select_all(table: &str) -> QueryBuf {
    QueryBuf {
        sql: format!("SELECT * FROM {}", quoted(table)),
        params: Vec::new(),
    }
}

/// SELECT rows whose `active` column is true.
pub fn select_active(table: &str) -> QueryBuf {
    QueryBuf {
        sql: format!("SELECT * FROM {} WHERE {} = ?", quoted(table), quoted("active")),
        params: vec![SqlParam::Bool(true)],
    }
}

/// SELECT by id. The id is the sole param.
pub fn select_by_id(table: &str, id: &str) -> QueryBuf {
    QueryBuf {
        sql: format!("SELECT * FROM {} WHERE {} = ?", quoted(table), quoted("id")),
        params: vec![SqlParam::Text(id.to_string())],
    }
}

/// INSERT id plus every given field. Columns left out take the store default.
/// An `id` key inside `fields` is ignored in favour of the explicit id.
pub fn insert(table: &str, id: &str, fields: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::default();
    let mut cols = vec![quoted("id")];
    let mut placeholders = vec![q.push_param(&Value::String(id.to_string()))];
    for (k, v) in fields {
        if k == "id" {
            continue;
        }
        cols.push(quoted(k));
        placeholders.push(q.push_param(v));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quoted(table),
        cols.join(", "),
        placeholders.join(", ")
    );
    q
}

/// UPDATE by id: SET every non-id field given. Returns `None` when there is nothing to set.
pub fn update(table: &str, id: &str, fields: &Map<String, Value>) -> Option<QueryBuf> {
    let mut q = QueryBuf::default();
    let mut sets = Vec::new();
    for (k, v) in fields {
        if k == "id" {
            continue;
        }
        let ph = q.push_param(v);
        sets.push(format!("{} = {}", quoted(k), ph));
    }
    if sets.is_empty() {
        return None;
    }
    q.params.push(SqlParam::Text(id.to_string()));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ?",
        quoted(table),
        sets.join(", "),
        quoted("id")
    );
    Some(q)
}

/// DELETE by id.
pub fn delete(table: &str, id: &str) -> QueryBuf {
    QueryBuf {
        sql: format!("DELETE FROM {} WHERE {} = ?", quoted(table), quoted("id")),
        params: vec![SqlParam::Text(id.to_string())],
    }
}

/// Does a row with this id exist? Used to tell "no change" from "not found" on update.
pub fn exists(table: &str, id: &str) -> QueryBuf {
    QueryBuf {
        sql: format!("SELECT 1 FROM {} WHERE {} = ?", quoted(table), quoted("id")),
        params: vec![SqlParam::Text(id.to_string())],
    }
}
