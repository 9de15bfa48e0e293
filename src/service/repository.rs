//! Row Repository: CRUD against one named SQLite table.

use crate::error::AppError;
use crate::sql::{self, bind_all, QueryBuf};
use serde_json::{Map, Number, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::SqlitePool;

/// A stored row: column name to scalar value.
pub type Row = Map<String, Value>;

pub struct RowRepository;

impl RowRepository {
    /// Every row, unfiltered, in storage order.
    pub async fn get_all(pool: &SqlitePool, table: &str) -> Result<Vec<Row>, AppError> {
        let q = sql::select_all(table);
        Self::query_many(pool, &q).await
    }

    /// Rows whose `active` column is true. `id` is always a string.
    pub async fn get_all_active(pool: &SqlitePool, table: &str) -> Result<Vec<Row>, AppError> {
        let q = sql::select_active(table);
        let mut rows = Self::query_many(pool, &q).await?;
        for row in &mut rows {
            normalize_id(row);
        }
        Ok(rows)
    }

    /// Fetch one row by id. `None` when no row matches.
    pub async fn get(pool: &SqlitePool, table: &str, id: &str) -> Result<Option<Row>, AppError> {
        let q = sql::select_by_id(table, id);
        Self::query_one(pool, &q).await
    }

    /// Insert a row under a fresh v4 id (or the id carried in `fields`) and
    /// return it as stored, column defaults included.
    pub async fn create(pool: &SqlitePool, table: &str, fields: Option<&Row>) -> Result<Row, AppError> {
        let empty = Row::new();
        let fields = fields.unwrap_or(&empty);
        let id = match fields.get("id").and_then(id_string) {
            Some(id) if !id.is_empty() => id,
            _ => uuid::Uuid::new_v4().to_string(),
        };
        let q = sql::insert(table, &id, fields);
        Self::execute(pool, &q).await?;
        // read back so store defaults and declared column types apply
        let mut row = Self::get(pool, table, &id)
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))?;
        normalize_id(&mut row);
        tracing::debug!(table = %table, id = %id, "row created");
        Ok(row)
    }

    /// Rewrite the non-id fields of the row named by `fields["id"]`.
    /// Returns rows affected; zero means no such row.
    pub async fn update(pool: &SqlitePool, table: &str, fields: &Row) -> Result<u64, AppError> {
        let id = fields
            .get("id")
            .and_then(id_string)
            .ok_or_else(|| AppError::BadRequest("id is required for update".into()))?;
        match sql::update(table, &id, fields) {
            Some(q) => Self::execute(pool, &q).await,
            None => {
                let found = Self::query_one(pool, &sql::exists(table, &id)).await?;
                Ok(u64::from(found.is_some()))
            }
        }
    }

    /// Remove the row. Deleting a missing id is not an error.
    pub async fn delete(pool: &SqlitePool, table: &str, id: &str) -> Result<u64, AppError> {
        let q = sql::delete(table, id);
        Self::execute(pool, &q).await
    }

    async fn query_one(pool: &SqlitePool, q: &QueryBuf) -> Result<Option<Row>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut conn = pool.acquire().await?;
        let row = bind_all(sqlx::query(&q.sql), &q.params)
            .fetch_optional(&mut *conn)
            .await?;
        row.as_ref().map(row_to_json).transpose()
    }

    async fn query_many(pool: &SqlitePool, q: &QueryBuf) -> Result<Vec<Row>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut conn = pool.acquire().await?;
        let rows = bind_all(sqlx::query(&q.sql), &q.params)
            .fetch_all(&mut *conn)
            .await?;
        rows.iter().map(row_to_json).collect()
    }

    async fn execute(pool: &SqlitePool, q: &QueryBuf) -> Result<u64, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "execute");
        let mut conn = pool.acquire().await?;
        let done = bind_all(sqlx::query(&q.sql), &q.params)
            .execute(&mut *conn)
            .await?;
        Ok(done.rows_affected())
    }
}

fn id_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn normalize_id(row: &mut Row) {
    if let Some(id) = row.get("id").and_then(id_string) {
        row.insert("id".into(), Value::String(id));
    }
}

/// Decode by the value's storage class, then coerce by the declared column
/// type so BOOLEAN columns come back as JSON booleans.
fn row_to_json(row: &SqliteRow) -> Result<Row, AppError> {
    use sqlx::{Column, Row as _, TypeInfo, ValueRef};
    let mut map = Row::new();
    for col in row.columns() {
        let i = col.ordinal();
        let raw = row.try_get_raw(i)?;
        if raw.is_null() {
            map.insert(col.name().to_string(), Value::Null);
            continue;
        }
        let storage = raw.type_info().name().to_ascii_uppercase();
        let declared = col.type_info().name().to_ascii_uppercase();
        let value = match storage.as_str() {
            "INTEGER" | "INT4" | "INT8" | "BOOLEAN" => {
                let n: i64 = row.try_get(i)?;
                if declared.contains("BOOL") {
                    Value::Bool(n != 0)
                } else {
                    Value::Number(n.into())
                }
            }
            "REAL" => {
                let n: f64 = row.try_get(i)?;
                Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
            }
            "BLOB" => Value::Null,
            _ => {
                let s: String = row.try_get(i)?;
                if declared.contains("BOOL") {
                    Value::Bool(matches!(s.to_ascii_lowercase().as_str(), "true" | "1" | "t"))
                } else {
                    Value::String(s)
                }
            }
        };
        map.insert(col.name().to_string(), value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ids_are_normalized_to_strings() {
        let mut row = json!({"id": 7, "name": "x"}).as_object().cloned().unwrap_or_default();
        normalize_id(&mut row);
        assert_eq!(row.get("id"), Some(&json!("7")));
    }

    #[test]
    fn blank_ids_are_rejected_for_reuse() {
        assert_eq!(id_string(&json!(" abc ")), Some("abc".to_string()));
        assert_eq!(id_string(&json!(null)), None);
    }
}
