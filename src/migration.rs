//! Apply the catalog to the stores: one table per entity, created if missing,
//! with columns added when the catalog grows a field.

use crate::config::types::*;
use crate::config::Catalog;
use crate::error::AppError;
use crate::sql::quoted;
use crate::store::Stores;
use serde_json::Value;
use sqlx::SqlitePool;
use std::collections::HashSet;

/// SQL literal for a field default. Strings are single-quoted with quotes doubled.
fn default_literal(f: &FieldConfig) -> Option<String> {
    if f.type_ == FieldType::Timestamp {
        return Some("CURRENT_TIMESTAMP".to_string());
    }
    match f.default.as_ref()? {
        Value::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(format!("'{}'", s.replace('\'', "''"))),
        _ => None,
    }
}

fn column_def(f: &FieldConfig) -> String {
    let mut def = format!("{} {}", quoted(&f.name), f.type_.sql_type());
    if let Some(d) = default_literal(f) {
        def.push_str(" DEFAULT ");
        def.push_str(&d);
    }
    def
}

/// CREATE TABLE IF NOT EXISTS for one entity. `id` is the text primary key.
pub fn create_table_sql(entity: &EntityConfig) -> String {
    let mut col_defs = vec![format!("{} TEXT PRIMARY KEY", quoted("id"))];
    col_defs.extend(entity.fields.iter().map(column_def));
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quoted(&entity.table),
        col_defs.join(", ")
    )
}

async fn existing_columns(pool: &SqlitePool, table: &str) -> Result<HashSet<String>, AppError> {
    use sqlx::Row;
    let rows = sqlx::query("SELECT name FROM pragma_table_info(?)")
        .bind(table)
        .fetch_all(pool)
        .await?;
    rows.iter()
        .map(|r| r.try_get::<String, _>("name").map_err(AppError::from))
        .collect()
}

/// Ensure every catalog table exists in its store. Idempotent.
pub async fn ensure_tables(stores: &Stores, catalog: &Catalog) -> Result<(), AppError> {
    for entity in catalog.entities() {
        let pool = stores.pool(entity.store);
        let sql = create_table_sql(entity);
        tracing::debug!(sql = %sql, "ddl");
        sqlx::query(&sql).execute(pool).await?;

        let present = existing_columns(pool, &entity.table).await?;
        for f in entity.fields.iter().filter(|f| !present.contains(&f.name)) {
            // SQLite refuses non-constant defaults on ADD COLUMN
            let def = if f.type_ == FieldType::Timestamp {
                format!("{} {}", quoted(&f.name), f.type_.sql_type())
            } else {
                column_def(f)
            };
            let alter = format!("ALTER TABLE {} ADD COLUMN {}", quoted(&entity.table), def);
            tracing::info!(table = %entity.table, column = %f.name, "adding column");
            sqlx::query(&alter).execute(pool).await?;
        }
    }
    tracing::info!(tables = catalog.entities().len(), "schema ready");
    Ok(())
}
