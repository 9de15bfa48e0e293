//! Entity records: rows and form payloads projected onto an entity's field schema.

use crate::config::{EntityConfig, FieldConfig, FieldType};
use crate::error::AppError;
use crate::service::repository::Row;
use crate::service::validation::RequestValidator;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Whether a form creates a record or rewrites an existing one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Update,
}

/// Typed view of a row: `id` plus exactly the entity's fields.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Record {
    pub id: String,
    #[serde(flatten)]
    pub values: Map<String, Value>,
}

impl Record {
    /// Project a stored row. Unknown columns are dropped, missing or null
    /// fields take the field default (or the type's empty value).
    pub fn from_row(entity: &EntityConfig, row: &Row) -> Record {
        let id = match row.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        let values = entity
            .fields
            .iter()
            .map(|f| {
                let v = match row.get(&f.name) {
                    Some(v) if !v.is_null() => coerce(f.type_, v),
                    _ => default_for(f),
                };
                (f.name.clone(), v)
            })
            .collect();
        Record { id, values }
    }

    /// An unsaved record with every field at its default.
    pub fn blank(entity: &EntityConfig) -> Record {
        Record {
            id: String::new(),
            values: entity.fields.iter().map(|f| (f.name.clone(), default_for(f))).collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Back to a flat row (id included when set).
    pub fn into_row(self) -> Row {
        let mut row = Row::new();
        if !self.id.is_empty() {
            row.insert("id".into(), Value::String(self.id));
        }
        row.extend(self.values);
        row
    }
}

/// Project every row for display.
pub fn project_rows(entity: &EntityConfig, rows: &[Row]) -> Vec<Row> {
    rows.iter().map(|r| Record::from_row(entity, r).into_row()).collect()
}

/// Empty value for a field type: "" for text, false, 0, null for timestamps.
pub fn empty_value(type_: FieldType) -> Value {
    match type_ {
        FieldType::Text => Value::String(String::new()),
        FieldType::Boolean => Value::Bool(false),
        FieldType::Integer => Value::from(0),
        FieldType::Timestamp => Value::Null,
    }
}

fn default_for(f: &FieldConfig) -> Value {
    f.default.clone().unwrap_or_else(|| empty_value(f.type_))
}

/// Coerce a stored value to the field's type where the store's typing is loose.
fn coerce(type_: FieldType, v: &Value) -> Value {
    match (type_, v) {
        (FieldType::Boolean, Value::Number(n)) => Value::Bool(n.as_i64().unwrap_or(0) != 0),
        (FieldType::Boolean, Value::String(s)) => Value::Bool(truthy(s)),
        (FieldType::Integer, Value::String(s)) => s.trim().parse::<i64>().map(Value::from).unwrap_or(Value::Null),
        (FieldType::Text, Value::Number(n)) => Value::String(n.to_string()),
        (FieldType::Text, Value::Bool(b)) => Value::String(b.to_string()),
        _ => v.clone(),
    }
}

/// Checkbox semantics: "on", "true", "1" (any case) are true.
pub fn truthy(s: &str) -> bool {
    matches!(s.trim().to_ascii_lowercase().as_str(), "on" | "true" | "1" | "yes")
}

fn now_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Turn a submitted form into the field-value mapping to persist, then validate it.
///
/// Unknown keys (including `id`) are dropped. An unchecked checkbox is absent
/// from the form and reads as `false`. On create, missing fields take their
/// defaults and timestamps default to now; on update, missing non-boolean
/// fields are left untouched.
pub fn parse_form(
    entity: &EntityConfig,
    form: &HashMap<String, String>,
    mode: FormMode,
) -> Result<Row, AppError> {
    let mut out = Row::new();
    for f in &entity.fields {
        let raw = form.get(&f.name).map(|s| s.trim());
        let value = match (f.type_, raw) {
            (FieldType::Boolean, raw) => Value::Bool(raw.map(truthy).unwrap_or(false)),
            (FieldType::Integer, Some(s)) if !s.is_empty() => {
                let n = s
                    .parse::<i64>()
                    .map_err(|_| AppError::Validation(format!("{} must be a whole number", f.name)))?;
                Value::from(n)
            }
            (FieldType::Timestamp, Some(s)) if !s.is_empty() => Value::String(s.to_string()),
            (FieldType::Text, Some(s)) => Value::String(s.to_string()),
            (_, _) if mode == FormMode::Update && raw.is_none() => continue,
            // a cleared stamp on edit keeps the stored one
            (FieldType::Timestamp, _) if mode == FormMode::Update => continue,
            (FieldType::Timestamp, _) => Value::String(now_timestamp()),
            (_, _) => match &f.default {
                Some(d) => d.clone(),
                None if raw.is_some() => empty_value(f.type_),
                None => continue,
            },
        };
        out.insert(f.name.clone(), value);
    }
    let rules = entity.validation_rules();
    match mode {
        FormMode::Create => RequestValidator::validate(&out, &rules)?,
        FormMode::Update => RequestValidator::validate_partial(&out, &rules)?,
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{builtin_catalog, resolve, Catalog};
    use serde_json::json;

    fn catalog() -> Catalog {
        resolve(&builtin_catalog()).expect("catalog")
    }

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn unknown_fields_dropped_and_active_defaults_false() {
        let catalog = catalog();
        let course = catalog.entity("school", "courses").expect("courses");
        let row = parse_form(
            course,
            &form(&[("code", "CS101"), ("title", "Intro"), ("hacker", "1"), ("id", "x")]),
            FormMode::Create,
        )
        .expect("valid");
        assert_eq!(row.get("active"), Some(&json!(false)));
        assert!(row.get("hacker").is_none());
        assert!(row.get("id").is_none());
        assert_eq!(row.get("code"), Some(&json!("CS101")));
    }

    #[test]
    fn checkbox_on_is_true() {
        let catalog = catalog();
        let course = catalog.entity("school", "courses").expect("courses");
        let row = parse_form(
            course,
            &form(&[("code", "CS101"), ("title", "Intro"), ("active", "on")]),
            FormMode::Create,
        )
        .expect("valid");
        assert_eq!(row.get("active"), Some(&json!(true)));
    }

    #[test]
    fn integers_are_parsed() {
        let catalog = catalog();
        let room = catalog.entity("school", "rooms").expect("rooms");
        let row = parse_form(room, &form(&[("name", "A1"), ("capacity", "30")]), FormMode::Create).expect("valid");
        assert_eq!(row.get("capacity"), Some(&json!(30)));
        let err = parse_form(room, &form(&[("name", "A1"), ("capacity", "lots")]), FormMode::Create).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn create_stamps_timestamps_update_leaves_them() {
        let catalog = catalog();
        let student = catalog.entity("spin", "students").expect("students");
        let fields = [("email", "a@b.jp"), ("firstName", "Aki"), ("lastName", "Sato")];
        let created = parse_form(student, &form(&fields), FormMode::Create).expect("valid");
        assert!(created.get("created_at").and_then(Value::as_str).is_some());
        let updated = parse_form(student, &form(&fields), FormMode::Update).expect("valid");
        assert!(updated.get("created_at").is_none());
        assert!(updated.get("level").is_none());
        assert_eq!(updated.get("active"), Some(&json!(false)));
    }

    #[test]
    fn blank_timestamp_on_update_is_left_alone() {
        let catalog = catalog();
        let student = catalog.entity("spin", "students").expect("students");
        let fields = [("email", "a@b.jp"), ("firstName", "Aki"), ("lastName", "Sato"), ("created_at", " ")];
        let updated = parse_form(student, &form(&fields), FormMode::Update).expect("valid");
        assert!(updated.get("created_at").is_none());
        let created = parse_form(student, &form(&fields), FormMode::Create).expect("valid");
        assert!(created.get("created_at").and_then(Value::as_str).is_some_and(|s| !s.is_empty()));
    }

    #[test]
    fn invalid_form_is_a_validation_error() {
        let catalog = catalog();
        let course = catalog.entity("school", "courses").expect("courses");
        let err = parse_form(course, &form(&[("code", "???"), ("title", "Intro")]), FormMode::Create).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn rows_are_projected_onto_fields() {
        let catalog = catalog();
        let course = catalog.entity("school", "courses").expect("courses");
        let row = json!({"id": "1", "code": "CS101", "active": 1, "extra": "x"})
            .as_object()
            .cloned()
            .unwrap_or_default();
        let rec = Record::from_row(course, &row);
        assert_eq!(rec.id, "1");
        assert_eq!(rec.get("active"), Some(&json!(true)));
        assert_eq!(rec.get("title"), Some(&json!("")));
        assert!(rec.get("extra").is_none());
        let flat = rec.into_row();
        assert_eq!(flat.get("id"), Some(&json!("1")));
    }
}
