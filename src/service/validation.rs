//! Form validation from the per-field rules in the catalog.

use crate::config::ValidationRule;
use crate::error::AppError;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;

pub struct RequestValidator;

impl RequestValidator {
    /// Validate a full record. Every required field must be present and non-blank.
    pub fn validate(
        body: &Map<String, Value>,
        rules: &HashMap<String, ValidationRule>,
    ) -> Result<(), AppError> {
        let mut cols: Vec<&String> = rules.keys().collect();
        cols.sort();
        for col in cols {
            let rule = &rules[col];
            let val = body.get(col.as_str());
            if rule.required == Some(true) && val.map_or(true, is_blank) {
                return Err(AppError::Validation(format!("{} is required", col)));
            }
            if let Some(v) = val {
                validate_field(col, v, rule)?;
            }
        }
        Ok(())
    }

    /// Validate only the fields present in body (updates). Absent fields are left alone,
    /// but a required field that is present must not be blank.
    pub fn validate_partial(
        body: &Map<String, Value>,
        rules: &HashMap<String, ValidationRule>,
    ) -> Result<(), AppError> {
        for (col, v) in body {
            if let Some(rule) = rules.get(col) {
                if rule.required == Some(true) && is_blank(v) {
                    return Err(AppError::Validation(format!("{} is required", col)));
                }
                validate_field(col, v, rule)?;
            }
        }
        Ok(())
    }
}

fn is_blank(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn validate_field(col: &str, v: &Value, rule: &ValidationRule) -> Result<(), AppError> {
    // optional text left empty
    if is_blank(v) {
        return Ok(());
    }
    if let Some(format) = &rule.format {
        validate_format(col, v, format)?;
    }
    if let Some(max) = rule.max_length {
        if let Some(s) = v.as_str() {
            if s.chars().count() > max as usize {
                return Err(AppError::Validation(format!(
                    "{} must be at most {} characters",
                    col, max
                )));
            }
        }
    }
    if let Some(min) = rule.min_length {
        if let Some(s) = v.as_str() {
            if s.chars().count() < min as usize {
                return Err(AppError::Validation(format!(
                    "{} must be at least {} characters",
                    col, min
                )));
            }
        }
    }
    if let Some(ref pattern) = rule.pattern {
        let re = Regex::new(pattern).map_err(|_| AppError::Validation(format!("invalid pattern for {}", col)))?;
        if let Some(s) = v.as_str() {
            if !re.is_match(s) {
                return Err(AppError::Validation(format!("{} '{}' has an invalid format", col, s)));
            }
        }
    }
    if let Some(ref allowed) = rule.allowed {
        if !allowed.iter().any(|a| value_eq(v, a)) {
            let shown: Vec<String> = allowed
                .iter()
                .map(|a| a.as_str().map(str::to_string).unwrap_or_else(|| a.to_string()))
                .collect();
            return Err(AppError::Validation(format!(
                "{} must be one of: {}",
                col,
                shown.join(", ")
            )));
        }
    }
    if let Some(min) = rule.minimum {
        if let Some(n) = v.as_f64() {
            if n < min {
                return Err(AppError::Validation(format!("{} must be at least {}", col, min)));
            }
        }
    }
    if let Some(max) = rule.maximum {
        if let Some(n) = v.as_f64() {
            if n > max {
                return Err(AppError::Validation(format!("{} must be at most {}", col, max)));
            }
        }
    }
    Ok(())
}

fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(s), Value::String(t)) => s == t,
        (Value::Number(n), Value::Number(m)) => n.as_f64() == m.as_f64(),
        _ => a == b,
    }
}

fn validate_format(col: &str, v: &Value, format: &str) -> Result<(), AppError> {
    match format.to_lowercase().as_str() {
        "email" => {
            if let Some(s) = v.as_str() {
                let valid = match s.split_once('@') {
                    Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
                    None => false,
                };
                if !valid {
                    return Err(AppError::Validation(format!("{} must be a valid email", col)));
                }
            }
        }
        "uuid" => {
            if let Some(s) = v.as_str() {
                if uuid::Uuid::parse_str(s).is_err() {
                    return Err(AppError::Validation(format!("{} must be a valid UUID", col)));
                }
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{builtin_catalog, resolve};
    use serde_json::json;

    fn course_rules() -> HashMap<String, ValidationRule> {
        let catalog = resolve(&builtin_catalog()).expect("catalog");
        catalog.entity("school", "courses").expect("courses").validation_rules()
    }

    fn body(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn valid_course_passes() {
        let rules = course_rules();
        let b = body(json!({"code": "CS101", "title": "Intro", "active": true}));
        assert!(RequestValidator::validate(&b, &rules).is_ok());
    }

    #[test]
    fn bad_course_code_is_rejected() {
        let rules = course_rules();
        let b = body(json!({"code": "not a code", "title": "Intro"}));
        let err = RequestValidator::validate(&b, &rules).unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("code")));
    }

    #[test]
    fn blank_required_field_is_rejected() {
        let rules = course_rules();
        let b = body(json!({"code": "CS101", "title": "   "}));
        assert!(matches!(
            RequestValidator::validate(&b, &rules),
            Err(AppError::Validation(m)) if m == "title is required"
        ));
    }

    #[test]
    fn partial_ignores_absent_fields() {
        let rules = course_rules();
        let b = body(json!({"active": false}));
        assert!(RequestValidator::validate_partial(&b, &rules).is_ok());
    }

    #[test]
    fn email_and_allowed_values() {
        let mut rules = HashMap::new();
        rules.insert(
            "email".to_string(),
            ValidationRule {
                format: Some("email".into()),
                ..ValidationRule::default()
            },
        );
        rules.insert(
            "weekday".to_string(),
            ValidationRule {
                allowed: Some(vec![json!("Monday"), json!("Tuesday")]),
                ..ValidationRule::default()
            },
        );
        assert!(RequestValidator::validate(&body(json!({"email": "a@b.jp", "weekday": "Monday"})), &rules).is_ok());
        assert!(RequestValidator::validate(&body(json!({"email": "nope"})), &rules).is_err());
        assert!(RequestValidator::validate(&body(json!({"weekday": "Funday"})), &rules).is_err());
        // optional fields left empty skip format checks
        assert!(RequestValidator::validate(&body(json!({"email": ""})), &rules).is_ok());
    }
}
