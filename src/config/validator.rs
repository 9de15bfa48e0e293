//! Catalog validation: identifiers, routes, and view/field consistency.

use crate::config::{CatalogConfig, EntityConfig, RendererKind};
use crate::error::ConfigError;
use regex::Regex;
use std::collections::HashSet;

/// Store identifiers are quoted in SQL, but are still restricted to plain names.
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn check_identifier(kind: &str, s: &str) -> Result<(), ConfigError> {
    if is_identifier(s) {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!("invalid {} name: '{}'", kind, s)))
    }
}

fn validate_entity(e: &EntityConfig) -> Result<(), ConfigError> {
    check_identifier("entity", &e.name)?;
    check_identifier("table", &e.table)?;
    check_identifier("module", &e.module)?;
    check_identifier("path segment", &e.path_segment)?;

    let mut names = HashSet::new();
    for f in &e.fields {
        check_identifier("field", &f.name)?;
        if f.name == "id" {
            return Err(ConfigError::Validation(format!(
                "entity '{}': 'id' is implicit and must not be declared",
                e.name
            )));
        }
        if !names.insert(f.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "entity '{}': duplicate field '{}'",
                e.name, f.name
            )));
        }
        if let Some(pattern) = &f.validation.pattern {
            Regex::new(pattern).map_err(|err| {
                ConfigError::Validation(format!("entity '{}': field '{}': {}", e.name, f.name, err))
            })?;
        }
    }

    for c in &e.view.columns {
        if c.key != "id" && !names.contains(c.key.as_str()) {
            return Err(ConfigError::UnknownColumn {
                entity: e.name.clone(),
                column: c.key.clone(),
            });
        }
        if let Some(r) = &c.renderer {
            if r.kind == RendererKind::Custom && r.template.is_none() {
                return Err(ConfigError::Validation(format!(
                    "entity '{}': column '{}' uses a custom renderer without a template",
                    e.name, c.key
                )));
            }
        }
    }

    if let Some(key) = &e.view.default_sort_by {
        match e.view.column(key) {
            Some(c) if c.sortable => {}
            Some(_) => {
                return Err(ConfigError::Validation(format!(
                    "entity '{}': default sort column '{}' is not sortable",
                    e.name, key
                )))
            }
            None => {
                return Err(ConfigError::UnknownColumn {
                    entity: e.name.clone(),
                    column: key.clone(),
                })
            }
        }
    }

    if e.view.items_per_page == 0 {
        return Err(ConfigError::Validation(format!(
            "entity '{}': items_per_page must be positive",
            e.name
        )));
    }
    Ok(())
}

pub fn validate(config: &CatalogConfig) -> Result<(), ConfigError> {
    let mut routes = HashSet::new();
    let mut entity_names = HashSet::new();
    for e in &config.entities {
        validate_entity(e)?;
        if !routes.insert((e.module.as_str(), e.path_segment.as_str())) {
            return Err(ConfigError::DuplicateRoute {
                module: e.module.clone(),
                path_segment: e.path_segment.clone(),
            });
        }
        if !entity_names.insert(e.name.as_str()) {
            return Err(ConfigError::Validation(format!("duplicate entity '{}'", e.name)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{builtin_catalog, TableColumn};

    #[test]
    fn builtin_catalog_is_valid() {
        validate(&builtin_catalog()).expect("valid");
    }

    #[test]
    fn rejects_column_missing_from_fields() {
        let mut config = builtin_catalog();
        config.entities[0].view.columns.push(TableColumn::text("room_number"));
        match validate(&config) {
            Err(ConfigError::UnknownColumn { entity, column }) => {
                assert_eq!(entity, "course");
                assert_eq!(column, "room_number");
            }
            other => panic!("expected unknown column, got {:?}", other),
        }
    }

    #[test]
    fn rejects_duplicate_routes() {
        let mut config = builtin_catalog();
        let mut dup = config.entities[0].clone();
        dup.name = "course_copy".into();
        dup.table = "course_copy".into();
        config.entities.push(dup);
        assert!(matches!(validate(&config), Err(ConfigError::DuplicateRoute { .. })));
    }

    #[test]
    fn rejects_quoted_identifiers() {
        let mut config = builtin_catalog();
        config.entities[0].table = "course\"; DROP TABLE x; --".into();
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }
}
