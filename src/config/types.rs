//! Raw catalog types: entity field schemas and table view configuration (JSON-loadable).

use crate::naming::{plural_title, singular_title, to_title_case};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which embedded store an entity's table lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    School,
    Spin,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Boolean,
    Integer,
    Timestamp,
}

impl FieldType {
    /// Column type used when creating the backing table.
    pub fn sql_type(self) -> &'static str {
        match self {
            FieldType::Text => "TEXT",
            FieldType::Boolean => "BOOLEAN",
            FieldType::Integer => "INTEGER",
            FieldType::Timestamp => "DATETIME",
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub min_length: Option<u32>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub allowed: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,
}

/// One persisted field of an entity. `id` is implicit and never listed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    #[serde(rename = "type", default)]
    pub type_: FieldType,
    #[serde(default)]
    pub label: Option<String>,
    /// Value used when a form or row omits the field.
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub validation: ValidationRule,
}

impl FieldConfig {
    pub fn label(&self) -> String {
        self.label.clone().unwrap_or_else(|| to_title_case(&self.name))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    #[default]
    Text,
    Boolean,
    Date,
    Custom,
}

/// How a cell is rendered. `template` names a cell template for `custom`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ColumnRenderer {
    #[serde(rename = "type", default)]
    pub kind: RendererKind,
    #[serde(default)]
    pub template: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_items_per_page() -> usize {
    10
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TableColumn {
    pub key: String,
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_true")]
    pub sortable: bool,
    #[serde(default = "default_true")]
    pub filterable: bool,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(rename = "type", default)]
    pub type_: FieldType,
    /// Compare case-folded when sorting (text columns only).
    #[serde(default)]
    pub case_insensitive_sort: bool,
    #[serde(default)]
    pub width: Option<String>,
    #[serde(default)]
    pub renderer: Option<ColumnRenderer>,
}

impl TableColumn {
    pub fn text(key: &str) -> Self {
        TableColumn {
            key: key.to_string(),
            label: String::new(),
            sortable: true,
            filterable: true,
            visible: true,
            type_: FieldType::Text,
            case_insensitive_sort: false,
            width: None,
            renderer: None,
        }
    }

    pub fn boolean(key: &str) -> Self {
        TableColumn {
            type_: FieldType::Boolean,
            renderer: Some(ColumnRenderer {
                kind: RendererKind::Boolean,
                template: None,
            }),
            ..TableColumn::text(key)
        }
    }

    pub fn integer(key: &str) -> Self {
        TableColumn {
            type_: FieldType::Integer,
            ..TableColumn::text(key)
        }
    }

    pub fn timestamp(key: &str) -> Self {
        TableColumn {
            type_: FieldType::Timestamp,
            renderer: Some(ColumnRenderer {
                kind: RendererKind::Date,
                template: None,
            }),
            ..TableColumn::text(key)
        }
    }

    pub fn labeled(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive_sort = true;
        self
    }

    pub fn custom(mut self, template: &str) -> Self {
        self.renderer = Some(ColumnRenderer {
            kind: RendererKind::Custom,
            template: Some(template.to_string()),
        });
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActionButtons {
    #[serde(default = "default_true")]
    pub create: bool,
    #[serde(default = "default_true")]
    pub edit: bool,
    #[serde(default = "default_true")]
    pub delete: bool,
}

impl Default for ActionButtons {
    fn default() -> Self {
        ActionButtons {
            create: true,
            edit: true,
            delete: true,
        }
    }
}

pub const DEFAULT_TABLE_TEMPLATE: &str = "entity/table.html";
pub const DEFAULT_FORM_TEMPLATE: &str = "entity/form.html";

/// Table view configuration for one entity kind.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TableConfig {
    pub entity_name: String,
    #[serde(default)]
    pub entity_title: Option<String>,
    #[serde(default)]
    pub entity_title_singular: Option<String>,
    pub columns: Vec<TableColumn>,
    #[serde(default)]
    pub default_sort_by: Option<String>,
    #[serde(default = "default_true")]
    pub default_sort_asc: bool,
    #[serde(default = "default_true")]
    pub enable_pagination: bool,
    #[serde(default = "default_items_per_page")]
    pub items_per_page: usize,
    #[serde(default = "default_true")]
    pub searchable: bool,
    #[serde(default)]
    pub table_template: Option<String>,
    #[serde(default)]
    pub action_buttons: ActionButtons,
}

impl TableConfig {
    pub fn new(entity_name: &str, columns: Vec<TableColumn>) -> Self {
        TableConfig {
            entity_name: entity_name.to_string(),
            entity_title: None,
            entity_title_singular: None,
            columns,
            default_sort_by: None,
            default_sort_asc: true,
            enable_pagination: true,
            items_per_page: default_items_per_page(),
            searchable: true,
            table_template: None,
            action_buttons: ActionButtons::default(),
        }
    }

    pub fn sorted_by(mut self, key: &str, ascending: bool) -> Self {
        self.default_sort_by = Some(key.to_string());
        self.default_sort_asc = ascending;
        self
    }

    /// Fill derived values: titles from the entity name, labels from keys, default template.
    pub fn resolve_defaults(&mut self) {
        if self.entity_title.is_none() {
            self.entity_title = Some(plural_title(&self.entity_name));
        }
        if self.entity_title_singular.is_none() {
            self.entity_title_singular = Some(singular_title(&self.entity_name));
        }
        if self.table_template.is_none() {
            self.table_template = Some(DEFAULT_TABLE_TEMPLATE.to_string());
        }
        for c in &mut self.columns {
            if c.label.is_empty() {
                c.label = to_title_case(&c.key);
            }
        }
    }

    pub fn title(&self) -> String {
        self.entity_title
            .clone()
            .unwrap_or_else(|| plural_title(&self.entity_name))
    }

    pub fn title_singular(&self) -> String {
        self.entity_title_singular
            .clone()
            .unwrap_or_else(|| singular_title(&self.entity_name))
    }

    pub fn template(&self) -> &str {
        self.table_template.as_deref().unwrap_or(DEFAULT_TABLE_TEMPLATE)
    }

    pub fn column(&self, key: &str) -> Option<&TableColumn> {
        self.columns.iter().find(|c| c.key == key)
    }
}

/// One entity kind: its table, route, field schema and table view.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EntityConfig {
    pub name: String,
    pub module: String,
    pub path_segment: String,
    pub table: String,
    pub store: StoreKind,
    pub fields: Vec<FieldConfig>,
    pub view: TableConfig,
    #[serde(default)]
    pub form_template: Option<String>,
}

impl EntityConfig {
    pub fn field(&self, name: &str) -> Option<&FieldConfig> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Route prefix, e.g. "/school/courses".
    pub fn base_path(&self) -> String {
        format!("/{}/{}", self.module, self.path_segment)
    }

    pub fn form_template(&self) -> &str {
        self.form_template.as_deref().unwrap_or(DEFAULT_FORM_TEMPLATE)
    }

    pub fn validation_rules(&self) -> HashMap<String, ValidationRule> {
        self.fields
            .iter()
            .map(|f| (f.name.clone(), f.validation.clone()))
            .collect()
    }
}

/// The whole catalog as loaded from code or JSON.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub entities: Vec<EntityConfig>,
}
