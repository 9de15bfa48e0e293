//! Load the entity catalog: built-in definitions or a JSON file.

use crate::config::resolved::Catalog;
use crate::config::types::*;
use crate::config::validate;
use crate::error::ConfigError;
use serde_json::{json, Value};
use std::path::Path;

/// Build the runtime catalog from config (validates first).
pub fn resolve(config: &CatalogConfig) -> Result<Catalog, ConfigError> {
    validate(config)?;
    let entities = config
        .entities
        .iter()
        .cloned()
        .map(|mut e| {
            e.view.resolve_defaults();
            e
        })
        .collect();
    Ok(Catalog::new(entities))
}

pub fn load_from_str(json: &str) -> Result<CatalogConfig, ConfigError> {
    serde_json::from_str(json).map_err(|e| ConfigError::Load(format!("catalog json: {}", e)))
}

pub async fn load_from_path(path: &Path) -> Result<CatalogConfig, ConfigError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    load_from_str(&text)
}

fn field(name: &str, type_: FieldType) -> FieldConfig {
    FieldConfig {
        name: name.to_string(),
        type_,
        label: None,
        default: None,
        validation: ValidationRule::default(),
    }
}

fn text(name: &str) -> FieldConfig {
    FieldConfig {
        default: Some(json!("")),
        ..field(name, FieldType::Text)
    }
}

fn required_text(name: &str, max_length: u32) -> FieldConfig {
    FieldConfig {
        validation: ValidationRule {
            required: Some(true),
            min_length: Some(1),
            max_length: Some(max_length),
            ..ValidationRule::default()
        },
        ..field(name, FieldType::Text)
    }
}

fn with_rule(mut f: FieldConfig, rule: ValidationRule) -> FieldConfig {
    f.validation = rule;
    f
}

fn flag(name: &str) -> FieldConfig {
    FieldConfig {
        default: Some(Value::Bool(false)),
        ..field(name, FieldType::Boolean)
    }
}

fn active() -> FieldConfig {
    flag("active")
}

fn uuid_ref(name: &str) -> FieldConfig {
    FieldConfig {
        validation: ValidationRule {
            required: Some(true),
            format: Some("uuid".into()),
            ..ValidationRule::default()
        },
        ..field(name, FieldType::Text)
    }
}

fn entity(
    module: &str,
    path_segment: &str,
    name: &str,
    store: StoreKind,
    fields: Vec<FieldConfig>,
    view: TableConfig,
) -> EntityConfig {
    EntityConfig {
        name: name.to_string(),
        module: module.to_string(),
        path_segment: path_segment.to_string(),
        table: name.to_string(),
        store,
        fields,
        view,
        form_template: None,
    }
}

/// Course code: letters followed by digits with an optional suffix, e.g. "CS101", "ENG201A".
pub const COURSE_CODE_PATTERN: &str = r"^[A-Za-z]{1,6}[0-9]{1,4}[A-Za-z]?$";
const TIME_PATTERN: &str = r"^([01][0-9]|2[0-3]):[0-5][0-9]$";
const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

fn school_entities() -> Vec<EntityConfig> {
    let course = entity(
        "school",
        "courses",
        "course",
        StoreKind::School,
        vec![
            with_rule(
                text("code"),
                ValidationRule {
                    required: Some(true),
                    pattern: Some(COURSE_CODE_PATTERN.into()),
                    ..ValidationRule::default()
                },
            ),
            required_text("title", 120),
            active(),
        ],
        TableConfig {
            entity_title: Some("Courses".into()),
            entity_title_singular: Some("Course".into()),
            ..TableConfig::new(
                "course",
                vec![
                    TableColumn::text("code")
                        .case_insensitive()
                        .custom("formatters/course_code.html"),
                    TableColumn::text("title"),
                    TableColumn::boolean("active"),
                ],
            )
            .sorted_by("code", true)
        },
    );

    let teacher = entity(
        "school",
        "teachers",
        "teacher",
        StoreKind::School,
        vec![
            required_text("name", 80),
            FieldConfig {
                label: Some("Name JP".into()),
                ..text("nameJP")
            },
            with_rule(
                text("email"),
                ValidationRule {
                    format: Some("email".into()),
                    max_length: Some(120),
                    ..ValidationRule::default()
                },
            ),
            text("note"),
            active(),
        ],
        TableConfig::new(
            "teacher",
            vec![
                TableColumn::text("name").case_insensitive(),
                TableColumn::text("nameJP").labeled("Name JP"),
                TableColumn::text("email").case_insensitive(),
                TableColumn::text("note"),
                TableColumn::boolean("active"),
            ],
        )
        .sorted_by("name", true),
    );

    let room = entity(
        "school",
        "rooms",
        "room",
        StoreKind::School,
        vec![
            required_text("name", 60),
            text("type"),
            FieldConfig {
                default: Some(json!(0)),
                validation: ValidationRule {
                    minimum: Some(0.0),
                    maximum: Some(1000.0),
                    ..ValidationRule::default()
                },
                ..field("capacity", FieldType::Integer)
            },
            active(),
        ],
        TableConfig::new(
            "room",
            vec![
                TableColumn::text("name").case_insensitive(),
                TableColumn::text("type"),
                TableColumn::integer("capacity"),
                TableColumn::boolean("active"),
            ],
        )
        .sorted_by("name", true),
    );

    let time_rule = ValidationRule {
        required: Some(true),
        pattern: Some(TIME_PATTERN.into()),
        ..ValidationRule::default()
    };
    let timeslot = entity(
        "school",
        "timeslots",
        "timeslot",
        StoreKind::School,
        vec![
            with_rule(
                text("weekday"),
                ValidationRule {
                    required: Some(true),
                    allowed: Some(WEEKDAYS.iter().map(|d| json!(d)).collect()),
                    ..ValidationRule::default()
                },
            ),
            with_rule(text("start_time"), time_rule.clone()),
            with_rule(text("end_time"), time_rule),
            active(),
        ],
        TableConfig::new(
            "timeslot",
            vec![
                TableColumn::text("weekday"),
                TableColumn::text("start_time"),
                TableColumn::text("end_time"),
                TableColumn::boolean("active"),
            ],
        )
        .sorted_by("start_time", true),
    );

    vec![course, teacher, room, timeslot]
}

fn survey_entities() -> Vec<EntityConfig> {
    let level = entity(
        "survey",
        "levels",
        "survey_level",
        StoreKind::School,
        vec![required_text("level", 40)],
        TableConfig {
            entity_title: Some("Survey Levels".into()),
            ..TableConfig::new("survey_level", vec![TableColumn::text("level")]).sorted_by("level", true)
        },
    );

    let group = entity(
        "survey",
        "groups",
        "survey_group",
        StoreKind::School,
        vec![
            required_text("course_group", 60),
            with_rule(
                text("course_code"),
                ValidationRule {
                    pattern: Some(COURSE_CODE_PATTERN.into()),
                    ..ValidationRule::default()
                },
            ),
            text("course_title"),
            active(),
        ],
        TableConfig {
            entity_title: Some("Survey Course Groups".into()),
            ..TableConfig::new(
                "survey_group",
                vec![
                    TableColumn::text("course_group"),
                    TableColumn::text("course_code").case_insensitive(),
                    TableColumn::text("course_title"),
                    TableColumn::boolean("active"),
                ],
            )
            .sorted_by("course_group", true)
        },
    );

    let table = entity(
        "survey",
        "tables",
        "survey_table",
        StoreKind::School,
        vec![
            required_text("name", 80),
            text("description"),
            text("option_codes"),
            text("courses_group"),
        ],
        TableConfig::new(
            "survey_table",
            vec![
                TableColumn::text("name"),
                TableColumn::text("description"),
                TableColumn::text("option_codes"),
                TableColumn::text("courses_group"),
            ],
        )
        .sorted_by("name", true),
    );

    let image = entity(
        "survey",
        "images",
        "survey_image",
        StoreKind::School,
        vec![required_text("filename", 200)],
        TableConfig::new("survey_image", vec![TableColumn::text("filename")]).sorted_by("filename", true),
    );

    let survey = entity(
        "survey",
        "surveys",
        "survey",
        StoreKind::School,
        vec![
            required_text("title", 120),
            text("introduction"),
            text("explanation"),
            text("intensive_chart"),
            text("intensive_table_1"),
            text("intensive_table_2"),
            text("general_chart"),
            text("general_table"),
        ],
        TableConfig {
            entity_title: Some("Surveys".into()),
            ..TableConfig::new(
                "survey",
                vec![
                    TableColumn::text("title"),
                    TableColumn::text("introduction"),
                    TableColumn::text("general_table"),
                ],
            )
            .sorted_by("title", true)
        },
    );

    let survey_config = entity(
        "survey",
        "configs",
        "survey_config",
        StoreKind::School,
        vec![uuid_ref("current_survey"), active()],
        TableConfig {
            entity_title: Some("Survey Configs".into()),
            ..TableConfig::new(
                "survey_config",
                vec![TableColumn::text("current_survey"), TableColumn::boolean("active")],
            )
        },
    );

    vec![level, group, table, image, survey, survey_config]
}

fn spin_entities() -> Vec<EntityConfig> {
    let spin_class = entity(
        "spin",
        "spin_classes",
        "spin_class",
        StoreKind::Spin,
        vec![
            required_text("title", 120),
            with_rule(
                text("course_code"),
                ValidationRule {
                    pattern: Some(COURSE_CODE_PATTERN.into()),
                    ..ValidationRule::default()
                },
            ),
            text("timeslot"),
            text("teacher_name"),
            text("room_name"),
            text("for_program"),
        ],
        TableConfig {
            entity_title: Some("SPIN Classes".into()),
            entity_title_singular: Some("SPIN Class".into()),
            ..TableConfig::new(
                "spin_class",
                vec![
                    TableColumn::text("title"),
                    TableColumn::text("course_code").case_insensitive(),
                    TableColumn::text("timeslot"),
                    TableColumn::text("teacher_name"),
                    TableColumn::text("room_name"),
                    TableColumn::text("for_program"),
                ],
            )
            .sorted_by("course_code", true)
        },
    );

    let student = entity(
        "spin",
        "students",
        "student",
        StoreKind::Spin,
        vec![
            with_rule(
                text("email"),
                ValidationRule {
                    required: Some(true),
                    format: Some("email".into()),
                    max_length: Some(120),
                    ..ValidationRule::default()
                },
            ),
            required_text("firstName", 60),
            required_text("lastName", 60),
            text("level"),
            text("program"),
            field("created_at", FieldType::Timestamp),
            active(),
        ],
        TableConfig::new(
            "student",
            vec![
                TableColumn::text("firstName"),
                TableColumn::text("lastName").case_insensitive(),
                TableColumn::text("email").case_insensitive(),
                TableColumn::text("level"),
                TableColumn::text("program"),
                TableColumn::timestamp("created_at"),
                TableColumn::boolean("active"),
            ],
        )
        .sorted_by("lastName", true),
    );

    let selection = entity(
        "spin",
        "selections",
        "student_selection",
        StoreKind::Spin,
        vec![
            uuid_ref("student_id"),
            required_text("preference_code", 20),
            with_rule(
                text("course_code"),
                ValidationRule {
                    required: Some(true),
                    pattern: Some(COURSE_CODE_PATTERN.into()),
                    ..ValidationRule::default()
                },
            ),
            flag("assigned"),
        ],
        TableConfig {
            entity_title: Some("Selections".into()),
            entity_title_singular: Some("Selection".into()),
            ..TableConfig::new(
                "student_selection",
                vec![
                    TableColumn::text("student_id"),
                    TableColumn::text("preference_code"),
                    TableColumn::text("course_code").case_insensitive(),
                    TableColumn::boolean("assigned"),
                ],
            )
            .sorted_by("preference_code", true)
        },
    );

    let assignment = entity(
        "spin",
        "assignments",
        "assignment",
        StoreKind::Spin,
        vec![uuid_ref("student_id"), uuid_ref("spin_class_id"), flag("uploaded")],
        TableConfig::new(
            "assignment",
            vec![
                TableColumn::text("student_id"),
                TableColumn::text("spin_class_id"),
                TableColumn::boolean("uploaded"),
            ],
        ),
    );

    vec![spin_class, student, selection, assignment]
}

/// The catalog shipped with the application.
pub fn builtin_catalog() -> CatalogConfig {
    let mut entities = school_entities();
    entities.extend(survey_entities());
    entities.extend(spin_entities());
    CatalogConfig { entities }
}
