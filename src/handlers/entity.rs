//! Generic CRUD handlers, one set for every entity in the catalog.

use crate::config::{EntityConfig, FieldType};
use crate::error::AppError;
use crate::extractors::FragmentRequest;
use crate::handlers::{finish, lookup};
use crate::notify::{ChangeKind, ChangeNotice};
use crate::response::{message_box, mutation_message, MessageKind};
use crate::service::{parse_form, project_rows, FormMode, Record, Row, RowRepository};
use crate::state::AppState;
use crate::view::render::MESSAGES_SELECTOR;
use crate::view::{self, fragments_response, list_params, Fragment, ListQuery};
use axum::{
    extract::{rejection::FormRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use minijinja::Value;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

type Submitted = Result<Form<HashMap<String, String>>, FormRejection>;

async fn load_rows(state: &AppState, entity: &EntityConfig) -> Result<Vec<Row>, AppError> {
    let pool = state.stores.pool(entity.store);
    let rows = RowRepository::get_all(pool, &entity.table).await?;
    Ok(project_rows(entity, &rows))
}

fn form_fields(submitted: Submitted) -> Result<HashMap<String, String>, AppError> {
    submitted
        .map(|Form(f)| f)
        .map_err(|e| AppError::BadRequest(format!("unreadable form: {}", e.body_text())))
}

fn checked_id(id: &str) -> Result<&str, AppError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(AppError::BadRequest("missing id".into()));
    }
    Ok(id)
}

/// GET /:module/:collection: list page. As a fragment it navigates: the
/// table replaces the main content and the browser URL follows.
pub async fn list_page(
    State(state): State<AppState>,
    Path((module, collection)): Path<(String, String)>,
    FragmentRequest(fragment): FragmentRequest,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let result = async {
        let entity = lookup(&state, &module, &collection)?;
        let rows = load_rows(&state, entity).await?;
        let query = ListQuery::from_params(&params, &entity.view);
        let url = entity.base_path();
        view::render(&state.renderer, fragment, entity, rows, &query, Some(&url))
    }
    .await;
    finish(fragment, result)
}

/// GET /:module/:collection/data: the table alone, filtered, sorted and paged server side.
pub async fn list_data(
    State(state): State<AppState>,
    Path((module, collection)): Path<(String, String)>,
    FragmentRequest(fragment): FragmentRequest,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let result = async {
        let entity = lookup(&state, &module, &collection)?;
        let rows = load_rows(&state, entity).await?;
        let query = ListQuery::from_params(&params, &entity.view);
        view::render(&state.renderer, fragment, entity, rows, &query, None)
    }
    .await;
    finish(fragment, result)
}

#[derive(Debug, Serialize)]
struct FormField {
    name: String,
    label: String,
    #[serde(rename = "type")]
    type_: FieldType,
    value: serde_json::Value,
    required: bool,
    pattern: Option<String>,
    max_length: Option<u32>,
}

#[derive(Debug, Serialize)]
struct FormContext {
    entity_name: String,
    entity_title: String,
    entity_title_singular: String,
    base_path: String,
    fields: Vec<FormField>,
    item: Record,
    is_new: bool,
    action: String,
    method: &'static str,
    /// List state handed back on submit so the refreshed table keeps it.
    list_params: BTreeMap<String, String>,
}

fn form_context(entity: &EntityConfig, record: Record, list_params: BTreeMap<String, String>) -> FormContext {
    let is_new = record.id.is_empty();
    let fields = entity
        .fields
        .iter()
        .map(|f| FormField {
            name: f.name.clone(),
            label: f.label(),
            type_: f.type_,
            value: record.get(&f.name).cloned().unwrap_or(serde_json::Value::Null),
            required: f.validation.required == Some(true),
            pattern: f.validation.pattern.clone(),
            max_length: f.validation.max_length,
        })
        .collect();
    let base_path = entity.base_path();
    let action = if is_new {
        base_path.clone()
    } else {
        format!("{}/{}", base_path, record.id)
    };
    FormContext {
        entity_name: entity.name.clone(),
        entity_title: entity.view.title(),
        entity_title_singular: entity.view.title_singular(),
        base_path,
        fields,
        item: record,
        is_new,
        action,
        method: if is_new { "post" } else { "put" },
        list_params,
    }
}

fn render_form(
    state: &AppState,
    fragment: bool,
    entity: &EntityConfig,
    record: Record,
    params: &HashMap<String, String>,
) -> Result<Response, AppError> {
    let ctx = form_context(entity, record, list_params(params));
    state.renderer.respond(
        fragment,
        entity.form_template(),
        Value::from_serialize(&ctx),
        None,
        StatusCode::OK,
    )
}

/// GET /:module/:collection/new: empty creation form.
pub async fn new_form(
    State(state): State<AppState>,
    Path((module, collection)): Path<(String, String)>,
    FragmentRequest(fragment): FragmentRequest,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let result = lookup(&state, &module, &collection)
        .and_then(|entity| render_form(&state, fragment, entity, Record::blank(entity), &params));
    finish(fragment, result)
}

/// GET /:module/:collection/:id: edit form for a stored record.
pub async fn edit_form(
    State(state): State<AppState>,
    Path((module, collection, id)): Path<(String, String, String)>,
    FragmentRequest(fragment): FragmentRequest,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let result = async {
        let entity = lookup(&state, &module, &collection)?;
        let id = checked_id(&id)?;
        let pool = state.stores.pool(entity.store);
        let row = RowRepository::get(pool, &entity.table, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} '{}'", entity.view.title_singular(), id)))?;
        render_form(&state, fragment, entity, Record::from_row(entity, &row), &params)
    }
    .await;
    finish(fragment, result)
}

/// Mutation response. Fragment mode: success message, the table refreshed with
/// the list state the request carried, and a cleared form. Full-page mode: 303
/// back to the list.
async fn after_mutation(
    state: &AppState,
    fragment: bool,
    entity: &EntityConfig,
    id: String,
    kind: ChangeKind,
    params: &HashMap<String, String>,
) -> Result<Response, AppError> {
    state.notifier.publish(ChangeNotice {
        entity: entity.name.clone(),
        id,
        kind,
    });
    if !fragment {
        return Ok(Redirect::to(&entity.base_path()).into_response());
    }
    let rows = load_rows(state, entity).await?;
    let query = ListQuery::from_params(params, &entity.view);
    let table = view::table::render_html(&state.renderer, entity, rows, &query)?;
    let message = message_box(
        MessageKind::Success,
        &mutation_message(&entity.view.title_singular(), kind.verb()),
    );
    Ok(fragments_response(
        StatusCode::OK,
        vec![
            Fragment::inner(MESSAGES_SELECTOR, message),
            Fragment::new(table),
            Fragment::inner(&format!("#{}-form", entity.name), ""),
        ],
    ))
}

/// POST /:module/:collection: create from form fields.
pub async fn create(
    State(state): State<AppState>,
    Path((module, collection)): Path<(String, String)>,
    FragmentRequest(fragment): FragmentRequest,
    Query(params): Query<HashMap<String, String>>,
    submitted: Submitted,
) -> Response {
    let result = async {
        let entity = lookup(&state, &module, &collection)?;
        let fields = parse_form(entity, &form_fields(submitted)?, FormMode::Create)?;
        let pool = state.stores.pool(entity.store);
        let row = RowRepository::create(pool, &entity.table, Some(&fields)).await?;
        let id = Record::from_row(entity, &row).id;
        tracing::info!(entity = %entity.name, id = %id, "record created");
        after_mutation(&state, fragment, entity, id, ChangeKind::Created, &params).await
    }
    .await;
    finish(fragment, result)
}

/// PUT /:module/:collection/:id: rewrite the submitted fields. A missing id is not found.
pub async fn update(
    State(state): State<AppState>,
    Path((module, collection, id)): Path<(String, String, String)>,
    FragmentRequest(fragment): FragmentRequest,
    Query(params): Query<HashMap<String, String>>,
    submitted: Submitted,
) -> Response {
    let result = async {
        let entity = lookup(&state, &module, &collection)?;
        let id = checked_id(&id)?.to_string();
        let mut fields = parse_form(entity, &form_fields(submitted)?, FormMode::Update)?;
        fields.insert("id".into(), serde_json::Value::String(id.clone()));
        let pool = state.stores.pool(entity.store);
        let affected = RowRepository::update(pool, &entity.table, &fields).await?;
        if affected == 0 {
            return Err(AppError::NotFound(format!("{} '{}'", entity.view.title_singular(), id)));
        }
        tracing::info!(entity = %entity.name, id = %id, "record updated");
        after_mutation(&state, fragment, entity, id, ChangeKind::Updated, &params).await
    }
    .await;
    finish(fragment, result)
}

/// DELETE /:module/:collection/:id: idempotent.
pub async fn delete(
    State(state): State<AppState>,
    Path((module, collection, id)): Path<(String, String, String)>,
    FragmentRequest(fragment): FragmentRequest,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let result = async {
        let entity = lookup(&state, &module, &collection)?;
        let id = checked_id(&id)?.to_string();
        let pool = state.stores.pool(entity.store);
        let affected = RowRepository::delete(pool, &entity.table, &id).await?;
        tracing::info!(entity = %entity.name, id = %id, affected, "record deleted");
        after_mutation(&state, fragment, entity, id, ChangeKind::Deleted, &params).await
    }
    .await;
    finish(fragment, result)
}
