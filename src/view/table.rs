//! Table rendering entry point: merge request values over view defaults,
//! narrow and order the rows, shape the template context.

use crate::config::{ActionButtons, EntityConfig, TableColumn, TableConfig};
use crate::error::AppError;
use crate::naming::plural_key;
use crate::service::Row;
use crate::view::filter::{filter, FilterSpec, ACTIVE_ONLY_PARAM, FILTER_PREFIX, SEARCH_PARAM};
use crate::view::render::Renderer;
use crate::view::sort::{paginate, sort, sort_params, Page, SortSpec};
use axum::{http::StatusCode, response::Response};
use minijinja::{context, Value};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Per-request list state. Every field left `None` falls back to the view's default.
#[derive(Clone, Debug, Default)]
pub struct ListQuery {
    pub filters: Option<FilterSpec>,
    pub sort_by: Option<String>,
    pub sort_asc: Option<bool>,
    pub page: Option<usize>,
}

impl ListQuery {
    pub fn from_params(params: &HashMap<String, String>, view: &TableConfig) -> Self {
        let filters = FilterSpec::from_query(params, view);
        let (sort_by, sort_asc) = sort_params(params, view);
        let page = params.get("page").and_then(|p| p.trim().parse::<usize>().ok());
        ListQuery {
            filters: (!filters.params.is_empty()).then_some(filters),
            sort_by,
            sort_asc,
            page,
        }
    }
}

/// The list-state parameters of a request (search, filters, sort, page), so a
/// form or mutation can hand them back to the table it refreshes.
pub fn list_params(params: &HashMap<String, String>) -> BTreeMap<String, String> {
    params
        .iter()
        .filter(|(k, v)| {
            let k = k.as_str();
            let listed = matches!(k, SEARCH_PARAM | ACTIVE_ONLY_PARAM | "sort_by" | "sort_asc" | "page")
                || k.starts_with(FILTER_PREFIX);
            listed && !v.trim().is_empty()
        })
        .map(|(k, v)| (k.clone(), v.trim().to_string()))
        .collect()
}

/// Supplied sort values win; otherwise the view default. No key at all means no sorting.
pub fn effective_sort(view: &TableConfig, sort_by: Option<&str>, sort_asc: Option<bool>) -> Option<SortSpec> {
    let key = sort_by.or(view.default_sort_by.as_deref())?;
    Some(SortSpec::new(key, sort_asc.unwrap_or(view.default_sort_asc)))
}

#[derive(Debug, Serialize)]
pub struct TableContext {
    pub entity_name: String,
    pub entity_title: String,
    pub entity_title_singular: String,
    pub base_path: String,
    pub columns: Vec<TableColumn>,
    pub items: Vec<Row>,
    /// Entity-specific alias of `items`, e.g. `courses`.
    #[serde(flatten)]
    pub aliases: BTreeMap<String, Vec<Row>>,
    pub filters: BTreeMap<String, String>,
    pub search: String,
    pub active_only: bool,
    pub has_active: bool,
    pub sort_by: Option<String>,
    pub sort_asc: bool,
    pub pagination: Option<Page>,
    pub searchable: bool,
    pub action_buttons: ActionButtons,
    /// Everything needed to re-request this exact view.
    pub list_params: BTreeMap<String, String>,
}

/// Filter, sort and page `rows` for display.
pub fn table_context(entity: &EntityConfig, rows: Vec<Row>, query: &ListQuery) -> TableContext {
    let view = &entity.view;
    let sort_spec = effective_sort(view, query.sort_by.as_deref(), query.sort_asc);

    let rows = match &query.filters {
        Some(spec) => filter(rows, spec),
        None => rows,
    };
    let rows = sort(rows, sort_spec.as_ref(), &view.columns);
    let (items, pagination) = if view.enable_pagination {
        let mut page = paginate(rows, query.page.unwrap_or(1), view.items_per_page);
        (std::mem::take(&mut page.items), Some(page))
    } else {
        (rows, None)
    };

    let mut aliases = BTreeMap::new();
    let alias = plural_key(&entity.name);
    if alias != "items" {
        aliases.insert(alias, items.clone());
    }
    let filters = query.filters.clone().unwrap_or_default();

    let mut list_params = filters.params.clone();
    if let Some(spec) = &sort_spec {
        list_params.insert("sort_by".into(), spec.key.clone());
        list_params.insert("sort_asc".into(), spec.ascending.to_string());
    }
    if let Some(page) = &pagination {
        list_params.insert("page".into(), page.page.to_string());
    }

    TableContext {
        entity_name: entity.name.clone(),
        entity_title: view.title(),
        entity_title_singular: view.title_singular(),
        base_path: entity.base_path(),
        columns: view.columns.iter().filter(|c| c.visible).cloned().collect(),
        items,
        aliases,
        search: filters.search().unwrap_or_default().to_string(),
        active_only: filters.active_only(),
        filters: filters.params,
        has_active: view.column("active").is_some(),
        sort_by: sort_spec.as_ref().map(|s| s.key.clone()),
        sort_asc: sort_spec.map(|s| s.ascending).unwrap_or(view.default_sort_asc),
        pagination,
        searchable: view.searchable,
        action_buttons: view.action_buttons.clone(),
        list_params,
    }
}

/// Render the entity table through the render adapter with the view's template.
/// A navigation (`url` given) also emits the empty form slot next to the table;
/// data refreshes leave an open form alone.
pub fn render(
    renderer: &Renderer,
    fragment: bool,
    entity: &EntityConfig,
    rows: Vec<Row>,
    query: &ListQuery,
    url: Option<&str>,
) -> Result<Response, AppError> {
    let ctx = table_context(entity, rows, query);
    renderer.respond(
        fragment,
        entity.view.template(),
        context! { form_slot => url.is_some(), ..Value::from_serialize(&ctx) },
        url,
        StatusCode::OK,
    )
}

/// The table alone as HTML, for multi-fragment responses.
pub fn render_html(renderer: &Renderer, entity: &EntityConfig, rows: Vec<Row>, query: &ListQuery) -> Result<String, AppError> {
    let ctx = table_context(entity, rows, query);
    renderer.fragment(entity.view.template(), Value::from_serialize(&ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{builtin_catalog, resolve};
    use serde_json::json;

    fn courses() -> Vec<Row> {
        [
            json!({"id": "1", "code": "eng201", "title": "Writing", "active": true}),
            json!({"id": "2", "code": "CS101", "title": "Intro", "active": false}),
            json!({"id": "3", "code": "art100", "title": "Drawing", "active": true}),
        ]
        .into_iter()
        .filter_map(|v| v.as_object().cloned())
        .collect()
    }

    fn codes(ctx: &TableContext) -> Vec<&str> {
        ctx.items.iter().filter_map(|r| r.get("code").and_then(|v| v.as_str())).collect()
    }

    #[test]
    fn defaults_apply_without_overrides() {
        let catalog = resolve(&builtin_catalog()).expect("catalog");
        let course = catalog.entity("school", "courses").expect("courses");
        let ctx = table_context(course, courses(), &ListQuery::default());
        assert_eq!(ctx.sort_by.as_deref(), Some("code"));
        assert!(ctx.sort_asc);
        assert_eq!(codes(&ctx), vec!["art100", "CS101", "eng201"]);
    }

    #[test]
    fn supplied_values_win() {
        let catalog = resolve(&builtin_catalog()).expect("catalog");
        let course = catalog.entity("school", "courses").expect("courses");
        let query = ListQuery {
            sort_by: Some("title".into()),
            sort_asc: Some(false),
            ..ListQuery::default()
        };
        let ctx = table_context(course, courses(), &query);
        assert_eq!(ctx.sort_by.as_deref(), Some("title"));
        assert!(!ctx.sort_asc);
        assert_eq!(codes(&ctx), vec!["eng201", "CS101", "art100"]);
    }

    #[test]
    fn context_carries_plural_alias_and_filter_state() {
        let catalog = resolve(&builtin_catalog()).expect("catalog");
        let course = catalog.entity("school", "courses").expect("courses");
        let mut params = HashMap::new();
        params.insert("active_only".to_string(), "true".to_string());
        let query = ListQuery::from_params(&params, &course.view);
        let ctx = table_context(course, courses(), &query);
        assert!(ctx.active_only);
        assert_eq!(ctx.items.len(), 2);
        let v = serde_json::to_value(&ctx).expect("serialize");
        assert_eq!(v["courses"], v["items"]);
        assert_eq!(v["entity_title"], json!("Courses"));
        assert_eq!(v["pagination"]["total_items"], json!(2));
    }

    #[test]
    fn list_params_echo_the_effective_view() {
        let catalog = resolve(&builtin_catalog()).expect("catalog");
        let course = catalog.entity("school", "courses").expect("courses");
        let mut params = HashMap::new();
        params.insert("q".to_string(), "r".to_string());
        params.insert("sort_by".to_string(), "title".to_string());
        let ctx = table_context(course, courses(), &ListQuery::from_params(&params, &course.view));
        assert_eq!(ctx.list_params.get("q").map(String::as_str), Some("r"));
        assert_eq!(ctx.list_params.get("sort_by").map(String::as_str), Some("title"));
        assert_eq!(ctx.list_params.get("sort_asc").map(String::as_str), Some("true"));
        assert_eq!(ctx.list_params.get("page").map(String::as_str), Some("1"));
    }

    #[test]
    fn list_params_keep_only_list_state() {
        let mut params = HashMap::new();
        for (k, v) in [("q", "x"), ("filter_title", "a"), ("page", "2"), ("code", "CS101"), ("sort_by", " ")] {
            params.insert(k.to_string(), v.to_string());
        }
        let kept: Vec<String> = list_params(&params).into_keys().collect();
        assert_eq!(kept, vec!["filter_title", "page", "q"]);
    }

    #[test]
    fn effective_sort_without_default_is_none() {
        let view = TableConfig::new("thing", vec![TableColumn::text("name")]);
        assert_eq!(effective_sort(&view, None, None), None);
        assert_eq!(effective_sort(&view, Some("name"), None), Some(SortSpec::new("name", true)));
    }
}
