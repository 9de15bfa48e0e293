//! Index page.

use crate::error::AppError;
use crate::extractors::FragmentRequest;
use crate::handlers::finish;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::Response};
use minijinja::context;
use serde::Serialize;

#[derive(Serialize)]
struct Screen {
    title: String,
    url: String,
}

#[derive(Serialize)]
struct Section {
    module: String,
    screens: Vec<Screen>,
}

/// Screens grouped by module, in catalog order.
fn sections(state: &AppState) -> Vec<Section> {
    let mut out: Vec<Section> = Vec::new();
    for e in state.catalog.entities() {
        let screen = Screen {
            title: e.view.title(),
            url: e.base_path(),
        };
        match out.iter_mut().find(|s| s.module == e.module) {
            Some(section) => section.screens.push(screen),
            None => out.push(Section {
                module: e.module.clone(),
                screens: vec![screen],
            }),
        }
    }
    out
}

/// GET /: links to every screen in the catalog.
pub async fn index(State(state): State<AppState>, FragmentRequest(fragment): FragmentRequest) -> Response {
    let result: Result<Response, AppError> = state.renderer.respond(
        fragment,
        "index.html",
        context! { sections => sections(&state) },
        Some("/"),
        StatusCode::OK,
    );
    finish(fragment, result)
}
