//! Entity screen routes. Path parameters carry module and collection; handlers
//! resolve the entity from the catalog.

use crate::handlers::entity::{create, delete, edit_form, list_data, list_page, new_form, update};
use crate::handlers::stream::stream;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn entity_routes(state: AppState) -> Router {
    Router::new()
        .route("/:module/:collection", get(list_page).post(create))
        .route("/:module/:collection/data", get(list_data))
        .route("/:module/:collection/new", get(new_form))
        .route("/:module/:collection/stream", get(stream))
        .route(
            "/:module/:collection/:id",
            get(edit_form).put(update).delete(delete),
        )
        .with_state(state)
}
