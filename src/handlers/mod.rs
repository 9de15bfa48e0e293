pub mod entity;
pub mod pages;
pub mod stream;

use crate::config::EntityConfig;
use crate::error::AppError;
use crate::response::{message_box, MessageKind};
use crate::state::AppState;
use crate::view::render::MESSAGES_SELECTOR;
use crate::view::{fragments_response, Fragment};
use axum::response::{IntoResponse, Response};

/// Entity served at `/<module>/<collection>`.
pub(crate) fn lookup<'a>(state: &'a AppState, module: &str, collection: &str) -> Result<&'a EntityConfig, AppError> {
    state
        .catalog
        .entity(module, collection)
        .ok_or_else(|| AppError::NotFound(format!("no screen at /{}/{}", module, collection)))
}

/// Route boundary: errors become an inline message box. Fragment requests get it
/// merged into the page's message area, full-page requests as the response body.
pub(crate) fn finish(fragment: bool, result: Result<Response, AppError>) -> Response {
    match result {
        Ok(res) => res,
        Err(err) if fragment => {
            err.log();
            let html = message_box(MessageKind::Error, &err.user_message());
            fragments_response(err.status(), vec![Fragment::inner(MESSAGES_SELECTOR, html)])
        }
        Err(err) => err.into_response(),
    }
}
