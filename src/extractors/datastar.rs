//! Detect Datastar partial-update requests (`Datastar-Request: true`).

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

pub const DATASTAR_REQUEST_HEADER: &str = "Datastar-Request";

/// `true` when the request asks for a fragment instead of a full page.
/// Only the exact value `true` counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FragmentRequest(pub bool);

#[async_trait]
impl<S> FromRequestParts<S> for FragmentRequest
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let is_fragment = parts
            .headers
            .get(DATASTAR_REQUEST_HEADER)
            .and_then(|v| v.to_str().ok())
            .map_or(false, |v| v == "true");
        Ok(FragmentRequest(is_fragment))
    }
}
