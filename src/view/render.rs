//! Render adapter: full HTML document or Datastar fragment, decided per request.

use crate::error::AppError;
use crate::menu::MenuSection;
use crate::view::templates::TEMPLATES;
use axum::{
    http::StatusCode,
    response::{
        sse::{Event, Sse},
        Html, IntoResponse, Response,
    },
};
use minijinja::{context, Environment, Value};
use std::convert::Infallible;

/// Datastar event that merges HTML fragments into the page.
pub const MERGE_FRAGMENTS_EVENT: &str = "datastar-merge-fragments";
pub const LAYOUT_TEMPLATE: &str = "layout/base.html";
/// Layout element holding the page content.
pub const MAIN_SELECTOR: &str = "#main";
/// Layout element receiving message boxes.
pub const MESSAGES_SELECTOR: &str = "#messages";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeMode {
    /// Datastar's default; not sent on the wire.
    Morph,
    Inner,
    Outer,
}

impl MergeMode {
    fn as_str(self) -> &'static str {
        match self {
            MergeMode::Morph => "morph",
            MergeMode::Inner => "inner",
            MergeMode::Outer => "outer",
        }
    }
}

/// One HTML fragment to merge. Without a selector the client matches by element id.
#[derive(Clone, Debug)]
pub struct Fragment {
    pub html: String,
    pub selector: Option<String>,
    pub merge_mode: MergeMode,
}

impl Fragment {
    pub fn new(html: impl Into<String>) -> Self {
        Fragment {
            html: html.into(),
            selector: None,
            merge_mode: MergeMode::Morph,
        }
    }

    /// Replace the children of the element matched by `selector`.
    pub fn inner(selector: &str, html: impl Into<String>) -> Self {
        Fragment {
            html: html.into(),
            selector: Some(selector.to_string()),
            merge_mode: MergeMode::Inner,
        }
    }

    /// Data lines of the SSE event. Carriage returns are dropped; SSE cannot carry them.
    pub fn data_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(sel) = &self.selector {
            lines.push(format!("selector {}", sel));
        }
        if self.merge_mode != MergeMode::Morph {
            lines.push(format!("mergeMode {}", self.merge_mode.as_str()));
        }
        let html = self.html.replace('\r', "");
        lines.extend(html.lines().map(|l| format!("fragments {}", l)));
        lines
    }

    pub fn to_event(&self) -> Event {
        Event::default()
            .event(MERGE_FRAGMENTS_EVENT)
            .data(self.data_lines().join("\n"))
    }
}

/// Stream fragments as one `text/event-stream` response.
pub fn fragments_response(status: StatusCode, fragments: Vec<Fragment>) -> Response {
    let events: Vec<Result<Event, Infallible>> = fragments.iter().map(|f| Ok(f.to_event())).collect();
    let mut res = Sse::new(futures::stream::iter(events)).into_response();
    *res.status_mut() = status;
    res
}

/// Wrap HTML so the client swaps the browser URL to `url` when merging it.
pub fn with_replace_url(html: &str, url: &str) -> String {
    format!("<div data-replace-url=\"'{}'\">{}</div>", attr_escape(url), html)
}

/// Escape for a single-quoted string inside a double-quoted attribute. Slashes stay.
fn attr_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Template environment with every embedded template, filters and globals.
pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    pub fn new(menu: &[MenuSection]) -> Result<Self, AppError> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        env.add_filter("datetime", format_datetime);
        env.add_global("menu", Value::from_serialize(menu));
        env.add_global("app_name", "School Admin");
        Ok(Renderer { env })
    }

    /// Render one template. Missing templates and template errors propagate.
    pub fn render(&self, template: &str, ctx: Value) -> Result<String, AppError> {
        Ok(self.env.get_template(template)?.render(ctx)?)
    }

    /// The template alone, marked standalone for partial updates.
    pub fn fragment(&self, template: &str, ctx: Value) -> Result<String, AppError> {
        self.render(template, context! { standalone => true, ..ctx })
    }

    /// The template inside the document layout.
    pub fn page(&self, template: &str, ctx: Value) -> Result<String, AppError> {
        let ctx = context! { standalone => false, ..ctx };
        let body = self.render(template, ctx.clone())?;
        self.render(
            LAYOUT_TEMPLATE,
            context! { content => Value::from_safe_string(body), ..ctx },
        )
    }

    /// Fragment mode: one merge event. With a URL the fragment is a navigation:
    /// it replaces the main content and swaps the browser URL.
    /// Page mode: a complete document with `status`.
    pub fn respond(
        &self,
        fragment: bool,
        template: &str,
        ctx: Value,
        url: Option<&str>,
        status: StatusCode,
    ) -> Result<Response, AppError> {
        if fragment {
            let html = self.fragment(template, ctx)?;
            let fragment = match url {
                Some(url) => Fragment::inner(MAIN_SELECTOR, with_replace_url(&html, url)),
                None => Fragment::new(html),
            };
            Ok(fragments_response(status, vec![fragment]))
        } else {
            let html = self.page(template, ctx)?;
            Ok((status, Html(html)).into_response())
        }
    }
}

/// "2024-04-01T09:30:00Z" and "2024-04-01 09:30:00" both become "2024-04-01 09:30".
/// Anything unparseable passes through.
fn format_datetime(value: Value) -> Value {
    let Some(s) = value.as_str() else {
        return value;
    };
    let parsed = chrono::DateTime::parse_from_rfc3339(s)
        .map(|d| d.naive_utc())
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"));
    match parsed {
        Ok(dt) => Value::from(dt.format("%Y-%m-%d %H:%M").to_string()),
        Err(_) => value,
    }
}
