//! Standard message-box helpers shared by success and error responses.

use minijinja::HtmlEscape;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

impl MessageKind {
    fn classes(self) -> &'static str {
        match self {
            MessageKind::Success => "bg-green-100 border-l-4 border-green-500 text-green-700 p-4 mb-4",
            MessageKind::Error => "bg-red-100 border-l-4 border-red-500 text-red-700 p-4 mb-4",
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            MessageKind::Success => "",
            MessageKind::Error => "Error: ",
        }
    }
}

/// Inline alert box. The text is HTML-escaped.
pub fn message_box(kind: MessageKind, text: &str) -> String {
    format!(
        r#"<div class="{}" role="alert"><p>{}{}</p></div>"#,
        kind.classes(),
        kind.prefix(),
        HtmlEscape(text)
    )
}

/// Success text for a completed mutation, e.g. "Course created successfully."
pub fn mutation_message(title_singular: &str, action: &str) -> String {
    format!("{} {} successfully.", title_singular, action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_box_escapes_text() {
        let html = message_box(MessageKind::Error, "<script>x</script>");
        assert!(html.contains("Error: &lt;script&gt;"));
        assert!(html.contains("bg-red-100"));
    }

    #[test]
    fn success_box_has_no_prefix() {
        let html = message_box(MessageKind::Success, &mutation_message("Room", "deleted"));
        assert!(html.contains("<p>Room deleted successfully.</p>"));
    }
}
