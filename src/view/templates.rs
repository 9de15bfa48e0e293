//! Templates compiled into the binary, keyed by the name templates refer to them by.

pub const TEMPLATES: &[(&str, &str)] = &[
    ("layout/base.html", include_str!("../../templates/layout/base.html")),
    ("index.html", include_str!("../../templates/index.html")),
    ("entity/table.html", include_str!("../../templates/entity/table.html")),
    ("entity/form.html", include_str!("../../templates/entity/form.html")),
    ("formatters/boolean.html", include_str!("../../templates/formatters/boolean.html")),
    ("formatters/date.html", include_str!("../../templates/formatters/date.html")),
    ("formatters/course_code.html", include_str!("../../templates/formatters/course_code.html")),
];
