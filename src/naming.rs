//! Display names derived from identifiers: column labels and entity titles.

/// Split an identifier into words on `_` and on lower→upper case boundaries.
/// Runs of capitals stay together, e.g. "nameJP" -> ["name", "JP"].
fn words(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut prev_lower = false;
    for c in s.chars() {
        if c == '_' || c == '-' || c == ' ' {
            if !cur.is_empty() {
                out.push(std::mem::take(&mut cur));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !cur.is_empty() {
            out.push(std::mem::take(&mut cur));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        cur.push(c);
    }
    if !cur.is_empty() {
        out.push(cur);
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Column label from a field key.
/// e.g. "start_time" -> "Start Time", "firstName" -> "First Name", "nameJP" -> "Name JP"
pub fn to_title_case(s: &str) -> String {
    words(s)
        .iter()
        .map(|w| capitalize(w))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Plural display title for an entity name: "course" -> "Courses", "spin_class" -> "Spin Classes".
pub fn plural_title(entity_name: &str) -> String {
    let title = to_title_case(entity_name);
    if title.ends_with('s') || title.ends_with('x') || title.ends_with("ch") || title.ends_with("sh") {
        format!("{}es", title)
    } else {
        format!("{}s", title)
    }
}

/// Singular display title: "course" -> "Course". A trailing `s` is dropped.
pub fn singular_title(entity_name: &str) -> String {
    let title = to_title_case(entity_name);
    match title.strip_suffix('s') {
        Some(stripped) if !stripped.is_empty() && !stripped.ends_with('s') => stripped.to_string(),
        _ => title,
    }
}

/// Template-friendly plural alias for an entity: "spin_class" -> "spin_classes".
pub fn plural_key(entity_name: &str) -> String {
    if entity_name.ends_with('s') || entity_name.ends_with('x') || entity_name.ends_with("ch") {
        format!("{}es", entity_name)
    } else {
        format!("{}s", entity_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_from_keys() {
        assert_eq!(to_title_case("start_time"), "Start Time");
        assert_eq!(to_title_case("firstName"), "First Name");
        assert_eq!(to_title_case("nameJP"), "Name JP");
        assert_eq!(to_title_case("intensive_table_1"), "Intensive Table 1");
        assert_eq!(to_title_case("code"), "Code");
    }

    #[test]
    fn titles_from_entity_names() {
        assert_eq!(plural_title("course"), "Courses");
        assert_eq!(singular_title("course"), "Course");
        assert_eq!(plural_title("spin_class"), "Spin Classes");
        assert_eq!(singular_title("spin_class"), "Spin Class");
        assert_eq!(singular_title("settings"), "Setting");
    }

    #[test]
    fn plural_keys() {
        assert_eq!(plural_key("course"), "courses");
        assert_eq!(plural_key("spin_class"), "spin_classes");
    }
}
