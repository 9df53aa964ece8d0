use std::borrow::Cow;

/// Splits a delimited line into fields, keeping separators that appear inside
/// double quotes. A quote only opens a quoted section at the start of a field,
/// and `""` inside one is an escaped quote. Quotes are kept in the returned
/// fields; use [`unquote`] to remove them.
pub fn split_delimited_preserving_quotes(line: &str, separator: &str) -> Vec<String> {
    let mut fields = Vec::new();
    if separator.is_empty() {
        fields.push(line.to_string());
        return fields;
    }

    let mut current = String::new();
    let mut quoted = false;
    let mut rest = line;

    while let Some(ch) = rest.chars().next() {
        if quoted {
            if ch == '"' && rest[1..].starts_with('"') {
                current.push_str("\"\"");
                rest = &rest[2..];
                continue;
            }
            if ch == '"' {
                quoted = false;
            }
            current.push(ch);
        } else if ch == '"' && current.trim().is_empty() {
            quoted = true;
            current.push(ch);
        } else if rest.starts_with(separator) {
            fields.push(std::mem::take(&mut current));
            rest = &rest[separator.len()..];
            continue;
        } else {
            current.push(ch);
        }
        rest = &rest[ch.len_utf8()..];
    }

    fields.push(current);
    fields
}

/// Removes one pair of surrounding double quotes and collapses `""` to `"`.
/// Anything else, single quotes included, is returned unchanged.
pub fn unquote(s: &str) -> Cow<'_, str> {
    match s.strip_prefix('"').and_then(|inner| inner.strip_suffix('"')) {
        Some(inner) if inner.contains("\"\"") => Cow::Owned(inner.replace("\"\"", "\"")),
        Some(inner) => Cow::Borrowed(inner),
        None => Cow::Borrowed(s),
    }
}

/// Expands the escape sequences accepted for a column separator on the command line.
pub fn unescape_separator(raw: &str) -> String {
    match raw {
        "\\t" | "tab" | "TAB" => "\t".to_string(),
        "\\s" | "space" => " ".to_string(),
        other => other.to_string(),
    }
}
