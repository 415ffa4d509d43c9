//! Table name normalization.

/// Turn a dataset name into a Hive-friendly table name
///
/// Lower-cases the name, splits camel case and letter/digit runs with `_`,
/// and replaces `-` with `_`. Applying it twice gives the same result as
/// applying it once.
pub fn normalize_table_name(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut normalized = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '-' {
            normalized.push('_');
            continue;
        }

        if let Some(&prev) = i.checked_sub(1).and_then(|p| chars.get(p)) {
            let next = chars.get(i + 1).copied();
            if is_word_boundary(prev, c, next) {
                normalized.push('_');
            }
        }

        normalized.extend(c.to_lowercase());
    }

    normalized
}

fn is_word_boundary(prev: char, current: char, next: Option<char>) -> bool {
    let camel = (prev.is_lowercase() || prev.is_ascii_digit()) && current.is_uppercase();
    // last capital of an acronym starts a new word: "HTTPServer" -> "http_server"
    let acronym_end =
        prev.is_uppercase() && current.is_uppercase() && next.is_some_and(char::is_lowercase);
    let letter_digit = (prev.is_alphabetic() && current.is_ascii_digit())
        || (prev.is_ascii_digit() && current.is_alphabetic());

    camel || acronym_end || letter_digit
}

/// Versioned table name, e.g. `churn_v2`
pub fn versioned_table_name(name: &str, version: &str) -> String {
    format!("{}_{}", normalize_table_name(name), version)
}
