//! Identifier case conversions.
//!
//! Labels in a binding registry are usually PascalCase (`Int64`, `UintPtr`);
//! templates derive receiver names, file names and unexported identifiers
//! from them with these functions.

fn is_separator(c: char) -> bool {
    matches!(c, '_' | '-' | '.' | ' ')
}

/// Lowercase form of the first character, `None` for an empty string.
///
/// ```
/// use futil_core::case::first_lower;
/// assert_eq!(first_lower("String").as_deref(), Some("s"));
/// assert_eq!(first_lower(""), None);
/// ```
pub fn first_lower(s: &str) -> Option<String> {
    s.chars().next().map(|c| c.to_lowercase().collect())
}

/// Uppercase the first character, leave the rest untouched.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Convert PascalCase, camelCase or kebab-case to snake_case.
///
/// Acronym runs stay together: the last capital of a run starts the next
/// word when a lowercase letter follows it.
///
/// ```
/// use futil_core::case::to_snake_case;
/// assert_eq!(to_snake_case("UintPtr"), "uint_ptr");
/// assert_eq!(to_snake_case("HTTPServer"), "http_server");
/// ```
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if is_separator(c) {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }

        if c.is_uppercase() && i > 0 && !out.is_empty() && !out.ends_with('_') {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                out.push('_');
            }
        }

        out.extend(c.to_lowercase());
    }

    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// Convert snake_case, kebab-case or dotted names to PascalCase.
///
/// Words are capitalized and joined; letters inside a word keep their case,
/// so existing PascalCase input comes back unchanged.
///
/// ```
/// use futil_core::case::to_pascal_case;
/// assert_eq!(to_pascal_case("foo_bar"), "FooBar");
/// assert_eq!(to_pascal_case("UintPtr"), "UintPtr");
/// ```
pub fn to_pascal_case(s: &str) -> String {
    s.split(is_separator)
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect()
}

/// Convert to camelCase, lowering the leading capital or acronym.
///
/// ```
/// use futil_core::case::to_camel_case;
/// assert_eq!(to_camel_case("Int64"), "int64");
/// assert_eq!(to_camel_case("HTTPServer"), "httpServer");
/// ```
pub fn to_camel_case(s: &str) -> String {
    let pascal: Vec<char> = to_pascal_case(s).chars().collect();
    let run = pascal.iter().take_while(|c| c.is_uppercase()).count();

    let lowered = match pascal.get(run) {
        Some(next) if run > 1 && next.is_lowercase() => run - 1,
        _ => run,
    };

    let mut out = String::with_capacity(pascal.len());
    for (i, c) in pascal.iter().enumerate() {
        if i < lowered {
            out.extend(c.to_lowercase());
        } else {
            out.push(*c);
        }
    }
    out
}
