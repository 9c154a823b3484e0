//! Naming helpers shared by the analyzer and the generator.

/// Properties every plain JavaScript object already carries.
///
/// Registration names, module names and parameter names end up as object keys
/// in the generated SDK, so none of them may shadow one of these.
pub const RESERVED_OBJECT_KEYS: [&str; 12] = [
    "constructor",
    "__proto__",
    "__defineGetter__",
    "__defineSetter__",
    "hasOwnProperty",
    "__lookupGetter__",
    "__lookupSetter__",
    "isPrototypeOf",
    "propertyIsEnumerable",
    "toString",
    "valueOf",
    "toLocaleString",
];

/// Whether `name` collides with a property of a plain JavaScript object.
pub fn is_reserved_object_key(name: &str) -> bool {
    RESERVED_OBJECT_KEYS.contains(&name)
}

/// Lowercase the first character of `s`.
pub fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}

/// Capitalize the first letter of a string.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Convert a name to camelCase.
///
/// The input is split on every character outside `[a-zA-Z0-9_]`; the first
/// part gets a lowercase first letter and the following parts an uppercase one.
/// The rest of each part is kept as is, so `ArticleController` becomes
/// `articleController` and `article-tags` becomes `articleTags`.
pub fn camelcase(name: &str) -> String {
    name.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|part| !part.is_empty())
        .enumerate()
        .map(|(i, part)| {
            if i == 0 {
                lowercase_first(part)
            } else {
                capitalize_first(part)
            }
        })
        .collect()
}

/// Whether `name` is a valid JavaScript identifier (ASCII subset).
pub fn is_identifier(name: &str) -> bool {
    !needs_bracket_notation(name)
}

/// Check if an identifier needs bracket notation (or quoting) for property/key access.
///
/// Returns true if the name:
/// - Is empty
/// - Doesn't start with a letter, underscore, or dollar sign
/// - Contains characters other than alphanumeric, underscore, or dollar sign
pub fn needs_bracket_notation(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return true;
    };
    !(first.is_ascii_alphabetic() || first == '_' || first == '$')
        || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Escape a string for use in double-quoted JavaScript/TypeScript string literals.
pub fn escape_js_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Quote a string if needed for use as a property key.
pub fn quote_if_needed(name: &str) -> String {
    if needs_bracket_notation(name) {
        format!("\"{}\"", escape_js_string(name))
    } else {
        name.to_string()
    }
}

/// Format a property access expression (e.g., `params.foo` or `params["foo-bar"]`).
pub fn format_property_access(obj: &str, prop: &str) -> String {
    if needs_bracket_notation(prop) {
        format!("{}[\"{}\"]", obj, escape_js_string(prop))
    } else {
        format!("{obj}.{prop}")
    }
}
