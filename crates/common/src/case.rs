//! Identifier case conversion shared by the parser and the emitters

/// Convert PascalCase or camelCase to snake_case
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    let chars: Vec<char> = s.chars().collect();

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() {
            // Add underscore before uppercase if:
            // 1. Not at the start
            // 2. Previous char is lowercase or digit
            // 3. OR next char is lowercase (handles HTTPServer -> http_server)
            let should_add_underscore = i > 0
                && (chars[i - 1].is_lowercase()
                    || chars[i - 1].is_ascii_digit()
                    || (i + 1 < chars.len() && chars[i + 1].is_lowercase()));

            if should_add_underscore && !result.ends_with('_') {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else if ch == '-' || ch == ' ' || ch == '.' {
            if !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
        } else {
            result.push(ch);
        }
    }

    // Clean up multiple consecutive underscores
    while result.contains("__") {
        result = result.replace("__", "_");
    }

    result.trim_matches('_').to_string()
}

/// Split an identifier on `_`, `-`, `.` and spaces, dropping empty words
fn words(s: &str) -> impl Iterator<Item = &str> {
    s.split(|c: char| c == '_' || c == '-' || c == ' ' || c == '.')
        .filter(|w| !w.is_empty())
}

fn upper_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn lower_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Convert snake_case, kebab-case or PascalCase to camelCase
///
/// # Examples
/// ```
/// use clientgen_common::case::to_camel_case;
///
/// assert_eq!(to_camel_case("project_id"), "projectId");
/// assert_eq!(to_camel_case("ListTodos"), "listTodos");
/// assert_eq!(to_camel_case("todolistId"), "todolistId");
/// ```
pub fn to_camel_case(s: &str) -> String {
    let mut result = String::new();
    for (i, word) in words(s).enumerate() {
        if i == 0 {
            result.push_str(&lower_first(word));
        } else {
            result.push_str(&upper_first(word));
        }
    }
    result
}

/// Convert snake_case, kebab-case, spaced or camelCase to PascalCase
///
/// # Examples
/// ```
/// use clientgen_common::case::to_pascal_case;
///
/// assert_eq!(to_pascal_case("card tables"), "CardTables");
/// assert_eq!(to_pascal_case("todo_list"), "TodoList");
/// assert_eq!(to_pascal_case("Todos"), "Todos");
/// ```
pub fn to_pascal_case(s: &str) -> String {
    words(s).map(upper_first).collect()
}
