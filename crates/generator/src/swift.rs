//! Swift naming and type mapping

use clientgen_common::case::{to_camel_case, to_pascal_case};
use clientgen_common::{FieldType, ModelSet, ScalarType};
use std::collections::BTreeMap;

/// Opaque JSON type provided by the runtime
pub const JSON_VALUE: &str = "JSONValue";

/// Types the hand-written runtime declares; generated names must not shadow them
pub const RUNTIME_TYPES: &[&str] = &[
    "AccountClient",
    "BaseService",
    "JSONValue",
    "ListResult",
    "Metadata",
    "OperationInfo",
    "PaginationOptions",
    "RequestBody",
    "RetryConfig",
];

const RESERVED_WORDS: &[&str] = &[
    "Any", "Self", "Type", "as", "associatedtype", "break", "case", "catch", "class", "continue",
    "default", "defer", "deinit", "do", "else", "enum", "extension", "fallthrough", "false",
    "fileprivate", "for", "func", "guard", "if", "import", "in", "init", "inout", "internal", "is",
    "let", "nil", "open", "operator", "private", "protocol", "public", "repeat", "rethrows",
    "return", "self", "static", "struct", "subscript", "super", "switch", "throw", "throws",
    "true", "try", "typealias", "var", "where", "while",
];

/// Escape a Swift reserved word with backticks
pub fn escape_identifier(name: &str) -> String {
    if RESERVED_WORDS.contains(&name) {
        format!("`{}`", name)
    } else {
        name.to_string()
    }
}

/// Strip characters Swift identifiers cannot hold, prefixing leading digits
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    match cleaned.chars().next() {
        None => "_".to_string(),
        Some(c) if c.is_ascii_digit() => format!("_{}", cleaned),
        Some(_) => cleaned,
    }
}

/// Property, argument, or accessor name for a JSON key or group name
///
/// # Examples
/// ```
/// use clientgen_generator::swift::property_name;
///
/// assert_eq!(property_name("created_at"), "createdAt");
/// assert_eq!(property_name("default"), "`default`");
/// assert_eq!(property_name("CardTables"), "cardTables");
/// ```
pub fn property_name(raw: &str) -> String {
    escape_identifier(&sanitize(&to_camel_case(raw)))
}

/// Property name without reserved-word escaping, as used in `CodingKeys`
pub fn bare_property_name(raw: &str) -> String {
    sanitize(&to_camel_case(raw))
}

/// Type name for a schema, group, or operation identity
pub fn type_name(raw: &str) -> String {
    sanitize(&to_pascal_case(raw))
}

/// External name for a request-body schema
///
/// # Examples
/// ```
/// use clientgen_generator::swift::request_type_name;
///
/// assert_eq!(request_type_name("CreateTodoRequestContent"), "CreateTodoRequest");
/// assert_eq!(request_type_name("UpdateTodoContent"), "UpdateTodoRequest");
/// assert_eq!(request_type_name("WebhookPayload"), "WebhookPayload");
/// assert_eq!(request_type_name("Todo"), "TodoRequest");
/// ```
pub fn request_type_name(schema_name: &str) -> String {
    let base = type_name(schema_name);
    let base = base.strip_suffix("Content").unwrap_or(&base);
    if base.ends_with("Request") || base.ends_with("Payload") {
        base.to_string()
    } else {
        format!("{}Request", base)
    }
}

/// Swift type names for every emitted schema
///
/// Entities keep their schema name; request schemas are renamed. A reference
/// to anything outside the model set maps to [`JSON_VALUE`].
#[derive(Debug, Clone, Default)]
pub struct TypeNames {
    names: BTreeMap<String, String>,
}

impl TypeNames {
    pub fn new(models: &ModelSet) -> Self {
        let mut names = BTreeMap::new();
        for name in models.entities.keys() {
            names.insert(name.clone(), type_name(name));
        }
        for name in models.requests.keys() {
            names
                .entry(name.clone())
                .or_insert_with(|| request_type_name(name));
        }
        Self { names }
    }

    pub fn get(&self, schema_name: &str) -> Option<&str> {
        self.names.get(schema_name).map(String::as_str)
    }

    /// Swift spelling of a field or response type
    pub fn swift_type(&self, field_type: &FieldType) -> String {
        match field_type {
            FieldType::String => "String".to_string(),
            FieldType::Integer => "Int".to_string(),
            FieldType::Number => "Double".to_string(),
            FieldType::Boolean => "Bool".to_string(),
            FieldType::Any => JSON_VALUE.to_string(),
            FieldType::Ref(name) => self.get(name).unwrap_or(JSON_VALUE).to_string(),
            FieldType::List(inner) => format!("[{}]", self.swift_type(inner)),
            FieldType::Map(inner) => format!("[String: {}]", self.swift_type(inner)),
        }
    }
}

/// Swift spelling of a parameter scalar
pub fn scalar_type(scalar: ScalarType) -> &'static str {
    match scalar {
        ScalarType::String => "String",
        ScalarType::Integer => "Int",
        ScalarType::Number => "Double",
        ScalarType::Boolean => "Bool",
    }
}

/// Escape text for a Swift string literal
pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

/// Doc comment lines for a description, trimmed, blank lines kept inside
pub fn doc_lines(description: Option<&str>) -> Vec<String> {
    let Some(text) = description.map(str::trim).filter(|t| !t.is_empty()) else {
        return Vec::new();
    };
    text.lines().map(|line| line.trim_end().to_string()).collect()
}

/// `///` comment block, one line per description line, each newline-terminated
pub fn doc_comment(description: Option<&str>, indent: usize) -> String {
    let pad = " ".repeat(indent);
    doc_lines(description)
        .iter()
        .map(|line| {
            if line.is_empty() {
                format!("{}///\n", pad)
            } else {
                format!("{}/// {}\n", pad, line)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clientgen_common::{ResolvedSchema, SchemaKind};

    #[test]
    fn test_property_names() {
        assert_eq!(property_name("app_url"), "appUrl");
        assert_eq!(property_name("2fa_enabled"), "_2faEnabled");
        assert_eq!(property_name("self"), "`self`");
        assert_eq!(bare_property_name("self"), "self");
        assert_eq!(property_name("x-request-id"), "xRequestId");
    }

    #[test]
    fn test_type_names() {
        assert_eq!(type_name("Todo"), "Todo");
        assert_eq!(type_name("card_table"), "CardTable");
        assert_eq!(type_name("Client Features"), "ClientFeatures");
    }

    #[test]
    fn test_swift_types() {
        let object = |name: &str| ResolvedSchema {
            name: name.to_string(),
            kind: SchemaKind::Object {
                properties: vec![],
                required: Default::default(),
            },
            description: None,
        };
        let mut models = ModelSet::default();
        models.entities.insert("Todo".to_string(), object("Todo"));
        models
            .requests
            .insert("CreateTodoRequestContent".to_string(), object("CreateTodoRequestContent"));
        let names = TypeNames::new(&models);

        assert_eq!(names.swift_type(&FieldType::Ref("Todo".to_string())), "Todo");
        assert_eq!(
            names.swift_type(&FieldType::Ref("CreateTodoRequestContent".to_string())),
            "CreateTodoRequest"
        );
        assert_eq!(names.swift_type(&FieldType::Ref("Missing".to_string())), "JSONValue");
        assert_eq!(
            names.swift_type(&FieldType::Map(Box::new(FieldType::List(Box::new(
                FieldType::Integer
            ))))),
            "[String: [Int]]"
        );
    }

    #[test]
    fn test_string_literal_and_docs() {
        assert_eq!(string_literal("say \"hi\"\n"), "say \\\"hi\\\"\\n");
        assert_eq!(doc_lines(Some("  First\nSecond  \n")), vec!["First", "Second"]);
        assert!(doc_lines(Some("   ")).is_empty());
        assert!(doc_lines(None).is_empty());
        assert_eq!(
            doc_comment(Some("List todos.\n\nPaginated."), 4),
            "    /// List todos.\n    ///\n    /// Paginated.\n"
        );
        assert_eq!(doc_comment(None, 4), "");
    }
}
