//! Model emission
//!
//! Turns each resolved schema into a Swift declaration context: a struct for
//! objects and flattened unions, a typealias for maps. Structs that reach
//! themselves through non-collection references are emitted as final
//! classes, since a value type cannot contain itself.

use crate::swift::{self, TypeNames};
use clientgen_common::{FieldType, ModelSet, Property, ResolvedSchema, SchemaKind};
use clientgen_parser::flatten_variants;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Template context for one model file
#[derive(Debug, Clone, Serialize)]
pub struct ModelContext {
    /// Schema name in the API description
    pub schema_name: String,
    pub type_name: String,
    pub doc_comment: String,
    /// "struct", "class", or "alias"
    pub declaration: &'static str,
    /// Swift declaration keyword for struct and class models
    pub keyword: &'static str,
    pub fields: Vec<FieldContext>,
    pub has_fields: bool,
    /// Whether any Swift property name differs from its JSON key
    pub needs_coding_keys: bool,
    /// Memberwise initializer parameter list
    pub init_params: String,
    /// Right-hand side of a map alias
    pub alias_target: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldContext {
    pub json_name: String,
    /// Escaped identifier used in declarations
    pub swift_name: String,
    /// Unescaped identifier, compared against the JSON key
    pub key_name: String,
    pub swift_type: String,
    /// Type as declared on the property (`T?` when optional)
    pub declared_type: String,
    pub required: bool,
    pub doc_comment: String,
    /// `CodingKeys` case, with a raw value when the names differ
    pub coding_case: String,
}

impl ModelContext {
    /// Relative output path
    pub fn file_path(&self) -> String {
        format!("Models/{}.swift", self.type_name)
    }

    fn alias(schema: &ResolvedSchema, type_name: String, target: String) -> Self {
        Self {
            schema_name: schema.name.clone(),
            type_name,
            doc_comment: swift::doc_comment(schema.description.as_deref(), 0),
            declaration: "alias",
            keyword: "typealias",
            fields: Vec::new(),
            has_fields: false,
            needs_coding_keys: false,
            init_params: String::new(),
            alias_target: Some(target),
        }
    }
}

/// Build every model context, entities first, each set in schema-name order
pub fn model_contexts(models: &ModelSet, names: &TypeNames) -> Vec<ModelContext> {
    let recursive = recursive_schemas(models);

    models
        .entities
        .values()
        .chain(models.requests.values())
        .filter_map(|schema| {
            let type_name = names.get(&schema.name)?.to_string();
            Some(model_context(schema, type_name, names, &recursive))
        })
        .collect()
}

fn model_context(
    schema: &ResolvedSchema,
    type_name: String,
    names: &TypeNames,
    recursive: &BTreeSet<String>,
) -> ModelContext {
    let fields = match &schema.kind {
        SchemaKind::Map { value } => {
            let target = format!("[String: {}]", names.swift_type(value));
            return ModelContext::alias(schema, type_name, target);
        }
        // Arrays never reach the model set; render one as an alias if it does
        SchemaKind::Array { items } => {
            let target = format!("[{}]", names.swift_type(items));
            return ModelContext::alias(schema, type_name, target);
        }
        SchemaKind::Object { properties, .. } => ordered_fields(properties, names),
        SchemaKind::Union { variants } => ordered_fields(&flatten_variants(variants), names),
    };

    let (declaration, keyword) = if recursive.contains(&schema.name) {
        ("class", "final class")
    } else {
        ("struct", "struct")
    };

    ModelContext {
        schema_name: schema.name.clone(),
        type_name,
        doc_comment: swift::doc_comment(schema.description.as_deref(), 0),
        declaration,
        keyword,
        has_fields: !fields.is_empty(),
        needs_coding_keys: fields.iter().any(|f| f.key_name != f.json_name),
        init_params: init_params(&fields),
        fields,
        alias_target: None,
    }
}

/// `name: T` for required fields, `name: T? = nil` for optional ones
fn init_params(fields: &[FieldContext]) -> String {
    fields
        .iter()
        .map(|f| {
            if f.required {
                format!("{}: {}", f.swift_name, f.declared_type)
            } else {
                format!("{}: {} = nil", f.swift_name, f.declared_type)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Required fields first, then optional; each partition sorted by JSON name
pub fn ordered_fields(properties: &[Property], names: &TypeNames) -> Vec<FieldContext> {
    let mut sorted: Vec<&Property> = properties.iter().collect();
    sorted.sort_by(|a, b| b.required.cmp(&a.required).then_with(|| a.name.cmp(&b.name)));

    let mut taken = BTreeSet::new();
    sorted
        .into_iter()
        .map(|property| {
            let key_name = unique_name(swift::bare_property_name(&property.name), &mut taken);
            let swift_name = swift::escape_identifier(&key_name);
            let swift_type = names.swift_type(&property.field_type);
            let declared_type = if property.required {
                swift_type.clone()
            } else {
                format!("{}?", swift_type)
            };
            let coding_case = if key_name == property.name {
                swift_name.clone()
            } else {
                format!("{} = \"{}\"", swift_name, swift::string_literal(&property.name))
            };
            FieldContext {
                json_name: property.name.clone(),
                swift_name,
                key_name,
                swift_type,
                declared_type,
                required: property.required,
                doc_comment: swift::doc_comment(property.description.as_deref(), 4),
                coding_case,
            }
        })
        .collect()
}

/// Disambiguate JSON keys that camel-case to the same identifier
fn unique_name(candidate: String, taken: &mut BTreeSet<String>) -> String {
    if taken.insert(candidate.clone()) {
        return candidate;
    }
    let mut n = 2;
    loop {
        let name = format!("{}{}", candidate, n);
        if taken.insert(name.clone()) {
            return name;
        }
        n += 1;
    }
}

/// Object and union schemas that reach themselves through direct references
///
/// Lists and maps are heap-allocated in Swift and break the cycle.
fn recursive_schemas(models: &ModelSet) -> BTreeSet<String> {
    let mut edges: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for schema in models.entities.values().chain(models.requests.values()) {
        let properties: Vec<Property> = match &schema.kind {
            SchemaKind::Object { properties, .. } => properties.clone(),
            SchemaKind::Union { variants } => flatten_variants(variants),
            SchemaKind::Map { .. } | SchemaKind::Array { .. } => continue,
        };
        let targets = edges.entry(schema.name.as_str()).or_default();
        for property in &properties {
            if let FieldType::Ref(target) = &property.field_type {
                if let Some((name, _)) = models
                    .entities
                    .get_key_value(target.as_str())
                    .or_else(|| models.requests.get_key_value(target.as_str()))
                {
                    targets.insert(name.as_str());
                }
            }
        }
    }

    edges
        .keys()
        .filter(|start| reaches(&edges, start, start))
        .map(|name| name.to_string())
        .collect()
}

fn reaches(edges: &BTreeMap<&str, BTreeSet<&str>>, from: &str, target: &str) -> bool {
    let mut stack: Vec<&str> = edges
        .get(from)
        .map(|t| t.iter().copied().collect())
        .unwrap_or_default();
    let mut visited = BTreeSet::new();
    while let Some(node) = stack.pop() {
        if node == target {
            return true;
        }
        if visited.insert(node) {
            if let Some(next) = edges.get(node) {
                stack.extend(next.iter().copied());
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prop(name: &str, field_type: FieldType, required: bool) -> Property {
        Property {
            name: name.to_string(),
            field_type,
            required,
            description: None,
        }
    }

    fn object(name: &str, properties: Vec<Property>) -> ResolvedSchema {
        let required = properties
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.clone())
            .collect();
        ResolvedSchema {
            name: name.to_string(),
            kind: SchemaKind::Object {
                properties,
                required,
            },
            description: None,
        }
    }

    #[test]
    fn test_required_fields_first_then_sorted() {
        let names = TypeNames::default();
        let fields = ordered_fields(
            &[
                prop("zeta", FieldType::String, false),
                prop("title", FieldType::String, true),
                prop("alpha", FieldType::Integer, false),
                prop("id", FieldType::Integer, true),
            ],
            &names,
        );
        let order: Vec<_> = fields.iter().map(|f| f.json_name.as_str()).collect();
        assert_eq!(order, vec!["id", "title", "alpha", "zeta"]);
    }

    #[test]
    fn test_coding_keys_and_collisions() {
        let names = TypeNames::default();
        let fields = ordered_fields(
            &[
                prop("created_at", FieldType::String, false),
                prop("createdAt", FieldType::String, false),
                prop("default", FieldType::Boolean, false),
            ],
            &names,
        );
        let swift: Vec<_> = fields.iter().map(|f| f.swift_name.as_str()).collect();
        assert_eq!(swift, vec!["createdAt", "createdAt2", "`default`"]);
        assert_eq!(fields[2].key_name, "default");
        assert_eq!(fields[0].coding_case, "createdAt");
        assert_eq!(fields[1].coding_case, "createdAt2 = \"created_at\"");
        assert_eq!(fields[2].coding_case, "`default`");
        assert_eq!(fields[2].declared_type, "Bool?");
    }

    #[test]
    fn test_union_flattened_to_optional_fields() {
        let mut models = ModelSet::default();
        models.entities.insert(
            "Recording".to_string(),
            ResolvedSchema {
                name: "Recording".to_string(),
                kind: SchemaKind::Union {
                    variants: vec![
                        vec![prop("title", FieldType::String, true)],
                        vec![
                            prop("subject", FieldType::String, true),
                            prop("title", FieldType::String, true),
                        ],
                    ],
                },
                description: Some("A recording".to_string()),
            },
        );
        let names = TypeNames::new(&models);
        let contexts = model_contexts(&models, &names);

        assert_eq!(contexts.len(), 1);
        let recording = &contexts[0];
        assert_eq!(recording.declaration, "struct");
        assert_eq!(recording.doc_comment, "/// A recording\n");
        assert_eq!(recording.init_params, "subject: String? = nil, title: String? = nil");
        let fields: Vec<_> = recording
            .fields
            .iter()
            .map(|f| (f.json_name.as_str(), f.required))
            .collect();
        assert_eq!(fields, vec![("subject", false), ("title", false)]);
    }

    #[test]
    fn test_map_becomes_alias() {
        let mut models = ModelSet::default();
        models.entities.insert(
            "ProgressByPerson".to_string(),
            ResolvedSchema {
                name: "ProgressByPerson".to_string(),
                kind: SchemaKind::Map {
                    value: FieldType::Ref("Person".to_string()),
                },
                description: None,
            },
        );
        models.entities.insert(
            "Person".to_string(),
            object("Person", vec![prop("name", FieldType::String, true)]),
        );
        let names = TypeNames::new(&models);
        let contexts = model_contexts(&models, &names);

        let map = contexts
            .iter()
            .find(|c| c.type_name == "ProgressByPerson")
            .unwrap();
        assert_eq!(map.declaration, "alias");
        assert_eq!(map.alias_target.as_deref(), Some("[String: Person]"));
        assert_eq!(map.file_path(), "Models/ProgressByPerson.swift");
    }

    #[test]
    fn test_direct_cycle_becomes_class() {
        let mut models = ModelSet::default();
        models.entities.insert(
            "Comment".to_string(),
            object(
                "Comment",
                vec![prop("parent", FieldType::Ref("Message".to_string()), false)],
            ),
        );
        models.entities.insert(
            "Message".to_string(),
            object(
                "Message",
                vec![prop("latest", FieldType::Ref("Comment".to_string()), false)],
            ),
        );
        models.entities.insert(
            "Todolist".to_string(),
            object(
                "Todolist",
                vec![prop(
                    "children",
                    FieldType::List(Box::new(FieldType::Ref("Todolist".to_string()))),
                    false,
                )],
            ),
        );
        let names = TypeNames::new(&models);
        let contexts = model_contexts(&models, &names);

        let declarations: Vec<_> = contexts
            .iter()
            .map(|c| (c.type_name.as_str(), c.declaration))
            .collect();
        assert_eq!(
            declarations,
            vec![("Comment", "class"), ("Message", "class"), ("Todolist", "struct")]
        );
    }

    #[test]
    fn test_request_models_renamed() {
        let mut models = ModelSet::default();
        models.requests.insert(
            "CreateTodoRequestContent".to_string(),
            object(
                "CreateTodoRequestContent",
                vec![prop("content", FieldType::String, true)],
            ),
        );
        let names = TypeNames::new(&models);
        let contexts = model_contexts(&models, &names);
        assert_eq!(contexts[0].type_name, "CreateTodoRequest");
        assert_eq!(contexts[0].file_path(), "Models/CreateTodoRequest.swift");
        assert!(!contexts[0].needs_coding_keys);
    }
}
