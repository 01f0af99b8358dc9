//! Schema resolution
//!
//! Decides which named schemas become generated model types. Starting from
//! the schema an operation references, the resolver follows `$ref` chains,
//! array items, `oneOf` variant properties and map values, collecting every
//! named schema that must be emitted. A `seen` accumulator is threaded through
//! the recursion so cyclic graphs terminate; references that cannot be found
//! are dropped without failing the run.

use crate::openapi::{OpenApiSpec, Schema, SchemaOrRef};
use clientgen_common::{
    FieldType, GeneratorConfig, ModelSet, Operation, Property, ResolvedSchema, SchemaKind,
};
use std::collections::BTreeSet;
use tracing::debug;

/// Resolves named schemas against the API description's schema dictionary
pub struct SchemaResolver<'a> {
    spec: &'a OpenApiSpec,
    error_suffixes: &'a [String],
}

impl<'a> SchemaResolver<'a> {
    pub fn new(spec: &'a OpenApiSpec, config: &'a GeneratorConfig) -> Self {
        Self {
            spec,
            error_suffixes: &config.error_schema_suffixes,
        }
    }

    /// Error response schemas are not part of the generated model surface
    pub fn is_error_schema(&self, name: &str) -> bool {
        self.error_suffixes
            .iter()
            .any(|suffix| name.ends_with(suffix.as_str()))
    }

    /// Every named schema that must be emitted to satisfy one root reference
    pub fn resolve(&self, name: &str) -> BTreeSet<String> {
        let mut seen = BTreeSet::new();
        let mut out = BTreeSet::new();
        self.visit_name(name, &mut seen, &mut out);
        out
    }

    /// Named schemas nested inside a request body schema, excluding the body itself
    pub fn resolve_request(&self, name: &str) -> BTreeSet<String> {
        let mut seen = BTreeSet::new();
        let mut out = BTreeSet::new();
        if let Some(schema) = self.follow(name, &mut seen) {
            self.visit_children(schema, &mut seen, &mut out);
        }
        out
    }

    fn visit_name(&self, name: &str, seen: &mut BTreeSet<String>, out: &mut BTreeSet<String>) {
        if self.is_error_schema(name) || !seen.insert(name.to_string()) {
            return;
        }

        let Some(entry) = self.spec.schema_entry(name) else {
            debug!("Skipping unresolvable schema reference: {}", name);
            return;
        };

        match entry {
            SchemaOrRef::Reference { .. } => match entry.ref_name() {
                Some(target) => self.visit_name(target, seen, out),
                None => debug!("Skipping non-local alias for schema {}", name),
            },
            SchemaOrRef::Schema(schema) => {
                if Self::is_materialized(schema) {
                    out.insert(name.to_string());
                }
                self.visit_children(schema, seen, out);
            }
        }
    }

    /// Recurse into whatever a schema references, without adding the schema itself
    fn visit_children(&self, schema: &Schema, seen: &mut BTreeSet<String>, out: &mut BTreeSet<String>) {
        if schema.is_array() {
            if let Some(items) = &schema.items {
                self.visit_nested(items, seen, out);
            }
        } else if !schema.one_of.is_empty() {
            for variant in &schema.one_of {
                let variant_schema = match variant {
                    SchemaOrRef::Schema(s) => Some(s.as_ref()),
                    SchemaOrRef::Reference { .. } => variant
                        .ref_name()
                        .and_then(|n| self.follow(n, &mut BTreeSet::new())),
                };
                if let Some(variant_schema) = variant_schema {
                    for property in variant_schema.properties.values() {
                        self.visit_nested(property, seen, out);
                    }
                }
            }
        } else if schema.is_map() {
            // Only a named value schema becomes a type of its own
            if let Some(value @ SchemaOrRef::Reference { .. }) = schema.map_value() {
                self.visit_nested(value, seen, out);
            }
        } else if schema.is_object() {
            for property in schema.properties.values() {
                self.visit_nested(property, seen, out);
            }
        }
    }

    /// Recurse into a property that is a `$ref` or an array of `$ref`
    fn visit_nested(&self, schema: &SchemaOrRef, seen: &mut BTreeSet<String>, out: &mut BTreeSet<String>) {
        match schema {
            SchemaOrRef::Reference { .. } => {
                if let Some(name) = schema.ref_name() {
                    self.visit_name(name, seen, out);
                }
            }
            SchemaOrRef::Schema(inner) if inner.is_array() => {
                if let Some(items) = &inner.items {
                    self.visit_nested(items, seen, out);
                }
            }
            SchemaOrRef::Schema(_) => {}
        }
    }

    /// Whether a schema becomes a generated type (arrays never do)
    fn is_materialized(schema: &Schema) -> bool {
        !schema.is_array() && (!schema.one_of.is_empty() || schema.is_map() || schema.is_object())
    }

    /// Follow alias entries to the schema a name finally denotes
    fn follow(&self, name: &str, seen: &mut BTreeSet<String>) -> Option<&'a Schema> {
        if !seen.insert(name.to_string()) {
            return None;
        }
        match self.spec.schema_entry(name)? {
            SchemaOrRef::Schema(schema) => Some(schema.as_ref()),
            alias @ SchemaOrRef::Reference { .. } => self.follow(alias.ref_name()?, seen),
        }
    }

    /// Look up a named schema, following aliases
    pub fn schema(&self, name: &str) -> Option<&'a Schema> {
        self.follow(name, &mut BTreeSet::new())
    }

    /// Classify a named schema; `None` means it is treated as an opaque scalar
    pub fn classify(&self, name: &str) -> Option<ResolvedSchema> {
        let schema = self.schema(name)?;
        let kind = self.classify_schema(schema)?;
        Some(ResolvedSchema {
            name: name.to_string(),
            kind,
            description: schema.description.clone(),
        })
    }

    fn classify_schema(&self, schema: &Schema) -> Option<SchemaKind> {
        if schema.is_array() {
            let items = schema
                .items
                .as_deref()
                .map(|items| self.field_type(items))
                .unwrap_or(FieldType::Any);
            return Some(SchemaKind::Array { items });
        }

        if !schema.one_of.is_empty() {
            let variants = schema
                .one_of
                .iter()
                .map(|variant| self.variant_properties(variant))
                .collect();
            return Some(SchemaKind::Union { variants });
        }

        if schema.is_map() {
            let value = schema
                .map_value()
                .map(|v| self.field_type(v))
                .unwrap_or(FieldType::Any);
            return Some(SchemaKind::Map { value });
        }

        if schema.is_object() {
            return Some(SchemaKind::Object {
                properties: self.properties_of(schema),
                required: schema.required.iter().cloned().collect(),
            });
        }

        None
    }

    fn variant_properties(&self, variant: &SchemaOrRef) -> Vec<Property> {
        let schema = match variant {
            SchemaOrRef::Schema(s) => Some(s.as_ref()),
            SchemaOrRef::Reference { .. } => variant.ref_name().and_then(|n| self.schema(n)),
        };
        schema.map(|s| self.properties_of(s)).unwrap_or_default()
    }

    /// Properties of an object schema, in name order
    pub fn properties_of(&self, schema: &Schema) -> Vec<Property> {
        schema
            .properties
            .iter()
            .map(|(name, property)| Property {
                name: name.clone(),
                field_type: self.field_type(property),
                required: schema.required.contains(name),
                description: property.as_schema().and_then(|s| s.description.clone()),
            })
            .collect()
    }

    /// Properties of a request body, whatever variant its schema is
    pub fn body_properties(&self, schema: &SchemaOrRef) -> Vec<Property> {
        let resolved = match schema {
            SchemaOrRef::Schema(s) => Some(s.as_ref()),
            SchemaOrRef::Reference { .. } => schema.ref_name().and_then(|n| self.schema(n)),
        };
        let Some(resolved) = resolved else {
            return Vec::new();
        };

        match self.classify_schema(resolved) {
            Some(SchemaKind::Object { properties, .. }) => properties,
            Some(SchemaKind::Union { variants }) => flatten_variants(&variants),
            Some(SchemaKind::Map { .. }) | Some(SchemaKind::Array { .. }) | None => Vec::new(),
        }
    }

    /// Type of a property, response, or body schema
    pub fn field_type(&self, schema: &SchemaOrRef) -> FieldType {
        self.field_type_inner(schema, &mut BTreeSet::new())
    }

    fn field_type_inner(&self, schema: &SchemaOrRef, seen: &mut BTreeSet<String>) -> FieldType {
        let schema = match schema {
            SchemaOrRef::Schema(inline) => return self.inline_field_type(inline, seen),
            SchemaOrRef::Reference { ref_path } => match schema.ref_name() {
                Some(name) => name,
                None => {
                    debug!("Treating non-local reference {} as opaque", ref_path);
                    return FieldType::Any;
                }
            },
        };

        let name = schema;
        if self.is_error_schema(name) {
            return FieldType::Any;
        }
        if !seen.insert(name.to_string()) {
            debug!("Alias cycle through {}, treating as opaque", name);
            return FieldType::Any;
        }

        match self.spec.schema_entry(name) {
            None => {
                debug!("Treating unresolvable reference {} as opaque", name);
                FieldType::Any
            }
            Some(alias @ SchemaOrRef::Reference { .. }) => self.field_type_inner(alias, seen),
            Some(SchemaOrRef::Schema(target)) => {
                if target.is_array() {
                    self.inline_field_type(target, seen)
                } else if Self::is_materialized(target) {
                    FieldType::Ref(name.to_string())
                } else {
                    scalar_field_type(target)
                }
            }
        }
    }

    fn inline_field_type(&self, schema: &Schema, seen: &mut BTreeSet<String>) -> FieldType {
        if schema.is_array() {
            let items = schema
                .items
                .as_deref()
                .map(|items| self.field_type_inner(items, seen))
                .unwrap_or(FieldType::Any);
            return FieldType::List(Box::new(items));
        }
        if schema.is_map() {
            let value = schema
                .map_value()
                .map(|v| self.field_type_inner(v, seen))
                .unwrap_or(FieldType::Any);
            return FieldType::Map(Box::new(value));
        }
        if !schema.one_of.is_empty() || schema.is_object() {
            // Anonymous objects and unions are not materialized
            return FieldType::Any;
        }
        scalar_field_type(schema)
    }

    /// Collect the entity and request schemas every operation needs
    pub fn collect_models(&self, operations: &[Operation]) -> ModelSet {
        let mut entity_names = BTreeSet::new();
        let mut request_names = BTreeSet::new();

        for op in operations {
            if let Some(root) = &op.response_schema {
                entity_names.extend(self.resolve(root));
            }
            if let Some(response_type) = &op.response_type {
                for name in response_type.referenced_names() {
                    entity_names.extend(self.resolve(name));
                }
            }

            if let Some(body) = &op.body {
                if let Some(body_ref) = &body.schema_ref {
                    request_names.insert(body_ref.clone());
                    entity_names.extend(self.resolve_request(body_ref));
                } else {
                    for property in &body.properties {
                        for name in property.field_type.referenced_names() {
                            entity_names.extend(self.resolve(name));
                        }
                    }
                }
            }
        }

        let mut models = ModelSet::default();
        for name in entity_names {
            match self.classify(&name) {
                Some(resolved) if !matches!(resolved.kind, SchemaKind::Array { .. }) => {
                    models.entities.insert(name, resolved);
                }
                _ => debug!("Schema {} has no model representation", name),
            }
        }
        for name in request_names {
            if models.entities.contains_key(&name) || self.is_error_schema(&name) {
                continue;
            }
            match self.classify(&name) {
                Some(resolved) if !matches!(resolved.kind, SchemaKind::Array { .. }) => {
                    models.requests.insert(name, resolved);
                }
                _ => debug!("Request schema {} has no model representation", name),
            }
        }

        models
    }
}

/// Merge every variant's properties into one optional field set
pub fn flatten_variants(variants: &[Vec<Property>]) -> Vec<Property> {
    let mut names = BTreeSet::new();
    let mut merged: Vec<Property> = Vec::new();
    for variant in variants {
        for property in variant {
            if names.insert(property.name.clone()) {
                merged.push(Property {
                    required: false,
                    ..property.clone()
                });
            }
        }
    }
    merged.sort_by(|a, b| a.name.cmp(&b.name));
    merged
}

fn scalar_field_type(schema: &Schema) -> FieldType {
    match schema.type_name() {
        Some("string") => FieldType::String,
        Some("integer") => FieldType::Integer,
        Some("number") => FieldType::Number,
        Some("boolean") => FieldType::Boolean,
        _ => FieldType::Any,
    }
}
