//! Operation extraction from OpenAPI paths
//!
//! Walks every path and verb and normalizes each entry into an
//! [`Operation`]: parameters, request body, response shape, and the
//! pagination and mutation flags.

use crate::naming::NamingEngine;
use crate::openapi::{self, OpenApiSpec, Parameter, ParameterOrRef, PathItem, SchemaOrRef};
use crate::resolver::SchemaResolver;
use clientgen_common::{
    FieldType, GeneratorConfig, HttpMethod, Operation, PathParam, QueryParam, RequestBody,
    Result, ScalarType,
};
use tracing::debug;

const JSON_CONTENT: &str = "application/json";
const BINARY_CONTENT: &str = "application/octet-stream";

/// Builds normalized operations from an API description
pub struct OperationParser<'a> {
    spec: &'a OpenApiSpec,
    config: &'a GeneratorConfig,
    resolver: &'a SchemaResolver<'a>,
    naming: &'a NamingEngine<'a>,
}

impl<'a> OperationParser<'a> {
    pub fn new(
        spec: &'a OpenApiSpec,
        config: &'a GeneratorConfig,
        resolver: &'a SchemaResolver<'a>,
        naming: &'a NamingEngine<'a>,
    ) -> Self {
        Self {
            spec,
            config,
            resolver,
            naming,
        }
    }

    /// Every operation in the document, sorted by identity
    pub fn parse_all(&self) -> Result<Vec<Operation>> {
        let mut operations = Vec::new();

        for (path, item) in &self.spec.paths {
            for method in HttpMethod::ALL {
                let Some(op) = item.operation(method) else {
                    continue;
                };
                let Some(operation_id) = op.operation_id.as_deref().filter(|id| !id.is_empty())
                else {
                    debug!("Skipping {} {} without operationId", method, path);
                    continue;
                };
                operations.push(self.parse_operation(path, item, method, operation_id, op)?);
            }
        }

        operations.sort_by(|a, b| a.operation_id.cmp(&b.operation_id));
        Ok(operations)
    }

    fn parse_operation(
        &self,
        path: &str,
        item: &PathItem,
        method: HttpMethod,
        operation_id: &str,
        op: &openapi::Operation,
    ) -> Result<Operation> {
        let parameters = self.merged_parameters(&item.parameters, &op.parameters);
        let tag = op.tags.first().cloned();

        let mut operation = Operation {
            operation_id: operation_id.to_string(),
            method_name: self.naming.method_name(operation_id)?,
            http_method: method,
            path: path.to_string(),
            description: op.description.clone().or_else(|| op.summary.clone()),
            path_params: self.path_params(path, &parameters),
            query_params: query_params(&parameters),
            body: None,
            binary_body: false,
            response_schema: None,
            response_type: None,
            returns_array: false,
            returns_void: false,
            is_mutation: method != HttpMethod::Get,
            is_paginated: self.is_paginated(op),
            resource_type: self.naming.resource_type(operation_id, tag.as_deref()),
            tag,
        };

        self.apply_request_body(&mut operation, op);
        self.apply_response(&mut operation, op);

        Ok(operation)
    }

    /// Path-level parameters overlaid with operation-level ones
    ///
    /// An operation entry replaces a path entry with the same name and location.
    fn merged_parameters<'p>(
        &'p self,
        path_level: &'p [ParameterOrRef],
        operation_level: &'p [ParameterOrRef],
    ) -> Vec<&'p Parameter> {
        let mut merged: Vec<&Parameter> = Vec::new();

        for entry in path_level.iter().chain(operation_level) {
            let Some(param) = self.spec.parameter(entry) else {
                if let ParameterOrRef::Reference { ref_path } = entry {
                    debug!("Skipping unresolvable parameter reference {}", ref_path);
                }
                continue;
            };

            match merged
                .iter_mut()
                .find(|p| p.name == param.name && p.location == param.location)
            {
                Some(existing) => *existing = param,
                None => merged.push(param),
            }
        }

        merged
    }

    /// Path parameters in template order, tenant identifier excluded
    ///
    /// Placeholders that no parameter declares still become string arguments,
    /// otherwise the emitted path could not be interpolated.
    fn path_params(&self, path: &str, parameters: &[&Parameter]) -> Vec<PathParam> {
        let placeholders = placeholders(path);

        let mut params: Vec<(usize, PathParam)> = parameters
            .iter()
            .filter(|p| p.location == "path" && p.name != self.config.tenant_param)
            .map(|p| {
                let position = placeholders
                    .iter()
                    .position(|name| *name == p.name)
                    .unwrap_or(usize::MAX);
                (
                    position,
                    PathParam {
                        name: p.name.clone(),
                        scalar: scalar_of(p),
                    },
                )
            })
            .collect();

        for (position, name) in placeholders.iter().enumerate() {
            if *name == self.config.tenant_param || params.iter().any(|(_, p)| p.name == *name) {
                continue;
            }
            debug!("Path {} declares no parameter for {{{}}}", path, name);
            params.push((
                position,
                PathParam {
                    name: name.to_string(),
                    scalar: ScalarType::String,
                },
            ));
        }

        params.sort_by_key(|(position, _)| *position);
        params.into_iter().map(|(_, p)| p).collect()
    }

    fn is_paginated(&self, op: &openapi::Operation) -> bool {
        match op.extensions.get(&self.config.pagination_extension) {
            None | Some(serde_json::Value::Null) | Some(serde_json::Value::Bool(false)) => false,
            Some(_) => true,
        }
    }

    fn apply_request_body(&self, operation: &mut Operation, op: &openapi::Operation) {
        let Some(request_body) = &op.request_body else {
            return;
        };

        if let Some(media) = request_body.content.get(JSON_CONTENT) {
            operation.body = Some(match &media.schema {
                Some(schema) => RequestBody {
                    schema_ref: schema.ref_name().map(String::from),
                    field_type: self.resolver.field_type(schema),
                    properties: self.resolver.body_properties(schema),
                },
                None => RequestBody {
                    schema_ref: None,
                    field_type: FieldType::Any,
                    properties: Vec::new(),
                },
            });
        } else if request_body.content.contains_key(BINARY_CONTENT) {
            operation.binary_body = true;
        }
    }

    fn apply_response(&self, operation: &mut Operation, op: &openapi::Operation) {
        let has_json = |code: &str| {
            op.responses
                .get(code)
                .is_some_and(|r| r.content.contains_key(JSON_CONTENT))
        };
        if !["200", "201", "204"].into_iter().any(has_json) {
            operation.returns_void = true;
            return;
        }

        let schema = ["200", "201"].iter().find_map(|code| {
            op.responses
                .get(*code)
                .and_then(|r| r.content.get(JSON_CONTENT))
                .and_then(|m| m.schema.as_ref())
        });
        let Some(schema) = schema else {
            operation.response_type = Some(FieldType::Any);
            return;
        };

        let root = match schema {
            SchemaOrRef::Reference { .. } => schema.ref_name(),
            // Inline array of a named item
            SchemaOrRef::Schema(inline) if inline.is_array() => {
                inline.items.as_deref().and_then(SchemaOrRef::ref_name)
            }
            SchemaOrRef::Schema(_) => None,
        };
        operation.response_schema = root
            .filter(|name| !self.resolver.is_error_schema(name))
            .map(String::from);

        match self.resolver.field_type(schema) {
            FieldType::List(items) => {
                operation.returns_array = true;
                operation.response_type = Some(*items);
            }
            other => operation.response_type = Some(other),
        }
    }
}

/// Placeholder names in a path template, in order
fn placeholders(path: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start + 1..].find('}') else {
            break;
        };
        let name = &rest[start + 1..start + 1 + len];
        if !name.is_empty() {
            names.push(name);
        }
        rest = &rest[start + len + 2..];
    }
    names
}

fn query_params(parameters: &[&Parameter]) -> Vec<QueryParam> {
    parameters
        .iter()
        .filter(|p| p.location == "query")
        .map(|p| QueryParam {
            name: p.name.clone(),
            scalar: scalar_of(p),
            required: p.required,
            description: p.description.clone(),
        })
        .collect()
}

fn scalar_of(param: &Parameter) -> ScalarType {
    let type_name = param
        .schema
        .as_ref()
        .and_then(SchemaOrRef::as_schema)
        .and_then(|s| s.type_name());
    ScalarType::from_openapi(type_name)
}
