//! Service emission
//!
//! Each service group becomes one `BaseService` subclass. Every method picks
//! one of three call shapes:
//!
//! - paginated list (`requestPaginated`, returns `ListResult<T>`)
//! - void (`requestVoid`)
//! - single value (`request`, returns `T` or `[T]`)

use crate::swift::{self, TypeNames};
use clientgen_common::{GeneratorConfig, Operation, ServiceGroup};
use serde::Serialize;

/// Call shape of a generated method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallShape {
    PaginatedList,
    Void,
    SingleValue,
}

impl CallShape {
    pub fn of(op: &Operation) -> Self {
        if op.is_paginated_list() {
            CallShape::PaginatedList
        } else if op.returns_void {
            CallShape::Void
        } else {
            CallShape::SingleValue
        }
    }

    fn runtime_call(&self) -> &'static str {
        match self {
            CallShape::PaginatedList => "return try await self.requestPaginated",
            CallShape::Void => "try await self.requestVoid",
            CallShape::SingleValue => "return try await self.request",
        }
    }
}

/// Template context for one service file
#[derive(Debug, Clone, Serialize)]
pub struct ServiceContext {
    pub group_name: String,
    pub class_name: String,
    /// Computed property name on `AccountClient`
    pub accessor_name: String,
    pub doc_comment: String,
    pub methods: Vec<MethodContext>,
    pub options: Vec<OptionsContext>,
}

impl ServiceContext {
    /// Relative output path
    pub fn file_path(&self) -> String {
        format!("Services/{}.swift", self.class_name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MethodContext {
    pub operation_id: String,
    pub name: String,
    pub shape: CallShape,
    pub doc_comment: String,
    pub signature: String,
    /// Argument labels in signature order
    pub labels: Vec<String>,
    /// ` -> T`, empty for void methods
    pub returns: String,
    pub query_lines: Vec<String>,
    /// Runtime call up to the opening parenthesis
    pub call: String,
    pub info: String,
    pub http_method: &'static str,
    /// Path literal with `\(name)` interpolation
    pub path: String,
    /// Optional arguments: query items, body, page cap
    pub extra_args: Vec<String>,
    /// Retry lookup passed on every call
    pub retry: String,
}

/// `<OperationId>Options` bundle for optional query parameters and page caps
#[derive(Debug, Clone, Serialize)]
pub struct OptionsContext {
    pub operation_id: String,
    pub type_name: String,
    pub fields: Vec<OptionFieldContext>,
    pub init_params: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptionFieldContext {
    pub swift_name: String,
    pub swift_type: String,
    pub doc_comment: String,
}

/// Class name for a service group
pub fn class_name(group_name: &str) -> String {
    format!("{}Service", swift::type_name(group_name))
}

/// Accessor property name for a service group
pub fn accessor_name(group_name: &str) -> String {
    swift::property_name(group_name)
}

/// Options struct name for an operation
pub fn options_type_name(operation_id: &str) -> String {
    format!("{}Options", swift::type_name(operation_id))
}

/// Build the context for one service group
pub fn service_context(
    group: &ServiceGroup,
    names: &TypeNames,
    config: &GeneratorConfig,
) -> ServiceContext {
    let methods = group
        .operations
        .iter()
        .map(|op| method_context(group, op, names, config))
        .collect();
    let options = group
        .operations
        .iter()
        .filter(|op| op.has_options())
        .map(options_context)
        .collect();

    ServiceContext {
        group_name: group.name.clone(),
        class_name: class_name(&group.name),
        accessor_name: accessor_name(&group.name),
        doc_comment: swift::doc_comment(
            Some(format!("Operations for {}.", group.name).as_str()),
            0,
        ),
        methods,
        options,
    }
}

fn method_context(
    group: &ServiceGroup,
    op: &Operation,
    names: &TypeNames,
    config: &GeneratorConfig,
) -> MethodContext {
    let shape = CallShape::of(op);
    let mut labels: Vec<String> = Vec::new();
    let mut arguments = Vec::new();
    let mut argument = |label: String, swift_type: &str| {
        arguments.push(format!("{}: {}", label, swift_type));
        labels.push(label);
    };

    for param in &op.path_params {
        argument(
            swift::property_name(&param.name),
            swift::scalar_type(param.scalar),
        );
    }
    if let Some(body) = &op.body {
        argument("request".to_string(), &names.swift_type(&body.field_type));
    }
    if op.binary_body {
        argument("data".to_string(), "Data");
        argument("contentType".to_string(), "String");
    }
    for query in op.required_query_params() {
        argument(
            swift::property_name(&query.name),
            swift::scalar_type(query.scalar),
        );
    }
    if op.has_options() {
        argument(
            "options".to_string(),
            &format!("{}? = nil", options_type_name(&op.operation_id)),
        );
    }

    let item_type = op
        .response_type
        .as_ref()
        .map(|t| names.swift_type(t))
        .unwrap_or_else(|| swift::JSON_VALUE.to_string());
    let returns = match shape {
        CallShape::PaginatedList => format!(" -> ListResult<{}>", item_type),
        CallShape::Void => String::new(),
        CallShape::SingleValue if op.returns_array => format!(" -> [{}]", item_type),
        CallShape::SingleValue => format!(" -> {}", item_type),
    };

    let query_lines = query_lines(op);
    let mut extra_args = Vec::new();
    if !query_lines.is_empty() {
        extra_args.push("queryItems: queryItems".to_string());
    }
    if op.body.is_some() {
        extra_args.push("body: .json(request)".to_string());
    } else if op.binary_body {
        extra_args.push("body: .data(data, contentType: contentType)".to_string());
    }
    if shape == CallShape::PaginatedList {
        extra_args.push("maxItems: options?.maxItems".to_string());
    }

    MethodContext {
        operation_id: op.operation_id.clone(),
        name: swift::escape_identifier(&op.method_name),
        shape,
        doc_comment: swift::doc_comment(op.description.as_deref(), 4),
        signature: arguments.join(", "),
        labels,
        returns,
        query_lines,
        call: shape.runtime_call().to_string(),
        info: format!(
            "OperationInfo(service: \"{}\", operation: \"{}\", resourceType: \"{}\", isMutation: {})",
            swift::string_literal(&group.name),
            swift::string_literal(&op.operation_id),
            swift::string_literal(&op.resource_type),
            op.is_mutation
        ),
        http_method: op.http_method.as_str(),
        path: path_literal(&op.path, &config.tenant_param),
        extra_args,
        retry: format!(
            "Metadata.retryConfig(for: \"{}\")",
            swift::string_literal(&op.operation_id)
        ),
    }
}

/// Statements that build `queryItems`, empty when there are no query parameters
fn query_lines(op: &Operation) -> Vec<String> {
    if op.query_params.is_empty() {
        return Vec::new();
    }

    let mut lines = vec!["var queryItems: [URLQueryItem] = []".to_string()];
    for query in &op.query_params {
        let name = swift::property_name(&query.name);
        let key = swift::string_literal(&query.name);
        if query.required {
            lines.push(format!(
                "queryItems.append(URLQueryItem(name: \"{}\", value: \"\\({})\"))",
                key, name
            ));
        } else {
            lines.push(format!(
                "if let {name} = options?.{name} {{ queryItems.append(URLQueryItem(name: \"{key}\", value: \"\\({name})\")) }}",
                name = name,
                key = key
            ));
        }
    }
    lines
}

/// Strip the leading tenant segment and rewrite `{param}` as `\(param)`
///
/// # Examples
/// ```
/// use clientgen_generator::services::path_literal;
///
/// assert_eq!(
///     path_literal("/{accountId}/buckets/{projectId}/todos/{todo_id}.json", "accountId"),
///     "/buckets/\\(projectId)/todos/\\(todoId).json"
/// );
/// assert_eq!(path_literal("/{accountId}", "accountId"), "/");
/// ```
pub fn path_literal(path: &str, tenant_param: &str) -> String {
    let tenant_segment = format!("/{{{}}}", tenant_param);
    let stripped = match path.strip_prefix(&tenant_segment) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => path,
    };

    let mut out = String::new();
    let mut rest = stripped;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start + 1..].find('}') else {
            break;
        };
        out.push_str(&swift::string_literal(&rest[..start]));
        let name = &rest[start + 1..start + 1 + len];
        out.push_str(&format!("\\({})", swift::property_name(name)));
        rest = &rest[start + len + 2..];
    }
    out.push_str(&swift::string_literal(rest));

    if out.is_empty() {
        "/".to_string()
    } else {
        out
    }
}

fn options_context(op: &Operation) -> OptionsContext {
    let mut fields: Vec<OptionFieldContext> = op
        .optional_query_params()
        .map(|query| OptionFieldContext {
            swift_name: swift::property_name(&query.name),
            swift_type: swift::scalar_type(query.scalar).to_string(),
            doc_comment: swift::doc_comment(query.description.as_deref(), 4),
        })
        .collect();

    if op.is_paginated_list() {
        fields.push(OptionFieldContext {
            swift_name: "maxItems".to_string(),
            swift_type: "Int".to_string(),
            doc_comment: swift::doc_comment(
                Some("Maximum number of items to fetch across all pages; nil fetches every page."),
                4,
            ),
        });
    }

    let init_params = fields
        .iter()
        .map(|f| format!("{}: {}? = nil", f.swift_name, f.swift_type))
        .collect::<Vec<_>>()
        .join(", ");

    OptionsContext {
        operation_id: op.operation_id.clone(),
        type_name: options_type_name(&op.operation_id),
        fields,
        init_params,
    }
}
