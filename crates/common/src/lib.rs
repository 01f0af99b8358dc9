//! Common types and utilities for clientgen
//!
//! This crate contains the intermediate representation shared by the parser,
//! generator, and CLI: parsed operations, resolved schemas, service groups,
//! retry policies, the error type, and generator configuration.

pub mod case;
mod config;

pub use config::{GeneratorConfig, NamingConfig};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

/// Errors that can occur during client generation
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Naming error: {0}")]
    Naming(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for generator operations
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// HTTP verbs the operation parser recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// All verbs in the order they are read from a path item
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar type of a path or query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalarType {
    String,
    Integer,
    Number,
    Boolean,
}

impl ScalarType {
    /// Coerce an OpenAPI `type` string into a scalar; anything unknown is a string
    pub fn from_openapi(schema_type: Option<&str>) -> Self {
        match schema_type {
            Some("integer") => ScalarType::Integer,
            Some("number") => ScalarType::Number,
            Some("boolean") => ScalarType::Boolean,
            _ => ScalarType::String,
        }
    }
}

/// Type of a model field or response value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    String,
    Integer,
    Number,
    Boolean,
    /// Named schema from `components.schemas`
    Ref(String),
    List(Box<FieldType>),
    /// String-keyed map with a uniform value type
    Map(Box<FieldType>),
    /// Opaque JSON value
    Any,
}

impl FieldType {
    /// Visit every named schema referenced by this type
    pub fn referenced_names(&self) -> Vec<&str> {
        match self {
            FieldType::Ref(name) => vec![name.as_str()],
            FieldType::List(inner) | FieldType::Map(inner) => inner.referenced_names(),
            FieldType::String
            | FieldType::Integer
            | FieldType::Number
            | FieldType::Boolean
            | FieldType::Any => vec![],
        }
    }
}

/// A named property of an object, union variant, or request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// JSON key
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    #[serde(default)]
    pub description: Option<String>,
}

/// Path parameter passed as a generated argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathParam {
    pub name: String,
    pub scalar: ScalarType,
}

/// Query parameter; required ones become positional arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParam {
    pub name: String,
    pub scalar: ScalarType,
    pub required: bool,
    #[serde(default)]
    pub description: Option<String>,
}

/// JSON request body of an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestBody {
    /// Named body schema; `None` for inline bodies
    pub schema_ref: Option<String>,
    /// Type of the generated body argument
    pub field_type: FieldType,
    pub properties: Vec<Property>,
}

/// One parsed API action (path + verb)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Stable identity (`operationId`)
    pub operation_id: String,
    /// Method name on the generated service class
    pub method_name: String,
    pub http_method: HttpMethod,
    /// Path template as written in the API description
    pub path: String,
    pub description: Option<String>,
    /// Grouping tag (first tag of the operation)
    pub tag: Option<String>,
    /// Path parameters in path order, tenant identifier excluded
    pub path_params: Vec<PathParam>,
    pub query_params: Vec<QueryParam>,
    pub body: Option<RequestBody>,
    /// `application/octet-stream` request body
    pub binary_body: bool,
    /// Root named schema of the 200/201 JSON response
    pub response_schema: Option<String>,
    /// Decoded response type (element type when `returns_array`)
    pub response_type: Option<FieldType>,
    pub returns_array: bool,
    pub returns_void: bool,
    pub is_mutation: bool,
    pub is_paginated: bool,
    /// Resource name reported to telemetry hooks
    pub resource_type: String,
}

impl Operation {
    /// Whether the generated method returns a lazily paginated list
    pub fn is_paginated_list(&self) -> bool {
        self.is_paginated && self.returns_array
    }

    pub fn optional_query_params(&self) -> impl Iterator<Item = &QueryParam> {
        self.query_params.iter().filter(|q| !q.required)
    }

    pub fn required_query_params(&self) -> impl Iterator<Item = &QueryParam> {
        self.query_params.iter().filter(|q| q.required)
    }

    /// Whether the method takes a trailing options bundle
    pub fn has_options(&self) -> bool {
        self.is_paginated_list() || self.optional_query_params().next().is_some()
    }
}

/// Logical variant of a named schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaKind {
    /// Named properties with a required subset
    Object {
        properties: Vec<Property>,
        required: BTreeSet<String>,
    },
    /// `oneOf` schema; one property list per variant
    Union { variants: Vec<Vec<Property>> },
    /// `additionalProperties`-only schema
    Map { value: FieldType },
    /// Array schema; a modifier on whichever type references it
    Array { items: FieldType },
}

/// A named schema together with its classified variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSchema {
    pub name: String,
    pub kind: SchemaKind,
    pub description: Option<String>,
}

/// Schemas selected for emission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelSet {
    /// Entity schemas keyed by schema name
    pub entities: BTreeMap<String, ResolvedSchema>,
    /// Request body schemas keyed by schema name
    pub requests: BTreeMap<String, ResolvedSchema>,
}

impl ModelSet {
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.requests.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entities.contains_key(name) || self.requests.contains_key(name)
    }
}

/// Parsed API description, ready for emission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiDefinition {
    pub title: String,
    pub version: String,
    /// Every operation, sorted by identity
    pub operations: Vec<Operation>,
    /// Service groups, sorted by name
    pub groups: Vec<ServiceGroup>,
    pub models: ModelSet,
}

/// Operations emitted together as one service class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceGroup {
    pub name: String,
    /// Sorted by operation identity
    pub operations: Vec<Operation>,
    /// Schema names referenced by the group's methods
    pub entity_types: BTreeSet<String>,
}

/// Backoff strategy between retry attempts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackoffKind {
    #[default]
    Exponential,
    ExponentialJitter,
    Linear,
    Constant,
}

impl BackoffKind {
    /// Parse a behavior-document backoff string
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "exponential" | "exp" => Some(BackoffKind::Exponential),
            "exp+jitter" | "exponential+jitter" | "exponential_jitter" | "jitter" => {
                Some(BackoffKind::ExponentialJitter)
            }
            "linear" => Some(BackoffKind::Linear),
            "constant" | "fixed" => Some(BackoffKind::Constant),
            _ => None,
        }
    }

    /// Identifier used by the generated runtime enum
    pub fn as_str(&self) -> &'static str {
        match self {
            BackoffKind::Exponential => "exponential",
            BackoffKind::ExponentialJitter => "exponentialJitter",
            BackoffKind::Linear => "linear",
            BackoffKind::Constant => "constant",
        }
    }
}

/// Compiled retry parameters for one operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: BackoffKind,
    pub base_delay_ms: u64,
    pub retry_on: BTreeSet<u16>,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;
    pub const DEFAULT_RETRY_ON: [u16; 2] = [429, 503];
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            backoff: BackoffKind::default(),
            base_delay_ms: Self::DEFAULT_BASE_DELAY_MS,
            retry_on: Self::DEFAULT_RETRY_ON.into_iter().collect(),
        }
    }
}

/// Everything the behavior document says about one operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationBehavior {
    pub retry: RetryPolicy,
    pub idempotent: bool,
    pub readonly: bool,
}
