//! OpenAPI 3 type definitions
//!
//! Simplified representation covering what the client generator reads.
//! Every map is a `BTreeMap` so iteration order never depends on hashing.

use clientgen_common::HttpMethod;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prefix of local schema references
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Prefix of local parameter references
pub const PARAMETER_REF_PREFIX: &str = "#/components/parameters/";

/// OpenAPI document root
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenApiSpec {
    /// OpenAPI version (e.g., "3.0.0")
    #[serde(default)]
    pub openapi: String,

    /// API metadata
    #[serde(default)]
    pub info: Info,

    /// API paths (endpoints)
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,

    /// Reusable components
    #[serde(default)]
    pub components: Option<Components>,
}

/// API information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Info {
    /// API title
    #[serde(default)]
    pub title: String,

    /// API version
    #[serde(default)]
    pub version: String,

    /// API description
    #[serde(default)]
    pub description: Option<String>,
}

/// Path item (operations for a path)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    /// GET operation
    #[serde(default)]
    pub get: Option<Operation>,

    /// POST operation
    #[serde(default)]
    pub post: Option<Operation>,

    /// PUT operation
    #[serde(default)]
    pub put: Option<Operation>,

    /// PATCH operation
    #[serde(default)]
    pub patch: Option<Operation>,

    /// DELETE operation
    #[serde(default)]
    pub delete: Option<Operation>,

    /// Path-level parameters shared by every operation
    #[serde(default)]
    pub parameters: Vec<ParameterOrRef>,
}

impl PathItem {
    /// Operation registered for an HTTP verb
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
        }
    }
}

/// HTTP operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Operation {
    /// Operation ID (unique identifier)
    #[serde(rename = "operationId")]
    #[serde(default)]
    pub operation_id: Option<String>,

    /// Summary
    #[serde(default)]
    pub summary: Option<String>,

    /// Description
    #[serde(default)]
    pub description: Option<String>,

    /// Parameters
    #[serde(default)]
    pub parameters: Vec<ParameterOrRef>,

    /// Request body
    #[serde(rename = "requestBody")]
    #[serde(default)]
    pub request_body: Option<RequestBody>,

    /// Responses keyed by status code
    #[serde(default)]
    pub responses: BTreeMap<String, Response>,

    /// Tags (for grouping)
    #[serde(default)]
    pub tags: Vec<String>,

    /// Extensions (x-pagination, etc.)
    #[serde(flatten)]
    pub extensions: BTreeMap<String, serde_json::Value>,
}

/// Parameter or reference to `components.parameters`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterOrRef {
    /// Reference to a shared parameter
    Reference {
        #[serde(rename = "$ref")]
        ref_path: String,
    },

    /// Inline parameter
    Parameter(Parameter),
}

/// Parameter definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,

    /// Location: query, header, path, cookie
    #[serde(rename = "in")]
    pub location: String,

    /// Description
    #[serde(default)]
    pub description: Option<String>,

    /// Required flag
    #[serde(default)]
    pub required: bool,

    /// Schema
    #[serde(default)]
    pub schema: Option<SchemaOrRef>,
}

/// Request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestBody {
    /// Description
    #[serde(default)]
    pub description: Option<String>,

    /// Content types
    #[serde(default)]
    pub content: BTreeMap<String, MediaType>,

    /// Required flag
    #[serde(default)]
    pub required: bool,
}

/// Response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Response {
    /// Description
    #[serde(default)]
    pub description: String,

    /// Content types
    #[serde(default)]
    pub content: BTreeMap<String, MediaType>,
}

/// Media type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaType {
    /// Schema
    #[serde(default)]
    pub schema: Option<SchemaOrRef>,
}

/// Schema or reference
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaOrRef {
    /// Reference to schema
    Reference {
        #[serde(rename = "$ref")]
        ref_path: String,
    },

    /// Direct schema
    Schema(Box<Schema>),
}

impl SchemaOrRef {
    /// Name of the referenced component schema, if this is a local reference
    pub fn ref_name(&self) -> Option<&str> {
        match self {
            SchemaOrRef::Reference { ref_path } => ref_path.strip_prefix(SCHEMA_REF_PREFIX),
            SchemaOrRef::Schema(_) => None,
        }
    }

    /// Inline schema, if this is not a reference
    pub fn as_schema(&self) -> Option<&Schema> {
        match self {
            SchemaOrRef::Schema(s) => Some(s.as_ref()),
            SchemaOrRef::Reference { .. } => None,
        }
    }
}

/// `type` keyword; OpenAPI 3.1 allows a list such as `["string", "null"]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    Single(String),
    Multiple(Vec<String>),
}

impl SchemaType {
    /// First non-null type name
    pub fn primary(&self) -> Option<&str> {
        match self {
            SchemaType::Single(t) => Some(t.as_str()),
            SchemaType::Multiple(types) => {
                types.iter().map(String::as_str).find(|t| *t != "null")
            }
        }
    }
}

/// `additionalProperties` keyword
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(Box<SchemaOrRef>),
}

/// Schema definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    /// Type: string, number, integer, boolean, array, object
    #[serde(rename = "type")]
    #[serde(default)]
    pub schema_type: Option<SchemaType>,

    /// Format (e.g., int32, int64, date-time)
    #[serde(default)]
    pub format: Option<String>,

    /// Description
    #[serde(default)]
    pub description: Option<String>,

    /// Properties (for object type)
    #[serde(default)]
    pub properties: BTreeMap<String, SchemaOrRef>,

    /// Required properties
    #[serde(default)]
    pub required: Vec<String>,

    /// Items schema (for array type)
    #[serde(default)]
    pub items: Option<Box<SchemaOrRef>>,

    /// Additional properties
    #[serde(rename = "additionalProperties")]
    #[serde(default)]
    pub additional_properties: Option<AdditionalProperties>,

    /// Union variants
    #[serde(rename = "oneOf")]
    #[serde(default)]
    pub one_of: Vec<SchemaOrRef>,

    /// Enum values
    #[serde(rename = "enum")]
    #[serde(default)]
    pub enum_values: Vec<serde_json::Value>,
}

impl Schema {
    pub fn type_name(&self) -> Option<&str> {
        self.schema_type.as_ref().and_then(SchemaType::primary)
    }

    pub fn is_array(&self) -> bool {
        self.type_name() == Some("array")
    }

    /// `additionalProperties` with no named properties
    pub fn is_map(&self) -> bool {
        self.properties.is_empty()
            && matches!(
                self.additional_properties,
                Some(AdditionalProperties::Schema(_)) | Some(AdditionalProperties::Allowed(true))
            )
    }

    /// `type: object` or a non-empty property map
    pub fn is_object(&self) -> bool {
        self.type_name() == Some("object") || !self.properties.is_empty()
    }

    /// Value schema of a map, if one is given
    pub fn map_value(&self) -> Option<&SchemaOrRef> {
        match &self.additional_properties {
            Some(AdditionalProperties::Schema(value)) => Some(value.as_ref()),
            _ => None,
        }
    }
}

/// Reusable components
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Components {
    /// Schemas; an entry may itself be a `$ref` alias
    #[serde(default)]
    pub schemas: BTreeMap<String, SchemaOrRef>,

    /// Parameters
    #[serde(default)]
    pub parameters: BTreeMap<String, Parameter>,
}

impl OpenApiSpec {
    /// Get a schema dictionary entry by name
    pub fn schema_entry(&self, name: &str) -> Option<&SchemaOrRef> {
        self.components.as_ref().and_then(|c| c.schemas.get(name))
    }

    /// Get a shared parameter by reference path
    /// e.g., "#/components/parameters/ProjectId" -> returns ProjectId parameter
    pub fn resolve_parameter_ref(&self, ref_path: &str) -> Option<&Parameter> {
        let name = ref_path.strip_prefix(PARAMETER_REF_PREFIX)?;
        self.components
            .as_ref()
            .and_then(|c| c.parameters.get(name))
    }

    /// Resolve a parameter entry to its definition
    pub fn parameter<'a>(&'a self, entry: &'a ParameterOrRef) -> Option<&'a Parameter> {
        match entry {
            ParameterOrRef::Parameter(p) => Some(p),
            ParameterOrRef::Reference { ref_path } => self.resolve_parameter_ref(ref_path),
        }
    }
}
