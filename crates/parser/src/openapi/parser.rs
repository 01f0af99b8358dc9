//! OpenAPI spec file parser

use super::types::OpenApiSpec;
use crate::naming::NamingEngine;
use crate::operations::OperationParser;
use crate::resolver::SchemaResolver;
use clientgen_common::{ApiDefinition, GeneratorConfig, GeneratorError, Result};
use std::fs;
use std::path::Path;
use tracing::info;

/// OpenAPI document parser
///
/// Reads an OpenAPI 3 description and turns it into an [`ApiDefinition`]:
/// operations, service groups, and the models they need.
pub struct OpenApiParser {
    /// Loaded OpenAPI spec
    spec: OpenApiSpec,

    /// Naming tables and extension keys
    config: GeneratorConfig,
}

impl OpenApiParser {
    /// Load OpenAPI spec from file path
    ///
    /// # Example
    /// ```rust,ignore
    /// let parser = OpenApiParser::from_file("openapi.json", GeneratorConfig::default())?;
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P, config: GeneratorConfig) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            GeneratorError::Parse(format!(
                "Failed to read OpenAPI file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_json(&content, config)
    }

    /// Parse OpenAPI spec from JSON string
    pub fn from_json(json: &str, config: GeneratorConfig) -> Result<Self> {
        let spec: OpenApiSpec = serde_json::from_str(json)
            .map_err(|e| GeneratorError::Parse(format!("Failed to parse OpenAPI JSON: {}", e)))?;

        Ok(Self { spec, config })
    }

    /// Parse OpenAPI spec into the generator IR
    pub fn parse(&self) -> Result<ApiDefinition> {
        let resolver = SchemaResolver::new(&self.spec, &self.config);
        let naming = NamingEngine::new(&self.config);

        let operations =
            OperationParser::new(&self.spec, &self.config, &resolver, &naming).parse_all()?;
        let groups = naming.group_operations(&operations);
        let models = resolver.collect_models(&operations);

        info!(
            "Parsed {} operations into {} services with {} models",
            operations.len(),
            groups.len(),
            models.entities.len() + models.requests.len()
        );

        Ok(ApiDefinition {
            title: self.spec.info.title.clone(),
            version: self.spec.info.version.clone(),
            operations,
            groups,
            models,
        })
    }

    /// Get reference to the underlying OpenAPI spec
    pub fn spec(&self) -> &OpenApiSpec {
        &self.spec
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }
}
