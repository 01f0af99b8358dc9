//! API description parsing for clientgen
//!
//! This crate turns an OpenAPI document and a behavior document into the
//! intermediate representation (`ApiDefinition`) the emitters consume.
//!
//! ## Pipeline
//!
//! - [`OperationParser`] normalizes every path + verb into an `Operation`
//! - [`SchemaResolver`] decides which named schemas become model types
//! - [`NamingEngine`] derives method names and service groups
//! - [`BehaviorModel`] compiles per-operation retry policies

mod behavior;
mod naming;
pub mod openapi;
mod operations;
mod resolver;

pub use behavior::{compile_retry_policies, BehaviorModel};
pub use naming::{NamingEngine, UNTAGGED_GROUP};
pub use openapi::OpenApiParser;
pub use operations::OperationParser;
pub use resolver::{flatten_variants, SchemaResolver};

use clientgen_common::{ApiDefinition, GeneratorConfig, Result};
use std::path::Path;

/// Parse an OpenAPI file with the given configuration
///
/// # Arguments
/// * `path` - Path to the OpenAPI JSON document
/// * `config` - Naming tables and extension keys
pub fn parse_openapi<P: AsRef<Path>>(path: P, config: GeneratorConfig) -> Result<ApiDefinition> {
    OpenApiParser::from_file(path, config)?.parse()
}
