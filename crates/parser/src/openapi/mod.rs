//! OpenAPI 3 document model and parser
//!
//! ## Usage
//! ```rust,ignore
//! use clientgen_parser::openapi::OpenApiParser;
//!
//! let parser = OpenApiParser::from_file("openapi.json", GeneratorConfig::default())?;
//! let api = parser.parse()?;
//! ```

mod parser;
mod types;

pub use parser::OpenApiParser;
pub use types::*;
