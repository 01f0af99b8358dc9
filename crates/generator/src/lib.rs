//! Swift client generation for clientgen
//!
//! This crate renders a parsed [`ApiDefinition`] plus its [`BehaviorModel`]
//! into a Swift client tree:
//! - `Models/<Type>.swift`, one per emitted schema
//! - `Services/<Group>Service.swift`, one per service group
//! - `AccountClient+Services.swift` (service accessors)
//! - `Metadata.swift` (retry policies and idempotent operations)

mod metadata;
pub mod models;
mod output;
pub mod services;
pub mod swift;
mod templates;

pub use output::{FsSink, OutputSink};

use clientgen_common::{ApiDefinition, GeneratorConfig, GeneratorError, Result};
use clientgen_parser::BehaviorModel;
use models::ModelContext;
use services::ServiceContext;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use swift::TypeNames;
use tera::{Context, Tera};
use tracing::{debug, info, warn};

/// Directory holding model files; removed before every write
pub const MODELS_DIR: &str = "Models";
/// Directory holding service files; removed before every write
pub const SERVICES_DIR: &str = "Services";
pub const ACCESSORS_FILE: &str = "AccountClient+Services.swift";
pub const METADATA_FILE: &str = "Metadata.swift";

/// One rendered file, path relative to the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

/// Every rendered file, in emission order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedOutput {
    pub files: Vec<GeneratedFile>,
}

impl GeneratedOutput {
    /// Contents of a rendered file
    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files
            .iter()
            .find(|f| f.path == path.as_ref())
            .map(|f| f.contents.as_str())
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(|f| f.path.as_path())
    }

    fn push(&mut self, path: impl Into<PathBuf>, contents: String) {
        self.files.push(GeneratedFile {
            path: path.into(),
            contents,
        });
    }
}

/// Swift client generator
///
/// Transforms an ApiDefinition and BehaviorModel into the complete client tree.
/// Rendering is pure; nothing touches the filesystem until [`write_to`] or
/// [`write_with`], and only after validation passes.
///
/// [`write_to`]: ClientGenerator::write_to
/// [`write_with`]: ClientGenerator::write_with
pub struct ClientGenerator {
    api: ApiDefinition,
    behaviors: BehaviorModel,
    config: GeneratorConfig,
    tera: Tera,
}

impl ClientGenerator {
    /// Create a new client generator
    pub fn new(
        api: ApiDefinition,
        behaviors: BehaviorModel,
        config: GeneratorConfig,
    ) -> Result<Self> {
        let tera = templates::load_templates()?;
        Ok(Self {
            api,
            behaviors,
            config,
            tera,
        })
    }

    pub fn api(&self) -> &ApiDefinition {
        &self.api
    }

    /// Render every artifact in memory
    pub fn render(&self) -> Result<GeneratedOutput> {
        let names = TypeNames::new(&self.api.models);
        let models = models::model_contexts(&self.api.models, &names);
        let services: Vec<ServiceContext> = self
            .api
            .groups
            .iter()
            .map(|group| services::service_context(group, &names, &self.config))
            .collect();

        self.validate(&models, &services)?;
        self.warn_unmatched_behaviors();

        let mut output = GeneratedOutput::default();

        for model in &models {
            let mut context = Context::new();
            context.insert("model", model);
            output.push(model.file_path(), self.render_template(templates::MODEL, &context)?);
        }

        for service in &services {
            let mut context = Context::new();
            context.insert("service", service);
            output.push(
                service.file_path(),
                self.render_template(templates::SERVICE, &context)?,
            );
        }

        let mut context = Context::new();
        context.insert("services", &services);
        output.push(
            ACCESSORS_FILE,
            self.render_template(templates::ACCESSORS, &context)?,
        );

        let mut context = Context::new();
        context.insert("retry_entries", &metadata::retry_entries(&self.behaviors));
        context.insert(
            "idempotent_operations",
            &metadata::idempotent_literal(&self.behaviors),
        );
        output.push(
            METADATA_FILE,
            self.render_template(templates::METADATA, &context)?,
        );

        info!(
            "Rendered {} models, {} services, {} retry policies",
            models.len(),
            services.len(),
            self.behaviors.operations.len()
        );

        Ok(output)
    }

    fn render_template(&self, name: &str, context: &Context) -> Result<String> {
        self.tera
            .render(name, context)
            .map_err(|e| GeneratorError::Generation(format!("Template error in {}: {:?}", name, e)))
    }

    /// Cross-artifact consistency checks, run before anything is written
    fn validate(&self, models: &[ModelContext], services: &[ServiceContext]) -> Result<()> {
        let mut problems = Vec::new();

        let mut operation_ids = BTreeSet::new();
        for op in &self.api.operations {
            if !operation_ids.insert(op.operation_id.as_str()) {
                problems.push(format!("duplicate operation identity {}", op.operation_id));
            }
        }

        // Every declared Swift type, keyed by name, with its origin
        let mut declared: BTreeMap<String, String> = swift::RUNTIME_TYPES
            .iter()
            .map(|name| (name.to_string(), "runtime".to_string()))
            .collect();
        let mut declare = |name: &str, origin: String, problems: &mut Vec<String>| {
            if let Some(existing) = declared.get(name) {
                problems.push(format!(
                    "type {} from {} collides with {}",
                    name, origin, existing
                ));
            } else {
                declared.insert(name.to_string(), origin);
            }
        };

        for model in models {
            declare(
                &model.type_name,
                format!("schema {}", model.schema_name),
                &mut problems,
            );
        }

        let mut accessors = BTreeSet::new();
        for service in services {
            declare(
                &service.class_name,
                format!("service group {}", service.group_name),
                &mut problems,
            );
            for options in &service.options {
                declare(
                    &options.type_name,
                    format!("options of {}", options.operation_id),
                    &mut problems,
                );
            }

            if !accessors.insert(service.accessor_name.as_str()) {
                problems.push(format!(
                    "duplicate accessor {} for service group {}",
                    service.accessor_name, service.group_name
                ));
            }

            let mut methods: BTreeMap<&str, &str> = BTreeMap::new();
            for method in &service.methods {
                if let Some(previous) = methods.insert(&method.name, &method.operation_id) {
                    problems.push(format!(
                        "{} has two methods named {} ({} and {})",
                        service.class_name, method.name, previous, method.operation_id
                    ));
                }

                let mut labels = BTreeSet::new();
                for label in &method.labels {
                    if !labels.insert(label.as_str()) {
                        problems.push(format!(
                            "{} repeats the argument label {}",
                            method.operation_id, label
                        ));
                    }
                }
                if !method.query_lines.is_empty() && labels.contains("queryItems") {
                    problems.push(format!(
                        "{} has an argument named queryItems, which shadows the query builder",
                        method.operation_id
                    ));
                }
            }

            for options in &service.options {
                let mut fields = BTreeSet::new();
                for field in &options.fields {
                    if !fields.insert(field.swift_name.as_str()) {
                        problems.push(format!(
                            "{} repeats the property {}",
                            options.type_name, field.swift_name
                        ));
                    }
                }
            }
        }

        for group in &self.api.groups {
            for name in &group.entity_types {
                if !self.api.models.contains(name) {
                    problems.push(format!(
                        "service group {} references {} which is not emitted",
                        group.name, name
                    ));
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(GeneratorError::Validation(problems.join("; ")))
        }
    }

    fn warn_unmatched_behaviors(&self) {
        let known: BTreeSet<&str> = self
            .api
            .operations
            .iter()
            .map(|op| op.operation_id.as_str())
            .collect();
        for id in self.behaviors.operations.keys() {
            if !known.contains(id.as_str()) {
                warn!("Behavior model entry {} matches no operation", id);
            }
        }
    }

    /// Render, then replace the client tree under `output_dir`
    pub fn write_to(&self, output_dir: &Path) -> Result<GeneratedOutput> {
        self.write_with(&mut FsSink, output_dir)
    }

    /// Render, then write through `sink`
    ///
    /// `Models/` and `Services/` are removed before any file is written, so
    /// files for schemas or groups that no longer exist do not linger.
    pub fn write_with(&self, sink: &mut dyn OutputSink, output_dir: &Path) -> Result<GeneratedOutput> {
        let output = self.render()?;

        sink.remove_dir(&output_dir.join(MODELS_DIR))?;
        sink.remove_dir(&output_dir.join(SERVICES_DIR))?;

        for file in &output.files {
            debug!("Writing {}", file.path.display());
            sink.write_file(&output_dir.join(&file.path), &file.contents)?;
        }

        Ok(output)
    }

    /// Files under `output_dir` that a fresh generation would change
    ///
    /// Reports rendered files that are missing or differ, plus stale files in
    /// `Models/` and `Services/` that generation would remove.
    pub fn check(&self, output_dir: &Path) -> Result<Vec<PathBuf>> {
        let output = self.render()?;
        let mut stale = Vec::new();

        for file in &output.files {
            match fs::read_to_string(output_dir.join(&file.path)) {
                Ok(existing) if existing == file.contents => {}
                _ => stale.push(file.path.clone()),
            }
        }

        let rendered: BTreeSet<&Path> = output.paths().collect();
        for dir in [MODELS_DIR, SERVICES_DIR] {
            let entries = match fs::read_dir(output_dir.join(dir)) {
                Ok(entries) => entries,
                Err(_) => continue,
            };
            let mut extra = Vec::new();
            for entry in entries {
                let entry = entry?;
                let relative = Path::new(dir).join(entry.file_name());
                if !rendered.contains(relative.as_path()) {
                    extra.push(relative);
                }
            }
            extra.sort();
            stale.extend(extra);
        }

        Ok(stale)
    }
}

/// Generate a Swift client tree (convenience function)
pub fn generate_client(
    api: ApiDefinition,
    behaviors: BehaviorModel,
    config: GeneratorConfig,
    output_path: &Path,
) -> Result<GeneratedOutput> {
    let generator = ClientGenerator::new(api, behaviors, config)?;
    generator.write_to(output_path)
}
