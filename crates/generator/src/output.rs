//! Output sinks
//!
//! Generated files are written through [`OutputSink`] so the aggregator's
//! ordering (stale directories removed before anything is written) can be
//! exercised without touching the filesystem.

use clientgen_common::{GeneratorError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Destination for generated files
#[cfg_attr(test, mockall::automock)]
pub trait OutputSink {
    /// Remove a directory and its contents; a missing directory is not an error
    fn remove_dir(&mut self, path: &Path) -> Result<()>;

    /// Write a file, creating parent directories as needed
    fn write_file(&mut self, path: &Path, contents: &str) -> Result<()>;
}

/// Filesystem-backed sink
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSink;

impl OutputSink for FsSink {
    fn remove_dir(&mut self, path: &Path) -> Result<()> {
        match fs::remove_dir_all(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(GeneratorError::Generation(format!(
                "Failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn write_file(&mut self, path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                GeneratorError::Generation(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        fs::write(path, contents).map_err(|e| {
            GeneratorError::Generation(format!("Failed to write {}: {}", path.display(), e))
        })
    }
}
