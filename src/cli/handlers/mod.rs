//! Command handlers for the CLI.

mod completions;
mod extract;
mod transform;
mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::cli::config::ProjectConfig;
use crate::domain::{CollectionSet, ResourceRegistry};
use crate::infra::{read_resource, scan_markdown_files, to_project_path};

pub use completions::handle_completions;
pub use extract::handle_extract;
pub use transform::handle_transform;
pub use validate::handle_validate;

// ===========================================
// Shared Utilities
// ===========================================

/// A project loaded from disk: its configuration, compiled collections and
/// every markdown resource under the root.
pub struct Project {
    pub root: PathBuf,
    pub config: ProjectConfig,
    pub collections: CollectionSet,
    pub registry: ResourceRegistry,
}

impl Project {
    /// Scans `root` and builds the registry.
    ///
    /// Files that cannot be read (I/O or encoding errors) are logged and
    /// left out; everything else about a document, including broken
    /// frontmatter, is data for the validator.
    pub fn load(root: &Path, config: ProjectConfig) -> Result<Self> {
        let collections =
            CollectionSet::new(&config.collections).context("invalid collection configuration")?;
        let paths = scan_markdown_files(root)
            .with_context(|| format!("failed to scan {}", root.display()))?;

        let mut builder = ResourceRegistry::builder();
        for path in &paths {
            match read_resource(root, path) {
                Ok(resource) => {
                    let memberships = collections.memberships(&resource.file_path);
                    builder.insert(resource.with_collections(memberships));
                }
                Err(err) => warn!(path = %path.display(), error = %err, "skipping unreadable file"),
            }
        }
        let registry = builder.build();
        debug!(files = paths.len(), resources = registry.len(), "loaded project");

        Ok(Self {
            root: root.to_path_buf(),
            config,
            collections,
            registry,
        })
    }

    /// Resolves a file argument to its path on disk and its project path.
    ///
    /// Relative arguments are tried against the project root first, then
    /// against the working directory.
    pub fn locate(&self, file: &Path) -> (PathBuf, String) {
        if file.is_relative() {
            let under_root = self.root.join(file);
            if under_root.is_file() {
                return (under_root, to_project_path(file));
            }
        }
        let project_path = file
            .strip_prefix(&self.root)
            .map_or_else(|_| to_project_path(file), to_project_path);
        (file.to_path_buf(), project_path)
    }
}
