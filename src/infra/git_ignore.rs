//! `.gitignore` matching for project paths.

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use tracing::{debug, warn};

use crate::domain::IgnoreRules;

/// Rules from the project root's `.gitignore`. Nested ignore files are not
/// consulted.
#[derive(Debug, Clone)]
pub struct GitIgnore {
    matcher: Gitignore,
}

impl GitIgnore {
    /// Builds the matcher for `root`. A missing `.gitignore` ignores
    /// nothing; an unreadable one is logged and ignores nothing.
    pub fn load(root: &Path) -> Self {
        let mut builder = GitignoreBuilder::new(root);
        let path = root.join(".gitignore");
        if path.is_file() {
            if let Some(err) = builder.add(&path) {
                warn!(path = %path.display(), error = %err, "skipping unreadable .gitignore lines");
            }
            debug!(path = %path.display(), "loaded ignore rules");
        }
        let matcher = builder.build().unwrap_or_else(|err| {
            warn!(error = %err, "invalid .gitignore, ignoring nothing");
            Gitignore::empty()
        });
        Self { matcher }
    }
}

impl IgnoreRules for GitIgnore {
    /// `path` is project-relative; a file inside an ignored directory is
    /// ignored too.
    fn is_ignored(&self, path: &str) -> bool {
        if path.starts_with('/') {
            return false;
        }
        self.matcher
            .matched_path_or_any_parents(path, false)
            .is_ignore()
    }
}
