//! Isolated project directory backed by a temp directory.

#![allow(dead_code)]

use super::{MdvetCommand, TestDoc};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated project root, cleaned up on drop.
pub struct TestEnv {
    _temp_dir: TempDir,
    root: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes a file relative to the root, creating parent directories.
    pub fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directories");
        }
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Writes a rendered document.
    pub fn add_doc(&self, relative: &str, doc: &TestDoc) -> PathBuf {
        self.write_file(relative, &doc.render())
    }

    /// Writes `mdvet.toml` at the root.
    pub fn write_config(&self, toml: &str) -> PathBuf {
        self.write_file("mdvet.toml", toml)
    }

    /// Creates an MdvetCommand rooted at this environment.
    pub fn cmd(&self) -> MdvetCommand {
        MdvetCommand::new().root(&self.root)
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_cleanup_on_drop() {
        let path = {
            let env = TestEnv::new();
            env.root().to_path_buf()
        };
        assert!(!path.exists(), "temp directory should be cleaned up on drop");
    }

    #[test]
    fn test_env_write_file_creates_parents() {
        let env = TestEnv::new();
        let path = env.write_file("a/b/c.md", "# C\n");
        assert!(path.is_file());
        assert!(path.starts_with(env.root()));
    }

    #[test]
    fn test_env_provides_command() {
        let env = TestEnv::new();
        let args = env.cmd().get_args().to_vec();
        assert_eq!(args[0], "--root");
        assert_eq!(args[1], env.root().to_string_lossy());
    }
}
