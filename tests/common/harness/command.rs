//! Fluent wrapper around assert_cmd::Command.

#![allow(dead_code)]

use assert_cmd::Command;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Fluent wrapper around `assert_cmd::Command` for the `mdvet` binary.
pub struct MdvetCommand {
    args: Vec<String>,
}

impl MdvetCommand {
    pub fn new() -> Self {
        Self { args: Vec::new() }
    }

    /// Sets the `--root` option.
    pub fn root(mut self, path: &Path) -> Self {
        self.args.push("--root".to_string());
        self.args.push(path.to_string_lossy().to_string());
        self
    }

    /// Adds arguments to the command.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args
            .extend(args.into_iter().map(|s| s.as_ref().to_string()));
        self
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Runs the command and returns an Assert for making assertions.
    #[allow(deprecated)]
    pub fn assert(self) -> assert_cmd::assert::Assert {
        let mut cmd = Command::cargo_bin("mdvet").expect("Failed to find mdvet binary");
        cmd.args(&self.args);
        cmd.env_remove("RUST_LOG");
        cmd.assert()
    }

    /// Runs the command, expects success, and returns stdout as a string.
    pub fn output_success(self) -> String {
        let output = self.assert().success().get_output().stdout.clone();
        String::from_utf8(output).expect("Output was not valid UTF-8")
    }

    /// Runs the command regardless of exit status and parses stdout as JSON.
    pub fn output_json<T: DeserializeOwned>(self) -> T {
        let output = self.assert().get_output().stdout.clone();
        serde_json::from_slice(&output).expect("Failed to parse output as JSON")
    }

    // ===========================================
    // Command Shortcuts
    // ===========================================

    pub fn validate(self) -> Self {
        self.args(["validate"])
    }

    pub fn extract(self, file: &str) -> Self {
        self.args(["extract", file])
    }

    pub fn transform(self, file: &str) -> Self {
        self.args(["transform", file])
    }

    /// Adds `--format json` to the command.
    pub fn format_json(self) -> Self {
        self.args(["--format", "json"])
    }
}

impl Default for MdvetCommand {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_command_runs_binary() {
        MdvetCommand::new().args(["--help"]).assert().success();
    }

    #[test]
    fn test_command_with_root() {
        let temp = TempDir::new().unwrap();
        let cmd = MdvetCommand::new().root(temp.path());
        let args = cmd.get_args();
        assert_eq!(args[0], "--root");
        assert_eq!(args[1], temp.path().to_string_lossy());
    }

    #[test]
    fn test_command_shortcuts() {
        let cmd = MdvetCommand::new().validate().format_json();
        assert_eq!(cmd.get_args(), ["validate", "--format", "json"]);
    }
}
