//! Validation issue types and the aggregate result of a run.
//!
//! Every issue carries a severity. Contexts that only ever report errors
//! (schema checks) simply always use [`Severity::Error`].

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::LinkType;

/// Severity level of a validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message.
    Info,
    /// Worth a look, does not fail the run.
    Warning,
    /// Fails the run.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Issue code. Serialized as the snake_case string code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    BrokenFile,
    BrokenAnchor,
    ExternalUrl,
    ExternalUrlDead,
    ExternalUrlTimeout,
    ExternalUrlError,
    UnknownLink,
    DuplicateId,
    FrontmatterMissing,
    FrontmatterInvalidYaml,
    FrontmatterSchemaError,
}

impl IssueType {
    /// Severity this code is reported with.
    pub fn severity(&self) -> Severity {
        match self {
            IssueType::ExternalUrl => Severity::Info,
            IssueType::UnknownLink | IssueType::ExternalUrlTimeout => Severity::Warning,
            IssueType::BrokenFile
            | IssueType::BrokenAnchor
            | IssueType::ExternalUrlDead
            | IssueType::ExternalUrlError
            | IssueType::DuplicateId
            | IssueType::FrontmatterMissing
            | IssueType::FrontmatterInvalidYaml
            | IssueType::FrontmatterSchemaError => Severity::Error,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            IssueType::BrokenFile => "broken_file",
            IssueType::BrokenAnchor => "broken_anchor",
            IssueType::ExternalUrl => "external_url",
            IssueType::ExternalUrlDead => "external_url_dead",
            IssueType::ExternalUrlTimeout => "external_url_timeout",
            IssueType::ExternalUrlError => "external_url_error",
            IssueType::UnknownLink => "unknown_link",
            IssueType::DuplicateId => "duplicate_id",
            IssueType::FrontmatterMissing => "frontmatter_missing",
            IssueType::FrontmatterInvalidYaml => "frontmatter_invalid_yaml",
            IssueType::FrontmatterSchemaError => "frontmatter_schema_error",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A validation issue found during checking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub severity: Severity,
    /// Project path of the resource the issue was found in.
    pub resource_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    /// The offending href, for link issues.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    /// Creates an issue with the code's default severity.
    pub fn new(resource_path: impl Into<String>, issue_type: IssueType, message: impl Into<String>) -> Self {
        Self {
            severity: issue_type.severity(),
            resource_path: resource_path.into(),
            line: None,
            issue_type,
            link: None,
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_line(mut self, line: Option<usize>) -> Self {
        self.line = line;
        self
    }

    pub fn with_link(mut self, href: impl Into<String>) -> Self {
        self.link = Some(href.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: Option<String>) -> Self {
        self.suggestion = suggestion;
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resource_path)?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        write!(f, ": [{}] {}", self.issue_type, self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " ({})", suggestion)?;
        }
        Ok(())
    }
}

/// Aggregate outcome of one validation run. Built once, never mutated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub total_resources: usize,
    pub total_links: usize,
    pub links_by_type: BTreeMap<LinkType, usize>,
    pub issues: Vec<ValidationIssue>,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    pub passed: bool,
    pub duration_ms: u64,
    pub timestamp: DateTime<Utc>,
}

impl ValidationResult {
    /// Aggregates issues into a result; counts and `passed` are derived
    /// from `issues` so they can never disagree with it.
    pub fn new(
        total_resources: usize,
        links_by_type: BTreeMap<LinkType, usize>,
        mut issues: Vec<ValidationIssue>,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        issues.sort_by(|a, b| {
            a.resource_path
                .cmp(&b.resource_path)
                .then(a.line.cmp(&b.line))
        });
        let count = |severity: Severity| issues.iter().filter(|i| i.severity == severity).count();
        let error_count = count(Severity::Error);
        let warning_count = count(Severity::Warning);
        let info_count = count(Severity::Info);

        Self {
            total_resources,
            total_links: links_by_type.values().sum(),
            links_by_type,
            error_count,
            warning_count,
            info_count,
            passed: error_count == 0,
            issues,
            duration_ms,
            timestamp,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Issues ordered errors first.
    pub fn issues_by_severity(&self) -> impl Iterator<Item = &ValidationIssue> {
        let mut sorted: Vec<_> = self.issues.iter().collect();
        sorted.sort_by_key(|i| std::cmp::Reverse(i.severity));
        sorted.into_iter()
    }

    pub fn issues_of(&self, issue_type: IssueType) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.issue_type == issue_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(path: &str, issue_type: IssueType) -> ValidationIssue {
        ValidationIssue::new(path, issue_type, "msg")
    }

    #[test]
    fn codes_carry_default_severity() {
        assert_eq!(issue("a.md", IssueType::BrokenFile).severity, Severity::Error);
        assert_eq!(issue("a.md", IssueType::UnknownLink).severity, Severity::Warning);
        assert_eq!(issue("a.md", IssueType::ExternalUrl).severity, Severity::Info);
    }

    #[test]
    fn counts_match_issue_list() {
        let issues = vec![
            issue("a.md", IssueType::BrokenFile),
            issue("a.md", IssueType::ExternalUrl),
            issue("b.md", IssueType::UnknownLink),
            issue("b.md", IssueType::ExternalUrl),
        ];
        let result = ValidationResult::new(2, BTreeMap::new(), issues, 5, Utc::now());

        assert_eq!(result.error_count, 1);
        assert_eq!(result.warning_count, 1);
        assert_eq!(result.info_count, 2);
        assert_eq!(
            result.error_count + result.warning_count + result.info_count,
            result.issues.len()
        );
        assert!(!result.passed);
    }

    #[test]
    fn passes_with_only_warnings_and_info() {
        let issues = vec![
            issue("a.md", IssueType::UnknownLink),
            issue("a.md", IssueType::ExternalUrl),
        ];
        let result = ValidationResult::new(1, BTreeMap::new(), issues, 0, Utc::now());
        assert!(result.passed);
        assert!(!result.has_errors());
    }

    #[test]
    fn total_links_sums_types() {
        let mut by_type = BTreeMap::new();
        by_type.insert(LinkType::LocalFile, 3);
        by_type.insert(LinkType::External, 2);
        let result = ValidationResult::new(1, by_type, Vec::new(), 0, Utc::now());
        assert_eq!(result.total_links, 5);
    }

    #[test]
    fn issues_sorted_by_path_then_line() {
        let issues = vec![
            issue("b.md", IssueType::BrokenFile).with_line(Some(1)),
            issue("a.md", IssueType::BrokenFile).with_line(Some(9)),
            issue("a.md", IssueType::BrokenFile).with_line(Some(2)),
        ];
        let result = ValidationResult::new(2, BTreeMap::new(), issues, 0, Utc::now());
        let order: Vec<_> = result
            .issues
            .iter()
            .map(|i| (i.resource_path.as_str(), i.line))
            .collect();
        assert_eq!(order, vec![("a.md", Some(2)), ("a.md", Some(9)), ("b.md", Some(1))]);
    }

    #[test]
    fn errors_first_ordering() {
        let issues = vec![
            issue("a.md", IssueType::ExternalUrl),
            issue("b.md", IssueType::BrokenAnchor),
        ];
        let result = ValidationResult::new(2, BTreeMap::new(), issues, 0, Utc::now());
        let first = result.issues_by_severity().next().unwrap();
        assert_eq!(first.issue_type, IssueType::BrokenAnchor);
    }

    #[test]
    fn display_includes_location_and_code() {
        let issue = ValidationIssue::new("docs/a.md", IssueType::BrokenFile, "file not found: ./x.md")
            .with_line(Some(4))
            .with_suggestion(Some("did you mean docs/x.md?".to_string()));
        assert_eq!(
            issue.to_string(),
            "docs/a.md:4: [broken_file] file not found: ./x.md (did you mean docs/x.md?)"
        );
    }

    #[test]
    fn serializes_wire_shape() {
        let issue = ValidationIssue::new("a.md", IssueType::BrokenAnchor, "m").with_link("#x");
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["severity"], "error");
        assert_eq!(json["type"], "broken_anchor");
        assert_eq!(json["resourcePath"], "a.md");
        assert_eq!(json["link"], "#x");
        assert!(json.get("suggestion").is_none());
    }
}
