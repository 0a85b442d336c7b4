//! Link occurrences found in a resource and their classification.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::infra::{is_relative_reference, split_fragment};

/// What a link points at.
///
/// Classification order is fixed (first match wins):
/// `mailto:` → email, `http(s)://` → external, `#...` → anchor,
/// a relative path → local file, anything else → unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    LocalFile,
    Anchor,
    External,
    Email,
    Unknown,
}

impl LinkType {
    pub const ALL: [LinkType; 5] = [
        LinkType::LocalFile,
        LinkType::Anchor,
        LinkType::External,
        LinkType::Email,
        LinkType::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkType::LocalFile => "local_file",
            LinkType::Anchor => "anchor",
            LinkType::External => "external",
            LinkType::Email => "email",
            LinkType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Syntactic form of a link occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkNodeType {
    /// `[text](href)` or an autolink.
    Link,
    /// `[label]: href` at the start of a line.
    Definition,
}

/// One link occurrence in a resource.
///
/// `resolved_id` and `anchor_target` are resolution results; a freshly
/// extracted link has neither, and a link that points outside the corpus
/// keeps neither after resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceLink {
    /// Link text, or the label for a definition.
    pub text: String,
    /// The href exactly as written.
    pub href: String,
    #[serde(rename = "type")]
    pub link_type: LinkType,
    pub node_type: LinkNodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_target: Option<String>,
    /// 1-based line of the occurrence in the source document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl ResourceLink {
    /// Creates an unresolved inline link, classifying its href.
    pub fn inline(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self::with_node_type(text, href, LinkNodeType::Link)
    }

    /// Creates an unresolved reference definition, classifying its href.
    pub fn definition(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self::with_node_type(label, href, LinkNodeType::Definition)
    }

    fn with_node_type(text: impl Into<String>, href: impl Into<String>, node_type: LinkNodeType) -> Self {
        let href = href.into();
        Self {
            text: text.into(),
            link_type: classify_href(&href),
            href,
            node_type,
            resolved_id: None,
            anchor_target: None,
            line: None,
        }
    }

    /// Sets the source line.
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// The href with any `#fragment` removed.
    pub fn path(&self) -> &str {
        split_fragment(&self.href).0
    }

    /// The fragment after `#`, if any.
    pub fn fragment(&self) -> Option<&str> {
        split_fragment(&self.href).1
    }

    pub fn is_resolved(&self) -> bool {
        match self.link_type {
            LinkType::LocalFile => self.resolved_id.is_some(),
            LinkType::Anchor => self.anchor_target.is_some(),
            _ => false,
        }
    }
}

/// Classifies an href without knowledge of the referencing document.
///
/// Whether a relative path escapes the project root depends on where the
/// referencing document lives, so the resolver may still downgrade a
/// `LocalFile` link to `Unknown`.
///
/// ```
/// use mdvet::domain::{classify_href, LinkType};
///
/// assert_eq!(classify_href("mailto:a@b.c"), LinkType::Email);
/// assert_eq!(classify_href("https://example.com"), LinkType::External);
/// assert_eq!(classify_href("#setup"), LinkType::Anchor);
/// assert_eq!(classify_href("./guide.md#setup"), LinkType::LocalFile);
/// assert_eq!(classify_href(""), LinkType::Unknown);
/// ```
pub fn classify_href(href: &str) -> LinkType {
    let lower = href.trim().to_ascii_lowercase();
    if lower.starts_with("mailto:") {
        LinkType::Email
    } else if lower.starts_with("http://") || lower.starts_with("https://") {
        LinkType::External
    } else if href.starts_with('#') {
        LinkType::Anchor
    } else if is_relative_reference(split_fragment(href).0) {
        LinkType::LocalFile
    } else {
        LinkType::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_in_priority_order() {
        assert_eq!(classify_href("MAILTO:someone@example.com"), LinkType::Email);
        assert_eq!(classify_href("http://example.com"), LinkType::External);
        assert_eq!(classify_href("HTTPS://example.com/#frag"), LinkType::External);
        assert_eq!(classify_href("#"), LinkType::Anchor);
        assert_eq!(classify_href("#heading"), LinkType::Anchor);
        assert_eq!(classify_href("guide.md"), LinkType::LocalFile);
        assert_eq!(classify_href("../up/guide.md#x"), LinkType::LocalFile);
    }

    #[test]
    fn unclassifiable_hrefs_are_unknown() {
        assert_eq!(classify_href(""), LinkType::Unknown);
        assert_eq!(classify_href("/absolute/path.md"), LinkType::Unknown);
        assert_eq!(classify_href("ftp://host/file"), LinkType::Unknown);
        assert_eq!(classify_href("tel:+123"), LinkType::Unknown);
    }

    #[test]
    fn link_splits_path_and_fragment() {
        let link = ResourceLink::inline("Guide", "./guide.md#install");
        assert_eq!(link.path(), "./guide.md");
        assert_eq!(link.fragment(), Some("install"));
        assert_eq!(link.link_type, LinkType::LocalFile);
        assert_eq!(link.node_type, LinkNodeType::Link);
    }

    #[test]
    fn new_links_are_unresolved() {
        let link = ResourceLink::definition("ref", "./a.md");
        assert!(!link.is_resolved());
        assert_eq!(link.node_type, LinkNodeType::Definition);
    }

    #[test]
    fn serializes_type_codes() {
        let link = ResourceLink::inline("x", "#top").at_line(3);
        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["type"], "anchor");
        assert_eq!(json["nodeType"], "link");
        assert_eq!(json["line"], 3);
        assert!(json.get("resolvedId").is_none());
    }
}
