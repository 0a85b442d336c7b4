//! Frontmatter parser for the leading YAML block of a markdown document.

use thiserror::Error;

use crate::domain::Frontmatter;

/// Errors during frontmatter parsing.
///
/// These never escape extraction: the extractor stores the message in
/// `ResourceMetadata::frontmatter_error` and keeps going.
#[derive(Debug, Error)]
pub enum FrontmatterError {
    #[error("missing closing frontmatter delimiter '---'")]
    MissingClosingDelimiter,

    #[error("invalid YAML in frontmatter: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("frontmatter must be a mapping of keys to values, found {0}")]
    NotAMapping(&'static str),
}

/// The result of splitting frontmatter off a document.
#[derive(Debug)]
pub struct SplitFrontmatter<'a> {
    /// Raw YAML between the delimiters, `None` when the document has no block.
    pub yaml: Option<&'a str>,
    /// Byte offset where the markdown body begins.
    pub body_offset: usize,
}

/// Locates a leading `---` delimited block.
///
/// A document that does not start with a `---` line simply has no
/// frontmatter. A block that is opened but never closed is an error.
pub fn split(content: &str) -> Result<SplitFrontmatter<'_>, FrontmatterError> {
    let after_opening = if content.starts_with("---\r\n") {
        5
    } else if content.starts_with("---\n") {
        4
    } else if content == "---" {
        return Err(FrontmatterError::MissingClosingDelimiter);
    } else {
        return Ok(SplitFrontmatter {
            yaml: None,
            body_offset: 0,
        });
    };

    let rest = &content[after_opening..];
    let closing = find_closing_delimiter(rest)?;
    let after_closing = &rest[closing..];
    let delimiter_len = if after_closing.starts_with("---\r\n") {
        5
    } else if after_closing.starts_with("---\n") {
        4
    } else {
        3
    };

    Ok(SplitFrontmatter {
        yaml: Some(&rest[..closing]),
        body_offset: after_opening + closing + delimiter_len,
    })
}

/// Parses a YAML block into a frontmatter map.
///
/// An empty block yields an empty map.
pub fn parse_yaml(yaml: &str) -> Result<Frontmatter, FrontmatterError> {
    if yaml.trim().is_empty() {
        return Ok(Frontmatter::new());
    }

    let value: serde_json::Value = serde_yaml::from_str(yaml)?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        serde_json::Value::Null => Ok(Frontmatter::new()),
        serde_json::Value::Array(_) => Err(FrontmatterError::NotAMapping("a list")),
        serde_json::Value::String(_) => Err(FrontmatterError::NotAMapping("a string")),
        serde_json::Value::Number(_) => Err(FrontmatterError::NotAMapping("a number")),
        serde_json::Value::Bool(_) => Err(FrontmatterError::NotAMapping("a boolean")),
    }
}

/// Finds the position of the closing `---` delimiter.
///
/// The delimiter must start a line and be followed by a newline or EOF.
fn find_closing_delimiter(content: &str) -> Result<usize, FrontmatterError> {
    let mut pos = 0;
    while pos < content.len() {
        let line_end = content[pos..]
            .find('\n')
            .map_or(content.len(), |offset| pos + offset);
        let line = content[pos..line_end].trim_end_matches('\r');
        if line == "---" {
            return Ok(pos);
        }
        pos = line_end + 1;
    }
    Err(FrontmatterError::MissingClosingDelimiter)
}
