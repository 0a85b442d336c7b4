//! Builder for markdown documents with optional frontmatter.

#![allow(dead_code)]

/// Builder for a markdown document.
///
/// Frontmatter fields are written in insertion order; a document with no
/// fields has no frontmatter block at all.
#[derive(Debug, Default)]
pub struct TestDoc {
    fields: Vec<(String, String)>,
    body: String,
}

impl TestDoc {
    /// Creates a document whose body starts with `# {title}`.
    pub fn new(title: &str) -> Self {
        Self {
            fields: Vec::new(),
            body: format!("# {}\n", title),
        }
    }

    /// Adds a raw YAML field; `value` is written verbatim.
    pub fn field(mut self, key: &str, value: &str) -> Self {
        self.fields.push((key.to_string(), value.to_string()));
        self
    }

    /// Appends a line to the body.
    pub fn line(mut self, line: &str) -> Self {
        self.body.push('\n');
        self.body.push_str(line);
        self.body.push('\n');
        self
    }

    pub fn render(&self) -> String {
        if self.fields.is_empty() {
            return self.body.clone();
        }
        let mut out = String::from("---\n");
        for (key, value) in &self.fields {
            out.push_str(&format!("{}: {}\n", key, value));
        }
        out.push_str("---\n");
        out.push_str(&self.body);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_without_fields_has_no_frontmatter() {
        let doc = TestDoc::new("Plain").line("text");
        assert_eq!(doc.render(), "# Plain\n\ntext\n");
    }

    #[test]
    fn test_doc_with_fields() {
        let doc = TestDoc::new("Guide").field("title", "Guide");
        assert_eq!(doc.render(), "---\ntitle: Guide\n---\n# Guide\n");
    }
}
