//! Resource metadata: one parsed document of the corpus.

use serde::Serialize;

use crate::domain::{HeadingTree, ResourceLink};
use crate::infra::{has_url_scheme, resolve_relative, ContentHash};

/// Frontmatter key/value map, JSON-compatible.
pub type Frontmatter = serde_json::Map<String, serde_json::Value>;

/// Frontmatter key a document uses to assert its own schema(s).
pub const SCHEMA_KEY: &str = "$schema";

/// Frontmatter key that overrides the path-derived resource id.
pub const ID_KEY: &str = "id";

/// Everything the extractor can learn from a document's text alone.
///
/// Identity (`id`, path) and collection membership are assigned later by
/// the caller, see [`ResourceMetadata::from_extracted`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedMetadata {
    pub links: Vec<ResourceLink>,
    pub headings: HeadingTree,
    pub frontmatter: Option<Frontmatter>,
    pub frontmatter_error: Option<String>,
    pub size_bytes: u64,
    pub estimated_token_count: u64,
    pub checksum: ContentHash,
}

/// One parsed document.
///
/// At most one of `frontmatter` and `frontmatter_error` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetadata {
    pub id: String,
    /// Project-relative path with forward slashes.
    pub file_path: String,
    pub links: Vec<ResourceLink>,
    pub headings: HeadingTree,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frontmatter: Option<Frontmatter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frontmatter_error: Option<String>,
    pub size_bytes: u64,
    pub estimated_token_count: u64,
    pub checksum: ContentHash,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub collections: Vec<String>,
}

impl ResourceMetadata {
    /// Attaches identity to extracted metadata.
    ///
    /// The id is the frontmatter `id` string when present, otherwise the
    /// project path without its `.md` extension.
    pub fn from_extracted(file_path: impl Into<String>, extracted: ExtractedMetadata) -> Self {
        let file_path = file_path.into();
        let id = extracted
            .frontmatter
            .as_ref()
            .and_then(|fm| fm.get(ID_KEY))
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map_or_else(|| id_from_path(&file_path), str::to_string);

        Self {
            id,
            file_path,
            links: extracted.links,
            headings: extracted.headings,
            frontmatter: extracted.frontmatter,
            frontmatter_error: extracted.frontmatter_error,
            size_bytes: extracted.size_bytes,
            estimated_token_count: extracted.estimated_token_count,
            checksum: extracted.checksum,
            collections: Vec::new(),
        }
    }

    /// Sets collection memberships.
    pub fn with_collections(mut self, collections: Vec<String>) -> Self {
        self.collections = collections;
        self
    }

    /// Last path segment, e.g. `guide.md`.
    pub fn file_name(&self) -> &str {
        self.file_path
            .rsplit_once('/')
            .map_or(self.file_path.as_str(), |(_, name)| name)
    }

    /// Extension without the dot, lowercased.
    pub fn extension(&self) -> Option<String> {
        self.file_name()
            .rsplit_once('.')
            .filter(|(stem, _)| !stem.is_empty())
            .map(|(_, ext)| ext.to_ascii_lowercase())
    }

    /// Schemas this document declares for itself via `$schema`.
    ///
    /// Accepts a single string or a list of strings; anything else is ignored.
    /// Relative paths are resolved against the document's own directory, a
    /// leading `/` means the project root, and URLs are kept as written.
    pub fn declared_schemas(&self) -> Vec<String> {
        let Some(value) = self.frontmatter.as_ref().and_then(|fm| fm.get(SCHEMA_KEY)) else {
            return Vec::new();
        };
        let declared: Vec<&str> = match value {
            serde_json::Value::String(s) => vec![s.as_str()],
            serde_json::Value::Array(items) => {
                items.iter().filter_map(serde_json::Value::as_str).collect()
            }
            _ => Vec::new(),
        };
        declared
            .into_iter()
            .map(|schema| self.schema_path(schema.trim()))
            .collect()
    }

    fn schema_path(&self, schema: &str) -> String {
        if has_url_scheme(schema) {
            return schema.to_string();
        }
        if let Some(rooted) = schema.strip_prefix('/') {
            return rooted.to_string();
        }
        resolve_relative(&self.file_path, schema).unwrap_or_else(|| schema.to_string())
    }
}

/// Derives a resource id from its project path.
///
/// ```
/// use mdvet::domain::id_from_path;
///
/// assert_eq!(id_from_path("docs/guide.md"), "docs/guide");
/// assert_eq!(id_from_path("notes.txt"), "notes.txt");
/// ```
pub fn id_from_path(path: &str) -> String {
    path.strip_suffix(".md")
        .or_else(|| path.strip_suffix(".MD"))
        .unwrap_or(path)
        .to_string()
}
