//! File I/O, frontmatter and markdown parsing, hashing, paths, schemas

mod content_hash;
mod frontmatter;
mod fs;
mod git_ignore;
mod json_schema;
mod markdown;
mod paths;
mod schema_store;
mod slug;

pub use content_hash::{fingerprint, ContentHash, ContentHashError};
pub use frontmatter::{parse_yaml, split as split_frontmatter, FrontmatterError, SplitFrontmatter};
pub use fs::{decode_source, read_resource, read_source, scan_markdown_files, FsError, SourceText};
pub use git_ignore::GitIgnore;
pub use json_schema::{FieldSchema, JsonSchema, TypeDecl};
pub use markdown::{estimate_tokens, extract, extract_with_checksum};
pub use paths::{
    has_url_scheme, is_relative_reference, relative_path, resolve_relative, split_fragment,
    to_project_path,
};
pub use schema_store::{SchemaError, SchemaStore};
pub use slug::{slugify, SlugCounter};

pub(crate) use markdown::{fenced_ranges, link_spans, DEFINITION_RE};
