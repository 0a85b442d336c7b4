//! Core types and algorithms: resources, links, headings, the registry,
//! link resolution, schema assignment and validation.

mod collection;
mod heading;
mod link;
mod registry;
mod resolve;
mod resource;
mod schema;
mod validate;
mod validation;

pub use collection::{
    CollectionConfig, CollectionError, CollectionSet, CollectionValidation, ValidationMode,
};
pub use heading::{HeadingIndex, HeadingNode, HeadingTree};
pub use link::{classify_href, LinkNodeType, LinkType, ResourceLink};
pub use registry::{DuplicateResource, RegistryBuilder, ResourceRegistry};
pub use resolve::Resolver;
pub use resource::{id_from_path, ExtractedMetadata, Frontmatter, ResourceMetadata, ID_KEY, SCHEMA_KEY};
pub use schema::{assign_schemas, FieldShape, FrontmatterValidator, SchemaReference, SchemaSource};
pub use validate::{
    required_schemas, self_asserted_schemas, IgnoreRules, ResourceValidation, UrlChecker,
    UrlStatus, ValidationOptions, Validator,
};
pub use validation::{IssueType, Severity, ValidationIssue, ValidationResult};
