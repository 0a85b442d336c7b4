//! Template-driven link rewriting.
//!
//! Given a document's text and its resolved links, rewrites matching
//! `[text](href)` links through ordered [`TransformRule`]s rendered with
//! minijinja, and rewrites or drops `[label]: href` definitions. The output
//! is what downstream consumers persist, so its fingerprint (not the
//! source's) is the one to use for change detection.

mod context;
mod engine;
mod rules;

pub use context::{media_type, LinkContext, ResourceContext};
pub use engine::{transform, TransformOptions};
pub use rules::{LinkMatch, RuleError, RuleSet, TransformRule};
