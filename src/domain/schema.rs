//! Frontmatter schema references and their assignment to resources.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::domain::{CollectionConfig, Frontmatter, ValidationMode};

/// Who asked for a schema to be applied to a resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SchemaSource {
    /// The resource's own frontmatter (`$schema`).
    SelfAsserted,
    /// A collection the resource belongs to.
    Collection(String),
    /// The `--schema` command-line flag.
    Cli,
}

impl fmt::Display for SchemaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaSource::SelfAsserted => f.write_str("self"),
            SchemaSource::Collection(name) => write!(f, "collection:{}", name),
            SchemaSource::Cli => f.write_str("cli"),
        }
    }
}

impl Serialize for SchemaSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A schema assigned to a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaReference {
    /// Path (relative to the project root) or package identifier.
    pub schema: String,
    /// First source that declared this schema.
    pub source: SchemaSource,
    /// Whether validation against it has run.
    pub applied: bool,
}

impl SchemaReference {
    pub fn new(schema: impl Into<String>, source: SchemaSource) -> Self {
        Self {
            schema: schema.into(),
            source,
            applied: false,
        }
    }
}

/// Merges schema declarations from all sources into one ordered list.
///
/// Order: self-asserted, then each collection in membership order, then
/// the CLI schema. A schema path already present is never added again, so
/// attribution always goes to the earliest declarer.
pub fn assign_schemas(
    self_asserted: &[String],
    memberships: &[String],
    collections: &BTreeMap<String, CollectionConfig>,
    cli_schema: Option<&str>,
) -> Vec<SchemaReference> {
    let mut assigned: Vec<SchemaReference> = Vec::new();
    let mut push = |schema: &str, source: SchemaSource| {
        if !assigned.iter().any(|r| r.schema == schema) {
            assigned.push(SchemaReference::new(schema, source));
        }
    };

    for schema in self_asserted {
        push(schema, SchemaSource::SelfAsserted);
    }
    for name in memberships {
        if let Some(schema) = collections.get(name).and_then(CollectionConfig::schema) {
            push(schema, SchemaSource::Collection(name.clone()));
        }
    }
    if let Some(schema) = cli_schema {
        push(schema, SchemaSource::Cli);
    }

    assigned
}

/// Introspection over one declared field of a schema.
///
/// Keeps the validation engine independent of how a schema library
/// represents its types internally.
pub trait FieldShape {
    /// Name of the declared type, e.g. `string` or `array`.
    fn type_name(&self) -> String;

    /// The inner shape if this field is optional/nullable, else itself.
    fn unwrap_nullable(&self) -> &Self;
}

/// A loaded schema that can check a frontmatter map.
pub trait FrontmatterValidator: Send + Sync {
    /// Returns one human-readable message per violation; empty means valid.
    fn validate(&self, frontmatter: &Frontmatter, mode: ValidationMode) -> Vec<String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CollectionValidation;
    use pretty_assertions::assert_eq;

    fn collection(schema: Option<&str>) -> CollectionConfig {
        CollectionConfig {
            include: vec!["**".to_string()],
            exclude: Vec::new(),
            validation: Some(CollectionValidation {
                frontmatter_schema: schema.map(str::to_string),
                ..Default::default()
            }),
        }
    }

    fn collections() -> BTreeMap<String, CollectionConfig> {
        let mut map = BTreeMap::new();
        map.insert("guides".to_string(), collection(Some("schemas/guide.json")));
        map.insert("skills".to_string(), collection(Some("schemas/skill.json")));
        map.insert("plain".to_string(), collection(None));
        map
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn merges_all_sources_in_order() {
        let assigned = assign_schemas(
            &strings(&["own.json"]),
            &strings(&["guides", "plain", "skills"]),
            &collections(),
            Some("cli.json"),
        );
        assert_eq!(
            assigned,
            vec![
                SchemaReference::new("own.json", SchemaSource::SelfAsserted),
                SchemaReference::new(
                    "schemas/guide.json",
                    SchemaSource::Collection("guides".to_string())
                ),
                SchemaReference::new(
                    "schemas/skill.json",
                    SchemaSource::Collection("skills".to_string())
                ),
                SchemaReference::new("cli.json", SchemaSource::Cli),
            ]
        );
    }

    #[test]
    fn earliest_declarer_wins_attribution() {
        let assigned = assign_schemas(
            &strings(&["schemas/guide.json"]),
            &strings(&["guides"]),
            &collections(),
            Some("schemas/guide.json"),
        );
        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0].source, SchemaSource::SelfAsserted);
    }

    #[test]
    fn collection_beats_cli_for_same_path() {
        let assigned = assign_schemas(
            &[],
            &strings(&["skills"]),
            &collections(),
            Some("schemas/skill.json"),
        );
        assert_eq!(assigned.len(), 1);
        assert_eq!(
            assigned[0].source,
            SchemaSource::Collection("skills".to_string())
        );
    }

    #[test]
    fn duplicates_within_self_asserted_collapse() {
        let assigned = assign_schemas(&strings(&["a.json", "a.json"]), &[], &collections(), None);
        assert_eq!(assigned.len(), 1);
    }

    #[test]
    fn unknown_collections_and_no_sources_give_empty() {
        let assigned = assign_schemas(&[], &strings(&["nope"]), &collections(), None);
        assert!(assigned.is_empty());
    }

    #[test]
    fn new_references_are_not_applied() {
        assert!(!SchemaReference::new("x", SchemaSource::Cli).applied);
    }

    #[test]
    fn source_serializes_as_string() {
        let json = serde_json::to_value(SchemaReference::new(
            "x.json",
            SchemaSource::Collection("guides".to_string()),
        ))
        .unwrap();
        assert_eq!(json["source"], "collection:guides");
        assert_eq!(json["applied"], false);
    }
}
