//! Collections: named, glob-defined subsets of the corpus with their own
//! validation settings.

use std::collections::BTreeMap;

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How strictly frontmatter is checked against a schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Undeclared fields are violations.
    Strict,
    /// Undeclared fields are allowed.
    #[default]
    Permissive,
}

/// Per-collection validation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CollectionValidation {
    #[serde(alias = "frontmatterSchema")]
    pub frontmatter_schema: Option<String>,
    pub mode: Option<ValidationMode>,
    #[serde(alias = "checkUrlLinks")]
    pub check_url_links: Option<bool>,
    #[serde(alias = "checkGitIgnored")]
    pub check_git_ignored: Option<bool>,
}

/// One collection as written in the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CollectionConfig {
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub validation: Option<CollectionValidation>,
}

impl CollectionConfig {
    /// Collection schema, if it declares one.
    pub fn schema(&self) -> Option<&str> {
        self.validation
            .as_ref()
            .and_then(|v| v.frontmatter_schema.as_deref())
    }

    pub fn mode(&self) -> Option<ValidationMode> {
        self.validation.as_ref().and_then(|v| v.mode)
    }

    pub fn checks_urls(&self) -> bool {
        self.validation
            .as_ref()
            .and_then(|v| v.check_url_links)
            .unwrap_or(false)
    }

    /// Whether links into git-ignored files count as broken.
    pub fn checks_git_ignored(&self) -> bool {
        self.validation
            .as_ref()
            .and_then(|v| v.check_git_ignored)
            .unwrap_or(false)
    }
}

/// Errors while compiling collection patterns.
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("collection '{collection}': invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        collection: String,
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

struct CompiledCollection {
    name: String,
    include: GlobSet,
    exclude: GlobSet,
}

/// All configured collections with compiled patterns.
///
/// Collections are kept in name order so membership lists are stable.
#[derive(Default)]
pub struct CollectionSet {
    configs: BTreeMap<String, CollectionConfig>,
    collections: Vec<CompiledCollection>,
}

impl std::fmt::Debug for CollectionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.collections.iter().map(|c| &c.name))
            .finish()
    }
}

impl CollectionSet {
    pub fn new(configs: &BTreeMap<String, CollectionConfig>) -> Result<Self, CollectionError> {
        let collections = configs
            .iter()
            .map(|(name, config)| {
                Ok(CompiledCollection {
                    name: name.clone(),
                    include: build_glob_set(name, &config.include)?,
                    exclude: build_glob_set(name, &config.exclude)?,
                })
            })
            .collect::<Result<_, CollectionError>>()?;
        Ok(Self {
            configs: configs.clone(),
            collections,
        })
    }

    /// Names of the collections a project path belongs to.
    pub fn memberships(&self, path: &str) -> Vec<String> {
        self.collections
            .iter()
            .filter(|c| c.include.is_match(path) && !c.exclude.is_match(path))
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&CollectionConfig> {
        self.configs.get(name)
    }

    /// Raw configuration keyed by collection name.
    pub fn configs(&self) -> &BTreeMap<String, CollectionConfig> {
        &self.configs
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Every schema path any collection declares.
    pub fn schema_paths(&self) -> impl Iterator<Item = &str> {
        self.configs.values().filter_map(CollectionConfig::schema)
    }
}

fn build_glob_set(collection: &str, patterns: &[String]) -> Result<GlobSet, CollectionError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| CollectionError::InvalidPattern {
            collection: collection.to_string(),
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|source| CollectionError::InvalidPattern {
            collection: collection.to_string(),
            pattern: patterns.join(", "),
            source,
        })
}
