//! The resource registry: every document of one run, keyed by id.
//!
//! Construction goes through [`RegistryBuilder`]; once built, a
//! [`ResourceRegistry`] is never mutated again, so any number of readers may
//! share it (it is `Send + Sync` by construction).

use std::collections::HashMap;

use tracing::warn;

use crate::domain::ResourceMetadata;

/// An insertion the builder refused because the id was already taken.
///
/// The rejected document is kept so that its own links and frontmatter
/// can still be validated.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateResource {
    pub resource: ResourceMetadata,
    /// Path of the document that kept the id.
    pub first_path: String,
}

impl DuplicateResource {
    pub fn id(&self) -> &str {
        &self.resource.id
    }

    /// Path of the rejected document.
    pub fn path(&self) -> &str {
        &self.resource.file_path
    }
}

/// Collects resources; the first insertion of an id wins.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    resources: Vec<ResourceMetadata>,
    by_id: HashMap<String, usize>,
    duplicates: Vec<DuplicateResource>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resource. Returns `false` (and records the duplicate) when a
    /// resource with the same id was inserted earlier.
    pub fn insert(&mut self, resource: ResourceMetadata) -> bool {
        if let Some(&existing) = self.by_id.get(&resource.id) {
            let first_path = self.resources[existing].file_path.clone();
            warn!(
                id = %resource.id,
                path = %resource.file_path,
                first = %first_path,
                "duplicate resource id, keeping first"
            );
            self.duplicates.push(DuplicateResource {
                resource,
                first_path,
            });
            return false;
        }
        self.by_id.insert(resource.id.clone(), self.resources.len());
        self.resources.push(resource);
        true
    }

    /// Freezes the builder into a queryable registry.
    pub fn build(self) -> ResourceRegistry {
        let mut by_path = HashMap::with_capacity(self.resources.len());
        let mut by_file_name: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, resource) in self.resources.iter().enumerate() {
            by_path.entry(resource.file_path.clone()).or_insert(i);
            by_file_name
                .entry(resource.file_name().to_string())
                .or_default()
                .push(i);
        }

        ResourceRegistry {
            resources: self.resources,
            by_id: self.by_id,
            by_path,
            by_file_name,
            duplicates: self.duplicates,
        }
    }
}

impl FromIterator<ResourceMetadata> for ResourceRegistry {
    fn from_iter<I: IntoIterator<Item = ResourceMetadata>>(iter: I) -> Self {
        let mut builder = RegistryBuilder::new();
        for resource in iter {
            builder.insert(resource);
        }
        builder.build()
    }
}

/// Immutable lookup over all resources of a run.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    resources: Vec<ResourceMetadata>,
    by_id: HashMap<String, usize>,
    by_path: HashMap<String, usize>,
    by_file_name: HashMap<String, Vec<usize>>,
    duplicates: Vec<DuplicateResource>,
}

impl ResourceRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn get_by_id(&self, id: &str) -> Option<&ResourceMetadata> {
        self.by_id.get(id).map(|&i| &self.resources[i])
    }

    /// Looks a resource up by its project-relative path.
    pub fn get_by_path(&self, path: &str) -> Option<&ResourceMetadata> {
        self.by_path.get(path).map(|&i| &self.resources[i])
    }

    /// Resources whose file name (last path segment) equals `name`.
    pub fn find_by_file_name<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a ResourceMetadata> {
        self.by_file_name
            .get(name)
            .into_iter()
            .flatten()
            .map(|&i| &self.resources[i])
    }

    /// Resources in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceMetadata> {
        self.resources.iter()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Insertions rejected during construction.
    pub fn duplicates(&self) -> &[DuplicateResource] {
        &self.duplicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::extract;

    fn resource(path: &str, content: &str) -> ResourceMetadata {
        ResourceMetadata::from_extracted(path, extract(content))
    }

    #[test]
    fn lookup_by_id_and_path() {
        let registry: ResourceRegistry =
            [resource("docs/a.md", "# A"), resource("docs/b.md", "# B")]
                .into_iter()
                .collect();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get_by_id("docs/a").unwrap().file_path, "docs/a.md");
        assert_eq!(registry.get_by_path("docs/b.md").unwrap().id, "docs/b");
        assert!(registry.get_by_id("docs/c").is_none());
    }

    #[test]
    fn first_insert_wins_on_duplicate_id() {
        let mut builder = RegistryBuilder::new();
        assert!(builder.insert(resource("one.md", "---\nid: same\n---\nfirst")));
        assert!(!builder.insert(resource("two.md", "---\nid: same\n---\n[second](x.md)")));
        let registry = builder.build();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get_by_id("same").unwrap().file_path, "one.md");
        assert!(registry.get_by_path("two.md").is_none());
        let duplicates = registry.duplicates();
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].id(), "same");
        assert_eq!(duplicates[0].path(), "two.md");
        assert_eq!(duplicates[0].first_path, "one.md");
        assert_eq!(duplicates[0].resource.links[0].text, "second");
    }

    #[test]
    fn finds_by_file_name() {
        let registry: ResourceRegistry = [
            resource("a/guide.md", ""),
            resource("b/guide.md", ""),
            resource("c/other.md", ""),
        ]
        .into_iter()
        .collect();

        let paths: Vec<_> = registry
            .find_by_file_name("guide.md")
            .map(|r| r.file_path.as_str())
            .collect();
        assert_eq!(paths, vec!["a/guide.md", "b/guide.md"]);
        assert_eq!(registry.find_by_file_name("none.md").count(), 0);
    }

    #[test]
    fn iterates_in_insertion_order() {
        let registry: ResourceRegistry = [resource("z.md", ""), resource("a.md", "")]
            .into_iter()
            .collect();
        let ids: Vec<_> = registry.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a"]);
    }

    #[test]
    fn registry_is_shareable_across_threads() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<ResourceRegistry>();
    }
}
