//! Link resolution against the registry.
//!
//! Resolution never fails. A link either comes back with `resolved_id` /
//! `anchor_target` populated, or without them; both are valid outcomes and
//! it is the validation engine's job to decide what an unresolved link means.

use crate::domain::{LinkType, ResourceLink, ResourceMetadata, ResourceRegistry};
use crate::infra::resolve_relative;

/// Resolves links of resources held in a registry.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    registry: &'a ResourceRegistry,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a ResourceRegistry) -> Self {
        Self { registry }
    }

    /// Returns `source`'s links with resolution results filled in.
    pub fn resolve(&self, source: &ResourceMetadata) -> Vec<ResourceLink> {
        source
            .links
            .iter()
            .map(|link| self.resolve_link(source, link))
            .collect()
    }

    /// Resolves one link as seen from `source`.
    pub fn resolve_link(&self, source: &ResourceMetadata, link: &ResourceLink) -> ResourceLink {
        let mut resolved = link.clone();
        resolved.resolved_id = None;
        resolved.anchor_target = None;

        match link.link_type {
            LinkType::Anchor => {
                resolved.anchor_target = match_anchor(source, link.fragment());
            }
            LinkType::LocalFile => match resolve_relative(&source.file_path, link.path()) {
                Some(target_path) => {
                    if let Some(target) = self.registry.get_by_path(&target_path) {
                        resolved.resolved_id = Some(target.id.clone());
                        resolved.anchor_target = match_anchor(target, link.fragment());
                    }
                }
                // Escapes the project root: not a corpus path after all.
                None => resolved.link_type = LinkType::Unknown,
            },
            LinkType::External | LinkType::Email | LinkType::Unknown => {}
        }

        resolved
    }

    /// The resource a resolved link points at.
    pub fn target(&self, link: &ResourceLink) -> Option<&'a ResourceMetadata> {
        link.resolved_id
            .as_deref()
            .and_then(|id| self.registry.get_by_id(id))
    }

    /// The project path a local link would point at from `source`, whether
    /// or not a resource lives there.
    pub fn target_path(&self, source: &ResourceMetadata, link: &ResourceLink) -> Option<String> {
        resolve_relative(&source.file_path, link.path())
    }
}

fn match_anchor(resource: &ResourceMetadata, fragment: Option<&str>) -> Option<String> {
    let slug = fragment.filter(|f| !f.is_empty())?;
    resource
        .headings
        .find_slug(slug)
        .map(|heading| heading.slug.clone())
}
