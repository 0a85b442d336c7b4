//! The validation engine.
//!
//! Walks every resource of a registry, resolves its links, applies its
//! assigned frontmatter schemas and collects [`ValidationIssue`]s into one
//! [`ValidationResult`]. Nothing in here fails: problems in one document are
//! reported as issues and the run moves on to the next.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info};

use crate::domain::{
    assign_schemas, CollectionSet, IssueType, LinkType, ResourceLink, ResourceMetadata,
    ResourceRegistry, Resolver, SchemaReference, SchemaSource, ValidationIssue, ValidationMode,
    ValidationResult,
};
use crate::infra::{relative_path, SchemaStore};

/// Most slugs listed in a `broken_anchor` suggestion.
const MAX_SUGGESTED_SLUGS: usize = 5;

/// Outcome of a live check of one external URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlStatus {
    Ok,
    Dead,
    Timeout,
    Error(String),
}

/// Checks whether external URLs are reachable.
///
/// No network implementation ships with this crate; callers that want live
/// checks plug one in through [`ValidationOptions::url_checker`].
pub trait UrlChecker: Send + Sync {
    fn check(&self, url: &str) -> UrlStatus;
}

/// Answers whether a project path is excluded from version control.
///
/// Consulted only for collections with `check_git_ignored` set.
pub trait IgnoreRules: Send + Sync {
    fn is_ignored(&self, path: &str) -> bool;
}

/// Run-wide settings supplied by the caller.
#[derive(Clone, Copy, Default)]
pub struct ValidationOptions<'a> {
    /// Schema applied to every resource (`--schema`).
    pub cli_schema: Option<&'a str>,
    /// Overrides every collection's mode when set.
    pub mode: Option<ValidationMode>,
    /// Checks external URLs for all resources, not only for collections
    /// that opt in.
    pub check_external_urls: bool,
    pub url_checker: Option<&'a dyn UrlChecker>,
    pub ignore_rules: Option<&'a dyn IgnoreRules>,
}

impl std::fmt::Debug for ValidationOptions<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationOptions")
            .field("cli_schema", &self.cli_schema)
            .field("mode", &self.mode)
            .field("check_external_urls", &self.check_external_urls)
            .field("url_checker", &self.url_checker.is_some())
            .field("ignore_rules", &self.ignore_rules.is_some())
            .finish()
    }
}

/// Issues and schema bookkeeping for a single resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceValidation {
    pub issues: Vec<ValidationIssue>,
    /// Assigned schemas, with `applied` set for those that were checked.
    pub schemas: Vec<SchemaReference>,
    /// The resource's links after resolution.
    pub links: Vec<ResourceLink>,
}

/// Validates the resources of one registry.
pub struct Validator<'a> {
    registry: &'a ResourceRegistry,
    collections: &'a CollectionSet,
    schemas: &'a SchemaStore,
    options: ValidationOptions<'a>,
}

impl<'a> Validator<'a> {
    pub fn new(
        registry: &'a ResourceRegistry,
        collections: &'a CollectionSet,
        schemas: &'a SchemaStore,
    ) -> Self {
        Self {
            registry,
            collections,
            schemas,
            options: ValidationOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ValidationOptions<'a>) -> Self {
        self.options = options;
        self
    }

    /// Schemas assigned to `resource` from all three sources.
    pub fn assigned_schemas(&self, resource: &ResourceMetadata) -> Vec<SchemaReference> {
        schemas_for(resource, self.collections, self.options.cli_schema)
    }

    /// Validates every resource and aggregates the result.
    ///
    /// Documents rejected for a duplicate id are validated too, after the
    /// issue for the duplicate itself. Duration is wall-clock time for the
    /// whole run.
    pub fn run(&self) -> ValidationResult {
        let started = Instant::now();
        let timestamp = Utc::now();

        let mut issues = Vec::new();
        let mut links_by_type: BTreeMap<LinkType, usize> = BTreeMap::new();

        for duplicate in self.registry.duplicates() {
            issues.push(ValidationIssue::new(
                duplicate.path(),
                IssueType::DuplicateId,
                format!(
                    "duplicate id '{}' (first defined in {})",
                    duplicate.id(),
                    duplicate.first_path
                ),
            ));
        }

        let mut checked = 0;
        for resource in validated_resources(self.registry) {
            let report = self.validate_resource(resource);
            for link in &report.links {
                *links_by_type.entry(link.link_type).or_default() += 1;
            }
            issues.extend(report.issues);
            checked += 1;
        }

        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let result = ValidationResult::new(
            checked,
            links_by_type,
            issues,
            duration_ms,
            timestamp,
        );
        info!(
            resources = result.total_resources,
            links = result.total_links,
            errors = result.error_count,
            warnings = result.warning_count,
            duration_ms = result.duration_ms,
            "validation finished"
        );
        result
    }

    /// Validates one resource's links and frontmatter.
    pub fn validate_resource(&self, resource: &ResourceMetadata) -> ResourceValidation {
        let resolver = Resolver::new(self.registry);
        let links = resolver.resolve(resource);
        let check_urls = self.checks_urls(resource);
        let ignore_rules = self.ignore_rules_for(resource);

        let mut issues: Vec<ValidationIssue> = links
            .iter()
            .filter_map(|link| self.check_link(&resolver, resource, link, check_urls, ignore_rules))
            .collect();

        let (schema_issues, schemas) = self.check_frontmatter(resource);
        issues.extend(schema_issues);

        ResourceValidation {
            issues,
            schemas,
            links,
        }
    }

    fn checks_urls(&self, resource: &ResourceMetadata) -> bool {
        self.options.check_external_urls
            || resource
                .collections
                .iter()
                .filter_map(|name| self.collections.get(name))
                .any(|config| config.checks_urls())
    }

    fn ignore_rules_for(&self, resource: &ResourceMetadata) -> Option<&'a dyn IgnoreRules> {
        let wanted = resource
            .collections
            .iter()
            .filter_map(|name| self.collections.get(name))
            .any(|config| config.checks_git_ignored());
        self.options.ignore_rules.filter(|_| wanted)
    }

    /// Maps one resolved link to at most one issue.
    fn check_link(
        &self,
        resolver: &Resolver<'_>,
        resource: &ResourceMetadata,
        link: &ResourceLink,
        check_urls: bool,
        ignore_rules: Option<&dyn IgnoreRules>,
    ) -> Option<ValidationIssue> {
        let issue = |issue_type: IssueType, message: String| {
            ValidationIssue::new(&resource.file_path, issue_type, message)
                .with_line(link.line)
                .with_link(&link.href)
        };

        match link.link_type {
            LinkType::LocalFile => match resolver.target(link) {
                None => Some(
                    issue(
                        IssueType::BrokenFile,
                        format!("file not found: {} (link '{}')", link.href, link.text),
                    )
                    .with_suggestion(self.suggest_file(resource, link)),
                ),
                Some(target) => {
                    if ignore_rules.is_some_and(|rules| rules.is_ignored(&target.file_path)) {
                        return Some(issue(
                            IssueType::BrokenFile,
                            format!("link target is ignored by git: {}", link.href),
                        ));
                    }
                    let fragment = link.fragment().filter(|f| !f.is_empty())?;
                    if link.anchor_target.is_some() {
                        return None;
                    }
                    Some(
                        issue(
                            IssueType::BrokenAnchor,
                            format!("heading '#{}' not found in {}", fragment, target.file_path),
                        )
                        .with_suggestion(suggest_slugs(target)),
                    )
                }
            },
            LinkType::Anchor if link.anchor_target.is_none() => Some(
                issue(
                    IssueType::BrokenAnchor,
                    format!("heading '{}' not found", link.href),
                )
                .with_suggestion(suggest_slugs(resource)),
            ),
            LinkType::Anchor | LinkType::Email => None,
            LinkType::External => self.check_external(link, check_urls).map(|(t, m)| issue(t, m)),
            LinkType::Unknown => Some(issue(
                IssueType::UnknownLink,
                format!("cannot classify link target '{}'", link.href),
            )),
        }
    }

    fn check_external(&self, link: &ResourceLink, check_urls: bool) -> Option<(IssueType, String)> {
        let checker = self.options.url_checker.filter(|_| check_urls);
        let Some(checker) = checker else {
            return Some((
                IssueType::ExternalUrl,
                format!("external URL not checked: {}", link.href),
            ));
        };

        match checker.check(&link.href) {
            UrlStatus::Ok => None,
            UrlStatus::Dead => Some((
                IssueType::ExternalUrlDead,
                format!("external URL is dead: {}", link.href),
            )),
            UrlStatus::Timeout => Some((
                IssueType::ExternalUrlTimeout,
                format!("external URL timed out: {}", link.href),
            )),
            UrlStatus::Error(reason) => Some((
                IssueType::ExternalUrlError,
                format!("external URL check failed: {}: {}", link.href, reason),
            )),
        }
    }

    /// Points at another resource with the same file name.
    fn suggest_file(&self, resource: &ResourceMetadata, link: &ResourceLink) -> Option<String> {
        let wanted = link.path().rsplit('/').next().filter(|name| !name.is_empty())?;
        let candidate = self
            .registry
            .find_by_file_name(wanted)
            .find(|candidate| candidate.file_path != resource.file_path)?;
        Some(format!(
            "did you mean {}?",
            relative_path(&resource.file_path, &candidate.file_path)
        ))
    }

    fn check_frontmatter(
        &self,
        resource: &ResourceMetadata,
    ) -> (Vec<ValidationIssue>, Vec<SchemaReference>) {
        let mut issues = Vec::new();
        let mut schemas = self.assigned_schemas(resource);

        if let Some(error) = &resource.frontmatter_error {
            issues.push(
                ValidationIssue::new(
                    &resource.file_path,
                    IssueType::FrontmatterInvalidYaml,
                    format!("invalid frontmatter: {}", error),
                )
                .with_line(Some(1)),
            );
            return (issues, schemas);
        }

        for reference in &mut schemas {
            let Some(frontmatter) = &resource.frontmatter else {
                issues.push(ValidationIssue::new(
                    &resource.file_path,
                    IssueType::FrontmatterMissing,
                    format!("no frontmatter, but schema {} applies", reference.schema),
                ));
                reference.applied = true;
                continue;
            };

            let Some(validator) = self.schemas.get(&reference.schema) else {
                match self.schemas.load_error(&reference.schema) {
                    Some(error) => issues.push(ValidationIssue::new(
                        &resource.file_path,
                        IssueType::FrontmatterSchemaError,
                        format!("cannot load schema {}: {}", reference.schema, error),
                    )),
                    None => debug!(
                        schema = %reference.schema,
                        path = %resource.file_path,
                        "schema not loaded, skipping"
                    ),
                }
                continue;
            };

            let mode = self.mode_for(resource, &reference.source);
            for message in validator.validate(frontmatter, mode) {
                issues.push(ValidationIssue::new(
                    &resource.file_path,
                    IssueType::FrontmatterSchemaError,
                    format!("{} ({})", message, reference.schema),
                ));
            }
            reference.applied = true;
        }

        (issues, schemas)
    }

    /// Mode for one schema: CLI override, then the declaring collection,
    /// then the first member collection that sets one, then permissive.
    fn mode_for(&self, resource: &ResourceMetadata, source: &SchemaSource) -> ValidationMode {
        if let Some(mode) = self.options.mode {
            return mode;
        }
        if let SchemaSource::Collection(name) = source
            && let Some(mode) = self.collections.get(name).and_then(|c| c.mode())
        {
            return mode;
        }
        resource
            .collections
            .iter()
            .filter_map(|name| self.collections.get(name).and_then(|c| c.mode()))
            .next()
            .unwrap_or_default()
    }
}

/// Collection and `--schema` schemas a run over `registry` will need, in
/// first-seen order.
///
/// Load these into the [`SchemaStore`] before validating; one that cannot be
/// loaded is a configuration error and fails the run up front.
pub fn required_schemas(
    registry: &ResourceRegistry,
    collections: &CollectionSet,
    cli_schema: Option<&str>,
) -> Vec<String> {
    let mut paths: Vec<String> = Vec::new();
    for resource in validated_resources(registry) {
        let imposed = resource
            .collections
            .iter()
            .filter_map(|name| collections.get(name).and_then(|c| c.schema()))
            .chain(cli_schema);
        for schema in imposed {
            if !paths.iter().any(|p| p == schema) {
                paths.push(schema.to_string());
            }
        }
    }
    paths
}

/// Schemas documents declare for themselves through `$schema`, in first-seen
/// order.
///
/// Load these with [`SchemaStore::try_load`]: a document pointing at a
/// schema that cannot be loaded gets an issue of its own while the rest of
/// the run carries on.
pub fn self_asserted_schemas(registry: &ResourceRegistry) -> Vec<String> {
    let mut paths: Vec<String> = Vec::new();
    for resource in validated_resources(registry) {
        for schema in resource.declared_schemas() {
            if !paths.contains(&schema) {
                paths.push(schema);
            }
        }
    }
    paths
}

/// Registered resources followed by those rejected for a duplicate id.
fn validated_resources(registry: &ResourceRegistry) -> impl Iterator<Item = &ResourceMetadata> {
    registry
        .iter()
        .chain(registry.duplicates().iter().map(|d| &d.resource))
}

fn schemas_for(
    resource: &ResourceMetadata,
    collections: &CollectionSet,
    cli_schema: Option<&str>,
) -> Vec<SchemaReference> {
    assign_schemas(
        &resource.declared_schemas(),
        &resource.collections,
        collections.configs(),
        cli_schema,
    )
}

fn suggest_slugs(resource: &ResourceMetadata) -> Option<String> {
    let slugs: Vec<&str> = resource.headings.slugs().take(MAX_SUGGESTED_SLUGS).collect();
    if slugs.is_empty() {
        return None;
    }
    let listed: Vec<String> = slugs.iter().map(|s| format!("#{}", s)).collect();
    Some(format!("available: {}", listed.join(", ")))
}
