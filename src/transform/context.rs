//! Values exposed to transform templates as `link`.

use serde::Serialize;

use crate::domain::{Frontmatter, LinkType, ResourceLink, ResourceMetadata};
use crate::infra::relative_path;

/// The `link` variable of a template.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkContext<'a> {
    pub text: &'a str,
    /// Href without its fragment.
    pub href: &'a str,
    pub fragment: Option<&'a str>,
    #[serde(rename = "type")]
    pub link_type: LinkType,
    /// The target resource, when the link resolved.
    pub resource: Option<ResourceContext<'a>>,
}

/// `link.resource` in a template.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContext<'a> {
    pub id: &'a str,
    pub file_path: &'a str,
    pub file_name: &'a str,
    pub extension: Option<String>,
    pub mime_type: &'static str,
    pub frontmatter: Option<&'a Frontmatter>,
    pub size_bytes: u64,
    pub estimated_token_count: u64,
    /// Path from the linking document to the target, or the project path
    /// when the linking document is unknown.
    pub relative_path: String,
}

impl<'a> LinkContext<'a> {
    pub fn new(
        link: &'a ResourceLink,
        target: Option<&'a ResourceMetadata>,
        source_path: Option<&str>,
    ) -> Self {
        Self {
            text: &link.text,
            href: link.path(),
            fragment: link.fragment(),
            link_type: link.link_type,
            resource: target.map(|t| ResourceContext::new(t, source_path)),
        }
    }
}

impl<'a> ResourceContext<'a> {
    pub fn new(resource: &'a ResourceMetadata, source_path: Option<&str>) -> Self {
        let extension = resource.extension();
        Self {
            id: &resource.id,
            file_path: &resource.file_path,
            file_name: resource.file_name(),
            mime_type: media_type(extension.as_deref()),
            extension,
            frontmatter: resource.frontmatter.as_ref(),
            size_bytes: resource.size_bytes,
            estimated_token_count: resource.estimated_token_count,
            relative_path: source_path.map_or_else(
                || resource.file_path.clone(),
                |source| relative_path(source, &resource.file_path),
            ),
        }
    }
}

/// Media type inferred from a file extension.
///
/// ```
/// use mdvet::transform::media_type;
///
/// assert_eq!(media_type(Some("md")), "text/markdown");
/// assert_eq!(media_type(None), "application/octet-stream");
/// ```
pub fn media_type(extension: Option<&str>) -> &'static str {
    let Some(ext) = extension else {
        return "application/octet-stream";
    };
    match ext.to_ascii_lowercase().as_str() {
        "md" | "markdown" => "text/markdown",
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "yaml" | "yml" => "application/yaml",
        "toml" => "application/toml",
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::extract;
    use pretty_assertions::assert_eq;

    #[test]
    fn resolved_link_exposes_target() {
        let target = ResourceMetadata::from_extracted(
            "guides/setup.md",
            extract("---\ntitle: Setup\n---\n# Setup\n"),
        );
        let mut link = ResourceLink::inline("Setup", "../guides/setup.md#install");
        link.resolved_id = Some(target.id.clone());

        let context = LinkContext::new(&link, Some(&target), Some("docs/index.md"));
        let json = serde_json::to_value(&context).unwrap();

        assert_eq!(json["href"], "../guides/setup.md");
        assert_eq!(json["fragment"], "install");
        assert_eq!(json["type"], "local_file");
        assert_eq!(json["resource"]["id"], "guides/setup");
        assert_eq!(json["resource"]["fileName"], "setup.md");
        assert_eq!(json["resource"]["mimeType"], "text/markdown");
        assert_eq!(json["resource"]["relativePath"], "../guides/setup.md");
        assert_eq!(json["resource"]["frontmatter"]["title"], "Setup");
    }

    #[test]
    fn unresolved_link_has_no_resource() {
        let link = ResourceLink::inline("x", "https://example.com");
        let json = serde_json::to_value(LinkContext::new(&link, None, None)).unwrap();
        assert!(json["resource"].is_null());
        assert!(json["fragment"].is_null());
    }

    #[test]
    fn relative_path_falls_back_to_project_path() {
        let target = ResourceMetadata::from_extracted("a/b.md", extract(""));
        assert_eq!(ResourceContext::new(&target, None).relative_path, "a/b.md");
    }

    #[test]
    fn media_types() {
        assert_eq!(media_type(Some("YML")), "application/yaml");
        assert_eq!(media_type(Some("png")), "image/png");
        assert_eq!(media_type(Some("exe")), "application/octet-stream");
    }
}
