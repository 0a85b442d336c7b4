//! Project-relative path handling.
//!
//! Every cross-document reference is resolved to a project-relative path
//! with forward-slash separators. Absolute paths, URL-scheme prefixes and
//! paths that escape the project root through `..` are rejected.

use percent_encoding::percent_decode_str;

/// Splits an href into its base path and its fragment (without the `#`).
///
/// ```
/// use mdvet::infra::split_fragment;
///
/// assert_eq!(split_fragment("guide.md#setup"), ("guide.md", Some("setup")));
/// assert_eq!(split_fragment("guide.md"), ("guide.md", None));
/// assert_eq!(split_fragment("#top"), ("", Some("top")));
/// ```
pub fn split_fragment(href: &str) -> (&str, Option<&str>) {
    match href.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (href, None),
    }
}

/// Returns true if `s` starts with a URL scheme such as `ftp:` or `data:`.
///
/// Single-letter schemes are not accepted so that Windows drive letters do
/// not read as URLs.
pub fn has_url_scheme(s: &str) -> bool {
    let Some((scheme, _)) = s.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    scheme.len() > 1
        && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Checks that a link path can be interpreted relative to the project.
///
/// This is the lexical half of the check: it rejects empty paths,
/// absolute paths and scheme-prefixed paths. Root escape is only known once
/// the referencing document's location is applied in [`resolve_relative`].
pub fn is_relative_reference(path: &str) -> bool {
    !path.is_empty() && !path.starts_with('/') && !path.starts_with('\\') && !has_url_scheme(path)
}

/// Resolves `href_path` against the directory containing `source_path`.
///
/// Both paths are project-relative. Returns `None` when the reference is not
/// a valid relative reference or would climb above the project root.
///
/// ```
/// use mdvet::infra::resolve_relative;
///
/// assert_eq!(resolve_relative("docs/a.md", "./b.md").as_deref(), Some("docs/b.md"));
/// assert_eq!(resolve_relative("docs/a.md", "../README.md").as_deref(), Some("README.md"));
/// assert_eq!(resolve_relative("a.md", "../outside.md"), None);
/// assert_eq!(resolve_relative("a.md", "./my%20file.md").as_deref(), Some("my file.md"));
/// ```
pub fn resolve_relative(source_path: &str, href_path: &str) -> Option<String> {
    if !is_relative_reference(href_path) {
        return None;
    }

    let decoded = percent_decode_str(href_path).decode_utf8_lossy();
    let mut parts: Vec<&str> = parent_components(source_path).collect();
    for component in decoded.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

/// Computes the path of `target` relative to the directory of `source`.
///
/// ```
/// use mdvet::infra::relative_path;
///
/// assert_eq!(relative_path("docs/a.md", "docs/b.md"), "b.md");
/// assert_eq!(relative_path("docs/deep/a.md", "docs/b.md"), "../b.md");
/// assert_eq!(relative_path("README.md", "docs/b.md"), "docs/b.md");
/// ```
pub fn relative_path(source: &str, target: &str) -> String {
    let from: Vec<&str> = parent_components(source).collect();
    let to: Vec<&str> = target.split('/').filter(|c| !c.is_empty()).collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = Vec::with_capacity(from.len() - common + to.len() - common);
    parts.extend(std::iter::repeat_n("..", from.len() - common));
    parts.extend(&to[common..]);
    parts.join("/")
}

/// Normalizes a filesystem-relative path to forward slashes without a
/// leading `./`.
pub fn to_project_path(path: &std::path::Path) -> String {
    path.components()
        .filter_map(|c| match c {
            std::path::Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn parent_components(path: &str) -> impl Iterator<Item = &str> {
    let dir = path.rsplit_once('/').map_or("", |(dir, _)| dir);
    dir.split('/').filter(|c| !c.is_empty() && *c != ".")
}
