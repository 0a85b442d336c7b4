//! Rewrites links in document text through transform rules.

use std::collections::BTreeMap;
use std::ops::Range;

use minijinja::{Environment, Value};
use tracing::warn;

use crate::domain::{LinkNodeType, LinkType, ResourceLink, ResourceMetadata, ResourceRegistry};
use crate::infra::{fenced_ranges, link_spans, relative_path, split_frontmatter, DEFINITION_RE};
use crate::transform::{LinkContext, RuleSet};

/// Everything a transform needs besides the text and its links.
#[derive(Debug, Clone, Copy)]
pub struct TransformOptions<'a> {
    pub rules: &'a RuleSet,
    /// Used to look up the targets of resolved links.
    pub registry: Option<&'a ResourceRegistry>,
    /// Extra top-level template variables.
    pub context: Option<&'a serde_json::Map<String, serde_json::Value>>,
    /// Project path of the document being transformed.
    pub source_path: Option<&'a str>,
    /// Rendered for inline links no rule matches.
    pub default_template: Option<&'a str>,
}

impl<'a> TransformOptions<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self {
            rules,
            registry: None,
            context: None,
            source_path: None,
            default_template: None,
        }
    }

    fn target(&self, link: &ResourceLink) -> Option<&'a ResourceMetadata> {
        let id = link.resolved_id.as_deref()?;
        self.registry?.get_by_id(id)
    }
}

/// Rewrites `content` according to `options`.
///
/// `links` are the document's links after resolution. Inline links are
/// matched to them by their exact `(text, href)`; reference definitions by
/// `(label, href)`. Links that match nothing, or whose template fails to
/// render, are left exactly as written. Frontmatter is never touched.
///
/// With no rules and no default template, or with no links, the content is
/// returned unchanged.
pub fn transform(content: &str, links: &[ResourceLink], options: &TransformOptions<'_>) -> String {
    if links.is_empty() || (options.rules.is_empty() && options.default_template.is_none()) {
        return content.to_string();
    }

    let body_offset = split_frontmatter(content).map_or(0, |split| split.body_offset);
    let (header, body) = content.split_at(body_offset);

    let env = Environment::new();
    let body = rewrite_inline(body, links, options, &env);
    let body = rewrite_definitions(&body, links, options);

    let mut out = String::with_capacity(header.len() + body.len());
    out.push_str(header);
    out.push_str(&body);
    out
}

fn rewrite_inline(
    body: &str,
    links: &[ResourceLink],
    options: &TransformOptions<'_>,
    env: &Environment<'_>,
) -> String {
    let mut out = String::with_capacity(body.len());
    let mut last = 0;

    for span in link_spans(body) {
        let Some(link) = find_link(links, LinkNodeType::Link, &span.text, &span.href) else {
            continue;
        };
        let target = options.target(link);
        let template = options
            .rules
            .find(link, target)
            .map(|rule| rule.template.as_str())
            .or(options.default_template);
        let Some(template) = template else {
            continue;
        };

        match render(env, template, link, target, options) {
            Ok(rendered) => {
                out.push_str(&body[last..span.range.start]);
                out.push_str(&rendered);
                last = span.range.end;
            }
            Err(err) => {
                warn!(href = %link.href, error = %err, "template failed to render, keeping link");
            }
        }
    }

    out.push_str(&body[last..]);
    out
}

/// What happens to one reference definition.
enum DefinitionEdit {
    /// Replace the URL with this one.
    Retarget(String),
    /// Drop the whole line.
    Remove,
}

/// Rewrites or removes `[label]: href` lines of local links a rule matches.
///
/// Removing a line also drops the blank lines it leaves behind beyond one,
/// keeping the document's own line endings.
fn rewrite_definitions(body: &str, links: &[ResourceLink], options: &TransformOptions<'_>) -> String {
    if options.rules.is_empty() {
        return body.to_string();
    }
    let fenced = fenced_ranges(body);
    let mut out = String::with_capacity(body.len());
    let mut last = 0;

    for caps in DEFINITION_RE.captures_iter(body) {
        let (Some(whole), Some(url)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        if in_ranges(&fenced, whole.start()) {
            continue;
        }
        let Some(edit) = definition_edit(&caps[1], url.as_str(), links, options) else {
            continue;
        };

        match edit {
            DefinitionEdit::Retarget(new_url) => {
                out.push_str(&body[last..url.start()]);
                out.push_str(&new_url);
                last = url.end();
            }
            DefinitionEdit::Remove => {
                out.push_str(&body[last..whole.start()]);
                let mut rest = skip_line_ending(&body[whole.end()..]);
                let mut run = trailing_line_endings(&out) + leading_line_endings(rest);
                while run > 2 {
                    let Some(next) = skip_line_ending_once(rest) else {
                        break;
                    };
                    rest = next;
                    run -= 1;
                }
                last = body.len() - rest.len();
            }
        }
    }

    out.push_str(&body[last..]);
    out
}

fn definition_edit(
    label: &str,
    url: &str,
    links: &[ResourceLink],
    options: &TransformOptions<'_>,
) -> Option<DefinitionEdit> {
    let href = url.trim_start_matches('<').trim_end_matches('>');
    let link = find_link(links, LinkNodeType::Definition, label, href)?;
    if link.link_type != LinkType::LocalFile {
        return None;
    }
    let target = options.target(link);
    options.rules.find(link, target)?;

    let Some(target) = target else {
        return Some(DefinitionEdit::Remove);
    };
    let source = options.source_path?;
    let mut new_url = relative_path(source, &target.file_path);
    if let Some(fragment) = link.fragment().filter(|f| !f.is_empty()) {
        new_url.push('#');
        new_url.push_str(fragment);
    }
    if url.starts_with('<') {
        new_url = format!("<{}>", new_url);
    }
    Some(DefinitionEdit::Retarget(new_url))
}

/// `s` without one leading `\n` or `\r\n`.
fn skip_line_ending_once(s: &str) -> Option<&str> {
    s.strip_prefix("\r\n").or_else(|| s.strip_prefix('\n'))
}

fn skip_line_ending(s: &str) -> &str {
    skip_line_ending_once(s).unwrap_or(s)
}

/// Number of line endings `s` starts with.
fn leading_line_endings(s: &str) -> usize {
    let mut rest = s;
    let mut count = 0;
    while let Some(next) = skip_line_ending_once(rest) {
        rest = next;
        count += 1;
    }
    count
}

/// Number of line endings `s` ends with.
fn trailing_line_endings(s: &str) -> usize {
    let mut rest = s;
    let mut count = 0;
    while let Some(stripped) = rest.strip_suffix('\n') {
        rest = stripped.strip_suffix('\r').unwrap_or(stripped);
        count += 1;
    }
    count
}

fn find_link<'l>(
    links: &'l [ResourceLink],
    node_type: LinkNodeType,
    text: &str,
    href: &str,
) -> Option<&'l ResourceLink> {
    links
        .iter()
        .find(|l| l.node_type == node_type && l.text == text && l.href == href)
}

fn render(
    env: &Environment<'_>,
    template: &str,
    link: &ResourceLink,
    target: Option<&ResourceMetadata>,
    options: &TransformOptions<'_>,
) -> Result<String, minijinja::Error> {
    let mut ctx: BTreeMap<String, Value> = options
        .context
        .into_iter()
        .flatten()
        .map(|(key, value)| (key.clone(), Value::from_serialize(value)))
        .collect();
    ctx.insert(
        "link".to_string(),
        Value::from_serialize(LinkContext::new(link, target, options.source_path)),
    );
    env.render_str(template, ctx)
}

fn in_ranges(ranges: &[Range<usize>], offset: usize) -> bool {
    ranges.iter().any(|r| r.contains(&offset))
}
