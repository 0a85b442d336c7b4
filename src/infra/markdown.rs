//! Metadata extraction from a single markdown document.
//!
//! Extraction is a pure function of the document text. It never fails:
//! malformed frontmatter is recorded as `frontmatter_error`, malformed
//! headings simply do not produce heading nodes, and links are recorded as
//! written whether or not they point anywhere.

use std::ops::Range;
use std::sync::LazyLock;

use pulldown_cmark::{Event, HeadingLevel, LinkType as MdLinkType, Options, Parser, Tag};
use regex::Regex;

use crate::domain::{ExtractedMetadata, HeadingTree, ResourceLink};
use crate::infra::ContentHash;
use crate::infra::frontmatter;

/// `[label]: url` at the start of a line (up to three spaces of indent).
pub(crate) static DEFINITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^ {0,3}\[([^\]\n]+)\]:[ \t]*(<[^>\n]*>|\S+)[^\n]*$")
        .expect("definition regex is valid")
});

/// Extracts metadata from document text, hashing the text's own bytes.
pub fn extract(content: &str) -> ExtractedMetadata {
    extract_with_checksum(content, ContentHash::compute(content.as_bytes()), content.len())
}

/// Extracts metadata using a checksum and size computed from the raw file
/// bytes (before any BOM stripping or encoding conversion).
pub fn extract_with_checksum(content: &str, checksum: ContentHash, size_bytes: usize) -> ExtractedMetadata {
    let text = content.strip_prefix('\u{FEFF}').unwrap_or(content);

    let (frontmatter, frontmatter_error, body_offset) = match frontmatter::split(text) {
        Ok(split) => match split.yaml.map(frontmatter::parse_yaml) {
            None => (None, None, split.body_offset),
            Some(Ok(map)) => (Some(map), None, split.body_offset),
            Some(Err(e)) => (None, Some(e.to_string()), split.body_offset),
        },
        Err(e) => (None, Some(e.to_string()), 0),
    };

    let body = &text[body_offset..];
    let lines = LineIndex::new(body, count_newlines(&text[..body_offset]));
    let (mut links, headings) = scan_body(body, &lines);
    links.extend(scan_definitions(body, &lines));
    links.sort_by_key(|l| l.line);

    ExtractedMetadata {
        links,
        headings,
        frontmatter,
        frontmatter_error,
        size_bytes: size_bytes as u64,
        estimated_token_count: estimate_tokens(text),
        checksum,
    }
}

/// Rough token estimate used for context budgeting: one token per four
/// characters, rounded up.
pub fn estimate_tokens(text: &str) -> u64 {
    (text.chars().count() as u64).div_ceil(4)
}

fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

struct PendingLink {
    href: String,
    text: String,
    line: usize,
}

fn scan_body(body: &str, lines: &LineIndex) -> (Vec<ResourceLink>, HeadingTree) {
    let mut links = Vec::new();
    let mut headings: Vec<(u8, String, Option<usize>)> = Vec::new();

    let mut heading: Option<(u8, String, usize)> = None;
    let mut link: Option<PendingLink> = None;

    for (event, range) in Parser::new_ext(body, markdown_options()).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading(level, _, _)) => {
                heading = Some((heading_level(level), String::new(), lines.line_of(range.start)));
            }
            Event::End(Tag::Heading(..)) => {
                if let Some((level, text, line)) = heading.take() {
                    headings.push((level, text.trim().to_string(), Some(line)));
                }
            }
            Event::Start(Tag::Link(kind, dest, _)) => {
                // Reference usages are represented by their definitions.
                let Some(href) = link_href(kind, &dest) else {
                    continue;
                };
                link = Some(PendingLink {
                    href,
                    text: String::new(),
                    line: lines.line_of(range.start),
                });
            }
            Event::End(Tag::Link(..)) => {
                if let Some(pending) = link.take() {
                    links.push(
                        ResourceLink::inline(pending.text, pending.href).at_line(pending.line),
                    );
                }
            }
            Event::Text(t) | Event::Code(t) => {
                if let Some((_, text, _)) = heading.as_mut() {
                    text.push_str(&t);
                }
                if let Some(pending) = link.as_mut() {
                    pending.text.push_str(&t);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some((_, text, _)) = heading.as_mut() {
                    text.push(' ');
                }
                if let Some(pending) = link.as_mut() {
                    pending.text.push(' ');
                }
            }
            _ => {}
        }
    }

    (links, HeadingTree::from_flat(headings))
}

/// An inline link as written in a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LinkSpan {
    /// Bytes of the whole link, brackets and destination included.
    pub range: Range<usize>,
    pub text: String,
    pub href: String,
}

/// Inline links, autolinks and email links of `body` in document order.
///
/// Text and href are computed exactly as during extraction. Links inside
/// code spans or code blocks do not exist for the parser and are never
/// returned; neither are images.
pub(crate) fn link_spans(body: &str) -> Vec<LinkSpan> {
    let mut spans = Vec::new();
    let mut open: Option<LinkSpan> = None;

    for (event, range) in Parser::new_ext(body, markdown_options()).into_offset_iter() {
        match event {
            Event::Start(Tag::Link(kind, dest, _)) => {
                open = link_href(kind, &dest).map(|href| LinkSpan {
                    range,
                    text: String::new(),
                    href,
                });
            }
            Event::End(Tag::Link(..)) => spans.extend(open.take()),
            Event::Text(t) | Event::Code(t) => {
                if let Some(span) = open.as_mut() {
                    span.text.push_str(&t);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some(span) = open.as_mut() {
                    span.text.push(' ');
                }
            }
            _ => {}
        }
    }
    spans
}

fn link_href(kind: MdLinkType, dest: &str) -> Option<String> {
    match kind {
        MdLinkType::Inline | MdLinkType::Autolink => Some(dest.to_string()),
        MdLinkType::Email => Some(format!("mailto:{}", dest)),
        _ => None,
    }
}

fn scan_definitions(body: &str, lines: &LineIndex) -> Vec<ResourceLink> {
    let fenced = fenced_ranges(body);
    DEFINITION_RE
        .captures_iter(body)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            if fenced.iter().any(|r| r.contains(&whole.start())) {
                return None;
            }
            let label = &caps[1];
            if label.starts_with('^') {
                return None; // footnote
            }
            let href = caps[2].trim_start_matches('<').trim_end_matches('>');
            Some(ResourceLink::definition(label, href).at_line(lines.line_of(whole.start())))
        })
        .collect()
}

/// Byte ranges covered by fenced code blocks.
pub(crate) fn fenced_ranges(body: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut open: Option<(usize, &str)> = None;
    let mut pos = 0;
    for line in body.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let fence = if trimmed.starts_with("```") {
            Some("```")
        } else if trimmed.starts_with("~~~") {
            Some("~~~")
        } else {
            None
        };
        match (open, fence) {
            (None, Some(f)) => open = Some((pos, f)),
            (Some((start, f)), Some(g)) if f == g => {
                ranges.push(start..pos + line.len());
                open = None;
            }
            _ => {}
        }
        pos += line.len();
    }
    if let Some((start, _)) = open {
        ranges.push(start..body.len());
    }
    ranges
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn count_newlines(s: &str) -> usize {
    s.bytes().filter(|&b| b == b'\n').count()
}

/// Maps byte offsets in the body to 1-based document lines.
struct LineIndex {
    starts: Vec<usize>,
    first_line: usize,
}

impl LineIndex {
    fn new(body: &str, lines_before_body: usize) -> Self {
        let starts = std::iter::once(0)
            .chain(body.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            starts,
            first_line: lines_before_body + 1,
        }
    }

    fn line_of(&self, offset: usize) -> usize {
        let index = match self.starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        self.first_line + index
    }
}
