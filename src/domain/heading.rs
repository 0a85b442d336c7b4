//! Heading outline of a document, stored as an index-based arena.

use serde::Serialize;
use serde::ser::{SerializeSeq, SerializeStruct, Serializer};
use std::collections::HashMap;

use crate::infra::SlugCounter;

/// Index of a heading inside its [`HeadingTree`].
pub type HeadingIndex = usize;

/// One heading in the outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingNode {
    /// 1 through 6.
    pub level: u8,
    pub text: String,
    /// Anchor slug, unique among this node's siblings.
    pub slug: String,
    /// 1-based source line.
    pub line: Option<usize>,
    pub children: Vec<HeadingIndex>,
}

/// A document's table of contents.
///
/// Nodes live in document order in a flat arena; nesting is expressed by
/// child index lists. A heading nests under the nearest preceding heading
/// with a smaller level, regardless of skipped levels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadingTree {
    nodes: Vec<HeadingNode>,
    roots: Vec<HeadingIndex>,
}

impl HeadingTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the tree from headings in document order.
    ///
    /// Levels outside 1..=6 are clamped.
    pub fn from_flat<I, S>(headings: I) -> Self
    where
        I: IntoIterator<Item = (u8, S, Option<usize>)>,
        S: Into<String>,
    {
        let mut tree = Self::new();
        let mut stack: Vec<HeadingIndex> = Vec::new();
        let mut counters: HashMap<Option<HeadingIndex>, SlugCounter> = HashMap::new();

        for (level, text, line) in headings {
            let level = level.clamp(1, 6);
            let text = text.into();

            while stack
                .last()
                .is_some_and(|&top| tree.nodes[top].level >= level)
            {
                stack.pop();
            }
            let parent = stack.last().copied();
            let slug = counters.entry(parent).or_default().unique(&text);

            let index = tree.nodes.len();
            tree.nodes.push(HeadingNode {
                level,
                text,
                slug,
                line,
                children: Vec::new(),
            });
            match parent {
                Some(p) => tree.nodes[p].children.push(index),
                None => tree.roots.push(index),
            }
            stack.push(index);
        }

        tree
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> impl Iterator<Item = &HeadingNode> {
        self.roots.iter().map(|&i| &self.nodes[i])
    }

    pub fn get(&self, index: HeadingIndex) -> Option<&HeadingNode> {
        self.nodes.get(index)
    }

    pub fn children(&self, node: &HeadingNode) -> impl Iterator<Item = &HeadingNode> {
        node.children.iter().map(|&i| &self.nodes[i])
    }

    /// All headings in document order.
    pub fn iter(&self) -> impl Iterator<Item = &HeadingNode> {
        self.nodes.iter()
    }

    /// Finds the first heading (document order) carrying `slug`.
    pub fn find_slug(&self, slug: &str) -> Option<&HeadingNode> {
        self.nodes.iter().find(|n| n.slug == slug)
    }

    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.slug.as_str())
    }
}

/// Serializes as the nested forest consumers expect.
impl Serialize for HeadingTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.roots.len()))?;
        for &root in &self.roots {
            seq.serialize_element(&Nested { tree: self, index: root })?;
        }
        seq.end()
    }
}

struct Nested<'a> {
    tree: &'a HeadingTree,
    index: HeadingIndex,
}

impl Serialize for Nested<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let node = &self.tree.nodes[self.index];
        let mut state = serializer.serialize_struct("HeadingNode", 5)?;
        state.serialize_field("level", &node.level)?;
        state.serialize_field("text", &node.text)?;
        state.serialize_field("slug", &node.slug)?;
        if let Some(line) = node.line {
            state.serialize_field("line", &line)?;
        } else {
            state.skip_field("line")?;
        }
        if node.children.is_empty() {
            state.skip_field("children")?;
        } else {
            let children: Vec<Nested<'_>> = node
                .children
                .iter()
                .map(|&index| Nested {
                    tree: self.tree,
                    index,
                })
                .collect();
            state.serialize_field("children", &children)?;
        }
        state.end()
    }
}
