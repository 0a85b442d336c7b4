//! Heading slug generation for anchor links.

use std::collections::HashMap;

/// Converts heading text to a URL-safe anchor slug.
///
/// Follows the GitHub convention so that anchors written by hand in
/// documents match:
/// - Converts to lowercase
/// - Replaces spaces with hyphens (runs are *not* collapsed)
/// - Keeps alphanumeric characters, hyphens, and underscores
/// - Drops all other punctuation
///
/// # Examples
///
/// ```
/// use mdvet::infra::slugify;
///
/// assert_eq!(slugify("Getting Started"), "getting-started");
/// assert_eq!(slugify("What's new?"), "whats-new");
/// assert_eq!(slugify("API v2.0"), "api-v20");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.trim().chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() || c == '-' || c == '_' {
            slug.push(c);
        } else if c == ' ' {
            slug.push('-');
        }
    }
    slug
}

/// Hands out slugs that are unique within one sibling list.
///
/// The first occurrence of a slug is returned unchanged; later occurrences
/// get `-1`, `-2`, ... appended.
#[derive(Debug, Default)]
pub struct SlugCounter {
    seen: HashMap<String, usize>,
}

impl SlugCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the unique slug for `text` within this counter's scope.
    ///
    /// A suffixed slug never reuses one handed out earlier, including one
    /// that came from a literal heading such as "Usage 1".
    pub fn unique(&mut self, text: &str) -> String {
        let base = slugify(text);
        let mut n = self.seen.get(&base).copied().unwrap_or(0);
        let mut slug = if n == 0 {
            base.clone()
        } else {
            format!("{}-{}", base, n)
        };
        while n > 0 && self.seen.contains_key(&slug) {
            n += 1;
            slug = format!("{}-{}", base, n);
        }
        self.seen.insert(base, n + 1);
        self.seen.entry(slug.clone()).or_insert(1);
        slug
    }
}
