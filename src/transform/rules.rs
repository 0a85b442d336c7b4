//! Transform rules: which links to rewrite and with what template.

use globset::{Glob, GlobMatcher};
use minijinja::Environment;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::domain::{LinkType, ResourceLink, ResourceMetadata};

/// Errors while compiling a rule set.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule {index}: invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        index: usize,
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("rule {index}: invalid template: {source}")]
    InvalidTemplate {
        index: usize,
        #[source]
        source: minijinja::Error,
    },
}

/// Match predicate of a rule. Every condition that is set must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkMatch {
    /// Link types the rule applies to; empty means any type.
    #[serde(alias = "type", deserialize_with = "one_or_many")]
    pub types: Vec<LinkType>,
    /// Glob over the resolved target's project path. Unresolved links
    /// never match a rule that sets a pattern.
    pub pattern: Option<String>,
    /// Target ids the rule must not touch.
    #[serde(alias = "excludeIds")]
    pub exclude_ids: Vec<String>,
}

/// One rewrite rule as written in configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "match", default)]
    pub matcher: LinkMatch,
    /// minijinja template producing the replacement text.
    pub template: String,
}

impl TransformRule {
    pub fn new(matcher: LinkMatch, template: impl Into<String>) -> Self {
        Self {
            description: None,
            matcher,
            template: template.into(),
        }
    }
}

impl LinkMatch {
    /// Matches links of one type.
    pub fn of_type(link_type: LinkType) -> Self {
        Self {
            types: vec![link_type],
            ..Default::default()
        }
    }
}

#[derive(Debug)]
struct CompiledRule {
    rule: TransformRule,
    glob: Option<GlobMatcher>,
}

impl CompiledRule {
    fn matches(&self, link: &ResourceLink, target: Option<&ResourceMetadata>) -> bool {
        let matcher = &self.rule.matcher;
        if !matcher.types.is_empty() && !matcher.types.contains(&link.link_type) {
            return false;
        }
        if let Some(glob) = &self.glob {
            match target {
                Some(target) if glob.is_match(&target.file_path) => {}
                _ => return false,
            }
        }
        if let Some(id) = &link.resolved_id
            && matcher.exclude_ids.contains(id)
        {
            return false;
        }
        true
    }
}

/// An ordered, validated list of rules. The first matching rule wins.
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    /// Compiles globs and checks template syntax up front.
    pub fn new(rules: Vec<TransformRule>) -> Result<Self, RuleError> {
        let env = Environment::new();
        let rules = rules
            .into_iter()
            .enumerate()
            .map(|(index, rule)| {
                env.template_from_str(&rule.template)
                    .map_err(|source| RuleError::InvalidTemplate { index, source })?;
                let glob = rule
                    .matcher
                    .pattern
                    .as_deref()
                    .map(|pattern| {
                        Glob::new(pattern)
                            .map(|g| g.compile_matcher())
                            .map_err(|source| RuleError::InvalidPattern {
                                index,
                                pattern: pattern.to_string(),
                                source,
                            })
                    })
                    .transpose()?;
                Ok(CompiledRule { rule, glob })
            })
            .collect::<Result<_, RuleError>>()?;
        Ok(Self { rules })
    }

    /// First rule matching `link`, given the resource it resolved to.
    pub fn find(
        &self,
        link: &ResourceLink,
        target: Option<&ResourceMetadata>,
    ) -> Option<&TransformRule> {
        self.rules
            .iter()
            .find(|compiled| compiled.matches(link, target))
            .map(|compiled| &compiled.rule)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransformRule> {
        self.rules.iter().map(|compiled| &compiled.rule)
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<LinkType>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(LinkType),
        Many(Vec<LinkType>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(link_type) => vec![link_type],
        OneOrMany::Many(types) => types,
    })
}
