//! Substitution rules
//!
//! A [`SubstitutionRule`] pairs a compiled pattern with the text that
//! replaces its matches. A [`RuleSet`] keeps rules in insertion order, which
//! matters: every rule sees the text produced by the rules before it.

use crate::error::{ExpanderError, Result};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A pattern and its replacement
#[derive(Debug, Clone)]
pub struct SubstitutionRule {
    pattern: Regex,
    replacement: String,
}

impl SubstitutionRule {
    /// Compile `pattern` as a regular expression
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self> {
        let compiled = Regex::new(pattern).map_err(|source| ExpanderError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            pattern: compiled,
            replacement: replacement.into(),
        })
    }

    /// Match `key` literally, so `{{NAME}}` needs no escaping
    pub fn literal(key: &str, replacement: impl Into<String>) -> Result<Self> {
        Self::new(&regex_lite::escape(key), replacement)
    }

    /// Source text of the pattern
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Text inserted for every match; `$1` and `${name}` refer to groups
    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    pub(crate) fn regex(&self) -> &Regex {
        &self.pattern
    }
}

/// Serialized form of a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEntry {
    pub pattern: String,
    pub replacement: String,
}

impl From<&SubstitutionRule> for RuleEntry {
    fn from(rule: &SubstitutionRule) -> Self {
        Self {
            pattern: rule.pattern().to_string(),
            replacement: rule.replacement().to_string(),
        }
    }
}

/// Ordered list of substitution rules
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<SubstitutionRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(pattern, replacement)` pairs, keeping their order
    pub fn from_pairs<I, P, R>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (P, R)>,
        P: AsRef<str>,
        R: Into<String>,
    {
        pairs
            .into_iter()
            .map(|(pattern, replacement)| SubstitutionRule::new(pattern.as_ref(), replacement))
            .collect()
    }

    /// Parse a JSON array of `{"pattern", "replacement"}` objects
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<RuleEntry> = serde_json::from_str(json)?;
        Self::from_pairs(entries.into_iter().map(|entry| (entry.pattern, entry.replacement)))
    }

    /// Load a rule file written in the [`RuleSet::from_json`] format
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ExpanderError::io(path.display().to_string(), e))?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        let entries: Vec<RuleEntry> = self.rules.iter().map(RuleEntry::from).collect();
        Ok(serde_json::to_string_pretty(&entries)?)
    }

    pub fn push(&mut self, rule: SubstitutionRule) {
        self.rules.push(rule);
    }

    pub fn with_rule(mut self, rule: SubstitutionRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SubstitutionRule> {
        self.rules.iter()
    }
}

impl FromIterator<SubstitutionRule> for RuleSet {
    fn from_iter<T: IntoIterator<Item = SubstitutionRule>>(iter: T) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a SubstitutionRule;
    type IntoIter = std::slice::Iter<'a, SubstitutionRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
