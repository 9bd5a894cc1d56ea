//! Bridges between common and formal country spellings.
//!
//! The table is plain data: built once per run (defaults plus any pairs from
//! the config file) and handed to the resolver by reference.

use serde::{Deserialize, Serialize};

use crate::domain::normalize;

/// Built-in (common, formal) pairs.
const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("United States", "USA"),
    ("South Korea", "Republic of Korea"),
    ("Great Britain", "United Kingdom"),
    ("China", "People's Republic of China"),
    ("ROC", "Russian Olympic Committee"),
    ("Czech Republic", "Czechia"),
    ("Netherlands", "Netherlands"),
    ("The Netherlands", "Netherlands"),
];

/// One alias pair as written in config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasPair {
    pub common: String,
    pub formal: String,
}

/// Ordered, read-only map from common to formal country names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    pairs: Vec<(String, String)>,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::new(
            DEFAULT_ALIASES
                .iter()
                .map(|(common, formal)| (common.to_string(), formal.to_string())),
        )
    }
}

impl AliasTable {
    /// Build a table from pairs. A repeated common name keeps its first position
    /// but takes the later formal name.
    pub fn new<I, C, F>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, F)>,
        C: Into<String>,
        F: Into<String>,
    {
        let mut table = Self { pairs: Vec::new() };
        for (common, formal) in pairs {
            table.insert(common.into(), formal.into());
        }
        table
    }

    /// Table with no pairs at all
    pub fn empty() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Default table extended (or overridden) by configured pairs
    pub fn with_overrides(overrides: &[AliasPair]) -> Self {
        let mut table = Self::default();
        for pair in overrides {
            table.insert(pair.common.clone(), pair.formal.clone());
        }
        table
    }

    fn insert(&mut self, common: String, formal: String) {
        if let Some(existing) = self.pairs.iter_mut().find(|(c, _)| *c == common) {
            existing.1 = formal;
        } else {
            self.pairs.push((common, formal));
        }
    }

    /// Formal name for an exact common name
    pub fn forward(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(common, _)| common == name)
            .map(|(_, formal)| formal.as_str())
    }

    /// Common names whose formal name equals `name` exactly or after normalization
    pub fn reverse_candidates<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        let key = normalize(name);
        self.pairs
            .iter()
            .filter(move |(_, formal)| formal == name || normalize(formal) == key)
            .map(|(common, _)| common.as_str())
    }

    /// All pairs in table order
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.pairs.iter().map(|(c, f)| (c.as_str(), f.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
