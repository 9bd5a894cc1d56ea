//! Fuzzy country-name resolution against a keyed pool of records.
//!
//! Every caller that has to match a name from one source against records
//! keyed by another source's spelling goes through [`IdentityResolver`].
//! Matching tries, in order, and stops at the first hit:
//!
//! 1. exact key
//! 2. normalized key
//! 3. alias forward (target is a common name, pool uses the formal one)
//! 4. alias reverse by key (target normalizes to a common name)
//! 5. alias reverse by value (target is a formal name, pool uses the common one)
//! 6. neutral-athlete sentinel ("AIN" <-> "Individual Neutral Athletes")
//!
//! A miss is not an error: callers treat the name as contributing nothing.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::domain::normalize;

use super::alias::AliasTable;

/// Literal sentinel some sources use for neutral athletes
pub const NEUTRAL_SENTINEL: &str = "AIN";

/// Full name used by other sources for the same delegation
pub const NEUTRAL_ATHLETES: &str = "Individual Neutral Athletes";

/// How a name was matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Normalized,
    AliasForward,
    AliasReverseKey,
    AliasReverseValue,
    NeutralAthletes,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MatchKind::Exact => "exact",
            MatchKind::Normalized => "normalized",
            MatchKind::AliasForward => "alias forward",
            MatchKind::AliasReverseKey => "alias reverse (key)",
            MatchKind::AliasReverseValue => "alias reverse (value)",
            MatchKind::NeutralAthletes => "neutral athletes",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone)]
struct PoolEntry<V> {
    key: String,
    normalized: String,
    value: V,
}

/// Records keyed by country name, searched in insertion order.
///
/// Inserting a key that already exists is ignored, so the first record for
/// a given spelling wins.
#[derive(Debug, Clone)]
pub struct ResolverPool<V> {
    entries: Vec<PoolEntry<V>>,
    index: HashMap<String, usize>,
}

impl<V> Default for ResolverPool<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<V> ResolverPool<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record; returns false if the key was already present
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> bool {
        let key = key.into();
        if self.index.contains_key(&key) {
            return false;
        }

        self.index.insert(key.clone(), self.entries.len());
        self.entries.push(PoolEntry {
            normalized: normalize(&key),
            key,
            value,
        });
        true
    }

    /// Exact-key lookup
    pub fn get(&self, key: &str) -> Option<&V> {
        self.index.get(key).map(|&i| &self.entries[i].value)
    }

    /// Keys and values in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> + '_ {
        self.entries.iter().map(|e| (e.key.as_str(), &e.value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact key first, then the first key with the same normalized form
    fn lookup(&self, name: &str) -> Option<(&str, &V)> {
        if let Some(&i) = self.index.get(name) {
            let entry = &self.entries[i];
            return Some((entry.key.as_str(), &entry.value));
        }

        let key = normalize(name);
        if key.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|e| e.normalized == key)
            .map(|e| (e.key.as_str(), &e.value))
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for ResolverPool<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut pool = Self::new();
        for (key, value) in iter {
            pool.insert(key, value);
        }
        pool
    }
}

/// A successful resolution
#[derive(Debug)]
pub struct Resolved<'p, V> {
    /// Pool key that matched
    pub key: &'p str,
    pub value: &'p V,
    pub kind: MatchKind,
}

/// Maps arbitrary country spellings onto pool records.
#[derive(Debug, Clone, Copy)]
pub struct IdentityResolver<'a> {
    aliases: &'a AliasTable,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(aliases: &'a AliasTable) -> Self {
        Self { aliases }
    }

    pub fn aliases(&self) -> &'a AliasTable {
        self.aliases
    }

    /// Find the record for `target`, or `None` if no rule matches.
    pub fn resolve<'p, V>(&self, target: &str, pool: &'p ResolverPool<V>) -> Option<&'p V> {
        self.resolve_match(target, pool).map(|m| m.value)
    }

    /// Like [`resolve`](Self::resolve) but also reports which key and rule matched.
    pub fn resolve_match<'p, V>(
        &self,
        target: &str,
        pool: &'p ResolverPool<V>,
    ) -> Option<Resolved<'p, V>> {
        let target_key = normalize(target);
        if target_key.is_empty() {
            return None;
        }

        if let Some(&i) = pool.index.get(target) {
            let entry = &pool.entries[i];
            return Some(Resolved {
                key: entry.key.as_str(),
                value: &entry.value,
                kind: MatchKind::Exact,
            });
        }

        if let Some(entry) = pool.entries.iter().find(|e| e.normalized == target_key) {
            return Some(Resolved {
                key: entry.key.as_str(),
                value: &entry.value,
                kind: MatchKind::Normalized,
            });
        }

        let hit = |name: &str, kind: MatchKind| {
            pool.lookup(name)
                .map(|(key, value)| Resolved { key, value, kind })
        };

        if let Some(found) = self
            .aliases
            .forward(target)
            .and_then(|formal| hit(formal, MatchKind::AliasForward))
        {
            return Some(found);
        }

        for (common, formal) in self.aliases.pairs() {
            if normalize(common) == target_key {
                if let Some(found) = hit(formal, MatchKind::AliasReverseKey) {
                    return Some(found);
                }
            }
        }

        for common in self.aliases.reverse_candidates(target) {
            if let Some(found) = hit(common, MatchKind::AliasReverseValue) {
                return Some(found);
            }
        }

        if target_key.contains("individual") {
            if let Some(found) = hit(NEUTRAL_SENTINEL, MatchKind::NeutralAthletes)
                .or_else(|| hit(NEUTRAL_ATHLETES, MatchKind::NeutralAthletes))
            {
                return Some(found);
            }
        }
        if target.trim() == NEUTRAL_SENTINEL {
            if let Some(found) = hit(NEUTRAL_ATHLETES, MatchKind::NeutralAthletes) {
                return Some(found);
            }
        }

        None
    }
}
