//! Country names and the comparison key derived from them.
//!
//! Three sources spell countries independently (the scraped medal table,
//! the draft roster, the results sheet). Comparisons never use the raw text
//! directly; they go through [`normalize`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::alias::AliasTable;

/// Leading qualifiers removed by [`normalize`], checked in this order.
const QUALIFIER_PREFIXES: [&str; 3] = ["the ", "republic of ", "people's republic of "];

/// Canonicalize a raw country string into a comparison key.
///
/// Lower-cases, trims, and strips one leading qualifier ("the ",
/// "republic of ", "people's republic of "). The first matching prefix in
/// that order is removed per pass; passes repeat until the key is stable,
/// so `normalize(normalize(x)) == normalize(x)` holds for every input.
///
/// ```
/// use podium::domain::normalize;
///
/// assert_eq!(normalize("The Netherlands"), "netherlands");
/// assert_eq!(normalize("People's Republic of China"), "china");
/// assert_eq!(normalize(""), "");
/// ```
pub fn normalize(raw: &str) -> String {
    let mut key = raw.trim().to_lowercase();

    loop {
        let stripped = QUALIFIER_PREFIXES
            .iter()
            .find_map(|prefix| key.strip_prefix(prefix))
            .map(|rest| rest.trim().to_string());

        match stripped {
            Some(next) if next != key => key = next,
            _ => return key,
        }
    }
}

/// A country as it was written by some source, plus its comparison key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CountryName {
    display: String,
    key: String,
}

impl CountryName {
    pub fn new(display: impl Into<String>) -> Self {
        let display = display.into();
        let key = normalize(&display);
        Self { display, key }
    }

    /// Text exactly as the source wrote it
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Normalized comparison key
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_blank(&self) -> bool {
        self.key.is_empty()
    }

    /// Equivalent if the keys match or an alias pair bridges the two names.
    ///
    /// Blank names are never equivalent to anything.
    pub fn is_equivalent(&self, other: &CountryName, aliases: &AliasTable) -> bool {
        if self.is_blank() || other.is_blank() {
            return false;
        }
        if self.key == other.key {
            return true;
        }

        aliases.pairs().any(|(common, formal)| {
            let (common, formal) = (normalize(common), normalize(formal));
            (common == self.key && formal == other.key) || (common == other.key && formal == self.key)
        })
    }
}

impl fmt::Display for CountryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.display)
    }
}

impl From<String> for CountryName {
    fn from(display: String) -> Self {
        Self::new(display)
    }
}

impl From<&str> for CountryName {
    fn from(display: &str) -> Self {
        Self::new(display)
    }
}

impl From<CountryName> for String {
    fn from(name: CountryName) -> Self {
        name.display
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_leading_qualifiers() {
        assert_eq!(normalize("The Netherlands"), "netherlands");
        assert_eq!(normalize("Netherlands"), "netherlands");
        assert_eq!(normalize("Republic of Korea"), "korea");
        assert_eq!(normalize("People's Republic of China"), "china");
    }

    #[test]
    fn test_normalize_is_case_insensitive_and_trims() {
        assert_eq!(normalize("  NORWAY "), "norway");
        assert_eq!(normalize("the  Netherlands"), "netherlands");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_normalize_leaves_inner_qualifiers() {
        assert_eq!(
            normalize("Democratic Republic of the Congo"),
            "democratic republic of the congo"
        );
        // "the" only counts as a prefix when followed by a space
        assert_eq!(normalize("Thessaly"), "thessaly");
    }

    #[test]
    fn test_normalize_idempotent() {
        let samples = [
            "The Netherlands",
            "the the netherlands",
            "The Republic of Korea",
            "  People's Republic of China",
            "Individual Neutral Athletes",
            "",
            "AIN",
            "THE ",
        ];

        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_country_name_equivalence() {
        let aliases = AliasTable::default();

        let netherlands = CountryName::new("The Netherlands");
        assert!(netherlands.is_equivalent(&CountryName::new("netherlands"), &aliases));

        let usa = CountryName::new("USA");
        assert!(usa.is_equivalent(&CountryName::new("United States"), &aliases));
        assert!(CountryName::new("United States").is_equivalent(&usa, &aliases));

        assert!(!usa.is_equivalent(&CountryName::new("Norway"), &aliases));
        assert!(!CountryName::new("").is_equivalent(&CountryName::new(""), &aliases));
    }

    #[test]
    fn test_country_name_serializes_as_display_text() {
        let name = CountryName::new("The Netherlands");
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"The Netherlands\"");

        let parsed: CountryName = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.key(), "netherlands");
    }
}
