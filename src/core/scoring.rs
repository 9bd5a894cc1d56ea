//! Weighted and multiplier-adjusted scoring.
//!
//! Numeric fields arrive as free text typed into a spreadsheet. Parsing
//! never fails: bad values fall back to a default and say so through
//! [`Parsed::defaulted`], so callers can count them instead of losing them.

use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{CountryName, Medal, MedalCount, ScoreRecord};
use crate::ingest::ResultsRow;

use super::resolver::ResolverPool;

/// Multiplier used when none is given
pub const DEFAULT_MULTIPLIER: f64 = 1.0;

/// A parsed field plus whether the fallback value was used
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Parsed<T> {
    pub value: T,
    pub defaulted: bool,
}

impl<T> Parsed<T> {
    fn ok(value: T) -> Self {
        Self {
            value,
            defaulted: false,
        }
    }

    fn fallback(value: T) -> Self {
        Self {
            value,
            defaulted: true,
        }
    }
}

/// Parse a medal count cell.
///
/// Blank means zero. Anything that is not a non-negative integer is zero
/// and flagged as defaulted. Integral decimals such as `"2.0"` are accepted.
pub fn parse_count(raw: &str) -> Parsed<u32> {
    let text = raw.trim();
    if text.is_empty() {
        return Parsed::ok(0);
    }

    if let Ok(n) = text.parse::<u32>() {
        return Parsed::ok(n);
    }

    match text.replace(',', ".").parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => {
            Parsed::ok(f as u32)
        }
        _ => Parsed::fallback(0),
    }
}

/// Parse a multiplier cell, accepting `,` or `.` as decimal separator.
///
/// Absent or blank input is 1.0. Non-numeric, negative or non-finite input
/// is 1.0 and flagged as defaulted.
pub fn parse_multiplier(raw: Option<&str>) -> Parsed<f64> {
    let text = match raw.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => return Parsed::ok(DEFAULT_MULTIPLIER),
    };

    match text.replace(',', ".").parse::<f64>() {
        Ok(m) if m.is_finite() && m >= 0.0 => Parsed::ok(m),
        _ => Parsed::fallback(DEFAULT_MULTIPLIER),
    }
}

/// Weighted score: 3 per gold, 2 per silver, 1 per bronze.
///
/// Widened to `u64` so the largest counts a cell can hold still fit.
pub fn weight(counts: &MedalCount) -> u64 {
    Medal::Gold.points() * u64::from(counts.gold)
        + Medal::Silver.points() * u64::from(counts.silver)
        + Medal::Bronze.points() * u64::from(counts.bronze)
}

/// Build the score record for one country.
pub fn score(country: impl Into<CountryName>, counts: MedalCount, multiplier: f64) -> ScoreRecord {
    let weight = weight(&counts);
    ScoreRecord {
        country: country.into(),
        counts,
        weight,
        multiplier,
        final_score: weight as f64 * multiplier,
    }
}

/// Scores for every results row
#[derive(Debug, Clone, Default)]
pub struct ScoredRows {
    pub scores: ResolverPool<ScoreRecord>,

    /// Numeric cells that fell back to a default
    pub defaulted: usize,

    /// Countries listed more than once (first row wins)
    pub duplicates: Vec<String>,
}

/// Score each results row, keyed by the sheet's spelling of the country.
pub fn score_rows(rows: &[ResultsRow]) -> ScoredRows {
    let mut scored = ScoredRows::default();

    for row in rows {
        let gold = parse_count(&row.gold);
        let silver = parse_count(&row.silver);
        let bronze = parse_count(&row.bronze);
        let multiplier = parse_multiplier(row.multiplier.as_deref());

        let defaulted = [gold.defaulted, silver.defaulted, bronze.defaulted, multiplier.defaulted]
            .into_iter()
            .filter(|d| *d)
            .count();
        if defaulted > 0 {
            warn!(row = row.row, country = %row.country, defaulted, "Unparseable numeric cells defaulted");
            scored.defaulted += defaulted;
        }

        let counts = MedalCount::new(gold.value, silver.value, bronze.value);
        let record = score(row.country.as_str(), counts, multiplier.value);
        debug!(country = %row.country, weight = record.weight, final_score = record.final_score, "Scored country");

        if !scored.scores.insert(row.country.clone(), record) {
            warn!(row = row.row, country = %row.country, "Country listed twice; keeping first row");
            scored.duplicates.push(row.country.clone());
        }
    }

    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_weights_and_multiplier() {
        let record = score("Netherlands", MedalCount::new(1, 2, 3), 2.0);
        assert_eq!(record.weight, 10);
        assert_eq!(record.final_score, 20.0);
    }

    #[test]
    fn test_score_default_multiplier() {
        let record = score("Netherlands", MedalCount::new(1, 0, 0), DEFAULT_MULTIPLIER);
        assert_eq!(record.weight, 3);
        assert_eq!(record.final_score, 3.0);
    }

    #[test]
    fn test_parse_multiplier_decimal_separators() {
        assert_eq!(parse_multiplier(Some("1,5")).value, 1.5);
        assert_eq!(parse_multiplier(Some("1.5")).value, 1.5);
        assert_eq!(parse_multiplier(Some(" 2 ")).value, 2.0);
        assert!(!parse_multiplier(Some("1,5")).defaulted);
    }

    #[test]
    fn test_parse_multiplier_defaults() {
        assert_eq!(parse_multiplier(Some("")), Parsed::ok(1.0));
        assert_eq!(parse_multiplier(None), Parsed::ok(1.0));

        let bad = parse_multiplier(Some("abc"));
        assert_eq!(bad.value, 1.0);
        assert!(bad.defaulted);

        let negative = parse_multiplier(Some("-2"));
        assert_eq!(negative.value, 1.0);
        assert!(negative.defaulted);

        assert!(parse_multiplier(Some("NaN")).defaulted);
    }

    #[test]
    fn test_score_rows_counts_defaults() {
        let row = |n: usize, country: &str, gold: &str, multiplier: Option<&str>| ResultsRow {
            row: n,
            country: country.to_string(),
            gold: gold.to_string(),
            silver: "1".to_string(),
            bronze: String::new(),
            multiplier: multiplier.map(str::to_string),
        };

        let scored = score_rows(&[
            row(2, "Norway", "2", Some("1,5")),
            row(3, "Italy", "two", Some("x")),
            row(4, "Norway", "9", None),
        ]);

        assert_eq!(scored.scores.len(), 2);
        assert_eq!(scored.defaulted, 2);
        assert_eq!(scored.duplicates, vec!["Norway".to_string()]);

        let norway = scored.scores.get("Norway").unwrap();
        assert_eq!(norway.weight, 8);
        assert_eq!(norway.final_score, 12.0);

        let italy = scored.scores.get("Italy").unwrap();
        assert_eq!(italy.weight, 2);
        assert_eq!(italy.multiplier, 1.0);
    }

    #[test]
    fn test_huge_counts_do_not_overflow() {
        let big = parse_count("2000000000");
        assert_eq!(big, Parsed::ok(2_000_000_000));

        let record = score("X", MedalCount::new(big.value, u32::MAX, u32::MAX), 1.0);
        assert_eq!(record.weight, 6_000_000_000 + 3 * u64::from(u32::MAX));
        assert_eq!(record.final_score, record.weight as f64);
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("3"), Parsed::ok(3));
        assert_eq!(parse_count(" 4 "), Parsed::ok(4));
        assert_eq!(parse_count(""), Parsed::ok(0));
        assert_eq!(parse_count("2.0"), Parsed::ok(2));

        assert_eq!(parse_count("x"), Parsed::fallback(0));
        assert_eq!(parse_count("-1"), Parsed::fallback(0));
        assert_eq!(parse_count("1.5"), Parsed::fallback(0));
    }
}
