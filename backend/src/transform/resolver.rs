//! Fuzzy column resolution.
//!
//! The sheet's column titles are human-edited questions ("How easy is the
//! course?"), so fields are found by matching normalized title fragments
//! rather than binding to exact titles.
//!
//! Resolution order for one [`FieldSpec`]:
//! 1. the preferred column index, if set and non-empty;
//! 2. for each [`MatchStrategy`] in order, for each fragment in order: the
//!    first column the strategy accepts, if its value is non-empty;
//! 3. otherwise the empty string.
//!
//! Strategies form the outer loop so that an exact title ("Rating") beats a
//! loose one ("Course" inside "howeasyisthecourse") for the same field. The
//! cost: an exact hit on a low-priority fragment also beats a loose hit on a
//! high-priority one, so "Batch" wins over "Your current year" for the year
//! of study.

use serde::{Deserialize, Serialize};

use super::fields::FieldSpec;
use crate::parser::SheetRow;

/// One way of comparing a normalized fragment with a normalized title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Titles equal after normalization.
    Exact,
    /// Either contains the other after normalization.
    Substring,
}

impl MatchStrategy {
    pub fn matches(&self, fragment: &str, title: &str) -> bool {
        match self {
            MatchStrategy::Exact => title == fragment,
            MatchStrategy::Substring => {
                // An untitled column would "contain" every fragment
                !title.is_empty() && (title.contains(fragment) || fragment.contains(title))
            }
        }
    }
}

/// Lower-case and drop everything but ASCII letters and digits.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Resolves field values from rows using an ordered list of strategies.
#[derive(Debug, Clone)]
pub struct FieldResolver {
    strategies: Vec<MatchStrategy>,
}

impl FieldResolver {
    pub fn new(strategies: Vec<MatchStrategy>) -> Self {
        Self { strategies }
    }

    /// Best value for `spec` in `row`, trimmed, or `""`.
    pub fn resolve(&self, row: &SheetRow<'_>, spec: &FieldSpec) -> String {
        if let Some(index) = spec.column {
            let value = row.column(index).trim();
            if !value.is_empty() {
                return value.to_string();
            }
        }

        let titles: Vec<(String, &str)> = row
            .named_columns()
            .map(|(title, value)| (normalize(title), value))
            .collect();

        let fragments: Vec<String> = spec.fragments.iter().map(|f| normalize(f)).collect();

        for strategy in &self.strategies {
            for fragment in &fragments {
                let found = titles
                    .iter()
                    .find(|(title, _)| strategy.matches(fragment, title));

                if let Some((_, value)) = found {
                    let value = value.trim();
                    if !value.is_empty() {
                        return value.to_string();
                    }
                }
            }
        }

        String::new()
    }
}

impl Default for FieldResolver {
    fn default() -> Self {
        Self::new(vec![MatchStrategy::Exact, MatchStrategy::Substring])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{HeaderIndex, RawRecord};

    fn spec(fragments: &[&str], column: Option<usize>) -> FieldSpec {
        FieldSpec {
            fragments: fragments.iter().map(|s| s.to_string()).collect(),
            column,
        }
    }

    fn resolve(headers: &[&str], cells: &[&str], spec: &FieldSpec) -> String {
        let header = HeaderIndex::from_record(headers.iter().map(|s| s.to_string()).collect());
        let record: RawRecord = cells.iter().map(|s| s.to_string()).collect();
        FieldResolver::default().resolve(&SheetRow::new(&header, &record), spec)
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("Name of the Course?"), "nameofthecourse");
        assert_eq!(normalize("Year (2nd/3rd)"), "year2nd3rd");
        assert_eq!(normalize("Écoles"), "coles");
    }

    #[test]
    fn test_exact_beats_substring() {
        let value = resolve(
            &["Course instructor", "Course"],
            &["Dr. X", "CS101"],
            &spec(&["course"], None),
        );
        assert_eq!(value, "CS101");
    }

    #[test]
    fn test_substring_either_direction() {
        let headers = ["How easy is the course? (1-5)"];
        assert_eq!(resolve(&headers, &["4"], &spec(&["howeasyisthecourse"], None)), "4");

        let headers = ["Dept"];
        assert_eq!(resolve(&headers, &["CS"], &spec(&["department", "deptname"], None)), "CS");
    }

    #[test]
    fn test_exact_on_later_fragment_beats_substring_on_earlier() {
        let value = resolve(
            &["Course", "Department", "Rating"],
            &["CS101", "CS", "5"],
            &spec(&["howeasyisthecourse", "easiness", "rating"], None),
        );
        assert_eq!(value, "5");
    }

    #[test]
    fn test_preferred_column_first() {
        let value = resolve(
            &["Department", "a", "b"],
            &["Mech", "x", "CSE"],
            &spec(&["department"], Some(2)),
        );
        assert_eq!(value, "CSE");
    }

    #[test]
    fn test_empty_preferred_column_falls_back_to_names() {
        let value = resolve(
            &["Department", "a", "b"],
            &["Mech", "x", " "],
            &spec(&["department"], Some(2)),
        );
        assert_eq!(value, "Mech");
    }

    #[test]
    fn test_exact_late_fragment_beats_loose_early_fragment() {
        let year = spec(&["currentyearofstudy", "year", "batch"], None);
        let value = resolve(&["Your current year", "Batch"], &["2nd", "2024"], &year);
        assert_eq!(value, "2024");

        // Without an exact title the earliest loose fragment still wins
        let value = resolve(&["Your current year", "Batch no."], &["2nd", "2024"], &year);
        assert_eq!(value, "2nd");
    }

    #[test]
    fn test_empty_match_falls_through_to_next_fragment() {
        let value = resolve(
            &["Course", "Subject"],
            &["", "Linear Algebra"],
            &spec(&["course", "subject"], None),
        );
        assert_eq!(value, "Linear Algebra");
    }

    #[test]
    fn test_untitled_column_never_substring_matches() {
        let value = resolve(&["", "Rating"], &["junk", "5"], &spec(&["rating"], None));
        assert_eq!(value, "5");
        assert_eq!(resolve(&["???"], &["junk"], &spec(&["comment"], None)), "");
    }

    #[test]
    fn test_values_are_trimmed_and_missing_is_empty() {
        assert_eq!(resolve(&["Section"], &["  B "], &spec(&["section"], None)), "B");
        assert_eq!(resolve(&["Section"], &["B"], &spec(&["comment"], None)), "");
    }

    #[test]
    fn test_exact_only_resolver() {
        let header = HeaderIndex::from_record(vec!["Course name".to_string()]);
        let record: RawRecord = vec!["CS101".to_string()];
        let row = SheetRow::new(&header, &record);
        let resolver = FieldResolver::new(vec![MatchStrategy::Exact]);

        assert_eq!(resolver.resolve(&row, &spec(&["course"], None)), "");
        assert_eq!(resolver.resolve(&row, &spec(&["coursename"], None)), "CS101");
    }
}
