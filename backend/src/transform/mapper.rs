//! Record mapper: sheet rows to [`ReviewEntry`].
//!
//! Every field goes through the [`FieldResolver`] with its [`FieldSpec`]
//! from the [`FieldMap`]; department and year answers then pass through the
//! canonicalizers. Unusable values fall back to the documented defaults in
//! [`crate::models::defaults`]; a row is never rejected here. Rows without a
//! course name are dropped later by the grouper.
//!
//! [`FieldSpec`]: super::fields::FieldSpec

use chrono::{DateTime, Local, Utc};

use super::canon::{canonical_department, validate_year};
use super::fields::{Field, FieldMap};
use super::resolver::FieldResolver;
use crate::models::{defaults, ReviewEntry, TimestampSource};
use crate::parser::{ParsedSheet, SheetRow};

/// Source of "now" for ingestion. Injected so runs can be made
/// deterministic.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Display format for clock-stamped reviews, in local wall-clock time.
const TIMESTAMP_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Maps sheet rows to reviews using a field map, a resolver and a clock.
#[derive(Debug, Clone)]
pub struct RecordMapper<C: Clock = SystemClock> {
    fields: FieldMap,
    resolver: FieldResolver,
    clock: C,
}

impl RecordMapper<SystemClock> {
    pub fn new(fields: FieldMap) -> Self {
        Self::with_clock(fields, SystemClock)
    }
}

impl Default for RecordMapper<SystemClock> {
    fn default() -> Self {
        Self::new(FieldMap::builtin())
    }
}

impl<C: Clock> RecordMapper<C> {
    pub fn with_clock(fields: FieldMap, clock: C) -> Self {
        Self {
            fields,
            resolver: FieldResolver::default(),
            clock,
        }
    }

    /// Swap the resolver (e.g. exact-only matching).
    pub fn with_resolver(mut self, resolver: FieldResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Map every data row of a sheet against one clock reading `now`.
    pub fn map_sheet(&self, sheet: &ParsedSheet, now: DateTime<Utc>) -> Vec<ReviewEntry> {
        sheet
            .rows()
            .enumerate()
            .map(|(index, row)| self.map_row(index, &row, now))
            .collect()
    }

    /// Map one row. `index` is the row's position among data rows.
    pub fn map_row(&self, index: usize, row: &SheetRow<'_>, now: DateTime<Utc>) -> ReviewEntry {
        let field = |f: Field| self.resolver.resolve(row, &self.fields.spec(f));

        let (timestamp, timestamp_source) = match row.get(defaults::TIMESTAMP_COLUMN).trim() {
            "" => (
                now.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string(),
                TimestampSource::Ingested,
            ),
            value => (value.to_string(), TimestampSource::Sheet),
        };

        ReviewEntry {
            id: format!("r-{}-{}", index, now.timestamp_millis()),
            course_id: field(Field::Course),
            reviewer_name: defaults::REVIEWER_NAME.to_string(),
            rating: parse_rating(&field(Field::Rating)),
            teaching_method: field(Field::TeachingMethod),
            exam_structure: field(Field::ExamStructure),
            leniency: field(Field::Leniency),
            grading_comments: field(Field::GradingComments),
            extra_classes: field(Field::ExtraClasses),
            comment: field(Field::Comment),
            timestamp,
            timestamp_source,
            year_of_study: validate_year(&field(Field::YearOfStudy)),
            section: field(Field::Section),
            department: canonical_department(&field(Field::Department)),
            instructor: field(Field::Instructor),
        }
    }
}

/// Parse the leading integer of an easiness answer ("4 - quite easy" → 4).
///
/// Empty, non-numeric and zero answers give [`defaults::RATING`]; anything
/// else is clamped into 1..=5.
pub fn parse_rating(raw: &str) -> u8 {
    let text = raw.trim_start();
    let (negative, rest) = match text.chars().next() {
        Some('-') => (true, &text[1..]),
        Some('+') => (false, &text[1..]),
        _ => (false, text),
    };

    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return defaults::RATING;
    }

    // Overflowing answers are still "very large"
    let magnitude = digits.parse::<u64>().unwrap_or(u64::MAX);
    if magnitude == 0 {
        return defaults::RATING;
    }
    if negative {
        return defaults::RATING_MIN;
    }

    magnitude.min(defaults::RATING_MAX as u64) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::resolver::MatchStrategy;
    use chrono::TimeZone;

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 10, 19, 15, 4, 5).unwrap())
    }

    fn map(csv: &str) -> Vec<ReviewEntry> {
        let sheet = ParsedSheet::parse(csv);
        RecordMapper::with_clock(FieldMap::builtin(), clock()).map_sheet(&sheet, clock().0)
    }

    #[test]
    fn test_parse_rating() {
        assert_eq!(parse_rating("4"), 4);
        assert_eq!(parse_rating(" 5 (very easy)"), 5);
        assert_eq!(parse_rating("2.5"), 2);
        assert_eq!(parse_rating(""), 3);
        assert_eq!(parse_rating("easy"), 3);
        assert_eq!(parse_rating("0"), 3);
        assert_eq!(parse_rating("7"), 5);
        assert_eq!(parse_rating("-2"), 1);
        assert_eq!(parse_rating("99999999999999999999999"), 5);
    }

    #[test]
    fn test_maps_form_columns() {
        let csv = "Timestamp,Name of the course,How easy is the course?,Method of teaching,Exam structure,Leniency of course,Additional comments about the grading,Extra classes?,Anything you wanna say about the course,Choose your department,Current year of study,Section,Instructor\n\
                   10/1/2026 9:00:00,Linear Algebra,4,Slides,2 mids + end sem,Lenient,Relative grading,None,Loved it,humanity,2nd,B,Dr. Strang\n";
        let reviews = map(csv);
        let r = &reviews[0];

        assert_eq!(r.id, format!("r-0-{}", clock().0.timestamp_millis()));
        assert_eq!(r.course_id, "Linear Algebra");
        assert_eq!(r.reviewer_name, "Anonymous");
        assert_eq!(r.rating, 4);
        assert_eq!(r.teaching_method, "Slides");
        assert_eq!(r.exam_structure, "2 mids + end sem");
        assert_eq!(r.leniency, "Lenient");
        assert_eq!(r.grading_comments, "Relative grading");
        assert_eq!(r.extra_classes, "None");
        assert_eq!(r.comment, "Loved it");
        assert_eq!(r.department, "Humanities");
        assert_eq!(r.year_of_study, "2nd");
        assert_eq!(r.section, "B");
        assert_eq!(r.instructor, "Dr. Strang");
        assert_eq!(r.timestamp, "10/1/2026 9:00:00");
        assert_eq!(r.timestamp_source, TimestampSource::Sheet);
    }

    #[test]
    fn test_missing_timestamp_uses_clock() {
        let reviews = map("Course,Rating\nCS101,5\n");
        let local = clock().0.with_timezone(&Local);
        assert_eq!(reviews[0].timestamp, local.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string());
        assert_eq!(reviews[0].timestamp_source, TimestampSource::Ingested);
    }

    #[test]
    fn test_every_field_default() {
        // One column nothing matches, so every field takes its default path
        let reviews = map("zzz\nq\n");
        let r = &reviews[0];

        for field in Field::ALL {
            let actual = match field {
                Field::Course => r.course_id.clone(),
                Field::Department => r.department.clone(),
                Field::Rating => r.rating.to_string(),
                Field::YearOfStudy => r.year_of_study.clone(),
                Field::TeachingMethod => r.teaching_method.clone(),
                Field::ExamStructure => r.exam_structure.clone(),
                Field::Leniency => r.leniency.clone(),
                Field::GradingComments => r.grading_comments.clone(),
                Field::ExtraClasses => r.extra_classes.clone(),
                Field::Comment => r.comment.clone(),
                Field::Section => r.section.clone(),
                Field::Instructor => r.instructor.clone(),
            };
            assert_eq!(actual, field.default_value(), "{:?}", field);
        }
    }

    #[test]
    fn test_department_prefers_column_j() {
        let csv = "Course,Department,c2,c3,c4,c5,c6,c7,c8,Which branch?\nCS101,Mech,,,,,,,,cs\n";
        let reviews = map(csv);
        assert_eq!(reviews[0].department, "CSE");
    }

    #[test]
    fn test_row_indices_count_every_row() {
        let reviews = map("Course,Rating\n,4\nCS101,5\n");
        assert_eq!(reviews.len(), 2);
        assert!(reviews[1].id.starts_with("r-1-"));
    }

    #[test]
    fn test_exact_only_resolver_through_mapper() {
        let csv = "Course name,Rating\nCS101,4\n";
        let sheet = ParsedSheet::parse(csv);

        let fuzzy = RecordMapper::with_clock(FieldMap::builtin(), clock());
        assert_eq!(fuzzy.map_sheet(&sheet, clock().0)[0].course_id, "CS101");

        let exact = RecordMapper::with_clock(FieldMap::builtin(), clock())
            .with_resolver(FieldResolver::new(vec![MatchStrategy::Exact]));
        let r = &exact.map_sheet(&sheet, clock().0)[0];
        // "coursename" is a fragment, so the title still binds exactly
        assert_eq!(r.course_id, "CS101");
        assert_eq!(r.rating, 4);

        let sheet = ParsedSheet::parse("Which course did you take?,Rating\nCS101,4\n");
        assert_eq!(fuzzy.map_sheet(&sheet, clock().0)[0].course_id, "CS101");
        assert_eq!(exact.map_sheet(&sheet, clock().0)[0].course_id, "");
    }

    #[test]
    fn test_same_clock_same_output() {
        let csv = "Course,Rating,Year\nCS101,2,3\n";
        assert_eq!(map(csv), map(csv));
    }
}
