//! Domain models for the course catalog.
//!
//! - [`ReviewEntry`] - One normalized review row from the spreadsheet
//! - [`CourseEntry`] - A course aggregated from its reviews
//! - [`CatalogData`] - The result of one ingestion run
//! - [`defaults`] - Documented default values applied during mapping
//!
//! Serialized field names are camelCase, matching the JSON shape served by
//! the HTTP API and stored in the embedded fallback fixture.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Defaults
// =============================================================================

/// Values substituted when a spreadsheet field is absent or unusable.
pub mod defaults {
    /// Rating used when the easiness column is empty or not a number.
    pub const RATING: u8 = 3;

    /// Lowest accepted rating.
    pub const RATING_MIN: u8 = 1;

    /// Highest accepted rating.
    pub const RATING_MAX: u8 = 5;

    /// Department label for blank departments.
    pub const DEPARTMENT: &str = "General";

    /// Year-of-study label for blank or noise answers.
    pub const YEAR_OF_STUDY: &str = "N/A";

    /// Instructor label when no review names one.
    pub const INSTRUCTOR: &str = "Various";

    /// The sheet has no credits column; every course gets this value.
    pub const CREDITS: u32 = 3;

    /// The review form is anonymous.
    pub const REVIEWER_NAME: &str = "Anonymous";

    /// Column title holding the form submission time.
    pub const TIMESTAMP_COLUMN: &str = "Timestamp";

    /// Values that count as "absent" when picking course metadata.
    pub const PLACEHOLDERS: [&str; 3] = ["General", "0", "N/A"];
}

/// True when `value` is blank or one of the [`defaults::PLACEHOLDERS`],
/// ignoring ASCII case.
pub fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    value.is_empty()
        || defaults::PLACEHOLDERS
            .iter()
            .any(|p| p.eq_ignore_ascii_case(value))
}

// =============================================================================
// Review
// =============================================================================

/// Where a review's timestamp came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimestampSource {
    /// The spreadsheet's own `Timestamp` column.
    #[default]
    Sheet,
    /// No source value; stamped with the ingestion clock.
    Ingested,
}

/// A single student review, normalized from one spreadsheet row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEntry {
    /// `r-{row}-{millis}`; unique within one ingestion run only.
    pub id: String,
    /// Course-identity key (free-text course name). Never blank.
    pub course_id: String,
    pub reviewer_name: String,
    /// Easiness rating, 1..=5.
    pub rating: u8,
    pub teaching_method: String,
    pub exam_structure: String,
    pub leniency: String,
    pub grading_comments: String,
    pub extra_classes: String,
    pub comment: String,
    pub timestamp: String,
    #[serde(default)]
    pub timestamp_source: TimestampSource,
    pub year_of_study: String,
    pub section: String,
    pub department: String,
    #[serde(default)]
    pub instructor: String,
}

// =============================================================================
// Course
// =============================================================================

/// A course aggregated from every review sharing its course-identity key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CourseEntry {
    /// Same as `name` for live data.
    pub id: String,
    pub code: String,
    pub name: String,
    pub department: String,
    pub instructor: String,
    pub credits: u32,
    pub description: String,
    /// Mean of the member ratings, in [1, 5].
    pub average_rating: f64,
    /// `6 - average_rating`. An inverse-scale heuristic, not a measured
    /// quantity: the sheet only asks how easy a course is.
    pub difficulty: f64,
}

// =============================================================================
// Catalog
// =============================================================================

/// Courses and reviews produced by one ingestion run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogData {
    pub courses: Vec<CourseEntry>,
    pub reviews: Vec<ReviewEntry>,
    /// Clock time of the run; `None` for fixtures and failed runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingested_at: Option<DateTime<Utc>>,
}

impl CatalogData {
    /// The "nothing usable" result returned on fetch failure or sparse input.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty() && self.reviews.is_empty()
    }

    /// Reviews belonging to one course, in ingestion order.
    pub fn reviews_for(&self, course_id: &str) -> Vec<&ReviewEntry> {
        self.reviews.iter().filter(|r| r.course_id == course_id).collect()
    }

    pub fn course(&self, course_id: &str) -> Option<&CourseEntry> {
        self.courses.iter().find(|c| c.id == course_id)
    }
}
