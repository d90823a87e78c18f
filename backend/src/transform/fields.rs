//! Field map: which sheet columns feed which review field.
//!
//! Each [`Field`] has a [`FieldSpec`] listing candidate title fragments in
//! priority order and, optionally, a column index that is tried first. The
//! built-in map matches the review form's current wording; a JSON file can
//! override any subset of fields without touching code.
//!
//! ```json
//! {
//!   "fields": {
//!     "course": { "fragments": ["nameofthecourse", "course"] },
//!     "department": { "fragments": ["department"], "column": 9 }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ConfigResult;
use crate::models::defaults;

/// Review attributes resolved from a sheet row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Course,
    Department,
    Rating,
    YearOfStudy,
    TeachingMethod,
    ExamStructure,
    Leniency,
    GradingComments,
    ExtraClasses,
    Comment,
    Section,
    Instructor,
}

impl Field {
    pub const ALL: [Field; 12] = [
        Field::Course,
        Field::Department,
        Field::Rating,
        Field::YearOfStudy,
        Field::TeachingMethod,
        Field::ExamStructure,
        Field::Leniency,
        Field::GradingComments,
        Field::ExtraClasses,
        Field::Comment,
        Field::Section,
        Field::Instructor,
    ];

    /// Value a review ends up with when nothing usable is found.
    ///
    /// An empty course means the review is discarded; an empty instructor
    /// makes the course fall back to [`defaults::INSTRUCTOR`].
    pub fn default_value(&self) -> String {
        match self {
            Field::Rating => defaults::RATING.to_string(),
            Field::Department => defaults::DEPARTMENT.to_string(),
            Field::YearOfStudy => defaults::YEAR_OF_STUDY.to_string(),
            _ => String::new(),
        }
    }

    fn builtin_spec(&self) -> FieldSpec {
        let (fragments, column): (&[&str], Option<usize>) = match self {
            Field::Course => (
                &["nameofthecourse", "course", "subject", "title", "coursename", "whichcourse"],
                None,
            ),
            // Column J holds the department answer regardless of its title
            Field::Department => (&["department", "dept", "chooseyourdepartment"], Some(9)),
            Field::Rating => (
                &["howeasyisthecourse", "gradingisfair", "easiness", "rating", "easy", "difficulty"],
                None,
            ),
            Field::YearOfStudy => (
                &[
                    "currentyearofstudy",
                    "year",
                    "batch",
                    "class",
                    "studyyear",
                    "whichyearareyouin",
                    "youryear",
                ],
                None,
            ),
            Field::TeachingMethod => (
                &["methodofteaching", "teachingstyle", "instruction", "teaching"],
                None,
            ),
            Field::ExamStructure => (
                &["examstructure", "paperpattern", "assessments", "exam"],
                None,
            ),
            Field::Leniency => (
                &["leniencyofcourse", "strictness", "gradingleniency", "leniency"],
                None,
            ),
            Field::GradingComments => (
                &[
                    "additionalcommentsaboutthegrading",
                    "gradingpattern",
                    "gradingdetails",
                    "remarks",
                    "paperpattern",
                ],
                None,
            ),
            Field::ExtraClasses => (&["extraclasses", "additionalclasses", "extra"], None),
            Field::Comment => (
                &["anythingyouwannasayaboutthecourse", "feedback", "generalcomments", "comment"],
                None,
            ),
            Field::Section => (&["section", "group", "div", "batch"], None),
            Field::Instructor => (
                &["instructor", "professor", "teacher", "faculty", "taughtby", "proff"],
                None,
            ),
        };

        FieldSpec {
            fragments: fragments.iter().map(|s| s.to_string()).collect(),
            column,
        }
    }
}

/// How to find one field in a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Title fragments, highest priority first.
    pub fragments: Vec<String>,

    /// Column index tried before any title matching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

/// Field specs keyed by field. Fields missing from the map use the
/// built-in spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMap {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub fields: BTreeMap<Field, FieldSpec>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl FieldMap {
    /// The built-in map with every field spelled out.
    pub fn builtin() -> Self {
        Self {
            version: default_version(),
            fields: Field::ALL.iter().map(|f| (*f, f.builtin_spec())).collect(),
        }
    }

    /// Parse a (possibly partial) map from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load an override file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(Self::from_json(&content)?)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Spec for `field`, falling back to the built-in one.
    pub fn spec(&self, field: Field) -> FieldSpec {
        self.fields
            .get(&field)
            .cloned()
            .unwrap_or_else(|| field.builtin_spec())
    }
}

impl Default for FieldMap {
    fn default() -> Self {
        Self::builtin()
    }
}
