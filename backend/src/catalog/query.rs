//! Filtering and ordering of the course list.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::models::{defaults, CourseEntry};

/// Course list orderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortKey {
    /// Highest easiness first.
    #[default]
    #[serde(rename = "rating_desc")]
    EasinessDesc,
    #[serde(rename = "difficulty_asc")]
    DifficultyAsc,
    #[serde(rename = "difficulty_desc")]
    DifficultyDesc,
    #[serde(rename = "dept_asc")]
    DepartmentAsc,
    #[serde(rename = "name_asc")]
    NameAsc,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::EasinessDesc,
        SortKey::DifficultyAsc,
        SortKey::DifficultyDesc,
        SortKey::DepartmentAsc,
        SortKey::NameAsc,
    ];

    /// Wire name, as accepted by `?sort=` and `--sort`.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::EasinessDesc => "rating_desc",
            SortKey::DifficultyAsc => "difficulty_asc",
            SortKey::DifficultyDesc => "difficulty_desc",
            SortKey::DepartmentAsc => "dept_asc",
            SortKey::NameAsc => "name_asc",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::EasinessDesc => "Highest Easiness",
            SortKey::DifficultyAsc => "Lowest Difficulty",
            SortKey::DifficultyDesc => "Highest Difficulty",
            SortKey::DepartmentAsc => "By Department",
            SortKey::NameAsc => "A - Z",
        }
    }

    fn compare(&self, a: &CourseEntry, b: &CourseEntry) -> Ordering {
        match self {
            SortKey::EasinessDesc => b.average_rating.total_cmp(&a.average_rating),
            SortKey::DifficultyAsc => a.difficulty.total_cmp(&b.difficulty),
            SortKey::DifficultyDesc => b.difficulty.total_cmp(&a.difficulty),
            SortKey::DepartmentAsc => text_order(&a.department, &b.department),
            SortKey::NameAsc => text_order(&a.name, &b.name),
        }
    }
}

/// Case-insensitive, ties broken by the raw text.
fn text_order(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s.trim())
            .ok_or_else(|| {
                let known: Vec<&str> = SortKey::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown sort key '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

/// Search, department filter and ordering over a course list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseQuery {
    /// Case-insensitive match against name, code and instructor.
    pub search: String,
    /// Exact department; empty matches all.
    pub department: String,
    pub sort: SortKey,
}

impl CourseQuery {
    pub fn matches(&self, course: &CourseEntry) -> bool {
        let needle = self.search.trim().to_lowercase();
        let matches_search = needle.is_empty()
            || course.name.to_lowercase().contains(&needle)
            || course.code.to_lowercase().contains(&needle)
            || course.instructor.to_lowercase().contains(&needle);

        let matches_department =
            self.department.is_empty() || course.department == self.department;

        matches_search && matches_department
    }

    /// Filter then sort. The sort is stable, so equal keys keep catalog order.
    pub fn apply<'a>(&self, courses: &'a [CourseEntry]) -> Vec<&'a CourseEntry> {
        let mut selected: Vec<&CourseEntry> =
            courses.iter().filter(|c| self.matches(c)).collect();
        selected.sort_by(|a, b| self.sort.compare(a, b));
        selected
    }

    /// Back to "everything, easiest first".
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Distinct departments for the filter selector, without the "General"
/// catch-all, sorted.
pub fn departments(courses: &[CourseEntry]) -> Vec<String> {
    let mut names: Vec<String> = courses
        .iter()
        .map(|c| c.department.clone())
        .filter(|d| !d.is_empty() && d != defaults::DEPARTMENT)
        .collect();
    names.sort();
    names.dedup();
    names
}
