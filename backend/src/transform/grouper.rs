//! Group reviews into courses.
//!
//! ```text
//! Reviews (one per form answer)       →  Courses (one per course name)
//! ┌──────────────────────────────┐       ┌──────────────────────────────┐
//! │ CS101, rating 5, dept "CS"   │       │ CS101  avg 4.0  difficulty 2 │
//! │ CS101, rating 3, dept ""     │  →    │        dept CSE              │
//! │ MA201, rating 4              │       ├──────────────────────────────┤
//! └──────────────────────────────┘       │ MA201  avg 4.0  difficulty 2 │
//!                                        └──────────────────────────────┘
//! ```
//!
//! Grouping is exact, case-sensitive string equality on the course name:
//! "ML" and "Machine Learning" stay separate courses. Output order is the
//! order in which course names first appear.

use std::collections::HashMap;

use super::canon::canonical_department;
use crate::models::{defaults, is_placeholder, CourseEntry, ReviewEntry};

/// Drop reviews without a course name, then build one course per name.
///
/// Returns `(courses, kept_reviews)`.
pub fn aggregate(reviews: Vec<ReviewEntry>) -> (Vec<CourseEntry>, Vec<ReviewEntry>) {
    let reviews: Vec<ReviewEntry> = reviews
        .into_iter()
        .filter(|r| !r.course_id.trim().is_empty())
        .collect();

    let courses = reviews_to_courses(&reviews);
    (courses, reviews)
}

/// Build courses from reviews that all carry a course name.
pub fn reviews_to_courses(reviews: &[ReviewEntry]) -> Vec<CourseEntry> {
    let mut order: Vec<CourseBuilder> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for review in reviews {
        let i = *positions.entry(review.course_id.as_str()).or_insert_with(|| {
            order.push(CourseBuilder::new(&review.course_id));
            order.len() - 1
        });
        order[i].add_review(review);
    }

    order.into_iter().map(CourseBuilder::build).collect()
}

/// Accumulates one course's reviews.
struct CourseBuilder {
    name: String,
    rating_sum: u32,
    rating_count: u32,
    department: Option<String>,
    instructor: Option<String>,
}

impl CourseBuilder {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rating_sum: 0,
            rating_count: 0,
            department: None,
            instructor: None,
        }
    }

    fn add_review(&mut self, review: &ReviewEntry) {
        self.rating_sum += review.rating as u32;
        self.rating_count += 1;

        if self.department.is_none() && !is_placeholder(&review.department) {
            self.department = Some(review.department.clone());
        }
        if self.instructor.is_none() && !is_placeholder(&review.instructor) {
            self.instructor = Some(review.instructor.trim().to_string());
        }
    }

    fn build(self) -> CourseEntry {
        let average_rating = if self.rating_count == 0 {
            defaults::RATING as f64
        } else {
            self.rating_sum as f64 / self.rating_count as f64
        };

        let code = self
            .name
            .split_whitespace()
            .next()
            .map(str::to_uppercase)
            .unwrap_or_else(|| self.name.clone());

        CourseEntry {
            id: self.name.clone(),
            code,
            department: canonical_department(self.department.as_deref().unwrap_or("")),
            instructor: self
                .instructor
                .unwrap_or_else(|| defaults::INSTRUCTOR.to_string()),
            credits: defaults::CREDITS,
            description: format!("Feedback aggregation for {}.", self.name),
            average_rating,
            difficulty: 6.0 - average_rating,
            name: self.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimestampSource;

    fn review(course: &str, rating: u8, department: &str, instructor: &str) -> ReviewEntry {
        ReviewEntry {
            id: format!("r-{}", course),
            course_id: course.to_string(),
            reviewer_name: "Anonymous".to_string(),
            rating,
            teaching_method: String::new(),
            exam_structure: String::new(),
            leniency: String::new(),
            grading_comments: String::new(),
            extra_classes: String::new(),
            comment: String::new(),
            timestamp: String::new(),
            timestamp_source: TimestampSource::Sheet,
            year_of_study: "N/A".to_string(),
            section: String::new(),
            department: department.to_string(),
            instructor: instructor.to_string(),
        }
    }

    #[test]
    fn test_average_and_difficulty() {
        let (courses, _) = aggregate(vec![
            review("CS101", 5, "CSE", ""),
            review("CS101", 3, "General", ""),
            review("CS101", 4, "General", ""),
        ]);

        assert_eq!(courses.len(), 1);
        assert!((courses[0].average_rating - 4.0).abs() < 1e-9);
        assert!((courses[0].difficulty - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_first_seen_order() {
        let (courses, _) = aggregate(vec![
            review("Zoology", 3, "", ""),
            review("Algebra", 3, "", ""),
            review("Zoology", 3, "", ""),
        ]);
        let names: Vec<&str> = courses.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Zoology", "Algebra"]);
    }

    #[test]
    fn test_blank_course_names_discarded() {
        let (courses, reviews) = aggregate(vec![
            review("", 1, "CSE", ""),
            review("   ", 1, "CSE", ""),
            review("CS101", 5, "CSE", ""),
        ]);

        assert_eq!(reviews.len(), 1);
        assert_eq!(courses.len(), 1);
        assert!((courses[0].average_rating - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let (courses, _) = aggregate(vec![review("ML", 4, "", ""), review("ml", 2, "", "")]);
        assert_eq!(courses.len(), 2);
    }

    #[test]
    fn test_metadata_skips_placeholders() {
        let (courses, _) = aggregate(vec![
            review("Digital Circuits", 3, "General", "0"),
            review("Digital Circuits", 3, "N/A", ""),
            review("Digital Circuits", 3, "Electrical Engineering", "Dr. Tesla"),
            review("Digital Circuits", 3, "CSE", "Dr. Other"),
        ]);

        assert_eq!(courses[0].department, "Electrical Engineering");
        assert_eq!(courses[0].instructor, "Dr. Tesla");
    }

    #[test]
    fn test_defaults_when_nothing_found() {
        let (courses, _) = aggregate(vec![review("Linear Algebra", 4, "General", "")]);
        let course = &courses[0];

        assert_eq!(course.department, "General");
        assert_eq!(course.instructor, "Various");
        assert_eq!(course.credits, 3);
        assert_eq!(course.code, "LINEAR");
        assert_eq!(course.id, "Linear Algebra");
        assert_eq!(course.description, "Feedback aggregation for Linear Algebra.");
    }
}
