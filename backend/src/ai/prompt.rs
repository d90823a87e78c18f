//! Prompt construction for course summaries and questions.
//!
//! Both prompts ask for plain text; the advisor still strips markdown
//! characters from whatever comes back.

use crate::models::{CourseEntry, ReviewEntry};

/// One review block inside the summary prompt.
fn review_block(review: &ReviewEntry) -> String {
    format!(
        r#"
    [Easiness: {rating}/5]
    Teaching Method: {teaching}
    Exam Structure: {exam}
    Leniency: {leniency}
    Grading Comments: {grading}
    Extra Classes: {extra}
    General Feedback: {comment}
  "#,
        rating = review.rating,
        teaching = review.teaching_method,
        exam = review.exam_structure,
        leniency = review.leniency,
        grading = review.grading_comments,
        extra = review.extra_classes,
        comment = review.comment,
    )
}

/// Prompt asking for a synthesis of every review of `course`.
pub fn summary_prompt(course: &CourseEntry, reviews: &[&ReviewEntry]) -> String {
    let reviews_text = reviews
        .iter()
        .map(|r| review_block(r))
        .collect::<Vec<_>>()
        .join("\n---\n");

    format!(
        r#"
    You are an academic analysis tool. Summarize these student reviews for "{name}".

    IMPORTANT:
    1. DO NOT use any markdown formatting characters.
    2. DO NOT use asterisks (*) for bolding or bullet points.
    3. DO NOT use hash symbols (#) for headers.
    4. Use plain text only. Use capital letters for headers and simple dashes (-) for lists.

    Data from multiple students:
    {reviews_text}

    Provide a concise synthesis covering:
    1. COMMON TEACHING STYLE: How do instructors usually deliver this course?
    2. EXAM & GRADING INSIGHT: What is the paper pattern and is grading generally fair or harsh?
    3. LOGISTICS: Mention if extra classes are common.
    4. VERDICT: Overall student sentiment.

    Be direct and professional.
  "#,
        name = course.name,
        reviews_text = reviews_text,
    )
}

/// Condensed one-line-per-review context for questions.
pub fn question_context(reviews: &[&ReviewEntry]) -> String {
    reviews
        .iter()
        .map(|r| {
            format!(
                "Teaching: {}. Exam: {}. Grading: {}. General: {}",
                r.teaching_method, r.exam_structure, r.grading_comments, r.comment
            )
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Prompt answering `question` strictly from the reviews of `course`.
pub fn question_prompt(question: &str, course: &CourseEntry, reviews: &[&ReviewEntry]) -> String {
    format!(
        r#"
    Student Question: "{question}"
    Context for "{name}": {context}

    IMPORTANT: Provide a plain text answer. DO NOT use markdown characters like * or #.

    Answer the student's question based strictly on the provided feedback. If not mentioned, state that information is unavailable.
  "#,
        question = question,
        name = course.name,
        context = question_context(reviews),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fallback_catalog;

    #[test]
    fn test_summary_prompt_carries_every_review() {
        let data = fallback_catalog();
        let course = data.course("2").unwrap();
        let reviews = data.reviews_for("2");

        let prompt = summary_prompt(course, &reviews);
        assert!(prompt.contains("\"Machine Learning Foundations\""));
        assert!(prompt.contains("[Easiness: 5/5]"));
        assert!(prompt.contains("[Easiness: 4/5]"));
        assert!(prompt.contains("Optional weekend review sessions."));
        assert_eq!(prompt.matches("\n---\n").count(), 1);
    }

    #[test]
    fn test_question_prompt() {
        let data = fallback_catalog();
        let course = data.course("4").unwrap();
        let reviews = data.reviews_for("4");

        let prompt = question_prompt("Is there a lot of homework?", course, &reviews);
        assert!(prompt.contains("Student Question: \"Is there a lot of homework?\""));
        assert!(prompt.contains("Context for \"Linear Algebra\": Teaching: Traditional whiteboard lectures."));
        assert!(!question_context(&reviews).contains(" | "));
    }

    #[test]
    fn test_question_context_joins_reviews() {
        let data = fallback_catalog();
        let context = question_context(&data.reviews_for("2"));
        assert_eq!(context.matches(" | ").count(), 1);
    }
}
