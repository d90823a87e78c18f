//! Canonicalizers mapping free-text answers onto small vocabularies.
//!
//! Both functions are total and pure. [`canonical_department`] is idempotent.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::defaults;

/// Ordinal and cardinal year-of-study answers accepted verbatim.
static YEAR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(1st|2nd|3rd|4th|first|second|third|fourth|freshman|sophomore|junior|senior|year\s*[1-4]|[1-4]\s*year|yr\s*[1-4]|[1-4])$",
    )
    .expect("year pattern is a valid regex")
});

/// Longest answer still accepted on the strength of containing a digit.
const MAX_LOOSE_YEAR_LEN: usize = 10;

/// Merge department spellings ("cs", "Computer Science", "humanity", ...)
/// into one label each. Unknown departments are title-cased word by word,
/// keeping the original spacing.
pub fn canonical_department(dept: &str) -> String {
    let titled = title_case(dept);
    let d = titled.trim().to_lowercase();

    if d.is_empty() {
        return defaults::DEPARTMENT.to_string();
    }
    if d == "cs" || d == "cse" || d.contains("computer science") {
        return "CSE".to_string();
    }
    if d.contains("humanit") {
        return "Humanities".to_string();
    }
    if d.contains("mech") {
        return "Mechanical Engineering".to_string();
    }
    if d.contains("elect") || d == "ee" || d == "eee" {
        return "Electrical Engineering".to_string();
    }

    titled
}

/// Keep answers that look like a year of study, reject conversational noise.
///
/// - blank or `n/a` → `N/A`
/// - a bare digit 1-4 → `Year {digit}`
/// - a whitelisted year expression → echoed, first letter capitalized
/// - anything of at most ten characters containing a digit 1-4 → echoed
/// - everything else → `N/A`
///
/// Echoes are the trimmed, lower-cased answer.
pub fn validate_year(text: &str) -> String {
    let normalized = text.trim().to_lowercase();

    if normalized.is_empty() || normalized == "n/a" {
        return defaults::YEAR_OF_STUDY.to_string();
    }

    if let Some(digit) = bare_year_digit(&normalized) {
        return format!("Year {}", digit);
    }

    if YEAR_PATTERN.is_match(&normalized) {
        return capitalize_first(&normalized);
    }

    let has_year_digit = normalized.chars().any(|c| ('1'..='4').contains(&c));
    if has_year_digit && normalized.chars().count() <= MAX_LOOSE_YEAR_LEN {
        return capitalize_first(&normalized);
    }

    defaults::YEAR_OF_STUDY.to_string()
}

fn bare_year_digit(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if ('1'..='4').contains(&c) => Some(c),
        _ => None,
    }
}

/// Upper-case the first character, leave the rest untouched.
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Title-case each space-separated word, preserving the spaces.
fn title_case(text: &str) -> String {
    text.split(' ')
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };

    let upper: String = first.to_uppercase().collect();
    // Multi-char expansions (ß → SS) would not survive a second pass
    let mut out = if upper.chars().count() == 1 {
        upper
    } else {
        first.to_string()
    };
    out.push_str(&chars.as_str().to_lowercase());
    out
}
