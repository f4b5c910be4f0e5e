//! Age-update detection heuristic.
//!
//! Reproduced exactly for behavior compatibility, false positives
//! included: "age" is matched as a literal substring (so "average"
//! triggers it), and the first standalone 1-3 digit run anywhere in the
//! sentence wins. Do not strengthen without confirming intent.

use std::sync::OnceLock;

use regex::Regex;

/// Keywords that signal update intent.
const UPDATE_KEYWORDS: [&str; 3] = ["update", "change", "set"];

/// Plausible age range: (0, 120].
const MAX_AGE: u32 = 120;

fn age_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(\d{1,3})\b").expect("static regex"))
}

/// Best-effort heuristic: does this question ask to set the patient's age,
/// and to what value?
///
/// Requires the substring "age", one of the update keywords, and a
/// standalone 1-3 digit number in (0, 120]. Returns `None` otherwise.
pub fn detect_age_update(question: &str) -> Option<u32> {
    let q_lower = question.to_lowercase();

    if !q_lower.contains("age") {
        return None;
    }

    if !UPDATE_KEYWORDS.iter().any(|kw| q_lower.contains(kw)) {
        return None;
    }

    let captures = age_number_re().captures(&q_lower)?;
    let age_val: u32 = captures.get(1)?.as_str().parse().ok()?;

    if age_val == 0 || age_val > MAX_AGE {
        return None;
    }

    Some(age_val)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_update_request_is_detected() {
        assert_eq!(detect_age_update("please update my age to 45"), Some(45));
        assert_eq!(detect_age_update("Set the patient's age to 67."), Some(67));
        assert_eq!(detect_age_update("change age: 30"), Some(30));
    }

    #[test]
    fn question_without_update_keyword_is_ignored() {
        assert_eq!(detect_age_update("what is my age"), None);
        assert_eq!(detect_age_update("how old is the patient, age-wise?"), None);
    }

    #[test]
    fn question_without_age_substring_is_ignored() {
        assert_eq!(detect_age_update("update the dose to 40"), None);
    }

    #[test]
    fn dosage_substring_false_positive() {
        // "dosage" contains "age".
        assert_eq!(detect_age_update("update the dosage to 40"), Some(40));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert_eq!(detect_age_update("set age to 200"), None);
        assert_eq!(detect_age_update("set age to 121"), None);
        assert_eq!(detect_age_update("set age to 0"), None);
        // Upper bound is inclusive.
        assert_eq!(detect_age_update("set age to 120"), Some(120));
    }

    #[test]
    fn no_number_means_no_detection() {
        assert_eq!(detect_age_update("please update the age"), None);
    }

    #[test]
    fn digits_embedded_in_longer_numbers_do_not_match() {
        // "2025" is four digits; the first standalone 1-3 digit run wins.
        assert_eq!(detect_age_update("update age recorded in 2025 to 45"), Some(45));
        assert_eq!(detect_age_update("update age recorded in 2025"), None);
    }

    #[test]
    fn first_number_wins() {
        assert_eq!(detect_age_update("update age to 45 or maybe 50"), Some(45));
    }

    // Known false positives of the literal-substring heuristic, kept for
    // behavior compatibility. Flagged, not fixed.

    #[test]
    fn average_substring_false_positive() {
        assert_eq!(detect_age_update("change average to 10"), Some(10));
    }

    #[test]
    fn unrelated_update_with_age_word_false_positive() {
        assert_eq!(
            detect_age_update("I am 45 years old, please update my address"),
            None,
            "'address' does not contain 'age'; only the substring match can misfire"
        );
        assert_eq!(
            detect_age_update("I am 45 years old, please update my webpage"),
            Some(45),
            "'webpage' contains 'age' and the first number wins"
        );
    }
}
