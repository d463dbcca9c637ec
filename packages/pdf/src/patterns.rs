//! Named content predicates shared by the extractors.
//!
//! Every heuristic that classifies a cell or line by its content (date,
//! amount, bare number, person name, case number) lives here so it can be
//! tested on its own.

use std::sync::LazyLock;

use regex::Regex;

/// `YYYY.MM.DD` with `.`, `-` or whitespace separators and optional padding.
static DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{4}\s*[.\-\s]\s*\d{1,2}\s*[.\-\s]\s*\d{1,2}").unwrap_or_else(|_| unreachable!())
});

static ONLY_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").unwrap_or_else(|_| unreachable!()));

static KOREAN_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[가-힣]{2,4}$").unwrap_or_else(|_| unreachable!()));

static CASE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}타경\d+").unwrap_or_else(|_| unreachable!()));

/// Returns the first date-shaped substring of `text`.
#[must_use]
pub fn find_date(text: &str) -> Option<&str> {
    DATE.find(text).map(|m| m.as_str())
}

/// Whether `text` contains a date-shaped substring.
#[must_use]
pub fn is_date_like(text: &str) -> bool {
    DATE.is_match(text)
}

/// Whether `text` (after trimming) is made only of ASCII digits.
#[must_use]
pub fn is_only_number(text: &str) -> bool {
    ONLY_NUMBER.is_match(text.trim())
}

/// Whether `text` looks like a 2–4 syllable Hangul personal name.
#[must_use]
pub fn is_korean_name(text: &str) -> bool {
    KOREAN_NAME.is_match(text.trim())
}

/// Returns the first court case number (`2024타경1234`) in `text`.
#[must_use]
pub fn find_case_number(text: &str) -> Option<&str> {
    CASE_NUMBER.find(text).map(|m| m.as_str())
}

/// Removes thousands separators from an amount.
#[must_use]
pub fn strip_separators(amount: &str) -> String {
    amount.replace(',', "")
}

/// Removes every whitespace character. Labels in scanned documents are
/// spaced inconsistently (`작성 일자` vs `작성일자`).
#[must_use]
pub fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Whether `haystack` contains any of `needles`.
#[must_use]
pub fn contains_any<S: AsRef<str>>(haystack: &str, needles: &[S]) -> bool {
    needles.iter().any(|n| haystack.contains(n.as_ref()))
}
