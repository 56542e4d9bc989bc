//! Shared normalization functions for catalog search and display ordering.
//!
//! `normalize` turns any cell into a comparable key. `custom_sort` orders
//! strings the way a library browser lists them: A, a, B, b, ... before
//! anything else.

use std::cmp::Ordering;

use crate::models::Value;

/// Joins list items before whitespace stripping. It is a control character, so
/// it can never appear in an export, and it is not whitespace, so stripping
/// leaves it in place.
const LIST_SEPARATOR: char = '\u{1F}';

// ============================================================================
// NORMALIZATION
// ============================================================================

/// Normalize a cell value into a comparable key.
///
/// - `Null` becomes the empty string.
/// - Lists and sets are joined, and each item boundary becomes one space.
/// - All other whitespace is removed.
/// - The result is lower-cased unless `case_sensitive` is set.
pub fn normalize(value: &Value, case_sensitive: bool) -> String {
    let joined = match value {
        Value::Null => return String::new(),
        Value::Text(s) => s.clone(),
        Value::List(items) => join_items(items.iter().map(String::as_str)),
        Value::Set(items) => join_items(items.iter().map(String::as_str)),
        other => other.to_string(),
    };
    finish(&joined, case_sensitive)
}

/// Scalar form of [`normalize`].
pub fn normalize_text(s: &str, case_sensitive: bool) -> String {
    finish(s, case_sensitive)
}

fn join_items<'a>(items: impl Iterator<Item = &'a str>) -> String {
    let mut joined = String::new();
    for (i, item) in items.enumerate() {
        if i > 0 {
            joined.push(LIST_SEPARATOR);
        }
        joined.push_str(item);
    }
    joined
}

fn finish(s: &str, case_sensitive: bool) -> String {
    let stripped: String = s
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == LIST_SEPARATOR { ' ' } else { c })
        .collect();
    if case_sensitive {
        stripped
    } else {
        stripped.to_lowercase()
    }
}

// ============================================================================
// CUSTOM ORDERING
// ============================================================================

/// Rank offset for characters outside the Latin alphabet, so that every
/// letter rank (0..52) comes first.
const NON_LETTER_OFFSET: u32 = 52;

/// Sort key that interleaves upper and lower case letters (A, a, B, b, ...)
/// ahead of every other character, which keeps its code point order.
pub fn custom_sort_key(s: &str) -> Vec<u32> {
    s.chars()
        .map(|c| match c {
            'A'..='Z' => (c as u32 - 'A' as u32) * 2,
            'a'..='z' => (c as u32 - 'a' as u32) * 2 + 1,
            other => NON_LETTER_OFFSET + other as u32,
        })
        .collect()
}

/// Sort strings by [`custom_sort_key`]. Missing values always end up last,
/// whatever the direction.
pub fn custom_sort(values: Vec<Option<String>>, ascending: bool) -> Vec<Option<String>> {
    let (mut present, missing): (Vec<_>, Vec<_>) = values.into_iter().partition(Option::is_some);

    present.sort_by(|a, b| {
        let ord = custom_cmp(a.as_deref().unwrap_or_default(), b.as_deref().unwrap_or_default());
        if ascending {
            ord
        } else {
            ord.reverse()
        }
    });

    present.into_iter().chain(missing).collect()
}

/// Compare two strings by [`custom_sort_key`].
pub fn custom_cmp(a: &str, b: &str) -> Ordering {
    custom_sort_key(a).cmp(&custom_sort_key(b))
}

// ============================================================================
// TESTS
// ============================================================================
