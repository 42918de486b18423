// SPDX-FileCopyrightText: 2026 Promoscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded-length description synthesis.
//!
//! Pattern heuristics, not comprehension: a structured discount phrase is
//! attempted first, then a keyword/channel fallback, then a plain
//! truncation of the text. Every branch feeds through the same final
//! length bound, so the result never exceeds `max_len` characters.

use std::sync::LazyLock;

use regex::Regex;

/// Discount token, optional sale word, optional on/for connector,
/// product phrase, and a required deadline clause.
static DISCOUNT_WITH_DEADLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\d{1,3}\s?%|\$\s?\d+(?:[.,]\d{2})?)\s*(?:\b(?:off|discount|sale|скидк\w*)\b)?\s*(?:\b(?:on|for|на)\b)?\s*(?:\b(?:all|все|всю|весь)\b)?\s*([^,.!?\n]+?)\s+\b(?:until|till|before|by|до)\b\s+([^,.!?\n]+)",
    )
    .expect("static regex")
});

/// Same shape without the deadline clause.
static DISCOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\d{1,3}\s?%|\$\s?\d+(?:[.,]\d{2})?)\s*(?:\b(?:off|discount|sale|скидк\w*)\b)?\s*(?:\b(?:on|for|на)\b)?\s*(?:\b(?:all|все|всю|весь)\b)?\s*([^,.!?\n]+)",
    )
    .expect("static regex")
});

/// Synthesizes a human-readable summary of a promotional message.
///
/// Priority order: structured discount pattern (attempted for the
/// matched keywords, first success wins), then `"<Keyword> from
/// <channel_label>"`, then a straight truncation of `text`. Always
/// terminates, never errors, and the result is at most `max_len`
/// characters.
pub fn synthesize(
    text: &str,
    matched_keywords: &[String],
    channel_label: &str,
    max_len: usize,
) -> String {
    if !matched_keywords.is_empty() {
        if let Some(structured) = structured_description(text) {
            return bound(structured, max_len);
        }
        // Keyword fallback: matched_keywords is non-empty here, so the
        // first keyword (in set order) names the promotion.
        let keyword = capitalize(&matched_keywords[0]);
        return bound(format!("{keyword} from {channel_label}"), max_len);
    }

    // Defensive fallback: the filter gate should make this unreachable.
    bound(text.to_string(), max_len)
}

/// Tries the structured discount pattern, deadline form first.
fn structured_description(text: &str) -> Option<String> {
    if let Some(caps) = DISCOUNT_WITH_DEADLINE.captures(text) {
        let discount = caps[1].trim();
        let product = caps[2].trim();
        let deadline = caps[3].trim();
        return Some(format!("{discount} on {product} until {deadline}"));
    }

    DISCOUNT.captures(text).map(|caps| {
        let discount = caps[1].trim().to_string();
        let product = caps[2].trim().to_string();
        format!("{discount} on {product}")
    })
}

/// Unconditional final truncation: above `max_len` characters, cut to
/// `max_len - 3` and append an ellipsis marker.
fn bound(description: String, max_len: usize) -> String {
    if description.chars().count() <= max_len {
        return description;
    }
    let cut: String = description.chars().take(max_len.saturating_sub(3)).collect();
    format!("{cut}...")
}

/// Upper-cases the first character, leaving the rest as-is.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
