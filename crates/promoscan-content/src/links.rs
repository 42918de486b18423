// SPDX-FileCopyrightText: 2026 Promoscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Link extraction from message text.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Candidate spans: an explicit scheme or a bare `www.` prefix. The
/// `www.` form is captured so it can be rejected uniformly below rather
/// than half-matching into the URL validator.
static CANDIDATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:[a-z][a-z0-9+.-]*://|www\.)[^\s<>"'`]+"#).expect("static regex")
});

/// Characters commonly stuck to the end of a URL in prose. Closing
/// parentheses are handled separately so path components like
/// `/Promo_(sale)` keep theirs.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ']', '"', '\''];

/// Extracts well-formed URLs from `text`, deduplicated, preserving
/// first-seen order.
///
/// A candidate qualifies only if it parses to a URL with both a scheme
/// and a host component; bare `www.` candidates and schemes without a
/// host (`mailto:`) are discarded.
pub fn extract_links(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for found in CANDIDATE_RE.find_iter(text) {
        let candidate = trim_trailing(found.as_str());
        let Ok(parsed) = Url::parse(candidate) else {
            continue;
        };
        if !parsed.has_host() {
            continue;
        }
        if seen.insert(candidate.to_string()) {
            links.push(candidate.to_string());
        }
    }

    links
}

/// Strips prose punctuation from the end of a candidate. A trailing `)`
/// is stripped only while it is unbalanced, so a parenthesis that closes
/// one inside the URL survives.
fn trim_trailing(candidate: &str) -> &str {
    let mut rest = candidate;
    while let Some(last) = rest.chars().next_back() {
        let strip = match last {
            ')' => {
                rest.matches(')').count() > rest.matches('(').count()
            }
            other => TRAILING_PUNCTUATION.contains(&other),
        };
        if !strip {
            break;
        }
        rest = &rest[..rest.len() - last.len_utf8()];
    }
    rest
}
