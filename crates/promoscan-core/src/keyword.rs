// SPDX-FileCopyrightText: 2026 Promoscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword filtering.
//!
//! Matching is case-insensitive, untokenized substring containment:
//! "sale" matches inside "resale". This is deliberately preserved for
//! compatibility with existing result sets even though it admits false
//! positives; do not upgrade to word-boundary matching without changing
//! the persisted contract.

/// An ordered set of lower-cased search terms, static for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    terms: Vec<String>,
}

impl KeywordSet {
    /// Builds a keyword set, lower-casing, trimming, and dropping empty
    /// or duplicate terms while preserving first-seen order.
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = Vec::new();
        for term in terms {
            let lowered = term.as_ref().trim().to_lowercase();
            if !lowered.is_empty() && !seen.contains(&lowered) {
                seen.push(lowered);
            }
        }
        Self { terms: seen }
    }

    /// Returns the terms found in `haystack`, in set order.
    ///
    /// The haystack is lower-cased here so callers can pass display-cased
    /// text directly.
    pub fn matches(&self, haystack: &str) -> Vec<String> {
        let hay = haystack.to_lowercase();
        self.terms
            .iter()
            .filter(|term| hay.contains(term.as_str()))
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}
