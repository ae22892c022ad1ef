//! Tier A entity pattern matching (spec §4.2). Grounded on
//! `original_source/packages/extraction/tier_a/patterns.py`'s
//! per-entity-type compiled-regex design, but the merge algorithm is
//! corrected per spec §4.2: matches across ALL entity types are sorted
//! globally by descending length then ascending start before the
//! non-overlap filter runs, instead of resolving overlaps one entity type
//! at a time in whatever order a `dict` happens to iterate.

use regex::{escape, Regex, RegexBuilder};

/// A single accepted, non-overlapping pattern match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    pub entity_type: String,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Case-insensitive exact-string matcher over a set of named entity-type
/// vocabularies (service names, IPs, ports, ...). One process-wide instance
/// per document corpus; cheap to clone the compiled patterns since they're
/// rebuilt only when `add_patterns` is called.
pub struct EntityPatternMatcher {
    compiled: Vec<(String, Regex)>,
}

impl EntityPatternMatcher {
    pub fn new() -> Self {
        Self { compiled: Vec::new() }
    }

    /// Adds (or replaces) the pattern set for `entity_type`. Patterns are
    /// escaped literals, not regex syntax — callers pass known entity
    /// strings (service names, hostnames), not arbitrary regex.
    pub fn add_patterns(&mut self, entity_type: impl Into<String>, patterns: &[String]) {
        let entity_type = entity_type.into();
        if patterns.is_empty() {
            return;
        }
        let mut sorted: Vec<&String> = patterns.iter().collect();
        sorted.sort_by_key(|p| std::cmp::Reverse(p.len()));
        let alternation = sorted.iter().map(|p| escape(p)).collect::<Vec<_>>().join("|");
        let regex = RegexBuilder::new(&alternation)
            .case_insensitive(true)
            .build()
            .expect("escaped literal alternation is always a valid regex");

        self.compiled.retain(|(t, _)| t != &entity_type);
        self.compiled.push((entity_type, regex));
    }

    /// Finds every pattern match in `text`, applying spec §4.2's global
    /// sort-merge: candidates across all entity types are collected, sorted
    /// by `(-length, start)`, and accepted greedily skipping any whose span
    /// is fully contained in an already-accepted one. A candidate that only
    /// partially overlaps an accepted span (not nested inside it) is kept.
    /// The final list is sorted by start position for callers that need
    /// reading order.
    pub fn find_matches(&self, text: &str) -> Vec<PatternMatch> {
        if text.is_empty() {
            return Vec::new();
        }

        let mut candidates: Vec<PatternMatch> = Vec::new();
        for (entity_type, pattern) in &self.compiled {
            for m in pattern.find_iter(text) {
                candidates.push(PatternMatch {
                    entity_type: entity_type.clone(),
                    text: m.as_str().to_string(),
                    start: m.start(),
                    end: m.end(),
                });
            }
        }

        candidates.sort_by(|a, b| {
            let len_a = a.end - a.start;
            let len_b = b.end - b.start;
            len_b.cmp(&len_a).then(a.start.cmp(&b.start))
        });

        let mut accepted: Vec<PatternMatch> = Vec::new();
        for candidate in candidates {
            let nested = accepted
                .iter()
                .any(|a| candidate.start >= a.start && candidate.end <= a.end);
            if !nested {
                accepted.push(candidate);
            }
        }

        accepted.sort_by_key(|m| m.start);
        accepted
    }
}

impl Default for EntityPatternMatcher {
    fn default() -> Self {
        Self::new()
    }
}
