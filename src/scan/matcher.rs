// src/scan/matcher.rs
// =============================================================================
// Finds every occurrence of every search term in a page's text.
//
// - Matching is case-insensitive and by substring ("brand" hits "Rebranded")
// - Each hit yields a snippet: up to 60 characters either side of the match,
//   cut from the original text (original casing), then trimmed
// - After a hit at position i, the search resumes at i + term length
// - Terms that never occur are simply missing from the result
//
// Positions are counted in characters, not bytes. Lowercasing can change how
// many characters a letter takes ('İ' lowercases to two), so the lowercase
// copy keeps a map back to positions in the original text.
// =============================================================================

use serde::{Deserialize, Serialize};

/// Characters of context kept on each side of a match.
pub const SNIPPET_RADIUS: usize = 60;

/// All snippets found for one term, in text order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermMatches {
    pub term: String,
    pub snippets: Vec<String>,
}

// Lowercased text plus, for each lowercased char, the index of the original
// char it came from.
struct LowercaseView {
    chars: Vec<char>,
    origin: Vec<usize>,
}

impl LowercaseView {
    fn new(original: &[char]) -> Self {
        let mut chars = Vec::with_capacity(original.len());
        let mut origin = Vec::with_capacity(original.len());
        for (index, c) in original.iter().enumerate() {
            for lower in c.to_lowercase() {
                chars.push(lower);
                origin.push(index);
            }
        }
        Self { chars, origin }
    }

    fn find(&self, needle: &[char], from: usize) -> Option<usize> {
        if from >= self.chars.len() || needle.len() > self.chars.len() - from {
            return None;
        }
        self.chars[from..]
            .windows(needle.len())
            .position(|window| window == needle)
            .map(|offset| offset + from)
    }
}

/// Searches `text` for each of `terms`.
///
/// Output keeps the order of `terms`. A term listed twice gets its snippets
/// collected twice under one entry.
pub fn search_terms(text: &str, terms: &[String]) -> Vec<TermMatches> {
    let original: Vec<char> = text.chars().collect();
    let view = LowercaseView::new(&original);

    let mut results: Vec<TermMatches> = Vec::new();

    for term in terms {
        let needle: Vec<char> = term.chars().flat_map(char::to_lowercase).collect();
        if needle.is_empty() {
            continue;
        }
        let term_len = term.chars().count();

        let mut snippets = Vec::new();
        let mut from = 0;
        while let Some(index) = view.find(&needle, from) {
            let start = view.origin[index];
            let window_start = start.saturating_sub(SNIPPET_RADIUS);
            let window_end = (start + term_len + SNIPPET_RADIUS).min(original.len());

            let snippet: String = original[window_start..window_end].iter().collect();
            snippets.push(snippet.trim().to_string());

            from = index + needle.len();
        }

        if snippets.is_empty() {
            continue;
        }
        match results.iter_mut().find(|existing| existing.term == *term) {
            Some(existing) => existing.snippets.extend(snippets),
            None => results.push(TermMatches {
                term: term.clone(),
                snippets,
            }),
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_case_insensitive_match_keeps_original_case() {
        let text = "...the OldBrand system...";
        let results = search_terms(text, &terms(&["oldbrand"]));

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].term, "oldbrand");
        assert_eq!(results[0].snippets, vec!["...the OldBrand system..."]);
    }

    #[test]
    fn test_snippet_window_is_bounded() {
        let left = "a".repeat(100);
        let right = "b".repeat(100);
        let text = format!("{}Brand{}", left, right);

        let results = search_terms(&text, &terms(&["brand"]));
        let snippet = &results[0].snippets[0];

        assert_eq!(snippet, &format!("{}Brand{}", "a".repeat(60), "b".repeat(60)));
    }

    #[test]
    fn test_snippet_is_trimmed() {
        let text = format!("{} Brand {}", "x".repeat(59), "y".repeat(10));
        let results = search_terms(&text, &terms(&["Brand"]));
        // Short enough that the window covers the whole text
        assert_eq!(results[0].snippets[0], text);

        let results = search_terms("   Brand   ", &terms(&["brand"]));
        assert_eq!(results[0].snippets[0], "Brand");
    }

    #[test]
    fn test_every_occurrence_is_reported() {
        let text = "Acme here, acme there, ACME everywhere";
        let results = search_terms(text, &terms(&["acme"]));
        assert_eq!(results[0].snippets.len(), 3);
    }

    #[test]
    fn test_search_resumes_after_the_match() {
        // "aa" in "aaaa" is found at 0 and 2, not at 1 or 3
        let results = search_terms("aaaa", &terms(&["aa"]));
        assert_eq!(results[0].snippets.len(), 2);

        let results = search_terms("aaa", &terms(&["aa"]));
        assert_eq!(results[0].snippets.len(), 1);
    }

    #[test]
    fn test_substring_not_word_match() {
        let results = search_terms("We rebranded last year", &terms(&["brand"]));
        assert_eq!(results[0].snippets, vec!["We rebranded last year"]);
    }

    #[test]
    fn test_missing_terms_are_absent() {
        let results = search_terms("Nothing to see", &terms(&["OldBrand", "see"]));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].term, "see");
    }

    #[test]
    fn test_term_order_is_preserved() {
        let results = search_terms("beta alpha", &terms(&["alpha", "beta"]));
        let order: Vec<_> = results.iter().map(|r| r.term.as_str()).collect();
        assert_eq!(order, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_empty_term_never_matches() {
        assert!(search_terms("anything", &terms(&[""])).is_empty());
        assert!(search_terms("", &terms(&["x"])).is_empty());
    }

    #[test]
    fn test_multibyte_text() {
        let text = "Café Ünïcode — OldBrand — naïve";
        let results = search_terms(text, &terms(&["oldbrand"]));
        assert_eq!(results[0].snippets, vec![text.to_string()]);
    }

    #[test]
    fn test_lowercase_expansion_keeps_alignment() {
        // 'İ' lowercases to two chars; the snippet must still start at the
        // right place in the original text.
        let text = format!("İİİ{}Brand", "z".repeat(70));
        let results = search_terms(&text, &terms(&["brand"]));
        assert_eq!(results[0].snippets[0], format!("{}Brand", "z".repeat(60)));
    }
}
