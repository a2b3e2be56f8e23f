//! goszakup-morphology
//!
//! Rule-based Russian query expansion and relevance filtering.
//!
//! No crate in this workspace's ecosystem ships a Russian morphological
//! dictionary, so inflection is driven by a suffix-class table instead of a
//! dictionary-backed analyzer: it trades dictionary completeness for a
//! dependency-free, deterministic implementation. There is no degraded mode
//! to fall back from, so [`is_enabled`] always returns `true`.
#![warn(missing_docs)]

use serde::{Deserialize, Serialize};

/// Declension/conjugation suffix classes. Each entry is `(base_suffix,
/// other_forms)`; a word ending in `base_suffix` is assumed to belong to
/// that class and inflects to the listed forms by suffix substitution.
/// Ordered longest-suffix-first so a word matches its most specific class.
const SUFFIX_CLASSES: &[(&str, &[&str])] = &[
    ("ость", &["ость", "ости", "остью", "остям", "остями", "остях"]),
    ("ание", &["ание", "ания", "анию", "аниям", "аниями", "аниях"]),
    ("ение", &["ение", "ения", "ению", "ениям", "ениями", "ениях"]),
    ("ний", &["ний", "няя", "нее", "ние", "него", "ней", "ним", "них"]),
    ("ние", &["ние", "ния", "нию", "ниям", "ниями", "ниях"]),
    ("ие", &["ие", "ия", "ий", "иям", "иями", "иях"]),
    ("ия", &["ия", "ие", "ий", "иям", "иями", "иях"]),
    ("ый", &["ый", "ая", "ое", "ые", "ого", "ой", "ым", "ых"]),
    ("ой", &["ой", "ая", "ое", "ые", "ого", "ым", "ых"]),
    ("ая", &["ая", "ый", "ое", "ые", "ого", "ой", "ым", "ых"]),
    ("а", &["а", "ы", "у", "ой", "е", "ам", "ами", "ах"]),
    ("я", &["я", "и", "ю", "ей", "е", "ям", "ями", "ях"]),
];

/// Maximum surface forms returned per token, per the "up to 10" contract.
const MAX_FORMS_PER_TOKEN: usize = 10;
/// Maximum expanded queries returned per [`expand`] call.
const MAX_EXPANDED_QUERIES: usize = 15;
/// Tokens shorter than this are dropped before expansion/matching.
const MIN_TOKEN_LEN: usize = 2;

fn is_purely_numeric(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
}

fn is_purely_latin(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_alphabetic())
}

/// True if `token` should participate in expansion/relevance matching.
fn is_significant(token: &str) -> bool {
    token.chars().count() >= MIN_TOKEN_LEN
        && !is_purely_numeric(token)
        && !is_purely_latin(token)
}

/// Surface forms to inflect a single lower-cased word into: the word itself
/// plus, if it matches a known suffix class, the other forms in that class.
/// Falls back to `[word]` when no class matches, mirroring the legacy
/// source's undictionaried-word behavior.
#[must_use]
pub fn get_word_forms(word: &str) -> Vec<String> {
    let word = word.to_lowercase();
    let mut forms = vec![word.clone()];

    if let Some((suffix, others)) = SUFFIX_CLASSES
        .iter()
        .find(|(suffix, _)| word.len() > suffix.len() + 1 && word.ends_with(suffix))
    {
        let stem = &word[..word.len() - suffix.len()];
        for other in *others {
            let form = format!("{stem}{other}");
            if !forms.contains(&form) {
                forms.push(form);
            }
            if forms.len() >= MAX_FORMS_PER_TOKEN {
                break;
            }
        }
    }

    forms.truncate(MAX_FORMS_PER_TOKEN);
    forms
}

/// Tokens from `query` worth inflecting/matching on, in original order.
fn significant_tokens(query: &str) -> Vec<&str> {
    query.split_whitespace().filter(|t| is_significant(t)).collect()
}

/// Result of expanding a query into morphological variants.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MorphologyAnalysis {
    /// Candidate query strings to try upstream, most specific first.
    pub expanded_queries: Vec<String>,
}

/// Expand `query` into morphological variants worth trying upstream.
///
/// Builds: the trimmed original, each significant token alone, and the
/// original with exactly one token replaced by one of its inflected forms.
/// Sorted by token count descending, then lexicographically; capped at 15.
#[must_use]
pub fn expand(query: &str) -> MorphologyAnalysis {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return MorphologyAnalysis::default();
    }

    let all_tokens: Vec<&str> = trimmed.split_whitespace().collect();
    let mut candidates: Vec<String> = Vec::new();
    let mut seen = std::collections::HashSet::new();

    let mut push = |candidates: &mut Vec<String>, seen: &mut std::collections::HashSet<String>, s: String| {
        if seen.insert(s.clone()) {
            candidates.push(s);
        }
    };

    push(&mut candidates, &mut seen, trimmed.to_string());

    for (i, token) in all_tokens.iter().enumerate() {
        if !is_significant(token) {
            continue;
        }
        push(&mut candidates, &mut seen, (*token).to_string());

        for variant in get_word_forms(token) {
            if variant == token.to_lowercase() {
                continue;
            }
            let mut rewritten = all_tokens.clone();
            rewritten[i] = variant.as_str();
            push(&mut candidates, &mut seen, rewritten.join(" "));
        }
    }

    candidates.sort_by(|a, b| {
        let a_words = a.split_whitespace().count();
        let b_words = b.split_whitespace().count();
        b_words.cmp(&a_words).then_with(|| a.cmp(b))
    });
    candidates.truncate(MAX_EXPANDED_QUERIES);

    MorphologyAnalysis {
        expanded_queries: candidates,
    }
}

/// True iff any morphological variant of any significant token in
/// `original_query` appears as a substring of `text`, case-folded.
#[must_use]
pub fn is_relevant(text: &str, original_query: &str) -> bool {
    let text_cf = text.to_lowercase();
    significant_tokens(original_query)
        .into_iter()
        .any(|token| get_word_forms(token).iter().any(|v| text_cf.contains(v)))
}

/// Always `true`: the suffix-rule fallback is this engine's only mode, not
/// a degraded path, so there is no "unavailable" state to report.
#[must_use]
pub const fn is_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_includes_trimmed_original_and_caps_at_fifteen() {
        let analysis = expand("  поставка цемента строительного  ");
        assert!(analysis.expanded_queries.contains(&"поставка цемента строительного".to_string()));
        assert!(analysis.expanded_queries.len() <= 15);
    }

    #[test]
    fn expand_on_empty_query_is_empty() {
        let analysis = expand("   ");
        assert!(analysis.expanded_queries.is_empty());
    }

    #[test]
    fn expand_drops_numeric_and_latin_tokens_from_single_token_candidates() {
        let analysis = expand("12345 abc цемент");
        assert!(analysis.expanded_queries.contains(&"цемент".to_string()));
        assert!(!analysis.expanded_queries.contains(&"12345".to_string()));
        assert!(!analysis.expanded_queries.contains(&"abc".to_string()));
    }

    #[test]
    fn get_word_forms_inflects_known_suffix_class() {
        let forms = get_word_forms("краска");
        assert!(forms.contains(&"краска".to_string()));
        assert!(forms.contains(&"краски".to_string()));
        assert!(forms.len() <= 10);
    }

    #[test]
    fn get_word_forms_falls_back_to_original_for_unknown_suffix() {
        let forms = get_word_forms("xyz");
        assert_eq!(forms, vec!["xyz".to_string()]);
    }

    #[test]
    fn is_relevant_matches_an_inflected_surface_form() {
        assert!(is_relevant("Краски и лаки для стен", "лак"));
    }

    #[test]
    fn is_relevant_false_when_no_variant_present() {
        assert!(!is_relevant("Поставка бумаги офисной", "цемент"));
    }

    #[test]
    fn is_enabled_is_always_true() {
        assert!(is_enabled());
    }
}
