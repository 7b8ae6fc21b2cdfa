//! Longest-first whole-word term matching.
//!
//! Each term is applied in index order to a working copy of the text; every
//! hit is swapped for a placeholder token built only from private-use code
//! points. Those are not word characters, so later (shorter) terms can
//! neither match inside a claimed span nor see a word boundary that crosses
//! into one. A final pass resolves the tokens back into segments.

use std::cmp::Reverse;

use glossa_types::Term;
use regex::{Captures, Regex, RegexBuilder};

const PH_OPEN: char = '\u{E000}';
const PH_CLOSE: char = '\u{E001}';
const PH_DIGIT_BASE: u32 = 0xE010;

fn is_placeholder_char(c: char) -> bool {
    matches!(c as u32, 0xE000..=0xE001 | 0xE010..=0xE019)
}

fn encode_slot(slot: usize) -> String {
    let mut token = String::new();
    token.push(PH_OPEN);
    for digit in slot.to_string().bytes() {
        // digit is b'0'..=b'9'
        token.push(char::from_u32(PH_DIGIT_BASE + u32::from(digit - b'0')).unwrap_or(PH_CLOSE));
    }
    token.push(PH_CLOSE);
    token
}

/// A term plus its compiled matcher. `pattern` is `None` for terms that can
/// never match (empty word).
#[derive(Debug)]
struct IndexedTerm {
    term: Term,
    pattern: Option<Regex>,
}

/// One match in the original text, byte offsets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermMatch {
    /// Position of the term in the index
    pub term: usize,
    pub start: usize,
    pub end: usize,
    pub surface: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Term { index: usize, surface: String },
}

/// Enabled terms, longest word first, original order kept among equals
#[derive(Debug, Default)]
pub struct TermIndex {
    entries: Vec<IndexedTerm>,
}

impl TermIndex {
    pub fn build(terms: impl IntoIterator<Item = Term>, default_case_sensitive: bool) -> Self {
        let mut terms: Vec<Term> = terms
            .into_iter()
            .filter(|t| t.enabled)
            .map(|mut t| {
                // order and pattern must both see the trimmed word
                let trimmed = t.word.trim();
                if trimmed.len() != t.word.len() {
                    t.word = trimmed.to_string();
                }
                t
            })
            .collect();
        // Vec::sort_by_key is stable
        terms.sort_by_key(|t| Reverse(t.word_len()));

        let entries = terms
            .into_iter()
            .map(|term| {
                let case_sensitive = term.case_sensitive.unwrap_or(default_case_sensitive);
                let pattern = compile(&term.word, case_sensitive);
                if pattern.is_none() {
                    tracing::warn!("Term '{}' has no usable word, it will never match", term.id);
                }
                IndexedTerm { term, pattern }
            })
            .collect::<Vec<_>>();

        tracing::debug!("Built term index with {} terms", entries.len());
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Term> {
        self.entries.get(index).map(|e| &e.term)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Term> {
        self.terms().find(|t| t.id == id)
    }

    /// Terms in match order
    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.entries.iter().map(|e| &e.term)
    }

    /// Splits `text` into plain runs and term hits
    pub fn segments(&self, text: &str) -> Vec<Segment> {
        self.resolve(text)
            .into_iter()
            .map(|piece| match piece {
                Piece::Text(text) => Segment::Text(text),
                Piece::Term(m) => Segment::Term {
                    index: m.term,
                    surface: m.surface,
                },
            })
            .collect()
    }

    /// Non-overlapping matches in text order
    pub fn find_matches(&self, text: &str) -> Vec<TermMatch> {
        self.resolve(text)
            .into_iter()
            .filter_map(|piece| match piece {
                Piece::Term(m) => Some(m),
                Piece::Text(_) => None,
            })
            .collect()
    }

    fn resolve(&self, text: &str) -> Vec<Piece> {
        if text.is_empty() {
            return vec![];
        }
        if self.is_empty() || text.chars().any(is_placeholder_char) {
            return vec![Piece::Text(text.to_string())];
        }

        let mut slots: Vec<(usize, String)> = Vec::new();
        let mut working = text.to_string();

        for (index, entry) in self.entries.iter().enumerate() {
            let Some(pattern) = &entry.pattern else {
                continue;
            };
            if !pattern.is_match(&working) {
                continue;
            }
            working = pattern
                .replace_all(&working, |caps: &Captures| {
                    let slot = slots.len();
                    slots.push((index, caps[0].to_string()));
                    encode_slot(slot)
                })
                .into_owned();
        }

        if slots.is_empty() {
            return vec![Piece::Text(text.to_string())];
        }

        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut offset = 0;
        let mut chars = working.chars();

        while let Some(c) = chars.next() {
            if c != PH_OPEN {
                literal.push(c);
                continue;
            }

            let mut slot = 0usize;
            for digit in chars.by_ref() {
                if digit == PH_CLOSE {
                    break;
                }
                slot = slot * 10 + (digit as u32 - PH_DIGIT_BASE) as usize;
            }

            if !literal.is_empty() {
                offset += literal.len();
                pieces.push(Piece::Text(std::mem::take(&mut literal)));
            }

            if let Some((term, surface)) = slots.get(slot) {
                let start = offset;
                offset += surface.len();
                pieces.push(Piece::Term(TermMatch {
                    term: *term,
                    start,
                    end: offset,
                    surface: surface.clone(),
                }));
            }
        }

        if !literal.is_empty() {
            pieces.push(Piece::Text(literal));
        }

        pieces
    }
}

enum Piece {
    Text(String),
    Term(TermMatch),
}

/// `\b<escaped word>\b`, or `None` when the word is blank
fn compile(word: &str, case_sensitive: bool) -> Option<Regex> {
    let word = word.trim();
    if word.is_empty() {
        return None;
    }

    let source = format!(r"\b{}\b", regex::escape(word));
    match RegexBuilder::new(&source)
        .case_insensitive(!case_sensitive)
        .build()
    {
        Ok(regex) => Some(regex),
        Err(e) => {
            tracing::warn!("Failed to compile matcher for '{}': {}", word, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(words: &[&str]) -> TermIndex {
        TermIndex::build(
            words
                .iter()
                .enumerate()
                .map(|(i, w)| Term::new(i.to_string(), *w, format!("def of {w}"))),
            false,
        )
    }

    fn surfaces(index: &TermIndex, text: &str) -> Vec<(String, String)> {
        index
            .find_matches(text)
            .into_iter()
            .map(|m| (index.get(m.term).unwrap().word.clone(), m.surface))
            .collect()
    }

    #[test]
    fn test_index_sorted_longest_first_and_stable() {
        let idx = index(&["cat", "machine", "dog", "machine learning", "ant"]);
        let words: Vec<&str> = idx.terms().map(|t| t.word.as_str()).collect();
        assert_eq!(words, ["machine learning", "machine", "cat", "dog", "ant"]);
    }

    #[test]
    fn test_padded_words_sort_by_trimmed_length() {
        let idx = index(&["machine learning", "machine            "]);
        let words: Vec<&str> = idx.terms().map(|t| t.word.as_str()).collect();
        assert_eq!(words, ["machine learning", "machine"]);
        assert_eq!(
            surfaces(&idx, "machine learning rocks"),
            vec![("machine learning".to_string(), "machine learning".to_string())]
        );
    }

    #[test]
    fn test_decomposed_word_matches_decomposed_text() {
        let idx = index(&["cafe\u{0301}"]);
        let matches = idx.find_matches("a cafe\u{0301} here");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].surface, "cafe\u{0301}");
        assert_eq!((matches[0].start, matches[0].end), (2, 8));
    }

    #[test]
    fn test_disabled_terms_are_dropped() {
        let idx = TermIndex::build(
            vec![
                Term::new("1", "alpha", "a"),
                Term::new("2", "beta", "b").disabled(),
            ],
            false,
        );
        assert_eq!(idx.len(), 1);
        assert!(idx.find_by_id("2").is_none());
        assert!(idx.find_matches("beta alpha").len() == 1);
    }

    #[test]
    fn test_longer_term_wins() {
        let idx = index(&["machine", "machine learning"]);
        assert_eq!(
            surfaces(&idx, "Machine learning beats a machine."),
            vec![
                ("machine learning".to_string(), "Machine learning".to_string()),
                ("machine".to_string(), "machine".to_string()),
            ]
        );
    }

    #[test]
    fn test_substring_terms_never_overlap() {
        let idx = index(&["cat", "category"]);
        let matches = idx.find_matches("A category of cat.");
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].surface, "category");
        assert_eq!((matches[0].start, matches[0].end), (2, 10));
        assert_eq!(matches[1].surface, "cat");
        assert!(matches[0].end <= matches[1].start);
    }

    #[test]
    fn test_whole_words_only() {
        let idx = index(&["art"]);
        assert!(idx.find_matches("start party artist").is_empty());
        assert_eq!(idx.find_matches("modern art, old art").len(), 2);
    }

    #[test]
    fn test_case_sensitivity() {
        let idx = TermIndex::build(
            vec![
                Term::new("1", "API", "Application Programming Interface").case_sensitive(true),
                Term::new("2", "rust", "a language"),
            ],
            false,
        );
        let found = surfaces(&idx, "the api and the API, Rust and RUST");
        assert_eq!(
            found,
            vec![
                ("API".to_string(), "API".to_string()),
                ("rust".to_string(), "Rust".to_string()),
                ("rust".to_string(), "RUST".to_string()),
            ]
        );

        let strict = TermIndex::build(vec![Term::new("2", "rust", "a language")], true);
        assert_eq!(strict.find_matches("Rust rust").len(), 1);
    }

    #[test]
    fn test_special_characters_are_literal() {
        let idx = index(&["node.js"]);
        assert_eq!(idx.find_matches("Use node.js today").len(), 1);
        assert!(idx.find_matches("Use nodexjs today").is_empty());
    }

    #[test]
    fn test_trailing_punctuation_misses_word_boundary() {
        // no boundary between '+' and ' ', so this never matches
        let idx = index(&["C++"]);
        assert!(idx.find_matches("I write C++ daily").is_empty());
    }

    #[test]
    fn test_empty_word_never_matches() {
        let idx = TermIndex::build(
            vec![Term::new("1", "", "nothing"), Term::new("2", "ok", "fine")],
            false,
        );
        assert_eq!(idx.len(), 2);
        assert_eq!(surfaces(&idx, "ok then"), vec![("ok".to_string(), "ok".to_string())]);
    }

    #[test]
    fn test_segments_rebuild_the_text() {
        let idx = index(&["API", "café"]);
        let text = "Le café sert une API, puis l'API.";
        let segments = idx.segments(text);
        let rebuilt: String = segments
            .iter()
            .map(|s| match s {
                Segment::Text(t) => t.as_str(),
                Segment::Term { surface, .. } => surface.as_str(),
            })
            .collect();
        assert_eq!(rebuilt, text);
        assert_eq!(
            segments
                .iter()
                .filter(|s| matches!(s, Segment::Term { .. }))
                .count(),
            3
        );

        let matches = idx.find_matches(text);
        for m in matches {
            assert_eq!(&text[m.start..m.end], m.surface);
        }
    }

    #[test]
    fn test_many_matches_use_multi_digit_slots() {
        let idx = index(&["go"]);
        let text = vec!["go"; 25].join(" ");
        let matches = idx.find_matches(&text);
        assert_eq!(matches.len(), 25);
        assert_eq!(matches[24].start, 24 * 3);
    }

    #[test]
    fn test_placeholder_code_points_in_input_are_left_alone() {
        let idx = index(&["API"]);
        let text = format!("API {PH_OPEN}");
        assert_eq!(idx.segments(&text), vec![Segment::Text(text.clone())]);
    }

    #[test]
    fn test_no_terms() {
        let idx = TermIndex::default();
        assert!(idx.find_matches("anything").is_empty());
        assert_eq!(idx.segments("x"), vec![Segment::Text("x".to_string())]);
        assert!(idx.segments("").is_empty());
    }
}
