//! Whole-word text corrections.
//!
//! Corrections are matched against a Unicode-aware tokenization of the text
//! rather than compiled into a pattern, so the word being replaced never
//! needs escaping. A word character is anything regex `\w` accepts in Unicode
//! mode, which includes combining marks: Tamil vowel signs and the virama
//! stay inside their word.

use crate::models::{Report, WordChange};
use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

fn word_pattern() -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    WORD.get_or_init(|| Regex::new(r"\w+").expect("Invalid word regex"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Word,
    Gap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    kind: TokenKind,
    span: Range<usize>,
}

/// Split `text` into alternating runs of word and non-word characters.
fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut last = 0;

    for m in word_pattern().find_iter(text) {
        if m.start() > last {
            tokens.push(Token {
                kind: TokenKind::Gap,
                span: last..m.start(),
            });
        }
        tokens.push(Token {
            kind: TokenKind::Word,
            span: m.range(),
        });
        last = m.end();
    }

    if last < text.len() {
        tokens.push(Token {
            kind: TokenKind::Gap,
            span: last..text.len(),
        });
    }

    tokens
}

/// Byte ranges of the word tokens of a text, in order.
struct WordMap {
    words: Vec<Range<usize>>,
}

impl WordMap {
    fn new(text: &str) -> Self {
        Self {
            words: tokenize(text)
                .into_iter()
                .filter(|t| t.kind == TokenKind::Word)
                .map(|t| t.span)
                .collect(),
        }
    }

    /// Whether the character starting at byte `pos` is a word character.
    fn is_word_at(&self, pos: usize) -> bool {
        let idx = self.words.partition_point(|r| r.end <= pos);
        self.words.get(idx).is_some_and(|r| r.contains(&pos))
    }
}

/// Replace every case-insensitive, whole-word occurrence of `original_word`.
///
/// A match may not continue a word on either side. Edges of `original_word`
/// that are not word characters match literally. An empty `original_word`
/// leaves the text unchanged.
pub fn apply_correction(text: &str, original_word: &str, replacement_word: &str) -> String {
    let needle = original_word.trim();
    if needle.is_empty() {
        return text.to_string();
    }

    let needle_tokens = tokenize(needle);
    let starts_with_word = needle_tokens
        .first()
        .is_some_and(|t| t.kind == TokenKind::Word);
    let ends_with_word = needle_tokens
        .last()
        .is_some_and(|t| t.kind == TokenKind::Word);

    let words = WordMap::new(text);
    let mut output = String::with_capacity(text.len());
    let mut copied = 0;
    let mut cursor = 0;

    while cursor < text.len() {
        if let Some(end) = match_at(text, cursor, needle) {
            let clean_start = !starts_with_word
                || previous_char_start(text, cursor).map_or(true, |p| !words.is_word_at(p));
            let clean_end = !ends_with_word || end == text.len() || !words.is_word_at(end);

            if clean_start && clean_end {
                output.push_str(&text[copied..cursor]);
                output.push_str(replacement_word);
                copied = end;
                cursor = end;
                continue;
            }
        }

        cursor += text[cursor..].chars().next().map_or(1, char::len_utf8);
    }

    output.push_str(&text[copied..]);
    output
}

/// Apply a list of changes in order.
pub fn apply_all(text: &str, changes: &[WordChange]) -> String {
    changes.iter().fold(text.to_string(), |current, change| {
        apply_correction(&current, &change.original_word, &change.replacement_word)
    })
}

/// Changes suggested by a report: the first suggestion for every misspelled
/// word, then every vocabulary replacement. No-op changes are dropped.
pub fn collect_changes(report: &Report) -> Vec<WordChange> {
    let mut changes = Vec::new();

    if let Some(spelling) = report.spelling() {
        changes.extend(spelling.corrections.iter().filter_map(|c| {
            c.suggested_corrections.first().map(|suggestion| WordChange {
                original_word: c.original_word.clone(),
                replacement_word: suggestion.clone(),
            })
        }));
    }

    if let Some(vocabulary) = report.vocabulary() {
        changes.extend(vocabulary.applied_changes.iter().cloned());
    }

    changes.retain(|c| c.original_word.trim() != c.replacement_word.trim());
    changes
}

/// Case-insensitive match of `needle` at byte `start`; returns the end offset.
fn match_at(text: &str, start: usize, needle: &str) -> Option<usize> {
    let mut hay = text[start..].char_indices();

    for n in needle.chars() {
        let (_, h) = hay.next()?;
        if !chars_eq_ignore_case(h, n) {
            return None;
        }
    }

    Some(hay.next().map_or(text.len(), |(offset, _)| start + offset))
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

fn previous_char_start(text: &str, pos: usize) -> Option<usize> {
    text[..pos].char_indices().next_back().map(|(i, _)| i)
}
