//! Batch separators
//!
//! A special token searcher only ever sees text that lies outside every
//! lexical range, so separators inside strings or comments never match.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use super::parser::BatchKind;

static GO_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*GO(?:\s+(\d+))?\s*$").expect("Failed to compile GO pattern")
});

/// A separator found in a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialToken {
    /// Absolute index of the token in the line
    pub index: usize,
    pub length: usize,
    /// Kind of the batch the token terminates
    pub kind: BatchKind,
    /// The token text belongs to the batch it terminates
    pub keep_in_batch: bool,
}

pub trait SpecialTokenSearcher: Send + fmt::Debug {
    /// Find the first separator in `line[start..end]`.
    ///
    /// The slice is text outside any range; `start == 0` and
    /// `end == line.len()` together mean the whole line is plain text.
    fn find(&mut self, line: &str, start: usize, end: usize) -> Option<SpecialToken>;
}

/// `GO [count]` alone on a line, optionally followed by a `--` comment
#[derive(Debug, Default)]
pub struct GoSearcher;

impl SpecialTokenSearcher for GoSearcher {
    fn find(&mut self, line: &str, start: usize, end: usize) -> Option<SpecialToken> {
        if start != 0 || (end != line.len() && !line[end..].starts_with("--")) {
            return None;
        }

        let captures = GO_PATTERN.captures(&line[..end])?;
        // A count that overflows or is zero still separates, once
        let count = captures
            .get(1)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .filter(|count| *count > 0)
            .unwrap_or(1);

        Some(SpecialToken {
            index: 0,
            length: line.len(),
            kind: BatchKind::SeparatorWithRepeatCount(count),
            keep_in_batch: false,
        })
    }
}

#[derive(Debug, Default)]
pub struct SemicolonSearcher;

impl SpecialTokenSearcher for SemicolonSearcher {
    fn find(&mut self, line: &str, start: usize, end: usize) -> Option<SpecialToken> {
        line[start..end].find(';').map(|i| SpecialToken {
            index: start + i,
            length: 1,
            kind: BatchKind::Statement,
            keep_in_batch: false,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Opener {
    Block,
    Case,
}

/// Progress through a `CREATE ...` header at the start of a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Header {
    /// Still reading the first words of the statement
    Start,
    AfterCreate,
    AfterType,
    /// Header recognised or ruled out
    Done,
}

/// Semicolon separator that keeps PL/SQL blocks whole
///
/// Semicolons split statements only when no `BEGIN .. END` block is open
/// and no `DECLARE` section or routine header is waiting for its `BEGIN`.
/// A line holding only `/` always ends the current statement.
#[derive(Debug)]
pub struct OracleBlockSearcher {
    openers: Vec<Opener>,
    awaiting_begin: bool,
    contains_block: bool,
    header: Header,
}

impl Default for OracleBlockSearcher {
    fn default() -> Self {
        Self {
            openers: Vec::new(),
            awaiting_begin: false,
            contains_block: false,
            header: Header::Start,
        }
    }
}

impl OracleBlockSearcher {
    fn reset(&mut self) {
        *self = Self::default();
    }

    fn open_block(&mut self) {
        self.openers.push(Opener::Block);
        self.contains_block = true;
    }

    fn on_header_word(&mut self, word: &str) {
        self.header = match (self.header, word) {
            (Header::Start, "CREATE") => Header::AfterCreate,
            (Header::AfterCreate, "OR" | "REPLACE" | "EDITIONABLE" | "NONEDITIONABLE") => {
                Header::AfterCreate
            }
            (Header::AfterCreate, "PROCEDURE" | "FUNCTION" | "TRIGGER") => {
                self.awaiting_begin = true;
                self.contains_block = true;
                Header::Done
            }
            (Header::AfterCreate, "PACKAGE") => {
                self.open_block();
                Header::Done
            }
            (Header::AfterCreate, "TYPE") => Header::AfterType,
            (Header::AfterType, "BODY") => {
                self.open_block();
                Header::Done
            }
            _ => Header::Done,
        };
    }

    /// Returns true when `following` belongs to this word, as in `END IF`
    fn on_word(&mut self, word: &str, following: Option<&str>) -> bool {
        let word = word.to_ascii_uppercase();

        if self.header != Header::Done {
            self.on_header_word(&word);
        }

        match word.as_str() {
            "DECLARE" => {
                self.awaiting_begin = true;
                self.contains_block = true;
            }
            "BEGIN" => {
                self.awaiting_begin = false;
                self.open_block();
            }
            "CASE" => self.openers.push(Opener::Case),
            "END" => {
                let closes = following.map(|w| w.to_ascii_uppercase());
                return match closes.as_deref() {
                    Some("IF" | "LOOP") => true,
                    Some("CASE") => {
                        self.openers.pop();
                        true
                    }
                    _ => {
                        self.openers.pop();
                        false
                    }
                };
            }
            _ => {}
        }

        false
    }
}

fn is_word_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '#')
}

/// Word starting at `index`, and the index just past it
fn word_at(text: &str, index: usize) -> (&str, usize) {
    let end = text[index..]
        .char_indices()
        .find(|(_, c)| !is_word_char(*c))
        .map(|(i, _)| index + i)
        .unwrap_or(text.len());
    (&text[index..end], end)
}

/// First word after `index` when only whitespace separates them
fn next_word(text: &str, index: usize) -> Option<(&str, usize)> {
    let rest = text[index..].trim_start();
    let offset = text.len() - rest.len();
    rest.chars()
        .next()
        .filter(|c| is_word_start(*c))
        .map(|_| word_at(text, offset))
}

impl SpecialTokenSearcher for OracleBlockSearcher {
    fn find(&mut self, line: &str, start: usize, end: usize) -> Option<SpecialToken> {
        if start == 0 && end == line.len() && line.trim() == "/" {
            self.reset();
            return Some(SpecialToken {
                index: 0,
                length: line.len(),
                kind: BatchKind::Statement,
                keep_in_batch: false,
            });
        }

        let segment = &line[..end];
        let mut index = start;
        let mut previous: Option<char> = if start > 0 {
            line[..start].chars().next_back()
        } else {
            None
        };

        while index < end {
            let Some(c) = segment[index..].chars().next() else {
                break;
            };

            if c == ';' && self.openers.is_empty() && !self.awaiting_begin {
                let keep_in_batch = self.contains_block;
                self.reset();
                return Some(SpecialToken {
                    index,
                    length: 1,
                    kind: BatchKind::Statement,
                    keep_in_batch,
                });
            }

            if is_word_start(c) && !previous.map(is_word_char).unwrap_or(false) {
                let (word, mut after) = word_at(segment, index);
                // qualified names such as `t.end` or `pkg.begin` are not keywords
                if previous == Some('.') {
                    previous = segment[..after].chars().next_back();
                    index = after;
                    continue;
                }
                let following = next_word(segment, after);
                if self.on_word(word, following.map(|(w, _)| w)) {
                    if let Some((_, end_of_next)) = following {
                        after = end_of_next;
                    }
                }
                previous = segment[..after].chars().next_back();
                index = after;
                continue;
            }

            previous = Some(c);
            index += c.len_utf8();
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find_all(searcher: &mut dyn SpecialTokenSearcher, line: &str) -> Option<SpecialToken> {
        searcher.find(line, 0, line.len())
    }

    #[test]
    fn test_go_with_and_without_count() {
        let mut go = GoSearcher;

        assert_eq!(
            find_all(&mut go, "GO").map(|t| t.kind),
            Some(BatchKind::SeparatorWithRepeatCount(1))
        );
        assert_eq!(
            find_all(&mut go, "  go 5 ").map(|t| t.kind),
            Some(BatchKind::SeparatorWithRepeatCount(5))
        );
        assert!(find_all(&mut go, "GOTO label").is_none());
        assert!(find_all(&mut go, "SELECT 1 GO").is_none());
        // The trailing comment is swallowed with the separator
        let token = go.find("GO 2 -- twice", 0, 5).unwrap();
        assert_eq!(token.kind, BatchKind::SeparatorWithRepeatCount(2));
        assert_eq!(token.length, 13);
        assert!(go.find("GO /* x */", 0, 3).is_none());
        // Only part of the line is plain text
        assert!(go.find("GO", 0, 1).is_none());
    }

    #[test]
    fn test_semicolon() {
        let mut semicolon = SemicolonSearcher;
        let token = semicolon.find("SELECT 1; SELECT 2", 3, 18).unwrap();
        assert_eq!(token.index, 8);
        assert!(!token.keep_in_batch);
    }

    #[test]
    fn test_oracle_splits_plain_statements() {
        let mut oracle = OracleBlockSearcher::default();
        let token = find_all(&mut oracle, "SELECT 1 FROM dual;").unwrap();
        assert_eq!(token.index, 18);
        assert!(!token.keep_in_batch);
    }

    #[test]
    fn test_oracle_ignores_semicolons_inside_blocks() {
        let mut oracle = OracleBlockSearcher::default();

        assert!(find_all(&mut oracle, "BEGIN").is_none());
        assert!(find_all(&mut oracle, "  IF x THEN y := 1; END IF;").is_none());
        assert!(find_all(&mut oracle, "  z := CASE WHEN a THEN 1 END;").is_none());
        assert!(find_all(&mut oracle, "  CASE z WHEN 1 THEN NULL; END CASE;").is_none());

        let token = find_all(&mut oracle, "END;").unwrap();
        assert_eq!(token.index, 3);
        assert!(token.keep_in_batch);
    }

    #[test]
    fn test_oracle_routine_header_waits_for_begin() {
        let mut oracle = OracleBlockSearcher::default();

        assert!(find_all(&mut oracle, "CREATE OR REPLACE PROCEDURE p AS").is_none());
        assert!(find_all(&mut oracle, "  v NUMBER;").is_none());
        assert!(find_all(&mut oracle, "BEGIN NULL; END p;").is_some());
    }

    #[test]
    fn test_oracle_slash_line_ends_statement() {
        let mut oracle = OracleBlockSearcher::default();
        assert!(find_all(&mut oracle, "CREATE FUNCTION f RETURN NUMBER AS LANGUAGE JAVA NAME 'x';").is_none());
        assert!(find_all(&mut oracle, "/").is_some());
        assert!(find_all(&mut oracle, "SELECT 1 FROM dual;").is_some());
    }

    #[test]
    fn test_oracle_identifiers_containing_keywords() {
        let mut oracle = OracleBlockSearcher::default();
        let token = find_all(&mut oracle, "SELECT begin_date, end_date FROM t;").unwrap();
        assert_eq!(token.index, 34);
    }

    #[test]
    fn test_oracle_qualified_names_are_not_keywords() {
        let mut oracle = OracleBlockSearcher::default();
        let line = "SELECT t.begin, pkg.end FROM t;";
        let token = find_all(&mut oracle, line).unwrap();
        assert_eq!(token.index, line.len() - 1);
        assert!(!token.keep_in_batch);

        assert!(find_all(&mut oracle, "BEGIN").is_none());
        assert!(find_all(&mut oracle, "  x := r.case + s.end;").is_none());
        assert!(find_all(&mut oracle, "END;").unwrap().keep_in_batch);
    }
}
