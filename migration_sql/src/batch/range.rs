//! Lexical ranges
//!
//! A range is a span of script text that must not be scanned for batch
//! separators: string literals, quoted identifiers and comments. Each
//! dialect registers the range searchers that apply to it.

use std::fmt;
use std::sync::Arc;

/// Cursor over one line of a script
#[derive(Debug, Clone, Copy)]
pub struct LineReader<'a> {
    line: &'a str,
    index: usize,
}

impl<'a> LineReader<'a> {
    pub fn new(line: &'a str) -> Self {
        Self { line, index: 0 }
    }

    pub fn line(&self) -> &'a str {
        self.line
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Text from the cursor to the end of the line
    pub fn remaining(&self) -> &'a str {
        &self.line[self.index..]
    }

    pub fn is_at_end(&self) -> bool {
        self.index >= self.line.len()
    }

    pub fn seek(&mut self, index: usize) {
        self.index = index.min(self.line.len());
    }

    /// Absolute index of `pattern` at or after the cursor
    pub fn find(&self, pattern: &str) -> Option<usize> {
        self.remaining().find(pattern).map(|i| i + self.index)
    }
}

/// Result of looking for the end of an open range
pub enum EndCode {
    /// The range closes with an end code starting at this index
    Found(usize),
    /// Another range opens at this index before the current one closes
    Nested {
        index: usize,
        searcher: Arc<dyn RangeSearcher>,
    },
}

impl fmt::Debug for EndCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndCode::Found(index) => f.debug_tuple("Found").field(index).finish(),
            EndCode::Nested { index, .. } => f.debug_struct("Nested").field("index", index).finish(),
        }
    }
}

pub trait RangeSearcher: Send + Sync + fmt::Debug {
    fn start_code_length(&self) -> usize;

    fn end_code_length(&self) -> usize;

    /// Comment ranges are dropped when comments are stripped
    fn is_comment(&self) -> bool;

    /// Absolute index of the next start code at or after the cursor
    fn find_start_code(&self, reader: &LineReader<'_>) -> Option<usize>;

    /// Where the open range ends on this line, if it does
    fn find_end_code(&self, reader: &LineReader<'_>) -> Option<EndCode>;
}

/// Delimited range whose end code is escaped by doubling it, e.g. `'it''s'`
#[derive(Debug, Clone)]
pub struct DuplicateEscapedRange {
    start: String,
    end: String,
}

impl DuplicateEscapedRange {
    pub fn new(start: &str, end: &str) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
        }
    }
}

impl RangeSearcher for DuplicateEscapedRange {
    fn start_code_length(&self) -> usize {
        self.start.len()
    }

    fn end_code_length(&self) -> usize {
        self.end.len()
    }

    fn is_comment(&self) -> bool {
        false
    }

    fn find_start_code(&self, reader: &LineReader<'_>) -> Option<usize> {
        reader.find(&self.start)
    }

    fn find_end_code(&self, reader: &LineReader<'_>) -> Option<EndCode> {
        let line = reader.line();
        let mut cursor = *reader;

        loop {
            let index = cursor.find(&self.end)?;
            let after = index + self.end.len();

            if line[after..].starts_with(&self.end) {
                cursor.seek(after + self.end.len());
                continue;
            }

            return Some(EndCode::Found(index));
        }
    }
}

/// Delimited range closed by the first end code, e.g. `/* .. */` or `$$ .. $$`
#[derive(Debug, Clone)]
pub struct NoEscapeRange {
    start: String,
    end: String,
    comment: bool,
}

impl NoEscapeRange {
    pub fn new(start: &str, end: &str) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
            comment: false,
        }
    }

    /// A non-nesting block comment
    pub fn comment(start: &str, end: &str) -> Self {
        Self {
            comment: true,
            ..Self::new(start, end)
        }
    }
}

impl RangeSearcher for NoEscapeRange {
    fn start_code_length(&self) -> usize {
        self.start.len()
    }

    fn end_code_length(&self) -> usize {
        self.end.len()
    }

    fn is_comment(&self) -> bool {
        self.comment
    }

    fn find_start_code(&self, reader: &LineReader<'_>) -> Option<usize> {
        reader.find(&self.start)
    }

    fn find_end_code(&self, reader: &LineReader<'_>) -> Option<EndCode> {
        reader.find(&self.end).map(EndCode::Found)
    }
}

/// Comment running to the end of the line, e.g. `-- ..`
#[derive(Debug, Clone)]
pub struct SingleLineComment {
    start: String,
    only_at_line_start: bool,
}

impl SingleLineComment {
    pub fn new(start: &str) -> Self {
        Self {
            start: start.to_string(),
            only_at_line_start: false,
        }
    }

    /// Only a comment when nothing but whitespace precedes it
    pub fn at_line_start(start: &str) -> Self {
        Self {
            only_at_line_start: true,
            ..Self::new(start)
        }
    }
}

impl RangeSearcher for SingleLineComment {
    fn start_code_length(&self) -> usize {
        self.start.len()
    }

    fn end_code_length(&self) -> usize {
        0
    }

    fn is_comment(&self) -> bool {
        true
    }

    fn find_start_code(&self, reader: &LineReader<'_>) -> Option<usize> {
        if !self.only_at_line_start {
            return reader.find(&self.start);
        }

        let line = reader.line();
        let index = line.len() - line.trim_start().len();
        (index >= reader.index() && line[index..].starts_with(&self.start)).then_some(index)
    }

    fn find_end_code(&self, reader: &LineReader<'_>) -> Option<EndCode> {
        Some(EndCode::Found(reader.line().len()))
    }
}

/// Block comment that nests, e.g. `/* outer /* inner */ still outer */`
#[derive(Debug, Clone)]
pub struct NestingMultiLineComment {
    start: String,
    end: String,
}

impl NestingMultiLineComment {
    pub fn new(start: &str, end: &str) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
        }
    }
}

impl RangeSearcher for NestingMultiLineComment {
    fn start_code_length(&self) -> usize {
        self.start.len()
    }

    fn end_code_length(&self) -> usize {
        self.end.len()
    }

    fn is_comment(&self) -> bool {
        true
    }

    fn find_start_code(&self, reader: &LineReader<'_>) -> Option<usize> {
        reader.find(&self.start)
    }

    fn find_end_code(&self, reader: &LineReader<'_>) -> Option<EndCode> {
        let end = reader.find(&self.end);
        let nested = reader.find(&self.start);

        match (nested, end) {
            (Some(nested), Some(end)) if nested < end => Some(EndCode::Nested {
                index: nested,
                searcher: Arc::new(self.clone()),
            }),
            (Some(nested), None) => Some(EndCode::Nested {
                index: nested,
                searcher: Arc::new(self.clone()),
            }),
            (_, Some(end)) => Some(EndCode::Found(end)),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader_at(line: &str, index: usize) -> LineReader<'_> {
        let mut reader = LineReader::new(line);
        reader.seek(index);
        reader
    }

    fn found(end: Option<EndCode>) -> Option<usize> {
        match end {
            Some(EndCode::Found(index)) => Some(index),
            _ => None,
        }
    }

    #[test]
    fn test_duplicate_escaped_range() {
        let range = DuplicateEscapedRange::new("'", "'");
        let line = "SELECT 'it''s', 'x'";

        assert_eq!(range.find_start_code(&LineReader::new(line)), Some(7));
        assert_eq!(found(range.find_end_code(&reader_at(line, 8))), Some(13));
        assert_eq!(found(range.find_end_code(&reader_at("''''", 1))), Some(3));
        assert!(range.find_end_code(&reader_at("'open", 1)).is_none());
    }

    #[test]
    fn test_no_escape_range() {
        let range = NoEscapeRange::new("$$", "$$");
        let line = "AS $$ SELECT ';' $$ LANGUAGE sql";

        assert_eq!(range.find_start_code(&LineReader::new(line)), Some(3));
        assert_eq!(found(range.find_end_code(&reader_at(line, 5))), Some(17));
    }

    #[test]
    fn test_single_line_comment() {
        let anywhere = SingleLineComment::new("--");
        let line = "SELECT 1 -- done";
        assert_eq!(anywhere.find_start_code(&LineReader::new(line)), Some(9));
        assert_eq!(found(anywhere.find_end_code(&reader_at(line, 11))), Some(line.len()));

        let at_start = SingleLineComment::at_line_start("#");
        assert_eq!(at_start.find_start_code(&LineReader::new("  # note")), Some(2));
        assert_eq!(at_start.find_start_code(&LineReader::new("SELECT '#'")), None);
    }

    #[test]
    fn test_nesting_comment_reports_inner_start() {
        let range = NestingMultiLineComment::new("/*", "*/");
        let line = "/* a /* b */ c */";

        match range.find_end_code(&reader_at(line, 2)) {
            Some(EndCode::Nested { index, .. }) => assert_eq!(index, 5),
            other => panic!("expected nested start, got {:?}", other),
        }
        assert_eq!(found(range.find_end_code(&reader_at(line, 7))), Some(10));
        assert_eq!(found(range.find_end_code(&reader_at(line, 12))), Some(15));
    }
}
