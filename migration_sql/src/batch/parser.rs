//! Script splitting
//!
//! [`BatchParser`] turns a multi-statement script into the discrete
//! batches an executor runs one at a time. Scanning is line by line: the
//! parser tracks the open lexical range (string, quoted identifier or
//! comment) and only looks for separators in text outside every range.

use std::collections::VecDeque;
use std::fmt;
use std::str::Split;
use std::sync::Arc;

use serde::Serialize;
use tracing::trace;

use super::range::{
    DuplicateEscapedRange, EndCode, LineReader, NestingMultiLineComment, NoEscapeRange,
    RangeSearcher, SingleLineComment,
};
use super::token::{GoSearcher, OracleBlockSearcher, SemicolonSearcher, SpecialTokenSearcher};
use crate::generator::Dialect;

/// How a batch was terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchKind {
    /// Ended by a statement terminator or the end of the script
    Statement,
    /// Ended by a `GO n` separator; run the batch `n` times
    SeparatorWithRepeatCount(u32),
}

/// One independently executable unit of SQL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SqlBatch {
    pub sql: String,
    pub kind: BatchKind,
}

impl SqlBatch {
    pub fn statement(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            kind: BatchKind::Statement,
        }
    }

    /// How many times the batch should be executed
    pub fn repeat_count(&self) -> u32 {
        match self.kind {
            BatchKind::Statement => 1,
            BatchKind::SeparatorWithRepeatCount(count) => count,
        }
    }
}

impl fmt::Display for SqlBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Separator convention of a dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    /// `GO [n]` alone on a line
    Go,
    /// `;`
    Semicolon,
    /// `;` outside PL/SQL blocks, or a lone `/` line
    OracleBlocks,
}

impl Separator {
    fn searcher(self) -> Box<dyn SpecialTokenSearcher> {
        match self {
            Separator::Go => Box::new(GoSearcher),
            Separator::Semicolon => Box::new(SemicolonSearcher),
            Separator::OracleBlocks => Box::new(OracleBlockSearcher::default()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchParser {
    ranges: Vec<Arc<dyn RangeSearcher>>,
    separator: Separator,
    strip_comments: bool,
}

impl BatchParser {
    /// A parser with no ranges registered
    pub fn new(separator: Separator) -> Self {
        Self {
            ranges: Vec::new(),
            separator,
            strip_comments: false,
        }
    }

    /// Register a range; earlier registrations win when two start at the same index
    pub fn with_range<R: RangeSearcher + 'static>(mut self, range: R) -> Self {
        self.ranges.push(Arc::new(range));
        self
    }

    pub fn for_dialect(dialect: Dialect) -> Self {
        let strings = |parser: Self| {
            parser
                .with_range(DuplicateEscapedRange::new("'", "'"))
                .with_range(DuplicateEscapedRange::new("\"", "\""))
        };

        match dialect {
            Dialect::SqlServer => strings(Self::new(Separator::Go))
                .with_range(DuplicateEscapedRange::new("[", "]"))
                .with_range(SingleLineComment::new("--"))
                .with_range(NestingMultiLineComment::new("/*", "*/")),
            Dialect::Sqlite => strings(Self::new(Separator::Go))
                .with_range(NoEscapeRange::new("[", "]"))
                .with_range(SingleLineComment::new("--"))
                .with_range(NoEscapeRange::comment("/*", "*/")),
            Dialect::Oracle => Self::new(Separator::OracleBlocks)
                .with_range(DuplicateEscapedRange::new("'", "'"))
                .with_range(NoEscapeRange::new("\"", "\""))
                .with_range(SingleLineComment::new("--"))
                .with_range(NoEscapeRange::comment("/*", "*/")),
            Dialect::Postgres => strings(Self::new(Separator::Semicolon))
                .with_range(NoEscapeRange::new("$$", "$$"))
                .with_range(SingleLineComment::new("--"))
                .with_range(NestingMultiLineComment::new("/*", "*/")),
            Dialect::MySql => strings(Self::new(Separator::Semicolon))
                .with_range(DuplicateEscapedRange::new("`", "`"))
                .with_range(SingleLineComment::new("--"))
                .with_range(SingleLineComment::new("#"))
                .with_range(NoEscapeRange::comment("/*", "*/")),
            Dialect::Hana => strings(Self::new(Separator::Semicolon))
                .with_range(SingleLineComment::new("--"))
                .with_range(NoEscapeRange::comment("/*", "*/")),
            Dialect::Snowflake => strings(Self::new(Separator::Semicolon))
                .with_range(NoEscapeRange::new("$$", "$$"))
                .with_range(SingleLineComment::new("--"))
                .with_range(SingleLineComment::new("//"))
                .with_range(NoEscapeRange::comment("/*", "*/")),
        }
    }

    /// Drop comment ranges from the emitted batches
    pub fn strip_comments(mut self, strip: bool) -> Self {
        self.strip_comments = strip;
        self
    }

    pub fn separator(&self) -> Separator {
        self.separator
    }

    /// Lazily split `source` into batches
    pub fn batches<'a>(&'a self, source: &'a str) -> Batches<'a> {
        Batches {
            ranges: &self.ranges,
            strip_comments: self.strip_comments,
            tokens: self.separator.searcher(),
            lines: source.split('\n'),
            open: Vec::new(),
            buffer: String::new(),
            ready: VecDeque::new(),
            first_line: true,
            finished: false,
        }
    }

    pub fn process(&self, source: &str) -> Vec<SqlBatch> {
        self.batches(source).collect()
    }
}

/// Single-pass iterator over the batches of one script
pub struct Batches<'a> {
    ranges: &'a [Arc<dyn RangeSearcher>],
    strip_comments: bool,
    tokens: Box<dyn SpecialTokenSearcher>,
    lines: Split<'a, char>,
    /// Open ranges, innermost last
    open: Vec<Arc<dyn RangeSearcher>>,
    buffer: String,
    ready: VecDeque<SqlBatch>,
    first_line: bool,
    finished: bool,
}

impl<'a> Batches<'a> {
    fn emit(&mut self, text: &str, is_comment: bool) {
        if is_comment && self.strip_comments {
            return;
        }
        self.buffer.push_str(text);
    }

    fn flush(&mut self, kind: BatchKind) {
        let sql = self.buffer.trim();
        if !sql.is_empty() {
            trace!(kind = ?kind, length = sql.len(), "Parsed batch");
            self.ready.push_back(SqlBatch {
                sql: sql.to_string(),
                kind,
            });
        }
        self.buffer.clear();
    }

    fn process_line(&mut self, line: &'a str) {
        if !self.first_line {
            let in_comment = self.open.last().map(|r| r.is_comment()).unwrap_or(false);
            self.emit("\n", in_comment);
        }
        self.first_line = false;

        let ranges = self.ranges;
        let mut reader = LineReader::new(line);

        loop {
            if let Some(active) = self.open.last().cloned() {
                match active.find_end_code(&reader) {
                    Some(EndCode::Found(index)) => {
                        let end = (index + active.end_code_length()).min(line.len());
                        self.emit(&line[reader.index()..end], active.is_comment());
                        reader.seek(end);
                        self.open.pop();
                    }
                    Some(EndCode::Nested { index, searcher }) => {
                        let end = index + searcher.start_code_length();
                        self.emit(&line[reader.index()..end], active.is_comment());
                        reader.seek(end);
                        self.open.push(searcher);
                    }
                    None => {
                        self.emit(reader.remaining(), active.is_comment());
                        return;
                    }
                }
                continue;
            }

            let next_range = ranges
                .iter()
                .filter_map(|range| range.find_start_code(&reader).map(|index| (index, range)))
                .min_by_key(|(index, _)| *index);
            let segment_end = next_range.map(|(index, _)| index).unwrap_or(line.len());

            if let Some(token) = self.tokens.find(line, reader.index(), segment_end) {
                let text_end = if token.keep_in_batch {
                    token.index + token.length
                } else {
                    token.index
                };
                self.emit(&line[reader.index()..text_end], false);
                self.flush(token.kind);
                reader.seek(token.index + token.length);
                continue;
            }

            self.emit(&line[reader.index()..segment_end], false);
            reader.seek(segment_end);

            match next_range {
                Some((index, range)) => {
                    let end = index + range.start_code_length();
                    self.emit(&line[index..end], range.is_comment());
                    reader.seek(end);
                    self.open.push(Arc::clone(range));
                }
                None => return,
            }
        }
    }
}

impl<'a> Iterator for Batches<'a> {
    type Item = SqlBatch;

    fn next(&mut self) -> Option<SqlBatch> {
        loop {
            if let Some(batch) = self.ready.pop_front() {
                return Some(batch);
            }
            if self.finished {
                return None;
            }

            match self.lines.next() {
                Some(line) => self.process_line(line),
                None => {
                    self.finished = true;
                    self.flush(BatchKind::Statement);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sql(batches: Vec<SqlBatch>) -> Vec<String> {
        batches.into_iter().map(|b| b.sql).collect()
    }

    #[test]
    fn test_oracle_plain_statements() {
        let parser = BatchParser::for_dialect(Dialect::Oracle);
        assert_eq!(
            sql(parser.process("SELECT 1 FROM dual; SELECT 2 FROM dual;")),
            vec!["SELECT 1 FROM dual", "SELECT 2 FROM dual"]
        );
    }

    #[test]
    fn test_oracle_anonymous_block_is_kept_verbatim() {
        let parser = BatchParser::for_dialect(Dialect::Oracle);
        let script = "BEGIN\n DBMS_OUTPUT.PUT_LINE('x');\nEND;";
        assert_eq!(sql(parser.process(script)), vec![script]);
    }

    #[test]
    fn test_oracle_keywords_in_strings_are_ignored() {
        let parser = BatchParser::for_dialect(Dialect::Oracle);
        assert_eq!(
            sql(parser.process("SELECT 'BEGIN' FROM dual; SELECT 'END' FROM dual;")),
            vec!["SELECT 'BEGIN' FROM dual", "SELECT 'END' FROM dual"]
        );
    }

    #[test]
    fn test_oracle_keywords_in_comments_are_ignored() {
        let parser = BatchParser::for_dialect(Dialect::Oracle);
        let script = "SELECT 1 FROM dual; -- BEGIN\nSELECT 2 FROM dual;";
        assert_eq!(sql(parser.process(script)).len(), 2);
    }

    #[test]
    fn test_go_separator_with_repeat_count() {
        let parser = BatchParser::for_dialect(Dialect::SqlServer);
        let batches = parser.process("INSERT INTO t VALUES (1)\nGO 3\nSELECT 1; SELECT 2\nGO");

        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].sql, "INSERT INTO t VALUES (1)");
        assert_eq!(batches[0].repeat_count(), 3);
        assert_eq!(batches[1].sql, "SELECT 1; SELECT 2");
        assert_eq!(batches[1].kind, BatchKind::SeparatorWithRepeatCount(1));
    }

    #[test]
    fn test_go_inside_multi_line_string_is_not_a_separator() {
        let parser = BatchParser::for_dialect(Dialect::SqlServer);
        let script = "SELECT 'a\nGO\nb'\nGO";
        assert_eq!(sql(parser.process(script)), vec!["SELECT 'a\nGO\nb'"]);
    }

    #[test]
    fn test_nested_comment_hides_separator() {
        let parser = BatchParser::for_dialect(Dialect::Postgres);
        let script = "SELECT 1 /* a /* b */ ; */ + 1; SELECT 2";
        assert_eq!(
            sql(parser.process(script)),
            vec!["SELECT 1 /* a /* b */ ; */ + 1", "SELECT 2"]
        );
    }

    #[test]
    fn test_strip_comments() {
        let parser = BatchParser::for_dialect(Dialect::Postgres).strip_comments(true);
        let script = "-- header\nSELECT 1 /* inline */ FROM t; -- trailing\nSELECT ';'";
        assert_eq!(
            sql(parser.process(script)),
            vec!["SELECT 1  FROM t", "SELECT ';'"]
        );
    }

    #[test]
    fn test_dollar_quoted_body_is_one_statement() {
        let parser = BatchParser::for_dialect(Dialect::Postgres);
        let script = "CREATE FUNCTION f() RETURNS int AS $$\nSELECT 1;\n$$ LANGUAGE sql;";
        assert_eq!(
            sql(parser.process(script)),
            vec!["CREATE FUNCTION f() RETURNS int AS $$\nSELECT 1;\n$$ LANGUAGE sql"]
        );
    }

    #[test]
    fn test_unterminated_string_runs_to_end() {
        let parser = BatchParser::for_dialect(Dialect::MySql);
        assert_eq!(
            sql(parser.process("SELECT 1; SELECT 'open; SELECT 2")),
            vec!["SELECT 1", "SELECT 'open; SELECT 2"]
        );
    }

    #[test]
    fn test_batches_are_lazy() {
        let parser = BatchParser::for_dialect(Dialect::MySql);
        let mut batches = parser.batches("SELECT 1;\nSELECT 2;\nSELECT 3;");

        assert_eq!(batches.next(), Some(SqlBatch::statement("SELECT 1")));
        assert_eq!(batches.lines.clone().count(), 2);
    }

    #[test]
    fn test_empty_batches_are_dropped() {
        let parser = BatchParser::for_dialect(Dialect::Snowflake);
        assert!(parser.process(" ;\n;\n  ").is_empty());
    }
}
