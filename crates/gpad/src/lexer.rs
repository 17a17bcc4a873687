//! Character scanner for Gpad source text.
//!
//! The scanner is a cursor over the input that tracks line and column, skips
//! trivia (whitespace and `//` comments), and reads the few lexical shapes
//! the grammar needs: identifiers, labels, and raw text runs that respect
//! quotes and bracket nesting.

use crate::error::{ParseError, Position, Result};

pub(crate) struct Scanner<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    pub(crate) fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    pub(crate) fn offset(&self) -> usize {
        self.pos
    }

    pub(crate) fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.input[start..end]
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    pub(crate) fn starts_with(&self, text: &str) -> bool {
        self.rest().starts_with(text)
    }

    pub(crate) fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    pub(crate) fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consumes `keyword` if the input continues with it and the keyword is
    /// not the prefix of a longer identifier.
    pub(crate) fn eat_keyword(&mut self, keyword: &str) -> bool {
        if !self.starts_with(keyword) {
            return false;
        }
        let after = self.rest()[keyword.len()..].chars().next();
        if after.is_some_and(is_ident_continue) {
            return false;
        }
        for _ in keyword.chars() {
            self.bump();
        }
        true
    }

    pub(crate) fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::at(message, self.position())
    }

    pub(crate) fn expect(&mut self, expected: char, context: &str) -> Result<()> {
        if self.eat(expected) {
            return Ok(());
        }
        Err(self.error(format!(
            "expected '{}' {}, found {}",
            expected,
            context,
            self.describe_next()
        )))
    }

    /// Human-readable description of the next character, for errors.
    pub(crate) fn describe_next(&self) -> String {
        match self.peek() {
            None => "end of input".to_string(),
            Some('\n') => "end of line".to_string(),
            Some(c) => format!("'{}'", c),
        }
    }

    fn at_comment(&self) -> bool {
        self.starts_with("//")
    }

    fn skip_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }

    /// Skips spaces, tabs and comments on the current line.
    pub(crate) fn skip_inline(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c != '\n' && c.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.at_comment() => self.skip_comment(),
                _ => break,
            }
        }
    }

    /// Skips whitespace, newlines, comments and `;` separators.
    pub(crate) fn skip_separators(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() || c == ';' => {
                    self.bump();
                }
                Some('/') if self.at_comment() => self.skip_comment(),
                _ => break,
            }
        }
    }

    /// Skips whitespace (including newlines) and comments, but not `;`.
    pub(crate) fn skip_blank(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.at_comment() => self.skip_comment(),
                _ => break,
            }
        }
    }

    /// Whether the cursor sits at a statement end: newline, `;`, a comment or
    /// end of input.
    pub(crate) fn at_line_end(&self) -> bool {
        matches!(self.peek(), None | Some('\n') | Some(';')) || self.at_comment()
    }

    /// Reads a plain identifier: `[A-Za-z_][A-Za-z0-9_]*`.
    pub(crate) fn identifier(&mut self) -> Option<&'a str> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_alphabetic() || c == '_' => {
                self.bump();
            }
            _ => return None,
        }
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            self.bump();
        }
        Some(&self.input[start..self.pos])
    }

    /// Reads an object label.
    ///
    /// Labels start with a letter, `_` or `$` and continue with letters,
    /// digits, `_`, `'` or `$`. A `_{...}` subscript is part of the label.
    pub(crate) fn label(&mut self) -> Result<Option<&'a str>> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
            _ => return Ok(None),
        }
        while let Some(c) = self.peek() {
            if c == '_' && self.peek_second() == Some('{') {
                let open = self.position();
                self.bump();
                self.bump();
                loop {
                    match self.bump() {
                        Some('}') => break,
                        Some('\n') | None => {
                            return Err(ParseError::at("unterminated label subscript", open))
                        }
                        Some(_) => {}
                    }
                }
            } else if is_label_continue(c) {
                self.bump();
            } else {
                break;
            }
        }
        Ok(Some(&self.input[start..self.pos]))
    }

    /// Reads raw text up to a terminator at bracket depth 0 outside quotes.
    ///
    /// Stops before a newline, `;`, a `//` comment, end of input, or any
    /// character for which `stop` returns true. Newlines inside brackets do
    /// not terminate. The returned text is trimmed.
    pub(crate) fn raw_until(&mut self, stop: impl Fn(char) -> bool) -> Result<&'a str> {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            if depth == 0 && (c == '\n' || c == ';' || stop(c) || self.at_comment()) {
                break;
            }
            match c {
                '"' => {
                    self.quoted()?;
                    continue;
                }
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => {
                    if depth == 0 {
                        return Err(self.error(format!("unbalanced '{}'", c)));
                    }
                    depth -= 1;
                }
                _ => {}
            }
            self.bump();
        }
        if depth > 0 {
            return Err(self.error("unclosed bracket"));
        }
        Ok(self.input[start..self.pos].trim())
    }

    /// Skips over one double-quoted string, honoring backslash escapes.
    fn quoted(&mut self) -> Result<()> {
        let open = self.position();
        self.bump();
        while let Some(c) = self.bump() {
            match c {
                '"' => return Ok(()),
                '\\' => {
                    self.bump();
                }
                _ => {}
            }
        }
        Err(ParseError::at("unterminated string", open))
    }
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_label_continue(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '\'' | '$')
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Positions
    // =========================================================================

    #[test]
    fn test_position_tracks_lines_and_columns() {
        let mut s = Scanner::new("ab\ncd");
        assert_eq!(s.position(), Position { line: 1, column: 1 });
        s.bump();
        s.bump();
        s.bump();
        assert_eq!(s.position(), Position { line: 2, column: 1 });
        s.bump();
        assert_eq!(s.position(), Position { line: 2, column: 2 });
    }

    // =========================================================================
    // Trivia
    // =========================================================================

    #[test]
    fn test_skip_inline_stops_at_newline() {
        let mut s = Scanner::new("   // note\nA");
        s.skip_inline();
        assert_eq!(s.peek(), Some('\n'));
        s.skip_separators();
        assert_eq!(s.peek(), Some('A'));
    }

    #[test]
    fn test_skip_blank_keeps_semicolon() {
        let mut s = Scanner::new(" \n ; x");
        s.skip_blank();
        assert_eq!(s.peek(), Some(';'));
    }

    // =========================================================================
    // Identifiers and labels
    // =========================================================================

    #[test]
    fn test_identifier() {
        let mut s = Scanner::new("pointSize: 5");
        assert_eq!(s.identifier(), Some("pointSize"));
        assert_eq!(s.peek(), Some(':'));
        assert_eq!(Scanner::new("5abc").identifier(), None);
    }

    #[test]
    fn test_label_forms() {
        assert_eq!(Scanner::new("A' = 1").label().unwrap(), Some("A'"));
        assert_eq!(Scanner::new("$A$1 = 1").label().unwrap(), Some("$A$1"));
        assert_eq!(Scanner::new("P_{12} = 1").label().unwrap(), Some("P_{12}"));
        assert_eq!(Scanner::new("a_1* = 1").label().unwrap(), Some("a_1"));
        assert_eq!(Scanner::new("(1, 2)").label().unwrap(), None);
        assert!(Scanner::new("P_{12 = 1").label().is_err());
    }

    #[test]
    fn test_eat_keyword_requires_boundary() {
        let mut s = Scanner::new("@@macroX");
        s.bump();
        s.bump();
        assert!(!s.eat_keyword("macro"));
        let mut s = Scanner::new("macro Name");
        assert!(s.eat_keyword("macro"));
        assert_eq!(s.peek(), Some(' '));
    }

    // =========================================================================
    // Raw text
    // =========================================================================

    #[test]
    fn test_raw_until_respects_nesting_and_quotes() {
        let mut s = Scanner::new("Text(\"a; b // c\") ; next");
        assert_eq!(s.raw_until(|_| false).unwrap(), "Text(\"a; b // c\")");
        assert_eq!(s.peek(), Some(';'));
    }

    #[test]
    fn test_raw_until_stops_at_comment() {
        let mut s = Scanner::new("(1, 2) // trailing");
        assert_eq!(s.raw_until(|_| false).unwrap(), "(1, 2)");
    }

    #[test]
    fn test_raw_until_newline_inside_brackets_continues() {
        let mut s = Scanner::new("Polygon(A,\n B, C)\nX");
        assert_eq!(s.raw_until(|_| false).unwrap(), "Polygon(A,\n B, C)");
    }

    #[test]
    fn test_raw_until_custom_stop() {
        let mut s = Scanner::new("5 } rest");
        assert_eq!(s.raw_until(|c| c == '}').unwrap(), "5");
        assert_eq!(s.peek(), Some('}'));
    }

    #[test]
    fn test_raw_until_errors() {
        assert!(Scanner::new("\"open").raw_until(|_| false).is_err());
        assert!(Scanner::new("f(x").raw_until(|_| false).is_err());
        assert!(Scanner::new("x)").raw_until(|_| false).is_err());
    }
}
