//! Parser for PHP array config files.
//!
//! Reads the files produced by [`Serializer`](crate::codec::render::Serializer)
//! and the hand-edited variants commonly found next to them:
//!
//! ```text
//! <?php                                  optional open tag
//! /* header */  // line  # line          comments anywhere
//! return [                               or: return array(
//!     'name' => 'value',                 single- or double-quoted strings
//!     'port' => 5432,                    decimal, 0x, 0o, 0b, 1_000 integers
//!     'ratio' => 0.5,                    floats, exponents
//!     'debug' => TRUE,                   true/false/null in any case
//!     'hosts' => ['a', 'b'],             unkeyed entries get the next index
//! ];                                     optional `;` and closing `?>`
//! ```
//!
//! Only literals are accepted: no constants, no expressions, no variable
//! interpolation (a `$` inside a double-quoted string is kept verbatim).

use thiserror::Error;

use crate::domain::document::{ConfigDocument, ConfigValue, Key};

/// Deepest array nesting accepted by [`parse_document`].
pub const MAX_DEPTH: usize = 256;

/// Errors that can occur while parsing a config file.
///
/// Lines and columns are 1-based and count characters, not bytes.
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    /// The input ended in the middle of a construct.
    #[error("unexpected end of input at line {line}, column {column}: expected {expected}")]
    UnexpectedEnd {
        expected: &'static str,
        line: usize,
        column: usize,
    },

    /// A character that cannot start or continue the current construct.
    #[error("unexpected {found:?} at line {line}, column {column}: expected {expected}")]
    UnexpectedChar {
        found: char,
        expected: &'static str,
        line: usize,
        column: usize,
    },

    /// Text that looked like a number but is not a valid literal.
    #[error("invalid number literal {text:?} at line {line}, column {column}")]
    InvalidNumber {
        text: String,
        line: usize,
        column: usize,
    },

    /// An array key that is neither a string nor an integer.
    #[error("invalid array key at line {line}, column {column}: {reason}")]
    InvalidKey {
        reason: &'static str,
        line: usize,
        column: usize,
    },

    /// The file does not contain a `return` statement.
    #[error("missing `return` statement")]
    MissingReturn,

    /// Arrays are nested deeper than [`MAX_DEPTH`] levels.
    #[error(
        "arrays nested deeper than {max} levels at line {line}, column {column}",
        max = MAX_DEPTH
    )]
    TooDeep { line: usize, column: usize },

    /// The file returns something other than an array.
    #[error("returned value at line {line}, column {column} is not an array")]
    RootNotArray { line: usize, column: usize },

    /// Input continues after the returned array.
    #[error("unexpected trailing input at line {line}, column {column}")]
    TrailingInput { line: usize, column: usize },
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Parses a config file into a document.
///
/// # Errors
///
/// Returns [`ParseError`] describing the first problem found.
///
/// # Examples
///
/// ```rust
/// use cfgstore_core::{parse_document, ConfigValue};
///
/// let doc = parse_document("<?php return ['db' => ['port' => 5432]];").unwrap();
/// assert_eq!(doc.get_path("db.port"), Some(&ConfigValue::Int(5432)));
/// ```
pub fn parse_document(text: &str) -> Result<ConfigDocument, ParseError> {
    let mut parser = Parser::new(text.strip_prefix('\u{feff}').unwrap_or(text));

    parser.skip_whitespace();
    if parser.starts_with_ignore_case("<?php") {
        parser.advance("<?php".len());
    }
    parser.skip_trivia();

    if !parser.eat_keyword("return") {
        return Err(ParseError::MissingReturn);
    }
    parser.skip_trivia();

    let (line, column) = parser.position();
    let ConfigValue::Document(document) = parser.parse_value()? else {
        return Err(ParseError::RootNotArray { line, column });
    };

    parser.skip_trivia();
    parser.eat(';');
    parser.skip_trivia();
    if parser.starts_with("?>") {
        parser.advance(2);
        parser.skip_trivia();
    }
    if parser.peek().is_some() {
        let (line, column) = parser.position();
        return Err(ParseError::TrailingInput { line, column });
    }
    Ok(document)
}

// ── Parser state ──────────────────────────────────────────────────────────────

struct Parser<'a> {
    src: &'a str,
    /// Byte offset of the next unread character.
    pos: usize,
    line: usize,
    column: usize,
    /// Number of arrays currently open.
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            column: 1,
            depth: 0,
        }
    }

    fn position(&self) -> (usize, usize) {
        (self.line, self.column)
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// Advances over `n` bytes, which must end on a character boundary.
    fn advance(&mut self, n: usize) {
        let target = self.pos + n;
        while self.pos < target && self.bump().is_some() {}
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    fn starts_with_ignore_case(&self, prefix: &str) -> bool {
        self.rest()
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    }

    fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consumes `keyword` (case-insensitive) if it is followed by a
    /// non-identifier character.
    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if !self.starts_with_ignore_case(keyword) {
            return false;
        }
        let next = self.rest()[keyword.len()..].chars().next();
        if next.is_some_and(is_ident_char) {
            return false;
        }
        self.advance(keyword.len());
        true
    }

    fn end(&self, expected: &'static str) -> ParseError {
        ParseError::UnexpectedEnd {
            expected,
            line: self.line,
            column: self.column,
        }
    }

    fn unexpected(&self, found: char, expected: &'static str) -> ParseError {
        ParseError::UnexpectedChar {
            found,
            expected,
            line: self.line,
            column: self.column,
        }
    }

    // ── Trivia ───────────────────────────────────────────────────────────────

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    /// Skips whitespace and `//`, `#` and `/* */` comments.
    ///
    /// An unterminated block comment swallows the rest of the input; the
    /// caller then reports what it expected to find.
    fn skip_trivia(&mut self) {
        loop {
            self.skip_whitespace();
            if self.starts_with("//") || self.starts_with("#") {
                while let Some(ch) = self.bump() {
                    if ch == '\n' {
                        break;
                    }
                }
            } else if self.starts_with("/*") {
                self.advance(2);
                while self.peek().is_some() && !self.starts_with("*/") {
                    self.bump();
                }
                self.advance(2);
            } else {
                return;
            }
        }
    }

    // ── Values ───────────────────────────────────────────────────────────────

    fn parse_value(&mut self) -> Result<ConfigValue, ParseError> {
        self.skip_trivia();
        match self.peek() {
            None => Err(self.end("a value")),
            Some('[') => {
                self.bump();
                self.parse_entries(']')
            }
            Some('\'') => self.parse_single_quoted().map(ConfigValue::String),
            Some('"') => self.parse_double_quoted().map(ConfigValue::String),
            Some(ch) if ch.is_ascii_digit() || ch == '-' || ch == '+' || ch == '.' => {
                self.parse_number()
            }
            Some(ch) if is_ident_start(ch) => self.parse_word(),
            Some(ch) => Err(self.unexpected(ch, "a value")),
        }
    }

    /// Parses `true` / `false` / `null` / `array(...)`.
    fn parse_word(&mut self) -> Result<ConfigValue, ParseError> {
        for (word, value) in [
            ("true", ConfigValue::Bool(true)),
            ("false", ConfigValue::Bool(false)),
            ("null", ConfigValue::Null),
        ] {
            if self.eat_keyword(word) {
                return Ok(value);
            }
        }
        if self.eat_keyword("array") {
            self.skip_trivia();
            return match self.peek() {
                Some('(') => {
                    self.bump();
                    self.parse_entries(')')
                }
                Some(ch) => Err(self.unexpected(ch, "`(` after `array`")),
                None => Err(self.end("`(` after `array`")),
            };
        }
        let ch = self.peek().unwrap_or_default();
        Err(self.unexpected(ch, "a literal value"))
    }

    /// Parses array entries up to and including `close`.  The opening
    /// bracket has already been consumed.
    fn parse_entries(&mut self, close: char) -> Result<ConfigValue, ParseError> {
        if self.depth >= MAX_DEPTH {
            let (line, column) = self.position();
            return Err(ParseError::TooDeep { line, column });
        }
        self.depth += 1;
        let result = self.parse_entries_at_depth(close);
        self.depth -= 1;
        result
    }

    fn parse_entries_at_depth(&mut self, close: char) -> Result<ConfigValue, ParseError> {
        let mut document = ConfigDocument::new();
        loop {
            self.skip_trivia();
            if self.eat(close) {
                break;
            }

            let (line, column) = self.position();
            let first = self.parse_value()?;
            self.skip_trivia();

            if self.starts_with("=>") {
                self.advance(2);
                let key = into_key(first, line, column)?;
                let value = self.parse_value()?;
                document.insert(key, value);
            } else {
                let index = document.next_index().ok_or(ParseError::InvalidKey {
                    reason: "no integer index left for an unkeyed entry",
                    line,
                    column,
                })?;
                document.insert(Key::Int(index), first);
            }

            self.skip_trivia();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(ch) if ch == close => {
                    self.bump();
                    break;
                }
                Some(ch) => return Err(self.unexpected(ch, "`,` or end of array")),
                None => return Err(self.end("`,` or end of array")),
            }
        }
        Ok(ConfigValue::Document(document))
    }

    /// `'...'`: only `\\` and `\'` are escapes; any other backslash is kept.
    fn parse_single_quoted(&mut self) -> Result<String, ParseError> {
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.end("closing `'`")),
                Some('\'') => return Ok(out),
                Some('\\') => match self.peek() {
                    Some(ch @ ('\\' | '\'')) => {
                        self.bump();
                        out.push(ch);
                    }
                    _ => out.push('\\'),
                },
                Some(ch) => out.push(ch),
            }
        }
    }

    /// `"..."`: the usual escapes plus `\u{hex}`; unknown escapes are kept.
    fn parse_double_quoted(&mut self) -> Result<String, ParseError> {
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.end("closing `\"`")),
                Some('"') => return Ok(out),
                Some('\\') => {
                    let escaped = match self.peek() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('v') => '\u{0b}',
                        Some('e') => '\u{1b}',
                        Some('f') => '\u{0c}',
                        Some('0') => '\0',
                        Some(ch @ ('\\' | '$' | '"')) => ch,
                        Some('u') if self.rest()[1..].starts_with('{') => {
                            if let Some(ch) = self.parse_unicode_escape() {
                                out.push(ch);
                                continue;
                            }
                            out.push('\\');
                            continue;
                        }
                        _ => {
                            out.push('\\');
                            continue;
                        }
                    };
                    self.bump();
                    out.push(escaped);
                }
                Some(ch) => out.push(ch),
            }
        }
    }

    /// Consumes `u{XXXX}` if it encodes a valid character.
    fn parse_unicode_escape(&mut self) -> Option<char> {
        let rest = self.rest();
        let close = rest.find('}')?;
        let hex = &rest[2..close];
        let ch = u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)?;
        self.advance(close + 1);
        Some(ch)
    }

    fn parse_number(&mut self) -> Result<ConfigValue, ParseError> {
        let (line, column) = self.position();
        let start = self.pos;

        let negative = match self.peek() {
            Some('-') => {
                self.bump();
                true
            }
            Some('+') => {
                self.bump();
                false
            }
            _ => false,
        };

        let body_start = self.pos;
        let mut prev = '\0';
        while let Some(ch) = self.peek() {
            let exponent_sign = (ch == '+' || ch == '-') && (prev == 'e' || prev == 'E');
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' || exponent_sign {
                prev = ch;
                self.bump();
            } else {
                break;
            }
        }

        let body: String = self.src[body_start..self.pos]
            .chars()
            .filter(|ch| *ch != '_')
            .collect();
        number_value(&body, negative).ok_or_else(|| ParseError::InvalidNumber {
            text: self.src[start..self.pos].to_string(),
            line,
            column,
        })
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

fn into_key(value: ConfigValue, line: usize, column: usize) -> Result<Key, ParseError> {
    match value {
        ConfigValue::String(s) => Ok(Key::Str(s)),
        ConfigValue::Int(i) => Ok(Key::Int(i)),
        _ => Err(ParseError::InvalidKey {
            reason: "keys must be strings or integers",
            line,
            column,
        }),
    }
}

/// Interprets the text of a numeric literal (sign already removed and
/// digit separators stripped).
fn number_value(body: &str, negative: bool) -> Option<ConfigValue> {
    let lower = body.to_ascii_lowercase();

    for (prefix, radix) in [("0x", 16), ("0b", 2), ("0o", 8)] {
        if let Some(digits) = lower.strip_prefix(prefix) {
            return radix_int(digits, radix, negative);
        }
    }

    if lower.contains(['.', 'e']) {
        if !lower.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
            return None;
        }
        let magnitude: f64 = lower.parse().ok()?;
        if !magnitude.is_finite() {
            return None;
        }
        return Some(ConfigValue::Float(if negative { -magnitude } else { magnitude }));
    }

    if lower.is_empty() || !lower.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // A leading zero marks an octal literal.
    if lower.len() > 1 && lower.starts_with('0') {
        return radix_int(&lower[1..], 8, negative);
    }

    match lower.parse::<u64>() {
        Ok(magnitude) => Some(signed(magnitude, negative)),
        // Too large for any integer type: the value becomes a float.
        Err(_) => {
            let magnitude: f64 = lower.parse().ok()?;
            Some(ConfigValue::Float(if negative { -magnitude } else { magnitude }))
        }
    }
}

fn radix_int(digits: &str, radix: u32, negative: bool) -> Option<ConfigValue> {
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, radix)
        .ok()
        .map(|magnitude| signed(magnitude, negative))
}

/// Applies the sign, falling back to a float outside the `i64` range.
fn signed(magnitude: u64, negative: bool) -> ConfigValue {
    const MIN_MAGNITUDE: u64 = i64::MAX as u64 + 1;
    match (negative, i64::try_from(magnitude)) {
        (false, Ok(i)) => ConfigValue::Int(i),
        (true, Ok(i)) => ConfigValue::Int(-i),
        (true, Err(_)) if magnitude == MIN_MAGNITUDE => ConfigValue::Int(i64::MIN),
        (false, Err(_)) => ConfigValue::Float(magnitude as f64),
        (true, Err(_)) => ConfigValue::Float(-(magnitude as f64)),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
