//! List literal parser
//!
//! Template cells may hold a list written out as text, e.g. `[1, 2, 3]` or
//! `['IfcWall', 'IfcSlab']`. This is a small recursive descent parser for
//! that notation: nested lists, integers, floats, single- or double-quoted
//! strings with backslash escapes, and the keywords `True`/`False`/`None`
//! (plus `true`/`false`/`null`). A trailing comma before a closing bracket
//! is accepted.
//!
//! Inside the outer list, tuples `(a, b)` become arrays and dictionaries
//! `{'k': v}` become objects. Dictionary keys that are not strings are
//! written out as JSON text (`1` becomes `"1"`, `None` becomes `"null"`).

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// A list literal that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at position {position}")]
pub struct LiteralError {
    /// What went wrong
    pub message: String,
    /// Byte offset into the (trimmed) input
    pub position: usize,
}

/// Whether `text` should be read as a list literal: trimmed, it starts with
/// `[` and ends with `]`
pub fn looks_like_list(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.len() >= 2 && trimmed.starts_with('[') && trimmed.ends_with(']')
}

/// Parse a list literal into a JSON array
///
/// # Example
/// ```rust
/// use bsdd_sheets::parse_list_literal;
/// use serde_json::json;
///
/// assert_eq!(parse_list_literal("[1, 2, 3]").unwrap(), json!([1, 2, 3]));
/// assert_eq!(
///     parse_list_literal("['a', [True, None]]").unwrap(),
///     json!(["a", [true, null]])
/// );
/// ```
pub fn parse_list_literal(text: &str) -> Result<Value, LiteralError> {
    let mut parser = ListParser::new(text.trim());
    parser.skip_whitespace();
    if parser.peek_char() != Some('[') {
        return Err(parser.error("expected '['"));
    }
    let value = parser.parse_sequence('[', ']')?;

    // Make sure we consumed all input
    parser.skip_whitespace();
    if !parser.is_at_end() {
        return Err(parser.error(format!(
            "unexpected characters after list: '{}'",
            &parser.input[parser.pos..]
        )));
    }

    Ok(value)
}

struct ListParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> ListParser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    // === Character scanning ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek_char(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn error(&self, message: impl Into<String>) -> LiteralError {
        LiteralError {
            message: message.into(),
            position: self.pos,
        }
    }

    // === Grammar ===

    fn parse_value(&mut self) -> Result<Value, LiteralError> {
        self.skip_whitespace();
        match self.peek_char() {
            None => Err(self.error("unexpected end of input")),
            Some('[') => self.parse_sequence('[', ']'),
            Some('(') => self.parse_tuple(),
            Some('{') => self.parse_dict(),
            Some(q @ ('\'' | '"')) => self.parse_string(q),
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.parse_number(),
            Some(c) if c.is_alphabetic() || c == '_' => self.parse_keyword(),
            Some(c) => Err(self.error(format!("unexpected character '{}'", c))),
        }
    }

    /// Comma-separated values up to `close`. Returns the items and whether
    /// the last one was followed by a comma.
    fn parse_items(
        &mut self,
        open: char,
        close: char,
    ) -> Result<(Vec<Value>, bool), LiteralError> {
        // Opening bracket already peeked
        self.advance();
        let mut items = Vec::new();
        let mut trailing_comma = false;

        loop {
            self.skip_whitespace();
            if self.peek_char() == Some(close) {
                self.advance();
                return Ok((items, trailing_comma));
            }

            items.push(self.parse_value()?);
            trailing_comma = false;

            self.skip_whitespace();
            match self.peek_char() {
                Some(',') => {
                    self.advance();
                    trailing_comma = true;
                }
                Some(c) if c == close => {
                    self.advance();
                    return Ok((items, false));
                }
                None => return Err(self.error(format!("unclosed '{}'", open))),
                Some(c) => {
                    return Err(self.error(format!("expected ',' or '{}', found '{}'", close, c)))
                }
            }
        }
    }

    fn parse_sequence(&mut self, open: char, close: char) -> Result<Value, LiteralError> {
        let (items, _) = self.parse_items(open, close)?;
        Ok(Value::Array(items))
    }

    /// `(a, b)` and `(a,)` are tuples; `(a)` is just `a`
    fn parse_tuple(&mut self) -> Result<Value, LiteralError> {
        let (mut items, trailing_comma) = self.parse_items('(', ')')?;
        if items.len() == 1 && !trailing_comma {
            return Ok(items.remove(0));
        }
        Ok(Value::Array(items))
    }

    fn parse_dict(&mut self) -> Result<Value, LiteralError> {
        // Opening brace already peeked
        self.advance();
        let mut object = Map::new();

        loop {
            self.skip_whitespace();
            if self.peek_char() == Some('}') {
                self.advance();
                return Ok(Value::Object(object));
            }

            let key_pos = self.pos;
            let key = match self.parse_value()? {
                Value::String(s) => s,
                Value::Array(_) | Value::Object(_) => {
                    return Err(LiteralError {
                        message: "dictionary key must be a string, number or keyword".into(),
                        position: key_pos,
                    })
                }
                other => other.to_string(),
            };

            self.skip_whitespace();
            if self.advance() != Some(':') {
                return Err(self.error("expected ':' after dictionary key"));
            }
            let value = self.parse_value()?;
            object.insert(key, value);

            self.skip_whitespace();
            match self.peek_char() {
                Some(',') => {
                    self.advance();
                }
                Some('}') => {
                    self.advance();
                    return Ok(Value::Object(object));
                }
                None => return Err(self.error("unclosed '{'")),
                Some(c) => return Err(self.error(format!("expected ',' or '}}', found '{}'", c))),
            }
        }
    }

    fn parse_string(&mut self, quote: char) -> Result<Value, LiteralError> {
        let start = self.pos;
        self.advance();
        let mut s = String::new();

        loop {
            match self.advance() {
                None => {
                    return Err(LiteralError {
                        message: "unterminated string".into(),
                        position: start,
                    })
                }
                Some(c) if c == quote => return Ok(Value::String(s)),
                Some('\\') => match self.advance() {
                    None => continue,
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some('r') => s.push('\r'),
                    Some('0') => s.push('\0'),
                    Some(c @ ('\\' | '\'' | '"')) => s.push(c),
                    Some('u') => s.push(self.parse_unicode_escape()?),
                    // Unknown escapes are kept as written
                    Some(c) => {
                        s.push('\\');
                        s.push(c);
                    }
                },
                Some(c) => s.push(c),
            }
        }
    }

    fn parse_unicode_escape(&mut self) -> Result<char, LiteralError> {
        let start = self.pos;
        let hex = self
            .input
            .get(self.pos..self.pos + 4)
            .filter(|h| h.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| self.error("invalid \\u escape"))?;
        let code = u32::from_str_radix(hex, 16).map_err(|_| self.error("invalid \\u escape"))?;
        self.pos += 4;
        char::from_u32(code).ok_or(LiteralError {
            message: format!("invalid code point U+{:04X}", code),
            position: start,
        })
    }

    fn parse_number(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        let mut is_float = false;
        let mut digits = 0;

        if matches!(self.peek_char(), Some('-' | '+')) {
            self.advance();
        }
        while let Some(c) = self.peek_char() {
            match c {
                '0'..='9' => digits += 1,
                '.' if !is_float => is_float = true,
                'e' | 'E' if digits > 0 => {
                    is_float = true;
                    self.advance();
                    if matches!(self.peek_char(), Some('-' | '+')) {
                        self.advance();
                    }
                    continue;
                }
                '_' => {}
                _ => break,
            }
            self.advance();
        }

        if digits == 0 {
            return Err(LiteralError {
                message: "invalid number".into(),
                position: start,
            });
        }

        let text: String = self.input[start..self.pos]
            .chars()
            .filter(|c| *c != '_' && *c != '+')
            .collect();
        let invalid = || LiteralError {
            message: format!("invalid number '{}'", &self.input[start..self.pos]),
            position: start,
        };

        if !is_float {
            if let Ok(n) = text.parse::<i64>() {
                return Ok(Value::Number(n.into()));
            }
        }
        let f = text.parse::<f64>().map_err(|_| invalid())?;
        Number::from_f64(f).map(Value::Number).ok_or_else(invalid)
    }

    fn parse_keyword(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        while matches!(self.peek_char(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.advance();
        }
        match &self.input[start..self.pos] {
            "True" | "true" => Ok(Value::Bool(true)),
            "False" | "false" => Ok(Value::Bool(false)),
            "None" | "null" => Ok(Value::Null),
            word => Err(LiteralError {
                message: format!("unknown name '{}'", word),
                position: start,
            }),
        }
    }
}
