//! Two-stage permissive parser for model output.
//!
//! Stage one is strict JSON. Stage two accepts the literal-only syntax small
//! models tend to produce instead: single-quoted strings, trailing commas,
//! `True`/`False`/`None` and tuples. The second stage builds plain values and
//! never evaluates anything.

use serde_json::{Map, Number, Value};
use thiserror::Error;

const MAX_DEPTH: usize = 64;

/// Why the literal parser rejected its input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralError {
    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("unexpected character '{found}' at offset {offset}")]
    Unexpected { found: char, offset: usize },

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("unsupported identifier '{0}'")]
    Identifier(String),

    #[error("trailing characters at offset {0}")]
    Trailing(usize),

    #[error("nesting deeper than {0} levels")]
    TooDeep(usize),
}

/// Parses `text` as JSON, falling back to the literal-only syntax.
pub fn parse_permissive(text: &str) -> Result<Value, LiteralError> {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => Ok(value),
        Err(_) => parse_literal(text),
    }
}

/// Parses a literal-only structure (dicts, lists, tuples, strings, numbers,
/// booleans and null).
pub fn parse_literal(text: &str) -> Result<Value, LiteralError> {
    let mut parser = Parser::new(text);
    parser.skip_whitespace();
    let value = parser.parse_value(0)?;
    parser.skip_whitespace();
    match parser.peek() {
        None => Ok(value),
        Some(_) => Err(LiteralError::Trailing(parser.pos)),
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, wanted: char) -> Result<(), LiteralError> {
        match self.next() {
            Some(c) if c == wanted => Ok(()),
            Some(found) => Err(LiteralError::Unexpected {
                found,
                offset: self.pos - 1,
            }),
            None => Err(LiteralError::UnexpectedEnd),
        }
    }

    fn unexpected(&self) -> LiteralError {
        match self.peek() {
            Some(found) => LiteralError::Unexpected {
                found,
                offset: self.pos,
            },
            None => LiteralError::UnexpectedEnd,
        }
    }

    fn parse_value(&mut self, depth: usize) -> Result<Value, LiteralError> {
        if depth > MAX_DEPTH {
            return Err(LiteralError::TooDeep(MAX_DEPTH));
        }

        match self.peek() {
            Some('{') => self.parse_dict(depth),
            Some('[') => self.parse_sequence(depth, '[', ']'),
            Some('(') => self.parse_sequence(depth, '(', ')'),
            Some('"') | Some('\'') => self.parse_string().map(Value::String),
            Some(c) if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => self.parse_number(),
            Some(c) if c.is_alphabetic() || c == '_' => self.parse_identifier(),
            _ => Err(self.unexpected()),
        }
    }

    fn parse_dict(&mut self, depth: usize) -> Result<Value, LiteralError> {
        self.expect('{')?;
        let mut map = Map::new();

        loop {
            self.skip_whitespace();
            if self.peek() == Some('}') {
                self.pos += 1;
                return Ok(Value::Object(map));
            }

            let key = match self.parse_value(depth + 1)? {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                // only hashable scalars can be keys
                _ => return Err(self.unexpected()),
            };
            self.skip_whitespace();
            self.expect(':')?;
            self.skip_whitespace();
            let value = self.parse_value(depth + 1)?;
            map.insert(key, value);

            self.skip_whitespace();
            match self.next() {
                Some(',') => continue,
                Some('}') => return Ok(Value::Object(map)),
                Some(found) => {
                    return Err(LiteralError::Unexpected {
                        found,
                        offset: self.pos - 1,
                    });
                }
                None => return Err(LiteralError::UnexpectedEnd),
            }
        }
    }

    fn parse_sequence(&mut self, depth: usize, open: char, close: char) -> Result<Value, LiteralError> {
        self.expect(open)?;
        let mut items = Vec::new();

        loop {
            self.skip_whitespace();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok(Value::Array(items));
            }

            items.push(self.parse_value(depth + 1)?);

            self.skip_whitespace();
            match self.next() {
                Some(',') => continue,
                Some(c) if c == close => return Ok(Value::Array(items)),
                Some(found) => {
                    return Err(LiteralError::Unexpected {
                        found,
                        offset: self.pos - 1,
                    });
                }
                None => return Err(LiteralError::UnexpectedEnd),
            }
        }
    }

    fn parse_string(&mut self) -> Result<String, LiteralError> {
        let quote = self.next().ok_or(LiteralError::UnexpectedEnd)?;
        let mut out = String::new();

        loop {
            match self.next().ok_or(LiteralError::UnexpectedEnd)? {
                c if c == quote => return Ok(out),
                '\\' => {
                    let escaped = self.next().ok_or(LiteralError::UnexpectedEnd)?;
                    match escaped {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        '0' => out.push('\0'),
                        '\\' | '\'' | '"' | '/' => out.push(escaped),
                        'u' => out.push(self.parse_hex_escape(4)?),
                        'x' => out.push(self.parse_hex_escape(2)?),
                        // unknown escapes are kept as written
                        other => {
                            out.push('\\');
                            out.push(other);
                        }
                    }
                }
                c => out.push(c),
            }
        }
    }

    fn parse_hex_escape(&mut self, digits: usize) -> Result<char, LiteralError> {
        let start = self.pos;
        let mut code = 0u32;
        for _ in 0..digits {
            let c = self.next().ok_or(LiteralError::UnexpectedEnd)?;
            let digit = c.to_digit(16).ok_or(LiteralError::Unexpected {
                found: c,
                offset: self.pos - 1,
            })?;
            code = code * 16 + digit;
        }
        char::from_u32(code).ok_or(LiteralError::Unexpected {
            found: '\\',
            offset: start,
        })
    }

    fn parse_number(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E' | '_'))
        {
            self.pos += 1;
        }
        let raw: String = self.chars[start..self.pos].iter().collect();
        let cleaned = raw.replace('_', "");
        let cleaned = cleaned.strip_prefix('+').unwrap_or(&cleaned);

        if let Ok(int) = cleaned.parse::<i64>() {
            return Ok(Value::Number(int.into()));
        }
        cleaned
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or(LiteralError::InvalidNumber(raw))
    }

    fn parse_identifier(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        let ident: String = self.chars[start..self.pos].iter().collect();
        match ident.as_str() {
            "True" | "true" => Ok(Value::Bool(true)),
            "False" | "false" => Ok(Value::Bool(false)),
            "None" | "null" => Ok(Value::Null),
            _ => Err(LiteralError::Identifier(ident)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strict_json_goes_first() {
        let value = parse_permissive(r#"{"name": "find_products", "arguments": {}}"#).unwrap();
        assert_eq!(value, json!({"name": "find_products", "arguments": {}}));
    }

    #[test]
    fn test_single_quotes_and_capitalized_literals() {
        let value =
            parse_permissive("{'name': 'chat_response', 'arguments': {'message': 'hi', 'ok': True, 'n': None}}")
                .unwrap();
        assert_eq!(
            value,
            json!({"name": "chat_response", "arguments": {"message": "hi", "ok": true, "n": null}})
        );
    }

    #[test]
    fn test_trailing_commas_and_tuples() {
        let value = parse_literal("{'sizes': ('S', 'M',), 'price': 12.5, 'count': -3,}").unwrap();
        assert_eq!(value, json!({"sizes": ["S", "M"], "price": 12.5, "count": -3}));
    }

    #[test]
    fn test_escapes() {
        let value = parse_literal(r#"'it\'s a \"quote\" é\n'"#).unwrap();
        assert_eq!(value, json!("it's a \"quote\" é\n"));
    }

    #[test]
    fn test_nothing_is_evaluated() {
        assert_eq!(
            parse_literal("__import__('os')"),
            Err(LiteralError::Identifier("__import__".to_string()))
        );
        assert!(parse_literal("{'a': open('x')}").is_err());
    }

    #[test]
    fn test_malformed_inputs_fail() {
        assert_eq!(parse_literal("{'a': 1"), Err(LiteralError::UnexpectedEnd));
        assert!(matches!(parse_literal("{'a' 1}"), Err(LiteralError::Unexpected { found: '1', .. })));
        assert!(matches!(parse_literal("{'a': 1} extra"), Err(LiteralError::Trailing(_))));
        assert!(matches!(parse_literal("1.2.3"), Err(LiteralError::InvalidNumber(_))));
        assert!(parse_literal("{[1]: 2}").is_err());
    }

    #[test]
    fn test_depth_limit() {
        let deep = "[".repeat(MAX_DEPTH + 2) + &"]".repeat(MAX_DEPTH + 2);
        assert_eq!(parse_literal(&deep), Err(LiteralError::TooDeep(MAX_DEPTH)));
    }
}
