//! Pull reader over an in-memory JSON document.
//!
//! The reader keeps a stack of container scopes and a one-token lookahead,
//! so `peek` is cheap and consuming calls validate against the peeked kind.
//! `skip_value` discards values by raw scanning, without unescaping strings
//! or building numbers.

use std::borrow::Cow;

use crate::error::ReadError;
use crate::tokens::{Token, TokenRead};

/// Where the reader currently is, relative to container structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    EmptyDocument,
    NonemptyDocument,
    EmptyObject,
    NonemptyObject,
    /// A member name was peeked or consumed; a `:` and value must follow.
    DanglingName,
    EmptyArray,
    NonemptyArray,
}

/// Peeked token, with enough detail to consume or skip it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Peeked {
    None,
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    True,
    False,
    Null,
    DoubleQuoted,
    SingleQuoted,
    Unquoted,
    DoubleQuotedName,
    SingleQuotedName,
    UnquotedName,
    Number { len: usize },
    EndDocument,
}

/// Streaming JSON reader over a borrowed UTF-8 document.
///
/// In strict mode the accepted syntax is RFC 8259. Lenient mode additionally
/// accepts unquoted member names, single-quoted names and strings, unquoted
/// scalar strings, and a trailing comma before a closing `]` or `}`.
pub struct JsonReader<'a> {
    input: &'a str,
    pos: usize,
    lenient: bool,
    peeked: Peeked,
    stack: Vec<Scope>,
    scratch: String,
}

impl<'a> JsonReader<'a> {
    pub fn new(input: &'a str, lenient: bool) -> Self {
        Self {
            input,
            pos: 0,
            lenient,
            peeked: Peeked::None,
            stack: vec![Scope::EmptyDocument],
            scratch: String::new(),
        }
    }

    /// Validates UTF-8 before reading.
    pub fn from_slice(input: &'a [u8], lenient: bool) -> Result<Self, ReadError> {
        let text = std::str::from_utf8(input)
            .map_err(|e| ReadError::InvalidUtf8(e.valid_up_to()))?;
        Ok(Self::new(text, lenient))
    }

    fn ensure_peeked(&mut self) -> Result<Peeked, ReadError> {
        if self.peeked == Peeked::None {
            self.peeked = self.do_peek()?;
        }
        Ok(self.peeked)
    }

    fn do_peek(&mut self) -> Result<Peeked, ReadError> {
        let scope = *self.stack.last().expect("scope stack underflow");
        match scope {
            Scope::EmptyArray | Scope::NonemptyArray => {
                let first = scope == Scope::EmptyArray;
                if first {
                    self.replace_top(Scope::NonemptyArray);
                }
                let c = self
                    .next_non_whitespace()
                    .ok_or_else(|| self.syntax("unterminated array"))?;
                if c == ']' {
                    self.pos += 1;
                    return Ok(Peeked::EndArray);
                }
                if first {
                    return self.peek_value(c);
                }
                if c != ',' {
                    return Err(self.syntax("expected ',' or ']'"));
                }
                self.pos += 1;
                let c = self
                    .next_non_whitespace()
                    .ok_or_else(|| self.syntax("unterminated array"))?;
                if c == ']' {
                    if !self.lenient {
                        return Err(self.syntax("trailing comma before ']'"));
                    }
                    self.pos += 1;
                    return Ok(Peeked::EndArray);
                }
                self.peek_value(c)
            }
            Scope::EmptyObject | Scope::NonemptyObject => {
                let first = scope == Scope::EmptyObject;
                let mut c = self
                    .next_non_whitespace()
                    .ok_or_else(|| self.syntax("unterminated object"))?;
                if c == '}' {
                    self.pos += 1;
                    return Ok(Peeked::EndObject);
                }
                if !first {
                    if c != ',' {
                        return Err(self.syntax("expected ',' or '}'"));
                    }
                    self.pos += 1;
                    c = self
                        .next_non_whitespace()
                        .ok_or_else(|| self.syntax("unterminated object"))?;
                    if c == '}' {
                        if !self.lenient {
                            return Err(self.syntax("trailing comma before '}'"));
                        }
                        self.pos += 1;
                        return Ok(Peeked::EndObject);
                    }
                }
                self.replace_top(Scope::DanglingName);
                match c {
                    '"' => {
                        self.pos += 1;
                        Ok(Peeked::DoubleQuotedName)
                    }
                    '\'' if self.lenient => {
                        self.pos += 1;
                        Ok(Peeked::SingleQuotedName)
                    }
                    c if self.lenient && Self::is_literal_char(c) => Ok(Peeked::UnquotedName),
                    _ => Err(self.syntax("expected a member name")),
                }
            }
            Scope::DanglingName => {
                let c = self
                    .next_non_whitespace()
                    .ok_or_else(|| self.syntax("expected ':'"))?;
                if c != ':' {
                    return Err(self.syntax("expected ':'"));
                }
                self.pos += 1;
                self.replace_top(Scope::NonemptyObject);
                let c = self
                    .next_non_whitespace()
                    .ok_or_else(|| self.syntax("expected a value"))?;
                self.peek_value(c)
            }
            Scope::EmptyDocument => {
                self.replace_top(Scope::NonemptyDocument);
                let c = self
                    .next_non_whitespace()
                    .ok_or_else(|| self.syntax("expected a value"))?;
                self.peek_value(c)
            }
            Scope::NonemptyDocument => match self.next_non_whitespace() {
                None => Ok(Peeked::EndDocument),
                Some(_) if self.lenient => Ok(Peeked::EndDocument),
                Some(_) => Err(self.syntax("expected end of document")),
            },
        }
    }

    /// `c` is the first non-whitespace character of a value, not yet consumed.
    fn peek_value(&mut self, c: char) -> Result<Peeked, ReadError> {
        match c {
            '{' => {
                self.pos += 1;
                return Ok(Peeked::BeginObject);
            }
            '[' => {
                self.pos += 1;
                return Ok(Peeked::BeginArray);
            }
            '"' => {
                self.pos += 1;
                return Ok(Peeked::DoubleQuoted);
            }
            '\'' if self.lenient => {
                self.pos += 1;
                return Ok(Peeked::SingleQuoted);
            }
            _ => {}
        }

        if let Some(p) = self.scan_keyword() {
            return Ok(p);
        }
        if let Some(len) = self.scan_number() {
            return Ok(Peeked::Number { len });
        }
        if self.lenient && Self::is_literal_char(c) {
            return Ok(Peeked::Unquoted);
        }
        Err(self.syntax("expected a value"))
    }

    /// `true`/`false`/`null`, consumed immediately if matched.
    fn scan_keyword(&mut self) -> Option<Peeked> {
        let rest = &self.input[self.pos..];
        let (word, peeked) = if rest.starts_with("true") {
            ("true", Peeked::True)
        } else if rest.starts_with("false") {
            ("false", Peeked::False)
        } else if rest.starts_with("null") {
            ("null", Peeked::Null)
        } else {
            return None;
        };
        if let Some(c) = rest[word.len()..].chars().next() {
            if Self::is_literal_char(c) {
                return None; // e.g. `nullx` is an unquoted string, not null
            }
        }
        self.pos += word.len();
        Some(peeked)
    }

    /// Length of a well-formed number starting at the cursor, ending at a
    /// delimiter; the cursor is not advanced.
    fn scan_number(&self) -> Option<usize> {
        let bytes = self.input.as_bytes();
        let end = bytes.len();
        let mut i = self.pos;

        if i < end && bytes[i] == b'-' {
            i += 1;
        }
        let int_start = i;
        while i < end && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == int_start {
            return None;
        }
        if !self.lenient && bytes[int_start] == b'0' && i - int_start > 1 {
            return None;
        }

        if i < end && bytes[i] == b'.' {
            i += 1;
            let frac_start = i;
            while i < end && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i == frac_start {
                return None;
            }
        }

        if i < end && (bytes[i] == b'e' || bytes[i] == b'E') {
            i += 1;
            if i < end && (bytes[i] == b'+' || bytes[i] == b'-') {
                i += 1;
            }
            let exp_start = i;
            while i < end && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i == exp_start {
                return None;
            }
        }

        if let Some(c) = self.input[i..].chars().next() {
            if Self::is_literal_char(c) {
                return None;
            }
        }
        Some(i - self.pos)
    }

    /// Characters that may appear in an unquoted literal; everything else
    /// terminates it.
    fn is_literal_char(c: char) -> bool {
        !matches!(
            c,
            '/' | '\\'
                | ';'
                | '#'
                | '='
                | '{'
                | '}'
                | '['
                | ']'
                | ':'
                | ','
                | ' '
                | '\t'
                | '\n'
                | '\r'
                | '\u{000C}'
                | '"'
                | '\''
        )
    }

    /// Skips whitespace; returns the next character without consuming it.
    fn next_non_whitespace(&mut self) -> Option<char> {
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b' ' | b'\t' | b'\n' | b'\r' => self.pos += 1,
                _ => return self.input[self.pos..].chars().next(),
            }
        }
        None
    }

    /// Reads the body of a quoted string; the opening quote is already
    /// consumed. Borrows the input unless an escape forces a copy.
    fn read_quoted(&mut self, quote: char) -> Result<Cow<'a, str>, ReadError> {
        let q = quote as u8;
        let bytes = self.input.as_bytes();
        let start = self.pos;
        let mut i = self.pos;

        loop {
            if i >= bytes.len() {
                return Err(self.syntax_at("unterminated string", start));
            }
            match bytes[i] {
                b if b == q => {
                    let s = &self.input[start..i];
                    self.pos = i + 1;
                    return Ok(Cow::Borrowed(s));
                }
                b'\\' => break,
                b'\n' if !self.lenient => {
                    return Err(self.syntax_at("unterminated string", start));
                }
                _ => i += 1,
            }
        }

        let mut out = String::with_capacity(i - start + 16);
        out.push_str(&self.input[start..i]);
        while i < bytes.len() {
            match bytes[i] {
                b if b == q => {
                    self.pos = i + 1;
                    return Ok(Cow::Owned(out));
                }
                b'\\' => {
                    let (c, next) = self.read_escape(i + 1)?;
                    out.push(c);
                    i = next;
                }
                b'\n' if !self.lenient => break,
                _ => {
                    let Some(c) = self.input[i..].chars().next() else {
                        break;
                    };
                    out.push(c);
                    i += c.len_utf8();
                }
            }
        }
        Err(self.syntax_at("unterminated string", start))
    }

    /// Decodes one escape sequence; `i` points past the backslash. Returns
    /// the character and the position after the sequence.
    fn read_escape(&self, i: usize) -> Result<(char, usize), ReadError> {
        let bytes = self.input.as_bytes();
        let Some(&b) = bytes.get(i) else {
            return Err(self.syntax_at("unterminated escape sequence", i));
        };
        let c = match b {
            b'"' => '"',
            b'\'' => '\'',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{0008}',
            b'f' => '\u{000C}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => return self.read_unicode_escape(i + 1),
            _ => return Err(self.syntax_at("invalid escape sequence", i)),
        };
        Ok((c, i + 1))
    }

    fn read_unicode_escape(&self, i: usize) -> Result<(char, usize), ReadError> {
        let (hi, mut next) = self.read_hex4(i)?;
        if (0xD800..0xDC00).contains(&hi) {
            // surrogate pair: a second \uXXXX must follow
            let bytes = self.input.as_bytes();
            if bytes.get(next) != Some(&b'\\') || bytes.get(next + 1) != Some(&b'u') {
                return Err(self.syntax_at("unpaired surrogate escape", i));
            }
            let (lo, after) = self.read_hex4(next + 2)?;
            if !(0xDC00..0xE000).contains(&lo) {
                return Err(self.syntax_at("unpaired surrogate escape", i));
            }
            let code = 0x10000 + ((hi - 0xD800) << 10) + (lo - 0xDC00);
            next = after;
            return char::from_u32(code)
                .map(|c| (c, next))
                .ok_or_else(|| self.syntax_at("invalid unicode escape", i));
        }
        char::from_u32(hi)
            .map(|c| (c, next))
            .ok_or_else(|| self.syntax_at("invalid unicode escape", i))
    }

    fn read_hex4(&self, i: usize) -> Result<(u32, usize), ReadError> {
        let bytes = self.input.as_bytes();
        let mut code = 0u32;
        for k in 0..4 {
            let digit = bytes
                .get(i + k)
                .and_then(|&b| (b as char).to_digit(16))
                .ok_or_else(|| self.syntax_at("invalid unicode escape", i))?;
            code = code * 16 + digit;
        }
        Ok((code, i + 4))
    }

    /// Reads an unquoted literal as a borrowed slice.
    fn read_unquoted(&mut self) -> &'a str {
        let rest = &self.input[self.pos..];
        let len = rest
            .find(|c| !Self::is_literal_char(c))
            .unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    /// Raw scan past a quoted string without decoding escapes.
    fn skip_quoted(&mut self, quote: char) -> Result<(), ReadError> {
        let q = quote as u8;
        let bytes = self.input.as_bytes();
        let start = self.pos;
        let mut i = self.pos;
        while i < bytes.len() {
            match bytes[i] {
                b if b == q => {
                    self.pos = i + 1;
                    return Ok(());
                }
                b'\\' => i += 2,
                _ => i += 1,
            }
        }
        Err(self.syntax_at("unterminated string", start))
    }

    fn skip_unquoted(&mut self) {
        let _ = self.read_unquoted();
    }

    fn replace_top(&mut self, scope: Scope) {
        *self.stack.last_mut().expect("scope stack underflow") = scope;
    }

    fn unexpected(&self, expected: &str, found: Peeked) -> ReadError {
        self.syntax(&format!("expected {expected} but found {found:?}"))
    }

    fn syntax(&self, msg: &str) -> ReadError {
        self.syntax_at(msg, self.pos)
    }

    fn syntax_at(&self, msg: &str, pos: usize) -> ReadError {
        let pos = pos.min(self.input.len());
        let consumed = &self.input.as_bytes()[..pos];
        let line = consumed.iter().filter(|&&b| b == b'\n').count() + 1;
        let line_start = consumed
            .iter()
            .rposition(|&b| b == b'\n')
            .map(|p| p + 1)
            .unwrap_or(0);
        ReadError::Syntax {
            msg: msg.to_string(),
            line,
            column: pos - line_start + 1,
        }
    }
}

impl TokenRead for JsonReader<'_> {
    fn peek(&mut self) -> Result<Token, ReadError> {
        Ok(match self.ensure_peeked()? {
            Peeked::BeginObject => Token::BeginObject,
            Peeked::EndObject => Token::EndObject,
            Peeked::BeginArray => Token::BeginArray,
            Peeked::EndArray => Token::EndArray,
            Peeked::True | Peeked::False => Token::Bool,
            Peeked::Null => Token::Null,
            Peeked::DoubleQuoted | Peeked::SingleQuoted | Peeked::Unquoted => Token::String,
            Peeked::DoubleQuotedName | Peeked::SingleQuotedName | Peeked::UnquotedName => {
                Token::Name
            }
            Peeked::Number { .. } => Token::Number,
            Peeked::EndDocument => Token::EndDocument,
            Peeked::None => unreachable!("ensure_peeked always peeks"),
        })
    }

    fn begin_object(&mut self) -> Result<(), ReadError> {
        match self.ensure_peeked()? {
            Peeked::BeginObject => {
                self.stack.push(Scope::EmptyObject);
                self.peeked = Peeked::None;
                Ok(())
            }
            other => Err(self.unexpected("BEGIN_OBJECT", other)),
        }
    }

    fn end_object(&mut self) -> Result<(), ReadError> {
        match self.ensure_peeked()? {
            Peeked::EndObject => {
                self.stack.pop();
                self.peeked = Peeked::None;
                Ok(())
            }
            other => Err(self.unexpected("END_OBJECT", other)),
        }
    }

    fn begin_array(&mut self) -> Result<(), ReadError> {
        match self.ensure_peeked()? {
            Peeked::BeginArray => {
                self.stack.push(Scope::EmptyArray);
                self.peeked = Peeked::None;
                Ok(())
            }
            other => Err(self.unexpected("BEGIN_ARRAY", other)),
        }
    }

    fn end_array(&mut self) -> Result<(), ReadError> {
        match self.ensure_peeked()? {
            Peeked::EndArray => {
                self.stack.pop();
                self.peeked = Peeked::None;
                Ok(())
            }
            other => Err(self.unexpected("END_ARRAY", other)),
        }
    }

    fn next_name(&mut self) -> Result<&str, ReadError> {
        let name = match self.ensure_peeked()? {
            Peeked::DoubleQuotedName => self.read_quoted('"')?,
            Peeked::SingleQuotedName => self.read_quoted('\'')?,
            Peeked::UnquotedName => Cow::Borrowed(self.read_unquoted()),
            other => return Err(self.unexpected("NAME", other)),
        };
        self.peeked = Peeked::None;
        match name {
            Cow::Borrowed(s) => Ok(s),
            Cow::Owned(s) => {
                self.scratch = s;
                Ok(&self.scratch)
            }
        }
    }

    fn next_string(&mut self) -> Result<String, ReadError> {
        let value = match self.ensure_peeked()? {
            Peeked::DoubleQuoted => self.read_quoted('"')?,
            Peeked::SingleQuoted => self.read_quoted('\'')?,
            Peeked::Unquoted => Cow::Borrowed(self.read_unquoted()),
            other => return Err(self.unexpected("STRING", other)),
        };
        self.peeked = Peeked::None;
        Ok(value.into_owned())
    }

    fn next_number(&mut self) -> Result<&str, ReadError> {
        match self.ensure_peeked()? {
            Peeked::Number { len } => {
                let s = &self.input[self.pos..self.pos + len];
                self.pos += len;
                self.peeked = Peeked::None;
                Ok(s)
            }
            other => Err(self.unexpected("NUMBER", other)),
        }
    }

    fn next_bool(&mut self) -> Result<bool, ReadError> {
        let value = match self.ensure_peeked()? {
            Peeked::True => true,
            Peeked::False => false,
            other => return Err(self.unexpected("BOOLEAN", other)),
        };
        self.peeked = Peeked::None;
        Ok(value)
    }

    fn next_null(&mut self) -> Result<(), ReadError> {
        match self.ensure_peeked()? {
            Peeked::Null => {
                self.peeked = Peeked::None;
                Ok(())
            }
            other => Err(self.unexpected("NULL", other)),
        }
    }

    fn skip_value(&mut self) -> Result<(), ReadError> {
        let mut depth = 0usize;
        loop {
            let p = self.ensure_peeked()?;
            self.peeked = Peeked::None;
            match p {
                Peeked::BeginArray => {
                    self.stack.push(Scope::EmptyArray);
                    depth += 1;
                }
                Peeked::BeginObject => {
                    self.stack.push(Scope::EmptyObject);
                    depth += 1;
                }
                Peeked::EndArray | Peeked::EndObject => {
                    if depth == 0 {
                        return Err(self.syntax("no value to skip"));
                    }
                    self.stack.pop();
                    depth -= 1;
                }
                Peeked::DoubleQuoted | Peeked::DoubleQuotedName => self.skip_quoted('"')?,
                Peeked::SingleQuoted | Peeked::SingleQuotedName => self.skip_quoted('\'')?,
                Peeked::Unquoted | Peeked::UnquotedName => self.skip_unquoted(),
                Peeked::Number { len } => self.pos += len,
                Peeked::True | Peeked::False | Peeked::Null => {}
                Peeked::EndDocument => return Err(self.syntax("no value to skip")),
                Peeked::None => unreachable!("ensure_peeked always peeks"),
            }
            if depth == 0 {
                return Ok(());
            }
        }
    }
}
