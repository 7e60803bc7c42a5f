//! Recursive-descent parser for the filter expression language.
//!
//! Grammar (whitespace-insensitive):
//!
//! ```text
//! filter      := or_expr EOF
//! or_expr     := and_expr ( '||' and_expr )*
//! and_expr    := primary ( '&&' primary )*
//! primary     := '(' or_expr ')' | comparison | path
//! comparison  := operand OP operand          (at least one side a path)
//! operand     := path | literal
//! path        := '@' step*
//! step        := '.' name | '.' string | '[' integer ']' | '.' '[' integer ']'
//! literal     := string | number | 'true' | 'false' | 'null'
//! ```

use crate::types::*;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected character {0:?} at offset {1}")]
    UnexpectedChar(char, usize),
    #[error("Unexpected end of input")]
    UnexpectedEnd,
    #[error("Unclosed string starting at offset {0}")]
    UnclosedString(usize),
    #[error("Invalid escape sequence at offset {0}")]
    InvalidEscape(usize),
    #[error("Invalid number at offset {0}")]
    InvalidNumber(usize),
    #[error("Invalid array index at offset {0}")]
    InvalidIndex(usize),
    #[error("Comparison needs at least one path operand (offset {0})")]
    ConstantComparison(usize),
    #[error("Unexpected trailing input at offset {0}")]
    TrailingInput(usize),
}

/// Helper returned by `peek_comparison_operator`.
struct ComparisonToken {
    op: CompareOp,
    len: usize,
}

/// Filter expression parser.
pub struct QueryParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> QueryParser<'a> {
    /// Parse a complete filter expression.
    pub fn parse(input: &'a str) -> Result<Expr, ParseError> {
        let mut parser = Self { input, pos: 0 };
        let expr = parser.parse_or()?;
        parser.skip_whitespace();
        if !parser.is_at_end() {
            return Err(ParseError::TrailingInput(parser.pos));
        }
        Ok(expr)
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_and()?;
        self.skip_whitespace();

        if !self.peek_str("||") {
            return Ok(first);
        }

        let mut operands = vec![first];
        while self.peek_str("||") {
            self.advance_by(2);
            operands.push(self.parse_and()?);
            self.skip_whitespace();
        }

        Ok(Expr::Logical {
            op: LogicalOp::Or,
            operands,
        })
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_primary()?;
        self.skip_whitespace();

        if !self.peek_str("&&") {
            return Ok(first);
        }

        let mut operands = vec![first];
        while self.peek_str("&&") {
            self.advance_by(2);
            operands.push(self.parse_primary()?);
            self.skip_whitespace();
        }

        Ok(Expr::Logical {
            op: LogicalOp::And,
            operands,
        })
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        self.skip_whitespace();

        if self.peek() == Some('(') {
            self.advance();
            let expr = self.parse_or()?;
            self.skip_whitespace();
            self.expect(')')?;
            return Ok(expr);
        }

        let start = self.pos;
        let left = self.parse_operand()?;
        self.skip_whitespace();

        if let Some(tok) = self.peek_comparison_operator() {
            self.advance_by(tok.len);
            self.skip_whitespace();
            let right = self.parse_operand()?;

            if matches!(left, OperandExpr::Literal(_)) && matches!(right, OperandExpr::Literal(_)) {
                return Err(ParseError::ConstantComparison(start));
            }

            return Ok(Expr::Compare {
                op: tok.op,
                left,
                right,
            });
        }

        // No operator: a bare path is an existence test.
        match left {
            OperandExpr::Path(path) => Ok(Expr::Exists(path)),
            OperandExpr::Literal(_) => match self.peek() {
                Some(c) => Err(ParseError::UnexpectedChar(c, self.pos)),
                None => Err(ParseError::UnexpectedEnd),
            },
        }
    }

    fn parse_operand(&mut self) -> Result<OperandExpr, ParseError> {
        self.skip_whitespace();

        match self.peek() {
            Some('@') => {
                self.advance();
                let steps = self.parse_steps()?;
                Ok(OperandExpr::Path(Path::new(steps)))
            }
            Some('"') => {
                let s = self.parse_string()?;
                Ok(OperandExpr::Literal(Literal::String(s)))
            }
            Some('0'..='9') | Some('-') => {
                let n = self.parse_number_lexical()?;
                Ok(OperandExpr::Literal(Literal::Number(n)))
            }
            Some(_) if self.peek_keyword("true") => {
                self.advance_by(4);
                Ok(OperandExpr::Literal(Literal::Bool(true)))
            }
            Some(_) if self.peek_keyword("false") => {
                self.advance_by(5);
                Ok(OperandExpr::Literal(Literal::Bool(false)))
            }
            Some(_) if self.peek_keyword("null") => {
                self.advance_by(4);
                Ok(OperandExpr::Literal(Literal::Null))
            }
            Some(c) => Err(ParseError::UnexpectedChar(c, self.pos)),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    fn parse_steps(&mut self) -> Result<Vec<Step>, ParseError> {
        let mut steps = Vec::new();

        loop {
            match self.peek() {
                Some('.') => {
                    self.advance();
                    match self.peek() {
                        Some('"') => steps.push(Step::Name(self.parse_string()?)),
                        Some('[') => steps.push(self.parse_index_step()?),
                        _ => steps.push(Step::Name(self.parse_identifier()?)),
                    }
                }
                Some('[') => steps.push(self.parse_index_step()?),
                _ => break,
            }
        }

        Ok(steps)
    }

    fn parse_index_step(&mut self) -> Result<Step, ParseError> {
        self.expect('[')?;
        let start = self.pos;

        while matches!(self.peek(), Some('0'..='9')) {
            self.advance();
        }
        if self.pos == start {
            return Err(ParseError::InvalidIndex(start));
        }

        let index = self.input[start..self.pos]
            .parse::<u32>()
            .map_err(|_| ParseError::InvalidIndex(start))?;
        self.expect(']')?;
        Ok(Step::Index(index))
    }

    fn parse_identifier(&mut self) -> Result<String, ParseError> {
        let start = self.pos;

        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                self.advance();
            } else {
                break;
            }
        }

        if self.pos == start {
            return match self.peek() {
                Some(c) => Err(ParseError::UnexpectedChar(c, self.pos)),
                None => Err(ParseError::UnexpectedEnd),
            };
        }

        Ok(self.input[start..self.pos].to_string())
    }

    fn parse_string(&mut self) -> Result<String, ParseError> {
        let open = self.pos;
        self.advance(); // opening quote

        let mut result = String::new();

        loop {
            match self.peek() {
                None => return Err(ParseError::UnclosedString(open)),
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    let esc = self.pos;
                    self.advance();
                    match self.peek() {
                        Some('"') => result.push('"'),
                        Some('\\') => result.push('\\'),
                        Some('/') => result.push('/'),
                        Some('b') => result.push('\u{0008}'),
                        Some('f') => result.push('\u{000C}'),
                        Some('n') => result.push('\n'),
                        Some('r') => result.push('\r'),
                        Some('t') => result.push('\t'),
                        Some('u') => {
                            self.advance();
                            result.push(self.parse_unicode_escape(esc)?);
                            continue;
                        }
                        _ => return Err(ParseError::InvalidEscape(esc)),
                    }
                    self.advance();
                }
                Some(c) => {
                    result.push(c);
                    self.advance();
                }
            }
        }

        Ok(result)
    }

    /// Called with the cursor on the first hex digit; consumes four digits
    /// (eight across a surrogate pair).
    fn parse_unicode_escape(&mut self, esc: usize) -> Result<char, ParseError> {
        let hi = self.parse_hex4(esc)?;
        if (0xD800..0xDC00).contains(&hi) {
            // high surrogate: a \uXXXX low surrogate must follow
            if self.peek() != Some('\\') {
                return Err(ParseError::InvalidEscape(esc));
            }
            self.advance();
            if self.peek() != Some('u') {
                return Err(ParseError::InvalidEscape(esc));
            }
            self.advance();
            let lo = self.parse_hex4(esc)?;
            if !(0xDC00..0xE000).contains(&lo) {
                return Err(ParseError::InvalidEscape(esc));
            }
            let code = 0x10000 + ((hi - 0xD800) << 10) + (lo - 0xDC00);
            return char::from_u32(code).ok_or(ParseError::InvalidEscape(esc));
        }
        char::from_u32(hi).ok_or(ParseError::InvalidEscape(esc))
    }

    fn parse_hex4(&mut self, esc: usize) -> Result<u32, ParseError> {
        let mut code = 0u32;
        for _ in 0..4 {
            let c = self.peek().ok_or(ParseError::UnexpectedEnd)?;
            let digit = c.to_digit(16).ok_or(ParseError::InvalidEscape(esc))?;
            code = code * 16 + digit;
            self.advance();
        }
        Ok(code)
    }

    /// JSON number grammar; the lexical form is kept as-is.
    fn parse_number_lexical(&mut self) -> Result<String, ParseError> {
        let start = self.pos;

        if self.peek() == Some('-') {
            self.advance();
        }

        if !matches!(self.peek(), Some('0'..='9')) {
            return Err(ParseError::InvalidNumber(start));
        }
        while matches!(self.peek(), Some('0'..='9')) {
            self.advance();
        }

        if self.peek() == Some('.') {
            self.advance();
            if !matches!(self.peek(), Some('0'..='9')) {
                return Err(ParseError::InvalidNumber(start));
            }
            while matches!(self.peek(), Some('0'..='9')) {
                self.advance();
            }
        }

        if matches!(self.peek(), Some('e') | Some('E')) {
            self.advance();
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.advance();
            }
            if !matches!(self.peek(), Some('0'..='9')) {
                return Err(ParseError::InvalidNumber(start));
            }
            while matches!(self.peek(), Some('0'..='9')) {
                self.advance();
            }
        }

        Ok(self.input[start..self.pos].to_string())
    }

    /// True if `word` is next and not followed by an identifier character.
    fn peek_keyword(&self, word: &str) -> bool {
        if !self.peek_str(word) {
            return false;
        }
        match self.input[self.pos + word.len()..].chars().next() {
            Some(c) => !(c.is_alphanumeric() || c == '_'),
            None => true,
        }
    }

    fn peek_comparison_operator(&self) -> Option<ComparisonToken> {
        if self.peek_str("==") {
            Some(ComparisonToken { op: CompareOp::Eq, len: 2 })
        } else if self.peek_str("!=") {
            Some(ComparisonToken { op: CompareOp::Ne, len: 2 })
        } else if self.peek_str("<=") {
            Some(ComparisonToken { op: CompareOp::Le, len: 2 })
        } else if self.peek_str(">=") {
            Some(ComparisonToken { op: CompareOp::Ge, len: 2 })
        } else if self.peek_str("<") {
            Some(ComparisonToken { op: CompareOp::Lt, len: 1 })
        } else if self.peek_str(">") {
            Some(ComparisonToken { op: CompareOp::Gt, len: 1 })
        } else {
            None
        }
    }

    fn peek_str(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        if self.peek() == Some(expected) {
            self.advance();
            Ok(())
        } else {
            match self.peek() {
                Some(c) => Err(ParseError::UnexpectedChar(c, self.pos)),
                None => Err(ParseError::UnexpectedEnd),
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }
}
