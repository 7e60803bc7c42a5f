//! Scalar values and the total cross-type comparison rules.

use std::cmp::Ordering;

use json_sieve_expr::{CompareOp, Literal};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// A JSON number, decimal when the lexical form fits, `f64` otherwise.
#[derive(Debug, Clone)]
pub enum Number {
    Decimal(Decimal),
    Double(f64),
}

impl Number {
    /// Parses the lexical form as emitted by the token reader. Values outside
    /// decimal range fall back to `f64`.
    pub fn parse(text: &str) -> Self {
        let decimal = if text.bytes().any(|b| b == b'e' || b == b'E') {
            Decimal::from_scientific(text)
        } else {
            text.parse::<Decimal>()
        };
        match decimal {
            Ok(d) => Number::Decimal(d),
            Err(_) => Number::Double(text.parse().unwrap_or(f64::NAN)),
        }
    }

    fn to_f64(&self) -> f64 {
        match self {
            Number::Decimal(d) => d.to_f64().unwrap_or(f64::NAN),
            Number::Double(x) => *x,
        }
    }

    fn numeric_cmp(&self, other: &Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Decimal(a), Number::Decimal(b)) => Some(a.cmp(b)),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }
}

/// Numeric equality: `5`, `5.0` and `5e0` are all equal.
impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Decimal(a), Number::Decimal(b)) => a == b,
            _ => self.to_f64() == other.to_f64(),
        }
    }
}

/// A scalar observed in the document, or bound as a filter constant.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Number(Number),
    Bool(bool),
    Null,
}

impl Value {
    pub fn from_literal(literal: &Literal) -> Self {
        match literal {
            Literal::String(s) => Value::String(s.clone()),
            Literal::Number(text) => Value::Number(Number::parse(text)),
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Null => Value::Null,
        }
    }

    /// Total comparison: every operator yields a boolean for every pair of
    /// values, mismatched types included.
    ///
    /// - `==` is same-type equality; `null == null` holds; every cross-type
    ///   pair is unequal. `!=` is always its negation.
    /// - `<` and `>` order within one type (strings lexically, booleans with
    ///   `false < true`) and are false across types or whenever either side
    ///   is null.
    /// - `<=` and `>=` order within one type, hold vacuously whenever the
    ///   left side is null, and are false when only the right side is null.
    pub fn compare(&self, op: CompareOp, other: &Value) -> bool {
        match op {
            CompareOp::Eq => self == other,
            CompareOp::Ne => self != other,
            CompareOp::Lt | CompareOp::Le | CompareOp::Gt | CompareOp::Ge => {
                if matches!(self, Value::Null) {
                    return matches!(op, CompareOp::Le | CompareOp::Ge);
                }
                if matches!(other, Value::Null) {
                    return false;
                }
                match self.partial_cmp_same_type(other) {
                    Some(ord) => match op {
                        CompareOp::Lt => ord == Ordering::Less,
                        CompareOp::Le => ord != Ordering::Greater,
                        CompareOp::Gt => ord == Ordering::Greater,
                        CompareOp::Ge => ord != Ordering::Less,
                        CompareOp::Eq | CompareOp::Ne => unreachable!(),
                    },
                    None => false,
                }
            }
        }
    }

    fn partial_cmp_same_type(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Number(a), Value::Number(b)) => a.numeric_cmp(b),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}
