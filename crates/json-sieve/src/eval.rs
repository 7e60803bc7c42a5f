//! Token-at-a-time drive loop.
//!
//! Pulls tokens from the reader and routes them through the cursor: values
//! off every registered path are skipped whole, scalars on a path are
//! decoded once and delivered, and the pass ends as soon as the predicate
//! root resolves, leaving the rest of the input unread.

use json_sieve_reader::{ReadError, Token, TokenRead};
use log::trace;

use crate::cursor::Cursor;
use crate::index::PathIndex;
use crate::predicate::PredicateTree;
use crate::value::{Number, Value};

pub(crate) fn run<R: TokenRead>(
    reader: &mut R,
    index: &PathIndex,
    tree: &mut PredicateTree,
    cursor: &mut Cursor,
) -> Result<bool, ReadError> {
    loop {
        if !tree.needs_more() {
            trace!("predicate resolved, abandoning remaining input");
            break;
        }
        match reader.peek()? {
            Token::Name => {
                let matched = {
                    let name = reader.next_name()?;
                    cursor.match_name(index, name)
                };
                if !matched {
                    reader.skip_value()?;
                }
            }
            Token::String | Token::Number | Token::Bool | Token::Null => {
                match cursor.value_begin(index) {
                    None => reader.skip_value()?,
                    Some(node) => {
                        for &pred in index.node(node).visitors() {
                            tree.visit(pred);
                        }
                        let value = read_scalar(reader)?;
                        for &receiver in index.node(node).receivers() {
                            tree.deliver(receiver, &value);
                        }
                        cursor.value_end(index);
                    }
                }
            }
            Token::BeginObject => match cursor.value_begin(index) {
                None => reader.skip_value()?,
                Some(node) => {
                    for &pred in index.node(node).visitors() {
                        tree.visit(pred);
                    }
                    if index.has_children(node) {
                        reader.begin_object()?;
                        cursor.begin_object();
                    } else {
                        // nothing inside can matter
                        reader.skip_value()?;
                        cursor.value_end(index);
                    }
                }
            },
            Token::BeginArray => match cursor.value_begin(index) {
                None => reader.skip_value()?,
                Some(node) => {
                    for &pred in index.node(node).visitors() {
                        tree.visit(pred);
                    }
                    if index.has_children(node) {
                        reader.begin_array()?;
                        cursor.begin_array();
                    } else {
                        reader.skip_value()?;
                        cursor.value_end(index);
                    }
                }
            },
            Token::EndObject => {
                reader.end_object()?;
                cursor.end_object();
                cursor.value_end(index);
            }
            Token::EndArray => {
                reader.end_array()?;
                cursor.end_array();
                cursor.value_end(index);
            }
            Token::EndDocument => break,
        }
    }
    if tree.needs_more() {
        tree.resolve_defaults();
    }
    Ok(tree.result())
}

fn read_scalar<R: TokenRead>(reader: &mut R) -> Result<Value, ReadError> {
    Ok(match reader.peek()? {
        Token::String => Value::String(reader.next_string()?),
        Token::Number => Value::Number(Number::parse(reader.next_number()?)),
        Token::Bool => Value::Bool(reader.next_bool()?),
        Token::Null => {
            reader.next_null()?;
            Value::Null
        }
        other => panic!("not a scalar token: {other:?}"),
    })
}
