use crate::error::ReadError;

/// Kind of the next item in the token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    /// An object member name; consume with `next_name`.
    Name,
    String,
    Number,
    Bool,
    Null,
    EndDocument,
}

/// Forward-only cursor over one JSON document.
///
/// The contract the filter engine drives against: peek the next token kind,
/// consume it with the matching `next_*`/`begin_*`/`end_*` call, or discard
/// the upcoming value (scalar or whole container) with `skip_value` without
/// decoding its contents.
pub trait TokenRead {
    fn peek(&mut self) -> Result<Token, ReadError>;

    fn begin_object(&mut self) -> Result<(), ReadError>;
    fn end_object(&mut self) -> Result<(), ReadError>;
    fn begin_array(&mut self) -> Result<(), ReadError>;
    fn end_array(&mut self) -> Result<(), ReadError>;

    /// Consume an object member name.
    fn next_name(&mut self) -> Result<&str, ReadError>;
    /// Consume a string value.
    fn next_string(&mut self) -> Result<String, ReadError>;
    /// Consume a number value, returning its lexical form.
    fn next_number(&mut self) -> Result<&str, ReadError>;
    fn next_bool(&mut self) -> Result<bool, ReadError>;
    fn next_null(&mut self) -> Result<(), ReadError>;

    /// Skip the upcoming value in O(its size): a scalar, or a whole
    /// object/array including everything nested. At a member-name position,
    /// skips the name only.
    fn skip_value(&mut self) -> Result<(), ReadError>;
}
