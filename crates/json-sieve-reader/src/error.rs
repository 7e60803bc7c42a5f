use thiserror::Error;

/// Malformed-document error, reported with a 1-based source position.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReadError {
    #[error("Malformed JSON at line {line}, column {column}: {msg}")]
    Syntax {
        msg: String,
        line: usize,
        column: usize,
    },
    #[error("Document is not valid UTF-8 at byte offset {0}")]
    InvalidUtf8(usize),
}
