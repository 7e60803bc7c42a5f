//! Forward-only streaming JSON token reader.
//!
//! Exposes a pull interface over a JSON document: peek the kind of the next
//! token, consume it, or skip a whole value without decoding it. The reader
//! never builds a document tree; skipped subtrees cost a raw scan and no
//! allocation.
//!
//! # Example
//!
//! ```
//! use json_sieve_reader::{JsonReader, Token, TokenRead};
//!
//! let mut reader = JsonReader::new(r#"{"a": 1, "b": [2, 3]}"#, false);
//! reader.begin_object()?;
//! assert_eq!(reader.next_name()?, "a");
//! assert_eq!(reader.next_number()?, "1");
//! assert_eq!(reader.next_name()?, "b");
//! reader.skip_value()?;
//! reader.end_object()?;
//! assert_eq!(reader.peek()?, Token::EndDocument);
//! # Ok::<(), json_sieve_reader::ReadError>(())
//! ```

mod error;
pub use error::ReadError;

mod tokens;
pub use tokens::{Token, TokenRead};

mod reader;
pub use reader::JsonReader;
