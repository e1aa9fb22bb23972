#![no_std]

//! `tree_json`: a JSON document tree materialized into a caller-provided
//! arena.
//!
//! [`parse`] runs the unescaping lexer and yields a [`JsonValue`] tree
//! whose strings are unescaped, NUL-terminated arena text. [`scan`] is
//! the faster borrowing variant: strings reference the source buffer
//! with escape sequences left intact. Both build the same linked-list
//! DOM — objects and arrays hold a count and a head pointer to cells
//! allocated in the arena, in source order — and neither ever touches a
//! general allocator.
//!
//! This crate is `no_std` compatible.
//!
//! ```
//! # use tree_json::parse;
//! # use u8arena::Arena;
//! let mut backing = [0u8; 1024];
//! let mut scratch_backing = [0u8; 256];
//! let arena = Arena::new(&mut backing, "doc");
//! let scratch = Arena::new(&mut scratch_backing, "scratch");
//!
//! let root = parse(br#"{"a": 1, "b": [true, null]}"#, &arena, &scratch).unwrap();
//! let object = root.as_object().unwrap();
//! assert_eq!(object.len(), 2);
//! assert_eq!(object.find("a").unwrap().as_number().unwrap().as_u64(), 1);
//! assert_eq!(object.find("b").unwrap().as_array().unwrap().len(), 2);
//! ```

pub mod error;
mod parser;
mod value;

pub use error::{ParseError, Result};
pub use parser::{parse, scan};
pub use value::{JsonArray, JsonObject, JsonValue, MemberIter, NamedNode, ValueIter, ValueNode};
