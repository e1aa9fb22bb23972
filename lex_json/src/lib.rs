#![no_std]

//! `lex_json`: a pull lexer turning a JSON byte range into typed lexemes.
//!
//! The input is a fully buffered byte slice; the lexer walks it with a
//! one-lexeme lookahead and no allocations except for string payloads,
//! which are unescaped directly into a caller-provided
//! [`u8arena::Arena`] using its checkout/commit protocol. A borrowing
//! [`Scanner`] variant skips the unescaping work and hands out raw
//! source slices instead.
//!
//! This crate is `no_std` compatible.
//!
//! ```
//! # use lex_json::{Lexer, Lexeme, LexemeSource};
//! # use u8arena::Arena;
//! let mut backing = [0u8; 256];
//! let arena = Arena::new(&mut backing, "strings");
//!
//! let mut lexer = Lexer::new(br#"{ "label": "QU" }"#, &arena);
//! assert_eq!(lexer.next().unwrap(), Lexeme::BeginObject);
//! let key = lexer.next().unwrap();
//! assert_eq!(key.as_str(), Some("label"));
//! assert_eq!(lexer.next().unwrap(), Lexeme::NameSeparator);
//! assert_eq!(lexer.next().unwrap().as_str(), Some("QU"));
//! assert_eq!(lexer.next().unwrap(), Lexeme::EndObject);
//! assert_eq!(lexer.next().unwrap(), Lexeme::Eof);
//! ```

pub mod error;
pub mod flags;
mod lexeme;
mod lexer;
mod number;
mod scanner;
pub mod utf8;

pub use error::{LexError, LexErrorKind, Result};
pub use lexeme::{JsonStr, LexKind, Lexeme, LexemeSource};
pub use lexer::Lexer;
pub use number::{parse_number, JsonNumber};
pub use scanner::Scanner;
