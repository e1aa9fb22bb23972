#![no_std]

//! `bind_json`: a schema-driven reflective JSON codec.
//!
//! Instead of a generic document tree, this crate binds JSON directly to
//! native structs described by static [`TypeDescr`]/[`FieldDescr`]
//! tables: field names, kinds, byte offsets, pointer-vs-inline placement
//! and the width of runtime length fields. Given such a description and
//! a byte range, [`decode`] materializes a fully populated instance
//! graph into caller-provided arenas — no general allocator, no second
//! pass. [`encode`] walks the same tables to emit pretty-printed JSON.
//!
//! Three ways in:
//!
//! * [`decode`] — recursive reflective decoder, lexeme stream to
//!   instance in one pass;
//! * [`Decoder`] — iterative, explicit-stack walker over a scanned
//!   document, for hosts that drive decoding field by field and for
//!   untrusted input whose nesting must not consume program stack;
//! * [`encode`] / [`encode_to_slice`] — instance back to JSON text
//!   through any [`embedded_io::Write`] sink.
//!
//! This crate is `no_std` compatible.

pub mod error;
mod decode;
mod decoder;
mod encode;
mod schema;
mod strref;

pub use decode::{decode, DecodeStats};
pub use decoder::{ArrayElem, Decoder, Step, MAX_DEPTH};
pub use encode::{encode, encode_to_slice, SliceWriter};
pub use error::{DecodeError, DecoderError, EncodeError};
pub use schema::{
    default_enum_from_str, default_enum_to_str, default_init, raw_copy, CopyFn, EnumDescr,
    EnumFromStrFn, EnumToStrFn, EnumWidth, FieldDescr, InitFn, Kind, LenField, LenWidth,
    ObjectDescr, Placement, Reflect, TypeDescr, TypeShape,
};
pub use strref::StrRef;
