#![no_std]

//! `u8arena`: a zero-allocation linear allocator using client-provided buffers.
//!
//! An [`Arena`] binds a single byte buffer supplied by the caller and hands
//! out pointer-aligned allocations by advancing a cursor. Nothing is ever
//! freed individually; instead the cursor can be rewound wholesale with
//! [`Arena::reset`] or regionally with a [`Scope`]. All operations are
//! bounds-checked and no internal allocations are performed.
//!
//! This crate is `no_std` compatible.
//!
//! ```
//! # use u8arena::Arena;
//! let mut backing = [0u8; 256];
//! let arena = Arena::new(&mut backing, "example");
//!
//! let a = arena.alloc_value(42u32).unwrap();
//! let b = arena.alloc_value(7u64).unwrap();
//! assert_eq!(*a + *b as u32, 49);
//! ```
//!
//! # Checkout / commit
//!
//! Values of unknown length (for example an unescaped JSON string) can be
//! written directly into the arena without an intermediate buffer: a
//! [`Checkout`] borrows the unused tail of the buffer, bytes are appended
//! to it, and [`Checkout::commit`] advances the cursor over exactly what
//! was written. Dropping a checkout without committing leaves the cursor
//! untouched.
//!
//! ```
//! # use u8arena::Arena;
//! let mut backing = [0u8; 64];
//! let arena = Arena::new(&mut backing, "strings");
//!
//! let mut out = arena.checkout().unwrap();
//! out.write(b"hello, ").unwrap();
//! out.write(b"world").unwrap();
//! let s = out.commit();
//! assert_eq!(s, b"hello, world");
//! ```

mod checkout;
mod core;
mod error;
mod scope;

pub use crate::core::Arena;
pub use checkout::Checkout;
pub use error::{ArenaError, Result};
pub use scope::Scope;
