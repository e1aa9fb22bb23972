use crate::core::Arena;
use crate::error::{ArenaError, Result};

/// An in-place writer over the unused tail of an [`Arena`] buffer.
///
/// Obtained from [`Arena::checkout`]. Bytes are appended with
/// [`Checkout::write`] and [`Checkout::write_byte`]; the arena cursor only
/// moves when the checkout is [committed](Checkout::commit). Dropping the
/// checkout instead leaves the arena exactly as it was.
///
/// `Checkout` also implements [`core::fmt::Write`], so formatted text can
/// be built directly inside an arena:
///
/// ```
/// # use u8arena::Arena;
/// use core::fmt::Write;
///
/// let mut backing = [0u8; 64];
/// let arena = Arena::new(&mut backing, "messages");
///
/// let mut out = arena.checkout().unwrap();
/// write!(out, "line {}: {}", 3, "bad number").unwrap();
/// assert_eq!(out.commit(), b"line 3: bad number");
/// ```
#[derive(Debug)]
pub struct Checkout<'a, 'buf> {
    arena: &'a Arena<'buf>,
    start: usize,
    len: usize,
}

impl<'a, 'buf> Checkout<'a, 'buf> {
    pub(crate) fn new(arena: &'a Arena<'buf>, start: usize) -> Self {
        Checkout {
            arena,
            start,
            len: 0,
        }
    }

    /// Returns the number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if nothing has been written yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends a byte slice.
    ///
    /// # Errors
    ///
    /// Returns `ArenaError::OutOfArena` if the bytes do not fit in the
    /// remaining buffer tail; nothing is written in that case.
    pub fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let available = self.arena.capacity() - self.start - self.len;
        if bytes.len() > available {
            return Err(ArenaError::OutOfArena {
                name: self.arena.name(),
                requested: bytes.len(),
                available,
            });
        }
        // Safe: `start + len + bytes.len() <= capacity` was checked above,
        // and the tail past the cursor holds no live allocation.
        #[allow(unsafe_code)]
        unsafe {
            let dst = self.arena.base_ptr().add(self.start + self.len);
            core::ptr::copy_nonoverlapping(bytes.as_ptr(), dst, bytes.len());
        }
        self.len += bytes.len();
        Ok(())
    }

    /// Appends a single byte.
    ///
    /// # Errors
    ///
    /// Returns `ArenaError::OutOfArena` if the buffer tail is full.
    pub fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.write(core::slice::from_ref(&byte))
    }

    /// Commits the written bytes: advances the arena cursor past them and
    /// returns them as a slice that lives as long as the arena borrow.
    #[must_use]
    pub fn commit(self) -> &'a [u8] {
        self.arena.set_cursor(self.start + self.len);
        // Safe: the committed range was bounds-checked on every write and
        // is now owned by the advanced cursor.
        #[allow(unsafe_code)]
        let bytes =
            unsafe { core::slice::from_raw_parts(self.arena.base_ptr().add(self.start), self.len) };
        bytes
    }
}

impl core::fmt::Write for Checkout<'_, '_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.write(s.as_bytes()).map_err(|_| core::fmt::Error)
    }
}
