/// A string member as the decoder stores it: pointer plus length.
///
/// The pointed-at bytes live in the decode arena, are valid UTF-8 and
/// carry a NUL terminator one byte past `len` (the terminator is not
/// part of the length), so the reference can be handed to C-flavored
/// hosts unchanged. The default value is the null reference, which is
/// what an omitted or `null` JSON member leaves behind.
#[derive(Debug, Clone, Copy)]
pub struct StrRef {
    ptr: *const u8,
    len: u32,
}

impl StrRef {
    /// The null reference.
    pub const EMPTY: StrRef = StrRef {
        ptr: core::ptr::null(),
        len: 0,
    };

    pub(crate) fn new(text: &str) -> StrRef {
        StrRef {
            ptr: text.as_ptr(),
            len: text.len() as u32,
        }
    }

    /// Returns `true` for the null reference.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.ptr.is_null()
    }

    /// Length in bytes, excluding the NUL terminator.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reborrows the referenced text. The null reference reads as `""`.
    ///
    /// # Safety
    ///
    /// The arena the decoder wrote this string into must still be alive
    /// and must not have been reset; the caller picks a lifetime that
    /// does not outlive it.
    #[must_use]
    #[allow(unsafe_code)]
    pub unsafe fn as_str<'s>(&self) -> &'s str {
        if self.ptr.is_null() {
            return "";
        }
        let bytes = core::slice::from_raw_parts(self.ptr, self.len as usize);
        core::str::from_utf8_unchecked(bytes)
    }
}

impl Default for StrRef {
    fn default() -> Self {
        StrRef::EMPTY
    }
}
