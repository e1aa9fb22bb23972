//! The iterative decoder: an explicit frame stack over a scanned
//! document, for hosts that drive decoding field by field with their
//! own member matching, and for untrusted input whose nesting must not
//! consume program stack.

use lex_json::JsonNumber;
use tree_json::{scan, JsonValue, MemberIter, ParseError, ValueIter};
use u8arena::Arena;

use crate::error::DecoderError;
use crate::strref::StrRef;

/// Nesting capacity of the frame stack. Frames are reused in place, so
/// this bounds working memory for any document.
pub const MAX_DEPTH: usize = 64;

/// One step of a container walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Positioned at the next member or element.
    Continue,
    /// The container is done and the cursor is back at its owner.
    End,
}

#[derive(Debug, Clone, Copy)]
enum Cursor<'t> {
    Object {
        iter: MemberIter<'t>,
        member: Option<(&'t str, &'t JsonValue<'t>)>,
    },
    Array {
        iter: ValueIter<'t>,
        element: Option<&'t JsonValue<'t>>,
    },
}

#[derive(Debug, Clone, Copy)]
struct Frame<'t> {
    cursor: Cursor<'t>,
}

/// Converts one document value into an array element, defaulting on a
/// kind mismatch the way the typed getters do.
pub trait ArrayElem: Sized + Copy + Default {
    fn from_value(value: &JsonValue<'_>) -> Self;
}

macro_rules! int_elem {
    ($($ty:ty : $get:ident),* $(,)?) => {
        $(impl ArrayElem for $ty {
            fn from_value(value: &JsonValue<'_>) -> Self {
                value.as_number().map_or(0 as $ty, |n| n.$get() as $ty)
            }
        })*
    };
}

int_elem!(
    i8: as_i64, i16: as_i64, i32: as_i64, i64: as_i64,
    u8: as_u64, u16: as_u64, u32: as_u64, u64: as_u64,
    f32: as_f64, f64: as_f64,
);

impl ArrayElem for bool {
    fn from_value(value: &JsonValue<'_>) -> Self {
        value.as_bool().unwrap_or(false)
    }
}

/// The field-by-field decoder.
///
/// [`Decoder::new`] scans the whole document into `scratch` first; the
/// walk itself is iterative over an explicit stack, so document nesting
/// is bounded by [`MAX_DEPTH`] instead of the program stack. Values the
/// host keeps (strings, arrays) are copied into `out`.
///
/// The walking protocol mirrors the container grammar:
///
/// ```
/// # use bind_json::{Decoder, Step};
/// # use u8arena::Arena;
/// let mut out_backing = [0u8; 256];
/// let mut scratch_backing = [0u8; 1024];
/// let out = Arena::new(&mut out_backing, "out");
/// let scratch = Arena::new(&mut scratch_backing, "scratch");
///
/// let mut decoder = Decoder::new(br#"{"x": 1, "y": 2}"#, &out, &scratch).unwrap();
/// let mut x = 0i32;
/// let mut y = 0i32;
/// let mut step = decoder.read_object_begin().unwrap();
/// while step == Step::Continue {
///     if decoder.field_is("x") {
///         decoder.decode_i32(&mut x);
///     } else if decoder.field_is("y") {
///         decoder.decode_i32(&mut y);
///     }
///     step = decoder.read_object_end().unwrap();
/// }
/// assert_eq!((x, y), (1, 2));
/// ```
#[derive(Debug)]
pub struct Decoder<'a, 'ob> {
    out: &'a Arena<'ob>,
    root: Option<&'a JsonValue<'a>>,
    frames: [Option<Frame<'a>>; MAX_DEPTH],
    depth: usize,
    current: Option<Frame<'a>>,
}

impl<'a, 'ob> Decoder<'a, 'ob> {
    /// Scans `input` into `scratch` and readies the walk at the root
    /// value. `out` receives everything the typed getters allocate.
    ///
    /// # Errors
    ///
    /// Any scan failure, message formatted into `scratch`.
    pub fn new(
        input: &'a [u8],
        out: &'a Arena<'ob>,
        scratch: &'a Arena<'_>,
    ) -> Result<Self, ParseError<'a>> {
        let root = scan(input, scratch, scratch)?;
        Ok(Decoder {
            out,
            root: Some(root),
            frames: [None; MAX_DEPTH],
            depth: 0,
            current: None,
        })
    }

    // The value the next begin-call would enter: the document root, or
    // the current member/element of the top frame.
    fn value_at_cursor(&self) -> Option<&'a JsonValue<'a>> {
        if let Some(root) = self.root {
            return Some(root);
        }
        match self.current.as_ref()?.cursor {
            Cursor::Object { member, .. } => member.map(|(_, value)| value),
            Cursor::Array { element, .. } => element,
        }
    }

    // Same, but never the root: the value the typed getters read.
    fn current_value(&self) -> Option<&'a JsonValue<'a>> {
        if self.root.is_some() {
            return None;
        }
        self.value_at_cursor()
    }

    fn push(&mut self, frame: Frame<'a>) -> Result<(), DecoderError> {
        if let Some(current) = self.current.take() {
            if self.depth >= MAX_DEPTH {
                self.current = Some(current);
                return Err(DecoderError::StackOverflow);
            }
            self.frames[self.depth] = Some(current);
            self.depth += 1;
        }
        self.current = Some(frame);
        Ok(())
    }

    fn pop(&mut self) {
        self.current = if self.depth > 0 {
            self.depth -= 1;
            self.frames[self.depth].take()
        } else {
            None
        };
    }

    /// Enters the object at the cursor and advances to its first
    /// member. `End` means the object was empty.
    ///
    /// # Errors
    ///
    /// `NotAnObject` if the cursor value is something else;
    /// `StackOverflow` past [`MAX_DEPTH`].
    pub fn read_object_begin(&mut self) -> Result<Step, DecoderError> {
        let Some(JsonValue::Object(object)) = self.value_at_cursor() else {
            return Err(DecoderError::NotAnObject);
        };
        self.push(Frame {
            cursor: Cursor::Object {
                iter: object.iter(),
                member: None,
            },
        })?;
        self.root = None;
        self.advance_object()
    }

    /// Advances to the next member; `End` leaves the cursor back at the
    /// member that held this object.
    ///
    /// # Errors
    ///
    /// `NotAnObject` if the top frame is not an object walk.
    pub fn read_object_end(&mut self) -> Result<Step, DecoderError> {
        self.advance_object()
    }

    fn advance_object(&mut self) -> Result<Step, DecoderError> {
        let Some(frame) = self.current.as_mut() else {
            return Err(DecoderError::NotAnObject);
        };
        let Cursor::Object { iter, member } = &mut frame.cursor else {
            return Err(DecoderError::NotAnObject);
        };
        *member = iter.next();
        if member.is_none() {
            self.pop();
            Ok(Step::End)
        } else {
            Ok(Step::Continue)
        }
    }

    /// Enters the array at the cursor and advances to its first
    /// element. Also reports the element count.
    ///
    /// # Errors
    ///
    /// `NotAnArray` / `StackOverflow`, as for objects.
    pub fn read_array_begin(&mut self) -> Result<(Step, usize), DecoderError> {
        let Some(JsonValue::Array(array)) = self.value_at_cursor() else {
            return Err(DecoderError::NotAnArray);
        };
        let size = array.len();
        self.push(Frame {
            cursor: Cursor::Array {
                iter: array.iter(),
                element: None,
            },
        })?;
        self.root = None;
        Ok((self.advance_array()?, size))
    }

    /// Advances to the next element; `End` leaves the cursor back at
    /// the member that held this array.
    ///
    /// # Errors
    ///
    /// `NotAnArray` if the top frame is not an array walk.
    pub fn read_array_end(&mut self) -> Result<Step, DecoderError> {
        self.advance_array()
    }

    fn advance_array(&mut self) -> Result<Step, DecoderError> {
        let Some(frame) = self.current.as_mut() else {
            return Err(DecoderError::NotAnArray);
        };
        let Cursor::Array { iter, element } = &mut frame.cursor else {
            return Err(DecoderError::NotAnArray);
        };
        *element = iter.next();
        if element.is_none() {
            self.pop();
            Ok(Step::End)
        } else {
            Ok(Step::Continue)
        }
    }

    /// The name of the member at the cursor, if an object walk is
    /// positioned on one.
    #[must_use]
    pub fn field_name(&self) -> Option<&'a str> {
        match self.current.as_ref()?.cursor {
            Cursor::Object { member, .. } => member.map(|(name, _)| name),
            Cursor::Array { .. } => None,
        }
    }

    /// Whether the member at the cursor has the given name.
    #[must_use]
    pub fn field_is(&self, name: &str) -> bool {
        self.field_name() == Some(name)
    }

    /// Walks the members of the object at the cursor, invoking
    /// `decode_field` with each member name.
    ///
    /// # Errors
    ///
    /// Walk errors, and whatever `decode_field` returns.
    pub fn decode_object<F>(&mut self, mut decode_field: F) -> Result<(), DecoderError>
    where
        F: FnMut(&mut Decoder<'a, 'ob>, &'a str) -> Result<(), DecoderError>,
    {
        let mut step = self.read_object_begin()?;
        while step == Step::Continue {
            let name = self.field_name().unwrap_or("");
            decode_field(self, name)?;
            step = self.read_object_end()?;
        }
        Ok(())
    }

    fn number(&self) -> JsonNumber {
        self.current_value()
            .and_then(JsonValue::as_number)
            .copied()
            .unwrap_or(JsonNumber::unknown())
    }

    /// Reads the boolean at the cursor; anything else reads as `false`.
    pub fn decode_bool(&self, out: &mut bool) {
        *out = self
            .current_value()
            .and_then(JsonValue::as_bool)
            .unwrap_or(false);
    }

    pub fn decode_i8(&self, out: &mut i8) {
        *out = self.number().as_i64() as i8;
    }

    pub fn decode_i16(&self, out: &mut i16) {
        *out = self.number().as_i64() as i16;
    }

    pub fn decode_i32(&self, out: &mut i32) {
        *out = self.number().as_i64() as i32;
    }

    pub fn decode_i64(&self, out: &mut i64) {
        *out = self.number().as_i64();
    }

    pub fn decode_u8(&self, out: &mut u8) {
        *out = self.number().as_u64() as u8;
    }

    pub fn decode_u16(&self, out: &mut u16) {
        *out = self.number().as_u64() as u16;
    }

    pub fn decode_u32(&self, out: &mut u32) {
        *out = self.number().as_u64() as u32;
    }

    pub fn decode_u64(&self, out: &mut u64) {
        *out = self.number().as_u64();
    }

    pub fn decode_f32(&self, out: &mut f32) {
        *out = self.number().as_f64() as f32;
    }

    pub fn decode_f64(&self, out: &mut f64) {
        *out = self.number().as_f64();
    }

    /// Copies the string at the cursor into the output arena,
    /// NUL-terminated. Anything else reads as the null reference.
    ///
    /// # Errors
    ///
    /// `OutOfArena` if the output arena is full.
    pub fn decode_string(&mut self, out: &mut StrRef) -> Result<(), DecoderError> {
        let Some(text) = self.current_value().and_then(JsonValue::as_str) else {
            *out = StrRef::EMPTY;
            return Ok(());
        };
        *out = self.alloc_string(text)?;
        Ok(())
    }

    /// Copies the string at the cursor into `out`, clamped to its
    /// capacity minus a NUL terminator. Returns the copied length.
    pub fn decode_str_buf(&self, out: &mut [u8]) -> usize {
        if out.is_empty() {
            return 0;
        }
        let text = self
            .current_value()
            .and_then(JsonValue::as_str)
            .unwrap_or("");
        let copy_len = text.len().min(out.len() - 1);
        out[..copy_len].copy_from_slice(&text.as_bytes()[..copy_len]);
        out[copy_len] = 0;
        copy_len
    }

    /// Parses the string at the cursor as a `|`-joined flag list.
    #[must_use]
    pub fn decode_enum_flags(&self, names: &[&str]) -> u64 {
        let Some(text) = self.current_value().and_then(JsonValue::as_str) else {
            return 0;
        };
        lex_json::flags::flags_from_str(text, names)
    }

    /// Walks the array at the cursor into a fresh output-arena slice,
    /// clamped to `max_len` elements; the rest are walked and dropped.
    ///
    /// # Errors
    ///
    /// `NotAnArray` if the cursor value is not an array, `OutOfArena`
    /// if the output arena is full.
    pub fn decode_array<T: ArrayElem>(&mut self, max_len: usize) -> Result<&'a [T], DecoderError> {
        let (mut step, size) = self.read_array_begin()?;
        let take = size.min(max_len);

        let ptr = self
            .out
            .alloc(take * core::mem::size_of::<T>(), core::mem::align_of::<T>())?
            .as_ptr()
            .cast::<T>();

        let mut index = 0usize;
        while step == Step::Continue {
            if index < take {
                let value = self
                    .current_value()
                    .map_or_else(T::default, |v| T::from_value(v));
                // Safe: `index < take` and the allocation above holds
                // `take` elements of T.
                #[allow(unsafe_code)]
                unsafe {
                    ptr.add(index).write(value);
                }
            }
            index += 1;
            step = self.read_array_end()?;
        }

        // Safe: the first `take` elements were initialized above
        // (`index` reaches `size >= take`).
        #[allow(unsafe_code)]
        let slice = unsafe { core::slice::from_raw_parts(ptr, take.min(index)) };
        Ok(slice)
    }

    /// Walks the array at the cursor into a caller buffer, clamped to
    /// its capacity. Returns the element count written.
    ///
    /// # Errors
    ///
    /// `NotAnArray` if the cursor value is not an array.
    pub fn decode_carray<T: ArrayElem>(&mut self, out: &mut [T]) -> Result<usize, DecoderError> {
        let (mut step, _) = self.read_array_begin()?;
        let mut index = 0usize;
        while step == Step::Continue {
            if let Some(slot) = out.get_mut(index) {
                *slot = self
                    .current_value()
                    .map_or_else(T::default, |v| T::from_value(v));
            }
            index += 1;
            step = self.read_array_end()?;
        }
        Ok(index.min(out.len()))
    }

    /// Like [`Decoder::decode_array`] for string elements; each one is
    /// copied into the output arena NUL-terminated.
    ///
    /// # Errors
    ///
    /// `NotAnArray` / `OutOfArena`, as for `decode_array`.
    pub fn decode_string_array(&mut self, max_len: usize) -> Result<&'a [StrRef], DecoderError> {
        let (mut step, size) = self.read_array_begin()?;
        let take = size.min(max_len);

        let ptr = self
            .out
            .alloc(
                take * core::mem::size_of::<StrRef>(),
                core::mem::align_of::<StrRef>(),
            )?
            .as_ptr()
            .cast::<StrRef>();

        let mut index = 0usize;
        while step == Step::Continue {
            if index < take {
                let value = match self.current_value().and_then(JsonValue::as_str) {
                    Some(text) => self.alloc_string(text)?,
                    None => StrRef::EMPTY,
                };
                // Safe: as in decode_array.
                #[allow(unsafe_code)]
                unsafe {
                    ptr.add(index).write(value);
                }
            }
            index += 1;
            step = self.read_array_end()?;
        }

        // Safe: as in decode_array.
        #[allow(unsafe_code)]
        let slice = unsafe { core::slice::from_raw_parts(ptr, take.min(index)) };
        Ok(slice)
    }

    fn alloc_string(&self, text: &str) -> Result<StrRef, DecoderError> {
        let mut out = self.out.checkout()?;
        out.write(text.as_bytes())?;
        out.write_byte(0)?;
        let bytes = out.commit();
        // Safe: the bytes are a verbatim copy of a &str.
        #[allow(unsafe_code)]
        let text = unsafe { core::str::from_utf8_unchecked(&bytes[..bytes.len() - 1]) };
        Ok(StrRef::new(text))
    }
}
