//! The reflective encoder: walks a populated instance in field order
//! and emits pretty-printed JSON through an [`embedded_io::Write`]
//! sink.

use core::fmt;

use embedded_io::{Error as _, Write};

use crate::error::EncodeError;
use crate::schema::{EnumDescr, EnumWidth, FieldDescr, Kind, LenWidth, Placement, Reflect, TypeDescr};
use crate::strref::StrRef;

/// Encodes `root` as pretty-printed JSON (2-space indent, newline
/// separated members) into any byte sink.
///
/// Pointer members that are null are omitted entirely. String values
/// are escaped (`"`, `\`, control bytes) so the output re-parses to the
/// same instance.
///
/// # Errors
///
/// `BufferFull` when the sink accepts no more bytes, or the sink's own
/// error kind. The output is not guaranteed well formed after a
/// failure.
pub fn encode<T: Reflect, W: Write>(root: &T, out: &mut W) -> Result<(), EncodeError> {
    let mut doc = Doc { out, indent: 0 };
    let object = ConstRef {
        descr: T::descr(),
        instance: (root as *const T).cast::<u8>(),
    };
    encode_object(&mut doc, object)
}

/// Like [`encode`], into a caller buffer; returns the encoded text.
///
/// # Errors
///
/// `BufferFull` if the buffer is too small.
pub fn encode_to_slice<'w, T: Reflect>(
    root: &T,
    buf: &'w mut [u8],
) -> Result<&'w str, EncodeError> {
    let len = {
        let mut writer = SliceWriter::new(&mut *buf);
        if let Err(error) = encode(root, &mut writer) {
            return Err(match error {
                EncodeError::Sink(_) => EncodeError::BufferFull,
                other => other,
            });
        }
        writer.len()
    };
    // `len <= buf.len()` by the SliceWriter contract.
    #[allow(clippy::indexing_slicing)]
    let written = &buf[..len];
    core::str::from_utf8(written).map_err(|_| EncodeError::InvalidUtf8)
}

/// A [`Write`] sink over a caller byte buffer.
#[derive(Debug)]
pub struct SliceWriter<'w> {
    buf: &'w mut [u8],
    pos: usize,
}

impl<'w> SliceWriter<'w> {
    pub fn new(buf: &'w mut [u8]) -> Self {
        SliceWriter { buf, pos: 0 }
    }

    /// Number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pos
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pos == 0
    }

    /// The bytes written so far.
    // `pos <= buf.len()` is maintained by `write`.
    #[must_use]
    #[allow(clippy::indexing_slicing)]
    pub fn written(&self) -> &[u8] {
        &self.buf[..self.pos]
    }
}

/// The error of a full [`SliceWriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceFull;

impl embedded_io::Error for SliceFull {
    fn kind(&self) -> embedded_io::ErrorKind {
        embedded_io::ErrorKind::Other
    }
}

impl embedded_io::ErrorType for SliceWriter<'_> {
    type Error = SliceFull;
}

impl Write for SliceWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, SliceFull> {
        if buf.is_empty() {
            return Ok(0);
        }
        let available = self.buf.len() - self.pos;
        if available == 0 {
            return Err(SliceFull);
        }
        let n = buf.len().min(available);
        // `pos + n <= buf.len()` by construction of `n`.
        #[allow(clippy::indexing_slicing)]
        self.buf[self.pos..self.pos + n].copy_from_slice(&buf[..n]);
        self.pos += n;
        Ok(n)
    }

    fn flush(&mut self) -> Result<(), SliceFull> {
        Ok(())
    }
}

fn sink<W: Write>(out: &mut W, mut bytes: &[u8]) -> Result<(), EncodeError> {
    while !bytes.is_empty() {
        match out.write(bytes) {
            Ok(0) => return Err(EncodeError::BufferFull),
            // `n <= bytes.len()` per the Write contract.
            #[allow(clippy::indexing_slicing)]
            Ok(n) => bytes = &bytes[n..],
            Err(error) => return Err(EncodeError::Sink(error.kind())),
        }
    }
    Ok(())
}

// Adapts the byte sink to `core::fmt::Write` for the enum text
// capability, carrying the real error across the fmt boundary.
struct FmtAdapter<'x, W: Write> {
    out: &'x mut W,
    error: Option<EncodeError>,
}

impl<W: Write> fmt::Write for FmtAdapter<'_, W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        match sink(self.out, s.as_bytes()) {
            Ok(()) => Ok(()),
            Err(error) => {
                self.error = Some(error);
                Err(fmt::Error)
            }
        }
    }
}

const INDENT_RUN: [u8; 64] = [b' '; 64];
const HEX: &[u8; 16] = b"0123456789abcdef";

struct Doc<'w, W: Write> {
    out: &'w mut W,
    indent: usize,
}

impl<W: Write> Doc<'_, W> {
    fn raw(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        sink(self.out, bytes)
    }

    fn write_indent(&mut self) -> Result<(), EncodeError> {
        let mut n = self.indent;
        while n > INDENT_RUN.len() {
            self.raw(&INDENT_RUN)?;
            n -= INDENT_RUN.len();
        }
        self.raw(&INDENT_RUN[..n])
    }

    fn start_object(&mut self) -> Result<(), EncodeError> {
        self.indent += 2;
        self.raw(b"{\n")
    }

    fn end_object(&mut self) -> Result<(), EncodeError> {
        self.indent -= 2;
        self.write_indent()?;
        self.raw(b"}")
    }

    fn start_array(&mut self) -> Result<(), EncodeError> {
        self.indent += 2;
        self.raw(b"[\n")
    }

    fn end_array(&mut self) -> Result<(), EncodeError> {
        self.indent -= 2;
        self.write_indent()?;
        self.raw(b"]")
    }

    fn start_field(&mut self, name: &str) -> Result<(), EncodeError> {
        self.write_indent()?;
        self.raw(b"\"")?;
        self.raw(name.as_bytes())?;
        self.raw(b"\": ")
    }

    fn member_end(&mut self, last: bool) -> Result<(), EncodeError> {
        self.raw(if last { b"\n" } else { b",\n" })
    }

    fn value_bool(&mut self, value: bool) -> Result<(), EncodeError> {
        self.raw(if value { b"true" } else { b"false" })
    }

    fn value_int<I: itoa::Integer>(&mut self, value: I) -> Result<(), EncodeError> {
        let mut buffer = itoa::Buffer::new();
        let text = buffer.format(value);
        self.raw(text.as_bytes())
    }

    fn value_float<F: ryu::Float>(&mut self, value: F) -> Result<(), EncodeError> {
        let mut buffer = ryu::Buffer::new();
        let text = buffer.format(value);
        self.raw(text.as_bytes())
    }

    fn value_string(&mut self, text: &str) -> Result<(), EncodeError> {
        self.raw(b"\"")?;
        let bytes = text.as_bytes();
        let mut start = 0usize;
        for (i, &byte) in bytes.iter().enumerate() {
            let escape: Option<[u8; 2]> = match byte {
                b'"' => Some(*br#"\""#),
                b'\\' => Some(*br"\\"),
                0x08 => Some(*br"\b"),
                0x0C => Some(*br"\f"),
                b'\n' => Some(*br"\n"),
                b'\r' => Some(*br"\r"),
                b'\t' => Some(*br"\t"),
                _ => None,
            };
            if let Some(escape) = escape {
                self.raw(&bytes[start..i])?;
                self.raw(&escape)?;
                start = i + 1;
            } else if byte < 0x20 {
                self.raw(&bytes[start..i])?;
                let hex = [
                    b'\\',
                    b'u',
                    b'0',
                    b'0',
                    HEX[(byte >> 4) as usize],
                    HEX[(byte & 0xf) as usize],
                ];
                self.raw(&hex)?;
                start = i + 1;
            }
        }
        self.raw(&bytes[start..])?;
        self.raw(b"\"")
    }

    fn value_enum(&mut self, value: u64, descr: &EnumDescr) -> Result<(), EncodeError> {
        self.raw(b"\"")?;
        let mut adapter = FmtAdapter {
            out: &mut *self.out,
            error: None,
        };
        if (descr.to_str)(value, descr.names, &mut adapter).is_err() {
            return Err(adapter.error.unwrap_or(EncodeError::BufferFull));
        }
        self.raw(b"\"")
    }
}

#[derive(Clone, Copy)]
struct ConstRef {
    descr: &'static TypeDescr,
    instance: *const u8,
}

fn fields_of(descr: &'static TypeDescr) -> &'static [FieldDescr] {
    descr.as_object().map_or(&[], |o| o.fields)
}

// A null pointer member is omitted entirely: no key, no value.
fn field_emitted(object: ConstRef, field: &FieldDescr) -> bool {
    if !matches!(field.placement, Placement::Pointer) {
        return true;
    }
    // Safe: the Reflect contract guarantees a pointer member at this
    // offset.
    #[allow(unsafe_code)]
    let pointer = unsafe {
        object
            .instance
            .add(field.offset)
            .cast::<*const u8>()
            .read()
    };
    !pointer.is_null()
}

fn encode_object<W: Write>(doc: &mut Doc<'_, W>, object: ConstRef) -> Result<(), EncodeError> {
    let fields = fields_of(object.descr);
    doc.start_object()?;

    let emit_count = fields
        .iter()
        .filter(|field| field_emitted(object, field))
        .count();
    let mut emitted = 0usize;

    for field in fields {
        if !field_emitted(object, field) {
            continue;
        }
        emitted += 1;
        let last = emitted == emit_count;

        doc.start_field(field.name)?;
        match field.placement {
            Placement::Array { .. } | Placement::ArrayPtr { .. } => {
                encode_array(doc, object, field)?;
            }
            _ => {
                let data = member_value_ptr(object, field);
                encode_value(doc, field, data)?;
            }
        }
        doc.member_end(last)?;
    }

    doc.end_object()
}

// The address holding the member's value, dereferencing pointer
// placement.
fn member_value_ptr(object: ConstRef, field: &FieldDescr) -> *const u8 {
    // Safe: the Reflect contract.
    #[allow(unsafe_code)]
    let data = unsafe {
        let slot = object.instance.add(field.offset);
        if matches!(field.placement, Placement::Pointer) {
            slot.cast::<*const u8>().read()
        } else {
            slot
        }
    };
    data
}

fn encode_array<W: Write>(
    doc: &mut Doc<'_, W>,
    object: ConstRef,
    field: &'static FieldDescr,
) -> Result<(), EncodeError> {
    // Safe throughout: the Reflect contract guarantees the member, the
    // length member and the pointed-at array agree with the descriptor.
    #[allow(unsafe_code)]
    let (data, count) = unsafe {
        match field.placement {
            Placement::Array { capacity } => (object.instance.add(field.offset), capacity),
            Placement::ArrayPtr { len } => {
                let len_slot = object.instance.add(len.offset);
                let count = match len.width {
                    LenWidth::S8 => i64::from(len_slot.cast::<i8>().read()),
                    LenWidth::S16 => i64::from(len_slot.cast::<i16>().read()),
                    LenWidth::S32 => i64::from(len_slot.cast::<i32>().read()),
                };
                let data = object.instance.add(field.offset).cast::<*const u8>().read();
                (data, count.max(0) as usize)
            }
            _ => (core::ptr::null(), 0),
        }
    };

    doc.start_array()?;
    if count > 0 && !data.is_null() {
        let elem_size = field.descr.size;
        for i in 0..count {
            doc.write_indent()?;
            // Safe: `data` holds `count` elements of the field's type.
            #[allow(unsafe_code)]
            let elem = unsafe { data.add(i * elem_size) };
            encode_value(doc, field, elem)?;
            doc.member_end(i == count - 1)?;
        }
    }
    doc.end_array()
}

fn encode_value<W: Write>(
    doc: &mut Doc<'_, W>,
    field: &'static FieldDescr,
    data: *const u8,
) -> Result<(), EncodeError> {
    // Safe throughout: the Reflect contract ties `data` to the field's
    // declared kind.
    #[allow(unsafe_code)]
    let result = unsafe {
        match field.kind {
            Kind::Bool => doc.value_bool(data.cast::<bool>().read()),
            Kind::I8 => doc.value_int(data.cast::<i8>().read()),
            Kind::I16 => doc.value_int(data.cast::<i16>().read()),
            Kind::I32 => doc.value_int(data.cast::<i32>().read()),
            Kind::I64 => doc.value_int(data.cast::<i64>().read()),
            Kind::U8 => doc.value_int(data.cast::<u8>().read()),
            Kind::U16 => doc.value_int(data.cast::<u16>().read()),
            Kind::U32 => doc.value_int(data.cast::<u32>().read()),
            Kind::U64 => doc.value_int(data.cast::<u64>().read()),
            Kind::F32 => doc.value_float(data.cast::<f32>().read()),
            Kind::F64 => doc.value_float(data.cast::<f64>().read()),
            Kind::Str => {
                let text = data.cast::<StrRef>().read();
                doc.value_string(text.as_str())
            }
            Kind::Enum(width) => {
                let value = match width {
                    EnumWidth::E16 => u64::from(data.cast::<u16>().read()),
                    EnumWidth::E32 => u64::from(data.cast::<u32>().read()),
                    EnumWidth::E64 => data.cast::<u64>().read(),
                };
                match field.descr.as_enum() {
                    Some(descr) => doc.value_enum(value, descr),
                    None => doc.raw(b"\"\""),
                }
            }
            Kind::Object => encode_object(
                doc,
                ConstRef {
                    descr: field.descr,
                    instance: data,
                },
            ),
        }
    };
    result
}
