//! Static descriptions of host data structures.
//!
//! A [`TypeDescr`] names a type and its size/alignment; object types
//! additionally carry a field table and capability functions (placement
//! initialization, element copy), enum types carry a name table and a
//! text codec. A [`FieldDescr`] binds one JSON key to one member: its
//! kind, its byte offset inside the instance, whether it lives inline
//! or behind a pointer, and for out-of-line arrays the offset and width
//! of the runtime length field.
//!
//! Offsets come from `core::mem::offset_of!`; there is no canonical
//! default instance anywhere.

use core::fmt;

use crate::strref::StrRef;

/// Placement-initializes an instance at `dst`.
pub type InitFn = unsafe fn(dst: *mut u8);

/// Copies one instance of `size` bytes from `src` to `dst`.
pub type CopyFn = unsafe fn(dst: *mut u8, src: *const u8, size: usize);

/// Renders a flag set through a formatting sink.
pub type EnumToStrFn = fn(value: u64, names: &[&str], out: &mut dyn fmt::Write) -> fmt::Result;

/// Parses a flag set from text.
pub type EnumFromStrFn = fn(text: &str, names: &[&str]) -> u64;

/// The primary kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    /// A [`StrRef`] member.
    Str,
    /// A nested object described by the field's type descriptor.
    Object,
    /// A flag enumeration stored at the given width.
    Enum(EnumWidth),
}

impl Kind {
    /// The number class: every scalar kind a JSON number may populate.
    /// Booleans and enums are excluded, as in the original bitmask.
    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(
            self,
            Kind::I8
                | Kind::I16
                | Kind::I32
                | Kind::I64
                | Kind::U8
                | Kind::U16
                | Kind::U32
                | Kind::U64
                | Kind::F32
                | Kind::F64
        )
    }
}

/// Storage width of an enum member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumWidth {
    E16,
    E32,
    E64,
}

/// Width of the runtime length field of an out-of-line array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LenWidth {
    S8,
    S16,
    S32,
}

impl LenWidth {
    /// The largest element count the length field can represent;
    /// decoded arrays are clamped to this.
    #[must_use]
    pub fn max_len(&self) -> usize {
        match self {
            LenWidth::S8 => 127,
            LenWidth::S16 => 32767,
            LenWidth::S32 => 2_147_483_647,
        }
    }
}

/// Where the runtime length of an out-of-line array lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LenField {
    /// Byte offset of the length member inside the owning instance.
    pub offset: usize,
    pub width: LenWidth,
}

/// How a member is placed inside its owning instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The value lives at the field offset.
    Inline,
    /// The field holds a pointer; storage is allocated on first write.
    Pointer,
    /// A fixed-capacity array in place at the field offset.
    Array {
        capacity: usize,
    },
    /// The field holds a pointer to an array allocated at decode time;
    /// the element count is written to the length member.
    ArrayPtr {
        len: LenField,
    },
}

/// Binds a JSON key to one member of an object type.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescr {
    pub name: &'static str,
    pub kind: Kind,
    pub placement: Placement,
    /// Byte offset of the member inside the instance.
    pub offset: usize,
    /// Descriptor of the referenced type: the scalar itself, the nested
    /// object type, or the enum type.
    pub descr: &'static TypeDescr,
}

impl FieldDescr {
    /// An inline scalar member (`Bool`, the integers, the floats).
    #[must_use]
    pub const fn scalar(name: &'static str, kind: Kind, offset: usize) -> FieldDescr {
        FieldDescr {
            name,
            kind,
            placement: Placement::Inline,
            offset,
            descr: scalar_descr(kind),
        }
    }

    /// A scalar behind a pointer, allocated on first write.
    #[must_use]
    pub const fn scalar_ptr(name: &'static str, kind: Kind, offset: usize) -> FieldDescr {
        FieldDescr {
            name,
            kind,
            placement: Placement::Pointer,
            offset,
            descr: scalar_descr(kind),
        }
    }

    /// A fixed-capacity inline array of scalars.
    #[must_use]
    pub const fn array(
        name: &'static str,
        kind: Kind,
        offset: usize,
        capacity: usize,
    ) -> FieldDescr {
        FieldDescr {
            name,
            kind,
            placement: Placement::Array { capacity },
            offset,
            descr: scalar_descr(kind),
        }
    }

    /// An out-of-line array of scalars with a runtime length member.
    #[must_use]
    pub const fn array_ptr(
        name: &'static str,
        kind: Kind,
        offset: usize,
        len: LenField,
    ) -> FieldDescr {
        FieldDescr {
            name,
            kind,
            placement: Placement::ArrayPtr { len },
            offset,
            descr: scalar_descr(kind),
        }
    }

    /// A [`StrRef`] member.
    #[must_use]
    pub const fn string(name: &'static str, offset: usize) -> FieldDescr {
        FieldDescr {
            name,
            kind: Kind::Str,
            placement: Placement::Inline,
            offset,
            descr: &STR,
        }
    }

    /// An out-of-line array of [`StrRef`] with a runtime length member.
    #[must_use]
    pub const fn string_array_ptr(name: &'static str, offset: usize, len: LenField) -> FieldDescr {
        FieldDescr {
            name,
            kind: Kind::Str,
            placement: Placement::ArrayPtr { len },
            offset,
            descr: &STR,
        }
    }

    /// A nested object stored in place.
    #[must_use]
    pub const fn object(
        name: &'static str,
        offset: usize,
        descr: &'static TypeDescr,
    ) -> FieldDescr {
        FieldDescr {
            name,
            kind: Kind::Object,
            placement: Placement::Inline,
            offset,
            descr,
        }
    }

    /// A nested object behind a pointer, allocated when the key shows up.
    #[must_use]
    pub const fn object_ptr(
        name: &'static str,
        offset: usize,
        descr: &'static TypeDescr,
    ) -> FieldDescr {
        FieldDescr {
            name,
            kind: Kind::Object,
            placement: Placement::Pointer,
            offset,
            descr,
        }
    }

    /// An out-of-line array of objects with a runtime length member.
    #[must_use]
    pub const fn object_array_ptr(
        name: &'static str,
        offset: usize,
        descr: &'static TypeDescr,
        len: LenField,
    ) -> FieldDescr {
        FieldDescr {
            name,
            kind: Kind::Object,
            placement: Placement::ArrayPtr { len },
            offset,
            descr,
        }
    }

    /// A flag-enum member of the given width.
    #[must_use]
    pub const fn flags(
        name: &'static str,
        width: EnumWidth,
        offset: usize,
        descr: &'static TypeDescr,
    ) -> FieldDescr {
        FieldDescr {
            name,
            kind: Kind::Enum(width),
            placement: Placement::Inline,
            offset,
            descr,
        }
    }
}

/// What a [`TypeDescr`] describes beyond name, size and alignment.
#[derive(Debug)]
pub enum TypeShape {
    /// A primitive fixed-width scalar.
    System,
    Object(ObjectDescr),
    Enum(EnumDescr),
}

/// The composite part of an object type.
#[derive(Debug)]
pub struct ObjectDescr {
    pub fields: &'static [FieldDescr],
    /// Placement initialization for storage this crate allocates.
    pub init: InitFn,
    /// Element copy used when flattening decoded object arrays.
    pub copy: CopyFn,
}

/// The enumeration part of an enum type.
#[derive(Debug)]
pub struct EnumDescr {
    /// Bit position in the flag set equals index in this table.
    pub names: &'static [&'static str],
    pub to_str: EnumToStrFn,
    pub from_str: EnumFromStrFn,
}

/// Static description of one type.
#[derive(Debug)]
pub struct TypeDescr {
    pub name: &'static str,
    pub size: usize,
    pub align: usize,
    pub shape: TypeShape,
}

impl TypeDescr {
    /// A primitive scalar type.
    #[must_use]
    pub const fn system(name: &'static str, size: usize, align: usize) -> TypeDescr {
        TypeDescr {
            name,
            size,
            align,
            shape: TypeShape::System,
        }
    }

    /// An object type for `T` with the default capability set:
    /// `T::default()` placement initialization and a bitwise copy.
    #[must_use]
    pub const fn object<T: Default>(
        name: &'static str,
        fields: &'static [FieldDescr],
    ) -> TypeDescr {
        TypeDescr {
            name,
            size: core::mem::size_of::<T>(),
            align: core::mem::align_of::<T>(),
            shape: TypeShape::Object(ObjectDescr {
                fields,
                init: default_init::<T>,
                copy: raw_copy,
            }),
        }
    }

    /// A flag-enum type with the default `a|b|c` text codec.
    #[must_use]
    pub const fn flag_enum(
        name: &'static str,
        width: EnumWidth,
        names: &'static [&'static str],
    ) -> TypeDescr {
        let size = match width {
            EnumWidth::E16 => 2,
            EnumWidth::E32 => 4,
            EnumWidth::E64 => 8,
        };
        TypeDescr {
            name,
            size,
            align: size,
            shape: TypeShape::Enum(EnumDescr {
                names,
                to_str: default_enum_to_str,
                from_str: default_enum_from_str,
            }),
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectDescr> {
        match &self.shape {
            TypeShape::Object(o) => Some(o),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_enum(&self) -> Option<&EnumDescr> {
        match &self.shape {
            TypeShape::Enum(e) => Some(e),
            _ => None,
        }
    }
}

/// Binds a host type to its static descriptor.
///
/// # Safety
///
/// The returned descriptor must describe `Self` exactly: an object
/// shape whose size and alignment are those of `Self`, whose field
/// offsets come from `offset_of!` on `Self`, and whose kinds,
/// placements and length members match the field types. The decoder
/// writes through raw pointers computed from this table; any mismatch
/// is undefined behavior.
#[allow(unsafe_code)]
pub unsafe trait Reflect: Sized {
    fn descr() -> &'static TypeDescr;
}

/// Placement-initializes a `T` with its `Default` value.
///
/// # Safety
///
/// `dst` must be valid for writes of `size_of::<T>()` bytes and aligned
/// for `T`.
#[allow(unsafe_code)]
pub unsafe fn default_init<T: Default>(dst: *mut u8) {
    dst.cast::<T>().write(T::default());
}

/// Bitwise instance copy, the default object copy capability.
///
/// # Safety
///
/// `dst` and `src` must be valid for `size` bytes and not overlap.
#[allow(unsafe_code)]
pub unsafe fn raw_copy(dst: *mut u8, src: *const u8, size: usize) {
    core::ptr::copy_nonoverlapping(src, dst, size);
}

/// The default enum-to-text capability.
pub fn default_enum_to_str(value: u64, names: &[&str], out: &mut dyn fmt::Write) -> fmt::Result {
    lex_json::flags::flags_to_str(value, names, out)
}

/// The default text-to-enum capability.
#[must_use]
pub fn default_enum_from_str(text: &str, names: &[&str]) -> u64 {
    lex_json::flags::flags_from_str(text, names)
}

macro_rules! system_descr {
    ($static_name:ident, $name:literal, $ty:ty) => {
        static $static_name: TypeDescr = TypeDescr::system(
            $name,
            core::mem::size_of::<$ty>(),
            core::mem::align_of::<$ty>(),
        );
    };
}

system_descr!(BOOL, "bool", bool);
system_descr!(I8, "s8", i8);
system_descr!(I16, "s16", i16);
system_descr!(I32, "s32", i32);
system_descr!(I64, "s64", i64);
system_descr!(U8, "u8", u8);
system_descr!(U16, "u16", u16);
system_descr!(U32, "u32", u32);
system_descr!(U64, "u64", u64);
system_descr!(F32, "f32", f32);
system_descr!(F64, "f64", f64);
system_descr!(STR, "string", StrRef);

const fn scalar_descr(kind: Kind) -> &'static TypeDescr {
    match kind {
        Kind::Bool => &BOOL,
        Kind::I8 => &I8,
        Kind::I16 => &I16,
        Kind::I32 => &I32,
        Kind::I64 => &I64,
        Kind::U8 => &U8,
        Kind::U16 => &U16,
        Kind::U32 => &U32,
        Kind::U64 => &U64,
        Kind::F32 => &F32,
        Kind::F64 => &F64,
        Kind::Str => &STR,
        // Object and enum fields carry their own descriptors; routing
        // them through a scalar constructor is a schema bug.
        Kind::Object | Kind::Enum(_) => panic!("not a scalar kind"),
    }
}
