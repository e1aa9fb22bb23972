//! The recursive reflective decoder: lexeme stream + schema + root
//! instance in, populated instance graph out, one pass.

use core::cell::Cell;
use core::fmt::Write as _;

use lex_json::{JsonNumber, JsonStr, LexKind, Lexeme, LexemeSource, Lexer};
use u8arena::{Arena, ArenaError, Scope};

use crate::error::{DecodeError, DecodeReason, Failure};
use crate::schema::{
    raw_copy, EnumWidth, FieldDescr, Kind, LenWidth, Placement, Reflect, TypeDescr,
};
use crate::strref::StrRef;

/// Bookkeeping counters incremented while decoding, for diagnostics.
/// Discarded values under unknown keys are counted too.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DecodeStats {
    pub objects: u32,
    pub numbers: u32,
    pub strings: u32,
    pub enums: u32,
    pub arrays: u32,
    pub booleans: u32,
}

/// Decodes a JSON document into `root`, guided by `T`'s descriptor.
///
/// The caller constructs `root` with default field values; members the
/// document does not mention (or sets to `null`) keep them. Pointer
/// members, out-of-line arrays and string payloads are allocated from
/// `arena`; `scratch` holds per-nesting working sets and is rewound
/// scope by scope, plus the error message on failure.
///
/// # Errors
///
/// Lexical and syntax errors, schema/type mismatches, and arena
/// exhaustion, each formatted as `line <N>: <reason>` into `scratch`.
/// On error the instance may be partially populated and the long-lived
/// arena keeps whatever was allocated before the failure; the caller is
/// expected to reset both.
pub fn decode<'a, T: Reflect>(
    input: &'a [u8],
    root: &mut T,
    arena: &'a Arena<'_>,
    scratch: &'a Arena<'_>,
) -> core::result::Result<DecodeStats, DecodeError<'a>> {
    let mut ctx = Ctx {
        lexer: Lexer::new(input, arena),
        arena,
        scratch,
        stats: DecodeStats::default(),
    };
    let object = ObjectRef {
        descr: T::descr(),
        instance: (root as *mut T).cast::<u8>(),
    };

    match run(&mut ctx, object) {
        Ok(()) => Ok(ctx.stats),
        Err(failure) => Err(render_error(scratch, &failure)),
    }
}

fn run(ctx: &mut Ctx<'_, '_, '_>, object: ObjectRef) -> Result<(), Failure> {
    decode_object(ctx, object)?;
    if ctx.lexer.expect(LexKind::Eof)?.is_none() {
        return Err(ctx.fail(DecodeReason::DataAfterDocument));
    }
    Ok(())
}

// The message is built after every scratch scope has unwound, so it
// survives until the caller resets the arena.
fn render_error<'a>(scratch: &'a Arena<'_>, failure: &Failure) -> DecodeError<'a> {
    const FALLBACK: &str = "line 0: out of arena memory";

    let Ok(mut out) = scratch.checkout() else {
        return DecodeError { message: FALLBACK };
    };
    let _ = write!(out, "{failure}");
    let _ = out.write_byte(0);
    let bytes = out.commit();

    let text = bytes
        .split_last()
        .filter(|(last, _)| **last == 0)
        .map_or(bytes, |(_, rest)| rest);
    match core::str::from_utf8(text) {
        Ok(message) if !message.is_empty() => DecodeError { message },
        _ => DecodeError { message: FALLBACK },
    }
}

struct Ctx<'a, 'lb, 'sb> {
    lexer: Lexer<'a, 'lb>,
    arena: &'a Arena<'lb>,
    scratch: &'a Arena<'sb>,
    stats: DecodeStats,
}

impl Ctx<'_, '_, '_> {
    fn fail(&self, reason: DecodeReason) -> Failure {
        Failure::Decode(self.lexer.line(), reason)
    }

    fn oom(&self, error: ArenaError) -> Failure {
        Failure::Arena(self.lexer.line(), error)
    }
}

/// A type descriptor bound to the raw storage of one instance.
#[derive(Clone, Copy)]
struct ObjectRef {
    descr: &'static TypeDescr,
    instance: *mut u8,
}

impl ObjectRef {
    fn fields(&self) -> &'static [FieldDescr] {
        self.descr.as_object().map_or(&[], |o| o.fields)
    }
}

/// A field bound for writing: either through its offset in the owning
/// instance, or to an overriding target (an array cell or a scratch
/// element instance).
#[derive(Clone, Copy)]
struct Member {
    field: &'static FieldDescr,
    data: Option<*mut u8>,
}

fn find_member(object: ObjectRef, name: &str) -> Option<Member> {
    object
        .fields()
        .iter()
        .find(|field| field.name == name)
        .map(|field| Member { field, data: None })
}

// The decoder always runs the unescaping lexer, so string payloads are
// arena-owned; the borrowed arm is unreachable.
fn payload_str(payload: JsonStr<'_>) -> &str {
    match payload {
        JsonStr::Owned(text) => text,
        JsonStr::Borrowed(_) => "",
    }
}

fn decode_object(ctx: &mut Ctx<'_, '_, '_>, object: ObjectRef) -> Result<(), Failure> {
    if ctx.lexer.expect(LexKind::BeginObject)?.is_none() {
        return Err(ctx.fail(DecodeReason::ExpectedObject));
    }

    let mut seen_value = false;
    let mut seen_comma = false;

    loop {
        match ctx.lexer.next()? {
            Lexeme::EndObject => break,

            Lexeme::String(payload) => {
                if seen_value && !seen_comma {
                    return Err(ctx.fail(DecodeReason::ExpectedComma));
                }
                if ctx.lexer.expect(LexKind::NameSeparator)?.is_none() {
                    return Err(ctx.fail(DecodeReason::ExpectedColon));
                }

                let member = find_member(object, payload_str(payload));
                decode_value(ctx, object, member)?;

                seen_value = true;
                seen_comma = false;
            }

            Lexeme::ValueSeparator => {
                if !seen_value {
                    return Err(ctx.fail(DecodeReason::ExpectedKeyName));
                }
                if seen_comma {
                    return Err(ctx.fail(DecodeReason::DuplicateComma));
                }
                seen_value = false;
                seen_comma = true;
            }

            _ => return Err(ctx.fail(DecodeReason::ObjectContinue)),
        }
    }

    Ok(())
}

fn decode_value(
    ctx: &mut Ctx<'_, '_, '_>,
    object: ObjectRef,
    member: Option<Member>,
) -> Result<(), Failure> {
    // Unknown keys parse and discard their value to keep the lexeme
    // stream in sync.
    let Some(m) = member else {
        return skip_value(ctx);
    };

    match ctx.lexer.peek()? {
        Lexeme::BeginObject => {
            // An array element (`m.data` set) is always its own object
            // instance; a direct member must not be array-placed.
            if m.field.kind != Kind::Object
                || (m.data.is_none()
                    && matches!(
                        m.field.placement,
                        Placement::Array { .. } | Placement::ArrayPtr { .. }
                    ))
            {
                return Err(ctx.fail(DecodeReason::ObjectMismatch));
            }
            let nested = enter_object(ctx, object, m)?;
            ctx.stats.objects += 1;
            decode_object(ctx, nested)
        }

        Lexeme::BeginArray => {
            // An object element may take its fields positionally from an
            // array: `[0, 1]` fills them in declaration order.
            if let (Kind::Object, Some(data)) = (m.field.kind, m.data) {
                ctx.stats.arrays += 1;
                return decode_tuple_object(
                    ctx,
                    ObjectRef {
                        descr: m.field.descr,
                        instance: data,
                    },
                );
            }
            if !matches!(
                m.field.placement,
                Placement::Array { .. } | Placement::ArrayPtr { .. }
            ) {
                return Err(ctx.fail(DecodeReason::ArrayMismatch));
            }
            ctx.stats.arrays += 1;
            decode_array(ctx, object, m)
        }

        Lexeme::String(payload) => {
            let text = payload_str(payload);
            match m.field.kind {
                Kind::Str => {
                    ctx.stats.strings += 1;
                    set_string(object, m, text);
                }
                Kind::Enum(width) => {
                    ctx.stats.enums += 1;
                    set_enum(ctx, object, m, width, text)?;
                }
                _ => return Err(ctx.fail(DecodeReason::StringMismatch)),
            }
            ctx.lexer.skip()?;
            Ok(())
        }

        Lexeme::Number(number) => {
            if !m.field.kind.is_number() {
                return Err(ctx.fail(DecodeReason::NumberMismatch));
            }
            set_number(ctx, object, m, &number)?;
            ctx.stats.numbers += 1;
            ctx.lexer.skip()?;
            Ok(())
        }

        Lexeme::Boolean(value) => {
            if m.field.kind != Kind::Bool {
                return Err(ctx.fail(DecodeReason::BooleanMismatch));
            }
            set_bool(ctx, object, m, value)?;
            ctx.stats.booleans += 1;
            ctx.lexer.skip()?;
            Ok(())
        }

        // The member keeps its default.
        Lexeme::Null => {
            ctx.lexer.skip()?;
            Ok(())
        }

        _ => Err(ctx.fail(DecodeReason::InvalidDocument)),
    }
}

// The positional form of an object: a JSON array whose elements fill
// the fields in declaration order. Surplus elements are walked and
// dropped.
fn decode_tuple_object(ctx: &mut Ctx<'_, '_, '_>, object: ObjectRef) -> Result<(), Failure> {
    if ctx.lexer.expect(LexKind::BeginArray)?.is_none() {
        return Err(ctx.fail(DecodeReason::ExpectedArray));
    }

    let fields = object.fields();
    let mut index = 0usize;
    loop {
        if ctx.lexer.expect(LexKind::EndArray)?.is_some() {
            break;
        }
        if index > 0 && ctx.lexer.expect(LexKind::ValueSeparator)?.is_none() {
            return Err(ctx.fail(DecodeReason::ExpectedComma));
        }

        let member = fields.get(index).map(|field| Member { field, data: None });
        decode_value(ctx, object, member)?;
        index += 1;
    }
    Ok(())
}

/// Resolves the instance a nested JSON object populates: the overriding
/// target (array element), freshly allocated pointer storage, or the
/// inline member itself.
fn enter_object(
    ctx: &mut Ctx<'_, '_, '_>,
    parent: ObjectRef,
    m: Member,
) -> Result<ObjectRef, Failure> {
    let descr = m.field.descr;
    if let Some(data) = m.data {
        return Ok(ObjectRef {
            descr,
            instance: data,
        });
    }

    // Safe: the Reflect contract guarantees `offset` names a member of
    // the parent instance with the field's type.
    #[allow(unsafe_code)]
    let slot = unsafe { parent.instance.add(m.field.offset) };
    match m.field.placement {
        Placement::Pointer => {
            let instance = alloc_instance(ctx.arena, descr).map_err(|e| ctx.oom(e))?;
            // Safe: `slot` addresses the pointer member; `instance` is
            // fresh, aligned storage for one `descr` instance.
            #[allow(unsafe_code)]
            unsafe {
                slot.cast::<*mut u8>().write(instance);
            }
            Ok(ObjectRef { descr, instance })
        }
        _ => Ok(ObjectRef {
            descr,
            instance: slot,
        }),
    }
}

fn alloc_instance(arena: &Arena<'_>, descr: &TypeDescr) -> Result<*mut u8, ArenaError> {
    let ptr = arena.alloc(descr.size, descr.align)?.as_ptr();
    if let Some(object) = descr.as_object() {
        // Safe: `ptr` is fresh, aligned storage of `descr.size` bytes.
        #[allow(unsafe_code)]
        unsafe {
            (object.init)(ptr);
        }
    }
    Ok(ptr)
}

/// The storage a scalar member is written through: the overriding
/// target, pointer storage allocated on first write, or the inline
/// member itself.
fn member_slot(ctx: &mut Ctx<'_, '_, '_>, object: ObjectRef, m: Member) -> Result<*mut u8, Failure> {
    if let Some(data) = m.data {
        return Ok(data);
    }

    // Safe: the Reflect contract, as in enter_object.
    #[allow(unsafe_code)]
    let slot = unsafe { object.instance.add(m.field.offset) };
    if matches!(m.field.placement, Placement::Pointer) {
        let ptr = ctx
            .arena
            .alloc(m.field.descr.size, m.field.descr.align)
            .map_err(|e| ctx.oom(e))?
            .as_ptr();
        // Safe: `slot` addresses the pointer member.
        #[allow(unsafe_code)]
        unsafe {
            slot.cast::<*mut u8>().write(ptr);
        }
        Ok(ptr)
    } else {
        Ok(slot)
    }
}

fn set_number(
    ctx: &mut Ctx<'_, '_, '_>,
    object: ObjectRef,
    m: Member,
    number: &JsonNumber,
) -> Result<(), Failure> {
    let slot = member_slot(ctx, object, m)?;
    // Safe: `slot` is aligned storage for the field's scalar type, per
    // the Reflect contract (inline/pointer) or the two-word array cell.
    #[allow(unsafe_code)]
    unsafe {
        match m.field.kind {
            Kind::I8 => slot.cast::<i8>().write(number.as_i64() as i8),
            Kind::I16 => slot.cast::<i16>().write(number.as_i64() as i16),
            Kind::I32 => slot.cast::<i32>().write(number.as_i64() as i32),
            Kind::I64 => slot.cast::<i64>().write(number.as_i64()),
            Kind::U8 => slot.cast::<u8>().write(number.as_u64() as u8),
            Kind::U16 => slot.cast::<u16>().write(number.as_u64() as u16),
            Kind::U32 => slot.cast::<u32>().write(number.as_u64() as u32),
            Kind::U64 => slot.cast::<u64>().write(number.as_u64()),
            Kind::F32 => slot.cast::<f32>().write(number.as_f64() as f32),
            Kind::F64 => slot.cast::<f64>().write(number.as_f64()),
            _ => {}
        }
    }
    Ok(())
}

fn set_bool(
    ctx: &mut Ctx<'_, '_, '_>,
    object: ObjectRef,
    m: Member,
    value: bool,
) -> Result<(), Failure> {
    let slot = member_slot(ctx, object, m)?;
    // Safe: as in set_number; bool is one byte.
    #[allow(unsafe_code)]
    unsafe {
        slot.cast::<bool>().write(value);
    }
    Ok(())
}

fn set_string(object: ObjectRef, m: Member, text: &str) {
    // A StrRef is itself the indirection; strings are never
    // pointer-placed.
    let slot = match m.data {
        Some(data) => data,
        // Safe: the Reflect contract.
        #[allow(unsafe_code)]
        None => unsafe { object.instance.add(m.field.offset) },
    };
    // Safe: `slot` is aligned storage for a StrRef member or the
    // two-word array cell.
    #[allow(unsafe_code)]
    unsafe {
        slot.cast::<StrRef>().write(StrRef::new(text));
    }
}

fn set_enum(
    ctx: &mut Ctx<'_, '_, '_>,
    object: ObjectRef,
    m: Member,
    width: EnumWidth,
    text: &str,
) -> Result<(), Failure> {
    if m.data.is_some() {
        return Err(ctx.fail(DecodeReason::EnumArray));
    }
    let Some(descr) = m.field.descr.as_enum() else {
        return Err(ctx.fail(DecodeReason::StringMismatch));
    };

    let value = (descr.from_str)(text, descr.names);
    // Safe: the Reflect contract guarantees an enum member of the
    // declared width at this offset.
    #[allow(unsafe_code)]
    unsafe {
        let slot = object.instance.add(m.field.offset);
        match width {
            EnumWidth::E16 => slot.cast::<u16>().write(value as u16),
            EnumWidth::E32 => slot.cast::<u32>().write(value as u32),
            EnumWidth::E64 => slot.cast::<u64>().write(value),
        }
    }
    Ok(())
}

/// Scratch cell for one array element while the element count is still
/// unknown. Two words: big enough for any scalar, a pointer, or a
/// string reference. `Cell` so the payload can be written through the
/// shared references that link the list.
struct ListElem<'e> {
    data: Cell<[u64; 2]>,
    next: Cell<Option<&'e ListElem<'e>>>,
}

#[allow(clippy::too_many_lines)]
fn decode_array(ctx: &mut Ctx<'_, '_, '_>, object: ObjectRef, m: Member) -> Result<(), Failure> {
    if ctx.lexer.expect(LexKind::BeginArray)?.is_none() {
        return Err(ctx.fail(DecodeReason::ExpectedArray));
    }
    if matches!(m.field.kind, Kind::Enum(_)) {
        return Err(ctx.fail(DecodeReason::EnumArray));
    }

    let elem_size = m.field.descr.size;

    // Safety: the cells and scratch element instances allocated inside
    // this scope are flattened into long-lived storage before the scope
    // drops; nothing allocated here escapes this function.
    #[allow(unsafe_code)]
    let scope = unsafe { Scope::enter(ctx.scratch) };

    let mut head: Option<&ListElem<'_>> = None;
    let mut tail: Option<&ListElem<'_>> = None;
    let mut count: usize = 0;

    loop {
        if ctx.lexer.expect(LexKind::EndArray)?.is_some() {
            break;
        }
        if count > 0 && ctx.lexer.expect(LexKind::ValueSeparator)?.is_none() {
            return Err(ctx.fail(DecodeReason::ExpectedComma));
        }

        let elem: &ListElem<'_> = ctx
            .scratch
            .alloc_value(ListElem {
                data: Cell::new([0; 2]),
                next: Cell::new(None),
            })
            .map_err(|e| ctx.oom(e))?;

        let elem_member = match m.field.kind {
            Kind::Object => {
                let instance =
                    alloc_instance(ctx.scratch, m.field.descr).map_err(|e| ctx.oom(e))?;
                let mut words = elem.data.get();
                words[0] = instance as usize as u64;
                elem.data.set(words);
                Member {
                    field: m.field,
                    data: Some(instance),
                }
            }
            _ => Member {
                field: m.field,
                data: Some(elem.data.as_ptr().cast::<u8>()),
            },
        };

        decode_value(ctx, object, Some(elem_member))?;

        match tail {
            None => head = Some(elem),
            Some(prev) => prev.next.set(Some(elem)),
        }
        tail = Some(elem);
        count += 1;
    }

    // Clamp, publish the element count, and pick the flat destination.
    let (array_ptr, final_count, is_array_ptr) = match m.field.placement {
        Placement::ArrayPtr { len } => {
            let clamped = count.min(len.width.max_len());
            // Safe: the Reflect contract guarantees a length member of
            // the declared width at `len.offset`.
            #[allow(unsafe_code)]
            unsafe {
                let len_slot = object.instance.add(len.offset);
                match len.width {
                    LenWidth::S8 => len_slot.cast::<i8>().write(clamped as i8),
                    LenWidth::S16 => len_slot.cast::<i16>().write(clamped as i16),
                    LenWidth::S32 => len_slot.cast::<i32>().write(clamped as i32),
                }
            }
            let ptr = ctx
                .arena
                .alloc(clamped * elem_size, m.field.descr.align)
                .map_err(|e| ctx.oom(e))?
                .as_ptr();
            (ptr, clamped, true)
        }
        Placement::Array { capacity } => {
            // Safe: the Reflect contract.
            #[allow(unsafe_code)]
            let slot = unsafe { object.instance.add(m.field.offset) };
            (slot, count.min(capacity), false)
        }
        _ => return Err(ctx.fail(DecodeReason::NotAnArrayMember)),
    };

    // Flatten the cells into the destination, element width by element
    // kind; elements past the clamp are dropped without error.
    let mut cursor = head;
    let mut dst = array_ptr;
    for _ in 0..final_count {
        let Some(cell) = cursor else { break };
        // Safe: `dst` walks `final_count` elements of the destination
        // sized above; each copy reads what the element decode wrote.
        #[allow(unsafe_code)]
        unsafe {
            let src = cell.data.as_ptr().cast::<u8>();
            match m.field.kind {
                Kind::Object => {
                    let instance = cell.data.get()[0] as usize as *const u8;
                    match m.field.descr.as_object() {
                        Some(o) => (o.copy)(dst, instance, elem_size),
                        None => raw_copy(dst, instance, elem_size),
                    }
                }
                Kind::Str => raw_copy(dst, src, core::mem::size_of::<StrRef>()),
                Kind::Bool | Kind::I8 | Kind::U8 => raw_copy(dst, src, 1),
                Kind::I16 | Kind::U16 => raw_copy(dst, src, 2),
                Kind::I32 | Kind::U32 | Kind::F32 => raw_copy(dst, src, 4),
                Kind::I64 | Kind::U64 | Kind::F64 => raw_copy(dst, src, 8),
                Kind::Enum(_) => {}
            }
            dst = dst.add(elem_size);
        }
        cursor = cell.next.get();
    }

    if is_array_ptr {
        // Safe: `slot` addresses the array pointer member.
        #[allow(unsafe_code)]
        unsafe {
            object
                .instance
                .add(m.field.offset)
                .cast::<*mut u8>()
                .write(array_ptr);
        }
    }

    drop(scope);
    Ok(())
}

// Walks one value without a destination; bookkeeping still counts it.
fn skip_value(ctx: &mut Ctx<'_, '_, '_>) -> Result<(), Failure> {
    match ctx.lexer.peek()? {
        Lexeme::BeginObject => {
            ctx.stats.objects += 1;
            skip_object(ctx)
        }
        Lexeme::BeginArray => {
            ctx.stats.arrays += 1;
            skip_array(ctx)
        }
        Lexeme::String(_) => {
            ctx.stats.strings += 1;
            ctx.lexer.skip()?;
            Ok(())
        }
        Lexeme::Number(_) => {
            ctx.stats.numbers += 1;
            ctx.lexer.skip()?;
            Ok(())
        }
        Lexeme::Boolean(_) => {
            ctx.stats.booleans += 1;
            ctx.lexer.skip()?;
            Ok(())
        }
        Lexeme::Null => {
            ctx.lexer.skip()?;
            Ok(())
        }
        _ => Err(ctx.fail(DecodeReason::InvalidDocument)),
    }
}

fn skip_object(ctx: &mut Ctx<'_, '_, '_>) -> Result<(), Failure> {
    if ctx.lexer.expect(LexKind::BeginObject)?.is_none() {
        return Err(ctx.fail(DecodeReason::ExpectedObject));
    }

    let mut seen_value = false;
    let mut seen_comma = false;

    loop {
        match ctx.lexer.next()? {
            Lexeme::EndObject => return Ok(()),
            Lexeme::String(_) => {
                if seen_value && !seen_comma {
                    return Err(ctx.fail(DecodeReason::ExpectedComma));
                }
                if ctx.lexer.expect(LexKind::NameSeparator)?.is_none() {
                    return Err(ctx.fail(DecodeReason::ExpectedColon));
                }
                skip_value(ctx)?;
                seen_value = true;
                seen_comma = false;
            }
            Lexeme::ValueSeparator => {
                if !seen_value {
                    return Err(ctx.fail(DecodeReason::ExpectedKeyName));
                }
                if seen_comma {
                    return Err(ctx.fail(DecodeReason::DuplicateComma));
                }
                seen_value = false;
                seen_comma = true;
            }
            _ => return Err(ctx.fail(DecodeReason::ObjectContinue)),
        }
    }
}

fn skip_array(ctx: &mut Ctx<'_, '_, '_>) -> Result<(), Failure> {
    if ctx.lexer.expect(LexKind::BeginArray)?.is_none() {
        return Err(ctx.fail(DecodeReason::ExpectedArray));
    }

    let mut count = 0usize;
    loop {
        if ctx.lexer.expect(LexKind::EndArray)?.is_some() {
            return Ok(());
        }
        if count > 0 && ctx.lexer.expect(LexKind::ValueSeparator)?.is_none() {
            return Err(ctx.fail(DecodeReason::ExpectedComma));
        }
        skip_value(ctx)?;
        count += 1;
    }
}
