/// Lossless-representation flags for a parsed JSON number.
const FLAG_S64: u8 = 0x2;
const FLAG_U64: u8 = 0x4;
const FLAG_F64: u8 = 0x8;

/// A JSON number as a tagged 64-bit payload.
///
/// The flags record every representation that holds the value without
/// loss: a non-negative integer up to `i64::MAX` is both `u64` and `s64`,
/// `2^63..2^64` is `u64` only, a negative integer is `s64` only, and
/// anything with a fraction or exponent is `f64`. A number with no flags
/// set is malformed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JsonNumber {
    flags: u8,
    bits: u64,
}

impl JsonNumber {
    /// The malformed-input marker.
    #[must_use]
    pub const fn unknown() -> Self {
        JsonNumber { flags: 0, bits: 0 }
    }

    #[must_use]
    pub fn from_i64(value: i64) -> Self {
        let mut flags = FLAG_S64;
        if value >= 0 {
            flags |= FLAG_U64;
        }
        JsonNumber {
            flags,
            bits: value as u64,
        }
    }

    #[must_use]
    pub fn from_u64(value: u64) -> Self {
        let mut flags = FLAG_U64;
        if value <= i64::MAX as u64 {
            flags |= FLAG_S64;
        }
        JsonNumber { flags, bits: value }
    }

    #[must_use]
    pub fn from_f64(value: f64) -> Self {
        JsonNumber {
            flags: FLAG_F64,
            bits: value.to_bits(),
        }
    }

    /// Returns `false` for the malformed-input marker.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.flags != 0
    }

    #[must_use]
    pub fn has_s64(&self) -> bool {
        self.flags & FLAG_S64 != 0
    }

    #[must_use]
    pub fn has_u64(&self) -> bool {
        self.flags & FLAG_U64 != 0
    }

    #[must_use]
    pub fn has_f64(&self) -> bool {
        self.flags & FLAG_F64 != 0
    }

    /// Narrows to a signed integer, truncating floats toward zero.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        if self.flags & (FLAG_S64 | FLAG_U64) != 0 {
            self.bits as i64
        } else if self.flags & FLAG_F64 != 0 {
            f64::from_bits(self.bits) as i64
        } else {
            0
        }
    }

    /// Narrows to an unsigned integer, truncating floats toward zero.
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        if self.flags & (FLAG_S64 | FLAG_U64) != 0 {
            self.bits
        } else if self.flags & FLAG_F64 != 0 {
            f64::from_bits(self.bits) as u64
        } else {
            0
        }
    }

    /// Widens to a double.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        if self.flags & FLAG_F64 != 0 {
            f64::from_bits(self.bits)
        } else if self.flags & FLAG_S64 != 0 {
            self.bits as i64 as f64
        } else if self.flags & FLAG_U64 != 0 {
            self.bits as f64
        } else {
            0.0
        }
    }
}

/// Parses one JSON number from the start of `bytes`.
///
/// Grammar: optional `-`, one or more integer digits, an optional `.`
/// with one or more fraction digits, an optional `e`/`E` with optional
/// sign and one or more exponent digits (clamped to 308). Returns the
/// number of bytes consumed and the tagged value;
/// [`JsonNumber::unknown`] marks malformed input.
#[must_use]
pub fn parse_number(bytes: &[u8]) -> (usize, JsonNumber) {
    let mut pos = 0;

    let negative = bytes.first() == Some(&b'-');
    if negative {
        pos += 1;
    }

    let mut integer: u64 = 0;
    let int_digits_at = pos;
    while let Some(d) = digit_at(bytes, pos) {
        integer = integer.wrapping_mul(10).wrapping_add(u64::from(d));
        pos += 1;
    }
    if pos == int_digits_at {
        return (pos, JsonNumber::unknown());
    }

    let mut number = integer as f64;
    if negative {
        number = -number;
    }
    let mut is_float = false;

    if bytes.get(pos) == Some(&b'.') {
        pos += 1;
        let mut decimal = 0.0f64;
        let mut div = 1.0f64;
        let fraction_at = pos;
        while let Some(d) = digit_at(bytes, pos) {
            decimal = decimal * 10.0 + f64::from(d);
            div *= 10.0;
            pos += 1;
        }
        if pos == fraction_at {
            return (pos, JsonNumber::unknown());
        }
        if negative {
            number -= decimal / div;
        } else {
            number += decimal / div;
        }
        is_float = true;
    }

    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        pos += 1;
        let mut esign = 1i32;
        if let Some(c @ (b'+' | b'-')) = bytes.get(pos) {
            if *c == b'-' {
                esign = -1;
            }
            pos += 1;
        }
        let mut exponent = 0i32;
        let exponent_at = pos;
        while let Some(d) = digit_at(bytes, pos) {
            exponent = exponent.saturating_mul(10).saturating_add(i32::from(d));
            pos += 1;
        }
        if pos == exponent_at {
            return (pos, JsonNumber::unknown());
        }
        if exponent > 308 {
            exponent = 308;
        }
        for _ in 0..exponent {
            if esign > 0 {
                number *= 10.0;
            } else {
                number /= 10.0;
            }
        }
        is_float = true;
    }

    let result = if is_float {
        JsonNumber::from_f64(number)
    } else if negative {
        JsonNumber::from_i64((integer as i64).wrapping_neg())
    } else {
        JsonNumber::from_u64(integer)
    };
    (pos, result)
}

fn digit_at(bytes: &[u8], pos: usize) -> Option<u8> {
    match bytes.get(pos) {
        Some(c) if c.is_ascii_digit() => Some(c - b'0'),
        _ => None,
    }
}
