//! Text codec for bitflag enumerations.
//!
//! A flag set is serialized as the `|`-joined names of its set bits; bit
//! position corresponds to index in the name table, so
//! `names = ["A", "B", "C", "D"]` maps `"A|C"` to `0b0101`.

use core::fmt;

/// Parses a `|`-separated name list into a flag set.
///
/// Whitespace around segments is skipped, names match
/// case-insensitively, empty segments and unknown names are ignored.
/// Name tables longer than 64 entries are truncated to the flag width.
#[must_use]
pub fn flags_from_str(text: &str, names: &[&str]) -> u64 {
    let mut out = 0u64;
    for segment in text.split('|') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        let found = names
            .iter()
            .take(64)
            .position(|name| name.eq_ignore_ascii_case(segment));
        if let Some(index) = found {
            out |= 1u64 << index;
        }
    }
    out
}

/// Writes the `|`-joined names of the set bits of `value`.
///
/// Bits past the end of the name table are silently dropped.
///
/// # Errors
///
/// Propagates the sink's formatting error (for arena-backed sinks that
/// means the arena ran out of space).
pub fn flags_to_str(value: u64, names: &[&str], out: &mut dyn fmt::Write) -> fmt::Result {
    let mut first = true;
    for (index, name) in names.iter().enumerate().take(64) {
        if value & (1u64 << index) == 0 {
            continue;
        }
        if !first {
            out.write_char('|')?;
        }
        out.write_str(name)?;
        first = false;
    }
    Ok(())
}
