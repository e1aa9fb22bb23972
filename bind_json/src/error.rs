use lex_json::LexError;
use u8arena::ArenaError;

/// A reflective-decode failure with its diagnostic text.
///
/// The message always reads `line <N>: <reason>` and lives in the
/// scratch arena handed to [`crate::decode`], NUL-terminated there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct DecodeError<'a> {
    /// Formatted diagnostic text.
    pub message: &'a str,
}

/// Decode failures as data; rendered into the caller's arena once, at
/// the top level, after all scratch scopes have unwound.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub(crate) enum Failure {
    #[error("{0}")]
    Lex(#[from] LexError),
    #[error("line {0}: {1}")]
    Decode(u32, DecodeReason),
    #[error("line {0}: {1}")]
    Arena(u32, ArenaError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum DecodeReason {
    #[error("expected '{{'")]
    ExpectedObject,
    #[error("expected '['")]
    ExpectedArray,
    #[error("expected ':'")]
    ExpectedColon,
    #[error("expected ','")]
    ExpectedComma,
    #[error("expected key name")]
    ExpectedKeyName,
    #[error("duplicate comma")]
    DuplicateComma,
    #[error("expected object to continue")]
    ObjectContinue,
    #[error("invalid document")]
    InvalidDocument,
    #[error("data after document")]
    DataAfterDocument,
    #[error("encountered json object but class member is not the same type")]
    ObjectMismatch,
    #[error("encountered json array but class member is not the same type")]
    ArrayMismatch,
    #[error("encountered json string but class member is not the same type")]
    StringMismatch,
    #[error("encountered json number but class member is not the same type")]
    NumberMismatch,
    #[error("encountered json boolean but class member is not the same type")]
    BooleanMismatch,
    #[error("expected either an inline array or an array pointer member")]
    NotAnArrayMember,
    #[error("arrays of enums are not supported")]
    EnumArray,
}

/// Errors of the iterative [`crate::Decoder`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecoderError {
    /// The cursor value is not an object.
    #[error("value at the cursor is not an object")]
    NotAnObject,
    /// The cursor value is not an array.
    #[error("value at the cursor is not an array")]
    NotAnArray,
    /// Document nesting exceeded the frame stack capacity.
    #[error("nesting exceeds the decoder stack capacity")]
    StackOverflow,
    /// The output arena ran out of space.
    #[error(transparent)]
    OutOfArena(#[from] ArenaError),
}

/// Errors of the reflective encoder. Apart from a sink that refuses
/// bytes there is nothing that can fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// The output sink accepted no more bytes.
    #[error("output buffer full")]
    BufferFull,
    /// The output sink reported an error of its own.
    #[error("output sink error: {0:?}")]
    Sink(embedded_io::ErrorKind),
    /// The encoded text was not valid UTF-8 (a corrupt `StrRef`).
    #[error("encoded text is not valid utf-8")]
    InvalidUtf8,
}
