use u8arena::ArenaError;

/// Convenient type alias for lexer results.
pub type Result<T> = core::result::Result<T, LexError>;

/// What went wrong while fetching a lexeme.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexErrorKind {
    /// The characters at a number position do not form a valid JSON number.
    #[error("bad number")]
    BadNumber,
    /// The input ended inside a string value.
    #[error("end of file inside string")]
    EofInString,
    /// The input ended inside a `\\` escape sequence.
    #[error("end of file inside escape")]
    EofInEscape,
    /// A `\\u` escape was not followed by four hex digits.
    #[error("expected 4 character hex number")]
    ExpectedHex,
    /// An escape character or byte sequence that JSON does not allow.
    #[error("unexpected character in string")]
    UnexpectedChar,
    /// A bare word that is not `true`, `false` or `null`.
    #[error("invalid literal, expected one of false, true or null")]
    InvalidLiteral,
    /// The string arena ran out of space.
    #[error(transparent)]
    OutOfArena(#[from] ArenaError),
}

/// A lexer error, carrying the 1-based source line it occurred on.
///
/// Renders as `line <N>: <reason>`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {kind}")]
pub struct LexError {
    /// 1-based line number of the offending lexeme.
    pub line: u32,
    /// The failure itself.
    pub kind: LexErrorKind,
}

impl LexError {
    pub(crate) fn new(line: u32, kind: LexErrorKind) -> Self {
        LexError { line, kind }
    }
}
