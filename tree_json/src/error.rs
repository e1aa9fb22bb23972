use lex_json::LexError;
use u8arena::ArenaError;

/// Convenient type alias for parse results.
pub type Result<'a, T> = core::result::Result<T, ParseError<'a>>;

/// A parse failure with its diagnostic text.
///
/// The message always reads `line <N>: <reason>` and lives in the
/// scratch arena handed to [`crate::parse`], NUL-terminated there, so a
/// host without a heap can keep it around until the arena is reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ParseError<'a> {
    /// Formatted diagnostic text.
    pub message: &'a str,
}

/// The reasons the grammar walker can fail, as data; rendering into the
/// caller's arena happens once, at the top level.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum SyntaxReason {
    #[error("missing '{{'")]
    MissingOpenBrace,
    #[error("expected '['")]
    ExpectedOpenBracket,
    #[error("missing ':'")]
    MissingColon,
    #[error("missing ','")]
    MissingComma,
    #[error("expected key name")]
    ExpectedKeyName,
    #[error("duplicate comma")]
    DuplicateComma,
    #[error("expected object to continue")]
    ObjectContinue,
    #[error("expected ','")]
    ExpectedComma,
    #[error("invalid document")]
    InvalidDocument,
    #[error("data after document")]
    DataAfterDocument,
}

/// Internal failure carrier; `Lex` already knows its line.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub(crate) enum Failure {
    #[error("{0}")]
    Lex(#[from] LexError),
    #[error("line {0}: {1}")]
    Syntax(u32, SyntaxReason),
    #[error("line {0}: {1}")]
    Arena(u32, ArenaError),
}
