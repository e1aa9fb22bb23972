use crate::error::Result;
use crate::number::JsonNumber;

/// The payload of a string lexeme.
///
/// The lexer unescapes into an arena and yields `Owned` text; the
/// scanner leaves the source untouched and yields `Borrowed` bytes with
/// any escape sequences still in them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonStr<'a> {
    /// Unescaped text living in the arena, NUL-terminated there.
    Owned(&'a str),
    /// A raw slice of the source between the quotes, escapes intact.
    Borrowed(&'a [u8]),
}

impl<'a> JsonStr<'a> {
    /// Returns the raw bytes of either payload.
    #[must_use]
    pub fn as_bytes(&self) -> &'a [u8] {
        match self {
            JsonStr::Owned(s) => s.as_bytes(),
            JsonStr::Borrowed(b) => b,
        }
    }
}

/// The smallest syntactic token of JSON, plus the end marker.
///
/// Errors are not a lexeme kind; fetching reports them as `Err`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lexeme<'a> {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    /// `:`
    NameSeparator,
    /// `,`
    ValueSeparator,
    String(JsonStr<'a>),
    Number(JsonNumber),
    Boolean(bool),
    Null,
    Eof,
}

/// A [`Lexeme`] with the payload stripped, for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexKind {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    NameSeparator,
    ValueSeparator,
    String,
    Number,
    Boolean,
    Null,
    Eof,
}

impl Lexeme<'_> {
    #[must_use]
    pub fn kind(&self) -> LexKind {
        match self {
            Lexeme::BeginObject => LexKind::BeginObject,
            Lexeme::EndObject => LexKind::EndObject,
            Lexeme::BeginArray => LexKind::BeginArray,
            Lexeme::EndArray => LexKind::EndArray,
            Lexeme::NameSeparator => LexKind::NameSeparator,
            Lexeme::ValueSeparator => LexKind::ValueSeparator,
            Lexeme::String(_) => LexKind::String,
            Lexeme::Number(_) => LexKind::Number,
            Lexeme::Boolean(_) => LexKind::Boolean,
            Lexeme::Null => LexKind::Null,
            Lexeme::Eof => LexKind::Eof,
        }
    }

    /// Returns the unescaped text of an `Owned` string lexeme.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Lexeme::String(JsonStr::Owned(s)) => Some(s),
            _ => None,
        }
    }
}

/// The pull interface shared by [`crate::Lexer`] and [`crate::Scanner`].
///
/// Both keep a one-lexeme lookahead: `peek` fetches and caches, `next`
/// consumes, `expect` consumes only when the kind matches.
pub trait LexemeSource<'a> {
    /// Returns the lookahead lexeme without consuming it.
    ///
    /// # Errors
    ///
    /// Any lexical error at the cursor.
    fn peek(&mut self) -> Result<Lexeme<'a>>;

    /// Consumes and returns the lookahead lexeme.
    ///
    /// # Errors
    ///
    /// Any lexical error at the cursor.
    fn next(&mut self) -> Result<Lexeme<'a>>;

    /// The 1-based line number of the cursor, for error reporting.
    fn line(&self) -> u32;

    /// Consumes the lookahead, discarding it.
    ///
    /// # Errors
    ///
    /// Any lexical error at the cursor.
    fn skip(&mut self) -> Result<()> {
        self.next().map(|_| ())
    }

    /// Consumes the lookahead only if it has the given kind.
    /// Returns the consumed lexeme, or `None` if the kind differs.
    ///
    /// # Errors
    ///
    /// Any lexical error at the cursor.
    fn expect(&mut self, kind: LexKind) -> Result<Option<Lexeme<'a>>> {
        if self.peek()?.kind() == kind {
            Ok(Some(self.next()?))
        } else {
            Ok(None)
        }
    }
}
