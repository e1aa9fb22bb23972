use crate::error::{LexError, LexErrorKind, Result};
use crate::lexeme::{JsonStr, Lexeme, LexemeSource};
use crate::number::parse_number;
use crate::utf8::{is_whitespace, peek_utf8};

/// The borrowing lexer variant.
///
/// Yields the same lexeme stream as [`crate::Lexer`] but never touches
/// an arena: string payloads are [`JsonStr::Borrowed`] slices of the
/// source between the quotes, with escape sequences left intact for the
/// consumer to interpret. Faster when unescaped text is not needed.
pub struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
    line: u32,
    lookahead: Option<Lexeme<'a>>,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Scanner {
            input,
            pos: 0,
            line: 1,
            lookahead: None,
        }
    }

    fn error(&self, kind: LexErrorKind) -> LexError {
        LexError::new(self.line, kind)
    }

    // `pos <= input.len()` is maintained by every advance below.
    #[allow(clippy::indexing_slicing)]
    fn rest(&self) -> &'a [u8] {
        &self.input[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        loop {
            let ch = peek_utf8(self.rest());
            if ch.len <= 0 || !is_whitespace(ch.code) {
                return;
            }
            if ch.code == u32::from(b'\n') {
                self.line += 1;
            }
            self.pos += ch.len as usize;
        }
    }

    fn fetch(&mut self) -> Result<Lexeme<'a>> {
        self.skip_whitespace();

        let Some(&byte) = self.input.get(self.pos) else {
            return Ok(Lexeme::Eof);
        };
        match byte {
            b'-' | b'0'..=b'9' => self.number_lexeme(),
            b'"' => self.string_lexeme(),
            b'{' => {
                self.pos += 1;
                Ok(Lexeme::BeginObject)
            }
            b'}' => {
                self.pos += 1;
                Ok(Lexeme::EndObject)
            }
            b'[' => {
                self.pos += 1;
                Ok(Lexeme::BeginArray)
            }
            b']' => {
                self.pos += 1;
                Ok(Lexeme::EndArray)
            }
            b',' => {
                self.pos += 1;
                Ok(Lexeme::ValueSeparator)
            }
            b':' => {
                self.pos += 1;
                Ok(Lexeme::NameSeparator)
            }
            0 => Ok(Lexeme::Eof),
            _ => self.literal_lexeme(),
        }
    }

    fn number_lexeme(&mut self) -> Result<Lexeme<'a>> {
        let start = self.pos;
        loop {
            let ch = peek_utf8(self.rest());
            if ch.len == 0 {
                break;
            }
            if ch.len < 0 {
                self.pos += 1;
                continue;
            }
            if ch.code == 0
                || is_whitespace(ch.code)
                || matches!(ch.code, 0x2C | 0x5D | 0x7D)
            {
                break;
            }
            self.pos += ch.len as usize;
        }

        #[allow(clippy::indexing_slicing)]
        let run = &self.input[start..self.pos];
        let (consumed, number) = parse_number(run);
        if !number.is_valid() || consumed != run.len() {
            return Err(self.error(LexErrorKind::BadNumber));
        }
        Ok(Lexeme::Number(number))
    }

    // The slice between the quotes, escapes and all. A backslash always
    // swallows the next byte so an escaped quote cannot end the string.
    fn string_lexeme(&mut self) -> Result<Lexeme<'a>> {
        self.pos += 1; // opening quote
        let start = self.pos;

        loop {
            let Some(&byte) = self.input.get(self.pos) else {
                return Err(self.error(LexErrorKind::EofInString));
            };
            match byte {
                0 => return Err(self.error(LexErrorKind::EofInString)),
                b'"' => break,
                b'\\' => {
                    if self.pos + 1 >= self.input.len() {
                        return Err(self.error(LexErrorKind::EofInEscape));
                    }
                    self.pos += 2;
                }
                _ => {
                    let ch = peek_utf8(self.rest());
                    if ch.len <= 0 {
                        return Err(self.error(LexErrorKind::UnexpectedChar));
                    }
                    self.pos += ch.len as usize;
                }
            }
        }

        #[allow(clippy::indexing_slicing)]
        let slice = &self.input[start..self.pos];
        self.pos += 1; // closing quote
        Ok(Lexeme::String(JsonStr::Borrowed(slice)))
    }

    #[allow(clippy::indexing_slicing)]
    fn literal_lexeme(&mut self) -> Result<Lexeme<'a>> {
        let start = self.pos;
        while self
            .input
            .get(self.pos)
            .is_some_and(u8::is_ascii_alphabetic)
        {
            self.pos += 1;
        }

        match &self.input[start..self.pos] {
            b"true" => Ok(Lexeme::Boolean(true)),
            b"false" => Ok(Lexeme::Boolean(false)),
            b"null" => Ok(Lexeme::Null),
            _ => Err(self.error(LexErrorKind::InvalidLiteral)),
        }
    }
}

impl<'a> LexemeSource<'a> for Scanner<'a> {
    fn peek(&mut self) -> Result<Lexeme<'a>> {
        if let Some(lexeme) = self.lookahead {
            return Ok(lexeme);
        }
        let lexeme = self.fetch()?;
        self.lookahead = Some(lexeme);
        Ok(lexeme)
    }

    fn next(&mut self) -> Result<Lexeme<'a>> {
        match self.lookahead.take() {
            Some(lexeme) => Ok(lexeme),
            None => self.fetch(),
        }
    }

    fn line(&self) -> u32 {
        self.line
    }
}

impl core::fmt::Debug for Scanner<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Scanner {{ pos: {}, line: {}, lookahead: {:?} }}",
            self.pos, self.line, self.lookahead
        )
    }
}
