use u8arena::{Arena, Checkout};

use crate::error::{LexError, LexErrorKind, Result};
use crate::lexeme::{JsonStr, Lexeme, LexemeSource};
use crate::number::parse_number;
use crate::utf8::{encode_utf8, is_whitespace, peek_utf8};

/// The unescaping pull lexer.
///
/// Walks a fully buffered byte range and yields [`Lexeme`]s with a
/// one-lexeme lookahead. String values are unescaped into `arena` using
/// the checkout/commit protocol and come out NUL-terminated (the NUL is
/// inside the committed region but excluded from the reported length),
/// so they outlive the lexer and can be handed to C-flavored hosts.
pub struct Lexer<'a, 'buf> {
    input: &'a [u8],
    pos: usize,
    line: u32,
    arena: &'a Arena<'buf>,
    lookahead: Option<Lexeme<'a>>,
}

impl<'a, 'buf> Lexer<'a, 'buf> {
    /// Creates a lexer over `input`; string payloads go into `arena`.
    pub fn new(input: &'a [u8], arena: &'a Arena<'buf>) -> Self {
        Lexer {
            input,
            pos: 0,
            line: 1,
            arena,
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
            // Very likely an error; the literal matcher reports it.
            _ => self.literal_lexeme(),
        }
    }

    // A number runs until whitespace, `,`, `]`, `}` or the end of input,
    // and the whole run must parse.
    fn number_lexeme(&mut self) -> Result<Lexeme<'a>> {
        let start = self.pos;
        loop {
            let ch = peek_utf8(self.rest());
            if ch.len == 0 {
                break;
            }
            if ch.len < 0 {
                // A malformed byte joins the run; the parse below rejects it.
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

    fn string_lexeme(&mut self) -> Result<Lexeme<'a>> {
        self.pos += 1; // opening quote

        let arena: &'a Arena<'buf> = self.arena;
        let mut out = arena
            .checkout()
            .map_err(|e| self.error(LexErrorKind::OutOfArena(e)))?;

        loop {
            let Some(&byte) = self.input.get(self.pos) else {
                // Dropping the checkout cancels it.
                return Err(self.error(LexErrorKind::EofInString));
            };
            match byte {
                0 => return Err(self.error(LexErrorKind::EofInString)),
                b'"' => {
                    self.pos += 1;
                    break;
                }
                b'\\' => {
                    self.pos += 1;
                    self.unescape_into(&mut out)?;
                }
                _ => {
                    let ch = peek_utf8(self.rest());
                    if ch.len <= 0 {
                        return Err(self.error(LexErrorKind::UnexpectedChar));
                    }
                    let len = ch.len as usize;
                    #[allow(clippy::indexing_slicing)]
                    out.write(&self.input[self.pos..self.pos + len])
                        .map_err(|e| self.error(LexErrorKind::OutOfArena(e)))?;
                    self.pos += len;
                }
            }
        }

        out.write_byte(0)
            .map_err(|e| self.error(LexErrorKind::OutOfArena(e)))?;
        let bytes = out.commit();
        #[allow(clippy::indexing_slicing)]
        let text = core::str::from_utf8(&bytes[..bytes.len() - 1])
            .map_err(|_| self.error(LexErrorKind::UnexpectedChar))?;
        Ok(Lexeme::String(JsonStr::Owned(text)))
    }

    fn unescape_into(&mut self, out: &mut Checkout<'a, 'buf>) -> Result<()> {
        let Some(&escape) = self.input.get(self.pos) else {
            return Err(self.error(LexErrorKind::EofInEscape));
        };
        if escape == 0 {
            return Err(self.error(LexErrorKind::EofInEscape));
        }
        self.pos += 1;

        let byte = match escape {
            b'\\' => b'\\',
            b'"' => b'"',
            b'/' => b'/',
            b'b' => 0x08,
            b'f' => 0x0C,
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'u' => return self.unescape_hex(out),
            _ => return Err(self.error(LexErrorKind::UnexpectedChar)),
        };
        out.write_byte(byte)
            .map_err(|e| self.error(LexErrorKind::OutOfArena(e)))
    }

    // Exactly four hex digits naming a BMP code point.
    #[allow(clippy::indexing_slicing)]
    fn unescape_hex(&mut self, out: &mut Checkout<'a, 'buf>) -> Result<()> {
        let mut code = 0u32;
        for _ in 0..4 {
            let Some(&digit) = self.input.get(self.pos) else {
                return Err(self.error(LexErrorKind::EofInEscape));
            };
            if digit == 0 {
                return Err(self.error(LexErrorKind::EofInEscape));
            }
            if !digit.is_ascii_hexdigit() {
                return Err(self.error(LexErrorKind::ExpectedHex));
            }
            self.pos += 1;
            let value = match digit {
                b'0'..=b'9' => digit - b'0',
                b'a'..=b'f' => digit - b'a' + 10,
                _ => digit - b'A' + 10,
            };
            code = (code << 4) | u32::from(value);
        }

        let mut buf = [0u8; 4];
        let len = encode_utf8(code, &mut buf);
        out.write(&buf[..len])
            .map_err(|e| self.error(LexErrorKind::OutOfArena(e)))
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

impl<'a> LexemeSource<'a> for Lexer<'a, '_> {
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

impl core::fmt::Debug for Lexer<'_, '_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Lexer {{ pos: {}, line: {}, lookahead: {:?} }}",
            self.pos, self.line, self.lookahead
        )
    }
}
