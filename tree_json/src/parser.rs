use core::cell::Cell;
use core::fmt::Write as _;

use lex_json::{JsonStr, LexError, LexErrorKind, LexKind, Lexeme, LexemeSource, Lexer, Scanner};
use u8arena::{Arena, ArenaError};

use crate::error::{Failure, ParseError, Result, SyntaxReason};
use crate::value::{JsonArray, JsonObject, JsonValue, NamedNode, ValueNode};

/// Parses a JSON document into a [`JsonValue`] tree in `arena`.
///
/// String values are unescaped into the arena and NUL-terminated there.
/// `scratch` receives the error message on failure and nothing else; the
/// caller resets both arenas between documents.
///
/// # Errors
///
/// Any lexical or syntax error, with its text formatted as
/// `line <N>: <reason>` into `scratch`. No partial tree is returned.
pub fn parse<'a>(
    input: &'a [u8],
    arena: &'a Arena<'_>,
    scratch: &'a Arena<'_>,
) -> Result<'a, &'a JsonValue<'a>> {
    parse_document(Lexer::new(input, arena), arena, scratch)
}

/// Like [`parse`], but strings borrow the source buffer.
///
/// No unescaping happens: a string value is the raw slice between its
/// quotes (validated as UTF-8) with any escape sequences left intact for
/// the consumer to interpret. Numbers and literals come out fully
/// interpreted, the same as [`parse`].
///
/// # Errors
///
/// Same failure modes and message format as [`parse`].
pub fn scan<'a>(
    input: &'a [u8],
    arena: &'a Arena<'_>,
    scratch: &'a Arena<'_>,
) -> Result<'a, &'a JsonValue<'a>> {
    parse_document(Scanner::new(input), arena, scratch)
}

fn parse_document<'a, L>(
    mut lexer: L,
    arena: &'a Arena<'_>,
    scratch: &'a Arena<'_>,
) -> Result<'a, &'a JsonValue<'a>>
where
    L: LexemeSource<'a>,
{
    fn run<'a, L: LexemeSource<'a>>(
        lexer: &mut L,
        arena: &'a Arena<'_>,
    ) -> core::result::Result<&'a JsonValue<'a>, Failure> {
        let mut parser = Parser::new(lexer, arena)?;
        let root = parser.parse_value()?;
        if parser.lexer.expect(LexKind::Eof)?.is_none() {
            return Err(parser.syntax(SyntaxReason::DataAfterDocument));
        }
        Ok(root)
    }

    run(&mut lexer, arena).map_err(|failure| render_error(scratch, &failure))
}

// The message is built once, after all scratch scopes have unwound, so
// it survives until the caller resets the arena.
fn render_error<'a>(scratch: &'a Arena<'_>, failure: &Failure) -> ParseError<'a> {
    const FALLBACK: &str = "line 0: out of arena memory";

    let Ok(mut out) = scratch.checkout() else {
        return ParseError { message: FALLBACK };
    };
    let _ = write!(out, "{failure}");
    let _ = out.write_byte(0);
    let bytes = out.commit();

    let text = bytes
        .split_last()
        .filter(|(last, _)| **last == 0)
        .map_or(bytes, |(_, rest)| rest);
    match core::str::from_utf8(text) {
        Ok(message) if !message.is_empty() => ParseError { message },
        _ => ParseError { message: FALLBACK },
    }
}

struct Parser<'p, 'a, 'buf, L> {
    lexer: &'p mut L,
    arena: &'a Arena<'buf>,
    true_value: &'a JsonValue<'a>,
    false_value: &'a JsonValue<'a>,
    null_value: &'a JsonValue<'a>,
}

impl<'p, 'a, 'buf, L: LexemeSource<'a>> Parser<'p, 'a, 'buf, L> {
    // The literal singletons are per-document, allocated up front.
    fn new(lexer: &'p mut L, arena: &'a Arena<'buf>) -> core::result::Result<Self, Failure> {
        let line = lexer.line();
        let alloc = |value| {
            arena
                .alloc_value(value)
                .map(|v| &*v)
                .map_err(|e| Failure::Arena(line, e))
        };
        let true_value = alloc(JsonValue::Boolean(true))?;
        let false_value = alloc(JsonValue::Boolean(false))?;
        let null_value = alloc(JsonValue::Null)?;
        Ok(Parser {
            lexer,
            arena,
            true_value,
            false_value,
            null_value,
        })
    }

    fn syntax(&self, reason: SyntaxReason) -> Failure {
        Failure::Syntax(self.lexer.line(), reason)
    }

    fn oom(&self, error: ArenaError) -> Failure {
        Failure::Arena(self.lexer.line(), error)
    }

    fn alloc<T>(&self, value: T) -> core::result::Result<&'a T, Failure> {
        self.arena
            .alloc_value(value)
            .map(|v| &*v)
            .map_err(|e| self.oom(e))
    }

    fn text(&self, payload: JsonStr<'a>) -> core::result::Result<&'a str, Failure> {
        match payload {
            JsonStr::Owned(text) => Ok(text),
            JsonStr::Borrowed(bytes) => core::str::from_utf8(bytes).map_err(|_| {
                Failure::Lex(LexError {
                    line: self.lexer.line(),
                    kind: LexErrorKind::UnexpectedChar,
                })
            }),
        }
    }

    fn parse_value(&mut self) -> core::result::Result<&'a JsonValue<'a>, Failure> {
        match self.lexer.peek()? {
            Lexeme::BeginObject => self.parse_object(),
            Lexeme::BeginArray => self.parse_array(),
            Lexeme::String(payload) => {
                let text = self.text(payload)?;
                let value = self.alloc(JsonValue::String(text))?;
                self.lexer.skip()?;
                Ok(value)
            }
            Lexeme::Number(number) => {
                let value = self.alloc(JsonValue::Number(number))?;
                self.lexer.skip()?;
                Ok(value)
            }
            Lexeme::Boolean(b) => {
                self.lexer.skip()?;
                Ok(if b { self.true_value } else { self.false_value })
            }
            Lexeme::Null => {
                self.lexer.skip()?;
                Ok(self.null_value)
            }
            _ => Err(self.syntax(SyntaxReason::InvalidDocument)),
        }
    }

    // object ::= '{' ( string ':' value (',' string ':' value)* )? '}'
    //
    // A value is legal at the start or right after a comma; a comma is
    // legal only right after a value; '}' is legal at any boundary.
    // Members are tail-inserted so the list preserves source order.
    fn parse_object(&mut self) -> core::result::Result<&'a JsonValue<'a>, Failure> {
        if self.lexer.expect(LexKind::BeginObject)?.is_none() {
            return Err(self.syntax(SyntaxReason::MissingOpenBrace));
        }

        let mut head: Option<&'a NamedNode<'a>> = None;
        let mut tail: Option<&'a NamedNode<'a>> = None;
        let mut count = 0u32;

        let mut seen_value = false;
        let mut seen_comma = false;

        loop {
            match self.lexer.next()? {
                Lexeme::EndObject => break,

                Lexeme::String(payload) => {
                    if seen_value && !seen_comma {
                        return Err(self.syntax(SyntaxReason::MissingComma));
                    }
                    if self.lexer.expect(LexKind::NameSeparator)?.is_none() {
                        return Err(self.syntax(SyntaxReason::MissingColon));
                    }

                    let name = self.text(payload)?;
                    let value = self.parse_value()?;
                    let node = self.alloc(NamedNode {
                        name,
                        value,
                        next: Cell::new(None),
                    })?;
                    match tail {
                        None => head = Some(node),
                        Some(prev) => prev.next.set(Some(node)),
                    }
                    tail = Some(node);
                    count += 1;

                    seen_value = true;
                    seen_comma = false;
                }

                Lexeme::ValueSeparator => {
                    if !seen_value {
                        return Err(self.syntax(SyntaxReason::ExpectedKeyName));
                    }
                    if seen_comma {
                        return Err(self.syntax(SyntaxReason::DuplicateComma));
                    }
                    seen_value = false;
                    seen_comma = true;
                }

                _ => return Err(self.syntax(SyntaxReason::ObjectContinue)),
            }
        }

        self.alloc(JsonValue::Object(JsonObject { count, head }))
    }

    // array ::= '[' ( value (',' value)* )? ']'
    fn parse_array(&mut self) -> core::result::Result<&'a JsonValue<'a>, Failure> {
        if self.lexer.expect(LexKind::BeginArray)?.is_none() {
            return Err(self.syntax(SyntaxReason::ExpectedOpenBracket));
        }

        let mut head: Option<&'a ValueNode<'a>> = None;
        let mut tail: Option<&'a ValueNode<'a>> = None;
        let mut count = 0u32;

        loop {
            if self.lexer.expect(LexKind::EndArray)?.is_some() {
                break;
            }

            if count > 0 && self.lexer.expect(LexKind::ValueSeparator)?.is_none() {
                return Err(self.syntax(SyntaxReason::ExpectedComma));
            }

            let value = self.parse_value()?;
            let node = self.alloc(ValueNode {
                value,
                next: Cell::new(None),
            })?;
            match tail {
                None => head = Some(node),
                Some(prev) => prev.next.set(Some(node)),
            }
            tail = Some(node);
            count += 1;
        }

        self.alloc(JsonValue::Array(JsonArray { count, head }))
    }
}
