use lex_json::{JsonStr, LexErrorKind, LexKind, Lexeme, LexemeSource, Lexer};
use u8arena::Arena;

fn kinds_of(input: &[u8]) -> Vec<LexKind> {
    let mut backing = [0u8; 1024];
    let arena = Arena::new(&mut backing, "strings");
    let mut lexer = Lexer::new(input, &arena);

    let mut kinds = Vec::new();
    loop {
        let lexeme = lexer.next().unwrap();
        kinds.push(lexeme.kind());
        if lexeme == Lexeme::Eof {
            return kinds;
        }
    }
}

#[test]
fn test_structural_lexemes() {
    assert_eq!(
        kinds_of(b"{ } [ ] , :"),
        vec![
            LexKind::BeginObject,
            LexKind::EndObject,
            LexKind::BeginArray,
            LexKind::EndArray,
            LexKind::ValueSeparator,
            LexKind::NameSeparator,
            LexKind::Eof,
        ]
    );
}

#[test]
fn test_literals() {
    let mut backing = [0u8; 64];
    let arena = Arena::new(&mut backing, "strings");
    let mut lexer = Lexer::new(b"true false null", &arena);

    assert_eq!(lexer.next().unwrap(), Lexeme::Boolean(true));
    assert_eq!(lexer.next().unwrap(), Lexeme::Boolean(false));
    assert_eq!(lexer.next().unwrap(), Lexeme::Null);
    assert_eq!(lexer.next().unwrap(), Lexeme::Eof);
}

#[test]
fn test_invalid_literal() {
    let mut backing = [0u8; 64];
    let arena = Arena::new(&mut backing, "strings");
    let mut lexer = Lexer::new(b"nope", &arena);

    let err = lexer.next().unwrap_err();
    assert_eq!(err.kind, LexErrorKind::InvalidLiteral);
    assert_eq!(err.line, 1);
}

#[test]
fn test_peek_does_not_consume() {
    let mut backing = [0u8; 64];
    let arena = Arena::new(&mut backing, "strings");
    let mut lexer = Lexer::new(b"[1]", &arena);

    assert_eq!(lexer.peek().unwrap(), Lexeme::BeginArray);
    assert_eq!(lexer.peek().unwrap(), Lexeme::BeginArray);
    assert_eq!(lexer.next().unwrap(), Lexeme::BeginArray);
    assert_eq!(lexer.peek().unwrap().kind(), LexKind::Number);
}

#[test]
fn test_expect_consumes_only_on_match() {
    let mut backing = [0u8; 64];
    let arena = Arena::new(&mut backing, "strings");
    let mut lexer = Lexer::new(b"{}", &arena);

    assert!(lexer.expect(LexKind::BeginArray).unwrap().is_none());
    assert!(lexer.expect(LexKind::BeginObject).unwrap().is_some());
    assert!(lexer.expect(LexKind::EndObject).unwrap().is_some());
    assert!(lexer.expect(LexKind::Eof).unwrap().is_some());
}

#[test]
fn test_simple_string() {
    let mut backing = [0u8; 64];
    let arena = Arena::new(&mut backing, "strings");
    let mut lexer = Lexer::new(br#""hello""#, &arena);

    let lexeme = lexer.next().unwrap();
    assert_eq!(lexeme.as_str(), Some("hello"));
}

#[test]
fn test_string_is_nul_terminated_in_arena() {
    let mut backing = [0xffu8; 64];
    let arena = Arena::new(&mut backing, "strings");
    let mut lexer = Lexer::new(br#""abc""#, &arena);

    let lexeme = lexer.next().unwrap();
    let Lexeme::String(JsonStr::Owned(s)) = lexeme else {
        panic!("expected owned string, got {lexeme:?}");
    };
    assert_eq!(s, "abc");
    // The committed region holds the text plus one NUL byte.
    assert_eq!(arena.len(), 4);
    let nul = unsafe { *s.as_ptr().add(s.len()) };
    assert_eq!(nul, 0);
}

#[test]
fn test_every_escape() {
    let mut backing = [0u8; 128];
    let arena = Arena::new(&mut backing, "strings");
    let mut lexer = Lexer::new(br#""\\ \" \/ \b \f \n \r \t \u00e9""#, &arena);

    let lexeme = lexer.next().unwrap();
    assert_eq!(
        lexeme.as_str(),
        Some("\\ \" / \u{8} \u{c} \n \r \t \u{e9}")
    );
}

#[test]
fn test_bmp_escape_multibyte() {
    let mut backing = [0u8; 64];
    let arena = Arena::new(&mut backing, "strings");
    let mut lexer = Lexer::new(br#""\u0410\u4e2d""#, &arena);

    assert_eq!(lexer.next().unwrap().as_str(), Some("\u{410}\u{4e2d}"));
}

#[test]
fn test_raw_utf8_passthrough() {
    let mut backing = [0u8; 64];
    let arena = Arena::new(&mut backing, "strings");
    let mut lexer = Lexer::new("\"héllo → 中\"".as_bytes(), &arena);

    assert_eq!(lexer.next().unwrap().as_str(), Some("héllo → 中"));
}

#[test]
fn test_string_errors() {
    let cases: &[(&[u8], LexErrorKind)] = &[
        (br#""abc"#, LexErrorKind::EofInString),
        (br#""abc\"#, LexErrorKind::EofInEscape),
        (br#""ab\u12"#, LexErrorKind::EofInEscape),
        (br#""ab\u12xy""#, LexErrorKind::ExpectedHex),
        (br#""ab\q""#, LexErrorKind::UnexpectedChar),
    ];
    for (input, expected) in cases {
        let mut backing = [0u8; 64];
        let arena = Arena::new(&mut backing, "strings");
        let mut lexer = Lexer::new(input, &arena);
        let err = lexer.next().unwrap_err();
        assert_eq!(err.kind, *expected, "input {input:?}");
    }
}

#[test]
fn test_failed_string_leaves_cursor() {
    let mut backing = [0u8; 64];
    let arena = Arena::new(&mut backing, "strings");
    let mut lexer = Lexer::new(br#""abc"#, &arena);

    assert!(lexer.next().is_err());
    // The checkout was cancelled, nothing committed.
    assert_eq!(arena.len(), 0);
}

#[test]
fn test_numbers_in_context() {
    let mut backing = [0u8; 64];
    let arena = Arena::new(&mut backing, "strings");
    let mut lexer = Lexer::new(b"[1,2.5,-3]", &arena);

    lexer.skip().unwrap();
    let Lexeme::Number(a) = lexer.next().unwrap() else {
        panic!()
    };
    assert_eq!(a.as_u64(), 1);
    lexer.skip().unwrap();
    let Lexeme::Number(b) = lexer.next().unwrap() else {
        panic!()
    };
    assert_eq!(b.as_f64(), 2.5);
    lexer.skip().unwrap();
    let Lexeme::Number(c) = lexer.next().unwrap() else {
        panic!()
    };
    assert_eq!(c.as_i64(), -3);
    assert_eq!(lexer.next().unwrap(), Lexeme::EndArray);
}

#[test]
fn test_bad_number_reports_line() {
    let mut backing = [0u8; 64];
    let arena = Arena::new(&mut backing, "strings");
    let mut lexer = Lexer::new(b"{\n  \"bad\": 1.e\n}", &arena);

    lexer.skip().unwrap(); // {
    lexer.skip().unwrap(); // "bad"
    lexer.skip().unwrap(); // :
    let err = lexer.next().unwrap_err();
    assert_eq!(err.kind, LexErrorKind::BadNumber);
    assert_eq!(err.line, 2);
    assert_eq!(err.to_string(), "line 2: bad number");
}

#[test]
fn test_line_counting() {
    let mut backing = [0u8; 64];
    let arena = Arena::new(&mut backing, "strings");
    let mut lexer = Lexer::new(b"\n\n\ntrue\n", &arena);

    lexer.next().unwrap();
    assert_eq!(lexer.line(), 4);
}

#[test]
fn test_embedded_nul_is_eof() {
    let mut backing = [0u8; 64];
    let arena = Arena::new(&mut backing, "strings");
    let mut lexer = Lexer::new(b"\0true", &arena);

    assert_eq!(lexer.next().unwrap(), Lexeme::Eof);
}
