use lex_json::{parse_number, JsonNumber};

fn parse_all(text: &str) -> JsonNumber {
    let (consumed, number) = parse_number(text.as_bytes());
    assert_eq!(consumed, text.len(), "did not consume all of {text:?}");
    number
}

#[test]
fn test_plain_integers() {
    let n = parse_all("42");
    assert!(n.has_u64() && n.has_s64() && !n.has_f64());
    assert_eq!(n.as_u64(), 42);
    assert_eq!(n.as_i64(), 42);
    assert_eq!(n.as_f64(), 42.0);
}

#[test]
fn test_negative_integer() {
    let n = parse_all("-17");
    assert!(n.has_s64() && !n.has_u64());
    assert_eq!(n.as_i64(), -17);
    assert_eq!(n.as_f64(), -17.0);
}

#[test]
fn test_zero() {
    let n = parse_all("0");
    assert!(n.has_u64() && n.has_s64());
    assert_eq!(n.as_u64(), 0);
}

#[test]
fn test_i64_max_is_both_signed_and_unsigned() {
    let n = parse_all("9223372036854775807");
    assert!(n.has_s64());
    assert!(n.has_u64());
    assert_eq!(n.as_i64(), i64::MAX);
    assert_eq!(n.as_u64(), 9_223_372_036_854_775_807);
}

#[test]
fn test_beyond_i64_max_is_unsigned_only() {
    let n = parse_all("9223372036854775808");
    assert!(!n.has_s64());
    assert!(n.has_u64());
    assert_eq!(n.as_u64(), 9_223_372_036_854_775_808);
}

#[test]
fn test_i64_min_is_signed_only() {
    let n = parse_all("-9223372036854775808");
    assert!(n.has_s64());
    assert!(!n.has_u64());
    assert_eq!(n.as_i64(), i64::MIN);
}

#[test]
fn test_fraction_tags_float() {
    let n = parse_all("1.5");
    assert!(n.has_f64() && !n.has_s64() && !n.has_u64());
    assert_eq!(n.as_f64(), 1.5);
    assert_eq!(n.as_i64(), 1);
}

#[test]
fn test_negative_fraction() {
    let n = parse_all("-2.25");
    assert_eq!(n.as_f64(), -2.25);
}

#[test]
fn test_exponent() {
    assert_eq!(parse_all("1.5e2").as_f64(), 150.0);
    assert_eq!(parse_all("15E+2").as_f64(), 1500.0);
    assert_eq!(parse_all("150e-1").as_f64(), 15.0);
}

#[test]
fn test_exponent_clamped_to_308() {
    let n = parse_all("1e400");
    assert!(n.has_f64());
    assert_eq!(n.as_f64(), 1e308);
}

#[test]
fn test_malformed_numbers() {
    for text in ["-", ".", "1.", "1.e", "1e", "1e+", ".5", "-."] {
        let (_, n) = parse_number(text.as_bytes());
        assert!(!n.is_valid(), "{text:?} should be malformed");
    }
}

#[test]
fn test_partial_consumption_reported() {
    let (consumed, n) = parse_number(b"12x");
    assert_eq!(consumed, 2);
    assert!(n.is_valid());
    assert_eq!(n.as_u64(), 12);
}

#[test]
fn test_unknown_defaults_to_zero() {
    let n = JsonNumber::unknown();
    assert!(!n.is_valid());
    assert_eq!(n.as_i64(), 0);
    assert_eq!(n.as_u64(), 0);
    assert_eq!(n.as_f64(), 0.0);
}
