use crate::SourceBuffer;

fn buffer(source: &str) -> SourceBuffer<'_> {
    SourceBuffer::new(source).unwrap_or_else(|| panic!("test source fits in u32"))
}

// === Basic Navigation ===

#[test]
fn advance_moves_forward() {
    let buf = buffer("abc");
    let mut cursor = buf.cursor();
    cursor.advance();
    assert_eq!(cursor.current(), b'b');
    assert_eq!(cursor.pos(), 1);
}

#[test]
fn peek_near_end_returns_sentinel() {
    let buf = buffer("ab");
    let mut cursor = buf.cursor();
    cursor.advance();
    assert_eq!(cursor.peek(), 0);
}

#[test]
fn interior_null_is_not_eof() {
    let buf = buffer("a\0b");
    let mut cursor = buf.cursor();
    cursor.advance();
    assert_eq!(cursor.current(), 0);
    assert!(!cursor.is_eof());
    cursor.advance_n(2);
    assert!(cursor.is_eof());
}

#[test]
fn advance_char_skips_multibyte() {
    let buf = buffer("é{");
    let mut cursor = buf.cursor();
    cursor.advance_char();
    assert_eq!(cursor.current(), b'{');
}

// === Slicing ===

#[test]
fn slice_from_start() {
    let buf = buffer("script { }");
    let mut cursor = buf.cursor();
    cursor.advance_n(6);
    assert_eq!(cursor.slice_from(0), "script");
    assert_eq!(cursor.slice(7, 10), "{ }");
}

#[test]
fn starts_with_checks_remaining() {
    let buf = buffer("<script>");
    let mut cursor = buf.cursor();
    assert!(cursor.starts_with(b"<script"));
    cursor.advance();
    assert!(!cursor.starts_with(b"<script"));
}

// === Skipping ===

#[test]
fn eat_until_newline_stops_before_newline() {
    let buf = buffer("// note\nnext");
    let mut cursor = buf.cursor();
    cursor.eat_until_newline_or_eof();
    assert_eq!(cursor.current(), b'\n');
    assert_eq!(cursor.pos(), 7);
}

#[test]
fn eat_until_newline_without_newline_hits_eof() {
    let buf = buffer("// trailing");
    let mut cursor = buf.cursor();
    cursor.eat_until_newline_or_eof();
    assert!(cursor.is_eof());
}

#[test]
fn skip_to_string_delim_finds_quote_or_escape() {
    let buf = buffer(r#"abc\"def""#);
    let mut cursor = buf.cursor();
    assert_eq!(cursor.skip_to_string_delim(b'"'), b'\\');
    cursor.advance_n(2);
    assert_eq!(cursor.skip_to_string_delim(b'"'), b'"');
    assert_eq!(cursor.pos(), 8);
}

#[test]
fn skip_to_string_delim_reports_eof() {
    let buf = buffer("never closed");
    let mut cursor = buf.cursor();
    assert_eq!(cursor.skip_to_string_delim(b'\''), 0);
    assert!(cursor.is_eof());
}

#[test]
fn eat_past_consumes_needle() {
    let buf = buffer("/* body */ rest");
    let mut cursor = buf.cursor();
    cursor.advance_n(2);
    assert!(cursor.eat_past(b"*/"));
    assert_eq!(cursor.slice_from(0), "/* body */");
}

#[test]
fn eat_past_missing_needle_parks_at_eof() {
    let buf = buffer("/* open");
    let mut cursor = buf.cursor();
    assert!(!cursor.eat_past(b"*/"));
    assert!(cursor.is_eof());
}

#[test]
fn eat_whitespace_includes_newlines() {
    let buf = buffer(" \t\r\n {");
    let mut cursor = buf.cursor();
    cursor.eat_whitespace();
    assert_eq!(cursor.current(), b'{');
}
