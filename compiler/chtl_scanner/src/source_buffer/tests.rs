use super::*;

// === Construction ===

#[test]
fn empty_source_has_sentinel() {
    let buf = SourceBuffer::new("").unwrap();
    assert!(buf.is_empty());
    assert_eq!(buf.len(), 0);
    assert!(buf.cursor().is_eof());
}

#[test]
fn buffer_is_padded_to_cache_line() {
    let buf = SourceBuffer::new("div { }").unwrap();
    assert_eq!(buf.as_bytes(), b"div { }");
    assert_eq!(buf.buf.len() % CACHE_LINE, 0);
    assert!(buf.buf[buf.len() as usize..].iter().all(|&b| b == 0));
}

#[test]
fn exact_cache_line_source_still_gets_sentinel() {
    let source = "a".repeat(CACHE_LINE);
    let buf = SourceBuffer::new(&source).unwrap();
    assert_eq!(buf.buf.len(), CACHE_LINE * 2);
    assert_eq!(buf.buf[CACHE_LINE], 0);
}

#[test]
fn as_str_returns_original_text() {
    let source = "script { listen() }";
    let buf = SourceBuffer::new(source).unwrap();
    assert_eq!(buf.as_str(), source);
}

// === Cursor ===

#[test]
fn cursor_starts_at_zero() {
    let buf = SourceBuffer::new("xyz").unwrap();
    let cursor = buf.cursor();
    assert_eq!(cursor.pos(), 0);
    assert_eq!(cursor.current(), b'x');
    assert_eq!(cursor.source_len(), 3);
}
