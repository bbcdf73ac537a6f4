use super::*;
use pretty_assertions::assert_eq;

// === Regex Position ===

#[test]
fn regex_follows_operators_and_openers() {
    for before in ["", "  ", "x = ", "f(", "a, ", "{ ", "; ", "return ", "!", "a && "] {
        assert!(regex_allowed(before.as_bytes()), "before: {before:?}");
    }
}

#[test]
fn division_follows_values() {
    for before in ["a ", "a.b", "f(x)", "arr[0]", "10", "returned "] {
        assert!(!regex_allowed(before.as_bytes()), "before: {before:?}");
    }
}

// === Regex Extent ===

#[test]
fn length_includes_flags() {
    assert_eq!(regex_len(b"/'/g, x"), Some(4));
    assert_eq!(regex_len(b"/a/"), Some(3));
}

#[test]
fn class_and_escape_hide_slashes() {
    assert_eq!(regex_len(br"/[/']+/.test(s)"), Some(7));
    assert_eq!(regex_len(br"/a\/b/i;"), Some(7));
}

#[test]
fn line_break_or_end_means_division() {
    assert_eq!(regex_len(b"/ 2\n/ 3"), None);
    assert_eq!(regex_len(b"/ 2"), None);
}
