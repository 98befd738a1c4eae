//! Semicolon-delimited list handling.
//!
//! A list value is an ordered run of tokens separated by [`SEPARATOR`].
//! Membership is tested with a case-insensitive substring search of
//! `entry;` inside `list;`, so an entry that is a suffix of a longer token
//! (`a` inside `C:\xa`) also counts as present. Callers depend on that
//! behavior; it is not token-exact matching.

use std::ops::Range;

use crate::buffer::GrowBuffer;
use crate::error::BufferError;

/// Token delimiter.
pub const SEPARATOR: char = ';';

/// Extra characters reserved whenever a buffer grows for an append.
pub const APPEND_MARGIN: usize = 4;

/// Append a separator unless the content is empty or already starts or ends
/// with one.
pub fn ensure_trailing_separator(buf: &mut GrowBuffer) -> Result<(), BufferError> {
    let text = buf.as_str();
    if text.is_empty() || text.starts_with(SEPARATOR) || text.ends_with(SEPARATOR) {
        return Ok(());
    }
    buf.ensure_capacity(buf.len() + APPEND_MARGIN)?;
    buf.push_char(SEPARATOR)
}

/// Remove one trailing separator, if present.
pub fn strip_trailing_separator(buf: &mut GrowBuffer) {
    buf.pop_if(SEPARATOR);
}

/// Drop empty tokens: leading, doubled, and trailing separators.
///
/// Returns `true` when the content changed.
pub fn compact_separators(buf: &mut GrowBuffer) -> Result<bool, BufferError> {
    let compacted = entries(buf.as_str()).collect::<Vec<_>>().join(";");
    if compacted == buf.as_str() {
        return Ok(false);
    }
    buf.set(&compacted)?;
    Ok(true)
}

/// Non-empty tokens of a list value, in order.
pub fn entries(value: &str) -> impl Iterator<Item = &str> {
    value.split(SEPARATOR).filter(|token| !token.is_empty())
}

/// Whether `needle` occurs in `haystack`, ignoring case.
pub fn contains_token(haystack: &str, needle: &str) -> bool {
    find_ignore_case(haystack, needle).is_some()
}

/// Append `token` as the last entry, leaving no trailing separator.
pub fn append_token(buf: &mut GrowBuffer, token: &str) -> Result<(), BufferError> {
    let needs_separator = !buf.is_empty() && !buf.as_str().ends_with(SEPARATOR);
    buf.ensure_capacity(buf.len() + token.chars().count() + APPEND_MARGIN)?;
    if needs_separator {
        buf.push_char(SEPARATOR)?;
    }
    buf.push_str(token)?;
    strip_trailing_separator(buf);
    Ok(())
}

/// Cut every occurrence of `token` out of the buffer.
///
/// `token` is expected to carry its trailing separator. A separator directly
/// following an occurrence is removed with it so no doubled separator is
/// left behind. Returns the number of occurrences removed.
pub fn remove_token(buf: &mut GrowBuffer, token: &str) -> usize {
    if token.is_empty() {
        return 0;
    }
    let mut removed = 0;
    while let Some(found) = find_ignore_case(buf.as_str(), token) {
        let mut end = found.end;
        if buf
            .as_str()
            .get(end..)
            .is_some_and(|rest| rest.starts_with(SEPARATOR))
        {
            end += SEPARATOR.len_utf8();
        }
        if !buf.remove_range(found.start..end) {
            break;
        }
        removed += 1;
    }
    strip_trailing_separator(buf);
    removed
}

/// Byte range of the first case-insensitive occurrence of `needle`.
pub fn find_ignore_case(haystack: &str, needle: &str) -> Option<Range<usize>> {
    if needle.is_empty() {
        return Some(0..0);
    }
    haystack.char_indices().find_map(|(start, _)| {
        let mut rest = haystack[start..].char_indices();
        let mut end = start;
        for wanted in needle.chars() {
            let (offset, found) = rest.next()?;
            if fold(found) != fold(wanted) {
                return None;
            }
            end = start + offset + found.len_utf8();
        }
        Some(start..end)
    })
}

/// Ordinal case-insensitive equality.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars().map(fold).eq(b.chars().map(fold))
}

fn fold(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(single), None) => single,
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(text: &str) -> GrowBuffer {
        let mut buf = GrowBuffer::new();
        buf.set(text).unwrap();
        buf
    }

    #[test]
    fn test_ensure_trailing_separator_appends() {
        let mut buf = buffer("C:\\a;C:\\b");
        ensure_trailing_separator(&mut buf).unwrap();
        assert_eq!(buf.as_str(), "C:\\a;C:\\b;");
    }

    #[test]
    fn test_ensure_trailing_separator_either_end() {
        let mut empty = buffer("");
        ensure_trailing_separator(&mut empty).unwrap();
        assert_eq!(empty.as_str(), "");

        let mut leading = buffer(";C:\\a");
        ensure_trailing_separator(&mut leading).unwrap();
        assert_eq!(leading.as_str(), ";C:\\a");

        let mut trailing = buffer("C:\\a;");
        ensure_trailing_separator(&mut trailing).unwrap();
        assert_eq!(trailing.as_str(), "C:\\a;");
    }

    #[test]
    fn test_strip_trailing_separator_once() {
        let mut buf = buffer("a;;");
        strip_trailing_separator(&mut buf);
        assert_eq!(buf.as_str(), "a;");
        let mut empty = buffer("");
        strip_trailing_separator(&mut empty);
        assert_eq!(empty.as_str(), "");
    }

    #[test]
    fn test_compact_separators() {
        let mut buf = buffer(";;a;;b;");
        assert!(compact_separators(&mut buf).unwrap());
        assert_eq!(buf.as_str(), "a;b");
        assert!(!compact_separators(&mut buf).unwrap());
    }

    #[test]
    fn test_contains_token_ignores_case() {
        assert!(contains_token("C:\\Tools;C:\\bin;", "c:\\TOOLS;"));
        assert!(!contains_token("C:\\Tools;C:\\bin;", "C:\\usr;"));
    }

    #[test]
    fn test_contains_token_matches_suffix_of_longer_token() {
        // Substring containment, not token equality.
        assert!(contains_token("C:\\xa;", "a;"));
        assert!(!contains_token("C:\\abc;", "C:\\a;"));
    }

    #[test]
    fn test_append_token() {
        let mut buf = buffer("C:\\a;");
        append_token(&mut buf, "C:\\b;").unwrap();
        assert_eq!(buf.as_str(), "C:\\a;C:\\b");

        let mut empty = buffer("");
        append_token(&mut empty, "C:\\tools;").unwrap();
        assert_eq!(empty.as_str(), "C:\\tools");

        let mut unterminated = buffer("C:\\a");
        append_token(&mut unterminated, "C:\\b").unwrap();
        assert_eq!(unterminated.as_str(), "C:\\a;C:\\b");
    }

    #[test]
    fn test_remove_token_every_occurrence() {
        let mut buf = buffer("C:\\a;C:\\b;C:\\a;");
        assert_eq!(remove_token(&mut buf, "C:\\a;"), 2);
        assert_eq!(buf.as_str(), "C:\\b");
    }

    #[test]
    fn test_remove_token_collapses_doubled_separator() {
        let mut buf = buffer("x;;C:\\a;;y;");
        remove_token(&mut buf, "c:\\A;");
        assert_eq!(buf.as_str(), "x;;y");
    }

    #[test]
    fn test_remove_token_empty_needle() {
        let mut buf = buffer("a;b;");
        assert_eq!(remove_token(&mut buf, ""), 0);
        assert_eq!(buf.as_str(), "a;b;");
    }

    #[test]
    fn test_find_ignore_case_non_ascii() {
        assert_eq!(find_ignore_case("x;ÄBC;", "äbc;"), Some(2..7));
        assert_eq!(find_ignore_case("abc", ""), Some(0..0));
        assert_eq!(find_ignore_case("ab", "abc"), None);
    }

    #[test]
    fn test_eq_ignore_case() {
        assert!(eq_ignore_case("Path", "PATH"));
        assert!(!eq_ignore_case("Path", "Paths"));
    }
}
