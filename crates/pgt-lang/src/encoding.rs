//! Text encodings named by `%=` declarations and loader options.

use std::borrow::Cow;

use encoding_rs::Encoding;

use crate::error::{Error, Result};

/// Default encoding for files and byte input.
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Find the encoding for a label.
///
/// Accepts the WHATWG labels understood by `encoding_rs` plus a few spellings
/// common in hand-written files (`latin-1`, `utf_8`).
pub fn lookup(label: &str) -> Option<&'static Encoding> {
    let label = label.trim().to_ascii_lowercase();
    let label = match label.as_str() {
        "latin-1" | "latin_1" | "iso8859_1" => "latin1",
        "utf_8" => "utf-8",
        "utf_16" | "utf-16" => "utf-16le",
        "utf_16_le" => "utf-16le",
        "utf_16_be" => "utf-16be",
        other => other,
    };
    Encoding::for_label(label.as_bytes())
}

/// Whether two labels name the same encoding.
///
/// Labels `encoding_rs` does not know are compared as text, ignoring case.
pub fn same_encoding(a: &str, b: &str) -> bool {
    match (lookup(a), lookup(b)) {
        (Some(a), Some(b)) => a == b,
        _ => a.trim().eq_ignore_ascii_case(b.trim()),
    }
}

/// Decode `bytes` with the encoding named by `label`.
///
/// Malformed input is an error rather than being replaced.
pub fn decode<'b>(bytes: &'b [u8], label: &str, source_name: &str) -> Result<Cow<'b, str>> {
    let encoding = lookup(label).ok_or_else(|| Error::UnknownEncoding(label.to_owned()))?;
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .ok_or_else(|| Error::Decode {
            encoding: encoding.name().to_owned(),
            source_name: source_name.to_owned(),
        })
}

/// Decode `bytes` with replacement characters, falling back to UTF-8 for
/// unknown labels. Only used to look for a `%=` declaration.
pub(crate) fn decode_lossy<'b>(bytes: &'b [u8], label: &str) -> Cow<'b, str> {
    lookup(label)
        .unwrap_or(encoding_rs::UTF_8)
        .decode_without_bom_handling(bytes)
        .0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_case_insensitive() {
        assert!(same_encoding("UTF-8", "utf8"));
        assert!(same_encoding("Latin-1", "iso-8859-1"));
        assert!(!same_encoding("utf-8", "latin1"));
        assert!(same_encoding("Klingon", "klingon"));
    }

    #[test]
    fn decodes_single_byte_text() {
        let text = decode(&[b'c', b'a', b'f', 0xe9], "latin-1", "<string>").unwrap();
        assert_eq!(text, "café");
    }

    #[test]
    fn malformed_utf8_is_an_error() {
        let err = decode(&[0xff, 0xfe, b'a'], "utf-8", "menu.lang").unwrap_err();
        assert!(matches!(err, Error::Decode { ref source_name, .. } if source_name == "menu.lang"));
    }

    #[test]
    fn unknown_label_is_an_error() {
        let err = decode(b"x", "klingon", "<string>").unwrap_err();
        assert!(matches!(err, Error::UnknownEncoding(ref l) if l == "klingon"));
    }
}
