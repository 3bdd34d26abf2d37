//! Text normalization for scraped field values
//!
//! The portal intermittently serves Latin-1 bytes mislabeled as UTF-8, which
//! shows up as `Ã`/`Â` artifact sequences ("JoÃ£o" for "João"). Every scraped
//! value passes through [`normalize`], which collapses whitespace, repairs
//! that mis-decoding when its signature is present, and applies Unicode NFC.

use encoding_rs::UTF_8;
use unicode_normalization::UnicodeNormalization;

/// Normalizes a scraped text value.
///
/// Collapses runs of whitespace to single spaces, trims, repairs the
/// Latin-1-as-UTF-8 artifact when detected, and canonicalizes to NFC.
pub fn normalize(raw: &str) -> String {
    let collapsed = collapse_whitespace(raw);
    let repaired = fix_mojibake(&collapsed);
    repaired.nfc().collect()
}

/// Collapses whitespace runs (including newlines and tabs) to single spaces
/// and trims the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Repairs Latin-1 bytes that were decoded as UTF-8 twice.
///
/// Detection keys on the `Ã`/`Â` signature characters. When present, the
/// string's code points are re-read as Latin-1 bytes and decoded as UTF-8;
/// the original string is kept if the re-decode does not yield clean UTF-8
/// (a legitimate `Ã` in the text, for example).
pub fn fix_mojibake(s: &str) -> String {
    if !s.contains('\u{00C3}') && !s.contains('\u{00C2}') {
        return s.to_string();
    }

    // Only strings made entirely of U+0000..=U+00FF can round-trip as bytes.
    let mut bytes = Vec::with_capacity(s.len());
    for c in s.chars() {
        let cp = c as u32;
        if cp > 0xFF {
            return s.to_string();
        }
        bytes.push(cp as u8);
    }

    let (decoded, _, had_errors) = UTF_8.decode(&bytes);
    if had_errors {
        s.to_string()
    } else {
        decoded.into_owned()
    }
}
