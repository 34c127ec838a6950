//! Charset handling for source text.
//!
//! Source files were produced by different tools over several years: some
//! are UTF-8, some Latin-1, and some are UTF-8 that was decoded as Latin-1
//! somewhere upstream (`"CAÃ‘ADA"` instead of `"CAÑADA"`). This module
//! decodes bytes, repairs the mojibake, and folds text for comparisons.

use std::borrow::Cow;

use encoding_rs::{UTF_8, WINDOWS_1252};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Mis-decoded sequences and their repaired characters.
///
/// Each uppercase letter appears twice: once as windows-1252 decodes the
/// continuation byte and once as the raw C1 control code ISO-8859-1 yields.
const MOJIBAKE: &[(&str, &str)] = &[
    ("Ã¡", "á"),
    ("Ã©", "é"),
    ("Ã\u{AD}", "í"),
    ("Ã³", "ó"),
    ("Ãº", "ú"),
    ("Ã±", "ñ"),
    ("Ã¼", "ü"),
    ("Ã\u{81}", "Á"),
    ("Ã\u{2030}", "É"),
    ("Ã\u{89}", "É"),
    ("Ã\u{8D}", "Í"),
    ("Ã\u{201C}", "Ó"),
    ("Ã\u{93}", "Ó"),
    ("Ã\u{161}", "Ú"),
    ("Ã\u{9A}", "Ú"),
    ("Ã\u{2018}", "Ñ"),
    ("Ã\u{91}", "Ñ"),
    ("Ã\u{153}", "Ü"),
    ("Ã\u{9C}", "Ü"),
    ("Â°", "°"),
    ("Â¿", "¿"),
    ("Â¡", "¡"),
];

/// Replaces known mis-decoded UTF-8 sequences with the intended
/// characters. Text without mojibake is returned unchanged.
#[must_use]
pub fn fix_encoding(text: &str) -> String {
    if !text.contains(['Ã', 'Â']) {
        return text.to_string();
    }
    MOJIBAKE
        .iter()
        .fold(text.to_string(), |acc, (bad, good)| acc.replace(bad, good))
}

/// Folds `text` into an uppercase ASCII key for accent-insensitive
/// equality (`"Cañada Morelos"` and `"CAÃ‘ADA MORELOS"` compare equal).
///
/// Repairs mojibake, upper-cases, applies canonical decomposition and
/// drops combining marks, then drops whatever is still not ASCII.
/// Whitespace is kept as-is. Only for matching; never display the result.
#[must_use]
pub fn normalize_for_comparison(text: &str) -> String {
    fix_encoding(text)
        .to_uppercase()
        .nfd()
        .filter(|&c| !is_combining_mark(c) && c.is_ascii())
        .collect()
}

/// Decodes a text file, preferring UTF-8.
///
/// Falls back to Latin-1 (windows-1252) when the bytes are not valid UTF-8
/// or the decoded text carries replacement characters.
#[must_use]
pub fn decode_text(bytes: &[u8]) -> String {
    let (text, had_errors) = UTF_8.decode_with_bom_removal(bytes);
    if !had_errors && !text.contains('\u{FFFD}') {
        return text.into_owned();
    }
    log::debug!("UTF-8 decode produced replacement characters, retrying as Latin-1");
    decode_latin1(bytes).into_owned()
}

/// Decodes single-byte Latin-1 (windows-1252) text.
#[must_use]
pub fn decode_latin1(bytes: &[u8]) -> Cow<'_, str> {
    WINDOWS_1252.decode_without_bom_handling(bytes).0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repairs_lowercase_and_symbol_mojibake() {
        assert_eq!(fix_encoding("PeÃ±a"), "Peña");
        assert_eq!(fix_encoding("ubicaciÃ³n Â¿dÃ³nde?"), "ubicación ¿dónde?");
        assert_eq!(fix_encoding("19Â°"), "19°");
    }

    #[test]
    fn repairs_mojibake_produced_by_latin1_decoding() {
        let original = "CAÑADA MORELOS, GENERAL FELIPE ÁNGELES, TECAMACHALCO ÚNICO";
        let mangled = decode_latin1(original.as_bytes());
        assert_ne!(mangled, original);
        assert_eq!(fix_encoding(&mangled), original);
    }

    #[test]
    fn leaves_clean_text_alone() {
        assert_eq!(fix_encoding("Puebla"), "Puebla");
        assert_eq!(fix_encoding("Tecamachalco, Pue."), "Tecamachalco, Pue.");
    }

    #[test]
    fn normalizes_for_accent_insensitive_matching() {
        assert_eq!(normalize_for_comparison("Cañada Morelos"), "CANADA MORELOS");
        assert_eq!(normalize_for_comparison("CAÃ‘ADA MORELOS"), "CANADA MORELOS");
        assert_eq!(
            normalize_for_comparison("general felipe ángeles"),
            "GENERAL FELIPE ANGELES"
        );
        assert_eq!(normalize_for_comparison("Los Reyes de Juárez"), "LOS REYES DE JUAREZ");
    }

    #[test]
    fn folds_letters_outside_latin1() {
        assert_eq!(normalize_for_comparison("Ž"), "Z");
        assert_eq!(normalize_for_comparison("Łódź"), "ODZ");
        assert_eq!(normalize_for_comparison("Ăn Ǹ"), "AN N");
    }

    #[test]
    fn keeps_surrounding_whitespace() {
        assert_eq!(normalize_for_comparison(" Amozoc "), " AMOZOC ");
        assert_ne!(
            normalize_for_comparison(" Amozoc "),
            normalize_for_comparison("Amozoc")
        );
    }

    #[test]
    fn strips_remaining_non_ascii() {
        assert_eq!(normalize_for_comparison("A→B"), "AB");
    }

    #[test]
    fn decodes_utf8_and_falls_back_to_latin1() {
        assert_eq!(decode_text("Año,Municipio".as_bytes()), "Año,Municipio");
        assert_eq!(decode_text(b"A\xF1o,Municipio"), "Año,Municipio");
        assert_eq!(decode_text(b"\xEF\xBB\xBFCVEGEO"), "CVEGEO");
    }
}
