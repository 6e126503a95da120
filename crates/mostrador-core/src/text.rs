//! Small text helpers shared by the catalog and the intent classifier.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

const COMBINING_TILDE: char = '\u{303}';

/// Lowercases `input` and removes diacritics so that `"Más Baratas"` and
/// `"mas baratas"` compare equal, whether the accents arrive precomposed or
/// as combining marks. `ñ` is kept.
pub fn fold(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.nfd().flat_map(char::to_lowercase) {
        if c == COMBINING_TILDE && out.ends_with('n') {
            out.pop();
            out.push('ñ');
        } else if !is_combining_mark(c) {
            out.push(c);
        }
    }
    out
}

/// Strips surrounding whitespace and stray quotes that the model tends to add
/// around argument values.
pub fn clean_argument(input: &str) -> &str {
    input.trim().trim_matches(|c| c == '"' || c == '\'').trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_removes_accents() {
        assert_eq!(fold("Más BARATAS"), "mas baratas");
        assert_eq!(fold("devolución"), "devolucion");
        // ñ is a letter of its own, not an accented n
        assert_eq!(fold("Año"), "año");
        assert_eq!(fold("AÑO"), "año");
    }

    #[test]
    fn test_fold_handles_combining_marks() {
        assert_eq!(fold("Do\u{301}nde"), "donde");
        assert_eq!(fold("devolucio\u{301}n"), "devolucion");
        assert_eq!(fold("An\u{303}o"), "año");
        assert_eq!(fold("São ção"), "sao cao");
    }

    #[test]
    fn test_clean_argument() {
        assert_eq!(clean_argument("  \"Vestido rojo\" "), "Vestido rojo");
        assert_eq!(clean_argument("'M'"), "M");
    }
}
