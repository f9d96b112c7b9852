use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fold text for accent-, case- and punctuation-insensitive comparison.
///
/// The text is lower-cased, decomposed (NFD), stripped of combining marks,
/// and reduced to ASCII letters, digits and whitespace. Leading and
/// trailing whitespace is trimmed.
///
/// ```
/// use drnoflu::search::normalize::normalize_for_search;
///
/// assert_eq!(normalize_for_search("  Décret n°12 ! "), "decret n12");
/// ```
pub fn normalize_for_search(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();

    folded.trim().to_string()
}

/// Split a query into normalized, non-empty tokens.
pub fn query_tokens(query: &str) -> Vec<String> {
    normalize_for_search(query)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_accents_and_case() {
        assert_eq!(normalize_for_search("Décret"), "decret");
        assert_eq!(normalize_for_search("ÉLÈVE Çà"), "eleve ca");
        assert_eq!(normalize_for_search("Arrêté provincial"), "arrete provincial");
    }

    #[test]
    fn test_removes_punctuation() {
        assert_eq!(normalize_for_search("Impôt (IPR) - 2024!"), "impot ipr  2024");
        assert_eq!(normalize_for_search("n°12"), "n12");
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(normalize_for_search("   taxe   "), "taxe");
        assert_eq!(normalize_for_search(""), "");
        assert_eq!(normalize_for_search("?!"), "");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "Décret n°12",
            "  Plan Cadastral  ",
            "ÀÉÎÕÜ œuvre ß",
            "tab\tand\nnewline",
            "日本語 text",
            "",
        ];
        for s in samples {
            let once = normalize_for_search(s);
            assert_eq!(normalize_for_search(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn test_output_alphabet() {
        let samples = ["Décret n°12 — «Taxe» & Co.", "ÀÉÎÕÜ œuvre ß 42", "日本語"];
        for s in samples {
            let out = normalize_for_search(s);
            assert!(
                out.chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace()),
                "unexpected character in {out:?}"
            );
        }
    }

    #[test]
    fn test_query_tokens_discards_empty() {
        assert_eq!(query_tokens("  cadastral   plan "), vec!["cadastral", "plan"]);
        assert!(query_tokens("   ").is_empty());
        assert!(query_tokens("!!").is_empty());
    }
}
