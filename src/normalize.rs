//! Input normalization for command matching
//!
//! Every command goes through [`normalize`] before it touches the pattern
//! catalog: lowercase, trimmed, single spaces, no diacritics. The catalog
//! patterns are written in this normalized form.

use std::collections::HashMap;

/// Map an accented vowel (or "ñ") to its base Latin letter.
fn fold_char(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        _ => c,
    }
}

/// Normalize raw input: lowercase, trim, collapse whitespace runs to a
/// single space, strip diacritics. Total and idempotent.
pub fn normalize(input: &str) -> String {
    input
        .to_lowercase()
        .split_whitespace()
        .map(|word| word.chars().map(fold_char).collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Apply alias rewrites (e.g. "meter" -> "crear") before normalization.
/// Aliases come from the config file and are matched case-insensitively.
pub fn apply_aliases(text: &str, aliases: &HashMap<String, String>) -> String {
    let mut result = text.to_lowercase();
    for (from, to) in aliases {
        result = result.replace(&from.to_lowercase(), to);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_trims() {
        assert_eq!(normalize("  Crear Jugador  "), "crear jugador");
    }

    #[test]
    fn collapses_internal_whitespace() {
        assert_eq!(normalize("mover\t jugador   a  300,400"), "mover jugador a 300,400");
    }

    #[test]
    fn strips_diacritics() {
        assert_eq!(normalize("Posición Cámara Fricción"), "posicion camara friccion");
        assert_eq!(normalize("añadir niño"), "anadir nino");
        assert_eq!(normalize("müsica àèìòù"), "musica aeiou");
    }

    #[test]
    fn is_idempotent() {
        for s in ["  CREAR  Jugador EN 100,200 ", "música fondo", "¿qué?", ""] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn aliases_rewrite_before_matching() {
        let mut aliases = HashMap::new();
        aliases.insert("meter".to_string(), "crear".to_string());
        assert_eq!(apply_aliases("Meter caja", &aliases), "crear caja");
    }
}
