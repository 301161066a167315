//! Vocabulary translation tables
//!
//! Spanish words captured by the patterns get translated into the tokens
//! the engines understand: color names, directions, key names. Unknown
//! words pass through unchanged so a command never fails on vocabulary.

/// Translate a Spanish color name to its engine color token.
pub fn translate_color(name: &str) -> &str {
    match name {
        "rojo" => "red",
        "azul" => "blue",
        "verde" => "green",
        "amarillo" => "yellow",
        "negro" => "black",
        "blanco" => "white",
        "gris" => "gray",
        "rosa" => "pink",
        "morado" => "purple",
        "naranja" => "orange",
        // "marrón" arrives without the accent after normalization
        "marron" => "brown",
        "violeta" => "violet",
        other => other,
    }
}

/// Translate a Spanish direction (including compass words) to up/down/left/right.
pub fn translate_direction(name: &str) -> &str {
    match name {
        "arriba" | "norte" => "up",
        "abajo" | "sur" => "down",
        "izquierda" | "oeste" => "left",
        "derecha" | "este" => "right",
        other => other,
    }
}

/// Translate a Spanish key name to the engine key token.
pub fn translate_key(name: &str) -> &str {
    match name {
        "espacio" => "space",
        "enter" => "enter",
        "escape" => "escape",
        "flecha_arriba" => "up",
        "flecha_abajo" => "down",
        "flecha_izquierda" => "left",
        "flecha_derecha" => "right",
        "shift" => "shift",
        "ctrl" => "ctrl",
        "alt" => "alt",
        other => other,
    }
}
