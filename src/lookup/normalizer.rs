//! Canonical matching keys for property names and user queries.
//!
//! Users type vehicle brands in whichever keyboard layout is active, so the
//! Cyrillic letters that look exactly like Latin ones are folded onto the
//! Latin letter before matching. Nothing else is transliterated.

/// Cyrillic look-alikes and the Latin letter they fold onto (lowercase only,
/// the input is lowercased first).
const CONFUSABLES: [(char, char); 12] = [
    ('а', 'a'),
    ('в', 'b'),
    ('е', 'e'),
    ('к', 'k'),
    ('м', 'm'),
    ('н', 'h'),
    ('о', 'o'),
    ('р', 'p'),
    ('с', 'c'),
    ('т', 't'),
    ('у', 'y'),
    ('х', 'x'),
];

#[inline]
fn fold_confusable(c: char) -> char {
    CONFUSABLES
        .iter()
        .find(|(cyrillic, _)| *cyrillic == c)
        .map(|(_, latin)| *latin)
        .unwrap_or(c)
}

#[inline]
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

pub fn normalize(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.trim().to_lowercase().chars().map(fold_confusable) {
        if is_word_char(c) {
            if pending_space && !normalized.is_empty() {
                normalized.push(' ');
            }
            pending_space = false;
            normalized.push(c);
        } else {
            pending_space = true;
        }
    }

    normalized
}
