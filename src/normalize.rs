//! Canonical storage keys for free-form device and action names.
//!
//! `normalize` turns whatever the user typed ("Fernbedienung Küche", "Living Room A/V")
//! into the key stored in the `device`/`action` columns. Lookups normalize the same
//! way, so the table must never change without a data migration.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::error::{Error, Result};

/// Returned when nothing usable survives normalization.
pub const FALLBACK_KEY: &str = "unknown";

/// Letters that carry meaning as a digraph and would lose it under plain decomposition.
const REPLACEMENTS: &[(char, &str)] = &[
    ('ä', "ae"),
    ('ö', "oe"),
    ('ü', "ue"),
    ('ß', "ss"),
    ('á', "a"),
    ('à', "a"),
    ('â', "a"),
    ('ã', "a"),
    ('å', "a"),
    ('é', "e"),
    ('è', "e"),
    ('ê', "e"),
    ('ë', "e"),
    ('í', "i"),
    ('ì', "i"),
    ('î', "i"),
    ('ï', "i"),
    ('ó', "o"),
    ('ò', "o"),
    ('ô', "o"),
    ('õ', "o"),
    ('ú', "u"),
    ('ù', "u"),
    ('û', "u"),
    ('ñ', "n"),
    ('ç', "c"),
];

fn replacement_for(c: char) -> Option<&'static str> {
    REPLACEMENTS
        .iter()
        .find(|(from, _)| *from == c)
        .map(|(_, to)| *to)
}

/// Characters that split words. Besides Unicode whitespace this covers the
/// information separators U+001C..U+001F, which Unicode classes as paragraph and
/// segment separators.
fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '\u{1c}'..='\u{1f}' | '-' | '/')
}

/// Canonicalizes a raw device or action name.
///
/// Empty input stays empty (read paths treat it as "no filter"). Any other input yields
/// a non-empty run of `[a-z0-9_]` without leading, trailing or doubled underscores, or
/// [`FALLBACK_KEY`] when nothing is left.
pub fn normalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let lowered = raw.to_lowercase();

    let mut substituted = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        match replacement_for(c) {
            Some(replacement) => substituted.push_str(replacement),
            None => substituted.push(c),
        }
    }

    let mut key = String::with_capacity(substituted.len());
    let mut in_separator_run = false;
    for c in substituted.nfd().filter(|c| !is_combining_mark(*c)) {
        if is_separator(c) {
            if !in_separator_run {
                key.push('_');
                in_separator_run = true;
            }
            continue;
        }
        in_separator_run = false;
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
            key.push(c);
        }
    }

    let mut collapsed = String::with_capacity(key.len());
    for c in key.chars() {
        if c == '_' && collapsed.ends_with('_') {
            continue;
        }
        collapsed.push(c);
    }

    let trimmed = collapsed.trim_matches('_');
    if trimmed.is_empty() {
        FALLBACK_KEY.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Trims a caller-supplied name and rejects it when nothing is left.
///
/// `field` is the capitalized field name used in the error ("Device", "Action").
pub fn required_name<'a>(raw: &'a str, field: &str) -> Result<&'a str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(format!("{field} is required")));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_stays_empty() {
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_symbols_only_falls_back() {
        assert_eq!(normalize("!!!"), "unknown");
        assert_eq!(normalize("  --  "), "unknown");
    }

    #[test]
    fn test_documented_examples() {
        assert_eq!(normalize("Living Room A/V"), "living_room_a_v");
        assert_eq!(normalize("Küche"), "kueche");
        assert_eq!(normalize("My TV Remote"), "my_tv_remote");
        assert_eq!(normalize("Fernbedienung Küche"), "fernbedienung_kueche");
    }

    #[test]
    fn test_digraphs_and_decomposition() {
        assert_eq!(normalize("Straße"), "strasse");
        assert_eq!(normalize("Öl-Heizung"), "oel_heizung");
        // 'ź' decomposes to its base letter; 'ł' has no decomposition and is dropped.
        assert_eq!(normalize("Łódź"), "odz");
        assert_eq!(normalize("Crème brûlée"), "creme_brulee");
        assert_eq!(normalize("Ångström"), "angstroem");
    }

    #[test]
    fn test_separator_runs() {
        assert_eq!(normalize("  tv -- power  "), "tv_power");
        assert_eq!(normalize("a__b"), "a_b");
        assert_eq!(normalize("_volume_up_"), "volume_up");
        assert_eq!(normalize("ch\t+\n1"), "ch_1");
        assert_eq!(normalize("Input 1/2"), "input_1_2");
        assert_eq!(normalize("A / V"), "a_v");
        assert_eq!(normalize("a\u{1c}b"), "a_b");
        assert_eq!(normalize("a\u{1f}\u{a0}b"), "a_b");
    }

    #[test]
    fn test_required_name() {
        assert_eq!(required_name("  TV ", "Device").unwrap(), "TV");
        let err = required_name(" \t", "Action").unwrap_err();
        assert_eq!(err.to_string(), "Action is required");
    }

    proptest! {
        #[test]
        fn prop_idempotent(raw in any::<String>()) {
            let once = normalize(&raw);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn prop_output_charset(raw in ".+") {
            let key = normalize(&raw);
            prop_assert!(!key.is_empty());
            prop_assert!(key.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
            prop_assert!(!key.starts_with('_') && !key.ends_with('_'));
            prop_assert!(!key.contains("__"));
        }
    }
}
