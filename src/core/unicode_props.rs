//! Unicode property and script name table.
//!
//! `\p{Name}` / `\P{Name}` escapes name a general category, script, or
//! boolean property from the Unicode Character Database. Checking
//! membership against the full UCD is out of scope, so this module
//! keeps a small table of the names PCRE2 itself recognizes most
//! commonly, enough to catch obvious typos without pretending to be
//! exhaustive.
//!
//! The table is built once behind a `once_cell::sync::Lazy` and shared
//! across every `validate_pattern` call rather than rebuilt per call.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// General category short and long names (Unicode UCD `gc` property).
const GENERAL_CATEGORIES: &[&str] = &[
    "L", "Lu", "Ll", "Lt", "Lm", "Lo", "Letter",
    "M", "Mn", "Mc", "Me", "Mark",
    "N", "Nd", "Nl", "No", "Number",
    "P", "Pc", "Pd", "Ps", "Pe", "Pi", "Pf", "Po", "Punctuation",
    "S", "Sm", "Sc", "Sk", "So", "Symbol",
    "Z", "Zs", "Zl", "Zp", "Separator",
    "C", "Cc", "Cf", "Cs", "Co", "Cn", "Other",
];

/// Script names (Unicode UCD `sc` property), the common subset.
const SCRIPTS: &[&str] = &[
    "Latin", "Greek", "Cyrillic", "Armenian", "Hebrew", "Arabic",
    "Syriac", "Thaana", "Devanagari", "Bengali", "Gurmukhi", "Gujarati",
    "Oriya", "Tamil", "Telugu", "Kannada", "Malayalam", "Sinhala",
    "Thai", "Lao", "Tibetan", "Myanmar", "Georgian", "Hangul",
    "Ethiopic", "Cherokee", "Canadian_Aboriginal", "Ogham", "Runic",
    "Khmer", "Mongolian", "Hiragana", "Katakana", "Bopomofo", "Han",
    "Yi", "Common", "Inherited",
];

/// Boolean/binary properties commonly accepted by PCRE2's `\p{}`.
const BINARY_PROPERTIES: &[&str] = &[
    "Alpha", "Alphabetic", "Lower", "Lowercase", "Upper", "Uppercase",
    "White_Space", "Space", "Cased", "Any", "Assigned", "ASCII",
    "Emoji", "Emoji_Presentation", "Math", "Join_Control",
];

static VALID_NAMES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    GENERAL_CATEGORIES
        .iter()
        .chain(SCRIPTS.iter())
        .chain(BINARY_PROPERTIES.iter())
        .copied()
        .collect()
});

/// True if `name` is a recognized Unicode property, script, or general
/// category name, matched case-sensitively as PCRE2 requires.
pub fn is_known_property(name: &str) -> bool {
    VALID_NAMES.contains(name)
}
