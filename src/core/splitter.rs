//! Pattern splitter.
//!
//! Extracts the delimiter, body, and modifier flags from the raw
//! `D<body>D[flags]` input before the lexer ever sees it. A
//! text-stripping pass that runs ahead of the cursor-based parse.

use crate::core::ast::Flags;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SplitError {
    #[error("Regex is too short")]
    TooShort,

    #[error("No closing delimiter '{0}' found")]
    NoClosingDelimiter(char),

    #[error("Unknown regex flag(s) found: \"{0}\"")]
    UnknownFlags(String),

    #[error("Regex pattern exceeds maximum length")]
    TooLong,
}

/// Paired delimiter characters recognized in addition to the symmetric
/// case (any non-alphanumeric, non-whitespace ASCII byte used on both
/// ends).
pub(crate) fn closing_for(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        '{' => '}',
        '<' => '>',
        other => other,
    }
}

fn is_valid_delimiter(c: char) -> bool {
    c.is_ascii() && !c.is_ascii_alphanumeric() && !c.is_whitespace()
}

/// Result of splitting a raw pattern string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPattern {
    pub delimiter: char,
    pub closing_delimiter: char,
    pub body: String,
    pub flags_text: String,
    pub flags: Flags,
}

/// Split `input` into delimiter, body, and flags, validating the flag
/// set and the body length against `max_pattern_length`.
pub fn split(input: &str, max_pattern_length: usize) -> Result<SplitPattern, SplitError> {
    let chars: Vec<char> = input.chars().collect();
    if chars.len() < 2 {
        return Err(SplitError::TooShort);
    }

    let delimiter = chars[0];
    let closing = closing_for(delimiter);

    // Scan right-to-left for the closing delimiter, skipping one that is
    // preceded by an odd run of backslashes (i.e. it is itself escaped).
    let mut close_idx = None;
    let mut i = chars.len();
    while i > 1 {
        i -= 1;
        if chars[i] == closing {
            let mut backslashes = 0;
            let mut j = i;
            while j > 0 && chars[j - 1] == '\\' {
                backslashes += 1;
                j -= 1;
            }
            if backslashes % 2 == 0 {
                close_idx = Some(i);
                break;
            }
        }
    }

    let close_idx = close_idx.ok_or(SplitError::NoClosingDelimiter(closing))?;
    let body: String = chars[1..close_idx].iter().collect();
    let flags_text: String = chars[close_idx + 1..].iter().collect();

    if !is_valid_delimiter(delimiter) {
        // The splitter still honors whatever delimiter character is
        // present; non-ASCII or alphanumeric "delimiters" are simply
        // unlikely to find a matching close and surface as
        // NoClosingDelimiter above. Kept for documentation.
    }

    const VALID_FLAGS: &str = "imsxuUJnA";
    let bad: String = flags_text
        .chars()
        .filter(|c| !VALID_FLAGS.contains(*c))
        .collect();
    if !bad.is_empty() {
        return Err(SplitError::UnknownFlags(bad));
    }
    let flags = Flags::from_letters(&flags_text).expect("flag set already validated above");

    if body.chars().count() > max_pattern_length {
        return Err(SplitError::TooLong);
    }

    Ok(SplitPattern {
        delimiter,
        closing_delimiter: closing,
        body,
        flags_text,
        flags,
    })
}
