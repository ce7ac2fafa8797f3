//! Error types and instructional diagnostics.
//!
//! Three first-offense error families: lexical, parser, and semantic.
//! Each carries the byte position at which the offense was found where
//! one is available; `PcreLabError` unions them (plus the splitter's)
//! for the `parse()` entry point. `validate_pattern()` catches parser
//! and semantic errors into a `ValidationOutcome` instead of
//! propagating them. Two presentation conveniences sit on top of the
//! union: `to_formatted_string()` (a caret under the offending byte
//! plus a hint) and `to_lsp_diagnostic()` (an LSP `Diagnostic`-shaped
//! JSON value), with hints supplied by the `get_hint` table below
//! rather than stored on the error itself.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::core::lexer::LexError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unexpected token at position {0}")]
    UnexpectedToken(usize),

    #[error("Quantifier without target")]
    QuantifierWithoutTarget(usize),

    #[error("Quantifier '{quantifier}' cannot be applied to assertion or verb '{atom}'")]
    QuantifierOnAssertionOrVerb {
        position: usize,
        quantifier: String,
        atom: String,
    },

    #[error("Expected ')' at end of input")]
    ExpectedCloseParen(usize),

    #[error("Expected closing quote")]
    ExpectedClosingQuote(usize),

    #[error("Expected group name")]
    ExpectedGroupName(usize),

    #[error("Expected subroutine name")]
    ExpectedSubroutineName(usize),

    #[error("Unknown regex flag(s) found: \"{flags}\"")]
    UnknownFlags { position: usize, flags: String },

    #[error("(?P=...) is not supported yet")]
    UnsupportedPSyntax(usize),

    #[error("Invalid conditional condition")]
    InvalidConditionalCondition(usize),

    #[error("Invalid group modifier syntax")]
    InvalidGroupModifierSyntax(usize),

    #[error("Regex pattern exceeds maximum length")]
    PatternTooLong(usize),

    #[error("Pattern exceeds the maximum number of AST nodes")]
    TooManyNodes(usize),

    #[error("Pattern recursion exceeds the maximum allowed depth")]
    RecursionTooDeep(usize),
}

impl ParseError {
    pub fn position(&self) -> usize {
        match self {
            ParseError::UnexpectedToken(p)
            | ParseError::QuantifierWithoutTarget(p)
            | ParseError::ExpectedCloseParen(p)
            | ParseError::ExpectedClosingQuote(p)
            | ParseError::ExpectedGroupName(p)
            | ParseError::ExpectedSubroutineName(p)
            | ParseError::UnsupportedPSyntax(p)
            | ParseError::InvalidConditionalCondition(p)
            | ParseError::InvalidGroupModifierSyntax(p)
            | ParseError::PatternTooLong(p)
            | ParseError::TooManyNodes(p)
            | ParseError::RecursionTooDeep(p) => *p,
            ParseError::QuantifierOnAssertionOrVerb { position, .. } => *position,
            ParseError::UnknownFlags { position, .. } => *position,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SemanticError {
    #[error("Backreference to non-existent group: \\{0}")]
    NonExistentBackrefIndex(i32),

    #[error("Backreference to non-existent group: {0}")]
    NonExistentBackrefName(String),

    #[error("Subroutine call to non-existent group: {0}")]
    NonExistentSubroutine(String),

    #[error("Duplicate group name '{0}'")]
    DuplicateGroupName(String),

    #[error("Invalid range \"{0}\"")]
    InvalidRange(String),

    #[error("Callout identifier {0} is out of range")]
    CalloutIdentifierOutOfRange(i64),

    #[error("Callout string identifier must not be empty")]
    EmptyCalloutString,

    #[error("Variable-length quantifiers ({0}) are not allowed in lookbehinds")]
    VariableLengthLookbehind(String),

    #[error("\\R is not allowed inside a character class")]
    CharTypeNotAllowedInClass,

    #[error("Unknown Unicode property name \"{0}\"")]
    UnknownUnicodeProperty(String),
}

/// Union of the splitter, lexer, parser, and semantic error families,
/// for the `parse()` entry point. Each stage raises at its first
/// offense; lexer errors always propagate rather than being caught the
/// way `validate_pattern` catches parser/semantic ones.
#[derive(Debug, Clone, Error)]
pub enum PcreLabError {
    #[error("{0}")]
    Split(#[from] crate::core::splitter::SplitError),

    #[error("{0}")]
    Lex(#[from] LexError),

    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("{0}")]
    Semantic(#[from] SemanticError),
}

impl PcreLabError {
    /// Byte position of the offense, where one is tracked.
    pub fn position(&self) -> Option<usize> {
        match self {
            PcreLabError::Split(_) => None,
            PcreLabError::Lex(LexError::UnableToTokenize(p)) => Some(*p),
            PcreLabError::Lex(_) => None,
            PcreLabError::Parse(e) => Some(e.position()),
            PcreLabError::Semantic(_) => None,
        }
    }

    /// A beginner-friendly hint for this error, if one is known.
    pub fn hint(&self) -> Option<&'static str> {
        get_hint(&self.to_string())
    }

    /// Render the error against the original pattern text with a caret
    /// under the offending position and, if one is known, a hint line.
    pub fn to_formatted_string(&self, text: &str) -> String {
        let message = self.to_string();
        let Some(pos) = self.position() else {
            return match self.hint() {
                Some(hint) => format!("{}\n\nHint: {}", message, hint),
                None => message,
            };
        };

        let col = text
            .char_indices()
            .take_while(|(byte_idx, _)| *byte_idx < pos)
            .count();

        let mut parts = vec![
            message,
            String::new(),
            format!("> {}", text),
            format!(">  {}^", " ".repeat(col)),
        ];
        if let Some(hint) = self.hint() {
            parts.push(String::new());
            parts.push(format!("Hint: {}", hint));
        }
        parts.join("\n")
    }

    /// Convert this error to an LSP `Diagnostic`-shaped JSON value.
    pub fn to_lsp_diagnostic(&self, text: &str) -> serde_json::Value {
        let message = self.to_string();
        let pos = self.position().unwrap_or(0);
        let col = text
            .char_indices()
            .take_while(|(byte_idx, _)| *byte_idx < pos)
            .count();

        let mut diagnostic_message = message.clone();
        if let Some(hint) = self.hint() {
            diagnostic_message.push_str(&format!("\n\nHint: {}", hint));
        }

        let mut code = message.to_lowercase();
        for ch in &[' ', '\'', '"', '(', ')', '[', ']', '{', '}', '\\', '/', ':'] {
            code = code.replace(*ch, "_");
        }
        let code: String = code
            .split('_')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("_");

        serde_json::json!({
            "range": {
                "start": {"line": 0, "character": col},
                "end": {"line": 0, "character": col + 1}
            },
            "severity": 1,
            "message": diagnostic_message,
            "source": "pcrelab",
            "code": code
        })
    }
}

/// Structured result of `validate_pattern`: parser and semantic errors
/// are caught and reported here rather than propagated, unlike
/// `parse()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub error: Option<String>,
    pub position: Option<usize>,
}

impl ValidationOutcome {
    pub fn ok() -> Self {
        ValidationOutcome {
            is_valid: true,
            error: None,
            position: None,
        }
    }

    pub fn failure(message: impl Into<String>, position: Option<usize>) -> Self {
        ValidationOutcome {
            is_valid: false,
            error: Some(message.into()),
            position,
        }
    }
}

/// Beginner-friendly hints keyed off a message substring, one entry per
/// error this crate's parser/validator can actually raise.
pub fn get_hint(error_message: &str) -> Option<&'static str> {
    let table: &[(&str, &str)] = &[
        (
            "Quantifier without target",
            "A quantifier (*, +, ?, {n,m}) must follow something it can repeat. \
             Check for a stray quantifier with nothing before it.",
        ),
        (
            "cannot be applied to assertion or verb",
            "Assertions (lookaheads, lookbehinds, \\b, \\B, ...) and control verbs \
             match zero-width positions and cannot be repeated with a quantifier.",
        ),
        (
            "Expected ')' at end of input",
            "This group was opened with '(' but never closed. \
             Add a matching ')' to close the group.",
        ),
        (
            "Unclosed character class",
            "This character class was opened with '[' but never closed. \
             Add a matching ']' to close the character class.",
        ),
        (
            "Unclosed comment",
            "This (?#...) comment was opened but never closed. \
             Add a matching ')' to close the comment.",
        ),
        (
            "Unknown regex flag(s)",
            "Valid flags are: i, m, s, x, u, U, J, n, A.",
        ),
        (
            "Backreference to non-existent group",
            "This backreference points at a capturing group that does not exist. \
             Check the group's number or name.",
        ),
        (
            "Subroutine call to non-existent group",
            "This subroutine call points at a capturing group that does not exist. \
             Check the group's number or name.",
        ),
        (
            "Duplicate group name",
            "Two capturing groups share this name. Either rename one of them or \
             set the 'J' flag to allow duplicate names.",
        ),
        (
            "Invalid range",
            "In a character class, a range like 'a-z' requires the start \
             codepoint to be less than or equal to the end codepoint.",
        ),
        (
            "Variable-length quantifiers",
            "Lookbehind assertions must match a fixed number of characters. \
             Replace the variable-length quantifier with an exact count, \
             or use a lookahead if the surrounding context allows it.",
        ),
        (
            "\\R is not allowed inside a character class",
            "\\R matches any Unicode line ending and has no meaning as a single \
             character inside a character class. Use \\r, \\n, or \\v individually.",
        ),
        (
            "Unknown Unicode property name",
            "Unicode property names are matched against the Unicode Character \
             Database property and script name tables. Check for a typo.",
        ),
    ];

    table
        .iter()
        .find(|(needle, _)| error_message.contains(needle))
        .map(|(_, hint)| *hint)
}
