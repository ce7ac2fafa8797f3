//! Syntax-highlight span extraction.
//!
//! Maps each lexical token to a highlight class and its byte span in
//! the pattern body. Deliberately thin, like `mermaid.rs`: no styling
//! decisions, just the token-to-class table a caller's renderer (CLI
//! ANSI, web editor, etc.) applies.

use crate::core::token::{Token, TokenKind, TokenStream};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightSpan {
    pub start: usize,
    pub end: usize,
    pub class: &'static str,
}

fn class_for(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Literal | TokenKind::EscapedLiteral | TokenKind::QuotedLiteral => "literal",
        TokenKind::CharType
        | TokenKind::Unicode
        | TokenKind::UnicodeProperty
        | TokenKind::PosixClass
        | TokenKind::Octal
        | TokenKind::LegacyOctal => "char-class",
        TokenKind::Dot => "dot",
        TokenKind::Anchor | TokenKind::Assertion | TokenKind::Keep => "anchor",
        TokenKind::Quantifier => "quantifier",
        TokenKind::Alternation | TokenKind::Negation => "operator",
        TokenKind::Range => "operator",
        TokenKind::Backref | TokenKind::GBackref => "backref",
        TokenKind::GroupOpen
        | TokenKind::GroupClose
        | TokenKind::GroupModifierOpen
        | TokenKind::CharClassOpen
        | TokenKind::CharClassClose => "bracket",
        TokenKind::CommentOpen | TokenKind::CommentClose | TokenKind::CommentContent => "comment",
        TokenKind::QuoteModeStart | TokenKind::QuoteModeEnd => "quote-marker",
        TokenKind::PcreVerb => "verb",
        TokenKind::Callout => "callout",
        TokenKind::Eof => "eof",
    }
}

fn span_for(token: &Token) -> HighlightSpan {
    HighlightSpan {
        start: token.offset,
        end: token.offset + token.value.len(),
        class: class_for(token.kind),
    }
}

/// Build one [`HighlightSpan`] per non-EOF token in `tokens`.
pub fn highlight_spans(tokens: &TokenStream) -> Vec<HighlightSpan> {
    tokens
        .as_slice()
        .iter()
        .filter(|t| t.kind != TokenKind::Eof)
        .map(span_for)
        .collect()
}
