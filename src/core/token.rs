//! PCRE token model.
//!
//! The lexer turns the pattern body into a flat stream of `Token`s before
//! the parser ever sees it. Keeping the token set closed (one `TokenKind`
//! per lexical production) lets the parser stay a plain
//! one-token-lookahead recursive descent over `&[Token]` instead of
//! re-deriving lexical structure while parsing.

use serde::{Deserialize, Serialize};

/// Closed set of token kinds the lexer can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Literal,
    EscapedLiteral,
    CharType,
    Dot,
    Anchor,
    Assertion,
    Keep,
    Quantifier,
    Alternation,
    Range,
    Negation,
    Backref,
    GBackref,
    Unicode,
    UnicodeProperty,
    PosixClass,
    Octal,
    LegacyOctal,
    GroupOpen,
    GroupClose,
    GroupModifierOpen,
    CharClassOpen,
    CharClassClose,
    CommentOpen,
    CommentClose,
    CommentContent,
    QuoteModeStart,
    QuoteModeEnd,
    QuotedLiteral,
    PcreVerb,
    Callout,
    Eof,
}

/// A single lexeme: its kind, the extracted payload (raw lexeme or the
/// semantically-stripped value, e.g. a POSIX class name without its
/// `[: … :]` wrapper), and the byte offset it started at in the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, offset: usize) -> Self {
        Token {
            kind,
            value: value.into(),
            offset,
        }
    }
}

/// An owned, linearly-consumed stream of tokens produced by the lexer.
///
/// The parser holds one `TokenStream` per `parse()` call; it is never
/// shared or rewound past its cursor.
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        TokenStream { tokens, pos: 0 }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    /// Look at the token `n` positions ahead of the cursor without consuming it.
    pub fn peek(&self, n: usize) -> &Token {
        self.tokens
            .get(self.pos + n)
            .unwrap_or_else(|| self.tokens.last().expect("token stream always ends in EOF"))
    }

    pub fn current(&self) -> &Token {
        self.peek(0)
    }

    pub fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.current().kind, TokenKind::Eof)
    }

    pub fn position(&self) -> usize {
        self.pos
    }
}
