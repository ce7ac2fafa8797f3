//! PCRE lexer.
//!
//! Advances a byte cursor over the pattern body, dispatching on the
//! current sub-mode (normal, character class, quote, comment) to one of
//! roughly thirty token-producing productions. Productions are tried in
//! priority order; the first match advances the cursor and yields a
//! `Token`. The lexer validates UTF-8 at construction and indexes bytes
//! thereafter, but treats a multi-byte codepoint as a single logical
//! character inside literal runs.

use crate::core::token::{Token, TokenKind, TokenStream};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    CharClass,
    Quote,
    Comment,
}

/// Lexical errors. Each carries the byte offset at which the lexer gave up.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum LexError {
    #[error("Input string is not valid UTF-8")]
    InvalidUtf8,

    #[error("Unclosed character class ']' at end of input")]
    UnclosedCharClass,

    #[error("Unclosed comment ')' at end of input")]
    UnclosedComment,

    #[error("Unable to tokenize at position {0}")]
    UnableToTokenize(usize),
}

/// Byte-indexed cursor over a PCRE pattern body.
///
/// A `Lexer` is owned exclusively by one `tokenize()` call; `reset()`
/// re-initializes the cursor, mode, and output buffer without
/// reallocating the input buffer.
pub struct Lexer {
    body: Vec<u8>,
    pos: usize,
    mode: Mode,
    tokens: Vec<Token>,
    /// PCRE `x` (extended/free-spacing) flag: unescaped whitespace and
    /// `#...`-to-end-of-line comments are skipped in normal mode before
    /// each production, never inside a character class.
    extended: bool,
}

/// Characters that terminate a plain literal run in normal mode.
const NORMAL_SPECIAL: &[u8] = b"\\.^$*+?(){[]|";

impl Lexer {
    /// Construct a lexer over `body`. `body` must already have had its
    /// delimiter and flags stripped by the pattern splitter.
    pub fn new(body: &str) -> Result<Self, LexError> {
        // `body: &str` is already guaranteed valid UTF-8 by the type
        // system; this check exists for callers that hand in raw bytes
        // via `from_bytes`.
        Ok(Lexer {
            body: body.as_bytes().to_vec(),
            pos: 0,
            mode: Mode::Normal,
            tokens: Vec::new(),
            extended: false,
        })
    }

    /// Enable or disable PCRE `x`-flag whitespace/comment skipping.
    pub fn with_extended(mut self, extended: bool) -> Self {
        self.extended = extended;
        self
    }

    /// Construct a lexer from raw bytes, validating UTF-8 explicitly.
    pub fn from_bytes(body: &[u8]) -> Result<Self, LexError> {
        let text = std::str::from_utf8(body).map_err(|_| LexError::InvalidUtf8)?;
        Self::new(text)
    }

    /// Re-initialize cursor, mode, and output buffer for a new input
    /// without reallocating the struct itself.
    pub fn reset(&mut self, body: &str) {
        self.body.clear();
        self.body.extend_from_slice(body.as_bytes());
        self.pos = 0;
        self.mode = Mode::Normal;
        self.tokens.clear();
    }

    fn eof(&self) -> bool {
        self.pos >= self.body.len()
    }

    fn byte_at(&self, offset: usize) -> Option<u8> {
        self.body.get(offset).copied()
    }

    fn peek(&self) -> Option<u8> {
        self.byte_at(self.pos)
    }

    fn peek_n(&self, n: usize) -> Option<u8> {
        self.byte_at(self.pos + n)
    }

    fn rest(&self) -> &str {
        std::str::from_utf8(&self.body[self.pos..]).unwrap_or("")
    }

    fn starts_with(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    /// Advance past one logical character (handling multi-byte UTF-8)
    /// and return its string form.
    fn take_char(&mut self) -> String {
        let rest = self.rest();
        let ch = rest.chars().next().expect("take_char called at eof");
        self.pos += ch.len_utf8();
        ch.to_string()
    }

    /// Tokenize the full body, always terminating with an `Eof` token.
    pub fn tokenize(mut self) -> Result<TokenStream, LexError> {
        loop {
            match self.mode {
                Mode::Normal => {
                    if self.extended {
                        self.skip_extended_trivia();
                    }
                    if self.eof() {
                        break;
                    }
                    self.lex_normal()?;
                }
                Mode::CharClass => {
                    if self.eof() {
                        return Err(LexError::UnclosedCharClass);
                    }
                    self.lex_char_class()?;
                }
                Mode::Quote => {
                    self.lex_quote();
                }
                Mode::Comment => {
                    if self.eof() {
                        return Err(LexError::UnclosedComment);
                    }
                    self.lex_comment()?;
                }
            }
        }
        let eof_pos = self.body.len();
        self.tokens.push(Token::new(TokenKind::Eof, "", eof_pos));
        Ok(TokenStream::new(self.tokens))
    }

    fn push(&mut self, kind: TokenKind, value: impl Into<String>, start: usize) {
        self.tokens.push(Token::new(kind, value, start));
    }

    /// Skip unescaped ASCII whitespace and `#...`-to-end-of-line comments,
    /// as PCRE's `x` flag requires outside character classes.
    fn skip_extended_trivia(&mut self) {
        loop {
            let mut moved = false;
            while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
                self.pos += 1;
                moved = true;
            }
            if self.peek() == Some(b'#') {
                while self.peek().is_some() && self.peek() != Some(b'\n') {
                    self.pos += 1;
                }
                moved = true;
            }
            if !moved {
                break;
            }
        }
    }

    // ---- Normal mode -----------------------------------------------

    fn lex_normal(&mut self) -> Result<(), LexError> {
        let start = self.pos;

        if self.starts_with("(?#") {
            self.pos += 3;
            self.push(TokenKind::CommentOpen, "(?#", start);
            self.mode = Mode::Comment;
            return Ok(());
        }
        if self.starts_with("\\Q") {
            self.pos += 2;
            self.push(TokenKind::QuoteModeStart, "\\Q", start);
            self.mode = Mode::Quote;
            return Ok(());
        }
        if self.peek() == Some(b'(') && self.peek_n(1) == Some(b'*') {
            return self.lex_pcre_verb(start);
        }
        if self.starts_with("(?C") {
            return self.lex_callout(start);
        }
        if self.starts_with("(?") {
            return self.lex_group_opener(start);
        }
        match self.peek() {
            Some(b'(') => {
                self.pos += 1;
                self.push(TokenKind::GroupOpen, "(", start);
                return Ok(());
            }
            Some(b')') => {
                self.pos += 1;
                self.push(TokenKind::GroupClose, ")", start);
                return Ok(());
            }
            Some(b'[') => {
                self.pos += 1;
                self.push(TokenKind::CharClassOpen, "[", start);
                self.mode = Mode::CharClass;
                return Ok(());
            }
            Some(b'|') => {
                self.pos += 1;
                self.push(TokenKind::Alternation, "|", start);
                return Ok(());
            }
            Some(b'.') => {
                self.pos += 1;
                self.push(TokenKind::Dot, ".", start);
                return Ok(());
            }
            Some(b'^') | Some(b'$') => {
                let ch = self.take_char();
                self.push(TokenKind::Anchor, ch, start);
                return Ok(());
            }
            Some(b'*') | Some(b'+') | Some(b'?') => {
                self.lex_simple_quantifier(start);
                return Ok(());
            }
            Some(b'{') => {
                if let Some(len) = self.match_brace_quantifier() {
                    let mut text = self.rest()[..len].to_string();
                    self.pos += len;
                    self.lex_quantifier_suffix(&mut text);
                    self.push(TokenKind::Quantifier, text, start);
                    return Ok(());
                }
                // Not a quantifier: literal '{'.
                let ch = self.take_char();
                self.push(TokenKind::Literal, ch, start);
                return Ok(());
            }
            Some(b'\\') => {
                return self.lex_escape();
            }
            Some(_) => {
                return self.lex_literal_run();
            }
            None => unreachable!("eof already checked"),
        }
    }

    fn lex_simple_quantifier(&mut self, start: usize) {
        let mut text = self.take_char();
        self.lex_quantifier_suffix(&mut text);
        self.push(TokenKind::Quantifier, text, start);
    }

    fn lex_quantifier_suffix(&mut self, text: &mut String) {
        match self.peek() {
            Some(b'?') => {
                text.push('?');
                self.pos += 1;
            }
            Some(b'+') => {
                text.push('+');
                self.pos += 1;
            }
            _ => {}
        }
    }

    /// Try to match `{n}`, `{n,}`, `{,m}`, `{n,m}` with ASCII whitespace
    /// tolerated around numbers and the comma. Returns the byte length
    /// of the match (including braces) if one is found.
    fn match_brace_quantifier(&self) -> Option<usize> {
        let rest = self.rest().as_bytes();
        if rest.first() != Some(&b'{') {
            return None;
        }
        let mut i = 1usize;
        let skip_ws = |bytes: &[u8], mut i: usize| {
            while bytes.get(i).is_some_and(|b| b.is_ascii_whitespace()) {
                i += 1;
            }
            i
        };
        i = skip_ws(rest, i);
        let n_start = i;
        while rest.get(i).is_some_and(|b| b.is_ascii_digit()) {
            i += 1;
        }
        let has_n = i > n_start;
        i = skip_ws(rest, i);
        let mut has_comma = false;
        if rest.get(i) == Some(&b',') {
            has_comma = true;
            i += 1;
            i = skip_ws(rest, i);
        }
        let m_start = i;
        while rest.get(i).is_some_and(|b| b.is_ascii_digit()) {
            i += 1;
        }
        let has_m = i > m_start;
        i = skip_ws(rest, i);
        if rest.get(i) != Some(&b'}') {
            return None;
        }
        i += 1;
        if !has_n && !has_comma {
            // "{}" matches nothing meaningful.
            return None;
        }
        if !has_comma && !has_n {
            return None;
        }
        let _ = has_m;
        Some(i)
    }

    fn lex_literal_run(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        let mut text = String::new();
        while !self.eof() {
            let b = self.peek().unwrap();
            if NORMAL_SPECIAL.contains(&b) {
                break;
            }
            text.push_str(&self.take_char());
        }
        debug_assert!(!text.is_empty());
        self.push(TokenKind::Literal, text, start);
        Ok(())
    }

    fn lex_pcre_verb(&mut self, start: usize) -> Result<(), LexError> {
        // `(*NAME[:arg])`
        let rest = self.rest();
        if let Some(end) = rest.find(')') {
            let text = rest[..=end].to_string();
            self.pos += end + 1;
            self.push(TokenKind::PcreVerb, text, start);
            Ok(())
        } else {
            Err(LexError::UnableToTokenize(start))
        }
    }

    fn lex_callout(&mut self, start: usize) -> Result<(), LexError> {
        let rest = self.rest();
        if let Some(end) = rest.find(')') {
            let text = rest[..=end].to_string();
            self.pos += end + 1;
            self.push(TokenKind::Callout, text, start);
            Ok(())
        } else {
            Err(LexError::UnableToTokenize(start))
        }
    }

    /// Recognizes the full shape of a `(?...)` group opener in one pass,
    /// rather than letting the generic normal-mode productions chew on
    /// whatever follows `(?` (most of those characters — `:`, `<`, `>`,
    /// `=`, `'`, letters, digits — are not in `NORMAL_SPECIAL` and would
    /// otherwise merge into one indistinguishable literal run together
    /// with the group's own body). Emits one `GroupModifierOpen` token
    /// whose value is exactly the marker text; forms with no body of
    /// their own (subroutine calls, positional inline-flags, `(?P=...)`)
    /// include their own trailing `)`, so the parser knows not to expect
    /// a separate `GroupClose` for them.
    fn lex_group_opener(&mut self, start: usize) -> Result<(), LexError> {
        let after = &self.rest()[2..];

        if after.starts_with('|') {
            return self.emit_group_marker(start, 3);
        }
        if after.starts_with(':') || after.starts_with('>') || after.starts_with('=') || after.starts_with('!')
        {
            return self.emit_group_marker(start, 3);
        }
        if after.starts_with("<=") || after.starts_with("<!") {
            return self.emit_group_marker(start, 4);
        }
        if let Some(name_part) = after.strip_prefix('<') {
            if let Some(end) = name_part.find('>') {
                return self.emit_group_marker(start, 2 + 1 + end + 1);
            }
            return Err(LexError::UnableToTokenize(start));
        }
        if let Some(name_part) = after.strip_prefix('\'') {
            if let Some(end) = name_part.find('\'') {
                return self.emit_group_marker(start, 2 + 1 + end + 1);
            }
            return Err(LexError::UnableToTokenize(start));
        }
        if let Some(name_part) = after.strip_prefix("P<") {
            if let Some(end) = name_part.find('>') {
                return self.emit_group_marker(start, 2 + 2 + end + 1);
            }
            return Err(LexError::UnableToTokenize(start));
        }
        if after.starts_with("P=") {
            if let Some(end) = after.find(')') {
                return self.emit_group_marker(start, 2 + end + 1);
            }
            return Err(LexError::UnableToTokenize(start));
        }
        if let Some(name_part) = after.strip_prefix("P>") {
            if let Some(end) = name_part.find(')') {
                return self.emit_group_marker(start, 2 + 2 + end + 1);
            }
            return Err(LexError::UnableToTokenize(start));
        }
        if let Some(name_part) = after.strip_prefix('&') {
            if let Some(end) = name_part.find(')') {
                return self.emit_group_marker(start, 2 + 1 + end + 1);
            }
            return Err(LexError::UnableToTokenize(start));
        }
        if after.starts_with("(?=") || after.starts_with("(?!") {
            // Conditional whose condition is a lookaround assertion, e.g.
            // `(?(?=foo)yes|no)`: the assertion's own opening paren is the
            // same paren that opens the conditional, so the marker folds
            // both prefixes together. What follows lexes as plain normal-
            // mode content up to the `)` that closes the condition.
            return self.emit_group_marker(start, 5);
        }
        if after.starts_with("(?<=") || after.starts_with("(?<!") {
            return self.emit_group_marker(start, 6);
        }
        if after.starts_with('(') {
            // Conditional opener; condition content follows and is
            // tokenized normally from here (the parser reconstructs it).
            return self.emit_group_marker(start, 3);
        }
        if after.starts_with('R') {
            if let Some(end) = after.find(')') {
                return self.emit_group_marker(start, 2 + end + 1);
            }
            return Err(LexError::UnableToTokenize(start));
        }
        if after.starts_with(|c: char| c.is_ascii_digit() || c == '+' || c == '-') {
            if let Some(end) = after.find(')') {
                return self.emit_group_marker(start, 2 + end + 1);
            }
            return Err(LexError::UnableToTokenize(start));
        }

        // Inline flags: letters from the recognized set, optional '-'
        // then more letters, then either ':' (scoped body follows) or
        // ')' (positional, no body of its own).
        let bytes = after.as_bytes();
        let mut i = 0usize;
        while bytes.get(i).is_some_and(|b| b"imsxuUJnA".contains(b)) {
            i += 1;
        }
        if bytes.get(i) == Some(&b'-') {
            i += 1;
            while bytes.get(i).is_some_and(|b| b"imsxuUJnA".contains(b)) {
                i += 1;
            }
        }
        match bytes.get(i) {
            Some(b':') => self.emit_group_marker(start, 2 + i + 1),
            Some(b')') => self.emit_group_marker(start, 2 + i + 1),
            _ => Err(LexError::UnableToTokenize(start)),
        }
    }

    fn emit_group_marker(&mut self, start: usize, len: usize) -> Result<(), LexError> {
        let text = self.rest_slice_from(start, len);
        self.pos = start + len;
        self.push(TokenKind::GroupModifierOpen, text, start);
        Ok(())
    }

    fn lex_escape(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        self.pos += 1; // consume '\'
        if self.eof() {
            return Err(LexError::UnableToTokenize(start));
        }
        let ch = self.peek().unwrap();

        macro_rules! simple {
            ($kind:expr, $len:expr) => {{
                let text = self.rest_slice_from(start, $len);
                self.pos = start + $len;
                self.push($kind, text, start);
                return Ok(());
            }};
        }

        match ch {
            b'A' | b'z' | b'Z' | b'G' => simple!(TokenKind::Anchor, 2),
            b'b' | b'B' => simple!(TokenKind::Assertion, 2),
            b'K' => simple!(TokenKind::Keep, 2),
            b'd' | b'D' | b'w' | b'W' | b's' | b'S' | b'h' | b'H' | b'v' | b'V' | b'R' | b'X'
            | b'C' | b'N'
                if self.peek_n(1) != Some(b'{') =>
            {
                simple!(TokenKind::CharType, 2)
            }
            b'p' | b'P' => return self.lex_unicode_property(start),
            b'x' => return self.lex_hex_escape(start),
            b'u' => return self.lex_brace_escape(start, TokenKind::Unicode, "\\u"),
            b'o' => return self.lex_brace_escape(start, TokenKind::Octal, "\\o"),
            b'N' => {
                if self.peek_n(1) == Some(b'{') {
                    return self.lex_brace_escape(start, TokenKind::Unicode, "\\N");
                }
                simple!(TokenKind::CharType, 2)
            }
            b'g' => return self.lex_g_reference(start),
            b'k' => return self.lex_k_backref(start),
            b'0'..=b'9' => return self.lex_numeric_escape(start),
            b't' | b'n' | b'r' | b'f' | b'v' | b'e' => simple!(TokenKind::EscapedLiteral, 2),
            _ => {
                // General rule: a backslashed metacharacter becomes
                // literal (identity escape).
                let c = self.rest()[1..].chars().next();
                match c {
                    Some(c) => {
                        let len = 1 + c.len_utf8();
                        let text = self.rest_slice_from(start, len);
                        self.pos = start + len;
                        self.push(TokenKind::EscapedLiteral, text, start);
                        Ok(())
                    }
                    None => Err(LexError::UnableToTokenize(start)),
                }
            }
        }
    }

    fn rest_slice_from(&self, abs_start: usize, len: usize) -> String {
        std::str::from_utf8(&self.body[abs_start..abs_start + len])
            .unwrap_or("")
            .to_string()
    }

    fn lex_unicode_property(&mut self, start: usize) -> Result<(), LexError> {
        // \pX short form, or \p{...} / \P{...} long form.
        if self.peek_n(1) == Some(b'{') {
            let rest = &self.rest()[2..];
            if let Some(end) = rest.find('}') {
                let total_len = 2 + end + 1;
                let text = self.rest_slice_from(start, total_len);
                self.pos = start + total_len;
                self.push(TokenKind::UnicodeProperty, text, start);
                return Ok(());
            }
            return Err(LexError::UnableToTokenize(start));
        }
        if let Some(c) = self.rest()[2..].chars().next() {
            let len = 2 + c.len_utf8();
            let text = self.rest_slice_from(start, len);
            self.pos = start + len;
            self.push(TokenKind::UnicodeProperty, text, start);
            return Ok(());
        }
        Err(LexError::UnableToTokenize(start))
    }

    fn lex_hex_escape(&mut self, start: usize) -> Result<(), LexError> {
        if self.peek_n(1) == Some(b'{') {
            return self.lex_brace_escape(start, TokenKind::Unicode, "\\x");
        }
        // \xHH: up to two hex digits (PCRE permits fewer with braces; bare
        // form takes exactly the hex digits present, up to two). `rest`
        // is relative to the 'x' itself, so `rest[0]` is 'x' and the
        // digits to check start at `rest[1]`.
        let rest = self.rest().as_bytes();
        let mut digits = 0usize;
        while digits < 2 && rest.get(1 + digits).is_some_and(|b| b.is_ascii_hexdigit()) {
            digits += 1;
        }
        let len = 2 + digits; // backslash + 'x' + digits
        let text = self.rest_slice_from(start, len);
        self.pos = start + len;
        self.push(TokenKind::Unicode, text, start);
        Ok(())
    }

    fn lex_brace_escape(
        &mut self,
        start: usize,
        kind: TokenKind,
        _prefix: &str,
    ) -> Result<(), LexError> {
        let rest = self.rest();
        let prefix_len = rest.find('{').ok_or(LexError::UnableToTokenize(start))?;
        if prefix_len > 2 {
            return Err(LexError::UnableToTokenize(start));
        }
        let after = &rest[prefix_len + 1..];
        let end = after.find('}').ok_or(LexError::UnableToTokenize(start))?;
        let total_len = prefix_len + 1 + end + 1;
        let text = self.rest_slice_from(start, total_len);
        self.pos = start + total_len;
        self.push(kind, text, start);
        Ok(())
    }

    fn lex_g_reference(&mut self, start: usize) -> Result<(), LexError> {
        // \g{n}, \g{-n}, \g{name}, \g<n>, \gN
        let rest = self.rest();
        if rest[1..].starts_with('{') {
            let after = &rest[2..];
            let end = after.find('}').ok_or(LexError::UnableToTokenize(start))?;
            let total_len = 2 + end + 1;
            let text = self.rest_slice_from(start, total_len);
            self.pos = start + total_len;
            self.push(TokenKind::GBackref, text, start);
            return Ok(());
        }
        if rest[1..].starts_with('<') {
            let after = &rest[2..];
            let end = after.find('>').ok_or(LexError::UnableToTokenize(start))?;
            let total_len = 2 + end + 1;
            let text = self.rest_slice_from(start, total_len);
            self.pos = start + total_len;
            self.push(TokenKind::GBackref, text, start);
            return Ok(());
        }
        // Bare \gN / \g-N
        let mut len = 1;
        let bytes = rest.as_bytes();
        if bytes.get(len) == Some(&b'-') {
            len += 1;
        }
        let digits_start = len;
        while bytes.get(len).is_some_and(|b| b.is_ascii_digit()) {
            len += 1;
        }
        if len == digits_start {
            return Err(LexError::UnableToTokenize(start));
        }
        let text = self.rest_slice_from(start, len);
        self.pos = start + len;
        self.push(TokenKind::GBackref, text, start);
        Ok(())
    }

    fn lex_k_backref(&mut self, start: usize) -> Result<(), LexError> {
        let rest = self.rest();
        let (open, close) = match rest[1..].chars().next() {
            Some('<') => ('<', '>'),
            Some('{') => ('{', '}'),
            Some('\'') => ('\'', '\''),
            _ => return Err(LexError::UnableToTokenize(start)),
        };
        let _ = open;
        let after = &rest[2..];
        let end = after.find(close).ok_or(LexError::UnableToTokenize(start))?;
        let total_len = 2 + end + 1;
        let text = self.rest_slice_from(start, total_len);
        self.pos = start + total_len;
        self.push(TokenKind::Backref, text, start);
        Ok(())
    }

    fn lex_numeric_escape(&mut self, start: usize) -> Result<(), LexError> {
        // `bytes` is relative to the digit right after the backslash
        // (the backslash itself was already consumed into `self.pos`),
        // so `bytes[0]` is the digit that triggered this branch.
        let bytes = self.rest().as_bytes();
        if bytes[0] == b'0' {
            // Legacy octal \0NN: leading '0' plus up to two further
            // octal digits.
            let mut digits = 1usize;
            while digits < 3 && bytes.get(digits).is_some_and(|b| (b'0'..=b'7').contains(b)) {
                digits += 1;
            }
            let len = 1 + digits; // + the backslash
            let text = self.rest_slice_from(start, len);
            self.pos = start + len;
            self.push(TokenKind::LegacyOctal, text, start);
            return Ok(());
        }
        // \1.. decimal backreference.
        let mut digits = 1usize;
        while bytes.get(digits).is_some_and(|b| b.is_ascii_digit()) {
            digits += 1;
        }
        let len = 1 + digits;
        let text = self.rest_slice_from(start, len);
        self.pos = start + len;
        self.push(TokenKind::Backref, text, start);
        Ok(())
    }

    // ---- Character class mode ---------------------------------------

    fn lex_char_class(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        if self.peek() == Some(b']') {
            self.pos += 1;
            self.push(TokenKind::CharClassClose, "]", start);
            self.mode = Mode::Normal;
            return Ok(());
        }
        if self.peek() == Some(b'^') {
            self.pos += 1;
            self.push(TokenKind::Negation, "^", start);
            return Ok(());
        }
        if self.starts_with("[:") {
            if let Some(end) = self.rest()[2..].find(":]") {
                let total_len = 2 + end + 2;
                let name = self.rest()[2..2 + end].to_string();
                self.pos += total_len;
                self.push(TokenKind::PosixClass, name, start);
                return Ok(());
            }
        }
        if self.peek() == Some(b'\\') {
            return self.lex_class_escape(start);
        }

        // One class item: either a bare literal char, or `x-y` as a
        // single Range token when the hyphen is interior (not adjacent
        // to the opening/closing bracket) and both sides are plain
        // single characters.
        if let Some(range_len) = self.match_class_range() {
            let text = self.rest()[..range_len].to_string();
            self.pos += range_len;
            self.push(TokenKind::Range, text, start);
            return Ok(());
        }

        let ch = self.take_char();
        self.push(TokenKind::Literal, ch, start);
        Ok(())
    }

    /// Matches `X-Y` where X is the char/escape just ahead of the cursor,
    /// `-` is interior, and Y is a following char/escape. Returns the
    /// total byte length consumed if a range is found.
    fn match_class_range(&self) -> Option<usize> {
        let rest = self.rest();
        let mut chars = rest.char_indices();
        let (_, first) = chars.next()?;
        if first == ']' || first == '-' {
            return None;
        }
        let mut idx_after_first = first.len_utf8();
        if first == '\\' {
            let (_, second) = chars.next()?;
            idx_after_first += second.len_utf8();
        }
        if rest[idx_after_first..].chars().next() != Some('-') {
            return None;
        }
        let after_dash = idx_after_first + 1;
        let mut tail = rest[after_dash..].chars();
        let end_first = tail.next()?;
        if end_first == ']' {
            return None;
        }
        let mut total = after_dash + end_first.len_utf8();
        if end_first == '\\' {
            let c2 = rest[total..].chars().next()?;
            total += c2.len_utf8();
        }
        Some(total)
    }

    fn lex_class_escape(&mut self, start: usize) -> Result<(), LexError> {
        // Reuse the normal-mode escape productions that make sense
        // inside a class (char types, codepoint forms, literal escapes);
        // anchors/assertions/backrefs are not meaningful here but are
        // tokenized the same way and rejected later by the parser or
        // validator.
        let saved_mode = self.mode;
        self.mode = Mode::Normal;
        let result = self.lex_escape();
        self.mode = saved_mode;
        let _ = start;
        result
    }

    // ---- Quote mode ---------------------------------------------------

    fn lex_quote(&mut self) {
        let start = self.pos;
        if let Some(end) = self.rest().find("\\E") {
            if end > 0 {
                let text = self.rest()[..end].to_string();
                self.pos += end;
                self.push(TokenKind::QuotedLiteral, text, start);
            } else {
                self.pos += 2;
                self.push(TokenKind::QuoteModeEnd, "\\E", start);
                self.mode = Mode::Normal;
            }
        } else if !self.eof() {
            // No closing \E: the remainder is literal to end of input.
            let text = self.rest().to_string();
            self.pos = self.body.len();
            self.push(TokenKind::QuotedLiteral, text, start);
        } else {
            self.mode = Mode::Normal;
        }
    }

    // ---- Comment mode --------------------------------------------------

    fn lex_comment(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        if let Some(end) = self.rest().find(')') {
            if end > 0 {
                let text = self.rest()[..end].to_string();
                self.pos += end;
                self.push(TokenKind::CommentContent, text, start);
            } else {
                self.pos += 1;
                self.push(TokenKind::CommentClose, ")", start);
                self.mode = Mode::Normal;
            }
            Ok(())
        } else {
            Err(LexError::UnclosedComment)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(body: &str) -> Vec<TokenKind> {
        Lexer::new(body)
            .unwrap()
            .tokenize()
            .unwrap()
            .as_slice()
            .iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn literal_run_coalesces() {
        let toks = Lexer::new("test").unwrap().tokenize().unwrap();
        assert_eq!(toks.as_slice()[0].value, "test");
        assert_eq!(toks.as_slice()[0].kind, TokenKind::Literal);
    }

    #[test]
    fn scenario_test_class_quantifier_five_tokens() {
        // "test[a-z]+" -> Literal, CharClassOpen, Range, CharClassClose,
        // Quantifier, Eof = five tokens plus EOF.
        let toks = Lexer::new("test[a-z]+").unwrap().tokenize().unwrap();
        assert_eq!(toks.len(), 6);
        assert_eq!(
            kinds("test[a-z]+"),
            vec![
                TokenKind::Literal,
                TokenKind::CharClassOpen,
                TokenKind::Range,
                TokenKind::CharClassClose,
                TokenKind::Quantifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unclosed_class_errors() {
        let err = Lexer::new("[abc").unwrap().tokenize().unwrap_err();
        assert_eq!(err, LexError::UnclosedCharClass);
    }

    #[test]
    fn unclosed_comment_errors() {
        let err = Lexer::new("(?#comment").unwrap().tokenize().unwrap_err();
        assert_eq!(err, LexError::UnclosedComment);
    }

    #[test]
    fn trailing_backslash_errors() {
        let err = Lexer::new("abc\\").unwrap().tokenize().unwrap_err();
        assert!(matches!(err, LexError::UnableToTokenize(_)));
    }

    #[test]
    fn quote_mode_without_terminator_is_benign() {
        let toks = Lexer::new("\\Qabc").unwrap().tokenize().unwrap();
        let kinds: Vec<_> = toks.as_slice().iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::QuoteModeStart,
                TokenKind::QuotedLiteral,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn brace_quantifier_with_whitespace() {
        let toks = Lexer::new("a{ 2 , 3 }").unwrap().tokenize().unwrap();
        assert_eq!(toks.as_slice()[1].kind, TokenKind::Quantifier);
        assert_eq!(toks.as_slice()[1].value, "{ 2 , 3 }");
    }

    #[test]
    fn conditional_with_lookahead_condition_folds_marker() {
        let toks = Lexer::new("(?(?=a)b|c)").unwrap().tokenize().unwrap();
        assert_eq!(toks.as_slice()[0].kind, TokenKind::GroupModifierOpen);
        assert_eq!(toks.as_slice()[0].value, "(?(?=");
        assert_eq!(toks.as_slice()[1].value, "a");
    }

    #[test]
    fn non_quantifier_brace_is_literal() {
        let toks = Lexer::new("a{foo}").unwrap().tokenize().unwrap();
        // '{' doesn't form a quantifier, falls back to literal run
        // starting at '{', then "foo" continues the literal, then '}'
        // also joins as literal (not excluded from the literal set).
        assert_eq!(toks.as_slice()[0].value, "a");
        assert_eq!(toks.as_slice()[1].value, "{foo}");
    }
}
