//! Recursive-descent PCRE parser.
//!
//! Consumes the `TokenStream` the lexer produces and builds the AST.
//! One token of lookahead, one `parse_*` method per grammar production:
//! `parse_alternation` -> `parse_sequence` -> `parse_quantified_atom` ->
//! `parse_atom`, with group-opener dispatch split out into its own
//! family of `parse_*`/`build_*` helpers because a `(?...)` marker alone
//! determines which of a dozen unrelated shapes follows.
//!
//! One struct holds the cursor over the token stream, with matching
//! `bump`/`enter`/`exit` resource-accounting methods around recursive
//! descent into nested groups.

use crate::core::ast::*;
use crate::core::config::ParserConfig;
use crate::core::errors::ParseError;
use crate::core::lexer::Lexer;
use crate::core::token::{Token, TokenKind, TokenStream};

pub struct Parser {
    tokens: TokenStream,
    cfg: ParserConfig,
    /// Flags in effect at the current point in the pattern; inline
    /// flag groups mutate this for their scope and restore it on exit,
    /// except positional changes (`(?i)`), which mutate it permanently
    /// from that point forward.
    flags: Flags,
    initial_flags: Flags,
    node_count: usize,
    depth: usize,
    next_capture_index: u32,
}

impl Parser {
    pub fn new(tokens: TokenStream, flags: Flags, cfg: ParserConfig) -> Self {
        Parser {
            tokens,
            cfg,
            flags,
            initial_flags: flags,
            node_count: 0,
            depth: 0,
            next_capture_index: 1,
        }
    }

    /// Parse the full token stream into a `Regex` node wrapping the
    /// body, using `delimiter` as the recorded original delimiter.
    pub fn parse(mut self, delimiter: char) -> Result<Node, ParseError> {
        let body = self.parse_alternation()?;
        if !self.tokens.is_eof() {
            return Err(ParseError::UnexpectedToken(self.tokens.current().offset));
        }
        let end = self.tokens.current().offset;
        Ok(Node::Regex(Regex {
            span: Span::new(0, end),
            delimiter,
            flags: self.initial_flags,
            body: Box::new(body),
        }))
    }

    fn bump(&mut self, pos: usize) -> Result<(), ParseError> {
        self.node_count += 1;
        if self.node_count > self.cfg.max_nodes {
            return Err(ParseError::TooManyNodes(pos));
        }
        Ok(())
    }

    fn enter(&mut self, pos: usize) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.cfg.max_recursion_depth {
            return Err(ParseError::RecursionTooDeep(pos));
        }
        Ok(())
    }

    fn exit(&mut self) {
        self.depth -= 1;
    }

    fn end_pos(&self) -> usize {
        self.tokens.current().offset
    }

    // ---- Alternation / sequence -------------------------------------

    fn parse_alternation(&mut self) -> Result<Node, ParseError> {
        let start = self.tokens.current().offset;
        self.enter(start)?;
        let mut branches = vec![self.parse_sequence()?];
        while self.tokens.current().kind == TokenKind::Alternation {
            self.tokens.advance();
            branches.push(self.parse_sequence()?);
        }
        self.exit();
        let end = self.end_pos();
        self.bump(start)?;
        if branches.len() == 1 {
            Ok(branches.pop().expect("just pushed one branch"))
        } else {
            Ok(Node::Alternation(Alternation {
                span: Span::new(start, end),
                branches,
            }))
        }
    }

    fn parse_sequence(&mut self) -> Result<Node, ParseError> {
        let start = self.tokens.current().offset;
        let mut children = Vec::new();
        loop {
            match self.tokens.current().kind {
                TokenKind::Eof | TokenKind::Alternation | TokenKind::GroupClose => break,
                _ => children.push(self.parse_quantified_atom()?),
            }
        }
        let end = self.end_pos();
        self.bump(start)?;
        Ok(if children.len() == 1 {
            children.pop().expect("just checked len == 1")
        } else {
            Node::Sequence(Sequence {
                span: Span::new(start, end),
                children,
            })
        })
    }

    fn parse_quantified_atom(&mut self) -> Result<Node, ParseError> {
        let atom_start = self.tokens.current().offset;
        let atom = self.parse_atom()?;
        if self.tokens.current().kind == TokenKind::Quantifier {
            let qtok = self.tokens.advance();
            if atom.rejects_quantifier() {
                if atom.is_empty_quantifier_target() {
                    return Err(ParseError::QuantifierWithoutTarget(atom_start));
                }
                return Err(ParseError::QuantifierOnAssertionOrVerb {
                    position: atom_start,
                    quantifier: qtok.value,
                    atom: describe_atom(&atom),
                });
            }
            let (min, max, style, text) = parse_quantifier_text(&qtok.value);
            let end = self.end_pos();
            self.bump(atom_start)?;
            return Ok(Node::Quantifier(Quantifier {
                span: Span::new(atom_start, end),
                target: Box::new(atom),
                text,
                min,
                max,
                style,
            }));
        }
        Ok(atom)
    }

    // ---- Atoms --------------------------------------------------------

    fn parse_atom(&mut self) -> Result<Node, ParseError> {
        let pos = self.tokens.current().offset;
        self.bump(pos)?;
        match self.tokens.current().kind {
            TokenKind::Literal => {
                let tok = self.tokens.advance();
                let len = tok.value.len();
                Ok(Node::Literal(Literal {
                    span: Span::new(tok.offset, tok.offset + len),
                    value: tok.value,
                    quoted: false,
                }))
            }
            TokenKind::EscapedLiteral => {
                let tok = self.tokens.advance();
                Ok(build_escaped_literal(tok))
            }
            TokenKind::CharType => {
                let tok = self.tokens.advance();
                Ok(build_char_type(tok))
            }
            TokenKind::Dot => {
                let tok = self.tokens.advance();
                Ok(Node::Dot(Dot {
                    span: Span::new(tok.offset, tok.offset + 1),
                }))
            }
            TokenKind::Anchor => {
                let tok = self.tokens.advance();
                Ok(build_anchor(tok))
            }
            TokenKind::Assertion => {
                let tok = self.tokens.advance();
                let kind = if tok.value == "\\b" {
                    AssertionKind::WordBoundary
                } else {
                    AssertionKind::NotWordBoundary
                };
                let len = tok.value.len();
                Ok(Node::Assertion(Assertion {
                    span: Span::new(tok.offset, tok.offset + len),
                    kind,
                }))
            }
            TokenKind::Keep => {
                let tok = self.tokens.advance();
                let len = tok.value.len();
                Ok(Node::Keep(Keep {
                    span: Span::new(tok.offset, tok.offset + len),
                }))
            }
            TokenKind::Unicode | TokenKind::Octal | TokenKind::LegacyOctal => {
                let tok = self.tokens.advance();
                Ok(build_codepoint_literal(tok))
            }
            TokenKind::UnicodeProperty => {
                let tok = self.tokens.advance();
                Ok(build_unicode_prop(tok))
            }
            TokenKind::Backref => {
                let tok = self.tokens.advance();
                Ok(build_backref(tok))
            }
            TokenKind::GBackref => {
                let tok = self.tokens.advance();
                Ok(build_g_reference(tok))
            }
            TokenKind::CharClassOpen => self.parse_char_class(),
            TokenKind::GroupOpen => self.parse_plain_group(),
            TokenKind::GroupModifierOpen => self.parse_group_modifier(),
            TokenKind::PcreVerb => {
                let tok = self.tokens.advance();
                self.build_pcre_verb(tok)
            }
            TokenKind::Callout => {
                let tok = self.tokens.advance();
                Ok(build_callout(tok))
            }
            TokenKind::CommentOpen => self.parse_comment(),
            TokenKind::QuoteModeStart => self.parse_quote_run(),
            TokenKind::Quantifier => Err(ParseError::QuantifierWithoutTarget(pos)),
            _ => Err(ParseError::UnexpectedToken(pos)),
        }
    }

    fn expect_group_close(&mut self, open_pos: usize) -> Result<(), ParseError> {
        if self.tokens.current().kind == TokenKind::GroupClose {
            self.tokens.advance();
            Ok(())
        } else if self.tokens.is_eof() {
            Err(ParseError::ExpectedCloseParen(open_pos))
        } else {
            Err(ParseError::UnexpectedToken(self.tokens.current().offset))
        }
    }

    /// Flag changes inside a group are scoped to that group; restore
    /// the incoming flag set once its body and closing paren are consumed.
    fn parse_scoped_body(&mut self, open_pos: usize) -> Result<Node, ParseError> {
        let saved = self.flags;
        let child = self.parse_alternation()?;
        self.expect_group_close(open_pos)?;
        self.flags = saved;
        Ok(child)
    }

    // ---- Plain capturing group ----------------------------------------

    fn parse_plain_group(&mut self) -> Result<Node, ParseError> {
        let open = self.tokens.advance();
        self.enter(open.offset)?;
        let index = self.next_capture_index;
        self.next_capture_index += 1;
        let child = self.parse_scoped_body(open.offset)?;
        self.exit();
        let end = self.end_pos();
        Ok(Node::Group(Group {
            span: Span::new(open.offset, end),
            kind: GroupKind::Capturing,
            child: Box::new(child),
            name: None,
            capture_index: Some(index),
            flags: None,
            name_style: None,
        }))
    }

    // ---- `(?...)` group-opener dispatch ---------------------------------

    fn parse_group_modifier(&mut self) -> Result<Node, ParseError> {
        let marker = self.tokens.advance();
        self.enter(marker.offset)?;
        let result = self.build_group_from_marker(&marker);
        self.exit();
        result
    }

    fn build_group_from_marker(&mut self, marker: &Token) -> Result<Node, ParseError> {
        let start = marker.offset;
        let text = marker.value.as_str();
        match text {
            "(?|" => self.parse_branch_reset(start),
            "(?:" => self.build_simple_group(start, GroupKind::NonCapturing),
            "(?>" => self.build_simple_group(start, GroupKind::Atomic),
            "(?=" => self.build_simple_group(start, GroupKind::LookaheadPositive),
            "(?!" => self.build_simple_group(start, GroupKind::LookaheadNegative),
            "(?<=" => self.build_simple_group(start, GroupKind::LookbehindPositive),
            "(?<!" => self.build_simple_group(start, GroupKind::LookbehindNegative),
            "(?(?=" => self.parse_conditional_lookaround(start, GroupKind::LookaheadPositive),
            "(?(?!" => self.parse_conditional_lookaround(start, GroupKind::LookaheadNegative),
            "(?(?<=" => self.parse_conditional_lookaround(start, GroupKind::LookbehindPositive),
            "(?(?<!" => self.parse_conditional_lookaround(start, GroupKind::LookbehindNegative),
            "(?(" => self.parse_conditional_plain(start),
            _ => self.build_group_from_marker_variable(marker, text),
        }
    }

    fn build_simple_group(&mut self, start: usize, kind: GroupKind) -> Result<Node, ParseError> {
        let child = self.parse_scoped_body(start)?;
        let end = self.end_pos();
        Ok(Node::Group(Group {
            span: Span::new(start, end),
            kind,
            child: Box::new(child),
            name: None,
            capture_index: None,
            flags: None,
            name_style: None,
        }))
    }

    fn build_group_from_marker_variable(
        &mut self,
        marker: &Token,
        text: &str,
    ) -> Result<Node, ParseError> {
        let start = marker.offset;
        if let Some(name) = text.strip_prefix("(?<").and_then(|s| s.strip_suffix('>')) {
            return self.parse_named_group(start, name.to_string(), NamedGroupStyle::Angle);
        }
        if let Some(name) = text.strip_prefix("(?'").and_then(|s| s.strip_suffix('\'')) {
            return self.parse_named_group(start, name.to_string(), NamedGroupStyle::Quote);
        }
        if let Some(name) = text.strip_prefix("(?P<").and_then(|s| s.strip_suffix('>')) {
            return self.parse_named_group(start, name.to_string(), NamedGroupStyle::PAngle);
        }
        if text.starts_with("(?P=") {
            return Err(ParseError::UnsupportedPSyntax(start));
        }
        if let Some(name) = text.strip_prefix("(?P>").and_then(|s| s.strip_suffix(')')) {
            let end = start + text.len();
            return Ok(Node::Subroutine(Subroutine {
                span: Span::new(start, end),
                by_index: None,
                by_name: Some(name.to_string()),
                marker: SubroutineMarker::PGreater,
            }));
        }
        if let Some(name) = text.strip_prefix("(?&").and_then(|s| s.strip_suffix(')')) {
            let end = start + text.len();
            return Ok(Node::Subroutine(Subroutine {
                span: Span::new(start, end),
                by_index: None,
                by_name: Some(name.to_string()),
                marker: SubroutineMarker::Ampersand,
            }));
        }
        if text.starts_with("(?R") && text.ends_with(')') {
            let end = start + text.len();
            return Ok(Node::Subroutine(Subroutine {
                span: Span::new(start, end),
                by_index: Some(0),
                by_name: None,
                marker: SubroutineMarker::Bare,
            }));
        }
        if text.ends_with(')') {
            let inner = &text[2..text.len() - 1];
            if inner
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_digit() || c == '+' || c == '-')
            {
                let idx: i32 = inner.parse().unwrap_or(0);
                let end = start + text.len();
                return Ok(Node::Subroutine(Subroutine {
                    span: Span::new(start, end),
                    by_index: Some(idx),
                    by_name: None,
                    marker: SubroutineMarker::Bare,
                }));
            }
        }
        self.parse_inline_flags(marker, text)
    }

    fn parse_named_group(
        &mut self,
        start: usize,
        name: String,
        style: NamedGroupStyle,
    ) -> Result<Node, ParseError> {
        let index = self.next_capture_index;
        self.next_capture_index += 1;
        let child = self.parse_scoped_body(start)?;
        let end = self.end_pos();
        Ok(Node::Group(Group {
            span: Span::new(start, end),
            kind: GroupKind::Named,
            child: Box::new(child),
            name: Some(name),
            capture_index: Some(index),
            flags: None,
            name_style: Some(style),
        }))
    }

    /// `(?|...)`: every alternative restarts capture-group numbering
    /// from the same base index; the group's capture count afterward
    /// is the maximum consumed across all branches.
    fn parse_branch_reset(&mut self, start: usize) -> Result<Node, ParseError> {
        let base = self.next_capture_index;
        let mut branches = Vec::new();
        let mut max_index = base;
        loop {
            self.next_capture_index = base;
            branches.push(self.parse_sequence()?);
            max_index = max_index.max(self.next_capture_index);
            if self.tokens.current().kind == TokenKind::Alternation {
                self.tokens.advance();
            } else {
                break;
            }
        }
        self.expect_group_close(start)?;
        self.next_capture_index = max_index;
        let end = self.end_pos();
        let child = if branches.len() == 1 {
            branches.pop().expect("just checked len == 1")
        } else {
            Node::Alternation(Alternation {
                span: Span::new(start, end),
                branches,
            })
        };
        Ok(Node::Group(Group {
            span: Span::new(start, end),
            kind: GroupKind::BranchReset,
            child: Box::new(child),
            name: None,
            capture_index: None,
            flags: None,
            name_style: None,
        }))
    }

    // ---- Conditionals ---------------------------------------------------

    fn parse_conditional_lookaround(
        &mut self,
        start: usize,
        kind: GroupKind,
    ) -> Result<Node, ParseError> {
        let cond_body = self.parse_sequence()?;
        self.expect_group_close(start)?;
        let condition = Node::Group(Group {
            span: Span::new(start, self.end_pos()),
            kind,
            child: Box::new(cond_body),
            name: None,
            capture_index: None,
            flags: None,
            name_style: None,
        });
        let (then_branch, else_branch) = self.parse_then_else(start)?;
        self.expect_group_close(start)?;
        let end = self.end_pos();
        Ok(Node::Conditional(Conditional {
            span: Span::new(start, end),
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        }))
    }

    fn parse_conditional_plain(&mut self, start: usize) -> Result<Node, ParseError> {
        let condition = self.parse_condition_reference(start)?;
        let (then_branch, else_branch) = self.parse_then_else(start)?;
        self.expect_group_close(start)?;
        let end = self.end_pos();
        Ok(Node::Conditional(Conditional {
            span: Span::new(start, end),
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        }))
    }

    fn parse_then_else(&mut self, start: usize) -> Result<(Node, Node), ParseError> {
        let first = self.parse_sequence()?;
        if self.tokens.current().kind == TokenKind::Alternation {
            self.tokens.advance();
            let second = self.parse_sequence()?;
            if self.tokens.current().kind == TokenKind::Alternation {
                return Err(ParseError::UnexpectedToken(self.tokens.current().offset));
            }
            Ok((first, second))
        } else {
            Ok((
                first,
                Node::Sequence(Sequence {
                    span: Span::new(start, start),
                    children: vec![],
                }),
            ))
        }
    }

    /// The bracketed condition of a bare `(?(...)` conditional: a
    /// numbered/named backreference, a recursion test (`R`, `Rn`,
    /// `R&name`), or the literal `DEFINE` sentinel. Consumes the token
    /// the condition is spelled with plus the `)` that ends it.
    fn parse_condition_reference(&mut self, start: usize) -> Result<Node, ParseError> {
        let tok = self.tokens.current().clone();
        if tok.kind != TokenKind::Literal {
            return Err(ParseError::InvalidConditionalCondition(start));
        }
        self.tokens.advance();
        let text = tok.value.clone();
        let span = Span::new(tok.offset, tok.offset + text.len());
        let node = if text == "DEFINE" {
            Node::Literal(Literal {
                span,
                value: text,
                quoted: false,
            })
        } else if let Some(rest) = text.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
            Node::Backref(Backref {
                span,
                form: BackrefForm::KAngle,
                by_index: None,
                by_name: Some(rest.to_string()),
            })
        } else if let Some(rest) = text.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
            Node::Backref(Backref {
                span,
                form: BackrefForm::KQuoted,
                by_index: None,
                by_name: Some(rest.to_string()),
            })
        } else if let Some(rest) = text.strip_prefix("R&") {
            Node::Subroutine(Subroutine {
                span,
                by_index: None,
                by_name: Some(rest.to_string()),
                marker: SubroutineMarker::Bare,
            })
        } else if text == "R" {
            Node::Subroutine(Subroutine {
                span,
                by_index: Some(0),
                by_name: None,
                marker: SubroutineMarker::Bare,
            })
        } else if let Some(rest) = text.strip_prefix('R') {
            let idx: i32 = rest.parse().unwrap_or(0);
            Node::Subroutine(Subroutine {
                span,
                by_index: Some(idx),
                by_name: None,
                marker: SubroutineMarker::Bare,
            })
        } else if text
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit() || c == '+' || c == '-')
        {
            let idx: i32 = text.parse().unwrap_or(0);
            Node::Backref(Backref {
                span,
                form: BackrefForm::Numeric,
                by_index: Some(idx),
                by_name: None,
            })
        } else {
            Node::Backref(Backref {
                span,
                form: BackrefForm::KAngle,
                by_index: None,
                by_name: Some(text),
            })
        };
        self.expect_group_close(start)?;
        Ok(node)
    }

    // ---- Inline flags -----------------------------------------------------

    fn parse_inline_flags(&mut self, marker: &Token, text: &str) -> Result<Node, ParseError> {
        let start = marker.offset;
        let scoped = text.ends_with(':');
        let inner = &text[2..text.len() - 1];
        for c in inner.chars() {
            if c != '-' && !"imsxuUJnA".contains(c) {
                return Err(ParseError::UnknownFlags {
                    position: start,
                    flags: inner.to_string(),
                });
            }
        }
        let delta = parse_flag_delta(inner);
        let new_flags = self.flags.apply_delta(&delta).map_err(|c| ParseError::UnknownFlags {
            position: start,
            flags: c.to_string(),
        })?;
        if scoped {
            let saved = self.flags;
            self.flags = new_flags;
            let child = self.parse_alternation()?;
            self.expect_group_close(start)?;
            self.flags = saved;
            let end = self.end_pos();
            Ok(Node::Group(Group {
                span: Span::new(start, end),
                kind: GroupKind::InlineFlags,
                child: Box::new(child),
                name: None,
                capture_index: None,
                flags: Some(delta),
                name_style: None,
            }))
        } else {
            self.flags = new_flags;
            let end = start + text.len();
            Ok(Node::Group(Group {
                span: Span::new(start, end),
                kind: GroupKind::InlineFlags,
                child: Box::new(Node::Sequence(Sequence {
                    span: Span::new(end, end),
                    children: vec![],
                })),
                name: None,
                capture_index: None,
                flags: Some(delta),
                name_style: None,
            }))
        }
    }

    // ---- Character classes ------------------------------------------------

    fn parse_char_class(&mut self) -> Result<Node, ParseError> {
        let open = self.tokens.advance();
        let start = open.offset;
        let mut negated = false;
        if self.tokens.current().kind == TokenKind::Negation {
            self.tokens.advance();
            negated = true;
        }
        let mut items = Vec::new();
        loop {
            match self.tokens.current().kind {
                TokenKind::CharClassClose => {
                    self.tokens.advance();
                    break;
                }
                TokenKind::Eof => {
                    return Err(ParseError::UnexpectedToken(self.tokens.current().offset))
                }
                _ => items.push(self.parse_class_item()?),
            }
        }
        let end = self.end_pos();
        self.bump(start)?;
        let inner = if items.len() == 1 {
            items.pop().expect("just checked len == 1")
        } else {
            Node::Sequence(Sequence {
                span: Span::new(start, end),
                children: items,
            })
        };
        Ok(Node::CharClass(CharClass {
            span: Span::new(start, end),
            negated,
            inner: Box::new(inner),
        }))
    }

    fn parse_class_item(&mut self) -> Result<Node, ParseError> {
        match self.tokens.current().kind {
            TokenKind::Literal => {
                let tok = self.tokens.advance();
                let len = tok.value.len();
                Ok(Node::Literal(Literal {
                    span: Span::new(tok.offset, tok.offset + len),
                    value: tok.value,
                    quoted: false,
                }))
            }
            TokenKind::PosixClass => {
                let tok = self.tokens.advance();
                let (negated, name) = match tok.value.strip_prefix('^') {
                    Some(rest) => (true, rest.to_string()),
                    None => (false, tok.value.clone()),
                };
                // `[:` name `:]`: four wrapper bytes beyond the name itself.
                let total_len = tok.value.len() + 4;
                Ok(Node::PosixClass(PosixClass {
                    span: Span::new(tok.offset, tok.offset + total_len),
                    name,
                    negated,
                }))
            }
            TokenKind::CharType => {
                let tok = self.tokens.advance();
                Ok(build_char_type(tok))
            }
            TokenKind::EscapedLiteral => {
                let tok = self.tokens.advance();
                Ok(build_escaped_literal(tok))
            }
            TokenKind::Unicode | TokenKind::Octal | TokenKind::LegacyOctal => {
                let tok = self.tokens.advance();
                Ok(build_codepoint_literal(tok))
            }
            TokenKind::UnicodeProperty => {
                let tok = self.tokens.advance();
                Ok(build_unicode_prop(tok))
            }
            TokenKind::Range => {
                let tok = self.tokens.advance();
                Ok(build_range(tok))
            }
            _ => Err(ParseError::UnexpectedToken(self.tokens.current().offset)),
        }
    }

    // ---- Comments and quoted runs ------------------------------------------

    fn parse_comment(&mut self) -> Result<Node, ParseError> {
        let open = self.tokens.advance();
        let mut text = String::new();
        if self.tokens.current().kind == TokenKind::CommentContent {
            text = self.tokens.advance().value;
        }
        if self.tokens.current().kind != TokenKind::CommentClose {
            return Err(ParseError::UnexpectedToken(self.tokens.current().offset));
        }
        self.tokens.advance();
        let end = self.end_pos();
        Ok(Node::Comment(Comment {
            span: Span::new(open.offset, end),
            text,
        }))
    }

    fn parse_quote_run(&mut self) -> Result<Node, ParseError> {
        let open = self.tokens.advance();
        let mut value = String::new();
        if self.tokens.current().kind == TokenKind::QuotedLiteral {
            value = self.tokens.advance().value;
        }
        if self.tokens.current().kind == TokenKind::QuoteModeEnd {
            self.tokens.advance();
        }
        let end = self.end_pos();
        Ok(Node::Literal(Literal {
            span: Span::new(open.offset, end),
            value,
            quoted: true,
        }))
    }

    // ---- PCRE verbs, including script runs ---------------------------------

    /// `(*NAME[:arg])`. Script runs (`(*script_run:...)`,
    /// `(*atomic_script_run:...)`) carry a sub-pattern rather than a
    /// plain argument string, so their body is re-lexed and re-parsed
    /// as its own token stream sharing this parser's flags, config, and
    /// capture-index counter.
    fn build_pcre_verb(&mut self, tok: Token) -> Result<Node, ParseError> {
        let text = tok.value.as_str();
        let inner = &text[2..text.len() - 1];
        if let Some(body) = inner.strip_prefix("script_run:") {
            return self.build_nested_group(tok.offset, text.len(), GroupKind::ScriptRun, body);
        }
        if let Some(body) = inner.strip_prefix("atomic_script_run:") {
            return self.build_nested_group(
                tok.offset,
                text.len(),
                GroupKind::AtomicScriptRun,
                body,
            );
        }
        let (name, argument) = match inner.split_once(':') {
            Some((n, a)) => (n.to_string(), Some(a.to_string())),
            None => (inner.to_string(), None),
        };
        Ok(Node::PcreVerb(PcreVerb {
            span: Span::new(tok.offset, tok.offset + text.len()),
            name,
            argument,
        }))
    }

    fn build_nested_group(
        &mut self,
        start: usize,
        total_len: usize,
        kind: GroupKind,
        body: &str,
    ) -> Result<Node, ParseError> {
        let lexer = Lexer::new(body)
            .map_err(|_| ParseError::UnexpectedToken(start))?
            .with_extended(self.flags.extended);
        let tokens = lexer.tokenize().map_err(|_| ParseError::UnexpectedToken(start))?;
        let mut inner = Parser {
            tokens,
            cfg: self.cfg,
            flags: self.flags,
            initial_flags: self.flags,
            node_count: 0,
            depth: self.depth,
            next_capture_index: self.next_capture_index,
        };
        let child = inner.parse_alternation()?;
        if !inner.tokens.is_eof() {
            return Err(ParseError::UnexpectedToken(inner.tokens.current().offset));
        }
        self.next_capture_index = inner.next_capture_index;
        let end = start + total_len;
        Ok(Node::Group(Group {
            span: Span::new(start, end),
            kind,
            child: Box::new(child),
            name: None,
            capture_index: None,
            flags: None,
            name_style: None,
        }))
    }
}

fn parse_flag_delta(spec: &str) -> FlagDelta {
    match spec.find('-') {
        Some(dash) => FlagDelta {
            set_flags: spec[..dash].to_string(),
            clear_flags: spec[dash + 1..].to_string(),
        },
        None => FlagDelta {
            set_flags: spec.to_string(),
            clear_flags: String::new(),
        },
    }
}

/// Canonicalizes a quantifier's source text (internal whitespace in
/// brace forms is stripped) and derives its min/max/style.
fn parse_quantifier_text(raw: &str) -> (u32, Option<u32>, QuantifierStyle, String) {
    if let Some(rest) = raw.strip_prefix('{') {
        let close = rest.find('}').unwrap_or(rest.len());
        let inner = &rest[..close];
        let suffix = &rest[close + 1..];
        let style = match suffix {
            "?" => QuantifierStyle::Lazy,
            "+" => QuantifierStyle::Possessive,
            _ => QuantifierStyle::Greedy,
        };
        let (min_part, max_part) = match inner.find(',') {
            Some(comma) => (inner[..comma].trim(), Some(inner[comma + 1..].trim())),
            None => (inner.trim(), None),
        };
        let min: u32 = min_part.parse().unwrap_or(0);
        let (max, canonical) = match max_part {
            None => (Some(min), format!("{{{}}}", min_part)),
            Some(m) if m.is_empty() => (None, format!("{{{},}}", min_part)),
            Some(m) => (m.parse().ok(), format!("{{{},{}}}", min_part, m)),
        };
        (min, max, style, format!("{}{}", canonical, suffix))
    } else {
        let mut chars = raw.chars();
        let base = chars.next().unwrap_or('*');
        let (min, max) = match base {
            '*' => (0, None),
            '+' => (1, None),
            _ => (0, Some(1)), // '?'
        };
        let style = match chars.next() {
            Some('?') => QuantifierStyle::Lazy,
            Some('+') => QuantifierStyle::Possessive,
            _ => QuantifierStyle::Greedy,
        };
        (min, max, style, raw.to_string())
    }
}

fn control_escape_codepoint(ch: char) -> u32 {
    match ch {
        't' => 0x09,
        'n' => 0x0A,
        'r' => 0x0D,
        'f' => 0x0C,
        'v' => 0x0B,
        'e' => 0x1B,
        other => other as u32,
    }
}

fn build_escaped_literal(tok: Token) -> Node {
    let ch = tok.value[1..].chars().next().unwrap_or('\\');
    let codepoint = control_escape_codepoint(ch);
    let len = tok.value.len();
    Node::CharLiteral(CharLiteral {
        span: Span::new(tok.offset, tok.offset + len),
        raw: tok.value,
        codepoint,
        kind: CharLiteralKind::Escaped,
    })
}

fn build_char_type(tok: Token) -> Node {
    let letter = tok.value.chars().nth(1).unwrap_or('d');
    let len = tok.value.len();
    Node::CharType(CharType {
        span: Span::new(tok.offset, tok.offset + len),
        letter,
    })
}

fn build_anchor(tok: Token) -> Node {
    let kind = match tok.value.as_str() {
        "^" => AnchorKind::StartOfLine,
        "$" => AnchorKind::EndOfLine,
        "\\A" => AnchorKind::AbsoluteStart,
        "\\z" => AnchorKind::AbsoluteEnd,
        "\\Z" => AnchorKind::EndBeforeFinalNewline,
        "\\G" => AnchorKind::PreviousMatchEnd,
        _ => AnchorKind::StartOfLine,
    };
    let len = tok.value.len();
    Node::Anchor(Anchor {
        span: Span::new(tok.offset, tok.offset + len),
        kind,
    })
}

fn build_codepoint_literal(tok: Token) -> Node {
    let text = tok.value.as_str();
    let (kind, codepoint) = if let Some(hex) = text.strip_prefix("\\x{").and_then(|s| s.strip_suffix('}')) {
        (CharLiteralKind::BraceHex, u32::from_str_radix(hex, 16).unwrap_or(0))
    } else if let Some(hex) = text.strip_prefix("\\x") {
        (CharLiteralKind::Hex, u32::from_str_radix(hex, 16).unwrap_or(0))
    } else if let Some(hex) = text.strip_prefix("\\u{").and_then(|s| s.strip_suffix('}')) {
        (CharLiteralKind::BraceUnicode, u32::from_str_radix(hex, 16).unwrap_or(0))
    } else if text.starts_with("\\N{") {
        (CharLiteralKind::Named, 0)
    } else if let Some(oct) = text.strip_prefix("\\o{").and_then(|s| s.strip_suffix('}')) {
        (CharLiteralKind::Octal, u32::from_str_radix(oct, 8).unwrap_or(0))
    } else if let Some(oct) = text.strip_prefix("\\0") {
        (CharLiteralKind::LegacyOctal, u32::from_str_radix(oct, 8).unwrap_or(0))
    } else {
        (CharLiteralKind::Hex, 0)
    };
    Node::CharLiteral(CharLiteral {
        span: Span::new(tok.offset, tok.offset + text.len()),
        raw: tok.value.clone(),
        codepoint,
        kind,
    })
}

fn build_unicode_prop(tok: Token) -> Node {
    let text = tok.value.as_str();
    let negated = text.starts_with("\\P");
    let rest = text.get(2..).unwrap_or("");
    let (name, short_form) = match rest.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
        Some(inner) => (inner.to_string(), false),
        None => (rest.to_string(), true),
    };
    Node::UnicodeProp(UnicodeProp {
        span: Span::new(tok.offset, tok.offset + text.len()),
        name,
        negated,
        short_form,
    })
}

fn build_backref(tok: Token) -> Node {
    let text = tok.value.as_str();
    if let Some(rest) = text.strip_prefix("\\k") {
        let (form, name) = if let Some(n) = rest.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
            (BackrefForm::KAngle, n)
        } else if let Some(n) = rest.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            (BackrefForm::KBraced, n)
        } else if let Some(n) = rest.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
            (BackrefForm::KQuoted, n)
        } else {
            (BackrefForm::KAngle, rest)
        };
        return Node::Backref(Backref {
            span: Span::new(tok.offset, tok.offset + text.len()),
            form,
            by_index: None,
            by_name: Some(name.to_string()),
        });
    }
    let idx: i32 = text[1..].parse().unwrap_or(0);
    Node::Backref(Backref {
        span: Span::new(tok.offset, tok.offset + text.len()),
        form: BackrefForm::Numeric,
        by_index: Some(idx),
        by_name: None,
    })
}

fn classify_ref_target(inner: &str) -> (Option<i32>, Option<String>) {
    if inner
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '+' || c == '-')
    {
        (inner.parse().ok(), None)
    } else {
        (None, Some(inner.to_string()))
    }
}

fn build_g_reference(tok: Token) -> Node {
    let text = tok.value.as_str();
    let rest = &text[2..];
    if let Some(inner) = rest.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
        let (by_index, by_name) = classify_ref_target(inner);
        return Node::Subroutine(Subroutine {
            span: Span::new(tok.offset, tok.offset + text.len()),
            by_index,
            by_name,
            marker: SubroutineMarker::GAngle,
        });
    }
    if let Some(inner) = rest.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
        let (by_index, by_name) = classify_ref_target(inner);
        return Node::Subroutine(Subroutine {
            span: Span::new(tok.offset, tok.offset + text.len()),
            by_index,
            by_name,
            marker: SubroutineMarker::GQuote,
        });
    }
    if let Some(inner) = rest.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
        let form = if inner.starts_with('-') {
            BackrefForm::GBracedNeg
        } else {
            BackrefForm::GBraced
        };
        let idx: i32 = inner.parse().unwrap_or(0);
        return Node::Backref(Backref {
            span: Span::new(tok.offset, tok.offset + text.len()),
            form,
            by_index: Some(idx),
            by_name: None,
        });
    }
    let idx: i32 = rest.parse().unwrap_or(0);
    Node::Backref(Backref {
        span: Span::new(tok.offset, tok.offset + text.len()),
        form: BackrefForm::GBare,
        by_index: Some(idx),
        by_name: None,
    })
}

fn split_range_text(text: &str) -> (&str, &str) {
    let bytes = text.as_bytes();
    let first_len = if bytes.first() == Some(&b'\\') {
        let c = text[1..].chars().next().unwrap_or('\\');
        1 + c.len_utf8()
    } else {
        text.chars().next().unwrap_or('-').len_utf8()
    };
    let after_dash = first_len + 1;
    (&text[..first_len], &text[after_dash..])
}

fn build_class_endpoint(text: &str, offset: usize) -> Node {
    match text.strip_prefix('\\') {
        Some(rest) => {
            let ch = rest.chars().next().unwrap_or('\\');
            let codepoint = control_escape_codepoint(ch);
            Node::CharLiteral(CharLiteral {
                span: Span::new(offset, offset + text.len()),
                raw: text.to_string(),
                codepoint,
                kind: CharLiteralKind::Escaped,
            })
        }
        None => Node::Literal(Literal {
            span: Span::new(offset, offset + text.len()),
            value: text.to_string(),
            quoted: false,
        }),
    }
}

fn build_range(tok: Token) -> Node {
    let (start_text, end_text) = split_range_text(&tok.value);
    let start_node = build_class_endpoint(start_text, tok.offset);
    let end_offset = tok.offset + tok.value.len() - end_text.len();
    let end_node = build_class_endpoint(end_text, end_offset);
    Node::Range(Range {
        span: Span::new(tok.offset, tok.offset + tok.value.len()),
        start: Box::new(start_node),
        end: Box::new(end_node),
    })
}

fn build_callout(tok: Token) -> Node {
    let text = tok.value.as_str();
    let inner = &text[3..text.len() - 1];
    let (identifier_kind, variant) = if inner.is_empty() {
        (CalloutIdentifier::Numeric(0), String::new())
    } else if inner.chars().all(|c| c.is_ascii_digit()) {
        (CalloutIdentifier::Numeric(inner.parse().unwrap_or(0)), String::new())
    } else if let Some(s) = inner.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        (CalloutIdentifier::QuotedString, s.to_string())
    } else if let Some(s) = inner.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
        (CalloutIdentifier::QuotedString, s.to_string())
    } else {
        (CalloutIdentifier::BareIdentifier, inner.to_string())
    };
    Node::Callout(Callout {
        span: Span::new(tok.offset, tok.offset + text.len()),
        identifier_kind,
        text: inner.to_string(),
        variant,
    })
}

fn describe_atom(node: &Node) -> String {
    match node {
        Node::Anchor(_) => "anchor".to_string(),
        Node::Assertion(_) => "assertion".to_string(),
        Node::PcreVerb(n) => n.name.clone(),
        Node::Keep(_) => "\\K".to_string(),
        Node::Comment(_) => "comment".to_string(),
        Node::Callout(_) => "callout".to_string(),
        Node::Group(g) => match g.kind {
            GroupKind::LookaheadPositive
            | GroupKind::LookaheadNegative
            | GroupKind::LookbehindPositive
            | GroupKind::LookbehindNegative => "lookaround assertion".to_string(),
            _ => "empty group".to_string(),
        },
        Node::Sequence(_) => "empty sequence".to_string(),
        _ => "atom".to_string(),
    }
}

/// Parse a pattern body already split from its delimiters/flags into
/// an AST.
pub fn parse(body: &str, delimiter: char, flags: Flags, cfg: ParserConfig) -> Result<Node, crate::core::errors::PcreLabError> {
    if body.len() > cfg.max_pattern_length {
        return Err(ParseError::PatternTooLong(0).into());
    }
    let lexer = Lexer::new(body)?.with_extended(flags.extended);
    let tokens = lexer.tokenize()?;
    let node = Parser::new(tokens, flags, cfg).parse(delimiter)?;
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_body(body: &str) -> Node {
        parse(body, '/', Flags::default(), ParserConfig::default()).unwrap()
    }

    fn unwrap_body(node: Node) -> Node {
        match node {
            Node::Regex(r) => *r.body,
            other => other,
        }
    }

    #[test]
    fn scenario_test_class_quantifier() {
        let node = unwrap_body(parse_body("test[a-z]+"));
        let Node::Sequence(seq) = node else {
            panic!("expected sequence, got {:?}", node_kind(&node));
        };
        assert_eq!(seq.children.len(), 2);
        assert!(matches!(seq.children[0], Node::Literal(_)));
        assert!(matches!(seq.children[1], Node::Quantifier(_)));
    }

    fn node_kind(node: &Node) -> &'static str {
        match node {
            Node::Regex(_) => "Regex",
            Node::Sequence(_) => "Sequence",
            Node::Alternation(_) => "Alternation",
            _ => "other",
        }
    }

    #[test]
    fn capturing_groups_assigned_left_to_right() {
        let node = unwrap_body(parse_body("(a)(b)"));
        let Node::Sequence(seq) = node else {
            panic!("expected sequence");
        };
        let Node::Group(g1) = &seq.children[0] else {
            panic!("expected group");
        };
        let Node::Group(g2) = &seq.children[1] else {
            panic!("expected group");
        };
        assert_eq!(g1.capture_index, Some(1));
        assert_eq!(g2.capture_index, Some(2));
    }

    #[test]
    fn branch_reset_restarts_numbering_per_branch() {
        let node = unwrap_body(parse_body("(?|(a)|(b)(c))"));
        let Node::Group(group) = node else {
            panic!("expected branch-reset group");
        };
        assert_eq!(group.kind, GroupKind::BranchReset);
    }

    #[test]
    fn quantifier_on_assertion_is_rejected() {
        let err = parse("\\b+", '/', Flags::default(), ParserConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            crate::core::errors::PcreLabError::Parse(ParseError::QuantifierOnAssertionOrVerb {
                ..
            })
        ));
    }

    #[test]
    fn brace_quantifier_whitespace_is_stripped() {
        let node = unwrap_body(parse_body("a{ 2 , 3 }"));
        let Node::Quantifier(q) = node else {
            panic!("expected quantifier");
        };
        assert_eq!(q.text, "{2,3}");
        assert_eq!(q.min, 2);
        assert_eq!(q.max, Some(3));
    }

    #[test]
    fn named_group_preserves_bracket_style() {
        let node = unwrap_body(parse_body("(?<word>\\w+)"));
        let Node::Group(g) = node else {
            panic!("expected named group");
        };
        assert_eq!(g.name.as_deref(), Some("word"));
        assert_eq!(g.name_style, Some(NamedGroupStyle::Angle));
    }

    #[test]
    fn conditional_with_lookahead_condition_builds_assertion() {
        let node = unwrap_body(parse_body("(?(?=a)b|c)"));
        let Node::Conditional(cond) = node else {
            panic!("expected conditional");
        };
        assert!(matches!(*cond.condition, Node::Group(ref g) if g.kind == GroupKind::LookaheadPositive));
    }

    #[test]
    fn unclosed_group_reports_expected_close_paren() {
        let err = parse("(abc", '/', Flags::default(), ParserConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            crate::core::errors::PcreLabError::Parse(ParseError::ExpectedCloseParen(_))
        ));
    }

    #[test]
    fn g_quote_subroutine_is_distinct_from_g_angle() {
        let node = unwrap_body(parse_body("(?<x>a)\\g'x'"));
        let Node::Sequence(seq) = node else {
            panic!("expected sequence");
        };
        let Node::Subroutine(sub) = &seq.children[1] else {
            panic!("expected subroutine");
        };
        assert_eq!(sub.marker, SubroutineMarker::GQuote);
    }

    #[test]
    fn quote_mode_literal_is_marked_quoted() {
        let node = unwrap_body(parse_body("\\Qa.b\\E"));
        let Node::Literal(lit) = node else {
            panic!("expected literal");
        };
        assert!(lit.quoted);
        assert_eq!(lit.value, "a.b");
    }
}
