//! Recompiler: AST back to pattern text.
//!
//! `recompile(ast)` must satisfy `recompile(parse(p)) == p` byte-for-byte
//! except two documented canonicalizations: interior whitespace in brace
//! quantifiers is stripped (`parser.rs` already bakes this into
//! `Quantifier.text`, so the recompiler just emits it verbatim), and the
//! flags suffix is re-ordered into the canonical `imsxuUJnA` sequence via
//! `Flags::to_letters`. A per-node match-and-format walk with no
//! IR-lowering or re-escaping step needed: literal runs are already
//! un-escaped by the lexer's `NORMAL_SPECIAL` split, so nothing here
//! re-escapes them.

use crate::core::ast::*;
use crate::core::splitter::closing_for;

pub struct Recompiler;

impl Recompiler {
    pub fn new() -> Self {
        Recompiler
    }
}

impl Default for Recompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Visitor for Recompiler {
    type Output = String;

    fn visit_regex(&mut self, n: &Regex) -> String {
        let body = self.visit(&n.body);
        let closing = closing_for(n.delimiter);
        format!("{}{}{}{}", n.delimiter, body, closing, n.flags.to_letters())
    }

    fn visit_sequence(&mut self, n: &Sequence) -> String {
        n.children.iter().map(|c| self.visit(c)).collect()
    }

    fn visit_alternation(&mut self, n: &Alternation) -> String {
        n.branches
            .iter()
            .map(|b| self.visit(b))
            .collect::<Vec<_>>()
            .join("|")
    }

    fn visit_literal(&mut self, n: &Literal) -> String {
        if n.quoted {
            format!("\\Q{}\\E", n.value)
        } else {
            n.value.clone()
        }
    }

    fn visit_char_literal(&mut self, n: &CharLiteral) -> String {
        n.raw.clone()
    }

    fn visit_dot(&mut self, _n: &Dot) -> String {
        ".".to_string()
    }

    fn visit_anchor(&mut self, n: &Anchor) -> String {
        match n.kind {
            AnchorKind::StartOfLine => "^".to_string(),
            AnchorKind::EndOfLine => "$".to_string(),
            AnchorKind::AbsoluteStart => "\\A".to_string(),
            AnchorKind::AbsoluteEnd => "\\z".to_string(),
            AnchorKind::EndBeforeFinalNewline => "\\Z".to_string(),
            AnchorKind::PreviousMatchEnd => "\\G".to_string(),
        }
    }

    fn visit_assertion(&mut self, n: &Assertion) -> String {
        match n.kind {
            AssertionKind::WordBoundary => "\\b".to_string(),
            AssertionKind::NotWordBoundary => "\\B".to_string(),
        }
    }

    fn visit_keep(&mut self, _n: &Keep) -> String {
        "\\K".to_string()
    }

    fn visit_char_type(&mut self, n: &CharType) -> String {
        format!("\\{}", n.letter)
    }

    fn visit_unicode_prop(&mut self, n: &UnicodeProp) -> String {
        let letter = if n.negated { 'P' } else { 'p' };
        if n.short_form {
            format!("\\{}{}", letter, n.name)
        } else {
            format!("\\{}{{{}}}", letter, n.name)
        }
    }

    fn visit_char_class(&mut self, n: &CharClass) -> String {
        let inner = self.visit(&n.inner);
        if n.negated {
            format!("[^{}]", inner)
        } else {
            format!("[{}]", inner)
        }
    }

    fn visit_range(&mut self, n: &Range) -> String {
        format!("{}-{}", self.visit(&n.start), self.visit(&n.end))
    }

    fn visit_posix_class(&mut self, n: &PosixClass) -> String {
        if n.negated {
            format!("[:^{}:]", n.name)
        } else {
            format!("[:{}:]", n.name)
        }
    }

    fn visit_quantifier(&mut self, n: &Quantifier) -> String {
        format!("{}{}", self.visit(&n.target), n.text)
    }

    fn visit_group(&mut self, n: &Group) -> String {
        let body = self.visit(&n.child);
        match n.kind {
            GroupKind::Capturing => format!("({})", body),
            GroupKind::NonCapturing => format!("(?:{})", body),
            GroupKind::Named => {
                let name = n.name.as_deref().unwrap_or("");
                match n.name_style {
                    Some(NamedGroupStyle::Quote) => format!("(?'{}'{})", name, body),
                    Some(NamedGroupStyle::PAngle) => format!("(?P<{}>{})", name, body),
                    _ => format!("(?<{}>{})", name, body),
                }
            }
            GroupKind::Atomic => format!("(?>{})", body),
            GroupKind::BranchReset => format!("(?|{})", body),
            GroupKind::LookaheadPositive => format!("(?={})", body),
            GroupKind::LookaheadNegative => format!("(?!{})", body),
            GroupKind::LookbehindPositive => format!("(?<={})", body),
            GroupKind::LookbehindNegative => format!("(?<!{})", body),
            GroupKind::InlineFlags => {
                let delta = n.flags.clone().unwrap_or(FlagDelta {
                    set_flags: String::new(),
                    clear_flags: String::new(),
                });
                let spec = render_flag_delta(&delta);
                if is_positional_flags(n) {
                    format!("(?{})", spec)
                } else {
                    format!("(?{}:{})", spec, body)
                }
            }
            GroupKind::ScriptRun => format!("(*script_run:{})", body),
            GroupKind::AtomicScriptRun => format!("(*atomic_script_run:{})", body),
        }
    }

    fn visit_backref(&mut self, n: &Backref) -> String {
        match n.form {
            BackrefForm::Numeric => format!("\\{}", n.by_index.unwrap_or(0)),
            BackrefForm::GBraced => format!("\\g{{{}}}", n.by_index.unwrap_or(0)),
            BackrefForm::GBracedNeg => format!("\\g{{{}}}", n.by_index.unwrap_or(0)),
            BackrefForm::GBare => format!("\\g{}", n.by_index.unwrap_or(0)),
            BackrefForm::KAngle => format!("\\k<{}>", n.by_name.as_deref().unwrap_or("")),
            BackrefForm::KBraced => format!("\\k{{{}}}", n.by_name.as_deref().unwrap_or("")),
            BackrefForm::KQuoted => format!("\\k'{}'", n.by_name.as_deref().unwrap_or("")),
        }
    }

    fn visit_subroutine(&mut self, n: &Subroutine) -> String {
        match n.marker {
            SubroutineMarker::Ampersand => format!("(?&{})", n.by_name.as_deref().unwrap_or("")),
            SubroutineMarker::PGreater => format!("(?P>{})", n.by_name.as_deref().unwrap_or("")),
            SubroutineMarker::GAngle => format!("\\g<{}>", render_sub_target(n)),
            SubroutineMarker::GQuote => format!("\\g'{}'", render_sub_target(n)),
            SubroutineMarker::Bare => {
                if n.by_index == Some(0) {
                    "(?R)".to_string()
                } else {
                    format!("(?{})", n.by_index.unwrap_or(0))
                }
            }
        }
    }

    fn visit_conditional(&mut self, n: &Conditional) -> String {
        let condition = render_condition(&n.condition);
        let then_branch = self.visit(&n.then_branch);
        if is_empty_body(&n.else_branch) {
            format!("(?{}{})", condition, then_branch)
        } else {
            let else_branch = self.visit(&n.else_branch);
            format!("(?{}{}|{})", condition, then_branch, else_branch)
        }
    }

    fn visit_callout(&mut self, n: &Callout) -> String {
        match n.identifier_kind {
            CalloutIdentifier::Numeric(num) => {
                if num == 0 && n.text.is_empty() {
                    "(?C)".to_string()
                } else {
                    format!("(?C{})", num)
                }
            }
            CalloutIdentifier::QuotedString => format!("(?C\"{}\")", n.variant),
            CalloutIdentifier::BareIdentifier => format!("(?C{})", n.text),
        }
    }

    fn visit_pcre_verb(&mut self, n: &PcreVerb) -> String {
        match &n.argument {
            Some(arg) => format!("(*{}:{})", n.name, arg),
            None => format!("(*{})", n.name),
        }
    }

    fn visit_comment(&mut self, n: &Comment) -> String {
        format!("(?#{})", n.text)
    }
}

fn is_empty_body(node: &Node) -> bool {
    matches!(node, Node::Sequence(s) if s.children.is_empty())
}

/// Positional inline flags (`(?i)`) leave no separate `)` token to
/// consume after the child: the parser gives the (always-empty) child a
/// zero-width span sitting exactly at the group's own end offset. Scoped
/// inline flags (`(?i:...)`, including the empty-body `(?i:)`) always
/// consume one more byte — the closing `)` — after the child's span, so
/// the group's end offset sits one past it. This lets the recompiler
/// recover the distinction without a dedicated AST field.
fn is_positional_flags(group: &Group) -> bool {
    group.span.end_offset == group.child.span().end_offset
}

fn render_flag_delta(delta: &FlagDelta) -> String {
    if delta.clear_flags.is_empty() {
        delta.set_flags.clone()
    } else {
        format!("{}-{}", delta.set_flags, delta.clear_flags)
    }
}

fn render_sub_target(n: &Subroutine) -> String {
    match (&n.by_name, n.by_index) {
        (Some(name), _) => name.clone(),
        (None, Some(idx)) => idx.to_string(),
        (None, None) => String::new(),
    }
}

/// Renders a conditional's condition back into the bracketed form that
/// opens `(?(...)` — the lookaround forms recompile their synthetic
/// condition `Group` directly; the reference forms re-derive their
/// original bracket spelling from the node's `BackrefForm`/marker.
fn render_condition(condition: &Node) -> String {
    match condition {
        Node::Group(g) if matches!(g.kind, GroupKind::LookaheadPositive | GroupKind::LookaheadNegative | GroupKind::LookbehindPositive | GroupKind::LookbehindNegative) => {
            let mut recompiler = Recompiler::new();
            recompiler.visit(condition)
        }
        Node::Literal(l) => format!("({})", l.value),
        Node::Backref(b) => match &b.by_name {
            Some(name) => match b.form {
                BackrefForm::KQuoted => format!("('{}')", name),
                _ => format!("(<{}>)", name),
            },
            None => format!("({})", b.by_index.unwrap_or(0)),
        },
        Node::Subroutine(s) => match &s.by_name {
            Some(name) => format!("(R&{})", name),
            None => match s.by_index {
                Some(0) | None => "(R)".to_string(),
                Some(idx) => format!("(R{})", idx),
            },
        },
        other => {
            let mut recompiler = Recompiler::new();
            format!("({})", recompiler.visit(other))
        }
    }
}

/// Recompile an AST back into its source pattern text.
pub fn recompile(ast: &Node) -> String {
    Recompiler::new().visit(ast)
}
