//! PCRE AST node model and visitor protocol.
//!
//! The AST is a closed sum of node variants, each carrying the source
//! span (`start_offset`/`end_offset`, byte offsets into the pattern
//! body) it was parsed from. Nodes are treated as immutable once built:
//! rewriting visitors (the optimizer, the modernizer) return freshly
//! constructed replacement subtrees rather than mutating in place.
//! Every variant is tagged with `#[serde(tag = "type")]` so the dumper
//! and CLI can emit a JSON AST directly from the derive, and every
//! walk over the tree goes through the single `Visitor<R>` trait below
//! rather than a per-node inherent method.

use serde::{Deserialize, Serialize};

/// Closed set of AST node variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    Regex(Regex),
    Sequence(Sequence),
    Alternation(Alternation),
    Literal(Literal),
    CharLiteral(CharLiteral),
    Dot(Dot),
    Anchor(Anchor),
    Assertion(Assertion),
    Keep(Keep),
    CharType(CharType),
    UnicodeProp(UnicodeProp),
    CharClass(CharClass),
    Range(Range),
    PosixClass(PosixClass),
    Quantifier(Quantifier),
    Group(Group),
    Backref(Backref),
    Subroutine(Subroutine),
    Conditional(Conditional),
    Callout(Callout),
    PcreVerb(PcreVerb),
    Comment(Comment),
}

/// Every node's source span, in bytes, within the pattern body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start_offset: usize,
    pub end_offset: usize,
}

impl Span {
    pub fn new(start_offset: usize, end_offset: usize) -> Self {
        Span {
            start_offset,
            end_offset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Regex {
    pub span: Span,
    pub delimiter: char,
    pub flags: Flags,
    pub body: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    pub span: Span,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternation {
    pub span: Span,
    pub branches: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Literal {
    pub span: Span,
    pub value: String,
    /// Whether this literal was written inside a `\Q...\E` quoted run.
    /// The recompiler re-wraps the value in `\Q...\E` when set, rather
    /// than emitting it as bare text.
    #[serde(default)]
    pub quoted: bool,
}

/// Variant tag for codepoint-denoting escapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharLiteralKind {
    Hex,         // \xHH
    BraceHex,    // \x{...}
    BraceUnicode, // \u{...}
    Named,       // \N{NAME}
    Octal,       // \o{...}
    LegacyOctal, // \0NN
    /// A single backslashed character that resolves to a literal: the
    /// control escapes (`\t \n \r \f \v \e`) and the general identity-
    /// escape rule ("a backslashed metacharacter becomes literal").
    Escaped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharLiteral {
    pub span: Span,
    pub raw: String,
    pub codepoint: u32,
    pub kind: CharLiteralKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dot {
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnchorKind {
    StartOfLine, // ^
    EndOfLine,   // $
    AbsoluteStart, // \A
    AbsoluteEnd, // \z
    EndBeforeFinalNewline, // \Z
    PreviousMatchEnd, // \G
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    pub span: Span,
    pub kind: AnchorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssertionKind {
    WordBoundary,    // \b
    NotWordBoundary, // \B
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assertion {
    pub span: Span,
    pub kind: AssertionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keep {
    pub span: Span,
}

/// `\d \D \w \W \s \S \h \H \v \V \R \X \C \N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharType {
    pub span: Span,
    pub letter: char,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnicodeProp {
    pub span: Span,
    pub name: String,
    pub negated: bool,
    /// Whether the original source used the short single-letter form
    /// (`\pL`) rather than the braced form (`\p{...}`).
    pub short_form: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharClass {
    pub span: Span,
    pub negated: bool,
    pub inner: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub span: Span,
    pub start: Box<Node>,
    pub end: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosixClass {
    pub span: Span,
    pub name: String,
    pub negated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuantifierStyle {
    Greedy,
    Lazy,
    Possessive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantifier {
    pub span: Span,
    pub target: Box<Node>,
    /// Canonical textual form, e.g. `*`, `+`, `?`, `{2,3}` (interior
    /// whitespace stripped).
    pub text: String,
    pub min: u32,
    pub max: Option<u32>,
    pub style: QuantifierStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupKind {
    Capturing,
    NonCapturing,
    Named,
    Atomic,
    BranchReset,
    LookaheadPositive,
    LookaheadNegative,
    LookbehindPositive,
    LookbehindNegative,
    InlineFlags,
    ScriptRun,
    AtomicScriptRun,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagDelta {
    pub set_flags: String,
    pub clear_flags: String,
}

/// Which of PCRE's three equivalent bracket spellings introduced a
/// named group (`(?<name>...)`, `(?'name'...)`, `(?P<name>...)`). Kept
/// on the node so the recompiler can reproduce the source spelling
/// exactly instead of canonicalizing to one form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NamedGroupStyle {
    Angle,  // (?<name>...)
    Quote,  // (?'name'...)
    PAngle, // (?P<name>...)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub span: Span,
    pub kind: GroupKind,
    pub child: Box<Node>,
    pub name: Option<String>,
    /// Capturing-group index, assigned left-to-right during parsing.
    /// `None` for non-capturing kinds.
    pub capture_index: Option<u32>,
    pub flags: Option<FlagDelta>,
    /// Set only when `kind == Named`.
    pub name_style: Option<NamedGroupStyle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackrefForm {
    Numeric,     // \1, \10
    GBraced,     // \g{n}
    GBracedNeg,  // \g{-n}
    GBare,       // \gN / \g-N (no braces)
    KAngle,      // \k<name>
    KBraced,     // \k{name}
    KQuoted,     // \k'name'
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backref {
    pub span: Span,
    pub form: BackrefForm,
    pub by_index: Option<i32>,
    pub by_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubroutineMarker {
    Ampersand, // (?&name)
    PGreater,  // (?P>name)
    GAngle,    // \g<name>
    GQuote,    // \g'name'
    Bare,      // (?n)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subroutine {
    pub span: Span,
    pub by_index: Option<i32>,
    pub by_name: Option<String>,
    pub marker: SubroutineMarker,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditional {
    pub span: Span,
    pub condition: Box<Node>,
    pub then_branch: Box<Node>,
    pub else_branch: Box<Node>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalloutIdentifier {
    Numeric(u32),
    QuotedString,
    BareIdentifier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Callout {
    pub span: Span,
    pub identifier_kind: CalloutIdentifier,
    pub text: String,
    pub variant: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcreVerb {
    pub span: Span,
    pub name: String,
    pub argument: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub span: Span,
    pub text: String,
}

/// Recognized modifier flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Flags {
    pub ignore_case: bool,      // i
    pub multiline: bool,        // m
    pub dot_all: bool,          // s
    pub extended: bool,         // x
    pub unicode: bool,          // u
    pub ungreedy: bool,         // U
    pub duplicate_names: bool,  // J
    pub no_auto_capture: bool,  // n
    pub anchored: bool,         // A
}

impl Flags {
    pub fn from_letters(letters: &str) -> Result<Self, char> {
        let mut f = Flags::default();
        for ch in letters.chars() {
            match ch {
                'i' => f.ignore_case = true,
                'm' => f.multiline = true,
                's' => f.dot_all = true,
                'x' => f.extended = true,
                'u' => f.unicode = true,
                'U' => f.ungreedy = true,
                'J' => f.duplicate_names = true,
                'n' => f.no_auto_capture = true,
                'A' => f.anchored = true,
                other => return Err(other),
            }
        }
        Ok(f)
    }

    pub fn to_letters(self) -> String {
        let mut s = String::new();
        if self.ignore_case {
            s.push('i');
        }
        if self.multiline {
            s.push('m');
        }
        if self.dot_all {
            s.push('s');
        }
        if self.extended {
            s.push('x');
        }
        if self.unicode {
            s.push('u');
        }
        if self.ungreedy {
            s.push('U');
        }
        if self.duplicate_names {
            s.push('J');
        }
        if self.no_auto_capture {
            s.push('n');
        }
        if self.anchored {
            s.push('A');
        }
        s
    }

    /// Apply an inline flag delta (`(?i-m)`-style), returning the
    /// resulting flag set.
    pub fn apply_delta(self, delta: &FlagDelta) -> Result<Self, char> {
        let mut f = self;
        for ch in delta.set_flags.chars() {
            f = apply_one(f, ch, true)?;
        }
        for ch in delta.clear_flags.chars() {
            f = apply_one(f, ch, false)?;
        }
        Ok(f)
    }
}

fn apply_one(mut f: Flags, ch: char, value: bool) -> Result<Flags, char> {
    match ch {
        'i' => f.ignore_case = value,
        'm' => f.multiline = value,
        's' => f.dot_all = value,
        'x' => f.extended = value,
        'u' => f.unicode = value,
        'U' => f.ungreedy = value,
        'J' => f.duplicate_names = value,
        'n' => f.no_auto_capture = value,
        'A' => f.anchored = value,
        other => return Err(other),
    }
    Ok(f)
}

impl Node {
    /// The span every node variant carries.
    pub fn span(&self) -> Span {
        match self {
            Node::Regex(n) => n.span,
            Node::Sequence(n) => n.span,
            Node::Alternation(n) => n.span,
            Node::Literal(n) => n.span,
            Node::CharLiteral(n) => n.span,
            Node::Dot(n) => n.span,
            Node::Anchor(n) => n.span,
            Node::Assertion(n) => n.span,
            Node::Keep(n) => n.span,
            Node::CharType(n) => n.span,
            Node::UnicodeProp(n) => n.span,
            Node::CharClass(n) => n.span,
            Node::Range(n) => n.span,
            Node::PosixClass(n) => n.span,
            Node::Quantifier(n) => n.span,
            Node::Group(n) => n.span,
            Node::Backref(n) => n.span,
            Node::Subroutine(n) => n.span,
            Node::Conditional(n) => n.span,
            Node::Callout(n) => n.span,
            Node::PcreVerb(n) => n.span,
            Node::Comment(n) => n.span,
        }
    }

    /// Direct children of this node, in source order. Shared by every
    /// visitor that needs a generic walk (validator, complexity scorer,
    /// dumper, graph builder) instead of re-deriving the variant's shape.
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Node::Regex(n) => vec![n.body.as_ref()],
            Node::Sequence(n) => n.children.iter().collect(),
            Node::Alternation(n) => n.branches.iter().collect(),
            Node::CharClass(n) => vec![n.inner.as_ref()],
            Node::Range(n) => vec![n.start.as_ref(), n.end.as_ref()],
            Node::Quantifier(n) => vec![n.target.as_ref()],
            Node::Group(n) => vec![n.child.as_ref()],
            Node::Conditional(n) => vec![
                n.condition.as_ref(),
                n.then_branch.as_ref(),
                n.else_branch.as_ref(),
            ],
            Node::Literal(_)
            | Node::CharLiteral(_)
            | Node::Dot(_)
            | Node::Anchor(_)
            | Node::Assertion(_)
            | Node::Keep(_)
            | Node::CharType(_)
            | Node::UnicodeProp(_)
            | Node::PosixClass(_)
            | Node::Backref(_)
            | Node::Subroutine(_)
            | Node::Callout(_)
            | Node::PcreVerb(_)
            | Node::Comment(_) => vec![],
        }
    }

    /// Whether this node may never be the direct target of a quantifier.
    /// A non-capturing group with a wholly empty body (`(?:)`) counts as
    /// an empty sequence for this purpose,
    /// since it contributes nothing a quantifier could repeat.
    pub fn rejects_quantifier(&self) -> bool {
        if matches!(
            self,
            Node::Anchor(_)
                | Node::Assertion(_)
                | Node::PcreVerb(_)
                | Node::Keep(_)
                | Node::Comment(_)
                | Node::Callout(_)
        ) {
            return true;
        }
        if matches!(self, Node::Sequence(s) if s.children.is_empty()) {
            return true;
        }
        if let Node::Group(g) = self {
            if g.kind == GroupKind::NonCapturing {
                if let Node::Sequence(s) = g.child.as_ref() {
                    return s.children.is_empty();
                }
            }
        }
        false
    }

    /// Whether this is the "nothing here to repeat" shape (an empty
    /// sequence, or an empty non-capturing group) rather than a true
    /// assertion/verb/comment/callout that merely can't take a
    /// quantifier. Only meaningful when `rejects_quantifier()` is true;
    /// used to pick between "quantifier without target" and "quantifier
    /// on assertion or verb" diagnostics.
    pub fn is_empty_quantifier_target(&self) -> bool {
        if matches!(self, Node::Sequence(s) if s.children.is_empty()) {
            return true;
        }
        if let Node::Group(g) = self {
            if g.kind == GroupKind::NonCapturing {
                if let Node::Sequence(s) = g.child.as_ref() {
                    return s.children.is_empty();
                }
            }
        }
        false
    }
}

/// One visit-dispatch method per node variant. The result type is a
/// function of the visitor, not of the node: implementors
/// pick their own `Output` (e.g. `String` for the recompiler, `Node`
/// for the optimizer, `()` for the validator).
pub trait Visitor {
    type Output;

    fn visit(&mut self, node: &Node) -> Self::Output {
        match node {
            Node::Regex(n) => self.visit_regex(n),
            Node::Sequence(n) => self.visit_sequence(n),
            Node::Alternation(n) => self.visit_alternation(n),
            Node::Literal(n) => self.visit_literal(n),
            Node::CharLiteral(n) => self.visit_char_literal(n),
            Node::Dot(n) => self.visit_dot(n),
            Node::Anchor(n) => self.visit_anchor(n),
            Node::Assertion(n) => self.visit_assertion(n),
            Node::Keep(n) => self.visit_keep(n),
            Node::CharType(n) => self.visit_char_type(n),
            Node::UnicodeProp(n) => self.visit_unicode_prop(n),
            Node::CharClass(n) => self.visit_char_class(n),
            Node::Range(n) => self.visit_range(n),
            Node::PosixClass(n) => self.visit_posix_class(n),
            Node::Quantifier(n) => self.visit_quantifier(n),
            Node::Group(n) => self.visit_group(n),
            Node::Backref(n) => self.visit_backref(n),
            Node::Subroutine(n) => self.visit_subroutine(n),
            Node::Conditional(n) => self.visit_conditional(n),
            Node::Callout(n) => self.visit_callout(n),
            Node::PcreVerb(n) => self.visit_pcre_verb(n),
            Node::Comment(n) => self.visit_comment(n),
        }
    }

    fn visit_regex(&mut self, n: &Regex) -> Self::Output;
    fn visit_sequence(&mut self, n: &Sequence) -> Self::Output;
    fn visit_alternation(&mut self, n: &Alternation) -> Self::Output;
    fn visit_literal(&mut self, n: &Literal) -> Self::Output;
    fn visit_char_literal(&mut self, n: &CharLiteral) -> Self::Output;
    fn visit_dot(&mut self, n: &Dot) -> Self::Output;
    fn visit_anchor(&mut self, n: &Anchor) -> Self::Output;
    fn visit_assertion(&mut self, n: &Assertion) -> Self::Output;
    fn visit_keep(&mut self, n: &Keep) -> Self::Output;
    fn visit_char_type(&mut self, n: &CharType) -> Self::Output;
    fn visit_unicode_prop(&mut self, n: &UnicodeProp) -> Self::Output;
    fn visit_char_class(&mut self, n: &CharClass) -> Self::Output;
    fn visit_range(&mut self, n: &Range) -> Self::Output;
    fn visit_posix_class(&mut self, n: &PosixClass) -> Self::Output;
    fn visit_quantifier(&mut self, n: &Quantifier) -> Self::Output;
    fn visit_group(&mut self, n: &Group) -> Self::Output;
    fn visit_backref(&mut self, n: &Backref) -> Self::Output;
    fn visit_subroutine(&mut self, n: &Subroutine) -> Self::Output;
    fn visit_conditional(&mut self, n: &Conditional) -> Self::Output;
    fn visit_callout(&mut self, n: &Callout) -> Self::Output;
    fn visit_pcre_verb(&mut self, n: &PcreVerb) -> Self::Output;
    fn visit_comment(&mut self, n: &Comment) -> Self::Output;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_round_trip_through_letters() {
        let flags = Flags::from_letters("imsuxUJnA").unwrap();
        assert!(flags.ignore_case && flags.multiline && flags.dot_all);
        assert!(flags.unicode && flags.ungreedy && flags.duplicate_names);
        assert!(flags.no_auto_capture && flags.anchored);
        assert_eq!(flags.to_letters(), "imsuxUJnA");
    }

    #[test]
    fn unknown_flag_rejected() {
        assert_eq!(Flags::from_letters("k"), Err('k'));
    }

    #[test]
    fn empty_sequence_rejects_quantifier() {
        let seq = Node::Sequence(Sequence {
            span: Span::new(0, 0),
            children: vec![],
        });
        assert!(seq.rejects_quantifier());
    }
}
