//! Structural optimizer and modernizer.
//!
//! `optimize(ast)` is a rewriting `Visitor<Node>` impl: every rule here is
//! semantics-preserving under PCRE semantics (merging literals, collapsing
//! trivial quantifiers, folding character classes into their shorthand
//! escapes, ...). Unchanged subtrees are returned as an equal clone of the
//! input rather than a freshly built one, preserving reference-identity
//! semantics as closely as a value-typed (non-`Rc`) AST allows.

use crate::core::ast::*;

pub struct Optimizer;

impl Optimizer {
    pub fn new() -> Self {
        Optimizer
    }
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Control characters the lexer already special-cases as
/// `NORMAL_SPECIAL`; an escape on any of these is load-bearing and must
/// never be dropped.
const NEEDS_ESCAPE: &str = ".^$*+?(){}[]|\\";
/// Control-escape letters (`\t \n \r \f \v \e`); dropping the backslash
/// would change which character is matched, not just how it's spelled.
const CONTROL_ESCAPE_LETTERS: &[char] = &['t', 'n', 'r', 'f', 'v', 'e'];

fn is_redundant_escape(ch: char) -> bool {
    !CONTROL_ESCAPE_LETTERS.contains(&ch) && !NEEDS_ESCAPE.contains(ch)
}

/// Whether `node` is a single atom, in the sense that matters for
/// dropping an outer non-capturing group around it: something
/// that already reads as one repeatable unit, so unwrapping the group
/// around it cannot change what an enclosing quantifier would target.
fn is_single_atom(node: &Node) -> bool {
    match node {
        Node::Literal(l) => l.value.chars().count() <= 1,
        Node::Sequence(s) => s.children.is_empty(),
        Node::Alternation(_) => false,
        _ => true,
    }
}

impl Visitor for Optimizer {
    type Output = Node;

    fn visit_regex(&mut self, n: &Regex) -> Node {
        Node::Regex(Regex {
            span: n.span,
            delimiter: n.delimiter,
            flags: n.flags,
            body: Box::new(self.visit(&n.body)),
        })
    }

    fn visit_sequence(&mut self, n: &Sequence) -> Node {
        let rewritten: Vec<Node> = n.children.iter().map(|c| self.visit(c)).collect();
        let merged = merge_adjacent_literals(rewritten);
        if merged.len() == 1 {
            return merged.into_iter().next().expect("len == 1");
        }
        Node::Sequence(Sequence {
            span: n.span,
            children: merged,
        })
    }

    fn visit_alternation(&mut self, n: &Alternation) -> Node {
        let rewritten: Vec<Node> = n.branches.iter().map(|b| self.visit(b)).collect();
        if let Some(class) = fold_alternation_into_class(n.span, &rewritten) {
            return class;
        }
        Node::Alternation(Alternation {
            span: n.span,
            branches: rewritten,
        })
    }

    fn visit_literal(&mut self, n: &Literal) -> Node {
        Node::Literal(n.clone())
    }

    fn visit_char_literal(&mut self, n: &CharLiteral) -> Node {
        if n.kind == CharLiteralKind::Escaped {
            if let Some(ch) = n.raw.strip_prefix('\\').and_then(|s| s.chars().next()) {
                if is_redundant_escape(ch) {
                    return Node::Literal(Literal {
                        span: n.span,
                        value: ch.to_string(),
                        quoted: false,
                    });
                }
            }
        }
        Node::CharLiteral(n.clone())
    }

    fn visit_dot(&mut self, n: &Dot) -> Node {
        Node::Dot(*n)
    }

    fn visit_anchor(&mut self, n: &Anchor) -> Node {
        Node::Anchor(*n)
    }

    fn visit_assertion(&mut self, n: &Assertion) -> Node {
        Node::Assertion(*n)
    }

    fn visit_keep(&mut self, n: &Keep) -> Node {
        Node::Keep(*n)
    }

    fn visit_char_type(&mut self, n: &CharType) -> Node {
        Node::CharType(*n)
    }

    fn visit_unicode_prop(&mut self, n: &UnicodeProp) -> Node {
        Node::UnicodeProp(n.clone())
    }

    fn visit_char_class(&mut self, n: &CharClass) -> Node {
        if let Some(shorthand) = shorthand_for_class(n) {
            return shorthand;
        }
        let rewritten_inner = optimize_char_class_inner(self, &n.inner);
        if rewritten_inner == *n.inner {
            return Node::CharClass(n.clone());
        }
        Node::CharClass(CharClass {
            span: n.span,
            negated: n.negated,
            inner: Box::new(rewritten_inner),
        })
    }

    fn visit_range(&mut self, n: &Range) -> Node {
        Node::Range(n.clone())
    }

    fn visit_posix_class(&mut self, n: &PosixClass) -> Node {
        Node::PosixClass(n.clone())
    }

    fn visit_quantifier(&mut self, n: &Quantifier) -> Node {
        let target = self.visit(&n.target);
        if n.min == 1 && n.max == Some(1) {
            return target;
        }
        Node::Quantifier(Quantifier {
            span: n.span,
            target: Box::new(target),
            text: n.text.clone(),
            min: n.min,
            max: n.max,
            style: n.style,
        })
    }

    fn visit_group(&mut self, n: &Group) -> Node {
        let child = self.visit(&n.child);
        if n.kind == GroupKind::NonCapturing && n.flags.is_none() && is_single_atom(&child) {
            return child;
        }
        Node::Group(Group {
            span: n.span,
            kind: n.kind,
            child: Box::new(child),
            name: n.name.clone(),
            capture_index: n.capture_index,
            flags: n.flags.clone(),
            name_style: n.name_style,
        })
    }

    fn visit_backref(&mut self, n: &Backref) -> Node {
        Node::Backref(n.clone())
    }

    fn visit_subroutine(&mut self, n: &Subroutine) -> Node {
        Node::Subroutine(n.clone())
    }

    fn visit_conditional(&mut self, n: &Conditional) -> Node {
        Node::Conditional(Conditional {
            span: n.span,
            condition: Box::new(self.visit(&n.condition)),
            then_branch: Box::new(self.visit(&n.then_branch)),
            else_branch: Box::new(self.visit(&n.else_branch)),
        })
    }

    fn visit_callout(&mut self, n: &Callout) -> Node {
        Node::Callout(n.clone())
    }

    fn visit_pcre_verb(&mut self, n: &PcreVerb) -> Node {
        Node::PcreVerb(n.clone())
    }

    fn visit_comment(&mut self, n: &Comment) -> Node {
        Node::Comment(n.clone())
    }
}

/// Merges consecutive unquoted `Literal` siblings into one, the way the
/// recompiler's output would already read if the lexer had produced a
/// single token for them.
fn merge_adjacent_literals(children: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(children.len());
    for child in children {
        if let (Some(Node::Literal(prev)), Node::Literal(cur)) = (out.last(), &child) {
            if !prev.quoted && !cur.quoted {
                let span = Span::new(prev.span.start_offset, cur.span.end_offset);
                let mut value = prev.value.clone();
                value.push_str(&cur.value);
                let merged = Node::Literal(Literal {
                    span,
                    value,
                    quoted: false,
                });
                *out.last_mut().expect("checked Some above") = merged;
                continue;
            }
        }
        out.push(child);
    }
    out
}

/// Single codepoint an endpoint-shaped node denotes, for folding three
/// or more consecutive singleton characters into a range.
fn singleton_codepoint(node: &Node) -> Option<u32> {
    match node {
        Node::Literal(l) if l.value.chars().count() == 1 && !l.quoted => {
            l.value.chars().next().map(|c| c as u32)
        }
        _ => None,
    }
}

/// Collapses maximal runs of three-or-more consecutive-codepoint
/// singleton literals inside a character class into a `Range`. A run of
/// exactly two is left alone: a two-character range saves nothing over
/// the two literals it would replace.
fn optimize_char_class_inner<V: Visitor<Output = Node>>(visitor: &mut V, inner: &Node) -> Node {
    let items: Vec<Node> = match inner {
        Node::Sequence(seq) => seq.children.iter().map(|c| visitor.visit(c)).collect(),
        other => vec![visitor.visit(other)],
    };

    let mut out: Vec<Node> = Vec::with_capacity(items.len());
    let mut i = 0;
    while i < items.len() {
        let start_cp = singleton_codepoint(&items[i]);
        if let Some(start) = start_cp {
            let mut j = i + 1;
            let mut prev = start;
            while j < items.len() {
                match singleton_codepoint(&items[j]) {
                    Some(cp) if cp == prev + 1 => {
                        prev = cp;
                        j += 1;
                    }
                    _ => break,
                }
            }
            let run_len = j - i;
            if run_len >= 3 {
                let first = &items[i];
                let last = &items[j - 1];
                let span = Span::new(first.span().start_offset, last.span().end_offset);
                out.push(Node::Range(Range {
                    span,
                    start: Box::new(first.clone()),
                    end: Box::new(last.clone()),
                }));
                i = j;
                continue;
            }
        }
        out.push(items[i].clone());
        i += 1;
    }

    if out.len() == 1 {
        return out.into_iter().next().expect("len == 1");
    }
    let span = inner.span();
    Node::Sequence(Sequence {
        span,
        children: out,
    })
}

/// Character items making up a non-range class endpoint, used to match
/// the fixed `[0-9]` / `[A-Za-z0-9_]`-style shorthand table regardless
/// of the order the ranges/literals were written in.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ClassItemKey {
    Range(u32, u32),
    Char(char),
}

fn class_item_keys(inner: &Node) -> Option<Vec<ClassItemKey>> {
    let children: Vec<&Node> = match inner {
        Node::Sequence(seq) => seq.children.iter().collect(),
        other => vec![other],
    };
    let mut keys = Vec::with_capacity(children.len());
    for child in children {
        let key = match child {
            Node::Range(r) => {
                let (Some(s), Some(e)) = (range_endpoint(&r.start), range_endpoint(&r.end)) else {
                    return None;
                };
                ClassItemKey::Range(s, e)
            }
            Node::Literal(l) if l.value.chars().count() == 1 => {
                ClassItemKey::Char(l.value.chars().next().expect("len == 1"))
            }
            _ => return None,
        };
        keys.push(key);
    }
    Some(keys)
}

fn range_endpoint(node: &Node) -> Option<u32> {
    match node {
        Node::Literal(l) => l.value.chars().next().map(|c| c as u32),
        Node::CharLiteral(c) => Some(c.codepoint),
        _ => None,
    }
}

fn same_set(a: &[ClassItemKey], b: &[ClassItemKey]) -> bool {
    a.len() == b.len() && a.iter().all(|item| b.contains(item))
}

/// Folds a recognized character class into its `\d`/`\D`/`\w`/`\W`
/// shorthand, or `None` if the class doesn't exactly match one of the
/// recognized shapes.
fn shorthand_for_class(n: &CharClass) -> Option<Node> {
    let keys = class_item_keys(&n.inner)?;
    let digits = [ClassItemKey::Range('0' as u32, '9' as u32)];
    let word = [
        ClassItemKey::Range('A' as u32, 'Z' as u32),
        ClassItemKey::Range('a' as u32, 'z' as u32),
        ClassItemKey::Range('0' as u32, '9' as u32),
        ClassItemKey::Char('_'),
    ];
    let letter = if same_set(&keys, &digits) {
        if n.negated {
            'D'
        } else {
            'd'
        }
    } else if same_set(&keys, &word) {
        if n.negated {
            'W'
        } else {
            'w'
        }
    } else {
        return None;
    };
    Some(Node::CharType(CharType {
        span: n.span,
        letter,
    }))
}

/// Characters that are meta inside a character class even when they
/// were plain literals outside one; an alternation branch using one of
/// these can't be folded into `[...]` without re-escaping it, so the
/// fold is simply skipped for those branches.
const CLASS_META: &[char] = &['^', ']', '-', '\\'];

/// Converts `a|b|c` into `[abc]` only when every branch is exactly one
/// non-meta literal character.
fn fold_alternation_into_class(span: Span, branches: &[Node]) -> Option<Node> {
    if branches.len() < 2 {
        return None;
    }
    let mut items = Vec::with_capacity(branches.len());
    for branch in branches {
        let Node::Literal(l) = branch else {
            return None;
        };
        if l.quoted {
            return None;
        }
        let mut chars = l.value.chars();
        let (Some(ch), None) = (chars.next(), chars.next()) else {
            return None;
        };
        if CLASS_META.contains(&ch) {
            return None;
        }
        items.push(Node::Literal(l.clone()));
    }
    let inner = if items.len() == 1 {
        items.into_iter().next().expect("len == 1")
    } else {
        Node::Sequence(Sequence {
            span,
            children: items,
        })
    };
    Some(Node::CharClass(CharClass {
        span,
        negated: false,
        inner: Box::new(inner),
    }))
}

/// Optimize `ast` into a semantically equivalent, more idiomatic form.
pub fn optimize(ast: &Node) -> Node {
    Optimizer::new().visit(ast)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ParserConfig;
    use crate::core::parser::parse;
    use crate::core::recompiler::recompile;

    fn optimized_text(body: &str) -> String {
        let ast = parse(body, '/', Flags::default(), ParserConfig::default()).unwrap();
        recompile(&optimize(&ast))
    }

    #[test]
    fn digits_class_becomes_d() {
        assert_eq!(optimized_text("[0-9]+"), "/\\d+/");
    }

    #[test]
    fn negated_digits_class_becomes_cap_d() {
        assert_eq!(optimized_text("[^0-9]"), "/\\D/");
    }

    #[test]
    fn word_class_becomes_w_regardless_of_order() {
        assert_eq!(optimized_text("[0-9A-Za-z_]"), "/\\w/");
    }

    #[test]
    fn redundant_escape_is_dropped() {
        assert_eq!(optimized_text(r"\@name\:"), "/@name:/");
    }

    #[test]
    fn two_char_range_is_not_created() {
        assert_eq!(optimized_text("[=>]"), "/[=>]/");
    }

    #[test]
    fn three_singletons_fold_into_range() {
        assert_eq!(optimized_text("[abc]"), "/[a-c]/");
    }

    #[test]
    fn trivial_quantifier_is_collapsed() {
        assert_eq!(optimized_text("a{1}"), "/a/");
        assert_eq!(optimized_text("a{1,1}"), "/a/");
    }

    #[test]
    fn outer_non_capturing_group_around_single_atom_is_dropped() {
        assert_eq!(optimized_text("(?:a)"), "/a/");
    }

    #[test]
    fn non_capturing_group_around_multi_char_literal_is_kept() {
        // Dropping this one would change what `+` repeats.
        assert_eq!(optimized_text("(?:ab)+"), "/(?:ab)+/");
    }

    #[test]
    fn alternation_of_single_chars_becomes_class() {
        assert_eq!(optimized_text("a|b|c"), "/[abc]/");
    }

    #[test]
    fn control_escape_is_preserved() {
        assert_eq!(optimized_text(r"\t"), "/\\t/");
    }
}
