//! Semantic validator.
//!
//! Runs after a successful parse: structurally valid syntax can still
//! reference a group that doesn't exist, declare two groups under the
//! same name, or put a variable-length body inside a lookbehind. This
//! pass walks the AST once to collect every capturing group's index
//! and name, then walks it again checking every node that makes a
//! claim against that table.

use crate::core::ast::*;
use crate::core::errors::SemanticError;
use crate::core::lookbehind;
use crate::core::unicode_props;
use std::collections::{HashMap, HashSet};

/// Declared capturing groups, gathered in a single walk before any
/// reference is checked.
#[derive(Debug, Default)]
struct Declarations {
    max_index: u32,
    names: HashMap<String, u32>,
    duplicate_names: HashSet<String>,
}

fn collect(node: &Node, decls: &mut Declarations) {
    if let Node::Group(g) = node {
        if let Some(idx) = g.capture_index {
            decls.max_index = decls.max_index.max(idx);
            if let Some(name) = &g.name {
                if decls.names.insert(name.clone(), idx).is_some() {
                    decls.duplicate_names.insert(name.clone());
                }
            }
        }
    }
    for child in node.children() {
        collect(child, decls);
    }
}

/// Checks every reference-bearing node against `decls`, and structural
/// rules (`\R` in a class, range ordering, callout identifiers,
/// lookbehind fixed-length) that don't need the declaration table.
struct Checker<'a> {
    decls: &'a Declarations,
    allow_duplicate_names: bool,
    error: Option<SemanticError>,
}

impl<'a> Checker<'a> {
    fn fail(&mut self, err: SemanticError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    fn check_backref_index(&mut self, idx: i32) {
        let resolved = if idx < 0 {
            (self.decls.max_index as i64 + idx as i64) as u32
        } else {
            idx as u32
        };
        if resolved == 0 || resolved > self.decls.max_index {
            self.fail(SemanticError::NonExistentBackrefIndex(idx));
        }
    }

    fn check_backref_name(&mut self, name: &str) {
        if !self.decls.names.contains_key(name) {
            self.fail(SemanticError::NonExistentBackrefName(name.to_string()));
        }
    }

    fn check_subroutine(&mut self, sub: &Subroutine) {
        if let Some(name) = &sub.by_name {
            if !self.decls.names.contains_key(name) {
                self.fail(SemanticError::NonExistentSubroutine(name.clone()));
            }
        } else if let Some(idx) = sub.by_index {
            if idx != 0 {
                // 0 means "recurse into the whole pattern" and always exists.
                self.check_backref_index(idx);
            }
        }
    }

    fn check_range(&mut self, range: &Range) {
        let start = endpoint_codepoint(&range.start);
        let end = endpoint_codepoint(&range.end);
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                self.fail(SemanticError::InvalidRange(format!(
                    "{}-{}",
                    render_endpoint(&range.start),
                    render_endpoint(&range.end)
                )));
            }
        }
    }

    fn check_callout(&mut self, callout: &Callout) {
        match callout.identifier_kind {
            CalloutIdentifier::Numeric(n) => {
                if n > 255 {
                    self.fail(SemanticError::CalloutIdentifierOutOfRange(n as i64));
                }
            }
            CalloutIdentifier::QuotedString => {
                if callout.text.is_empty() {
                    self.fail(SemanticError::EmptyCalloutString);
                }
            }
            CalloutIdentifier::BareIdentifier => {}
        }
    }

    fn check_lookbehind(&mut self, group: &Group) {
        if let Err(variable) = lookbehind::fixed_length(&group.child) {
            self.fail(SemanticError::VariableLengthLookbehind(variable.culprit));
        }
    }

    fn check_char_class_children(&mut self, node: &Node) {
        match node {
            Node::CharType(ct) if ct.letter == 'R' => {
                self.fail(SemanticError::CharTypeNotAllowedInClass);
            }
            Node::Sequence(seq) => {
                for child in &seq.children {
                    self.check_char_class_children(child);
                }
            }
            _ => {}
        }
    }

    fn check_unicode_prop(&mut self, prop: &UnicodeProp) {
        if !unicode_props::is_known_property(&prop.name) {
            self.fail(SemanticError::UnknownUnicodeProperty(prop.name.clone()));
        }
    }

    fn visit(&mut self, node: &Node) {
        if self.error.is_some() {
            return;
        }
        match node {
            Node::Backref(b) => {
                if let Some(idx) = b.by_index {
                    self.check_backref_index(idx);
                } else if let Some(name) = &b.by_name {
                    self.check_backref_name(name);
                }
            }
            Node::Subroutine(s) => self.check_subroutine(s),
            Node::Range(r) => self.check_range(r),
            Node::Callout(c) => self.check_callout(c),
            Node::UnicodeProp(p) => self.check_unicode_prop(p),
            Node::CharClass(cc) => self.check_char_class_children(&cc.inner),
            Node::Group(g) => {
                if matches!(
                    g.kind,
                    GroupKind::LookbehindPositive | GroupKind::LookbehindNegative
                ) {
                    self.check_lookbehind(g);
                }
                if !self.allow_duplicate_names {
                    if let Some(name) = &g.name {
                        if self.decls.duplicate_names.contains(name) {
                            self.fail(SemanticError::DuplicateGroupName(name.clone()));
                        }
                    }
                }
            }
            _ => {}
        }
        for child in node.children() {
            self.visit(child);
        }
    }
}

fn endpoint_codepoint(node: &Node) -> Option<u32> {
    match node {
        Node::Literal(l) => l.value.chars().next().map(|c| c as u32),
        Node::CharLiteral(c) => Some(c.codepoint),
        _ => None,
    }
}

fn render_endpoint(node: &Node) -> String {
    match node {
        Node::Literal(l) => l.value.clone(),
        Node::CharLiteral(c) => c.raw.clone(),
        _ => String::new(),
    }
}

/// Run every semantic check against `root` (normally a `Node::Regex`),
/// returning the first violation found in AST-walk order.
pub fn validate(root: &Node) -> Result<(), SemanticError> {
    let mut decls = Declarations::default();
    collect(root, &mut decls);

    let allow_duplicate_names = match root {
        Node::Regex(r) => r.flags.duplicate_names,
        _ => false,
    };

    let mut checker = Checker {
        decls: &decls,
        allow_duplicate_names,
        error: None,
    };
    checker.visit(root);
    match checker.error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(s: &str) -> Node {
        Node::Literal(Literal {
            span: Span::new(0, 0),
            value: s.to_string(),
            quoted: false,
        })
    }

    fn wrap(body: Node, flags: Flags) -> Node {
        Node::Regex(Regex {
            span: Span::new(0, 0),
            delimiter: '/',
            flags,
            body: Box::new(body),
        })
    }

    fn group(
        kind: GroupKind,
        child: Node,
        name: Option<&str>,
        capture_index: Option<u32>,
    ) -> Node {
        Node::Group(Group {
            span: Span::new(0, 0),
            kind,
            child: Box::new(child),
            name: name.map(|s| s.to_string()),
            capture_index,
            flags: None,
            name_style: name.map(|_| NamedGroupStyle::Angle),
        })
    }

    #[test]
    fn backref_to_existing_group_is_valid() {
        let seq = Node::Sequence(Sequence {
            span: Span::new(0, 0),
            children: vec![
                group(GroupKind::Capturing, lit("a"), None, Some(1)),
                Node::Backref(Backref {
                    span: Span::new(0, 0),
                    form: BackrefForm::Numeric,
                    by_index: Some(1),
                    by_name: None,
                }),
            ],
        });
        assert!(validate(&wrap(seq, Flags::default())).is_ok());
    }

    #[test]
    fn backref_to_missing_group_is_rejected() {
        let node = Node::Backref(Backref {
            span: Span::new(0, 0),
            form: BackrefForm::Numeric,
            by_index: Some(1),
            by_name: None,
        });
        let err = validate(&wrap(node, Flags::default())).unwrap_err();
        assert_eq!(err, SemanticError::NonExistentBackrefIndex(1));
    }

    #[test]
    fn duplicate_names_rejected_without_j_flag() {
        let seq = Node::Sequence(Sequence {
            span: Span::new(0, 0),
            children: vec![
                group(GroupKind::Named, lit("a"), Some("x"), Some(1)),
                group(GroupKind::Named, lit("b"), Some("x"), Some(2)),
            ],
        });
        let err = validate(&wrap(seq, Flags::default())).unwrap_err();
        assert_eq!(err, SemanticError::DuplicateGroupName("x".to_string()));
    }

    #[test]
    fn duplicate_names_allowed_with_j_flag() {
        let seq = Node::Sequence(Sequence {
            span: Span::new(0, 0),
            children: vec![
                group(GroupKind::Named, lit("a"), Some("x"), Some(1)),
                group(GroupKind::Named, lit("b"), Some("x"), Some(2)),
            ],
        });
        let mut flags = Flags::default();
        flags.duplicate_names = true;
        assert!(validate(&wrap(seq, flags)).is_ok());
    }

    #[test]
    fn variable_length_lookbehind_is_rejected() {
        let q = Node::Quantifier(Quantifier {
            span: Span::new(0, 0),
            target: Box::new(lit("a")),
            text: "+".to_string(),
            min: 1,
            max: None,
            style: QuantifierStyle::Greedy,
        });
        let lb = group(GroupKind::LookbehindPositive, q, None, None);
        let err = validate(&wrap(lb, Flags::default())).unwrap_err();
        assert!(matches!(err, SemanticError::VariableLengthLookbehind(_)));
    }

    #[test]
    fn unknown_unicode_property_is_rejected() {
        let prop = Node::UnicodeProp(UnicodeProp {
            span: Span::new(0, 0),
            name: "NotAThing".to_string(),
            negated: false,
            short_form: false,
        });
        let err = validate(&wrap(prop, Flags::default())).unwrap_err();
        assert_eq!(
            err,
            SemanticError::UnknownUnicodeProperty("NotAThing".to_string())
        );
    }

    #[test]
    fn callout_numeric_id_out_of_range_is_rejected() {
        let callout = Node::Callout(Callout {
            span: Span::new(0, 0),
            identifier_kind: CalloutIdentifier::Numeric(300),
            text: String::new(),
            variant: String::new(),
        });
        let err = validate(&wrap(callout, Flags::default())).unwrap_err();
        assert_eq!(err, SemanticError::CalloutIdentifierOutOfRange(300));
    }

    #[test]
    fn backslash_r_inside_char_class_is_rejected() {
        let ct = Node::CharType(CharType {
            span: Span::new(0, 0),
            letter: 'R',
        });
        let cc = Node::CharClass(CharClass {
            span: Span::new(0, 0),
            negated: false,
            inner: Box::new(ct),
        });
        let err = validate(&wrap(cc, Flags::default())).unwrap_err();
        assert_eq!(err, SemanticError::CharTypeNotAllowedInClass);
    }

    #[test]
    fn negative_backref_index_resolves_relative_to_last_group() {
        let seq = Node::Sequence(Sequence {
            span: Span::new(0, 0),
            children: vec![
                group(GroupKind::Capturing, lit("a"), None, Some(1)),
                group(GroupKind::Capturing, lit("b"), None, Some(2)),
                Node::Backref(Backref {
                    span: Span::new(0, 0),
                    form: BackrefForm::GBracedNeg,
                    by_index: Some(-1),
                    by_name: None,
                }),
            ],
        });
        assert!(validate(&wrap(seq, Flags::default())).is_ok());
    }
}
