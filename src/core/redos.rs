//! ReDoS (regular-expression denial-of-service) analyzer.
//!
//! A heuristic AST walk, not a backtracking simulator: it flags shapes
//! that are *known* to enable catastrophic backtracking (nested
//! unbounded quantifiers, overlapping alternation branches under an
//! unbounded quantifier) and downgrades the verdict when a
//! backtracking-cutting control verb is present. Policy is stated
//! explicitly: false positives over false negatives.

use crate::core::ast::*;
use crate::core::config::RedosConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Safe,
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedosReport {
    pub severity: Severity,
    pub reasons: Vec<String>,
}

fn bump(current: &mut Severity, candidate: Severity) {
    if candidate > *current {
        *current = candidate;
    }
}

fn is_unbounded(q: &Quantifier) -> bool {
    q.max.is_none()
}

/// Whether `node`'s subtree contains another unbounded quantifier
/// (spec: "a quantifier ... applied to a group whose body contains
/// another unbounded quantifier"). Bounded repetitions, however large,
/// never count — spec explicitly calls out `(a{1,k})+` as non-critical.
fn contains_unbounded_quantifier(node: &Node) -> bool {
    if let Node::Quantifier(q) = node {
        if is_unbounded(q) {
            return true;
        }
    }
    node.children()
        .iter()
        .any(|c| contains_unbounded_quantifier(c))
}

/// Two branches "overlap" (can match the same prefix) if either side is
/// a character class-like construct (assumed to overlap with anything,
/// favoring false positives over false negatives) or both are literals
/// starting with the same character.
fn branches_overlap(a: &Node, b: &Node) -> bool {
    match (a, b) {
        (Node::Literal(la), Node::Literal(lb)) => {
            la.value.chars().next().is_some() && la.value.chars().next() == lb.value.chars().next()
        }
        (Node::Dot(_), _)
        | (_, Node::Dot(_))
        | (Node::CharClass(_), _)
        | (_, Node::CharClass(_))
        | (Node::CharType(_), _)
        | (_, Node::CharType(_))
        | (Node::PosixClass(_), _)
        | (_, Node::PosixClass(_))
        | (Node::UnicodeProp(_), _)
        | (_, Node::UnicodeProp(_)) => true,
        _ => false,
    }
}

fn alternation_has_overlap(alt: &Alternation) -> bool {
    for i in 0..alt.branches.len() {
        for j in (i + 1)..alt.branches.len() {
            if branches_overlap(&alt.branches[i], &alt.branches[j]) {
                return true;
            }
        }
    }
    false
}

/// Finds the first `Alternation` reachable from `node` without crossing
/// into a nested `Quantifier`'s target (that subtree is analyzed on its
/// own when the walk reaches it).
fn find_alternation(node: &Node) -> Option<&Alternation> {
    match node {
        Node::Alternation(a) => Some(a),
        Node::Quantifier(_) => None,
        _ => node.children().iter().find_map(|c| find_alternation(c)),
    }
}

fn contains_backtrack_cutting_verb(node: &Node) -> bool {
    match node {
        Node::PcreVerb(v) => matches!(v.name.as_str(), "COMMIT" | "PRUNE" | "SKIP"),
        _ => node
            .children()
            .iter()
            .any(|c| contains_backtrack_cutting_verb(c)),
    }
}

fn walk(node: &Node, reasons: &mut Vec<String>, severity: &mut Severity) {
    if let Node::Quantifier(q) = node {
        if is_unbounded(q) {
            if contains_unbounded_quantifier(&q.target) {
                reasons.push(format!(
                    "nested unbounded quantifiers under '{}' can backtrack exponentially \
                     on a failing match",
                    q.text
                ));
                bump(severity, Severity::Critical);
            }
            if let Some(alt) = find_alternation(&q.target) {
                if alternation_has_overlap(alt) {
                    reasons.push(
                        "alternation branches repeated by an unbounded quantifier overlap, \
                         enabling catastrophic backtracking"
                            .to_string(),
                    );
                    bump(severity, Severity::High);
                }
            }
        }
    }
    for child in node.children() {
        walk(child, reasons, severity);
    }
}

/// Analyze `ast` for ReDoS exposure. `original_pattern` is the full
/// delimited source text, checked against `cfg`'s ignore list before
/// any structural analysis runs.
pub fn analyze(original_pattern: &str, ast: &Node, cfg: &RedosConfig) -> RedosReport {
    if cfg.is_ignored(original_pattern) {
        return RedosReport {
            severity: Severity::Safe,
            reasons: vec!["pattern is in the analyzer's ignore list".to_string()],
        };
    }

    let mut reasons = Vec::new();
    let mut severity = Severity::Safe;
    walk(ast, &mut reasons, &mut severity);

    if severity > Severity::Safe && contains_backtrack_cutting_verb(ast) {
        reasons.push(
            "a backtracking-cutting control verb ((*COMMIT)/(*PRUNE)/(*SKIP)) is present; \
             severity downgraded"
                .to_string(),
        );
        severity = Severity::Safe;
    }

    RedosReport { severity, reasons }
}
