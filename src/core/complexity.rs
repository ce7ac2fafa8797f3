//! Structural complexity scoring.
//!
//! A single plain recursive walk (not a `Visitor` impl, since every
//! field is accumulated the same way regardless of node kind) over
//! `Node::children()`, the same generic-tree-walk idiom `validator.rs`
//! and `redos.rs` use.

use crate::core::ast::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComplexityScore {
    pub node_count: u32,
    pub max_depth: u32,
    /// Sum of quantifier "weight": 1 for a bounded quantifier, 3 for an
    /// unbounded one, doubled again for each level of quantifier
    /// nesting (an unbounded quantifier inside another weighs more than
    /// one standing alone).
    pub quantifier_weight: u32,
    pub group_count: u32,
    pub alternation_count: u32,
    pub backreference_count: u32,
    /// `node_count + max_depth * 2 + quantifier_weight * 3` — an
    /// arbitrary but stable single number for ranking patterns against
    /// each other, not an absolute unit of anything.
    pub total: u32,
}

struct Counts {
    node_count: u32,
    max_depth: u32,
    quantifier_weight: u32,
    group_count: u32,
    alternation_count: u32,
    backreference_count: u32,
}

fn walk(node: &Node, depth: u32, quantifier_depth: u32, counts: &mut Counts) {
    counts.node_count += 1;
    if depth > counts.max_depth {
        counts.max_depth = depth;
    }

    match node {
        Node::Quantifier(q) => {
            let base = if q.max.is_none() { 3 } else { 1 };
            counts.quantifier_weight += base * (quantifier_depth + 1);
            for child in node.children() {
                walk(child, depth + 1, quantifier_depth + 1, counts);
            }
            return;
        }
        Node::Group(_) => counts.group_count += 1,
        Node::Alternation(_) => counts.alternation_count += 1,
        Node::Backref(_) => counts.backreference_count += 1,
        _ => {}
    }

    for child in node.children() {
        walk(child, depth + 1, quantifier_depth, counts);
    }
}

/// Score `ast`'s structural complexity. Higher
/// `total` means more nodes, deeper nesting, and more (especially
/// nested-unbounded) quantifiers — a relative ranking signal, not an
/// absolute measure of anything.
pub fn complexity_score(ast: &Node) -> ComplexityScore {
    let mut counts = Counts {
        node_count: 0,
        max_depth: 0,
        quantifier_weight: 0,
        group_count: 0,
        alternation_count: 0,
        backreference_count: 0,
    };
    walk(ast, 0, 0, &mut counts);

    let total = counts.node_count + counts.max_depth * 2 + counts.quantifier_weight * 3;

    ComplexityScore {
        node_count: counts.node_count,
        max_depth: counts.max_depth,
        quantifier_weight: counts.quantifier_weight,
        group_count: counts.group_count,
        alternation_count: counts.alternation_count,
        backreference_count: counts.backreference_count,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ParserConfig;
    use crate::core::parser::parse;

    fn score_of(body: &str) -> ComplexityScore {
        let ast = parse(body, '/', Flags::default(), ParserConfig::default()).unwrap();
        complexity_score(&ast)
    }

    #[test]
    fn bare_literal_has_minimal_score() {
        let score = score_of("a");
        assert_eq!(score.quantifier_weight, 0);
        assert_eq!(score.group_count, 0);
    }

    #[test]
    fn unbounded_quantifier_weighs_more_than_bounded() {
        let unbounded = score_of("a+");
        let bounded = score_of("a{1,3}");
        assert!(unbounded.quantifier_weight > bounded.quantifier_weight);
    }

    #[test]
    fn nested_quantifiers_compound_weight() {
        let nested = score_of("(a+)+");
        let flat = score_of("a+b+");
        assert!(nested.quantifier_weight > flat.quantifier_weight);
    }

    #[test]
    fn groups_and_alternations_are_counted() {
        let score = score_of("(a|b)(c|d)");
        assert_eq!(score.group_count, 2);
        assert_eq!(score.alternation_count, 2);
    }

    #[test]
    fn backreferences_are_counted() {
        let score = score_of(r"(a)\1\1");
        assert_eq!(score.backreference_count, 2);
    }
}
