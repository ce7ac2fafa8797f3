//! Fixed-length computation for lookbehind assertions.
//!
//! A lookbehind body must match a constant number of characters. This
//! module computes, for an arbitrary AST subtree, either a single fixed
//! length or `None` (variable-length): literals count their characters;
//! CharType/UnicodeProp/Dot/Range/PosixClass/CharLiteral each count 1;
//! `{n,n}` counts n × target; anything else is variable-length. A
//! dedicated sub-module rather than inline code so each node shape gets
//! its own function.

use crate::core::ast::*;

/// The reason a subtree failed to have a fixed length, used to build
/// the `SemanticError::VariableLengthLookbehind` message's `{0}` slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableLength {
    /// The quantifier/alternation text that introduced the variability.
    pub culprit: String,
}

/// Computes the fixed match length of `node` in characters, or `Err`
/// describing the first variable-length construct found.
pub fn fixed_length(node: &Node) -> Result<u32, VariableLength> {
    match node {
        Node::Literal(n) => Ok(n.value.chars().count() as u32),
        Node::CharLiteral(_)
        | Node::Dot(_)
        | Node::CharType(_)
        | Node::UnicodeProp(_)
        | Node::PosixClass(_) => Ok(1),
        Node::Range(_) => Ok(1),
        Node::Anchor(_) | Node::Assertion(_) | Node::Keep(_) | Node::Comment(_) | Node::PcreVerb(_) | Node::Callout(_) => Ok(0),
        Node::Sequence(n) => {
            let mut total = 0u32;
            for child in &n.children {
                total += fixed_length(child)?;
            }
            Ok(total)
        }
        Node::Alternation(n) => {
            let mut lengths = Vec::with_capacity(n.branches.len());
            for branch in &n.branches {
                lengths.push(fixed_length(branch)?);
            }
            let first = lengths.first().copied().unwrap_or(0);
            if lengths.iter().all(|l| *l == first) {
                Ok(first)
            } else {
                Err(VariableLength {
                    culprit: "|".to_string(),
                })
            }
        }
        Node::CharClass(_) => Ok(1),
        Node::Group(g) => {
            let inner = fixed_length(&g.child)?;
            match g.kind {
                GroupKind::LookaheadPositive
                | GroupKind::LookaheadNegative
                | GroupKind::LookbehindPositive
                | GroupKind::LookbehindNegative => Ok(0),
                _ => Ok(inner),
            }
        }
        Node::Quantifier(q) => {
            if q.min == q.max.unwrap_or(u32::MAX) {
                let target_len = fixed_length(&q.target)?;
                Ok(target_len * q.min)
            } else {
                Err(VariableLength {
                    culprit: q.text.clone(),
                })
            }
        }
        Node::Backref(_) | Node::Subroutine(_) => Err(VariableLength {
            culprit: "backreference".to_string(),
        }),
        Node::Conditional(c) => {
            let then_len = fixed_length(&c.then_branch)?;
            let else_len = fixed_length(&c.else_branch)?;
            if then_len == else_len {
                Ok(then_len)
            } else {
                Err(VariableLength {
                    culprit: "conditional".to_string(),
                })
            }
        }
        Node::Regex(r) => fixed_length(&r.body),
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

    #[test]
    fn literal_length_is_char_count() {
        assert_eq!(fixed_length(&lit("abc")), Ok(3));
    }

    #[test]
    fn exact_quantifier_multiplies() {
        let q = Node::Quantifier(Quantifier {
            span: Span::new(0, 0),
            target: Box::new(lit("a")),
            text: "{3}".to_string(),
            min: 3,
            max: Some(3),
            style: QuantifierStyle::Greedy,
        });
        assert_eq!(fixed_length(&q), Ok(3));
    }

    #[test]
    fn unbounded_quantifier_is_variable() {
        let q = Node::Quantifier(Quantifier {
            span: Span::new(0, 0),
            target: Box::new(lit("a")),
            text: "+".to_string(),
            min: 1,
            max: None,
            style: QuantifierStyle::Greedy,
        });
        assert!(fixed_length(&q).is_err());
    }

    #[test]
    fn alternation_with_equal_branch_lengths_is_fixed() {
        let alt = Node::Alternation(Alternation {
            span: Span::new(0, 0),
            branches: vec![lit("ab"), lit("cd")],
        });
        assert_eq!(fixed_length(&alt), Ok(2));
    }

    #[test]
    fn alternation_with_unequal_branch_lengths_is_variable() {
        let alt = Node::Alternation(Alternation {
            span: Span::new(0, 0),
            branches: vec![lit("a"), lit("bb")],
        });
        assert!(fixed_length(&alt).is_err());
    }
}
