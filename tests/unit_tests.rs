//! Unit tests organized by grammar category, one `mod` per category
//! (`mod anchors { ... } mod char_classes { ... }`).

use pcrelab_core::core::ast::*;
use pcrelab_core::core::config::ParserConfig;
use pcrelab_core::core::parser::parse;

fn parse_ok(input: &str) -> Node {
    let ast = parse(input, '/', Flags::default(), ParserConfig::default())
        .unwrap_or_else(|e| panic!("parse({:?}) failed: {}", input, e));
    match ast {
        Node::Regex(r) => *r.body,
        other => other,
    }
}

mod anchors {
    use super::*;

    #[test]
    fn caret_is_start_of_line() {
        let ast = parse_ok("^");
        assert!(matches!(ast, Node::Anchor(a) if a.kind == AnchorKind::StartOfLine));
    }

    #[test]
    fn dollar_is_end_of_line() {
        let ast = parse_ok("$");
        assert!(matches!(ast, Node::Anchor(a) if a.kind == AnchorKind::EndOfLine));
    }

    #[test]
    fn backslash_a_is_absolute_start() {
        let ast = parse_ok(r"\A");
        assert!(matches!(ast, Node::Anchor(a) if a.kind == AnchorKind::AbsoluteStart));
    }

    #[test]
    fn backslash_z_lowercase_is_absolute_end() {
        let ast = parse_ok(r"\z");
        assert!(matches!(ast, Node::Anchor(a) if a.kind == AnchorKind::AbsoluteEnd));
    }

    #[test]
    fn backslash_z_uppercase_allows_trailing_newline() {
        let ast = parse_ok(r"\Z");
        assert!(matches!(ast, Node::Anchor(a) if a.kind == AnchorKind::EndBeforeFinalNewline));
    }
}

mod char_classes {
    use super::*;

    #[test]
    fn simple_range_parses() {
        let ast = parse_ok("[a-z]");
        match ast {
            Node::CharClass(c) => assert!(!c.negated),
            _ => panic!("expected CharClass"),
        }
    }

    #[test]
    fn negated_class_is_flagged() {
        let ast = parse_ok("[^a-z]");
        match ast {
            Node::CharClass(c) => assert!(c.negated),
            _ => panic!("expected CharClass"),
        }
    }

    #[test]
    fn posix_class_inside_brackets() {
        let ast = parse_ok("[[:digit:]]");
        match ast {
            Node::CharClass(c) => {
                assert!(matches!(*c.inner, Node::PosixClass(ref p) if p.name == "digit"));
            }
            _ => panic!("expected CharClass"),
        }
    }

    #[test]
    fn escaped_closing_bracket_is_a_class_member() {
        let ast = parse_ok(r"[\]]");
        match ast {
            Node::CharClass(c) => {
                assert!(matches!(*c.inner, Node::CharLiteral(ref lit) if lit.codepoint == ']' as u32));
            }
            _ => panic!("expected CharClass"),
        }
    }
}

mod quantifiers {
    use super::*;

    #[test]
    fn star_is_zero_or_more() {
        let ast = parse_ok("a*");
        match ast {
            Node::Quantifier(q) => {
                assert_eq!(q.min, 0);
                assert_eq!(q.max, None);
                assert_eq!(q.style, QuantifierStyle::Greedy);
            }
            _ => panic!("expected Quantifier"),
        }
    }

    #[test]
    fn lazy_plus_is_marked_lazy() {
        let ast = parse_ok("a+?");
        match ast {
            Node::Quantifier(q) => assert_eq!(q.style, QuantifierStyle::Lazy),
            _ => panic!("expected Quantifier"),
        }
    }

    #[test]
    fn possessive_star_is_marked_possessive() {
        let ast = parse_ok("a*+");
        match ast {
            Node::Quantifier(q) => assert_eq!(q.style, QuantifierStyle::Possessive),
            _ => panic!("expected Quantifier"),
        }
    }

    #[test]
    fn brace_quantifier_parses_min_and_max() {
        let ast = parse_ok("a{2,5}");
        match ast {
            Node::Quantifier(q) => {
                assert_eq!(q.min, 2);
                assert_eq!(q.max, Some(5));
            }
            _ => panic!("expected Quantifier"),
        }
    }

    #[test]
    fn open_ended_brace_quantifier_has_no_max() {
        let ast = parse_ok("a{2,}");
        match ast {
            Node::Quantifier(q) => {
                assert_eq!(q.min, 2);
                assert_eq!(q.max, None);
            }
            _ => panic!("expected Quantifier"),
        }
    }
}

mod groups {
    use super::*;

    #[test]
    fn plain_parens_are_capturing() {
        let ast = parse_ok("(a)");
        match ast {
            Node::Group(g) => {
                assert_eq!(g.kind, GroupKind::Capturing);
                assert_eq!(g.capture_index, Some(1));
            }
            _ => panic!("expected Group"),
        }
    }

    #[test]
    fn question_colon_is_non_capturing() {
        let ast = parse_ok("(?:ab)");
        match ast {
            Node::Group(g) => {
                assert_eq!(g.kind, GroupKind::NonCapturing);
                assert_eq!(g.capture_index, None);
            }
            _ => panic!("expected Group"),
        }
    }

    #[test]
    fn angle_named_group_records_its_name_and_style() {
        let ast = parse_ok("(?<tag>a)");
        match ast {
            Node::Group(g) => {
                assert_eq!(g.kind, GroupKind::Named);
                assert_eq!(g.name.as_deref(), Some("tag"));
                assert_eq!(g.name_style, Some(NamedGroupStyle::Angle));
            }
            _ => panic!("expected Group"),
        }
    }

    #[test]
    fn p_angle_named_group_uses_the_p_angle_style() {
        let ast = parse_ok("(?P<tag>a)");
        match ast {
            Node::Group(g) => assert_eq!(g.name_style, Some(NamedGroupStyle::PAngle)),
            _ => panic!("expected Group"),
        }
    }

    #[test]
    fn atomic_group_is_tagged() {
        let ast = parse_ok("(?>ab)");
        assert!(matches!(ast, Node::Group(g) if g.kind == GroupKind::Atomic));
    }

    #[test]
    fn positive_lookahead_is_tagged() {
        let ast = parse_ok("(?=ab)");
        assert!(matches!(ast, Node::Group(g) if g.kind == GroupKind::LookaheadPositive));
    }

    #[test]
    fn negative_lookbehind_is_tagged() {
        let ast = parse_ok("(?<!ab)");
        assert!(matches!(ast, Node::Group(g) if g.kind == GroupKind::LookbehindNegative));
    }
}

mod backreferences_and_subroutines {
    use super::*;

    #[test]
    fn numeric_backref_parses() {
        let ast = parse_ok(r"(a)\1");
        match ast {
            Node::Sequence(s) => match &s.children[1] {
                Node::Backref(b) => {
                    assert_eq!(b.form, BackrefForm::Numeric);
                    assert_eq!(b.by_index, Some(1));
                }
                other => panic!("expected Backref, got {:?}", other),
            },
            _ => panic!("expected Sequence"),
        }
    }

    #[test]
    fn named_backref_k_angle_parses() {
        let ast = parse_ok(r"(?<tag>a)\k<tag>");
        match ast {
            Node::Sequence(s) => match &s.children[1] {
                Node::Backref(b) => {
                    assert_eq!(b.form, BackrefForm::KAngle);
                    assert_eq!(b.by_name.as_deref(), Some("tag"));
                }
                other => panic!("expected Backref, got {:?}", other),
            },
            _ => panic!("expected Sequence"),
        }
    }

    #[test]
    fn subroutine_call_by_name_parses() {
        let ast = parse_ok(r"(?<tag>a)(?&tag)");
        match ast {
            Node::Sequence(s) => match &s.children[1] {
                Node::Subroutine(sub) => {
                    assert_eq!(sub.marker, SubroutineMarker::Ampersand);
                    assert_eq!(sub.by_name.as_deref(), Some("tag"));
                }
                other => panic!("expected Subroutine, got {:?}", other),
            },
            _ => panic!("expected Sequence"),
        }
    }
}

mod control_verbs_and_conditionals {
    use super::*;

    #[test]
    fn commit_verb_parses_without_argument() {
        let ast = parse_ok("(*COMMIT)");
        assert!(matches!(ast, Node::PcreVerb(v) if v.name == "COMMIT" && v.argument.is_none()));
    }

    #[test]
    fn mark_verb_captures_its_argument() {
        let ast = parse_ok("(*MARK:here)");
        match ast {
            Node::PcreVerb(v) => {
                assert_eq!(v.name, "MARK");
                assert_eq!(v.argument.as_deref(), Some("here"));
            }
            _ => panic!("expected PcreVerb"),
        }
    }

    #[test]
    fn conditional_on_group_number_parses_both_branches() {
        let ast = parse_ok("(a)(?(1)b|c)");
        match ast {
            Node::Sequence(s) => match &s.children[1] {
                Node::Conditional(cond) => {
                    assert!(matches!(*cond.then_branch, Node::Literal(ref l) if l.value == "b"));
                    assert!(matches!(*cond.else_branch, Node::Literal(ref l) if l.value == "c"));
                }
                other => panic!("expected Conditional, got {:?}", other),
            },
            _ => panic!("expected Sequence"),
        }
    }
}

mod char_types_and_unicode {
    use super::*;

    #[test]
    fn digit_char_type_parses() {
        let ast = parse_ok(r"\d");
        assert!(matches!(ast, Node::CharType(c) if c.letter == 'd'));
    }

    #[test]
    fn braced_unicode_property_parses() {
        let ast = parse_ok(r"\p{L}");
        match ast {
            Node::UnicodeProp(u) => {
                assert_eq!(u.name, "L");
                assert!(!u.negated);
            }
            _ => panic!("expected UnicodeProp"),
        }
    }

    #[test]
    fn negated_unicode_property_uses_capital_p() {
        let ast = parse_ok(r"\P{L}");
        match ast {
            Node::UnicodeProp(u) => assert!(u.negated),
            _ => panic!("expected UnicodeProp"),
        }
    }
}
