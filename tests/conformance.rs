//! End-to-end scenarios, one per documented parse/validation outcome,
//! run as inline Rust cases against the pipeline's public entry points.

use pcrelab_core::{parse_pattern, validate_pattern, Node};

fn assert_valid(pattern: &str) {
    let outcome = validate_pattern(pattern).unwrap_or_else(|e| panic!("{}: {}", pattern, e));
    assert!(outcome.is_valid, "{} should be valid: {:?}", pattern, outcome.error);
}

fn assert_invalid(pattern: &str) {
    match validate_pattern(pattern) {
        Ok(outcome) => assert!(!outcome.is_valid, "{} should be invalid", pattern),
        Err(_) => {} // lexer/splitter errors also count as "invalid"
    }
}

#[test]
fn simple_literal_is_valid() {
    assert_valid("/hello/");
}

#[test]
fn capturing_and_named_groups_are_valid() {
    assert_valid("/(a)(?<year>\\d{4})/");
}

#[test]
fn backreference_to_existing_group_is_valid() {
    assert_valid(r"/(a)\1/");
}

#[test]
fn backreference_to_missing_group_is_invalid() {
    assert_invalid(r"/\1/");
}

#[test]
fn named_backreference_to_missing_name_is_invalid() {
    assert_invalid(r"/\k<missing>/");
}

#[test]
fn unterminated_group_is_invalid() {
    assert_invalid("/(abc/");
}

#[test]
fn unterminated_char_class_is_invalid() {
    assert_invalid("/[abc/");
}

#[test]
fn lookbehind_requires_fixed_length() {
    assert_invalid("/(?<=a+)b/");
    assert_valid("/(?<=abc)b/");
}

#[test]
fn conditional_on_existing_group_is_valid() {
    assert_valid("/(a)(?(1)b|c)/");
}

#[test]
fn conditional_on_missing_group_is_invalid() {
    assert_invalid("/(?(1)b|c)/");
}

#[test]
fn unknown_unicode_property_is_invalid() {
    assert_invalid(r"/\p{NotARealProperty}/");
}

#[test]
fn known_unicode_property_is_valid() {
    assert_valid(r"/\p{L}/");
}

#[test]
fn quantifier_on_lookaround_is_invalid() {
    assert_invalid("/(?=a)+/");
}

#[test]
fn quantifier_on_anchor_is_invalid() {
    assert_invalid("/^+/");
}

#[test]
fn invalid_flag_letter_is_rejected() {
    assert_invalid("/abc/k");
}

#[test]
fn extended_mode_ignores_whitespace_and_comments() {
    assert_valid("/a b # trailing comment\n/x");
}

#[test]
fn empty_pattern_round_trips_to_empty_sequence() {
    let ast = parse_pattern("//").unwrap();
    match ast {
        Node::Regex(r) => assert!(matches!(*r.body, Node::Sequence(ref s) if s.children.is_empty())),
        _ => panic!("expected Regex node"),
    }
}

#[test]
fn alternate_delimiters_are_supported() {
    assert_valid("#a/b#");
    assert_valid("(a|b)");
}
