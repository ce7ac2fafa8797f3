//! Round-trip and structural-equivalence properties: a curated corpus
//! rather than full fuzzing, exercised here as a black-box corpus sweep
//! through the public API.

use pcrelab_core::core::config::ParserConfig;
use pcrelab_core::core::optimizer::optimize;
use pcrelab_core::core::parser::parse;
use pcrelab_core::core::recompiler::recompile;
use pcrelab_core::core::validator::validate;
use pcrelab_core::core::ast::Flags;
use pretty_assertions::assert_eq;

const CORPUS: &[&str] = &[
    "hello world",
    "a|b|c",
    "(a)(b)(c)",
    "(?:ab)+",
    "(?<year>[0-9]{4})-(?<month>[0-9]{2})-(?<day>[0-9]{2})",
    r"(a)\1",
    r"\d+\.\d+",
    "[a-zA-Z0-9_]+",
    "[^a-z]",
    "a{2,5}?",
    "a*+",
    "(?=foo)bar",
    "(?<!foo)bar",
    "(?>a+)b",
    "(a|b)(?(1)x|y)",
    "(*COMMIT)abc",
    r"\p{L}+",
    "a(?i)b(?-i)c",
    r"\Qa.b*c\E",
    "(?# a comment )abc",
];

fn roundtrip(body: &str) -> String {
    let ast = parse(body, '/', Flags::default(), ParserConfig::default())
        .unwrap_or_else(|e| panic!("parse({:?}) failed: {}", body, e));
    recompile(&ast)
}

#[test]
fn corpus_parses_and_validates() {
    for pattern in CORPUS {
        let ast = parse(pattern, '/', Flags::default(), ParserConfig::default())
            .unwrap_or_else(|e| panic!("parse({:?}) failed: {}", pattern, e));
        validate(&ast).unwrap_or_else(|e| panic!("validate({:?}) failed: {}", pattern, e));
    }
}

#[test]
fn recompile_is_byte_identical_for_the_corpus() {
    for pattern in CORPUS {
        assert_eq!(&roundtrip(pattern), pattern, "round-trip mismatch for {:?}", pattern);
    }
}

#[test]
fn reparsing_the_recompiled_corpus_yields_a_structurally_equal_ast() {
    for pattern in CORPUS {
        let ast = parse(pattern, '/', Flags::default(), ParserConfig::default())
            .unwrap_or_else(|e| panic!("parse({:?}) failed: {}", pattern, e));
        let text = recompile(&ast);
        let reparsed = parse(&text, '/', Flags::default(), ParserConfig::default())
            .unwrap_or_else(|e| panic!("reparse of {:?} ({:?}) failed: {}", pattern, text, e));
        assert_eq!(ast, reparsed, "structural mismatch for {:?}", pattern);
    }
}

#[test]
fn brace_quantifier_whitespace_is_canonicalized_not_preserved() {
    // Spec §4.3/§8: the recompiler strips whitespace inside `{...}`
    // rather than preserving it byte-for-byte.
    let ast = parse("a{ 2 , 5 }", '/', Flags::default(), ParserConfig::default()).unwrap();
    assert_eq!(recompile(&ast), "a{2,5}");
}

#[test]
fn optimizing_preserves_parse_validity() {
    for pattern in CORPUS {
        let ast = parse(pattern, '/', Flags::default(), ParserConfig::default()).unwrap();
        let optimized = optimize(&ast);
        let text = recompile(&optimized);
        let reparsed = parse(&text, '/', Flags::default(), ParserConfig::default())
            .unwrap_or_else(|e| panic!("optimized form of {:?} ({:?}) failed to reparse: {}", pattern, text, e));
        validate(&reparsed).unwrap_or_else(|e| panic!("optimized form of {:?} failed validation: {}", pattern, e));
    }
}

#[test]
fn optimizer_is_idempotent_on_the_corpus() {
    for pattern in CORPUS {
        let ast = parse(pattern, '/', Flags::default(), ParserConfig::default()).unwrap();
        let once = optimize(&ast);
        let twice = optimize(&once);
        assert_eq!(
            recompile(&once),
            recompile(&twice),
            "optimizer not idempotent for {:?}",
            pattern
        );
    }
}

#[test]
fn optimizer_collapses_a_redundant_non_capturing_group_around_one_char() {
    let ast = parse("(?:a)+", '/', Flags::default(), ParserConfig::default()).unwrap();
    let optimized = optimize(&ast);
    assert_eq!(recompile(&optimized), "a+");
}

#[test]
fn optimizer_keeps_a_group_wrapping_multiple_characters() {
    let ast = parse("(?:ab)+", '/', Flags::default(), ParserConfig::default()).unwrap();
    let optimized = optimize(&ast);
    assert_eq!(recompile(&optimized), "(?:ab)+");
}
