//! pcrelab_core
//!
//! A static analyzer for PCRE-dialect regular expressions: lex and
//! parse a pattern into a typed AST, validate it semantically,
//! recompile it back to text, optimize/modernize it, flag ReDoS
//! exposure, and generate samples, explanations, graphs, and
//! highlighting from the result. Nothing here executes a pattern
//! against a subject string; that stays out of scope (see `redos`'s
//! module doc for why even its catastrophic-backtracking analysis is
//! purely structural).
//!
//! # Pipeline
//!
//! `split` -> `lexer`/`parser` -> `validator` -> (`recompiler` |
//! `optimizer` | `redos` | `sample` | `explain` | `dump` |
//! `complexity` | `graph`/`mermaid` | `highlight`)
//!
//! [`parse_pattern`] and [`validate_pattern`] wrap the first three
//! stages for callers that just want an AST or a pass/fail outcome;
//! everything past that point takes the `ast::Node` directly.

pub mod core;

pub use core::ast::{Flags, Node, Visitor};
pub use core::errors::{ParseError, PcreLabError, SemanticError, ValidationOutcome};

use core::config::ParserConfig;
use core::splitter;

/// Split, lex, and parse a full delimiter-wrapped pattern (e.g.
/// `"/foo(bar)+/i"`) into an AST. Does not run semantic validation;
/// call [`core::validator::validate`] on the result for that, or use
/// [`validate_pattern`] for the combined check.
pub fn parse_pattern(raw: &str) -> Result<Node, PcreLabError> {
    let cfg = ParserConfig::default();
    let split = splitter::split(raw, cfg.max_pattern_length)?;
    core::parser::parse(&split.body, split.delimiter, split.flags, cfg)
}

/// Parse and semantically validate a full delimiter-wrapped pattern,
/// catching parser and semantic errors into a [`ValidationOutcome`]
/// instead of propagating them. Splitter and lexer errors
/// still propagate as `Err`, since they indicate the input wasn't a
/// well-formed pattern at all.
pub fn validate_pattern(raw: &str) -> Result<ValidationOutcome, PcreLabError> {
    let cfg = ParserConfig::default();
    let split = splitter::split(raw, cfg.max_pattern_length)?;
    let ast = match core::parser::parse(&split.body, split.delimiter, split.flags, cfg) {
        Ok(ast) => ast,
        Err(PcreLabError::Parse(e)) => {
            let position = e.position();
            return Ok(ValidationOutcome::failure(e.to_string(), Some(position)));
        }
        Err(other) => return Err(other),
    };
    match core::validator::validate(&ast) {
        Ok(()) => Ok(ValidationOutcome::ok()),
        Err(e) => Ok(ValidationOutcome::failure(e.to_string(), None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pattern_splits_and_parses() {
        let ast = parse_pattern("/a+/i").unwrap();
        match ast {
            Node::Regex(r) => assert!(r.flags.ignore_case),
            _ => panic!("expected Regex node"),
        }
    }

    #[test]
    fn validate_pattern_reports_parse_errors() {
        let outcome = validate_pattern("/(a/").unwrap();
        assert!(!outcome.is_valid);
    }

    #[test]
    fn validate_pattern_reports_semantic_errors() {
        let outcome = validate_pattern(r"/\1/").unwrap();
        assert!(!outcome.is_valid);
    }

    #[test]
    fn validate_pattern_passes_well_formed_input() {
        let outcome = validate_pattern("/(a)(b)/").unwrap();
        assert!(outcome.is_valid);
    }
}
