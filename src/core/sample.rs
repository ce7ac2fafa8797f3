//! Deterministic sample-string generator.
//!
//! `generate_sample(ast, seed)` walks the AST producing one string the
//! pattern plausibly accepts. It is deliberately a heuristic, not a
//! solver: lookarounds contribute nothing (zero-width), conditionals
//! always take the then-branch, and negated classes pick a character
//! outside the table of representatives rather than proving one exists.
//! Determinism comes from a seeded xorshift64 generator rather than a
//! `rand` dependency.

use crate::core::ast::*;
use std::collections::HashMap;

struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Rng(if seed == 0 { 0x9E3779B97F4A7C15 } else { seed })
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
}

/// One representative character for each `\d \D \w \W \s \S ...` letter.
fn char_type_sample(letter: char) -> &'static str {
    match letter {
        'd' => "5",
        'D' => "X",
        'w' => "a",
        'W' => "!",
        's' => " ",
        'S' => "x",
        'h' => " ",
        'H' => "x",
        'v' => "\n",
        'V' => "x",
        'R' => "\r\n",
        'X' => "x",
        'C' => "x",
        'N' => "x",
        _ => "x",
    }
}

fn posix_class_sample(name: &str) -> &'static str {
    match name {
        "alpha" => "a",
        "digit" => "5",
        "alnum" => "a",
        "space" => " ",
        "upper" => "A",
        "lower" => "a",
        "punct" => ".",
        "print" => "a",
        "graph" => "a",
        "cntrl" => "\u{1}",
        "xdigit" => "a",
        "blank" => " ",
        "ascii" => "a",
        "word" => "a",
        _ => "x",
    }
}

const REPS_CAP: u32 = 3;

struct SampleGenerator {
    rng: Rng,
    captures_by_index: HashMap<u32, String>,
    captures_by_name: HashMap<String, String>,
}

impl SampleGenerator {
    fn new(seed: u64) -> Self {
        SampleGenerator {
            rng: Rng::new(seed),
            captures_by_index: HashMap::new(),
            captures_by_name: HashMap::new(),
        }
    }

    /// First concrete character a class-interior node contributes,
    /// descending into `Sequence`s picking the first child.
    fn class_member_sample(&mut self, node: &Node) -> String {
        match node {
            Node::Literal(l) => l.value.chars().next().map(String::from).unwrap_or_default(),
            Node::CharLiteral(c) => char::from_u32(c.codepoint).map(String::from).unwrap_or_default(),
            Node::Range(r) => self.class_member_sample(&r.start),
            Node::CharType(ct) => char_type_sample(ct.letter).to_string(),
            Node::PosixClass(p) => posix_class_sample(&p.name).to_string(),
            Node::UnicodeProp(_) => "x".to_string(),
            Node::Sequence(seq) => seq
                .children
                .first()
                .map(|c| self.class_member_sample(c))
                .unwrap_or_default(),
            _ => "x".to_string(),
        }
    }
}

impl Visitor for SampleGenerator {
    type Output = String;

    fn visit_regex(&mut self, n: &Regex) -> String {
        self.visit(&n.body)
    }

    fn visit_sequence(&mut self, n: &Sequence) -> String {
        n.children.iter().map(|c| self.visit(c)).collect()
    }

    fn visit_alternation(&mut self, n: &Alternation) -> String {
        let idx = (self.rng.next_u64() as usize) % n.branches.len().max(1);
        self.visit(&n.branches[idx])
    }

    fn visit_literal(&mut self, n: &Literal) -> String {
        n.value.clone()
    }

    fn visit_char_literal(&mut self, n: &CharLiteral) -> String {
        char::from_u32(n.codepoint).map(String::from).unwrap_or_default()
    }

    fn visit_dot(&mut self, _n: &Dot) -> String {
        "x".to_string()
    }

    fn visit_anchor(&mut self, _n: &Anchor) -> String {
        String::new()
    }

    fn visit_assertion(&mut self, _n: &Assertion) -> String {
        String::new()
    }

    fn visit_keep(&mut self, _n: &Keep) -> String {
        String::new()
    }

    fn visit_char_type(&mut self, n: &CharType) -> String {
        char_type_sample(n.letter).to_string()
    }

    fn visit_unicode_prop(&mut self, _n: &UnicodeProp) -> String {
        "x".to_string()
    }

    fn visit_char_class(&mut self, n: &CharClass) -> String {
        if !n.negated {
            self.class_member_sample(&n.inner)
        } else {
            "~".to_string()
        }
    }

    fn visit_range(&mut self, n: &Range) -> String {
        self.class_member_sample(&Node::Range(n.clone()))
    }

    fn visit_posix_class(&mut self, n: &PosixClass) -> String {
        if n.negated {
            "~".to_string()
        } else {
            posix_class_sample(&n.name).to_string()
        }
    }

    fn visit_quantifier(&mut self, n: &Quantifier) -> String {
        let reps = if n.min == 0 { 0 } else { n.min.min(REPS_CAP) };
        (0..reps).map(|_| self.visit(&n.target)).collect()
    }

    fn visit_group(&mut self, n: &Group) -> String {
        match n.kind {
            GroupKind::LookaheadPositive
            | GroupKind::LookaheadNegative
            | GroupKind::LookbehindPositive
            | GroupKind::LookbehindNegative => String::new(),
            _ => {
                let text = self.visit(&n.child);
                if let Some(idx) = n.capture_index {
                    self.captures_by_index.insert(idx, text.clone());
                    if let Some(name) = &n.name {
                        self.captures_by_name.insert(name.clone(), text.clone());
                    }
                }
                text
            }
        }
    }

    fn visit_backref(&mut self, n: &Backref) -> String {
        if let Some(name) = &n.by_name {
            self.captures_by_name.get(name).cloned().unwrap_or_default()
        } else if let Some(idx) = n.by_index {
            let idx = idx.unsigned_abs();
            self.captures_by_index.get(&idx).cloned().unwrap_or_default()
        } else {
            String::new()
        }
    }

    fn visit_subroutine(&mut self, n: &Subroutine) -> String {
        if let Some(name) = &n.by_name {
            self.captures_by_name.get(name).cloned().unwrap_or_default()
        } else if let Some(idx) = n.by_index {
            self.captures_by_index
                .get(&(idx as u32))
                .cloned()
                .unwrap_or_default()
        } else {
            String::new()
        }
    }

    fn visit_conditional(&mut self, n: &Conditional) -> String {
        self.visit(&n.then_branch)
    }

    fn visit_callout(&mut self, _n: &Callout) -> String {
        String::new()
    }

    fn visit_pcre_verb(&mut self, _n: &PcreVerb) -> String {
        String::new()
    }

    fn visit_comment(&mut self, _n: &Comment) -> String {
        String::new()
    }
}

/// Deterministically generate a string the pattern plausibly accepts.
/// Same `(ast, seed)` always yields the same string.
pub fn generate_sample(ast: &Node, seed: u64) -> String {
    SampleGenerator::new(seed).visit(ast)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ParserConfig;
    use crate::core::parser::parse;

    fn sample_of(body: &str, seed: u64) -> String {
        let ast = parse(body, '/', Flags::default(), ParserConfig::default()).unwrap();
        generate_sample(&ast, seed)
    }

    #[test]
    fn literal_sample_is_itself() {
        assert_eq!(sample_of("hello", 1), "hello");
    }

    #[test]
    fn digit_class_samples_a_digit() {
        assert_eq!(sample_of(r"\d", 1), "5");
    }

    #[test]
    fn exact_quantifier_repeats_min_times() {
        assert_eq!(sample_of("a{3}", 1), "aaa");
    }

    #[test]
    fn optional_quantifier_contributes_nothing_by_default() {
        assert_eq!(sample_of("a?", 1), "");
    }

    #[test]
    fn lookaround_contributes_nothing() {
        assert_eq!(sample_of("(?=foo)bar", 1), "bar");
    }

    #[test]
    fn backreference_reuses_captured_text() {
        assert_eq!(sample_of(r"(ab)\1", 1), "abab");
    }

    #[test]
    fn sample_is_deterministic_for_same_seed() {
        assert_eq!(sample_of("a|b|c", 42), sample_of("a|b|c", 42));
    }

    #[test]
    fn zero_seed_does_not_panic() {
        let _ = sample_of("a|b|c", 0);
    }
}
