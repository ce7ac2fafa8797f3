//! Lexer/parser throughput benchmarks: one group per representative
//! input shape, `black_box` on both input and output.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pcrelab_core::core::ast::Flags;
use pcrelab_core::core::config::ParserConfig;
use pcrelab_core::core::lexer::Lexer;
use pcrelab_core::core::parser::parse;

const PATTERNS: &[(&str, &str)] = &[
    ("literal", "hello world"),
    ("alternation", "cat|dog|bird|fish|snake|lizard|horse|cow"),
    ("nested_groups", "((((a+)*)+)*)+"),
    ("char_class", "[a-zA-Z0-9_\\-]+"),
    (
        "email_like",
        r"(?P<user>[\w.+-]+)@(?P<host>[\w-]+\.[\w.-]+)",
    ),
    ("backrefs", r"(a)(b)(c)\1\2\3"),
];

fn lexer_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer");
    for (name, pattern) in PATTERNS {
        group.bench_with_input(BenchmarkId::from_parameter(name), pattern, |b, pattern| {
            b.iter(|| {
                let lexer = Lexer::new(black_box(pattern)).unwrap();
                black_box(lexer.tokenize().unwrap())
            });
        });
    }
    group.finish();
}

fn parser_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");
    for (name, pattern) in PATTERNS {
        group.bench_with_input(BenchmarkId::from_parameter(name), pattern, |b, pattern| {
            b.iter(|| {
                black_box(parse(
                    black_box(pattern),
                    '/',
                    Flags::default(),
                    ParserConfig::default(),
                ))
                .unwrap()
            });
        });
    }
    group.finish();
}

criterion_group!(benches, lexer_benchmarks, parser_benchmarks);
criterion_main!(benches);
