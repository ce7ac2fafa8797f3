//! Command-line front end for `pcrelab_core`.
//!
//! Every subcommand takes a full delimiter-wrapped pattern (e.g.
//! `/foo(bar)+/i`) as its positional argument, one subcommand per
//! analysis stage this crate exposes.

use clap::{Parser, Subcommand};
use pcrelab_core::core::complexity::complexity_score;
use pcrelab_core::core::config::RedosConfig;
use pcrelab_core::core::dump::dump_pretty;
use pcrelab_core::core::explain::{explain_html, explain_prose};
use pcrelab_core::core::graph::build_graph;
use pcrelab_core::core::mermaid::to_mermaid;
use pcrelab_core::core::optimizer::optimize;
use pcrelab_core::core::recompiler::recompile;
use pcrelab_core::core::redos::analyze;
use pcrelab_core::core::sample::generate_sample;
use pcrelab_core::{parse_pattern, validate_pattern};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "pcrelab", about = "Static analysis for PCRE-dialect regular expressions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a pattern and print its AST as JSON.
    Parse { pattern: String },
    /// Check a pattern for syntax and semantic errors.
    Validate { pattern: String },
    /// Print an equivalent, simplified rewrite of a pattern.
    Optimize { pattern: String },
    /// Explain a pattern in plain English.
    Explain {
        pattern: String,
        #[arg(long)]
        html: bool,
    },
    /// Analyze a pattern for catastrophic-backtracking exposure.
    Redos { pattern: String },
    /// Generate a sample string the pattern plausibly accepts.
    Sample {
        pattern: String,
        #[arg(long, default_value_t = 1)]
        seed: u64,
    },
    /// Render a pattern's AST as a Mermaid flowchart.
    Graph { pattern: String },
    /// Score a pattern's structural complexity.
    Complexity { pattern: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Parse { pattern } => run_parse(&pattern),
        Command::Validate { pattern } => run_validate(&pattern),
        Command::Optimize { pattern } => run_optimize(&pattern),
        Command::Explain { pattern, html } => run_explain(&pattern, html),
        Command::Redos { pattern } => run_redos(&pattern),
        Command::Sample { pattern, seed } => run_sample(&pattern, seed),
        Command::Graph { pattern } => run_graph(&pattern),
        Command::Complexity { pattern } => run_complexity(&pattern),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{}", message);
            ExitCode::FAILURE
        }
    }
}

fn run_parse(pattern: &str) -> Result<(), String> {
    let ast = parse_pattern(pattern).map_err(|e| e.to_formatted_string(pattern))?;
    println!("{}", dump_pretty(&ast));
    Ok(())
}

fn run_validate(pattern: &str) -> Result<(), String> {
    let outcome = validate_pattern(pattern).map_err(|e| e.to_formatted_string(pattern))?;
    if outcome.is_valid {
        println!("valid");
        Ok(())
    } else {
        Err(outcome.error.unwrap_or_else(|| "invalid pattern".to_string()))
    }
}

fn run_optimize(pattern: &str) -> Result<(), String> {
    let ast = parse_pattern(pattern).map_err(|e| e.to_formatted_string(pattern))?;
    let optimized = optimize(&ast);
    println!("{}", recompile(&optimized));
    Ok(())
}

fn run_explain(pattern: &str, html: bool) -> Result<(), String> {
    let ast = parse_pattern(pattern).map_err(|e| e.to_formatted_string(pattern))?;
    if html {
        println!("{}", explain_html(&ast));
    } else {
        println!("{}", explain_prose(&ast));
    }
    Ok(())
}

fn run_redos(pattern: &str) -> Result<(), String> {
    let ast = parse_pattern(pattern).map_err(|e| e.to_formatted_string(pattern))?;
    let report = analyze(pattern, &ast, &RedosConfig::default());
    println!("{:?}", report.severity);
    for reason in &report.reasons {
        println!("  - {}", reason);
    }
    Ok(())
}

fn run_sample(pattern: &str, seed: u64) -> Result<(), String> {
    let ast = parse_pattern(pattern).map_err(|e| e.to_formatted_string(pattern))?;
    println!("{}", generate_sample(&ast, seed));
    Ok(())
}

fn run_graph(pattern: &str) -> Result<(), String> {
    let ast = parse_pattern(pattern).map_err(|e| e.to_formatted_string(pattern))?;
    let graph = build_graph(&ast);
    println!("{}", to_mermaid(&graph));
    Ok(())
}

fn run_complexity(pattern: &str) -> Result<(), String> {
    let ast = parse_pattern(pattern).map_err(|e| e.to_formatted_string(pattern))?;
    let score = complexity_score(&ast);
    println!("{:#?}", score);
    Ok(())
}
