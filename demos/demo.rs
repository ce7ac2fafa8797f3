use pcrelab_core::core::complexity::complexity_score;
use pcrelab_core::core::config::RedosConfig;
use pcrelab_core::core::explain::explain_prose;
use pcrelab_core::core::optimizer::optimize;
use pcrelab_core::core::recompiler::recompile;
use pcrelab_core::core::redos::analyze;
use pcrelab_core::core::sample::generate_sample;
use pcrelab_core::{parse_pattern, validate_pattern};

fn show(raw: &str) {
    println!("pattern: {}", raw);

    let outcome = match validate_pattern(raw) {
        Ok(outcome) => outcome,
        Err(e) => {
            println!("  {}\n", e.to_formatted_string(raw));
            return;
        }
    };
    if !outcome.is_valid {
        println!("  invalid: {}\n", outcome.error.unwrap_or_default());
        return;
    }

    let ast = parse_pattern(raw).expect("already validated above");
    let optimized = optimize(&ast);
    let report = analyze(raw, &ast, &RedosConfig::default());

    println!("  explanation: {}", explain_prose(&ast));
    println!("  optimized:   {}", recompile(&optimized));
    println!("  sample:      {:?}", generate_sample(&ast, 1));
    println!("  complexity:  {:?}", complexity_score(&ast));
    println!("  redos:       {:?} {:?}", report.severity, report.reasons);
    println!();
}

fn main() {
    println!("=== pcrelab demo ===\n");
    show("/hello/");
    show("/^test.*$/");
    show("/cat|dog|bird/");
    show("/(?:ab)+/");
    show(r"/(?<word>\w+)/");
    show("/test(?=123)/");
    show("/(a+)+b/");
}
