//! Mermaid `flowchart` renderer over [`Graph`](crate::core::graph::Graph).
//! Deliberately thin: label escaping and edge emission only, no layout
//! decisions — rendering is left to whatever consumes the Mermaid text.

use crate::core::graph::Graph;

fn escape(label: &str) -> String {
    label.replace('"', "&quot;").replace('\n', "\\n")
}

/// Render `graph` as a Mermaid `flowchart TD` diagram definition.
pub fn to_mermaid(graph: &Graph) -> String {
    let mut out = String::from("flowchart TD\n");
    for node in &graph.nodes {
        out.push_str(&format!("    n{}[\"{}\"]\n", node.id, escape(&node.label)));
    }
    for edge in &graph.edges {
        out.push_str(&format!("    n{} --> n{}\n", edge.from, edge.to));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ast::Flags;
    use crate::core::config::ParserConfig;
    use crate::core::graph::build_graph;
    use crate::core::parser::parse;

    #[test]
    fn mermaid_output_declares_flowchart_and_edges() {
        let ast = parse("a+", '/', Flags::default(), ParserConfig::default()).unwrap();
        let graph = build_graph(&ast);
        let text = to_mermaid(&graph);
        assert!(text.starts_with("flowchart TD\n"));
        assert!(text.contains("-->"));
    }

    #[test]
    fn quotes_in_labels_are_escaped() {
        let ast = parse("\"", '/', Flags::default(), ParserConfig::default()).unwrap();
        let graph = build_graph(&ast);
        let text = to_mermaid(&graph);
        assert!(!text.contains("[\"\"\"\"]"));
    }
}
