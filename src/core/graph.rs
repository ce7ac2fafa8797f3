//! Generic node/edge graph builder.
//!
//! Produces a renderer-agnostic `Graph`; `mermaid.rs` is the one
//! renderer built on top of it. Walks the AST into an explicit
//! node/edge list a layout engine can consume directly.

use crate::core::ast::Node;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: u32,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: u32,
    pub to: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

fn label_for(node: &Node) -> String {
    match node {
        Node::Regex(_) => "Regex".to_string(),
        Node::Sequence(_) => "Sequence".to_string(),
        Node::Alternation(_) => "Alternation".to_string(),
        Node::Literal(l) => format!("Literal {:?}", l.value),
        Node::CharLiteral(c) => format!("CharLiteral {:?}", c.raw),
        Node::Dot(_) => "Dot".to_string(),
        Node::Anchor(a) => format!("Anchor {:?}", a.kind),
        Node::Assertion(a) => format!("Assertion {:?}", a.kind),
        Node::Keep(_) => "Keep".to_string(),
        Node::CharType(c) => format!("CharType \\{}", c.letter),
        Node::UnicodeProp(u) => format!("UnicodeProp {}", u.name),
        Node::CharClass(c) => format!("CharClass negated={}", c.negated),
        Node::Range(_) => "Range".to_string(),
        Node::PosixClass(p) => format!("PosixClass {}", p.name),
        Node::Quantifier(q) => format!("Quantifier {}", q.text),
        Node::Group(g) => format!("Group {:?}", g.kind),
        Node::Backref(b) => format!("Backref {:?}", b.form),
        Node::Subroutine(_) => "Subroutine".to_string(),
        Node::Conditional(_) => "Conditional".to_string(),
        Node::Callout(_) => "Callout".to_string(),
        Node::PcreVerb(v) => format!("PcreVerb {}", v.name),
        Node::Comment(_) => "Comment".to_string(),
    }
}

fn walk(node: &Node, nodes: &mut Vec<GraphNode>, edges: &mut Vec<GraphEdge>) -> u32 {
    let id = nodes.len() as u32;
    nodes.push(GraphNode {
        id,
        label: label_for(node),
    });
    for child in node.children() {
        let child_id = walk(child, nodes, edges);
        edges.push(GraphEdge { from: id, to: child_id });
    }
    id
}

/// Flatten `ast` into an explicit node/edge list, in pre-order.
pub fn build_graph(ast: &Node) -> Graph {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    walk(ast, &mut nodes, &mut edges);
    Graph { nodes, edges }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ast::Flags;
    use crate::core::config::ParserConfig;
    use crate::core::parser::parse;

    #[test]
    fn graph_has_one_node_per_ast_node() {
        let ast = parse("ab", '/', Flags::default(), ParserConfig::default()).unwrap();
        let graph = build_graph(&ast);
        // Regex -> Sequence -> Literal("a") -> Literal("b") would be 3 nodes,
        // but adjacent literals aren't merged at parse time, so this just
        // checks the edge count matches node count minus the root.
        assert_eq!(graph.edges.len(), graph.nodes.len() - 1);
    }

    #[test]
    fn quantifier_edge_points_at_its_target() {
        let ast = parse("a+", '/', Flags::default(), ParserConfig::default()).unwrap();
        let graph = build_graph(&ast);
        let quantifier_id = graph
            .nodes
            .iter()
            .find(|n| n.label.starts_with("Quantifier"))
            .unwrap()
            .id;
        assert!(graph.edges.iter().any(|e| e.from == quantifier_id));
    }
}
