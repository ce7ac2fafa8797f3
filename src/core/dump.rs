//! AST-to-JSON dumper.
//!
//! A thin wrapper, not a visitor: `Node`'s `#[serde(tag = "type")]`
//! derive already produces the tagged JSON shape directly, with no
//! hand-rolled `to_dict()` method needed.

use crate::core::ast::Node;

/// Serialize `ast` to a `serde_json::Value` tree (one JSON object per
/// node, tagged by `"type"`).
pub fn dump(ast: &Node) -> serde_json::Value {
    serde_json::to_value(ast).expect("Node serialization is infallible")
}

/// Pretty-printed JSON string form of [`dump`].
pub fn dump_pretty(ast: &Node) -> String {
    serde_json::to_string_pretty(ast).expect("Node serialization is infallible")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ast::Flags;
    use crate::core::config::ParserConfig;
    use crate::core::parser::parse;

    #[test]
    fn dump_tags_node_type() {
        let ast = parse("a", '/', Flags::default(), ParserConfig::default()).unwrap();
        let value = dump(&ast);
        assert_eq!(value["type"], "Regex");
    }

    #[test]
    fn dump_pretty_round_trips_through_json() {
        let ast = parse(r"(a|b)+", '/', Flags::default(), ParserConfig::default()).unwrap();
        let text = dump_pretty(&ast);
        let reparsed: Node = serde_json::from_str(&text).unwrap();
        assert_eq!(reparsed, ast);
    }
}
