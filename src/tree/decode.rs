//! JSON wire decoding for trees and updates.
//!
//! Each node is an object with exactly one of the fields `element` or `block`:
//!
//! ```text
//! {"element": {"type": "button", "id": "go", "label": "Go"}}
//! {"block": {"kind": {"type": "column", "weight": 1.0}, "children": [ ... ]}}
//! ```
//!
//! Anything else is a [`TreeError::MalformedNode`]. Decoding stops at the first
//! error; a partially valid tree is never returned.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{NodePath, TreeError};

use super::delta::{Delta, Update, UpdateBody};
use super::generation::Generation;
use super::node::{Block, BlockKind, Element, ElementPayload, Node};

/// Decode a single node (element or block) from a JSON value.
pub fn decode_node(value: &Value) -> Result<Arc<Node>, TreeError> {
    decode_at(value, &NodePath::root())
}

/// Decode a full tree. The root must be a block.
pub fn decode_tree(value: &Value) -> Result<Arc<Node>, TreeError> {
    let node = decode_node(value)?;
    if node.as_block().is_none() {
        return Err(TreeError::RootNotBlock);
    }
    Ok(node)
}

/// Parse and decode a full tree from JSON text.
pub fn parse_tree(json: &str) -> Result<Arc<Node>, TreeError> {
    let value: Value = serde_json::from_str(json)?;
    decode_tree(&value)
}

/// Parse an update message: a full tree or a delta, tagged with a generation.
///
/// ```text
/// {"generation": "run-7", "tree": { ...root block... }}
/// {"generation": "run-7", "delta": {"path": [1, 0], "node": { ... }}}
/// ```
pub fn parse_update(json: &str) -> Result<Update, TreeError> {
    let value: Value = serde_json::from_str(json)?;
    decode_update(&value)
}

/// Decode an update message from a JSON value.
pub fn decode_update(value: &Value) -> Result<Update, TreeError> {
    let root = NodePath::root();
    let object = value
        .as_object()
        .ok_or_else(|| invalid(&root, "update must be an object"))?;

    let generation = match object.get("generation") {
        Some(Value::String(token)) => Generation::new(token),
        Some(_) => return Err(invalid(&root, "`generation` must be a string")),
        None => return Err(invalid(&root, "missing field `generation`")),
    };

    let body = match (object.get("tree"), object.get("delta")) {
        (Some(tree), None) => UpdateBody::Tree(decode_tree(tree)?),
        (None, Some(delta)) => UpdateBody::Delta(decode_delta(delta)?),
        (Some(_), Some(_)) => {
            return Err(invalid(&root, "update has both `tree` and `delta`"));
        }
        (None, None) => {
            return Err(invalid(&root, "update needs one of `tree` or `delta`"));
        }
    };

    Ok(Update { generation, body })
}

fn decode_delta(value: &Value) -> Result<Delta, TreeError> {
    let root = NodePath::root();
    let object = value
        .as_object()
        .ok_or_else(|| invalid(&root, "delta must be an object"))?;

    let indices = object
        .get("path")
        .ok_or_else(|| invalid(&root, "delta is missing field `path`"))?;
    let indices = Vec::<usize>::deserialize(indices).map_err(|e| invalid(&root, e))?;
    if indices.is_empty() {
        return Err(TreeError::EmptyDeltaPath);
    }
    let path = NodePath::from(indices);

    let node = object
        .get("node")
        .ok_or_else(|| invalid(&path, "delta is missing field `node`"))?;
    let node = decode_at(node, &path)?;

    Ok(Delta { path, node })
}

// ---------------------------------------------------------------------------
// Recursive descent
// ---------------------------------------------------------------------------

fn decode_at(value: &Value, path: &NodePath) -> Result<Arc<Node>, TreeError> {
    let object = value
        .as_object()
        .ok_or_else(|| malformed(path, "expected an object"))?;

    match (object.get("element"), object.get("block")) {
        (Some(element), None) => decode_element(element, path),
        (None, Some(block)) => decode_block(block, path),
        (Some(_), Some(_)) => Err(malformed(path, "node has both `element` and `block`")),
        (None, None) => Err(malformed(
            path,
            "expected exactly one of `element` or `block`",
        )),
    }
}

fn decode_element(value: &Value, path: &NodePath) -> Result<Arc<Node>, TreeError> {
    let payload = ElementPayload::deserialize(value).map_err(|e| invalid(path, e))?;
    Ok(Arc::new(Node::Element(Element::new(payload))))
}

fn decode_block(value: &Value, path: &NodePath) -> Result<Arc<Node>, TreeError> {
    let object: &Map<String, Value> = value
        .as_object()
        .ok_or_else(|| invalid(path, "block must be an object"))?;

    let kind = object
        .get("kind")
        .ok_or_else(|| invalid(path, "missing field `kind`"))?;
    let kind = BlockKind::deserialize(kind).map_err(|e| invalid(path, e))?;

    let children = match object.get("children") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(index, child)| decode_at(child, &path.child(index)))
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(invalid(path, "`children` must be an array")),
    };

    Ok(Arc::new(Node::Block(Block { kind, children })))
}

fn malformed(path: &NodePath, reason: &str) -> TreeError {
    TreeError::MalformedNode {
        path: path.clone(),
        reason: reason.to_owned(),
    }
}

fn invalid(path: &NodePath, message: impl ToString) -> TreeError {
    TreeError::InvalidPayload {
        path: path.clone(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn decode_nested_tree() {
        let tree = decode_tree(&json!({
            "block": {
                "kind": {"type": "vertical"},
                "children": [
                    {"element": {"type": "markdown", "body": "# Title"}},
                    {"block": {
                        "kind": {"type": "column", "weight": 2.0},
                        "children": [
                            {"element": {"type": "slider", "id": "s", "label": "S",
                                         "min": 0.0, "max": 10.0, "value": 3.0}}
                        ]
                    }}
                ]
            }
        }))
        .unwrap();

        let root = tree.as_block().unwrap();
        assert_eq!(root.kind, BlockKind::Vertical { border: false });
        assert_eq!(root.children.len(), 2);
        let slider = tree.descendant(&[1, 0]).unwrap();
        assert_eq!(slider.stable_key().unwrap().as_str(), "s");
    }

    #[test]
    fn children_default_to_empty() {
        let node = decode_node(&json!({"block": {"kind": {"type": "tab_container"}}})).unwrap();
        assert!(node.children().is_empty());
        assert_eq!(node.as_block().unwrap().kind, BlockKind::TabContainer);
    }

    #[test]
    fn neither_variant_is_malformed() {
        let err = decode_tree(&json!({
            "block": {
                "kind": {"type": "vertical"},
                "children": [
                    {"element": {"type": "empty"}},
                    {"widget": {"type": "button"}}
                ]
            }
        }))
        .unwrap_err();

        match err {
            TreeError::MalformedNode { path, .. } => assert_eq!(path.as_slice(), &[1]),
            other => panic!("expected MalformedNode, got {other:?}"),
        }
    }

    #[test]
    fn both_variants_is_malformed() {
        let err = decode_node(&json!({
            "element": {"type": "empty"},
            "block": {"kind": {"type": "vertical"}}
        }))
        .unwrap_err();
        assert!(matches!(err, TreeError::MalformedNode { .. }));
    }

    #[test]
    fn non_object_is_malformed() {
        let err = decode_node(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, TreeError::MalformedNode { .. }));
    }

    #[test]
    fn unknown_payload_type_is_invalid() {
        let err = decode_node(&json!({"element": {"type": "hologram"}})).unwrap_err();
        match err {
            TreeError::InvalidPayload { path, message } => {
                assert!(path.is_root());
                assert!(message.contains("hologram"), "message: {message}");
            }
            other => panic!("expected InvalidPayload, got {other:?}"),
        }
    }

    #[test]
    fn block_without_kind_is_invalid() {
        let err = decode_node(&json!({"block": {"children": []}})).unwrap_err();
        assert!(matches!(err, TreeError::InvalidPayload { .. }));
    }

    #[test]
    fn element_root_is_rejected() {
        let err = decode_tree(&json!({"element": {"type": "empty"}})).unwrap_err();
        assert!(matches!(err, TreeError::RootNotBlock));
    }

    #[test]
    fn parse_tree_bad_json() {
        let err = parse_tree("{not json").unwrap_err();
        assert!(matches!(err, TreeError::Json(_)));
    }

    #[test]
    fn parse_full_tree_update() {
        let update = parse_update(
            r#"{"generation": "run-1", "tree": {"block": {"kind": {"type": "vertical"}}}}"#,
        )
        .unwrap();
        assert_eq!(update.generation, Generation::from("run-1"));
        assert!(matches!(update.body, UpdateBody::Tree(_)));
    }

    #[test]
    fn parse_delta_update() {
        let update = parse_update(
            r#"{"generation": "run-1",
                "delta": {"path": [0, 2], "node": {"element": {"type": "text", "body": "hi"}}}}"#,
        )
        .unwrap();
        match update.body {
            UpdateBody::Delta(delta) => {
                assert_eq!(delta.path.as_slice(), &[0, 2]);
                assert_eq!(delta.node.kind_name(), "element");
            }
            UpdateBody::Tree(_) => panic!("expected delta"),
        }
    }

    #[test]
    fn malformed_delta_node_reports_delta_path() {
        let err = parse_update(
            r#"{"generation": "g", "delta": {"path": [3], "node": {"oops": {}}}}"#,
        )
        .unwrap_err();
        match err {
            TreeError::MalformedNode { path, .. } => assert_eq!(path.as_slice(), &[3]),
            other => panic!("expected MalformedNode, got {other:?}"),
        }
    }

    #[test]
    fn empty_delta_path_rejected() {
        let err = parse_update(
            r#"{"generation": "g", "delta": {"path": [], "node": {"element": {"type": "empty"}}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, TreeError::EmptyDeltaPath));
    }

    #[test]
    fn update_without_generation_rejected() {
        let err = parse_update(r#"{"tree": {"block": {"kind": {"type": "vertical"}}}}"#)
            .unwrap_err();
        assert!(matches!(err, TreeError::InvalidPayload { .. }));
    }
}
