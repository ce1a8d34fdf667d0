//! The native `Node` tree and its ops.
//!
//! `Node` carries the full numeric palette (i8/i16/i32/i64/f32/f64) that
//! JSON flattens away, which makes it the reference format for cross-format
//! conversion tests and the binary payload envelope. Maps are plain entry
//! vectors, so insertion order is structural.

use datafix_tree::{DataError, DataResult, TreeOps};
use serde::{Deserialize, Serialize};

/// An owned, insertion-ordered tree value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Empty,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Str(String),
    List(Vec<Node>),
    Map(Vec<(String, Node)>),
}

impl Node {
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Node::I8(_) | Node::I16(_) | Node::I32(_) | Node::I64(_) | Node::F32(_) | Node::F64(_)
        )
    }

    /// The numeric payload widened to f64, if this node is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Node::I8(v) => Some(*v as f64),
            Node::I16(v) => Some(*v as f64),
            Node::I32(v) => Some(*v as f64),
            Node::I64(v) => Some(*v as f64),
            Node::F32(v) => Some(*v as f64),
            Node::F64(v) => Some(*v),
            _ => None,
        }
    }
}

/// `TreeOps` implementation for [`Node`] trees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeOps;

fn mismatch(expected: &'static str, found: &Node) -> DataError {
    DataError::TypeMismatch {
        expected,
        found: format!("{found:?}"),
    }
}

impl TreeOps for NodeOps {
    type Value = Node;

    fn empty(&self) -> Node {
        Node::Empty
    }

    fn bool(&self, value: bool) -> Node {
        Node::Bool(value)
    }

    fn i8(&self, value: i8) -> Node {
        Node::I8(value)
    }

    fn i16(&self, value: i16) -> Node {
        Node::I16(value)
    }

    fn i32(&self, value: i32) -> Node {
        Node::I32(value)
    }

    fn i64(&self, value: i64) -> Node {
        Node::I64(value)
    }

    fn f32(&self, value: f32) -> Node {
        Node::F32(value)
    }

    fn f64(&self, value: f64) -> Node {
        Node::F64(value)
    }

    fn string(&self, value: &str) -> Node {
        Node::Str(value.to_string())
    }

    fn empty_list(&self) -> Node {
        Node::List(Vec::new())
    }

    fn empty_map(&self) -> Node {
        Node::Map(Vec::new())
    }

    fn is_null(&self, value: &Node) -> bool {
        matches!(value, Node::Empty)
    }

    fn is_bool(&self, value: &Node) -> bool {
        matches!(value, Node::Bool(_))
    }

    fn is_number(&self, value: &Node) -> bool {
        value.is_numeric()
    }

    fn is_string(&self, value: &Node) -> bool {
        matches!(value, Node::Str(_))
    }

    fn is_list(&self, value: &Node) -> bool {
        matches!(value, Node::List(_))
    }

    fn is_map(&self, value: &Node) -> bool {
        matches!(value, Node::Map(_))
    }

    fn as_bool(&self, value: &Node) -> DataResult<bool> {
        match value {
            Node::Bool(b) => DataResult::ok(*b),
            other => DataResult::error(mismatch("bool", other)),
        }
    }

    fn as_number(&self, value: &Node) -> DataResult<f64> {
        match value.as_f64() {
            Some(n) => DataResult::ok(n),
            None => DataResult::error(mismatch("number", value)),
        }
    }

    fn as_string(&self, value: &Node) -> DataResult<String> {
        match value {
            Node::Str(s) => DataResult::ok(s.clone()),
            other => DataResult::error(mismatch("string", other)),
        }
    }

    fn list_items(&self, value: &Node) -> DataResult<Vec<Node>> {
        match value {
            Node::List(items) => DataResult::ok(items.clone()),
            other => DataResult::error(mismatch("list", other)),
        }
    }

    fn map_entries(&self, value: &Node) -> DataResult<Vec<(Node, Node)>> {
        match value {
            Node::Map(entries) => DataResult::ok(
                entries
                    .iter()
                    .map(|(k, v)| (Node::Str(k.clone()), v.clone()))
                    .collect(),
            ),
            other => DataResult::error(mismatch("map", other)),
        }
    }

    fn get(&self, value: &Node, key: &str) -> Option<Node> {
        match value {
            Node::Map(entries) => entries
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone()),
            _ => None,
        }
    }

    fn merge_to_list(&self, list: &Node, element: Node) -> DataResult<Node> {
        match list {
            Node::Empty => DataResult::ok(Node::List(vec![element])),
            Node::List(items) => {
                let mut items = items.clone();
                items.push(element);
                DataResult::ok(Node::List(items))
            }
            other => DataResult::error(mismatch("list", other)),
        }
    }

    fn merge_to_map(&self, map: &Node, key: Node, value: Node) -> DataResult<Node> {
        let key = match key {
            Node::Str(k) => k,
            other => return DataResult::error(mismatch("string key", &other)),
        };
        match map {
            Node::Empty => DataResult::ok(Node::Map(vec![(key, value)])),
            Node::Map(entries) => {
                let mut entries = entries.clone();
                match entries.iter_mut().find(|(k, _)| *k == key) {
                    Some(slot) => slot.1 = value,
                    None => entries.push((key, value)),
                }
                DataResult::ok(Node::Map(entries))
            }
            other => DataResult::error(mismatch("map", other)),
        }
    }

    fn create_list(&self, items: Vec<Node>) -> Node {
        Node::List(items)
    }

    fn create_map(&self, entries: Vec<(Node, Node)>) -> Node {
        Node::Map(
            entries
                .into_iter()
                .filter_map(|(k, v)| match k {
                    Node::Str(key) => Some((key, v)),
                    _ => None,
                })
                .collect(),
        )
    }

    fn set(&self, value: &Node, key: &str, entry: Node) -> Node {
        match value {
            Node::Map(entries) => {
                let mut entries = entries.clone();
                match entries.iter_mut().find(|(k, _)| k == key) {
                    Some(slot) => slot.1 = entry,
                    None => entries.push((key.to_string(), entry)),
                }
                Node::Map(entries)
            }
            _ => Node::Map(vec![(key.to_string(), entry)]),
        }
    }

    fn remove(&self, value: &Node, key: &str) -> Node {
        match value {
            Node::Map(entries) => Node::Map(
                entries
                    .iter()
                    .filter(|(k, _)| k != key)
                    .cloned()
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}
