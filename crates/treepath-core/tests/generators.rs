#![allow(dead_code)]

use proptest::prelude::*;
use serde_json::{Map, Value, json};
use treepath_core::TreeNode;

/// Typed test node. `id` is the node's pre-order index within its forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: u32,
    pub tag: u8,
    pub children: Vec<Node>,
}

impl TreeNode for Node {
    fn children(&self) -> &[Self] {
        &self.children
    }
}

/// Number of distinct tags; small so predicates hit often.
pub const TAGS: u8 = 4;

pub fn arb_node() -> impl Strategy<Value = Node> {
    let leaf = (0..TAGS).prop_map(|tag| Node {
        id: 0,
        tag,
        children: Vec::new(),
    });
    leaf.prop_recursive(5, 64, 4, |inner| {
        (0..TAGS, prop::collection::vec(inner, 0..4)).prop_map(|(tag, children)| Node {
            id: 0,
            tag,
            children,
        })
    })
}

/// A forest of 0..4 roots with pre-order ids assigned.
pub fn arb_forest() -> impl Strategy<Value = Vec<Node>> {
    prop::collection::vec(arb_node(), 0..4).prop_map(|mut forest| {
        let mut next = 0;
        number_preorder(&mut forest, &mut next);
        forest
    })
}

fn number_preorder(nodes: &mut [Node], next: &mut u32) {
    for node in nodes {
        node.id = *next;
        *next += 1;
        number_preorder(&mut node.children, next);
    }
}

pub fn count(forest: &[Node]) -> usize {
    forest.iter().map(|n| 1 + count(&n.children)).sum()
}

/// Plain recursive search used as the oracle.
pub fn reference_path(forest: &[Node], predicate: &dyn Fn(&Node) -> bool) -> Vec<u32> {
    fn walk(nodes: &[Node], predicate: &dyn Fn(&Node) -> bool, path: &mut Vec<u32>) -> bool {
        for node in nodes {
            path.push(node.id);
            if predicate(node) || walk(&node.children, predicate, path) {
                return true;
            }
            path.pop();
        }
        false
    }

    let mut path = Vec::new();
    walk(forest, predicate, &mut path);
    path
}

/// Encode the forest as JSON with children under `key`. Leaves omit the key.
pub fn to_json(forest: &[Node], key: &str) -> Value {
    Value::Array(forest.iter().map(|n| node_json(n, key, None)).collect())
}

/// Like [`to_json`] but inserts a `null` after every entry whose
/// `(id + seed) % 3 == 0`, and one at the front of every non-empty array.
pub fn to_json_with_nulls(forest: &[Node], key: &str, seed: u32) -> Value {
    Value::Array(sprinkle(forest, key, seed))
}

fn sprinkle(nodes: &[Node], key: &str, seed: u32) -> Vec<Value> {
    let mut out = Vec::new();
    if !nodes.is_empty() {
        out.push(Value::Null);
    }
    for node in nodes {
        out.push(node_json(node, key, Some(seed)));
        if (node.id + seed) % 3 == 0 {
            out.push(Value::Null);
        }
    }
    out
}

fn node_json(node: &Node, key: &str, seed: Option<u32>) -> Value {
    let mut fields = Map::new();
    fields.insert("id".into(), json!(node.id));
    fields.insert("tag".into(), json!(node.tag));
    if !node.children.is_empty() {
        let children = match seed {
            Some(seed) => sprinkle(&node.children, key, seed),
            None => node
                .children
                .iter()
                .map(|c| node_json(c, key, None))
                .collect(),
        };
        fields.insert(key.into(), Value::Array(children));
    }
    Value::Object(fields)
}

pub fn json_ids(path: &[&Value]) -> Vec<u32> {
    path.iter()
        .filter_map(|v| v["id"].as_u64())
        .filter_map(|id| u32::try_from(id).ok())
        .collect()
}
