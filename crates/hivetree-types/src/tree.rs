//! Portable export trees: the serialized form of a container subtree.
//!
//! A tree is a name-keyed map whose entries are either nested maps
//! (subcontainers) or field leaves. The two export modes are distinct types
//! rather than a runtime switch, so each deserializes unambiguously:
//!
//! - [`PlainTree`] — untyped mode; a leaf is the bare [`Value`] and the
//!   store tag is re-inferred on import.
//! - [`TypedTree`] — typed mode; a leaf is a `(value, tag)` pair carrying
//!   the portable tag name, so the exact store type survives the round trip.
//!
//! The serde/JSON projection is the external contract: nested JSON objects
//! are always subcontainers, scalars (or `[value, "TAG"]` pairs in typed
//! mode) are always fields — that is the disambiguation rule for the flat
//! namespace the map multiplexes. Binary leaves project as plain number
//! arrays; any byte-to-text encoding (base64 or otherwise) is the caller's
//! concern, not hivetree's.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tag::ValueTag;
use crate::value::Value;

/// An untyped exported subtree.
pub type PlainTree = BTreeMap<String, PlainNode>;

/// A typed exported subtree.
pub type TypedTree = BTreeMap<String, TypedNode>;

/// One entry of a [`PlainTree`]: a subcontainer or a bare field value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlainNode {
    /// A nested subcontainer.
    Subtree(PlainTree),
    /// A field leaf, tag re-inferred on import.
    Field(Value),
}

/// One entry of a [`TypedTree`]: a subcontainer or a `(value, tag)` field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypedNode {
    /// A nested subcontainer.
    Subtree(TypedTree),
    /// A field leaf with its exact store tag, projected as `[value, "TAG"]`.
    Field(Value, ValueTag),
}

impl PlainNode {
    /// The nested subtree, if this entry is a subcontainer.
    pub fn as_subtree(&self) -> Option<&PlainTree> {
        match self {
            PlainNode::Subtree(tree) => Some(tree),
            PlainNode::Field(_) => None,
        }
    }

    /// The field value, if this entry is a leaf.
    pub fn as_field(&self) -> Option<&Value> {
        match self {
            PlainNode::Field(value) => Some(value),
            PlainNode::Subtree(_) => None,
        }
    }
}

impl TypedNode {
    /// The nested subtree, if this entry is a subcontainer.
    pub fn as_subtree(&self) -> Option<&TypedTree> {
        match self {
            TypedNode::Subtree(tree) => Some(tree),
            TypedNode::Field(..) => None,
        }
    }

    /// The field value and tag, if this entry is a leaf.
    pub fn as_field(&self) -> Option<(&Value, ValueTag)> {
        match self {
            TypedNode::Field(value, tag) => Some((value, *tag)),
            TypedNode::Subtree(_) => None,
        }
    }
}

impl From<Value> for PlainNode {
    fn from(value: Value) -> Self {
        PlainNode::Field(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_typed() -> TypedTree {
        let mut inner = TypedTree::new();
        inner.insert(
            "flag".into(),
            TypedNode::Field(Value::Int32(1), ValueTag::Int32),
        );
        let mut tree = TypedTree::new();
        tree.insert(
            "name".into(),
            TypedNode::Field(Value::String("app".into()), ValueTag::String),
        );
        tree.insert(
            "big".into(),
            TypedNode::Field(Value::Int64(9_999_999_999), ValueTag::Int64),
        );
        tree.insert("Settings".into(), TypedNode::Subtree(inner));
        tree
    }

    #[test]
    fn typed_projection_is_objects_and_pairs() {
        let json = serde_json::to_value(sample_typed()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "Settings": { "flag": [1, "INTEGER"] },
                "big": [9999999999u64, "LONG_INT"],
                "name": ["app", "STRING"],
            })
        );
    }

    #[test]
    fn typed_projection_round_trips() {
        let tree = sample_typed();
        let json = serde_json::to_string(&tree).unwrap();
        let back: TypedTree = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn plain_projection_is_objects_and_scalars() {
        let mut tree = PlainTree::new();
        tree.insert("port".into(), PlainNode::Field(Value::Int32(8080)));
        tree.insert(
            "tags".into(),
            PlainNode::Field(Value::MultiString(vec!["a".into(), "b".into()])),
        );
        tree.insert("absentType".into(), PlainNode::Field(Value::None));
        tree.insert("Sub".into(), PlainNode::Subtree(PlainTree::new()));

        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "Sub": {},
                "absentType": null,
                "port": 8080,
                "tags": ["a", "b"],
            })
        );

        let back: PlainTree = serde_json::from_str(&json.to_string()).unwrap();
        assert_eq!(back.get("Sub").unwrap().as_subtree(), Some(&PlainTree::new()));
        assert_eq!(
            back.get("port").unwrap().as_field(),
            Some(&Value::Int32(8080))
        );
        assert_eq!(
            back.get("absentType").unwrap().as_field(),
            Some(&Value::None)
        );
    }

    #[test]
    fn nested_objects_always_parse_as_subcontainers() {
        let back: PlainTree = serde_json::from_str(r#"{"A": {"B": {"x": 1}}}"#).unwrap();
        let a = back.get("A").unwrap().as_subtree().unwrap();
        let b = a.get("B").unwrap().as_subtree().unwrap();
        assert_eq!(b.get("x").unwrap().as_field(), Some(&Value::Int32(1)));
    }

    #[test]
    fn typed_pairs_reject_unknown_tag_names() {
        assert!(serde_json::from_str::<TypedTree>(r#"{"x": [1, "DWORD"]}"#).is_err());
    }
}
