//! Shape-tolerant node trees and the predicate counter that walks them.
//!
//! Trees arrive from third-party services as loosely shaped JSON. Rather than
//! probing the raw value at every step, a tree is classified once into
//! [`Tree`] variants and the counter matches on those. Anything that is not an
//! object or an array becomes [`Tree::Malformed`] and counts as zero.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// A node payload that can be read out of a JSON object.
///
/// Implementations must not fail: unknown or mistyped fields become `None`
/// or empty values.
pub trait FromShape: Sized {
    fn from_object(object: &Map<String, Value>) -> Self;
}

/// A node tree classified by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Tree<T> {
    /// An object whose `children` field is absent or not an array.
    Leaf(T),
    /// An object with an array of children (possibly empty).
    Internal(T, Vec<Tree<T>>),
    /// A bare array of trees.
    Forest(Vec<Tree<T>>),
    /// Any other JSON value.
    Malformed,
}

impl<T> Tree<T> {
    /// Count the nodes for which `predicate` holds, over the whole tree.
    ///
    /// For a forest this is the sum over its elements; a malformed tree
    /// counts zero.
    pub fn count<P>(&self, predicate: &P) -> usize
    where
        P: Fn(&T) -> bool,
    {
        match self {
            Tree::Leaf(node) => usize::from(predicate(node)),
            Tree::Internal(node, children) => {
                usize::from(predicate(node))
                    + children.iter().map(|c| c.count(predicate)).sum::<usize>()
            }
            Tree::Forest(items) => items.iter().map(|t| t.count(predicate)).sum(),
            Tree::Malformed => 0,
        }
    }

    /// The payload of the top-level node, if the tree is a single node.
    pub fn root(&self) -> Option<&T> {
        match self {
            Tree::Leaf(node) | Tree::Internal(node, _) => Some(node),
            Tree::Forest(_) | Tree::Malformed => None,
        }
    }

    /// Children of the top-level node, or the elements of a forest.
    pub fn children(&self) -> &[Tree<T>] {
        match self {
            Tree::Internal(_, children) => children,
            Tree::Forest(items) => items,
            Tree::Leaf(_) | Tree::Malformed => &[],
        }
    }
}

impl<T: FromShape> Tree<T> {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(object) => {
                let node = T::from_object(object);
                match object.get("children") {
                    Some(Value::Array(children)) => {
                        Tree::Internal(node, children.iter().map(Tree::from_value).collect())
                    }
                    _ => Tree::Leaf(node),
                }
            }
            Value::Array(items) => Tree::Forest(items.iter().map(Tree::from_value).collect()),
            _ => Tree::Malformed,
        }
    }
}

impl<T: FromShape> From<&Value> for Tree<T> {
    fn from(value: &Value) -> Self {
        Tree::from_value(value)
    }
}

impl<'de, T: FromShape> Deserialize<'de> for Tree<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Tree::from_value(&value))
    }
}
