//! Namespace trie and path navigation
//!
//! A dotted path is either a leaf (holds a [`Value`]) or a namespace (has
//! children reachable by further segments), never both. Writing beneath a
//! leaf, or replacing a namespace with a leaf, is a type conflict.
//!
//! Deleting never prunes ancestors: removing `a.b.c` leaves `a.b` as an
//! empty namespace.

use configx_core::{Error, Result, Value};
use std::collections::BTreeMap;

/// Children of a namespace, ordered by segment name
pub type Children = BTreeMap<String, Node>;

/// A position in the tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Holds exactly one value
    Leaf(Value),
    /// Internal namespace
    Namespace(Children),
}

impl Node {
    /// Create an empty namespace node
    pub fn namespace() -> Self {
        Node::Namespace(Children::new())
    }

    /// Check if this node holds a value
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Get the value if this is a leaf
    pub fn as_leaf(&self) -> Option<&Value> {
        match self {
            Node::Leaf(value) => Some(value),
            Node::Namespace(_) => None,
        }
    }

    /// Materialise the node as a value.
    ///
    /// Leaves are copied; a namespace becomes a `Json` object mirroring its
    /// subtree (`{}` when empty).
    pub fn to_value(&self) -> Value {
        match self {
            Node::Leaf(value) => value.clone(),
            Node::Namespace(_) => Value::Json(self.to_json()),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            Node::Leaf(value) => value.to_json(),
            Node::Namespace(children) => serde_json::Value::Object(
                children
                    .iter()
                    .map(|(name, child)| (name.clone(), child.to_json()))
                    .collect(),
            ),
        }
    }
}

/// Root container of all configuration entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigTree {
    root: Children,
}

impl ConfigTree {
    /// Create an empty tree
    pub fn new() -> Self {
        ConfigTree::default()
    }

    /// Build a tree from decoded root children
    pub fn from_root(root: Children) -> Self {
        ConfigTree { root }
    }

    /// Top-level entries
    pub fn root(&self) -> &Children {
        &self.root
    }

    /// Check if the tree has no entries at all
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Locate the node at `segments` without creating anything.
    ///
    /// A missing segment, or a leaf where a namespace is needed, is
    /// `PathNotFound`: the addressed path does not exist.
    pub fn locate(&self, segments: &[String]) -> Result<&Node> {
        let (last, parents) = split(segments)?;
        let mut current = &self.root;
        for (depth, segment) in parents.iter().enumerate() {
            current = match current.get(segment) {
                Some(Node::Namespace(children)) => children,
                Some(Node::Leaf(_)) | None => return Err(not_found(&segments[..=depth])),
            };
        }
        current.get(last).ok_or_else(|| not_found(segments))
    }

    /// Check whether a leaf or namespace exists at `segments`
    pub fn contains(&self, segments: &[String]) -> bool {
        self.locate(segments).is_ok()
    }

    /// The value of the leaf at `segments`.
    ///
    /// A namespace at that path is a `TypeError`.
    pub fn leaf(&self, segments: &[String]) -> Result<&Value> {
        match self.locate(segments)? {
            Node::Leaf(value) => Ok(value),
            Node::Namespace(_) => Err(namespace_not_leaf(segments)),
        }
    }

    /// Mutable access to the value of an existing leaf
    pub fn leaf_mut(&mut self, segments: &[String]) -> Result<&mut Value> {
        let (last, parents) = split(segments)?;
        let parent = self.namespace_mut(parents, false)?;
        match parent.get_mut(last) {
            Some(Node::Leaf(value)) => Ok(value),
            Some(Node::Namespace(_)) => Err(namespace_not_leaf(segments)),
            None => Err(not_found(segments)),
        }
    }

    /// Walk to the namespace at `segments`, optionally creating missing
    /// segments along the way.
    ///
    /// When creating, a leaf prefix is a `TypeError` (it cannot become a
    /// namespace); otherwise it is `PathNotFound`. Creation starts only once
    /// every existing prefix has been walked, so a failure never leaves new
    /// namespaces behind.
    pub fn namespace_mut(
        &mut self,
        segments: &[String],
        create_if_missing: bool,
    ) -> Result<&mut Children> {
        let mut current = &mut self.root;
        for (depth, segment) in segments.iter().enumerate() {
            let entry = if create_if_missing {
                current
                    .entry(segment.clone())
                    .or_insert_with(Node::namespace)
            } else {
                current
                    .get_mut(segment)
                    .ok_or_else(|| not_found(&segments[..=depth]))?
            };
            current = match entry {
                Node::Namespace(children) => children,
                Node::Leaf(_) if create_if_missing => {
                    return Err(leaf_prefix(&segments[..=depth]))
                }
                Node::Leaf(_) => return Err(not_found(&segments[..=depth])),
            };
        }
        Ok(current)
    }

    /// Write a leaf, auto-vivifying missing namespaces.
    ///
    /// # Errors
    ///
    /// `TypeError` if a prefix is a leaf or if `segments` names a namespace.
    pub fn set(&mut self, segments: &[String], value: Value) -> Result<()> {
        let (last, parents) = split(segments)?;
        // Reject the namespace-overwrite case before vivifying anything
        if let Ok(Node::Namespace(_)) = self.locate(segments) {
            return Err(Error::type_error(format!(
                "'{}' is a namespace and cannot be overwritten by a value",
                join(segments)
            )));
        }
        let parent = self.namespace_mut(parents, true)?;
        parent.insert(last.clone(), Node::Leaf(value));
        Ok(())
    }

    /// Remove a leaf or a whole namespace subtree; ancestors are kept.
    pub fn remove(&mut self, segments: &[String]) -> Result<Node> {
        let (last, parents) = split(segments)?;
        let parent = self.namespace_mut(parents, false)?;
        parent.remove(last).ok_or_else(|| not_found(segments))
    }

    /// Every leaf as `(dotted path, value)`, in path order
    pub fn leaves(&self) -> Vec<(String, &Value)> {
        fn walk<'a>(prefix: &str, children: &'a Children, out: &mut Vec<(String, &'a Value)>) {
            for (name, node) in children {
                let path = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{}.{}", prefix, name)
                };
                match node {
                    Node::Leaf(value) => out.push((path, value)),
                    Node::Namespace(grandchildren) => walk(&path, grandchildren, out),
                }
            }
        }
        let mut out = Vec::new();
        walk("", &self.root, &mut out);
        out
    }
}

fn split(segments: &[String]) -> Result<(&String, &[String])> {
    segments
        .split_last()
        .ok_or_else(|| Error::path_not_found(""))
}

fn join(segments: &[String]) -> String {
    segments.join(".")
}

fn not_found(segments: &[String]) -> Error {
    Error::path_not_found(join(segments))
}

fn leaf_prefix(segments: &[String]) -> Error {
    Error::type_error(format!(
        "'{}' is a leaf, not a namespace",
        join(segments)
    ))
}

fn namespace_not_leaf(segments: &[String]) -> Error {
    Error::type_error(format!("'{}' is a namespace, not a value", join(segments)))
}
