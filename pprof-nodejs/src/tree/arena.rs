// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! An owned snapshot of a call tree.
//!
//! Nodes live in one vector and refer to their children by index, so a
//! snapshot can be built on the profiler's thread and moved to whichever
//! thread encodes it, without any reference counting.

use super::{Bucket, SampledNode};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a node in a [CallTree].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// The root exists in every tree.
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    fn offset(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What a node says about its frame, before any fallback names are applied.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub name: String,
    pub script_name: String,
    pub line_number: i64,
}

impl Frame {
    pub fn new(name: &str, script_name: &str, line_number: i64) -> Self {
        Self {
            name: name.to_owned(),
            script_name: script_name.to_owned(),
            line_number,
        }
    }
}

#[derive(Clone, Debug)]
struct Node<B> {
    frame: Frame,
    buckets: Vec<B>,
    children: Vec<NodeId>,
}

/// A call tree whose nodes carry buckets of type `B`. It starts out with a
/// frameless root and grows top down with [CallTree::add_child], so it can
/// never hold a cycle or a node with two parents.
#[derive(Clone, Debug)]
pub struct CallTree<B> {
    nodes: Vec<Node<B>>,
}

impl<B> Default for CallTree<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> CallTree<B> {
    pub fn new() -> Self {
        let root = Node {
            frame: Frame::default(),
            buckets: Vec::new(),
            children: Vec::new(),
        };
        Self { nodes: vec![root] }
    }

    /// The number of nodes, counting the root.
    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Appends a node to `parent`'s children and returns its id.
    pub fn add_child(&mut self, parent: NodeId, frame: Frame, buckets: Vec<B>) -> Result<NodeId> {
        if parent.offset() >= self.nodes.len() {
            return Err(Error::UnknownNode(parent));
        }
        let id = u32::try_from(self.nodes.len())
            .map(NodeId)
            .map_err(|_| Error::InvalidTree(format!("more than {} nodes", u32::MAX)))?;
        self.nodes.push(Node {
            frame,
            buckets,
            children: Vec::new(),
        });
        self.nodes[parent.offset()].children.push(id);
        Ok(id)
    }

    /// Adds one more bucket to an existing node.
    pub fn push_bucket(&mut self, node: NodeId, bucket: B) -> Result<()> {
        let node = self
            .nodes
            .get_mut(node.offset())
            .ok_or(Error::UnknownNode(node))?;
        node.buckets.push(bucket);
        Ok(())
    }

    pub fn root(&self) -> NodeRef<'_, B> {
        NodeRef {
            tree: self,
            id: NodeId::ROOT,
        }
    }

    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_, B>> {
        (id.offset() < self.nodes.len()).then_some(NodeRef { tree: self, id })
    }
}

/// A borrowed view of one node, which is how the converter walks the tree.
pub struct NodeRef<'a, B> {
    tree: &'a CallTree<B>,
    id: NodeId,
}

// Derives would require `B: Copy`.
impl<B> Clone for NodeRef<'_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B> Copy for NodeRef<'_, B> {}

impl<B> fmt::Debug for NodeRef<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("frame", self.frame())
            .finish()
    }
}

impl<'a, B> NodeRef<'a, B> {
    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    fn node(&self) -> &'a Node<B> {
        // Ids are only handed out by the tree they index into.
        &self.tree.nodes[self.id.offset()]
    }

    #[inline]
    pub fn frame(&self) -> &'a Frame {
        &self.node().frame
    }
}

impl<B: Bucket> SampledNode for NodeRef<'_, B> {
    type Bucket = B;

    fn name(&self) -> &str {
        &self.frame().name
    }

    fn script_name(&self) -> &str {
        &self.frame().script_name
    }

    fn line_number(&self) -> i64 {
        self.frame().line_number
    }

    fn children(&self) -> impl Iterator<Item = Self> {
        let tree = self.tree;
        self.node()
            .children
            .iter()
            .map(move |&id| NodeRef { tree, id })
    }

    fn buckets(&self) -> &[B] {
        &self.node().buckets
    }
}
