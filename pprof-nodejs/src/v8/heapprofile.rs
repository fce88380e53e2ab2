// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use super::CallFrame;
use crate::collections::identifiable::{FxIndexMap, FxIndexSet};
use crate::error::{Error, Result};
use crate::tree::arena::{CallTree, NodeId};
use crate::tree::heap::{encode_heap_profile, Allocation, HeapProfileParams};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// The sampling heap profiler's output, as returned by
/// `HeapProfiler.getSamplingProfile`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SamplingHeapProfile {
    pub head: AllocationNode,
    #[serde(default)]
    pub samples: Vec<AllocationSample>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationNode {
    pub call_frame: CallFrame,
    /// Total size of the sampled allocations made by this node itself.
    pub self_size: u64,
    pub id: u64,
    #[serde(default)]
    pub children: Vec<AllocationNode>,
}

/// One sampled allocation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationSample {
    pub size: u64,
    pub node_id: u64,
    #[serde(default)]
    pub ordinal: f64,
}

impl SamplingHeapProfile {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    fn node_ids(&self) -> Result<FxIndexSet<u64>> {
        let mut ids = FxIndexSet::default();
        let mut pending = vec![&self.head];
        while let Some(node) = pending.pop() {
            if !ids.insert(node.id) {
                return Err(Error::InvalidTree(format!("duplicate node id {}", node.id)));
            }
            pending.extend(node.children.iter());
        }
        Ok(ids)
    }

    /// Allocations per node id, grouped by size in the order sizes first
    /// show up.
    fn allocations(&self, ids: &FxIndexSet<u64>) -> Result<FxIndexMap<u64, Vec<Allocation>>> {
        let mut by_node: FxIndexMap<u64, FxIndexMap<u64, u32>> = FxIndexMap::default();
        for sample in self.samples.iter() {
            if !ids.contains(&sample.node_id) {
                return Err(Error::InvalidTree(format!(
                    "a sample refers to unknown node {}",
                    sample.node_id
                )));
            }
            let count = by_node
                .entry(sample.node_id)
                .or_default()
                .entry(sample.size)
                .or_default();
            *count = count.saturating_add(1);
        }
        Ok(by_node
            .into_iter()
            .map(|(id, sizes)| {
                let allocations = sizes
                    .into_iter()
                    .map(|(size, count)| Allocation { size, count })
                    .collect();
                (id, allocations)
            })
            .collect())
    }

    /// Copies the allocation tree into an arena. The head becomes the
    /// arena's root.
    ///
    /// Each node's buckets come from the samples, one per distinct size. A
    /// profile without samples only has self sizes, so each node with a
    /// non-zero self size gets a single allocation of that size.
    pub fn to_call_tree(&self) -> Result<CallTree<Allocation>> {
        let ids = self.node_ids()?;
        let mut allocations = self.allocations(&ids)?;
        let has_samples = !self.samples.is_empty();
        let buckets = |node: &AllocationNode, by_node: &mut FxIndexMap<u64, Vec<Allocation>>| {
            if has_samples {
                by_node.swap_remove(&node.id).unwrap_or_default()
            } else if node.self_size > 0 {
                vec![Allocation {
                    size: node.self_size,
                    count: 1,
                }]
            } else {
                Vec::new()
            }
        };

        let mut tree = CallTree::new();
        let mut pending: Vec<(&AllocationNode, NodeId)> = self
            .head
            .children
            .iter()
            .rev()
            .map(|child| (child, NodeId::ROOT))
            .collect();
        while let Some((node, parent)) = pending.pop() {
            let frame = node.call_frame.to_frame();
            let id = tree.add_child(parent, frame, buckets(node, &mut allocations))?;
            // Reversed, so that children are added in their original order.
            pending.extend(node.children.iter().rev().map(|child| (child, id)));
        }
        Ok(tree)
    }

    pub fn encode(&self, params: &HeapProfileParams) -> Result<Vec<u8>> {
        let tree = self.to_call_tree()?;
        encode_heap_profile(&tree.root(), params)
    }
}
