// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use super::CallFrame;
use crate::collections::identifiable::FxIndexSet;
use crate::error::{Error, Result};
use crate::tree::arena::{CallTree, NodeId};
use crate::tree::cpu::{encode_time_profile, HitCount, TimeProfileParams};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::time::SystemTime;

/// A `.cpuprofile`, as returned by `Profiler.stop`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuProfile {
    /// Every node of the call tree, the root included.
    pub nodes: Vec<ProfileNode>,
    /// In microseconds, on the profiler's monotonic clock.
    pub start_time: i64,
    /// In microseconds, on the profiler's monotonic clock.
    pub end_time: i64,
    /// The id of the top node of each sample.
    #[serde(default)]
    pub samples: Vec<u64>,
    #[serde(default)]
    pub time_deltas: Vec<i64>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileNode {
    pub id: u64,
    pub call_frame: CallFrame,
    /// Missing in some producers, in which case the hits are counted from
    /// the profile's samples.
    #[serde(default)]
    pub hit_count: Option<u32>,
    #[serde(default)]
    pub children: Vec<u64>,
}

impl CpuProfile {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    fn offset_of(ids: &FxIndexSet<u64>, id: u64, what: &str) -> Result<usize> {
        ids.get_index_of(&id)
            .ok_or_else(|| Error::InvalidTree(format!("{what} refers to unknown node {id}")))
    }

    /// Hit counts per node, in node order.
    fn hit_counts(&self, ids: &FxIndexSet<u64>) -> Result<Vec<u32>> {
        if self.nodes.iter().any(|node| node.hit_count.is_some()) {
            return Ok(self
                .nodes
                .iter()
                .map(|node| node.hit_count.unwrap_or(0))
                .collect());
        }
        let mut hits = vec![0u32; self.nodes.len()];
        for id in self.samples.iter() {
            let offset = Self::offset_of(ids, *id, "a sample")?;
            hits[offset] = hits[offset].saturating_add(1);
        }
        Ok(hits)
    }

    /// Copies the call tree into an arena. V8's `(root)` node becomes the
    /// arena's root, and its own hits are dropped.
    ///
    /// Fails unless the nodes form exactly one tree: unique ids, known
    /// children, one parent per node, and every node reachable from the root.
    pub fn to_call_tree(&self) -> Result<CallTree<HitCount>> {
        let mut ids = FxIndexSet::default();
        for node in self.nodes.iter() {
            if !ids.insert(node.id) {
                return Err(Error::InvalidTree(format!("duplicate node id {}", node.id)));
            }
        }

        let mut has_parent = vec![false; self.nodes.len()];
        for node in self.nodes.iter() {
            for child in node.children.iter() {
                let offset = Self::offset_of(&ids, *child, "a child list")?;
                if std::mem::replace(&mut has_parent[offset], true) {
                    return Err(Error::InvalidTree(format!(
                        "node {child} has more than one parent"
                    )));
                }
            }
        }
        let mut roots = has_parent.iter().enumerate().filter(|(_, has)| !**has);
        let root = match (roots.next(), roots.next()) {
            (Some((offset, _)), None) => offset,
            (None, _) => return Err(Error::InvalidTree("no root node".to_owned())),
            (Some(_), Some(_)) => {
                return Err(Error::InvalidTree("more than one root node".to_owned()))
            }
        };

        let hits = self.hit_counts(&ids)?;
        let mut tree = CallTree::new();
        let mut pending: Vec<(usize, NodeId)> = Vec::new();
        let push_children = |pending: &mut Vec<(usize, NodeId)>, offset: usize, parent| {
            // Reversed, so that children are added in their original order.
            for child in self.nodes[offset].children.iter().rev() {
                if let Some(child) = ids.get_index_of(child) {
                    pending.push((child, parent));
                }
            }
        };
        push_children(&mut pending, root, NodeId::ROOT);

        let mut copied = 1;
        while let Some((offset, parent)) = pending.pop() {
            let node = &self.nodes[offset];
            let frame = node.call_frame.to_frame();
            let id = tree.add_child(parent, frame, vec![HitCount(hits[offset])])?;
            copied += 1;
            push_children(&mut pending, offset, id);
        }

        if copied != self.nodes.len() {
            return Err(Error::InvalidTree(format!(
                "{} nodes are not reachable from the root",
                self.nodes.len() - copied
            )));
        }
        Ok(tree)
    }

    /// The time profile parameters for this profile, which was collected at
    /// `start_time` with a sampling interval of `interval_micros`.
    pub fn time_profile_params(
        &self,
        start_time: SystemTime,
        interval_micros: u32,
    ) -> TimeProfileParams {
        TimeProfileParams {
            start_time,
            interval_micros,
            profile_start_micros: self.start_time,
            profile_end_micros: self.end_time,
        }
    }

    pub fn encode(&self, start_time: SystemTime, interval_micros: u32) -> Result<Vec<u8>> {
        let tree = self.to_call_tree()?;
        let params = self.time_profile_params(start_time, interval_micros);
        encode_time_profile(&tree.root(), &params)
    }
}
