// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Flattens a sampled call tree into pprof samples.
//!
//! The converter only sees trees through [SampledNode], so every capture
//! backend provides an adapter and the walk is written once. The heap and CPU
//! profiles differ only in their bucket type and in which nodes they skip.

pub mod arena;
pub mod cpu;
pub mod heap;

use crate::profile::{Location, Profile, Sample};
use crate::{ANONYMOUS, NATIVE};
use std::rc::Rc;

/// One measurement attached to a node.
pub trait Bucket {
    /// The `[count, weight]` values of the sample for this bucket, or `None`
    /// if the bucket shouldn't produce a sample. `period` is the profile's
    /// sampling period.
    fn values(&self, period: i64) -> Option<[i64; 2]>;
}

/// A node of a sampled call tree. The root itself is not a frame: only its
/// descendants end up in samples.
pub trait SampledNode: Sized {
    type Bucket: Bucket;

    /// The function name. Empty for anonymous functions.
    fn name(&self) -> &str;

    /// The script's resource name. Empty for native code.
    fn script_name(&self) -> &str;

    fn line_number(&self) -> i64;

    /// The children, in order.
    fn children(&self) -> impl Iterator<Item = Self>;

    fn buckets(&self) -> &[Self::Bucket];
}

fn non_empty_or<'a>(str: &'a str, fallback: &'a str) -> &'a str {
    if str.is_empty() {
        fallback
    } else {
        str
    }
}

/// The location of a node's own frame, with the fallback names applied.
pub fn frame_location<N: SampledNode>(node: &N) -> Location {
    let name = non_empty_or(node.name(), ANONYMOUS);
    let script = non_empty_or(node.script_name(), NATIVE);
    Location::for_frame(name, script, node.line_number())
}

/// Walks the tree below `root` and appends one sample per bucket to the
/// profile. Returns the number of samples added.
///
/// Each sample's locations are leaf first: the node's own frame followed by
/// its ancestors'. Nodes for which `keep` returns false are skipped along
/// with their whole subtree.
///
/// The walk is depth first and LIFO: the root's children are queued in
/// order, as are each node's children, and the last queued node is
/// processed next. The same tree always gives the same samples.
pub fn add_tree_samples<N, F>(profile: &mut Profile, root: &N, period: i64, mut keep: F) -> usize
where
    N: SampledNode,
    F: FnMut(&N) -> bool,
{
    let empty: Rc<[Location]> = Rc::from(Vec::new());
    let mut pending: Vec<(N, Rc<[Location]>)> = root
        .children()
        .map(|child| (child, Rc::clone(&empty)))
        .collect();

    let mut added = 0;
    while let Some((node, inherited)) = pending.pop() {
        if !keep(&node) {
            continue;
        }

        let mut stack = Vec::with_capacity(inherited.len() + 1);
        stack.push(frame_location(&node));
        stack.extend(inherited.iter().cloned());

        for bucket in node.buckets() {
            if let Some(values) = bucket.values(period) {
                profile.add_sample(Sample::new(stack.clone(), values.to_vec()));
                added += 1;
            }
        }

        let stack: Rc<[Location]> = Rc::from(stack);
        pending.extend(node.children().map(|child| (child, Rc::clone(&stack))));
    }
    added
}
