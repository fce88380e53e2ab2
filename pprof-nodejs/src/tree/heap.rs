// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Heap profiles from the sampling heap profiler's allocation tree.

use super::{add_tree_samples, Bucket, SampledNode};
use crate::error::Result;
use crate::profile::{Location, Profile, Sample, ValueType};
use crate::serializer;
use crate::EXTERNAL;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use tracing::debug;

/// The sampling heap profiler's default interval, in bytes.
pub const DEFAULT_INTERVAL_BYTES: u32 = 512 * 1024;

/// `count` sampled allocations of `size` bytes each, made by one node.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub size: u64,
    pub count: u32,
}

impl Bucket for Allocation {
    fn values(&self, _period: i64) -> Option<[i64; 2]> {
        let count = i64::from(self.count);
        let size = i64::try_from(self.size).unwrap_or(i64::MAX);
        Some([count, size.saturating_mul(count)])
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct HeapProfileParams {
    /// Wall clock time at which the profile was collected.
    pub start_time: SystemTime,
    pub interval_bytes: u32,
    /// Memory held outside of the JavaScript heap.
    pub external_bytes: u64,
}

impl HeapProfileParams {
    pub fn new(start_time: SystemTime) -> Self {
        Self {
            start_time,
            interval_bytes: DEFAULT_INTERVAL_BYTES,
            external_bytes: 0,
        }
    }
}

/// The sample for memory held outside of the JavaScript heap: a single
/// `(external)` frame, a count of 1, and the external bytes as its weight.
pub fn external_sample(external_bytes: u64) -> Sample {
    let location = Location::for_frame(EXTERNAL, "", 0);
    let bytes = i64::try_from(external_bytes).unwrap_or(i64::MAX);
    Sample::new(vec![location], vec![1, bytes])
}

/// Builds a heap profile, with sample types `objects/count` and
/// `space/bytes`. The first sample is always the [external_sample], followed
/// by one sample per allocation bucket. Nothing is filtered out.
pub fn build_heap_profile<N>(root: &N, params: &HeapProfileParams) -> Profile
where
    N: SampledNode<Bucket = Allocation>,
{
    let period = i64::from(params.interval_bytes);
    let mut profile = Profile::new(
        ValueType::new("objects", "count"),
        ValueType::new("space", "bytes"),
    )
    .with_start_time(params.start_time)
    .with_period(period);

    profile.add_sample(external_sample(params.external_bytes));
    let added = add_tree_samples(&mut profile, root, period, |_| true);
    debug!(
        samples = added + 1,
        external_bytes = params.external_bytes,
        "Built heap profile"
    );
    profile
}

/// Builds the heap profile and encodes it.
pub fn encode_heap_profile<N>(root: &N, params: &HeapProfileParams) -> Result<Vec<u8>>
where
    N: SampledNode<Bucket = Allocation>,
{
    let profile = build_heap_profile(root, params);
    Ok(serializer::encode_to_vec(&profile)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pprof::test_utils::{decode, sample_frames};
    use crate::tree::arena::{CallTree, Frame, NodeId};
    use std::time::Duration;

    fn params(external_bytes: u64) -> HeapProfileParams {
        HeapProfileParams {
            external_bytes,
            ..HeapProfileParams::new(SystemTime::UNIX_EPOCH + Duration::from_millis(5))
        }
    }

    #[test]
    fn external_sample_comes_first() {
        let mut tree = CallTree::<Allocation>::new();
        tree.add_child(
            NodeId::ROOT,
            Frame::new("alloc", "a.js", 4),
            vec![Allocation { size: 32, count: 3 }],
        )
        .unwrap();

        let decoded = decode(&encode_heap_profile(&tree.root(), &params(4096)).unwrap());
        assert_eq!(decoded.samples.len(), 2);

        let external = &decoded.samples[0];
        assert_eq!(external.values, [1, 4096]);
        assert_eq!(
            sample_frames(&decoded, external),
            [(EXTERNAL.to_string(), String::new(), 0)]
        );
        let function = decoded.function(decoded.locations[0].lines[0].function_id).unwrap();
        assert_eq!(function.name, function.system_name);
        assert_eq!(function.filename, 0);

        let allocation = &decoded.samples[1];
        assert_eq!(allocation.values, [3, 96]);
        assert_eq!(
            sample_frames(&decoded, allocation),
            [("alloc".to_string(), "a.js".to_string(), 4)]
        );
    }

    #[test]
    fn external_sample_without_external_memory() {
        let tree = CallTree::<Allocation>::new();
        let profile = build_heap_profile(&tree.root(), &params(0));
        assert_eq!(profile.samples(), [external_sample(0)]);
        assert_eq!(profile.samples()[0].values, [1, 0]);
    }

    #[test]
    fn scalars() {
        let tree = CallTree::<Allocation>::new();
        let profile = build_heap_profile(&tree.root(), &params(0));
        assert_eq!(profile.period, i64::from(DEFAULT_INTERVAL_BYTES));
        assert_eq!(profile.duration_nanos, 0);
        assert_eq!(profile.time_nanos, 5_000_000);
    }

    #[test]
    fn every_allocation_is_a_sample() {
        let mut tree = CallTree::<Allocation>::new();
        // Heap profiles don't skip pseudo-frames.
        tree.add_child(
            NodeId::ROOT,
            Frame::new(crate::IDLE, "", 0),
            vec![
                Allocation { size: 16, count: 1 },
                Allocation { size: 64, count: 0 },
            ],
        )
        .unwrap();

        let profile = build_heap_profile(&tree.root(), &params(0));
        let values: Vec<_> = profile.samples().iter().map(|s| s.values.clone()).collect();
        assert_eq!(values, [vec![1, 0], vec![1, 16], vec![0, 0]]);
    }

    #[test]
    fn weight_saturates() {
        let allocation = Allocation {
            size: u64::MAX,
            count: 2,
        };
        assert_eq!(allocation.values(0), Some([2, i64::MAX]));
    }
}
