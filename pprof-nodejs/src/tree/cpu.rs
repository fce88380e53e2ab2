// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Wall time profiles from the CPU profiler's call tree.

use super::{add_tree_samples, Bucket, SampledNode};
use crate::error::Result;
use crate::profile::{Profile, ValueType};
use crate::serializer;
use crate::{IDLE, PROGRAM};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use tracing::{debug, warn};

/// The CPU profiler's default sampling interval, in microseconds.
pub const DEFAULT_INTERVAL_MICROS: u32 = 1000;

/// How many times the sampler saw a node on top of the stack.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HitCount(pub u32);

impl Bucket for HitCount {
    /// Nodes which were never hit only exist to hold their children, and
    /// produce no sample.
    fn values(&self, period: i64) -> Option<[i64; 2]> {
        if self.0 == 0 {
            return None;
        }
        let hits = i64::from(self.0);
        Some([hits, hits.saturating_mul(period)])
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TimeProfileParams {
    /// Wall clock time at which the profile was collected.
    pub start_time: SystemTime,
    pub interval_micros: u32,
    /// When profiling started, on the profiler's own clock.
    pub profile_start_micros: i64,
    /// When profiling stopped, on the profiler's own clock.
    pub profile_end_micros: i64,
}

impl TimeProfileParams {
    pub fn new(start_time: SystemTime) -> Self {
        Self {
            start_time,
            interval_micros: DEFAULT_INTERVAL_MICROS,
            profile_start_micros: 0,
            profile_end_micros: 0,
        }
    }

    /// The sampling period in nanoseconds.
    pub fn period_nanos(&self) -> i64 {
        i64::from(self.interval_micros) * 1000
    }

    /// How long the profiler ran, in nanoseconds. A clock that went backwards
    /// gives 0.
    pub fn duration_nanos(&self) -> i64 {
        let micros = self
            .profile_end_micros
            .saturating_sub(self.profile_start_micros);
        if micros < 0 {
            warn!(
                start = self.profile_start_micros,
                end = self.profile_end_micros,
                "CPU profile ends before it starts, using a zero duration"
            );
            return 0;
        }
        micros.saturating_mul(1000)
    }
}

/// Whether a node is one of V8's pseudo-frames for idle time and engine
/// overhead, which are left out along with their subtrees.
pub fn is_pseudo_frame(name: &str) -> bool {
    name == IDLE || name == PROGRAM
}

/// Builds a wall time profile, with sample types `sample/count` and
/// `wall/nanoseconds`. Each sample weighs its hit count times the period.
pub fn build_time_profile<N>(root: &N, params: &TimeProfileParams) -> Profile
where
    N: SampledNode<Bucket = HitCount>,
{
    let period = params.period_nanos();
    let mut profile = Profile::new(
        ValueType::new("sample", "count"),
        ValueType::new("wall", "nanoseconds"),
    )
    .with_start_time(params.start_time)
    .with_period(period)
    .with_duration_nanos(params.duration_nanos());

    let added = add_tree_samples(&mut profile, root, period, |node| {
        !is_pseudo_frame(node.name())
    });
    debug!(samples = added, period, "Built time profile");
    profile
}

/// Builds the wall time profile and encodes it.
pub fn encode_time_profile<N>(root: &N, params: &TimeProfileParams) -> Result<Vec<u8>>
where
    N: SampledNode<Bucket = HitCount>,
{
    let profile = build_time_profile(root, params);
    Ok(serializer::encode_to_vec(&profile)?)
}
