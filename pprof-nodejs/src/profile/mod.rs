// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The in-memory pprof model.
//!
//! Unlike the messages in [pprof_nodejs_protobuf], these types hold values
//! rather than ids. Ids are assigned by the [Encoder] while it writes the
//! profile, so a [Profile] can be built without knowing about any table.
//!
//! [Encoder]: crate::serializer::Encoder

mod location;
mod sample;

pub use location::*;
pub use sample::*;

use std::time::SystemTime;

/// A profile with exactly two sample types: a count axis followed by a size
/// or duration axis. The period type is always the second one.
///
/// Samples can only be appended. Their order is kept in the output.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Profile {
    sample_types: [ValueType; 2],
    samples: Vec<Sample>,
    pub drop_frames: i64,
    pub keep_frames: i64,
    pub time_nanos: i64,
    pub duration_nanos: i64,
    pub period: i64,
    pub comments: Vec<String>,
    pub default_sample_type: i64,
}

impl Profile {
    pub fn new(count: ValueType, weight: ValueType) -> Self {
        Self {
            sample_types: [count, weight],
            samples: Vec::new(),
            drop_frames: 0,
            keep_frames: 0,
            time_nanos: 0,
            duration_nanos: 0,
            period: 0,
            comments: Vec::new(),
            default_sample_type: 0,
        }
    }

    /// Appends the sample and returns its index.
    pub fn add_sample(&mut self, sample: Sample) -> usize {
        self.samples.push(sample);
        self.samples.len() - 1
    }

    pub fn add_comment(&mut self, comment: impl Into<String>) {
        self.comments.push(comment.into());
    }

    #[inline]
    pub fn sample_types(&self) -> &[ValueType; 2] {
        &self.sample_types
    }

    #[inline]
    pub fn period_type(&self) -> &ValueType {
        &self.sample_types[1]
    }

    #[inline]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Sets `time_nanos` from a wall clock time. Times before the epoch
    /// become 0, times too far in the future are clamped.
    pub fn set_start_time(&mut self, start_time: SystemTime) {
        self.time_nanos = start_time
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_or(0, |duration| {
                duration.as_nanos().min(i64::MAX as u128) as i64
            });
    }

    pub fn with_start_time(mut self, start_time: SystemTime) -> Self {
        self.set_start_time(start_time);
        self
    }

    pub fn with_period(mut self, period: i64) -> Self {
        self.period = period;
        self
    }

    pub fn with_duration_nanos(mut self, duration_nanos: i64) -> Self {
        self.duration_nanos = duration_nanos;
        self
    }
}
