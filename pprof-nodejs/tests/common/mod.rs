// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Decodes encoded profiles back into plain values for assertions.

use anyhow::Context;
use pprof_nodejs_protobuf::decoder::{Message, Profile, Sample};

/// A sample with every id resolved: frames are leaf first, labels are
/// `(key, str, num, num_unit)`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedSample {
    pub frames: Vec<(String, String, i64)>,
    pub values: Vec<i64>,
    pub labels: Vec<(String, String, i64, String)>,
}

pub fn decode(bytes: &[u8]) -> anyhow::Result<Profile> {
    Profile::decode(bytes).context("failed to decode profile")
}

pub fn string(profile: &Profile, offset: i64) -> anyhow::Result<String> {
    profile
        .string(offset)
        .map(str::to_owned)
        .with_context(|| format!("string {offset} is out of range"))
}

fn resolve_sample(profile: &Profile, sample: &Sample) -> anyhow::Result<ResolvedSample> {
    let mut frames = Vec::with_capacity(sample.location_ids.len());
    for id in sample.location_ids.iter() {
        let location = profile
            .location(*id)
            .with_context(|| format!("location {id} not found"))?;
        for line in location.lines.iter() {
            let function = profile
                .function(line.function_id)
                .with_context(|| format!("function {} not found", line.function_id))?;
            frames.push((
                string(profile, function.name)?,
                string(profile, function.filename)?,
                line.line,
            ));
        }
    }

    let mut labels = Vec::with_capacity(sample.labels.len());
    for label in sample.labels.iter() {
        labels.push((
            string(profile, label.key)?,
            string(profile, label.str)?,
            label.num,
            string(profile, label.num_unit)?,
        ));
    }

    Ok(ResolvedSample {
        frames,
        values: sample.values.clone(),
        labels,
    })
}

pub fn resolve_samples(profile: &Profile) -> anyhow::Result<Vec<ResolvedSample>> {
    profile
        .samples
        .iter()
        .map(|sample| resolve_sample(profile, sample))
        .collect()
}

#[allow(dead_code)]
pub fn frame(name: &str, script: &str, line: i64) -> (String, String, i64) {
    (name.to_owned(), script.to_owned(), line)
}

/// The leaf function names of every sample, in sample order.
#[allow(dead_code)]
pub fn leaf_names(samples: &[ResolvedSample]) -> Vec<String> {
    samples
        .iter()
        .filter_map(|sample| sample.frames.first())
        .map(|(name, _, _)| name.clone())
        .collect()
}
