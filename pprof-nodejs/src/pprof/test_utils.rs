// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use pprof_nodejs_protobuf::decoder::{Message, Profile, Sample};

#[track_caller]
pub fn decode(bytes: &[u8]) -> Profile {
    Profile::decode(bytes).unwrap_or_else(|err| panic!("failed to decode profile: {err}"))
}

#[track_caller]
pub fn string_table_fetch(profile: &Profile, id: i64) -> &str {
    profile
        .string(id)
        .unwrap_or_else(|| panic!("String {id} not found"))
}

/// One resolved frame: function name, script name and line.
pub type Frame = (String, String, i64);

/// Resolves the sample's locations, leaf first, through the location,
/// function and string tables.
#[track_caller]
pub fn sample_frames(profile: &Profile, sample: &Sample) -> Vec<Frame> {
    sample
        .location_ids
        .iter()
        .map(|id| {
            let location = profile
                .location(*id)
                .unwrap_or_else(|| panic!("Location {id} not found"));
            assert_eq!(location.lines.len(), 1, "expected one line per location");
            let line = location.lines[0];
            let function = profile
                .function(line.function_id)
                .unwrap_or_else(|| panic!("Function {} not found", line.function_id));
            (
                string_table_fetch(profile, function.name).to_owned(),
                string_table_fetch(profile, function.filename).to_owned(),
                line.line,
            )
        })
        .collect()
}

#[track_caller]
pub fn location_names(profile: &Profile, sample: &Sample) -> Vec<String> {
    sample_frames(profile, sample)
        .into_iter()
        .map(|(name, _, _)| name)
        .collect()
}
