// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Address range and binary metadata. JavaScript frames don't have any, so
/// in practice every location uses the default mapping, which the encoder
/// treats as "no mapping".
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Mapping {
    pub memory_start: u64,
    pub memory_limit: u64,
    pub file_offset: u64,
    pub filename: String,
    pub build_id: String,
    pub has_functions: bool,
    pub has_filenames: bool,
    pub has_line_numbers: bool,
    pub has_inline_frames: bool,
}

impl Mapping {
    pub fn is_zero(&self) -> bool {
        *self == Mapping::default()
    }
}

/// A symbol identity. The default function is the "no function" sentinel.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Function {
    pub name: String,
    pub system_name: String,
    pub filename: String,
    pub start_line: i64,
}

impl Function {
    pub fn is_zero(&self) -> bool {
        *self == Function::default()
    }
}

/// One call site within a [Location].
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Line {
    pub function: Function,
    pub line: i64,
}

/// One stack frame. Two locations with equal fields are the same location,
/// no matter where they were built.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Location {
    pub mapping: Mapping,
    pub address: u64,
    pub lines: Vec<Line>,
    pub is_folded: bool,
}

impl Location {
    /// Builds the location of a JavaScript frame: no mapping, no address, and
    /// a single line whose function uses `name` as both its name and system
    /// name.
    pub fn for_frame(name: &str, script: &str, line: i64) -> Self {
        let function = Function {
            name: name.to_owned(),
            system_name: name.to_owned(),
            filename: script.to_owned(),
            start_line: 0,
        };
        Self {
            lines: vec![Line { function, line }],
            ..Location::default()
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Location::default()
    }
}
