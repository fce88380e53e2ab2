// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::{LengthDelimited, Record, Value, WireType, NO_OPT_ZERO, OPT_ZERO};
use std::io::{self, Write};

/// Describes function and line table debug information. Like [Sample], it
/// borrows its repeated field as a slice so it can be walked twice.
///
/// [Sample]: crate::Sample
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Location<'a> {
    /// Unique nonzero id for the location. A profile could use instruction
    /// addresses or any integer sequence as ids.
    pub id: Record<u64, 1, NO_OPT_ZERO>,
    /// The id of the corresponding profile.Mapping for this location.
    /// It can be unset if the mapping is unknown or not applicable for
    /// this profile type.
    pub mapping_id: Record<u64, 2, OPT_ZERO>,
    /// The instruction address for this location, if available.
    pub address: Record<u64, 3, OPT_ZERO>,
    /// Multiple line indicates this location has inlined functions, where
    /// the last entry represents the caller into which the preceding entries
    /// were inlined.
    pub lines: &'a [Record<Line, 4, NO_OPT_ZERO>],
    /// Provides an indication that multiple symbols map to this location's
    /// address, for example due to identical code folding by the linker.
    pub is_folded: Record<bool, 5, OPT_ZERO>,
}

/// Represents function and line number information. Omits column.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(test, derive(bolero::generator::TypeGenerator))]
pub struct Line {
    /// The id of the corresponding profile.Function for this line.
    pub function_id: Record<u64, 1, OPT_ZERO>,
    /// Line number in source code.
    pub lineno: Record<i64, 2, OPT_ZERO>,
}

impl Value for Line {
    const WIRE_TYPE: WireType = WireType::LengthDelimited;

    fn proto_len(&self) -> u64 {
        self.function_id.proto_len() + self.lineno.proto_len()
    }

    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.function_id.encode(writer)?;
        self.lineno.encode(writer)
    }
}

unsafe impl LengthDelimited for Line {}

#[cfg(feature = "prost_impls")]
impl From<Line> for crate::prost_impls::Line {
    fn from(line: Line) -> Self {
        Self {
            function_id: line.function_id.value,
            line: line.lineno.value,
        }
    }
}

impl Value for Location<'_> {
    const WIRE_TYPE: WireType = WireType::LengthDelimited;

    fn proto_len(&self) -> u64 {
        self.id.proto_len()
            + self.mapping_id.proto_len()
            + self.address.proto_len()
            + self.lines.iter().map(Record::proto_len).sum::<u64>()
            + self.is_folded.proto_len()
    }

    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.id.encode(writer)?;
        self.mapping_id.encode(writer)?;
        self.address.encode(writer)?;
        for line in self.lines {
            line.encode(writer)?;
        }
        self.is_folded.encode(writer)
    }
}

unsafe impl LengthDelimited for Location<'_> {}

#[cfg(feature = "prost_impls")]
impl From<&Location<'_>> for crate::prost_impls::Location {
    fn from(location: &Location) -> Self {
        Self {
            id: location.id.value,
            mapping_id: location.mapping_id.value,
            address: location.address.value,
            lines: location
                .lines
                .iter()
                .map(|record| crate::prost_impls::Line::from(record.value))
                .collect(),
            is_folded: location.is_folded.value,
        }
    }
}

#[cfg(feature = "prost_impls")]
impl From<Location<'_>> for crate::prost_impls::Location {
    fn from(location: Location) -> Self {
        Self::from(&location)
    }
}
