// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::{Label, LengthDelimited, Record, Value, WireType, NO_OPT_ZERO, OPT_ZERO};
use std::io::{self, Write};

/// Each Sample records values encountered in some program context. The
/// program context is typically a stack trace, perhaps augmented with
/// auxiliary information like the thread-id, some indicator of a higher level
/// request being handled, etc.
///
/// It borrows its data but requires it to be a slice. An iterator wouldn't
/// work well because we have to walk over the fields twice: one to calculate
/// the length, and one to encode it.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Sample<'a> {
    /// The ids recorded here correspond to a Profile.location.id.
    /// The leaf is at location_id\[0\].
    pub location_ids: Record<&'a [u64], 1, OPT_ZERO>,
    /// The type and unit of each value is defined by the corresponding entry
    /// in Profile.sample_type. All samples must have the same number of
    /// values, the same as the length of Profile.sample_type.
    pub values: Record<&'a [i64], 2, OPT_ZERO>,
    /// Labels are a repeated field, so an entry is written even if all of
    /// its fields are zero.
    pub labels: &'a [Record<Label, 3, NO_OPT_ZERO>],
}

impl Value for Sample<'_> {
    const WIRE_TYPE: WireType = WireType::LengthDelimited;

    fn proto_len(&self) -> u64 {
        self.location_ids.proto_len()
            + self.values.proto_len()
            + self.labels.iter().map(Record::proto_len).sum::<u64>()
    }

    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.location_ids.encode(writer)?;
        self.values.encode(writer)?;
        for label in self.labels {
            label.encode(writer)?;
        }
        Ok(())
    }
}

unsafe impl LengthDelimited for Sample<'_> {}

#[cfg(feature = "prost_impls")]
impl From<Sample<'_>> for crate::prost_impls::Sample {
    fn from(sample: Sample) -> Self {
        Self {
            location_ids: Vec::from_iter(sample.location_ids.value.iter().copied()),
            values: Vec::from_iter(sample.values.value.iter().copied()),
            labels: sample
                .labels
                .iter()
                .map(|record| record.value)
                .map(crate::prost_impls::Label::from)
                .collect(),
        }
    }
}
