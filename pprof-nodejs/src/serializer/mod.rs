// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Writes a [Profile] in the pprof wire format.
//!
//! Ids are handed out lazily while the profile is written. Locations get
//! theirs while samples are written, mappings and functions while locations
//! are written, and most strings while the tables after them are written.
//! This fixes the order of the top-level fields:
//!
//! 1. sample types
//! 2. samples
//! 3. locations
//! 4. mappings
//! 5. functions
//! 6. the string table, which can't be written before everything that
//!    interns strings
//! 7. the scalar fields, period type and comments.
//!
//! Table entries are written in id order. A pprof reader doesn't care about
//! any of this, but it makes the output reproducible byte for byte.

use crate::collections::{Id, StringTable, Table};
use crate::profile::{Function, Label, Location, Mapping, Profile, Sample, ValueType};
use pprof_nodejs_protobuf::{self as protobuf, Record, StringOffset, NO_OPT_ZERO, OPT_ZERO};
use std::io::{self, Write};
use tracing::{debug, trace};

/// Owns the four dedup tables used while writing one profile. Encoding
/// consumes the encoder, so the tables never carry over into another profile.
#[derive(Clone, Debug, Default)]
pub struct Encoder {
    strings: StringTable,
    mappings: Table<Mapping>,
    locations: Table<Location>,
    functions: Table<Function>,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the string's offset in the string table, adding it if needed.
    /// The empty string is always offset 0.
    pub fn intern_string(&mut self, str: &str) -> StringOffset {
        self.strings.intern(str)
    }

    /// Returns the mapping's id, adding it if needed. The default mapping is
    /// never stored and is always id 0.
    pub fn intern_mapping(&mut self, mapping: &Mapping) -> u64 {
        self.mappings.intern(mapping).map_or(0, Id::into_raw_id)
    }

    /// Returns the location's id, adding it if needed. The default location
    /// is never stored and is always id 0.
    pub fn intern_location(&mut self, location: &Location) -> u64 {
        self.locations.intern(location).map_or(0, Id::into_raw_id)
    }

    /// Returns the function's id, adding it if needed. The default function
    /// is never stored and is always id 0.
    pub fn intern_function(&mut self, function: &Function) -> u64 {
        self.functions.intern(function).map_or(0, Id::into_raw_id)
    }

    pub fn strings(&self) -> &StringTable {
        &self.strings
    }

    pub fn mappings(&self) -> &Table<Mapping> {
        &self.mappings
    }

    pub fn locations(&self) -> &Table<Location> {
        &self.locations
    }

    pub fn functions(&self) -> &Table<Function> {
        &self.functions
    }

    fn value_type(&mut self, value_type: &ValueType) -> protobuf::ValueType {
        let r#type = self.intern_string(&value_type.r#type);
        let unit = self.intern_string(&value_type.unit);
        protobuf::ValueType::new(r#type, unit)
    }

    fn label(&mut self, label: &Label) -> Record<protobuf::Label, 3, NO_OPT_ZERO> {
        let key = self.intern_string(&label.key);
        let str = self.intern_string(&label.str);
        let num_unit = self.intern_string(&label.num_unit);
        Record::from(protobuf::Label {
            key: Record::from(key),
            str: Record::from(str),
            num: Record::from(label.num),
            num_unit: Record::from(num_unit),
        })
    }

    fn encode_sample<W: Write>(&mut self, sample: &Sample, writer: &mut W) -> io::Result<()> {
        let location_ids: Vec<u64> = sample
            .locations
            .iter()
            .map(|location| self.intern_location(location))
            .collect();
        let labels: Vec<_> = sample.labels.iter().map(|label| self.label(label)).collect();
        let item = protobuf::Sample {
            location_ids: Record::from(location_ids.as_slice()),
            values: Record::from(sample.values.as_slice()),
            labels: labels.as_slice(),
        };
        Record::<_, 2, NO_OPT_ZERO>::from(item).encode(writer)
    }

    fn encode_locations<W: Write>(&mut self, writer: &mut W) -> io::Result<()> {
        let mut lines = Vec::new();
        for (id, item) in self.locations.iter() {
            lines.clear();
            for line in item.lines.iter() {
                let function_id = self.functions.intern(&line.function);
                lines.push(Record::<_, 4, NO_OPT_ZERO>::from(protobuf::Line {
                    function_id: Record::from(function_id.map_or(0, Id::into_raw_id)),
                    lineno: Record::from(line.line),
                }));
            }
            let mapping_id = self.mappings.intern(&item.mapping);
            let location = protobuf::Location {
                id: Record::from(id.into_raw_id()),
                mapping_id: Record::from(mapping_id.map_or(0, Id::into_raw_id)),
                address: Record::from(item.address),
                lines: lines.as_slice(),
                is_folded: Record::from(item.is_folded),
            };
            Record::<_, 4, NO_OPT_ZERO>::from(location).encode(writer)?;
        }
        Ok(())
    }

    fn encode_mappings<W: Write>(&mut self, writer: &mut W) -> io::Result<()> {
        for (id, item) in self.mappings.iter() {
            let mapping = protobuf::Mapping {
                id: Record::from(id.into_raw_id()),
                memory_start: Record::from(item.memory_start),
                memory_limit: Record::from(item.memory_limit),
                file_offset: Record::from(item.file_offset),
                filename: Record::from(self.strings.intern(&item.filename)),
                build_id: Record::from(self.strings.intern(&item.build_id)),
                has_functions: Record::from(item.has_functions),
                has_filenames: Record::from(item.has_filenames),
                has_line_numbers: Record::from(item.has_line_numbers),
                has_inline_frames: Record::from(item.has_inline_frames),
            };
            Record::<_, 3, NO_OPT_ZERO>::from(mapping).encode(writer)?;
        }
        Ok(())
    }

    fn encode_functions<W: Write>(&mut self, writer: &mut W) -> io::Result<()> {
        for (id, item) in self.functions.iter() {
            let function = protobuf::Function {
                id: Record::from(id.into_raw_id()),
                name: Record::from(self.strings.intern(&item.name)),
                system_name: Record::from(self.strings.intern(&item.system_name)),
                filename: Record::from(self.strings.intern(&item.filename)),
                start_line: Record::from(item.start_line),
            };
            Record::<_, 5, NO_OPT_ZERO>::from(function).encode(writer)?;
        }
        Ok(())
    }

    /// Writes the profile, interning everything it references along the way.
    /// Anything interned beforehand is written too.
    ///
    /// Serialization often happens one byte at a time, so a buffered writer
    /// should probably be used. The only errors are the writer's.
    pub fn encode<W: Write>(mut self, profile: &Profile, writer: &mut W) -> io::Result<()> {
        for sample_type in profile.sample_types() {
            let item = self.value_type(sample_type);
            Record::<_, 1, NO_OPT_ZERO>::from(item).encode(writer)?;
        }

        for sample in profile.samples() {
            self.encode_sample(sample, writer)?;
        }
        trace!(samples = profile.samples().len(), "Encoded samples");

        // Mapping and function ids are first handed out here, so locations
        // go before both.
        self.encode_locations(writer)?;
        self.encode_mappings(writer)?;
        self.encode_functions(writer)?;
        trace!(
            locations = self.locations.len(),
            mappings = self.mappings.len(),
            functions = self.functions.len(),
            "Encoded tables"
        );

        // Anything that still needs a string has to intern it before the
        // string table goes out.
        let period_type = self.value_type(profile.period_type());
        let comments: Vec<StringOffset> = profile
            .comments
            .iter()
            .map(|comment| self.strings.intern(comment))
            .collect();

        for item in self.strings.iter() {
            Record::<_, 6, NO_OPT_ZERO>::from(item).encode(writer)?;
        }
        trace!(strings = self.strings.len(), "Encoded string table");

        Record::<_, 7, OPT_ZERO>::from(profile.drop_frames).encode(writer)?;
        Record::<_, 8, OPT_ZERO>::from(profile.keep_frames).encode(writer)?;
        Record::<_, 9, OPT_ZERO>::from(profile.time_nanos).encode(writer)?;
        Record::<_, 10, OPT_ZERO>::from(profile.duration_nanos).encode(writer)?;
        Record::<_, 11, OPT_ZERO>::from(period_type).encode(writer)?;
        Record::<_, 12, OPT_ZERO>::from(profile.period).encode(writer)?;
        for comment in comments {
            Record::<_, 13, OPT_ZERO>::from(comment).encode(writer)?;
        }
        Record::<_, 14, OPT_ZERO>::from(profile.default_sample_type).encode(writer)
    }
}

/// Encodes the profile with a fresh [Encoder] and returns the bytes.
pub fn encode_to_vec(profile: &Profile) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    Encoder::new().encode(profile, &mut buffer)?;
    debug!(
        samples = profile.samples().len(),
        bytes = buffer.len(),
        "Encoded pprof profile"
    );
    Ok(buffer)
}
