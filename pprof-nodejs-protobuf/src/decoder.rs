// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! A reference decoder for the subset of the wire format written by this
//! crate. It exists to validate encoded profiles in tests; it is not meant to
//! read arbitrary pprof files produced by other tools.
//!
//! Only the varint and length-delimited wire types are accepted. A tag with
//! any other wire type fails with [DecodeError::InvalidFieldFlag] and aborts
//! the decoding of the enclosing message. Unknown field numbers are skipped.

use crate::WireType;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DecodeError {
    /// The wire type of a tag is neither varint nor length-delimited.
    InvalidFieldFlag { field: u32, wire_type: u8 },
    /// A field uses a wire type that its field number doesn't allow, e.g. a
    /// varint where a string was expected.
    UnexpectedWireType { field: u32, wire_type: u8 },
    /// The input ended inside a tag, varint, or length-delimited payload.
    UnexpectedEof,
    /// A varint ran over 10 bytes.
    VarintOverflow,
    /// A string table entry wasn't valid UTF-8.
    InvalidUtf8,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::InvalidFieldFlag { field, wire_type } => {
                write!(f, "invalid field flag: field {field}, wire type {wire_type}")
            }
            DecodeError::UnexpectedWireType { field, wire_type } => {
                write!(f, "unexpected wire type {wire_type} for field {field}")
            }
            DecodeError::UnexpectedEof => f.write_str("unexpected end of input"),
            DecodeError::VarintOverflow => f.write_str("varint is longer than 10 bytes"),
            DecodeError::InvalidUtf8 => f.write_str("string is not valid utf-8"),
        }
    }
}

impl core::error::Error for DecodeError {}

/// The payload of a single field.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum FieldValue<'a> {
    Varint(u64),
    Bytes(&'a [u8]),
}

impl<'a> FieldValue<'a> {
    fn wire_type(&self) -> u8 {
        match self {
            FieldValue::Varint(_) => WireType::Varint as u8,
            FieldValue::Bytes(_) => WireType::LengthDelimited as u8,
        }
    }

    fn varint(self, field: u32) -> Result<u64, DecodeError> {
        match self {
            FieldValue::Varint(value) => Ok(value),
            FieldValue::Bytes(_) => Err(self.unexpected(field)),
        }
    }

    fn int64(self, field: u32) -> Result<i64, DecodeError> {
        self.varint(field).map(|value| value as i64)
    }

    fn bool(self, field: u32) -> Result<bool, DecodeError> {
        self.varint(field).map(|value| value != 0)
    }

    fn bytes(self, field: u32) -> Result<&'a [u8], DecodeError> {
        match self {
            FieldValue::Bytes(bytes) => Ok(bytes),
            FieldValue::Varint(_) => Err(self.unexpected(field)),
        }
    }

    fn message<M: Message>(self, field: u32) -> Result<M, DecodeError> {
        M::decode(self.bytes(field)?)
    }

    /// Repeated scalars may arrive packed (one length-delimited run) or one
    /// varint per entry; both forms append to `out`.
    fn repeated<T>(
        self,
        out: &mut Vec<T>,
        convert: impl Fn(u64) -> T,
    ) -> Result<(), DecodeError> {
        match self {
            FieldValue::Varint(value) => out.push(convert(value)),
            FieldValue::Bytes(bytes) => {
                let mut reader = Reader::new(bytes);
                while !reader.is_empty() {
                    out.push(convert(reader.varint()?));
                }
            }
        }
        Ok(())
    }

    fn unexpected(&self, field: u32) -> DecodeError {
        DecodeError::UnexpectedWireType {
            field,
            wire_type: self.wire_type(),
        }
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn is_empty(&self) -> bool {
        self.offset >= self.bytes.len()
    }

    fn varint(&mut self) -> Result<u64, DecodeError> {
        let mut value = 0u64;
        for shift in (0..70).step_by(7) {
            let byte = *self
                .bytes
                .get(self.offset)
                .ok_or(DecodeError::UnexpectedEof)?;
            self.offset += 1;
            value |= u64::from(byte & 0x7f).checked_shl(shift).unwrap_or(0);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(DecodeError::VarintOverflow)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(DecodeError::UnexpectedEof)?;
        let bytes = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(bytes)
    }

    fn field(&mut self) -> Result<(u32, FieldValue<'a>), DecodeError> {
        let tag = self.varint()?;
        let field = (tag >> 3) as u32;
        let wire_type = (tag & 0b111) as u8;
        match WireType::from_tag_bits(wire_type) {
            Some(WireType::Varint) => Ok((field, FieldValue::Varint(self.varint()?))),
            Some(WireType::LengthDelimited) => {
                let len = usize::try_from(self.varint()?).map_err(|_| DecodeError::UnexpectedEof)?;
                Ok((field, FieldValue::Bytes(self.take(len)?)))
            }
            _ => Err(DecodeError::InvalidFieldFlag { field, wire_type }),
        }
    }
}

/// A message which is decoded field by field.
pub trait Message: Default {
    fn merge_field(&mut self, field: u32, value: FieldValueRef) -> Result<(), DecodeError>;

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut message = Self::default();
        let mut reader = Reader::new(bytes);
        while !reader.is_empty() {
            let (field, value) = reader.field()?;
            message.merge_field(field, FieldValueRef(value))?;
        }
        Ok(message)
    }
}

/// An opaque field payload handed to [Message::merge_field].
#[derive(Clone, Copy, Debug)]
pub struct FieldValueRef<'a>(FieldValue<'a>);

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct ValueType {
    pub r#type: i64,
    pub unit: i64,
}

impl Message for ValueType {
    fn merge_field(&mut self, field: u32, value: FieldValueRef) -> Result<(), DecodeError> {
        let value = value.0;
        match field {
            1 => self.r#type = value.int64(field)?,
            2 => self.unit = value.int64(field)?,
            _ => {}
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Label {
    pub key: i64,
    pub str: i64,
    pub num: i64,
    pub num_unit: i64,
}

impl Message for Label {
    fn merge_field(&mut self, field: u32, value: FieldValueRef) -> Result<(), DecodeError> {
        let value = value.0;
        match field {
            1 => self.key = value.int64(field)?,
            2 => self.str = value.int64(field)?,
            3 => self.num = value.int64(field)?,
            4 => self.num_unit = value.int64(field)?,
            _ => {}
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Sample {
    pub location_ids: Vec<u64>,
    pub values: Vec<i64>,
    pub labels: Vec<Label>,
}

impl Message for Sample {
    fn merge_field(&mut self, field: u32, value: FieldValueRef) -> Result<(), DecodeError> {
        let value = value.0;
        match field {
            1 => value.repeated(&mut self.location_ids, |id| id)?,
            2 => value.repeated(&mut self.values, |v| v as i64)?,
            3 => self.labels.push(value.message(field)?),
            _ => {}
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Mapping {
    pub id: u64,
    pub memory_start: u64,
    pub memory_limit: u64,
    pub file_offset: u64,
    pub filename: i64,
    pub build_id: i64,
    pub has_functions: bool,
    pub has_filenames: bool,
    pub has_line_numbers: bool,
    pub has_inline_frames: bool,
}

impl Message for Mapping {
    fn merge_field(&mut self, field: u32, value: FieldValueRef) -> Result<(), DecodeError> {
        let value = value.0;
        match field {
            1 => self.id = value.varint(field)?,
            2 => self.memory_start = value.varint(field)?,
            3 => self.memory_limit = value.varint(field)?,
            4 => self.file_offset = value.varint(field)?,
            5 => self.filename = value.int64(field)?,
            6 => self.build_id = value.int64(field)?,
            7 => self.has_functions = value.bool(field)?,
            8 => self.has_filenames = value.bool(field)?,
            9 => self.has_line_numbers = value.bool(field)?,
            10 => self.has_inline_frames = value.bool(field)?,
            _ => {}
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Line {
    pub function_id: u64,
    pub line: i64,
}

impl Message for Line {
    fn merge_field(&mut self, field: u32, value: FieldValueRef) -> Result<(), DecodeError> {
        let value = value.0;
        match field {
            1 => self.function_id = value.varint(field)?,
            2 => self.line = value.int64(field)?,
            _ => {}
        }
        Ok(())
    }
}

/// Equality compares every field, `is_folded` included.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Location {
    pub id: u64,
    pub mapping_id: u64,
    pub address: u64,
    pub lines: Vec<Line>,
    pub is_folded: bool,
}

impl Message for Location {
    fn merge_field(&mut self, field: u32, value: FieldValueRef) -> Result<(), DecodeError> {
        let value = value.0;
        match field {
            1 => self.id = value.varint(field)?,
            2 => self.mapping_id = value.varint(field)?,
            3 => self.address = value.varint(field)?,
            4 => self.lines.push(value.message(field)?),
            5 => self.is_folded = value.bool(field)?,
            _ => {}
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Function {
    pub id: u64,
    pub name: i64,
    pub system_name: i64,
    pub filename: i64,
    pub start_line: i64,
}

impl Message for Function {
    fn merge_field(&mut self, field: u32, value: FieldValueRef) -> Result<(), DecodeError> {
        let value = value.0;
        match field {
            1 => self.id = value.varint(field)?,
            2 => self.name = value.int64(field)?,
            3 => self.system_name = value.int64(field)?,
            4 => self.filename = value.int64(field)?,
            5 => self.start_line = value.int64(field)?,
            _ => {}
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Profile {
    pub sample_types: Vec<ValueType>,
    pub samples: Vec<Sample>,
    pub mappings: Vec<Mapping>,
    pub locations: Vec<Location>,
    pub functions: Vec<Function>,
    pub string_table: Vec<String>,
    pub drop_frames: i64,
    pub keep_frames: i64,
    pub time_nanos: i64,
    pub duration_nanos: i64,
    pub period_type: Option<ValueType>,
    pub period: i64,
    pub comment: Vec<i64>,
    pub default_sample_type: i64,
    /// The top-level field numbers in the order they appeared on the wire,
    /// with consecutive repeats collapsed. The wire format doesn't require
    /// any order, but the encoder promises one.
    pub field_order: Vec<u32>,
}

impl Message for Profile {
    fn merge_field(&mut self, field: u32, value: FieldValueRef) -> Result<(), DecodeError> {
        if self.field_order.last() != Some(&field) {
            self.field_order.push(field);
        }
        let value = value.0;
        match field {
            1 => self.sample_types.push(value.message(field)?),
            2 => self.samples.push(value.message(field)?),
            3 => self.mappings.push(value.message(field)?),
            4 => self.locations.push(value.message(field)?),
            5 => self.functions.push(value.message(field)?),
            6 => {
                let bytes = value.bytes(field)?;
                let string = std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)?;
                self.string_table.push(string.to_owned());
            }
            7 => self.drop_frames = value.int64(field)?,
            8 => self.keep_frames = value.int64(field)?,
            9 => self.time_nanos = value.int64(field)?,
            10 => self.duration_nanos = value.int64(field)?,
            11 => self.period_type = Some(value.message(field)?),
            12 => self.period = value.int64(field)?,
            13 => value.repeated(&mut self.comment, |id| id as i64)?,
            14 => self.default_sample_type = value.int64(field)?,
            _ => {}
        }
        Ok(())
    }
}

impl Profile {
    /// Looks up a string by its offset into the string table.
    pub fn string(&self, offset: i64) -> Option<&str> {
        let offset = usize::try_from(offset).ok()?;
        self.string_table.get(offset).map(String::as_str)
    }

    /// Looks up a mapping by id. Id 0 is never present.
    pub fn mapping(&self, id: u64) -> Option<&Mapping> {
        self.mappings.iter().find(|mapping| mapping.id == id && id != 0)
    }

    /// Looks up a location by id. Id 0 is never present.
    pub fn location(&self, id: u64) -> Option<&Location> {
        self.locations.iter().find(|location| location.id == id && id != 0)
    }

    /// Looks up a function by id. Id 0 is never present.
    pub fn function(&self, id: u64) -> Option<&Function> {
        self.functions.iter().find(|function| function.id == id && id != 0)
    }
}
