// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::{Value, Varint, WireType};
use std::io::{self, Write};

/// Returns the number of bytes the [`varint`] encoding of `value` takes.
///
/// [`varint`]: https://protobuf.dev/programming-guides/encoding/#varints
#[inline]
pub fn proto_len(value: u64) -> u64 {
    // https://github.com/google/protobuf/blob/3.3.x/src/google/protobuf/io/coded_stream.h#L1301-L1309
    ((((value | 1).leading_zeros() ^ 63) * 9 + 73) / 64) as u64
}

/// Encodes a [`varint`] according to protobuf semantics: 7 bits of payload
/// per byte, least significant group first, with the high bit set on every
/// byte but the last.
///
/// Serialization happens one byte at a time; use a buffered writer.
///
/// [`varint`]: https://protobuf.dev/programming-guides/encoding/#varints
#[inline]
pub fn encode<W: Write>(mut value: u64, writer: &mut W) -> io::Result<()> {
    loop {
        let byte = if value < 0x80 {
            value as u8
        } else {
            ((value & 0x7F) | 0x80) as u8
        };
        writer.write_all(&[byte])?;
        if value < 0x80 {
            return Ok(());
        }
        value >>= 7;
    }
}

pub use self::encode as encode_varint;
pub use self::proto_len as varint_len;

impl Value for u64 {
    const WIRE_TYPE: WireType = WireType::Varint;

    fn proto_len(&self) -> u64 {
        proto_len(*self)
    }

    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        encode(*self, writer)
    }
}

/// Signed values are written as their two's complement bit pattern, not
/// zig-zag encoded, so a negative number always takes 10 bytes. Every signed
/// field in a profile carries a non-negative value in practice.
impl Value for i64 {
    const WIRE_TYPE: WireType = WireType::Varint;

    fn proto_len(&self) -> u64 {
        proto_len(*self as u64)
    }

    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        encode(*self as u64, writer)
    }
}

impl Value for bool {
    const WIRE_TYPE: WireType = WireType::Varint;

    fn proto_len(&self) -> u64 {
        1
    }

    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&[u8::from(*self)])
    }
}

unsafe impl Varint for u64 {}
unsafe impl Varint for i64 {}
unsafe impl Varint for bool {}

/// A packed repeated field of varints.
impl<T: Varint> Value for &'_ [T] {
    const WIRE_TYPE: WireType = WireType::LengthDelimited;

    fn proto_len(&self) -> u64 {
        self.iter().map(Value::proto_len).sum()
    }

    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for value in self.iter() {
            value.encode(writer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(value: u64) -> Vec<u8> {
        let mut buffer = Vec::new();
        encode(value, &mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_varint_range() {
        assert_eq!(0u64.proto_len(), 1);
        assert_eq!(0x80u64.proto_len(), 2);
        assert_eq!(u64::MAX.proto_len(), 10);
        assert_eq!((-1i64).proto_len(), 10);
    }

    #[test]
    fn boundaries() {
        assert_eq!(encoded(0), [0x00]);
        assert_eq!(encoded(127), [0x7f]);
        assert_eq!(encoded(128), [0x80, 0x01]);
        assert_eq!(encoded(255), [0xff, 0x01]);
        assert_eq!(encoded(256), [0x80, 0x02]);
        assert_eq!(encoded(16_383), [0xff, 0x7f]);
        assert_eq!(encoded(16_384), [0x80, 0x80, 0x01]);
        assert_eq!(
            encoded(u64::MAX),
            [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01]
        );
    }

    #[test]
    fn proto_len_matches_encoding() {
        bolero::check!().with_type::<u64>().for_each(|value| {
            assert_eq!(encoded(*value).len() as u64, proto_len(*value));
        });
    }

    #[test]
    fn booleans() {
        let mut buffer = Vec::new();
        true.encode(&mut buffer).unwrap();
        false.encode(&mut buffer).unwrap();
        assert_eq!(buffer, [0x01, 0x00]);
    }
}
