// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use super::{LengthDelimited, Record, StringOffset, Value, WireType, OPT_ZERO};
use std::io::{self, Write};

/// Label includes additional context for this sample. It can include things
/// like a thread id, allocation size, etc.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(test, derive(bolero::generator::TypeGenerator))]
pub struct Label {
    /// An annotation for a sample, e.g. "allocation_size".
    pub key: Record<StringOffset, 1, OPT_ZERO>,
    /// At most, one of the str and num should be used.
    pub str: Record<StringOffset, 2, OPT_ZERO>,
    /// At most, one of the str and num should be used.
    pub num: Record<i64, 3, OPT_ZERO>,
    /// Should only be present when num is present.
    /// Specifies the units of num.
    pub num_unit: Record<StringOffset, 4, OPT_ZERO>,
}

impl Value for Label {
    const WIRE_TYPE: WireType = WireType::LengthDelimited;

    fn proto_len(&self) -> u64 {
        self.key.proto_len()
            + self.str.proto_len()
            + self.num.proto_len()
            + self.num_unit.proto_len()
    }

    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.key.encode(writer)?;
        self.str.encode(writer)?;
        self.num.encode(writer)?;
        self.num_unit.encode(writer)
    }
}

unsafe impl LengthDelimited for Label {}

#[cfg(feature = "prost_impls")]
impl From<Label> for crate::prost_impls::Label {
    fn from(label: Label) -> Self {
        Self::from(&label)
    }
}

#[cfg(feature = "prost_impls")]
impl From<&Label> for crate::prost_impls::Label {
    fn from(label: &Label) -> Self {
        Self {
            key: label.key.value.into(),
            str: label.str.value.into(),
            num: label.num.value,
            num_unit: label.num_unit.value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prost_impls;
    use prost::Message;

    #[test]
    fn numeric_label_skips_str() {
        let label = Label {
            key: Record::from(StringOffset::new(3)),
            str: Record::default(),
            num: Record::from(4096),
            num_unit: Record::from(StringOffset::new(4)),
        };
        let mut buffer = Vec::new();
        label.encode(&mut buffer).unwrap();
        assert_eq!(buffer, [0x08, 0x03, 0x18, 0x80, 0x20, 0x20, 0x04]);
    }

    #[test]
    fn roundtrip() {
        fn test(label: &Label) {
            let mut buffer = Vec::new();
            let prost_label = prost_impls::Label::from(label);
            assert_eq!(i64::from(label.key.value), prost_label.key);
            assert_eq!(i64::from(label.str.value), prost_label.str);
            assert_eq!(label.num.value, prost_label.num);
            assert_eq!(i64::from(label.num_unit.value), prost_label.num_unit);

            label.encode(&mut buffer).unwrap();
            let roundtrip = prost_impls::Label::decode(buffer.as_slice()).unwrap();
            assert_eq!(prost_label, roundtrip);

            let buffer2 = prost_label.encode_to_vec();
            let roundtrip2 = prost_impls::Label::decode(buffer2.as_slice()).unwrap();
            assert_eq!(roundtrip, roundtrip2);
        }

        bolero::check!().with_type::<Label>().for_each(test);
    }
}
