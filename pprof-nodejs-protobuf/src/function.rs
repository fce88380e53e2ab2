// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::{LengthDelimited, Record, StringOffset, Value, WireType, NO_OPT_ZERO, OPT_ZERO};
use std::io::{self, Write};

/// Represents a function in a profile.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(test, derive(bolero::generator::TypeGenerator))]
pub struct Function {
    /// Unique nonzero id for the function.
    pub id: Record<u64, 1, NO_OPT_ZERO>,
    /// Name of the function, in human-readable form if available.
    pub name: Record<StringOffset, 2, OPT_ZERO>,
    /// Name of the function, as identified by the system. For instance,
    /// it can be a C++ mangled name.
    pub system_name: Record<StringOffset, 3, OPT_ZERO>,
    /// Source file containing the function.
    pub filename: Record<StringOffset, 4, OPT_ZERO>,
    /// Line number in source file where the function starts.
    pub start_line: Record<i64, 5, OPT_ZERO>,
}

impl Value for Function {
    const WIRE_TYPE: WireType = WireType::LengthDelimited;

    fn proto_len(&self) -> u64 {
        self.id.proto_len()
            + self.name.proto_len()
            + self.system_name.proto_len()
            + self.filename.proto_len()
            + self.start_line.proto_len()
    }

    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.id.encode(writer)?;
        self.name.encode(writer)?;
        self.system_name.encode(writer)?;
        self.filename.encode(writer)?;
        self.start_line.encode(writer)
    }
}

unsafe impl LengthDelimited for Function {}

#[cfg(feature = "prost_impls")]
impl From<Function> for crate::prost_impls::Function {
    fn from(function: Function) -> Self {
        Self::from(&function)
    }
}

#[cfg(feature = "prost_impls")]
impl From<&Function> for crate::prost_impls::Function {
    fn from(function: &Function) -> Self {
        Self {
            id: function.id.value,
            name: function.name.value.into(),
            system_name: function.system_name.value.into(),
            filename: function.filename.value.into(),
            start_line: function.start_line.value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prost_impls;
    use prost::Message;

    #[test]
    fn same_name_and_system_name() {
        let function = Function {
            id: Record::from(1),
            name: Record::from(StringOffset::new(5)),
            system_name: Record::from(StringOffset::new(5)),
            filename: Record::from(StringOffset::new(6)),
            start_line: Record::default(),
        };
        let mut buffer = Vec::new();
        function.encode(&mut buffer).unwrap();
        assert_eq!(buffer, [0x08, 0x01, 0x10, 0x05, 0x18, 0x05, 0x20, 0x06]);
    }

    #[test]
    fn roundtrip() {
        fn test(function: &Function) {
            let prost_function = prost_impls::Function::from(function);

            let mut buffer = Vec::new();
            function.encode(&mut buffer).unwrap();
            let roundtrip = prost_impls::Function::decode(buffer.as_slice()).unwrap();
            assert_eq!(prost_function, roundtrip);

            let buffer2 = prost_function.encode_to_vec();
            let roundtrip2 = prost_impls::Function::decode(buffer2.as_slice()).unwrap();
            assert_eq!(roundtrip, roundtrip2);
        }

        bolero::check!().with_type::<Function>().for_each(test);
    }
}
