// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Assembles a whole profile message from individual records, the way an
//! encoder streams it, and reads it back with both decoders.

use pprof_nodejs_protobuf::decoder::{self, Message as _};
use pprof_nodejs_protobuf::{
    prost_impls, Function, Line, Location, Record, Sample, StringOffset, ValueType, NO_OPT_ZERO,
    OPT_ZERO,
};
use prost::Message as _;
use std::io;

fn stream() -> io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let sample_type = ValueType::new(StringOffset::new(1), StringOffset::new(2));
    Record::<_, 1, NO_OPT_ZERO>::from(sample_type).encode(&mut buffer)?;

    let location_ids = [1u64];
    let values = [3i64, 300];
    let sample = Sample {
        location_ids: Record::from(location_ids.as_slice()),
        values: Record::from(values.as_slice()),
        labels: &[],
    };
    Record::<_, 2, NO_OPT_ZERO>::from(sample).encode(&mut buffer)?;

    let lines = [Record::from(Line {
        function_id: Record::from(1u64),
        lineno: Record::from(12i64),
    })];
    let location = Location {
        id: Record::from(1u64),
        mapping_id: Record::default(),
        address: Record::default(),
        lines: &lines,
        is_folded: Record::default(),
    };
    Record::<_, 4, NO_OPT_ZERO>::from(location).encode(&mut buffer)?;

    let function = Function {
        id: Record::from(1u64),
        name: Record::from(StringOffset::new(3)),
        system_name: Record::from(StringOffset::new(3)),
        filename: Record::from(StringOffset::new(4)),
        start_line: Record::default(),
    };
    Record::<_, 5, NO_OPT_ZERO>::from(function).encode(&mut buffer)?;

    for str in ["", "wall", "nanoseconds", "main", "app.js"] {
        Record::<_, 6, NO_OPT_ZERO>::from(str).encode(&mut buffer)?;
    }
    Record::<_, 9, OPT_ZERO>::from(0i64).encode(&mut buffer)?;
    Record::<_, 11, OPT_ZERO>::from(sample_type).encode(&mut buffer)?;
    Record::<_, 12, OPT_ZERO>::from(100i64).encode(&mut buffer)?;
    Ok(buffer)
}

#[test]
fn both_decoders_agree() {
    let bytes = stream().unwrap();
    let ours = decoder::Profile::decode(&bytes).unwrap();
    let theirs = prost_impls::Profile::decode(bytes.as_slice()).unwrap();

    // The zero time_nanos is left out of the stream.
    assert_eq!(ours.field_order, [1, 2, 4, 5, 6, 11, 12]);

    assert_eq!(ours.string_table, theirs.string_table);
    assert_eq!(ours.period, theirs.period);
    assert_eq!(ours.samples.len(), 1);
    assert_eq!(ours.samples[0].values, theirs.samples[0].values);
    assert_eq!(ours.samples[0].location_ids, theirs.samples[0].location_ids);

    let location = ours.location(1).unwrap();
    assert_eq!(location.lines[0].line, 12);
    let function = ours.function(location.lines[0].function_id).unwrap();
    assert_eq!(ours.string(function.name), Some("main"));
    assert_eq!(ours.string(function.filename), Some("app.js"));

    let period_type = ours.period_type.unwrap();
    assert_eq!(ours.string(period_type.r#type), Some("wall"));
    assert_eq!(
        theirs.period_type.map(|vt| (vt.r#type, vt.unit)),
        Some((1, 2))
    );
}

#[test]
fn truncated_streams_are_errors() {
    let bytes = stream().unwrap();
    for len in [1, bytes.len() - 1] {
        assert!(
            decoder::Profile::decode(&bytes[..len]).is_err(),
            "{len} bytes decoded"
        );
    }
}
