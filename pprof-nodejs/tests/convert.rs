// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

mod common;

use common::{decode, frame, leaf_names, resolve_samples};
use pprof_nodejs::tree::arena::{CallTree, Frame, NodeId};
use pprof_nodejs::tree::cpu::{encode_time_profile, HitCount, TimeProfileParams};
use pprof_nodejs::tree::heap::{encode_heap_profile, Allocation, HeapProfileParams};
use pprof_nodejs::{ANONYMOUS, EXTERNAL, IDLE, NATIVE, PROGRAM};
use std::time::{Duration, SystemTime};

fn start() -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(1_000)
}

fn time_params() -> TimeProfileParams {
    TimeProfileParams {
        interval_micros: 100,
        profile_start_micros: 0,
        profile_end_micros: 1_000,
        ..TimeProfileParams::new(start())
    }
}

#[test]
fn time_profile_stacks_are_leaf_first() -> anyhow::Result<()> {
    let mut tree = CallTree::new();
    let a = tree.add_child(NodeId::ROOT, Frame::new("A", "a.js", 1), vec![])?;
    let b = tree.add_child(a, Frame::new("B", "b.js", 2), vec![])?;
    tree.add_child(b, Frame::new("C", "c.js", 3), vec![HitCount(2)])?;

    let decoded = decode(&encode_time_profile(&tree.root(), &time_params())?)?;
    let samples = resolve_samples(&decoded)?;
    assert_eq!(samples.len(), 1);
    assert_eq!(
        samples[0].frames,
        [frame("C", "c.js", 3), frame("B", "b.js", 2), frame("A", "a.js", 1)]
    );
    assert_eq!(samples[0].values, [2, 200_000]);
    assert_eq!(decoded.period, 100_000);
    assert_eq!(decoded.duration_nanos, 1_000_000);
    assert_eq!(decoded.time_nanos, 1_000_000_000_000);
    Ok(())
}

#[test]
fn idle_and_program_subtrees_are_left_out() -> anyhow::Result<()> {
    let mut tree = CallTree::new();
    let idle = tree.add_child(NodeId::ROOT, Frame::new(IDLE, "", 0), vec![HitCount(9)])?;
    tree.add_child(idle, Frame::new("under_idle", "x.js", 1), vec![HitCount(9)])?;
    tree.add_child(NodeId::ROOT, Frame::new(PROGRAM, "", 0), vec![HitCount(3)])?;
    let main = tree.add_child(NodeId::ROOT, Frame::new("main", "x.js", 2), vec![HitCount(1)])?;
    tree.add_child(main, Frame::new("tick", "x.js", 5), vec![HitCount(4)])?;

    let decoded = decode(&encode_time_profile(&tree.root(), &time_params())?)?;
    let samples = resolve_samples(&decoded)?;
    assert_eq!(leaf_names(&samples), ["main", "tick"]);
    for name in [IDLE, PROGRAM, "under_idle"] {
        assert!(!decoded.string_table.iter().any(|s| s == name), "{name} leaked");
    }
    Ok(())
}

#[test]
fn heap_profile_starts_with_external_memory() -> anyhow::Result<()> {
    let mut tree = CallTree::new();
    let server = tree.add_child(NodeId::ROOT, Frame::new("", "", 0), vec![])?;
    tree.add_child(
        server,
        Frame::new("alloc", "a.js", 7),
        vec![
            Allocation { size: 64, count: 2 },
            Allocation { size: 16, count: 1 },
        ],
    )?;

    let params = HeapProfileParams {
        external_bytes: 1 << 20,
        ..HeapProfileParams::new(start())
    };
    let decoded = decode(&encode_heap_profile(&tree.root(), &params)?)?;
    let samples = resolve_samples(&decoded)?;
    assert_eq!(samples.len(), 3);

    assert_eq!(samples[0].frames, [frame(EXTERNAL, "", 0)]);
    assert_eq!(samples[0].values, [1, 1 << 20]);

    let stack = [frame("alloc", "a.js", 7), frame(ANONYMOUS, NATIVE, 0)];
    assert_eq!(samples[1].frames, stack);
    assert_eq!(samples[1].values, [2, 128]);
    assert_eq!(samples[2].frames, stack);
    assert_eq!(samples[2].values, [1, 16]);

    // Both allocation samples point at the same two locations.
    assert_eq!(decoded.locations.len(), 3);
    assert_eq!(decoded.functions.len(), 3);
    assert_eq!(decoded.period, 512 * 1024);
    assert_eq!(decoded.duration_nanos, 0);
    Ok(())
}

#[test]
fn empty_trees() -> anyhow::Result<()> {
    let decoded = decode(&encode_time_profile(
        &CallTree::<HitCount>::new().root(),
        &time_params(),
    )?)?;
    assert!(decoded.samples.is_empty());
    assert!(decoded.locations.is_empty());
    assert_eq!(decoded.string_table[0], "");

    let params = HeapProfileParams::new(start());
    let decoded = decode(&encode_heap_profile(
        &CallTree::<Allocation>::new().root(),
        &params,
    )?)?;
    let samples = resolve_samples(&decoded)?;
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].values, [1, 0]);
    Ok(())
}

#[test]
fn cpu_profile_ending_before_it_starts() -> anyhow::Result<()> {
    // Shows the clamping warning in the test output.
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let params = TimeProfileParams {
        profile_start_micros: 2_000,
        profile_end_micros: 1_000,
        ..time_params()
    };
    let decoded = decode(&encode_time_profile(
        &CallTree::<HitCount>::new().root(),
        &params,
    )?)?;
    assert_eq!(decoded.duration_nanos, 0);
    assert!(!decoded.field_order.contains(&10));
    Ok(())
}
