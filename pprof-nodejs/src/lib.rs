// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

//! Turns snapshots of V8's sampling heap profiler and CPU profiler into
//! pprof profiles.
//!
//! The pieces, leaves first:
//!
//! - [profile]: the in-memory pprof model. Values are structural: a
//!   [profile::Location] holds its [profile::Function] by value, not by id.
//! - [collections]: the dedup tables which assign ids to those values.
//! - [serializer]: the [serializer::Encoder], which owns one set of tables and
//!   writes a [profile::Profile] in the pprof wire format.
//! - [tree]: walks a sampled call tree and appends one sample per bucket,
//!   with the heap and CPU specializations in [tree::heap] and [tree::cpu].
//! - [v8]: builds owned call trees from the DevTools JSON formats.
//!
//! Everything here is synchronous and single-threaded. The trees handed to
//! [tree] are owned snapshots, so conversion can run on any thread while the
//! profiler keeps sampling.

pub mod collections;
pub mod error;
pub mod profile;
pub mod serializer;
pub mod tree;
pub mod v8;

#[cfg(test)]
mod pprof;

pub use error::Error;

/// Name given to frames whose function has no name.
pub const ANONYMOUS: &str = "(anonymous)";

/// Script name given to frames which don't come from a script.
pub const NATIVE: &str = "<native>";

/// Name of the synthetic frame which carries memory tracked outside of the
/// JavaScript heap, e.g. ArrayBuffer backing stores.
pub const EXTERNAL: &str = "(external)";

/// V8's pseudo-frame for time spent with nothing to run.
pub const IDLE: &str = "(idle)";

/// V8's pseudo-frame for time spent in the engine itself.
pub const PROGRAM: &str = "(program)";
