// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Dedup tables. Each one maps a structural value to a small integer id,
//! and never forgets a value once it has an id.

pub mod identifiable;
pub mod string_table;

pub use identifiable::{FunctionId, Id, Item, LocationId, MappingId, Table};
pub use string_table::StringTable;
