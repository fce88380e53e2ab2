// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use super::identifiable::{FxIndexSet, Id};
use pprof_nodejs_protobuf::StringOffset;

impl Id for StringOffset {
    fn from_offset(offset: usize) -> Self {
        #[allow(clippy::expect_used)]
        StringOffset::try_from(offset).expect("StringOffset to fit into a u32")
    }

    fn to_raw_id(&self) -> u64 {
        u64::from(self)
    }
}

/// Holds unique strings and provides [StringOffset]s that correspond to the
/// order that the strings were inserted.
#[derive(Clone, Debug)]
pub struct StringTable {
    strings: FxIndexSet<String>,
}

impl Default for StringTable {
    fn default() -> Self {
        Self::new()
    }
}

impl StringTable {
    /// Creates a new string table, which initially holds the empty string and
    /// no others.
    pub fn new() -> Self {
        let mut strings = FxIndexSet::default();
        // A handful of strings are always present: the sample types, their
        // units, and at least one frame's name and script.
        strings.reserve(32);
        strings.insert(String::new());
        Self { strings }
    }

    /// Returns the number of strings currently held in the string table.
    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Adds the string to the string table if it isn't present already, and
    /// returns a [StringOffset] that corresponds to the order that this
    /// string was originally inserted.
    ///
    /// # Panics
    /// This panics if more than `u32::MAX` strings are interned.
    pub fn intern(&mut self, str: &str) -> StringOffset {
        let offset = match self.strings.get_index_of(str) {
            Some(offset) => offset,
            None => self.strings.insert_full(str.to_owned()).0,
        };
        StringOffset::from_offset(offset)
    }

    #[inline]
    pub fn get(&self, offset: StringOffset) -> Option<&str> {
        self.strings.get_index(usize::from(offset)).map(String::as_str)
    }

    /// Iterates the strings in offset order, starting with the empty string.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().map(String::as_str)
    }
}
