// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::profile::{Function, Location, Mapping};
use std::fmt;
use std::hash::{BuildHasherDefault, Hash};
use std::num::NonZeroU32;

pub type FxIndexMap<K, V> = indexmap::IndexMap<K, V, BuildHasherDefault<rustc_hash::FxHasher>>;
pub type FxIndexSet<K> = indexmap::IndexSet<K, BuildHasherDefault<rustc_hash::FxHasher>>;

pub trait Id: Copy + Eq + Hash {
    /// Convert from a usize offset into an Id.
    /// # Panics
    /// Panic if the offset cannot be represented in the Id. This is expected
    /// to be ultra-rare (more than u32::MAX-1 items created?!).
    fn from_offset(offset: usize) -> Self;

    fn to_raw_id(&self) -> u64;

    fn into_raw_id(self) -> u64 {
        self.to_raw_id()
    }
}

pub trait Item: Clone + Eq + Hash {
    /// The Id associated with this Item, e.g. Function -> FunctionId.
    type Id: Id;

    /// Whether this is the all-default value, which is never stored and
    /// always maps to id 0.
    fn is_zero(&self) -> bool;
}

/// Creates a non-zero, 32-bit unsigned id from the offset. It's guaranteed to
/// be the offset + 1, with guards to not overflow the size of u32.
///
/// Many pprof collections do not allow an item with an id of zero, even if
/// it's the first item in the collection.
#[inline]
pub fn small_non_zero_pprof_id(offset: usize) -> Option<NonZeroU32> {
    let small: u32 = offset.try_into().ok()?;
    NonZeroU32::new(small.checked_add(1)?)
}

macro_rules! define_id {
    ($id:ident, $item:ty, $what:literal) => {
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $id(NonZeroU32);

        impl Id for $id {
            fn from_offset(offset: usize) -> Self {
                #[allow(clippy::expect_used)]
                Self(
                    small_non_zero_pprof_id(offset)
                        .expect(concat!($what, " to fit into a u32")),
                )
            }

            fn to_raw_id(&self) -> u64 {
                self.0.get().into()
            }
        }

        impl fmt::Display for $id {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl Item for $item {
            type Id = $id;

            fn is_zero(&self) -> bool {
                <$item>::is_zero(self)
            }
        }
    };
}

define_id!(MappingId, Mapping, "MappingId");
define_id!(LocationId, Location, "LocationId");
define_id!(FunctionId, Function, "FunctionId");

/// An append-only dedup table. Ids are 1-based and follow insertion order,
/// which leaves 0 for the all-default item.
#[derive(Clone, Debug)]
pub struct Table<T: Item> {
    items: FxIndexSet<T>,
}

impl<T: Item> Default for Table<T> {
    fn default() -> Self {
        Self {
            items: FxIndexSet::default(),
        }
    }
}

impl<T: Item> Table<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of an item equal to `item`, storing a copy first if
    /// there isn't one. Returns `None` for the all-default item.
    ///
    /// # Panics
    /// Panics if the number of items overflows the id type.
    pub fn intern(&mut self, item: &T) -> Option<T::Id> {
        if item.is_zero() {
            return None;
        }
        let offset = match self.items.get_index_of(item) {
            Some(offset) => offset,
            None => self.items.insert_full(item.clone()).0,
        };
        Some(T::Id::from_offset(offset))
    }

    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// The item at offset `offset`, which has the id `offset + 1`.
    #[inline]
    pub fn get_index(&self, offset: usize) -> Option<&T> {
        self.items.get_index(offset)
    }

    /// Iterates the items with their ids, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (T::Id, &T)> {
        self.items
            .iter()
            .enumerate()
            .map(|(offset, item)| (T::Id::from_offset(offset), item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_non_zero_pprof_id() {
        assert_eq!(NonZeroU32::new(1), small_non_zero_pprof_id(0));
        assert_eq!(NonZeroU32::new(2), small_non_zero_pprof_id(1));
        assert_eq!(
            NonZeroU32::new(u32::MAX),
            small_non_zero_pprof_id((u32::MAX - 1) as usize)
        );

        assert_eq!(None, small_non_zero_pprof_id(u32::MAX as usize));
        assert_eq!(None, small_non_zero_pprof_id(usize::MAX));
    }

    #[test]
    fn default_item_is_never_stored() {
        let mut table = Table::<Mapping>::new();
        assert_eq!(table.intern(&Mapping::default()), None);
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn ids_are_one_based_and_stable() {
        let mut table = Table::<Function>::new();
        let a = Function {
            name: "a".into(),
            ..Function::default()
        };
        let b = Function {
            name: "b".into(),
            ..Function::default()
        };

        let a_id = table.intern(&a).map(Id::into_raw_id);
        let b_id = table.intern(&b).map(Id::into_raw_id);
        assert_eq!((a_id, b_id), (Some(1), Some(2)));

        // A structurally equal copy gets the same id and isn't stored again.
        assert_eq!(table.intern(&a.clone()).map(Id::into_raw_id), Some(1));
        assert_eq!(table.len(), 2);

        let ids: Vec<_> = table
            .iter()
            .map(|(id, item)| (id.into_raw_id(), item.name.as_str()))
            .collect();
        assert_eq!(ids, [(1, "a"), (2, "b")]);
        assert_eq!(table.get_index(1), Some(&b));
    }

    #[test]
    fn independently_built_locations_collapse() {
        let mut table = Table::<Location>::new();
        let first = table.intern(&Location::for_frame("f", "a.js", 3));
        let second = table.intern(&Location::for_frame("f", "a.js", 3));
        assert!(first.is_some());
        assert_eq!(first, second);

        let folded = Location {
            is_folded: true,
            ..Location::for_frame("f", "a.js", 3)
        };
        assert_ne!(table.intern(&folded), first);
        assert_eq!(table.len(), 2);
    }
}
