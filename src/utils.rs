//! Utility functions and traits for the integer map

use crate::int_map::IntMap;
use crate::key::MapKey;

/// Extension trait with materializing helpers over the map's lazy iterators
pub trait IntMapExt<I> {
    /// Returns every present key as a Vec, the reserved key first when present
    fn key_vec(&self) -> Vec<I>;

    /// Returns every stored value as a Vec, in the same order as [`IntMapExt::key_vec`]
    fn value_vec(&self) -> Vec<I>;
}

impl<I: MapKey> IntMapExt<I> for IntMap<I> {
    fn key_vec(&self) -> Vec<I> {
        self.keys().collect()
    }

    fn value_vec(&self) -> Vec<I> {
        self.items().map(|(_, value)| value).collect()
    }
}

/// Builds an `IntMap` with default geometry from an iterator of key-value pairs
pub fn from_iter<I, T>(iter: T) -> IntMap<I>
where
    I: MapKey,
    T: IntoIterator<Item = (I, I)>,
{
    let mut map = IntMap::default();

    for (key, value) in iter {
        map.insert(key, value);
    }

    map
}
