use std::fmt;
use std::slice;

use crate::key::MapKey;

/// Default expected entry count used by [`IntMap::default`].
const DEFAULT_EXPECTED_SIZE: usize = 16;

/// Default fill factor used by [`IntMap::default`].
const DEFAULT_FILL_FACTOR: f64 = 0.75;

/// Error raised when [`IntMap::new`] is given invalid parameters.
///
/// Construction is the only fallible operation on the map; every lookup and
/// mutation afterwards is total over the key domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// The fill factor was outside the open interval (0, 1).
    FillFactorOutOfRange(f64),
    /// The expected size was zero.
    ZeroExpectedSize,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FillFactorOutOfRange(fill) => {
                write!(f, "fill factor {fill} must lie strictly between 0 and 1")
            }
            Self::ZeroExpectedSize => write!(f, "expected size must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// An open-addressing hash map from machine integers to machine integers.
///
/// Keys and values share one integer type (`i64` or `u64`, see [`MapKey`])
/// and live interleaved in a single flat array: slot `i` occupies array
/// positions `2i` (key) and `2i + 1` (value). Collisions are resolved by
/// linear probing with a stride of 2 over the interleaved array, and the
/// home slot comes from a golden-ratio multiplicative scramble of the key,
/// so there is no per-entry allocation and no pointer chasing.
///
/// Zero is the in-array marker for an empty slot. A genuine zero key is
/// tracked in dedicated fields next to the array, so every integer of the
/// key type is usable as a key.
///
/// Deletion is tombstone-free: removing an entry shifts later entries of
/// the same probe chain backward into the gap, so lookups never slow down
/// as entries come and go. The table only ever grows, doubling whenever the
/// configured fill factor would be exceeded.
///
/// Note: this implementation is not thread-safe; it assumes one writer at a
/// time and no readers during a write.
#[derive(Debug, Clone)]
pub struct IntMap<I: MapKey> {
    /// Interleaved key/value storage; slot `i` sits at positions `2i` and `2i + 1`.
    data: Vec<I>,
    /// Configured ratio of occupied slots to capacity tolerated before growth.
    fill_factor: f64,
    /// Entry count at which the next insert triggers growth.
    threshold: usize,
    /// Live entry count, including the reserved-key entry when present.
    size: usize,
    /// Isolates a home slot index from a scrambled hash; `capacity - 1`.
    mask: usize,
    /// Wraps array positions during the stride-2 walk; `2 * capacity - 1`.
    mask2: usize,
    /// Whether the reserved key (zero) is present.
    has_free_key: bool,
    /// Value stored for the reserved key; meaningless unless `has_free_key`.
    free_val: I,
}

/// Smallest power-of-two slot count that keeps `expected` entries at or
/// below the `fill` ratio, with a floor of 2.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn array_size(expected: usize, fill: f64) -> usize {
    let needed = ((expected as f64) / fill).ceil() as usize;
    needed.max(2).next_power_of_two()
}

impl<I: MapKey> Default for IntMap<I> {
    fn default() -> Self {
        Self::with_geometry(
            array_size(DEFAULT_EXPECTED_SIZE, DEFAULT_FILL_FACTOR),
            DEFAULT_FILL_FACTOR,
        )
    }
}

impl<I: MapKey> Extend<(I, I)> for IntMap<I> {
    fn extend<T: IntoIterator<Item = (I, I)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<I: MapKey> IntMap<I> {
    /// Creates a map sized so that `expected_size` entries fit without
    /// growing, at the given `fill_factor`.
    ///
    /// The initial capacity is the next power of two at or above
    /// `ceil(expected_size / fill_factor)`, never less than 2. The map
    /// grows as needed afterwards; `fill_factor` stays fixed for its
    /// lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FillFactorOutOfRange`] unless
    /// `0 < fill_factor < 1` (NaN is rejected), and
    /// [`ConfigError::ZeroExpectedSize`] if `expected_size` is zero. No map
    /// is built on failure.
    pub fn new(expected_size: usize, fill_factor: f64) -> Result<Self, ConfigError> {
        if !(fill_factor > 0.0 && fill_factor < 1.0) {
            return Err(ConfigError::FillFactorOutOfRange(fill_factor));
        }
        if expected_size == 0 {
            return Err(ConfigError::ZeroExpectedSize);
        }
        Ok(Self::with_geometry(
            array_size(expected_size, fill_factor),
            fill_factor,
        ))
    }

    /// Builds an empty map over `capacity` slots; `capacity` must be a
    /// power of two of at least 2 and `fill_factor` already validated.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn with_geometry(capacity: usize, fill_factor: f64) -> Self {
        Self {
            data: vec![I::FREE; capacity.saturating_mul(2)],
            fill_factor,
            threshold: ((capacity as f64) * fill_factor).floor() as usize,
            size: 0,
            mask: capacity.saturating_sub(1),
            mask2: capacity.saturating_mul(2).saturating_sub(1),
            has_free_key: false,
            free_val: I::FREE,
        }
    }

    /// Array position of the home slot for `key`.
    #[allow(clippy::arithmetic_side_effects)]
    fn home_of(&self, key: I) -> usize {
        (key.scramble() & self.mask) << 1
    }

    /// Reads the key stored at array position `ptr`.
    fn key_at(&self, ptr: usize) -> I {
        self.data.get(ptr).copied().unwrap_or(I::FREE)
    }

    /// Reads the value paired with the key at array position `ptr`.
    fn val_at(&self, ptr: usize) -> I {
        self.data.get(ptr.wrapping_add(1)).copied().unwrap_or(I::FREE)
    }

    /// Writes `key` and `value` into the slot whose key position is `ptr`.
    fn write_entry(&mut self, ptr: usize, key: I, value: I) {
        if let Some(slot) = self.data.get_mut(ptr) {
            *slot = key;
        }
        if let Some(slot) = self.data.get_mut(ptr.wrapping_add(1)) {
            *slot = value;
        }
    }

    /// Returns the value stored under `key`, or `None` if absent.
    ///
    /// The walk starts at the key's home slot and follows the probe chain
    /// until a match or an empty slot; growth keeps at least one slot free,
    /// so every chain ends.
    #[must_use]
    pub fn get(&self, key: I) -> Option<I> {
        if key == I::FREE {
            return self.has_free_key.then_some(self.free_val);
        }

        let mut ptr = self.home_of(key);
        for _ in 0..self.capacity() {
            let k = self.key_at(ptr);
            if k == I::FREE {
                return None;
            }
            if k == key {
                return Some(self.val_at(ptr));
            }
            ptr = ptr.wrapping_add(2) & self.mask2;
        }
        None
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn get_mut(&mut self, key: I) -> Option<&mut I> {
        if key == I::FREE {
            return self.has_free_key.then(|| &mut self.free_val);
        }

        let mut ptr = self.home_of(key);
        for _ in 0..self.capacity() {
            let k = self.key_at(ptr);
            if k == I::FREE {
                return None;
            }
            if k == key {
                return self.data.get_mut(ptr.wrapping_add(1));
            }
            ptr = ptr.wrapping_add(2) & self.mask2;
        }
        None
    }

    /// Returns true if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: I) -> bool {
        self.get(key).is_some()
    }

    /// Inserts `value` under `key`, returning the previous value if the key
    /// was already present.
    ///
    /// A fresh insert that brings the map to its growth threshold doubles
    /// the table before returning; an overwrite never changes the size.
    pub fn insert(&mut self, key: I, value: I) -> Option<I> {
        if key == I::FREE {
            let previous = self.has_free_key.then_some(self.free_val);
            if !self.has_free_key {
                self.size = self.size.saturating_add(1);
                self.has_free_key = true;
            }
            self.free_val = value;
            return previous;
        }

        let mut ptr = self.home_of(key);
        for _ in 0..self.capacity() {
            let k = self.key_at(ptr);
            if k == I::FREE {
                self.write_entry(ptr, key, value);
                if self.size >= self.threshold {
                    self.rehash();
                } else {
                    self.size = self.size.saturating_add(1);
                }
                return None;
            }
            if k == key {
                let previous = self.val_at(ptr);
                self.write_entry(ptr, key, value);
                return Some(previous);
            }
            ptr = ptr.wrapping_add(2) & self.mask2;
        }
        // Unreachable while the growth invariant holds: the table always
        // keeps at least one empty slot, so the walk ends inside the loop.
        None
    }

    /// Removes `key`, returning its value if it was present.
    ///
    /// Removal leaves no tombstone: the freed slot is backfilled by
    /// shifting later entries of the probe chain backward, so chains stay
    /// as short as the live entries require.
    pub fn remove(&mut self, key: I) -> Option<I> {
        if key == I::FREE {
            if !self.has_free_key {
                return None;
            }
            self.has_free_key = false;
            self.size = self.size.saturating_sub(1);
            return Some(self.free_val);
        }

        let mut ptr = self.home_of(key);
        for _ in 0..self.capacity() {
            let k = self.key_at(ptr);
            if k == I::FREE {
                return None;
            }
            if k == key {
                let removed = self.val_at(ptr);
                self.shift_keys(ptr);
                self.size = self.size.saturating_sub(1);
                return Some(removed);
            }
            ptr = ptr.wrapping_add(2) & self.mask2;
        }
        None
    }

    /// Closes the gap left by a removed entry at array position `pos`.
    ///
    /// Scans forward through the rest of the probe sequence. An entry found
    /// at `pos` may move back into the gap at `last` only if its home slot
    /// does not lie on the cyclic interval between the gap and the entry's
    /// current position; moving it otherwise would cut the entry off from
    /// its own chain. Each move re-opens the gap at the entry's old
    /// position, and the scan ends at the first empty slot.
    fn shift_keys(&mut self, mut pos: usize) {
        loop {
            let last = pos;
            pos = last.wrapping_add(2) & self.mask2;
            let moved = loop {
                let k = self.key_at(pos);
                if k == I::FREE {
                    break None;
                }
                let slot = self.home_of(k);
                let movable = if last <= pos {
                    last >= slot || slot > pos
                } else {
                    last >= slot && slot > pos
                };
                if movable {
                    break Some((k, self.val_at(pos)));
                }
                pos = pos.wrapping_add(2) & self.mask2;
            };
            match moved {
                Some((key, value)) => self.write_entry(last, key, value),
                None => {
                    self.write_entry(last, I::FREE, I::FREE);
                    return;
                }
            }
        }
    }

    /// Doubles the table and re-inserts every entry against the new
    /// geometry.
    ///
    /// The reserved-key entry lives outside the array and survives the
    /// rebuild untouched; `size` restarts from it and is re-counted by the
    /// re-insertions.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn rehash(&mut self) {
        let new_len = self.data.len().saturating_mul(2);
        let capacity = new_len / 2;
        self.threshold = ((capacity as f64) * self.fill_factor).floor() as usize;
        self.mask = capacity.saturating_sub(1);
        self.mask2 = new_len.saturating_sub(1);

        let old = std::mem::replace(&mut self.data, vec![I::FREE; new_len]);
        self.size = usize::from(self.has_free_key);

        for pair in old.chunks_exact(2) {
            if let &[key, value] = pair {
                if key != I::FREE {
                    self.insert(key, value);
                }
            }
        }
    }

    /// Returns the number of entries in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns true if the map holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the current slot capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len() / 2
    }

    /// Returns the current ratio of entries to capacity.
    #[must_use]
    #[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
    pub fn load_factor(&self) -> f64 {
        self.size as f64 / self.capacity() as f64
    }

    /// Removes every entry, keeping the allocated capacity.
    pub fn clear(&mut self) {
        self.data.fill(I::FREE);
        self.size = 0;
        self.has_free_key = false;
        self.free_val = I::FREE;
    }

    /// Returns an iterator over all keys, the reserved key first when
    /// present, then the occupied slots in storage order.
    #[must_use]
    pub fn keys(&self) -> Keys<'_, I> {
        Keys { inner: self.items() }
    }

    /// Returns an iterator over all entries, the reserved-key entry first
    /// when present, then the occupied slots in storage order.
    ///
    /// Storage order is unrelated to insertion order and changes across
    /// growth. The iterator borrows the map, so the map cannot be mutated
    /// while one is live.
    #[must_use]
    pub fn items(&self) -> Items<'_, I> {
        Items {
            pairs: self.data.chunks_exact(2),
            pending_free: self.has_free_key.then_some(self.free_val),
        }
    }
}

/// Iterator over the entries of an [`IntMap`], produced in storage order
/// after the reserved-key entry.
#[derive(Debug, Clone)]
pub struct Items<'a, I: MapKey> {
    /// Pairwise walk over the interleaved key/value storage.
    pairs: slice::ChunksExact<'a, I>,
    /// Reserved-key value queued for emission ahead of the array walk.
    pending_free: Option<I>,
}

impl<I: MapKey> Iterator for Items<'_, I> {
    type Item = (I, I);

    fn next(&mut self) -> Option<(I, I)> {
        if let Some(value) = self.pending_free.take() {
            return Some((I::FREE, value));
        }
        loop {
            let pair = self.pairs.next()?;
            if let &[key, value] = pair {
                if key != I::FREE {
                    return Some((key, value));
                }
            }
        }
    }
}

/// Iterator over the keys of an [`IntMap`].
#[derive(Debug, Clone)]
pub struct Keys<'a, I: MapKey> {
    /// Underlying entry iterator; keys are projected out of it.
    inner: Items<'a, I>,
}

impl<I: MapKey> Iterator for Keys<'_, I> {
    type Item = I;

    fn next(&mut self) -> Option<I> {
        self.inner.next().map(|(key, _)| key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    #[test]
    fn test_insert_and_get() {
        let mut map = IntMap::<i64>::new(8, 0.75).unwrap();
        assert_eq!(map.insert(1, 100), None);
        assert_eq!(map.insert(2, 200), None);
        assert_eq!(map.insert(-3, 300), None);

        assert_eq!(map.get(1), Some(100));
        assert_eq!(map.get(2), Some(200));
        assert_eq!(map.get(-3), Some(300));
        assert_eq!(map.get(4), None);
    }

    #[test]
    fn test_insert_returns_previous_value() {
        let mut map = IntMap::<u64>::default();
        assert_eq!(map.insert(7, 1), None);
        assert_eq!(map.insert(7, 2), Some(1));
        assert_eq!(map.get(7), Some(2));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut map = IntMap::<i64>::default();
        map.insert(1, 10);
        map.insert(2, 20);

        assert_eq!(map.remove(1), Some(10));
        assert_eq!(map.get(1), None);
        assert_eq!(map.get(2), Some(20));
        assert_eq!(map.remove(1), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_remove_absent_key_leaves_size() {
        let mut map = IntMap::<u64>::default();
        map.insert(5, 50);
        assert_eq!(map.remove(6), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_zero_key_round_trip() {
        let mut map = IntMap::<i64>::default();
        assert_eq!(map.get(0), None);
        assert_eq!(map.insert(0, 42), None);
        assert_eq!(map.len(), 1);
        assert!(map.contains_key(0));
        assert_eq!(map.get(0), Some(42));
        assert_eq!(map.insert(0, 43), Some(42));
        assert_eq!(map.len(), 1);
        assert_eq!(map.remove(0), Some(43));
        assert_eq!(map.get(0), None);
        assert_eq!(map.remove(0), None);
        assert!(map.is_empty());
    }

    #[test]
    fn test_growth_scenario() {
        let mut map = IntMap::<i64>::new(4, 0.5).unwrap();
        assert_eq!(map.capacity(), 8);

        for key in 1..=4 {
            map.insert(key, key * 10);
        }
        assert_eq!(map.len(), 4);
        assert_eq!(map.capacity(), 8);

        map.insert(5, 50);
        assert_eq!(map.capacity(), 16);
        assert_eq!(map.len(), 5);
        for key in 1..=5 {
            assert_eq!(map.get(key), Some(key * 10));
        }

        assert_eq!(map.remove(2), Some(20));
        assert_eq!(map.get(2), None);
        for key in [1, 3, 4, 5] {
            assert_eq!(map.get(key), Some(key * 10));
        }
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn test_growth_preserves_zero_key() {
        let mut map = IntMap::<u64>::new(2, 0.5).unwrap();
        map.insert(0, 999);
        for key in 1..=64 {
            map.insert(key, key);
        }
        assert_eq!(map.get(0), Some(999));
        for key in 1..=64 {
            assert_eq!(map.get(key), Some(key));
        }
        assert_eq!(map.len(), 65);
    }

    #[test]
    fn test_len_and_is_empty() {
        let mut map = IntMap::<i64>::default();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);

        map.insert(1, 1);
        assert!(!map.is_empty());
        assert_eq!(map.len(), 1);

        map.insert(2, 2);
        assert_eq!(map.len(), 2);

        map.remove(1);
        assert_eq!(map.len(), 1);

        map.remove(2);
        assert!(map.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut map = IntMap::<u64>::default();
        map.insert(0, 1);
        map.insert(9, 2);
        assert_eq!(map.len(), 2);

        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.get(0), None);
        assert_eq!(map.get(9), None);
    }

    #[test]
    fn test_get_mut() {
        let mut map = IntMap::<i64>::default();
        map.insert(3, 30);
        map.insert(0, 5);

        if let Some(value) = map.get_mut(3) {
            *value += 1;
        }
        if let Some(value) = map.get_mut(0) {
            *value += 1;
        }

        assert_eq!(map.get(3), Some(31));
        assert_eq!(map.get(0), Some(6));
        assert_eq!(map.get_mut(99), None);
    }

    #[test]
    fn test_keys_and_items_exact_set() {
        let mut map = IntMap::<i64>::default();
        let entries = [(0, 7), (1, 10), (-2, 20), (300, 30)];
        for (key, value) in entries {
            map.insert(key, value);
        }

        let collected: HashMap<i64, i64> = map.items().collect();
        assert_eq!(collected, HashMap::from(entries));

        let mut keys: Vec<i64> = map.keys().collect();
        keys.sort_unstable();
        assert_eq!(keys, vec![-2, 0, 1, 300]);
    }

    #[test]
    fn test_items_emits_zero_key_first() {
        let mut map = IntMap::<u64>::default();
        map.insert(11, 1);
        map.insert(0, 2);
        map.insert(13, 3);

        let first = map.items().next();
        assert_eq!(first, Some((0, 2)));
        assert_eq!(map.items().count(), 3);
    }

    #[test]
    fn test_dense_insert_then_alternating_remove() {
        let mut map = IntMap::<i64>::new(4, 0.6).unwrap();
        for key in 1..=512 {
            map.insert(key, -key);
        }
        assert_eq!(map.len(), 512);

        for key in (1..=512).filter(|key| key % 2 == 0) {
            assert_eq!(map.remove(key), Some(-key));
        }
        assert_eq!(map.len(), 256);

        // Every survivor must still be reachable through its probe chain.
        for key in 1..=512 {
            if key % 2 == 0 {
                assert_eq!(map.get(key), None);
            } else {
                assert_eq!(map.get(key), Some(-key));
            }
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert_eq!(
            IntMap::<i64>::new(8, 0.0).err(),
            Some(ConfigError::FillFactorOutOfRange(0.0))
        );
        assert_eq!(
            IntMap::<i64>::new(8, 1.0).err(),
            Some(ConfigError::FillFactorOutOfRange(1.0))
        );
        assert!(IntMap::<i64>::new(8, -0.5).is_err());
        assert!(IntMap::<i64>::new(8, f64::NAN).is_err());
        assert_eq!(
            IntMap::<u64>::new(0, 0.5).err(),
            Some(ConfigError::ZeroExpectedSize)
        );
    }

    #[test]
    fn test_extend_and_default() {
        let mut map = IntMap::<u64>::default();
        map.extend([(1, 10), (2, 20), (1, 11)]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(1), Some(11));
        assert_eq!(map.get(2), Some(20));
    }

    proptest! {
        /// Random insert/remove/get interleavings over a narrow key domain
        /// (to force probe-chain collisions) must agree with the standard
        /// map at every step, and in the final entry set.
        #[test]
        fn test_random_ops_match_std_hash_map(
            ops in proptest::collection::vec((any::<u8>(), -4_i64..12, any::<i64>()), 0..256),
        ) {
            let mut map = IntMap::<i64>::new(4, 0.6).unwrap();
            let mut reference: HashMap<i64, i64> = HashMap::new();

            for (op, key, value) in ops {
                match op % 3 {
                    0 => prop_assert_eq!(map.insert(key, value), reference.insert(key, value)),
                    1 => prop_assert_eq!(map.remove(key), reference.remove(&key)),
                    _ => prop_assert_eq!(map.get(key), reference.get(&key).copied()),
                }
                prop_assert_eq!(map.len(), reference.len());
            }

            let collected: HashMap<i64, i64> = map.items().collect();
            prop_assert_eq!(collected, reference);
        }
    }
}
