//! # phimap
//!
//! Fast open-addressing hash maps for machine-integer keys and values.
//!
//! This crate provides one parameterized map, [`IntMap`], instantiated for
//! the two supported integer widths:
//!
//! - [`Int64Map`]: maps `i64` keys to `i64` values
//! - [`UInt64Map`]: maps `u64` keys to `u64` values
//!
//! Keys and values are stored interleaved in one flat array, with collisions
//! resolved by linear probing from a golden-ratio scrambled home slot, so
//! there is no per-entry allocation, no boxing, and no pointer chasing. This
//! suits performance-sensitive id-to-id indexes, counters, and dedup tables
//! where a general-purpose map's overhead is unacceptable. Deletion is
//! tombstone-free: probe chains are compacted in place, so lookups stay fast
//! under churn. Zero is a fully supported key.
//!
//! ## Basic Usage
//!
//! ```rust
//! use phimap::Int64Map;
//!
//! // Room for 16 entries before the first growth, at a 0.75 fill factor.
//! let mut map = Int64Map::new(16, 0.75).unwrap();
//!
//! // Insert values; the previous value comes back on overwrite.
//! assert_eq!(map.insert(7, 700), None);
//! assert_eq!(map.insert(7, 701), Some(700));
//!
//! // Zero is an ordinary key.
//! map.insert(0, 1);
//! assert_eq!(map.get(0), Some(1));
//!
//! // Remove values.
//! assert_eq!(map.remove(7), Some(701));
//! assert_eq!(map.get(7), None);
//! ```
//!
//! ## Iteration
//!
//! ```rust
//! use phimap::UInt64Map;
//!
//! let mut map = UInt64Map::new(8, 0.5).unwrap();
//! map.insert(0, 10);
//! map.insert(1, 20);
//! map.insert(2, 30);
//!
//! // Entries come out in storage order, the zero-key entry first; each
//! // present entry appears exactly once.
//! let total: u64 = map.items().map(|(_, value)| value).sum();
//! assert_eq!(total, 60);
//! assert_eq!(map.keys().count(), 3);
//! ```
//!
//! ## Configuration errors
//!
//! ```rust
//! use phimap::{ConfigError, Int64Map};
//!
//! assert_eq!(
//!     Int64Map::new(8, 1.5).unwrap_err(),
//!     ConfigError::FillFactorOutOfRange(1.5),
//! );
//! assert_eq!(Int64Map::new(0, 0.5).unwrap_err(), ConfigError::ZeroExpectedSize);
//! ```

/// Module implementing the open-addressing integer map and its iterators
mod int_map;
/// Module implementing key scrambling for both integer widths
mod key;
/// Utility functions and traits for the map
mod utils;

pub use int_map::{ConfigError, IntMap, Items, Keys};
pub use key::MapKey;
pub use utils::{IntMapExt, from_iter};

/// Map from signed 64-bit keys to signed 64-bit values.
pub type Int64Map = IntMap<i64>;

/// Map from unsigned 64-bit keys to unsigned 64-bit values.
pub type UInt64Map = IntMap<u64>;
