//! [HashMap] and [HashSet] are thin adaptors over [HashTable], an open addressing hash table using
//! Robin Hood probing.
//!
//! Every bucket either is empty or holds an entry together with its probe sequence length, the
//! distance of the entry from its home bucket. Insertion walks forward from the home bucket and
//! swaps the new entry into any bucket whose occupant sits closer to its own home, so no entry is
//! ever much further from its home than the others. Lookups stop as soon as they meet an entry
//! closer to its home than the probe, and removal shifts the following entries back instead of
//! leaving tombstones.
//!
//! The table grows to twice its bucket count (at least 4) once 70% of the buckets are occupied.
//! Bucket counts are not restricted to powers of two.
//!
//! Hashing, key equality, key selection and the allocator for the bucket array are all type
//! parameters, defaulting to [`zwohash`](hoard_util::hash::DefaultBuildHasher), `Eq`, the identity
//! or the first pair component and the global allocator respectively.
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(missing_docs)]

mod iter;
mod slot;
mod table;
mod traits;

mod test_map;
mod test_set;
mod test_table;

pub use iter::{IntoIter, Iter, IterMut};
pub use map::HashMap;
pub use set::HashSet;
pub use table::{HashTable, LOAD_FACTOR_DENOMINATOR, LOAD_FACTOR_NUMERATOR, MIN_CAPACITY};
pub use traits::{DefaultEq, Identity, KeyEq, PairKey, Selector};

pub mod map;
pub mod set;
