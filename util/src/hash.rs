//! Utilities for computing hashes.
use std::hash::{BuildHasher, Hash};

use zwohash::ZwoHasher;

/// The `BuildHasher` used by hoard's containers unless another one is requested.
pub type DefaultBuildHasher = std::hash::BuildHasherDefault<ZwoHasher>;

/// Computes the hash of a value using hoard's default hasher.
#[inline]
pub fn hash_value<T: Hash>(value: T) -> u64 {
    DefaultBuildHasher::default().hash_one(value)
}

/// Computes the hash of a reference using hoard's default hasher.
///
/// This forwards to [`hash_value`]. Restricting the argument to be a reference is occasionally
/// useful for type inference or for avoiding warnings.
#[inline]
pub fn hash_ref<T: Hash + ?Sized>(value: &T) -> u64 {
    hash_value(value)
}

/// Reduces a 64-bit hash to a bucket index for a table with `capacity` buckets.
///
/// Capacities are not restricted to powers of two, so this is a plain remainder.
#[inline]
pub fn bucket_index(hash: u64, capacity: usize) -> usize {
    debug_assert!(capacity != 0);
    (hash % capacity as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashing_is_deterministic() {
        assert_eq!(hash_value(42u32), hash_ref(&42u32));
        assert_eq!(hash_ref("abc"), hash_ref("abc"));
    }

    #[test]
    fn bucket_index_stays_in_range() {
        for capacity in [1, 4, 7, 8, 13, 1000] {
            for value in 0..200u64 {
                assert!(bucket_index(hash_value(value), capacity) < capacity);
            }
        }
    }
}
