//! Randomized insert/remove workload replayed against `std`'s containers.
use std::collections::HashMap as StdHashMap;

use color_eyre::eyre::{ensure, Result};
use hoard_arena::{AllocatorStats, RawAllocator};
use hoard_array::GrowableArray;
use hoard_table::{DefaultEq, HashMap};
use hoard_util::hash::DefaultBuildHasher;
use rand::{rngs::SmallRng, Rng, SeedableRng};

/// Runs `10 * entries` random operations on a map and an array backed by `A`.
///
/// Returns the combined statistics of both allocators once the workload is done.
pub fn run<A: RawAllocator + Default>(entries: usize, seed: u64) -> Result<AllocatorStats> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let key_range = (entries as u64).max(1) * 2;

    let mut map: HashMap<u64, u64, DefaultBuildHasher, DefaultEq, A> = HashMap::new();
    let mut reference = StdHashMap::new();
    let mut inserted: GrowableArray<u64, A> = GrowableArray::new();

    for step in 0..entries * 10 {
        let key = rng.gen_range(0..key_range);
        if rng.gen_bool(0.6) {
            let value = rng.gen();
            let previous = map.insert(key, value);
            ensure!(
                previous == reference.insert(key, value),
                "insert of {key} diverged at step {step}"
            );
            inserted.push(key);
        } else {
            let removed = map.remove(&key);
            ensure!(
                removed == reference.remove(&key),
                "removal of {key} diverged at step {step}"
            );
        }
    }

    ensure!(map.len() == reference.len(), "map holds {} entries", map.len());
    for (key, value) in &reference {
        ensure!(map.get(key) == Some(value), "entry {key} lost");
    }
    map.check();

    inserted.sort();
    ensure!(
        inserted.windows(2).all(|pair| pair[0] <= pair[1]),
        "insertion log is not sorted"
    );
    log::debug!(
        "{} inserts over {} distinct keys, {} buckets",
        inserted.len(),
        reference.len(),
        map.capacity()
    );

    Ok(map.as_table().allocator().stats() + inserted.allocator().stats())
}
