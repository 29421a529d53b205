#![cfg(test)]
#![allow(missing_docs)]
use crate::{DefaultEq, HashTable, Identity, MIN_CAPACITY};
use hoard_arena::{BumpArena, PageArena};
use hoard_util::hash::DefaultBuildHasher;
use rand::prelude::*;
use std::{
    cell::Cell,
    collections::BTreeSet,
    hash::{BuildHasherDefault, Hasher},
};

/// Hashes a `u64` to itself so tests can pick home buckets directly.
#[derive(Default)]
struct IdentityHasher(u64);

impl Hasher for IdentityHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.0 = self.0.wrapping_mul(31).wrapping_add(byte as u64);
        }
    }

    fn write_u64(&mut self, n: u64) {
        self.0 = n;
    }
}

type IdentityTable = HashTable<u64, u64, BuildHasherDefault<IdentityHasher>>;
type ArenaTable<A> = HashTable<u32, u32, DefaultBuildHasher, DefaultEq, Identity, A>;

fn table_with_capacity(capacity: usize) -> IdentityTable {
    let mut table = IdentityTable::new();
    table.rehash(capacity);
    table
}

fn layout(table: &IdentityTable) -> Vec<Option<u64>> {
    (0..table.end_position())
        .map(|position| table.get_at(position).copied())
        .collect()
}

#[test]
fn test_robin_hood_displacement() {
    let mut table = table_with_capacity(8);
    assert_eq!(table.emplace(0), (0, true));
    assert_eq!(table.emplace(8), (1, true));
    assert_eq!(table.emplace(1), (2, true));
    // 16 is poorer than 1 at bucket 2 and takes its place, 1 moves on to bucket 3
    assert_eq!(table.emplace(16), (2, true));
    assert_eq!(
        layout(&table)[..5],
        [Some(0), Some(8), Some(16), Some(1), None]
    );
    assert_eq!(table.capacity(), 8);
    table.check();
}

#[test]
fn test_backward_shift() {
    let mut table = table_with_capacity(8);
    table.extend([0, 8, 1, 16]);
    assert_eq!(table.remove(&0), Some(0));
    assert_eq!(layout(&table)[..4], [Some(8), Some(16), Some(1), None]);
    assert_eq!(table.len(), 3);
    table.check();
    assert_eq!(table.remove(&0), None);
    assert_eq!(table.len(), 3);
}

#[test]
fn test_backward_shift_wraps_around() {
    let mut table = table_with_capacity(8);
    table.extend([7, 15, 23]);
    assert_eq!(layout(&table)[0..2], [Some(15), Some(23)]);
    assert_eq!(table.get_at(7), Some(&7));

    assert_eq!(table.erase_range(7..8), 7);
    assert_eq!(table.get_at(7), Some(&15));
    assert_eq!(table.get_at(0), Some(&23));
    assert_eq!(table.get_at(1), None);
    table.check();
}

#[test]
fn test_duplicates_after_collisions() {
    // Few home buckets and many keys: every insertion probes through long clusters of entries
    // with different homes, and any swap before reaching an existing equal key would leave a
    // duplicate behind.
    let mut rng = rand_pcg::Pcg64::seed_from_u64(25);
    let mut table = table_with_capacity(64);
    let mut present = std::collections::BTreeSet::new();
    for _ in 0..2000 {
        let key = rng.gen_range(0..4u64) * 64 + rng.gen_range(0..40u64) * 64 * 4;
        let (position, inserted) = table.emplace(key);
        assert_eq!(inserted, present.insert(key));
        assert_eq!(table.get_at(position), Some(&key));
        if rng.gen_bool(0.3) {
            let victim = rng.gen_range(0..4u64) * 64 + rng.gen_range(0..40u64) * 64 * 4;
            assert_eq!(table.remove(&victim).is_some(), present.remove(&victim));
        }
        assert_eq!(table.len(), present.len());
    }
    table.check();
    let mut keys: Vec<u64> = table.iter().copied().collect();
    keys.sort();
    assert!(keys.iter().eq(present.iter()));
}

#[test]
fn test_growth_schedule() {
    let mut table = IdentityTable::new();
    assert_eq!(table.capacity(), 0);
    table.emplace(1);
    assert_eq!(table.capacity(), MIN_CAPACITY);
    table.extend([2, 3]);
    assert_eq!(table.capacity(), 4);
    // 3 entries in 4 buckets exceed the load factor
    table.emplace(4);
    assert_eq!(table.capacity(), 8);
    table.extend(5..=6);
    assert_eq!(table.capacity(), 8);
    table.emplace(7);
    assert_eq!(table.capacity(), 16);
    table.check();
}

#[test]
fn test_reserve_rehashes() {
    let mut table = IdentityTable::new();
    table.extend(0..5);
    table.reserve(100);
    assert_eq!(table.capacity(), 100);
    for key in 0..5 {
        assert!(table.contains(&key));
    }
    table.check();
    table.reserve(10);
    assert_eq!(table.capacity(), 100);
}

#[test]
fn test_rehash_keeps_room_for_entries() {
    let mut table = IdentityTable::new();
    table.extend(0..10);
    table.rehash(3);
    assert_eq!(table.capacity(), 10);
    assert_eq!(table.len(), 10);
    table.check();
    table.emplace(10);
    assert_eq!(table.capacity(), 20);
    table.check();
}

#[test]
fn test_clear_releases_buckets() {
    let mut table = IdentityTable::new();
    table.extend(0..10);
    table.clear();
    assert!(table.is_empty());
    assert_eq!(table.capacity(), 0);
    assert_eq!(table.first_position(), table.end_position());
    assert_eq!(table.find(&3), None);
    table.emplace(3);
    assert_eq!(table.len(), 1);
}

#[test]
fn test_clear_returns_buckets_to_allocator() {
    let mut table: ArenaTable<PageArena> = HashTable::new();
    table.extend(0..100);
    assert_eq!(table.allocator().page_count(), 1);
    table.clear();
    assert_eq!(table.capacity(), 0);
    assert_eq!(table.allocator().page_count(), 0);
    assert_eq!(table.allocator().stats().used, 0);

    table.extend(0..3);
    assert_eq!(table.capacity(), MIN_CAPACITY);
    assert_eq!(table.allocator().page_count(), 1);
    table.check();
}

#[test]
fn test_erase_while_walking() {
    let mut table = IdentityTable::new();
    table.extend((0..50).map(|key| key * 7));
    let mut position = table.first_position();
    while position != table.end_position() {
        position = table.erase_range(position..position + 1);
    }
    assert!(table.is_empty());
    table.check();
}

#[test]
fn test_erase_range_shifts_followers() {
    let mut table = table_with_capacity(8);
    table.extend([0, 8, 4, 12, 20]);
    assert_eq!(
        layout(&table),
        [Some(0), Some(8), None, None, Some(4), Some(12), Some(20), None]
    );

    let mut partial = table.clone();
    // 20 moves back by its full distance into its home bucket, leaving one freed bucket empty
    assert_eq!(partial.erase_range(3..6), 4);
    assert_eq!(
        layout(&partial),
        [Some(0), Some(8), None, None, Some(20), None, None, None]
    );
    partial.check();

    // each follower moves back by its own distance, which is less than the freed gap
    assert_eq!(table.erase_range(0..5), 4);
    assert_eq!(
        layout(&table),
        [None, None, None, None, Some(12), Some(20), None, None]
    );
    assert_eq!(table.len(), 2);
    table.check();
}

#[test]
fn test_erase_range_random() {
    let mut rng = rand_pcg::Pcg64::seed_from_u64(25);
    for _ in 0..300 {
        let capacity = rng.gen_range(4..48);
        let mut table = table_with_capacity(capacity);
        let mut ref_set = BTreeSet::new();
        let key_range = capacity as u64 * 3;
        while table.len() * 10 < capacity * 6 {
            let key = rng.gen_range(0..key_range);
            assert_eq!(table.emplace(key).1, ref_set.insert(key));
        }
        assert_eq!(table.capacity(), capacity);

        let end_position = table.end_position();
        let start = rng.gen_range(0..=end_position);
        let end = rng.gen_range(start..=end_position);
        for position in start..end {
            if let Some(key) = table.get_at(position) {
                ref_set.remove(key);
            }
        }

        let next = table.erase_range(start..end);
        let expected_next = (start..end_position)
            .find(|&position| table.get_at(position).is_some())
            .unwrap_or(end_position);
        assert_eq!(next, expected_next);

        table.check();
        assert_eq!(table.len(), ref_set.len());
        assert!(ref_set.iter().all(|key| table.contains(key)));
        assert!(table.iter().all(|key| ref_set.contains(key)));
    }
}

#[test]
fn test_erase_everything() {
    let mut table = IdentityTable::new();
    table.extend(0..20);
    let end = table.end_position();
    assert_eq!(table.erase_range(..), end);
    assert!(table.is_empty());
    assert_eq!(table.iter().count(), 0);
    table.check();
}

#[test]
fn test_insert_and_try_emplace() {
    let mut table = IdentityTable::new();
    let (position, inserted) = table.insert(42);
    assert!(inserted);
    assert_eq!(table.insert(42), (position, false));

    let calls = Cell::new(0);
    let make = |key| {
        calls.set(calls.get() + 1);
        key
    };
    assert_eq!(table.try_emplace(&42, || make(42)), (position, false));
    assert_eq!(calls.get(), 0);
    let (_, inserted) = table.try_emplace(&7, || make(7));
    assert!(inserted);
    assert_eq!(calls.get(), 1);
    assert_eq!(table.len(), 2);
}

#[test]
#[should_panic(expected = "no entry at position")]
fn test_remove_empty_position() {
    let mut table = table_with_capacity(8);
    table.emplace(1);
    table.remove_at(0);
}

#[test]
fn test_positions_and_iteration_agree() {
    let table: IdentityTable = (0..30).map(|key| key * 3).collect();
    let mut by_position = vec![];
    let mut position = table.first_position();
    while position != table.end_position() {
        by_position.push(*table.get_at(position).unwrap());
        position = table.next_position(position);
    }
    assert!(table.iter().eq(by_position.iter()));
    assert!(table.iter().rev().eq(by_position.iter().rev()));
    assert_eq!(table.iter().len(), 30);
    assert!(table.clone().into_iter().eq(by_position.into_iter()));
}

#[test]
fn test_arena_backed_tables() {
    let mut table: ArenaTable<PageArena> = HashTable::new();
    table.extend(0..1000);
    assert_eq!(table.len(), 1000);
    assert_eq!(table.allocator().page_count(), 1);
    table.check();

    let mut table: ArenaTable<BumpArena> = HashTable::new();
    table.extend(0..1000);
    assert!(table.allocator().page_count() >= 1);
    for key in 0..1000 {
        assert_eq!(table.get(&key), Some(&key));
    }
    table.check();
}
