//! Fixed walkthroughs of the container APIs, each verifying what it observes.
use std::{
    alloc::Layout,
    cell::Cell,
    hash::{BuildHasherDefault, Hash, Hasher},
    rc::Rc,
};

use color_eyre::eyre::{ensure, eyre, Result};
use hoard_arena::{BumpArena, PageArena, RawAllocator};
use hoard_array::GrowableArray;
use hoard_table::{HashMap, HashSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct PlayerId {
    team: u16,
    number: u16,
}

/// Packs the hashed fields into a single word instead of mixing them.
#[derive(Default)]
struct PackingHasher(u64);

impl Hasher for PackingHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.0 = self.0.rotate_left(8) ^ byte as u64;
        }
    }
}

type PlayerMap<V> = HashMap<PlayerId, V, BuildHasherDefault<PackingHasher>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct Vector2 {
    x: i32,
    y: i32,
}

pub fn hash_map(entries: usize) -> Result<()> {
    log::info!("hash map: insertion and update");
    let mut numbers: HashMap<i32, &str> = HashMap::new();
    *numbers.get_or_default(1) = "One";
    *numbers.get_or_default(2) = "Two";
    *numbers.get_or_default(10) = "Ten";
    numbers.emplace(5, "Five");
    *numbers.get_or_default(1) = "Uno";
    ensure!(numbers.len() == 4, "expected 4 entries, found {}", numbers.len());
    ensure!(numbers[&1] == "Uno", "update of key 1 was lost");

    let (stored, inserted) = numbers.emplace(2, "Zwei");
    ensure!(!inserted && *stored == "Two", "emplace replaced an existing value");
    for (key, value) in &numbers {
        log::debug!("{key} -> {value}");
    }

    log::info!("hash map: read-only access");
    let lookup = &numbers;
    ensure!(*lookup.at(&10) == "Ten", "key 10 not found through at");
    ensure!(lookup.get(&3).is_none(), "key 3 unexpectedly present");

    log::info!("hash map: struct keys with a custom hasher");
    let mut scores: PlayerMap<u32> = HashMap::new();
    for (team, number, score) in [(1, 7, 120), (1, 9, 80), (2, 7, 95), (2, 11, 60)] {
        scores.insert(PlayerId { team, number }, score);
    }
    let striker = PlayerId { team: 2, number: 7 };
    ensure!(scores.get(&striker) == Some(&95), "wrong score for {striker:?}");
    ensure!(scores.remove(&striker) == Some(95), "failed to remove {striker:?}");
    ensure!(!scores.contains_key(&striker), "{striker:?} still present after removal");
    scores.check();

    log::info!("hash map: {entries} entries through repeated growth");
    let mut grown: HashMap<usize, usize> = HashMap::new();
    for key in 0..entries {
        grown.emplace(key, key * 10);
    }
    ensure!(grown.len() == entries, "lost entries during growth");
    for key in 0..entries {
        let value = grown.get(&key).copied();
        ensure!(value == Some(key * 10), "key {key} maps to {value:?}");
    }
    grown.check();
    log::info!("{} entries in {} buckets", grown.len(), grown.capacity());

    Ok(())
}

pub fn hash_set() -> Result<()> {
    log::info!("hash set: duplicate suppression");
    let mut primes: HashSet<u32> = HashSet::new();
    let fresh = [2, 3, 5, 3, 7, 2, 11]
        .into_iter()
        .filter(|&value| primes.insert(value))
        .count();
    ensure!(fresh == 5 && primes.len() == 5, "duplicates were stored");

    log::info!("hash set: erasing while walking positions");
    let mut words: HashSet<String> = ["alpha", "beta", "gamma", "delta", "epsilon"]
        .into_iter()
        .map(str::to_owned)
        .collect();
    ensure!(words.remove("beta"), "beta was not present");
    ensure!(!words.remove("beta"), "beta was removed twice");
    let mut position = words.as_table().first_position();
    while position != words.as_table().end_position() {
        if words.as_table().get_at(position).is_some() {
            let word = words.remove_at(position);
            log::debug!("erased {word}");
        } else {
            position = words.as_table().next_position(position);
        }
    }
    ensure!(words.is_empty(), "{} words left after erasing all", words.len());

    log::info!("hash set: struct values");
    let mut visited: HashSet<Vector2> = HashSet::new();
    for (x, y) in [(0, 0), (1, 0), (1, 1), (0, 0), (1, 0)] {
        visited.insert(Vector2 { x, y });
    }
    ensure!(visited.len() == 3, "expected 3 distinct points");
    ensure!(visited.contains(&Vector2 { x: 1, y: 1 }), "point (1, 1) missing");
    log::debug!("visited {visited:?}");
    visited.check();

    Ok(())
}

/// Counts live instances through a shared counter.
struct Tracked {
    live: Rc<Cell<isize>>,
    id: u32,
}

impl Tracked {
    fn new(live: &Rc<Cell<isize>>, id: u32) -> Self {
        live.set(live.get() + 1);
        Self {
            live: live.clone(),
            id,
        }
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        Self::new(&self.live, self.id)
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.live.set(self.live.get() - 1);
    }
}

pub fn growable_array() -> Result<()> {
    log::info!("growable array: push and access");
    let mut values: GrowableArray<i32> = GrowableArray::new();
    for value in [10, 20, 30] {
        values.push(value);
    }
    ensure!(*values.front() == 10 && *values.back() == 30, "wrong ends");
    ensure!(*values.at(1) == 20, "wrong middle element");

    log::info!("growable array: insert and erase");
    let mut values: GrowableArray<i32> = [10, 20, 30, 40, 50].into();
    let before = values.find(&30).ok_or_else(|| eyre!("30 missing"))?;
    let index = values.insert(before, 99);
    ensure!(values == [10, 20, 99, 30, 40, 50], "unexpected contents {values:?}");
    ensure!(values[index] == 99, "inserted value not at returned index");
    let twenty = values.find(&20).ok_or_else(|| eyre!("20 missing"))?;
    values.remove(twenty);
    ensure!(values == [10, 99, 30, 40, 50], "unexpected contents {values:?}");
    let next = values.erase(3..);
    ensure!(next == values.len() && values == [10, 99, 30], "erase left {values:?}");

    log::info!("growable array: element lifecycle");
    let live = Rc::new(Cell::new(0));
    {
        let mut tracked: GrowableArray<Tracked> = GrowableArray::new();
        for id in 0..6 {
            tracked.push(Tracked::new(&live, id));
        }
        let copy = tracked.clone();
        ensure!(live.get() == 12, "expected 12 live instances, found {}", live.get());
        let moved = tracked;
        ensure!(live.get() == 12, "moving the array changed the instance count");
        ensure!(
            moved.iter().zip(copy.iter()).all(|(a, b)| a.id == b.id),
            "copy differs from original"
        );
    }
    ensure!(live.get() == 0, "{} instances leaked", live.get());

    log::info!("growable array: resize, sort and clear");
    let mut numbers: GrowableArray<u64> = GrowableArray::new();
    numbers.resize(5);
    ensure!(numbers.capacity() == 5, "resize reserved {} slots", numbers.capacity());
    numbers.resize_with(8, || 7);
    numbers.extend([3, 1, 2]);
    numbers.sort();
    ensure!(numbers.windows(2).all(|pair| pair[0] <= pair[1]), "not sorted");
    ensure!(numbers.find(&7).is_some(), "value 7 missing");
    let capacity = numbers.capacity();
    numbers.clear();
    ensure!(
        numbers.is_empty() && numbers.capacity() == capacity,
        "clear changed the capacity"
    );
    numbers.reset();
    ensure!(numbers.capacity() == 0, "reset kept {} slots", numbers.capacity());

    Ok(())
}

pub fn arenas() -> Result<()> {
    log::info!("page arena: individual blocks");
    let mut pages = PageArena::new();
    let layouts = [Layout::new::<u64>(), Layout::new::<[u8; 300]>(), Layout::new::<u128>()];
    let mut blocks = vec![];
    for layout in layouts {
        blocks.push((pages.allocate(layout)?, layout));
    }
    ensure!(pages.page_count() == 3, "expected one page per block");
    let (middle, layout) = blocks.remove(1);
    // SAFETY: the block came from this arena with the same layout and is released once
    unsafe { pages.deallocate(middle, layout) };
    ensure!(!pages.contains(middle), "released block still owned");
    ensure!(pages.page_count() == 2, "release did not drop the page");
    log::info!("{:?}", pages.stats());

    log::info!("bump arena: bulk reset");
    let mut bump = BumpArena::with_min_page_size(4096);
    let first = bump.allocate_for::<[u32; 4]>()?;
    for _ in 1..100 {
        bump.allocate_for::<[u32; 4]>()?;
    }
    ensure!(bump.page_count() == 1, "100 small blocks spilled out of one page");
    bump.reset();
    ensure!(bump.stats().used == 0, "reset kept usage");
    let again = bump.allocate_for::<[u32; 4]>()?;
    ensure!(again == first, "reset did not rewind the current page");
    for _ in 0..1000 {
        bump.allocate_for::<[u32; 4]>()?;
    }
    ensure!(bump.page_count() > 1, "16000 bytes fit into a 4096 byte page");
    log::info!("{:?}", bump.stats());
    let error = bump
        .allocate(16, 3)
        .err()
        .ok_or_else(|| eyre!("alignment 3 was accepted"))?;
    log::info!("rejected bad request: {error}");

    Ok(())
}
