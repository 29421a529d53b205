#![cfg(test)]
#![allow(missing_docs)]
use crate::{DefaultEq, HashSet};
use hoard_arena::PageArena;
use hoard_util::hash::DefaultBuildHasher;
use rand::prelude::*;
use std::{borrow::Borrow, fmt::Debug, hash::Hash};

struct CheckedSet<T> {
    dut: HashSet<T>,
    ref_set: hashbrown::HashSet<T>,
}

impl<T: Hash + Eq + Clone + Debug> CheckedSet<T> {
    fn new() -> Self {
        CheckedSet {
            dut: HashSet::new(),
            ref_set: hashbrown::HashSet::new(),
        }
    }
    fn get<Q>(&mut self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let ref_result = self.ref_set.get(value);
        let dut_result = self.dut.get(value);
        assert_eq!(ref_result, dut_result);
        ref_result
    }
    fn insert(&mut self, value: T) -> bool {
        let ref_result = self.ref_set.insert(value.clone());
        let dut_result = self.dut.insert(value);
        assert_eq!(ref_result, dut_result);
        ref_result
    }
    fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let ref_result = self.ref_set.take(value);
        let dut_result = self.dut.take(value);
        assert_eq!(ref_result, dut_result);
        ref_result
    }
    fn check(&mut self) {
        self.dut.check();
        assert_eq!(self.ref_set.len(), self.dut.len());
        assert!(self.dut.iter().all(|value| self.ref_set.contains(value)));
    }
    fn reserve(&mut self, capacity: usize) {
        self.dut.reserve(capacity);
        self.ref_set.reserve(capacity);
    }
}

macro_rules! weighted_choose {
    ($rng:expr, $($name:ident: $weight:expr => $body:expr),+) => {
        {
            enum Branches { $( $name,  )* }
            let weights = [$((Branches::$name, $weight)),+];
            match weights.choose_weighted($rng, |x| x.1).unwrap().0 {
                $(Branches::$name => $body),*
            }
        }
    }
}

fn test_suite<T: Hash + Eq + Clone + Debug, R: Rng + SeedableRng>(
    mut rand_t: impl FnMut(&mut R) -> T,
) {
    let mut set: CheckedSet<T> = CheckedSet::new();
    let mut rng = R::seed_from_u64(25);
    let mut max_size = 0;
    let verbosity = 1;
    for _ in 0..5000 {
        weighted_choose! {&mut rng,
            Insert: 1.0 => {
                let item = rand_t(&mut rng);
                let result = set.insert(item.clone());
                if verbosity > 0 {
                    println!("inserting {item:?} -> {result:?}");
                }
            },
            GetPresent: 0.5 => {
                if let Some(item) = set.ref_set.iter().choose(&mut rng).cloned() {
                    let result = set.get(&item);
                    if verbosity > 0 {
                        println!("getting {item:?} -> {result:?}");
                    }
                }
            },
            GetRandom: 0.5 => {
                let item = rand_t(&mut rng);
                let result = set.get(&item);
                if verbosity > 0 {
                    println!("getting {item:?} -> {result:?}");
                }
            },
            RemovePresent: 0.3 => {
                if let Some(item) = set.ref_set.iter().choose(&mut rng).cloned() {
                    let result = set.take(&item);
                    if verbosity > 0 {
                        println!("removing {item:?} -> {result:?}");
                    }
                }
            },
            RemoveRandom: 0.5 => {
                let item = rand_t(&mut rng);
                let result = set.take(&item);
                if verbosity > 0 {
                    println!("removing {item:?} -> {result:?}");
                }
            },
            Check: 0.15 => {
                set.check();
                if verbosity > 0 {
                    println!("check");
                }
            }
        };
        max_size = std::cmp::max(max_size, set.ref_set.len());
    }
    set.check();
    println!("max size: {max_size}");
}

#[test]
fn test_suite_usize() {
    test_suite::<usize, rand_pcg::Pcg64>(|rng| {
        rng.gen::<usize>() >> rng.gen_range(0..usize::BITS)
    });
}

#[test]
fn test_suite_boxed_usize() {
    test_suite::<Box<usize>, rand_pcg::Pcg64>(|rng| {
        Box::new(rng.gen::<usize>() >> rng.gen_range(0..usize::BITS))
    });
}

#[test]
fn test_suite_string() {
    test_suite::<String, rand_pcg::Pcg64>(|rng| {
        let len = rng.gen_range(1..4);
        String::from_iter((0..len).map(|_| rng.gen_range('!'..'~')))
    });
}

#[test]
fn test_reserve() {
    let mut rng = rand_pcg::Pcg64::seed_from_u64(58);
    for size in [10, 50, 100, 200, 500, 1000] {
        let mut set = CheckedSet::<usize>::new();
        set.reserve(size);
        assert!(set.dut.capacity() >= size);
        for _ in 0..size + 5 {
            set.insert(rng.gen());
        }
        set.check();
    }
}

#[test]
fn test_duplicates_are_suppressed() {
    let mut set: HashSet<&str> = ["apple", "banana", "apple", "cherry", "banana"].into();
    assert_eq!(set.len(), 3);
    assert!(!set.insert("cherry"));
    assert!(set.insert("date"));
    assert!(set.remove(&"apple"));
    assert!(!set.remove(&"apple"));
    assert!(!set.contains(&"apple"));
    assert_eq!(set.len(), 3);
    set.check();
}

#[test]
fn test_erase_all_by_position() {
    let mut set: HashSet<u32> = (0..100).collect();
    let mut removed = 0;
    let mut position = set.as_table().first_position();
    while position != set.as_table().end_position() {
        if set.as_table().get_at(position).is_some_and(|value| value % 2 == 0) {
            set.remove_at(position);
            removed += 1;
            // the entry shifted into this position has not been visited yet
        } else {
            position = set.as_table().next_position(position);
        }
    }
    assert_eq!(removed, 50);
    assert!(set.iter().all(|value| value % 2 == 1));
    set.check();
}

#[test]
fn test_subsets_and_equality() {
    let small: HashSet<u32> = [2, 4].into();
    let large: HashSet<u32> = (0..10).collect();
    assert!(small.is_subset(&large));
    assert!(!large.is_subset(&small));
    let mut other: HashSet<u32> = [4].into();
    assert_ne!(small, other);
    other.insert(2);
    assert_eq!(small, other);
    assert_eq!(format!("{:?}", HashSet::<u8>::from([1])), "{1}");
}

#[test]
fn test_arena_backed_set() {
    let mut set: HashSet<u64, DefaultBuildHasher, DefaultEq, PageArena> = HashSet::new();
    set.extend(0..500);
    set.extend(250..750);
    assert_eq!(set.len(), 750);
    assert_eq!(set.as_table().allocator().page_count(), 1);
    set.check();
}
