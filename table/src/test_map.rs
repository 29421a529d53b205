#![cfg(test)]
#![allow(missing_docs)]
use crate::HashMap;
use rand::prelude::*;
use std::{borrow::Borrow, fmt::Debug, hash::Hash};

struct CheckedMap<K, V> {
    dut: HashMap<K, V>,
    ref_map: hashbrown::HashMap<K, V>,
}

impl<K: Hash + Eq + Clone + Debug, V: Clone + PartialEq + Debug> CheckedMap<K, V> {
    fn new() -> Self {
        CheckedMap {
            dut: HashMap::new(),
            ref_map: hashbrown::HashMap::new(),
        }
    }
    fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let ref_result = self.ref_map.get(key);
        let dut_result = self.dut.get(key);
        assert_eq!(ref_result, dut_result);
        ref_result
    }
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        let ref_result = self.ref_map.insert(key.clone(), value.clone());
        let dut_result = self.dut.insert(key, value);
        assert_eq!(ref_result, dut_result);
        ref_result
    }
    fn emplace(&mut self, key: K, value: V) -> bool {
        let ref_result = !self.ref_map.contains_key(&key);
        if ref_result {
            self.ref_map.insert(key.clone(), value.clone());
        }
        let (stored, dut_result) = self.dut.emplace(key.clone(), value);
        assert_eq!(ref_result, dut_result);
        assert_eq!(Some(&*stored), self.ref_map.get(&key));
        ref_result
    }
    fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let ref_result = self.ref_map.remove(key);
        let dut_result = self.dut.remove(key);
        assert_eq!(ref_result, dut_result);
        ref_result
    }
    fn check(&mut self) {
        self.dut.check();
        assert_eq!(self.ref_map.len(), self.dut.len());
        for (key, value) in self.dut.iter() {
            assert_eq!(self.ref_map.get(key), Some(value));
        }
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

fn test_suite<K, V, R>(mut rand_k: impl FnMut(&mut R) -> K, mut rand_v: impl FnMut(&mut R) -> V)
where
    K: Hash + Eq + Clone + Debug,
    V: Clone + PartialEq + Debug,
    R: Rng + SeedableRng,
{
    let mut map: CheckedMap<K, V> = CheckedMap::new();
    let mut rng = R::seed_from_u64(25);
    let mut max_size = 0;
    let verbosity = 1;
    for _ in 0..5000 {
        weighted_choose! {&mut rng,
            Insert: 1.0 => {
                let key = rand_k(&mut rng);
                let value = rand_v(&mut rng);
                let result = map.insert(key.clone(), value.clone());
                if verbosity > 0 {
                    println!("inserting {key:?}: {value:?} -> {result:?}");
                }
            },
            Emplace: 0.5 => {
                let key = rand_k(&mut rng);
                let value = rand_v(&mut rng);
                let result = map.emplace(key.clone(), value.clone());
                if verbosity > 0 {
                    println!("emplacing {key:?}: {value:?} -> {result:?}");
                }
            },
            GetPresent: 0.5 => {
                if let Some(key) = map.ref_map.keys().choose(&mut rng).cloned() {
                    let result = map.get(&key);
                    if verbosity > 0 {
                        println!("getting {key:?} -> {result:?}");
                    }
                }
            },
            GetRandom: 0.5 => {
                let key = rand_k(&mut rng);
                let result = map.get(&key);
                if verbosity > 0 {
                    println!("getting {key:?} -> {result:?}");
                }
            },
            RemovePresent: 0.3 => {
                if let Some(key) = map.ref_map.keys().choose(&mut rng).cloned() {
                    let result = map.remove(&key);
                    if verbosity > 0 {
                        println!("removing {key:?} -> {result:?}");
                    }
                }
            },
            RemoveRandom: 0.5 => {
                let key = rand_k(&mut rng);
                let result = map.remove(&key);
                if verbosity > 0 {
                    println!("removing {key:?} -> {result:?}");
                }
            },
            Check: 0.15 => {
                map.check();
                if verbosity > 0 {
                    println!("check");
                }
            }
        };
        max_size = std::cmp::max(max_size, map.ref_map.len());
    }
    map.check();
    println!("max size: {max_size}");
}

#[test]
fn test_suite_usize() {
    test_suite::<usize, u32, rand_pcg::Pcg64>(
        |rng| rng.gen::<usize>() >> rng.gen_range(0..usize::BITS),
        |rng| rng.gen(),
    );
}

#[test]
fn test_suite_string() {
    test_suite::<String, Vec<u8>, rand_pcg::Pcg64>(
        |rng| {
            let len = rng.gen_range(1..6);
            String::from_iter((0..len).map(|_| rng.gen_range('a'..'e')))
        },
        |rng| (0..rng.gen_range(0..4)).map(|_| rng.gen()).collect(),
    );
}

#[test]
fn test_borrowed_lookups() {
    let mut map: HashMap<String, usize> = HashMap::new();
    map.insert("one".to_owned(), 1);
    map.insert("two".to_owned(), 2);
    assert_eq!(map.get("one"), Some(&1));
    assert_eq!(map["two"], 2);
    assert!(map.contains_key("two"));
    assert_eq!(map.remove_entry("one"), Some(("one".to_owned(), 1)));
    assert_eq!(map.get_key_value("two"), Some((&"two".to_owned(), &2)));
    map.check();
}

#[test]
fn test_get_or_default() {
    let mut map: HashMap<&str, Vec<u32>> = HashMap::new();
    for (index, word) in ["a", "b", "a", "c", "a"].into_iter().enumerate() {
        map.get_or_default(word).push(index as u32);
    }
    assert_eq!(map.len(), 3);
    assert_eq!(map["a"], [0, 2, 4]);
    assert_eq!(map.at(&"c"), &[3]);
}

#[test]
#[should_panic(expected = "not present in the map")]
fn test_at_missing_key() {
    let map: HashMap<u32, u32> = [(1, 10)].into();
    map.at(&2);
}

#[test]
fn test_iterators() {
    let mut map: HashMap<u32, u32> = (0..20).map(|key| (key, key * 2)).collect();
    for value in map.values_mut() {
        *value += 1;
    }
    for (_, value) in map.iter_mut() {
        *value *= 10;
    }
    let mut entries: Vec<_> = map.iter().map(|(&key, &value)| (key, value)).collect();
    entries.sort();
    assert!(entries.into_iter().eq((0..20).map(|key| (key, (key * 2 + 1) * 10))));

    assert_eq!(map.keys().len(), 20);
    assert_eq!(map.values().copied().max(), Some(390));
    assert!(map.keys().rev().eq(map.iter().rev().map(|(key, _)| key)));

    let mut owned: Vec<_> = map.clone().into_iter().collect();
    owned.sort();
    assert_eq!(owned.len(), 20);
    assert_eq!(owned[3], (3, 70));
}

#[test]
fn test_equality_ignores_layout() {
    let forward: HashMap<u32, &str> = [(1, "a"), (2, "b"), (3, "c")].into();
    let mut backward: HashMap<u32, &str> = HashMap::with_capacity(64);
    backward.extend([(3, "c"), (2, "b"), (1, "a")]);
    assert_eq!(forward, backward);
    backward.insert(2, "B");
    assert_ne!(forward, backward);
    assert_eq!(format!("{:?}", HashMap::<u32, u32>::from([(7, 8)])), "{7: 8}");
}
