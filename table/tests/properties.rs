use std::hash::{BuildHasherDefault, Hash, Hasher};

use hoard_arena::BumpArena;
use hoard_table::{DefaultEq, HashMap, HashSet, KeyEq};
use hoard_util::hash::DefaultBuildHasher;

#[test]
fn round_trip_under_growth() {
    let mut map: HashMap<i32, i32> = HashMap::new();
    assert_eq!(map.capacity(), 0);
    for i in 0..100 {
        map.emplace(i, i * 10);
    }
    assert_eq!(map.len(), 100);
    assert!(map.capacity() > 100);
    for i in 0..100 {
        assert_eq!(map.get(&i), Some(&(i * 10)));
    }
    map.check();
}

#[test]
fn update_versus_duplicate() {
    let mut map: HashMap<i32, &str> = HashMap::new();
    *map.get_or_default(1) = "One";
    *map.get_or_default(2) = "Two";
    *map.get_or_default(10) = "Ten";
    map.emplace(5, "Five");
    *map.get_or_default(1) = "Uno";
    assert_eq!(map.len(), 4);
    assert_eq!(map[&1], "Uno");

    // emplacing an existing key keeps the stored value
    let (stored, inserted) = map.emplace(2, "Zwei");
    assert!(!inserted);
    assert_eq!(*stored, "Two");
    assert_eq!(map.len(), 4);
}

#[test]
fn erase_is_idempotent() {
    let mut map: HashMap<u32, u32> = (0..10).map(|key| (key, key)).collect();
    assert_eq!(map.remove(&42), None);
    assert_eq!(map.len(), 10);
    assert_eq!(map.remove(&3), Some(3));
    assert_eq!(map.len(), 9);
    assert_eq!(map.get(&3), None);
    assert_eq!(map.remove(&3), None);
    assert_eq!(map.len(), 9);
    map.check();
}

#[test]
fn capacity_only_shrinks_on_clear() {
    let mut set: HashSet<u32> = HashSet::new();
    let mut capacity = 0;
    for value in 0..500 {
        set.insert(value);
        if value % 3 == 0 {
            set.remove(&(value / 2));
        }
        assert!(set.capacity() >= capacity);
        capacity = set.capacity();
    }
    set.reserve(5000);
    assert!(set.capacity() >= 5000);
    set.clear();
    assert_eq!(set.len(), 0);
    assert_eq!(set.capacity(), 0);
}

#[derive(Clone, Debug, PartialEq)]
enum Payload {
    Int(i64),
    Text(String),
    Pair(u8, u8),
}

#[test]
fn tagged_union_values() {
    let mut map: HashMap<&str, Payload> = HashMap::new();
    map.insert("int", Payload::Int(-5));
    map.insert("text", Payload::Text("hello".to_owned()));
    map.insert("pair", Payload::Pair(1, 2));
    assert_eq!(map.insert("int", Payload::Int(7)), Some(Payload::Int(-5)));

    if let Some(Payload::Text(text)) = map.get_mut("text") {
        text.push_str(", world");
    }
    assert_eq!(map["text"], Payload::Text("hello, world".to_owned()));
    assert_eq!(map.len(), 3);
}

#[derive(Clone, Debug)]
struct Point {
    x: i32,
    y: i32,
    label: &'static str,
}

/// Hashes only the coordinates of a point.
#[derive(Default)]
struct PointHasher(u64);

impl Hasher for PointHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.0 = (self.0 ^ byte as u64).wrapping_mul(0x100000001b3);
        }
    }
}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.x.hash(state);
        self.y.hash(state);
    }
}

/// Points are the same key when their coordinates match, regardless of label.
#[derive(Default)]
struct SameCoordinates;

impl KeyEq<Point> for SameCoordinates {
    fn key_eq(&self, a: &Point, b: &Point) -> bool {
        a.x == b.x && a.y == b.y
    }
}

#[test]
fn custom_key_hasher_and_comparer() {
    let mut map: HashMap<Point, u32, BuildHasherDefault<PointHasher>, SameCoordinates> =
        HashMap::new();
    let origin = Point {
        x: 0,
        y: 0,
        label: "origin",
    };
    map.insert(origin.clone(), 1);
    map.insert(Point { x: 3, y: 4, label: "a" }, 2);
    let relabeled = Point {
        x: 0,
        y: 0,
        label: "zero",
    };
    assert_eq!(map.insert(relabeled.clone(), 3), Some(1));
    assert_eq!(map.len(), 2);
    let (key, value) = map.get_key_value(&relabeled).unwrap();
    assert_eq!(key.label, "origin");
    assert_eq!(*value, 3);
    map.check();
}

#[test]
fn arena_backed_map_survives_growth() {
    let mut map: HashMap<u64, String, DefaultBuildHasher, DefaultEq, BumpArena> = HashMap::new();
    for key in 0..2000 {
        map.insert(key, key.to_string());
    }
    for key in (0..2000).step_by(3) {
        assert_eq!(map.remove(&key), Some(key.to_string()));
    }
    assert_eq!(map.len(), 2000 - 667);
    assert_eq!(map.get(&1).map(String::as_str), Some("1"));
    map.check();
}
