#![cfg(test)]
#![allow(missing_docs)]
use crate::{GrowableArray, MIN_CAPACITY};
use hoard_arena::{BumpArena, PageArena, RawAllocator};
use rand::prelude::*;
use std::{cell::Cell, fmt::Debug, rc::Rc};

struct CheckedArray<T, A: RawAllocator> {
    dut: GrowableArray<T, A>,
    ref_vec: Vec<T>,
    max_capacity: usize,
}

impl<T: Clone + Ord + Debug, A: RawAllocator> CheckedArray<T, A> {
    fn new(alloc: A) -> Self {
        CheckedArray {
            dut: GrowableArray::with_allocator(alloc),
            ref_vec: vec![],
            max_capacity: 0,
        }
    }
    fn push(&mut self, value: T) {
        self.ref_vec.push(value.clone());
        self.dut.push(value);
    }
    fn pop(&mut self) -> Option<T> {
        let ref_result = self.ref_vec.pop();
        let dut_result = self.dut.pop();
        assert_eq!(ref_result, dut_result);
        ref_result
    }
    fn insert(&mut self, index: usize, value: T) {
        self.ref_vec.insert(index, value.clone());
        assert_eq!(self.dut.insert(index, value), index);
    }
    fn insert_from_slice(&mut self, index: usize, values: &[T]) {
        self.ref_vec.splice(index..index, values.iter().cloned());
        assert_eq!(self.dut.insert_from_slice(index, values), index);
    }
    fn remove(&mut self, index: usize) -> T {
        let ref_result = self.ref_vec.remove(index);
        let dut_result = self.dut.remove(index);
        assert_eq!(ref_result, dut_result);
        ref_result
    }
    fn erase(&mut self, start: usize, end: usize) {
        self.ref_vec.drain(start..end);
        assert_eq!(self.dut.erase(start..end), start);
    }
    fn truncate(&mut self, len: usize) {
        self.ref_vec.truncate(len);
        self.dut.truncate(len);
    }
    fn find(&self, value: &T) -> Option<usize> {
        let ref_result = self.ref_vec.iter().position(|item| item == value);
        let dut_result = self.dut.find(value);
        assert_eq!(ref_result, dut_result);
        ref_result
    }
    fn sort_range(&mut self, start: usize, end: usize) {
        self.ref_vec[start..end].sort();
        self.dut.sort_range_by(start..end, |a, b| a < b);
    }
    fn check(&mut self) {
        assert_eq!(self.dut.as_slice(), self.ref_vec.as_slice());
        assert!(self.dut.capacity() >= self.dut.len());
        assert!(self.dut.capacity() >= self.max_capacity);
        self.max_capacity = self.dut.capacity();
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

fn test_suite<T: Clone + Ord + Debug, A: RawAllocator, R: Rng + SeedableRng>(
    alloc: A,
    mut rand_t: impl FnMut(&mut R) -> T,
) {
    let mut array: CheckedArray<T, A> = CheckedArray::new(alloc);
    let mut rng = R::seed_from_u64(25);
    let mut max_size = 0;
    let verbosity = 1;
    for _ in 0..5000 {
        let len = array.ref_vec.len();
        weighted_choose! {&mut rng,
            Push: 1.0 => {
                let item = rand_t(&mut rng);
                if verbosity > 0 {
                    println!("pushing {item:?}");
                }
                array.push(item);
            },
            Pop: 0.4 => {
                let result = array.pop();
                if verbosity > 0 {
                    println!("popping -> {result:?}");
                }
            },
            Insert: 0.5 => {
                let index = rng.gen_range(0..=len);
                let item = rand_t(&mut rng);
                if verbosity > 0 {
                    println!("inserting {item:?} at {index}");
                }
                array.insert(index, item);
            },
            InsertSlice: 0.2 => {
                let index = rng.gen_range(0..=len);
                let count = rng.gen_range(0..8);
                let items: Vec<T> = (0..count).map(|_| rand_t(&mut rng)).collect();
                if verbosity > 0 {
                    println!("inserting {items:?} at {index}");
                }
                array.insert_from_slice(index, &items);
            },
            Remove: 0.4 => {
                if len > 0 {
                    let index = rng.gen_range(0..len);
                    let result = array.remove(index);
                    if verbosity > 0 {
                        println!("removing at {index} -> {result:?}");
                    }
                }
            },
            Erase: 0.2 => {
                let start = rng.gen_range(0..=len);
                let end = rng.gen_range(start..=(start + 5).min(len));
                if verbosity > 0 {
                    println!("erasing {start}..{end}");
                }
                array.erase(start, end);
            },
            Truncate: 0.02 => {
                let new_len = rng.gen_range(0..=len);
                if verbosity > 0 {
                    println!("truncating to {new_len}");
                }
                array.truncate(new_len);
            },
            FindPresent: 0.3 => {
                if let Some(item) = array.ref_vec.iter().choose(&mut rng).cloned() {
                    let result = array.find(&item);
                    if verbosity > 0 {
                        println!("finding {item:?} -> {result:?}");
                    }
                }
            },
            FindRandom: 0.3 => {
                let item = rand_t(&mut rng);
                let result = array.find(&item);
                if verbosity > 0 {
                    println!("finding {item:?} -> {result:?}");
                }
            },
            Sort: 0.05 => {
                let start = rng.gen_range(0..=len);
                let end = rng.gen_range(start..=len);
                if verbosity > 0 {
                    println!("sorting {start}..{end}");
                }
                array.sort_range(start, end);
            },
            Check: 0.15 => {
                array.check();
                if verbosity > 0 {
                    println!("check");
                }
            }
        };
        max_size = std::cmp::max(max_size, array.ref_vec.len());
    }
    array.check();
    println!("max size: {max_size}");
}

#[test]
fn test_suite_u32() {
    test_suite::<u32, _, rand_pcg::Pcg64>(hoard_arena::Global, |rng| rng.gen_range(0..100));
}

#[test]
fn test_suite_string_page_arena() {
    test_suite::<String, _, rand_pcg::Pcg64>(PageArena::new(), |rng| {
        let len = rng.gen_range(0..16);
        String::from_iter((0..len).map(|_| rng.gen_range('!'..'~')))
    });
}

#[test]
fn test_suite_boxed_bump_arena() {
    test_suite::<Box<u64>, _, rand_pcg::Pcg64>(BumpArena::new(), |rng| Box::new(rng.gen()));
}

#[test]
fn test_insert_then_erase() {
    let mut array: GrowableArray<i32> = [10, 20, 30, 40, 50].into();
    let index = array.find(&30).unwrap();
    assert_eq!(array.insert(index, 99), 2);
    assert_eq!(array, [10, 20, 99, 30, 40, 50]);
    let index = array.find(&20).unwrap();
    assert_eq!(array.erase(index..index + 1), 1);
    assert_eq!(array, [10, 99, 30, 40, 50]);
    assert_eq!(array.len(), 5);
}

#[test]
fn test_capacity_growth() {
    let mut array: GrowableArray<u8> = GrowableArray::new();
    assert_eq!(array.capacity(), 0);
    let mut seen = vec![];
    for i in 0..100 {
        array.push(i);
        if seen.last() != Some(&array.capacity()) {
            seen.push(array.capacity());
        }
    }
    assert_eq!(seen, [MIN_CAPACITY, 8, 16, 32, 64, 128]);

    array.reserve(10);
    assert_eq!(array.capacity(), 128);
    array.clear();
    assert!(array.is_empty());
    assert_eq!(array.capacity(), 128);

    let mut small: GrowableArray<u8> = GrowableArray::with_capacity(1);
    small.push(1);
    small.push(2);
    assert_eq!(small.capacity(), MIN_CAPACITY);
}

#[test]
fn test_resize() {
    let mut array: GrowableArray<u16> = GrowableArray::new();
    array.resize(5);
    assert_eq!(array, [0; 5]);
    assert_eq!(array.capacity(), 5);
    let mut next = 0;
    array.resize_with(8, || {
        next += 1;
        next
    });
    assert_eq!(array, [0, 0, 0, 0, 0, 1, 2, 3]);
    array.resize(2);
    assert_eq!(array, [0, 0]);
    assert_eq!(array.capacity(), 8);
}

#[test]
fn test_clone_and_move() {
    let mut array: GrowableArray<String> = GrowableArray::with_capacity(32);
    array.extend(["a", "b", "c"].map(String::from));
    let copy = array.clone();
    assert_eq!(copy, array);
    assert_eq!(copy.capacity(), 3);

    array.push("d".to_owned());
    assert_eq!(copy.len(), 3);

    let moved = array;
    assert_eq!(moved.len(), 4);
    assert_eq!(moved.capacity(), 32);

    let mut target: GrowableArray<String> = ["x"].map(String::from).into();
    target.clone_from(&moved);
    assert_eq!(target, moved);
}

#[test]
fn test_accessors() {
    let mut array: GrowableArray<char> = "hello".chars().collect();
    assert_eq!(*array.front(), 'h');
    assert_eq!(*array.back(), 'o');
    assert_eq!(*array.at(1), 'e');
    *array.at_mut(1) = 'a';
    *array.back_mut() = 'O';
    assert_eq!(array.iter().collect::<String>(), "hallO");
    assert_eq!(array.get(5), None);
    assert_eq!(array.distance(1, 4), 3);
    assert_eq!(array.push_with(|| '!'), &mut '!');
    assert!(array.contains(&'!'));
}

#[test]
#[should_panic(expected = "index 3 is out of bounds (len 3)")]
fn test_at_out_of_bounds() {
    let array: GrowableArray<u8> = [1, 2, 3].into();
    array.at(3);
}

#[test]
#[should_panic(expected = "the array is empty")]
fn test_front_of_empty() {
    let array: GrowableArray<u8> = GrowableArray::new();
    array.front();
}

#[test]
#[should_panic(expected = "insertion index 4 is out of bounds (len 3)")]
fn test_insert_out_of_bounds() {
    let mut array: GrowableArray<u8> = [1, 2, 3].into();
    array.insert(4, 0);
}

#[test]
fn test_insert_iter_and_assign() {
    let mut array: GrowableArray<u32> = [1, 5].into();
    assert_eq!(array.insert_iter(1, 2..5), 1);
    assert_eq!(array, [1, 2, 3, 4, 5]);
    array.assign([9, 8]);
    assert_eq!(array, [9, 8]);
    array.sort();
    assert_eq!(array, [8, 9]);
    array.sort_by(|a, b| b.cmp(a));
    assert_eq!(array, [9, 8]);
}

#[derive(Clone)]
struct DropCounter(Rc<Cell<usize>>);

impl Drop for DropCounter {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

#[test]
fn test_every_element_dropped_once() {
    let drops = Rc::new(Cell::new(0));
    let mut array: GrowableArray<DropCounter> = GrowableArray::new();
    for _ in 0..20 {
        array.push(DropCounter(drops.clone()));
    }
    drop(array.remove(3));
    assert_eq!(drops.get(), 1);
    array.erase(0..4);
    assert_eq!(drops.get(), 5);
    array.truncate(10);
    assert_eq!(drops.get(), 10);

    let mut iter = array.into_iter();
    drop(iter.next());
    drop(iter.next_back());
    assert_eq!(drops.get(), 12);
    assert_eq!(iter.len(), 8);
    drop(iter);
    assert_eq!(drops.get(), 20);
}

#[test]
fn test_zero_sized_elements() {
    let mut array: GrowableArray<()> = GrowableArray::new();
    for _ in 0..1000 {
        array.push(());
    }
    assert_eq!(array.len(), 1000);
    array.erase(10..20);
    assert_eq!(array.len(), 990);
    assert_eq!(array.into_iter().count(), 990);
}

#[test]
fn test_arena_backed_growth() {
    let mut array: GrowableArray<u64, PageArena> = GrowableArray::new();
    array.extend(0..1000);
    assert_eq!(array.allocator().page_count(), 1);
    assert_eq!(array.allocator().stats().used, array.capacity() * 8);
    assert!(array.iter().copied().eq(0..1000));

    let mut bump: GrowableArray<u64, BumpArena> = GrowableArray::new();
    bump.extend(0..1000);
    assert!(bump.iter().copied().eq(0..1000));
    assert!(bump.allocator().stats().used >= bump.capacity() * 8);
}

#[test]
fn test_reset_releases_buffer() {
    let mut array: GrowableArray<u64, PageArena> = GrowableArray::new();
    array.extend(0..100);
    assert_eq!(array.allocator().page_count(), 1);

    array.clear();
    assert_eq!(array.capacity(), 100);
    assert_eq!(array.allocator().page_count(), 1);

    array.reset();
    assert!(array.is_empty());
    assert_eq!(array.capacity(), 0);
    assert_eq!(array.allocator().page_count(), 0);
    assert_eq!(array.allocator().stats().used, 0);

    array.push(7);
    assert_eq!(array.capacity(), MIN_CAPACITY);
    assert_eq!(array, [7]);

    let drops = Rc::new(Cell::new(0));
    let mut counted: GrowableArray<DropCounter> = GrowableArray::new();
    counted.extend((0..5).map(|_| DropCounter(drops.clone())));
    counted.reset();
    assert_eq!(drops.get(), 5);

    let mut units: GrowableArray<()> = GrowableArray::with_capacity(50);
    units.push(());
    units.reset();
    assert_eq!(units.capacity(), 0);
}
