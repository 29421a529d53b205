#![allow(missing_docs)] // test only
use std::{alloc::Layout, ptr::NonNull};

use hoard_arena::{BumpArena, PageArena, RawAllocator};
use rand::prelude::*;

struct Block {
    ptr: NonNull<u8>,
    layout: Layout,
    fill: u8,
}

impl Block {
    fn verify(&self) {
        for i in 0..self.layout.size() {
            // SAFETY: blocks stay live until released by the test
            assert_eq!(unsafe { self.ptr.as_ptr().add(i).read() }, self.fill);
        }
    }
}

fn random_layout(rng: &mut impl Rng) -> Layout {
    let align = 1 << rng.gen_range(0..7);
    let size = rng.gen_range(0..300);
    Layout::from_size_align(size, align).unwrap()
}

fn allocate_filled(alloc: &mut impl RawAllocator, rng: &mut impl Rng) -> Block {
    let layout = random_layout(rng);
    let ptr = alloc.allocate(layout).unwrap();
    assert_eq!(ptr.as_ptr() as usize % layout.align(), 0);
    let fill = rng.gen();
    // SAFETY: block is valid for `layout.size()` bytes
    unsafe { ptr.as_ptr().write_bytes(fill, layout.size()) };
    Block { ptr, layout, fill }
}

#[test]
fn page_arena_churn() {
    let mut rng = rand_pcg::Pcg64::seed_from_u64(25);
    let mut arena = PageArena::new();
    let mut live: Vec<Block> = vec![];

    for _ in 0..3000 {
        if live.is_empty() || rng.gen_bool(0.6) {
            live.push(allocate_filled(&mut arena, &mut rng));
        } else {
            let block = live.swap_remove(rng.gen_range(0..live.len()));
            block.verify();
            // SAFETY: allocated from this arena and released once
            unsafe { arena.deallocate(block.ptr, block.layout) };
        }
        assert_eq!(arena.page_count(), live.len());
        assert_eq!(
            arena.stats().used,
            live.iter().map(|block| block.layout.size()).sum::<usize>()
        );
    }

    for block in &live {
        block.verify();
    }
}

#[test]
fn bump_arena_blocks_do_not_overlap() {
    let mut rng = rand_pcg::Pcg64::seed_from_u64(7);
    let mut arena = BumpArena::with_min_page_size(1024);

    for round in 0..3 {
        let blocks: Vec<Block> = (0..500)
            .map(|_| allocate_filled(&mut arena, &mut rng))
            .collect();
        for block in &blocks {
            block.verify();
        }
        let pages = arena.page_count();
        assert!(pages > 1, "round {round} should span several pages");

        arena.reset();
        assert_eq!(arena.page_count(), pages);
        assert_eq!(arena.stats().used, 0);
    }
}
