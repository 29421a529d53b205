//! Free-form allocator that backs every allocation with its own page.
use std::{
    alloc::{alloc, dealloc, Layout},
    fmt,
    ptr::NonNull,
};

use crate::{
    ring::{Links, Ring, RingNode},
    AllocError, AllocatorStats, RawAllocator,
};

/// Bookkeeping record stored behind the caller's block, inside the same allocation.
struct PageHeader {
    links: Links<PageHeader>,
    /// Start of the allocation, which is also the block handed to the caller.
    block: NonNull<u8>,
    /// Layout of the whole allocation, block plus padding plus header.
    page_layout: Layout,
    requested: usize,
}

// SAFETY: always the same field
unsafe impl RingNode for PageHeader {
    fn links(&self) -> &Links<Self> {
        &self.links
    }

    fn links_mut(&mut self) -> &mut Links<Self> {
        &mut self.links
    }
}

/// Allocator giving each allocation a dedicated, self-describing page.
///
/// Every call to [`allocate`][RawAllocator::allocate] obtains one system allocation sized for the
/// request plus a trailing page header (padded to the header's alignment) and appends that header
/// to the arena's page ring. Deallocation walks the ring looking for the page whose block matches
/// the given pointer, which costs `O(pages)`; this suits the low churn of container buffers that
/// are only replaced on growth.
///
/// Dropping the arena releases every page it still holds. The arena cannot be cloned, as pages
/// are never shared between owners; moving it transfers all pages.
pub struct PageArena {
    ring: Ring<PageHeader>,
    stats: AllocatorStats,
}

// SAFETY: the arena exclusively owns all pages on its ring, nothing else points into them
unsafe impl Send for PageArena {}

impl Default for PageArena {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PageArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageArena")
            .field("pages", &self.page_count())
            .field("stats", &self.stats)
            .finish()
    }
}

impl PageArena {
    /// Returns an arena without any pages.
    pub fn new() -> Self {
        Self {
            ring: Ring::default(),
            stats: AllocatorStats::default(),
        }
    }

    /// Returns the number of live pages, i.e. of blocks not yet deallocated.
    pub fn page_count(&self) -> usize {
        self.ring.len()
    }

    /// Returns `true` if `ptr` is the start of a block currently owned by this arena.
    pub fn contains(&self, ptr: NonNull<u8>) -> bool {
        self.find_page(ptr).is_some()
    }

    fn find_page(&self, ptr: NonNull<u8>) -> Option<NonNull<PageHeader>> {
        self.ring
            .iter()
            // SAFETY: linked headers are live
            .find(|header| unsafe { header.as_ref().block } == ptr)
    }
}

// SAFETY: each block is the start of a dedicated allocation of a layout that extends the request,
// so it is suitably sized and aligned and never overlaps another block. Pages are heap allocated
// and unaffected by moving the arena.
unsafe impl RawAllocator for PageArena {
    fn allocate(&mut self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let (page_layout, header_offset) =
            layout
                .extend(Layout::new::<PageHeader>())
                .map_err(|_| AllocError::InvalidLayout {
                    size: layout.size(),
                    align: layout.align(),
                })?;
        let page_layout = page_layout.pad_to_align();

        // SAFETY: the page layout includes the header and thus has a non-zero size
        let block = NonNull::new(unsafe { alloc(page_layout) })
            .ok_or(AllocError::exhausted(page_layout))?;

        // SAFETY: `extend` placed the header at `header_offset` within the page, correctly aligned
        let header = unsafe { block.add(header_offset).cast::<PageHeader>() };

        // SAFETY: the header location is valid for writes and not yet initialized
        unsafe {
            header.write(PageHeader {
                links: Links::unlinked(),
                block,
                page_layout,
                requested: layout.size(),
            });
        }

        // SAFETY: the header was just initialized and lives until the page is released
        unsafe { self.ring.push_back(header) };

        self.stats.used += layout.size();
        self.stats.reserved += page_layout.size();

        Ok(block)
    }

    /// Releases the page owning `ptr`. Pointers that are not owned by this arena are ignored.
    unsafe fn deallocate(&mut self, ptr: NonNull<u8>, _layout: Layout) {
        let Some(header) = self.find_page(ptr) else {
            return;
        };

        // SAFETY: `find_page` only returns linked, live headers
        let PageHeader {
            block,
            page_layout,
            requested,
            ..
        } = unsafe {
            self.ring.unlink(header);
            header.read()
        };

        self.stats.used -= requested;
        self.stats.reserved -= page_layout.size();

        // SAFETY: the page was allocated with exactly this layout and is no longer linked
        unsafe { dealloc(block.as_ptr(), page_layout) };
    }

    fn stats(&self) -> AllocatorStats {
        self.stats
    }
}

impl Drop for PageArena {
    fn drop(&mut self) {
        for header in self.ring.drain() {
            // SAFETY: every drained header is live until its page is released right here, and the
            // drain iterator already read its successor
            unsafe {
                let PageHeader {
                    block, page_layout, ..
                } = header.read();
                dealloc(block.as_ptr(), page_layout);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(ptr: NonNull<u8>, len: usize, byte: u8) {
        // SAFETY: only called with blocks of at least `len` bytes
        unsafe { ptr.as_ptr().write_bytes(byte, len) };
    }

    #[test]
    fn allocate_and_release() {
        let mut arena = PageArena::new();
        let layouts = [
            Layout::from_size_align(1, 1).unwrap(),
            Layout::from_size_align(24, 8).unwrap(),
            Layout::from_size_align(100, 64).unwrap(),
            Layout::from_size_align(0, 4).unwrap(),
        ];

        let blocks: Vec<_> = layouts
            .iter()
            .map(|&layout| {
                let ptr = arena.allocate(layout).unwrap();
                assert_eq!(ptr.as_ptr() as usize % layout.align(), 0);
                fill(ptr, layout.size(), 0xa5);
                ptr
            })
            .collect();

        assert_eq!(arena.page_count(), 4);
        assert_eq!(arena.stats().used, 125);
        assert!(blocks.iter().all(|&ptr| arena.contains(ptr)));

        // release out of allocation order
        for &index in &[2, 0, 3, 1] {
            // SAFETY: each block is released exactly once with its own layout
            unsafe { arena.deallocate(blocks[index], layouts[index]) };
            assert!(!arena.contains(blocks[index]));
        }

        assert_eq!(arena.page_count(), 0);
        assert_eq!(arena.stats(), AllocatorStats::default());
    }

    #[test]
    fn foreign_pointer_is_ignored() {
        let mut arena = PageArena::new();
        let layout = Layout::new::<u64>();
        let ptr = arena.allocate(layout).unwrap();

        let mut other = 0u64;
        // SAFETY: the arena ignores pointers it does not own
        unsafe { arena.deallocate(NonNull::from(&mut other).cast(), layout) };
        assert_eq!(arena.page_count(), 1);

        // SAFETY: allocated above
        unsafe { arena.deallocate(ptr, layout) };
        assert_eq!(arena.page_count(), 0);
    }

    #[test]
    fn moving_transfers_pages() {
        let mut arena = PageArena::new();
        let layout = Layout::new::<[u32; 4]>();
        let ptr = arena.allocate(layout).unwrap();
        // SAFETY: block holds four u32 values
        unsafe { ptr.cast::<[u32; 4]>().write([1, 2, 3, 4]) };

        let mut moved = std::mem::take(&mut arena);
        assert_eq!(arena.page_count(), 0);
        assert_eq!(moved.page_count(), 1);
        assert!(moved.contains(ptr));

        // SAFETY: still owned by the moved arena
        assert_eq!(unsafe { ptr.cast::<[u32; 4]>().read() }, [1, 2, 3, 4]);
        // SAFETY: allocated above
        unsafe { moved.deallocate(ptr, layout) };
    }

    #[test]
    fn drop_releases_remaining_pages() {
        let mut arena = PageArena::new();
        for size in 1..50 {
            let ptr = arena.allocate(Layout::array::<u16>(size).unwrap()).unwrap();
            fill(ptr, size * 2, size as u8);
        }
        assert_eq!(arena.page_count(), 49);
        drop(arena);
    }
}
