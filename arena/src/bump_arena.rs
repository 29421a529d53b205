//! Sequential allocator carving allocations out of large pages.
use std::{
    alloc::{alloc, dealloc, Layout},
    fmt,
    ptr::NonNull,
};

use crate::{
    ring::{Links, Ring, RingNode},
    AllocError, AllocatorStats, RawAllocator,
};

/// Minimum alignment of a page's data area.
const PAGE_ALIGN: usize = 16;

/// Page header, stored behind the page's data area inside the same allocation.
struct BumpPage {
    links: Links<BumpPage>,
    data: NonNull<u8>,
    offset: usize,
    size: usize,
    page_layout: Layout,
}

// SAFETY: always the same field
unsafe impl RingNode for BumpPage {
    fn links(&self) -> &Links<Self> {
        &self.links
    }

    fn links_mut(&mut self) -> &mut Links<Self> {
        &mut self.links
    }
}

impl BumpPage {
    fn is_full(&self) -> bool {
        self.offset == self.size
    }

    /// Bumps the offset past an allocation of `size` bytes aligned to `align`, if it fits.
    fn bump(&mut self, size: usize, align: usize) -> Option<NonNull<u8>> {
        let address = (self.data.as_ptr() as usize).checked_add(self.offset)?;
        let padding = address.wrapping_neg() & (align - 1);
        let start = self.offset.checked_add(padding)?;
        let end = start.checked_add(size)?;
        if end > self.size {
            return None;
        }
        self.offset = end;
        // SAFETY: `start <= end <= self.size`, so this stays within the data area
        Some(unsafe { self.data.add(start) })
    }
}

/// Bump allocator with bulk reclamation.
///
/// Allocations are served from the current page, the tail of the arena's page ring, by advancing
/// its offset past the request and any alignment padding. When there is no page yet, or the
/// current page is full or lacks room, a new page of `max(request, min_page_size)` bytes is
/// appended and becomes current.
///
/// There is no per-allocation release. [`reset`][Self::reset] rewinds every page's offset to zero
/// without returning pages to the system, and dropping the arena releases all pages. Used as a
/// container's [`RawAllocator`], buffers abandoned on growth therefore stay reserved until then.
pub struct BumpArena {
    ring: Ring<BumpPage>,
    min_page_size: usize,
    stats: AllocatorStats,
}

// SAFETY: the arena exclusively owns all pages on its ring
unsafe impl Send for BumpArena {}

impl Default for BumpArena {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BumpArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BumpArena")
            .field("pages", &self.page_count())
            .field("min_page_size", &self.min_page_size)
            .field("stats", &self.stats)
            .finish()
    }
}

impl BumpArena {
    /// Default lower bound for the data size of a new page.
    pub const MIN_PAGE_SIZE: usize = 64 * 1024;

    /// Returns an arena without any pages, using [`Self::MIN_PAGE_SIZE`].
    pub fn new() -> Self {
        Self::with_min_page_size(Self::MIN_PAGE_SIZE)
    }

    /// Returns an arena without any pages whose new pages hold at least `min_page_size` bytes.
    pub fn with_min_page_size(min_page_size: usize) -> Self {
        Self {
            ring: Ring::default(),
            min_page_size,
            stats: AllocatorStats::default(),
        }
    }

    /// Returns the lower bound for the data size of new pages.
    pub fn min_page_size(&self) -> usize {
        self.min_page_size
    }

    /// Returns the number of pages held by this arena.
    pub fn page_count(&self) -> usize {
        self.ring.len()
    }

    /// Allocates uninitialized storage for one `T`.
    pub fn allocate_for<T>(&mut self) -> Result<NonNull<T>, AllocError> {
        self.allocate_layout(Layout::new::<T>())
            .map(|ptr| ptr.cast())
    }

    /// Allocates `size` bytes aligned to `align`.
    ///
    /// Fails with [`AllocError::InvalidLayout`] if `align` is not a power of two or the size
    /// overflows when rounded up to it.
    pub fn allocate(&mut self, size: usize, align: usize) -> Result<NonNull<u8>, AllocError> {
        let layout = Layout::from_size_align(size, align)
            .map_err(|_| AllocError::InvalidLayout { size, align })?;
        self.allocate_layout(layout)
    }

    /// Allocates a block fitting `layout`.
    pub fn allocate_layout(&mut self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let size = layout.size();
        let align = layout.align();

        if let Some(tail) = self.ring.tail() {
            // SAFETY: the tail of the ring is a live page header owned by us
            let page = unsafe { &mut *tail.as_ptr() };
            if !page.is_full() {
                if let Some(ptr) = page.bump(size, align) {
                    self.stats.used += size;
                    return Ok(ptr);
                }
            }
        }

        let page = self.push_page(layout)?;
        // SAFETY: the new page is live and owned by us
        let page = unsafe { &mut *page.as_ptr() };
        // A fresh page is aligned for the request and at least as large, so this only fails if
        // the address computation overflows.
        let ptr = page.bump(size, align).ok_or(AllocError::exhausted(layout))?;
        self.stats.used += size;
        Ok(ptr)
    }

    fn push_page(&mut self, request: Layout) -> Result<NonNull<BumpPage>, AllocError> {
        let data_size = request.size().max(self.min_page_size);
        let data_align = request.align().max(PAGE_ALIGN);
        let invalid = |_| AllocError::InvalidLayout {
            size: data_size,
            align: data_align,
        };

        let data_layout = Layout::from_size_align(data_size, data_align).map_err(invalid)?;
        let (page_layout, header_offset) = data_layout
            .extend(Layout::new::<BumpPage>())
            .map_err(invalid)?;
        let page_layout = page_layout.pad_to_align();

        // SAFETY: the page layout includes the header and thus has a non-zero size
        let data = NonNull::new(unsafe { alloc(page_layout) })
            .ok_or(AllocError::exhausted(page_layout))?;

        // SAFETY: `extend` placed the header at `header_offset` within the page, correctly aligned
        let header = unsafe { data.add(header_offset).cast::<BumpPage>() };

        // SAFETY: the header location is valid for writes and not yet initialized. The padding in
        // front of the header is usable, so the data area extends up to the header.
        unsafe {
            header.write(BumpPage {
                links: Links::unlinked(),
                data,
                offset: 0,
                size: header_offset,
                page_layout,
            });
        }

        // SAFETY: the header was just initialized and lives until the arena is dropped
        unsafe { self.ring.push_back(header) };

        self.stats.reserved += page_layout.size();

        Ok(header)
    }

    /// Rewinds every page to its start, keeping all pages reserved.
    ///
    /// All blocks handed out before are invalidated; the arena may hand out the same memory again.
    pub fn reset(&mut self) {
        for page in self.ring.iter() {
            // SAFETY: linked headers are live and not borrowed elsewhere
            unsafe { (*page.as_ptr()).offset = 0 };
        }
        self.stats.used = 0;
    }

    /// Returns the offset of the current page.
    #[cfg(test)]
    fn current_offset(&self) -> Option<usize> {
        // SAFETY: the tail of the ring is a live page header
        self.ring.tail().map(|page| unsafe { page.as_ref().offset })
    }
}

// SAFETY: blocks are disjoint ranges of page data areas, aligned by `bump`, and pages live until
// the arena is dropped. `reset` requires `&mut self` and is outside this trait, so blocks handed
// out through it stay valid as required.
unsafe impl RawAllocator for BumpArena {
    fn allocate(&mut self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        self.allocate_layout(layout)
    }

    /// Does nothing; memory is only reclaimed by [`BumpArena::reset`] or on drop.
    unsafe fn deallocate(&mut self, _ptr: NonNull<u8>, _layout: Layout) {}

    fn stats(&self) -> AllocatorStats {
        self.stats
    }
}

impl Drop for BumpArena {
    fn drop(&mut self) {
        for page in self.ring.drain() {
            // SAFETY: every drained header is live until its page is released right here, and the
            // drain iterator already read its successor
            unsafe {
                let BumpPage {
                    data, page_layout, ..
                } = page.read();
                dealloc(data.as_ptr(), page_layout);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_allocations_share_a_page() {
        let mut arena = BumpArena::with_min_page_size(1024);

        let a = arena.allocate(3, 1).unwrap();
        let b = arena.allocate(8, 8).unwrap();
        let c = arena.allocate_for::<u32>().unwrap();

        assert_eq!(arena.page_count(), 1);
        assert_eq!(b.as_ptr() as usize % 8, 0);
        assert_eq!(c.as_ptr() as usize % 4, 0);
        assert!((a.as_ptr() as usize) < (b.as_ptr() as usize));
        assert!((b.as_ptr() as usize) + 8 <= c.as_ptr() as usize);
        assert_eq!(arena.stats().used, 15);
    }

    #[test]
    fn new_page_when_out_of_room() {
        let mut arena = BumpArena::with_min_page_size(64);
        for _ in 0..4 {
            arena.allocate(16, 16).unwrap();
        }
        assert_eq!(arena.page_count(), 1);
        assert_eq!(arena.current_offset(), Some(64));

        arena.allocate(1, 1).unwrap();
        assert_eq!(arena.page_count(), 2);
        assert_eq!(arena.current_offset(), Some(1));
    }

    #[test]
    fn oversized_request_gets_its_own_page() {
        let mut arena = BumpArena::with_min_page_size(128);
        arena.allocate(10, 1).unwrap();
        let big = arena.allocate(4096, 256).unwrap();
        assert_eq!(big.as_ptr() as usize % 256, 0);
        assert_eq!(arena.page_count(), 2);

        // SAFETY: the block is 4096 bytes long
        unsafe { big.as_ptr().write_bytes(0x5a, 4096) };
    }

    #[test]
    fn reset_reuses_pages() {
        let mut arena = BumpArena::with_min_page_size(256);
        let first = arena.allocate(32, 8).unwrap();
        arena.allocate(32, 8).unwrap();
        let reserved = arena.stats().reserved;

        arena.reset();
        assert_eq!(arena.stats().used, 0);
        assert_eq!(arena.current_offset(), Some(0));

        let again = arena.allocate(32, 8).unwrap();
        assert_eq!(again, first);
        assert_eq!(arena.page_count(), 1);
        assert_eq!(arena.stats().reserved, reserved);
    }

    #[test]
    fn invalid_alignment_is_reported() {
        let mut arena = BumpArena::new();
        assert_eq!(
            arena.allocate(8, 3),
            Err(AllocError::InvalidLayout { size: 8, align: 3 })
        );
        assert_eq!(arena.page_count(), 0);
    }

    #[test]
    fn deallocate_is_a_no_op() {
        let mut arena = BumpArena::new();
        let layout = Layout::new::<[u64; 8]>();
        let ptr = RawAllocator::allocate(&mut arena, layout).unwrap();
        // SAFETY: allocated with the same layout
        unsafe { arena.deallocate(ptr, layout) };
        assert_eq!(arena.page_count(), 1);
        assert_eq!(arena.stats().used, 64);
    }
}
