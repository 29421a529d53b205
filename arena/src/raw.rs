use std::{
    alloc::{alloc, dealloc, Layout},
    ops,
    ptr::NonNull,
};

use crate::AllocError;

/// Capability to hand out and take back raw, untyped memory blocks.
///
/// A container owns its allocator by value; allocator state is never shared between containers.
///
/// # Safety
/// A successful [`allocate`][Self::allocate] must return a block that is valid for reads and
/// writes of `layout.size()` bytes and aligned to `layout.align()`. The block must stay valid
/// until it is passed to [`deallocate`][Self::deallocate] or the allocator is dropped, and moving
/// the allocator value must not invalidate it. Blocks returned by distinct calls must not overlap
/// while both are live.
pub unsafe trait RawAllocator {
    /// Allocates a block of memory fitting `layout`.
    ///
    /// Zero-sized layouts are allowed and may return a dangling, suitably aligned pointer.
    fn allocate(&mut self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Returns a block to the allocator.
    ///
    /// # Safety
    /// `ptr` must have been returned by [`allocate`][Self::allocate] on this allocator with the
    /// same `layout` and must not have been deallocated since.
    unsafe fn deallocate(&mut self, ptr: NonNull<u8>, layout: Layout);

    /// Returns usage statistics, if the allocator tracks any.
    fn stats(&self) -> AllocatorStats {
        AllocatorStats::default()
    }
}

/// Byte counts reported by an allocator.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct AllocatorStats {
    /// Bytes currently handed out to callers.
    pub used: usize,
    /// Bytes obtained from the system, including headers and slack.
    pub reserved: usize,
}

impl ops::Add for AllocatorStats {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            used: self.used + rhs.used,
            reserved: self.reserved + rhs.reserved,
        }
    }
}

/// The process-wide allocator.
#[derive(Clone, Copy, Default, Debug)]
pub struct Global;

/// Returns a non-null pointer aligned to `align` that must not be dereferenced.
pub(crate) fn dangling(layout: Layout) -> NonNull<u8> {
    // SAFETY: alignments are powers of two and thus never zero
    unsafe { NonNull::new_unchecked(std::ptr::without_provenance_mut(layout.align())) }
}

// SAFETY: non-empty blocks come straight from the global allocator, which upholds the contract;
// zero-sized blocks are never read or written.
unsafe impl RawAllocator for Global {
    fn allocate(&mut self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if layout.size() == 0 {
            return Ok(dangling(layout));
        }
        // SAFETY: the layout has a non-zero size
        let ptr = unsafe { alloc(layout) };
        NonNull::new(ptr).ok_or(AllocError::exhausted(layout))
    }

    unsafe fn deallocate(&mut self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() != 0 {
            // SAFETY: delegated to the caller, non-empty blocks came from `alloc` with `layout`
            unsafe { dealloc(ptr.as_ptr(), layout) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_round_trip() {
        let mut global = Global;
        let layout = Layout::array::<u64>(16).unwrap();
        let ptr = global.allocate(layout).unwrap();
        assert_eq!(ptr.as_ptr() as usize % layout.align(), 0);

        // SAFETY: freshly allocated for 16 u64 values
        unsafe {
            let data = ptr.cast::<u64>().as_ptr();
            for i in 0..16 {
                data.add(i).write(i as u64 * 3);
            }
            assert_eq!(data.add(15).read(), 45);
            global.deallocate(ptr, layout);
        }
    }

    #[test]
    fn zero_sized_is_aligned() {
        let mut global = Global;
        for shift in 0..13 {
            let align = 1 << shift;
            let layout = Layout::from_size_align(0, align).unwrap();
            let ptr = global.allocate(layout).unwrap();
            assert_eq!(ptr.as_ptr() as usize, align);
            // SAFETY: returned by `allocate` with the same layout
            unsafe { global.deallocate(ptr, layout) };
        }
    }

    #[test]
    fn stats_add() {
        let a = AllocatorStats {
            used: 1,
            reserved: 10,
        };
        let b = AllocatorStats {
            used: 2,
            reserved: 20,
        };
        assert_eq!(
            a + b,
            AllocatorStats {
                used: 3,
                reserved: 30
            }
        );
    }
}
