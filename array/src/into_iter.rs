use core::{fmt, iter::FusedIterator, slice};

use hoard_arena::{Global, RawAllocator};

use crate::GrowableArray;

/// Owning iterator over the elements of a [`GrowableArray`].
///
/// The buffer goes back to the array's allocator once the iterator is dropped, together with any
/// elements that were not yet yielded.
pub struct IntoIter<T, A: RawAllocator = Global> {
    // Its length is kept at zero, so dropping it only releases the buffer.
    array: GrowableArray<T, A>,
    head: usize,
    tail: usize,
}

impl<T, A: RawAllocator> IntoIter<T, A> {
    pub(crate) fn new(mut array: GrowableArray<T, A>) -> Self {
        let tail = array.len();
        // SAFETY: the elements stay initialized and are owned by the iterator from here on
        unsafe { array.set_len(0) };
        Self {
            array,
            head: 0,
            tail,
        }
    }

    /// Returns the elements that have not been yielded yet.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: positions `[head, tail)` are initialized and not yet yielded
        unsafe { slice::from_raw_parts(self.array.as_ptr().add(self.head), self.tail - self.head) }
    }
}

impl<T, A: RawAllocator> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.head == self.tail {
            return None;
        }
        let index = self.head;
        self.head += 1;
        // SAFETY: `index` was in `[head, tail)` and is now outside, so it is read exactly once
        Some(unsafe { self.array.as_ptr().add(index).read() })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.tail - self.head;
        (remaining, Some(remaining))
    }
}

impl<T, A: RawAllocator> DoubleEndedIterator for IntoIter<T, A> {
    fn next_back(&mut self) -> Option<T> {
        if self.head == self.tail {
            return None;
        }
        self.tail -= 1;
        // SAFETY: the old last position of `[head, tail)` is now outside, so it is read once
        Some(unsafe { self.array.as_ptr().add(self.tail).read() })
    }
}

impl<T, A: RawAllocator> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: RawAllocator> FusedIterator for IntoIter<T, A> {}

impl<T, A: RawAllocator> Drop for IntoIter<T, A> {
    fn drop(&mut self) {
        let remaining = core::ptr::slice_from_raw_parts_mut(
            self.array.as_mut_ptr().wrapping_add(self.head),
            self.tail - self.head,
        );
        self.head = self.tail;
        // SAFETY: these are exactly the initialized elements that were never yielded
        unsafe { core::ptr::drop_in_place(remaining) };
    }
}

impl<T: fmt::Debug, A: RawAllocator> fmt::Debug for IntoIter<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}
