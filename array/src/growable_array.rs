//! [`GrowableArray`] is a contiguous, capacity-doubling buffer of `T`.
use core::{
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
    mem,
    ops::{Deref, DerefMut, Range, RangeBounds},
    ptr::{self, NonNull},
    slice,
};
use std::{alloc::Layout, cmp::Ordering};

use hoard_arena::{Global, RawAllocator};
use hoard_util::range::simplify_range;

use crate::{sort::quicksort, IntoIter, TryReserveError};

/// Capacity an empty array grows to on its first insertion.
pub const MIN_CAPACITY: usize = 4;

/// A contiguous, growable array of `T` whose buffer is obtained from an allocator of type `A`.
///
/// Elements `[0, len)` are initialized, elements `[len, capacity)` are uninitialized memory. The
/// array grows its buffer by moving every live element into a strictly larger allocation and
/// releasing the old one through the same allocator. Only [`reset`](Self::reset) reduces the
/// capacity, back to zero.
///
/// Out-of-bounds accesses through indexing, [`at`](Self::at), [`front`](Self::front),
/// [`back`](Self::back), [`insert`](Self::insert), [`remove`](Self::remove) or
/// [`erase`](Self::erase) are programmer errors and panic. The checked alternatives are the slice
/// methods `get`, `first` and `last`, available through `Deref<Target = [T]>`.
pub struct GrowableArray<T, A: RawAllocator = Global> {
    ptr: NonNull<T>,
    len: usize,
    cap: usize,
    alloc: A,
    _phantom: PhantomData<T>,
}

// SAFETY: the array uniquely owns its elements and its allocator, just like `Vec<T>` with a
// separately owned `A` would
unsafe impl<T: Send, A: RawAllocator + Send> Send for GrowableArray<T, A> {}
// SAFETY: shared access only hands out shared references to elements and the allocator
unsafe impl<T: Sync, A: RawAllocator + Sync> Sync for GrowableArray<T, A> {}

impl<T, A: RawAllocator + Default> Default for GrowableArray<T, A> {
    fn default() -> Self {
        Self::with_allocator(A::default())
    }
}

impl<T, A: RawAllocator + Default> GrowableArray<T, A> {
    /// Returns an empty array without a buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an empty array with room for exactly `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut array = Self::default();
        array.reserve(capacity);
        array
    }
}

impl<T, A: RawAllocator> GrowableArray<T, A> {
    const IS_ZST: bool = mem::size_of::<T>() == 0;

    /// Returns an empty array that will obtain its buffer from `alloc`.
    pub fn with_allocator(alloc: A) -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
            cap: 0,
            alloc,
            _phantom: PhantomData,
        }
    }

    /// Returns a reference to the allocator owned by this array.
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Returns the number of live elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of elements the current buffer can hold.
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Returns a raw pointer to the buffer.
    ///
    /// The pointer is dangling while the capacity is zero.
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Returns a raw mutable pointer to the buffer.
    ///
    /// The pointer is dangling while the capacity is zero.
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Sets the number of live elements.
    ///
    /// # Safety
    /// `len` must not exceed the capacity and elements `[0, len)` must be initialized. Elements
    /// dropped from the live range by shrinking are leaked, not dropped.
    pub unsafe fn set_len(&mut self, len: usize) {
        debug_assert!(len <= self.cap);
        self.len = len;
    }

    /// Returns a slice of all live elements.
    pub fn as_slice(&self) -> &[T] {
        self
    }

    /// Returns a mutable slice of all live elements.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self
    }

    fn buffer_layout(capacity: usize) -> Result<Layout, TryReserveError> {
        Layout::array::<T>(capacity).map_err(|_| TryReserveError::CapacityOverflow)
    }

    /// Grows the capacity to `capacity`, reporting failures to the caller.
    ///
    /// Does nothing if the current capacity is at least `capacity`. On success all live elements
    /// have been moved into the new buffer and the old one was returned to the allocator. On
    /// failure the array is unchanged.
    pub fn try_reserve(&mut self, capacity: usize) -> Result<(), TryReserveError> {
        if capacity <= self.cap {
            return Ok(());
        }

        if Self::IS_ZST {
            self.cap = capacity;
            return Ok(());
        }

        let new_layout = Self::buffer_layout(capacity)?;
        let new_ptr = self.alloc.allocate(new_layout)?.cast::<T>();

        // SAFETY: the new buffer holds more than `len` elements and is disjoint from the old one;
        // this moves every live element, leaving the old locations logically uninitialized
        unsafe { ptr::copy_nonoverlapping(self.ptr.as_ptr(), new_ptr.as_ptr(), self.len) };

        self.release_buffer();
        self.ptr = new_ptr;
        self.cap = capacity;
        Ok(())
    }

    /// Grows the capacity to `capacity` if it is smaller; never shrinks.
    ///
    /// Note that unlike `Vec::reserve`, the argument is the desired total capacity.
    ///
    /// Panics on capacity overflow and aborts via [`std::alloc::handle_alloc_error`] when the
    /// allocator fails.
    pub fn reserve(&mut self, capacity: usize) {
        if let Err(err) = self.try_reserve(capacity) {
            err.handle()
        }
    }

    /// Ensures room for `additional` more elements, doubling the capacity if that is larger.
    fn reserve_for(&mut self, additional: usize) {
        let Some(required) = self.len.checked_add(additional) else {
            TryReserveError::CapacityOverflow.handle()
        };
        if required > self.cap {
            let doubled = self.cap.saturating_mul(2).max(MIN_CAPACITY);
            self.reserve(required.max(doubled));
        }
    }

    /// Returns the buffer to the allocator without touching any elements.
    fn release_buffer(&mut self) {
        if self.cap == 0 || Self::IS_ZST {
            return;
        }
        // SAFETY: this layout was valid when the buffer was allocated with it
        let layout = unsafe {
            Layout::from_size_align_unchecked(mem::size_of::<T>() * self.cap, mem::align_of::<T>())
        };
        // SAFETY: the buffer was allocated by `self.alloc` with this layout
        unsafe { self.alloc.deallocate(self.ptr.cast(), layout) };
        self.ptr = NonNull::dangling();
        self.cap = 0;
    }

    /// Appends `value`, growing the capacity to `max(4, 2 * capacity)` when full.
    pub fn push(&mut self, value: T) {
        if self.len == self.cap {
            self.reserve_for(1);
        }
        // SAFETY: `len < cap`, so the slot is in bounds and uninitialized
        unsafe { self.ptr.as_ptr().add(self.len).write(value) };
        self.len += 1;
    }

    /// Appends the value returned by `f` and returns a reference to it.
    pub fn push_with(&mut self, f: impl FnOnce() -> T) -> &mut T {
        self.push(f());
        let last = self.len - 1;
        &mut self[last]
    }

    /// Removes and returns the last element, or `None` if the array is empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the element at the old last position is initialized and no longer live
        Some(unsafe { self.ptr.as_ptr().add(self.len).read() })
    }

    /// Drops all elements from position `len` onwards. Does nothing if `len >= self.len()`.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        // SAFETY: `len < self.len`, so this stays in bounds
        let tail_start = unsafe { self.ptr.as_ptr().add(len) };
        let tail = ptr::slice_from_raw_parts_mut(tail_start, self.len - len);
        // shrink first so a panicking destructor can at worst leak
        self.len = len;
        // SAFETY: the tail consists of initialized elements that are no longer live
        unsafe { ptr::drop_in_place(tail) };
    }

    /// Drops all elements, keeping the buffer.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Drops all elements and returns the buffer to the allocator, resetting the capacity to zero.
    pub fn reset(&mut self) {
        self.truncate(0);
        if Self::IS_ZST {
            self.cap = 0;
        } else {
            self.release_buffer();
        }
    }

    /// Replaces the contents of the array with the items of `iter`.
    pub fn assign(&mut self, iter: impl IntoIterator<Item = T>) {
        self.clear();
        self.extend(iter);
    }

    /// Resizes the array to `new_len` elements, filling new positions with values returned by `f`.
    ///
    /// Growing reserves exactly `new_len` elements of capacity.
    pub fn resize_with(&mut self, new_len: usize, mut f: impl FnMut() -> T) {
        if new_len <= self.len {
            self.truncate(new_len);
            return;
        }
        self.reserve(new_len);
        while self.len < new_len {
            // SAFETY: `len < new_len <= cap`
            unsafe { self.ptr.as_ptr().add(self.len).write(f()) };
            self.len += 1;
        }
    }

    /// Resizes the array to `new_len` elements, default-constructing new trailing elements and
    /// dropping excess ones.
    pub fn resize(&mut self, new_len: usize)
    where
        T: Default,
    {
        self.resize_with(new_len, T::default)
    }

    /// Moves the elements `[index, len)` towards the tail by `count` positions.
    ///
    /// Afterwards `[index, index + count)` is logically uninitialized and `len` is set to `index`,
    /// so that a panic before [`close_gap`](Self::close_gap) leaks the tail instead of exposing
    /// the gap.
    ///
    /// # Safety
    /// The capacity must be at least `len + count` and `index <= len`.
    unsafe fn open_gap(&mut self, index: usize, count: usize) -> usize {
        let old_len = self.len;
        // SAFETY: both ranges are within the capacity per our requirements
        unsafe {
            let base = self.ptr.as_ptr();
            ptr::copy(base.add(index), base.add(index + count), old_len - index);
        }
        self.len = index;
        old_len
    }

    /// # Safety
    /// Must follow [`open_gap`](Self::open_gap) with its return value, after the gap of `count`
    /// elements was completely initialized.
    unsafe fn close_gap(&mut self, old_len: usize, count: usize) {
        self.len = old_len + count;
    }

    /// Inserts `value` at position `index`, shifting all following elements towards the tail.
    ///
    /// Returns the position of the inserted element. Panics if `index > len`.
    pub fn insert(&mut self, index: usize, value: T) -> usize {
        let len = self.len;
        assert!(
            index <= len,
            "insertion index {index} is out of bounds (len {len})"
        );
        self.reserve_for(1);
        // SAFETY: reserved room for one more element and checked `index <= len`; the gap is
        // initialized before being closed
        unsafe {
            let old_len = self.open_gap(index, 1);
            self.ptr.as_ptr().add(index).write(value);
            self.close_gap(old_len, 1);
        }
        index
    }

    /// Inserts clones of `values` at position `index`, shifting all following elements towards
    /// the tail.
    ///
    /// Returns the position of the first inserted element. Panics if `index > len`.
    pub fn insert_from_slice(&mut self, index: usize, values: &[T]) -> usize
    where
        T: Clone,
    {
        let len = self.len;
        assert!(
            index <= len,
            "insertion index {index} is out of bounds (len {len})"
        );
        let count = values.len();
        self.reserve_for(count);
        // SAFETY: reserved room for `count` more elements and checked `index <= len`; every
        // position of the gap is written before it is closed
        unsafe {
            let old_len = self.open_gap(index, count);
            let gap = self.ptr.as_ptr().add(index);
            for (offset, value) in values.iter().enumerate() {
                gap.add(offset).write(value.clone());
            }
            self.close_gap(old_len, count);
        }
        index
    }

    /// Inserts all items of `iter` at position `index`, in order, shifting all following elements
    /// towards the tail.
    ///
    /// Returns the position of the first inserted element. Panics if `index > len`.
    pub fn insert_iter(&mut self, index: usize, iter: impl IntoIterator<Item = T>) -> usize {
        let len = self.len;
        assert!(
            index <= len,
            "insertion index {index} is out of bounds (len {len})"
        );
        let mut staged: GrowableArray<T> = iter.into_iter().collect();
        let count = staged.len();
        self.reserve_for(count);
        // SAFETY: reserved room for `count` more elements and checked `index <= len`. The staged
        // elements are moved into the gap and then forgotten by the staging array.
        unsafe {
            let old_len = self.open_gap(index, count);
            ptr::copy_nonoverlapping(staged.as_ptr(), self.ptr.as_ptr().add(index), count);
            staged.set_len(0);
            self.close_gap(old_len, count);
        }
        index
    }

    /// Removes and returns the element at `index`, shifting all following elements towards the
    /// head.
    ///
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: usize) -> T {
        let len = self.len;
        assert!(
            index < len,
            "removal index {index} is out of bounds (len {len})"
        );
        // SAFETY: `index < len`; the removed element is read out before its slot is overwritten
        unsafe {
            let base = self.ptr.as_ptr();
            let value = base.add(index).read();
            ptr::copy(base.add(index + 1), base.add(index), len - index - 1);
            self.len = len - 1;
            value
        }
    }

    /// Drops the elements in `range`, shifting all following elements towards the head to close
    /// the gap.
    ///
    /// Returns the position that now holds the element following the erased range, which equals
    /// `len` if the range extended to the end. Panics if the range is out of bounds.
    pub fn erase(&mut self, range: impl RangeBounds<usize>) -> usize {
        let Range { start, end } = simplify_range(range, self.len);
        if start == end {
            return start;
        }
        let old_len = self.len;
        let erased = end - start;
        // SAFETY: the range was checked against `len`. The live range is shortened first so a
        // panicking destructor at worst leaks the tail.
        unsafe {
            let base = self.ptr.as_ptr();
            self.len = start;
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(base.add(start), erased));
            ptr::copy(base.add(end), base.add(start), old_len - end);
            self.len = old_len - erased;
        }
        start
    }

    /// Returns the position of the first element equal to `value`.
    pub fn find(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.iter().position(|element| element == value)
    }

    /// Returns the number of positions from `first` to `last`.
    ///
    /// Panics unless `first <= last <= len`.
    pub fn distance(&self, first: usize, last: usize) -> usize {
        simplify_range(first..last, self.len).len()
    }

    /// Returns the element at `index`. Panics if `index >= len`.
    pub fn at(&self, index: usize) -> &T {
        let len = self.len;
        assert!(index < len, "index {index} is out of bounds (len {len})");
        &self[index]
    }

    /// Returns the element at `index` mutably. Panics if `index >= len`.
    pub fn at_mut(&mut self, index: usize) -> &mut T {
        let len = self.len;
        assert!(index < len, "index {index} is out of bounds (len {len})");
        &mut self[index]
    }

    /// Returns the first element. Panics if the array is empty.
    pub fn front(&self) -> &T {
        assert!(!self.is_empty(), "the array is empty, there is no front element");
        &self[0]
    }

    /// Returns the first element mutably. Panics if the array is empty.
    pub fn front_mut(&mut self) -> &mut T {
        assert!(!self.is_empty(), "the array is empty, there is no front element");
        &mut self[0]
    }

    /// Returns the last element. Panics if the array is empty.
    pub fn back(&self) -> &T {
        assert!(!self.is_empty(), "the array is empty, there is no back element");
        &self[self.len - 1]
    }

    /// Returns the last element mutably. Panics if the array is empty.
    pub fn back_mut(&mut self) -> &mut T {
        assert!(!self.is_empty(), "the array is empty, there is no back element");
        let last = self.len - 1;
        &mut self[last]
    }

    /// Sorts the elements in `range` in ascending order of the strict ordering `is_less`.
    ///
    /// This is an in-place quicksort that keeps pending partitions on an explicit work list
    /// instead of recursing. It is not stable. Panics if the range is out of bounds.
    pub fn sort_range_by(
        &mut self,
        range: impl RangeBounds<usize>,
        mut is_less: impl FnMut(&T, &T) -> bool,
    ) {
        let range = simplify_range(range, self.len);
        quicksort(&mut self[range], &mut is_less);
    }

    /// Sorts all elements with the comparator `compare`. Not stable.
    pub fn sort_by(&mut self, mut compare: impl FnMut(&T, &T) -> Ordering) {
        self.sort_range_by(.., |a, b| compare(a, b) == Ordering::Less)
    }

    /// Sorts all elements in ascending order. Not stable.
    pub fn sort(&mut self)
    where
        T: Ord,
    {
        self.sort_range_by(.., |a, b| a < b)
    }
}

impl<T, A: RawAllocator> Drop for GrowableArray<T, A> {
    fn drop(&mut self) {
        // SAFETY: drops exactly the live elements, which are not accessed afterwards
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.ptr.as_ptr(), self.len)) };
        self.release_buffer();
    }
}

impl<T, A: RawAllocator> Deref for GrowableArray<T, A> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        // SAFETY: `ptr` is non-null and aligned, and `[0, len)` is initialized
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl<T, A: RawAllocator> DerefMut for GrowableArray<T, A> {
    fn deref_mut(&mut self) -> &mut [T] {
        // SAFETY: `ptr` is non-null and aligned, `[0, len)` is initialized and we hold a unique
        // borrow
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<T, A: RawAllocator> AsRef<[T]> for GrowableArray<T, A> {
    fn as_ref(&self) -> &[T] {
        self
    }
}

impl<T, A: RawAllocator> AsMut<[T]> for GrowableArray<T, A> {
    fn as_mut(&mut self) -> &mut [T] {
        self
    }
}

/// Copies element-wise into a fresh allocator; the copy's capacity equals the source's length.
impl<T: Clone, A: RawAllocator + Default> Clone for GrowableArray<T, A> {
    fn clone(&self) -> Self {
        let mut copy = Self::with_capacity(self.len);
        copy.extend(self.iter().cloned());
        copy
    }

    fn clone_from(&mut self, source: &Self) {
        self.clear();
        self.reserve(source.len);
        self.extend(source.iter().cloned());
    }
}

impl<T: fmt::Debug, A: RawAllocator> fmt::Debug for GrowableArray<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Hash, A: RawAllocator> Hash for GrowableArray<T, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state)
    }
}

impl<T: PartialEq, A1: RawAllocator, A2: RawAllocator> PartialEq<GrowableArray<T, A2>>
    for GrowableArray<T, A1>
{
    fn eq(&self, other: &GrowableArray<T, A2>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, A: RawAllocator> Eq for GrowableArray<T, A> {}

impl<T: PartialEq, A: RawAllocator> PartialEq<[T]> for GrowableArray<T, A> {
    fn eq(&self, other: &[T]) -> bool {
        self.as_slice() == other
    }
}

impl<T: PartialEq, A: RawAllocator, const N: usize> PartialEq<[T; N]> for GrowableArray<T, A> {
    fn eq(&self, other: &[T; N]) -> bool {
        self.as_slice() == other
    }
}

impl<T, A: RawAllocator> Extend<T> for GrowableArray<T, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower_bound, _) = iter.size_hint();
        self.reserve_for(lower_bound);
        for item in iter {
            self.push(item);
        }
    }
}

impl<'a, T: Copy + 'a, A: RawAllocator> Extend<&'a T> for GrowableArray<T, A> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied())
    }
}

impl<T, A: RawAllocator + Default> FromIterator<T> for GrowableArray<T, A> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = Self::default();
        array.extend(iter);
        array
    }
}

impl<T, A: RawAllocator + Default, const N: usize> From<[T; N]> for GrowableArray<T, A> {
    fn from(values: [T; N]) -> Self {
        let mut array = Self::with_capacity(N);
        array.extend(values);
        array
    }
}

impl<T: Clone, A: RawAllocator + Default> From<&[T]> for GrowableArray<T, A> {
    fn from(values: &[T]) -> Self {
        let mut array = Self::with_capacity(values.len());
        array.extend(values.iter().cloned());
        array
    }
}

impl<T, A: RawAllocator> IntoIterator for GrowableArray<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}

impl<'a, T, A: RawAllocator> IntoIterator for &'a GrowableArray<T, A> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, A: RawAllocator> IntoIterator for &'a mut GrowableArray<T, A> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
