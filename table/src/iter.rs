use std::{fmt, iter::FusedIterator, slice};

use hoard_arena::{Global, RawAllocator};

use crate::slot::Slot;

/// Iterator over shared references to the entries of a [`HashTable`](crate::HashTable), in bucket
/// order.
pub struct Iter<'a, D> {
    slots: slice::Iter<'a, Slot<D>>,
    remaining: usize,
}

impl<'a, D> Iter<'a, D> {
    pub(crate) fn new(slots: &'a [Slot<D>], len: usize) -> Self {
        Self {
            slots: slots.iter(),
            remaining: len,
        }
    }
}

impl<D> Clone for Iter<'_, D> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            remaining: self.remaining,
        }
    }
}

impl<D: fmt::Debug> fmt::Debug for Iter<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, D> Iterator for Iter<'a, D> {
    type Item = &'a D;

    fn next(&mut self) -> Option<&'a D> {
        let data = self.slots.by_ref().find_map(Slot::data)?;
        self.remaining -= 1;
        Some(data)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<D> DoubleEndedIterator for Iter<'_, D> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let data = self.slots.by_ref().rev().find_map(Slot::data)?;
        self.remaining -= 1;
        Some(data)
    }
}

impl<D> ExactSizeIterator for Iter<'_, D> {}
impl<D> FusedIterator for Iter<'_, D> {}

/// Iterator over mutable references to the entries of a [`HashTable`](crate::HashTable), in bucket
/// order.
pub struct IterMut<'a, D> {
    slots: slice::IterMut<'a, Slot<D>>,
    remaining: usize,
}

impl<'a, D> IterMut<'a, D> {
    pub(crate) fn new(slots: &'a mut [Slot<D>], len: usize) -> Self {
        Self {
            slots: slots.iter_mut(),
            remaining: len,
        }
    }
}

impl<'a, D> Iterator for IterMut<'a, D> {
    type Item = &'a mut D;

    fn next(&mut self) -> Option<&'a mut D> {
        let data = self.slots.by_ref().find_map(Slot::data_mut)?;
        self.remaining -= 1;
        Some(data)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<D> DoubleEndedIterator for IterMut<'_, D> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let data = self.slots.by_ref().rev().find_map(Slot::data_mut)?;
        self.remaining -= 1;
        Some(data)
    }
}

impl<D> ExactSizeIterator for IterMut<'_, D> {}
impl<D> FusedIterator for IterMut<'_, D> {}

/// Owning iterator over the entries of a [`HashTable`](crate::HashTable), in bucket order.
pub struct IntoIter<D, A: RawAllocator = Global> {
    slots: hoard_array::IntoIter<Slot<D>, A>,
    remaining: usize,
}

impl<D, A: RawAllocator> IntoIter<D, A> {
    pub(crate) fn new(slots: hoard_array::IntoIter<Slot<D>, A>, len: usize) -> Self {
        Self {
            slots,
            remaining: len,
        }
    }
}

impl<D, A: RawAllocator> Iterator for IntoIter<D, A> {
    type Item = D;

    fn next(&mut self) -> Option<D> {
        let data = self.slots.by_ref().find_map(Slot::into_data)?;
        self.remaining -= 1;
        Some(data)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<D, A: RawAllocator> DoubleEndedIterator for IntoIter<D, A> {
    fn next_back(&mut self) -> Option<D> {
        let data = self.slots.by_ref().rev().find_map(Slot::into_data)?;
        self.remaining -= 1;
        Some(data)
    }
}

impl<D, A: RawAllocator> ExactSizeIterator for IntoIter<D, A> {}
impl<D, A: RawAllocator> FusedIterator for IntoIter<D, A> {}
