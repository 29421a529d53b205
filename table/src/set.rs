//! A hash set built on [`HashTable`] with the values themselves as keys.
use std::{
    borrow::Borrow,
    fmt,
    hash::{BuildHasher, Hash},
    ops::RangeBounds,
};

use hoard_arena::{Global, RawAllocator};
use hoard_util::{hash::DefaultBuildHasher, impl_double_ended_iterator, impl_iterator};

use crate::{
    iter,
    traits::{DefaultEq, Identity, KeyEq},
    HashTable,
};

/// A hash set storing values of type `T` in a Robin Hood [`HashTable`].
pub struct HashSet<T, S = DefaultBuildHasher, E = DefaultEq, A: RawAllocator = Global> {
    table: HashTable<T, T, S, E, Identity, A>,
}

impl<T, S: Default, E: Default, A: RawAllocator + Default> Default for HashSet<T, S, E, A> {
    fn default() -> Self {
        Self {
            table: HashTable::default(),
        }
    }
}

impl<T, S: Default, E: Default, A: RawAllocator + Default> HashSet<T, S, E, A> {
    /// Returns an empty set.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T, S, E: Default, A: RawAllocator + Default> HashSet<T, S, E, A> {
    /// Returns an empty set using the given hasher.
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            table: HashTable::with_hasher(hasher),
        }
    }
}

impl<T, S, E, A: RawAllocator + Default> HashSet<T, S, E, A> {
    /// Returns an empty set using the given hasher and key comparer.
    pub fn with_hasher_and_eq(hasher: S, eq: E) -> Self {
        Self {
            table: HashTable::with_parts(hasher, eq, Identity),
        }
    }
}

impl<T, S, E, A: RawAllocator> HashSet<T, S, E, A> {
    /// Returns the number of values.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set holds no values.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of buckets.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Drops all values and returns the bucket array to its allocator, resetting the capacity to
    /// zero.
    pub fn clear(&mut self) {
        self.table.clear()
    }

    /// Returns the underlying table, giving access to positions.
    pub fn as_table(&self) -> &HashTable<T, T, S, E, Identity, A> {
        &self.table
    }

    /// Removes the values whose position lies in `range`, see [`HashTable::erase_range`].
    pub fn erase_range(&mut self, range: impl RangeBounds<usize>) -> usize {
        self.table.erase_range(range)
    }

    /// Removes and returns the value at `position`, see [`HashTable::remove_at`].
    pub fn remove_at(&mut self, position: usize) -> T {
        self.table.remove_at(position)
    }

    /// Returns an iterator over all values.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.table.iter(),
        }
    }
}

impl<T, S: BuildHasher, E, A: RawAllocator> HashSet<T, S, E, A> {
    /// Returns `true` if the set contains `value`.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + ?Sized,
        E: KeyEq<Q>,
    {
        self.table.contains(value)
    }

    /// Returns the stored value equal to `value`.
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Hash + ?Sized,
        E: KeyEq<Q>,
    {
        self.table.get(value)
    }

    /// Removes `value`, returning whether it was present.
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + ?Sized,
        E: KeyEq<Q>,
    {
        self.table.remove(value).is_some()
    }

    /// Removes and returns the stored value equal to `value`.
    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: Hash + ?Sized,
        E: KeyEq<Q>,
    {
        self.table.remove(value)
    }

    /// Returns `true` if every value of `self` is contained in `other`.
    pub fn is_subset<S2: BuildHasher, A2: RawAllocator>(
        &self,
        other: &HashSet<T, S2, E, A2>,
    ) -> bool
    where
        T: Hash,
        E: KeyEq<T>,
    {
        self.len() <= other.len() && self.iter().all(|value| other.contains(value))
    }

    /// Validates the internal invariants of the underlying table.
    pub fn check(&self)
    where
        T: Hash,
        E: KeyEq<T>,
    {
        self.table.check()
    }
}

impl<T: Hash, S: BuildHasher, E: KeyEq<T>, A: RawAllocator + Default> HashSet<T, S, E, A> {
    /// Returns an empty set with `capacity` buckets.
    pub fn with_capacity(capacity: usize) -> Self
    where
        S: Default,
        E: Default,
    {
        Self {
            table: HashTable::with_capacity(capacity),
        }
    }

    /// Ensures a capacity of at least `capacity` buckets.
    pub fn reserve(&mut self, capacity: usize) {
        self.table.reserve(capacity)
    }

    /// Moves all values into a fresh bucket array, see [`HashTable::rehash`].
    pub fn rehash(&mut self, capacity: usize) {
        self.table.rehash(capacity)
    }

    /// Inserts `value`, returning `false` if an equal value was already present.
    pub fn insert(&mut self, value: T) -> bool {
        self.table.emplace(value).1
    }

    /// Inserts `value`, returning its position and whether it was newly inserted.
    pub fn insert_full(&mut self, value: T) -> (usize, bool) {
        self.table.emplace(value)
    }
}

impl<T: Clone, S: Clone, E: Clone, A: RawAllocator + Default> Clone for HashSet<T, S, E, A> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
        }
    }
}

impl<T: fmt::Debug, S, E, A: RawAllocator> fmt::Debug for HashSet<T, S, E, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, S, E, A> PartialEq for HashSet<T, S, E, A>
where
    T: Hash,
    S: BuildHasher,
    E: KeyEq<T>,
    A: RawAllocator,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.is_subset(other)
    }
}

impl<T, S, E, A> Eq for HashSet<T, S, E, A>
where
    T: Hash,
    S: BuildHasher,
    E: KeyEq<T>,
    A: RawAllocator,
{
}

impl<T, S, E, A> Extend<T> for HashSet<T, S, E, A>
where
    T: Hash,
    S: BuildHasher,
    E: KeyEq<T>,
    A: RawAllocator + Default,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.table.extend(iter)
    }
}

impl<T, S, E, A> FromIterator<T> for HashSet<T, S, E, A>
where
    T: Hash,
    S: BuildHasher + Default,
    E: KeyEq<T> + Default,
    A: RawAllocator + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            table: iter.into_iter().collect(),
        }
    }
}

impl<T, S, E, A, const N: usize> From<[T; N]> for HashSet<T, S, E, A>
where
    T: Hash,
    S: BuildHasher + Default,
    E: KeyEq<T> + Default,
    A: RawAllocator + Default,
{
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<'a, T, S, E, A: RawAllocator> IntoIterator for &'a HashSet<T, S, E, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, S, E, A: RawAllocator> IntoIterator for HashSet<T, S, E, A> {
    type Item = T;
    type IntoIter = iter::IntoIter<T, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.table.into_iter()
    }
}

/// Iterator over the values of a [`HashSet`].
pub struct Iter<'a, T> {
    inner: iter::Iter<'a, T>,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    impl_iterator!();
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    impl_double_ended_iterator!();
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
