//! A hash map built on [`HashTable`] with `(key, value)` pairs as entries.
use std::{
    borrow::Borrow,
    fmt,
    hash::{BuildHasher, Hash},
    ops::{Index, RangeBounds},
};

use hoard_arena::{Global, RawAllocator};
use hoard_util::{hash::DefaultBuildHasher, impl_double_ended_iterator, impl_iterator};

use crate::{
    iter,
    traits::{DefaultEq, KeyEq, PairKey},
    HashTable,
};

/// A hash map storing `(K, V)` pairs in a Robin Hood [`HashTable`].
///
/// Unlike the `std` map, the comparer `E` and the allocator `A` are type parameters. See
/// [`HashTable`] for the probing and growth behavior.
pub struct HashMap<K, V, S = DefaultBuildHasher, E = DefaultEq, A: RawAllocator = Global> {
    table: HashTable<K, (K, V), S, E, PairKey, A>,
}

impl<K, V, S: Default, E: Default, A: RawAllocator + Default> Default for HashMap<K, V, S, E, A> {
    fn default() -> Self {
        Self {
            table: HashTable::default(),
        }
    }
}

impl<K, V, S: Default, E: Default, A: RawAllocator + Default> HashMap<K, V, S, E, A> {
    /// Returns an empty map.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K, V, S, E: Default, A: RawAllocator + Default> HashMap<K, V, S, E, A> {
    /// Returns an empty map using the given hasher.
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            table: HashTable::with_hasher(hasher),
        }
    }
}

impl<K, V, S, E, A: RawAllocator + Default> HashMap<K, V, S, E, A> {
    /// Returns an empty map using the given hasher and key comparer.
    pub fn with_hasher_and_eq(hasher: S, eq: E) -> Self {
        Self {
            table: HashTable::with_parts(hasher, eq, PairKey),
        }
    }
}

impl<K, V, S, E, A: RawAllocator> HashMap<K, V, S, E, A> {
    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of buckets.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Drops all entries and returns the bucket array to its allocator, resetting the capacity to
    /// zero.
    pub fn clear(&mut self) {
        self.table.clear()
    }

    /// Returns the underlying table, giving access to positions.
    pub fn as_table(&self) -> &HashTable<K, (K, V), S, E, PairKey, A> {
        &self.table
    }

    /// Removes the entries whose position lies in `range`, see [`HashTable::erase_range`].
    pub fn erase_range(&mut self, range: impl RangeBounds<usize>) -> usize {
        self.table.erase_range(range)
    }

    /// Removes and returns the entry at `position`, see [`HashTable::remove_at`].
    pub fn remove_at(&mut self, position: usize) -> (K, V) {
        self.table.remove_at(position)
    }

    /// Returns an iterator over all entries.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over all entries with mutable references to the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.table.iter_mut(),
        }
    }

    /// Returns an iterator over all keys.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over all values.
    pub fn values(&self) -> Values<'_, K, V> {
        Values {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over mutable references to all values.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.table.iter_mut(),
        }
    }
}

impl<K, V, S: BuildHasher, E, A: RawAllocator> HashMap<K, V, S, E, A> {
    /// Returns the value stored for `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
        E: KeyEq<Q>,
    {
        self.table.get(key).map(|(_, value)| value)
    }

    /// Returns the value stored for `key` mutably.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
        E: KeyEq<Q>,
    {
        self.table.get_mut(key).map(|(_, value)| value)
    }

    /// Returns the stored key and value for `key`.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
        E: KeyEq<Q>,
    {
        self.table.get(key).map(|(key, value)| (key, value))
    }

    /// Returns the value stored for `key`, panicking if there is none.
    pub fn at<Q>(&self, key: &Q) -> &V
    where
        K: Borrow<Q>,
        Q: Hash + fmt::Debug + ?Sized,
        E: KeyEq<Q>,
    {
        match self.get(key) {
            Some(value) => value,
            None => panic!("key {key:?} not present in the map"),
        }
    }

    /// Returns `true` if the map holds an entry for `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
        E: KeyEq<Q>,
    {
        self.table.contains(key)
    }

    /// Removes the entry for `key`, returning its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
        E: KeyEq<Q>,
    {
        self.table.remove(key).map(|(_, value)| value)
    }

    /// Removes the entry for `key`, returning the stored key and value.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
        E: KeyEq<Q>,
    {
        self.table.remove(key)
    }

    /// Validates the internal invariants of the underlying table.
    pub fn check(&self)
    where
        K: Hash,
        E: KeyEq<K>,
    {
        self.table.check()
    }
}

impl<K: Hash, V, S: BuildHasher, E: KeyEq<K>, A: RawAllocator + Default> HashMap<K, V, S, E, A> {
    /// Returns an empty map with `capacity` buckets.
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

    /// Moves all entries into a fresh bucket array, see [`HashTable::rehash`].
    pub fn rehash(&mut self, capacity: usize) {
        self.table.rehash(capacity)
    }

    /// Inserts `value` for `key` unless the key is present.
    ///
    /// Returns the value stored for the key and whether the entry was inserted. An existing value
    /// is left untouched and the given one is dropped.
    pub fn emplace(&mut self, key: K, value: V) -> (&mut V, bool) {
        let (position, inserted) = self.table.emplace((key, value));
        (&mut self.table.occupied_at_mut(position).1, inserted)
    }

    /// Inserts the value returned by `make` for `key` unless the key is present.
    ///
    /// `make` is only called when the key is missing.
    pub fn try_emplace(&mut self, key: K, make: impl FnOnce() -> V) -> (&mut V, bool) {
        let (position, inserted) = match self.table.find(&key) {
            Some(position) => (position, false),
            None => self.table.emplace((key, make())),
        };
        (&mut self.table.occupied_at_mut(position).1, inserted)
    }

    /// Stores `value` for `key`, returning the previously stored value.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.table.find(&key) {
            Some(position) => Some(std::mem::replace(
                &mut self.table.occupied_at_mut(position).1,
                value,
            )),
            None => {
                self.table.emplace((key, value));
                None
            }
        }
    }

    /// Returns the value stored for `key`, inserting a default value first if it is missing.
    pub fn get_or_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.try_emplace(key, V::default).0
    }
}

impl<K, V, S, E, A> Clone for HashMap<K, V, S, E, A>
where
    K: Clone,
    V: Clone,
    S: Clone,
    E: Clone,
    A: RawAllocator + Default,
{
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S, E, A: RawAllocator> fmt::Debug for HashMap<K, V, S, E, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S, E, A> PartialEq for HashMap<K, V, S, E, A>
where
    K: Hash,
    V: PartialEq,
    S: BuildHasher,
    E: KeyEq<K>,
    A: RawAllocator,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K, V, S, E, A> Eq for HashMap<K, V, S, E, A>
where
    K: Hash,
    V: Eq,
    S: BuildHasher,
    E: KeyEq<K>,
    A: RawAllocator,
{
}

impl<K, Q, V, S, E, A> Index<&Q> for HashMap<K, V, S, E, A>
where
    K: Borrow<Q>,
    Q: Hash + fmt::Debug + ?Sized,
    S: BuildHasher,
    E: KeyEq<Q>,
    A: RawAllocator,
{
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        self.at(key)
    }
}

impl<K, V, S, E, A> Extend<(K, V)> for HashMap<K, V, S, E, A>
where
    K: Hash,
    S: BuildHasher,
    E: KeyEq<K>,
    A: RawAllocator + Default,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V, S, E, A> FromIterator<(K, V)> for HashMap<K, V, S, E, A>
where
    K: Hash,
    S: BuildHasher + Default,
    E: KeyEq<K> + Default,
    A: RawAllocator + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K, V, S, E, A, const N: usize> From<[(K, V); N]> for HashMap<K, V, S, E, A>
where
    K: Hash,
    S: BuildHasher + Default,
    E: KeyEq<K> + Default,
    A: RawAllocator + Default,
{
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<'a, K, V, S, E, A: RawAllocator> IntoIterator for &'a HashMap<K, V, S, E, A> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S, E, A: RawAllocator> IntoIterator for &'a mut HashMap<K, V, S, E, A> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, S, E, A: RawAllocator> IntoIterator for HashMap<K, V, S, E, A> {
    type Item = (K, V);
    type IntoIter = iter::IntoIter<(K, V), A>;

    fn into_iter(self) -> Self::IntoIter {
        self.table.into_iter()
    }
}

/// Iterator over the entries of a [`HashMap`].
pub struct Iter<'a, K, V> {
    inner: iter::Iter<'a, (K, V)>,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    impl_iterator!(|(key, value)| (key, value));
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    impl_double_ended_iterator!(|(key, value)| (key, value));
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Iterator over the entries of a [`HashMap`] with mutable references to the values.
pub struct IterMut<'a, K, V> {
    inner: iter::IterMut<'a, (K, V)>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    impl_iterator!(|(key, value)| (&*key, value));
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    impl_double_ended_iterator!(|(key, value)| (&*key, value));
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

/// Iterator over the keys of a [`HashMap`].
pub struct Keys<'a, K, V> {
    inner: iter::Iter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    impl_iterator!(|(key, _)| key);
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    impl_double_ended_iterator!(|(key, _)| key);
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

/// Iterator over the values of a [`HashMap`].
pub struct Values<'a, K, V> {
    inner: iter::Iter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    impl_iterator!(|(_, value)| value);
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    impl_double_ended_iterator!(|(_, value)| value);
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

/// Iterator over mutable references to the values of a [`HashMap`].
pub struct ValuesMut<'a, K, V> {
    inner: iter::IterMut<'a, (K, V)>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    impl_iterator!(|(_, value)| value);
}

impl<K, V> DoubleEndedIterator for ValuesMut<'_, K, V> {
    impl_double_ended_iterator!(|(_, value)| value);
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}
