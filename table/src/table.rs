use std::{
    borrow::Borrow,
    fmt,
    hash::{BuildHasher, Hash},
    marker::PhantomData,
    mem,
    ops::{Range, RangeBounds},
};

use hoard_arena::{Global, RawAllocator};
use hoard_array::GrowableArray;
use hoard_util::{
    hash::{bucket_index, DefaultBuildHasher},
    range::simplify_range,
};

use crate::{
    iter::{IntoIter, Iter, IterMut},
    slot::Slot,
    traits::{key_matches, DefaultEq, Identity, KeyEq, Selector},
};

/// Numerator of the maximal load factor `7 / 10`.
pub const LOAD_FACTOR_NUMERATOR: usize = 7;
/// Denominator of the maximal load factor `7 / 10`.
pub const LOAD_FACTOR_DENOMINATOR: usize = 10;
/// Capacity an empty table grows to on its first insertion.
pub const MIN_CAPACITY: usize = 4;

/// An open addressing hash table using Robin Hood probing and backward shift deletion.
///
/// Every entry of type `D` has a key of type `K`, extracted by the selector `X`. Keys are hashed
/// with the [`BuildHasher`] `S` and compared with the [`KeyEq`] implementation `E`. The bucket
/// array is a [`GrowableArray`] drawing its memory from an allocator of type `A`.
///
/// Entries are addressed by their bucket index, called a position. The end position equals the
/// [`capacity`](Self::capacity). Every insertion, removal or rehash may move entries, so positions
/// obtained earlier must not be reused afterwards. The borrow checker enforces this for references
/// but not for positions.
///
/// Growing the table allocates a new bucket array from a default constructed `A` and drops the old
/// array together with its allocator.
pub struct HashTable<
    K,
    D,
    S = DefaultBuildHasher,
    E = DefaultEq,
    X = Identity,
    A: RawAllocator = Global,
> {
    slots: GrowableArray<Slot<D>, A>,
    len: usize,
    hasher: S,
    eq: E,
    selector: X,
    _phantom: PhantomData<fn() -> K>,
}

impl<K, D, S: Default, E: Default, X: Default, A: RawAllocator + Default> Default
    for HashTable<K, D, S, E, X, A>
{
    fn default() -> Self {
        Self::with_parts(S::default(), E::default(), X::default())
    }
}

impl<K, D, S: Default, E: Default, X: Default, A: RawAllocator + Default>
    HashTable<K, D, S, E, X, A>
{
    /// Returns an empty table without a bucket array.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K, D, S, E: Default, X: Default, A: RawAllocator + Default> HashTable<K, D, S, E, X, A> {
    /// Returns an empty table using the given hasher.
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_parts(hasher, E::default(), X::default())
    }
}

impl<K, D, S, E, X, A: RawAllocator + Default> HashTable<K, D, S, E, X, A> {
    /// Returns an empty table using the given hasher, key comparer and key selector.
    pub fn with_parts(hasher: S, eq: E, selector: X) -> Self {
        Self {
            slots: GrowableArray::new(),
            len: 0,
            hasher,
            eq,
            selector,
            _phantom: PhantomData,
        }
    }
}

impl<K, D, S, E, X, A: RawAllocator> HashTable<K, D, S, E, X, A> {
    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of buckets, which is also the end position.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the hasher.
    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Returns the allocator backing the current bucket array.
    pub fn allocator(&self) -> &A {
        self.slots.allocator()
    }

    /// Drops all entries and returns the bucket array to its allocator, resetting the capacity to
    /// zero.
    pub fn clear(&mut self) {
        self.slots.reset();
        self.len = 0;
    }

    /// Returns an iterator over all entries in bucket order.
    pub fn iter(&self) -> Iter<'_, D> {
        Iter::new(&self.slots, self.len)
    }

    /// Returns an iterator over mutable references to all entries in bucket order.
    ///
    /// Modifying an entry in a way that changes its key's hash or equality is a logic error. The
    /// table will not be corrupted in a memory safety sense, but lookups may fail to find entries.
    pub fn iter_mut(&mut self) -> IterMut<'_, D> {
        IterMut::new(&mut self.slots, self.len)
    }

    /// Returns the position of the first entry, or the end position if there is none.
    pub fn first_position(&self) -> usize {
        self.seek(0)
    }

    /// Returns the position of the first entry after `position`, or the end position.
    pub fn next_position(&self, position: usize) -> usize {
        self.seek(position.saturating_add(1))
    }

    /// Returns the end position, which equals the capacity.
    pub fn end_position(&self) -> usize {
        self.slots.len()
    }

    fn seek(&self, from: usize) -> usize {
        let capacity = self.slots.len();
        let from = from.min(capacity);
        self.slots[from..]
            .iter()
            .position(Slot::is_occupied)
            .map_or(capacity, |offset| from + offset)
    }

    /// Returns the entry at `position`, if that bucket is occupied.
    pub fn get_at(&self, position: usize) -> Option<&D> {
        self.slots.get(position)?.data()
    }

    /// Returns the entry at `position` mutably, if that bucket is occupied.
    ///
    /// The same restriction as for [`iter_mut`](Self::iter_mut) applies.
    pub fn get_at_mut(&mut self, position: usize) -> Option<&mut D> {
        self.slots.get_mut(position)?.data_mut()
    }

    /// Returns the entry at a position known to be occupied.
    pub(crate) fn occupied_at_mut(&mut self, position: usize) -> &mut D {
        match self.get_at_mut(position) {
            Some(data) => data,
            None => panic!("no entry at position {position}"),
        }
    }

    /// Removes and returns the entry at `position`, closing the gap by shifting back the entries
    /// that follow it.
    ///
    /// Panics if `position` does not hold an entry.
    pub fn remove_at(&mut self, position: usize) -> D {
        let data = match self.slots.get_mut(position).map(mem::take) {
            Some(Slot::Occupied { data, .. }) => data,
            _ => panic!("no entry at position {position}"),
        };
        self.len -= 1;
        self.shift_back(position, position + 1);
        data
    }

    /// Drops all entries whose position lies in `range` and shifts back the entries following the
    /// range.
    ///
    /// Returns the position of the first entry at or after the start of the range, or the end
    /// position. Entries that wrapped around from the front of the bucket array may be shifted to
    /// its back, so a loop that erases while walking positions can visit such entries again.
    ///
    /// Panics if the range exceeds the end position.
    pub fn erase_range(&mut self, range: impl RangeBounds<usize>) -> usize {
        let Range { start, end } = simplify_range(range, self.slots.len());
        if start == end {
            return self.seek(start);
        }
        for slot in &mut self.slots[start..end] {
            if mem::take(slot).is_occupied() {
                self.len -= 1;
            }
        }
        self.shift_back(start, end);
        self.seek(start)
    }

    /// Closes the gap of empty buckets `[start, end)` by moving each following entry back towards
    /// its home bucket.
    fn shift_back(&mut self, start: usize, end: usize) {
        let capacity = self.slots.len();
        let mut gap = end - start;
        let mut index = end % capacity;

        for _ in 0..capacity {
            let psl = match self.slots[index].psl() {
                Some(psl) if psl > 0 => psl,
                _ => break,
            };
            let shift = psl.min(gap);
            let target = (index + capacity - shift) % capacity;
            let Slot::Occupied { data, .. } = mem::take(&mut self.slots[index]) else {
                unreachable!()
            };
            debug_assert!(!self.slots[target].is_occupied());
            self.slots[target] = Slot::Occupied {
                psl: psl - shift,
                data,
            };
            gap = shift;
            index = (index + 1) % capacity;
        }
    }
}

impl<K, D, S, E, X, A> HashTable<K, D, S, E, X, A>
where
    S: BuildHasher,
    X: Selector<K, D>,
    A: RawAllocator,
{
    /// Returns the position of the entry with the given key.
    ///
    /// Probing stops at the first empty bucket or at the first entry that is closer to its home
    /// bucket than the probe is to the key's home bucket.
    pub fn find<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
        E: KeyEq<Q>,
    {
        if self.len == 0 {
            return None;
        }
        let capacity = self.slots.len();
        let mut index = bucket_index(self.hasher.hash_one(key), capacity);

        for steps in 0..capacity {
            match &self.slots[index] {
                Slot::Occupied { psl, data } if *psl >= steps => {
                    if key_matches(&self.eq, self.selector.select(data), key) {
                        return Some(index);
                    }
                }
                _ => return None,
            }
            index = (index + 1) % capacity;
        }
        None
    }

    /// Returns the entry with the given key.
    pub fn get<Q>(&self, key: &Q) -> Option<&D>
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
        E: KeyEq<Q>,
    {
        let position = self.find(key)?;
        self.get_at(position)
    }

    /// Returns the entry with the given key mutably.
    ///
    /// The same restriction as for [`iter_mut`](Self::iter_mut) applies.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut D>
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
        E: KeyEq<Q>,
    {
        let position = self.find(key)?;
        self.get_at_mut(position)
    }

    /// Returns `true` if the table holds an entry with the given key.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
        E: KeyEq<Q>,
    {
        self.find(key).is_some()
    }

    /// Removes and returns the entry with the given key.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<D>
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
        E: KeyEq<Q>,
    {
        let position = self.find(key)?;
        Some(self.remove_at(position))
    }

    /// Validates the internal invariants, panicking on the first violation.
    ///
    /// Checks that the entry count is accurate, that every stored probe sequence length matches
    /// the entry's home bucket, that probe sequence lengths grow by at most one per bucket and
    /// that every entry is found at its own position.
    pub fn check(&self)
    where
        K: Hash,
        E: KeyEq<K>,
    {
        let capacity = self.slots.len();
        let mut occupied = 0;

        for (index, slot) in self.slots.iter().enumerate() {
            let Slot::Occupied { psl, data } = slot else {
                continue;
            };
            occupied += 1;

            let key = self.selector.select(data);
            let home = bucket_index(self.hasher.hash_one(key), capacity);
            assert_eq!(
                (home + psl) % capacity,
                index,
                "entry at {index} has a stale probe sequence length"
            );

            if *psl > 0 {
                let previous = self.slots[(index + capacity - 1) % capacity].psl();
                assert!(
                    previous.is_some_and(|previous| previous + 1 >= *psl),
                    "entry at {index} skipped over a richer bucket"
                );
            }

            assert_eq!(self.find(key), Some(index), "entry at {index} is not found");
        }

        assert_eq!(occupied, self.len, "entry count is out of sync");
        assert!(self.len <= capacity);
    }
}

impl<K, D, S, E, X, A> HashTable<K, D, S, E, X, A>
where
    K: Hash,
    S: BuildHasher,
    E: KeyEq<K>,
    X: Selector<K, D>,
    A: RawAllocator + Default,
{
    fn needs_growth(&self) -> bool {
        let capacity = self.slots.len();
        capacity == 0 || self.len * LOAD_FACTOR_DENOMINATOR >= capacity * LOAD_FACTOR_NUMERATOR
    }

    /// Moves all entries into a fresh bucket array of `capacity` buckets.
    ///
    /// The capacity is raised to the number of entries if it is smaller. Entries are placed again
    /// in the bucket order of the old array.
    pub fn rehash(&mut self, capacity: usize) {
        let capacity = capacity.max(self.len);
        let mut fresh = GrowableArray::new();
        fresh.resize_with(capacity, Slot::default);

        let old = mem::replace(&mut self.slots, fresh);
        self.len = 0;
        for data in old.into_iter().filter_map(Slot::into_data) {
            let hash = self.hasher.hash_one(self.selector.select(&data));
            self.place(data, hash, false);
        }
    }

    /// Returns an empty table with `capacity` buckets.
    pub fn with_capacity(capacity: usize) -> Self
    where
        S: Default,
        E: Default,
        X: Default,
    {
        let mut table = Self::default();
        table.reserve(capacity);
        table
    }

    /// Ensures a capacity of at least `capacity` buckets, rehashing if it has to grow.
    pub fn reserve(&mut self, capacity: usize) {
        if capacity > self.slots.len() {
            self.rehash(capacity);
        }
    }

    /// Inserts `data` unless an entry with the same key is present.
    ///
    /// Grows the table to `max(4, 2 * capacity)` buckets first if the load factor is reached.
    /// Returns the position now holding the key and whether `data` was inserted. If the key was
    /// already present, `data` is dropped and the existing entry is left unchanged.
    pub fn emplace(&mut self, data: D) -> (usize, bool) {
        if self.needs_growth() {
            let grown = self.slots.len().saturating_mul(2).max(MIN_CAPACITY);
            self.rehash(grown);
        }
        let hash = self.hasher.hash_one(self.selector.select(&data));
        self.place(data, hash, true)
    }

    /// Robin Hood insertion of `data` starting at its home bucket.
    ///
    /// Whenever the probe is further from its home than the visited entry, the two are swapped and
    /// probing continues with the displaced entry. Duplicates are only looked for before the first
    /// swap.
    fn place(&mut self, data: D, hash: u64, check_duplicates: bool) -> (usize, bool) {
        let capacity = self.slots.len();
        let mut index = bucket_index(hash, capacity);
        let mut candidate = data;
        let mut candidate_psl = 0;
        let mut placed = None;

        for _ in 0..capacity {
            match &mut self.slots[index] {
                Slot::Occupied { psl, data } => {
                    if check_duplicates
                        && placed.is_none()
                        && self
                            .eq
                            .key_eq(self.selector.select(data), self.selector.select(&candidate))
                    {
                        return (index, false);
                    }
                    if candidate_psl > *psl {
                        mem::swap(psl, &mut candidate_psl);
                        mem::swap(data, &mut candidate);
                        placed.get_or_insert(index);
                    }
                }
                empty => {
                    *empty = Slot::Occupied {
                        psl: candidate_psl,
                        data: candidate,
                    };
                    self.len += 1;
                    return (placed.unwrap_or(index), true);
                }
            }
            index = (index + 1) % capacity;
            candidate_psl += 1;
        }

        unreachable!("hash table without an empty bucket");
    }

    /// Inserts `data` unless an entry with the same key is present, looking the key up first.
    ///
    /// Returns the position holding the key and whether `data` was inserted.
    pub fn insert(&mut self, data: D) -> (usize, bool) {
        match self.find(self.selector.select(&data)) {
            Some(position) => (position, false),
            None => self.emplace(data),
        }
    }

    /// Inserts the entry returned by `make` if no entry with the given key is present.
    ///
    /// `make` is only called on a miss and must return an entry with the given key. Returns the
    /// position holding the key and whether a new entry was inserted.
    pub fn try_emplace<Q>(&mut self, key: &Q, make: impl FnOnce() -> D) -> (usize, bool)
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
        E: KeyEq<Q>,
    {
        match self.find(key) {
            Some(position) => (position, false),
            None => self.emplace(make()),
        }
    }
}

impl<K, D, S, E, X, A> Clone for HashTable<K, D, S, E, X, A>
where
    D: Clone,
    S: Clone,
    E: Clone,
    X: Clone,
    A: RawAllocator + Default,
{
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            len: self.len,
            hasher: self.hasher.clone(),
            eq: self.eq.clone(),
            selector: self.selector.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<K, D: fmt::Debug, S, E, X, A: RawAllocator> fmt::Debug for HashTable<K, D, S, E, X, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<K, D, S, E, X, A> Extend<D> for HashTable<K, D, S, E, X, A>
where
    K: Hash,
    S: BuildHasher,
    E: KeyEq<K>,
    X: Selector<K, D>,
    A: RawAllocator + Default,
{
    fn extend<I: IntoIterator<Item = D>>(&mut self, iter: I) {
        for data in iter {
            self.emplace(data);
        }
    }
}

impl<K, D, S, E, X, A> FromIterator<D> for HashTable<K, D, S, E, X, A>
where
    K: Hash,
    S: BuildHasher + Default,
    E: KeyEq<K> + Default,
    X: Selector<K, D> + Default,
    A: RawAllocator + Default,
{
    fn from_iter<I: IntoIterator<Item = D>>(iter: I) -> Self {
        let mut table = Self::default();
        table.extend(iter);
        table
    }
}

impl<'a, K, D, S, E, X, A: RawAllocator> IntoIterator for &'a HashTable<K, D, S, E, X, A> {
    type Item = &'a D;
    type IntoIter = Iter<'a, D>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, D, S, E, X, A: RawAllocator> IntoIterator for &'a mut HashTable<K, D, S, E, X, A> {
    type Item = &'a mut D;
    type IntoIter = IterMut<'a, D>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, D, S, E, X, A: RawAllocator> IntoIterator for HashTable<K, D, S, E, X, A> {
    type Item = D;
    type IntoIter = IntoIter<D, A>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.slots.into_iter(), self.len)
    }
}
