//! Customization points for key equality and key selection.
use std::borrow::Borrow;

/// Equality predicate on keys of type `Q`.
///
/// Keys that compare equal must also hash equal under the table's hasher.
pub trait KeyEq<Q: ?Sized> {
    /// Returns `true` if `a` and `b` denote the same key.
    fn key_eq(&self, a: &Q, b: &Q) -> bool;
}

/// Compares keys with their `Eq` implementation.
#[derive(Clone, Copy, Default, Debug)]
pub struct DefaultEq;

impl<Q: Eq + ?Sized> KeyEq<Q> for DefaultEq {
    #[inline]
    fn key_eq(&self, a: &Q, b: &Q) -> bool {
        a == b
    }
}

/// Extracts the key of type `K` from a stored element of type `D`.
pub trait Selector<K: ?Sized, D> {
    /// Returns the key of `data`.
    fn select<'a>(&self, data: &'a D) -> &'a K;
}

/// Uses the whole element as its key, as a set does.
#[derive(Clone, Copy, Default, Debug)]
pub struct Identity;

impl<T> Selector<T, T> for Identity {
    #[inline]
    fn select<'a>(&self, data: &'a T) -> &'a T {
        data
    }
}

/// Uses the first component of a pair as its key, as a map does.
#[derive(Clone, Copy, Default, Debug)]
pub struct PairKey;

impl<K, V> Selector<K, (K, V)> for PairKey {
    #[inline]
    fn select<'a>(&self, data: &'a (K, V)) -> &'a K {
        &data.0
    }
}

/// Compares a stored key against a borrowed lookup key.
#[inline]
pub(crate) fn key_matches<K, Q, E>(eq: &E, stored: &K, key: &Q) -> bool
where
    K: Borrow<Q>,
    Q: ?Sized,
    E: KeyEq<Q>,
{
    eq.key_eq(stored.borrow(), key)
}
