//! hoard - Shared Utility Code
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(missing_docs)]

pub mod hash;
pub mod range;

/// Forwards the core `Iterator` methods of a wrapper type to its `inner` field.
///
/// The optional argument is applied to every yielded item.
#[macro_export]
macro_rules! impl_iterator {
    () => {
        $crate::impl_iterator!(|x| x);
    };
    ($f: expr) => {
        fn next(&mut self) -> Option<Self::Item> {
            self.inner.next().map($f)
        }
        fn size_hint(&self) -> (usize, Option<usize>) {
            self.inner.size_hint()
        }
        fn count(self) -> usize {
            self.inner.count()
        }
        fn nth(&mut self, n: usize) -> Option<Self::Item> {
            self.inner.nth(n).map($f)
        }
        fn last(self) -> Option<Self::Item> {
            self.inner.last().map($f)
        }
    };
}

/// Forwards `next_back` of a wrapper type to its `inner` field.
#[macro_export]
macro_rules! impl_double_ended_iterator {
    () => {
        $crate::impl_double_ended_iterator!(|x| x);
    };
    ($f: expr) => {
        fn next_back(&mut self) -> Option<Self::Item> {
            self.inner.next_back().map($f)
        }
    };
}
