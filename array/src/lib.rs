//! A contiguous, growable array whose buffer comes from a pluggable [`RawAllocator`].
//!
//! [`GrowableArray`] is the storage layer underneath hoard's hash table, but is equally usable on
//! its own. It behaves much like `Vec`, with a few deliberate differences:
//!
//! * The allocator is a type parameter owned by value, so an array can draw its memory from a
//!   [`PageArena`](hoard_arena::PageArena) or [`BumpArena`](hoard_arena::BumpArena).
//! * Growth doubles the capacity, starting at [`MIN_CAPACITY`].
//! * [`reserve`](GrowableArray::reserve) takes the desired total capacity, not an additional count.
//! * Positions are plain indices. Every operation that reallocates or shifts elements (growth,
//!   insertion, erasure) invalidates previously computed positions and references; the borrow
//!   checker enforces this for references, callers are responsible for indices.
//!
//! [`RawAllocator`]: hoard_arena::RawAllocator
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(missing_docs)]

mod error;
mod growable_array;
mod into_iter;
mod sort;

mod test_array;

pub use error::TryReserveError;
pub use growable_array::{GrowableArray, MIN_CAPACITY};
pub use into_iter::IntoIter;
