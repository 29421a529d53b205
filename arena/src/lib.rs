//! Raw memory providers for hoard's containers.
//!
//! Containers never talk to the global allocator directly. Instead they own a value implementing
//! [`RawAllocator`] and request untyped blocks from it, which lets callers swap in a pooling
//! strategy without touching container logic:
//!
//! * [`Global`] forwards to the process-wide allocator.
//! * [`PageArena`] gives every allocation its own self-describing page and can release pages
//!   individually.
//! * [`BumpArena`] carves allocations out of large pages and only reclaims memory in bulk, via
//!   [`BumpArena::reset`] or when dropped.
//!
//! None of these types are thread-safe in the sense of allowing shared mutation; they are `Send`
//! but every operation takes `&mut self`.
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(missing_docs)]

mod bump_arena;
mod error;
mod page_arena;
mod raw;
mod ring;

pub use bump_arena::BumpArena;
pub use error::AllocError;
pub use page_arena::PageArena;
pub use raw::{AllocatorStats, Global, RawAllocator};
