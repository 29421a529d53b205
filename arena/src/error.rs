//! Allocation error type.

use std::alloc::Layout;
use std::error::Error;
use std::fmt;

/// Errors reported by a [`RawAllocator`](crate::RawAllocator).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// The requested size and alignment do not form a valid [`Layout`].
    InvalidLayout {
        /// Number of bytes requested.
        size: usize,
        /// Requested alignment in bytes.
        align: usize,
    },
    /// The underlying memory source could not satisfy the request.
    Exhausted {
        /// Layout of the request that failed.
        layout: Layout,
    },
}

impl AllocError {
    pub(crate) fn exhausted(layout: Layout) -> Self {
        Self::Exhausted { layout }
    }

    /// Aborts the process via [`std::alloc::handle_alloc_error`] for exhausted memory, or panics
    /// for an invalid layout.
    ///
    /// This is the fail-fast path taken by containers whose operation has no way to report the
    /// error to its caller.
    pub fn handle(self) -> ! {
        match self {
            Self::Exhausted { layout } => std::alloc::handle_alloc_error(layout),
            Self::InvalidLayout { .. } => panic!("{self}"),
        }
    }
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLayout { size, align } => {
                write!(f, "invalid allocation layout: {size} bytes aligned to {align}")
            }
            Self::Exhausted { layout } => {
                write!(
                    f,
                    "memory exhausted allocating {} bytes aligned to {}",
                    layout.size(),
                    layout.align()
                )
            }
        }
    }
}

impl Error for AllocError {}
