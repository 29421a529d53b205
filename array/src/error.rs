//! Capacity reservation errors.

use std::error::Error;
use std::fmt;

use hoard_arena::AllocError;

/// Error returned by [`GrowableArray::try_reserve`](crate::GrowableArray::try_reserve).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TryReserveError {
    /// The requested capacity does not fit in a valid allocation layout.
    CapacityOverflow,
    /// The allocator failed to provide the buffer.
    Alloc(AllocError),
}

impl TryReserveError {
    /// Fails fast: panics on overflow, aborts via the allocation error handler otherwise.
    pub fn handle(self) -> ! {
        match self {
            Self::CapacityOverflow => panic!("capacity overflow"),
            Self::Alloc(err) => err.handle(),
        }
    }
}

impl From<AllocError> for TryReserveError {
    fn from(err: AllocError) -> Self {
        Self::Alloc(err)
    }
}

impl fmt::Display for TryReserveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityOverflow => write!(f, "capacity overflow"),
            Self::Alloc(err) => write!(f, "buffer allocation failed: {err}"),
        }
    }
}

impl Error for TryReserveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CapacityOverflow => None,
            Self::Alloc(err) => Some(err),
        }
    }
}
