/// A bucket of the table: empty, or holding an entry together with its probe sequence length.
///
/// The probe sequence length (`psl`) is the distance from the entry's home bucket, counted in
/// buckets with wrap-around.
#[derive(Clone, Debug, Default)]
pub(crate) enum Slot<D> {
    #[default]
    Empty,
    Occupied { psl: usize, data: D },
}

impl<D> Slot<D> {
    #[inline]
    pub fn is_occupied(&self) -> bool {
        matches!(self, Slot::Occupied { .. })
    }

    /// Returns the probe sequence length, or `None` for an empty bucket.
    #[inline]
    pub fn psl(&self) -> Option<usize> {
        match self {
            Slot::Empty => None,
            Slot::Occupied { psl, .. } => Some(*psl),
        }
    }

    #[inline]
    pub fn data(&self) -> Option<&D> {
        match self {
            Slot::Empty => None,
            Slot::Occupied { data, .. } => Some(data),
        }
    }

    #[inline]
    pub fn data_mut(&mut self) -> Option<&mut D> {
        match self {
            Slot::Empty => None,
            Slot::Occupied { data, .. } => Some(data),
        }
    }

    #[inline]
    pub fn into_data(self) -> Option<D> {
        match self {
            Slot::Empty => None,
            Slot::Occupied { data, .. } => Some(data),
        }
    }
}
