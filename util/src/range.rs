//! Normalisation of `RangeBounds` arguments.
use std::ops::{Bound, Range, RangeBounds};

/// Converts `range` into a half-open `Range` and checks it against `len`.
///
/// Unlike slicing, an empty range starting at `len` is accepted, so `len..` can be used to name
/// the end position.
///
/// Panics if the range is inverted or extends past `len`.
pub fn simplify_range(range: impl RangeBounds<usize>, len: usize) -> Range<usize> {
    let lower = match range.start_bound() {
        Bound::Unbounded => 0,
        Bound::Included(&n) => n,
        Bound::Excluded(&n) => n.checked_add(1).expect("start point of range too large"),
    };
    let upper = match range.end_bound() {
        Bound::Unbounded => len,
        Bound::Included(&n) => n.checked_add(1).expect("end point of range too large"),
        Bound::Excluded(&n) => n,
    };
    assert!(upper <= len, "end point {upper} of range is > length {len}");
    assert!(
        lower <= upper,
        "start point {lower} is larger than end point {upper}"
    );
    lower..upper
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds() {
        assert_eq!(simplify_range(.., 5), 0..5);
        assert_eq!(simplify_range(1..=3, 5), 1..4);
        assert_eq!(simplify_range(5.., 5), 5..5);
        assert_eq!(simplify_range((Bound::Excluded(0), Bound::Unbounded), 3), 1..3);
    }

    #[test]
    #[should_panic(expected = "end point 6 of range is > length 5")]
    fn past_end() {
        simplify_range(0..6, 5);
    }

    #[test]
    #[should_panic(expected = "larger than end point")]
    fn inverted() {
        #[allow(clippy::reversed_empty_ranges)]
        simplify_range(3..2, 5);
    }
}
