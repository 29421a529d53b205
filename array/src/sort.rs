/// Sorts `items` in place, ascending with respect to `is_less`.
///
/// Unsorted partitions are kept on an explicit work list. The smaller half of every split is
/// processed first, which bounds the list to a logarithmic number of entries.
pub(crate) fn quicksort<T>(items: &mut [T], is_less: &mut impl FnMut(&T, &T) -> bool) {
    if items.len() < 2 {
        return;
    }

    // Inclusive bounds.
    let mut pending = vec![(0, items.len() - 1)];

    while let Some((lo, hi)) = pending.pop() {
        if lo >= hi {
            continue;
        }
        let split = partition(items, lo, hi, is_less);
        let lower = (lo, split);
        let upper = (split + 1, hi);
        if split - lo < hi - split {
            pending.push(upper);
            pending.push(lower);
        } else {
            pending.push(lower);
            pending.push(upper);
        }
    }
}

/// Hoare partition of `items[lo..=hi]` around its middle element.
///
/// Returns `split` with `lo <= split < hi` such that no element in `lo..=split` is greater than
/// any element in `split + 1..=hi`.
fn partition<T>(
    items: &mut [T],
    lo: usize,
    hi: usize,
    is_less: &mut impl FnMut(&T, &T) -> bool,
) -> usize {
    // The pivot element moves along with the swaps, so track where it is.
    let mut pivot = lo + (hi - lo) / 2;
    let mut i = lo;
    let mut j = hi;

    loop {
        while is_less(&items[i], &items[pivot]) {
            i += 1;
        }
        while is_less(&items[pivot], &items[j]) {
            j -= 1;
        }
        if i >= j {
            return j;
        }

        items.swap(i, j);
        if pivot == i {
            pivot = j;
        } else if pivot == j {
            pivot = i;
        }

        i += 1;
        j -= 1;
    }
}

#[cfg(test)]
mod tests {
    use rand::prelude::*;
    use rand_pcg::Pcg64;

    use super::*;

    fn check_against_std(mut items: Vec<u32>) {
        let mut expected = items.clone();
        expected.sort_unstable();
        quicksort(&mut items, &mut |a, b| a < b);
        assert_eq!(items, expected);
    }

    #[test]
    fn trivial_inputs() {
        check_against_std(vec![]);
        check_against_std(vec![7]);
        check_against_std(vec![2, 1]);
        check_against_std(vec![1, 2]);
        check_against_std(vec![3, 3, 3]);
    }

    #[test]
    fn presorted_inputs() {
        check_against_std((0..1000).collect());
        check_against_std((0..1000).rev().collect());
        check_against_std((0..1000).map(|i| i % 2).collect());
    }

    #[test]
    fn random_inputs() {
        let mut rng = Pcg64::seed_from_u64(25);

        for _ in 0..200 {
            let len = rng.gen_range(0..300);
            let range = rng.gen_range(1..50);
            check_against_std((0..len).map(|_| rng.gen_range(0..range)).collect());
        }
    }

    #[test]
    fn descending_order() {
        let mut items = vec![4, 9, 1, 7, 7, 0];
        quicksort(&mut items, &mut |a, b| a > b);
        assert_eq!(items, [9, 7, 7, 4, 1, 0]);
    }
}
