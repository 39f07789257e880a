//! Partitions of a finite index set, and the partition algebra of plain
//! lists (image, canonical relabeling, fibers, product, coproduct).

use std::collections::HashMap;
use std::hash::Hash;

use bit_set::BitSet;
use itertools::Itertools;
use quickcheck::Arbitrary;

/// A partition of the universe `{0, .., size - 1}` into groups of indices.
///
/// The groups handed to the constructor may repeat elements and overlap each
/// other; [`close`](Partition::close) merges every pair of groups that share
/// an element until the groups are genuinely disjoint equivalence classes
/// covering the universe. [`quotient`](Partition::quotient) then labels each
/// element with the index of its class.
///
/// # Examples
/// ```
/// use segcat::Partition;
///
/// let mut partition = Partition::new(vec![vec![0, 3], vec![1, 4], vec![3, 1]], 5);
/// partition.close();
/// assert_eq!(partition.quotient(), vec![0, 0, 1, 0, 0]);
/// ```
#[derive(Debug, Clone)]
pub struct Partition {
    parts: Vec<Vec<usize>>,
    size: usize,
    closed: bool,
}

impl Partition {
    /// Create a partition of `{0, .., size - 1}` from raw groups.
    /// The groups may overlap and repeat elements; they become disjoint only
    /// after [`close`](Partition::close). Elements of the universe listed in
    /// no group are treated as singleton classes.
    ///
    /// Panics if a group is empty or mentions an element outside the universe.
    pub fn new(parts: Vec<Vec<usize>>, size: usize) -> Self {
        for part in &parts {
            assert!(!part.is_empty(), "parts must be non-empty");
            for &x in part {
                assert!(x < size, "element {} outside universe 0..{}", x, size);
            }
        }
        Partition {
            parts,
            size,
            closed: false,
        }
    }

    /// The discrete partition of `{0, .., m - 1}`: every element alone in its
    /// own class. Already closed.
    ///
    /// # Examples
    /// ```
    /// use segcat::Partition;
    /// assert_eq!(Partition::finest(3).quotient(), vec![0, 1, 2]);
    /// ```
    pub fn finest(m: usize) -> Self {
        Partition {
            parts: (0..m).map(|i| vec![i]).collect(),
            size: m,
            closed: true,
        }
    }

    /// The size of the underlying universe.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The current groups. Disjoint and covering only after
    /// [`close`](Partition::close).
    pub fn parts(&self) -> &[Vec<usize>] {
        &self.parts
    }

    /// Whether [`close`](Partition::close) has run.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Merge groups transitively until no two groups share an element.
    ///
    /// The result is the finest partition in which any two original groups
    /// with a common element land in the same class, i.e. the connected
    /// components of the hypergraph whose hyperedges are the groups. The
    /// outcome does not depend on the order of the groups. Universe elements
    /// listed in no group are appended as singleton classes, so the closed
    /// parts cover `0..size` exactly once. Idempotent.
    ///
    /// # Examples
    /// ```
    /// use segcat::Partition;
    ///
    /// let mut partition = Partition::new(
    ///     vec![vec![0, 3], vec![1, 4], vec![2], vec![0, 1], vec![2], vec![3], vec![4]],
    ///     5,
    /// );
    /// partition.close();
    /// assert_eq!(partition.parts(), &[vec![0, 1, 3, 4], vec![2]]);
    /// ```
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        let mut groups: Vec<BitSet> = self
            .parts
            .iter()
            .map(|part| {
                let mut group = BitSet::with_capacity(self.size);
                for &x in part {
                    group.insert(x);
                }
                group
            })
            .collect();
        // Absorb every later group intersecting group i into group i. Once
        // the scan at i finishes, group i is disjoint from all others: a
        // group that was disjoint from both i and j is disjoint from their
        // union, so no second pass is needed.
        let mut i = 0;
        while i < groups.len() {
            let mut j = i + 1;
            while j < groups.len() {
                if groups[i].is_disjoint(&groups[j]) {
                    j += 1;
                } else {
                    let absorbed = groups.swap_remove(j);
                    groups[i].union_with(&absorbed);
                    j = i + 1;
                }
            }
            i += 1;
        }
        let mut covered = BitSet::with_capacity(self.size);
        for group in &groups {
            covered.union_with(group);
        }
        self.parts = groups.iter().map(|group| group.iter().collect()).collect();
        for x in 0..self.size {
            if !covered.contains(x) {
                self.parts.push(vec![x]);
            }
        }
        self.closed = true;
    }

    /// The canonical labeling of the universe: entry `i` is the index of the
    /// class containing element `i`.
    ///
    /// Panics if the partition has not been closed (the labeling is only
    /// well defined once the classes are disjoint).
    ///
    /// # Examples
    /// ```
    /// use segcat::Partition;
    ///
    /// let mut partition = Partition::new(vec![vec![0, 2]], 5);
    /// partition.close();
    /// assert_eq!(partition.quotient(), vec![0, 1, 0, 2, 3]);
    /// ```
    pub fn quotient(&self) -> Vec<usize> {
        assert!(
            self.closed,
            "partition must be closed before taking the quotient"
        );
        let mut labels = vec![usize::MAX; self.size];
        for (class, part) in self.parts.iter().enumerate() {
            for &x in part {
                labels[x] = class;
            }
        }
        debug_assert!(labels.iter().all(|&label| label != usize::MAX));
        labels
    }
}

/// Two partitions are equal when they present the same groups, regardless of
/// the order of the groups or of the elements inside them.
impl PartialEq for Partition {
    fn eq(&self, other: &Self) -> bool {
        fn normalize(partition: &Partition) -> Vec<Vec<usize>> {
            let mut parts: Vec<Vec<usize>> = partition
                .parts
                .iter()
                .map(|part| {
                    let mut part: Vec<usize> = part.iter().copied().unique().collect();
                    part.sort_unstable();
                    part
                })
                .collect();
            parts.sort();
            parts
        }
        self.size == other.size && normalize(self) == normalize(other)
    }
}

impl Eq for Partition {}

impl Arbitrary for Partition {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        let size = usize::arbitrary(g) % 24 + 1;
        let count = usize::arbitrary(g) % 8;
        let parts = (0..count)
            .map(|_| {
                let len = usize::arbitrary(g) % 6 + 1;
                (0..len).map(|_| usize::arbitrary(g) % size).collect()
            })
            .collect();
        Partition::new(parts, size)
    }
}

/// The elements of `xs` that occur at least once, without repetition, in
/// first-occurrence order.
///
/// # Examples
/// ```
/// use segcat::partition::image;
/// assert_eq!(image(&[3, 3, 2, 1, 1, 2, 4]), vec![3, 2, 1, 4]);
/// ```
pub fn image<T: Clone + Eq + Hash>(xs: &[T]) -> Vec<T> {
    xs.iter().unique().cloned().collect()
}

/// Relabel the elements of a list with indices in order of first occurrence.
/// The first element always receives the label `0`, and the highest label is
/// the size of the list's [`image`] minus one.
///
/// # Examples
/// ```
/// use segcat::partition::canonicalize;
/// assert_eq!(canonicalize(&["A", "x", "C", "C", "a", "A"]), vec![0, 1, 2, 2, 3, 0]);
/// ```
pub fn canonicalize<T: Eq + Hash>(xs: &[T]) -> Vec<usize> {
    let mut labels: HashMap<&T, usize> = HashMap::new();
    xs.iter()
        .map(|x| {
            let next = labels.len();
            *labels.entry(x).or_insert(next)
        })
        .collect()
}

/// Group the indices of `xs` by the value they point at, in first-occurrence
/// order of the values. Each group is the fiber of one element of the
/// [`image`].
///
/// # Examples
/// ```
/// use segcat::partition::fibers;
/// assert_eq!(
///     fibers(&['a', 'a', 'b', 'b', 'c', 'c', 'a']),
///     vec![vec![0, 1, 6], vec![2, 3], vec![4, 5]],
/// );
/// ```
pub fn fibers<T: Eq + Hash>(xs: &[T]) -> Vec<Vec<usize>> {
    let mut map: indexmap::IndexMap<&T, Vec<usize>> = indexmap::IndexMap::new();
    for (i, x) in xs.iter().enumerate() {
        map.entry(x).or_default().push(i);
    }
    map.into_values().collect()
}

/// The product (meet) of two lists seen as partitions of their index set:
/// positions are identified when both lists agree on them. Returns the
/// canonical labeling of the zipped pairs.
///
/// Panics if the lengths differ.
///
/// # Examples
/// ```
/// use segcat::partition::product;
///
/// let xs: Vec<char> = "111123".chars().collect();
/// let ys: Vec<char> = "abcccc".chars().collect();
/// assert_eq!(product(&xs, &ys), vec![0, 1, 2, 2, 3, 4]);
/// ```
pub fn product<T: Eq + Hash, U: Eq + Hash>(xs: &[T], ys: &[U]) -> Vec<usize> {
    assert_eq!(xs.len(), ys.len(), "lengths must match");
    let pairs: Vec<(&T, &U)> = xs.iter().zip(ys.iter()).collect();
    canonicalize(&pairs)
}

/// The coproduct (join) of two lists seen as partitions of their index set:
/// positions are identified when either list identifies them, transitively.
/// The result is the canonically relabeled quotient of the closure of both
/// fiber families.
///
/// Panics if the lengths differ.
///
/// # Examples
/// ```
/// use segcat::partition::coproduct;
///
/// let xs: Vec<char> = "111123".chars().collect();
/// let ys: Vec<char> = "abcccc".chars().collect();
/// assert_eq!(coproduct(&xs, &ys), vec![0, 0, 0, 0, 0, 0]);
/// ```
pub fn coproduct<T: Eq + Hash, U: Eq + Hash>(xs: &[T], ys: &[U]) -> Vec<usize> {
    assert_eq!(xs.len(), ys.len(), "lengths must match");
    let mut parts = fibers(xs);
    parts.extend(fibers(ys));
    let mut join = Partition::new(parts, xs.len());
    join.close();
    canonicalize(&join.quotient())
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;
    use rand::seq::SliceRandom;

    use super::*;

    #[test]
    fn test_close_joins_transitively() {
        // [0,3] meets [0,1] and [3]; [0,1] meets [1,4]; [2] stays alone.
        let mut partition = Partition::new(
            vec![
                vec![0, 3],
                vec![1, 4],
                vec![2],
                vec![0, 1],
                vec![2],
                vec![3],
                vec![4],
            ],
            5,
        );
        partition.close();
        let expected = Partition::new(vec![vec![1, 4, 0, 3], vec![2]], 5);
        assert_eq!(partition, expected);
    }

    #[test]
    fn test_close_materializes_unlisted_singletons() {
        let mut partition = Partition::new(vec![vec![0, 2]], 5);
        partition.close();
        assert_eq!(
            partition.parts(),
            &[vec![0, 2], vec![1], vec![3], vec![4]],
        );
        assert_eq!(partition.quotient(), vec![0, 1, 0, 2, 3]);
    }

    #[test]
    fn test_close_empty_parts_list() {
        let mut partition = Partition::new(vec![], 3);
        partition.close();
        assert_eq!(partition.parts(), &[vec![0], vec![1], vec![2]]);
        assert_eq!(partition.quotient(), vec![0, 1, 2]);
    }

    #[test]
    fn test_finest_is_identity_labeling() {
        let partition = Partition::finest(4);
        assert!(partition.is_closed());
        assert_eq!(partition.quotient(), vec![0, 1, 2, 3]);
    }

    #[test]
    #[should_panic(expected = "outside universe")]
    fn test_new_rejects_out_of_universe() {
        Partition::new(vec![vec![0, 5]], 5);
    }

    #[test]
    #[should_panic(expected = "non-empty")]
    fn test_new_rejects_empty_part() {
        Partition::new(vec![vec![]], 5);
    }

    #[test]
    #[should_panic(expected = "closed")]
    fn test_quotient_requires_closure() {
        Partition::new(vec![vec![0, 1]], 3).quotient();
    }

    #[quickcheck]
    fn close_is_idempotent(mut partition: Partition) {
        partition.close();
        let once = partition.clone();
        partition.close();
        assert_eq!(partition, once);
        assert_eq!(partition.parts(), once.parts());
    }

    #[quickcheck]
    fn closed_parts_are_disjoint_and_cover(mut partition: Partition) {
        partition.close();
        let mut seen = vec![false; partition.size()];
        for part in partition.parts() {
            for &x in part {
                assert!(!seen[x], "element {} in two classes", x);
                seen[x] = true;
            }
        }
        assert!(seen.iter().all(|&covered| covered));
    }

    #[quickcheck]
    fn quotient_labels_respect_parts(mut partition: Partition) {
        partition.close();
        let labels = partition.quotient();
        assert_eq!(labels.len(), partition.size());
        for (class, part) in partition.parts().iter().enumerate() {
            assert!(part.iter().all(|&x| labels[x] == class));
        }
    }

    #[quickcheck]
    fn close_ignores_part_order(partition: Partition) {
        let mut shuffled = partition.clone();
        let mut rng = rand::rng();
        {
            let Partition { parts, .. } = &mut shuffled;
            parts.shuffle(&mut rng);
        }
        let mut a = partition;
        let mut b = shuffled;
        a.close();
        b.close();
        assert_eq!(a, b);
    }

    #[test]
    fn test_image_first_occurrence_order() {
        assert_eq!(image(&[3, 3, 2, 1, 1, 2, 4, 5, 6, 5, 2, 6]), vec![3, 2, 1, 4, 5, 6]);
        assert_eq!(image::<u8>(&[]), Vec::<u8>::new());
    }

    #[test]
    fn test_canonicalize_relabels_from_zero() {
        assert_eq!(canonicalize::<u8>(&[]), Vec::<usize>::new());
        assert_eq!(canonicalize(&[9, 9, 9]), vec![0, 0, 0]);
        assert_eq!(canonicalize(&['b', 'a', 'b', 'c']), vec![0, 1, 0, 2]);
    }

    #[test]
    fn test_fibers_partition_the_indices() {
        assert_eq!(
            fibers(&['a', 'a', 'b', 'b', 'c', 'c', 'a']),
            vec![vec![0, 1, 6], vec![2, 3], vec![4, 5]],
        );
    }

    #[test]
    fn test_product_refines_both_factors() {
        let xs: Vec<char> = "111123".chars().collect();
        let ys: Vec<char> = "abcccc".chars().collect();
        let meet = product(&xs, &ys);
        assert_eq!(meet, vec![0, 1, 2, 2, 3, 4]);
        // The meet never identifies positions that either factor separates.
        for i in 0..xs.len() {
            for j in 0..xs.len() {
                if meet[i] == meet[j] {
                    assert!(xs[i] == xs[j] && ys[i] == ys[j]);
                }
            }
        }
    }

    #[test]
    fn test_coproduct_joins_chains() {
        let xs: Vec<char> = "111123".chars().collect();
        let ys: Vec<char> = "abcccc".chars().collect();
        assert_eq!(coproduct(&xs, &ys), vec![0, 0, 0, 0, 0, 0]);
        // No chain between the halves of each list: two classes remain.
        assert_eq!(coproduct(&[0, 0, 1, 1], &[7, 7, 8, 8]), vec![0, 0, 1, 1]);
    }

    #[quickcheck]
    fn product_coarser_than_neither_factor(xs: Vec<u8>, ys: Vec<u8>) -> bool {
        let n = xs.len().min(ys.len());
        let meet = product(&xs[..n], &ys[..n]);
        (0..n).all(|i| (0..n).all(|j| meet[i] != meet[j] || xs[i] == xs[j]))
    }
}
