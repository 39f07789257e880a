//! Finite preordered label sets: dominance tables, transitive closure,
//! comparison, infimum, and lazy Cartesian powers.

use std::collections::VecDeque;
use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;

use crate::Color;

/// A tuple label of a [`PowerProset`].
pub type Word<T> = SmallVec<[Color<T>; 4]>;

/// A finite preordered set: a label set with a reflexive, transitive
/// relation `geq(x, y)` read as "`x` succeeds `y`".
///
/// Internally each label maps to the set of labels it dominates, itself
/// included. The table handed to [`new`](Proset::new) only needs the direct
/// dominations; [`close`](Proset::close) completes it transitively and must
/// run before any comparison.
///
/// # Examples
/// ```
/// use segcat::{Color, Proset};
///
/// // The diamond 4 >= 2 >= 1, 4 >= 3 >= 1.
/// let mut order = Proset::new(
///     [(4, vec![2, 3]), (2, vec![1]), (3, vec![1]), (1, vec![])],
///     false,
/// );
/// order.close();
/// assert!(order.geq(&Color::Known(4), &Color::Known(1)));
/// assert!(!order.geq(&Color::Known(2), &Color::Known(3)));
/// assert_eq!(order.inf(&Color::Known(2), &Color::Known(3)), Color::Known(1));
/// ```
#[derive(Debug, Clone)]
pub struct Proset<T> {
    relations: IndexMap<T, IndexSet<T>>,
    transitive: bool,
    mask: bool,
}

impl<T: Clone + Eq + Hash> Proset<T> {
    /// Build a preorder from a table mapping each label to the labels it
    /// directly dominates.
    ///
    /// Reflexivity is seeded here: every key dominates itself, and a label
    /// appearing only on the right-hand side of the table becomes a key with
    /// a singleton dominance set. `mask` records that the label space
    /// carries an erasure element (see [`Color`]).
    pub fn new<I, J>(relations: I, mask: bool) -> Self
    where
        I: IntoIterator<Item = (T, J)>,
        J: IntoIterator<Item = T>,
    {
        let mut table: IndexMap<T, IndexSet<T>> = IndexMap::new();
        for (label, dominated) in relations {
            let entry = table.entry(label.clone()).or_default();
            entry.insert(label);
            for d in dominated {
                entry.insert(d);
            }
        }
        let mentioned: Vec<T> = table
            .values()
            .flat_map(|dominated| dominated.iter().cloned())
            .collect();
        for label in mentioned {
            let entry = table.entry(label.clone()).or_default();
            entry.insert(label);
        }
        Proset {
            relations: table,
            transitive: false,
            mask,
        }
    }

    /// Whether the label space carries an erasure element.
    pub fn masking(&self) -> bool {
        self.mask
    }

    /// Whether [`close`](Proset::close) has run.
    pub fn is_closed(&self) -> bool {
        self.transitive
    }

    /// The number of labels.
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    /// Returns `true` if the preorder has no labels.
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// An iterator over the labels, in insertion order.
    pub fn labels(&self) -> impl Iterator<Item = &T> + '_ {
        self.relations.keys()
    }

    /// Does `label` belong to this preordered set?
    pub fn contains(&self, label: &T) -> bool {
        self.relations.contains_key(label)
    }

    /// Complete the dominance table transitively: for each label, absorb the
    /// dominance set of every label it dominates, until nothing new appears.
    ///
    /// Terminates because the label set is finite and sets only grow;
    /// idempotent, and a repeated call is a cheap no-op.
    pub fn close(&mut self) {
        if self.transitive {
            return;
        }
        self.transitive = true;
        let labels: Vec<T> = self.relations.keys().cloned().collect();
        for label in &labels {
            let mut queue: VecDeque<T> = self.relations[label].iter().cloned().collect();
            while let Some(below) = queue.pop_front() {
                if below == *label {
                    continue;
                }
                let absorbed: Vec<T> = match self.relations.get(&below) {
                    Some(dominated) => dominated.iter().cloned().collect(),
                    None => continue,
                };
                let dominated = self
                    .relations
                    .get_mut(label)
                    .expect("label is a key of the table");
                for d in absorbed {
                    if dominated.insert(d.clone()) {
                        queue.push_back(d);
                    }
                }
            }
        }
    }

    fn dominates(&self, x: &T, y: &T) -> bool {
        self.relations.get(x).map_or(false, |dominated| dominated.contains(y))
    }

    /// Is `x` greater than or equal to `y`?
    ///
    /// A `Masked` second argument is trivially satisfied; a `Masked` first
    /// argument dominates nothing but `Masked`. Labels absent from the set
    /// dominate nothing.
    ///
    /// Panics if the preorder has not been closed.
    ///
    /// # Examples
    /// ```
    /// use segcat::{Color, Proset};
    ///
    /// let mut order = Proset::new([('a', vec!['b'])], false);
    /// order.close();
    /// assert!(order.geq(&Color::Known('a'), &Color::Known('b')));
    /// assert!(order.geq(&Color::Known('b'), &Color::Masked));
    /// assert!(!order.geq(&Color::Masked, &Color::Known('b')));
    /// ```
    pub fn geq(&self, x: &Color<T>, y: &Color<T>) -> bool {
        assert!(self.transitive, "preorder must be closed before comparison");
        match (x, y) {
            (_, Color::Masked) => true,
            (Color::Masked, Color::Known(_)) => false,
            (Color::Known(a), Color::Known(b)) => self.dominates(a, b),
        }
    }

    /// The greater of `x` and `y`: `x` whenever `geq(x, y)` holds, `y`
    /// otherwise. Left-biased on ties, which is what makes
    /// [`inf`](Proset::inf) deterministic.
    pub fn max<'c>(&self, x: &'c Color<T>, y: &'c Color<T>) -> &'c Color<T> {
        if self.geq(x, y) {
            x
        } else {
            y
        }
    }

    /// The infimum of `x` and `y`: the greatest element common to both
    /// dominance sets.
    ///
    /// Returns `Masked` when either argument is `Masked`, when either label
    /// is absent from the set, or when the dominance sets do not intersect.
    /// The intersection is reduced by [`max`](Proset::max) in the insertion
    /// order of `x`'s dominance set, so between equivalent candidates the
    /// earliest one wins.
    ///
    /// Panics if the preorder has not been closed.
    ///
    /// # Examples
    /// ```
    /// use segcat::{Color, Proset};
    ///
    /// let mut order = Proset::new(
    ///     [(4, vec![2, 3]), (2, vec![1]), (3, vec![1]), (1, vec![])],
    ///     false,
    /// );
    /// order.close();
    /// assert_eq!(order.inf(&Color::Known(2), &Color::Known(3)), Color::Known(1));
    /// assert_eq!(order.inf(&Color::Known(4), &Color::Known(2)), Color::Known(2));
    /// assert_eq!(order.inf(&Color::Known(1), &Color::Known(9)), Color::Masked);
    /// assert_eq!(order.inf(&Color::Known(1), &Color::Masked), Color::Masked);
    /// ```
    pub fn inf(&self, x: &Color<T>, y: &Color<T>) -> Color<T> {
        assert!(self.transitive, "preorder must be closed before taking infima");
        let (a, b) = match (x, y) {
            (Color::Known(a), Color::Known(b)) => (a, b),
            _ => return Color::Masked,
        };
        let (below_a, below_b) = match (self.relations.get(a), self.relations.get(b)) {
            (Some(below_a), Some(below_b)) => (below_a, below_b),
            _ => return Color::Masked,
        };
        let mut best: Option<&T> = None;
        for candidate in below_a {
            if !below_b.contains(candidate) {
                continue;
            }
            best = Some(match best {
                None => candidate,
                Some(current) if self.dominates(current, candidate) => current,
                Some(_) => candidate,
            });
        }
        match best {
            Some(greatest) => Color::Known(greatest.clone()),
            None => Color::Masked,
        }
    }

    /// The `arity`-fold Cartesian power of this preorder, compared
    /// componentwise. The power is a lazy view: no product relation table is
    /// materialized.
    ///
    /// Panics if `arity` is zero.
    pub fn pow(&self, arity: usize) -> PowerProset<'_, T> {
        assert!(arity > 0, "arity must be positive");
        PowerProset { base: self, arity }
    }
}

/// A Cartesian power of a [`Proset`], whose labels are `arity`-tuples of
/// colors of the base preorder related componentwise.
///
/// A `Masked` component on the right-hand side of [`geq`](PowerProset::geq)
/// satisfies that coordinate regardless of the left-hand side, matching the
/// scalar rule on [`Color`].
///
/// # Examples
/// ```
/// use segcat::{Color, Proset};
///
/// let mut order = Proset::new([('a', vec!['b'])], false);
/// order.close();
/// let square = order.pow(2);
/// let ab = [Color::Known('a'), Color::Known('b')];
/// let bb = [Color::Known('b'), Color::Known('b')];
/// let bm = [Color::Known('b'), Color::Masked];
/// assert!(square.geq(&ab, &bb));
/// assert!(!square.geq(&bb, &ab));
/// assert!(square.geq(&bb, &bm));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PowerProset<'a, T> {
    base: &'a Proset<T>,
    arity: usize,
}

impl<'a, T: Clone + Eq + Hash> PowerProset<'a, T> {
    /// The tuple length of this power.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// The underlying preorder.
    pub fn base(&self) -> &Proset<T> {
        self.base
    }

    /// Does `word` belong to the power, i.e. is it an `arity`-tuple of
    /// labels of the base set?
    pub fn contains(&self, word: &[T]) -> bool {
        word.len() == self.arity && word.iter().all(|label| self.base.contains(label))
    }

    /// Componentwise comparison of two tuples.
    ///
    /// Panics if either tuple has the wrong length or the base preorder has
    /// not been closed.
    pub fn geq(&self, x: &[Color<T>], y: &[Color<T>]) -> bool {
        assert_eq!(x.len(), self.arity, "tuple length must equal the arity");
        assert_eq!(y.len(), self.arity, "tuple length must equal the arity");
        x.iter().zip(y.iter()).all(|(a, b)| self.base.geq(a, b))
    }

    /// Componentwise infimum of two tuples.
    ///
    /// Panics if either tuple has the wrong length or the base preorder has
    /// not been closed.
    pub fn inf(&self, x: &[Color<T>], y: &[Color<T>]) -> Word<T> {
        assert_eq!(x.len(), self.arity, "tuple length must equal the arity");
        assert_eq!(y.len(), self.arity, "tuple length must equal the arity");
        x.iter().zip(y.iter()).map(|(a, b)| self.base.inf(a, b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;

    use super::*;

    fn diamond() -> Proset<u8> {
        let mut order = Proset::new(
            [(4, vec![2, 3]), (2, vec![1]), (3, vec![1]), (1, vec![])],
            false,
        );
        order.close();
        order
    }

    fn known(x: u8) -> Color<u8> {
        Color::Known(x)
    }

    #[test]
    fn test_reflexivity_is_seeded() {
        let mut order = Proset::new([('x', vec!['y'])], false);
        order.close();
        // 'y' never appears as a key in the input table.
        assert!(order.contains(&'y'));
        assert!(order.geq(&Color::Known('y'), &Color::Known('y')));
    }

    #[test]
    fn test_close_reaches_two_step_relations() {
        let mut order = Proset::new([('a', vec!['b']), ('b', vec!['c'])], false);
        assert!(!order.is_closed());
        order.close();
        assert!(order.is_closed());
        assert!(order.geq(&Color::Known('a'), &Color::Known('c')));
        assert!(!order.geq(&Color::Known('c'), &Color::Known('a')));
    }

    #[test]
    #[should_panic(expected = "closed")]
    fn test_geq_requires_closure() {
        let order = Proset::new([(1u8, vec![0])], false);
        order.geq(&known(1), &known(0));
    }

    #[test]
    fn test_geq_mask_rules() {
        let order = diamond();
        assert!(order.geq(&known(1), &Color::Masked));
        assert!(order.geq(&Color::Masked, &Color::Masked));
        assert!(!order.geq(&Color::Masked, &known(1)));
        // Absent labels dominate nothing.
        assert!(!order.geq(&known(9), &known(1)));
    }

    #[test]
    fn test_max_is_left_biased() {
        let order = diamond();
        assert_eq!(order.max(&known(4), &known(2)), &known(4));
        assert_eq!(order.max(&known(2), &known(4)), &known(4));
        // Incomparable pair: the right argument wins by fallthrough.
        assert_eq!(order.max(&known(2), &known(3)), &known(3));
        assert_eq!(order.max(&known(2), &known(2)), &known(2));
    }

    #[test]
    fn test_inf_diamond() {
        let order = diamond();
        assert_eq!(order.inf(&known(2), &known(3)), known(1));
        assert_eq!(order.inf(&known(4), &known(3)), known(3));
        assert_eq!(order.inf(&known(4), &known(4)), known(4));
    }

    #[test]
    fn test_inf_masks_when_incomparable_or_absent() {
        // Two maximal elements with nothing below in common.
        let mut order = Proset::new([('a', vec![]), ('b', vec![])], true);
        order.close();
        assert!(order.masking());
        assert_eq!(order.inf(&Color::Known('a'), &Color::Known('b')), Color::Masked);
        assert_eq!(order.inf(&Color::Known('a'), &Color::Known('z')), Color::Masked);
        assert_eq!(order.inf(&Color::Masked, &Color::Known('a')), Color::Masked);
    }

    #[test]
    fn test_inf_prefers_earliest_equivalent_candidate() {
        // 'x' and 'y' are equivalent (each dominates the other), and both lie
        // below 'a' and 'b'. The winner is the one inserted first for the
        // left-hand argument.
        let mut order = Proset::new(
            [
                ('a', vec!['x', 'y']),
                ('b', vec!['x', 'y']),
                ('x', vec!['y']),
                ('y', vec!['x']),
            ],
            false,
        );
        order.close();
        assert_eq!(order.inf(&Color::Known('a'), &Color::Known('b')), Color::Known('x'));
    }

    #[test]
    fn test_labels_and_len() {
        let order = diamond();
        assert_eq!(order.len(), 4);
        assert!(!order.is_empty());
        let labels: Vec<u8> = order.labels().copied().collect();
        assert_eq!(labels, vec![4, 2, 3, 1]);
    }

    #[test]
    #[should_panic(expected = "positive")]
    fn test_pow_rejects_zero_arity() {
        diamond().pow(0);
    }

    #[test]
    fn test_power_componentwise() {
        let order = diamond();
        let square = order.pow(2);
        assert_eq!(square.arity(), 2);
        assert_eq!(square.base().len(), order.len());
        assert!(square.geq(&[known(4), known(2)], &[known(2), known(1)]));
        assert!(!square.geq(&[known(4), known(1)], &[known(2), known(2)]));
        assert!(square.geq(&[known(1), known(1)], &[known(1), Color::Masked]));
        assert_eq!(
            square.inf(&[known(2), known(4)], &[known(3), known(2)]).to_vec(),
            vec![known(1), known(2)],
        );
        assert!(square.contains(&[4, 1]));
        assert!(!square.contains(&[4, 9]));
        assert!(!square.contains(&[4, 1, 1]));
    }

    fn from_raw(pairs: &[(u8, Vec<u8>)]) -> Proset<u8> {
        let table: Vec<(u8, Vec<u8>)> = pairs
            .iter()
            .map(|(label, dominated)| {
                (*label % 6, dominated.iter().map(|d| d % 6).collect())
            })
            .collect();
        let mut order = Proset::new(table, false);
        order.close();
        order
    }

    #[quickcheck]
    fn closed_relation_is_reflexive(pairs: Vec<(u8, Vec<u8>)>) -> bool {
        let order = from_raw(&pairs);
        let labels: Vec<u8> = order.labels().copied().collect();
        labels
            .iter()
            .all(|a| order.geq(&Color::Known(*a), &Color::Known(*a)))
    }

    #[quickcheck]
    fn closed_relation_is_transitive(pairs: Vec<(u8, Vec<u8>)>) -> bool {
        let order = from_raw(&pairs);
        let labels: Vec<u8> = order.labels().copied().collect();
        labels.iter().all(|a| {
            labels.iter().all(|b| {
                labels.iter().all(|c| {
                    !(order.geq(&Color::Known(*a), &Color::Known(*b))
                        && order.geq(&Color::Known(*b), &Color::Known(*c)))
                        || order.geq(&Color::Known(*a), &Color::Known(*c))
                })
            })
        })
    }

    #[quickcheck]
    fn close_is_idempotent(pairs: Vec<(u8, Vec<u8>)>) -> bool {
        let mut order = from_raw(&pairs);
        let before: Vec<(u8, Vec<u8>)> = order
            .labels()
            .map(|a| (*a, order.relations[a].iter().copied().collect()))
            .collect();
        order.close();
        let after: Vec<(u8, Vec<u8>)> = order
            .labels()
            .map(|a| (*a, order.relations[a].iter().copied().collect()))
            .collect();
        before == after
    }

    #[quickcheck]
    fn inf_is_a_common_lower_bound(pairs: Vec<(u8, Vec<u8>)>, x: u8, y: u8) -> bool {
        let order = from_raw(&pairs);
        let (x, y) = (Color::Known(x % 6), Color::Known(y % 6));
        match order.inf(&x, &y) {
            Color::Masked => true,
            lower => order.geq(&x, &lower) && order.geq(&y, &lower),
        }
    }
}
