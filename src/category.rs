//! The category whose objects are segments over a fixed preorder and whose
//! arrows are morphisms of segments.

use std::hash::Hash;

use itertools::Itertools;

use crate::proset::Proset;
use crate::segment::morphism::{DomainMap, MorphismOfSegments};
use crate::segment::{Patch, SegmentObject};
use crate::Color;

/// All strictly increasing maps from `{0, .., domain - 1}` into
/// `{0, .., codomain - 1}`, enumerated lazily in lexicographic order of the
/// chosen index sets. The sequence is empty when `domain > codomain`, and
/// holds the single empty map when `domain` is zero.
///
/// The number of maps is `C(codomain, domain)`; callers enumerating them pay
/// that combinatorial price.
///
/// # Examples
/// ```
/// use segcat::category::monotone_injections;
///
/// let maps: Vec<Vec<usize>> = monotone_injections(2, 4).collect();
/// assert_eq!(
///     maps,
///     vec![
///         vec![0, 1], vec![0, 2], vec![0, 3],
///         vec![1, 2], vec![1, 3], vec![2, 3],
///     ],
/// );
/// ```
pub fn monotone_injections(domain: usize, codomain: usize) -> impl Iterator<Item = Vec<usize>> {
    (0..codomain).combinations(domain)
}

/// The category of segments over one preordered color set.
///
/// The category owns nothing but its preorder: it classifies, builds, and
/// relates segments handed to it by the caller.
///
/// # Examples
/// ```
/// use segcat::{CategoryOfSegments, Color, Proset};
///
/// let mut order = Proset::new([('a', vec![])], false);
/// order.close();
/// let category = CategoryOfSegments::new(order);
///
/// let source = category.initial(2, Color::Known('a'));
/// let target = category.initial(4, Color::Known('a'));
/// // One morphism per strictly increasing injection: C(4, 2) of them.
/// assert_eq!(category.homset(&source, &target).len(), 6);
/// ```
#[derive(Debug, Clone)]
pub struct CategoryOfSegments<T> {
    proset: Proset<T>,
}

impl<T: Clone + Eq + Hash> CategoryOfSegments<T> {
    /// Build the category over the given preorder. The preorder must be
    /// closed before hom-sets of colored segments are computed.
    pub fn new(proset: Proset<T>) -> Self {
        CategoryOfSegments { proset }
    }

    /// The underlying preorder.
    pub fn proset(&self) -> &Proset<T> {
        &self.proset
    }

    /// Is there an identity morphism between these two objects? True exactly
    /// when the segments are structurally equal (same domain, same topology,
    /// same colors), wherever they live and whatever their cursor state.
    pub fn identity(&self, s1: &SegmentObject<T>, s2: &SegmentObject<T>) -> bool {
        s1 == s2
    }

    /// The discrete segment on `domain` positions: one singleton patch per
    /// position, all colored `color`. Initial among the segments of that
    /// color in the sense that it maps into every segment its color
    /// dominates.
    ///
    /// # Examples
    /// ```
    /// use segcat::{CategoryOfSegments, Color, Proset};
    ///
    /// let mut order = Proset::new([('a', vec![])], false);
    /// order.close();
    /// let category = CategoryOfSegments::new(order);
    /// let discrete = category.initial(3, Color::Known('a'));
    /// for i in 0..3 {
    ///     assert_eq!(discrete.patch(i), Some(i));
    /// }
    /// ```
    pub fn initial(&self, domain: usize, color: Color<T>) -> SegmentObject<T> {
        let topology = (0..domain).map(Patch::singleton).collect();
        let colors = (0..domain).map(|_| color.clone()).collect();
        SegmentObject::new(domain, topology, colors)
    }

    /// The hom-set from `source` to `target`: every strictly increasing
    /// injection of the source tape into the target tape that induces a
    /// well-defined, color-respecting morphism.
    ///
    /// Empty when the target tape is shorter than the source tape. The
    /// candidates are enumerated in the lexicographic order of
    /// [`monotone_injections`], and the returned morphisms keep that order.
    pub fn homset<'a>(
        &self,
        source: &'a SegmentObject<T>,
        target: &'a SegmentObject<T>,
    ) -> Vec<MorphismOfSegments<'a, T>> {
        if target.domain() < source.domain() {
            return Vec::new();
        }
        monotone_injections(source.domain(), target.domain())
            .map(|images| {
                MorphismOfSegments::new(source, target, DomainMap::Explicit(images), |x, y| {
                    self.proset.geq(x, y)
                })
            })
            .filter(|morphism| morphism.defined())
            .collect()
    }
}
