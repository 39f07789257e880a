//! Structure-preserving maps between segments.

use crate::segment::SegmentObject;
use crate::Color;

/// The node map of a morphism of segments: either the identity on the tape,
/// or an explicit image per position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DomainMap {
    /// Every position maps to itself. Only valid between segments of equal
    /// domain.
    Identity,
    /// Position `i` maps to the `i`-th entry.
    Explicit(Vec<usize>),
}

impl DomainMap {
    /// The image of `position`. Panics if an explicit map does not cover it.
    pub fn apply(&self, position: usize) -> usize {
        match self {
            DomainMap::Identity => position,
            DomainMap::Explicit(images) => images[position],
        }
    }
}

/// A morphism of segments: a map between the tapes of a source and a target
/// segment that sends patches onto patches and never increases colors.
///
/// Construction never fails; instead [`defined`](MorphismOfSegments::defined)
/// records whether the data actually forms a morphism. Three things are
/// checked, in order:
///
/// 1. the node map fits the tapes (equal domains force the identity; the
///    identity requires equal domains; an explicit map must cover exactly the
///    source tape and stay within the target tape);
/// 2. patches map consistently: a masked source position must land on a
///    masked target position, and all positions of one source patch must land
///    in one target patch (or all outside every patch);
/// 3. colors do not increase: each mapped patch's color must satisfy
///    `geq(source color, target color)` for the supplied comparison.
///
/// The induced patch map is exposed as [`f0`](MorphismOfSegments::f0); on a
/// rejected morphism it holds the partial image computed before the first
/// violation, never a wrong total one.
///
/// # Examples
/// ```
/// use segcat::{Color, DomainMap, MorphismOfSegments, Patch, Proset, SegmentObject};
///
/// let mut order = Proset::new([('a', vec!['b'])], false);
/// order.close();
///
/// // Two singleton patches folding onto one wide patch of a lower color.
/// let source = SegmentObject::new(
///     2,
///     vec![Patch::new(0, 0), Patch::new(1, 1)],
///     vec![Color::Known('a'), Color::Known('a')],
/// );
/// let target = SegmentObject::new(
///     2,
///     vec![Patch::new(0, 1)],
///     vec![Color::Known('b')],
/// );
/// let morphism = MorphismOfSegments::new(&source, &target, DomainMap::Identity, |x, y| {
///     order.geq(x, y)
/// });
/// assert!(morphism.defined());
/// assert_eq!(morphism.f0(), &[Some(0), Some(0)]);
/// ```
#[derive(Debug, Clone)]
pub struct MorphismOfSegments<'a, T> {
    source: &'a SegmentObject<T>,
    target: &'a SegmentObject<T>,
    f1: DomainMap,
    f0: Vec<Option<usize>>,
    defined: bool,
}

impl<'a, T> MorphismOfSegments<'a, T> {
    /// Check whether `f1` induces a morphism from `source` to `target` under
    /// the color comparison `geq`, and record the result.
    pub fn new<G>(
        source: &'a SegmentObject<T>,
        target: &'a SegmentObject<T>,
        f1: DomainMap,
        geq: G,
    ) -> Self
    where
        G: Fn(&Color<T>, &Color<T>) -> bool,
    {
        let mut morphism = MorphismOfSegments {
            source,
            target,
            f1,
            f0: Vec::new(),
            defined: false,
        };
        morphism.defined = morphism.check(geq);
        morphism
    }

    fn check<G>(&mut self, geq: G) -> bool
    where
        G: Fn(&Color<T>, &Color<T>) -> bool,
    {
        if self.source.domain() == self.target.domain() {
            self.f1 = DomainMap::Identity;
        } else {
            match &self.f1 {
                DomainMap::Identity => return false,
                DomainMap::Explicit(images) => {
                    if images.len() != self.source.domain() {
                        return false;
                    }
                    if images.iter().any(|&j| j >= self.target.domain()) {
                        return false;
                    }
                }
            }
        }

        // Pair every source position's patch with its image's patch, and
        // require the pairing to be a function of the source patch.
        self.f0 = vec![None; self.source.topology().len()];
        let mut assigned = vec![false; self.source.topology().len()];
        for i in 0..self.source.domain() {
            let source_patch = self.source.patch(i);
            let target_patch = self.target.patch(self.f1.apply(i));
            match source_patch {
                None => {
                    // Masked positions must stay masked.
                    if target_patch.is_some() {
                        return false;
                    }
                }
                Some(p) => {
                    if assigned[p] {
                        if self.f0[p] != target_patch {
                            return false;
                        }
                    } else {
                        assigned[p] = true;
                        self.f0[p] = target_patch;
                    }
                }
            }
        }

        // Colors must not increase from source to target.
        for (p, image) in self.f0.iter().enumerate() {
            if let Some(q) = *image {
                if !geq(&self.source.colors()[p], &self.target.colors()[q]) {
                    return false;
                }
            }
        }
        true
    }

    /// Whether the data forms a morphism.
    pub fn defined(&self) -> bool {
        self.defined
    }

    /// The induced patch map: entry `p` is the target patch that source
    /// patch `p` lands in, or `None` when it lands outside every patch.
    pub fn f0(&self) -> &[Option<usize>] {
        &self.f0
    }

    /// The node map, normalized to `Identity` when the domains coincide.
    pub fn f1(&self) -> &DomainMap {
        &self.f1
    }

    /// The image of a tape position under the node map.
    pub fn apply(&self, position: usize) -> usize {
        self.f1.apply(position)
    }

    /// The source segment.
    pub fn source(&self) -> &SegmentObject<T> {
        self.source
    }

    /// The target segment.
    pub fn target(&self) -> &SegmentObject<T> {
        self.target
    }
}
