pub mod category;
pub mod partition;
pub mod pointed;
pub mod proset;
pub mod segment;

use std::fmt::Display;

use quickcheck::Arbitrary;

pub use category::CategoryOfSegments;
pub use partition::Partition;
pub use pointed::PointedSet;
pub use proset::{PowerProset, Proset, Word};
pub use segment::morphism::{DomainMap, MorphismOfSegments};
pub use segment::{Patch, Removal, SegmentObject};

/// A color drawn from a preordered label set, or the absence of one.
///
/// `Masked` stands for "erased / wildcard / no information" and propagates
/// inertly through color computations: the infimum of anything with `Masked`
/// is `Masked`, and a masked patch produced by [`SegmentObject::merge`]
/// disappears from the topology instead of being kept with a bogus label.
///
/// A `Masked` *second* argument satisfies [`Proset::geq`] trivially (there is
/// no requirement against an erased target), while a `Masked` first argument
/// dominates nothing but `Masked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color<T> {
    /// An actual label of the preordered set.
    Known(T),
    /// The erased color.
    Masked,
}

impl<T> Color<T> {
    /// Returns `true` if this color is the erased color.
    ///
    /// # Examples
    /// ```
    /// use segcat::Color;
    /// assert!(Color::<char>::Masked.is_masked());
    /// assert!(!Color::Known('a').is_masked());
    /// ```
    pub fn is_masked(&self) -> bool {
        matches!(self, Color::Masked)
    }

    /// Returns the underlying label, if there is one.
    ///
    /// # Examples
    /// ```
    /// use segcat::Color;
    /// assert_eq!(Color::Known('a').known(), Some(&'a'));
    /// assert_eq!(Color::<char>::Masked.known(), None);
    /// ```
    pub fn known(&self) -> Option<&T> {
        match self {
            Color::Known(label) => Some(label),
            Color::Masked => None,
        }
    }
}

impl<T> From<T> for Color<T> {
    fn from(label: T) -> Self {
        Color::Known(label)
    }
}

impl<T: Display> Display for Color<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::Known(label) => write!(f, "{}", label),
            Color::Masked => write!(f, "*"),
        }
    }
}

impl<T: Arbitrary> Arbitrary for Color<T> {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        if u8::arbitrary(g) % 4 == 0 {
            Color::Masked
        } else {
            Color::Known(T::arbitrary(g))
        }
    }
}
