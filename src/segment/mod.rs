//! Segments: an integer tape carved into ordered, disjoint, colored patches.

pub mod morphism;

use std::cell::Cell;
use std::collections::HashSet;
use std::fmt::Display;
use std::hash::{Hash, Hasher};

use quickcheck::Arbitrary;

use crate::Color;

/// A closed interval of tape positions `[start, end]`, with `start <= end`.
/// Patches are the fundamental grouping unit of a [`SegmentObject`]: a
/// maximal stretch of positions sharing one color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Patch {
    start: usize,
    end: usize,
}

impl Patch {
    /// Create a patch covering `start` to `end`, both included.
    /// Panics if `start > end`: patches are never empty.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(start <= end, "patch start {} exceeds end {}", start, end);
        Patch { start, end }
    }

    /// The patch covering a single position.
    pub fn singleton(position: usize) -> Self {
        Patch {
            start: position,
            end: position,
        }
    }

    /// The first position of the patch.
    pub fn start(&self) -> usize {
        self.start
    }

    /// The last position of the patch.
    pub fn end(&self) -> usize {
        self.end
    }

    /// The number of positions covered.
    ///
    /// # Examples
    /// ```
    /// use segcat::Patch;
    /// assert_eq!(Patch::new(2, 5).len(), 4);
    /// assert_eq!(Patch::singleton(7).len(), 1);
    /// ```
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Does the patch cover `position`?
    pub fn contains(&self, position: usize) -> bool {
        self.start <= position && position <= self.end
    }

    /// Does `next` begin exactly one position after this patch ends, with no
    /// gap in between?
    ///
    /// # Examples
    /// ```
    /// use segcat::Patch;
    /// assert!(Patch::new(0, 2).adjacent(&Patch::new(3, 4)));
    /// assert!(!Patch::new(0, 2).adjacent(&Patch::new(4, 4)));
    /// ```
    pub fn adjacent(&self, next: &Patch) -> bool {
        self.end + 1 == next.start
    }
}

impl PartialOrd for Patch {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Patch {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.start.cmp(&other.start) {
            std::cmp::Ordering::Equal => self.end.cmp(&other.end),
            ordering => ordering,
        }
    }
}

impl Display for Patch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.start, self.end)
    }
}

/// How [`SegmentObject::remove`] interprets its indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// Indices are patch indices into the topology.
    Patches,
    /// Indices are tape positions, resolved through
    /// [`patch`](SegmentObject::patch) first.
    Nodes,
}

/// A segment over a preordered color set: a tape of `domain` positions
/// carved into ordered, pairwise disjoint patches, each carrying one color.
/// Positions covered by no patch are masked.
///
/// A segment also carries a cursor remembering the last patch touched by
/// [`patch`](SegmentObject::patch). The cursor is a search accelerator, not
/// part of the identity of the segment: equality, hashing, and display all
/// ignore it.
///
/// # Examples
/// ```
/// use segcat::{Color, Patch, SegmentObject};
///
/// let segment = SegmentObject::new(
///     7,
///     vec![Patch::new(0, 1), Patch::new(4, 5)],
///     vec![Color::Known('a'), Color::Known('b')],
/// );
/// assert_eq!(segment.patch(1), Some(0));
/// assert_eq!(segment.patch(2), None);
/// assert_eq!(segment.patch(5), Some(1));
/// assert_eq!(segment.patch(9), None);
/// ```
#[derive(Debug, Clone)]
pub struct SegmentObject<T> {
    domain: usize,
    topology: Vec<Patch>,
    colors: Vec<Color<T>>,
    cursor: Cell<usize>,
}

impl<T> SegmentObject<T> {
    /// Create a segment from its tape length, patches, and colors.
    ///
    /// Panics unless there is exactly one color per patch and the domain can
    /// hold the patches. Patches must be sorted, pairwise disjoint, and end
    /// within the domain.
    pub fn new(domain: usize, topology: Vec<Patch>, colors: Vec<Color<T>>) -> Self {
        assert_eq!(
            colors.len(),
            topology.len(),
            "one color per patch: got {} colors for {} patches",
            colors.len(),
            topology.len()
        );
        assert!(
            domain >= topology.len(),
            "domain {} cannot hold {} disjoint patches",
            domain,
            topology.len()
        );
        let segment = SegmentObject {
            domain,
            topology,
            colors,
            cursor: Cell::new(0),
        };
        debug_assert!(
            segment.valid(),
            "patches must be sorted, disjoint, and within the domain"
        );
        segment
    }

    /// The number of tape positions.
    pub fn domain(&self) -> usize {
        self.domain
    }

    /// The patches, sorted by start position.
    pub fn topology(&self) -> &[Patch] {
        &self.topology
    }

    /// The patch colors, one per patch.
    pub fn colors(&self) -> &[Color<T>] {
        &self.colors
    }

    fn valid(&self) -> bool {
        self.topology
            .iter()
            .zip(self.topology.iter().skip(1))
            .all(|(p, q)| p.end() < q.start())
            && self.topology.last().map_or(true, |p| p.end() < self.domain)
    }

    /// The index of the patch covering `position`, or `None` if the position
    /// is masked or outside the tape.
    ///
    /// The search starts from the cursor left by the previous call and walks
    /// outward only as far as the sortedness of the topology requires, so a
    /// monotone sequence of lookups costs amortized constant time per call.
    pub fn patch(&self, position: usize) -> Option<usize> {
        if position >= self.domain || self.topology.is_empty() {
            return None;
        }
        let mut i = self.cursor.get().min(self.topology.len() - 1);
        while self.topology[i].end() < position {
            if i + 1 == self.topology.len() {
                self.cursor.set(i);
                return None;
            }
            i += 1;
        }
        while position < self.topology[i].start() && i > 0 {
            i -= 1;
        }
        self.cursor.set(i);
        if self.topology[i].contains(position) {
            Some(i)
        } else {
            None
        }
    }

    /// Does `other` carve its tape into exactly the same patches, whatever
    /// the colors?
    pub fn homologous(&self, other: &SegmentObject<T>) -> bool {
        self.topology == other.topology
    }
}

impl<T: Clone> SegmentObject<T> {
    /// Merge runs of patches according to a tiling of the patch list, and
    /// return the merged segment. The receiver is left untouched.
    ///
    /// Each window `(start, group_size, end)` of `folding_format` covers the
    /// patch indices `start..=end`; inside a window, consecutive runs of
    /// `group_size` patches (aligned to the window start, the last run
    /// possibly shorter) collapse into a single patch spanning from the
    /// first to the last patch of the run. The color of the merged patch is
    /// the `infimum`-fold of the colors in the run. A run whose color
    /// resolves to `Masked`, either because two of its patches were
    /// separated by a gap of the tape or because its colors have no common
    /// lower bound, is erased from the topology altogether. Patches outside
    /// every window pass through unchanged.
    ///
    /// Windows must be given in increasing order with positive group sizes.
    ///
    /// # Examples
    /// ```
    /// use segcat::{Color, Patch, Proset, SegmentObject};
    ///
    /// let mut order = Proset::new(
    ///     [('a', vec!['c']), ('b', vec!['c']), ('c', vec![])],
    ///     false,
    /// );
    /// order.close();
    /// let segment = SegmentObject::new(
    ///     4,
    ///     (0..4).map(Patch::singleton).collect(),
    ///     vec![
    ///         Color::Known('a'),
    ///         Color::Known('b'),
    ///         Color::Known('c'),
    ///         Color::Known('c'),
    ///     ],
    /// );
    /// let merged = segment.merge(&[(0, 2, 3)], |x, y| order.inf(x, y));
    /// assert_eq!(merged.topology(), &[Patch::new(0, 1), Patch::new(2, 3)]);
    /// assert_eq!(merged.colors(), &[Color::Known('c'), Color::Known('c')]);
    /// ```
    pub fn merge<F>(&self, folding_format: &[(usize, usize, usize)], infimum: F) -> SegmentObject<T>
    where
        F: Fn(&Color<T>, &Color<T>) -> Color<T>,
    {
        let mut new_topology = Vec::new();
        let mut new_colors = Vec::new();
        let mut next = 0;
        for &(start, group_size, end) in folding_format {
            assert!(group_size > 0, "group size must be positive");
            let window_start = start.max(next).min(self.topology.len());
            for i in next..window_start {
                new_topology.push(self.topology[i]);
                new_colors.push(self.colors[i].clone());
            }
            if window_start == self.topology.len() {
                next = window_start;
                break;
            }
            let window_end = (end + 1).max(window_start).min(self.topology.len());
            let mut run_start = 0;
            let mut run_color = None;
            for i in window_start..window_end {
                let patch = self.topology[i];
                if (i - window_start) % group_size == 0 {
                    run_start = patch.start();
                    run_color = Some(self.colors[i].clone());
                } else {
                    let so_far = run_color.take().expect("run in progress");
                    // A gap between two patches folded together erases the
                    // whole run, and erasure is final.
                    let gapped = !self.topology[i - 1].adjacent(&patch);
                    run_color = Some(if gapped || so_far.is_masked() {
                        Color::Masked
                    } else {
                        infimum(&self.colors[i], &so_far)
                    });
                }
                if (i - window_start) % group_size == group_size - 1 || i == window_end - 1 {
                    let color = run_color.take().expect("run in progress");
                    if !color.is_masked() {
                        new_topology.push(Patch::new(run_start, patch.end()));
                        new_colors.push(color);
                    }
                }
            }
            next = window_end;
        }
        for i in next..self.topology.len() {
            new_topology.push(self.topology[i]);
            new_colors.push(self.colors[i].clone());
        }
        SegmentObject::new(self.domain, new_topology, new_colors)
    }

    /// Return the segment with the given patches removed; the receiver is
    /// left untouched and the tape length is unchanged, so the removed
    /// stretches become masked.
    ///
    /// With [`Removal::Patches`] the indices address the topology directly;
    /// with [`Removal::Nodes`] they are tape positions resolved through
    /// [`patch`](SegmentObject::patch) first. Indices that are out of range,
    /// already masked, or repeated are silently ignored.
    ///
    /// # Examples
    /// ```
    /// use segcat::{Color, Patch, Removal, SegmentObject};
    ///
    /// let segment = SegmentObject::new(
    ///     6,
    ///     vec![Patch::new(0, 1), Patch::new(2, 3), Patch::new(4, 5)],
    ///     vec![Color::Known(1), Color::Known(2), Color::Known(3)],
    /// );
    /// let trimmed = segment.remove(&[1, 9], Removal::Patches);
    /// assert_eq!(trimmed.topology(), &[Patch::new(0, 1), Patch::new(4, 5)]);
    /// let same = segment.remove(&[2, 3], Removal::Nodes);
    /// assert_eq!(trimmed, same);
    /// ```
    pub fn remove(&self, indices: &[usize], mode: Removal) -> SegmentObject<T> {
        let removed: HashSet<usize> = match mode {
            Removal::Patches => indices
                .iter()
                .copied()
                .filter(|&i| i < self.topology.len())
                .collect(),
            Removal::Nodes => indices
                .iter()
                .filter_map(|&position| self.patch(position))
                .collect(),
        };
        let (new_topology, new_colors) = self
            .topology
            .iter()
            .zip(self.colors.iter())
            .enumerate()
            .filter(|(i, _)| !removed.contains(i))
            .map(|(_, (patch, color))| (*patch, color.clone()))
            .unzip();
        SegmentObject::new(self.domain, new_topology, new_colors)
    }
}

/// Structural equality: same tape length, same patches, same colors. The
/// cursor never takes part.
impl<T: PartialEq> PartialEq for SegmentObject<T> {
    fn eq(&self, other: &Self) -> bool {
        self.domain == other.domain
            && self.topology == other.topology
            && self.colors == other.colors
    }
}

impl<T: Eq> Eq for SegmentObject<T> {}

impl<T: Hash> Hash for SegmentObject<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.domain.hash(state);
        self.topology.hash(state);
        self.colors.hash(state);
    }
}

/// Render the tape: `o` per position, `|` at patch boundaries, long masked
/// stretches at either end compressed to `o-N-o`. A debugging aid, not a
/// stable format.
///
/// # Examples
/// ```
/// use segcat::{Color, Patch, SegmentObject};
///
/// let segment = SegmentObject::new(
///     6,
///     vec![Patch::new(0, 1), Patch::new(4, 5)],
///     vec![Color::Known('a'), Color::Known('b')],
/// );
/// assert_eq!(segment.to_string(), "(oo|oo|oo|)");
/// ```
impl<T> Display for SegmentObject<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn nodes(f: &mut std::fmt::Formatter<'_>, count: usize) -> std::fmt::Result {
            if count > 10 {
                write!(f, "o-{}-o", count - 2)
            } else {
                for _ in 0..count {
                    write!(f, "o")?;
                }
                Ok(())
            }
        }

        write!(f, "(")?;
        if self.topology.is_empty() {
            return write!(f, ")");
        }
        let first = self.topology[0].start();
        nodes(f, first)?;
        if first > 0 {
            write!(f, "|")?;
        }
        for (i, patch) in self.topology.iter().enumerate() {
            if i > 0 {
                write!(f, "|")?;
                let gap = patch.start() - self.topology[i - 1].end() - 1;
                if gap > 0 {
                    nodes(f, gap)?;
                    write!(f, "|")?;
                }
            }
            nodes(f, patch.len())?;
        }
        write!(f, "|")?;
        nodes(f, self.domain - 1 - self.topology[self.topology.len() - 1].end())?;
        write!(f, ")")
    }
}

impl<T: Arbitrary> Arbitrary for SegmentObject<T> {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        let domain = usize::arbitrary(g) % 24 + 1;
        let mut topology = Vec::new();
        let mut position = 0;
        while position < domain {
            if u8::arbitrary(g) % 3 == 0 {
                position += 1;
            } else {
                let len = usize::arbitrary(g) % 4 + 1;
                let end = (position + len - 1).min(domain - 1);
                topology.push(Patch::new(position, end));
                position = end + 1;
            }
        }
        let colors = topology.iter().map(|_| Color::arbitrary(g)).collect();
        SegmentObject::new(domain, topology, colors)
    }
}
