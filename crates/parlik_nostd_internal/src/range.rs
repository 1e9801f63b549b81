//! Index ranges & the policy for partitioning them
//!
//! A reduction covers an inclusive range of indices `[start, end]`. By
//! convention the indices are 1-based (that's what the likelihood callbacks
//! expect), but nothing in here cares.
//!
//! We partition a range by recursive binary bisection: a range whose length
//! exceeds the grain size is split into a left half holding `len / 2`
//! indices and a right half holding the rest. A range whose length doesn't
//! exceed the grain size is a _leaf_. Because every backend walks the same
//! tree, they all hand identical leaves to the callback.

use core::num::NonZeroUsize;

/// An inclusive range of indices, `[start, end]`.
///
/// An instance always holds at least 1 index (we do the error-checking in
/// the constructor so that nothing downstream has to).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexRange {
    start: usize,
    end: usize,
}

#[allow(clippy::len_without_is_empty)] // an IndexRange is never empty
impl IndexRange {
    pub fn new(start: usize, end: usize) -> Result<IndexRange, &'static str> {
        if start > end {
            Err("the start of an index range must not exceed its end")
        } else if (end - start) == usize::MAX {
            Err("an index range can't hold more than usize::MAX indices")
        } else {
            Ok(IndexRange { start, end })
        }
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    /// the number of indices in the range
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        (self.start <= index) && (index <= self.end)
    }

    /// Splits `self` in two if it is longer than `grain`.
    ///
    /// Returns `None` when `self` is a leaf. Otherwise, the left half holds
    /// `self.len() / 2` indices and the right half holds the remainder (both
    /// halves are non-empty since `self.len() > grain >= 1`).
    pub fn bisect(&self, grain: GrainSize) -> Option<(IndexRange, IndexRange)> {
        let len = self.len();
        if len <= grain.get() {
            None
        } else {
            let mid = self.start + len / 2;
            Some((
                IndexRange {
                    start: self.start,
                    end: mid - 1,
                },
                IndexRange {
                    start: mid,
                    end: self.end,
                },
            ))
        }
    }

    /// The number of leaves that bisection produces for `grain`.
    ///
    /// This doesn't walk the whole tree. At any depth of the bisection tree,
    /// the pending ranges hold either `⌊L/2ᵏ⌋` or `⌈L/2ᵏ⌉` indices, so we
    /// just track how many ranges have each of (at most) 2 lengths.
    pub fn n_leaves(&self, grain: GrainSize) -> usize {
        // each entry is (length, count). A count of 0 marks an unused slot
        let mut pending: [(usize, usize); 2] = [(self.len(), 1), (0, 0)];
        let mut n_leaves = 0;
        while pending[0].1 + pending[1].1 > 0 {
            let mut next: [(usize, usize); 2] = [(0, 0); 2];
            for (len, count) in pending {
                if count == 0 {
                    continue;
                } else if len <= grain.get() {
                    n_leaves += count;
                } else {
                    tally_length(&mut next, len / 2, count);
                    tally_length(&mut next, len - len / 2, count);
                }
            }
            pending = next;
        }
        n_leaves
    }
}

fn tally_length(slots: &mut [(usize, usize); 2], len: usize, count: usize) {
    for slot in slots.iter_mut() {
        if slot.1 == 0 {
            *slot = (len, count);
            return;
        } else if slot.0 == len {
            slot.1 += count;
            return;
        }
    }
    unreachable!("a level of the bisection tree can't hold more than 2 distinct lengths")
}

/// The maximum number of indices that a single leaf may hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GrainSize(NonZeroUsize);

impl GrainSize {
    pub fn new(grain: usize) -> Result<GrainSize, &'static str> {
        NonZeroUsize::new(grain)
            .map(GrainSize)
            .ok_or("the grain size must be positive")
    }

    #[inline(always)]
    pub fn get(&self) -> usize {
        self.0.get()
    }
}

impl From<NonZeroUsize> for GrainSize {
    fn from(value: NonZeroUsize) -> Self {
        GrainSize(value)
    }
}

/// Sequentially visits each leaf of `range`, from left to right.
///
/// Stops at (and returns) the first error reported by `visit`.
pub fn visit_leaves<E>(
    range: IndexRange,
    grain: GrainSize,
    visit: &mut impl FnMut(IndexRange) -> Result<(), E>,
) -> Result<(), E> {
    match range.bisect(grain) {
        None => visit(range),
        Some((left, right)) => {
            visit_leaves(left, grain, visit)?;
            visit_leaves(right, grain, visit)
        }
    }
}
