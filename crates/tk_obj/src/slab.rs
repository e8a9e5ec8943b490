//! Stack-disciplined storage for the rows of an in-progress traversal.

use alloc::vec::Vec;

use tk_reflect::TypeInfo;

use crate::error::Error;
use crate::resolve::Resolution;

// -----------------------------------------------------------------------------
// Outcome

/// What a machine asks of its driver after one step.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Outcome {
    /// The machine needs more steps.
    Continue,
    /// The machine's value is complete.
    Done,
    /// A child value of this type starts here; the driver pushes a row for
    /// it and steps that row with the same token.
    Recurse(TypeInfo),
}

/// A slab row: one machine plus the state its kind needs.
pub(crate) trait Row<'a> {
    fn new(resolution: Resolution<'a>) -> Self;

    /// Re-initializes a released row, keeping its allocations.
    fn reset(&mut self, resolution: Resolution<'a>);
}

// -----------------------------------------------------------------------------
// Slab

/// A stack of rows indexed by nesting depth.
///
/// Rows are handed out and released strictly last-in first-out. Released
/// rows stay allocated and are re-initialized on their next use, so a
/// traversal only allocates when it reaches a depth it has never reached
/// before.
pub(crate) struct Slab<R> {
    rows: Vec<R>,
    active: usize,
    max_depth: usize,
    name: &'static str,
}

impl<R> Slab<R> {
    pub(crate) const fn new(name: &'static str, max_depth: usize) -> Self {
        Self {
            rows: Vec::new(),
            active: 0,
            max_depth,
            name,
        }
    }

    /// Number of rows in use.
    #[inline]
    pub(crate) const fn depth(&self) -> usize {
        self.active
    }

    #[inline]
    pub(crate) const fn is_empty(&self) -> bool {
        self.active == 0
    }

    /// Releases every row at once.
    #[inline]
    pub(crate) fn clear(&mut self) {
        self.active = 0;
    }

    /// Hands out the next row, initialized from `resolution`.
    ///
    /// Returns the row's depth, which is later given back to [`release`].
    ///
    /// [`release`]: Slab::release
    pub(crate) fn requisition<'a>(&mut self, resolution: Resolution<'a>) -> Result<usize, Error>
    where
        R: Row<'a>,
    {
        if self.active >= self.max_depth {
            return Err(Error::DepthExceeded(self.max_depth));
        }

        let depth = self.active;
        if let Some(row) = self.rows.get_mut(depth) {
            row.reset(resolution);
        } else {
            self.rows.push(R::new(resolution));
            log::trace!("{} slab grew to {} rows", self.name, self.rows.len());
        }
        self.active += 1;
        Ok(depth)
    }

    /// Gives back the row at `depth`, which must be the most recent one.
    #[track_caller]
    pub(crate) fn release(&mut self, depth: usize) {
        assert!(
            depth + 1 == self.active,
            "{} slab row {depth} released out of order ({} rows active)",
            self.name,
            self.active,
        );
        self.active = depth;
    }

    /// Splits the active rows into the ones below the top and the top.
    ///
    /// # Panics
    ///
    /// Panics if no row is active.
    #[track_caller]
    pub(crate) fn split_top(&mut self) -> (&mut [R], &mut R) {
        match self.rows[..self.active].split_last_mut() {
            Some((top, below)) => (below, top),
            None => panic!("{} slab has no active row", self.name),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
