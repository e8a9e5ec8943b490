//! Token-to-value traversal.

mod machine;

use tk_reflect::{Reflect, TypeInfo};
use tk_token::{Token, TokenSink};

use self::machine::UnmarshalRow;
use crate::atlas::Atlas;
use crate::error::Error;
use crate::options::{Options, UnknownFieldPolicy};
use crate::resolve::resolve;
use crate::slab::{Outcome, Slab};

// -----------------------------------------------------------------------------
// Unmarshaller

/// Fills a target value from a token stream, one token per step.
///
/// Struct members absent from the stream keep their current contents.
/// Sequences and maps are cleared when their opening token arrives, and
/// absent indirections are allocated with a default pointee the first time
/// a non-null token reaches them.
///
/// The unmarshaller is a [`TokenSink`].
pub struct Unmarshaller<'a> {
    atlas: &'a Atlas,
    root: &'a mut dyn Reflect,
    slab: Slab<UnmarshalRow<'a>>,
    unknown_fields: UnknownFieldPolicy,
    started: bool,
}

fn navigate<'r>(root: &'r mut dyn Reflect, rows: &'r mut [UnmarshalRow<'_>]) -> &'r mut dyn Reflect {
    let mut value = root;
    for row in rows {
        value = row.select(value);
    }
    value
}

impl<'a> Unmarshaller<'a> {
    #[inline]
    pub fn new(atlas: &'a Atlas, target: &'a mut dyn Reflect) -> Self {
        Self::with_options(atlas, target, Options::default())
    }

    pub fn with_options(atlas: &'a Atlas, target: &'a mut dyn Reflect, options: Options) -> Self {
        Self {
            atlas,
            root: target,
            slab: Slab::new("unmarshal", options.max_depth),
            unknown_fields: options.unknown_fields,
            started: false,
        }
    }

    /// Starts over on a new target, keeping the grown slab.
    pub fn reset(&mut self, target: &'a mut dyn Reflect) {
        self.slab.clear();
        self.root = target;
        self.started = false;
    }

    /// Current nesting depth.
    #[inline]
    pub fn depth(&self) -> usize {
        self.slab.depth()
    }

    /// Consumes `token`.
    ///
    /// Returns `true` when that token completes the target value.
    ///
    /// # Panics
    ///
    /// Panics if called again after the value was completed, unless the
    /// unmarshaller was [`reset`](Unmarshaller::reset) in between.
    pub fn step(&mut self, token: &Token) -> Result<bool, Error> {
        if !self.started {
            self.started = true;
            let type_info = self.root.reflect_type_info();
            self.requisition(type_info)?;
        }
        assert!(!self.slab.is_empty(), "unmarshaller stepped after completing its value");

        loop {
            let (below, top) = self.slab.split_top();
            let value = navigate(&mut *self.root, below);
            match top.step(value, token, self.unknown_fields)? {
                Outcome::Continue => return Ok(false),
                Outcome::Done => return self.unwind(),
                Outcome::Recurse(child) => self.requisition(child)?,
            }
        }
    }

    fn requisition(&mut self, type_info: TypeInfo) -> Result<(), Error> {
        self.slab.requisition(resolve(self.atlas, type_info))?;
        Ok(())
    }

    // Pops the finished top row and every parent it finished along with it.
    fn unwind(&mut self) -> Result<bool, Error> {
        loop {
            self.slab.release(self.slab.depth() - 1);
            if self.slab.is_empty() {
                return Ok(true);
            }
            let (below, top) = self.slab.split_top();
            let value = navigate(&mut *self.root, below);
            if !top.child_done(value)? {
                return Ok(false);
            }
        }
    }
}

impl TokenSink for Unmarshaller<'_> {
    type Error = Error;

    #[inline]
    fn step(&mut self, token: &Token) -> Result<bool, Error> {
        Unmarshaller::step(self, token)
    }
}

// -----------------------------------------------------------------------------
// Tests
