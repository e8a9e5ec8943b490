/// What an unmarshaller does with a map key that names no atlas field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownFieldPolicy {
    /// Fail with [`Error::UnknownField`](crate::Error::UnknownField).
    #[default]
    Error,
    /// Consume and discard the value that follows the key.
    Skip,
}

/// Engine configuration.
///
/// Both engines accept the same options; the unknown-field policy only
/// matters when unmarshalling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Maximum number of nested machines on the slab.
    pub max_depth: usize,
    pub unknown_fields: UnknownFieldPolicy,
}

impl Options {
    pub const DEFAULT_MAX_DEPTH: usize = 1024;

    #[inline]
    pub const fn new() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            unknown_fields: UnknownFieldPolicy::Error,
        }
    }

    #[inline]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[inline]
    pub const fn with_unknown_fields(mut self, policy: UnknownFieldPolicy) -> Self {
        self.unknown_fields = policy;
        self
    }
}

impl Default for Options {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
