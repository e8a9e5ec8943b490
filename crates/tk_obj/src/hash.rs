//! Hash states for the atlas tables.
//!
//! `TypeId` keys are already well distributed; their words are folded into
//! the hash as-is. Field names go through `foldhash` with a fixed seed.

use core::hash::{BuildHasher, BuildHasherDefault, Hasher};

use foldhash::fast::{FixedState, FoldHasher};

pub(crate) type TypeIdMap<V> = hashbrown::HashMap<core::any::TypeId, V, TypeIdHashState>;
pub(crate) type NameMap<V> = hashbrown::HashMap<alloc::string::String, V, FixedHashState>;

// -----------------------------------------------------------------------------
// FixedHashState

const FIXED_HASH_STATE: FixedState = FixedState::with_seed(0x51F0_3A9C_D2E4_7B15);

#[derive(Copy, Clone, Default, Debug)]
pub(crate) struct FixedHashState;

impl BuildHasher for FixedHashState {
    type Hasher = FoldHasher<'static>;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        FIXED_HASH_STATE.build_hasher()
    }
}

// -----------------------------------------------------------------------------
// TypeIdHasher

pub(crate) type TypeIdHashState = BuildHasherDefault<TypeIdHasher>;

/// Folds the words a `TypeId` writes into the hash without mixing.
#[derive(Copy, Clone, Default, Debug)]
pub(crate) struct TypeIdHasher(u64);

impl Hasher for TypeIdHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.0
    }

    #[inline]
    fn write_u64(&mut self, word: u64) {
        self.0 ^= word;
    }

    fn write(&mut self, bytes: &[u8]) {
        for chunk in bytes.chunks(8) {
            let mut word = [0; 8];
            word[..chunk.len()].copy_from_slice(chunk);
            self.write_u64(u64::from_le_bytes(word));
        }
    }
}
