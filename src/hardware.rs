// Licensed under the Apache-2.0 license

//! Register-level SHA accelerator access consumed by the arbiter

use crate::engine::HashAlgo;
use crate::staging::StagingBank;

/// SHA accelerator primitives
///
/// Operations that move data through the shared staging memory require a
/// [`StagingBank`], so they can only run inside the staging guard.
/// Implementations must not block inside those calls.
pub trait ShaHardware {
    /// Spin until no engine is mid-operation
    fn wait_idle(&self);

    /// Load one block into staging memory and run one compression round
    ///
    /// `block` is exactly `algo.block_words()` long. With `first_block` set
    /// the engine starts from the algorithm's initial state, otherwise it
    /// continues from the state left by the previous block.
    fn hash_block(&self, bank: &StagingBank<'_>, algo: HashAlgo, block: &[u32], first_block: bool);

    /// Copy the engine's current digest state out of staging memory
    ///
    /// `out` is exactly `algo.digest_words()` long.
    fn read_digest(&self, bank: &StagingBank<'_>, algo: HashAlgo, out: &mut [u32]);
}
